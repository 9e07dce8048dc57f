//! Outgoing-request credential attachment.

// crates.io
use ::http::header::AUTHORIZATION;
// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenProvider},
	http::RequestConfig,
	obs::{CredentialSource, InterceptOutcome, InterceptSpan},
	session::Session,
};

/// Attaches the resolved bearer credential to every outgoing [`RequestConfig`].
///
/// Resolution order: the [`TokenProvider`], when configured and returning a non-empty value,
/// then the session's credential store. When nothing resolves the request goes out untouched;
/// an unauthenticated request is a valid state (for example before login).
#[derive(Clone)]
pub struct RequestInterceptor {
	provider: Option<Arc<dyn TokenProvider>>,
	session: Session,
}
impl RequestInterceptor {
	/// Creates an interceptor reading from `session`, optionally preferring `provider`.
	pub fn new(session: Session, provider: Option<Arc<dyn TokenProvider>>) -> Self {
		Self { provider, session }
	}

	/// Resolves the credential the next request would carry.
	///
	/// Store read failures are logged and treated as "no credential".
	pub fn resolve_credential(&self) -> Option<Credential> {
		self.resolve().map(|(credential, _)| credential)
	}

	fn resolve(&self) -> Option<(Credential, CredentialSource)> {
		let provided = self.provider.as_ref().and_then(|provider| provider.token());

		if let Some(credential) = provided.and_then(Credential::non_empty) {
			return Some((credential, CredentialSource::Provider));
		}

		match self.session.credential() {
			Ok(credential) => credential.map(|credential| (credential, CredentialSource::Store)),
			Err(_e) => {
				#[cfg(feature = "tracing")]
				tracing::warn!(
					key = %self.session.key(),
					error = %_e,
					"Credential store read failed; sending request without a credential."
				);

				None
			},
		}
	}

	/// Mutates `config` so it carries the bearer credential, if one resolves.
	///
	/// Any existing `Authorization` header is overwritten when a credential resolves and left
	/// alone otherwise. A credential that cannot be encoded as a header value is skipped.
	pub fn intercept(&self, mut config: RequestConfig) -> RequestConfig {
		let span = InterceptSpan::request(config.method.as_str(), &config.target);
		let outcome = span.in_scope(|| {
			let resolved = self.resolve();

			span.record_source(resolved.as_ref().map(|(_, source)| *source));

			match resolved.map(|(credential, _)| credential.bearer_header()) {
				Some(Ok(value)) => {
					config.headers.insert(AUTHORIZATION, value);

					InterceptOutcome::Attached
				},
				Some(Err(_e)) => {
					#[cfg(feature = "tracing")]
					tracing::warn!(
						key = %self.session.key(),
						"Credential contains bytes not allowed in a header; sending request without it."
					);

					InterceptOutcome::Anonymous
				},
				None => InterceptOutcome::Anonymous,
			}
		});

		span.finish(outcome);

		config
	}
}
impl Debug for RequestInterceptor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestInterceptor")
			.field("provider_set", &self.provider.is_some())
			.field("session", &self.session)
			.finish()
	}
}
