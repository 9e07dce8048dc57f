//! Response inspection and credential eviction on `401 Unauthorized`.

// self
use crate::{
	_prelude::*,
	http::HttpResponse,
	obs::{InterceptOutcome, InterceptSpan},
	session::Session,
};

const UNAUTHORIZED: u16 = 401;

/// Two-branch handler applied to every response outcome.
///
/// Successful responses pass through without inspection. Failures pass through too, after one
/// side effect: a `401 Unauthorized` evicts the cached credential and notifies the session's
/// observers. The error returned is always the error received.
#[derive(Clone, Debug)]
pub struct ResponseInterceptor {
	session: Session,
}
impl ResponseInterceptor {
	/// Creates an interceptor that evicts through `session`.
	pub fn new(session: Session) -> Self {
		Self { session }
	}

	/// Success branch; returns `response` untouched.
	pub fn on_success(&self, response: HttpResponse) -> HttpResponse {
		InterceptSpan::response(Some(response.status().as_u16())).finish(InterceptOutcome::Passed);

		response
	}

	/// Failure branch; evicts on 401 and hands `error` back unchanged.
	pub fn on_failure(&self, error: Error) -> Error {
		let span = InterceptSpan::response(error.status());

		if !error.is_unauthorized() {
			span.finish(InterceptOutcome::Passed);

			return error;
		}

		span.in_scope(|| match self.session.invalidate(UNAUTHORIZED) {
			Ok(had_credential) => {
				span.record_eviction(had_credential);

				#[cfg(feature = "tracing")]
				tracing::debug!(key = %self.session.key(), "Evicted credential after 401 response.");
			},
			Err(_e) => {
				#[cfg(feature = "tracing")]
				tracing::warn!(
					key = %self.session.key(),
					error = %_e,
					"Failed to evict credential after 401 response."
				);
			},
		});
		span.finish(InterceptOutcome::Evicted);

		error
	}

	/// Routes `outcome` through the matching branch.
	pub fn intercept(&self, outcome: Result<HttpResponse>) -> Result<HttpResponse> {
		match outcome {
			Ok(response) => Ok(self.on_success(response)),
			Err(error) => Err(self.on_failure(error)),
		}
	}
}
