//! Optional observability for the interceptors.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to wrap each interception in a `bearer_session.intercept` span. Request
//!   spans carry `method`, `target`, and the credential `source` (`provider`, `store`, or
//!   `none`); response spans carry `status` and, after a `401`, `had_credential`. Both record the
//!   final `outcome`. Credential values are never recorded.
//! - Enable `metrics` to count interceptions in `bearer_session_intercept_total{phase, outcome}`
//!   and evictions in `bearer_session_evictions_total{had_credential}`.

// self
use crate::_prelude::*;

/// Which side of the exchange an interceptor observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InterceptPhase {
	/// Outgoing request mutation.
	Request,
	/// Incoming response inspection.
	Response,
}
impl InterceptPhase {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			InterceptPhase::Request => "request",
			InterceptPhase::Response => "response",
		}
	}
}
impl Display for InterceptPhase {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Where an attached credential came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CredentialSource {
	/// The configured token provider.
	Provider,
	/// The session's credential store.
	Store,
}
impl CredentialSource {
	/// Returns a stable label suitable for span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CredentialSource::Provider => "provider",
			CredentialSource::Store => "store",
		}
	}
}

/// Outcome labels recorded for each interception.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InterceptOutcome {
	/// A bearer credential was attached to the request.
	Attached,
	/// The request left without a credential.
	Anonymous,
	/// The response or failure passed through without side effects.
	Passed,
	/// A `401 Unauthorized` failure evicted the cached credential.
	Evicted,
}
impl InterceptOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			InterceptOutcome::Attached => "attached",
			InterceptOutcome::Anonymous => "anonymous",
			InterceptOutcome::Passed => "passed",
			InterceptOutcome::Evicted => "evicted",
		}
	}
}
impl Display for InterceptOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Span around one interception; compiles to a phase tag when `tracing` is off.
#[derive(Clone, Debug)]
pub struct InterceptSpan {
	phase: InterceptPhase,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl InterceptSpan {
	/// Opens a request-phase span for `method` and `target`.
	pub fn request(method: &str, target: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::debug_span!(
				"bearer_session.intercept",
				phase = InterceptPhase::Request.as_str(),
				method,
				target,
				source = tracing::field::Empty,
				outcome = tracing::field::Empty
			);

			Self { phase: InterceptPhase::Request, span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (method, target);

			Self { phase: InterceptPhase::Request }
		}
	}

	/// Opens a response-phase span; `status` is absent for transport and config failures.
	pub fn response(status: Option<u16>) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::debug_span!(
				"bearer_session.intercept",
				phase = InterceptPhase::Response.as_str(),
				status,
				had_credential = tracing::field::Empty,
				outcome = tracing::field::Empty
			);

			Self { phase: InterceptPhase::Response, span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = status;

			Self { phase: InterceptPhase::Response }
		}
	}

	/// Returns the phase this span was opened for.
	pub fn phase(&self) -> InterceptPhase {
		self.phase
	}

	/// Runs `f` with the span entered.
	pub fn in_scope<F, R>(&self, f: F) -> R
	where
		F: FnOnce() -> R,
	{
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(f)
		}
		#[cfg(not(feature = "tracing"))]
		{
			f()
		}
	}

	/// Records which source resolved the credential, `none` when nothing did.
	pub fn record_source(&self, source: Option<CredentialSource>) {
		#[cfg(feature = "tracing")]
		self.span.record("source", source.map_or("none", CredentialSource::as_str));
		#[cfg(not(feature = "tracing"))]
		let _ = source;
	}

	/// Records a `401` eviction and whether a credential was actually cached.
	pub fn record_eviction(&self, had_credential: bool) {
		#[cfg(feature = "tracing")]
		self.span.record("had_credential", had_credential);
		#[cfg(feature = "metrics")]
		metrics::counter!(
			"bearer_session_evictions_total",
			"had_credential" => if had_credential { "true" } else { "false" }
		)
		.increment(1);
		#[cfg(not(any(feature = "tracing", feature = "metrics")))]
		let _ = had_credential;
	}

	/// Records the final outcome on the span and the intercept counter.
	pub fn finish(self, outcome: InterceptOutcome) {
		#[cfg(feature = "tracing")]
		self.span.record("outcome", outcome.as_str());
		#[cfg(feature = "metrics")]
		metrics::counter!(
			"bearer_session_intercept_total",
			"phase" => self.phase.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
		#[cfg(not(any(feature = "tracing", feature = "metrics")))]
		let _ = (self, outcome);
	}
}
