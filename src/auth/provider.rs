//! Caller-supplied credential sources consulted before the store.

// self
use crate::{_prelude::*, auth::Credential};

/// Zero-argument capability returning the current credential, if any.
///
/// A provider takes precedence over the credential store. Returning `None` or an empty credential
/// makes the request interceptor fall back to the store lookup. Implementations run on every
/// outgoing request and must not block.
pub trait TokenProvider
where
	Self: Send + Sync,
{
	/// Returns the credential to attach to the next request.
	fn token(&self) -> Option<Credential>;
}
impl<F, T> TokenProvider for F
where
	F: Send + Sync + Fn() -> Option<T>,
	T: Into<Credential>,
{
	fn token(&self) -> Option<Credential> {
		self().map(Into::into)
	}
}

/// Provider that always yields the same credential; handy for service accounts and tests.
#[derive(Clone)]
pub struct StaticTokenProvider(Credential);
impl StaticTokenProvider {
	/// Wraps a fixed credential.
	pub fn new(credential: impl Into<Credential>) -> Self {
		Self(credential.into())
	}
}
impl TokenProvider for StaticTokenProvider {
	fn token(&self) -> Option<Credential> {
		Some(self.0.clone())
	}
}
impl Debug for StaticTokenProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("StaticTokenProvider").field(&self.0).finish()
	}
}
