//! Opaque bearer credential that redacts itself in logs.

// crates.io
use ::http::{HeaderValue, header::InvalidHeaderValue};
// self
use crate::_prelude::*;

/// Opaque bearer string representing an authenticated session.
///
/// An empty credential is never attached to a request; callers may still construct one, and the
/// interceptors treat it exactly like an absent credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);
impl Credential {
	/// Wraps a new credential string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when the credential holds no characters.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Drops empty credentials so they resolve like a missing one.
	pub fn non_empty(self) -> Option<Self> {
		if self.is_empty() { None } else { Some(self) }
	}

	/// Renders the `Authorization` header value (`Bearer <credential>`), marked sensitive.
	pub fn bearer_header(&self) -> Result<HeaderValue, InvalidHeaderValue> {
		let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0))?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl AsRef<str> for Credential {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl From<String> for Credential {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl From<&str> for Credential {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Credential").field(&"<redacted>").finish()
	}
}
impl Display for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
