//! Credential store contract and built-in store implementations.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::Credential};

/// Synchronous key/value storage caching the active credential.
///
/// Reads happen on every outgoing request and writes only on login, logout, or a
/// `401 Unauthorized` response, so implementations should favor cheap reads. Every operation
/// must be idempotent: removing a missing key is not an error.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Fetches the credential stored under `key`, if present.
	fn get(&self, key: &StoreKey) -> Result<Option<Credential>, StoreError>;

	/// Persists or replaces the credential stored under `key`.
	fn set(&self, key: &StoreKey, credential: Credential) -> Result<(), StoreError>;

	/// Removes the credential stored under `key`, returning the previous value.
	fn remove(&self, key: &StoreKey) -> Result<Option<Credential>, StoreError>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Fixed name under which a credential is cached.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreKey(String);
impl StoreKey {
	/// Key used when the configuration does not name one.
	pub const DEFAULT: &'static str = "token";

	/// Builds a key from an arbitrary name.
	pub fn new(name: impl Into<String>) -> Self {
		Self(name.into())
	}

	/// Returns the key name.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Default for StoreKey {
	fn default() -> Self {
		Self::new(Self::DEFAULT)
	}
}
impl AsRef<str> for StoreKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<&str> for StoreKey {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl Debug for StoreKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "StoreKey({})", self.0)
	}
}
impl Display for StoreKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
