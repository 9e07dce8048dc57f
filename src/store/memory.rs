//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	store::{CredentialStore, StoreError, StoreKey},
};

type StoreMap = Arc<RwLock<HashMap<StoreKey, Credential>>>;

/// Thread-safe storage backend that keeps credentials in-process.
///
/// Clones share the same map, so a clone handed to the client and one kept by the caller observe
/// each other's writes.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Returns `true` when no credential is cached under any key.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl CredentialStore for MemoryStore {
	fn get(&self, key: &StoreKey) -> Result<Option<Credential>, StoreError> {
		Ok(self.0.read().get(key).cloned())
	}

	fn set(&self, key: &StoreKey, credential: Credential) -> Result<(), StoreError> {
		self.0.write().insert(key.to_owned(), credential);

		Ok(())
	}

	fn remove(&self, key: &StoreKey) -> Result<Option<Credential>, StoreError> {
		Ok(self.0.write().remove(key))
	}
}
