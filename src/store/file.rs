//! File-backed [`CredentialStore`] that survives process restarts.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::Credential,
	store::{CredentialStore, StoreError, StoreKey},
};

/// Snapshot entry persisted for each key.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredCredential {
	credential: Credential,
	#[serde(with = "time::serde::rfc3339")]
	stored_at: OffsetDateTime,
}

/// Persists credentials to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<StoreKey, StoredCredential>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Returns the file path backing this store.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Returns when the credential under `key` was last written, if present.
	pub fn stored_at(&self, key: &StoreKey) -> Option<OffsetDateTime> {
		self.inner.read().get(key).map(|entry| entry.stored_at)
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<StoreKey, StoredCredential>, StoreError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(HashMap::new());
		}

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(
		&self,
		contents: &HashMap<StoreKey, StoredCredential>,
	) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl CredentialStore for FileStore {
	fn get(&self, key: &StoreKey) -> Result<Option<Credential>, StoreError> {
		Ok(self.inner.read().get(key).map(|entry| entry.credential.clone()))
	}

	fn set(&self, key: &StoreKey, credential: Credential) -> Result<(), StoreError> {
		let mut guard = self.inner.write();
		let previous = guard.insert(
			key.to_owned(),
			StoredCredential { credential, stored_at: OffsetDateTime::now_utc() },
		);

		if let Err(e) = self.persist_locked(&guard) {
			match previous {
				Some(entry) => guard.insert(key.to_owned(), entry),
				None => guard.remove(key),
			};

			return Err(e);
		}

		Ok(())
	}

	fn remove(&self, key: &StoreKey) -> Result<Option<Credential>, StoreError> {
		let mut guard = self.inner.write();
		// Missing keys leave the file untouched.
		let Some(previous) = guard.remove(key) else { return Ok(None) };

		if let Err(e) = self.persist_locked(&guard) {
			// Keep memory in line with the file so the credential does not resurface on restart.
			guard.insert(key.to_owned(), previous);

			return Err(e);
		}

		Ok(Some(previous.credential))
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// self
	use super::*;

	fn temp_path(label: &str) -> PathBuf {
		let unique = format!(
			"bearer_session_file_store_{label}_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path("reload");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let key = StoreKey::default();

		store.set(&key, Credential::new("tok123")).expect("Failed to save fixture credential.");
		assert!(store.stored_at(&key).is_some());
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = reopened
			.get(&key)
			.expect("Failed to read fixture credential.")
			.expect("File store lost credential after reopen.");

		assert_eq!(fetched.expose(), "tok123");

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn remove_persists_and_is_idempotent() {
		let path = temp_path("remove");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let key = StoreKey::default();

		store.set(&key, Credential::new("stale")).expect("Failed to save fixture credential.");

		let removed = store.remove(&key).expect("First removal should succeed.");

		assert_eq!(removed.map(|c| c.expose().to_owned()), Some("stale".into()));
		assert!(store.remove(&key).expect("Second removal should succeed.").is_none());

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");

		assert!(reopened.get(&key).expect("Read after reopen should succeed.").is_none());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn failed_persist_keeps_memory_in_line_with_disk() {
		let dir = temp_path("readonly_dir");
		let path = dir.join("store.json");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let key = StoreKey::default();

		store.set(&key, Credential::new("tok123")).expect("Failed to save fixture credential.");

		// Replacing the snapshot target with a directory makes every rename fail.
		fs::remove_file(&path).expect("Failed to remove snapshot before blocking it.");
		fs::create_dir(&path).expect("Failed to block snapshot path.");

		store.remove(&key).expect_err("Removal must fail when the snapshot cannot be written.");

		assert_eq!(
			store.get(&key).expect("Memory reads never fail.").map(|c| c.expose().to_owned()),
			Some("tok123".into())
		);

		store
			.set(&key, Credential::new("tok456"))
			.expect_err("Save must fail when the snapshot cannot be written.");

		assert_eq!(
			store.get(&key).expect("Memory reads never fail.").map(|c| c.expose().to_owned()),
			Some("tok123".into())
		);

		store
			.set(&StoreKey::new("other"), Credential::new("fresh"))
			.expect_err("Save must fail when the snapshot cannot be written.");

		assert!(store.get(&StoreKey::new("other")).expect("Memory reads never fail.").is_none());

		fs::remove_dir_all(&dir).unwrap_or_else(|e| {
			panic!("Failed to remove temporary store directory {}: {e}", dir.display())
		});
	}

	#[test]
	fn corrupt_snapshot_is_a_serialization_error() {
		let path = temp_path("corrupt");

		fs::write(&path, b"not json").expect("Failed to write corrupt fixture.");

		let err = FileStore::open(&path).expect_err("Corrupt snapshot must not load.");

		assert!(matches!(err, StoreError::Serialization { .. }));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
