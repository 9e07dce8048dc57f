//! Session state shared by the interceptors and the UI-facing layer.
//!
//! A [`Session`] binds a [`CredentialStore`] to the fixed [`StoreKey`] the credential lives
//! under and fans out [`SessionEvent`]s to registered [`SessionObserver`]s. The interceptors only
//! read and evict through it; deciding what happens after an invalidation (for example showing a
//! login screen) belongs to whoever observes the events.

// std
use std::sync::atomic::{AtomicBool, Ordering};
// self
use crate::{
	_prelude::*,
	auth::Credential,
	store::{CredentialStore, StoreKey},
};

/// Session transitions announced to observers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
	/// A credential was stored by [`Session::login`].
	LoggedIn {
		/// Key the credential was stored under.
		key: StoreKey,
		/// Instant of the transition.
		at: OffsetDateTime,
	},
	/// The credential and the associated identity keys were removed by [`Session::logout`].
	LoggedOut {
		/// Credential key that was cleared.
		key: StoreKey,
		/// Instant of the transition.
		at: OffsetDateTime,
	},
	/// The server rejected the credential and it was evicted.
	Invalidated {
		/// Key that was cleared.
		key: StoreKey,
		/// HTTP status that triggered the eviction.
		status: u16,
		/// Whether a credential was actually present before eviction.
		had_credential: bool,
		/// Instant of the transition.
		at: OffsetDateTime,
	},
}
impl SessionEvent {
	/// Returns the key the event refers to.
	pub fn key(&self) -> &StoreKey {
		match self {
			Self::LoggedIn { key, .. }
			| Self::LoggedOut { key, .. }
			| Self::Invalidated { key, .. } => key,
		}
	}
}

/// Receives [`SessionEvent`]s. Observers run synchronously on the thread that caused the
/// transition and must not block.
pub trait SessionObserver
where
	Self: Send + Sync,
{
	/// Handles a single transition.
	fn on_event(&self, event: &SessionEvent);
}
impl<F> SessionObserver for F
where
	F: Send + Sync + Fn(&SessionEvent),
{
	fn on_event(&self, event: &SessionEvent) {
		self(event)
	}
}

/// Credential store handle plus the observers interested in its transitions.
#[derive(Clone)]
pub struct Session {
	store: Arc<dyn CredentialStore>,
	key: StoreKey,
	identity_keys: Vec<StoreKey>,
	observers: Vec<Arc<dyn SessionObserver>>,
}
impl Session {
	/// Creates a session over `store`, caching the credential under `key`.
	pub fn new(store: Arc<dyn CredentialStore>, key: StoreKey) -> Self {
		Self { store, key, identity_keys: Vec::new(), observers: Vec::new() }
	}

	/// Adds keys holding cached identity data (profile, selected tenant, chat history, ...)
	/// that [`logout`](Self::logout) clears together with the credential.
	///
	/// A `401` eviction never touches them.
	pub fn with_identity_keys<I>(mut self, keys: I) -> Self
	where
		I: IntoIterator<Item = StoreKey>,
	{
		self.identity_keys.extend(keys.into_iter().filter(|key| key != &self.key));

		self
	}

	/// Registers an observer notified on every transition.
	pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
		self.observers.push(observer);

		self
	}

	/// Returns the key the credential is cached under.
	pub fn key(&self) -> &StoreKey {
		&self.key
	}

	/// Returns the identity keys cleared on logout.
	pub fn identity_keys(&self) -> &[StoreKey] {
		&self.identity_keys
	}

	/// Returns the underlying store.
	pub fn store(&self) -> &Arc<dyn CredentialStore> {
		&self.store
	}

	/// Reads the cached credential; empty values count as absent.
	pub fn credential(&self) -> Result<Option<Credential>> {
		Ok(self.store.get(&self.key)?.and_then(Credential::non_empty))
	}

	/// Returns `true` when a non-empty credential is cached.
	pub fn is_authenticated(&self) -> Result<bool> {
		Ok(self.credential()?.is_some())
	}

	/// Stores a freshly issued credential.
	pub fn login(&self, credential: impl Into<Credential>) -> Result<()> {
		self.store.set(&self.key, credential.into())?;
		self.notify(&SessionEvent::LoggedIn {
			key: self.key.clone(),
			at: OffsetDateTime::now_utc(),
		});

		Ok(())
	}

	/// Removes the cached credential and every identity key. Safe to call when already logged
	/// out.
	///
	/// Every key is attempted; the first store failure is returned and no event is emitted.
	pub fn logout(&self) -> Result<()> {
		std::iter::once(&self.key)
			.chain(&self.identity_keys)
			.map(|key| self.store.remove(key).map(drop))
			.fold(Ok(()), |acc, removed| acc.and(removed))?;

		self.notify(&SessionEvent::LoggedOut {
			key: self.key.clone(),
			at: OffsetDateTime::now_utc(),
		});

		Ok(())
	}

	/// Evicts the credential after the server answered with `status`.
	///
	/// Observers are notified even when the store was already empty, so every rejected request
	/// is reported once. Only the credential key is cleared. Returns whether a credential was
	/// present.
	pub fn invalidate(&self, status: u16) -> Result<bool> {
		let had_credential = self.store.remove(&self.key)?.is_some();

		self.notify(&SessionEvent::Invalidated {
			key: self.key.clone(),
			status,
			had_credential,
			at: OffsetDateTime::now_utc(),
		});

		Ok(had_credential)
	}

	fn notify(&self, event: &SessionEvent) {
		for observer in &self.observers {
			observer.on_event(event);
		}
	}
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("key", &self.key)
			.field("identity_keys", &self.identity_keys)
			.field("observers", &self.observers.len())
			.finish()
	}
}

/// Observer that latches when the session is invalidated.
///
/// UI code polls [`ReauthSignal::take`] and decides by itself whether to send the user back to
/// a login screen.
#[derive(Debug, Default)]
pub struct ReauthSignal(AtomicBool);
impl ReauthSignal {
	/// Returns `true` if an invalidation happened since the last call, clearing the latch.
	pub fn take(&self) -> bool {
		self.0.swap(false, Ordering::AcqRel)
	}

	/// Returns `true` if an invalidation is pending without clearing it.
	pub fn is_pending(&self) -> bool {
		self.0.load(Ordering::Acquire)
	}
}
impl SessionObserver for ReauthSignal {
	fn on_event(&self, event: &SessionEvent) {
		match event {
			SessionEvent::Invalidated { .. } => self.0.store(true, Ordering::Release),
			SessionEvent::LoggedIn { .. } => self.0.store(false, Ordering::Release),
			SessionEvent::LoggedOut { .. } => {},
		}
	}
}
