//! Bearer-token HTTP client wrapper: attach credentials to every outgoing request, evict the
//! cached credential when the server answers `401 Unauthorized`, and let the session layer react.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod intercept;
pub mod obs;
pub mod session;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests and demos.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::Credential,
		client::{AuthClient, ClientConfig},
		http::ReqwestTransport,
		store::{CredentialStore, MemoryStore, StoreKey},
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = AuthClient<ReqwestTransport>;

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Seeds a fresh [`MemoryStore`] with `credential` under the default key, or leaves it empty.
	pub fn seeded_memory_store(credential: Option<&str>) -> Arc<MemoryStore> {
		let store = Arc::new(MemoryStore::default());

		if let Some(value) = credential {
			store
				.set(&StoreKey::default(), Credential::new(value))
				.expect("Failed to seed memory store for tests.");
		}

		store
	}

	/// Constructs an [`AuthClient`] pointed at `base_url`, backed by the provided in-memory
	/// store and the reqwest transport used across integration tests.
	pub fn build_reqwest_test_client(base_url: &str, store: Arc<MemoryStore>) -> ReqwestTestClient {
		let store: Arc<dyn CredentialStore> = store;
		let config = ClientConfig::builder()
			.base_url(base_url)
			.store(store)
			.build()
			.expect("Failed to build client configuration for tests.");

		AuthClient::configure(test_reqwest_transport(), config)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
