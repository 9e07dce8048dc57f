//! Demonstrates the one-time client setup and the 401 eviction path.
//!
//! 1. Build a [`ClientConfig`] with an explicit store, a session observer, and the base URL taken
//!    from `API_URL` (falling back to `http://localhost:4000`).
//! 2. Log in by storing a credential through the client's [`Session`](bearer_session::session::Session).
//! 3. Issue a request; when the server answers 401 the credential is gone afterwards and the
//!    [`ReauthSignal`] tells the caller to send the user back to a login screen.
//!
//! Run against any server, e.g. `API_URL=https://httpbin.org/status cargo run --example
//! configure`.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
// self
use bearer_session::{
	client::{AuthClient, ClientConfig},
	session::{ReauthSignal, SessionEvent},
	store::{CredentialStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let reauth = Arc::new(ReauthSignal::default());
	let config = ClientConfig::builder()
		.base_url_from_env("API_URL")
		.store(store)
		.observer(reauth.clone())
		.observer(Arc::new(|event: &SessionEvent| println!("Session event: {event:?}.")))
		.build()?;
	let client = AuthClient::new(config);

	println!("Sending requests to {}.", client.base_url());

	client.session().login("demo-token")?;

	match client.get("/401").await {
		Ok(response) => println!("Server answered {}.", response.status()),
		Err(e) => println!("Request failed: {e}"),
	}

	println!("Still authenticated: {}.", client.session().is_authenticated()?);

	if reauth.take() {
		println!("Session expired; the UI should ask the user to sign in again.");
	}

	Ok(())
}
