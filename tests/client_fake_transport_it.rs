// std
use std::{
	env,
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	process,
	sync::Arc,
};
// crates.io
use ::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use parking_lot::Mutex;
use time::OffsetDateTime;
// self
use bearer_session::{
	auth::Credential,
	client::{AuthClient, ClientConfig},
	error::{Error, TransportError},
	http::{HttpRequest, HttpResponse, HttpTransport, RequestConfig, TransportFuture},
	session::{SessionEvent, SessionObserver},
	store::{CredentialStore, FileStore, MemoryStore, StoreKey},
};

#[derive(Debug)]
enum FakeTransportError {
	ConnectionReset,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::ConnectionReset => write!(f, "Connection reset by peer."),
		}
	}
}
impl StdError for FakeTransportError {}

/// Replies with a fixed status and records every request it receives.
#[derive(Default)]
struct RecordingTransport {
	status: Option<StatusCode>,
	fail: bool,
	requests: Mutex<Vec<HttpRequest>>,
}
impl RecordingTransport {
	fn replying(status: StatusCode) -> Self {
		Self { status: Some(status), ..Self::default() }
	}

	fn failing() -> Self {
		Self { fail: true, ..Self::default() }
	}

	fn authorization_headers(&self) -> Vec<Option<String>> {
		self.requests
			.lock()
			.iter()
			.map(|request| {
				request
					.headers
					.get(AUTHORIZATION)
					.map(|value| value.to_str().expect("Header should be ASCII.").to_owned())
			})
			.collect()
	}

	fn urls(&self) -> Vec<String> {
		self.requests.lock().iter().map(|request| request.url.to_string()).collect()
	}
}
impl HttpTransport for RecordingTransport {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		self.requests.lock().push(request);

		let status = self.status.unwrap_or(StatusCode::OK);
		let fail = self.fail;

		Box::pin(async move {
			if fail {
				return Err(TransportError::network(FakeTransportError::ConnectionReset));
			}

			Ok(HttpResponse::new(status, HeaderMap::new(), b"{\"ok\":false}".to_vec()))
		})
	}
}

#[derive(Default)]
struct EventLog(Mutex<Vec<SessionEvent>>);
impl SessionObserver for EventLog {
	fn on_event(&self, event: &SessionEvent) {
		self.0.lock().push(event.clone());
	}
}

fn build_client(
	transport: Arc<RecordingTransport>,
	store: Arc<dyn CredentialStore>,
	observer: Arc<EventLog>,
) -> AuthClient<RecordingTransport> {
	let config = ClientConfig::builder()
		.base_url("https://api.example.com/v1")
		.store(store)
		.observer(observer)
		.build()
		.expect("Client configuration should build.");

	AuthClient::configure(transport, config)
}

fn seeded_memory_store(credential: Option<&str>) -> Arc<MemoryStore> {
	let store = Arc::new(MemoryStore::default());

	if let Some(value) = credential {
		store.set(&StoreKey::default(), Credential::new(value)).expect("Seeding should succeed.");
	}

	store
}

fn stored(store: &dyn CredentialStore) -> Option<String> {
	store
		.get(&StoreKey::default())
		.expect("Store reads should succeed.")
		.map(|credential| credential.expose().to_owned())
}

#[tokio::test]
async fn requests_reach_transport_in_call_order_with_bearer() {
	let transport = Arc::new(RecordingTransport::replying(StatusCode::OK));
	let store = seeded_memory_store(Some("tok123"));
	let client = build_client(transport.clone(), store, Arc::new(EventLog::default()));

	client.get("/users").await.expect("First request should succeed.");
	client.get("users/2").await.expect("Second request should succeed.");
	client.get("https://cdn.example.com/logo.png").await.expect("Third request should succeed.");

	assert_eq!(
		transport.urls(),
		vec![
			"https://api.example.com/v1/users".to_owned(),
			"https://api.example.com/v1/users/2".to_owned(),
			"https://cdn.example.com/logo.png".to_owned(),
		]
	);
	assert!(
		transport
			.authorization_headers()
			.iter()
			.all(|header| header.as_deref() == Some("Bearer tok123"))
	);
}

#[tokio::test]
async fn login_takes_effect_on_next_request() {
	let transport = Arc::new(RecordingTransport::replying(StatusCode::OK));
	let log = Arc::new(EventLog::default());
	let client = build_client(transport.clone(), seeded_memory_store(None), log.clone());

	client.get("/public").await.expect("Anonymous request should succeed.");
	client.session().login("fresh").expect("Login should store the credential.");
	client.get("/me").await.expect("Authenticated request should succeed.");
	client.session().logout().expect("Logout should clear the credential.");
	client.get("/public").await.expect("Anonymous request should succeed.");

	assert_eq!(
		transport.authorization_headers(),
		vec![None, Some("Bearer fresh".to_owned()), None]
	);

	let events = log.0.lock();

	assert!(matches!(events[0], SessionEvent::LoggedIn { .. }));
	assert!(matches!(events[1], SessionEvent::LoggedOut { .. }));
}

#[tokio::test]
async fn unauthorized_evicts_notifies_and_propagates() {
	let transport = Arc::new(RecordingTransport::replying(StatusCode::UNAUTHORIZED));
	let store = seeded_memory_store(Some("stale"));
	let log = Arc::new(EventLog::default());
	let client = build_client(transport, store.clone(), log.clone());
	let err = client.get("/me").await.expect_err("401 must surface as an error.");

	assert!(err.is_unauthorized());
	assert_eq!(err.response().map(HttpResponse::body), Some(b"{\"ok\":false}".as_slice()));
	assert!(stored(&*store).is_none());

	let err = client.get("/me").await.expect_err("Second 401 must surface too.");

	assert_eq!(err.status(), Some(401));

	let events = log.0.lock();
	let flags: Vec<bool> = events
		.iter()
		.filter_map(|event| match event {
			SessionEvent::Invalidated { had_credential, .. } => Some(*had_credential),
			_ => None,
		})
		.collect();

	assert_eq!(flags, vec![true, false]);
}

#[tokio::test]
async fn identity_keys_survive_eviction_but_not_logout() {
	let transport = Arc::new(RecordingTransport::replying(StatusCode::UNAUTHORIZED));
	let store = seeded_memory_store(Some("stale"));
	let profile = StoreKey::new("userData");

	store.set(&profile, Credential::new("{\"name\":\"ada\"}")).expect("Seeding should succeed.");

	let config = ClientConfig::builder()
		.store(store.clone())
		.identity_keys(["userData", "selectedCompany"])
		.build()
		.expect("Client configuration should build.");
	let client: AuthClient<RecordingTransport> = AuthClient::configure(transport, config);

	client.get("/me").await.expect_err("401 must surface as an error.");

	assert!(stored(&*store).is_none());
	assert!(store.get(&profile).expect("Memory store reads never fail.").is_some());

	client.session().login("fresh").expect("Login should store the credential.");
	client.session().logout().expect("Logout should clear every key.");

	assert!(store.is_empty());
}

#[tokio::test]
async fn non_unauthorized_failures_do_not_touch_the_store() {
	let store = seeded_memory_store(Some("tok123"));
	let log = Arc::new(EventLog::default());

	for status in [StatusCode::FORBIDDEN, StatusCode::NOT_FOUND, StatusCode::BAD_GATEWAY] {
		let transport = Arc::new(RecordingTransport::replying(status));
		let client = build_client(transport, store.clone(), log.clone());
		let err = client.get("/me").await.expect_err("Non-2xx must surface as an error.");

		assert_eq!(err.status(), Some(status.as_u16()));
		assert_eq!(stored(&*store), Some("tok123".into()));
	}

	let client = build_client(Arc::new(RecordingTransport::failing()), store.clone(), log.clone());
	let err = client.get("/me").await.expect_err("Transport failure must surface as an error.");

	assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
	assert_eq!(stored(&*store), Some("tok123".into()));
	assert!(log.0.lock().is_empty());
}

#[tokio::test]
async fn custom_accept_status_turns_redirects_into_successes() {
	let transport = Arc::new(RecordingTransport::replying(StatusCode::NOT_MODIFIED));
	let config = ClientConfig::builder()
		.accept_status(|status| status.is_success() || status == StatusCode::NOT_MODIFIED)
		.build()
		.expect("Client configuration should build.");
	let client: AuthClient<RecordingTransport> = AuthClient::configure(transport.clone(), config);
	let response = client.get("/cached").await.expect("304 should be accepted.");

	assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
	assert_eq!(transport.urls(), vec!["http://localhost:4000/cached".to_owned()]);
}

#[tokio::test]
async fn accepted_unauthorized_skips_eviction() {
	let transport = Arc::new(RecordingTransport::replying(StatusCode::UNAUTHORIZED));
	let store = seeded_memory_store(Some("tok123"));
	let log = Arc::new(EventLog::default());
	let config = ClientConfig::builder()
		.store(store.clone())
		.observer(log.clone())
		.accept_status(|status| status.is_success() || status == StatusCode::UNAUTHORIZED)
		.build()
		.expect("Client configuration should build.");
	let client: AuthClient<RecordingTransport> = AuthClient::configure(transport, config);
	let response = client.get("/me").await.expect("Accepted 401 should be a success.");

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(stored(&*store), Some("tok123".into()));
	assert!(log.0.lock().is_empty());
}

#[tokio::test]
async fn invalid_target_is_reported_before_dispatch() {
	let transport = Arc::new(RecordingTransport::replying(StatusCode::OK));
	let client =
		build_client(transport.clone(), seeded_memory_store(None), Arc::new(EventLog::default()));
	let err = client
		.request(RequestConfig::get("http://[::1"))
		.await
		.expect_err("Malformed target must not be dispatched.");

	assert!(matches!(err, Error::Config(_)));
	assert!(transport.urls().is_empty());
}

#[tokio::test]
async fn provider_closure_reads_live_state() {
	let current = Arc::new(Mutex::new(None::<String>));
	let source = current.clone();
	let transport = Arc::new(RecordingTransport::replying(StatusCode::OK));
	let config = ClientConfig::builder()
		.store(seeded_memory_store(Some("stok")))
		.token_provider(move || source.lock().clone())
		.build()
		.expect("Client configuration should build.");
	let client: AuthClient<RecordingTransport> = AuthClient::configure(transport.clone(), config);

	client.get("/a").await.expect("Request should succeed.");
	*current.lock() = Some("ptok".into());
	client.get("/b").await.expect("Request should succeed.");

	assert_eq!(
		transport.authorization_headers(),
		vec![Some("Bearer stok".to_owned()), Some("Bearer ptok".to_owned())]
	);
}

#[tokio::test]
async fn file_store_eviction_survives_reopen() {
	let path = env::temp_dir().join(format!(
		"bearer_session_client_it_{}_{}.json",
		process::id(),
		OffsetDateTime::now_utc().unix_timestamp_nanos()
	));
	let file_store = FileStore::open(&path).expect("Failed to open file store.");

	file_store
		.set(&StoreKey::default(), Credential::new("persisted"))
		.expect("Failed to seed file store.");

	let client = build_client(
		Arc::new(RecordingTransport::replying(StatusCode::UNAUTHORIZED)),
		Arc::new(file_store),
		Arc::new(EventLog::default()),
	);
	let _ = client.get("/me").await.expect_err("401 must surface as an error.");
	let reopened = FileStore::open(&path).expect("Failed to reopen file store.");

	assert!(stored(&reopened).is_none());

	std::fs::remove_file(&path).unwrap_or_else(|e| {
		panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
	});
}

#[test]
fn memory_store_clones_share_state() {
	let store = MemoryStore::default();
	let clone = store.clone();

	clone.set(&StoreKey::default(), Credential::new("shared")).expect("Write should succeed.");

	assert_eq!(stored(&store), Some("shared".into()));
	assert!(!store.is_empty());
}
