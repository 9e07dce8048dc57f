//! Client configuration and the authenticated HTTP client.
//!
//! [`AuthClient::configure`] is the single setup entry point: it wires a
//! [`RequestInterceptor`] and a [`ResponseInterceptor`] around one [`HttpTransport`], both
//! bound to the same [`Session`]. Every call made through the returned client (or any of its
//! clones) is authenticated on the way out and self-heals its cached credential on the way back.
//! There is no process-wide client: build one during initialization and share it.

// crates.io
use ::http::StatusCode;
// self
use crate::{
	_prelude::*,
	auth::TokenProvider,
	error::ConfigError,
	http::{HttpResponse, HttpTransport, RequestConfig},
	intercept::{RequestInterceptor, ResponseInterceptor},
	session::{Session, SessionObserver},
	store::{CredentialStore, MemoryStore, StoreKey},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// Base URL used when the configuration does not provide one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";

/// Predicate deciding which statuses count as success.
///
/// Accepted statuses reach the response interceptor's success branch, so the credential is
/// only evicted on a `401` this predicate rejects.
pub type AcceptStatus = fn(StatusCode) -> bool;

/// Default [`AcceptStatus`]: any 2xx status.
pub fn accept_success(status: StatusCode) -> bool {
	status.is_success()
}

/// Resolves a base URL from an optional raw value, falling back to [`DEFAULT_BASE_URL`] when
/// the value is missing or blank.
pub fn resolve_base_url(value: Option<&str>) -> Result<Url, ConfigError> {
	parse_base_url(base_url_or_default(value))
}

fn base_url_or_default(value: Option<&str>) -> &str {
	value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(DEFAULT_BASE_URL)
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw)
		.map_err(|source| ConfigError::InvalidBaseUrl { value: raw.to_owned(), source })?;

	if url.cannot_be_a_base() {
		return Err(ConfigError::CannotBeABase { value: raw.to_owned() });
	}

	Ok(url)
}

/// Validated settings consumed by [`AuthClient::configure`].
#[derive(Clone)]
pub struct ClientConfig {
	/// Base target joined with relative request targets.
	pub base_url: Url,
	/// Key the credential is cached under.
	pub credential_key: StoreKey,
	/// Keys holding cached identity data, cleared on logout alongside the credential.
	pub identity_keys: Vec<StoreKey>,
	/// Optional provider consulted before the store.
	pub token_provider: Option<Arc<dyn TokenProvider>>,
	/// Credential store shared by both interceptors.
	pub store: Arc<dyn CredentialStore>,
	/// Observers notified on session transitions.
	pub observers: Vec<Arc<dyn SessionObserver>>,
	/// Statuses treated as success; everything else becomes [`Error::Status`].
	pub accept_status: AcceptStatus,
}
impl ClientConfig {
	/// Starts a builder seeded with the documented defaults.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}
}
impl Debug for ClientConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientConfig")
			.field("base_url", &self.base_url.as_str())
			.field("credential_key", &self.credential_key)
			.field("identity_keys", &self.identity_keys)
			.field("token_provider_set", &self.token_provider.is_some())
			.field("observers", &self.observers.len())
			.finish()
	}
}

/// Builder for [`ClientConfig`] values.
pub struct ClientConfigBuilder {
	/// Raw base URL; validated by [`build`](Self::build).
	pub base_url: String,
	/// Key the credential is cached under.
	pub credential_key: StoreKey,
	/// Keys cleared on logout alongside the credential.
	pub identity_keys: Vec<StoreKey>,
	/// Optional provider consulted before the store.
	pub token_provider: Option<Arc<dyn TokenProvider>>,
	/// Injected credential store; a fresh [`MemoryStore`] when unset.
	pub store: Option<Arc<dyn CredentialStore>>,
	/// Observers notified on session transitions.
	pub observers: Vec<Arc<dyn SessionObserver>>,
	/// Statuses treated as success.
	pub accept_status: AcceptStatus,
}
impl Default for ClientConfigBuilder {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.to_owned(),
			credential_key: StoreKey::default(),
			identity_keys: Vec::new(),
			token_provider: None,
			store: None,
			observers: Vec::new(),
			accept_status: accept_success,
		}
	}
}
impl ClientConfigBuilder {
	/// Sets the base target explicitly.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = url.into();

		self
	}

	/// Reads the base target from the environment variable `var`, keeping
	/// [`DEFAULT_BASE_URL`] when it is unset or blank.
	pub fn base_url_from_env(self, var: &str) -> Self {
		self.base_url_or_default(std::env::var(var).ok().as_deref())
	}

	/// Uses `value` as the base target, keeping [`DEFAULT_BASE_URL`] when it is missing or
	/// blank.
	pub fn base_url_or_default(mut self, value: Option<&str>) -> Self {
		self.base_url = base_url_or_default(value).to_owned();

		self
	}

	/// Overrides the key the credential is cached under.
	pub fn credential_key(mut self, key: impl Into<String>) -> Self {
		self.credential_key = StoreKey::new(key);

		self
	}

	/// Adds keys holding cached identity data that [`Session::logout`] clears together with the
	/// credential. `401` evictions leave them alone.
	pub fn identity_keys<I, S>(mut self, keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.identity_keys.extend(keys.into_iter().map(StoreKey::new));

		self
	}

	/// Installs a provider consulted before the store on every request.
	pub fn token_provider(mut self, provider: impl 'static + TokenProvider) -> Self {
		self.token_provider = Some(Arc::new(provider));

		self
	}

	/// Injects the credential store.
	pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
		self.store = Some(store);

		self
	}

	/// Registers a session observer.
	pub fn observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
		self.observers.push(observer);

		self
	}

	/// Registers several session observers.
	pub fn observers<I>(mut self, observers: I) -> Self
	where
		I: IntoIterator<Item = Arc<dyn SessionObserver>>,
	{
		self.observers.extend(observers);

		self
	}

	/// Overrides which statuses count as success.
	pub fn accept_status(mut self, accept: AcceptStatus) -> Self {
		self.accept_status = accept;

		self
	}

	/// Consumes the builder and validates the base URL.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let base_url = parse_base_url(self.base_url.trim())?;
		let store = self.store.unwrap_or_else(|| Arc::new(MemoryStore::default()));

		Ok(ClientConfig {
			base_url,
			credential_key: self.credential_key,
			identity_keys: self.identity_keys,
			token_provider: self.token_provider,
			store,
			observers: self.observers,
			accept_status: self.accept_status,
		})
	}
}
impl Debug for ClientConfigBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientConfigBuilder")
			.field("base_url", &self.base_url)
			.field("credential_key", &self.credential_key)
			.field("identity_keys", &self.identity_keys)
			.field("token_provider_set", &self.token_provider.is_some())
			.field("store_set", &self.store.is_some())
			.field("observers", &self.observers.len())
			.finish()
	}
}

/// Shared HTTP client whose every call passes through both interceptors.
///
/// Cloning is cheap; clones share the transport, the session, and its store.
pub struct AuthClient<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
	base_url: Url,
	session: Session,
	request_interceptor: RequestInterceptor,
	response_interceptor: ResponseInterceptor,
	accept_status: AcceptStatus,
}
impl<T> AuthClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Wires both interceptors onto `transport` using `config`.
	///
	/// Call once during initialization and share the result; each call builds an independent
	/// client with its own interceptor pair.
	pub fn configure(transport: impl Into<Arc<T>>, config: ClientConfig) -> Self {
		let session = config.observers.into_iter().fold(
			Session::new(config.store, config.credential_key).with_identity_keys(config.identity_keys),
			Session::with_observer,
		);
		let request_interceptor = RequestInterceptor::new(session.clone(), config.token_provider);
		let response_interceptor = ResponseInterceptor::new(session.clone());

		#[cfg(feature = "tracing")]
		tracing::debug!(base_url = %config.base_url, key = %session.key(), "Configured client.");

		Self {
			transport: transport.into(),
			base_url: config.base_url,
			session,
			request_interceptor,
			response_interceptor,
			accept_status: config.accept_status,
		}
	}

	/// Returns the base URL relative targets resolve against.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Returns the session shared by both interceptors.
	pub fn session(&self) -> &Session {
		&self.session
	}

	/// Returns the request interceptor, for use with other clients or in isolation.
	pub fn request_interceptor(&self) -> &RequestInterceptor {
		&self.request_interceptor
	}

	/// Returns the response interceptor, for use with other clients or in isolation.
	pub fn response_interceptor(&self) -> &ResponseInterceptor {
		&self.response_interceptor
	}

	/// Returns the underlying transport.
	pub fn transport(&self) -> &Arc<T> {
		&self.transport
	}

	/// Sends `config` through the interceptors and the transport.
	///
	/// The request interceptor runs synchronously before the target is resolved, so requests
	/// reach the transport in call order. Statuses rejected by the configured
	/// [`AcceptStatus`] become [`Error::Status`]. Every outcome, success or failure, is routed
	/// through the response interceptor before it is returned.
	pub async fn request(&self, config: RequestConfig) -> Result<HttpResponse> {
		let config = self.request_interceptor.intercept(config);
		let outcome = self.dispatch(config).await;

		self.response_interceptor.intercept(outcome)
	}

	async fn dispatch(&self, config: RequestConfig) -> Result<HttpResponse> {
		let request = config.resolve(&self.base_url)?;
		let response = self.transport.send(request).await?;

		if (self.accept_status)(response.status()) {
			Ok(response)
		} else {
			Err(Error::Status { response })
		}
	}

	/// Sends a `GET` request.
	pub async fn get(&self, target: &str) -> Result<HttpResponse> {
		self.request(RequestConfig::get(target)).await
	}

	/// Sends a `DELETE` request.
	pub async fn delete(&self, target: &str) -> Result<HttpResponse> {
		self.request(RequestConfig::delete(target)).await
	}

	/// Sends a `POST` request with a JSON body.
	pub async fn post_json<B>(&self, target: &str, body: &B) -> Result<HttpResponse>
	where
		B: ?Sized + Serialize,
	{
		self.request(RequestConfig::post(target).json(body)?).await
	}

	/// Sends a `PUT` request with a JSON body.
	pub async fn put_json<B>(&self, target: &str, body: &B) -> Result<HttpResponse>
	where
		B: ?Sized + Serialize,
	{
		self.request(RequestConfig::put(target).json(body)?).await
	}
}
#[cfg(feature = "reqwest")]
impl AuthClient<ReqwestTransport> {
	/// Configures a client backed by a default reqwest transport.
	pub fn new(config: ClientConfig) -> Self {
		Self::configure(ReqwestTransport::default(), config)
	}
}
impl<T> Clone for AuthClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			base_url: self.base_url.clone(),
			session: self.session.clone(),
			request_interceptor: self.request_interceptor.clone(),
			response_interceptor: self.response_interceptor.clone(),
			accept_status: self.accept_status,
		}
	}
}
impl<T> Debug for AuthClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthClient")
			.field("base_url", &self.base_url.as_str())
			.field("session", &self.session)
			.finish()
	}
}
