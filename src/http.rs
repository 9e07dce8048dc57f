//! Request/response model and transport primitives.
//!
//! [`RequestConfig`] is the mutable description of an outgoing call that interceptors operate
//! on. Once interception is done it is resolved against the client's base URL into an
//! [`HttpRequest`] and handed to an [`HttpTransport`]. Transports report every answer the
//! server gives as an [`HttpResponse`], whatever its status; deciding which statuses count as
//! failures is the client's job.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
use std::time::Duration as StdDuration;
// crates.io
use ::http::{
	HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing a fully resolved request.
///
/// The trait is the crate's only dependency on an HTTP implementation. Implementations must be
/// `Send + Sync + 'static` so a single transport can back every clone of a client, and must
/// return non-2xx answers as `Ok` responses; only failures that produced no response at all
/// (DNS, TCP, TLS, timeouts) belong in [`TransportError`].
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` and returns the raw response.
	fn send(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// Mutable representation of an outgoing call, as seen by interceptors.
#[derive(Clone, Debug)]
pub struct RequestConfig {
	/// HTTP method.
	pub method: Method,
	/// Relative path (joined onto the base URL) or absolute URL.
	pub target: String,
	/// Request headers; interceptors may add or overwrite entries.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
	/// Optional deadline forwarded to the transport untouched.
	pub timeout: Option<StdDuration>,
}
impl RequestConfig {
	/// Creates a config with no headers, body, or timeout.
	pub fn new(method: Method, target: impl Into<String>) -> Self {
		Self { method, target: target.into(), headers: HeaderMap::new(), body: None, timeout: None }
	}

	/// Shorthand for a `GET` request.
	pub fn get(target: impl Into<String>) -> Self {
		Self::new(Method::GET, target)
	}

	/// Shorthand for a `POST` request.
	pub fn post(target: impl Into<String>) -> Self {
		Self::new(Method::POST, target)
	}

	/// Shorthand for a `PUT` request.
	pub fn put(target: impl Into<String>) -> Self {
		Self::new(Method::PUT, target)
	}

	/// Shorthand for a `PATCH` request.
	pub fn patch(target: impl Into<String>) -> Self {
		Self::new(Method::PATCH, target)
	}

	/// Shorthand for a `DELETE` request.
	pub fn delete(target: impl Into<String>) -> Self {
		Self::new(Method::DELETE, target)
	}

	/// Sets a header, replacing any previous value.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Sets a raw body.
	pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Serializes `body` as JSON and sets `content-type: application/json`.
	pub fn json<T>(mut self, body: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(body)?);
		self.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

		Ok(self)
	}

	/// Sets a per-request deadline.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Returns the current `Authorization` header, if any.
	pub fn authorization(&self) -> Option<&HeaderValue> {
		self.headers.get(AUTHORIZATION)
	}

	/// Resolves the target against `base` and produces a dispatchable request.
	///
	/// Absolute targets (`scheme://...` or protocol-relative `//host/...`) ignore the base.
	/// Relative targets are appended to the base with exactly one `/` between them, so a base
	/// path prefix such as `/api` is kept.
	pub fn resolve(self, base: &Url) -> Result<HttpRequest, ConfigError> {
		let url = resolve_target(base, &self.target)?;

		Ok(HttpRequest {
			method: self.method,
			url,
			headers: self.headers,
			body: self.body,
			timeout: self.timeout,
		})
	}
}

/// Fully resolved request handed to an [`HttpTransport`].
#[derive(Clone, Debug)]
pub struct HttpRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Request headers.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
	/// Optional deadline.
	pub timeout: Option<StdDuration>,
}

/// Response received from the server, kept byte-for-byte as the transport produced it.
#[derive(Clone, Debug)]
pub struct HttpResponse {
	status: StatusCode,
	headers: HeaderMap,
	body: Vec<u8>,
}
impl HttpResponse {
	/// Assembles a response from its parts.
	pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
		Self { status, headers, body }
	}

	/// Returns the HTTP status.
	pub fn status(&self) -> StatusCode {
		self.status
	}

	/// Returns the response headers.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Returns the raw body bytes.
	pub fn body(&self) -> &[u8] {
		&self.body
	}

	/// Consumes the response and returns the body bytes.
	pub fn into_body(self) -> Vec<u8> {
		self.body
	}

	/// Returns the body as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Decodes the body as JSON, reporting the failing path on mismatch.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::Decode { source, status: self.status.as_u16() })
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let HttpRequest { method, url, headers, body, timeout } = request;
			let mut builder = client.request(method, url).headers(headers);

			if let Some(body) = body {
				builder = builder.body(body);
			}
			if let Some(timeout) = timeout {
				builder = builder.timeout(timeout);
			}

			let response = builder.send().await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await?.to_vec();

			Ok(HttpResponse::new(status, headers, body))
		})
	}
}

fn is_absolute_target(target: &str) -> bool {
	if target.starts_with("//") {
		return true;
	}

	match target.split_once("://") {
		Some((scheme, _)) => {
			let mut chars = scheme.chars();

			chars.next().is_some_and(|c| c.is_ascii_alphabetic())
				&& chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
		},
		None => false,
	}
}

fn resolve_target(base: &Url, target: &str) -> Result<Url, ConfigError> {
	let invalid = |source| ConfigError::InvalidTarget { target: target.to_owned(), source };

	if target.is_empty() {
		return Ok(base.clone());
	}
	if target.starts_with("//") {
		return base.join(target).map_err(invalid);
	}
	if is_absolute_target(target) {
		return Url::parse(target).map_err(invalid);
	}

	let joined =
		format!("{}/{}", base.as_str().trim_end_matches('/'), target.trim_start_matches('/'));

	Url::parse(&joined).map_err(invalid)
}
