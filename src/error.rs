//! Crate-level error types shared across the client, interceptors, and stores.

// self
use crate::{_prelude::*, http::HttpResponse};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Interceptors never convert one variant into another; a failure observed by the response
/// interceptor reaches the caller exactly as the transport or status check produced it.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Server answered with a status outside the accepted range.
	#[error("Request failed with status code {}.", response.status().as_u16())]
	Status {
		/// Full response, preserved unchanged for the caller.
		response: HttpResponse,
	},
	/// Response body could not be decoded as the requested JSON shape.
	#[error("Response body is not valid JSON for the requested type.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the decoded response.
		status: u16,
	},
}
impl Error {
	/// Returns the HTTP status code carried by the failure, if a response was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { response } => Some(response.status().as_u16()),
			Self::Decode { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Returns the failed response, if the server answered at all.
	pub fn response(&self) -> Option<&HttpResponse> {
		match self {
			Self::Status { response } => Some(response),
			_ => None,
		}
	}

	/// Returns `true` when the server rejected the credential with `401 Unauthorized`.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Status { response } if response.status() == ::http::StatusCode::UNAUTHORIZED)
	}
}

/// Configuration and validation failures raised before a request leaves the process.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL `{value}` is invalid.")]
	InvalidBaseUrl {
		/// Raw value that failed to parse.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL cannot serve as a base for relative targets.
	#[error("Base URL `{value}` cannot be used as a base for relative targets.")]
	CannotBeABase {
		/// Offending value.
		value: String,
	},
	/// Request target cannot be resolved into an absolute URL.
	#[error("Request target `{target}` is invalid.")]
	InvalidTarget {
		/// Raw target supplied by the caller.
		target: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized as JSON.")]
	BodySerialization(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO). These never carry an HTTP status.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while sending the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Caller-supplied deadline elapsed before the response arrived.
	#[error("Request timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while sending the request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
