//! Request and response interceptors that keep every call authenticated.
//!
//! [`RequestInterceptor`] attaches `Authorization: Bearer <credential>` to outgoing requests.
//! [`ResponseInterceptor`] watches outcomes and evicts the cached credential when the server
//! answers `401 Unauthorized`. Both share a [`Session`](crate::session::Session) so the
//! credential they read is the one they evict. Neither performs navigation or retries, and
//! neither ever fails a request on its own.

pub mod request;
pub mod response;

pub use request::RequestInterceptor;
pub use response::ResponseInterceptor;
