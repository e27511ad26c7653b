//! HTTP plumbing shared by every endpoint.
//!
//! - [`Request`]: immutable description of one call
//! - [`Transport`]: sends a request, [`HttpTransport`] does so over `reqwest`
//! - [`RetryPolicy`]: attaches the token and handles 429 and 401
//! - [`Paginator`]: walks paged collections lazily

#[cfg(test)]
pub(crate) mod mock;
pub mod pagination;
pub mod request;
pub mod retry;
pub mod transport;

pub use pagination::{Cursor, Page, Paginator};
pub use request::{Body, Request};
pub use retry::RetryPolicy;
pub use transport::{HttpTransport, Transport};
