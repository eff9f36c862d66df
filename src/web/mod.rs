//! Host request integration surface.
//!
//! This module is the boundary between a host's request representation and
//! the sanitizing decorator. It provides:
//! - [`HostRequest`]: the read capability set every request exposes
//! - [`ParameterMap`]: the ordered parameter collection
//! - [`RequestAdapter`]: an in-memory request built from owned parts
//! - `HttpRequestAdapter`: `http::Request` integration (feature `http`)
//! - [`original_request`]: the escape hatch to the undecorated request
//!
//! # Design Principles
//!
//! 1. **No Framework Dependencies**: the trait is plain Rust. Framework code
//!    implements it or converts into one of the adapters.
//!
//! 2. **Substitutable**: the decorator implements [`HostRequest`] itself, so
//!    handlers never learn whether they hold a raw or a sanitized request.
//!
//! 3. **Absence is Explicit**: a missing header or parameter is `None`, never
//!    an empty string or an empty list.
//!
//! # Integration Flow
//!
//! ```text
//! Host request
//!   ↓
//! impl HostRequest (own type, RequestAdapter or HttpRequestAdapter)
//!   ↓
//! RequestSanitizer::wrap()
//!   ↓
//! SanitizingRequest (also impl HostRequest)
//!   ↓
//! Handler
//! ```

mod adapter;
mod extract;
#[cfg(feature = "http")]
mod http_request;
mod params;

pub use adapter::RequestAdapter;
pub use extract::{original_request, HostRequest, CONTENT_TYPE};
#[cfg(feature = "http")]
pub use http_request::HttpRequestAdapter;
pub use params::ParameterMap;
