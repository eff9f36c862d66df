//! Transparent request sanitization.
//!
//! This crate wraps an inbound request in a decorator that neutralizes
//! embedded markup and script payloads on every read surface, without
//! changing the interface handlers program against:
//! - **Parameters and headers**: sanitized on every lookup, names included
//! - **Body**: read from the transport once, sanitized once, replayable forever
//! - **Binary payloads**: exempt content types (multipart by default) pass
//!   through byte for byte
//! - **Escape hatch**: the raw request stays reachable for the rare call site
//!   that needs it
//!
//! # Core Types
//!
//! - [`SanitizingRequest`]: The decorator; implements [`web::HostRequest`]
//! - [`Sanitizer`]: The injected text sanitization capability
//! - [`MarkupStripper`]: The built-in sanitizer
//! - [`ExemptionPolicy`]: Content types whose bodies bypass sanitization
//! - [`RequestSanitizer`]: Shared factory configured once at startup
//! - [`SanitizeConfig`]: TOML configuration for the factory
//!
//! # Examples
//!
//! ```
//! use std::io::Read;
//! use request_sanitizer::web::{HostRequest, RequestAdapter};
//! use request_sanitizer::RequestSanitizer;
//!
//! let factory = RequestSanitizer::default();
//!
//! let raw = RequestAdapter::new()
//!     .with_content_type("application/json")
//!     .with_header("User-Agent", "<script>x()</script>curl")
//!     .with_body(r#"{"bio":"<img src=x onerror=alert(1)>hi"}"#);
//!
//! let mut request = factory.wrap(raw);
//! assert_eq!(request.header("user-agent").as_deref(), Some("curl"));
//!
//! let mut body = String::new();
//! request.body()?.read_to_string(&mut body)?;
//! assert_eq!(body, r#"{"bio":"hi"}"#);
//! # Ok::<(), std::io::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod body;
mod config;
mod error;
mod factory;
mod policy;
mod sanitized;
mod sanitizer;
pub mod web;

#[cfg(test)]
mod test_utils;

pub use config::SanitizeConfig;
pub use error::{BodyError, ConfigError};
pub use factory::RequestSanitizer;
pub use policy::{BodyDecision, BypassReason, ExemptionPolicy, MULTIPART_FORM_DATA};
pub use sanitized::SanitizingRequest;
pub use sanitizer::{FnSanitizer, MarkupStripper, PassthroughSanitizer, Sanitizer};
