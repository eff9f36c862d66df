//! The host request capability set.
//!
//! This module defines the boundary between a host's request type and the
//! sanitizing decorator. Anything implementing [`HostRequest`] can be wrapped,
//! and the decorator implements it too, so it can stand in wherever a request
//! is expected.

use std::borrow::Cow;
use std::io::{self, BufRead, BufReader, Read};

use super::ParameterMap;

/// Name of the content type header.
pub const CONTENT_TYPE: &str = "content-type";

/// Read accessors of an inbound request.
///
/// Values are returned as `Cow` so a host can lend values it already holds
/// while a decorator returns freshly sanitized, owned values through the same
/// signature.
///
/// Absence is always `None`, distinct from an empty value or an empty list.
///
/// # Design Notes
///
/// The trait is object safe. [`wrapped`](HostRequest::wrapped) is the tag that
/// lets [`original_request`] find the innermost request without inspecting
/// concrete types.
///
/// # Examples
///
/// ```
/// use std::borrow::Cow;
/// use std::io::{self, Read};
/// use request_sanitizer::web::{HostRequest, ParameterMap};
///
/// struct Ping;
///
/// impl HostRequest for Ping {
///     fn header(&self, _name: &str) -> Option<Cow<'_, str>> {
///         None
///     }
///     fn parameter_values(&self, name: &str) -> Option<Vec<Cow<'_, str>>> {
///         (name == "echo").then(|| vec![Cow::Borrowed("pong")])
///     }
///     fn parameter_map(&self) -> ParameterMap {
///         [("echo", vec!["pong".to_string()])].into_iter().collect()
///     }
///     fn body(&mut self) -> io::Result<Box<dyn Read + '_>> {
///         Ok(Box::new(io::empty()))
///     }
/// }
///
/// assert_eq!(Ping.parameter("echo").as_deref(), Some("pong"));
/// assert!(Ping.content_type().is_none());
/// ```
pub trait HostRequest {
    /// Returns the first value of the header `name`.
    fn header(&self, name: &str) -> Option<Cow<'_, str>>;

    /// Returns the declared content type.
    fn content_type(&self) -> Option<Cow<'_, str>> {
        self.header(CONTENT_TYPE)
    }

    /// Returns the first value of the parameter `name`.
    fn parameter(&self, name: &str) -> Option<Cow<'_, str>> {
        self.parameter_values(name)
            .and_then(|values| values.into_iter().next())
    }

    /// Returns every value of the parameter `name`, in request order.
    fn parameter_values(&self, name: &str) -> Option<Vec<Cow<'_, str>>>;

    /// Returns all parameters, in the order the host exposes them.
    fn parameter_map(&self) -> ParameterMap;

    /// Returns the request body as a byte stream.
    ///
    /// Whether the stream can be obtained more than once is up to the
    /// implementation. Transport streams are typically single-read.
    fn body(&mut self) -> io::Result<Box<dyn Read + '_>>;

    /// Returns the request body as buffered text lines.
    fn reader(&mut self) -> io::Result<Box<dyn BufRead + '_>> {
        Ok(Box::new(BufReader::new(self.body()?)))
    }

    /// Returns the request this one decorates, if any.
    fn wrapped(&self) -> Option<&dyn HostRequest> {
        None
    }
}

impl<R: HostRequest + ?Sized> HostRequest for &mut R {
    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        (**self).header(name)
    }

    fn content_type(&self) -> Option<Cow<'_, str>> {
        (**self).content_type()
    }

    fn parameter(&self, name: &str) -> Option<Cow<'_, str>> {
        (**self).parameter(name)
    }

    fn parameter_values(&self, name: &str) -> Option<Vec<Cow<'_, str>>> {
        (**self).parameter_values(name)
    }

    fn parameter_map(&self) -> ParameterMap {
        (**self).parameter_map()
    }

    fn body(&mut self) -> io::Result<Box<dyn Read + '_>> {
        (**self).body()
    }

    fn reader(&mut self) -> io::Result<Box<dyn BufRead + '_>> {
        (**self).reader()
    }

    fn wrapped(&self) -> Option<&dyn HostRequest> {
        (**self).wrapped()
    }
}

impl<R: HostRequest + ?Sized> HostRequest for Box<R> {
    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        (**self).header(name)
    }

    fn content_type(&self) -> Option<Cow<'_, str>> {
        (**self).content_type()
    }

    fn parameter(&self, name: &str) -> Option<Cow<'_, str>> {
        (**self).parameter(name)
    }

    fn parameter_values(&self, name: &str) -> Option<Vec<Cow<'_, str>>> {
        (**self).parameter_values(name)
    }

    fn parameter_map(&self) -> ParameterMap {
        (**self).parameter_map()
    }

    fn body(&mut self) -> io::Result<Box<dyn Read + '_>> {
        (**self).body()
    }

    fn reader(&mut self) -> io::Result<Box<dyn BufRead + '_>> {
        (**self).reader()
    }

    fn wrapped(&self) -> Option<&dyn HostRequest> {
        (**self).wrapped()
    }
}

/// Returns the innermost request behind any number of decorators.
///
/// An undecorated request is returned unchanged, so call sites that must see
/// raw input (signature checks over raw values, for instance) can accept
/// either form.
///
/// # Examples
///
/// ```
/// use request_sanitizer::web::{original_request, HostRequest, RequestAdapter};
/// use request_sanitizer::{MarkupStripper, SanitizingRequest};
///
/// let raw = RequestAdapter::new().with_header("x-sig", "<b>raw</b>");
/// let twice = SanitizingRequest::new(
///     SanitizingRequest::new(raw, MarkupStripper::new()),
///     MarkupStripper::new(),
/// );
///
/// assert_eq!(twice.header("x-sig").as_deref(), Some("raw"));
/// assert_eq!(original_request(&twice).header("x-sig").as_deref(), Some("<b>raw</b>"));
/// ```
pub fn original_request(request: &dyn HostRequest) -> &dyn HostRequest {
    let mut current = request;
    while let Some(inner) = current.wrapped() {
        current = inner;
    }
    current
}
