//! [`HostRequest`] for `http::Request`.

use std::borrow::Cow;
use std::io::{self, Read};

use http::header::CONTENT_TYPE;
use http::Request;
use url::form_urlencoded;

use super::{HostRequest, ParameterMap};

/// Exposes an `http::Request` through the [`HostRequest`] capability set.
///
/// Parameters come from the URI query string, decoded once at construction.
/// Form-encoded bodies are left in the body; this adapter does not parse
/// request content.
///
/// Header values that are not valid UTF-8 are decoded lossily rather than
/// reported as absent.
///
/// # Examples
///
/// ```
/// use request_sanitizer::web::{HostRequest, HttpRequestAdapter};
/// use request_sanitizer::{MarkupStripper, SanitizingRequest};
///
/// let request = http::Request::builder()
///     .uri("/search?q=%3Cb%3Erust%3C%2Fb%3E&page=2")
///     .header("content-type", "application/json")
///     .body(&b"{}"[..])
///     .unwrap();
///
/// let sanitized = SanitizingRequest::new(HttpRequestAdapter::new(request), MarkupStripper::new());
/// assert_eq!(sanitized.parameter("q").as_deref(), Some("rust"));
/// assert_eq!(sanitized.parameter("page").as_deref(), Some("2"));
/// ```
#[derive(Debug)]
pub struct HttpRequestAdapter<B> {
    request: Request<B>,
    query: ParameterMap,
}

impl<B: Read> HttpRequestAdapter<B> {
    /// Wraps `request`, decoding its query parameters.
    pub fn new(request: Request<B>) -> Self {
        let mut query = ParameterMap::new();
        if let Some(raw) = request.uri().query() {
            for (name, value) in form_urlencoded::parse(raw.as_bytes()) {
                query.append(name, value);
            }
        }
        Self { request, query }
    }

    /// Returns the wrapped request.
    pub fn request(&self) -> &Request<B> {
        &self.request
    }

    /// Unwraps the adapter, returning the request.
    pub fn into_inner(self) -> Request<B> {
        self.request
    }
}

impl<B: Read> From<Request<B>> for HttpRequestAdapter<B> {
    fn from(request: Request<B>) -> Self {
        Self::new(request)
    }
}

impl<B: Read> HostRequest for HttpRequestAdapter<B> {
    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        self.request
            .headers()
            .get(name)
            .map(|value| String::from_utf8_lossy(value.as_bytes()))
    }

    fn content_type(&self) -> Option<Cow<'_, str>> {
        self.request
            .headers()
            .get(CONTENT_TYPE)
            .map(|value| String::from_utf8_lossy(value.as_bytes()))
    }

    fn parameter_values(&self, name: &str) -> Option<Vec<Cow<'_, str>>> {
        self.query
            .get(name)
            .map(|values| values.iter().map(|v| Cow::Borrowed(v.as_str())).collect())
    }

    fn parameter_map(&self) -> ParameterMap {
        self.query.clone()
    }

    fn body(&mut self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(self.request.body_mut()))
    }
}
