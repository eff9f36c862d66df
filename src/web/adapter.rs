//! In-memory host request.

use std::borrow::Cow;
use std::io::{self, Cursor, Read};

use super::{HostRequest, ParameterMap, CONTENT_TYPE};

/// A host request assembled from owned parts.
///
/// `RequestAdapter` is the simplest [`HostRequest`]: hosts that already parse
/// requests into their own types copy the pieces in, and tests use it as a
/// fake transport.
///
/// # Design Notes
///
/// The body behaves like a transport stream: it can be read once. Every call
/// to [`body`](HostRequest::body) hands out the same underlying cursor, so a
/// second read after the first consumed everything yields no bytes.
/// [`body_reads`](Self::body_reads) counts how often the stream was requested.
///
/// Header names are case-insensitive. Parameter names are case-sensitive.
///
/// # Examples
///
/// ```
/// use std::io::Read;
/// use request_sanitizer::web::{HostRequest, RequestAdapter};
///
/// let mut request = RequestAdapter::new()
///     .with_content_type("application/json")
///     .with_param("q", "rust")
///     .with_body(r#"{"a":1}"#);
///
/// assert_eq!(request.header("Content-Type").as_deref(), Some("application/json"));
/// assert_eq!(request.parameter("q").as_deref(), Some("rust"));
///
/// let mut first = String::new();
/// request.body().unwrap().read_to_string(&mut first).unwrap();
/// assert_eq!(first, r#"{"a":1}"#);
///
/// // The stream is spent.
/// let mut second = String::new();
/// request.body().unwrap().read_to_string(&mut second).unwrap();
/// assert!(second.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestAdapter {
    /// Headers in arrival order (names compared case-insensitively)
    headers: Vec<(String, String)>,
    /// Query and form parameters
    params: ParameterMap,
    /// Single-read body stream
    body: Cursor<Vec<u8>>,
    /// Number of times the body stream was requested
    body_reads: usize,
}

impl RequestAdapter {
    /// Creates an empty request with no headers, parameters, or body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header. Repeated names keep every value.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Appends a value to the parameter `name`.
    pub fn add_query_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.append(name, value);
    }

    /// Sets the parameter `name` to exactly `values`, which may be empty.
    pub fn set_param_values(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.params.insert(name, values);
    }

    /// Replaces the body and rewinds the stream.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = Cursor::new(body.into());
    }

    /// Builder form of [`add_header`](Self::add_header).
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_header(name, value);
        self
    }

    /// Builder form of [`add_header`](Self::add_header) for the content type.
    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header(CONTENT_TYPE, content_type)
    }

    /// Builder form of [`add_query_param`](Self::add_query_param).
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_query_param(name, value);
        self
    }

    /// Builder form of [`set_body`](Self::set_body).
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.set_body(body);
        self
    }

    /// Returns how many times the body stream was requested.
    pub fn body_reads(&self) -> usize {
        self.body_reads
    }

    /// Returns the number of body bytes not yet consumed.
    pub fn body_remaining(&self) -> usize {
        let len = self.body.get_ref().len();
        let pos = usize::try_from(self.body.position()).unwrap_or(len);
        len.saturating_sub(pos)
    }
}

impl HostRequest for RequestAdapter {
    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, value)| Cow::Borrowed(value.as_str()))
    }

    fn parameter_values(&self, name: &str) -> Option<Vec<Cow<'_, str>>> {
        self.params
            .get(name)
            .map(|values| values.iter().map(|v| Cow::Borrowed(v.as_str())).collect())
    }

    fn parameter_map(&self) -> ParameterMap {
        self.params.clone()
    }

    fn body(&mut self) -> io::Result<Box<dyn Read + '_>> {
        self.body_reads += 1;
        Ok(Box::new(&mut self.body))
    }
}
