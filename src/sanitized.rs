use std::borrow::Cow;
use std::io::{self, Cursor, Read};
use std::sync::Arc;

use crate::body::{read_to_limit, BufferedBody};
use crate::error::BodyError;
use crate::policy::{BodyDecision, ExemptionPolicy};
use crate::sanitizer::Sanitizer;
use crate::web::{HostRequest, ParameterMap};

/// A request decorator that sanitizes every textual read surface.
///
/// `SanitizingRequest` implements [`HostRequest`] over another `HostRequest`
/// and passes parameter values, header values and the body through a
/// [`Sanitizer`]. Handlers receive it in place of the raw request.
///
/// # Body Handling
///
/// - No content type, or an exempt one (see [`ExemptionPolicy`]): the
///   original stream is returned untouched. Re-reading follows the host's own
///   semantics, which for a transport stream means a single read.
/// - Otherwise the first read pulls the whole stream into memory, sanitizes
///   it as UTF-8 text and keeps the result. Every read, the first included,
///   gets a fresh stream over those bytes.
///
/// A body that is not valid UTF-8 is rejected with [`BodyError::NotUtf8`]
/// (surfacing as [`io::ErrorKind::InvalidData`]) rather than passed through
/// unsanitized. The declared charset is not consulted, so a `text/plain;
/// charset=ISO-8859-1` body with non-ASCII bytes fails too. Exempt such
/// content types through the [`ExemptionPolicy`] to receive them raw.
///
/// The whole body is held in memory. Set a cap with
/// [`with_max_body_bytes`](Self::with_max_body_bytes) when bodies may be large.
///
/// If buffering fails the error is returned and nothing is kept. The
/// transport may have been partially consumed, so a retry is not guaranteed
/// to see the full body.
///
/// # Parameters and Headers
///
/// Sanitized on every call, not cached. Lookups by name sanitize the name
/// before the lookup, so a name carrying markup does not match its literal
/// key. Blank values (empty or whitespace) come back unchanged and absent
/// values stay `None`.
///
/// # Concurrency
///
/// One decorator per request. Body access takes `&mut self`, so the
/// buffer-once step can never race.
///
/// # Examples
///
/// ```
/// use std::io::Read;
/// use request_sanitizer::web::{HostRequest, RequestAdapter};
/// use request_sanitizer::{MarkupStripper, SanitizingRequest};
///
/// let raw = RequestAdapter::new()
///     .with_content_type("application/json")
///     .with_param("name", "<script>alert(1)</script>bob")
///     .with_body(r#"{"name":"<script>alert(1)</script>"}"#);
///
/// let mut request = SanitizingRequest::new(raw, MarkupStripper::new());
/// assert_eq!(request.parameter("name").as_deref(), Some("bob"));
///
/// for _ in 0..2 {
///     let mut body = String::new();
///     request.body().unwrap().read_to_string(&mut body).unwrap();
///     assert_eq!(body, r#"{"name":""}"#);
/// }
/// assert_eq!(request.original().body_reads(), 1);
/// ```
#[derive(Debug)]
pub struct SanitizingRequest<R, S> {
    inner: R,
    sanitizer: S,
    policy: Arc<ExemptionPolicy>,
    max_body_bytes: Option<usize>,
    body: BufferedBody,
}

impl<R: HostRequest, S: Sanitizer> SanitizingRequest<R, S> {
    /// Wraps `inner` with the default exemption policy.
    ///
    /// Nothing is read or sanitized until an accessor is called.
    pub fn new(inner: R, sanitizer: S) -> Self {
        Self::with_policy(inner, sanitizer, ExemptionPolicy::default())
    }

    /// Wraps `inner` with an explicit exemption policy.
    pub fn with_policy(inner: R, sanitizer: S, policy: impl Into<Arc<ExemptionPolicy>>) -> Self {
        Self {
            inner,
            sanitizer,
            policy: policy.into(),
            max_body_bytes: None,
            body: BufferedBody::default(),
        }
    }

    /// Caps the size of a buffered body.
    ///
    /// A larger body fails with [`BodyError::TooLarge`] instead of buffering.
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = Some(limit);
        self
    }

    pub(crate) fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Returns the undecorated request.
    pub fn original(&self) -> &R {
        &self.inner
    }

    /// Returns the undecorated request mutably.
    ///
    /// Reading the body through it bypasses sanitization and may consume the
    /// transport before the decorator buffers it.
    pub fn original_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Unwraps the decorator, discarding any buffered body.
    pub fn into_original(self) -> R {
        self.inner
    }

    /// Returns the exemption policy in effect.
    pub fn policy(&self) -> &ExemptionPolicy {
        &self.policy
    }

    /// Returns the sanitizer in use.
    pub fn sanitizer(&self) -> &S {
        &self.sanitizer
    }

    /// Returns `true` once the sanitized body has been buffered.
    pub fn is_buffered(&self) -> bool {
        self.body.is_ready()
    }

    /// Returns the buffered sanitized body, if any.
    pub fn buffered_body(&self) -> Option<&[u8]> {
        self.body.get()
    }

    fn clean<'a>(&self, value: Cow<'a, str>) -> Cow<'a, str> {
        match value {
            Cow::Borrowed(v) => self.sanitizer.sanitize(v),
            Cow::Owned(v) => Cow::Owned(self.sanitizer.sanitize(&v).into_owned()),
        }
    }

    fn clean_unless_blank<'a>(&self, value: Cow<'a, str>) -> Cow<'a, str> {
        if value.trim().is_empty() {
            value
        } else {
            self.clean(value)
        }
    }

    fn lookup_name<'n>(&self, name: &'n str) -> Cow<'n, str> {
        let clean = self.sanitizer.sanitize(name);
        if let Cow::Owned(ref rewritten) = clean {
            tracing::trace!(
                before = name.len(),
                after = rewritten.len(),
                "lookup name rewritten by sanitizer"
            );
        }
        clean
    }
}

fn buffer_sanitized<R, S>(
    inner: &mut R,
    sanitizer: &S,
    limit: Option<usize>,
) -> Result<Vec<u8>, BodyError>
where
    R: HostRequest,
    S: Sanitizer,
{
    let raw = read_to_limit(inner.body().map_err(BodyError::Transport)?, limit)?;
    let bytes_in = raw.len();

    let text = std::str::from_utf8(&raw).map_err(|e| BodyError::NotUtf8 {
        valid_up_to: e.valid_up_to(),
    })?;
    // Unchanged text keeps the raw buffer instead of copying it.
    let rewritten = match sanitizer.sanitize(text) {
        Cow::Owned(clean) => Some(clean.into_bytes()),
        Cow::Borrowed(_) => None,
    };
    let clean = rewritten.unwrap_or(raw);

    tracing::debug!(bytes_in, bytes_out = clean.len(), "buffered sanitized request body");
    Ok(clean)
}

impl<R: HostRequest, S: Sanitizer> HostRequest for SanitizingRequest<R, S> {
    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        let name = self.lookup_name(name);
        let value = self.inner.header(&name)?;
        Some(self.clean_unless_blank(value))
    }

    /// Forwards the raw content type; it drives the exemption decision.
    fn content_type(&self) -> Option<Cow<'_, str>> {
        self.inner.content_type()
    }

    fn parameter(&self, name: &str) -> Option<Cow<'_, str>> {
        let name = self.lookup_name(name);
        let value = self.inner.parameter(&name)?;
        Some(self.clean_unless_blank(value))
    }

    fn parameter_values(&self, name: &str) -> Option<Vec<Cow<'_, str>>> {
        let values = self.inner.parameter_values(name)?;
        if values.is_empty() {
            return None;
        }
        Some(values.into_iter().map(|value| self.clean(value)).collect())
    }

    fn parameter_map(&self) -> ParameterMap {
        self.inner
            .parameter_map()
            .into_iter()
            .map(|(name, values)| {
                let values = values
                    .into_iter()
                    .map(|value| self.clean(Cow::Owned(value)).into_owned())
                    .collect();
                (name, values)
            })
            .collect()
    }

    fn body(&mut self) -> io::Result<Box<dyn Read + '_>> {
        let decision = self.policy.decide(self.inner.content_type().as_deref());
        if let BodyDecision::Bypass(reason) = decision {
            tracing::debug!(%reason, "request body passed through unsanitized");
            return self.inner.body();
        }

        let Self {
            inner,
            sanitizer,
            max_body_bytes,
            body,
            ..
        } = self;
        let bytes = body
            .get_or_try_fill(|| buffer_sanitized(inner, &*sanitizer, *max_body_bytes))
            .map_err(|err| {
                tracing::warn!(error = %err, "failed to buffer request body");
                io::Error::from(err)
            })?;

        Ok(Box::new(Cursor::new(bytes)))
    }

    fn wrapped(&self) -> Option<&dyn HostRequest> {
        Some(&self.inner)
    }
}
