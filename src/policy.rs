use std::fmt;

/// Media type of HTML multipart form submissions.
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Why a body was passed through without buffering or sanitization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassReason {
    /// The request declares no content type.
    NoContentType,
    /// The declared content type matches an exempt media type.
    Exempt,
}

impl fmt::Display for BypassReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BypassReason::NoContentType => write!(f, "no content type"),
            BypassReason::Exempt => write!(f, "exempt content type"),
        }
    }
}

/// Outcome of evaluating a request's content type against an [`ExemptionPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyDecision {
    /// Hand the original stream to the caller untouched.
    Bypass(BypassReason),
    /// Buffer the body once and sanitize it.
    Sanitize,
}

/// Content-type exemption policy.
///
/// Lists the media types whose bodies are never buffered or sanitized. Binary
/// payloads such as multipart uploads would be corrupted by text
/// sanitization, and consumers do not interpret them as markup.
///
/// Entries match as case-insensitive prefixes of the declared content type,
/// so `multipart/form-data` also covers `multipart/form-data; boundary=X`.
///
/// # Examples
///
/// ```
/// use request_sanitizer::{BodyDecision, BypassReason, ExemptionPolicy};
///
/// let policy = ExemptionPolicy::default().exempt("application/octet-stream");
///
/// assert_eq!(
///     policy.decide(Some("multipart/form-data; boundary=X")),
///     BodyDecision::Bypass(BypassReason::Exempt)
/// );
/// assert_eq!(policy.decide(Some("application/json")), BodyDecision::Sanitize);
/// assert_eq!(policy.decide(None), BodyDecision::Bypass(BypassReason::NoContentType));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExemptionPolicy {
    entries: Vec<String>,
}

impl ExemptionPolicy {
    /// Creates a policy that exempts nothing.
    ///
    /// Requests without a content type still bypass; see [`decide`](Self::decide).
    pub fn none() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds an exempt media type prefix, deduplicating identical entries.
    ///
    /// Returns the updated policy to allow method chaining.
    pub fn exempt(mut self, media_type: impl Into<String>) -> Self {
        let entry = media_type.into().trim().to_ascii_lowercase();
        if !entry.is_empty() && !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
        self
    }

    /// Returns the exempt media type prefixes, lowercased, in insertion order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Returns `true` if `content_type` starts with any exempt entry.
    pub fn is_exempt(&self, content_type: &str) -> bool {
        let declared = content_type.trim_start().as_bytes();
        self.entries.iter().any(|entry| {
            declared.len() >= entry.len()
                && declared[..entry.len()].eq_ignore_ascii_case(entry.as_bytes())
        })
    }

    /// Decides how the body of a request with this content type is handled.
    ///
    /// A missing content type always bypasses, whatever the entries.
    pub fn decide(&self, content_type: Option<&str>) -> BodyDecision {
        match content_type {
            None => BodyDecision::Bypass(BypassReason::NoContentType),
            Some(ct) if self.is_exempt(ct) => BodyDecision::Bypass(BypassReason::Exempt),
            Some(_) => BodyDecision::Sanitize,
        }
    }
}

impl Default for ExemptionPolicy {
    /// Exempts `multipart/form-data` only.
    fn default() -> Self {
        Self::none().exempt(MULTIPART_FORM_DATA)
    }
}

impl<S: Into<String>> FromIterator<S> for ExemptionPolicy {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), |policy, entry| policy.exempt(entry))
    }
}
