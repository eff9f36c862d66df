use std::fmt;
use std::sync::Arc;

use crate::config::SanitizeConfig;
use crate::policy::ExemptionPolicy;
use crate::sanitized::SanitizingRequest;
use crate::sanitizer::{MarkupStripper, Sanitizer};
use crate::web::HostRequest;

/// Shared factory for [`SanitizingRequest`]s.
///
/// `RequestSanitizer` holds the sanitization engine and the settings every
/// request uses. Build one at startup, clone it freely (clones share the
/// engine), and call [`wrap`](Self::wrap) once per inbound request.
///
/// # Examples
///
/// ```
/// use request_sanitizer::web::{HostRequest, RequestAdapter};
/// use request_sanitizer::{MarkupStripper, RequestSanitizer};
///
/// let factory = RequestSanitizer::new(MarkupStripper::new())
///     .exempt("application/octet-stream")
///     .max_body_bytes(64 * 1024);
///
/// let request = factory.wrap(RequestAdapter::new().with_header("x-name", "<i>al</i>"));
/// assert_eq!(request.header("x-name").as_deref(), Some("al"));
/// assert!(request.policy().is_exempt("application/octet-stream"));
/// ```
pub struct RequestSanitizer<S: ?Sized> {
    sanitizer: Arc<S>,
    policy: Arc<ExemptionPolicy>,
    max_body_bytes: Option<usize>,
}

impl<S: Sanitizer> RequestSanitizer<S> {
    /// Creates a factory around `sanitizer` with the default exemption policy.
    pub fn new(sanitizer: S) -> Self {
        Self::from_shared(Arc::new(sanitizer))
    }
}

impl<S: Sanitizer + ?Sized> RequestSanitizer<S> {
    /// Creates a factory around an already shared sanitizer.
    ///
    /// Accepts `Arc<dyn Sanitizer>` for engines chosen at runtime.
    pub fn from_shared(sanitizer: Arc<S>) -> Self {
        Self {
            sanitizer,
            policy: Arc::new(ExemptionPolicy::default()),
            max_body_bytes: None,
        }
    }

    /// Replaces the exemption policy and body cap with those in `config`.
    pub fn with_config(mut self, config: &SanitizeConfig) -> Self {
        self.policy = Arc::new(config.exemption_policy());
        self.max_body_bytes = config.max_body_bytes;
        self
    }

    /// Replaces the exemption policy.
    pub fn with_policy(mut self, policy: ExemptionPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Adds an exempt media type prefix to the policy.
    pub fn exempt(mut self, media_type: impl Into<String>) -> Self {
        self.policy = Arc::new(self.policy.as_ref().clone().exempt(media_type));
        self
    }

    /// Caps the size of buffered bodies.
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = Some(limit);
        self
    }

    /// Returns the exemption policy applied to wrapped requests.
    pub fn policy(&self) -> &ExemptionPolicy {
        &self.policy
    }

    /// Returns the shared sanitizer.
    pub fn sanitizer(&self) -> &Arc<S> {
        &self.sanitizer
    }

    /// Decorates `request`. Nothing is read until an accessor is called.
    pub fn wrap<R: HostRequest>(&self, request: R) -> SanitizingRequest<R, Arc<S>> {
        SanitizingRequest::with_policy(request, Arc::clone(&self.sanitizer), Arc::clone(&self.policy))
            .with_limit(self.max_body_bytes)
    }
}

impl RequestSanitizer<MarkupStripper> {
    /// Creates a factory with the built-in [`MarkupStripper`] configured by `config`.
    pub fn from_config(config: &SanitizeConfig) -> Self {
        Self::default().with_config(config)
    }
}

impl Default for RequestSanitizer<MarkupStripper> {
    fn default() -> Self {
        Self::new(MarkupStripper::new())
    }
}

impl<S: ?Sized> Clone for RequestSanitizer<S> {
    fn clone(&self) -> Self {
        Self {
            sanitizer: Arc::clone(&self.sanitizer),
            policy: Arc::clone(&self.policy),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

impl<S: ?Sized> fmt::Debug for RequestSanitizer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSanitizer")
            .field("policy", &self.policy)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitizer::PassthroughSanitizer;
    use crate::test_utils::SpySanitizer;
    use crate::web::RequestAdapter;
    use std::io::Read;

    #[test]
    fn default_factory_strips_markup() {
        let factory = RequestSanitizer::default();
        let request = factory.wrap(RequestAdapter::new().with_param("q", "<b>x</b>"));
        assert_eq!(request.parameter("q").as_deref(), Some("x"));
        assert_eq!(factory.policy(), &ExemptionPolicy::default());
    }

    #[test]
    fn clones_share_the_engine() {
        let factory = RequestSanitizer::new(SpySanitizer::new());
        let clone = factory.clone();

        let request = clone.wrap(RequestAdapter::new().with_header("h", "v"));
        request.header("h");

        assert!(Arc::ptr_eq(factory.sanitizer(), clone.sanitizer()));
        assert_eq!(factory.sanitizer().calls(), 2);
    }

    #[test]
    fn exempt_does_not_affect_existing_clones() {
        let base = RequestSanitizer::new(PassthroughSanitizer);
        let extended = base.clone().exempt("image/");

        assert!(!base.policy().is_exempt("image/png"));
        assert!(extended.policy().is_exempt("image/png"));
        assert!(extended.policy().is_exempt("multipart/form-data"));
    }

    #[test]
    fn config_sets_policy_and_cap() {
        let config = SanitizeConfig {
            exempt_content_types: vec!["text/csv".to_string()],
            max_body_bytes: Some(3),
        };
        let factory = RequestSanitizer::from_config(&config);
        assert!(factory.policy().is_exempt("text/csv"));
        assert!(!factory.policy().is_exempt("multipart/form-data"));

        let mut request = factory.wrap(
            RequestAdapter::new()
                .with_content_type("text/plain")
                .with_body("toolong"),
        );
        assert!(request.body().is_err());
    }

    #[test]
    fn dyn_sanitizer_can_be_shared() {
        let engine: Arc<dyn Sanitizer> = Arc::new(MarkupStripper::new());
        let factory = RequestSanitizer::from_shared(engine);

        let mut request = factory.wrap(
            RequestAdapter::new()
                .with_content_type("text/plain")
                .with_body("<u>ok</u>"),
        );
        let mut body = String::new();
        request.body().unwrap().read_to_string(&mut body).unwrap();
        assert_eq!(body, "ok");
    }

    #[test]
    fn with_policy_replaces_defaults() {
        let factory = RequestSanitizer::default().with_policy(ExemptionPolicy::none());
        assert!(factory.policy().entries().is_empty());
    }

    #[test]
    fn factory_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RequestSanitizer<MarkupStripper>>();
        assert_send_sync::<RequestSanitizer<dyn Sanitizer>>();
    }
}
