//! Request-scoped construction.
//!
//! One [`RequestScope`] accompanies each request. The first call to
//! [`RequestScope::gateway`] runs the capture pipeline; every later call
//! returns the same instance. There is no process-wide instance, no
//! rebuild, and no way for two requests to see each other's input.
//!
//! Collaborators (normalizer, filter, address validator) are swappable
//! until the first `gateway()` call. Afterwards the gateway is fixed.

use std::cell::{Cell, OnceCell};
use std::fmt;

use crate::config::{GatewayConfig, SecurityConfig};
use crate::filter::{ScriptFilter, XssFilter};
use crate::gateway::InputGateway;
use crate::ip::{AddrValidator, IpValidator};
use crate::normalize::{TextNormalizer, UnicodeCleaner};
use crate::request::RawRequest;

/// Everything capture consumes. Taken out of the scope exactly once.
struct Parts {
    raw: RawRequest,
    security: SecurityConfig,
    normalizer: Box<dyn TextNormalizer>,
    filter: Box<dyn XssFilter>,
    ip_validator: Box<dyn IpValidator>,
}

impl Default for Parts {
    fn default() -> Self {
        Self {
            raw: RawRequest::new(),
            security: SecurityConfig::default(),
            normalizer: Box::new(UnicodeCleaner::new()),
            filter: Box::new(ScriptFilter::new()),
            ip_validator: Box::new(AddrValidator::new()),
        }
    }
}

/// Owns one request's raw input until the gateway is first needed, then
/// owns the gateway.
///
/// The scope is `Send` but deliberately not `Sync`; hand the whole scope
/// to the task serving the request, or share the `&InputGateway` it
/// returns, which is `Sync`.
///
/// # Examples
///
/// ```
/// use input_gateway::{GatewayConfig, RawRequest, RequestScope};
///
/// let mut raw = RawRequest::new();
/// raw.add_query("page", "2");
///
/// let scope = RequestScope::new(raw, &GatewayConfig::default());
/// let gateway = scope.gateway();
/// assert_eq!(gateway.query("page").unwrap().as_text(), Some("2"));
///
/// // Repeat calls return the same instance.
/// assert!(std::ptr::eq(scope.gateway(), scope.gateway()));
/// ```
pub struct RequestScope {
    parts: Cell<Parts>,
    gateway: OnceCell<InputGateway>,
}

impl RequestScope {
    /// Creates a scope with the default collaborators: Unicode
    /// normalization, script filtering and both-family address
    /// validation.
    pub fn new(raw: RawRequest, config: &GatewayConfig) -> Self {
        Self {
            parts: Cell::new(Parts {
                raw,
                security: config.security,
                ..Parts::default()
            }),
            gateway: OnceCell::new(),
        }
    }

    /// Replaces the normalizer used at capture.
    ///
    /// Has no effect once the gateway has been built.
    pub fn with_normalizer(mut self, normalizer: impl TextNormalizer + 'static) -> Self {
        self.parts.get_mut().normalizer = Box::new(normalizer);
        self
    }

    /// Replaces the XSS filter used at capture and for lazy reads.
    ///
    /// Has no effect once the gateway has been built.
    pub fn with_filter(mut self, filter: impl XssFilter + 'static) -> Self {
        self.parts.get_mut().filter = Box::new(filter);
        self
    }

    /// Replaces the client address validator.
    ///
    /// Has no effect once the gateway has been built.
    pub fn with_ip_validator(mut self, validator: impl IpValidator + 'static) -> Self {
        self.parts.get_mut().ip_validator = Box::new(validator);
        self
    }

    /// The gateway for this request, capturing on first use.
    pub fn gateway(&self) -> &InputGateway {
        self.gateway.get_or_init(|| {
            let parts = self.parts.take();
            InputGateway::capture(
                parts.raw,
                &parts.security,
                parts.normalizer.as_ref(),
                parts.filter,
                parts.ip_validator,
            )
        })
    }

    /// True once the capture pipeline has run.
    pub fn is_captured(&self) -> bool {
        self.gateway.get().is_some()
    }
}

impl fmt::Debug for RequestScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestScope")
            .field("captured", &self.is_captured())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::PassthroughFilter;
    use crate::normalize::PassthroughNormalizer;
    use crate::value::Value;

    fn single_query(key: &str, value: &str) -> RawRequest {
        let mut raw = RawRequest::new();
        raw.add_query(key, value);
        raw
    }

    #[test]
    fn scope_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<RequestScope>();
    }

    #[test]
    fn capture_is_lazy_and_idempotent() {
        let scope = RequestScope::new(single_query("q", "x"), &GatewayConfig::default());
        assert!(!scope.is_captured());

        let first: *const InputGateway = scope.gateway();
        assert!(scope.is_captured());
        let second: *const InputGateway = scope.gateway();
        assert_eq!(first, second);
    }

    #[test]
    fn default_collaborators_filter_and_normalize() {
        let raw = single_query("q", "he\u{0301}llo<script>alert(1)</script>");
        let scope = RequestScope::new(raw, &GatewayConfig::default());

        assert_eq!(
            scope.gateway().query("q").unwrap().as_text(),
            Some("h\u{e9}llo")
        );
    }

    #[test]
    fn swapped_filter_is_used() {
        let raw = single_query("q", "<script>kept</script>");
        let scope = RequestScope::new(raw, &GatewayConfig::default())
            .with_filter(PassthroughFilter::new());

        assert_eq!(
            scope.gateway().query("q").unwrap().as_text(),
            Some("<script>kept</script>")
        );
    }

    #[test]
    fn swapped_normalizer_is_used() {
        let raw = single_query("q", "zero\u{200B}width");
        let scope = RequestScope::new(raw, &GatewayConfig::default())
            .with_normalizer(PassthroughNormalizer::new());

        assert_eq!(
            scope.gateway().query_raw("q").and_then(Value::as_text),
            Some("zero\u{200B}width")
        );
    }

    #[test]
    fn swapped_ip_validator_is_used() {
        struct RejectAll;
        impl crate::ip::IpValidator for RejectAll {
            fn is_valid(&self, _: &str) -> bool {
                false
            }
        }

        let mut raw = RawRequest::new();
        raw.add_server("REMOTE_ADDR", "203.0.113.7");
        let scope = RequestScope::new(raw, &GatewayConfig::default()).with_ip_validator(RejectAll);

        assert_eq!(scope.gateway().client_ip(), None);
    }

    #[test]
    fn config_toggle_flows_through() {
        let config =
            GatewayConfig::from_toml_str("[security]\nglobal_xss_filtering = false\n").unwrap();
        let scope = RequestScope::new(single_query("q", "x"), &config);

        assert!(!scope.gateway().global_filtering());
    }

    #[test]
    fn late_builder_calls_do_not_touch_a_built_gateway() {
        let raw = single_query("q", "a<script>b</script>");
        let scope = RequestScope::new(raw, &GatewayConfig::default());
        assert_eq!(scope.gateway().query("q").unwrap().as_text(), Some("a"));

        let scope = scope.with_filter(PassthroughFilter::new());
        assert_eq!(scope.gateway().query("q").unwrap().as_text(), Some("a"));
    }
}
