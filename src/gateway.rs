//! Capture pipeline and read API.
//!
//! [`InputGateway`] snapshots one request's input at construction time and
//! answers every later read from that snapshot. Each source is kept twice:
//!
//! - the **raw** side: normalized text, nothing else touched. Key names,
//!   cookie attributes and script payloads survive here.
//! - the **live** side: key-validated, cookie attributes dropped, values
//!   filtered once when global filtering is on.
//!
//! Reads against the live side filter lazily when global filtering is off,
//! so callers get the same protection either way; the difference is only
//! when the filter runs. Whole-collection reads skip the lazy step, which
//! mirrors how bulk reads have always behaved.

use std::fmt;
use std::sync::OnceLock;

use indexmap::IndexMap;
use tracing::debug;

use crate::config::SecurityConfig;
use crate::filter::XssFilter;
use crate::ip::{IpValidator, CLIENT_IP_KEYS};
use crate::keys::{KeyOutcome, KeyPolicy};
use crate::normalize::TextNormalizer;
use crate::request::{RawRequest, Source};
use crate::value::Value;

/// Cookie attributes defined by RFC 2109. They describe the cookie
/// transport itself and never reach the live cookie map.
const COOKIE_ATTRIBUTES: [&str; 3] = ["$Version", "$Path", "$Domain"];

/// Normalized input exactly as it arrived, one value per source.
#[derive(Debug, Clone, Default)]
struct Snapshot {
    query: Value,
    form: Value,
    cookies: Value,
    server: Value,
}

/// One sanitized source: accepted entries plus the single slot where the
/// value of the most recent invalid-keyed entry lands.
#[derive(Debug, Clone, Default)]
struct SourceMap {
    entries: IndexMap<String, Value>,
    rejected: Option<Value>,
}

#[derive(Debug, Clone, Default)]
struct LiveSources {
    query: SourceMap,
    form: SourceMap,
    cookies: SourceMap,
    server: SourceMap,
}

impl LiveSources {
    fn source(&self, source: Source) -> &SourceMap {
        match source {
            Source::Query => &self.query,
            Source::Form => &self.form,
            Source::Cookie => &self.cookies,
            Source::Server => &self.server,
        }
    }
}

/// Request-scoped view over sanitized input.
///
/// Built once per request through [`RequestScope`](crate::RequestScope);
/// immutable afterwards. All accessors take `&self`, and the gateway is
/// `Send + Sync`, so one instance can serve a whole request task tree.
///
/// # Examples
///
/// ```
/// use input_gateway::{GatewayConfig, RawRequest, RequestScope};
///
/// let mut raw = RawRequest::new();
/// raw.add_query("q", "h\u{e9}llo<script>alert(1)</script>");
/// raw.add_server("REMOTE_ADDR", "203.0.113.7");
///
/// let scope = RequestScope::new(raw, &GatewayConfig::default());
/// let gateway = scope.gateway();
///
/// assert_eq!(gateway.query("q").unwrap().as_text(), Some("h\u{e9}llo"));
/// assert_eq!(gateway.query_raw("q").unwrap().as_text(),
///            Some("h\u{e9}llo<script>alert(1)</script>"));
/// assert_eq!(gateway.client_ip(), Some("203.0.113.7"));
/// ```
pub struct InputGateway {
    raw: Snapshot,
    live: LiveSources,
    global_xss: bool,
    keys: KeyPolicy,
    filter: Box<dyn XssFilter>,
    ip_validator: Box<dyn IpValidator>,
    client_ip: OnceLock<Option<String>>,
}

impl InputGateway {
    /// Runs the capture pipeline over one request's raw input.
    ///
    /// Order matters: normalization first (both copies see it), then the
    /// raw snapshot is fixed, then key validation and optional filtering
    /// build the live side.
    pub(crate) fn capture(
        raw_request: RawRequest,
        security: &SecurityConfig,
        normalizer: &dyn TextNormalizer,
        filter: Box<dyn XssFilter>,
        ip_validator: Box<dyn IpValidator>,
    ) -> Self {
        let global_xss = security.global_xss_filtering.is_enabled();
        let keys = KeyPolicy::new();

        let raw = Snapshot {
            query: normalizer.clean(raw_request.query),
            form: normalizer.clean(raw_request.form),
            cookies: normalizer.clean(raw_request.cookies),
            server: normalizer.clean(raw_request.server),
        };

        let live = LiveSources {
            query: sanitize_source(Source::Query, &raw.query, global_xss, &keys, filter.as_ref()),
            form: sanitize_source(Source::Form, &raw.form, global_xss, &keys, filter.as_ref()),
            cookies: sanitize_source(
                Source::Cookie,
                &raw.cookies,
                global_xss,
                &keys,
                filter.as_ref(),
            ),
            server: sanitize_source(
                Source::Server,
                &raw.server,
                global_xss,
                &keys,
                filter.as_ref(),
            ),
        };

        debug!(
            query = live.query.entries.len(),
            form = live.form.entries.len(),
            cookie = live.cookies.entries.len(),
            server = live.server.entries.len(),
            global_xss,
            "global arrays filtered"
        );

        Self {
            raw,
            live,
            global_xss,
            keys,
            filter,
            ip_validator,
            client_ip: OnceLock::new(),
        }
    }

    /// Whether values were filtered once at capture time.
    pub fn global_filtering(&self) -> bool {
        self.global_xss
    }

    /// Validates one key name the way capture does.
    ///
    /// With `apply_xss` set and global filtering on, the key text is
    /// filtered before the character check, so a key can become valid by
    /// having its payload stripped. With either flag off the name is
    /// checked verbatim.
    pub fn clean_key(&self, key: &str, apply_xss: bool) -> KeyOutcome {
        if apply_xss && self.global_xss {
            self.keys.check(&self.filter.clean_text(key))
        } else {
            self.keys.check(key)
        }
    }

    /// Filters one value the way capture does.
    ///
    /// Runs the XSS filter only when `apply_xss` is set and global
    /// filtering is on; otherwise the value comes back unchanged.
    pub fn clean_value(&self, value: Value, apply_xss: bool) -> Value {
        if apply_xss && self.global_xss {
            self.filter.clean(value)
        } else {
            value
        }
    }

    /// Looks up a query parameter, filtered.
    pub fn query(&self, key: &str) -> Option<Value> {
        self.filtered(Source::Query, key)
    }

    /// Looks up a form field, filtered.
    pub fn form(&self, key: &str) -> Option<Value> {
        self.filtered(Source::Form, key)
    }

    /// Looks up a cookie, filtered.
    pub fn cookie(&self, key: &str) -> Option<Value> {
        self.filtered(Source::Cookie, key)
    }

    /// Looks up a server entry, filtered.
    pub fn server(&self, key: &str) -> Option<Value> {
        self.filtered(Source::Server, key)
    }

    /// Looks up a query parameter in the raw snapshot. Never filtered.
    pub fn query_raw(&self, key: &str) -> Option<&Value> {
        self.raw.query.get(key)
    }

    /// Looks up a form field in the raw snapshot. Never filtered.
    pub fn form_raw(&self, key: &str) -> Option<&Value> {
        self.raw.form.get(key)
    }

    /// Looks up a cookie in the raw snapshot. Never filtered.
    pub fn cookie_raw(&self, key: &str) -> Option<&Value> {
        self.raw.cookies.get(key)
    }

    /// Looks up a server entry in the raw snapshot. Never filtered.
    pub fn server_raw(&self, key: &str) -> Option<&Value> {
        self.raw.server.get(key)
    }

    /// The whole live query map. Not lazily filtered; see the module docs.
    pub fn query_entries(&self) -> &IndexMap<String, Value> {
        &self.live.query.entries
    }

    /// The whole live form map. Not lazily filtered; see the module docs.
    pub fn form_entries(&self) -> &IndexMap<String, Value> {
        &self.live.form.entries
    }

    /// The whole live cookie map. Not lazily filtered; see the module docs.
    pub fn cookie_entries(&self) -> &IndexMap<String, Value> {
        &self.live.cookies.entries
    }

    /// The whole live server map. Not lazily filtered; see the module docs.
    pub fn server_entries(&self) -> &IndexMap<String, Value> {
        &self.live.server.entries
    }

    /// The whole raw query value, normalized but otherwise untouched.
    pub fn query_raw_all(&self) -> &Value {
        &self.raw.query
    }

    /// The whole raw form value, normalized but otherwise untouched.
    pub fn form_raw_all(&self) -> &Value {
        &self.raw.form
    }

    /// The whole raw cookie value, normalized but otherwise untouched.
    pub fn cookie_raw_all(&self) -> &Value {
        &self.raw.cookies
    }

    /// The whole raw server value, normalized but otherwise untouched.
    pub fn server_raw_all(&self) -> &Value {
        &self.raw.server
    }

    /// The value of the most recent invalid-keyed entry for a source, if
    /// any entry was rejected during capture.
    pub fn rejected(&self, source: Source) -> Option<&Value> {
        self.live.source(source).rejected.as_ref()
    }

    /// The validated client address, or `None` when no probed server key
    /// held a valid one.
    ///
    /// Probes [`CLIENT_IP_KEYS`] in order; the first non-empty value wins
    /// outright, and an invalid winner means no address rather than a
    /// fallback to later keys. The result is computed once and memoized,
    /// whether or not the probe succeeded.
    pub fn client_ip(&self) -> Option<&str> {
        self.client_ip
            .get_or_init(|| self.probe_client_ip())
            .as_deref()
    }

    /// Live lookup for one key. Already filtered at capture when global
    /// filtering is on; filtered here, on every call, when it is off.
    fn filtered(&self, source: Source, key: &str) -> Option<Value> {
        let stored = self.live.source(source).entries.get(key)?;
        if self.global_xss {
            Some(stored.clone())
        } else {
            Some(self.filter.clean(stored.clone()))
        }
    }

    fn probe_client_ip(&self) -> Option<String> {
        let candidate = CLIENT_IP_KEYS
            .iter()
            .find_map(|key| self.server(key).filter(|value| !value.is_empty()))?;
        let text = candidate.as_text()?;
        if self.ip_validator.is_valid(text) {
            Some(text.to_string())
        } else {
            debug!(candidate = text, "client address candidate failed validation");
            None
        }
    }
}

impl fmt::Debug for InputGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputGateway")
            .field("global_xss", &self.global_xss)
            .field("raw", &self.raw)
            .field("live", &self.live)
            .field("client_ip", &self.client_ip.get())
            .finish_non_exhaustive()
    }
}

/// Builds the live side of one source from its normalized snapshot.
fn sanitize_source(
    source: Source,
    normalized: &Value,
    global_xss: bool,
    keys: &KeyPolicy,
    filter: &dyn XssFilter,
) -> SourceMap {
    let Some(entries) = normalized.as_map() else {
        debug!(source = source.as_str(), "non-map source treated as empty");
        return SourceMap::default();
    };

    let mut live = SourceMap::default();
    for (key, value) in entries {
        if source == Source::Cookie && COOKIE_ATTRIBUTES.contains(&key.as_str()) {
            continue;
        }
        let cleaned = if global_xss {
            filter.clean(value.clone())
        } else {
            value.clone()
        };
        let outcome = if global_xss {
            keys.check(&filter.clean_text(key))
        } else {
            keys.check(key)
        };
        match outcome {
            KeyOutcome::Accepted(name) => {
                live.entries.insert(name, cleaned);
            }
            KeyOutcome::Rejected => {
                debug!(source = source.as_str(), "entry dropped for invalid key");
                live.rejected = Some(cleaned);
            }
        }
    }
    live
}
