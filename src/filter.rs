//! Cross-site scripting filters.
//!
//! A filter runs either once for everything at capture time (when global
//! filtering is on) or per read when a caller asks for a filtered view.
//! The gateway never runs it twice over the same text.
//!
//! [`ScriptFilter`] is the stock implementation. It is a neutralizer, not
//! a full HTML sanitizer: script payloads are removed, risky tag openers
//! are defanged, everything else passes through so ordinary text survives
//! unchanged.

use regex::Regex;

use crate::value::Value;

/// Strips or defuses active content in untrusted text.
///
/// Implementations must be `Send + Sync`; the gateway holds one for the
/// lifetime of the request and may be read from any thread.
pub trait XssFilter: Send + Sync {
    /// Filters one piece of text.
    fn clean_text(&self, text: &str) -> String;

    /// Filters every text leaf of a value, leaving structure intact.
    fn clean(&self, value: Value) -> Value {
        value.map_text(&|text| self.clean_text(text))
    }
}

/// Default filter: removes script elements, script URL schemes and inline
/// event handlers, and defangs openers of other risky tags.
///
/// # Examples
///
/// ```
/// use input_gateway::{ScriptFilter, XssFilter};
///
/// let filter = ScriptFilter::new();
/// assert_eq!(filter.clean_text("h\u{e9}llo<script>alert(1)</script>"), "h\u{e9}llo");
/// assert_eq!(filter.clean_text("<iframe src=x>"), "&lt;iframe src=x>");
/// ```
#[derive(Debug, Clone)]
pub struct ScriptFilter {
    script_block: Regex,
    script_tag: Regex,
    scheme: Regex,
    handler: Regex,
    risky_tag: Regex,
    encode_leftovers: bool,
}

impl ScriptFilter {
    /// Creates the default filter.
    pub fn new() -> Self {
        Self::build(false)
    }

    /// Creates a stricter variant that additionally HTML-encodes whatever
    /// markup survives the removal passes.
    pub fn strict() -> Self {
        Self::build(true)
    }

    fn build(encode_leftovers: bool) -> Self {
        // Hard-coded patterns; compilation cannot fail.
        Self {
            script_block: Regex::new(r"(?is)<script\b[^>]*>.*?</script[^>]*>").unwrap(),
            script_tag: Regex::new(r"(?i)</?script\b[^>]*>?").unwrap(),
            scheme: Regex::new(r"(?i)(?:java|vb|live)script\s*:").unwrap(),
            handler: Regex::new(r"(?i)\bon[a-z]+\s*=").unwrap(),
            risky_tag: Regex::new(
                r"(?i)<(/?\s*(?:iframe|object|embed|applet|meta|base|form|svg)\b)",
            )
            .unwrap(),
            encode_leftovers,
        }
    }
}

impl Default for ScriptFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl XssFilter for ScriptFilter {
    fn clean_text(&self, text: &str) -> String {
        let mut out = self.script_block.replace_all(text, "").into_owned();
        out = self.script_tag.replace_all(&out, "").into_owned();
        out = self.scheme.replace_all(&out, "").into_owned();
        out = self.handler.replace_all(&out, "").into_owned();
        out = self.risky_tag.replace_all(&out, "&lt;$1").into_owned();
        if self.encode_leftovers {
            out = html_escape::encode_text(&out).into_owned();
        }
        out
    }
}

/// A filter that passes all input through unchanged.
///
/// **Security Note**: exists for tests and for hosts that filter upstream.
/// Never wire it into a gateway that faces real user input.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughFilter;

impl PassthroughFilter {
    /// Creates the no-op filter.
    pub fn new() -> Self {
        Self
    }
}

impl XssFilter for PassthroughFilter {
    fn clean_text(&self, text: &str) -> String {
        text.to_string()
    }
}
