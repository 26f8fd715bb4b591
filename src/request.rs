//! Raw request intake.
//!
//! [`RawRequest`] is the seam between a host framework and the gateway.
//! The host copies whatever it parsed from the wire into the four input
//! sources; nothing is normalized, validated or filtered at this stage.
//! Capture does all of that in one pass later.

use std::fmt;

use crate::value::Value;

/// The four places request input comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// URL query string parameters.
    Query,
    /// Form body fields.
    Form,
    /// Cookies sent by the client.
    Cookie,
    /// Server and environment variables, including `HTTP_*` headers.
    Server,
}

impl Source {
    /// All sources, in capture order.
    pub const ALL: [Source; 4] = [Source::Query, Source::Form, Source::Cookie, Source::Server];

    /// Short name, used in trace events.
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Query => "QUERY",
            Source::Form => "FORM",
            Source::Cookie => "COOKIE",
            Source::Server => "SERVER",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Untrusted input exactly as the host handed it over.
///
/// Each source is a [`Value`], normally a map. A host can also set a
/// whole source to a text value to mirror a malformed upstream payload;
/// capture keeps that shape in the raw snapshot and treats the live side
/// as empty.
///
/// # Examples
///
/// ```
/// use input_gateway::RawRequest;
///
/// let mut raw = RawRequest::new();
/// raw.add_query("q", "rust books");
/// raw.add_server("REMOTE_ADDR", "203.0.113.7");
/// assert_eq!(raw.query().get("q").and_then(|v| v.as_text()), Some("rust books"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    pub(crate) query: Value,
    pub(crate) form: Value,
    pub(crate) cookies: Value,
    pub(crate) server: Value,
}

impl RawRequest {
    /// Creates an empty request with all four sources as empty maps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one query string parameter.
    pub fn add_query(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.query.insert(key, value);
    }

    /// Adds one form field.
    pub fn add_form(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.form.insert(key, value);
    }

    /// Adds one cookie.
    pub fn add_cookie(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.cookies.insert(key, value);
    }

    /// Adds one server or environment entry.
    pub fn add_server(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.server.insert(key, value);
    }

    /// Replaces the query source wholesale.
    pub fn set_query(&mut self, value: Value) {
        self.query = value;
    }

    /// Replaces the form source wholesale.
    pub fn set_form(&mut self, value: Value) {
        self.form = value;
    }

    /// Replaces the cookie source wholesale.
    pub fn set_cookie(&mut self, value: Value) {
        self.cookies = value;
    }

    /// Replaces the server source wholesale.
    pub fn set_server(&mut self, value: Value) {
        self.server = value;
    }

    /// The query source as handed over so far.
    pub fn query(&self) -> &Value {
        &self.query
    }

    /// The form source as handed over so far.
    pub fn form(&self) -> &Value {
        &self.form
    }

    /// The cookie source as handed over so far.
    pub fn cookies(&self) -> &Value {
        &self.cookies
    }

    /// The server source as handed over so far.
    pub fn server(&self) -> &Value {
        &self.server
    }
}
