//! Request-scoped gateway for untrusted HTTP input.
//!
//! This crate takes the four places request data arrives from (query
//! string, form body, cookies, server variables) and turns them into one
//! immutable, sanitized view per request:
//!
//! - **Normalization**: every piece of text is Unicode-normalized before
//!   anything else sees it
//! - **Key validation**: entries whose names fall outside a strict
//!   character set never reach the application
//! - **XSS filtering**: values are filtered once at capture time, or
//!   lazily on read when global filtering is switched off
//! - **Dual copies**: a raw, unfiltered snapshot stays available beside
//!   the sanitized one for code that genuinely needs the original bytes
//!
//! # Core Types
//!
//! - [`RawRequest`]: untrusted input exactly as the host parsed it
//! - [`RequestScope`]: per-request factory; builds the gateway on first use
//! - [`InputGateway`]: the sanitized, read-only view with its accessors
//! - [`Value`]: scalar text or an ordered map, nesting allowed
//! - [`GatewayConfig`]: TOML configuration, including the global
//!   filtering switch that only an explicit `false` turns off
//!
//! The sanitization seams are traits: [`TextNormalizer`], [`XssFilter`]
//! and [`IpValidator`] all ship with defaults and accept replacements
//! through [`RequestScope`].
//!
//! # Examples
//!
//! ```
//! use input_gateway::{GatewayConfig, RawRequest, RequestScope};
//!
//! let config = GatewayConfig::from_toml_str(
//!     "[security]\nglobal_xss_filtering = true\n",
//! )?;
//!
//! // The host copies whatever it parsed off the wire.
//! let mut raw = RawRequest::new();
//! raw.add_query("q", "caf\u{e9}<script>alert(1)</script>");
//! raw.add_cookie("session", "abc123");
//! raw.add_server("REMOTE_ADDR", "203.0.113.7");
//!
//! // One scope per request; capture runs on first use.
//! let scope = RequestScope::new(raw, &config);
//! let input = scope.gateway();
//!
//! assert_eq!(input.query("q").unwrap().as_text(), Some("caf\u{e9}"));
//! assert_eq!(input.cookie("session").unwrap().as_text(), Some("abc123"));
//! assert_eq!(input.client_ip(), Some("203.0.113.7"));
//! # Ok::<(), input_gateway::ConfigError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod filter;
mod gateway;
mod ip;
mod keys;
mod normalize;
mod request;
mod scope;
mod value;

pub use config::{ConfigError, GatewayConfig, SecurityConfig, XssToggle};
pub use filter::{PassthroughFilter, ScriptFilter, XssFilter};
pub use gateway::InputGateway;
pub use ip::{AddrValidator, IpValidator, CLIENT_IP_KEYS};
pub use keys::{KeyOutcome, KeyPolicy};
pub use normalize::{PassthroughNormalizer, TextNormalizer, UnicodeCleaner};
pub use request::{RawRequest, Source};
pub use scope::RequestScope;
pub use value::Value;
