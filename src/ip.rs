//! Client address validation.
//!
//! The gateway reports a client address only when the winning header value
//! parses as a real IP. Validation is a trait so hosts that accept only
//! one family, or that trust a CIDR allowlist, can swap in their own rule.

use std::net::IpAddr;

/// Server keys probed for the client address, in order of preference.
///
/// The first key holding a non-empty value wins outright; if its value
/// fails validation the probe reports nothing rather than falling back to
/// a later key. Forwarding headers are client-controlled, so treat the
/// result as a hint, not an identity.
pub const CLIENT_IP_KEYS: [&str; 5] = [
    "HTTP_FORWARDED",
    "HTTP_X_FORWARDED",
    "HTTP_X_FORWARDED_FOR",
    "HTTP_CLIENT_IP",
    "REMOTE_ADDR",
];

/// Decides whether a candidate string is an acceptable client address.
pub trait IpValidator: Send + Sync {
    /// True when `candidate` is a valid address under this rule.
    fn is_valid(&self, candidate: &str) -> bool;
}

/// Default validator: accepts any well-formed IPv4 or IPv6 address.
///
/// # Examples
///
/// ```
/// use input_gateway::{AddrValidator, IpValidator};
///
/// let validator = AddrValidator::new();
/// assert!(validator.is_valid("203.0.113.7"));
/// assert!(validator.is_valid("2001:db8::1"));
/// assert!(!validator.is_valid("not-an-ip"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AddrValidator;

impl AddrValidator {
    /// Creates the default validator.
    pub fn new() -> Self {
        Self
    }
}

impl IpValidator for AddrValidator {
    fn is_valid(&self, candidate: &str) -> bool {
        candidate.parse::<IpAddr>().is_ok()
    }
}
