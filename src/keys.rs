//! Key name validation.
//!
//! Attackers control key names just as much as values, so keys pass
//! through their own gate before anything is stored under them. A key is
//! acceptable when it consists entirely of Unicode letters, ASCII digits,
//! `:`, `_`, `.` and `-`. Anything else is rejected outright rather than
//! repaired; a mangled key would silently change which parameter the
//! application reads.

use std::sync::OnceLock;

use regex::Regex;

/// Result of checking one key name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key may be stored. Carries the (possibly filtered) name.
    Accepted(String),
    /// The key contains characters outside the allowed set.
    Rejected,
}

impl KeyOutcome {
    /// True when the key was rejected.
    pub fn is_rejected(&self) -> bool {
        matches!(self, KeyOutcome::Rejected)
    }

    /// The accepted name, or `None` for rejected keys.
    pub fn accepted(self) -> Option<String> {
        match self {
            KeyOutcome::Accepted(name) => Some(name),
            KeyOutcome::Rejected => None,
        }
    }
}

/// The character policy applied to every incoming key name.
///
/// # Examples
///
/// ```
/// use input_gateway::{KeyOutcome, KeyPolicy};
///
/// let policy = KeyPolicy::new();
/// assert_eq!(policy.check("user_id"), KeyOutcome::Accepted("user_id".into()));
/// assert_eq!(policy.check("user id"), KeyOutcome::Rejected);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyPolicy;

impl KeyPolicy {
    /// Creates the standard policy.
    pub fn new() -> Self {
        Self
    }

    /// Checks one key name against the allowed character set.
    ///
    /// The match is anchored to the whole string; a trailing newline is
    /// enough to reject a key.
    pub fn check(&self, key: &str) -> KeyOutcome {
        if allowed_keys().is_match(key) {
            KeyOutcome::Accepted(key.to_string())
        } else {
            KeyOutcome::Rejected
        }
    }
}

fn allowed_keys() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Hard-coded pattern; compilation cannot fail.
    RE.get_or_init(|| Regex::new(r"^[\pL0-9:_.-]+$").unwrap())
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn generated_safe_keys_are_accepted(key in "[a-zA-Z0-9:_.-]{1,24}") {
            prop_assert!(!KeyPolicy::new().check(&key).is_rejected());
        }

        #[test]
        fn any_forbidden_character_rejects_the_key(
            head in "[a-z]{0,8}",
            bad in prop::sample::select(vec![' ', '!', '<', '>', '/', '\\', '=', '\0', '\n']),
            tail in "[a-z]{0,8}",
        ) {
            let key = format!("{head}{bad}{tail}");
            prop_assert!(KeyPolicy::new().check(&key).is_rejected());
        }
    }
}
