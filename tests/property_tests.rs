//! Integration property tests for input-gateway.
//!
//! These tests validate cross-module invariants and end-to-end flows
//! using property-based testing.

use input_gateway::{
    GatewayConfig, PassthroughFilter, RawRequest, RequestScope, ScriptFilter, Source,
    TextNormalizer, UnicodeCleaner, Value, XssFilter, CLIENT_IP_KEYS,
};
use proptest::prelude::*;

// Strategy: Generate key names from the accepted character set
fn arb_safe_key() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_.-]{0,11}").unwrap()
}

// Strategy: Generate value text, including markup-ish characters
fn arb_text() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ -~\u{e0}-\u{fc}]{0,24}").unwrap()
}

// Strategy: Generate one probe candidate per server key
fn arb_candidate() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        Just(Some("203.0.113.9".to_string())),
        Just(Some("2001:db8::1".to_string())),
        Just(Some("not-an-ip".to_string())),
        Just(Some("999.0.0.1".to_string())),
    ]
}

proptest! {
    /// Property: With global filtering on, every keyed read equals the
    /// reference normalize-then-filter pipeline, and every raw read
    /// equals the normalized original. The two copies never bleed into
    /// each other.
    #[test]
    fn proptest_dual_copies_match_reference(
        entries in prop::collection::hash_map(arb_safe_key(), arb_text(), 0..6)
    ) {
        let normalizer = UnicodeCleaner::new();
        let reference = ScriptFilter::new();

        let mut raw = RawRequest::new();
        for (key, value) in &entries {
            raw.add_query(key.clone(), value.as_str());
        }

        let scope = RequestScope::new(raw, &GatewayConfig::default());
        let input = scope.gateway();

        for (key, value) in &entries {
            let normalized = normalizer.clean_text(value);
            let filtered = reference.clean_text(&normalized);
            prop_assert_eq!(
                input.query(key).and_then(|v| v.as_text().map(String::from)),
                Some(filtered)
            );
            prop_assert_eq!(
                input.query_raw(key).and_then(Value::as_text),
                Some(normalized.as_str())
            );
        }
    }

    /// Property: Live entries keep host insertion order, with repeated
    /// keys holding their first position.
    #[test]
    fn proptest_insertion_order_preserved(
        keys in prop::collection::vec(arb_safe_key(), 0..8)
    ) {
        let mut raw = RawRequest::new();
        for (i, key) in keys.iter().enumerate() {
            raw.add_query(key.clone(), i.to_string());
        }

        let scope = RequestScope::new(raw, &GatewayConfig::default());
        let input = scope.gateway();

        let mut expected: Vec<&str> = Vec::new();
        for key in &keys {
            if !expected.contains(&key.as_str()) {
                expected.push(key);
            }
        }
        let actual: Vec<&str> = input.query_entries().keys().map(String::as_str).collect();
        prop_assert_eq!(actual, expected);
    }

    /// Property: An entry whose key carries any forbidden character is
    /// unreachable by that key, lands in the rejected slot, and still
    /// appears on the raw side.
    #[test]
    fn proptest_forbidden_keys_are_unreachable(
        head in "[a-z]{0,6}",
        bad in prop::sample::select(vec![' ', '!', '<', '>', '/', '=', '\n']),
        tail in "[a-z]{0,6}",
        value in "[a-z0-9]{0,12}",
    ) {
        let key = format!("{head}{bad}{tail}");
        let mut raw = RawRequest::new();
        raw.add_query(key.as_str(), value.as_str());

        // A passthrough filter so the key cannot be repaired into
        // validity before the character check.
        let scope = RequestScope::new(raw, &GatewayConfig::default())
            .with_filter(PassthroughFilter::new());
        let input = scope.gateway();

        prop_assert!(input.query(&key).is_none());
        prop_assert!(input.query_entries().is_empty());
        prop_assert_eq!(
            input.rejected(Source::Query).and_then(Value::as_text),
            Some(value.as_str())
        );
        prop_assert_eq!(
            input.query_raw(&key).and_then(Value::as_text),
            Some(value.as_str())
        );
    }

    /// Property: The client address is decided by the first non-empty
    /// probed value alone. Valid addresses behind an invalid winner are
    /// never consulted.
    #[test]
    fn proptest_first_nonempty_candidate_decides(
        candidates in prop::collection::vec(arb_candidate(), 5)
    ) {
        let mut raw = RawRequest::new();
        for (key, candidate) in CLIENT_IP_KEYS.iter().zip(&candidates) {
            if let Some(text) = candidate {
                raw.add_server(*key, text.as_str());
            }
        }

        let scope = RequestScope::new(raw, &GatewayConfig::default());
        let input = scope.gateway();

        let winner = candidates.iter().flatten().find(|text| !text.is_empty());
        let expected = winner.and_then(|text| {
            text.parse::<std::net::IpAddr>().is_ok().then_some(text.as_str())
        });
        prop_assert_eq!(input.client_ip(), expected);
    }

    /// Property: Only the literal boolean false disables global
    /// filtering; every lookalike leaves it on.
    #[test]
    fn proptest_only_literal_false_disables(
        literal in prop::sample::select(vec![
            "false", "true", "\"false\"", "\"off\"", "0", "1", "-1",
            "0.0", "[]", "[false]", "{}", "{ inner = false }", "1979-05-27",
        ])
    ) {
        let text = format!("[security]\nglobal_xss_filtering = {literal}\n");
        let config = GatewayConfig::from_toml_str(&text).unwrap();
        let expected = literal != "false";
        prop_assert_eq!(config.security.global_xss_filtering.is_enabled(), expected);
    }

    /// Property: Normalization is idempotent over arbitrary input.
    #[test]
    fn proptest_normalization_idempotent(text in any::<String>()) {
        let cleaner = UnicodeCleaner::new();
        let once = cleaner.clean_text(&text);
        let twice = cleaner.clean_text(&once);
        prop_assert_eq!(twice, once);
    }

    /// Property: The capture pipeline never panics, whatever the host
    /// feeds it.
    #[test]
    fn proptest_capture_never_panics(
        query in prop::collection::hash_map(any::<String>(), any::<String>(), 0..4),
        cookie in prop::collection::hash_map(any::<String>(), any::<String>(), 0..4),
    ) {
        let mut raw = RawRequest::new();
        for (key, value) in query {
            raw.add_query(key, value.as_str());
        }
        for (key, value) in cookie {
            raw.add_cookie(key, value.as_str());
        }

        let scope = RequestScope::new(raw, &GatewayConfig::default());
        let input = scope.gateway();

        // Reads over arbitrary data are total.
        let _ = input.query("anything");
        let _ = input.cookie_entries();
        let _ = input.client_ip();
        let _ = input.rejected(Source::Cookie);
    }
}
