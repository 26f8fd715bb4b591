//! Text normalization applied to every input source before anything else
//! looks at it.
//!
//! Normalization is the first pipeline stage: raw snapshots keep the
//! normalized form, so even "unfiltered" reads never see un-normalized
//! bytes. The default [`UnicodeCleaner`] canonicalizes to NFC and drops
//! characters that render as nothing but still smuggle meaning past
//! string comparisons.

use unicode_normalization::UnicodeNormalization;

use crate::value::Value;

/// Canonicalizes untrusted text into a single stable representation.
///
/// Implementations are handed to whatever thread ends up serving the
/// request, so they must be `Send + Sync`.
pub trait TextNormalizer: Send + Sync {
    /// Normalizes one piece of text.
    fn clean_text(&self, text: &str) -> String;

    /// Normalizes every text leaf of a value, leaving structure intact.
    fn clean(&self, value: Value) -> Value {
        value.map_text(&|text| self.clean_text(text))
    }
}

/// Default normalizer: drops invisible and control characters, then
/// composes to NFC.
///
/// Dropping happens first so that marks separated by a zero-width
/// character still compose; the output is always in NFC and running the
/// cleaner again changes nothing.
///
/// Dropped outright:
/// - ASCII control characters except tab, line feed and carriage return
/// - DEL (`U+007F`)
/// - zero-width characters (`U+200B`..`U+200D`, `U+2060`, `U+FEFF`)
///
/// # Examples
///
/// ```
/// use input_gateway::{TextNormalizer, UnicodeCleaner};
///
/// let cleaner = UnicodeCleaner::new();
/// // Combining acute accent composes into a single code point.
/// assert_eq!(cleaner.clean_text("he\u{0301}llo"), "h\u{00e9}llo");
/// assert_eq!(cleaner.clean_text("zero\u{200b}width"), "zerowidth");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeCleaner;

impl UnicodeCleaner {
    /// Creates the default normalizer.
    pub fn new() -> Self {
        Self
    }

    fn is_dropped(c: char) -> bool {
        matches!(c,
            '\u{0000}'..='\u{0008}'
            | '\u{000B}'
            | '\u{000C}'
            | '\u{000E}'..='\u{001F}'
            | '\u{007F}'
            | '\u{200B}'..='\u{200D}'
            | '\u{2060}'
            | '\u{FEFF}')
    }
}

impl TextNormalizer for UnicodeCleaner {
    fn clean_text(&self, text: &str) -> String {
        text.chars().filter(|c| !Self::is_dropped(*c)).nfc().collect()
    }
}

/// Normalizer that returns text unchanged. Useful when the host has
/// already canonicalized its input, and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughNormalizer;

impl PassthroughNormalizer {
    /// Creates the no-op normalizer.
    pub fn new() -> Self {
        Self
    }
}

impl TextNormalizer for PassthroughNormalizer {
    fn clean_text(&self, text: &str) -> String {
        text.to_string()
    }
}
