//! Identifier masking for text watermarks.
//!
//! The watermark never shows the full identifier. Non-digits are stripped,
//! then only a short prefix and suffix survive around a fixed mask literal:
//!
//! ```ignore
//! use docmark::watermark::{MaskConfig, MaskedIdentifier};
//!
//! let token = MaskedIdentifier::from_identifier("123.456.789-09", &MaskConfig::default())?;
//! assert_eq!(token.as_str(), "123XXXXXX09");
//! ```

use super::{MaskConfig, WatermarkError};
use std::fmt;

/// A redacted identifier, ready to be drawn on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedIdentifier(String);

/// Keep only ASCII digits.
pub fn clean_identifier(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

impl MaskedIdentifier {
    /// Mask `raw` according to `rule`.
    ///
    /// Fails when fewer than `rule.min_digits` digits remain after cleaning.
    pub fn from_identifier(raw: &str, rule: &MaskConfig) -> Result<Self, WatermarkError> {
        let digits = clean_identifier(raw);

        // Digits are ASCII, so byte offsets are char offsets below.
        if digits.len() < rule.min_digits || digits.len() < rule.keep_prefix + rule.keep_suffix {
            return Err(WatermarkError::InvalidIdentifier {
                required: rule.min_digits.max(rule.keep_prefix + rule.keep_suffix),
                found: digits.len(),
            });
        }

        let prefix = &digits[..rule.keep_prefix];
        let suffix = &digits[digits.len() - rule.keep_suffix..];

        let mut token = String::with_capacity(prefix.len() + rule.mask.len() + suffix.len());
        token.push_str(prefix);
        token.push_str(&rule.mask);
        token.push_str(suffix);
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters in the token.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for MaskedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
