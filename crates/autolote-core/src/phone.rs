// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phone-number canonicalization.
//!
//! Every lookup and write across the system keys on the canonical form so
//! that the WhatsApp JID (`573001234567@c.us`), a formatted number
//! (`+57 300 123-4567`) and a bare local number (`3001234567`) all resolve
//! to the same record.

/// Colombian international prefix applied when missing.
const COUNTRY_PREFIX: &str = "57";

/// Canonicalize a raw sender identifier into the storage/buffering key.
///
/// Strips a `@c.us`-style JID suffix, drops every non-digit, and prepends
/// the country prefix when absent. Idempotent: `canonical_phone` of its own
/// output is a no-op.
pub fn canonical_phone(raw: &str) -> String {
    let digits_source = raw.split('@').next().unwrap_or(raw);
    let digits: String = digits_source
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    if digits.starts_with(COUNTRY_PREFIX) {
        digits
    } else {
        format!("{COUNTRY_PREFIX}{digits}")
    }
}

/// Whether a raw identifier canonicalizes to a plausible mobile number.
pub fn is_valid_phone(raw: &str) -> bool {
    let canonical = canonical_phone(raw);
    (12..=13).contains(&canonical.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_jid_suffix() {
        assert_eq!(canonical_phone("573001234567@c.us"), "573001234567");
    }

    #[test]
    fn adds_country_prefix_to_local_number() {
        assert_eq!(canonical_phone("3001234567"), "573001234567");
    }

    #[test]
    fn drops_formatting_characters() {
        assert_eq!(canonical_phone("+57 300 123-4567"), "573001234567");
    }

    #[test]
    fn is_idempotent() {
        let inputs = ["573001234567@c.us", "3001234567", "+57 (300) 123 4567"];
        for input in inputs {
            let once = canonical_phone(input);
            assert_eq!(canonical_phone(&once), once, "input: {input}");
        }
    }

    #[test]
    fn differently_formatted_inputs_resolve_to_same_key() {
        assert_eq!(
            canonical_phone("573001234567@c.us"),
            canonical_phone("300 123 4567")
        );
    }

    #[test]
    fn validates_length() {
        assert!(is_valid_phone("3001234567"));
        assert!(!is_valid_phone("12345"));
    }
}
