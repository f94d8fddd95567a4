//! Identifier and key derivation helpers shared across the record types.

use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Fresh UUID string for booking and cancellation record ids.
pub fn record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Hex digest of a payload, used as the queue deduplication token.
pub fn dedup_token(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

/// Unix epoch seconds as a string, stored on catalog and account records.
pub fn epoch_stamp() -> String {
    Utc::now().timestamp().to_string()
}

/// Digits 2..8 of a creation stamp, the short suffix carried by derived keys.
///
/// Epoch-second stamps are ten digits wide, so the slice is stable for
/// decades; anything shorter is returned as-is.
pub fn stamp_digits(stamp: &str) -> &str {
    stamp.get(2..8).unwrap_or(stamp)
}

/// Removes vowels (y included) from a value when deriving a record key.
pub fn strip_vowels(value: &str) -> String {
    value.chars().filter(|c| !"aeiouyAEIOUY".contains(*c)).collect()
}

/// Removes symbols and whitespace, keeping word characters only.
pub fn strip_symbols(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Compacts a display value into key form: no vowels, no symbols, uppercase.
pub fn key_fragment(value: &str) -> String {
    strip_symbols(&strip_vowels(value)).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_token_is_deterministic() {
        let a = dedup_token(b"{\"user_id\":\"CSTMR-855048\"}");
        let b = dedup_token(b"{\"user_id\":\"CSTMR-855048\"}");
        let c = dedup_token(b"{\"user_id\":\"ADMN-878495\"}");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn key_fragment_strips_vowels_and_symbols() {
        assert_eq!(key_fragment("Rail Bus Way"), "RLBSW");
        assert_eq!(key_fragment("Thunder Bird Express!"), "THNDRBRDXPRSS");
    }

    #[test]
    fn stamp_digits_takes_the_middle_run() {
        assert_eq!(stamp_digits("1685699666"), "856996");
        assert_eq!(stamp_digits("abc"), "abc");
    }
}
