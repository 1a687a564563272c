//! Unicode normalization boundary (component A).
//!
//! Every index in this crate stores and compares NFD code points, and
//! only ever hands UTF-8 back to callers after recomposing to NFC.  No
//! index should ever touch raw UTF-8 bytes for comparison purposes.

use unicode_normalization::UnicodeNormalization;

use crate::Error;

/// Validate `bytes` as UTF-8 and return its NFD code-point sequence.
pub fn to_codepoints(bytes: &[u8]) -> Result<Vec<u32>, Error> {
    let s = std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)?;
    Ok(s.nfd().map(|c| c as u32).collect())
}

/// Recompose a code-point sequence to NFC UTF-8. Always succeeds: any
/// sequence of valid `char`s normalizes to a valid `String`.
pub fn to_output_bytes(cp: &[u32]) -> String {
    cp.iter()
        .filter_map(|&c| char::from_u32(c))
        .nfc()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_utf8_is_rejected() {
        let bad = [0xff, 0xfe];
        assert!(matches!(to_codepoints(&bad), Err(Error::InvalidUtf8)));
    }

    #[test]
    fn roundtrip_normalizes() {
        // "e" + combining acute (decomposed) vs precomposed "é"
        let decomposed = "e\u{0301}".as_bytes();
        let cps = to_codepoints(decomposed).unwrap();
        let out = to_output_bytes(&cps);
        assert_eq!(out, "\u{e9}");
    }

    #[test]
    fn composed_and_decomposed_agree() {
        let composed = to_codepoints("\u{e9}".as_bytes()).unwrap();
        let decomposed = to_codepoints("e\u{0301}".as_bytes()).unwrap();
        assert_eq!(composed, decomposed);
    }
}
