//! Lexical repair of non-standard `NaN` tokens in dataset payloads.
//!
//! The simulation pipeline serializes floating-point NaN as the bare token
//! `NaN`, which strict JSON parsers reject. Before structural parsing every
//! standalone occurrence of the token is rewritten to `null`. The repair is
//! purely lexical: a token counts as standalone when neither neighbouring
//! character is an ASCII word character, so identifiers that merely contain
//! the substring (`NaNLike`, `isNaN`) are left untouched.

use std::borrow::Cow;

const TOKEN: &[u8] = b"NaN";

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Rewrites every standalone `NaN` token to `null`.
///
/// Input without the token is returned borrowed and unchanged, which also
/// makes the repair idempotent: a repaired payload contains no standalone
/// `NaN` tokens, so repairing it again is a no-op.
pub fn repair_nan_tokens(input: &str) -> Cow<'_, str> {
    if !input.contains("NaN") {
        return Cow::Borrowed(input);
    }

    let bytes = input.as_bytes();
    let mut repaired = String::with_capacity(input.len());
    let mut cursor = 0;

    while cursor < bytes.len() {
        let is_token = bytes[cursor..].starts_with(TOKEN)
            && (cursor == 0 || !is_word_byte(bytes[cursor - 1]))
            && bytes
                .get(cursor + TOKEN.len())
                .map_or(true, |next| !is_word_byte(*next));

        if is_token {
            repaired.push_str("null");
            cursor += TOKEN.len();
        } else {
            // Safe to advance byte-wise: the token is pure ASCII, so a match
            // can only begin on a UTF-8 sequence start.
            let ch = input[cursor..].chars().next().unwrap_or('\u{FFFD}');
            repaired.push(ch);
            cursor += ch.len_utf8();
        }
    }

    Cow::Owned(repaired)
}
