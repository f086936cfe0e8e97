//! Phone number canonicalization.
//!
//! Numbers are compared as plain strings after normalization: every character
//! except ASCII digits is removed, and a single `+` survives only when it is
//! the first character kept.

/// Normalizes a raw phone number into its comparable form.
///
/// `"+7 (919) 710-21-96"` becomes `"+79197102196"`. Input with no digits
/// yields an empty string (or `"+"`), which is a valid but useless result.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_digit() || (c == '+' && out.is_empty()) {
            out.push(c);
        }
    }
    out
}

/// Null-preserving variant of [`normalize`].
pub fn normalize_opt(raw: Option<&str>) -> Option<String> {
    raw.map(normalize)
}

/// True if a normalized number carries no digits at all.
pub fn is_blank(normalized: &str) -> bool {
    normalized.trim_start_matches('+').is_empty()
}
