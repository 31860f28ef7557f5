//! Lenient scanners over frame text.
//!
//! These follow `scanf`-style leniency: leading whitespace is skipped and the
//! longest numeric prefix wins, so `"25.5C"` scans as `25.5`.

use super::types::STATUS_MAX_LEN;

/// Scan a decimal number at the start of `text`, skipping leading whitespace.
///
/// Accepts an optional sign, digits with an optional fraction, and an
/// optional exponent. Returns `None` when no digits are present.
pub fn scan_f32(text: &str) -> Option<f32> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when followed by at least one digit
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// Scan a double-quoted string at the start of `text`, skipping leading
/// whitespace. At most [`STATUS_MAX_LEN`] characters are kept; an empty
/// string yields `None`.
pub fn scan_quoted(text: &str) -> Option<String> {
    let rest = text.trim_start().strip_prefix('"')?;
    let value: String = rest
        .chars()
        .take_while(|&c| c != '"')
        .take(STATUS_MAX_LEN)
        .collect();

    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Text following the first occurrence of `token`
pub fn after_token<'a>(text: &'a str, token: &str) -> Option<&'a str> {
    text.find(token).map(|pos| &text[pos + token.len()..])
}
