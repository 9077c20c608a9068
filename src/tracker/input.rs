//! Form text to values.
//!
//! Numbers are read the way browser form handlers read them: the longest
//! leading numeric prefix counts (`"72 bpm"` is 72) and anything without
//! one is absent rather than zero.

/// Leading integer, e.g. `"120/80"` → 120, `"72.9"` → 72.
pub fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    text[..end].parse().ok()
}

/// Leading decimal number, e.g. `"70.5kg"` → 70.5, `".5"` → 0.5.
pub fn parse_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let mut mantissa_digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        mantissa_digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac = end + 1;
        while frac < bytes.len() && bytes[frac].is_ascii_digit() {
            frac += 1;
            mantissa_digits += 1;
        }
        end = frac;
    }
    if mantissa_digits == 0 {
        return None;
    }
    // exponent only counts when followed by digits
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
            exp += 1;
        }
        let exp_digits_start = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > exp_digits_start {
            end = exp;
        }
    }
    text[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_i32(text: &str) -> Option<i32> {
    parse_int(text).and_then(|v| i32::try_from(v).ok())
}

/// Trimmed text, or `None` when blank.
pub fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
