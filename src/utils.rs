/// Keep the first `len` characters of `value` and append an ellipsis.
///
/// The ellipsis is appended even when `value` is shorter than `len`.
pub fn truncate_with_ellipsis(value: &str, len: usize) -> String {
    value.chars().take(len).chain("...".chars()).collect()
}

/// Lenient base-10 integer parsing.
///
/// Leading whitespace is skipped, an optional sign is accepted, and the longest run of ASCII
/// digits that follows is parsed; anything after it is ignored. Returns `None` when no digit is
/// found or the number does not fit in an `i64`. A browser's `parseInt` would instead return an
/// imprecise float for such a run; callers that fall back to a default treat it as unparsable.
pub fn parse_int_prefix(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let digits = &rest[..digits_len];
    if negative {
        format!("-{digits}").parse().ok()
    } else {
        digits.parse().ok()
    }
}
