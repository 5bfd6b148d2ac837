//! Phone number normalization to `+<digits>` form.

/// Normalize `raw` to an international `+<digits>` number.
///
/// - a leading `+` is kept
/// - a leading `00` becomes `+`
/// - a leading single `0` is a national number: its two-digit trunk/operator
///   prefix is dropped and `default_country_code` is prepended
/// - anything else is prefixed with a bare `+`
///
/// Returns `None` when nothing dialable is left.
pub fn normalize_phone(raw: &str, default_country_code: &str) -> Option<String> {
    let raw = raw.trim();
    let international = raw.starts_with('+');
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    let normalized = if international {
        non_empty(&digits).map(|d| format!("+{d}"))?
    } else if let Some(rest) = digits.strip_prefix("00") {
        non_empty(rest).map(|d| format!("+{d}"))?
    } else if digits.starts_with('0') {
        let national = digits.get(2..).and_then(non_empty)?;
        let country: String = default_country_code.chars().filter(char::is_ascii_digit).collect();
        format!("+{}{national}", non_empty(&country)?)
    } else {
        non_empty(&digits).map(|d| format!("+{d}"))?
    };

    Some(normalized)
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}
