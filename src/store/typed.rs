//! Parse-on-read interpretations of text config values.

/// Values that `get_bool` treats as true, compared case-insensitively.
pub const TRUTHY: [&str; 9] = [
    "t", "true", "y", "yes", "1", "enable", "enabled", "on", "active",
];

/// Interpret text as a boolean flag. Anything outside [`TRUTHY`] is false.
pub fn parse_bool(text: &str) -> bool {
    TRUTHY.iter().any(|t| t.eq_ignore_ascii_case(text))
}

/// Interpret text as an integer, falling back to 0.
pub fn parse_int(text: &str) -> i64 {
    text.parse().unwrap_or(0)
}

/// Interpret text as a float, falling back to 0.0.
/// Non-finite results (`inf`, `NaN`) also read as 0.0.
pub fn parse_float(text: &str) -> f64 {
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}
