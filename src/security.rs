use subtle::ConstantTimeEq;

/// Header clients use to present the API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Constant-time string comparison to prevent timing attacks on API keys
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Check a presented API key against the configured one. With no key
/// configured every request is allowed.
pub fn is_authorized(expected: Option<&str>, presented: Option<&str>) -> bool {
    match (expected, presented) {
        (None, _) => true,
        (Some(expected), Some(presented)) => constant_time_compare(expected, presented),
        (Some(_), None) => false,
    }
}
