//! Phone number normalization
//!
//! Numbers are only made internationally resolvable by prefix: anything that does not
//! already start with `+` or the `00` international prefix gets a leading `+`. No
//! digit-count or country-code checks are performed.

/// Normalize a raw subscriber number.
///
/// Surrounding whitespace is trimmed. The operation is idempotent.
pub fn normalize_phone_number(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('+') || trimmed.starts_with("00") {
        trimmed.to_string()
    } else {
        format!("+{}", trimmed)
    }
}
