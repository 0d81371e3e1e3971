use regex_lite::Regex;
use std::sync::OnceLock;

fn billing_month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").expect("static regex"))
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("static regex"))
}

/// True when the length in characters is within [min, max]
pub fn length_between(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    len >= min && len <= max
}

/// Validate a billing month in YYYY-MM form
pub fn is_valid_billing_month(month: &str) -> bool {
    billing_month_re().is_match(month)
}

/// Loose email check: one '@', no whitespace, 5-255 characters
pub fn is_valid_email(email: &str) -> bool {
    length_between(email, 5, 255) && email_re().is_match(email)
}

/// Validate a router interface name.
/// Allows alphanumeric, hyphens, dots, and underscores so the name can be
/// placed unquoted in a RouterOS command.
pub fn is_valid_interface_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 64 {
        return false;
    }
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_')
}

/// Validate free text that ends up inside a quoted RouterOS string.
/// Quotes, backslashes, '$' (variable expansion) and control characters are rejected.
pub fn is_safe_script_text(text: &str) -> bool {
    !text
        .chars()
        .any(|c| c == '"' || c == '\\' || c == '$' || c.is_control())
}
