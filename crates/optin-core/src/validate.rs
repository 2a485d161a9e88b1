//! Input Validators
//!
//! Pure functions, no side effects. Handlers accumulate the messages from
//! these checks into an ordered list instead of short-circuiting, so a
//! client sees every problem at once.

/// Validate an E.164 phone number: `+`, a non-zero digit, then 1 to 14
/// more digits. Anything else, including a missing `+`, is rejected.
pub fn is_valid_e164(phone: &str) -> bool {
    let Some(digits) = phone.strip_prefix('+') else {
        return false;
    };
    let mut chars = digits.chars();
    match chars.next() {
        Some('1'..='9') => {}
        _ => return false,
    }
    let rest = chars.as_str();
    (1..=14).contains(&rest.len()) && rest.bytes().all(|b| b.is_ascii_digit())
}

/// Validate an email address: non-whitespace local part, `@`, and a
/// domain containing a literal dot with characters on both sides.
///
/// The email field itself is optional; absence is valid, malformed
/// presence is not. That decision belongs to the caller.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.chars().any(char::is_whitespace) {
        return false;
    }
    if domain.contains('@') || domain.chars().any(char::is_whitespace) {
        return false;
    }
    matches!(domain.rsplit_once('.'), Some((host, tld)) if !host.is_empty() && !tld.is_empty())
}

/// Validate a display name: at least 2 characters after trimming.
pub fn is_valid_name(name: &str) -> bool {
    name.trim().chars().count() >= 2
}

/// Reject user ids containing path separators. User ids become storage
/// keys, so a `/` or `\` could traverse into another document path.
pub fn is_safe_user_id(user_id: &str) -> bool {
    !user_id.contains('/') && !user_id.contains('\\')
}
