//! Input validators for untrusted public input
//!
//! All functions here are pure and total: they never panic and always
//! return a boolean or a structured result. Deciding the HTTP response
//! is left to the request handlers.

/// Result of a password policy check, naming the first unmet rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordCheck {
    pub valid: bool,
    pub message: Option<&'static str>,
}

impl PasswordCheck {
    fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    fn fail(message: &'static str) -> Self {
        Self {
            valid: false,
            message: Some(message),
        }
    }
}

/// Structural email check: local-part@domain with a dot in the domain
pub fn is_valid_email(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() || s.len() > 254 || s.contains(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    // Domain needs at least one dot with non-empty labels on both sides
    domain.split('.').count() >= 2 && domain.split('.').all(|label| !label.is_empty())
}

/// Password policy: length >= 8, one uppercase, one lowercase, one digit
pub fn validate_password(s: &str) -> PasswordCheck {
    if s.len() < 8 {
        return PasswordCheck::fail("password must be at least 8 characters");
    }
    if !s.chars().any(|c| c.is_ascii_uppercase()) {
        return PasswordCheck::fail("password must contain an uppercase letter");
    }
    if !s.chars().any(|c| c.is_ascii_lowercase()) {
        return PasswordCheck::fail("password must contain a lowercase letter");
    }
    if !s.chars().any(|c| c.is_ascii_digit()) {
        return PasswordCheck::fail("password must contain a digit");
    }
    PasswordCheck::ok()
}

/// Slug check: lowercase alphanumeric plus hyphens, 3-50 chars,
/// no leading or trailing hyphen
pub fn is_valid_slug(s: &str) -> bool {
    if s.len() < 3 || s.len() > 50 {
        return false;
    }
    if s.starts_with('-') || s.ends_with('-') {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Rating check: an integer in the closed range [1, 5].
///
/// Takes f64 so fractional JSON numbers (e.g. 3.5) are representable
/// and rejected rather than failing earlier in deserialization.
pub fn is_valid_rating(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && (1.0..=5.0).contains(&n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("ayse@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.co"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("user@domain."));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user name@example.com"));
        assert!(!is_valid_email("a@b@example.com"));
    }

    #[test]
    fn test_validate_password_names_first_unmet_rule() {
        assert!(validate_password("Abcdef12").valid);

        let short = validate_password("Ab1");
        assert!(!short.valid);
        assert_eq!(
            short.message,
            Some("password must be at least 8 characters")
        );

        let no_upper = validate_password("abcdefg1");
        assert_eq!(
            no_upper.message,
            Some("password must contain an uppercase letter")
        );

        let no_lower = validate_password("ABCDEFG1");
        assert_eq!(
            no_lower.message,
            Some("password must contain a lowercase letter")
        );

        let no_digit = validate_password("Abcdefgh");
        assert_eq!(no_digit.message, Some("password must contain a digit"));
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("kozbeyli-konagi"));
        assert!(is_valid_slug("abc"));
        assert!(is_valid_slug("a-1-b"));
        assert!(!is_valid_slug("ab"));
        assert!(!is_valid_slug("-abc"));
        assert!(!is_valid_slug("abc-"));
        assert!(!is_valid_slug("ABC"));
        assert!(!is_valid_slug("has space"));
        assert!(!is_valid_slug(&"x".repeat(51)));
    }

    #[test]
    fn test_is_valid_rating() {
        assert!(is_valid_rating(1.0));
        assert!(is_valid_rating(3.0));
        assert!(is_valid_rating(5.0));
        assert!(!is_valid_rating(0.0));
        assert!(!is_valid_rating(6.0));
        assert!(!is_valid_rating(3.5));
        assert!(!is_valid_rating(-1.0));
        assert!(!is_valid_rating(f64::NAN));
        assert!(!is_valid_rating(f64::INFINITY));
    }
}
