//! Placeholder expansion for configuration strings
//!
//! Stored server settings (user name templates in particular) may contain
//! tokens that depend on the requesting address:
//!
//! - `%EMAILADDRESS%` - full address, `local@domain`
//! - `%EMAILLOCALPART%` - the local part
//! - `%EMAILDOMAIN%` - the domain

pub const EMAIL_ADDRESS: &str = "%EMAILADDRESS%";
pub const EMAIL_LOCAL_PART: &str = "%EMAILLOCALPART%";
pub const EMAIL_DOMAIN: &str = "%EMAILDOMAIN%";

/// Replace all known placeholder tokens in `template`
///
/// Strings without tokens come back unchanged, so expanding twice is the same
/// as expanding once unless a substituted value itself contains a token.
pub fn expand_placeholders(template: &str, local_part: &str, domain: &str) -> String {
    if !template.contains('%') {
        return template.to_string();
    }

    let address = format!("{}@{}", local_part, domain);
    template
        .replace(EMAIL_ADDRESS, &address)
        .replace(EMAIL_LOCAL_PART, local_part)
        .replace(EMAIL_DOMAIN, domain)
}

/// True if `value` still contains one of the known tokens
pub fn has_placeholders(value: &str) -> bool {
    [EMAIL_ADDRESS, EMAIL_LOCAL_PART, EMAIL_DOMAIN]
        .iter()
        .any(|token| value.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_all_tokens() {
        let expanded = expand_placeholders(
            "%EMAILADDRESS% %EMAILLOCALPART% %EMAILDOMAIN%",
            "alice",
            "example.com",
        );
        assert_eq!(expanded, "alice@example.com alice example.com");
    }

    #[test]
    fn test_expand_repeated_tokens() {
        let expanded = expand_placeholders("%EMAILLOCALPART%.%EMAILLOCALPART%", "bob", "example.org");
        assert_eq!(expanded, "bob.bob");
    }

    #[test]
    fn test_no_tokens_is_identity() {
        for value in ["", "mail.example.com", "100% plain", "%UNKNOWN%"] {
            assert_eq!(expand_placeholders(value, "alice", "example.com"), value);
        }
    }

    #[test]
    fn test_expand_is_idempotent() {
        let once = expand_placeholders("%EMAILADDRESS%", "alice", "example.com");
        let twice = expand_placeholders(&once, "alice", "example.com");
        assert_eq!(once, twice);
        assert!(!has_placeholders(&twice));
    }

    #[test]
    fn test_has_placeholders() {
        assert!(has_placeholders("user-%EMAILLOCALPART%"));
        assert!(!has_placeholders("user-alice"));
    }
}
