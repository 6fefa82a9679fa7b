use crate::error::{AutoconfigError, Result};

/// Split an email address into local part and domain
///
/// Splits at the last `@`, so quoted local parts containing `@` stay intact.
pub fn split_email(email: &str) -> Result<(&str, &str)> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AutoconfigError::InvalidEmail("Email is empty".to_string()));
    }

    let (local, domain) = email.rsplit_once('@').ok_or_else(|| {
        AutoconfigError::InvalidEmail(format!("Email must contain @: {}", email))
    })?;

    if local.is_empty() || domain.is_empty() {
        return Err(AutoconfigError::InvalidEmail(format!(
            "Email parts cannot be empty: {}",
            email
        )));
    }

    Ok((local, domain))
}
