// Form validation, applied before anything reaches the stores
use crate::config::CommunityConfig;
use crate::error::ValidationError;

/// The email must belong to the institution's domain.
pub fn validate_email(email: &str, domain: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    let suffix = format!("@{}", domain);
    let local_len = email.len().saturating_sub(suffix.len());
    if !email.ends_with(&suffix) || local_len == 0 {
        return Err(ValidationError::EmailDomain(domain.to_string()));
    }
    Ok(())
}

pub fn validate_password(password: &str, min_len: usize) -> Result<(), ValidationError> {
    if password.chars().count() < min_len {
        return Err(ValidationError::PasswordTooShort(min_len));
    }
    Ok(())
}

pub fn validate_login(
    email: &str,
    password: &str,
    community: &CommunityConfig,
) -> Result<(), ValidationError> {
    validate_email(email, &community.email_domain)?;
    validate_password(password, community.min_password_len)
}

pub fn validate_registration(
    email: &str,
    password: &str,
    confirm: &str,
    community: &CommunityConfig,
) -> Result<(), ValidationError> {
    validate_login(email, password, community)?;
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_institutional_email() {
        assert!(validate_email("abc@krct.ac.in", "krct.ac.in").is_ok());
        assert!(validate_email("  abc@krct.ac.in ", "krct.ac.in").is_ok());
    }

    #[test]
    fn rejects_foreign_or_empty_local_part() {
        assert_eq!(
            validate_email("abc@gmail.com", "krct.ac.in"),
            Err(ValidationError::EmailDomain("krct.ac.in".into()))
        );
        assert!(validate_email("@krct.ac.in", "krct.ac.in").is_err());
    }

    #[test]
    fn registration_checks_length_then_match() {
        let community = CommunityConfig::default();
        assert_eq!(
            validate_registration("abc@krct.ac.in", "12345", "12345", &community),
            Err(ValidationError::PasswordTooShort(6))
        );
        assert_eq!(
            validate_registration("abc@krct.ac.in", "123456", "654321", &community),
            Err(ValidationError::PasswordMismatch)
        );
        assert!(validate_registration("abc@krct.ac.in", "123456", "123456", &community).is_ok());
    }
}
