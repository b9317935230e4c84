use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]{5,20}$").expect("invalid username pattern"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("invalid email pattern")
});

const MIN_PASSWORD_LEN: usize = 8;

pub fn validate_username(username: &str) -> Result<()> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(Error::InvalidUsername)
    }
}

pub fn validate_email(email: &str) -> Result<()> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(Error::InvalidEmail)
    }
}

/// Length of at least 8 with an uppercase letter, a lowercase letter, a digit
/// and a punctuation or symbol character.
pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::WeakPassword("must be at least 8 characters long"));
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(Error::WeakPassword(
            "must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(Error::WeakPassword(
            "must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(Error::WeakPassword("must contain at least one digit"));
    }
    if !password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
    {
        return Err(Error::WeakPassword(
            "must contain at least one punctuation or symbol character",
        ));
    }
    Ok(())
}
