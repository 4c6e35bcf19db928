//! Customer account credentials.
//!
//! The identity provider is the authority on what it accepts; these types only
//! reject input that could never succeed so the request is not sent at all.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors produced while parsing sign-in credentials.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The email string is empty.
    #[error("email cannot be empty")]
    EmptyEmail,
    /// The email is longer than RFC 5321 allows.
    #[error("email must be at most {max} characters")]
    EmailTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The email is not of the form `local@domain`.
    #[error("email must look like name@domain")]
    MalformedEmail,
    /// The password is empty.
    #[error("password cannot be empty")]
    EmptyPassword,
}

/// An email address with a non-empty local part and domain.
///
/// ```
/// use sukoon_core::Email;
///
/// assert!(Email::parse("shopper@example.com").is_ok());
/// assert!(Email::parse("  shopper@example.com ").is_ok());
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("@example.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an email, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the trimmed input is empty, too long, or
    /// does not split into a non-empty local part and domain around one `@`.
    pub fn parse(input: &str) -> Result<Self, CredentialError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(CredentialError::EmptyEmail);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(CredentialError::EmailTooLong {
                max: Self::MAX_LENGTH,
            });
        }

        match s.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(s.to_owned()))
            }
            _ => Err(CredentialError::MalformedEmail),
        }
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::str::FromStr for Email {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A password as typed by the customer.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Wrap a password, rejecting the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::EmptyPassword`] for an empty input.
    pub fn new(value: impl Into<String>) -> Result<Self, CredentialError> {
        let value = value.into();
        if value.is_empty() {
            return Err(CredentialError::EmptyPassword);
        }
        Ok(Self(value))
    }

    /// Access the raw password for sending to the identity provider.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}
