use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::validation::{self, FieldError, ValidationError};

/// Email and password submitted at login.
///
/// The password is zeroed when the value is dropped and never shows up in
/// `Debug` output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Get the password for the login request body
    pub fn expose_password(&self) -> &str {
        &self.password
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut report = ValidationError::default();
        validation::check_email(&self.email, &mut report);
        if self.password.is_empty() {
            report.push(FieldError::Required { field: "Password" });
        }
        report.into_result()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
