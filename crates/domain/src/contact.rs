// crates/domain/src/contact.rs

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

use crate::json::truthy;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("Tous les champs sont obligatoires et le consentement doit être accordé.")]
    MissingFields,

    #[error("Adresse email invalide.")]
    InvalidEmail,
}

/// A validated contact-form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn field(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl ContactSubmission {
    /// Validate a raw JSON body.
    ///
    /// Presence of every field and truthy consent is checked before the
    /// email shape, so a missing consent is always `MissingFields`.
    pub fn from_json(body: &Value) -> Result<Self, ContactError> {
        let name = field(body, "name");
        let email = field(body, "email");
        let message = field(body, "message");
        let consent = truthy(body.get("consent"));

        let (Some(name), Some(email), Some(message), true) = (name, email, message, consent) else {
            return Err(ContactError::MissingFields);
        };
        if !is_valid_email(&email) {
            return Err(ContactError::InvalidEmail);
        }
        Ok(ContactSubmission {
            name,
            email,
            message,
        })
    }
}
