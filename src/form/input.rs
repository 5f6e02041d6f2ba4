//! Contact form input and validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A visible form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    /// The field's wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a submission was rejected before reaching the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field `{0}` is required")]
    MissingField(Field),
    #[error("email address is malformed")]
    InvalidEmail,
}

/// Raw values typed into the form for one submission attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    pub name: String,
    pub email: String,
    pub message: String,
    /// Hidden bot-trap field; humans never fill it in
    #[serde(default)]
    pub honeypot: String,
}

impl FormInput {
    /// Create input from raw field values, honeypot empty.
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
            honeypot: String::new(),
        }
    }

    /// Set the hidden honeypot field.
    pub fn with_honeypot(mut self, value: impl Into<String>) -> Self {
        self.honeypot = value.into();
        self
    }

    /// Whether the bot trap was filled in.
    pub fn is_bot(&self) -> bool {
        !self.honeypot.is_empty()
    }

    /// Trim every field and check presence, then the email shape.
    pub fn validate(&self) -> Result<ValidatedInput, ValidationError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let message = self.message.trim();

        for (field, value) in [(Field::Name, name), (Field::Email, email), (Field::Message, message)] {
            if value.is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }

        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail);
        }

        Ok(ValidatedInput {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        })
    }
}

/// Trimmed, validated field values ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInput {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// `local@domain.tld`: no whitespace, exactly one `@`, and some dot in the
/// domain with text on both sides.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_input_is_trimmed() {
        let input = FormInput::new("  Sara ", "sara@example.com\n", "\tمرحبا ");
        let valid = input.validate().unwrap();
        assert_eq!(valid.name, "Sara");
        assert_eq!(valid.email, "sara@example.com");
        assert_eq!(valid.message, "مرحبا");
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let input = FormInput::new(" ", "", "");
        assert_eq!(input.validate(), Err(ValidationError::MissingField(Field::Name)));

        let input = FormInput::new("a", "  ", "hi");
        assert_eq!(input.validate(), Err(ValidationError::MissingField(Field::Email)));

        let input = FormInput::new("a", "a@b.co", "   ");
        assert_eq!(input.validate(), Err(ValidationError::MissingField(Field::Message)));
    }

    #[test]
    fn test_email_without_tld_is_invalid() {
        let input = FormInput::new("a", "foo@bar", "hi");
        assert_eq!(input.validate(), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(is_valid_email("a@b.c.d"));
        assert!(is_valid_email("a@b.c"));
        assert!(is_valid_email("a@b.c."));
        assert!(is_valid_email("a@b.."));
        assert!(is_valid_email("a@x.y.."));
        assert!(is_valid_email("a@.b.c"));

        assert!(!is_valid_email("foo@bar"));
        assert!(!is_valid_email("@bar.com"));
        assert!(!is_valid_email("foo@.com"));
        assert!(!is_valid_email("foo@bar."));
        assert!(!is_valid_email("a@."));
        assert!(!is_valid_email("a@.."));
        assert!(!is_valid_email("foo@@bar.com"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("plainaddress"));
    }

    #[test]
    fn test_honeypot_flag() {
        assert!(!FormInput::new("a", "a@b.co", "hi").is_bot());
        assert!(FormInput::new("a", "a@b.co", "hi").with_honeypot("http://spam").is_bot());
    }
}
