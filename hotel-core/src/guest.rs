use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Guest {
    pub id: Uuid,
    pub name: String,
    pub document: String,
    pub phone: String,
    pub email: String,
}

impl Guest {
    pub fn new(new: NewGuest) -> CoreResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: required("name", &new.name)?,
            document: required("document", &new.document)?,
            phone: required("phone", &new.phone)?,
            email: validate_email(&new.email)?,
        })
    }

    /// Merge the provided fields over this guest.
    pub fn apply(&mut self, update: GuestUpdate) -> CoreResult<()> {
        if let Some(name) = update.name {
            self.name = required("name", &name)?;
        }
        if let Some(document) = update.document {
            self.document = required("document", &document)?;
        }
        if let Some(phone) = update.phone {
            self.phone = required("phone", &phone)?;
        }
        if let Some(email) = update.email {
            self.email = validate_email(&email)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGuest {
    pub name: String,
    pub document: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuestUpdate {
    pub name: Option<String>,
    pub document: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

fn required(field: &str, value: &str) -> CoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("Guest {} is required.", field)));
    }
    Ok(trimmed.to_string())
}

fn validate_email(email: &str) -> CoreResult<String> {
    let email = email.trim();
    if is_valid_email(email) {
        Ok(email.to_string())
    } else {
        Err(CoreError::Validation(format!("Invalid email address: {}", email)))
    }
}

/// `local@domain.tld`, no whitespace, exactly one `@`, non-empty dot-separated domain labels.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return false;
    }
    domain.split('.').all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    })
}
