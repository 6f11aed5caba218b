use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::model::{Contact, ContactField};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_PATTERN: &str = r"^[+]?[0-9]{10,15}$";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PHONE_PATTERN).expect("phone pattern compiles"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone_regex().is_match(phone)
}

/// Field-scoped validation messages, ordered by form position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(BTreeMap<ContactField, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: ContactField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Drop the message for one field. Returns whether one was present.
    pub fn clear(&mut self, field: ContactField) -> bool {
        self.0.remove(&field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContactField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn insert(&mut self, field: ContactField, message: &str) {
        self.0.insert(field, message.to_string());
    }
}

/// Run every rule against the draft and collect all violations.
pub fn validate(contact: &Contact) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if contact.first_name.trim().is_empty() {
        errors.insert(ContactField::FirstName, "First name is required");
    }
    if contact.last_name.trim().is_empty() {
        errors.insert(ContactField::LastName, "Last name is required");
    }
    if contact.email.trim().is_empty() {
        errors.insert(ContactField::Email, "Email is required");
    } else if !is_valid_email(&contact.email) {
        errors.insert(ContactField::Email, "Email is invalid");
    }

    if let Some(phone) = contact.phone.as_deref().filter(|p| !p.is_empty()) {
        if !is_valid_phone(phone) {
            errors.insert(ContactField::Phone, "Phone number should be 10-15 digits");
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
