//! Contact form: draft record, field errors and the submit state machine.

use std::path::PathBuf;

use serde::Serialize;

use crate::model::{Contact, ContactField};
use crate::validate::{self, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormMode {
    Create,
    /// Editing an existing record; `id` comes from the bound source.
    Edit { id: Option<i64> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormState {
    Editing,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    #[error("form is already being submitted")]
    AlreadySubmitting,
}

/// What the save callback receives on a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub mode: FormMode,
    pub contact: Contact,
    pub photo: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactForm {
    mode: FormMode,
    draft: Contact,
    photo: String,
    errors: ValidationErrors,
    state: FormState,
}

impl ContactForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            draft: Contact::default(),
            photo: String::new(),
            errors: ValidationErrors::default(),
            state: FormState::Editing,
        }
    }

    pub fn edit(source: &Contact) -> Self {
        let mut form = Self::create();
        form.rebind(Some(source));
        form
    }

    /// Reset the draft to `source`, or to an empty draft for creation.
    pub fn rebind(&mut self, source: Option<&Contact>) {
        match source {
            Some(contact) => {
                self.mode = FormMode::Edit { id: contact.id };
                self.draft = contact.clone();
            }
            None => {
                self.mode = FormMode::Create;
                self.draft = Contact::default();
            }
        }
        self.photo.clear();
        self.errors = ValidationErrors::default();
        self.state = FormState::Editing;
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn is_submitting(&self) -> bool {
        self.state == FormState::Submitting
    }

    pub fn value(&self, field: ContactField) -> &str {
        self.draft.field(field)
    }

    pub fn error(&self, field: ContactField) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn photo(&self) -> &str {
        &self.photo
    }

    pub fn set_field(&mut self, field: ContactField, value: impl Into<String>) {
        self.draft.set_field(field, value);
        self.errors.clear(field);
    }

    pub fn set_photo(&mut self, path: impl Into<String>) {
        self.photo = path.into();
    }

    /// Validate the draft and, when it passes, hand it to `save`.
    ///
    /// On failure the errors are stored on the form and `save` is not called.
    pub fn submit<F, T>(&mut self, save: F) -> Result<T, SubmitError>
    where
        F: FnOnce(Submission) -> T,
    {
        if self.is_submitting() {
            return Err(SubmitError::AlreadySubmitting);
        }

        if let Err(errors) = validate::validate(&self.draft) {
            self.errors = errors.clone();
            return Err(SubmitError::Invalid(errors));
        }

        self.errors = ValidationErrors::default();
        self.state = FormState::Submitting;
        let photo = self.photo.trim();
        Ok(save(Submission {
            mode: self.mode,
            contact: self.draft.clone(),
            photo: (!photo.is_empty()).then(|| PathBuf::from(photo)),
        }))
    }

    /// Return to editing after the save outcome is known.
    pub fn settle(&mut self) {
        self.state = FormState::Editing;
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Create New Contact",
            FormMode::Edit { .. } => "Edit Contact",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match (self.state, self.mode) {
            (FormState::Submitting, _) => "Saving...",
            (FormState::Editing, FormMode::Create) => "Create Contact",
            (FormState::Editing, FormMode::Edit { .. }) => "Update Contact",
        }
    }
}
