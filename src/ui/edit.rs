use crossterm::event::{Event, KeyEvent};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

use crate::form::ContactForm;
use crate::model::ContactField;

/// One editable row of the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormSlot {
    Field(ContactField),
    Photo,
}

impl FormSlot {
    pub const COUNT: usize = ContactField::ALL.len() + 1;

    pub fn at(index: usize) -> Self {
        ContactField::ALL
            .get(index)
            .copied()
            .map(FormSlot::Field)
            .unwrap_or(FormSlot::Photo)
    }

    pub fn label(self) -> &'static str {
        match self {
            FormSlot::Field(field) => field.label(),
            FormSlot::Photo => "Photo",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            FormSlot::Field(field) => field.placeholder(),
            FormSlot::Photo => "~/path/to/photo.jpg",
        }
    }

    pub fn required(self) -> bool {
        matches!(
            self,
            FormSlot::Field(ContactField::FirstName | ContactField::LastName | ContactField::Email)
        )
    }

    pub fn current(self, form: &ContactForm) -> String {
        match self {
            FormSlot::Field(field) => form.value(field).to_string(),
            FormSlot::Photo => form.photo().to_string(),
        }
    }
}

/// Text input bound to the focused form row.
#[derive(Default)]
pub struct FormEditor {
    index: usize,
    input: Input,
}

impl FormEditor {
    pub fn open(&mut self, form: &ContactForm) {
        self.focus(0, form);
    }

    pub fn slot(&self) -> FormSlot {
        FormSlot::at(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(&mut self, form: &ContactForm) {
        self.focus((self.index + 1) % FormSlot::COUNT, form);
    }

    pub fn prev(&mut self, form: &ContactForm) {
        self.focus((self.index + FormSlot::COUNT - 1) % FormSlot::COUNT, form);
    }

    fn focus(&mut self, index: usize, form: &ContactForm) {
        self.index = index;
        self.input = Input::new(self.slot().current(form));
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn visual_cursor(&self) -> usize {
        self.input.visual_cursor()
    }

    /// Feed a key to the input. Returns the new value when it changed.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<String> {
        match self.input.handle_event(&Event::Key(key)) {
            Some(change) if change.value => Some(self.input.value().to_string()),
            _ => None,
        }
    }
}
