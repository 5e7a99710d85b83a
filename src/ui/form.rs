//! The login form: session picker, username and password, plus focus.
//!
//! Focus moves with explicit navigation only and never wraps, so Enter on
//! the last field is the one and only way to submit.

use super::field::{Field, Picker, TextInput};
use super::keymapper::Key;
use crate::config::SessionCatalog;

/// Values collected from the form for a login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// `None` when the form has no session picker
    pub session: Option<String>,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Form {
    fields: Vec<Field>,
    focus: usize,
    /// Whether `fields[0]` is the session picker
    has_picker: bool,
}

impl Form {
    /// Build the login form, preselecting the remembered session and user.
    /// Without any session the picker is left out.
    pub fn login(catalog: &SessionCatalog) -> Self {
        let mut fields = Vec::with_capacity(3);
        let mut focus = 0;

        let picker = Picker::new(catalog.names());
        let has_picker = picker.is_some();
        if let Some(mut picker) = picker {
            if let Some(index) = catalog.last_session_index() {
                picker.set_default(index);
                focus = 1;
            }
            fields.push(Field::Picker(picker));
        }

        let username = TextInput::new("username", false)
            .with_contents(catalog.last_user().unwrap_or_default());
        fields.push(Field::TextInput(username));
        fields.push(Field::TextInput(TextInput::new("password", true)));

        Self {
            fields,
            focus,
            has_picker,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1).min(self.fields.len() - 1);
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    pub fn is_last_field(&self) -> bool {
        self.focus == self.fields.len() - 1
    }

    /// Forward a key to the focused field
    pub fn handle(&mut self, key: &Key) {
        self.fields[self.focus].handle(key);
    }

    pub fn credentials(&self) -> Credentials {
        let offset = usize::from(self.has_picker);
        Credentials {
            session: self.has_picker.then(|| self.fields[0].text().to_string()),
            username: self.fields[offset].text().to_string(),
            password: self.fields[offset + 1].text().to_string(),
        }
    }

    /// Clear the password, leaving the session and username alone
    pub fn reset_password(&mut self) {
        if let Some(field) = self.fields.last_mut() {
            field.reset();
        }
    }
}
