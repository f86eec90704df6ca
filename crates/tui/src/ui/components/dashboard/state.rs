use automator_types::Effect;
use indexmap::IndexMap;

use crate::ui::components::text_field::TextField;

pub const DEFAULT_DESCRIPTION: &str = "Login and extract dashboard data";

/// Focusable elements of the New Workflow form, in Tab order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormFocus {
    #[default]
    Description,
    Username,
    Password,
    Run,
}

impl FormFocus {
    const ORDER: [FormFocus; 4] = [Self::Description, Self::Username, Self::Password, Self::Run];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|focus| *focus == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Form contents for the next submission.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub description: TextField,
    pub username: TextField,
    pub password: TextField,
    pub focus: FormFocus,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            description: TextField::with_value(DEFAULT_DESCRIPTION),
            username: TextField::default(),
            password: TextField::masked(),
            focus: FormFocus::default(),
        }
    }
}

impl DashboardState {
    /// Field that receives typed characters, `None` when the Run button is focused.
    pub fn focused_field_mut(&mut self) -> Option<&mut TextField> {
        match self.focus {
            FormFocus::Description => Some(&mut self.description),
            FormFocus::Username => Some(&mut self.username),
            FormFocus::Password => Some(&mut self.password),
            FormFocus::Run => None,
        }
    }

    /// Submission effect built from the current form. Credentials are always
    /// sent, empty or not, and are passed through untouched.
    pub fn submit_effect(&self) -> Effect {
        let mut parameters = IndexMap::new();
        parameters.insert("username".to_string(), self.username.value().to_string());
        parameters.insert("password".to_string(), self.password.value().to_string());
        Effect::SubmitWorkflow {
            description: self.description.value().to_string(),
            parameters,
        }
    }
}
