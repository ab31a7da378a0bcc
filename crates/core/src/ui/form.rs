//! New-task input form

/// Text typed into the new-task input
#[derive(Debug, Clone, Default)]
pub struct NewTaskForm {
    input: String,
}

impl NewTaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Text to submit, or `None` when the input is blank
    pub fn submission(&self) -> Option<String> {
        if self.input.trim().is_empty() {
            None
        } else {
            Some(self.input.clone())
        }
    }

    pub fn clear(&mut self) {
        self.input.clear();
    }
}
