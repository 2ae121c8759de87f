//! Mock UI for testing.

use crate::error::Result;

use super::{OutputMode, SpinnerHandle, UserInterface};

/// Mock UI that captures output for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    interactive: bool,
    confirm_response: Option<bool>,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    reports: Vec<String>,
    spinners: Vec<String>,
    prompts: Vec<String>,
}

impl MockUI {
    /// Create a new mock UI.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the mock report itself as interactive.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// Set the answer returned by every confirmation prompt.
    pub fn set_confirm_response(&mut self, answer: bool) {
        self.confirm_response = Some(answer);
    }

    /// Get all messages.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Get all success messages.
    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    /// Get all warnings.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Get all errors.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Get all printed reports.
    pub fn reports(&self) -> &[String] {
        &self.reports
    }

    /// Get all spinner start messages.
    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }

    /// Get all questions that were asked.
    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts
    }

    /// Check if a message matching `needle` was shown.
    pub fn has_message(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.contains(needle))
    }

    /// Check if an error matching `needle` was shown.
    pub fn has_error(&self, needle: &str) -> bool {
        self.errors.iter().any(|m| m.contains(needle))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        OutputMode::Normal
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn report(&mut self, text: &str) {
        self.reports.push(text.to_string());
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        self.prompts.push(question.to_string());
        Ok(self.confirm_response.unwrap_or(default))
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners.push(message.to_string());
        Box::new(MockSpinner)
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

struct MockSpinner;

impl SpinnerHandle for MockSpinner {
    fn finish_success(&mut self, _msg: &str) {}
    fn finish_error(&mut self, _msg: &str) {}
}
