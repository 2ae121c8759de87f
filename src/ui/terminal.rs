//! Terminal UI implementation.

use console::Term;

use crate::error::Result;

use super::non_interactive::NonInteractiveUI;
use super::spinner::ProgressSpinner;
use super::theme::{should_use_colors, DecouplerTheme};
use super::{prompts, HiddenSpinner, OutputMode, SpinnerHandle, UserInterface};

/// Interactive terminal UI.
///
/// Status output goes to stderr so that stdout carries only the report.
pub struct TerminalUI {
    term: Term,
    out: Term,
    mode: OutputMode,
    theme: DecouplerTheme,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            DecouplerTheme::new()
        } else {
            DecouplerTheme::plain()
        };
        Self {
            term: Term::stderr(),
            out: Term::stdout(),
            mode,
            theme,
        }
    }

    fn status(&self, line: &str) {
        if self.mode.shows_status() {
            let _ = self.term.write_line(line);
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.status(msg);
    }

    fn success(&mut self, msg: &str) {
        let line = self.theme.format_success(msg);
        self.status(&line);
    }

    fn warning(&mut self, msg: &str) {
        let line = self.theme.format_warning(msg);
        self.status(&line);
    }

    fn error(&mut self, msg: &str) {
        let _ = self.term.write_line(&self.theme.format_error(msg));
    }

    fn report(&mut self, text: &str) {
        let _ = self.out.write_str(text);
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        prompts::confirm(question, default, &self.term)
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            Box::new(ProgressSpinner::new(message, self.theme.clone()))
        } else {
            Box::new(HiddenSpinner)
        }
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

/// Create the appropriate UI for the session.
pub fn create_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    if interactive && Term::stderr().is_term() {
        Box::new(TerminalUI::new(mode))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}
