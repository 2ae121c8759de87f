//! Classify command implementation.

use crate::cli::args::ClassifyArgs;
use crate::error::Result;
use crate::pipeline::{classify_source, Classification};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Prints the rule and strategy every source path resolves to.
pub struct ClassifyCommand {
    args: ClassifyArgs,
}

impl ClassifyCommand {
    pub fn new(args: ClassifyArgs) -> Self {
        Self { args }
    }
}

fn render(classifications: &[Classification]) -> String {
    let width = classifications
        .iter()
        .map(|c| c.rule.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for c in classifications {
        let note = if c.selected { "" } else { "  (not selected)" };
        out.push_str(&format!(
            "{:<15} {:<width$} {}{}\n",
            c.strategy.as_str(),
            c.rule,
            c.path,
            note,
            width = width
        ));
    }
    out
}

impl Command for ClassifyCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let classifications =
            classify_source(&self.args.source, self.args.config.as_deref(), &self.args.include)?;
        ui.report(&render(&classifications));
        ui.message(&format!("{} path(s) classified", classifications.len()));
        Ok(CommandResult::success())
    }
}
