//! Validate command implementation.
//!
//! `decoupler validate` re-runs the validation rules over a tree produced
//! by an earlier run, using the manifest stored in it.

use crate::cli::args::ValidateArgs;
use crate::error::Result;
use crate::pipeline::validate_target;
use crate::report::{render_report, Report};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The validate command implementation.
pub struct ValidateCommand {
    args: ValidateArgs,
    use_color: bool,
}

impl ValidateCommand {
    /// Create a new validate command.
    pub fn new(args: ValidateArgs, use_color: bool) -> Self {
        Self { args, use_color }
    }
}

impl Command for ValidateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let (manifest, findings) = validate_target(&self.args.target, self.args.config.as_deref())?;

        let report = Report::new(&manifest, &findings);
        let rendered = render_report(
            &report,
            self.args.format,
            self.use_color,
            ui.output_mode().shows_info(),
        );
        ui.report(&rendered);

        Ok(CommandResult::from_exit_code(report.exit_code()))
    }
}
