//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::report::{EXIT_FATAL, EXIT_SUCCESS};
use crate::ui::UserInterface;

use super::classify::ClassifyCommand;
use super::decouple::DecoupleCommand;
use super::validate::ValidateCommand;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Invocation and configuration problems. The binary reports these on
    /// stderr and exits with status 2.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: u8,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: EXIT_SUCCESS,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: u8) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// Build a result from a report exit code.
    pub fn from_exit_code(exit_code: u8) -> Self {
        if exit_code == EXIT_SUCCESS {
            Self::success()
        } else {
            Self::failure(exit_code)
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    use_color: bool,
}

impl CommandDispatcher {
    /// Create a new dispatcher. `use_color` applies to rendered reports.
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    /// Dispatch and execute a command.
    ///
    /// Without a subcommand a decoupling run is performed.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Validate(args)) => {
                ValidateCommand::new(args.clone(), self.use_color).execute(ui)
            }
            Some(Commands::Classify(args)) => ClassifyCommand::new(args.clone()).execute(ui),
            None => DecoupleCommand::new(cli.decouple.clone(), self.use_color).execute(ui),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(2);
        assert!(!result.success);
        assert_eq!(result.exit_code, 2);
    }

    #[test]
    fn command_result_from_exit_code() {
        assert!(CommandResult::from_exit_code(EXIT_SUCCESS).success);
        assert!(!CommandResult::from_exit_code(EXIT_FATAL).success);
    }
}
