//! Decouple command implementation.
//!
//! The default command: checks the invocation, runs the pipeline and prints
//! the report.

use std::fs;
use std::path::Path;

use crate::cli::args::DecoupleArgs;
use crate::error::{DecouplerError, Result};
use crate::git::{commit_target, GitCli, VersionControl};
use crate::pipeline::{DecoupleRequest, Decoupler};
use crate::report::{render_report, PlaceholderUsage, Report, USAGE_FILE};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The decouple command implementation.
pub struct DecoupleCommand {
    args: DecoupleArgs,
    use_color: bool,
    vcs: Box<dyn VersionControl>,
}

impl DecoupleCommand {
    /// Create a new decouple command backed by the `git` binary.
    pub fn new(args: DecoupleArgs, use_color: bool) -> Self {
        Self {
            args,
            use_color,
            vcs: Box::new(GitCli),
        }
    }

    /// Replace the version control backend.
    pub fn with_vcs(mut self, vcs: Box<dyn VersionControl>) -> Self {
        self.vcs = vcs;
        self
    }

    /// Get the command arguments.
    pub fn args(&self) -> &DecoupleArgs {
        &self.args
    }

    /// A non-empty target is only written with `--force` or a confirmation.
    fn confirm_target(&self, target: &Path, ui: &mut dyn UserInterface) -> Result<()> {
        if self.args.force || self.args.dry_run || !has_entries(target) {
            return Ok(());
        }

        let question = format!("Target {} is not empty. Write into it?", target.display());
        if ui.is_interactive() && ui.confirm(&question, false)? {
            return Ok(());
        }
        Err(DecouplerError::TargetNotEmpty {
            path: target.to_path_buf(),
        })
    }
}

fn has_entries(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

impl Command for DecoupleCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let (source, target) = match (&self.args.source, &self.args.target) {
            (Some(source), Some(target)) => (source.clone(), target.clone()),
            _ => {
                return Err(DecouplerError::ConfigValidationError {
                    message: "--source and --target are required".to_string(),
                })
            }
        };

        if !source.is_dir() {
            return Err(DecouplerError::InvalidSource {
                path: source,
                message: "not a directory".to_string(),
            });
        }
        let author = if self.args.skip_git {
            None
        } else {
            if !self.vcs.is_repository(&source) {
                return Err(DecouplerError::NotARepository { path: source });
            }
            self.vcs.user_name(&source)
        };
        self.confirm_target(&target, ui)?;

        let mut request = DecoupleRequest::new(&source, &target)
            .dry_run(self.args.dry_run)
            .include(self.args.include.clone())
            .config_file(self.args.config.clone())
            .project_name(self.args.project_name.clone())
            .author(author);
        for (name, value) in &self.args.vars {
            request = request.var(name.as_str(), value.as_str());
        }

        let decoupler = Decoupler::prepare(request)?;

        let mut spinner = ui.start_spinner(&format!("Decoupling {}", source.display()));
        let mut outcome = match decoupler.run() {
            Ok(outcome) => outcome,
            Err(e) => {
                spinner.finish_error("Run aborted");
                return Err(e);
            }
        };
        let written = outcome.manifest.written().count();
        if outcome.incomplete {
            spinner.finish_error(&format!("Time budget exceeded after {} file(s)", written));
        } else {
            spinner.finish_success(&format!("{} file(s) transferred", written));
        }

        let unexpected = PlaceholderUsage::from_findings(&outcome.findings).unexpected;
        if !unexpected.is_empty() && !self.args.dry_run {
            ui.warning(&format!(
                "{} placeholder(s) outside the allowlist, listed in {}",
                unexpected.len(),
                USAGE_FILE
            ));
        }

        if self.args.git_init && !self.args.dry_run && outcome.report().is_success() {
            match commit_target(self.vcs.as_ref(), &target) {
                Some(finding) => outcome.findings.push(finding),
                None => ui.success("Committed template tree"),
            }
        }

        let report = Report::new(&outcome.manifest, &outcome.findings);
        let rendered = render_report(
            &report,
            self.args.format,
            self.use_color,
            ui.output_mode().shows_info(),
        );
        ui.report(&rendered);

        if self.args.dry_run {
            ui.message("Dry run: nothing was written");
        }

        Ok(CommandResult::from_exit_code(report.exit_code()))
    }
}
