//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct. Without a subcommand the
//! binary performs a decoupling run.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::report::ReportFormat;
use crate::template::parse_assignment;

/// Decoupler - turn a project into a reusable template tree.
#[derive(Debug, Parser)]
#[command(name = "decoupler")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
pub struct Cli {
    #[command(flatten)]
    pub decouple: DecoupleArgs,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Re-validate a previously generated template tree
    Validate(ValidateArgs),

    /// Show how each source path would be classified
    Classify(ClassifyArgs),
}

/// Arguments for a decoupling run.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct DecoupleArgs {
    /// Project to decouple
    #[arg(short, long, required = true)]
    pub source: Option<PathBuf>,

    /// Directory the template tree is written to
    #[arg(short, long, required = true)]
    pub target: Option<PathBuf>,

    /// Transform and validate in memory without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Restrict the run to these rules (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Additional configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Bind a placeholder variable (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub vars: Vec<(String, String)>,

    /// Value for PROJECT_NAME
    #[arg(long)]
    pub project_name: Option<String>,

    /// Write into a non-empty target without asking
    #[arg(short, long)]
    pub force: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t)]
    pub format: ReportFormat,

    /// Do not require the source to be a git repository
    #[arg(long)]
    pub skip_git: bool,

    /// Commit the generated tree into a new repository
    #[arg(long)]
    pub git_init: bool,
}

/// Arguments for the `validate` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ValidateArgs {
    /// Generated template tree
    #[arg(short, long)]
    pub target: PathBuf,

    /// Additional configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t)]
    pub format: ReportFormat,
}

/// Arguments for the `classify` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ClassifyArgs {
    /// Project to classify
    #[arg(short, long)]
    pub source: PathBuf,

    /// Additional configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Restrict to these rules (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub include: Vec<String>,
}
