//! Command-line interface for studiofolio.
//!
//! This module provides the CLI structure and output formatting for the
//! `folio` binary.

mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, EditCommand, ExportCommand, FormInput, ImportCommand, MessagesCommand,
    OutputFormat, ProjectsCommand, RecordCommand, SettingsCommand, StatsCommand,
};

use crate::logging::Verbosity;

/// folio - Manage the content of a studio portfolio site
///
/// Edits the projects, services, testimonials, messages and settings the
/// site renders, in the same local content store the site reads.
#[derive(Debug, Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage portfolio projects
    #[command(subcommand)]
    Projects(ProjectsCommand),

    /// Manage services
    #[command(subcommand)]
    Services(RecordCommand),

    /// Manage testimonials
    #[command(subcommand)]
    Testimonials(RecordCommand),

    /// Read and manage contact messages
    #[command(subcommand)]
    Messages(MessagesCommand),

    /// View or change site settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Show content counts
    Stats(StatsCommand),

    /// Dump every stored key as one JSON object
    Export(ExportCommand),

    /// Load a dump produced by `export`
    Import(ImportCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Info,
                2 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "folio");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(parse(&["folio", "stats"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["folio", "-q", "stats"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["folio", "-v", "stats"]).verbosity(), Verbosity::Info);
        assert_eq!(parse(&["folio", "-vv", "stats"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["folio", "-vvv", "stats"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_projects_list_with_category() {
        let cli = parse(&["folio", "projects", "list", "--category", "Branding"]);
        let Command::Projects(ProjectsCommand::List { category, format }) = cli.command else {
            panic!("expected projects list");
        };
        assert_eq!(category.as_deref(), Some("Branding"));
        assert_eq!(format, OutputFormat::Table);
    }

    #[test]
    fn test_parse_shared_edit_commands() {
        let cli = parse(&["folio", "services", "show", "3", "-f", "json"]);
        assert!(matches!(
            cli.command,
            Command::Services(RecordCommand::Edit(EditCommand::Show {
                id: 3,
                format: OutputFormat::Json
            }))
        ));

        let cli = parse(&["folio", "projects", "reorder", "5", "2", "9"]);
        let Command::Projects(ProjectsCommand::Edit(EditCommand::Reorder { ids })) = cli.command
        else {
            panic!("expected reorder");
        };
        assert_eq!(ids, vec![5, 2, 9]);
    }

    #[test]
    fn test_parse_update_with_revision() {
        let cli = parse(&[
            "folio",
            "testimonials",
            "update",
            "7",
            "form.json",
            "--if-revision",
            "abc",
        ]);
        let Command::Testimonials(RecordCommand::Edit(EditCommand::Update { id, input })) =
            cli.command
        else {
            panic!("expected update");
        };
        assert_eq!(id, 7);
        assert_eq!(input.file, Some(PathBuf::from("form.json")));
        assert_eq!(input.if_revision.as_deref(), Some("abc"));
    }

    #[test]
    fn test_parse_messages_submit() {
        let cli = parse(&[
            "folio",
            "messages",
            "submit",
            "--name",
            "Ada",
            "--email",
            "ada@example.com",
            "--message",
            "Hello studio",
        ]);
        assert!(matches!(
            cli.command,
            Command::Messages(MessagesCommand::Submit { .. })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["folio", "-c", "/custom/config.toml", "stats"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_reorder_requires_ids() {
        assert!(Cli::try_parse_from(["folio", "services", "reorder"]).is_err());
    }
}
