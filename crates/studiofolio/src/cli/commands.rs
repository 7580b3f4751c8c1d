//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Commands shared by every record collection.
#[derive(Debug, Subcommand)]
pub enum EditCommand {
    /// Show one record with its neighbours
    Show {
        /// Record id
        id: i64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Create a record from a JSON form
    Add(FormInput),

    /// Change fields of a record from a JSON object
    Update {
        /// Record id
        id: i64,

        #[command(flatten)]
        input: FormInput,
    },

    /// Delete a record
    Delete {
        /// Record id
        id: i64,
    },

    /// Set the display order; unlisted records follow
    Reorder {
        /// Record ids in the order they should appear
        #[arg(required = true, num_args = 1..)]
        ids: Vec<i64>,
    },
}

/// Where a JSON form comes from.
#[derive(Debug, Clone, Args)]
pub struct FormInput {
    /// JSON file to read (`-` or omitted reads stdin)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Only save if the collection still has this revision
    #[arg(long, value_name = "REVISION")]
    pub if_revision: Option<String>,
}

/// Project commands.
#[derive(Debug, Subcommand)]
pub enum ProjectsCommand {
    /// List projects in display order
    List {
        /// Only show this category (`all` shows everything)
        #[arg(long)]
        category: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// List project categories
    Categories {
        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Show, add, update, delete or reorder
    #[command(flatten)]
    Edit(EditCommand),
}

/// Service and testimonial commands.
#[derive(Debug, Subcommand)]
pub enum RecordCommand {
    /// List records in display order
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show, add, update, delete or reorder
    #[command(flatten)]
    Edit(EditCommand),
}

/// Inbox commands.
#[derive(Debug, Subcommand)]
pub enum MessagesCommand {
    /// List messages, unread first
    List {
        /// Only show unread messages
        #[arg(short, long)]
        unread: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show a message and mark it read
    Show {
        /// Message id
        id: i64,

        /// Leave the message unread
        #[arg(long)]
        keep_unread: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Submit a message as the public contact form would
    Submit {
        /// Sender name
        #[arg(long)]
        name: String,

        /// Sender email
        #[arg(long)]
        email: String,

        /// Message body
        #[arg(long)]
        message: String,
    },

    /// Mark a message read
    Read {
        /// Message id
        id: i64,
    },

    /// Mark a message unread
    Unread {
        /// Message id
        id: i64,
    },

    /// Delete a message
    Delete {
        /// Message id
        id: i64,
    },
}

/// Site settings commands.
#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show the site settings
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Set one text setting, e.g. `siteTitle` or `contactEmail`
    Set {
        /// Setting name
        name: String,

        /// New value
        value: String,
    },

    /// Add a footer social link
    AddLink {
        /// Link text
        label: String,

        /// Target URL
        url: String,
    },

    /// Remove a footer social link by position (from 0)
    RemoveLink {
        /// Position in the list
        index: usize,
    },
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Write the dump here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// Dump produced by `export` (`-` reads stdin)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_edit_command_debug() {
        let cmd = EditCommand::Delete { id: 3 };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Delete"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
