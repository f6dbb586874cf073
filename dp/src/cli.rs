//! CLI command definitions and subcommands

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// DraftPlan - calendar-aware draft teaching schedules
#[derive(Parser)]
#[command(
    name = "dp",
    about = "Propose, edit and commit week-by-week teaching schedules",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show usable teaching days and weeks for a date range
    Window {
        #[command(flatten)]
        scope: ScopeArgs,

        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last day of the range, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the ordered curriculum for a scope
    Curriculum {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Generate a draft, apply edits, and optionally commit it
    Plan {
        #[command(flatten)]
        scope: ScopeArgs,

        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last day of the range, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        /// Teacher who owns the draft
        #[arg(long, default_value = "teacher")]
        teacher: String,

        /// Class the draft is for
        #[arg(long = "class", default_value = "class")]
        class_id: String,

        /// Leave a topic out of the schedule (repeatable)
        #[arg(long, value_name = "TOPIC")]
        exclude: Vec<String>,

        /// Move a topic to a 0-based position, e.g. t3=0 (repeatable)
        #[arg(long = "move", value_name = "TOPIC=POS", value_parser = parse_assignment)]
        moves: Vec<(String, u32)>,

        /// Override a topic's duration in weeks, e.g. t2=3 (repeatable)
        #[arg(long, value_name = "TOPIC=WEEKS", value_parser = parse_assignment)]
        repace: Vec<(String, u32)>,

        /// Write the final draft as lesson records
        #[arg(long)]
        commit: bool,

        /// Lesson records file (overrides storage.lessons-path)
        #[arg(long)]
        lessons: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Where to read calendar and curriculum data, and for which scope
#[derive(Debug, Args)]
pub struct ScopeArgs {
    /// Fixture file (overrides fixture.path from config)
    #[arg(long)]
    pub fixture: Option<PathBuf>,

    /// Level or grade
    #[arg(long)]
    pub level: String,

    /// Subject
    #[arg(long)]
    pub subject: String,
}

/// Output format for command results
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

/// Parse `NAME=NUMBER`
pub fn parse_assignment(s: &str) -> Result<(String, u32), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected TOPIC=NUMBER, got '{}'", s))?;
    if name.is_empty() {
        return Err(format!("Missing topic in '{}'", s));
    }
    let value = value
        .parse::<u32>()
        .map_err(|e| format!("Invalid number in '{}': {}", s, e))?;
    Ok((name.to_string(), value))
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("draftplan")
        .join("logs")
        .join("draftplan.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text pointing at the log file
pub fn generate_after_help() -> String {
    debug!("generate_after_help: called");
    format!("Logs are written to: {}", get_log_path().display())
}
