//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and route selection.

use crate::routes::Route;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CareDash - caretaker conversation dashboard
///
/// Fetches caretakers, conversations and flags from the backend and
/// shows the dashboard, a caretaker's page or a conversation's page.
///
/// Examples:
///   caredash
///   caredash --person "Mary Ann"
///   caredash --conversation 65f0a1c2e4
///   caredash --route /person/Mary%20Ann --format json
///   caredash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Page to show, as a route path
    ///
    /// One of /, /person/<name> or /conversation/<id>. Identifiers may be
    /// percent-encoded. Defaults to the dashboard.
    #[arg(long, value_name = "PATH", conflicts_with_all = ["person", "conversation"])]
    pub route: Option<String>,

    /// Show the page for this caretaker
    #[arg(short, long, value_name = "NAME", conflicts_with = "conversation")]
    pub person: Option<String>,

    /// Show the page for this conversation id
    #[arg(short = 'C', long, value_name = "ID")]
    pub conversation: Option<String>,

    /// Backend API base address
    ///
    /// Can also be set via CAREDASH_API_URL or .caredash.toml.
    #[arg(long, value_name = "URL", env = "CAREDASH_API_URL")]
    pub api_url: Option<String>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the page to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .caredash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Length of the dashboard summary window in hours
    #[arg(long, value_name = "HOURS")]
    pub window_hours: Option<i64>,

    /// Request timeout in seconds
    ///
    /// By default requests wait until the backend answers.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .caredash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for a page.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(hours) = self.window_hours {
            if hours < 1 {
                return Err("Window must be at least 1 hour".to_string());
            }
        }

        if matches!(self.person.as_deref(), Some("")) {
            return Err("Caretaker name must not be empty".to_string());
        }
        if matches!(self.conversation.as_deref(), Some("")) {
            return Err("Conversation id must not be empty".to_string());
        }

        self.target().map(|_| ())
    }

    /// The page selected by --route, --person or --conversation.
    pub fn target(&self) -> Result<Route, String> {
        if let Some(ref path) = self.route {
            return Route::parse(path);
        }
        if let Some(ref name) = self.person {
            return Ok(Route::Person(name.clone()));
        }
        if let Some(ref id) = self.conversation {
            return Ok(Route::Conversation(id.clone()));
        }
        Ok(Route::Dashboard)
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `verbose_default` comes from `[general] verbose`; `-q` wins over it.
    pub fn log_level(&self, verbose_default: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || verbose_default {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
