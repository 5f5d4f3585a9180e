//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::session::Role;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CultureMap - cultural venue analytics from the command line
///
/// Aggregates events, participants and ratings of cultural venues and
/// renders dashboards, charts, region listings and reports.
///
/// Examples:
///   culturemap --data data/locais.json dashboard
///   culturemap charts --out ./charts
///   culturemap map --kind Museu --min-rating 8
///   culturemap regions --search centro --page 2
///   culturemap report --format html --output relatorio.html
///   culturemap init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Dataset file path or http(s) URL
    ///
    /// Can also be set via CULTUREMAP_DATA env var or .culturemap.toml config.
    #[arg(short, long, global = true, value_name = "PATH|URL", env = "CULTUREMAP_DATA")]
    pub data: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .culturemap.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// HTTP timeout in seconds for remote datasets
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the dashboard: summary cards and every series
    Dashboard {
        /// Write the segment series as CSV
        #[arg(long, value_name = "FILE")]
        export_csv: Option<PathBuf>,

        /// Print the dashboard as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render the dashboard charts as SVG files
    Charts {
        /// Output directory (default: general.output_dir)
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Print the computed chart geometry as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// List map markers, optionally filtered
    Map {
        /// Venue kind, e.g. "Museu"
        #[arg(long)]
        kind: Option<String>,

        /// Cultural segment the venue must offer
        #[arg(long)]
        segment: Option<String>,

        /// Minimum rating (0-10)
        #[arg(long, value_name = "RATING")]
        min_rating: Option<f64>,

        /// Minimum participants across all events
        #[arg(long, value_name = "COUNT")]
        min_participants: Option<u64>,

        /// Print markers as JSON
        #[arg(long)]
        json: bool,
    },

    /// Browse regions with search and pagination
    Regions {
        /// Case-insensitive search over name and state
        #[arg(short, long)]
        search: Option<String>,

        /// Region kind: bairro or cidade
        #[arg(long)]
        kind: Option<String>,

        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: usize,

        /// Regions per page (default: regions.per_page)
        #[arg(long, value_name = "COUNT")]
        per_page: Option<usize>,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the detail of a place or region
    Show {
        #[command(subcommand)]
        target: ShowTarget,
    },

    /// Generate a report (requires a signed-in session by default)
    Report {
        /// Output format
        #[arg(long, default_value = "markdown", value_name = "FORMAT")]
        format: ReportFormat,

        /// Output file (default: <output_dir>/culturemap_report.<ext>)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Only places in this region
        #[arg(long)]
        region: Option<String>,

        /// Only events of this segment
        #[arg(long)]
        segment: Option<String>,

        /// Only events on or after this date (YYYY-MM-DD or DD/MM/YYYY)
        #[arg(long, value_parser = parse_cli_date, value_name = "DATE")]
        from: Option<NaiveDate>,

        /// Only events on or before this date (YYYY-MM-DD or DD/MM/YYYY)
        #[arg(long, value_parser = parse_cli_date, value_name = "DATE")]
        to: Option<NaiveDate>,

        /// Number of places in the attendance ranking
        #[arg(long, value_name = "COUNT")]
        top: Option<usize>,

        /// Exit with code 2 if the mean rating is below this value
        ///
        /// Useful for CI pipelines.
        #[arg(long, value_name = "RATING")]
        fail_below: Option<f64>,
    },

    /// Save a session for report access
    Login {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        token: String,

        #[arg(long, default_value = "public")]
        role: Role,
    },

    /// Remove the saved session
    Logout,

    /// Print the signed-in user
    Whoami,

    /// Generate a default .culturemap.toml configuration file
    InitConfig,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ShowTarget {
    /// A place, by name
    Place { name: String },
    /// A region, by name ("bairro - cidade" or city)
    Region { name: String },
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// CSV, one section per series
    Csv,
    /// Printable HTML with embedded charts
    Html,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "md",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Html => "html",
        }
    }
}

/// Accept ISO dates as well as the dataset's `DD/MM/YYYY`.
fn parse_cli_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD or DD/MM/YYYY", raw))
}

fn check_rating(name: &str, value: f64) -> Result<(), String> {
    if !(0.0..=10.0).contains(&value) {
        return Err(format!("{} must be between 0 and 10", name));
    }
    Ok(())
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether the command works on the dataset.
    pub fn needs_dataset(&self) -> bool {
        !matches!(
            self.command,
            Command::Login { .. } | Command::Logout | Command::Whoami | Command::InitConfig
        )
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        match self.command {
            Command::Map { min_rating, .. } => {
                if let Some(rating) = min_rating {
                    check_rating("--min-rating", rating)?;
                }
            }
            Command::Regions { page, per_page, .. } => {
                if page == 0 {
                    return Err("Page must be at least 1".to_string());
                }
                if per_page == Some(0) {
                    return Err("Per-page must be at least 1".to_string());
                }
            }
            Command::Report {
                from,
                to,
                top,
                fail_below,
                ..
            } => {
                if let (Some(from), Some(to)) = (from, to) {
                    if from > to {
                        return Err("--from must not be after --to".to_string());
                    }
                }
                if top == Some(0) {
                    return Err("--top must be at least 1".to_string());
                }
                if let Some(rating) = fail_below {
                    check_rating("--fail-below", rating)?;
                }
            }
            Command::Login {
                ref name,
                ref email,
                ref token,
                ..
            } => {
                if name.trim().is_empty() {
                    return Err("Name must not be empty".to_string());
                }
                if !email.contains('@') {
                    return Err("Email must contain '@'".to_string());
                }
                if token.trim().is_empty() {
                    return Err("Token must not be empty".to_string());
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings. `--quiet` wins
    /// over a config file that asks for verbose output.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
