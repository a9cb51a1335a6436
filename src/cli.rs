//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Prisma - follower-gain attribution for LinkedIn creators
///
/// Classify scraped LinkedIn posts with a local LLM, credit follower growth
/// to the posts that drove it, and write a performance report with a
/// "winning formula" summary.
///
/// Examples:
///   prisma ingest --payload post.json
///   prisma classify --author "Jane Doe"
///   prisma report --followers data/Content_2024-01-01_2024-03-31_JaneDoe.csv
///   prisma report --format json --window-days 5
///   prisma init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .prisma.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Directory with scraped/classified posts and analytics exports
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Directory reports are written to
    #[arg(long, value_name = "DIR", global = true)]
    pub reports_dir: Option<PathBuf>,

    /// Content creator name (overrides inference from file names)
    #[arg(short, long, value_name = "NAME", global = true)]
    pub author: Option<String>,

    /// Ollama model used for classification and synthesis
    #[arg(short, long, env = "PRISMA_MODEL", global = true)]
    pub model: Option<String>,

    /// Ollama API endpoint URL
    #[arg(long, env = "OLLAMA_URL", global = true)]
    pub ollama_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Append a scraped post payload to the author's JSONL log
    Ingest {
        /// JSON payload file; reads stdin when omitted
        #[arg(long, value_name = "FILE")]
        payload: Option<PathBuf>,
    },

    /// Classify scraped posts with the LLM
    Classify {
        /// Scraped posts JSONL (default: data_dir/scraped_posts_<Author>.jsonl)
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Classified posts JSONL (default: data_dir/classified_posts_<Author>.jsonl)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Pause between classification calls, in milliseconds
        #[arg(long, value_name = "MS")]
        delay_ms: Option<u64>,
    },

    /// Attribute follower gains and write the performance report
    Report {
        /// Classified posts JSONL (default: data_dir/classified_posts_<Author>.jsonl)
        #[arg(long, value_name = "FILE")]
        classified: Option<PathBuf>,

        /// Followers sheet exported as CSV (default: newest Content_*/Contenido_* CSV in data_dir)
        #[arg(long, value_name = "FILE")]
        followers: Option<PathBuf>,

        /// Top posts sheet exported as CSV, used to fill missing publish dates
        #[arg(long, value_name = "FILE")]
        top_posts: Option<PathBuf>,

        /// Attribution window width in days
        #[arg(long, value_name = "DAYS")]
        window_days: Option<u32>,

        /// Structured document format
        #[arg(long, default_value = "markdown", value_name = "FORMAT")]
        format: OutputFormat,

        /// Skip the LLM winning formula synthesis
        #[arg(long)]
        no_synthesis: bool,

        /// Skip SVG chart rendering
        #[arg(long)]
        no_charts: bool,
    },

    /// Generate a default .prisma.toml configuration file
    InitConfig,
}

/// Output format for the structured report document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref url) = self.ollama_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        match &self.command {
            Command::Ingest { payload: Some(path) } => require_file(path)?,
            Command::Classify {
                input: Some(path), ..
            } => require_file(path)?,
            Command::Report {
                classified,
                followers,
                top_posts,
                ..
            } => {
                for path in [classified, followers, top_posts].into_iter().flatten() {
                    require_file(path)?;
                }
            }
            _ => {}
        }

        Ok(())
    }
}

fn require_file(path: &PathBuf) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("File does not exist: {}", path.display()));
    }
    if !path.is_file() {
        return Err(format!("Path is not a file: {}", path.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args(command: Command) -> Args {
        Args {
            command,
            config: None,
            data_dir: None,
            reports_dir: None,
            author: None,
            model: None,
            ollama_url: None,
            timeout: None,
            verbose: false,
            quiet: false,
        }
    }

    fn report_command() -> Command {
        Command::Report {
            classified: None,
            followers: None,
            top_posts: None,
            window_days: None,
            format: OutputFormat::Markdown,
            no_synthesis: false,
            no_charts: false,
        }
    }

    #[test]
    fn test_parse_report_subcommand() {
        let args = Args::try_parse_from([
            "prisma",
            "report",
            "--window-days",
            "5",
            "--format",
            "json",
            "--author",
            "Jane Doe",
        ])
        .unwrap();

        assert_eq!(args.author.as_deref(), Some("Jane Doe"));
        match args.command {
            Command::Report {
                window_days,
                format,
                no_synthesis,
                ..
            } => {
                assert_eq!(window_days, Some(5));
                assert_eq!(format, OutputFormat::Json);
                assert!(!no_synthesis);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args(report_command());
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_ollama_url() {
        let mut args = make_args(Command::InitConfig);
        args.ollama_url = Some("localhost:11434".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_followers_file() {
        let args = make_args(Command::Report {
            classified: None,
            followers: Some(PathBuf::from("/definitely/not/here.csv")),
            top_posts: None,
            window_days: None,
            format: OutputFormat::Markdown,
            no_synthesis: false,
            no_charts: false,
        });
        let err = args.validate().unwrap_err();
        assert!(err.contains("does not exist"));
    }

    #[test]
    fn test_log_level_follows_merged_config() {
        let mut args = make_args(report_command());
        let mut config = crate::config::Config::default();
        config.merge_with_args(&args);
        assert_eq!(config.log_level(args.quiet), tracing::Level::INFO);

        args.verbose = true;
        config.merge_with_args(&args);
        assert_eq!(config.log_level(args.quiet), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(config.log_level(args.quiet), tracing::Level::ERROR);
    }
}
