//! Command line argument parsing for the lookup CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::engine::LookupConfig;
use crate::error::Result;

/// seforim-lookup - prefix search over a Hebrew book catalog
#[derive(Parser, Debug, Clone)]
#[command(name = "seforim-lookup")]
#[command(about = "Prefix search over Hebrew book titles and tables of contents")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct LookupArgs {
    /// Verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Lookup index directory
    #[arg(long, value_name = "DIR", env = "SEFORIM_LOOKUP_INDEX_DIR", global = true)]
    pub index_dir: Option<PathBuf>,

    /// SQLite morphological dictionary
    #[arg(long, value_name = "FILE", env = "SEFORIM_LOOKUP_DICTIONARY", global = true)]
    pub dictionary: Option<PathBuf>,

    /// Search literal tokens only
    #[arg(long, global = true)]
    pub no_expand: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl LookupArgs {
    /// Effective verbosity: 0 quiet, 1 default, 2 verbose, 3+ debug.
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }

    /// Configuration file (or defaults) with command-line overrides applied.
    pub fn lookup_config(&self) -> Result<LookupConfig> {
        let mut config = match &self.config {
            Some(path) => LookupConfig::from_file(path)?,
            None => LookupConfig::default(),
        };

        if let Some(dir) = &self.index_dir {
            config.index_dir = dir.clone();
        }
        if let Some(path) = &self.dictionary {
            config.dictionary_path = Some(path.clone());
        }
        if self.no_expand {
            config.expand_queries = false;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Search book titles by prefix
    Books(SearchArgs),

    /// Search table-of-contents entries by prefix
    Toc(SearchArgs),

    /// Show the normalized form and tokens of a text
    Normalize(TextArgs),

    /// Show the dictionary groups for a token
    Expand(TextArgs),

    /// Show the clauses a query turns into
    Explain(TextArgs),

    /// Show index and dictionary statistics
    Stats,
}

/// Arguments for prefix searches
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Maximum number of results (defaults to the configured limit)
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// A single text argument
#[derive(Parser, Debug, Clone)]
pub struct TextArgs {
    #[arg(value_name = "TEXT")]
    pub text: String,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_books_command() {
        let args = LookupArgs::try_parse_from([
            "seforim-lookup",
            "--index-dir",
            "/path/to/index",
            "books",
            "שולחן ער",
            "--limit",
            "5",
        ])
        .unwrap();

        assert_eq!(args.index_dir, Some(PathBuf::from("/path/to/index")));
        if let Command::Books(search) = args.command {
            assert_eq!(search.query, "שולחן ער");
            assert_eq!(search.limit, Some(5));
        } else {
            panic!("Expected Books command");
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = LookupArgs::try_parse_from([
            "seforim-lookup",
            "toc",
            "בראשית",
            "-f",
            "json",
            "--pretty",
            "--no-expand",
        ])
        .unwrap();

        assert_eq!(args.output_format, OutputFormat::Json);
        assert!(args.pretty);
        assert!(args.no_expand);
        assert!(matches!(args.command, Command::Toc(ref s) if s.limit.is_none()));
    }

    #[test]
    fn test_verbosity_levels() {
        let args = LookupArgs::try_parse_from(["seforim-lookup", "stats"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = LookupArgs::try_parse_from(["seforim-lookup", "-v", "stats"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        let args = LookupArgs::try_parse_from(["seforim-lookup", "-vv", "stats"]).unwrap();
        assert_eq!(args.verbosity(), 3);

        let args = LookupArgs::try_parse_from(["seforim-lookup", "-v", "--quiet", "stats"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_overrides_applied_to_config() {
        let args = LookupArgs::try_parse_from([
            "seforim-lookup",
            "--index-dir",
            "/srv/index",
            "--dictionary",
            "/srv/lexical.db",
            "--no-expand",
            "explain",
            "ספרים",
        ])
        .unwrap();

        let config = args.lookup_config().unwrap();
        assert_eq!(config.index_dir, PathBuf::from("/srv/index"));
        assert_eq!(config.dictionary_path, Some(PathBuf::from("/srv/lexical.db")));
        assert!(!config.expand_queries);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let args = LookupArgs::try_parse_from([
            "seforim-lookup",
            "--config",
            "/nonexistent/lookup.json",
            "stats",
        ])
        .unwrap();
        assert!(args.lookup_config().is_err());
    }
}
