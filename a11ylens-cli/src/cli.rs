//! CLI argument parsing using clap derive API
//!
//! Purely declarative; no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use a11ylens_core::scan::ScanMode;
use a11ylens_core::types::Impact;

/// Default configuration file, silently replaced by built-in defaults when absent.
pub const DEFAULT_CONFIG_PATH: &str = "a11ylens.toml";

/// a11ylens -- accessibility scans for source trees and live user flows.
///
/// Use `a11ylens <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "a11ylens", version, about, long_about = None)]
pub struct Cli {
    /// Path to the a11ylens.toml configuration file.
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one scan job and print its stored result.
    Scan(ScanArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- scan ----

/// Scan mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Static analysis of the source tree only.
    Code,
    /// Browser flow audit only.
    Browser,
    /// Both; the browser leg is skipped when the base URL is unreachable.
    Full,
}

impl From<ModeArg> for ScanMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Code => Self::Code,
            ModeArg::Browser => Self::Browser,
            ModeArg::Full => Self::Full,
        }
    }
}

/// Severity threshold for `--fail-on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImpactArg {
    Minor,
    Moderate,
    Serious,
    Critical,
}

impl From<ImpactArg> for Impact {
    fn from(impact: ImpactArg) -> Self {
        match impact {
            ImpactArg::Minor => Self::Minor,
            ImpactArg::Moderate => Self::Moderate,
            ImpactArg::Serious => Self::Serious,
            ImpactArg::Critical => Self::Critical,
        }
    }
}

/// Run one scan job.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Scan mode.
    #[arg(long, default_value = "code")]
    pub mode: ModeArg,

    /// Local path (or remote reference) to analyse statically.
    pub target: Option<String>,

    /// Branch or commit of the target.
    #[arg(long = "ref")]
    pub git_ref: Option<String>,

    /// Base URL of the running site (browser/full modes).
    #[arg(long)]
    pub base_url: Option<String>,

    /// TOML file with `[[steps]]` (and optionally `base_url`).
    #[arg(long)]
    pub flow: Option<PathBuf>,

    /// Caller-chosen job id (default: generated).
    #[arg(long)]
    pub job_id: Option<String>,

    /// Write the JSON report to this path.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Include fix suggestions (chat completion when OPENAI_API_KEY is set).
    #[arg(long)]
    pub suggest: bool,

    /// Plan a remediation pull request against owner/repo.
    #[arg(long)]
    pub pr_repo: Option<String>,

    /// Base branch of the remediation pull request.
    #[arg(long, default_value = "main")]
    pub base_branch: String,

    /// Exit with code 4 when any issue is at or above this severity.
    #[arg(long)]
    pub fail_on: Option<ImpactArg>,
}

// ---- config ----

/// Manage a11ylens configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, store, code, browser, context).
        #[arg(long)]
        section: Option<String>,
    },
}
