#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`ReportError`)
//! - [`report`]: Report generation and JSON export (`AccessibilityReport`)
//! - [`suggest`]: Fix suggestions (`FixSuggester`, rule-based and chat completion)
//! - [`pr`]: Remediation pull request plan (`RemediationPlan`, `RepoRef`)

pub mod error;
pub mod pr;
pub mod report;
pub mod suggest;

// --- Public API Re-exports ---

pub use error::ReportError;

pub use report::{AccessibilityReport, DISCLAIMER, ReportEvidence, ReportOptions, generate_report};

pub use suggest::{
    ChatCompletionSuggester, CompletionConfig, FixSuggester, FixSuggestion, RuleBasedSuggester,
    Suggester,
};

pub use pr::{RemediationPlan, RepoRef};
