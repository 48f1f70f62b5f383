#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`CodeScannerError`)
//! - [`config`]: Scanner configuration (`CodeScannerConfig`)
//! - [`markup`]: Markup parsing and source location (`MarkupDocument`)
//! - [`rules`]: Accessibility rules (`Rule` trait, `RuleMeta`, default rule set)
//! - [`scanner`]: Static detector (`StaticCodeScanner`, `CodeDetector` impl)
//!
//! # Architecture
//!
//! ```text
//! target --> walkdir --> MarkupDocument --> Rule::check --> Issue --> CodeScanResult
//! ```

pub mod config;
pub mod error;
pub mod markup;
pub mod rules;
pub mod scanner;

// --- Public API Re-exports ---

pub use scanner::StaticCodeScanner;

pub use config::CodeScannerConfig;

pub use error::CodeScannerError;

pub use markup::MarkupDocument;

pub use rules::{LintLevel, Rule, RuleMeta, Violation, default_rules};
