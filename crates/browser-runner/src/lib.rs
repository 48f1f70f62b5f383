#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`BrowserRunnerError`)
//! - [`config`]: Runner configuration (`BrowserRunnerConfig`)
//! - [`session`]: HTTP page session (`PageSession`, navigate / click / type / wait)
//! - [`audit`]: axe-style page audit (`audit_page`, `css_path`, `normalize_impact`)
//! - [`capture`]: Per-step DOM captures (`CaptureWriter`)
//! - [`runner`]: Dynamic detector (`HttpFlowRunner`, `BrowserDetector` impl)
//!
//! # Architecture
//!
//! ```text
//! BrowserFlowConfig --> PageSession --> audit_page --> BrowserFlowStep --> BrowserScanResult
//!                                   \-> CaptureWriter
//! ```

pub mod audit;
pub mod capture;
pub mod config;
pub mod error;
pub mod runner;
pub mod session;

// --- Public API Re-exports ---

pub use runner::{HttpFlowRunner, LANDING_STEP};

pub use config::BrowserRunnerConfig;

pub use error::BrowserRunnerError;

pub use audit::{AuditRule, RULES, audit_page, css_path, normalize_impact};
pub use capture::CaptureWriter;
pub use session::{Page, PageSession};
