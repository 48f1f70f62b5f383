#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`request`]: Scan request and pre-flight validation (`ScanRequest`)
//! - [`store`]: TTL job store (`JobStore`, `JobResults`, `SweeperHandle`)
//! - [`orchestrator`]: Sequential scan pipeline (`ScanOrchestrator`)
//!
//! # Architecture
//!
//! ```text
//! ScanRequest --validate--> CodeDetector --> BrowserDetector --> FullScanResult --> JobStore
//!                                                                                     |
//!                                              report / suggest / pr <-- JobResults --+
//! ```

pub mod orchestrator;
pub mod request;
pub mod store;

// --- Public API Re-exports ---

pub use orchestrator::ScanOrchestrator;

pub use request::{ScanPlan, ScanRequest, new_job_id, validate_job_id};

pub use store::{JobResults, JobStore, SweeperHandle};
