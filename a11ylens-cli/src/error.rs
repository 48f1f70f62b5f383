//! CLI-specific error types and exit code mapping

use a11ylens_core::error::{A11yError, ScanError};
use a11ylens_core::types::Impact;
use a11ylens_report::ReportError;

/// CLI-specific error type.
///
/// The three scan outcomes (invalid request, detector failure, job not found)
/// each get their own variant and exit code.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Caller input violated a scan precondition.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The scan finished but found issues at or above the `--fail-on` threshold.
    #[error("found {count} issue(s) at or above {threshold}")]
    IssuesFound { count: usize, threshold: Impact },

    /// A detector failed; the job was not stored.
    #[error("scan failed: {0}")]
    DetectorFailure(String),

    /// The job id is unknown or expired.
    #[error("job not found: {0}")]
    JobNotFound(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                 |
    /// |------|-----------------------------------------|
    /// | 0    | Success                                 |
    /// | 1    | General / command error                 |
    /// | 2    | Configuration error                     |
    /// | 3    | Invalid scan request                    |
    /// | 4    | Issues at or above `--fail-on`          |
    /// | 5    | Detector failure                        |
    /// | 6    | Job not found                           |
    /// | 10   | IO error                                |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::InvalidRequest(_) => 3,
            Self::IssuesFound { .. } => 4,
            Self::DetectorFailure(_) => 5,
            Self::JobNotFound(_) => 6,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) => 1,
        }
    }
}

impl From<ScanError> for CliError {
    fn from(e: ScanError) -> Self {
        match e {
            ScanError::InvalidRequest { .. } => Self::InvalidRequest(e.to_string()),
            ScanError::DetectorFailure { .. } => Self::DetectorFailure(e.to_string()),
        }
    }
}

impl From<A11yError> for CliError {
    fn from(e: A11yError) -> Self {
        match e {
            A11yError::Config(e) => Self::Config(e.to_string()),
            A11yError::Scan(e) => e.into(),
            A11yError::JobNotFound { job_id } => Self::JobNotFound(job_id),
            A11yError::Io(e) => Self::Io(e),
        }
    }
}

impl From<ReportError> for CliError {
    fn from(e: ReportError) -> Self {
        match e {
            ReportError::Io { source, .. } => Self::Io(source),
            ReportError::Serialize(e) => Self::JsonSerialize(e),
            other => Self::Command(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a11ylens_core::error::{ConfigError, DetectorError};

    #[test]
    fn test_exit_codes_are_distinct_per_outcome() {
        let invalid: CliError = ScanError::invalid_request("target", "missing").into();
        let failed: CliError = ScanError::DetectorFailure {
            detector: "browser".to_owned(),
            source: DetectorError::StepFailed {
                step: "checkout".to_owned(),
                reason: "status 500".to_owned(),
            },
        }
        .into();
        let missing: CliError = A11yError::JobNotFound {
            job_id: "job_1".to_owned(),
        }
        .into();

        assert_eq!(invalid.exit_code(), 3);
        assert_eq!(failed.exit_code(), 5);
        assert_eq!(missing.exit_code(), 6);
    }

    #[test]
    fn test_exit_code_issues_found() {
        let err = CliError::IssuesFound {
            count: 2,
            threshold: Impact::Serious,
        };
        assert_eq!(err.exit_code(), 4);
        assert_eq!(err.to_string(), "found 2 issue(s) at or above serious");
    }

    #[test]
    fn test_exit_code_config_error() {
        let err: CliError = A11yError::Config(ConfigError::FileNotFound {
            path: "a11ylens.toml".to_owned(),
        })
        .into();
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
        assert!(err.to_string().contains("a11ylens.toml"));
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = CliError::Io(io_err);
        assert_eq!(err.exit_code(), 10, "io error should return exit code 10");
    }

    #[test]
    fn test_report_io_error_maps_to_io() {
        let err: CliError = ReportError::Io {
            path: "out/report.json".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn test_report_input_error_is_general() {
        let err: CliError = ReportError::invalid_input("repo", "not owner/repo").into();
        assert_eq!(err.exit_code(), 1);
    }
}
