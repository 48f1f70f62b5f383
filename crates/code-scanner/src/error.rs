//! 코드 스캐너 에러 타입
//!
//! [`CodeScannerError`]는 `From<CodeScannerError> for DetectorError` 구현을 통해
//! `?` 연산자로 탐지기 경계 에러로 전파됩니다.

use a11ylens_core::error::DetectorError;

/// 코드 스캐너 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum CodeScannerError {
    /// 대상을 로컬에서 해석할 수 없음
    #[error("target unresolved: {target}: {reason}")]
    TargetUnresolved {
        /// 요청된 대상
        target: String,
        /// 해석 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// blocking 태스크 실패
    #[error("scan task failed: {0}")]
    Task(String),
}

impl From<CodeScannerError> for DetectorError {
    fn from(err: CodeScannerError) -> Self {
        match err {
            CodeScannerError::TargetUnresolved { target, reason } => {
                DetectorError::TargetUnresolved { target, reason }
            }
            CodeScannerError::Config { field, reason } => {
                DetectorError::Internal(format!("config error: {field}: {reason}"))
            }
            CodeScannerError::Io { path, source } => DetectorError::Io { path, source },
            CodeScannerError::Task(msg) => DetectorError::Internal(msg),
        }
    }
}
