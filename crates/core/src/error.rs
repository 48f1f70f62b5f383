//! 에러 타입 — 도메인별 에러 정의
//!
//! 상위 경계로 노출되는 결과는 세 가지 종류로 구분됩니다:
//! 잘못된 요청, 탐지기 실패, 조회 실패. [`A11yError::outcome_kind`]로 구분합니다.
//! 조회 실패는 에러가 아니라 정상 반환값(`Option::None`)이며,
//! 작업이 반드시 존재해야 하는 호출자만 [`A11yError::JobNotFound`]로 변환합니다.

/// a11ylens 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum A11yError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 스캔 오케스트레이션 에러
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// 작업을 찾을 수 없음 (미존재 또는 만료)
    #[error("job not found: {job_id}")]
    JobNotFound { job_id: String },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 상위 경계에서 구분해야 하는 결과 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    /// 호출자 입력의 사전 조건 위반
    InvalidRequest,
    /// 탐지기 실행 실패
    DetectorFailure,
    /// 알 수 없거나 만료된 작업
    NotFound,
    /// 그 밖의 내부 에러 (설정, I/O)
    Internal,
}

impl A11yError {
    /// 에러를 상위 경계의 결과 종류로 분류합니다.
    pub fn outcome_kind(&self) -> OutcomeKind {
        match self {
            Self::Scan(ScanError::InvalidRequest { .. }) => OutcomeKind::InvalidRequest,
            Self::Scan(ScanError::DetectorFailure { .. }) => OutcomeKind::DetectorFailure,
            Self::JobNotFound { .. } => OutcomeKind::NotFound,
            Self::Config(_) | Self::Io(_) => OutcomeKind::Internal,
        }
    }
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 탐지기 어댑터 에러
///
/// 어댑터가 반환하는 원시 실패입니다. 오케스트레이터는 정적 탐지기의
/// `TargetUnresolved`만 흡수하고 나머지는 [`ScanError::DetectorFailure`]로 전달합니다.
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    /// 대상을 로컬에서 해석할 수 없음 (경로 없음, 원격 참조)
    #[error("target unresolved: {target}: {reason}")]
    TargetUnresolved { target: String, reason: String },

    /// 기준 주소에 도달할 수 없음
    #[error("base url unreachable: {url}: {reason}")]
    Unreachable { url: String, reason: String },

    /// 주소를 해석할 수 없음
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// 흐름 단계를 완료할 수 없음
    #[error("step '{step}' failed: {reason}")]
    StepFailed { step: String, reason: String },

    /// 어댑터 시간 제한 초과
    #[error("timed out after {timeout_ms}ms: {operation}")]
    Timeout { operation: String, timeout_ms: u64 },

    /// 파일 읽기 실패
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 그 밖의 어댑터 내부 실패
    #[error("{0}")]
    Internal(String),
}

/// 스캔 오케스트레이션 에러
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// 잘못된 요청 — 어떤 탐지기도 실행되기 전에 감지됨
    #[error("invalid request: {field}: {reason}")]
    InvalidRequest { field: String, reason: String },

    /// 탐지기 실패 — 작업 전체가 실패하며 결과는 저장되지 않음
    #[error("{detector} detector failed: {source}")]
    DetectorFailure {
        detector: String,
        #[source]
        source: DetectorError,
    },
}

impl ScanError {
    pub fn invalid_request(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
