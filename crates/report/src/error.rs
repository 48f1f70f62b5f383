//! 결과 소비자 에러 타입

/// 보고서/제안/PR 계획 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// 직렬화 실패
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// 파일 쓰기 실패
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 잘못된 입력 값
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// chat completion 요청 실패
    #[error("completion request failed: {0}")]
    Completion(String),
}

impl ReportError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for ReportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Completion(err.to_string())
    }
}
