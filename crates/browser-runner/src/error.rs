//! 흐름 실행기 에러 타입
//!
//! 세션 연산은 [`BrowserRunnerError`]를 반환하고, 실행기는 실패한 단계 이름을 붙여
//! [`BrowserRunnerError::into_step_failure`]로 탐지기 경계 에러로 변환합니다.

use a11ylens_core::error::DetectorError;

/// 흐름 실행기 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum BrowserRunnerError {
    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config { field: String, reason: String },

    /// 주소를 해석할 수 없음
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// 요청 전송 실패 (연결 거부, DNS 등)
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// 2xx가 아닌 응답
    #[error("{url} responded with status {status}")]
    HttpStatus { url: String, status: u16 },

    /// 페이지가 크기 제한을 초과함
    #[error("page {url} exceeds {limit} bytes")]
    PageTooLarge { url: String, limit: usize },

    /// 시간 제한 초과
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// 셀렉터 문법 오류
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// 셀렉터와 일치하는 요소 없음
    #[error("no element matches '{selector}'")]
    ElementNotFound { selector: String },

    /// 요소에 해당 상호작용을 할 수 없음
    #[error("cannot interact with '{selector}': {reason}")]
    NotInteractable { selector: String, reason: String },

    /// 로드된 페이지 없음
    #[error("no page loaded; the flow must navigate first")]
    NoPage,

    /// 단계 설정 누락
    #[error("step is missing '{field}'")]
    MissingField { field: &'static str },

    /// DOM 캡처 쓰기 실패
    #[error("failed to write capture {path}: {source}")]
    Capture {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl BrowserRunnerError {
    /// 실패한 단계 이름을 붙여 탐지기 에러로 변환합니다.
    pub fn into_step_failure(self, step: &str) -> DetectorError {
        match self {
            Self::Timeout {
                operation,
                timeout_ms,
            } => DetectorError::Timeout {
                operation: format!("step '{step}': {operation}"),
                timeout_ms,
            },
            Self::Capture { path, source } => DetectorError::Io { path, source },
            other => DetectorError::StepFailed {
                step: step.to_owned(),
                reason: other.to_string(),
            },
        }
    }
}

impl From<BrowserRunnerError> for DetectorError {
    fn from(err: BrowserRunnerError) -> Self {
        match err {
            BrowserRunnerError::Transport { url, reason } => {
                DetectorError::Unreachable { url, reason }
            }
            BrowserRunnerError::InvalidUrl { url, reason } => {
                DetectorError::InvalidUrl { url, reason }
            }
            BrowserRunnerError::Timeout {
                operation,
                timeout_ms,
            } => DetectorError::Timeout {
                operation,
                timeout_ms,
            },
            BrowserRunnerError::Capture { path, source } => DetectorError::Io { path, source },
            other => DetectorError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_failure_carries_step_name() {
        let err = BrowserRunnerError::ElementNotFound {
            selector: "#checkout".to_owned(),
        };
        match err.into_step_failure("checkout") {
            DetectorError::StepFailed { step, reason } => {
                assert_eq!(step, "checkout");
                assert!(reason.contains("#checkout"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn timeout_keeps_its_kind() {
        let err = BrowserRunnerError::Timeout {
            operation: "navigate http://localhost/".to_owned(),
            timeout_ms: 15_000,
        };
        let detector = err.into_step_failure("home");
        assert!(matches!(
            detector,
            DetectorError::Timeout {
                timeout_ms: 15_000,
                ..
            }
        ));
        assert!(detector.to_string().contains("step 'home'"));
    }

    #[test]
    fn transport_error_is_unreachable() {
        let err = BrowserRunnerError::Transport {
            url: "http://127.0.0.1:9/".to_owned(),
            reason: "connection refused".to_owned(),
        };
        let detector: DetectorError = err.into();
        assert!(matches!(detector, DetectorError::Unreachable { .. }));
    }

    #[test]
    fn malformed_url_is_not_unreachable() {
        let err = BrowserRunnerError::InvalidUrl {
            url: "http://[zz]".to_owned(),
            reason: "invalid IPv6 address".to_owned(),
        };
        let detector: DetectorError = err.into();
        assert!(matches!(detector, DetectorError::InvalidUrl { .. }));
    }
}
