//! 스캔 요청과 사전 검증
//!
//! 모든 검증은 탐지기를 호출하기 전에 끝나야 합니다.
//! 검증에 실패한 요청은 어떤 부수 효과도 남기지 않습니다.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use a11ylens_core::detector::{BrowserFlowConfig, CodeScanRequest};
use a11ylens_core::error::ScanError;
use a11ylens_core::scan::ScanMode;
use a11ylens_core::types::ScanContext;

/// 작업 ID 최대 길이
const MAX_JOB_ID_LEN: usize = 128;

/// 새 작업 ID를 생성합니다 (`job_{uuid}`).
pub fn new_job_id() -> String {
    format!("job_{}", uuid::Uuid::new_v4().simple())
}

/// 스캔 요청
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub mode: ScanMode,
    /// 정적 분석 대상 (로컬 경로 또는 원격 참조)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    /// 브라우저 흐름 (`browser` 모드 필수, `full` 모드 선택)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<BrowserFlowConfig>,
    #[serde(default)]
    pub context: ScanContext,
}

/// 검증을 통과한 요청의 실행 계획
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanPlan<'a> {
    Code(CodeScanRequest),
    Browser(&'a BrowserFlowConfig),
    Full(CodeScanRequest, Option<&'a BrowserFlowConfig>),
}

impl ScanRequest {
    /// 정적 분석만 수행하는 요청
    pub fn code(target: impl Into<String>) -> Self {
        Self {
            mode: ScanMode::Code,
            target: Some(target.into()),
            git_ref: None,
            browser: None,
            context: ScanContext::default(),
        }
    }

    /// 브라우저 흐름만 수행하는 요청
    pub fn browser(flow: BrowserFlowConfig) -> Self {
        Self {
            mode: ScanMode::Browser,
            target: None,
            git_ref: None,
            browser: Some(flow),
            context: ScanContext::default(),
        }
    }

    /// 정적 분석과 (설정된 경우) 브라우저 흐름을 모두 수행하는 요청
    pub fn full(target: impl Into<String>, flow: Option<BrowserFlowConfig>) -> Self {
        Self {
            mode: ScanMode::Full,
            target: Some(target.into()),
            git_ref: None,
            browser: flow,
            context: ScanContext::default(),
        }
    }

    pub fn with_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = Some(git_ref.into());
        self
    }

    pub fn with_context(mut self, context: ScanContext) -> Self {
        self.context = context;
        self
    }

    /// 요청을 검증하고 실행 계획을 반환합니다.
    ///
    /// # Errors
    ///
    /// 사전 조건을 위반하면 [`ScanError::InvalidRequest`]를 반환합니다.
    pub fn validate(&self) -> Result<ScanPlan<'_>, ScanError> {
        match self.mode {
            ScanMode::Code => Ok(ScanPlan::Code(self.code_request()?)),
            ScanMode::Browser => {
                let flow = self.browser.as_ref().ok_or_else(|| {
                    ScanError::invalid_request("browser", "browser mode requires a base url")
                })?;
                validate_flow(flow)?;
                Ok(ScanPlan::Browser(flow))
            }
            ScanMode::Full => {
                let code = self.code_request()?;
                if let Some(flow) = &self.browser {
                    validate_flow(flow)?;
                }
                Ok(ScanPlan::Full(code, self.browser.as_ref()))
            }
        }
    }

    fn code_request(&self) -> Result<CodeScanRequest, ScanError> {
        let target = self
            .target
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ScanError::invalid_request(
                    "target",
                    format!("{} mode requires a code target", self.mode),
                )
            })?;

        Ok(CodeScanRequest {
            target: target.to_owned(),
            git_ref: self
                .git_ref
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_owned),
            context: self.context.clone(),
        })
    }
}

/// 호출자가 지정한 작업 ID를 검증합니다.
pub fn validate_job_id(job_id: &str) -> Result<(), ScanError> {
    if job_id.is_empty() {
        return Err(ScanError::invalid_request("job_id", "must not be empty"));
    }
    if job_id.len() > MAX_JOB_ID_LEN {
        return Err(ScanError::invalid_request(
            "job_id",
            format!("must be at most {MAX_JOB_ID_LEN} characters"),
        ));
    }
    if let Some(c) = job_id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(ScanError::invalid_request(
            "job_id",
            format!("invalid character '{c}'"),
        ));
    }
    Ok(())
}

fn validate_flow(flow: &BrowserFlowConfig) -> Result<(), ScanError> {
    check_base_url(&flow.base_url)
        .map_err(|reason| ScanError::invalid_request("browser.base_url", reason))?;

    for (index, step) in flow.steps.iter().enumerate() {
        if step.name.trim().is_empty() {
            return Err(ScanError::invalid_request(
                format!("browser.steps[{index}].name"),
                "must not be empty",
            ));
        }
        let action = step.effective_action();
        let has_selector = step
            .selector
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());
        if action.needs_selector() && !has_selector {
            return Err(ScanError::invalid_request(
                format!("browser.steps[{index}].selector"),
                format!("'{action}' step '{}' requires a selector", step.name),
            ));
        }
    }
    Ok(())
}

/// 네트워크 주소인지 확인합니다: http(s) 스킴과 비어 있지 않은 호스트.
///
/// 흐름 실행기와 같은 URL 파서를 사용하므로 여기서 통과한 주소는
/// 실행기에서도 해석됩니다.
fn check_base_url(raw: &str) -> Result<(), String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("base url is required".to_owned());
    }
    let url = Url::parse(trimmed).map_err(|e| format!("'{trimmed}' is not a valid url: {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!(
            "unsupported scheme '{}', expected http or https",
            url.scheme()
        ));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(format!("'{trimmed}' has no host"));
    }
    Ok(())
}
