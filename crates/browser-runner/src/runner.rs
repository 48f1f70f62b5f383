//! 흐름 실행기 -- 단계 실행, 감사, 캡처
//!
//! [`HttpFlowRunner`]는 core의 [`BrowserDetector`] trait을 구현하여
//! 스캔 작업 조정기에서 동적 탐지기로 사용됩니다.
//!
//! # 내부 흐름
//!
//! ```text
//! BrowserFlowConfig --> PageSession (navigate / click / type / wait)
//!                            |
//!                     현재 DOM --+--> CaptureWriter (선택)
//!                                |
//!                                +--> audit_page (spawn_blocking) --> BrowserFlowStep
//! ```
//!
//! 단계 하나라도 실패하면 그때까지의 단계 결과는 버리고 에러를 반환합니다.

use std::sync::Arc;

use reqwest::Url;
use tracing::{debug, info, warn};

use a11ylens_core::detector::{BrowserDetector, BrowserFlowConfig, FlowAction, FlowStepConfig};
use a11ylens_core::error::DetectorError;
use a11ylens_core::scan::{BrowserFlowStep, BrowserScanResult};

use crate::audit::audit_page;
use crate::capture::CaptureWriter;
use crate::config::BrowserRunnerConfig;
use crate::error::BrowserRunnerError;
use crate::session::PageSession;

/// 단계 목록이 비어 있을 때 사용하는 암묵적 단계 이름
pub const LANDING_STEP: &str = "landing";

/// HTTP 흐름 실행기
pub struct HttpFlowRunner {
    config: Arc<BrowserRunnerConfig>,
    client: reqwest::Client,
    capture: Option<CaptureWriter>,
}

impl HttpFlowRunner {
    /// 설정으로 실행기를 생성합니다.
    ///
    /// # Errors
    ///
    /// 설정 검증 또는 HTTP 클라이언트 생성에 실패하면 에러를 반환합니다.
    pub fn new(config: BrowserRunnerConfig) -> Result<Self, BrowserRunnerError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| BrowserRunnerError::Config {
                field: "user_agent".to_owned(),
                reason: format!("failed to build http client: {e}"),
            })?;
        let capture = config.capture_dir.clone().map(CaptureWriter::new);

        Ok(Self {
            config: Arc::new(config),
            client,
            capture,
        })
    }

    pub fn config(&self) -> &BrowserRunnerConfig {
        &self.config
    }

    async fn run_step(
        &self,
        session: &mut PageSession,
        base: &Url,
        step: &FlowStepConfig,
    ) -> Result<(), BrowserRunnerError> {
        match step.effective_action() {
            FlowAction::Navigate => {
                let url = resolve_step_url(base, step)?;
                session.navigate(url).await
            }
            FlowAction::Click => {
                let selector = required_selector(step)?;
                session.click(selector).await
            }
            FlowAction::Type => {
                let selector = required_selector(step)?;
                session
                    .type_text(selector, step.value.as_deref().unwrap_or_default())
                    .await
            }
            FlowAction::Wait => {
                session.wait().await;
                Ok(())
            }
        }
    }
}

impl BrowserDetector for HttpFlowRunner {
    fn name(&self) -> &str {
        "browser"
    }

    async fn probe(&self, base_url: &str) -> Result<(), DetectorError> {
        let url = parse_base_url(base_url)?;
        let timeout = self.config.probe_timeout();

        match self.client.get(url.clone()).timeout(timeout).send().await {
            Ok(response) => {
                debug!(url = %url, status = response.status().as_u16(), "base url reachable");
                Ok(())
            }
            Err(e) if e.is_timeout() => Err(DetectorError::Unreachable {
                url: url.to_string(),
                reason: format!("no response within {}ms", self.config.probe_timeout_ms),
            }),
            Err(e) => Err(DetectorError::Unreachable {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn scan_browser_flow(
        &self,
        job_id: &str,
        config: &BrowserFlowConfig,
    ) -> Result<BrowserScanResult, DetectorError> {
        let base = parse_base_url(&config.base_url)?;
        let steps = if config.steps.is_empty() {
            vec![FlowStepConfig {
                name: LANDING_STEP.to_owned(),
                ..FlowStepConfig::default()
            }]
        } else {
            config.steps.clone()
        };

        info!(job_id, base_url = %base, steps = steps.len(), "starting browser flow");

        let mut session = PageSession::new(self.client.clone(), Arc::clone(&self.config));
        let mut results = Vec::with_capacity(steps.len());

        for (index, step) in steps.iter().enumerate() {
            let number = index + 1;
            let action = step.effective_action();
            debug!(job_id, step = %step.name, number, action = %action, "running step");

            if let Err(e) = self.run_step(&mut session, &base, step).await {
                warn!(job_id, step = %step.name, error = %e, "browser flow step failed");
                return Err(e.into_step_failure(&step.name));
            }

            let (url, body) = match session.page() {
                Some(page) => (page.url.to_string(), Some(page.body.clone())),
                None => (base.to_string(), None),
            };

            let mut capture_path = None;
            let mut issues = Vec::new();
            if let Some(body) = body {
                if let Some(writer) = &self.capture {
                    let reference = writer
                        .write(job_id, number, &step.name, &body)
                        .await
                        .map_err(|e| e.into_step_failure(&step.name))?;
                    capture_path = Some(reference);
                }
                issues = tokio::task::spawn_blocking(move || audit_page(&body, number))
                    .await
                    .map_err(|e| DetectorError::Internal(format!("audit task failed: {e}")))?;
            }

            debug!(job_id, step = %step.name, url = %url, issues = issues.len(), "step audited");
            results.push(BrowserFlowStep {
                name: step.name.clone(),
                url,
                action: Some(action),
                capture_path,
                issues,
            });
        }

        let result = BrowserScanResult::new(job_id, results);
        info!(
            job_id,
            steps = result.steps().len(),
            issues = result.issues().len(),
            "browser flow completed"
        );
        Ok(result)
    }
}

/// 기준 주소를 해석합니다. http(s) 주소만 허용합니다.
pub fn parse_base_url(base_url: &str) -> Result<Url, BrowserRunnerError> {
    let invalid = |reason: String| BrowserRunnerError::InvalidUrl {
        url: base_url.to_owned(),
        reason,
    };
    let url = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_owned()));
    }
    Ok(url)
}

/// 단계 주소 (없으면 기준 주소, 상대 주소는 기준 주소 기준)
fn resolve_step_url(base: &Url, step: &FlowStepConfig) -> Result<Url, BrowserRunnerError> {
    match step.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => {
            base.join(url).map_err(|e| BrowserRunnerError::InvalidUrl {
                url: url.to_owned(),
                reason: e.to_string(),
            })
        }
        _ => Ok(base.clone()),
    }
}

fn required_selector(step: &FlowStepConfig) -> Result<&str, BrowserRunnerError> {
    step.selector
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(BrowserRunnerError::MissingField { field: "selector" })
}
