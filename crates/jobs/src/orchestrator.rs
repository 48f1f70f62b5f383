//! 스캔 오케스트레이터 -- 요청 검증, 탐지기 실행, 병합, 저장
//!
//! [`ScanOrchestrator`]는 작업 하나를 순차 파이프라인으로 실행합니다.
//!
//! # 실행 순서
//!
//! 1. 작업 ID와 요청 검증 (실패 시 어떤 탐지기도 호출하지 않음)
//! 2. 정적 탐지기 (`code`, `full`)
//! 3. 기준 주소 확인 후 동적 탐지기 (`browser`, 그리고 흐름이 주어진 `full`)
//! 4. [`ScanComposition`]으로 병합
//! 5. [`JobStore`]에 저장
//!
//! 정적 대상 해석 실패는 빈 코드 결과로 흡수합니다.
//! 동적 탐지기 실패는 작업 실패이며 부분 결과는 저장하지 않습니다.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{info, warn};

use a11ylens_core::clock::{Clock, SystemClock};
use a11ylens_core::detector::{BrowserDetector, BrowserFlowConfig, CodeDetector, CodeScanRequest};
use a11ylens_core::error::{DetectorError, ScanError};
use a11ylens_core::metrics as m;
use a11ylens_core::scan::{BrowserScanResult, CodeScanResult, FullScanResult, ScanComposition};
use a11ylens_core::types::Impact;

use crate::request::{ScanPlan, ScanRequest, validate_job_id};
use crate::store::JobStore;

/// 스캔 오케스트레이터
///
/// 탐지기와 저장소는 생성 시 명시적으로 주입됩니다.
pub struct ScanOrchestrator<C, B, K: Clock = SystemClock> {
    code: C,
    browser: B,
    store: Arc<JobStore<K>>,
}

impl<C, B, K> ScanOrchestrator<C, B, K>
where
    C: CodeDetector,
    B: BrowserDetector,
    K: Clock,
{
    pub fn new(code: C, browser: B, store: Arc<JobStore<K>>) -> Self {
        Self {
            code,
            browser,
            store,
        }
    }

    pub fn store(&self) -> &Arc<JobStore<K>> {
        &self.store
    }

    pub fn code_detector(&self) -> &C {
        &self.code
    }

    pub fn browser_detector(&self) -> &B {
        &self.browser
    }

    /// 작업 하나를 실행하고 저장된 결과를 반환합니다.
    ///
    /// # Errors
    ///
    /// - [`ScanError::InvalidRequest`]: 사전 조건 위반. 탐지기는 호출되지 않습니다.
    /// - [`ScanError::DetectorFailure`]: 탐지기 실행 실패. 결과는 저장되지 않습니다.
    pub async fn orchestrate(
        &self,
        job_id: &str,
        request: &ScanRequest,
    ) -> Result<Arc<FullScanResult>, ScanError> {
        let mode = request.mode;
        let plan = match validate_job_id(job_id).and_then(|()| request.validate()) {
            Ok(plan) => plan,
            Err(e) => {
                warn!(job_id, mode = %mode, error = %e, "scan request rejected");
                record_failure(mode.as_str(), &e);
                return Err(e);
            }
        };

        counter!(m::SCANS_STARTED_TOTAL, m::LABEL_MODE => mode.as_str()).increment(1);
        info!(job_id, mode = %mode, "scan started");
        let started = Instant::now();

        let composition = match self.run(job_id, plan).await {
            Ok(composition) => composition,
            Err(e) => {
                warn!(job_id, mode = %mode, error = %e, "scan failed, result not stored");
                record_failure(mode.as_str(), &e);
                return Err(e);
            }
        };

        let result = FullScanResult::assemble(job_id, mode, composition);
        let summary = result.summary();
        for impact in Impact::ALL {
            let count = summary.count(impact);
            if count > 0 {
                counter!(m::ISSUES_FOUND_TOTAL, m::LABEL_IMPACT => impact.as_str())
                    .increment(count as u64);
            }
        }

        let stored = self.store.put(result).await;
        let elapsed = started.elapsed();
        counter!(m::SCANS_COMPLETED_TOTAL, m::LABEL_MODE => mode.as_str()).increment(1);
        histogram!(m::SCAN_DURATION_SECONDS, m::LABEL_MODE => mode.as_str())
            .record(elapsed.as_secs_f64());

        info!(
            job_id,
            mode = %mode,
            total = summary.total(),
            critical = summary.critical(),
            serious = summary.serious(),
            moderate = summary.moderate(),
            minor = summary.minor(),
            browser = stored.browser_scan().is_some(),
            elapsed_ms = elapsed.as_millis() as u64,
            "scan completed and stored"
        );
        Ok(stored)
    }

    async fn run(&self, job_id: &str, plan: ScanPlan<'_>) -> Result<ScanComposition, ScanError> {
        match plan {
            ScanPlan::Code(code) => {
                let code = self.run_code(job_id, &code).await?;
                Ok(ScanComposition::CodeOnly(code))
            }
            ScanPlan::Browser(flow) => {
                self.browser
                    .probe(&flow.base_url)
                    .await
                    .map_err(|e| self.browser_failure(e))?;
                let browser = self.run_browser(job_id, flow).await?;
                Ok(ScanComposition::BrowserOnly(browser))
            }
            ScanPlan::Full(code, flow) => {
                let code = self.run_code(job_id, &code).await?;
                let Some(flow) = flow else {
                    return Ok(ScanComposition::CodeOnly(code));
                };

                match self.browser.probe(&flow.base_url).await {
                    Ok(()) => {}
                    Err(e @ DetectorError::Unreachable { .. }) => {
                        warn!(
                            job_id,
                            base_url = %flow.base_url,
                            error = %e,
                            "browser base url unreachable, skipping browser flow"
                        );
                        counter!(m::DETECTOR_DEGRADATIONS_TOTAL, m::LABEL_DETECTOR => "browser")
                            .increment(1);
                        return Ok(ScanComposition::CodeOnly(code));
                    }
                    Err(e) => return Err(self.browser_failure(e)),
                }

                let browser = self.run_browser(job_id, flow).await?;
                Ok(ScanComposition::Combined(code, browser))
            }
        }
    }

    async fn run_code(
        &self,
        job_id: &str,
        request: &CodeScanRequest,
    ) -> Result<CodeScanResult, ScanError> {
        match self.code.scan_code(job_id, request).await {
            Ok(result) => Ok(result),
            Err(DetectorError::TargetUnresolved { target, reason }) => {
                warn!(
                    job_id,
                    target = %target,
                    reason = %reason,
                    "code target unresolved, continuing with empty code result"
                );
                counter!(m::DETECTOR_DEGRADATIONS_TOTAL, m::LABEL_DETECTOR => "code")
                    .increment(1);
                Ok(CodeScanResult::empty(job_id))
            }
            Err(source) => Err(ScanError::DetectorFailure {
                detector: self.code.name().to_owned(),
                source,
            }),
        }
    }

    async fn run_browser(
        &self,
        job_id: &str,
        flow: &BrowserFlowConfig,
    ) -> Result<BrowserScanResult, ScanError> {
        self.browser
            .scan_browser_flow(job_id, flow)
            .await
            .map_err(|e| self.browser_failure(e))
    }

    fn browser_failure(&self, source: DetectorError) -> ScanError {
        ScanError::DetectorFailure {
            detector: self.browser.name().to_owned(),
            source,
        }
    }
}

fn record_failure(mode: &'static str, error: &ScanError) {
    let outcome = match error {
        ScanError::InvalidRequest { .. } => "invalid_request",
        ScanError::DetectorFailure { .. } => "detector_failure",
    };
    counter!(m::SCANS_FAILED_TOTAL, m::LABEL_MODE => mode, m::LABEL_OUTCOME => outcome)
        .increment(1);
}
