//! 탐지기 trait — 정적 코드 분석기와 동적 브라우저 감사기의 능력 인터페이스
//!
//! 오케스트레이터는 두 trait을 제네릭으로 받아 호출합니다.
//! 테스트에서는 결정적인 가짜 구현으로 대체할 수 있습니다.
//!
//! 두 어댑터 모두 자신의 고유 심각도 체계를 [`Impact`](crate::types::Impact)로
//! 정규화한 뒤 이슈를 반환해야 합니다.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::DetectorError;
use crate::scan::{BrowserScanResult, CodeScanResult};
use crate::types::ScanContext;

/// 정적 코드 분석 요청
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeScanRequest {
    /// 로컬 경로 또는 원격 참조
    pub target: String,
    /// 브랜치/커밋 참조
    pub git_ref: Option<String>,
    pub context: ScanContext,
}

impl CodeScanRequest {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            git_ref: None,
            context: ScanContext::default(),
        }
    }
}

/// 흐름 단계 동작
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowAction {
    #[default]
    Navigate,
    Click,
    Type,
    Wait,
}

impl FlowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Navigate => "navigate",
            Self::Click => "click",
            Self::Type => "type",
            Self::Wait => "wait",
        }
    }

    /// 상호작용 동작 여부 (셀렉터 필요)
    pub fn needs_selector(&self) -> bool {
        matches!(self, Self::Click | Self::Type)
    }
}

impl std::fmt::Display for FlowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 흐름 단계 설정
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStepConfig {
    /// 단계 이름
    pub name: String,
    /// 이동할 URL (상대 경로면 `base_url` 기준)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// 동작 (생략 시 navigate)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<FlowAction>,
    /// click/type 대상 CSS 셀렉터
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// type 입력값
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl FlowStepConfig {
    /// 이 단계의 실제 동작
    pub fn effective_action(&self) -> FlowAction {
        self.action.unwrap_or_default()
    }
}

/// 브라우저 흐름 설정 — 기준 주소와 순서 있는 단계 목록
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserFlowConfig {
    pub base_url: String,
    #[serde(default)]
    pub steps: Vec<FlowStepConfig>,
}

impl BrowserFlowConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            steps: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: FlowStepConfig) -> Self {
        self.steps.push(step);
        self
    }
}

/// 정적 탐지기 능력
///
/// 구현체는 이슈마다 소스 파일 위치를 붙이고, 실제로 검사한 파일 목록을 보고해야 합니다.
/// 대상을 로컬에서 해석할 수 없으면 [`DetectorError::TargetUnresolved`]를 반환합니다.
pub trait CodeDetector: Send + Sync {
    /// 탐지기 이름
    fn name(&self) -> &str;

    /// 대상 코드베이스를 스캔합니다.
    fn scan_code(
        &self,
        job_id: &str,
        request: &CodeScanRequest,
    ) -> impl Future<Output = Result<CodeScanResult, DetectorError>> + Send;
}

/// 동적 탐지기 능력
///
/// 구현체는 단계를 주어진 순서로 실행하고, 이슈마다 DOM 셀렉터를 붙이며,
/// 단계 하나라도 완료하지 못하면 부분 결과 없이 에러를 반환해야 합니다.
pub trait BrowserDetector: Send + Sync {
    /// 탐지기 이름
    fn name(&self) -> &str;

    /// 기준 주소에 도달 가능한지 확인합니다.
    fn probe(&self, base_url: &str) -> impl Future<Output = Result<(), DetectorError>> + Send;

    /// 흐름을 실행하고 단계별로 감사합니다.
    fn scan_browser_flow(
        &self,
        job_id: &str,
        config: &BrowserFlowConfig,
    ) -> impl Future<Output = Result<BrowserScanResult, DetectorError>> + Send;
}
