//! 스캔 결과 타입 — 탐지기별 결과와 병합된 전체 결과
//!
//! 하위 결과의 요약은 항상 생성자에서 이슈 목록으로부터 계산되며,
//! 이슈와 분리되어 저장되거나 수정되지 않습니다.
//!
//! # 병합 규칙
//!
//! [`FullScanResult::assemble`]은 [`ScanComposition`] 변형이 가진 하위 결과만으로
//! 이슈 합집합(코드 이슈 다음 브라우저 이슈, 각자의 순서 유지)과 요약을 만듭니다.
//!
//! 역직렬화도 같은 생성자를 거칩니다. 입력의 `summary`와 파생 이슈 목록은
//! 무시되고 다시 계산됩니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::detector::FlowAction;
use crate::summary::{SeveritySummary, summarize};
use crate::types::Issue;

/// 스캔 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// 정적 코드 분석만
    Code,
    /// 브라우저 흐름 감사만
    Browser,
    /// 둘 다
    Full,
}

impl ScanMode {
    /// 문자열에서 스캔 모드를 파싱합니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "code" => Some(Self::Code),
            "browser" => Some(Self::Browser),
            "full" => Some(Self::Full),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Browser => "browser",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 정적 코드 스캔 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CodeScanRepr")]
pub struct CodeScanResult {
    job_id: String,
    issues: Vec<Issue>,
    /// 실제로 검사한 파일 경로
    files_scanned: Vec<String>,
    summary: SeveritySummary,
}

impl CodeScanResult {
    /// 이슈 목록에서 요약을 계산하여 결과를 생성합니다.
    pub fn new(job_id: impl Into<String>, issues: Vec<Issue>, files_scanned: Vec<String>) -> Self {
        let summary = summarize(&issues);
        Self {
            job_id: job_id.into(),
            issues,
            files_scanned,
            summary,
        }
    }

    /// 이슈가 없는 구조적으로 완전한 결과
    pub fn empty(job_id: impl Into<String>) -> Self {
        Self::new(job_id, Vec::new(), Vec::new())
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn files_scanned(&self) -> &[String] {
        &self.files_scanned
    }

    pub fn summary(&self) -> SeveritySummary {
        self.summary
    }
}

/// 브라우저 흐름의 한 단계
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserFlowStep {
    /// 단계 이름
    pub name: String,
    /// 단계 실행 후의 URL
    pub url: String,
    /// 수행한 동작
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<FlowAction>,
    /// 캡처 참조 (설정된 경우)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_path: Option<String>,
    /// 이 단계에서 발견된 이슈
    pub issues: Vec<Issue>,
}

/// 브라우저 흐름 감사 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BrowserScanRepr")]
pub struct BrowserScanResult {
    job_id: String,
    steps: Vec<BrowserFlowStep>,
    issues: Vec<Issue>,
    summary: SeveritySummary,
}

impl BrowserScanResult {
    /// 단계 목록에서 평탄화된 이슈 목록과 요약을 계산하여 결과를 생성합니다.
    pub fn new(job_id: impl Into<String>, steps: Vec<BrowserFlowStep>) -> Self {
        let issues: Vec<Issue> = steps
            .iter()
            .flat_map(|step| step.issues.iter().cloned())
            .collect();
        let summary = summarize(&issues);
        Self {
            job_id: job_id.into(),
            steps,
            issues,
            summary,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn steps(&self) -> &[BrowserFlowStep] {
        &self.steps
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn summary(&self) -> SeveritySummary {
        self.summary
    }
}

/// 실제로 실행된 하위 결과 조합
#[derive(Debug, Clone)]
pub enum ScanComposition {
    CodeOnly(CodeScanResult),
    BrowserOnly(BrowserScanResult),
    Combined(CodeScanResult, BrowserScanResult),
}

/// 병합된 전체 스캔 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FullScanRepr")]
pub struct FullScanResult {
    job_id: String,
    mode: ScanMode,
    code_scan: CodeScanResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    browser_scan: Option<BrowserScanResult>,
    issues: Vec<Issue>,
    summary: SeveritySummary,
}

impl FullScanResult {
    /// 하위 결과 조합을 병합합니다.
    ///
    /// `BrowserOnly`인 경우 코드 결과는 이슈가 없는 자리표시자로 채워집니다.
    pub fn assemble(job_id: impl Into<String>, mode: ScanMode, composition: ScanComposition) -> Self {
        let job_id = job_id.into();
        let (code_scan, browser_scan) = match composition {
            ScanComposition::CodeOnly(code) => (code, None),
            ScanComposition::BrowserOnly(browser) => (CodeScanResult::empty(job_id.clone()), Some(browser)),
            ScanComposition::Combined(code, browser) => (code, Some(browser)),
        };

        let mut issues = code_scan.issues().to_vec();
        if let Some(browser) = &browser_scan {
            issues.extend(browser.issues().iter().cloned());
        }
        let summary = summarize(&issues);

        debug_assert_eq!(
            summary,
            code_scan.summary() + browser_scan.as_ref().map(BrowserScanResult::summary).unwrap_or_default()
        );

        Self {
            job_id,
            mode,
            code_scan,
            browser_scan,
            issues,
            summary,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn code_scan(&self) -> &CodeScanResult {
        &self.code_scan
    }

    pub fn browser_scan(&self) -> Option<&BrowserScanResult> {
        self.browser_scan.as_ref()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn summary(&self) -> SeveritySummary {
        self.summary
    }
}

// 역직렬화 전용 표현: 원천 데이터만 읽고 파생 값은 생성자가 다시 계산합니다.

#[derive(Deserialize)]
struct CodeScanRepr {
    job_id: String,
    #[serde(default)]
    issues: Vec<Issue>,
    #[serde(default)]
    files_scanned: Vec<String>,
}

impl From<CodeScanRepr> for CodeScanResult {
    fn from(repr: CodeScanRepr) -> Self {
        Self::new(repr.job_id, repr.issues, repr.files_scanned)
    }
}

#[derive(Deserialize)]
struct BrowserScanRepr {
    job_id: String,
    #[serde(default)]
    steps: Vec<BrowserFlowStep>,
}

impl From<BrowserScanRepr> for BrowserScanResult {
    fn from(repr: BrowserScanRepr) -> Self {
        Self::new(repr.job_id, repr.steps)
    }
}

#[derive(Deserialize)]
struct FullScanRepr {
    job_id: String,
    mode: ScanMode,
    code_scan: CodeScanResult,
    #[serde(default)]
    browser_scan: Option<BrowserScanResult>,
}

impl From<FullScanRepr> for FullScanResult {
    fn from(repr: FullScanRepr) -> Self {
        let composition = match repr.browser_scan {
            Some(browser) => ScanComposition::Combined(repr.code_scan, browser),
            None => ScanComposition::CodeOnly(repr.code_scan),
        };
        Self::assemble(repr.job_id, repr.mode, composition)
    }
}

impl fmt::Display for FullScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FullScanResult(job={}, mode={}, issues={}, browser={})",
            self.job_id,
            self.mode,
            self.summary.total(),
            self.browser_scan.is_some(),
        )
    }
}
