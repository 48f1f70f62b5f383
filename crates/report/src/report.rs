//! 접근성 보고서 생성
//!
//! 보고서는 저장된 결과의 요약을 그대로 사용하며 다시 계산하지 않습니다.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use a11ylens_core::scan::FullScanResult;
use a11ylens_core::summary::SeveritySummary;
use a11ylens_core::types::{Issue, IssueEvidence, ScanContext};

use crate::error::ReportError;

/// 기본 보고서 제목
pub const DEFAULT_TITLE: &str = "Accessibility Scan Report";

/// 모든 보고서에 포함되는 면책 문구
pub const DISCLAIMER: &str = "This report is for guidance only. It does not constitute legal advice or certification of AODA/WCAG compliance. Human review and testing are required.";

/// 보고서 생성 옵션
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// 제목 (없으면 [`DEFAULT_TITLE`])
    pub title: Option<String>,
    pub context: ScanContext,
}

/// 이슈별 개선 증거
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEvidence {
    pub issue_id: String,
    #[serde(flatten)]
    pub evidence: IssueEvidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
}

/// 접근성 보고서
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityReport {
    pub id: String,
    pub job_id: String,
    pub title: String,
    /// 보고서 생성 시각 (RFC 3339)
    pub scanned_at: DateTime<Utc>,
    pub context: ScanContext,
    pub summary: SeveritySummary,
    pub issues: Vec<Issue>,
    pub disclaimer: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<ReportEvidence>,
}

/// 현재 시각으로 보고서를 생성합니다.
pub fn generate_report(result: &FullScanResult, options: &ReportOptions) -> AccessibilityReport {
    generate_report_at(result, options, Utc::now())
}

/// 지정한 시각으로 보고서를 생성합니다.
pub fn generate_report_at(
    result: &FullScanResult,
    options: &ReportOptions,
    scanned_at: DateTime<Utc>,
) -> AccessibilityReport {
    let evidence = result
        .issues()
        .iter()
        .filter_map(|issue| {
            issue.evidence.as_ref().map(|evidence| ReportEvidence {
                issue_id: issue.id.clone(),
                evidence: evidence.clone(),
                pr_url: None,
            })
        })
        .collect();

    AccessibilityReport {
        id: format!("report-{}", result.job_id()),
        job_id: result.job_id().to_owned(),
        title: options
            .title
            .clone()
            .unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
        scanned_at,
        context: options.context.clone(),
        summary: result.summary(),
        issues: result.issues().to_vec(),
        disclaimer: DISCLAIMER.to_owned(),
        evidence,
    }
}

impl AccessibilityReport {
    /// 들여쓰기된 JSON으로 직렬화합니다.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// JSON 보고서를 파일로 씁니다.
    pub async fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        let json = self.to_json()?;
        tokio::fs::write(path, json)
            .await
            .map_err(|source| ReportError::Io {
                path: path.display().to_string(),
                source,
            })?;
        info!(report_id = %self.id, path = %path.display(), "report written");
        Ok(())
    }
}
