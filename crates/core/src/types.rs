//! 도메인 타입 — 모든 탐지기와 소비자가 공유하는 정규화된 이슈 모델
//!
//! 정적 코드 분석기와 동적 브라우저 감사기는 각자의 고유한 심각도 체계를
//! 어댑터 경계에서 [`Impact`] 4단계로 변환한 뒤 [`Issue`]를 생성합니다.
//! core는 심각도를 재분류하지 않습니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 이슈 심각도 (영향도) 4단계
///
/// `Ord` 구현으로 비교가 가능합니다 (`Minor < Moderate < Serious < Critical`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    /// 사소한 문제
    Minor,
    /// 중간 수준 문제
    Moderate,
    /// 심각한 문제
    Serious,
    /// 치명적 — 보조기술 사용자가 콘텐츠에 접근할 수 없음
    Critical,
}

impl Impact {
    /// 높은 심각도부터 나열한 전체 단계
    pub const ALL: [Impact; 4] = [
        Impact::Critical,
        Impact::Serious,
        Impact::Moderate,
        Impact::Minor,
    ];

    /// 문자열에서 심각도를 파싱합니다 (대소문자 구분 없음).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "critical" | "crit" => Some(Self::Critical),
            "serious" => Some(Self::Serious),
            "moderate" => Some(Self::Moderate),
            "minor" => Some(Self::Minor),
            _ => None,
        }
    }

    /// 메트릭 레이블 등에 사용하는 소문자 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Serious => "serious",
            Self::Moderate => "moderate",
            Self::Minor => "minor",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// WCAG 적합성 수준
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConformanceLevel {
    A,
    #[default]
    AA,
    AAA,
}

impl ConformanceLevel {
    /// 문자열에서 적합성 수준을 파싱합니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Some(Self::A),
            "AA" => Some(Self::AA),
            "AAA" => Some(Self::AAA),
            _ => None,
        }
    }
}

impl fmt::Display for ConformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::AA => write!(f, "AA"),
            Self::AAA => write!(f, "AAA"),
        }
    }
}

/// WCAG 원칙 (POUR)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Principle {
    Perceivable,
    Operable,
    Understandable,
    Robust,
}

/// 스캔 컨텍스트 — 목표 적합성 수준과 AODA 적용 여부
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanContext {
    /// 목표 적합성 수준 (AODA는 일반적으로 AA)
    pub conformance_level: ConformanceLevel,
    /// 온타리오 AODA 맥락 적용 여부
    pub aoda_context: bool,
    /// WCAG 버전 (예: "2.1")
    pub wcag_version: String,
}

impl Default for ScanContext {
    fn default() -> Self {
        Self {
            conformance_level: ConformanceLevel::AA,
            aoda_context: true,
            wcag_version: "2.1".to_owned(),
        }
    }
}

/// 이슈 위치
///
/// 정적 탐지기는 항상 `Source`를, 동적 탐지기는 항상 `Dom`을 붙입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Locator {
    /// 소스 파일 위치
    Source {
        file_path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        column: Option<u32>,
    },
    /// DOM 셀렉터
    Dom { selector: String },
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source {
                file_path,
                line: Some(line),
                column: Some(column),
            } => write!(f, "{file_path}:{line}:{column}"),
            Self::Source {
                file_path,
                line: Some(line),
                column: None,
            } => write!(f, "{file_path}:{line}"),
            Self::Source { file_path, .. } => write!(f, "{file_path}"),
            Self::Dom { selector } => write!(f, "{selector}"),
        }
    }
}

/// 이슈 증거 — 전/후 캡처와 diff
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueEvidence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,
}

/// 정규화된 접근성 결함 하나
///
/// `id`는 하나의 스캔 결과 안에서 유일해야 합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// 이슈 식별자 (불투명 문자열)
    pub id: String,
    /// WCAG 성공 기준 ID (예: "1.1.1")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criterion_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principle: Option<Principle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<ConformanceLevel>,
    /// 짧은 제목
    pub title: String,
    /// 상세 설명
    pub description: String,
    /// 심각도
    pub impact: Impact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<Locator>,
    /// 소스 또는 DOM 조각
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<IssueEvidence>,
}

impl Issue {
    /// 필수 필드만으로 이슈를 생성합니다.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        impact: Impact,
    ) -> Self {
        Self {
            id: id.into(),
            criterion_id: None,
            principle: None,
            level: None,
            title: title.into(),
            description: description.into(),
            impact,
            locator: None,
            snippet: None,
            suggested_fix: None,
            help_url: None,
            evidence: None,
        }
    }

    pub fn with_criterion(mut self, criterion_id: impl Into<String>, level: ConformanceLevel) -> Self {
        self.criterion_id = Some(criterion_id.into());
        self.level = Some(level);
        self
    }

    pub fn with_principle(mut self, principle: Principle) -> Self {
        self.principle = Some(principle);
        self
    }

    /// 소스 파일 위치를 붙입니다.
    pub fn at_source(mut self, file_path: impl Into<String>, line: Option<u32>, column: Option<u32>) -> Self {
        self.locator = Some(Locator::Source {
            file_path: file_path.into(),
            line,
            column,
        });
        self
    }

    /// DOM 셀렉터 위치를 붙입니다.
    pub fn at_selector(mut self, selector: impl Into<String>) -> Self {
        self.locator = Some(Locator::Dom {
            selector: selector.into(),
        });
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    pub fn with_suggested_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }

    pub fn with_help_url(mut self, url: impl Into<String>) -> Self {
        self.help_url = Some(url.into());
        self
    }

    pub fn with_evidence(mut self, evidence: IssueEvidence) -> Self {
        self.evidence = Some(evidence);
        self
    }

    /// 소스 파일 경로 (정적 탐지 이슈인 경우)
    pub fn file_path(&self) -> Option<&str> {
        match &self.locator {
            Some(Locator::Source { file_path, .. }) => Some(file_path),
            _ => None,
        }
    }

    /// DOM 셀렉터 (동적 탐지 이슈인 경우)
    pub fn selector(&self) -> Option<&str> {
        match &self.locator {
            Some(Locator::Dom { selector }) => Some(selector),
            _ => None,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.impact, self.title)?;
        if let Some(locator) = &self.locator {
            write!(f, " at {locator}")?;
        }
        Ok(())
    }
}
