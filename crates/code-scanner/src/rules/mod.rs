//! 접근성 규칙 — eslint-plugin-jsx-a11y 규칙 이름을 따르는 마크업 검사
//!
//! [`Rule`] trait은 각 규칙이 구현해야 하는 인터페이스입니다.
//! 규칙은 고유 린트 수준([`LintLevel`])과 WCAG 수준을 가지며,
//! [`RuleMeta::impact`]가 이를 4단계 심각도로 변환합니다.
//!
//! # 확장
//!
//! 새 규칙을 추가하려면 `Rule` trait을 구현하고 [`default_rules`]에 등록합니다.

pub mod aria;
pub mod content;
pub mod forms;

use scraper::ElementRef;

use a11ylens_core::types::{ConformanceLevel, Impact, Principle};

use crate::markup::MarkupDocument;

/// 규칙 문서 기본 URL
const RULE_DOCS_BASE: &str = "https://github.com/jsx-eslint/eslint-plugin-jsx-a11y/blob/main/docs/rules";

/// 린터 고유 심각도
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintLevel {
    Error,
    Warn,
}

/// 규칙 메타데이터
#[derive(Debug, Clone, Copy)]
pub struct RuleMeta {
    /// 규칙 ID (예: "alt-text")
    pub id: &'static str,
    /// WCAG 성공 기준 (모범 사례 규칙은 없음)
    pub criterion: Option<&'static str>,
    /// WCAG 적합성 수준
    pub level: ConformanceLevel,
    pub principle: Principle,
    pub lint_level: LintLevel,
    /// 권장 수정 방법
    pub help: &'static str,
}

impl RuleMeta {
    /// 린트 수준과 WCAG 수준을 4단계 심각도로 변환합니다.
    pub fn impact(&self) -> Impact {
        match (self.lint_level, self.level) {
            (LintLevel::Error, ConformanceLevel::A) => Impact::Critical,
            (LintLevel::Error, ConformanceLevel::AA | ConformanceLevel::AAA) => Impact::Serious,
            (LintLevel::Warn, ConformanceLevel::A | ConformanceLevel::AA) => Impact::Moderate,
            (LintLevel::Warn, ConformanceLevel::AAA) => Impact::Minor,
        }
    }

    pub fn help_url(&self) -> String {
        format!("{RULE_DOCS_BASE}/{}.md", self.id)
    }

    /// 목표 적합성 수준에서 이 규칙을 적용할지 여부
    ///
    /// 성공 기준이 없는 모범 사례 규칙은 항상 적용됩니다.
    pub fn applies_to(&self, target: ConformanceLevel) -> bool {
        self.criterion.is_none() || self.level <= target
    }
}

/// 규칙 위반 하나
pub struct Violation<'a> {
    pub element: ElementRef<'a>,
    pub message: String,
}

impl<'a> Violation<'a> {
    pub fn new(element: ElementRef<'a>, message: impl Into<String>) -> Self {
        Self {
            element,
            message: message.into(),
        }
    }
}

/// 접근성 규칙 trait
pub trait Rule: Send + Sync {
    fn meta(&self) -> &RuleMeta;

    /// 문서를 검사하여 위반 요소를 문서 순서대로 반환합니다.
    fn check<'a>(&self, doc: &'a MarkupDocument) -> Vec<Violation<'a>>;
}

/// 기본 규칙 집합
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(content::AltText),
        Box::new(content::AnchorHasContent),
        Box::new(aria::AriaProps),
        Box::new(aria::AriaRole),
        Box::new(content::HeadingHasContent),
        Box::new(content::HtmlHasLang),
        Box::new(content::IframeHasTitle),
        Box::new(forms::LabelHasAssociatedControl),
        Box::new(content::MediaHasCaption),
        Box::new(aria::NoRedundantRoles),
        Box::new(aria::RoleHasRequiredAriaProps),
    ]
}

// --- 요소 검사 헬퍼 ---

pub(crate) fn attr<'a>(el: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value().attr(name)
}

pub(crate) fn has_nonempty_attr(el: &ElementRef<'_>, name: &str) -> bool {
    attr(el, name).is_some_and(|v| !v.trim().is_empty())
}

/// aria-label, aria-labelledby, title 중 하나라도 값이 있는지
pub(crate) fn has_label_attr(el: &ElementRef<'_>) -> bool {
    has_nonempty_attr(el, "aria-label")
        || has_nonempty_attr(el, "aria-labelledby")
        || has_nonempty_attr(el, "title")
}

pub(crate) fn is_aria_hidden(el: &ElementRef<'_>) -> bool {
    attr(el, "aria-hidden").is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// 보조기술이 읽을 수 있는 내용이 있는지
///
/// 텍스트, 레이블 속성, 또는 대체 텍스트가 있는 하위 이미지를 내용으로 봅니다.
pub(crate) fn has_accessible_content(el: &ElementRef<'_>) -> bool {
    if has_label_attr(el) {
        return true;
    }
    if el.text().any(|t| !t.trim().is_empty()) {
        return true;
    }
    el.descendants()
        .filter_map(ElementRef::wrap)
        .skip(1)
        .any(|child| {
            !is_aria_hidden(&child)
                && (has_label_attr(&child)
                    || (child.value().name() == "img" && has_nonempty_attr(&child, "alt")))
        })
}

/// 속성값이 JSX 표현식(`{...}`)인지
pub(crate) fn is_expression(value: &str) -> bool {
    let v = value.trim();
    v.starts_with('{') || v.starts_with("${")
}
