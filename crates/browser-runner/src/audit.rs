//! 페이지 감사 -- axe 스타일 규칙으로 현재 DOM 검사
//!
//! 각 규칙은 axe의 impact 문자열을 그대로 가지며, [`normalize_impact`]가
//! 어댑터 경계에서 4단계 심각도로 변환합니다.
//! 위반 요소는 [`css_path`]로 만든 셀렉터를 `Locator::Dom`으로 가집니다.

use std::collections::HashMap;

use scraper::{ElementRef, Html};

use a11ylens_core::types::{ConformanceLevel, Impact, Issue, Principle};

/// 스니펫 최대 길이 (문자)
const MAX_SNIPPET_CHARS: usize = 300;

/// 규칙 문서 기본 URL
const RULE_DOCS_BASE: &str = "https://dequeuniversity.com/rules/axe/4.10";

/// 감사 규칙 하나
pub struct AuditRule {
    pub id: &'static str,
    /// axe impact 문자열
    pub impact: &'static str,
    pub criterion: &'static str,
    pub level: ConformanceLevel,
    pub principle: Principle,
    pub description: &'static str,
    pub help: &'static str,
    check: for<'a> fn(&'a Html) -> Vec<ElementRef<'a>>,
}

impl AuditRule {
    pub fn help_url(&self) -> String {
        format!("{RULE_DOCS_BASE}/{}", self.id)
    }
}

/// 기본 감사 규칙
pub static RULES: &[AuditRule] = &[
    AuditRule {
        id: "image-alt",
        impact: "critical",
        criterion: "1.1.1",
        level: ConformanceLevel::A,
        principle: Principle::Perceivable,
        description: "Images must have alternate text",
        help: "Add an alt attribute, or role=\"presentation\" for decorative images.",
        check: image_alt,
    },
    AuditRule {
        id: "html-has-lang",
        impact: "serious",
        criterion: "3.1.1",
        level: ConformanceLevel::A,
        principle: Principle::Understandable,
        description: "<html> element must have a lang attribute",
        help: "Set the page language with <html lang=\"...\">.",
        check: html_has_lang,
    },
    AuditRule {
        id: "document-title",
        impact: "serious",
        criterion: "2.4.2",
        level: ConformanceLevel::A,
        principle: Principle::Operable,
        description: "Documents must have <title> element to aid in navigation",
        help: "Add a non-empty <title> to the document head.",
        check: document_title,
    },
    AuditRule {
        id: "label",
        impact: "critical",
        criterion: "4.1.2",
        level: ConformanceLevel::A,
        principle: Principle::Robust,
        description: "Form elements must have labels",
        help: "Associate a <label> with the control or give it an aria-label.",
        check: form_label,
    },
    AuditRule {
        id: "link-name",
        impact: "serious",
        criterion: "2.4.4",
        level: ConformanceLevel::A,
        principle: Principle::Operable,
        description: "Links must have discernible text",
        help: "Give the link text content or an aria-label.",
        check: link_name,
    },
    AuditRule {
        id: "button-name",
        impact: "critical",
        criterion: "4.1.2",
        level: ConformanceLevel::A,
        principle: Principle::Robust,
        description: "Buttons must have discernible text",
        help: "Give the button text content, a value, or an aria-label.",
        check: button_name,
    },
    AuditRule {
        id: "frame-title",
        impact: "serious",
        criterion: "4.1.2",
        level: ConformanceLevel::A,
        principle: Principle::Robust,
        description: "Frames must have an accessible name",
        help: "Add a title attribute describing the frame content.",
        check: frame_title,
    },
    AuditRule {
        id: "video-caption",
        impact: "critical",
        criterion: "1.2.2",
        level: ConformanceLevel::A,
        principle: Principle::Perceivable,
        description: "<video> elements must have captions",
        help: "Add a <track kind=\"captions\"> element.",
        check: video_caption,
    },
    AuditRule {
        id: "duplicate-id",
        impact: "minor",
        criterion: "4.1.1",
        level: ConformanceLevel::A,
        principle: Principle::Robust,
        description: "id attribute value must be unique",
        help: "Rename the element so every id on the page is unique.",
        check: duplicate_id,
    },
];

/// axe impact 문자열을 심각도로 변환합니다.
///
/// 알 수 없거나 없는 값은 `minor`입니다.
pub fn normalize_impact(impact: Option<&str>) -> Impact {
    match impact.map(str::trim) {
        Some("critical") => Impact::Critical,
        Some("serious") => Impact::Serious,
        Some("moderate") => Impact::Moderate,
        _ => Impact::Minor,
    }
}

/// 페이지를 감사하여 이슈를 만듭니다.
///
/// 이슈 ID는 `dom-{step}-{n}` 형식이며 `n`은 단계 안에서 1부터 셉니다.
pub fn audit_page(body: &str, step: usize) -> Vec<Issue> {
    let html = Html::parse_document(body);
    let mut issues = Vec::new();

    for rule in RULES {
        for element in (rule.check)(&html) {
            let id = format!("dom-{step}-{}", issues.len() + 1);
            let issue = Issue::new(id, rule.id, rule.description, normalize_impact(Some(rule.impact)))
                .with_criterion(rule.criterion, rule.level)
                .with_principle(rule.principle)
                .at_selector(css_path(&html, element))
                .with_snippet(snippet(element))
                .with_suggested_fix(rule.help)
                .with_help_url(rule.help_url());
            issues.push(issue);
        }
    }

    issues
}

/// 요소의 CSS 경로를 만듭니다.
///
/// 문서 안에서 유일한 id를 가진 조상을 만나면 그 지점에서 `#id`로 시작합니다.
/// 같은 이름의 형제가 있으면 `:nth-of-type(k)`를 붙입니다.
pub fn css_path(html: &Html, element: ElementRef<'_>) -> String {
    let ids = id_counts(html);
    let mut parts = Vec::new();
    let mut current = Some(element);

    while let Some(el) = current {
        if let Some(id) = el.value().id() {
            if ids.get(id) == Some(&1) && is_css_ident(id) {
                parts.push(format!("#{id}"));
                break;
            }
        }

        let name = el.value().name();
        let same_type: Vec<_> = el
            .parent()
            .map(|parent| {
                parent
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|sibling| sibling.value().name() == name)
                    .collect()
            })
            .unwrap_or_default();
        if same_type.len() > 1 {
            let index = same_type
                .iter()
                .position(|sibling| sibling.id() == el.id())
                .map_or(1, |i| i + 1);
            parts.push(format!("{name}:nth-of-type({index})"));
        } else {
            parts.push(name.to_owned());
        }

        current = el.parent().and_then(ElementRef::wrap);
    }

    parts.reverse();
    parts.join(" > ")
}

fn id_counts(html: &Html) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for el in elements(html) {
        if let Some(id) = el.value().id() {
            *counts.entry(id).or_insert(0) += 1;
        }
    }
    counts
}

fn is_css_ident(id: &str) -> bool {
    let mut chars = id.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn snippet(element: ElementRef<'_>) -> String {
    let html = element.html();
    if html.chars().count() > MAX_SNIPPET_CHARS {
        let mut truncated: String = html.chars().take(MAX_SNIPPET_CHARS).collect();
        truncated.push_str("...");
        truncated
    } else {
        html
    }
}

// --- 규칙 구현 ---

fn elements(html: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    html.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
}

fn named<'a>(html: &'a Html, name: &'a str) -> impl Iterator<Item = ElementRef<'a>> {
    elements(html).filter(move |el| el.value().name() == name)
}

fn attr_nonempty(el: &ElementRef<'_>, name: &str) -> bool {
    el.value().attr(name).is_some_and(|v| !v.trim().is_empty())
}

fn has_aria_name(el: &ElementRef<'_>) -> bool {
    attr_nonempty(el, "aria-label") || attr_nonempty(el, "aria-labelledby")
}

fn has_text(el: &ElementRef<'_>) -> bool {
    el.text().any(|t| !t.trim().is_empty())
}

/// 텍스트, aria 이름, title, 또는 alt가 있는 하위 이미지
fn has_discernible_text(el: &ElementRef<'_>) -> bool {
    has_aria_name(el)
        || attr_nonempty(el, "title")
        || has_text(el)
        || el
            .descendants()
            .filter_map(ElementRef::wrap)
            .any(|child| child.value().name() == "img" && attr_nonempty(&child, "alt"))
}

fn is_hidden(el: &ElementRef<'_>) -> bool {
    el.value().attr("hidden").is_some()
        || el
            .value()
            .attr("aria-hidden")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

fn image_alt(html: &Html) -> Vec<ElementRef<'_>> {
    named(html, "img")
        .filter(|el| !is_hidden(el))
        .filter(|el| {
            let role = el.value().attr("role").unwrap_or_default();
            el.value().attr("alt").is_none()
                && !has_aria_name(el)
                && !attr_nonempty(el, "title")
                && role != "presentation"
                && role != "none"
        })
        .collect()
}

fn html_has_lang(html: &Html) -> Vec<ElementRef<'_>> {
    let root = html.root_element();
    if attr_nonempty(&root, "lang") || attr_nonempty(&root, "xml:lang") {
        Vec::new()
    } else {
        vec![root]
    }
}

fn document_title(html: &Html) -> Vec<ElementRef<'_>> {
    let titled = named(html, "title").any(|title| has_text(&title));
    if titled {
        Vec::new()
    } else {
        vec![html.root_element()]
    }
}

/// 레이블이 필요 없는 input 유형
const UNLABELLED_INPUT_TYPES: &[&str] = &["hidden", "submit", "reset", "button", "image"];

fn form_label(html: &Html) -> Vec<ElementRef<'_>> {
    let label_targets: Vec<&str> = named(html, "label")
        .filter_map(|label| label.value().attr("for"))
        .collect();

    elements(html)
        .filter(|el| match el.value().name() {
            "input" => {
                let kind = el.value().attr("type").unwrap_or("text").to_ascii_lowercase();
                !UNLABELLED_INPUT_TYPES.contains(&kind.as_str())
            }
            "select" | "textarea" => true,
            _ => false,
        })
        .filter(|el| !is_hidden(el))
        .filter(|el| {
            let by_for = el
                .value()
                .id()
                .is_some_and(|id| label_targets.contains(&id));
            let wrapped = el
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|ancestor| ancestor.value().name() == "label");
            !(by_for || wrapped || has_aria_name(el) || attr_nonempty(el, "title"))
        })
        .collect()
}

fn link_name(html: &Html) -> Vec<ElementRef<'_>> {
    named(html, "a")
        .filter(|el| el.value().attr("href").is_some())
        .filter(|el| !is_hidden(el) && !has_discernible_text(el))
        .collect()
}

fn button_name(html: &Html) -> Vec<ElementRef<'_>> {
    elements(html)
        .filter(|el| !is_hidden(el))
        .filter(|el| match el.value().name() {
            "button" => !has_discernible_text(el),
            "input" => {
                let kind = el.value().attr("type").unwrap_or("text").to_ascii_lowercase();
                // submit과 reset은 브라우저 기본 레이블이 있음
                kind == "button" && !attr_nonempty(el, "value") && !has_aria_name(el)
            }
            _ => false,
        })
        .collect()
}

fn frame_title(html: &Html) -> Vec<ElementRef<'_>> {
    elements(html)
        .filter(|el| matches!(el.value().name(), "iframe" | "frame"))
        .filter(|el| !attr_nonempty(el, "title") && !has_aria_name(el))
        .collect()
}

fn video_caption(html: &Html) -> Vec<ElementRef<'_>> {
    named(html, "video")
        .filter(|el| {
            !el.descendants()
                .filter_map(ElementRef::wrap)
                .filter(|child| child.value().name() == "track")
                .any(|track| {
                    track
                        .value()
                        .attr("kind")
                        .is_some_and(|kind| kind.eq_ignore_ascii_case("captions"))
                })
        })
        .collect()
}

fn duplicate_id(html: &Html) -> Vec<ElementRef<'_>> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    elements(html)
        .filter(|el| {
            let Some(id) = el.value().id() else {
                return false;
            };
            let count = seen.entry(id).or_insert(0);
            *count += 1;
            // 두 번째 등장부터 보고
            *count > 1
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(body: &str) -> Vec<String> {
        audit_page(body, 1).into_iter().map(|i| i.title).collect()
    }

    const CLEAN: &str = r#"<!doctype html><html lang="en"><head><title>Shop</title></head>
<body><main><h1>Shop</h1><img src="a.png" alt="Product"><a href="/cart">Cart</a></main></body></html>"#;

    #[test]
    fn clean_page_has_no_issues() {
        assert!(audit_page(CLEAN, 1).is_empty());
    }

    #[test]
    fn missing_lang_and_title() {
        let found = titles("<html><body><p>hi</p></body></html>");
        assert_eq!(found, vec!["html-has-lang", "document-title"]);
    }

    #[test]
    fn impacts_are_normalized() {
        assert_eq!(normalize_impact(Some("critical")), Impact::Critical);
        assert_eq!(normalize_impact(Some("serious")), Impact::Serious);
        assert_eq!(normalize_impact(Some("moderate")), Impact::Moderate);
        assert_eq!(normalize_impact(Some("minor")), Impact::Minor);
        assert_eq!(normalize_impact(Some("catastrophic")), Impact::Minor);
        assert_eq!(normalize_impact(None), Impact::Minor);
    }

    #[test]
    fn issues_have_dom_locators_and_step_ids() {
        let body = r#"<html lang="en"><head><title>T</title></head><body><div><img src="a.png"><img src="b.png"></div></body></html>"#;
        let issues = audit_page(body, 3);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].id, "dom-3-1");
        assert_eq!(issues[1].id, "dom-3-2");
        assert_eq!(
            issues[0].selector(),
            Some("html > body > div > img:nth-of-type(1)")
        );
        assert_eq!(issues[0].impact, Impact::Critical);
        assert!(issues[0].file_path().is_none());
        assert!(issues[0].snippet.as_deref().unwrap_or_default().starts_with("<img"));
    }

    #[test]
    fn css_path_starts_at_unique_id() {
        let body = r#"<html><body><form id="checkout"><input name="q"></form></body></html>"#;
        let html = Html::parse_document(body);
        let input = named(&html, "input").next().unwrap();
        assert_eq!(css_path(&html, input), "#checkout > input");
    }

    #[test]
    fn label_association_variants() {
        let body = r#"<html lang="en"><head><title>F</title></head><body>
<label for="email">Email</label><input id="email">
<label>Name <input name="name"></label>
<input aria-label="Search">
<input type="hidden" name="token">
<input type="submit">
<input name="orphan">
<textarea></textarea>
</body></html>"#;
        let issues = audit_page(body, 1);
        let labels: Vec<_> = issues.iter().filter(|i| i.title == "label").collect();
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn empty_links_and_buttons() {
        let body = r#"<html lang="en"><head><title>B</title></head><body>
<a href="/a"></a><a href="/b"><img src="x.png" alt="Home"></a><a name="anchor"></a>
<button></button><button aria-label="Close"></button><input type="button">
</body></html>"#;
        let found = titles(body);
        assert_eq!(found, vec!["link-name", "button-name", "button-name"]);
    }

    #[test]
    fn frames_video_and_duplicate_ids() {
        let body = r#"<html lang="en"><head><title>M</title></head><body>
<iframe src="/map"></iframe>
<video src="a.mp4"></video>
<p id="dup">a</p><p id="dup">b</p>
</body></html>"#;
        let issues = audit_page(body, 1);
        let found: Vec<(&str, Impact)> = issues.iter().map(|i| (i.title.as_str(), i.impact)).collect();
        assert_eq!(
            found,
            vec![
                ("frame-title", Impact::Serious),
                ("video-caption", Impact::Critical),
                ("duplicate-id", Impact::Minor),
            ]
        );
        // 중복 id는 셀렉터 시작점이 되지 않음
        assert_eq!(issues[2].selector(), Some("html > body > p:nth-of-type(2)"));
    }
}
