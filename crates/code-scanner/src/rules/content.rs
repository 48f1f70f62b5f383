//! 대체 텍스트와 요소 내용 규칙

use scraper::ElementRef;

use a11ylens_core::types::{ConformanceLevel, Principle};

use super::{
    LintLevel, Rule, RuleMeta, Violation, attr, has_accessible_content, has_nonempty_attr,
    is_aria_hidden,
};
use crate::markup::MarkupDocument;

/// 이미지와 이미지형 입력 요소의 대체 텍스트
pub struct AltText;

static ALT_TEXT: RuleMeta = RuleMeta {
    id: "alt-text",
    criterion: Some("1.1.1"),
    level: ConformanceLevel::A,
    principle: Principle::Perceivable,
    lint_level: LintLevel::Error,
    help: "Add an alt attribute describing the image, or alt=\"\" if it is decorative.",
};

impl Rule for AltText {
    fn meta(&self) -> &RuleMeta {
        &ALT_TEXT
    }

    fn check<'a>(&self, doc: &'a MarkupDocument) -> Vec<Violation<'a>> {
        doc.elements()
            .filter_map(|el| {
                let message = match el.value().name() {
                    "img" => {
                        let role = attr(&el, "role").unwrap_or_default();
                        let presentational = role == "presentation" || role == "none";
                        (attr(&el, "alt").is_none()
                            && !has_alt_alternative(&el)
                            && !presentational)
                            .then_some("img element is missing an alt attribute")
                    }
                    "area" => (attr(&el, "alt").is_none() && !has_alt_alternative(&el))
                        .then_some("area element is missing an alt attribute"),
                    "input"
                        if attr(&el, "type").is_some_and(|t| t.eq_ignore_ascii_case("image")) =>
                    {
                        (attr(&el, "alt").is_none() && !has_alt_alternative(&el))
                            .then_some("input type=\"image\" is missing an alt attribute")
                    }
                    "object" => (!has_nonempty_attr(&el, "title")
                        && !has_alt_alternative(&el)
                        && el.text().all(|t| t.trim().is_empty()))
                    .then_some("object element needs a title or text alternative"),
                    _ => None,
                }?;
                Some(Violation::new(el, message))
            })
            .collect()
    }
}

fn has_alt_alternative(el: &ElementRef<'_>) -> bool {
    has_nonempty_attr(el, "aria-label") || has_nonempty_attr(el, "aria-labelledby")
}

/// 링크에는 읽을 수 있는 내용이 있어야 함
pub struct AnchorHasContent;

static ANCHOR_HAS_CONTENT: RuleMeta = RuleMeta {
    id: "anchor-has-content",
    criterion: Some("2.4.4"),
    level: ConformanceLevel::A,
    principle: Principle::Operable,
    lint_level: LintLevel::Error,
    help: "Give the link visible text or an aria-label that describes its destination.",
};

impl Rule for AnchorHasContent {
    fn meta(&self) -> &RuleMeta {
        &ANCHOR_HAS_CONTENT
    }

    fn check<'a>(&self, doc: &'a MarkupDocument) -> Vec<Violation<'a>> {
        doc.elements_named("a")
            .filter(|el| !is_aria_hidden(el) && !has_accessible_content(el))
            .map(|el| Violation::new(el, "anchor has no accessible content"))
            .collect()
    }
}

/// 제목 요소에는 내용이 있어야 함
pub struct HeadingHasContent;

static HEADING_HAS_CONTENT: RuleMeta = RuleMeta {
    id: "heading-has-content",
    criterion: Some("2.4.6"),
    level: ConformanceLevel::AA,
    principle: Principle::Operable,
    lint_level: LintLevel::Error,
    help: "Put descriptive text inside the heading or remove the empty heading.",
};

const HEADINGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

pub(crate) fn is_native_heading(name: &str) -> bool {
    HEADINGS.contains(&name)
}

impl Rule for HeadingHasContent {
    fn meta(&self) -> &RuleMeta {
        &HEADING_HAS_CONTENT
    }

    fn check<'a>(&self, doc: &'a MarkupDocument) -> Vec<Violation<'a>> {
        doc.elements()
            .filter(|el| is_native_heading(el.value().name()))
            .filter(|el| !is_aria_hidden(el) && !has_accessible_content(el))
            .map(|el| {
                let message = format!("{} heading has no accessible content", el.value().name());
                Violation::new(el, message)
            })
            .collect()
    }
}

/// 문서 루트에는 lang 속성이 있어야 함
pub struct HtmlHasLang;

static HTML_HAS_LANG: RuleMeta = RuleMeta {
    id: "html-has-lang",
    criterion: Some("3.1.1"),
    level: ConformanceLevel::A,
    principle: Principle::Understandable,
    lint_level: LintLevel::Error,
    help: "Add a lang attribute to the html element, for example lang=\"en\".",
};

impl Rule for HtmlHasLang {
    fn meta(&self) -> &RuleMeta {
        &HTML_HAS_LANG
    }

    fn check<'a>(&self, doc: &'a MarkupDocument) -> Vec<Violation<'a>> {
        // 파서가 합성한 <html>은 검사하지 않음
        if !doc.has_html_root() {
            return Vec::new();
        }
        doc.elements_named("html")
            .filter(|el| !has_nonempty_attr(el, "lang"))
            .map(|el| Violation::new(el, "html element is missing a lang attribute"))
            .collect()
    }
}

/// iframe에는 제목이 있어야 함
pub struct IframeHasTitle;

static IFRAME_HAS_TITLE: RuleMeta = RuleMeta {
    id: "iframe-has-title",
    criterion: Some("4.1.2"),
    level: ConformanceLevel::A,
    principle: Principle::Robust,
    lint_level: LintLevel::Warn,
    help: "Add a title attribute that describes the embedded content.",
};

impl Rule for IframeHasTitle {
    fn meta(&self) -> &RuleMeta {
        &IFRAME_HAS_TITLE
    }

    fn check<'a>(&self, doc: &'a MarkupDocument) -> Vec<Violation<'a>> {
        doc.elements_named("iframe")
            .filter(|el| !has_nonempty_attr(el, "title"))
            .map(|el| Violation::new(el, "iframe element is missing a title"))
            .collect()
    }
}

/// 미디어에는 자막 트랙이 있어야 함
pub struct MediaHasCaption;

static MEDIA_HAS_CAPTION: RuleMeta = RuleMeta {
    id: "media-has-caption",
    criterion: Some("1.2.2"),
    level: ConformanceLevel::A,
    principle: Principle::Perceivable,
    lint_level: LintLevel::Warn,
    help: "Add a <track kind=\"captions\"> child to the media element.",
};

impl Rule for MediaHasCaption {
    fn meta(&self) -> &RuleMeta {
        &MEDIA_HAS_CAPTION
    }

    fn check<'a>(&self, doc: &'a MarkupDocument) -> Vec<Violation<'a>> {
        doc.elements()
            .filter(|el| matches!(el.value().name(), "video" | "audio"))
            .filter(|el| attr(el, "muted").is_none())
            .filter(|el| !has_caption_track(el))
            .map(|el| {
                let message = format!("{} element has no captions track", el.value().name());
                Violation::new(el, message)
            })
            .collect()
    }
}

fn has_caption_track(el: &ElementRef<'_>) -> bool {
    el.descendants()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "track")
        .any(|track| attr(&track, "kind").is_some_and(|k| k.eq_ignore_ascii_case("captions")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(rule: &dyn Rule, ext: &str, src: &str) -> Vec<(String, Option<(u32, u32)>)> {
        let doc = MarkupDocument::parse(ext, src);
        rule.check(&doc)
            .into_iter()
            .map(|v| (v.message, doc.locate(v.element)))
            .collect()
    }

    #[test]
    fn alt_text_flags_missing_alt() {
        let found = run(&AltText, "jsx", "<div>\n  <img src=\"hero.png\" />\n</div>");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1, Some((2, 3)));
    }

    #[test]
    fn alt_text_accepts_empty_alt_and_presentation_role() {
        let src = r#"<img src="a.png" alt=""><img src="b.png" role="presentation"><img src="c.png" aria-label="Logo">"#;
        assert!(run(&AltText, "html", src).is_empty());
    }

    #[test]
    fn alt_text_covers_image_inputs_and_objects() {
        let src = r#"<input type="image" src="go.png"><input type="text"><object data="x.swf"></object><object data="y.swf" title="Chart"></object>"#;
        let found = run(&AltText, "html", src);
        assert_eq!(found.len(), 2);
        assert!(found[0].0.contains("input"));
        assert!(found[1].0.contains("object"));
    }

    #[test]
    fn anchor_without_content_is_flagged() {
        let src = r#"<a href="/a">About</a><a href="/b"></a><a href="/c" aria-hidden="true"></a>"#;
        let found = run(&AnchorHasContent, "html", src);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn anchor_with_image_alt_has_content() {
        let src = r#"<a href="/"><img src="logo.png" alt="Home"></a>"#;
        assert!(run(&AnchorHasContent, "html", src).is_empty());
    }

    #[test]
    fn empty_heading_is_flagged() {
        let src = "<h1>Title</h1>\n<h2></h2>\n<h3>  </h3>";
        let found = run(&HeadingHasContent, "html", src);
        assert_eq!(found.len(), 2);
        assert!(found[0].0.starts_with("h2"));
        assert_eq!(found[0].1, Some((2, 1)));
    }

    #[test]
    fn html_lang_only_checked_with_explicit_root() {
        assert_eq!(run(&HtmlHasLang, "html", "<html><body></body></html>").len(), 1);
        assert!(run(&HtmlHasLang, "html", "<html lang=\"fr\"></html>").is_empty());
        assert!(run(&HtmlHasLang, "jsx", "<div>fragment</div>").is_empty());
    }

    #[test]
    fn iframe_needs_nonempty_title() {
        let src = r#"<iframe src="/a"></iframe><iframe src="/b" title=" "></iframe><iframe src="/c" title="Map"></iframe>"#;
        assert_eq!(run(&IframeHasTitle, "html", src).len(), 2);
    }

    #[test]
    fn media_caption_rules() {
        let src = r#"<video src="a.mp4"></video><video src="b.mp4" muted></video><video src="c.mp4"><track kind="captions" src="c.vtt"></video><audio src="d.mp3"><track kind="subtitles"></audio>"#;
        let found = run(&MediaHasCaption, "html", src);
        assert_eq!(found.len(), 2);
        assert!(found[0].0.starts_with("video"));
        assert!(found[1].0.starts_with("audio"));
    }
}
