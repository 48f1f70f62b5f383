//! ARIA 속성과 역할 규칙 (WCAG 4.1.2 이름, 역할, 값)

use scraper::ElementRef;

use a11ylens_core::types::{ConformanceLevel, Principle};

use super::{LintLevel, Rule, RuleMeta, Violation, attr, is_expression};
use crate::markup::MarkupDocument;

/// ARIA 1.2 상태/속성 이름
const ARIA_ATTRIBUTES: &[&str] = &[
    "aria-activedescendant",
    "aria-atomic",
    "aria-autocomplete",
    "aria-braillelabel",
    "aria-brailleroledescription",
    "aria-busy",
    "aria-checked",
    "aria-colcount",
    "aria-colindex",
    "aria-colindextext",
    "aria-colspan",
    "aria-controls",
    "aria-current",
    "aria-describedby",
    "aria-description",
    "aria-details",
    "aria-disabled",
    "aria-dropeffect",
    "aria-errormessage",
    "aria-expanded",
    "aria-flowto",
    "aria-grabbed",
    "aria-haspopup",
    "aria-hidden",
    "aria-invalid",
    "aria-keyshortcuts",
    "aria-label",
    "aria-labelledby",
    "aria-level",
    "aria-live",
    "aria-modal",
    "aria-multiline",
    "aria-multiselectable",
    "aria-orientation",
    "aria-owns",
    "aria-placeholder",
    "aria-posinset",
    "aria-pressed",
    "aria-readonly",
    "aria-relevant",
    "aria-required",
    "aria-roledescription",
    "aria-rowcount",
    "aria-rowindex",
    "aria-rowindextext",
    "aria-rowspan",
    "aria-selected",
    "aria-setsize",
    "aria-sort",
    "aria-valuemax",
    "aria-valuemin",
    "aria-valuenow",
    "aria-valuetext",
];

/// ARIA 1.2 구체 역할 (추상 역할 제외)
const ARIA_ROLES: &[&str] = &[
    "alert",
    "alertdialog",
    "application",
    "article",
    "banner",
    "blockquote",
    "button",
    "caption",
    "cell",
    "checkbox",
    "code",
    "columnheader",
    "combobox",
    "complementary",
    "contentinfo",
    "definition",
    "deletion",
    "dialog",
    "directory",
    "document",
    "emphasis",
    "feed",
    "figure",
    "form",
    "generic",
    "grid",
    "gridcell",
    "group",
    "heading",
    "img",
    "insertion",
    "link",
    "list",
    "listbox",
    "listitem",
    "log",
    "main",
    "marquee",
    "math",
    "menu",
    "menubar",
    "menuitem",
    "menuitemcheckbox",
    "menuitemradio",
    "meter",
    "navigation",
    "none",
    "note",
    "option",
    "paragraph",
    "presentation",
    "progressbar",
    "radio",
    "radiogroup",
    "region",
    "row",
    "rowgroup",
    "rowheader",
    "scrollbar",
    "search",
    "searchbox",
    "separator",
    "slider",
    "spinbutton",
    "status",
    "strong",
    "subscript",
    "superscript",
    "switch",
    "tab",
    "table",
    "tablist",
    "tabpanel",
    "term",
    "textbox",
    "time",
    "timer",
    "toolbar",
    "tooltip",
    "tree",
    "treegrid",
    "treeitem",
];

/// 역할별 필수 ARIA 속성
const REQUIRED_PROPS: &[(&str, &[&str])] = &[
    ("checkbox", &["aria-checked"]),
    ("radio", &["aria-checked"]),
    ("switch", &["aria-checked"]),
    ("menuitemcheckbox", &["aria-checked"]),
    ("menuitemradio", &["aria-checked"]),
    ("combobox", &["aria-controls", "aria-expanded"]),
    ("heading", &["aria-level"]),
    ("slider", &["aria-valuenow"]),
    ("meter", &["aria-valuenow"]),
    ("scrollbar", &["aria-controls", "aria-valuenow"]),
];

/// 허용되지 않는 `aria-*` 속성
pub struct AriaProps;

static ARIA_PROPS: RuleMeta = RuleMeta {
    id: "aria-props",
    criterion: Some("4.1.2"),
    level: ConformanceLevel::A,
    principle: Principle::Robust,
    lint_level: LintLevel::Error,
    help: "Use only aria-* attributes defined by WAI-ARIA and check the spelling.",
};

impl Rule for AriaProps {
    fn meta(&self) -> &RuleMeta {
        &ARIA_PROPS
    }

    fn check<'a>(&self, doc: &'a MarkupDocument) -> Vec<Violation<'a>> {
        let mut violations = Vec::new();
        for el in doc.elements() {
            // 요소당 첫 번째 잘못된 속성만 보고
            let invalid = el
                .value()
                .attrs()
                .map(|(name, _)| name)
                .find(|name| name.starts_with("aria-") && !ARIA_ATTRIBUTES.contains(name));
            if let Some(name) = invalid {
                violations.push(Violation::new(el, format!("{name} is not a valid ARIA attribute")));
            }
        }
        violations
    }
}

/// 유효하지 않은 `role` 값
pub struct AriaRole;

static ARIA_ROLE: RuleMeta = RuleMeta {
    id: "aria-role",
    criterion: Some("4.1.2"),
    level: ConformanceLevel::A,
    principle: Principle::Robust,
    lint_level: LintLevel::Error,
    help: "Use a concrete, non-abstract WAI-ARIA role or remove the role attribute.",
};

impl Rule for AriaRole {
    fn meta(&self) -> &RuleMeta {
        &ARIA_ROLE
    }

    fn check<'a>(&self, doc: &'a MarkupDocument) -> Vec<Violation<'a>> {
        doc.elements()
            .filter_map(|el| {
                let role = attr(&el, "role")?;
                if is_expression(role) {
                    return None;
                }
                let tokens: Vec<&str> = role.split_ascii_whitespace().collect();
                if tokens.is_empty() {
                    return Some(Violation::new(el, "role attribute is empty"));
                }
                let bad = tokens
                    .iter()
                    .find(|token| !ARIA_ROLES.contains(&token.to_ascii_lowercase().as_str()))?;
                Some(Violation::new(el, format!("\"{bad}\" is not a valid ARIA role")))
            })
            .collect()
    }
}

/// 요소의 암묵적 역할과 같은 명시적 `role`
pub struct NoRedundantRoles;

static NO_REDUNDANT_ROLES: RuleMeta = RuleMeta {
    id: "no-redundant-roles",
    criterion: None,
    level: ConformanceLevel::AAA,
    principle: Principle::Robust,
    lint_level: LintLevel::Warn,
    help: "Remove the role attribute; the element already has this role.",
};

impl Rule for NoRedundantRoles {
    fn meta(&self) -> &RuleMeta {
        &NO_REDUNDANT_ROLES
    }

    fn check<'a>(&self, doc: &'a MarkupDocument) -> Vec<Violation<'a>> {
        doc.elements()
            .filter_map(|el| {
                let role = attr(&el, "role")?.trim().to_ascii_lowercase();
                let implicit = implicit_role(&el)?;
                // nav의 navigation 역할은 허용 목록
                if el.value().name() == "nav" {
                    return None;
                }
                (role == implicit).then(|| {
                    Violation::new(
                        el,
                        format!(
                            "<{}> has implicit role \"{implicit}\"; role=\"{role}\" is redundant",
                            el.value().name()
                        ),
                    )
                })
            })
            .collect()
    }
}

/// 요소의 암묵적 ARIA 역할
fn implicit_role(el: &ElementRef<'_>) -> Option<&'static str> {
    let role = match el.value().name() {
        "a" | "area" if attr(el, "href").is_some() => "link",
        "article" => "article",
        "aside" => "complementary",
        "button" => "button",
        "dialog" => "dialog",
        "form" => "form",
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => "heading",
        "hr" => "separator",
        "img" if attr(el, "alt").is_none_or(|alt| !alt.is_empty()) => "img",
        "li" => "listitem",
        "main" => "main",
        "nav" => "navigation",
        "ol" | "ul" => "list",
        "progress" => "progressbar",
        "select" => "combobox",
        "table" => "table",
        "tbody" | "thead" | "tfoot" => "rowgroup",
        "td" => "cell",
        "textarea" => "textbox",
        "tr" => "row",
        "input" => {
            let kind = attr(el, "type").unwrap_or("text").to_ascii_lowercase();
            match kind.as_str() {
                "checkbox" => "checkbox",
                "radio" => "radio",
                "range" => "slider",
                "number" => "spinbutton",
                "button" | "submit" | "reset" | "image" => "button",
                "search" => "searchbox",
                "text" | "email" | "tel" | "url" => "textbox",
                _ => return None,
            }
        }
        _ => return None,
    };
    Some(role)
}

/// 역할에 필요한 ARIA 속성 누락
pub struct RoleHasRequiredAriaProps;

static ROLE_HAS_REQUIRED_ARIA_PROPS: RuleMeta = RuleMeta {
    id: "role-has-required-aria-props",
    criterion: Some("4.1.2"),
    level: ConformanceLevel::A,
    principle: Principle::Robust,
    lint_level: LintLevel::Error,
    help: "Add the ARIA state or property that this role requires.",
};

impl Rule for RoleHasRequiredAriaProps {
    fn meta(&self) -> &RuleMeta {
        &ROLE_HAS_REQUIRED_ARIA_PROPS
    }

    fn check<'a>(&self, doc: &'a MarkupDocument) -> Vec<Violation<'a>> {
        doc.elements()
            .filter_map(|el| {
                let name = el.value().name();
                // 네이티브 input은 상태를 자체적으로 노출
                if name == "input" {
                    return None;
                }
                let role = attr(&el, "role")?.trim().to_ascii_lowercase();
                if role == "heading" && super::content::is_native_heading(name) {
                    return None;
                }
                let (_, required) = REQUIRED_PROPS.iter().find(|(r, _)| *r == role)?;
                let missing: Vec<&str> = required
                    .iter()
                    .copied()
                    .filter(|prop| attr(&el, prop).is_none())
                    .collect();
                if missing.is_empty() {
                    return None;
                }
                Some(Violation::new(
                    el,
                    format!("role \"{role}\" requires {}", missing.join(", ")),
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(rule: &dyn Rule, src: &str) -> Vec<String> {
        let doc = MarkupDocument::parse("html", src);
        rule.check(&doc).into_iter().map(|v| v.message).collect()
    }

    #[test]
    fn aria_props_flags_misspelled_attribute() {
        let found = messages(
            &AriaProps,
            r#"<div aria-labeledby="x"></div><div aria-labelledby="x"></div>"#,
        );
        assert_eq!(found, vec!["aria-labeledby is not a valid ARIA attribute"]);
    }

    #[test]
    fn aria_role_validates_each_token() {
        let found = messages(
            &AriaRole,
            r#"<div role="button"></div><div role="button fancy"></div><div role="{role}"></div><div role=""></div>"#,
        );
        assert_eq!(found.len(), 2);
        assert!(found[0].contains("fancy"));
        assert_eq!(found[1], "role attribute is empty");
    }

    #[test]
    fn abstract_roles_are_rejected() {
        let found = messages(&AriaRole, r#"<div role="widget"></div>"#);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn redundant_roles_detected() {
        let found = messages(
            &NoRedundantRoles,
            r#"<button role="button">Go</button><ul role="list"></ul><nav role="navigation"></nav><a role="link">x</a><div role="button"></div>"#,
        );
        assert_eq!(found.len(), 2);
        assert!(found[0].starts_with("<button>"));
        assert!(found[1].starts_with("<ul>"));
    }

    #[test]
    fn input_implicit_role_depends_on_type() {
        let found = messages(
            &NoRedundantRoles,
            r#"<input type="checkbox" role="checkbox"><input type="checkbox" role="switch">"#,
        );
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn required_props_for_custom_widgets() {
        let found = messages(
            &RoleHasRequiredAriaProps,
            r#"<div role="checkbox"></div><div role="checkbox" aria-checked="false"></div><div role="combobox" aria-expanded="false"></div>"#,
        );
        assert_eq!(
            found,
            vec![
                "role \"checkbox\" requires aria-checked",
                "role \"combobox\" requires aria-controls",
            ]
        );
    }

    #[test]
    fn native_elements_are_exempt_from_required_props() {
        let found = messages(
            &RoleHasRequiredAriaProps,
            r#"<input type="checkbox" role="checkbox"><h2 role="heading">T</h2><div role="heading">T</div>"#,
        );
        assert_eq!(found, vec!["role \"heading\" requires aria-level"]);
    }
}
