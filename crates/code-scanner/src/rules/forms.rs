//! 폼 레이블 규칙

use scraper::ElementRef;

use a11ylens_core::types::{ConformanceLevel, Principle};

use super::{LintLevel, Rule, RuleMeta, Violation, has_nonempty_attr};
use crate::markup::MarkupDocument;

/// 레이블이 연결할 수 있는 폼 컨트롤
const LABELABLE: &[&str] = &["input", "meter", "output", "progress", "select", "textarea"];

/// label은 컨트롤과 연결되어야 함
pub struct LabelHasAssociatedControl;

static LABEL_HAS_ASSOCIATED_CONTROL: RuleMeta = RuleMeta {
    id: "label-has-associated-control",
    criterion: Some("1.3.1"),
    level: ConformanceLevel::A,
    principle: Principle::Perceivable,
    lint_level: LintLevel::Error,
    help: "Point the label at its control with for/htmlFor, or nest the control inside the label.",
};

impl Rule for LabelHasAssociatedControl {
    fn meta(&self) -> &RuleMeta {
        &LABEL_HAS_ASSOCIATED_CONTROL
    }

    fn check<'a>(&self, doc: &'a MarkupDocument) -> Vec<Violation<'a>> {
        doc.elements_named("label")
            .filter(|el| !is_associated(el))
            .map(|el| Violation::new(el, "label is not associated with a form control"))
            .collect()
    }
}

fn is_associated(label: &ElementRef<'_>) -> bool {
    // JSX의 htmlFor는 파서에서 소문자 htmlfor가 됨
    if has_nonempty_attr(label, "for") || has_nonempty_attr(label, "htmlfor") {
        return true;
    }
    label
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|child| LABELABLE.contains(&child.value().name()))
}
