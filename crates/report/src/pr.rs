//! 개선 PR 계획
//!
//! 저장된 결과에서 PR의 대상 저장소, 브랜치, 제목, 본문을 계산합니다.
//! 원격 저장소에 브랜치를 만들거나 push하지 않습니다.

use std::fmt;

use serde::Serialize;

use a11ylens_core::scan::FullScanResult;

use crate::error::ReportError;
use crate::suggest::FixSuggestion;

const GITHUB_PREFIXES: &[&str] = &["https://github.com/", "http://github.com/"];

/// PR 본문의 면책 문구
pub const PR_DISCLAIMER: &str = "Human-in-the-loop. This PR provides suggested fixes for WCAG 2.1 / AODA context. Review before merging. Not legal compliance certification.";

/// `owner/repo` 저장소 참조
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// `owner/repo` 또는 GitHub URL을 해석합니다.
    pub fn parse(repo: &str) -> Result<Self, ReportError> {
        let mut cleaned = repo.trim();
        for prefix in GITHUB_PREFIXES {
            if let Some(rest) = cleaned.strip_prefix(prefix) {
                cleaned = rest;
                break;
            }
        }
        let cleaned = cleaned.trim_end_matches('/');
        let cleaned = cleaned.strip_suffix(".git").unwrap_or(cleaned);

        let invalid = || {
            ReportError::invalid_input("repo", format!("'{repo}' is not in owner/repo format"))
        };
        let (owner, name) = cleaned.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_owned(),
            name: name.to_owned(),
        })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// 개선 PR 계획
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemediationPlan {
    pub repo: RepoRef,
    pub branch: String,
    pub base_branch: String,
    pub title: String,
    pub body: String,
}

impl RemediationPlan {
    /// 저장된 결과로 PR 계획을 만듭니다.
    pub fn for_job(
        result: &FullScanResult,
        repo: &str,
        base_branch: &str,
    ) -> Result<Self, ReportError> {
        let repo = RepoRef::parse(repo)?;
        let base_branch = base_branch.trim();
        if base_branch.is_empty() {
            return Err(ReportError::invalid_input("base_branch", "must not be empty"));
        }

        let job_id = result.job_id();
        let summary = result.summary();
        let body = [
            "## Accessibility Remediation".to_owned(),
            format!("Job ID: {job_id}"),
            String::new(),
            "### Summary".to_owned(),
            format!("- **Total issues**: {}", summary.total()),
            format!(
                "- Critical: {}, Serious: {}, Moderate: {}, Minor: {}",
                summary.critical(),
                summary.serious(),
                summary.moderate(),
                summary.minor()
            ),
            String::new(),
            "### Disclaimer".to_owned(),
            PR_DISCLAIMER.to_owned(),
        ]
        .join("\n");

        Ok(Self {
            repo,
            branch: remediation_branch(job_id),
            base_branch: base_branch.to_owned(),
            title: format!("[a11y] Remediation for scan {job_id}"),
            body,
        })
    }

    /// 제안 목록을 본문에 덧붙입니다.
    pub fn with_suggestions(mut self, suggestions: &[FixSuggestion]) -> Self {
        if suggestions.is_empty() {
            return self;
        }
        self.body.push_str("\n\n### Suggested fixes");
        for suggestion in suggestions {
            self.body.push_str(&format!(
                "\n- `{}`: {}",
                suggestion.issue_id, suggestion.suggested_description
            ));
        }
        self
    }
}

/// `a11y/remediation-{job_id}` (영숫자가 아닌 문자는 `-`)
pub fn remediation_branch(job_id: &str) -> String {
    let sanitized: String = job_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("a11y/remediation-{sanitized}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use a11ylens_core::scan::{CodeScanResult, ScanComposition, ScanMode};
    use a11ylens_core::types::{Impact, Issue};

    fn result() -> FullScanResult {
        let issues = vec![
            Issue::new("code-1", "a", "a", Impact::Critical),
            Issue::new("code-2", "b", "b", Impact::Minor),
        ];
        FullScanResult::assemble(
            "job_7f3a",
            ScanMode::Code,
            ScanComposition::CodeOnly(CodeScanResult::new("job_7f3a", issues, vec![])),
        )
    }

    #[test]
    fn parses_owner_repo_and_github_urls() {
        for input in [
            "acme/shop",
            "https://github.com/acme/shop",
            "https://github.com/acme/shop.git",
            " http://github.com/acme/shop/ ",
        ] {
            let repo = RepoRef::parse(input).unwrap();
            assert_eq!(repo.to_string(), "acme/shop", "{input}");
        }
    }

    #[test]
    fn rejects_malformed_repo() {
        for input in ["", "acme", "/shop", "acme/", "acme/shop/extra"] {
            assert!(RepoRef::parse(input).is_err(), "{input}");
        }
    }

    #[test]
    fn branch_replaces_non_alphanumerics() {
        assert_eq!(remediation_branch("job_7f3a"), "a11y/remediation-job-7f3a");
        assert_eq!(remediation_branch("a.b/c"), "a11y/remediation-a-b-c");
    }

    #[test]
    fn plan_has_title_branch_and_summary_body() {
        let plan = RemediationPlan::for_job(&result(), "acme/shop", "main").unwrap();
        assert_eq!(plan.title, "[a11y] Remediation for scan job_7f3a");
        assert_eq!(plan.branch, "a11y/remediation-job-7f3a");
        assert_eq!(plan.base_branch, "main");
        assert!(plan.body.contains("Job ID: job_7f3a"));
        assert!(plan.body.contains("- **Total issues**: 2"));
        assert!(plan.body.contains("- Critical: 1, Serious: 0, Moderate: 0, Minor: 1"));
        assert!(plan.body.ends_with(PR_DISCLAIMER));
    }

    #[test]
    fn blank_base_branch_is_rejected() {
        assert!(RemediationPlan::for_job(&result(), "acme/shop", "  ").is_err());
    }

    #[test]
    fn suggestions_are_listed_in_body() {
        let plan = RemediationPlan::for_job(&result(), "acme/shop", "main")
            .unwrap()
            .with_suggestions(&[FixSuggestion {
                issue_id: "code-1".to_owned(),
                suggested_code: None,
                suggested_description: "Add alt text".to_owned(),
                confidence: 0.7,
                alternatives: Vec::new(),
            }]);
        assert!(plan.body.contains("### Suggested fixes\n- `code-1`: Add alt text"));
    }
}
