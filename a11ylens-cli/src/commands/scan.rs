//! `a11ylens scan` command handler
//!
//! Builds both detectors from configuration, runs one job through the
//! orchestrator and renders the result read back from the job store.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use a11ylens_browser_runner::{BrowserRunnerConfig, HttpFlowRunner};
use a11ylens_code_scanner::{CodeScannerConfig, StaticCodeScanner};
use a11ylens_core::config::A11yLensConfig;
use a11ylens_core::detector::{BrowserFlowConfig, FlowStepConfig};
use a11ylens_core::scan::{FullScanResult, ScanMode};
use a11ylens_core::types::{Impact, Issue};
use a11ylens_jobs::{JobResults, JobStore, ScanOrchestrator, ScanRequest, new_job_id};
use a11ylens_report::{
    FixSuggester, FixSuggestion, RemediationPlan, ReportOptions, Suggester, generate_report,
};

use crate::cli::ScanArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// `--flow` file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowFile {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub steps: Vec<FlowStepConfig>,
}

impl FlowFile {
    pub fn parse(content: &str) -> Result<Self, CliError> {
        toml::from_str(content).map_err(|e| CliError::InvalidRequest(format!("flow file: {e}")))
    }
}

/// Execute the `scan` command.
pub async fn execute(
    args: ScanArgs,
    config: &A11yLensConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let code = StaticCodeScanner::new(CodeScannerConfig::from_core(&config.code))
        .map_err(|e| CliError::Config(e.to_string()))?;
    let browser = HttpFlowRunner::new(BrowserRunnerConfig::from_core(&config.browser))
        .map_err(|e| CliError::Config(e.to_string()))?;

    let store = Arc::new(JobStore::new(config.store.ttl()));
    let _sweeper = config
        .store
        .sweep_interval()
        .map(|interval| store.spawn_sweeper(interval));

    let request = build_request(&args, config).await?;
    let job_id = args.job_id.clone().unwrap_or_else(new_job_id);

    info!(job_id = %job_id, mode = %request.mode, "scan requested");
    let orchestrator = ScanOrchestrator::new(code, browser, Arc::clone(&store));
    orchestrator.orchestrate(&job_id, &request).await?;

    let result = store
        .get_job_result(&job_id)
        .await
        .ok_or_else(|| CliError::JobNotFound(job_id.clone()))?;

    if let Some(path) = &args.report {
        write_report(&result, config, path).await?;
    }

    let suggestions = if args.suggest {
        let suggester = Suggester::from_env();
        info!(suggester = suggester.name(), issues = result.issues().len(), "requesting fix suggestions");
        suggester.suggest(result.issues()).await
    } else {
        Vec::new()
    };

    let remediation = match &args.pr_repo {
        Some(repo) => Some(
            RemediationPlan::for_job(&result, repo, &args.base_branch)?
                .with_suggestions(&suggestions),
        ),
        None => None,
    };

    let output = ScanOutput {
        result: &result,
        report_path: args.report.as_ref().map(|p| p.display().to_string()),
        suggestions,
        remediation,
    };
    writer.render(&output)?;

    if let Some(threshold) = args.fail_on {
        let threshold = Impact::from(threshold);
        let count = result.summary().at_or_above(threshold);
        if count > 0 {
            return Err(CliError::IssuesFound { count, threshold });
        }
    }
    Ok(())
}

/// Assemble the scan request from flags and the optional flow file.
async fn build_request(args: &ScanArgs, config: &A11yLensConfig) -> Result<ScanRequest, CliError> {
    let flow = match &args.flow {
        Some(path) => {
            let content = tokio::fs::read_to_string(path).await?;
            Some(FlowFile::parse(&content)?)
        }
        None => None,
    };
    let flow = merge_flow(flow, args.base_url.as_deref());

    let mode = ScanMode::from(args.mode);
    let target = args.target.clone().unwrap_or_default();
    let mut request = match mode {
        ScanMode::Code => ScanRequest::code(target),
        ScanMode::Full => ScanRequest::full(target, flow),
        ScanMode::Browser => ScanRequest {
            mode,
            target: None,
            git_ref: None,
            browser: flow,
            context: Default::default(),
        },
    };
    if mode == ScanMode::Code && (args.flow.is_some() || args.base_url.is_some()) {
        warn!("code mode ignores --flow and --base-url");
    }
    if let Some(git_ref) = &args.git_ref {
        request = request.with_ref(git_ref.clone());
    }
    Ok(request.with_context(config.context.to_scan_context()))
}

/// `--base-url` wins over the flow file's `base_url`.
fn merge_flow(flow: Option<FlowFile>, base_url: Option<&str>) -> Option<BrowserFlowConfig> {
    let flow = flow.unwrap_or_default();
    let base_url = base_url.map(str::to_owned).or(flow.base_url)?;
    Some(BrowserFlowConfig {
        base_url,
        steps: flow.steps,
    })
}

async fn write_report(
    result: &FullScanResult,
    config: &A11yLensConfig,
    path: &Path,
) -> Result<(), CliError> {
    let options = ReportOptions {
        title: None,
        context: config.context.to_scan_context(),
    };
    let report = generate_report(result, &options);
    report.write_json(path).await?;
    Ok(())
}

/// Scan command output.
#[derive(Serialize)]
pub struct ScanOutput<'a> {
    #[serde(flatten)]
    pub result: &'a FullScanResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<FixSuggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<RemediationPlan>,
}

impl Render for ScanOutput<'_> {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let result = self.result;
        let summary = result.summary();
        writeln!(w, "Scan Job: {}", result.job_id().bold())?;
        writeln!(w, "  Mode: {}", result.mode())?;
        writeln!(
            w,
            "  Files scanned: {}",
            result.code_scan().files_scanned().len()
        )?;
        match result.browser_scan() {
            Some(browser) => writeln!(w, "  Browser steps: {}", browser.steps().len())?,
            None if result.mode() != ScanMode::Code => {
                writeln!(w, "  Browser steps: {}", "skipped".yellow())?
            }
            None => {}
        }
        writeln!(
            w,
            "  Issues: {} (critical {}, serious {}, moderate {}, minor {})",
            summary.total(),
            summary.critical(),
            summary.serious(),
            summary.moderate(),
            summary.minor()
        )?;

        if !result.issues().is_empty() {
            writeln!(w)?;
            writeln!(w, "  {:<10} {:<40} {}", "IMPACT", "LOCATION", "TITLE")?;
            writeln!(w, "  {}", "-".repeat(78))?;
            for issue in result.issues() {
                write_issue_row(w, issue)?;
            }
        }

        if let Some(path) = &self.report_path {
            writeln!(w)?;
            writeln!(w, "Report written to {path}")?;
        }

        if !self.suggestions.is_empty() {
            writeln!(w)?;
            writeln!(w, "Suggested fixes:")?;
            for s in &self.suggestions {
                writeln!(
                    w,
                    "  {} ({:.0}%): {}",
                    s.issue_id,
                    s.confidence * 100.0,
                    s.suggested_description
                )?;
            }
        }

        if let Some(plan) = &self.remediation {
            writeln!(w)?;
            writeln!(w, "Remediation PR:")?;
            writeln!(w, "  Repo:   {}", plan.repo)?;
            writeln!(w, "  Branch: {} -> {}", plan.branch, plan.base_branch)?;
            writeln!(w, "  Title:  {}", plan.title)?;
        }
        Ok(())
    }
}

fn write_issue_row(w: &mut dyn Write, issue: &Issue) -> std::io::Result<()> {
    use colored::Colorize;

    let impact = match issue.impact {
        Impact::Critical => issue.impact.as_str().red().bold(),
        Impact::Serious => issue.impact.as_str().red(),
        Impact::Moderate => issue.impact.as_str().yellow(),
        Impact::Minor => issue.impact.as_str().normal(),
    };
    writeln!(
        w,
        "  {:<10} {:<40} {}",
        impact,
        truncate(&issue_location(issue), 40),
        issue.title
    )
}

/// `-` when the issue has no locator.
fn issue_location(issue: &Issue) -> String {
    issue
        .locator
        .as_ref()
        .map_or_else(|| "-".to_owned(), ToString::to_string)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_owned()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_file_parses_steps() {
        let flow = FlowFile::parse(
            r##"
base_url = "http://shop.test"

[[steps]]
name = "home"

[[steps]]
name = "search"
action = "type"
selector = "#q"
value = "shoes"
"##,
        )
        .unwrap();

        assert_eq!(flow.base_url.as_deref(), Some("http://shop.test"));
        assert_eq!(flow.steps.len(), 2);
        assert_eq!(flow.steps[1].selector.as_deref(), Some("#q"));
    }

    #[test]
    fn flow_file_rejects_unknown_keys() {
        let err = FlowFile::parse("base = \"http://x\"").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn base_url_flag_overrides_flow_file() {
        let flow = FlowFile {
            base_url: Some("http://from-file.test".to_owned()),
            steps: Vec::new(),
        };
        let merged = merge_flow(Some(flow), Some("http://flag.test")).unwrap();
        assert_eq!(merged.base_url, "http://flag.test");
    }

    #[test]
    fn no_base_url_means_no_flow() {
        assert!(merge_flow(None, None).is_none());
        let steps_only = FlowFile {
            base_url: None,
            steps: vec![FlowStepConfig {
                name: "home".to_owned(),
                ..FlowStepConfig::default()
            }],
        };
        assert!(merge_flow(Some(steps_only), None).is_none());
        assert_eq!(
            merge_flow(None, Some("http://flag.test")).unwrap().base_url,
            "http://flag.test"
        );
    }

    #[test]
    fn text_output_renders_issues_with_and_without_locator() {
        use a11ylens_core::scan::{CodeScanResult, ScanComposition};

        colored::control::set_override(false);
        let issues = vec![
            Issue::new("code-1", "alt-text", "img element has no alt attribute", Impact::Critical)
                .at_source("page.html", Some(1), Some(6)),
            Issue::new("code-2", "html-has-lang", "html element has no lang", Impact::Minor),
        ];
        let result = FullScanResult::assemble(
            "job_text",
            ScanMode::Code,
            ScanComposition::CodeOnly(CodeScanResult::new(
                "job_text",
                issues,
                vec!["page.html".to_owned()],
            )),
        );
        let output = ScanOutput {
            result: &result,
            report_path: None,
            suggestions: Vec::new(),
            remediation: None,
        };

        let mut buffer = Vec::new();
        output.render_text(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("Issues: 2 (critical 1, serious 0, moderate 0, minor 1)"));
        assert!(text.contains("page.html:1:6"));
        let unlocated = text
            .lines()
            .find(|line| line.contains("html-has-lang"))
            .unwrap();
        assert!(unlocated.contains(" - "), "{unlocated}");
    }

    #[test]
    fn truncate_long_locations() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }
}
