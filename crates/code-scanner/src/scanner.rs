//! 정적 스캐너 -- 로컬 코드베이스 순회와 규칙 적용
//!
//! [`StaticCodeScanner`]는 core의 [`CodeDetector`] trait을 구현하여
//! 스캔 작업 조정기에서 정적 탐지기로 사용됩니다.
//!
//! # 내부 흐름
//!
//! ```text
//! target --> resolve_target --> walkdir (skip_dirs, 숨김 디렉토리 제외)
//!                                   |
//!                             MarkupDocument::parse
//!                                   |
//!                          Rule::check (수준 필터 적용)
//!                                   |
//!                        Issue (code-N, 파일/줄/열) --> CodeScanResult
//! ```
//!
//! 파일 I/O와 DOM 파싱은 모두 `spawn_blocking` 안에서 수행됩니다.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use a11ylens_core::detector::{CodeDetector, CodeScanRequest};
use a11ylens_core::error::DetectorError;
use a11ylens_core::scan::CodeScanResult;
use a11ylens_core::types::{ConformanceLevel, Issue};

use crate::config::CodeScannerConfig;
use crate::error::CodeScannerError;
use crate::markup::{MarkupDocument, opening_tag};
use crate::rules::{Rule, default_rules};

/// 로컬에서 해석하지 않는 원격 대상 접두사
const REMOTE_PREFIXES: &[&str] = &["http://", "https://", "git@", "ssh://", "git://"];

/// 정적 접근성 스캐너
pub struct StaticCodeScanner {
    config: Arc<CodeScannerConfig>,
    rules: Arc<Vec<Box<dyn Rule>>>,
}

impl StaticCodeScanner {
    /// 기본 규칙 집합으로 스캐너를 생성합니다.
    ///
    /// # Errors
    ///
    /// 설정 검증에 실패하면 [`CodeScannerError::Config`]를 반환합니다.
    pub fn new(config: CodeScannerConfig) -> Result<Self, CodeScannerError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            rules: Arc::new(default_rules()),
        })
    }

    /// 규칙 집합을 교체합니다.
    pub fn with_rules(mut self, rules: Vec<Box<dyn Rule>>) -> Self {
        self.rules = Arc::new(rules);
        self
    }

    pub fn config(&self) -> &CodeScannerConfig {
        &self.config
    }

    /// 등록된 규칙 ID 목록
    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.meta().id).collect()
    }
}

impl CodeDetector for StaticCodeScanner {
    fn name(&self) -> &str {
        "code"
    }

    async fn scan_code(
        &self,
        job_id: &str,
        request: &CodeScanRequest,
    ) -> Result<CodeScanResult, DetectorError> {
        info!(
            job_id,
            target = %request.target,
            git_ref = ?request.git_ref,
            level = ?request.context.conformance_level,
            "starting static scan"
        );
        if let Some(git_ref) = &request.git_ref {
            debug!(job_id, git_ref = %git_ref, "git ref recorded; working tree is scanned as-is");
        }

        let target = request.target.clone();
        let level = request.context.conformance_level;
        let config = Arc::clone(&self.config);
        let rules = Arc::clone(&self.rules);

        let outcome = tokio::task::spawn_blocking(move || {
            let root = resolve_target(&target)?;
            Ok::<_, CodeScannerError>(scan_tree(&root, &config, &rules, level))
        })
        .await
        .map_err(|e| CodeScannerError::Task(format!("spawn_blocking failed: {e}")))??;

        info!(
            job_id,
            files = outcome.files.len(),
            issues = outcome.issues.len(),
            "static scan completed"
        );

        Ok(CodeScanResult::new(job_id, outcome.issues, outcome.files))
    }
}

/// 스캔 대상 문자열을 로컬 경로로 해석합니다.
fn resolve_target(target: &str) -> Result<PathBuf, CodeScannerError> {
    let unresolved = |reason: &str| CodeScannerError::TargetUnresolved {
        target: target.to_owned(),
        reason: reason.to_owned(),
    };

    let trimmed = target.trim();
    if trimmed.is_empty() {
        return Err(unresolved("target is empty"));
    }
    if REMOTE_PREFIXES
        .iter()
        .any(|prefix| trimmed.to_ascii_lowercase().starts_with(prefix))
    {
        return Err(unresolved("remote repositories are not fetched; scan a local checkout"));
    }

    let path = PathBuf::from(trimmed);
    if !path.exists() {
        return Err(unresolved("path does not exist"));
    }
    Ok(path)
}

struct ScanOutcome {
    issues: Vec<Issue>,
    files: Vec<String>,
}

/// 검사 대상 파일을 찾고 규칙을 적용합니다.
///
/// `tokio::task::spawn_blocking` 내에서 호출되어야 합니다.
fn scan_tree(
    root: &Path,
    config: &CodeScannerConfig,
    rules: &[Box<dyn Rule>],
    level: ConformanceLevel,
) -> ScanOutcome {
    let active: Vec<&dyn Rule> = rules
        .iter()
        .map(AsRef::as_ref)
        .filter(|rule| rule.meta().applies_to(level))
        .collect();
    debug!(active = active.len(), total = rules.len(), "rules filtered by conformance level");

    let mut outcome = ScanOutcome {
        issues: Vec::new(),
        files: Vec::new(),
    };

    for (path, relative) in discover_files(root, config) {
        match std::fs::metadata(&path) {
            Ok(meta) if meta.len() > config.max_file_size as u64 => {
                warn!(path = %relative, size = meta.len(), "file too large, skipping");
                continue;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(path = %relative, error = %e, "failed to stat file, skipping");
                continue;
            }
        }

        let source = match std::fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) => {
                warn!(path = %relative, error = %e, "failed to read file, skipping");
                continue;
            }
        };

        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .unwrap_or_default();
        check_file(&relative, extension, &source, &active, &mut outcome.issues);
        outcome.files.push(relative);
    }

    outcome
}

/// 파일 하나에 규칙을 적용하고 위치 순서대로 이슈를 추가합니다.
fn check_file(
    relative: &str,
    extension: &str,
    source: &str,
    rules: &[&dyn Rule],
    issues: &mut Vec<Issue>,
) {
    let doc = MarkupDocument::parse(extension, source);

    let mut found = Vec::new();
    for rule in rules {
        let meta = rule.meta();
        for violation in rule.check(&doc) {
            let position = doc.locate(violation.element);
            let snippet = opening_tag(violation.element);
            found.push((position, meta, violation.message, snippet));
        }
    }
    // 위치를 모르는 위반은 파일 끝으로
    found.sort_by_key(|(position, ..)| position.unwrap_or((u32::MAX, u32::MAX)));

    for (position, meta, message, snippet) in found {
        let (line, column) = position.unzip();
        let id = format!("code-{}", issues.len() + 1);
        let mut issue = Issue::new(id, meta.id, message, meta.impact())
            .with_principle(meta.principle)
            .at_source(relative, line, column)
            .with_snippet(snippet)
            .with_suggested_fix(meta.help)
            .with_help_url(meta.help_url());
        if let Some(criterion) = meta.criterion {
            issue = issue.with_criterion(criterion, meta.level);
        }
        issues.push(issue);
    }
}

/// 검사할 파일을 (절대 경로, 상대 경로) 쌍으로 찾습니다.
///
/// `max_files`에 도달하면 나머지는 건너뜁니다.
fn discover_files(root: &Path, config: &CodeScannerConfig) -> Vec<(PathBuf, String)> {
    if root.is_file() {
        let accepted = root
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| config.accepts_extension(ext));
        if !accepted {
            debug!(path = %root.display(), "target file extension not scanned");
            return Vec::new();
        }
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());
        return vec![(root.to_path_buf(), name)];
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry, config));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "failed to read directory entry, skipping");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let accepted = entry
            .path()
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| config.accepts_extension(ext));
        if !accepted {
            continue;
        }
        if files.len() >= config.max_files {
            warn!(limit = config.max_files, "max_files reached, remaining files skipped");
            break;
        }
        let relative = relative_path(root, entry.path());
        files.push((entry.into_path(), relative));
    }

    files
}

fn is_skipped_dir(entry: &DirEntry, config: &CodeScannerConfig) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || config.skips_dir(&name)
}

/// 루트 기준 상대 경로를 `/` 구분자로 만듭니다.
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
