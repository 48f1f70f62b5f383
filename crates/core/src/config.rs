//! 설정 관리 — a11ylens.toml 파싱 및 런타임 설정
//!
//! [`A11yLensConfig`]는 모든 구성 요소의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`A11YLENS_STORE_TTL_SECS=600` 형식)
//! 3. 설정 파일 (`a11ylens.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), a11ylens_core::error::A11yError> {
//! use a11ylens_core::config::A11yLensConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = A11yLensConfig::load("a11ylens.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = A11yLensConfig::parse("[store]\nttl_secs = 600")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{A11yError, ConfigError};
use crate::types::{ConformanceLevel, ScanContext};

/// 최대 결과 보존 시간 (7일)
const MAX_TTL_SECS: u64 = 7 * 24 * 3600;

/// 최대 파일 크기 상한 (64 MiB)
const MAX_FILE_SIZE_LIMIT: usize = 64 * 1024 * 1024;

/// a11ylens 통합 설정
///
/// `a11ylens.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 구성 요소는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct A11yLensConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 작업 저장소 설정
    #[serde(default)]
    pub store: StoreConfig,
    /// 정적 코드 스캐너 설정
    #[serde(default)]
    pub code: CodeConfig,
    /// 브라우저 흐름 실행기 설정
    #[serde(default)]
    pub browser: BrowserConfig,
    /// 스캔 컨텍스트 설정
    #[serde(default)]
    pub context: ContextConfig,
}

impl A11yLensConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, A11yError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, A11yError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                A11yError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                A11yError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, A11yError> {
        toml::from_str(toml_str).map_err(|e| {
            A11yError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `A11YLENS_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "A11YLENS_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "A11YLENS_GENERAL_LOG_FORMAT");

        // Store
        override_u64(&mut self.store.ttl_secs, "A11YLENS_STORE_TTL_SECS");
        override_u64(
            &mut self.store.sweep_interval_secs,
            "A11YLENS_STORE_SWEEP_INTERVAL_SECS",
        );

        // Code
        override_csv(&mut self.code.extensions, "A11YLENS_CODE_EXTENSIONS");
        override_csv(&mut self.code.skip_dirs, "A11YLENS_CODE_SKIP_DIRS");
        override_usize(&mut self.code.max_file_size, "A11YLENS_CODE_MAX_FILE_SIZE");
        override_usize(&mut self.code.max_files, "A11YLENS_CODE_MAX_FILES");

        // Browser
        override_u64(
            &mut self.browser.navigation_timeout_ms,
            "A11YLENS_BROWSER_NAVIGATION_TIMEOUT_MS",
        );
        override_u64(
            &mut self.browser.interaction_timeout_ms,
            "A11YLENS_BROWSER_INTERACTION_TIMEOUT_MS",
        );
        override_u64(&mut self.browser.settle_ms, "A11YLENS_BROWSER_SETTLE_MS");
        override_u64(
            &mut self.browser.type_settle_ms,
            "A11YLENS_BROWSER_TYPE_SETTLE_MS",
        );
        override_u64(&mut self.browser.wait_ms, "A11YLENS_BROWSER_WAIT_MS");
        override_u64(
            &mut self.browser.probe_timeout_ms,
            "A11YLENS_BROWSER_PROBE_TIMEOUT_MS",
        );
        override_string(&mut self.browser.capture_dir, "A11YLENS_BROWSER_CAPTURE_DIR");
        override_string(&mut self.browser.user_agent, "A11YLENS_BROWSER_USER_AGENT");
        override_usize(
            &mut self.browser.max_page_bytes,
            "A11YLENS_BROWSER_MAX_PAGE_BYTES",
        );

        // Context
        override_string(
            &mut self.context.conformance_level,
            "A11YLENS_CONTEXT_CONFORMANCE_LEVEL",
        );
        override_bool(&mut self.context.aoda_context, "A11YLENS_CONTEXT_AODA_CONTEXT");
        override_string(&mut self.context.wcag_version, "A11YLENS_CONTEXT_WCAG_VERSION");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), A11yError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.store.ttl_secs == 0 || self.store.ttl_secs > MAX_TTL_SECS {
            return Err(invalid(
                "store.ttl_secs",
                format!("must be between 1 and {MAX_TTL_SECS}"),
            ));
        }

        if self.code.extensions.is_empty() {
            return Err(invalid("code.extensions", "must not be empty"));
        }

        if self.code.max_file_size == 0 || self.code.max_file_size > MAX_FILE_SIZE_LIMIT {
            return Err(invalid(
                "code.max_file_size",
                format!("must be between 1 and {MAX_FILE_SIZE_LIMIT}"),
            ));
        }

        if self.code.max_files == 0 {
            return Err(invalid("code.max_files", "must be greater than 0"));
        }

        if self.browser.navigation_timeout_ms == 0 {
            return Err(invalid(
                "browser.navigation_timeout_ms",
                "must be greater than 0",
            ));
        }

        if self.browser.interaction_timeout_ms == 0 {
            return Err(invalid(
                "browser.interaction_timeout_ms",
                "must be greater than 0",
            ));
        }

        if self.browser.probe_timeout_ms == 0 {
            return Err(invalid("browser.probe_timeout_ms", "must be greater than 0"));
        }

        if self.browser.max_page_bytes == 0 {
            return Err(invalid("browser.max_page_bytes", "must be greater than 0"));
        }

        if ConformanceLevel::from_str_loose(&self.context.conformance_level).is_none() {
            return Err(invalid("context.conformance_level", "must be one of: A, AA, AAA"));
        }

        if self.context.wcag_version.trim().is_empty() {
            return Err(invalid("context.wcag_version", "must not be empty"));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> A11yError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 작업 저장소 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// 결과 보존 시간 (초)
    pub ttl_secs: u64,
    /// 백그라운드 정리 주기 (초, 0이면 조회 시 지연 삭제만)
    pub sweep_interval_secs: u64,
}

impl StoreConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// 백그라운드 정리 주기 (비활성이면 `None`)
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            sweep_interval_secs: 0,
        }
    }
}

/// 정적 코드 스캐너 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeConfig {
    /// 검사할 파일 확장자
    pub extensions: Vec<String>,
    /// 건너뛸 디렉토리 이름
    pub skip_dirs: Vec<String>,
    /// 최대 파일 크기 (바이트)
    pub max_file_size: usize,
    /// 최대 검사 파일 수
    pub max_files: usize,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            extensions: ["html", "htm", "jsx", "tsx", "vue", "svelte"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            skip_dirs: [
                "node_modules",
                ".git",
                "target",
                "dist",
                "build",
                ".next",
                "coverage",
                "vendor",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
            max_file_size: 1024 * 1024, // 1MB
            max_files: 10_000,
        }
    }
}

/// 브라우저 흐름 실행기 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// 페이지 이동 시간 제한 (밀리초)
    pub navigation_timeout_ms: u64,
    /// 요소 상호작용 시간 제한 (밀리초)
    pub interaction_timeout_ms: u64,
    /// click 이후 안정화 대기 (밀리초)
    pub settle_ms: u64,
    /// type 이후 안정화 대기 (밀리초)
    pub type_settle_ms: u64,
    /// wait 단계 대기 (밀리초)
    pub wait_ms: u64,
    /// 도달성 확인 시간 제한 (밀리초)
    pub probe_timeout_ms: u64,
    /// DOM 캡처 저장 디렉토리 (비어 있으면 캡처 안 함)
    pub capture_dir: String,
    /// User-Agent 헤더
    pub user_agent: String,
    /// 페이지 최대 크기 (바이트)
    pub max_page_bytes: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 15_000,
            interaction_timeout_ms: 5_000,
            settle_ms: 500,
            type_settle_ms: 300,
            wait_ms: 2_000,
            probe_timeout_ms: 5_000,
            capture_dir: String::new(),
            user_agent: concat!("a11ylens/", env!("CARGO_PKG_VERSION")).to_owned(),
            max_page_bytes: 5 * 1024 * 1024, // 5MB
        }
    }
}

/// 스캔 컨텍스트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// 목표 적합성 수준 (A, AA, AAA)
    pub conformance_level: String,
    /// AODA 맥락 적용 여부
    pub aoda_context: bool,
    /// WCAG 버전
    pub wcag_version: String,
}

impl ContextConfig {
    /// 검증된 설정에서 스캔 컨텍스트를 만듭니다.
    ///
    /// 알 수 없는 적합성 수준은 AA로 간주합니다.
    pub fn to_scan_context(&self) -> ScanContext {
        ScanContext {
            conformance_level: ConformanceLevel::from_str_loose(&self.conformance_level)
                .unwrap_or_default(),
            aoda_context: self.aoda_context,
            wcag_version: self.wcag_version.clone(),
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            conformance_level: "AA".to_owned(),
            aoda_context: true,
            wcag_version: "2.1".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = A11yLensConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.store.ttl_secs, 3600);
        assert!(config.store.sweep_interval().is_none());
        assert!(config.code.extensions.contains(&"tsx".to_owned()));
        assert!(config.code.skip_dirs.contains(&"node_modules".to_owned()));
        assert!(config.browser.capture_dir.is_empty());
        assert_eq!(config.context.conformance_level, "AA");
    }

    #[test]
    fn default_config_passes_validation() {
        A11yLensConfig::default().validate().unwrap();
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config = A11yLensConfig::parse("").unwrap();
        assert_eq!(config.store.ttl_secs, 3600);
        assert_eq!(config.browser.navigation_timeout_ms, 15_000);
    }

    #[test]
    fn parse_partial_toml_merges_with_defaults() {
        let toml = r#"
[store]
ttl_secs = 600

[browser]
capture_dir = "/tmp/captures"
"#;
        let config = A11yLensConfig::parse(toml).unwrap();
        assert_eq!(config.store.ttl_secs, 600);
        // sweep_interval_secs는 기본값 유지
        assert_eq!(config.store.sweep_interval_secs, 0);
        assert_eq!(config.browser.capture_dir, "/tmp/captures");
        assert_eq!(config.browser.settle_ms, 500);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[general]
log_level = "debug"
log_format = "pretty"

[store]
ttl_secs = 120
sweep_interval_secs = 30

[code]
extensions = ["html", "jsx"]
skip_dirs = ["node_modules"]
max_file_size = 2048
max_files = 50

[browser]
navigation_timeout_ms = 1000
interaction_timeout_ms = 500
settle_ms = 0
type_settle_ms = 0
wait_ms = 10
probe_timeout_ms = 250
capture_dir = "captures"
user_agent = "test-agent"
max_page_bytes = 65536

[context]
conformance_level = "AAA"
aoda_context = false
wcag_version = "2.2"
"#;
        let config = A11yLensConfig::parse(toml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.store.sweep_interval(), Some(Duration::from_secs(30)));
        assert_eq!(config.code.extensions, vec!["html", "jsx"]);
        assert_eq!(config.browser.user_agent, "test-agent");
        let ctx = config.context.to_scan_context();
        assert_eq!(ctx.conformance_level, ConformanceLevel::AAA);
        assert!(!ctx.aoda_context);
        assert_eq!(ctx.wcag_version, "2.2");
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let err = A11yLensConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            A11yError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = A11yLensConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = A11yLensConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_zero_ttl() {
        let mut config = A11yLensConfig::default();
        config.store.ttl_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ttl_secs"));
    }

    #[test]
    fn validate_rejects_excessive_ttl() {
        let mut config = A11yLensConfig::default();
        config.store.ttl_secs = MAX_TTL_SECS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_extensions() {
        let mut config = A11yLensConfig::default();
        config.code.extensions.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("extensions"));
    }

    #[test]
    fn validate_rejects_zero_navigation_timeout() {
        let mut config = A11yLensConfig::default();
        config.browser.navigation_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("navigation_timeout_ms"));
    }

    #[test]
    fn validate_rejects_unknown_conformance_level() {
        let mut config = A11yLensConfig::default();
        config.context.conformance_level = "B".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("conformance_level"));
    }

    #[test]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: 고유한 키를 사용하며 다른 테스트와 공유하지 않습니다.
        unsafe { std::env::set_var("TEST_A11YLENS_STR", "overridden") };
        override_string(&mut val, "TEST_A11YLENS_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_A11YLENS_STR") };
    }

    #[test]
    fn env_override_bool_invalid_keeps_original() {
        let mut val = false;
        // SAFETY: 고유한 키를 사용하며 다른 테스트와 공유하지 않습니다.
        unsafe { std::env::set_var("TEST_A11YLENS_BOOL_BAD", "not-a-bool") };
        override_bool(&mut val, "TEST_A11YLENS_BOOL_BAD");
        assert!(!val);
        unsafe { std::env::remove_var("TEST_A11YLENS_BOOL_BAD") };
    }

    #[test]
    fn env_override_csv_trims_and_drops_empty() {
        let mut val = vec!["a".to_owned()];
        // SAFETY: 고유한 키를 사용하며 다른 테스트와 공유하지 않습니다.
        unsafe { std::env::set_var("TEST_A11YLENS_CSV", "html, jsx,, vue") };
        override_csv(&mut val, "TEST_A11YLENS_CSV");
        assert_eq!(val, vec!["html", "jsx", "vue"]);
        unsafe { std::env::remove_var("TEST_A11YLENS_CSV") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = 42u64;
        override_u64(&mut val, "TEST_A11YLENS_NONEXISTENT_12345");
        assert_eq!(val, 42);
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = A11yLensConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = A11yLensConfig::parse(&toml_str).unwrap();
        assert_eq!(config.store.ttl_secs, parsed.store.ttl_secs);
        assert_eq!(config.code.skip_dirs, parsed.code.skip_dirs);
        assert_eq!(config.browser.user_agent, parsed.browser.user_agent);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let err = A11yLensConfig::from_file("/nonexistent/path/a11ylens.toml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            A11yError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
