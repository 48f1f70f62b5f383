//! a11ylens.toml 통합 설정 테스트
//!
//! - a11ylens.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use a11ylens_core::config::A11yLensConfig;
use a11ylens_core::error::{A11yError, ConfigError};
use a11ylens_core::types::ConformanceLevel;

const EXAMPLE: &str = include_str!("../../../a11ylens.toml.example");

/// 환경변수를 설정하고 클로저 실행 후 원래 값으로 복원합니다.
fn with_env<T>(key: &str, value: &str, f: impl FnOnce() -> T) -> T {
    let original = std::env::var(key).ok();
    // SAFETY: #[serial] 테스트에서만 호출되어 환경변수 조작이 직렬화됩니다.
    unsafe { std::env::set_var(key, value) };
    let result = f();
    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var(key, val),
            None => std::env::remove_var(key),
        }
    }
    result
}

// =============================================================================
// a11ylens.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_and_validates() {
    let config = A11yLensConfig::parse(EXAMPLE).expect("example config should parse");
    config
        .validate()
        .expect("example config should pass validation");
    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.store.ttl_secs, 3600);
}

#[test]
fn example_config_matches_code_defaults() {
    let from_file = A11yLensConfig::parse(EXAMPLE).expect("should parse");
    let from_code = A11yLensConfig::default();

    assert_eq!(from_file.general.log_level, from_code.general.log_level);
    assert_eq!(from_file.general.log_format, from_code.general.log_format);

    assert_eq!(from_file.store.ttl_secs, from_code.store.ttl_secs);
    assert_eq!(
        from_file.store.sweep_interval_secs,
        from_code.store.sweep_interval_secs
    );

    assert_eq!(from_file.code.extensions, from_code.code.extensions);
    assert_eq!(from_file.code.skip_dirs, from_code.code.skip_dirs);
    assert_eq!(from_file.code.max_file_size, from_code.code.max_file_size);
    assert_eq!(from_file.code.max_files, from_code.code.max_files);

    assert_eq!(
        from_file.browser.navigation_timeout_ms,
        from_code.browser.navigation_timeout_ms
    );
    assert_eq!(
        from_file.browser.interaction_timeout_ms,
        from_code.browser.interaction_timeout_ms
    );
    assert_eq!(from_file.browser.settle_ms, from_code.browser.settle_ms);
    assert_eq!(
        from_file.browser.type_settle_ms,
        from_code.browser.type_settle_ms
    );
    assert_eq!(from_file.browser.wait_ms, from_code.browser.wait_ms);
    assert_eq!(
        from_file.browser.probe_timeout_ms,
        from_code.browser.probe_timeout_ms
    );
    assert_eq!(from_file.browser.capture_dir, from_code.browser.capture_dir);
    assert_eq!(from_file.browser.user_agent, from_code.browser.user_agent);
    assert_eq!(
        from_file.browser.max_page_bytes,
        from_code.browser.max_page_bytes
    );

    assert_eq!(
        from_file.context.conformance_level,
        from_code.context.conformance_level
    );
    assert_eq!(from_file.context.aoda_context, from_code.context.aoda_context);
    assert_eq!(from_file.context.wcag_version, from_code.context.wcag_version);
}

// =============================================================================
// 부분 설정 테스트
// =============================================================================

#[test]
fn partial_config_store_only() {
    let toml = r#"
[store]
ttl_secs = 60
"#;
    let config = A11yLensConfig::parse(toml).expect("should parse");
    assert_eq!(config.store.ttl_secs, 60);
    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.browser.wait_ms, 2000);
}

#[test]
fn partial_config_context_only() {
    let toml = r#"
[context]
conformance_level = "A"
"#;
    let config = A11yLensConfig::parse(toml).expect("should parse");
    let ctx = config.context.to_scan_context();
    assert_eq!(ctx.conformance_level, ConformanceLevel::A);
    assert!(ctx.aoda_context);
    assert_eq!(ctx.wcag_version, "2.1");
}

#[test]
fn partial_config_two_sections() {
    let toml = r#"
[general]
log_format = "pretty"

[code]
max_files = 5
"#;
    let config = A11yLensConfig::parse(toml).expect("should parse");
    assert_eq!(config.general.log_format, "pretty");
    assert_eq!(config.code.max_files, 5);
    assert_eq!(config.code.max_file_size, 1024 * 1024);
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let toml = r#"
[general]
log_level = "info"
"#;
    let result = with_env("A11YLENS_GENERAL_LOG_LEVEL", "error", || {
        let mut config = A11yLensConfig::parse(toml).expect("should parse");
        config.apply_env_overrides();
        config.general.log_level
    });
    assert_eq!(result, "error");
}

#[test]
#[serial_test::serial]
fn env_override_numeric_field() {
    let result = with_env("A11YLENS_STORE_TTL_SECS", "90", || {
        let mut config = A11yLensConfig::parse("").expect("should parse");
        config.apply_env_overrides();
        config.store.ttl_secs
    });
    assert_eq!(result, 90);
}

#[test]
#[serial_test::serial]
fn env_override_invalid_numeric_keeps_toml_value() {
    let toml = r#"
[store]
ttl_secs = 120
"#;
    let result = with_env("A11YLENS_STORE_TTL_SECS", "two minutes", || {
        let mut config = A11yLensConfig::parse(toml).expect("should parse");
        config.apply_env_overrides();
        config.store.ttl_secs
    });
    assert_eq!(result, 120);
}

#[test]
#[serial_test::serial]
fn env_override_csv_for_vec_fields() {
    let result = with_env("A11YLENS_CODE_EXTENSIONS", "html,vue", || {
        let mut config = A11yLensConfig::parse("").expect("should parse");
        config.apply_env_overrides();
        config.code.extensions
    });
    assert_eq!(result, vec!["html", "vue"]);
}

#[test]
#[serial_test::serial]
fn env_override_bool_field() {
    let result = with_env("A11YLENS_CONTEXT_AODA_CONTEXT", "false", || {
        let mut config = A11yLensConfig::parse("").expect("should parse");
        config.apply_env_overrides();
        config.context.aoda_context
    });
    assert!(!result);
}

#[tokio::test]
#[serial_test::serial]
async fn load_applies_env_then_validates() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("a11ylens.toml");
    std::fs::write(&path, "[store]\nttl_secs = 100\n").expect("write config");

    let original = std::env::var("A11YLENS_STORE_TTL_SECS").ok();
    // SAFETY: #[serial]로 직렬화됨
    unsafe { std::env::set_var("A11YLENS_STORE_TTL_SECS", "0") };
    let result = A11yLensConfig::load(&path).await;
    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("A11YLENS_STORE_TTL_SECS", val),
            None => std::env::remove_var("A11YLENS_STORE_TTL_SECS"),
        }
    }

    let err = result.expect_err("ttl 0 from env should fail validation");
    assert!(matches!(
        err,
        A11yError::Config(ConfigError::InvalidValue { .. })
    ));
}

// =============================================================================
// 에러 테스트
// =============================================================================

#[test]
fn empty_string_parses_with_defaults() {
    let config = A11yLensConfig::parse("").expect("empty should parse");
    config.validate().expect("defaults should validate");
}

#[test]
fn comments_only_parses_with_defaults() {
    let config = A11yLensConfig::parse("# nothing here\n# at all\n").expect("should parse");
    assert_eq!(config.store.ttl_secs, 3600);
}

#[test]
fn malformed_toml_returns_parse_error() {
    let err = A11yLensConfig::parse("[invalid toml").unwrap_err();
    assert!(matches!(
        err,
        A11yError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[test]
fn wrong_type_for_numeric_field() {
    let toml = r#"
[store]
ttl_secs = "one hour"
"#;
    assert!(matches!(
        A11yLensConfig::parse(toml).unwrap_err(),
        A11yError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[tokio::test]
async fn from_file_nonexistent_returns_file_not_found() {
    let result = A11yLensConfig::from_file("/tmp/a11ylens_test_nonexistent_12345.toml").await;
    assert!(matches!(
        result.unwrap_err(),
        A11yError::Config(ConfigError::FileNotFound { .. })
    ));
}

#[tokio::test]
async fn load_example_config_from_disk() {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let example_path = format!("{}/../../a11ylens.toml.example", manifest_dir);
    let config = A11yLensConfig::from_file(&example_path)
        .await
        .expect("example should load");
    config.validate().expect("loaded example should validate");
}
