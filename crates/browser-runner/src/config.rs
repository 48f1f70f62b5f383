//! 흐름 실행기 설정
//!
//! [`BrowserRunnerConfig`]는 core의 [`BrowserConfig`]에서 생성됩니다.
//! 시간 값은 밀리초로 보관하고 [`Duration`] 접근자를 제공합니다.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use a11ylens_core::config::BrowserConfig;

use crate::error::BrowserRunnerError;

/// 설정 상한값 상수
const MAX_TIMEOUT_MS: u64 = 10 * 60 * 1000; // 10분
const MAX_PAGE_BYTES: usize = 64 * 1024 * 1024; // 64 MB

/// 흐름 실행기 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserRunnerConfig {
    pub navigation_timeout_ms: u64,
    pub interaction_timeout_ms: u64,
    pub settle_ms: u64,
    pub type_settle_ms: u64,
    pub wait_ms: u64,
    pub probe_timeout_ms: u64,
    /// DOM 캡처 디렉토리 (없으면 캡처 안 함)
    pub capture_dir: Option<PathBuf>,
    pub user_agent: String,
    pub max_page_bytes: usize,
}

impl Default for BrowserRunnerConfig {
    fn default() -> Self {
        Self::from_core(&BrowserConfig::default())
    }
}

impl BrowserRunnerConfig {
    /// core의 `BrowserConfig`에서 실행기 설정을 생성합니다.
    pub fn from_core(core: &BrowserConfig) -> Self {
        let capture_dir = core.capture_dir.trim();
        Self {
            navigation_timeout_ms: core.navigation_timeout_ms,
            interaction_timeout_ms: core.interaction_timeout_ms,
            settle_ms: core.settle_ms,
            type_settle_ms: core.type_settle_ms,
            wait_ms: core.wait_ms,
            probe_timeout_ms: core.probe_timeout_ms,
            capture_dir: (!capture_dir.is_empty()).then(|| PathBuf::from(capture_dir)),
            user_agent: core.user_agent.clone(),
            max_page_bytes: core.max_page_bytes,
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), BrowserRunnerError> {
        for (field, value) in [
            ("navigation_timeout_ms", self.navigation_timeout_ms),
            ("interaction_timeout_ms", self.interaction_timeout_ms),
            ("probe_timeout_ms", self.probe_timeout_ms),
        ] {
            if value == 0 || value > MAX_TIMEOUT_MS {
                return Err(BrowserRunnerError::Config {
                    field: field.to_owned(),
                    reason: format!("must be 1-{MAX_TIMEOUT_MS}"),
                });
            }
        }

        for (field, value) in [
            ("settle_ms", self.settle_ms),
            ("type_settle_ms", self.type_settle_ms),
            ("wait_ms", self.wait_ms),
        ] {
            if value > MAX_TIMEOUT_MS {
                return Err(BrowserRunnerError::Config {
                    field: field.to_owned(),
                    reason: format!("must be at most {MAX_TIMEOUT_MS}"),
                });
            }
        }

        if self.max_page_bytes == 0 || self.max_page_bytes > MAX_PAGE_BYTES {
            return Err(BrowserRunnerError::Config {
                field: "max_page_bytes".to_owned(),
                reason: format!("must be 1-{MAX_PAGE_BYTES}"),
            });
        }

        if self.user_agent.trim().is_empty() {
            return Err(BrowserRunnerError::Config {
                field: "user_agent".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        Ok(())
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn interaction_timeout(&self) -> Duration {
        Duration::from_millis(self.interaction_timeout_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn type_settle(&self) -> Duration {
        Duration::from_millis(self.type_settle_ms)
    }

    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}
