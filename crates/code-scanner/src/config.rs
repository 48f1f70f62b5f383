//! 코드 스캐너 설정
//!
//! [`CodeScannerConfig`]는 core의 [`CodeConfig`](a11ylens_core::config::CodeConfig)에서
//! 생성되며 확장자 목록을 정규화합니다 (앞의 `.` 제거, 소문자).

use serde::{Deserialize, Serialize};

use a11ylens_core::config::CodeConfig;

use crate::error::CodeScannerError;

/// 설정 상한값 상수
const MAX_FILE_SIZE: usize = 64 * 1024 * 1024; // 64 MB
const MAX_FILES_LIMIT: usize = 1_000_000;

/// 코드 스캐너 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeScannerConfig {
    /// 검사할 파일 확장자 (소문자, `.` 없음)
    pub extensions: Vec<String>,
    /// 건너뛸 디렉토리 이름
    pub skip_dirs: Vec<String>,
    /// 파일 최대 크기 (바이트)
    pub max_file_size: usize,
    /// 최대 검사 파일 수
    pub max_files: usize,
}

impl Default for CodeScannerConfig {
    fn default() -> Self {
        Self::from_core(&CodeConfig::default())
    }
}

impl CodeScannerConfig {
    /// core의 `CodeConfig`에서 스캐너 설정을 생성합니다.
    pub fn from_core(core: &CodeConfig) -> Self {
        Self {
            extensions: core
                .extensions
                .iter()
                .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
            skip_dirs: core.skip_dirs.clone(),
            max_file_size: core.max_file_size,
            max_files: core.max_files,
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), CodeScannerError> {
        if self.extensions.is_empty() {
            return Err(CodeScannerError::Config {
                field: "extensions".to_owned(),
                reason: "at least one extension required".to_owned(),
            });
        }

        if self.max_file_size == 0 || self.max_file_size > MAX_FILE_SIZE {
            return Err(CodeScannerError::Config {
                field: "max_file_size".to_owned(),
                reason: format!("must be 1-{MAX_FILE_SIZE}"),
            });
        }

        if self.max_files == 0 || self.max_files > MAX_FILES_LIMIT {
            return Err(CodeScannerError::Config {
                field: "max_files".to_owned(),
                reason: format!("must be 1-{MAX_FILES_LIMIT}"),
            });
        }

        Ok(())
    }

    /// 확장자가 검사 대상인지 확인합니다.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        let ext = ext.to_ascii_lowercase();
        self.extensions.iter().any(|known| *known == ext)
    }

    /// 디렉토리 이름이 건너뛸 대상인지 확인합니다.
    pub fn skips_dir(&self, name: &str) -> bool {
        self.skip_dirs.iter().any(|skip| skip == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CodeScannerConfig::default();
        config.validate().unwrap();
        assert!(config.accepts_extension("tsx"));
        assert!(config.accepts_extension("HTML"));
        assert!(!config.accepts_extension("rs"));
        assert!(config.skips_dir("node_modules"));
    }

    #[test]
    fn from_core_normalizes_extensions() {
        let core = CodeConfig {
            extensions: vec![".JSX".to_owned(), " vue ".to_owned(), "".to_owned()],
            ..CodeConfig::default()
        };
        let config = CodeScannerConfig::from_core(&core);
        assert_eq!(config.extensions, vec!["jsx", "vue"]);
    }

    #[test]
    fn validate_rejects_zero_max_files() {
        let config = CodeScannerConfig {
            max_files: 0,
            ..CodeScannerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_files"));
    }

    #[test]
    fn validate_rejects_oversized_file_limit() {
        let config = CodeScannerConfig {
            max_file_size: MAX_FILE_SIZE + 1,
            ..CodeScannerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_extensions() {
        let config = CodeScannerConfig {
            extensions: Vec::new(),
            ..CodeScannerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("extensions"));
    }
}
