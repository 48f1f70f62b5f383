//! 단계별 DOM 캡처 저장

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::BrowserRunnerError;

/// 캡처 참조 경로 접두사
const CAPTURE_PREFIX: &str = "/captures";

/// 단계 DOM을 `{dir}/{job_id}/step_{n}_{name}.html`로 저장합니다.
#[derive(Debug, Clone)]
pub struct CaptureWriter {
    dir: PathBuf,
}

impl CaptureWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 캡처를 저장하고 `/captures/{job_id}/{file}` 참조를 반환합니다.
    ///
    /// `step`은 1부터 시작하는 단계 번호입니다.
    pub async fn write(
        &self,
        job_id: &str,
        step: usize,
        name: &str,
        body: &str,
    ) -> Result<String, BrowserRunnerError> {
        let job_dir = sanitize(job_id);
        let file_name = capture_file_name(step, name);
        let dir = self.dir.join(&job_dir);
        let path = dir.join(&file_name);

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| BrowserRunnerError::Capture {
                path: dir.display().to_string(),
                source,
            })?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|source| BrowserRunnerError::Capture {
                path: path.display().to_string(),
                source,
            })?;

        debug!(path = %path.display(), bytes = body.len(), "step capture written");
        Ok(format!("{CAPTURE_PREFIX}/{job_dir}/{file_name}"))
    }
}

/// `step_{n}_{name}.html`
pub fn capture_file_name(step: usize, name: &str) -> String {
    format!("step_{step}_{}.html", sanitize(name))
}

/// 단어 문자(영숫자, `_`)가 아닌 문자를 `_`로 바꿉니다.
fn sanitize(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
