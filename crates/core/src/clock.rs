//! 시계 추상화 — 작업 저장소의 만료 판단에 주입
//!
//! [`SystemClock`]은 `tokio::time::Instant`를 사용하므로 `tokio::time::pause()` 환경에서도
//! 동작합니다. [`ManualClock`]은 테스트에서 실제 대기 없이 시간을 진행시킵니다.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

/// 단조 시계
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// 실제 단조 시계
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// 수동으로 진행시키는 시계
///
/// 복제본은 같은 시각을 공유합니다.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// 시계를 `by`만큼 진행시킵니다.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
