//! 작업 저장소 -- TTL 기반 결과 보관
//!
//! [`JobStore`]는 작업 ID를 키로 [`FullScanResult`]를 보관합니다.
//! 기록의 생성 시각은 `put` 시점에 주입된 [`Clock`]으로 찍히며 결과 값에서 읽지 않습니다.
//!
//! # 만료
//!
//! 기록의 나이가 TTL을 넘으면 존재하지 않는 것처럼 취급됩니다.
//! `get`은 잠금 하나 안에서 만료 확인과 제거를 함께 수행하므로,
//! 만료된 기록을 제거하는 동안 다른 작업이 같은 키에 쓴 새 기록을 지우지 않습니다.
//! [`JobStore::spawn_sweeper`]로 백그라운드 정리를 추가할 수 있지만
//! 관찰 가능한 `get` 동작은 달라지지 않습니다.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use metrics::{counter, gauge};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use a11ylens_core::clock::{Clock, SystemClock};
use a11ylens_core::metrics as m;
use a11ylens_core::scan::FullScanResult;

/// 결과 소비자(보고서, 수정 제안, PR 생성)에게 넘기는 읽기 전용 조회 인터페이스
///
/// 미존재 또는 만료된 작업은 에러가 아니라 `None`입니다.
pub trait JobResults: Send + Sync {
    fn get_job_result(
        &self,
        job_id: &str,
    ) -> impl Future<Output = Option<Arc<FullScanResult>>> + Send;
}

struct JobRecord {
    result: Arc<FullScanResult>,
    created_at: Instant,
}

/// TTL 작업 저장소
pub struct JobStore<K: Clock = SystemClock> {
    records: Mutex<HashMap<String, JobRecord>>,
    ttl: Duration,
    clock: K,
}

impl JobStore<SystemClock> {
    /// 시스템 시계를 사용하는 저장소를 생성합니다.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<K: Clock> JobStore<K> {
    pub fn with_clock(ttl: Duration, clock: K) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_expired(&self, record: &JobRecord, now: Instant) -> bool {
        now.saturating_duration_since(record.created_at) > self.ttl
    }

    /// 결과를 저장합니다. 같은 ID가 있으면 덮어쓰고 나이를 0으로 되돌립니다.
    pub async fn put(&self, result: impl Into<Arc<FullScanResult>>) -> Arc<FullScanResult> {
        let result = result.into();
        let job_id = result.job_id().to_owned();

        let mut records = self.records.lock().await;
        // 잠금 순서와 기록 시각이 일치해야 마지막 쓰기가 가장 늦은 시각을 가집니다.
        let record = JobRecord {
            result: Arc::clone(&result),
            created_at: self.clock.now(),
        };
        let replaced = records.insert(job_id.clone(), record).is_some();
        let len = records.len();
        drop(records);

        counter!(m::STORE_PUTS_TOTAL).increment(1);
        gauge!(m::STORE_JOBS).set(len as f64);
        debug!(job_id, replaced, "job result stored");
        result
    }

    /// 결과를 조회합니다. 만료된 기록은 제거하고 `None`을 반환합니다.
    pub async fn get(&self, job_id: &str) -> Option<Arc<FullScanResult>> {
        let mut records = self.records.lock().await;
        let now = self.clock.now();

        let Some(record) = records.get(job_id) else {
            drop(records);
            counter!(m::STORE_MISSES_TOTAL).increment(1);
            return None;
        };

        if self.is_expired(record, now) {
            records.remove(job_id);
            let len = records.len();
            drop(records);

            counter!(m::STORE_EVICTIONS_TOTAL).increment(1);
            counter!(m::STORE_MISSES_TOTAL).increment(1);
            gauge!(m::STORE_JOBS).set(len as f64);
            info!(job_id, "expired job evicted");
            return None;
        }

        let result = Arc::clone(&record.result);
        drop(records);
        counter!(m::STORE_HITS_TOTAL).increment(1);
        Some(result)
    }

    /// 만료되지 않은 기록이 있는지 확인합니다. 만료된 기록은 제거됩니다.
    pub async fn contains(&self, job_id: &str) -> bool {
        let mut records = self.records.lock().await;
        let now = self.clock.now();
        match records.get(job_id) {
            Some(record) if self.is_expired(record, now) => {
                records.remove(job_id);
                counter!(m::STORE_EVICTIONS_TOTAL).increment(1);
                gauge!(m::STORE_JOBS).set(records.len() as f64);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// 기록을 명시적으로 삭제합니다. 삭제된 기록이 있었으면 `true`.
    pub async fn remove(&self, job_id: &str) -> bool {
        let mut records = self.records.lock().await;
        let removed = records.remove(job_id).is_some();
        gauge!(m::STORE_JOBS).set(records.len() as f64);
        removed
    }

    /// 현재 보관 중인 기록 수 (아직 제거되지 않은 만료 기록 포함)
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// 만료된 기록을 모두 제거하고 제거한 수를 반환합니다.
    pub async fn purge_expired(&self) -> usize {
        let mut records = self.records.lock().await;
        let now = self.clock.now();
        let before = records.len();
        records.retain(|_, record| !self.is_expired(record, now));
        let purged = before - records.len();
        let len = records.len();
        drop(records);

        if purged > 0 {
            counter!(m::STORE_EVICTIONS_TOTAL).increment(purged as u64);
            gauge!(m::STORE_JOBS).set(len as f64);
            info!(purged, remaining = len, "expired jobs purged");
        }
        purged
    }

    /// `interval`마다 [`purge_expired`](Self::purge_expired)를 실행하는 백그라운드 작업을 시작합니다.
    ///
    /// 저장소가 해제되면 작업도 끝납니다. 반환된 핸들을 drop하면 작업이 중단됩니다.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> SweeperHandle {
        let store: Weak<Self> = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    debug!("job store dropped, sweeper exiting");
                    break;
                };
                store.purge_expired().await;
            }
        });
        info!(interval_secs = interval.as_secs_f64(), "job store sweeper started");
        SweeperHandle { handle }
    }
}

impl<K: Clock> JobResults for JobStore<K> {
    async fn get_job_result(&self, job_id: &str) -> Option<Arc<FullScanResult>> {
        self.get(job_id).await
    }
}

impl<T: JobResults> JobResults for Arc<T> {
    async fn get_job_result(&self, job_id: &str) -> Option<Arc<FullScanResult>> {
        self.as_ref().get_job_result(job_id).await
    }
}

/// 백그라운드 정리 작업 핸들
///
/// drop 시 작업을 중단합니다.
#[derive(Debug)]
pub struct SweeperHandle {
    handle: JoinHandle<()>,
}

impl SweeperHandle {
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
