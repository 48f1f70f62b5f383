//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//! 레코더가 설치되지 않았으면 모든 호출은 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `a11ylens_`
//! - 구성 요소: `scan_`, `detector_`, `store_`
//! - 접미어: `_total` (counter), `_seconds` (histogram), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(a11ylens_core::metrics::SCANS_STARTED_TOTAL, "mode" => "full").increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 스캔 모드 레이블 키 (code, browser, full)
pub const LABEL_MODE: &str = "mode";

/// 탐지기 레이블 키 (code, browser)
pub const LABEL_DETECTOR: &str = "detector";

/// 심각도 레이블 키 (critical, serious, moderate, minor)
pub const LABEL_IMPACT: &str = "impact";

/// 결과 종류 레이블 키 (invalid_request, detector_failure)
pub const LABEL_OUTCOME: &str = "outcome";

// ─── 스캔 오케스트레이션 메트릭 ──────────────────────────────────────

/// 시작된 스캔 수 (counter, label: mode)
pub const SCANS_STARTED_TOTAL: &str = "a11ylens_scans_started_total";

/// 완료되어 저장된 스캔 수 (counter, label: mode)
pub const SCANS_COMPLETED_TOTAL: &str = "a11ylens_scans_completed_total";

/// 실패한 스캔 수 (counter, labels: mode, outcome)
pub const SCANS_FAILED_TOTAL: &str = "a11ylens_scans_failed_total";

/// 탐지기 저하 수 — 빈 결과로 대체되거나 생략된 탐지기 (counter, label: detector)
pub const DETECTOR_DEGRADATIONS_TOTAL: &str = "a11ylens_detector_degradations_total";

/// 발견된 이슈 수 (counter, label: impact)
pub const ISSUES_FOUND_TOTAL: &str = "a11ylens_issues_found_total";

/// 오케스트레이션 소요 시간 (histogram, 초)
pub const SCAN_DURATION_SECONDS: &str = "a11ylens_scan_duration_seconds";

// ─── 작업 저장소 메트릭 ─────────────────────────────────────────────

/// 저장 횟수 (counter)
pub const STORE_PUTS_TOTAL: &str = "a11ylens_store_puts_total";

/// 조회 성공 수 (counter)
pub const STORE_HITS_TOTAL: &str = "a11ylens_store_hits_total";

/// 조회 실패 수 — 미존재 또는 만료 (counter)
pub const STORE_MISSES_TOTAL: &str = "a11ylens_store_misses_total";

/// 만료로 삭제된 기록 수 (counter)
pub const STORE_EVICTIONS_TOTAL: &str = "a11ylens_store_evictions_total";

/// 현재 저장된 작업 수 (gauge)
pub const STORE_JOBS: &str = "a11ylens_store_jobs";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 스캔 소요 시간 히스토그램 버킷 (초)
///
/// 브라우저 흐름은 단계마다 네트워크 대기를 포함하므로 최대 300초까지
pub const SCAN_DURATION_BUCKETS: [f64; 10] =
    [0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 레코더를 설치한 직후 한 번 호출합니다. 레코더가 없어도 안전합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    // Scan
    describe_counter!(
        SCANS_STARTED_TOTAL,
        "Total number of scan orchestrations started"
    );
    describe_counter!(
        SCANS_COMPLETED_TOTAL,
        "Total number of scans completed and stored"
    );
    describe_counter!(
        SCANS_FAILED_TOTAL,
        "Total number of scans that failed without storing a result"
    );
    describe_counter!(
        DETECTOR_DEGRADATIONS_TOTAL,
        "Detector legs replaced by an empty result or skipped"
    );
    describe_counter!(
        ISSUES_FOUND_TOTAL,
        "Accessibility issues found per impact tier"
    );
    describe_histogram!(
        SCAN_DURATION_SECONDS,
        "Time to complete a single scan orchestration in seconds"
    );

    // Store
    describe_counter!(STORE_PUTS_TOTAL, "Total number of job results stored");
    describe_counter!(STORE_HITS_TOTAL, "Job result lookups that found a live record");
    describe_counter!(
        STORE_MISSES_TOTAL,
        "Job result lookups for unknown or expired jobs"
    );
    describe_counter!(
        STORE_EVICTIONS_TOTAL,
        "Job records purged after their time-to-live elapsed"
    );
    describe_gauge!(STORE_JOBS, "Number of job records currently held");
}
