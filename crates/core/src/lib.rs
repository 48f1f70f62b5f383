#![doc = include_str!("../README.md")]

pub mod clock;
pub mod config;
pub mod detector;
pub mod error;
pub mod metrics;
pub mod scan;
pub mod summary;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{A11yError, ConfigError, DetectorError, OutcomeKind, ScanError};

// 설정
pub use config::A11yLensConfig;

// 시계
pub use clock::{Clock, ManualClock, SystemClock};

// 탐지기 trait
pub use detector::{
    BrowserDetector, BrowserFlowConfig, CodeDetector, CodeScanRequest, FlowAction, FlowStepConfig,
};

// 스캔 결과
pub use scan::{
    BrowserFlowStep, BrowserScanResult, CodeScanResult, FullScanResult, ScanComposition, ScanMode,
};

// 도메인 타입
pub use summary::{SeveritySummary, summarize};
pub use types::{
    ConformanceLevel, Impact, Issue, IssueEvidence, Locator, Principle, ScanContext,
};
