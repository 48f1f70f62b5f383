//! 심각도 요약 — 이슈 시퀀스의 단계별 집계
//!
//! [`SeveritySummary`]는 이슈 목록에서 파생되는 값이며 직접 생성할 수 없습니다.
//! [`summarize`]로 계산하거나 두 요약을 `+`로 합산합니다.
//! 어떤 경우에도 `total == critical + serious + moderate + minor`가 유지됩니다.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::types::{Impact, Issue};

/// 심각도 단계별 이슈 수
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SummaryRepr")]
pub struct SeveritySummary {
    total: usize,
    critical: usize,
    serious: usize,
    moderate: usize,
    minor: usize,
}

/// 이슈 시퀀스를 요약합니다.
///
/// 빈 시퀀스를 포함한 모든 입력에 대해 실패하지 않습니다.
/// 각 이슈의 `impact`를 그대로 사용합니다.
pub fn summarize<'a, I>(issues: I) -> SeveritySummary
where
    I: IntoIterator<Item = &'a Issue>,
{
    let mut summary = SeveritySummary::default();
    for issue in issues {
        summary.record(issue.impact);
    }
    summary
}

impl SeveritySummary {
    fn record(&mut self, impact: Impact) {
        match impact {
            Impact::Critical => self.critical += 1,
            Impact::Serious => self.serious += 1,
            Impact::Moderate => self.moderate += 1,
            Impact::Minor => self.minor += 1,
        }
        self.total += 1;
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn critical(&self) -> usize {
        self.critical
    }

    pub fn serious(&self) -> usize {
        self.serious
    }

    pub fn moderate(&self) -> usize {
        self.moderate
    }

    pub fn minor(&self) -> usize {
        self.minor
    }

    /// 주어진 단계의 이슈 수를 반환합니다.
    pub fn count(&self, impact: Impact) -> usize {
        match impact {
            Impact::Critical => self.critical,
            Impact::Serious => self.serious,
            Impact::Moderate => self.moderate,
            Impact::Minor => self.minor,
        }
    }

    /// `threshold` 이상인 이슈 수를 반환합니다.
    pub fn at_or_above(&self, threshold: Impact) -> usize {
        Impact::ALL
            .iter()
            .filter(|impact| **impact >= threshold)
            .map(|impact| self.count(*impact))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// 가장 높은 심각도 (이슈가 없으면 `None`)
    pub fn highest(&self) -> Option<Impact> {
        Impact::ALL.into_iter().find(|impact| self.count(*impact) > 0)
    }
}

impl Add for SeveritySummary {
    type Output = SeveritySummary;

    fn add(self, rhs: Self) -> Self::Output {
        SeveritySummary {
            total: self.total + rhs.total,
            critical: self.critical + rhs.critical,
            serious: self.serious + rhs.serious,
            moderate: self.moderate + rhs.moderate,
            minor: self.minor + rhs.minor,
        }
    }
}

impl AddAssign for SeveritySummary {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for SeveritySummary {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(SeveritySummary::default(), Add::add)
    }
}

/// 역직렬화 전용 표현 — 합계 불변식을 검증한 뒤에만 요약으로 변환됩니다.
#[derive(Deserialize)]
struct SummaryRepr {
    total: usize,
    critical: usize,
    serious: usize,
    moderate: usize,
    minor: usize,
}

impl TryFrom<SummaryRepr> for SeveritySummary {
    type Error = String;

    fn try_from(repr: SummaryRepr) -> Result<Self, Self::Error> {
        let sum = repr.critical + repr.serious + repr.moderate + repr.minor;
        if sum != repr.total {
            return Err(format!(
                "summary total {} does not match tier sum {sum}",
                repr.total
            ));
        }
        Ok(SeveritySummary {
            total: repr.total,
            critical: repr.critical,
            serious: repr.serious,
            moderate: repr.moderate,
            minor: repr.minor,
        })
    }
}
