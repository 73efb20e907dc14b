use super::component::{Component, ComponentScore};
use crate::SalaryRange;

/// Closed interval on the salary axis; `high` may be infinite for open-ended offers.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Interval {
    low: f64,
    high: f64,
}

impl Interval {
    fn length(&self) -> f64 {
        self.high - self.low
    }

    fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    fn overlap_length(&self, other: &Interval) -> f64 {
        (self.high.min(other.high) - self.low.max(other.low)).max(0.0)
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

/// The candidate's target. One bound alone is a single target number.
fn query_interval(range: &SalaryRange) -> Option<Interval> {
    let (low, high) = match (finite(range.min), finite(range.max)) {
        (Some(min), Some(max)) => ordered(min, max),
        (Some(only), None) | (None, Some(only)) => (only, only),
        (None, None) => return None,
    };
    Some(Interval { low, high })
}

/// The job's offer. A missing upper bound is open above, a missing lower bound starts at 0.
fn job_interval(range: &SalaryRange) -> Option<Interval> {
    let (low, high) = match (finite(range.min), finite(range.max)) {
        (Some(min), Some(max)) => ordered(min, max),
        (Some(min), None) => (min, f64::INFINITY),
        (None, Some(max)) => ordered(0.0, max),
        (None, None) => return None,
    };
    Some(Interval { low, high })
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn describe(interval: &Interval) -> String {
    if interval.high.is_infinite() {
        format!("{:.0}+", interval.low)
    } else {
        format!("{:.0}-{:.0}", interval.low, interval.high)
    }
}

/// Salary component: share of the candidate's desired range covered by the job's range.
///
/// Applicable only when both sides carry a range. A zero-length desired range scores 1
/// if the job range contains it, else 0.
pub fn score_salary(desired: Option<&SalaryRange>, offered: Option<&SalaryRange>) -> ComponentScore {
    let Some(query) = desired.and_then(query_interval) else {
        return ComponentScore::not_applicable(Component::Salary, "no desired salary");
    };
    let Some(job) = offered.and_then(job_interval) else {
        return ComponentScore::not_applicable(Component::Salary, "job has no salary range");
    };

    let details = format!("desired {} vs offered {}", describe(&query), describe(&job));

    if query.length() == 0.0 {
        let score = if job.contains(query.low) { 1.0 } else { 0.0 };
        return ComponentScore::scored(Component::Salary, score, details);
    }

    let overlap = query.overlap_length(&job);
    ComponentScore::scored(
        Component::Salary,
        overlap / query.length(),
        format!("{details}, overlap {:.0}", overlap),
    )
}
