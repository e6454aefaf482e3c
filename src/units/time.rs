//! Calendar points and inclusive date ranges

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A calendar day on which an entry is effective
pub type TimePoint = NaiveDate;

/// Today's date in UTC
pub fn today() -> TimePoint {
    Utc::now().date_naive()
}

/// An interval of days, inclusive at both ends
///
/// A missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: Option<TimePoint>,
    end: Option<TimePoint>,
}

impl DateRange {
    /// Range from `start` to `end`, both included
    pub fn new(start: TimePoint, end: TimePoint) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Every day up to and including `end`
    pub fn up_to(end: TimePoint) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    /// Every day from `start` onwards
    pub fn starting_on(start: TimePoint) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// First day of the range, if bounded
    pub fn start(&self) -> Option<TimePoint> {
        self.start
    }

    /// Last day of the range, if bounded
    pub fn end(&self) -> Option<TimePoint> {
        self.end
    }

    /// Whether `point` lies within the range
    pub fn includes(&self, point: TimePoint) -> bool {
        self.start.is_none_or(|start| point >= start) && self.end.is_none_or(|end| point <= end)
    }

    /// Whether no day can satisfy the range
    pub fn is_empty(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if start > end)
    }
}
