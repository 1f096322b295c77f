use crate::error::{ReportError, Result};
use crate::types::OrderRecord;
use chrono::NaiveDate;
use tracing::debug;

/// Inclusive calendar-date window over purchase timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ReportError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The min/max purchase dates of `records`, or `None` when empty.
    pub fn covering(records: &[OrderRecord]) -> Option<Self> {
        let mut dates = records.iter().map(|r| r.purchase_timestamp.date());
        let first = dates.next()?;
        let (start, end) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(Self { start, end })
    }

    /// Replace either bound, keeping the other. Used when only `--start` or
    /// `--end` is supplied.
    pub fn with_bounds(self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        Self::new(start.unwrap_or(self.start), end.unwrap_or(self.end))
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, record: &OrderRecord) -> bool {
        let day = record.purchase_timestamp.date();
        self.start <= day && day <= self.end
    }
}

/// Select the records whose purchase date lies in `range`. The returned
/// vector is the snapshot every aggregation of one window reads from.
pub fn filter_window(records: &[OrderRecord], range: &DateRange) -> Vec<OrderRecord> {
    let window: Vec<OrderRecord> = records.iter().filter(|r| range.contains(r)).cloned().collect();
    debug!(
        start = %range.start,
        end = %range.end,
        selected = window.len(),
        total = records.len(),
        "date window applied"
    );
    window
}
