use chrono::NaiveDate;
use thiserror::Error;

/// Failures surfaced to the caller. Per-record data-quality problems never
/// show up here; they are absorbed by the loader or the aggregators.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("required column '{0}' is missing from the input header")]
    MissingColumn(String),
    #[error("line {line}: column '{column}' holds an unparseable timestamp '{value}'")]
    MalformedTimestamp {
        line: u64,
        column: &'static str,
        value: String,
    },
    #[error("line {line}: order_purchase_timestamp is empty")]
    MissingPurchaseTimestamp { line: u64 },
    #[error(
        "activity inputs differ in length: {orders} order ids, {customers} customer ids, {reviews} review ids"
    )]
    LengthMismatch {
        orders: usize,
        customers: usize,
        reviews: usize,
    },
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("no data loaded")]
    NoData,
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
