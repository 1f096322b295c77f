use crate::error::{ReportError, Result};
use crate::types::{OrderRecord, RawRow};
use crate::util::{non_empty, parse_f64_safe, parse_timestamp};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

const CATEGORY_COLUMN: &str = "product_category_name_english";
const CATEGORY_ALIAS: &str = "product_category";

const REQUIRED_COLUMNS: &[&str] = &[
    "order_id",
    "customer_id",
    CATEGORY_COLUMN,
    "review_score",
    "order_purchase_timestamp",
    "order_delivered_customer_date",
    "payment_value",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
    pub missing_category: usize,
    pub missing_review: usize,
    pub undelivered: usize,
    pub missing_payment: usize,
}

/// Trim header names and drop a leading byte-order mark. When the category
/// column only appears under its short alias, rename it; when both names are
/// present the full name wins and the alias column is ignored.
fn normalize_header(headers: &StringRecord) -> StringRecord {
    let mut names: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
            h.trim().to_string()
        })
        .collect();
    if !names.iter().any(|h| h.as_str() == CATEGORY_COLUMN) {
        if let Some(alias) = names.iter_mut().find(|h| h.as_str() == CATEGORY_ALIAS) {
            *alias = CATEGORY_COLUMN.to_string();
        }
    }
    StringRecord::from(names)
}

fn validate_header(headers: &StringRecord) -> Result<()> {
    for name in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == *name) {
            return Err(ReportError::MissingColumn(name.to_string()));
        }
    }
    Ok(())
}

fn parse_required_timestamp(raw: Option<&str>, line: u64) -> Result<chrono::NaiveDateTime> {
    let s = non_empty(raw).ok_or(ReportError::MissingPurchaseTimestamp { line })?;
    parse_timestamp(s).ok_or_else(|| ReportError::MalformedTimestamp {
        line,
        column: "order_purchase_timestamp",
        value: s.to_string(),
    })
}

fn parse_optional_timestamp(raw: Option<&str>, line: u64) -> Result<Option<chrono::NaiveDateTime>> {
    match non_empty(raw) {
        None => Ok(None),
        Some(s) => parse_timestamp(s)
            .map(Some)
            .ok_or_else(|| ReportError::MalformedTimestamp {
                line,
                column: "order_delivered_customer_date",
                value: s.to_string(),
            }),
    }
}

/// Load and normalize order records from any CSV reader.
///
/// The header is validated before any row is read, and an unparseable
/// timestamp aborts the whole load. Rows the CSV layer cannot decode at all
/// are skipped and counted. Missing optional cells become `None` and only
/// affect the aggregations that need them. The result is sorted by purchase
/// timestamp.
pub fn load_orders<R: Read>(reader: R) -> Result<(Vec<OrderRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers = normalize_header(rdr.headers()?);
    validate_header(&headers)?;

    let mut report = LoadReport::default();
    let mut records: Vec<OrderRecord> = Vec::new();

    for result in rdr.records() {
        report.total_rows += 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "skipping unreadable CSV row");
                report.skipped_rows += 1;
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: RawRow = match record.deserialize(Some(&headers)) {
            Ok(r) => r,
            Err(e) => {
                warn!(line, error = %e, "skipping undecodable CSV row");
                report.skipped_rows += 1;
                continue;
            }
        };

        let (Some(order_id), Some(customer_id)) = (
            non_empty(row.order_id.as_deref()).map(str::to_string),
            non_empty(row.customer_id.as_deref()).map(str::to_string),
        ) else {
            warn!(line, "skipping row without order_id or customer_id");
            report.skipped_rows += 1;
            continue;
        };

        let purchase_timestamp = parse_required_timestamp(row.purchase_timestamp.as_deref(), line)?;
        let delivered_timestamp = parse_optional_timestamp(row.delivered_timestamp.as_deref(), line)?;

        let product_category = non_empty(row.product_category.as_deref()).map(str::to_string);
        let review_score = parse_f64_safe(row.review_score.as_deref())
            .filter(|s| (1.0..=5.0).contains(s));
        let payment_value = parse_f64_safe(row.payment_value.as_deref()).filter(|v| *v >= 0.0);

        if product_category.is_none() {
            report.missing_category += 1;
        }
        if review_score.is_none() {
            report.missing_review += 1;
        }
        if delivered_timestamp.is_none() {
            report.undelivered += 1;
        }
        if payment_value.is_none() {
            report.missing_payment += 1;
        }

        records.push(OrderRecord {
            order_id,
            customer_id,
            product_category,
            review_score,
            purchase_timestamp,
            delivered_timestamp,
            payment_value,
        });
    }

    records.sort_by_key(|r| r.purchase_timestamp);
    report.loaded_rows = records.len();
    info!(
        total = report.total_rows,
        loaded = report.loaded_rows,
        skipped = report.skipped_rows,
        "order records loaded"
    );
    Ok((records, report))
}

pub fn load_orders_file<P: AsRef<Path>>(path: P) -> Result<(Vec<OrderRecord>, LoadReport)> {
    let file = File::open(path.as_ref())?;
    info!(path = %path.as_ref().display(), "loading order dataset");
    load_orders(file)
}
