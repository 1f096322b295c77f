use crate::error::{ReportError, Result};
use crate::filter::DateRange;
use crate::types::{
    CategoryAverage, CustomerActivity, DashboardSummary, OrderRecord, RfmRow, RfmSummary,
};
use crate::util::{floor_days, mean};
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// Delivery durations outside `0..=MAX_DELIVERY_DAYS` are treated as data
/// errors or outliers and left out of the average.
pub const MAX_DELIVERY_DAYS: i64 = 90;

/// Descending on `Some`, with undefined values last.
fn cmp_desc_defined(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Average review score per product category, best first.
///
/// A missing category is a group of its own. Missing scores are left out of
/// their group's mean but still count toward `records`. Ties keep category
/// order, with the missing group first.
pub fn average_review_per_category(data: &[OrderRecord]) -> Vec<CategoryAverage> {
    #[derive(Default)]
    struct Acc {
        scores: Vec<f64>,
        records: usize,
    }
    let mut map: BTreeMap<Option<&str>, Acc> = BTreeMap::new();
    for r in data {
        let e = map.entry(r.product_category.as_deref()).or_default();
        e.records += 1;
        if let Some(score) = r.review_score {
            e.scores.push(score);
        }
    }
    let mut rows: Vec<CategoryAverage> = map
        .into_iter()
        .map(|(category, acc)| CategoryAverage {
            category: category.map(str::to_string),
            average_review_score: mean(&acc.scores),
            records: acc.records,
        })
        .collect();
    rows.sort_by(|a, b| cmp_desc_defined(a.average_review_score, b.average_review_score));
    rows
}

/// Delivery duration in whole days, floored. `None` when undelivered.
pub fn delivery_days(r: &OrderRecord) -> Option<i64> {
    r.delivered_timestamp
        .map(|delivered| floor_days(r.purchase_timestamp, delivered))
}

/// Mean delivery duration over records whose duration lies in
/// `0..=MAX_DELIVERY_DAYS`. `None` when no record qualifies.
pub fn average_delivery_days(data: &[OrderRecord]) -> Option<f64> {
    let durations: Vec<f64> = data
        .iter()
        .filter_map(delivery_days)
        .filter(|d| (0..=MAX_DELIVERY_DAYS).contains(d))
        .map(|d| d as f64)
        .collect();
    mean(&durations)
}

fn count_by_customer<'a, I>(customers: I) -> Vec<CustomerActivity>
where
    I: Iterator<Item = &'a str>,
{
    let mut map: BTreeMap<&str, usize> = BTreeMap::new();
    for c in customers {
        *map.entry(c).or_insert(0) += 1;
    }
    let mut rows: Vec<CustomerActivity> = map
        .into_iter()
        .map(|(customer_id, review_count)| CustomerActivity {
            customer_id: customer_id.to_string(),
            review_count,
        })
        .collect();
    rows.sort_by(|a, b| b.review_count.cmp(&a.review_count));
    rows
}

/// Rank customers by review activity from three parallel columns.
///
/// The columns are joined by position, so they must be the same length;
/// anything else is rejected before counting. Every row counts, duplicate
/// review ids included.
pub fn rank_customer_activity<O, C, R>(
    order_ids: &[O],
    customer_ids: &[C],
    review_ids: &[R],
) -> Result<Vec<CustomerActivity>>
where
    C: AsRef<str>,
{
    if order_ids.len() != customer_ids.len() || customer_ids.len() != review_ids.len() {
        return Err(ReportError::LengthMismatch {
            orders: order_ids.len(),
            customers: customer_ids.len(),
            reviews: review_ids.len(),
        });
    }
    Ok(count_by_customer(customer_ids.iter().map(|c| c.as_ref())))
}

/// Review activity keyed directly on each record's `customer_id`.
pub fn customer_activity(data: &[OrderRecord]) -> Vec<CustomerActivity> {
    count_by_customer(data.iter().map(|r| r.customer_id.as_str()))
}

/// Recency, frequency and monetary value per customer.
///
/// Recency is measured against the latest purchase in the whole window, so
/// every customer shares one reference point. Rows come out in customer-id
/// order.
pub fn rfm_segments(data: &[OrderRecord]) -> Vec<RfmRow> {
    struct Acc<'a> {
        last_purchase: NaiveDateTime,
        orders: HashSet<&'a str>,
        monetary: f64,
    }
    let Some(recent) = data.iter().map(|r| r.purchase_timestamp).max() else {
        return Vec::new();
    };

    let mut map: BTreeMap<&str, Acc> = BTreeMap::new();
    for r in data {
        let e = map.entry(r.customer_id.as_str()).or_insert_with(|| Acc {
            last_purchase: r.purchase_timestamp,
            orders: HashSet::new(),
            monetary: 0.0,
        });
        e.last_purchase = e.last_purchase.max(r.purchase_timestamp);
        e.orders.insert(r.order_id.as_str());
        e.monetary += r.payment_value.unwrap_or(0.0);
    }

    map.into_iter()
        .map(|(customer_id, acc)| RfmRow {
            customer_id: customer_id.to_string(),
            recency: floor_days(acc.last_purchase, recent),
            frequency: acc.orders.len(),
            monetary: acc.monetary,
        })
        .collect()
}

pub fn rfm_summary(rows: &[RfmRow]) -> RfmSummary {
    let recency: Vec<f64> = rows.iter().map(|r| r.recency as f64).collect();
    let frequency: Vec<f64> = rows.iter().map(|r| r.frequency as f64).collect();
    let monetary: Vec<f64> = rows.iter().map(|r| r.monetary).collect();
    RfmSummary {
        mean_recency: mean(&recency),
        mean_frequency: mean(&frequency),
        mean_monetary: mean(&monetary),
    }
}

/// Most recent customers first.
pub fn top_by_recency(rows: &[RfmRow], n: usize) -> Vec<RfmRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by_key(|r| r.recency);
    sorted.truncate(n);
    sorted
}

pub fn top_by_frequency(rows: &[RfmRow], n: usize) -> Vec<RfmRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    sorted.truncate(n);
    sorted
}

pub fn top_by_monetary(rows: &[RfmRow], n: usize) -> Vec<RfmRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| b.monetary.partial_cmp(&a.monetary).unwrap_or(Ordering::Equal));
    sorted.truncate(n);
    sorted
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    pub top_customers: usize,
    pub top_rfm: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            top_customers: 10,
            top_rfm: 5,
        }
    }
}

/// Everything derived from one filtered window.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub range: Option<DateRange>,
    pub options: DashboardOptions,
    pub total_records: usize,
    pub avg_delivery_days: Option<f64>,
    pub categories: Vec<CategoryAverage>,
    pub customers: Vec<CustomerActivity>,
    pub rfm: Vec<RfmRow>,
    pub rfm_summary: RfmSummary,
}

impl Dashboard {
    pub fn top_customers(&self) -> &[CustomerActivity] {
        let n = self.options.top_customers.min(self.customers.len());
        &self.customers[..n]
    }

    pub fn top_by_recency(&self) -> Vec<RfmRow> {
        top_by_recency(&self.rfm, self.options.top_rfm)
    }

    pub fn top_by_frequency(&self) -> Vec<RfmRow> {
        top_by_frequency(&self.rfm, self.options.top_rfm)
    }

    pub fn top_by_monetary(&self) -> Vec<RfmRow> {
        top_by_monetary(&self.rfm, self.options.top_rfm)
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary {
            window_start: self.range.map(|r| r.start()),
            window_end: self.range.map(|r| r.end()),
            total_records: self.total_records,
            total_customers: self.rfm.len(),
            avg_delivery_days: self.avg_delivery_days,
            rfm: self.rfm_summary,
            top_by_recency: self.top_by_recency(),
            top_by_frequency: self.top_by_frequency(),
            top_by_monetary: self.top_by_monetary(),
        }
    }
}

/// Run every aggregation over one window. An empty window produces empty
/// tables and `None` scalars.
pub fn build_dashboard(
    window: &[OrderRecord],
    range: Option<DateRange>,
    options: DashboardOptions,
) -> Dashboard {
    if window.is_empty() {
        warn!("date window selected no records");
    }
    let rfm = rfm_segments(window);
    let rfm_summary = rfm_summary(&rfm);
    Dashboard {
        range,
        options,
        total_records: window.len(),
        avg_delivery_days: average_delivery_days(window),
        categories: average_review_per_category(window),
        customers: customer_activity(window),
        rfm,
        rfm_summary,
    }
}
