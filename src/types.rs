use crate::util::{display_category, display_money, display_score};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One CSV row as it comes off disk. Every cell is optional text; the loader
/// turns it into an `OrderRecord` after validating the header once.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    pub order_id: Option<String>,
    pub customer_id: Option<String>,
    #[serde(rename = "product_category_name_english")]
    pub product_category: Option<String>,
    pub review_score: Option<String>,
    #[serde(rename = "order_purchase_timestamp")]
    pub purchase_timestamp: Option<String>,
    #[serde(rename = "order_delivered_customer_date")]
    pub delivered_timestamp: Option<String>,
    pub payment_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub order_id: String,
    pub customer_id: String,
    pub product_category: Option<String>,
    pub review_score: Option<f64>,
    pub purchase_timestamp: NaiveDateTime,
    pub delivered_timestamp: Option<NaiveDateTime>,
    pub payment_value: Option<f64>,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct CategoryAverage {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category", display_with = "display_category")]
    pub category: Option<String>,
    #[serde(rename = "AverageReviewScore")]
    #[tabled(rename = "AverageReviewScore", display_with = "display_score")]
    pub average_review_score: Option<f64>,
    #[serde(rename = "Records")]
    #[tabled(rename = "Records")]
    pub records: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq, Eq)]
pub struct CustomerActivity {
    #[serde(rename = "CustomerId")]
    #[tabled(rename = "CustomerId")]
    pub customer_id: String,
    #[serde(rename = "ReviewCount")]
    #[tabled(rename = "ReviewCount")]
    pub review_count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct RfmRow {
    #[serde(rename = "CustomerId")]
    #[tabled(rename = "CustomerId")]
    pub customer_id: String,
    #[serde(rename = "Recency")]
    #[tabled(rename = "Recency")]
    pub recency: i64,
    #[serde(rename = "Frequency")]
    #[tabled(rename = "Frequency")]
    pub frequency: usize,
    #[serde(rename = "Monetary")]
    #[tabled(rename = "Monetary", display_with = "display_money")]
    pub monetary: f64,
}

/// Means over every RFM row of a window. `None` means the window was empty.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Default)]
pub struct RfmSummary {
    pub mean_recency: Option<f64>,
    pub mean_frequency: Option<f64>,
    pub mean_monetary: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    pub total_records: usize,
    pub total_customers: usize,
    pub avg_delivery_days: Option<f64>,
    pub rfm: RfmSummary,
    pub top_by_recency: Vec<RfmRow>,
    pub top_by_frequency: Vec<RfmRow>,
    pub top_by_monetary: Vec<RfmRow>,
}
