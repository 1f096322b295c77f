//! End-to-end tests: CSV on disk -> window -> dashboard -> report files.

use chrono::NaiveDate;
use order_report::output::{self, CATEGORY_REPORT, CUSTOMER_REPORT, RFM_REPORT, SUMMARY_FILE};
use order_report::{
    build_dashboard, filter_window, load_orders_file, DashboardOptions, DateRange, ReportError,
};
use std::io::Write;
use tempfile::NamedTempFile;

const HEADER: &str = "order_id,customer_id,product_category_name_english,review_score,order_purchase_timestamp,order_delivered_customer_date,payment_value";

/// Create a test CSV file with sample data
fn create_test_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", HEADER).unwrap();

    // Customer c1: three orders across January, one with two item rows
    writeln!(file, "o1,c1,toys,4,2018-01-01 10:00:00,2018-01-03 10:00:00,20").unwrap();
    writeln!(file, "o2,c1,toys,,2018-01-05 09:00:00,2018-01-10 09:00:00,30").unwrap();
    writeln!(file, "o3,c1,toys,2,2018-01-10 08:00:00,2018-01-20 08:00:00,25").unwrap();
    writeln!(file, "o3,c1,toys,2,2018-01-10 08:00:00,2018-01-20 08:00:00,25").unwrap();

    // Customer c2: delivered before purchase (data error) and a 95-day outlier
    writeln!(file, "o4,c2,books,5,2018-01-04 12:00:00,2018-01-03 11:00:00,15.5").unwrap();
    writeln!(file, "o5,c2,,3,2018-01-06 12:00:00,2018-04-11 12:00:00,4.5").unwrap();

    // Customer c3: undelivered, outside a January-only window
    writeln!(file, "o6,c3,garden,1,2018-02-02 07:30:00,,99.99").unwrap();
    file
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn test_end_to_end_full_range() {
    let test_file = create_test_csv();
    let (records, report) = load_orders_file(test_file.path()).unwrap();
    assert_eq!(report.loaded_rows, 7);
    assert_eq!(report.undelivered, 1);

    let range = DateRange::covering(&records).unwrap();
    assert_eq!(range.start(), date("2018-01-01"));
    assert_eq!(range.end(), date("2018-02-02"));

    let window = filter_window(&records, &range);
    let dash = build_dashboard(&window, Some(range), DashboardOptions::default());

    // Delivery: 2, 5, 10, 10 retained; -1 and 95 dropped.
    assert_eq!(dash.avg_delivery_days, Some(27.0 / 4.0));

    let cats: Vec<Option<&str>> = dash.categories.iter().map(|c| c.category.as_deref()).collect();
    assert_eq!(cats, vec![Some("books"), None, Some("toys"), Some("garden")]);
    let toys = &dash.categories[2];
    assert_eq!(toys.records, 4);
    assert!((toys.average_review_score.unwrap() - 8.0 / 3.0).abs() < 1e-9);

    assert_eq!(dash.customers[0].customer_id, "c1");
    assert_eq!(dash.customers[0].review_count, 4);
    let total: usize = dash.customers.iter().map(|c| c.review_count).sum();
    assert_eq!(total, window.len());

    let c1 = dash.rfm.iter().find(|r| r.customer_id == "c1").unwrap();
    assert_eq!(c1.frequency, 3);
    assert!((c1.monetary - 100.0).abs() < 1e-9);
    // Latest purchase overall is c3's on 2018-02-02 07:30.
    assert_eq!(c1.recency, 22);
    let c3 = dash.rfm.iter().find(|r| r.customer_id == "c3").unwrap();
    assert_eq!(c3.recency, 0);
}

#[test]
fn test_january_window_changes_reference_point() {
    let test_file = create_test_csv();
    let (records, _) = load_orders_file(test_file.path()).unwrap();
    let range = DateRange::new(date("2018-01-01"), date("2018-01-31")).unwrap();
    let window = filter_window(&records, &range);
    assert_eq!(window.len(), 6);

    let dash = build_dashboard(&window, Some(range), DashboardOptions::default());
    let c1 = dash.rfm.iter().find(|r| r.customer_id == "c1").unwrap();
    assert_eq!(c1.recency, 0);
    assert!(dash.rfm.iter().all(|r| r.customer_id != "c3"));
    assert_eq!(dash.top_by_recency()[0].customer_id, "c1");
    assert_eq!(dash.top_by_monetary()[0].customer_id, "c1");
}

#[test]
fn test_empty_window_writes_neutral_reports() {
    let test_file = create_test_csv();
    let (records, _) = load_orders_file(test_file.path()).unwrap();
    let range = DateRange::new(date("2019-01-01"), date("2019-12-31")).unwrap();
    let window = filter_window(&records, &range);
    let dash = build_dashboard(&window, Some(range), DashboardOptions::default());

    let out_dir = tempfile::tempdir().unwrap();
    output::write_dashboard(out_dir.path(), &dash).unwrap();

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out_dir.path().join(SUMMARY_FILE)).unwrap())
            .unwrap();
    assert!(summary["avg_delivery_days"].is_null());
    assert!(summary["rfm"]["mean_recency"].is_null());
    assert_eq!(summary["total_records"], 0);
    assert_eq!(summary["window_start"], "2019-01-01");
}

#[test]
fn test_report_files_written() {
    let test_file = create_test_csv();
    let (records, _) = load_orders_file(test_file.path()).unwrap();
    let dash = build_dashboard(&records, DateRange::covering(&records), DashboardOptions::default());

    let out_dir = tempfile::tempdir().unwrap();
    let paths = output::write_dashboard(out_dir.path(), &dash).unwrap();
    assert_eq!(paths.len(), 4);
    for name in [CATEGORY_REPORT, CUSTOMER_REPORT, RFM_REPORT, SUMMARY_FILE] {
        assert!(out_dir.path().join(name).exists(), "{} missing", name);
    }

    let mut rdr = csv::Reader::from_path(out_dir.path().join(RFM_REPORT)).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["CustomerId", "Recency", "Frequency", "Monetary"]
    );
    assert_eq!(rdr.records().count(), 3);

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out_dir.path().join(SUMMARY_FILE)).unwrap())
            .unwrap();
    assert_eq!(summary["total_customers"], 3);
    assert_eq!(summary["top_by_frequency"][0]["CustomerId"], "c1");
}

#[test]
fn test_malformed_schema_aborts_load() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "order_id,customer_id,review_score,payment_value").unwrap();
    writeln!(file, "o1,c1,5,10").unwrap();
    let err = load_orders_file(file.path()).unwrap_err();
    assert!(matches!(err, ReportError::MissingColumn(_)));
}
