use crate::error::Result;
use crate::reports::Dashboard;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub const CATEGORY_REPORT: &str = "report1_category_reviews.csv";
pub const CUSTOMER_REPORT: &str = "report2_active_customers.csv";
pub const RFM_REPORT: &str = "report3_rfm_segments.csv";
pub const SUMMARY_FILE: &str = "summary.json";

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    info!(path = %path.display(), rows = rows.len(), "report written");
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    info!(path = %path.display(), "summary written");
    Ok(())
}

/// Write the three report tables and the JSON summary into `out_dir`,
/// returning the paths in that order.
pub fn write_dashboard(out_dir: &Path, dashboard: &Dashboard) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;
    let paths: Vec<PathBuf> = [CATEGORY_REPORT, CUSTOMER_REPORT, RFM_REPORT, SUMMARY_FILE]
        .iter()
        .map(|name| out_dir.join(name))
        .collect();
    write_csv(&paths[0], &dashboard.categories)?;
    write_csv(&paths[1], &dashboard.customers)?;
    write_csv(&paths[2], &dashboard.rfm)?;
    write_json(&paths[3], &dashboard.summary())?;
    Ok(paths)
}

pub fn preview_table<T>(report_no: usize, title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("\nReport {}: {}", report_no, title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    preview_table_rows(rows, max_rows);
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
