//! Command-line arguments.

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

use crate::reports::DashboardOptions;
use crate::util::parse_date;

/// Order review, delivery and RFM reports over an e-commerce dataset
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the joined orders CSV
    #[arg(short, long, default_value = "dashboard/all_data_new.csv")]
    pub input: PathBuf,

    /// First purchase date to include (YYYY-MM-DD); defaults to the earliest in the data
    #[arg(long, value_parser = parse_date_arg)]
    pub start: Option<NaiveDate>,

    /// Last purchase date to include (YYYY-MM-DD); defaults to the latest in the data
    #[arg(long, value_parser = parse_date_arg)]
    pub end: Option<NaiveDate>,

    /// Directory the report files are written to
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Rows shown in the most-active-customers preview
    #[arg(long, default_value = "10")]
    pub top_customers: usize,

    /// Rows in each RFM ranking
    #[arg(long, default_value = "5")]
    pub top_rfm: usize,

    /// Load, filter and generate once, then exit instead of showing the menu
    #[arg(short, long)]
    pub batch: bool,
}

impl Args {
    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            top_customers: self.top_customers,
            top_rfm: self.top_rfm,
        }
    }
}

pub fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("expected YYYY-MM-DD, got '{}'", s))
}
