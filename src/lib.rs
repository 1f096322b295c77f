//! Review, delivery and RFM reports over an e-commerce order dataset.
//!
//! The flow is load -> date window -> aggregations -> report files. Each
//! aggregation in [`reports`] is a pure function over a borrowed slice of
//! [`OrderRecord`]s, so one filtered window can feed all of them.

pub mod cli;
pub mod error;
pub mod filter;
pub mod loader;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;

pub use cli::Args;
pub use error::{ReportError, Result};
pub use filter::{filter_window, DateRange};
pub use loader::{load_orders, load_orders_file, LoadReport};
pub use reports::{build_dashboard, Dashboard, DashboardOptions};
pub use types::{CategoryAverage, CustomerActivity, OrderRecord, RfmRow, RfmSummary};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing with the ORDER_REPORT_LOG environment variable.
///
/// Defaults to "info" if ORDER_REPORT_LOG is not set. Logs go to stderr so
/// they do not interleave with the report previews on stdout.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("ORDER_REPORT_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
