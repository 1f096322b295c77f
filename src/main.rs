// Entry point and high-level CLI flow.
//
// - Option [1] loads and normalizes the CSV, printing diagnostics.
// - Option [2] narrows the purchase-date window.
// - Option [3] generates the reports for the current window.
// - After generating reports, the user can go back to the menu or exit.
// `--batch` runs load and generate once without the menu.
use anyhow::Result;
use clap::Parser;
use order_report::cli::parse_date_arg;
use order_report::output;
use order_report::util::{format_int, format_optional};
use order_report::{
    build_dashboard, filter_window, init_tracing, load_orders_file, Args, DateRange, OrderRecord,
    ReportError,
};
use std::io::{self, Write};
use tracing::error;

/// The loaded dataset and the window currently selected over it. Owned by
/// `main` and handed to each action by reference.
struct Session {
    data: Vec<OrderRecord>,
    range: Option<DateRange>,
}

fn prompt_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    prompt_line("Enter choice: ")
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match prompt_line("Back to Report Selection (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load the CSV and apply any `--start`/`--end` bounds.
fn handle_load(args: &Args) -> order_report::Result<Session> {
    let (data, load_report) = load_orders_file(&args.input)?;
    println!(
        "Processing dataset... ({} rows read, {} records loaded)",
        format_int(load_report.total_rows),
        format_int(load_report.loaded_rows)
    );
    if load_report.skipped_rows > 0 {
        println!(
            "Note: {} rows skipped because they could not be read.",
            format_int(load_report.skipped_rows)
        );
    }
    println!(
        "Info: {} without category, {} without review score, {} undelivered, {} without payment.",
        format_int(load_report.missing_category),
        format_int(load_report.missing_review),
        format_int(load_report.undelivered),
        format_int(load_report.missing_payment)
    );
    let range = match DateRange::covering(&data) {
        Some(full) => Some(full.with_bounds(args.start, args.end)?),
        None => None,
    };
    if let Some(r) = range {
        println!("Date range: {} to {}", r.start(), r.end());
    }
    println!();
    Ok(Session { data, range })
}

/// Handle option [2]: ask for new bounds; an empty answer keeps the current one.
fn handle_set_range(session: &mut Session) -> order_report::Result<()> {
    let Some(current) = session.range else {
        return Err(ReportError::NoData);
    };
    let read_bound = |label: &str, current: chrono::NaiveDate| loop {
        let answer = prompt_line(&format!("{} date [{}]: ", label, current));
        if answer.is_empty() {
            return None;
        }
        match parse_date_arg(&answer) {
            Ok(d) => return Some(d),
            Err(e) => println!("{}", e),
        }
    };
    let start = read_bound("Start", current.start());
    let end = read_bound("End", current.end());
    let range = current.with_bounds(start, end)?;
    println!("Date range: {} to {}\n", range.start(), range.end());
    session.range = Some(range);
    Ok(())
}

/// Handle option [3]: compute every report for the current window, write
/// the files and print previews.
fn handle_generate_reports(args: &Args, session: &Session) -> order_report::Result<()> {
    let window = match &session.range {
        Some(range) => filter_window(&session.data, range),
        None => Vec::new(),
    };
    let dashboard = build_dashboard(&window, session.range, args.dashboard_options());

    println!("Generating reports...");
    let paths = output::write_dashboard(&args.out_dir, &dashboard)?;
    println!("Outputs saved to {}\n", args.out_dir.display());

    println!("Average Delivery Time");
    println!(
        "Average Delivery Time (Days): {}",
        format_optional(dashboard.avg_delivery_days, 2)
    );

    output::preview_table(
        1,
        "Reviews by Product Category",
        Some("Average review score, highest first"),
        &dashboard.categories,
        dashboard.categories.len(),
    );
    println!("(Full table exported to {})", paths[0].display());

    let customer_note = format!("Top {} by review count", args.top_customers);
    output::preview_table(
        2,
        "The Most Active Customers Leave Reviews",
        Some(customer_note.as_str()),
        dashboard.top_customers(),
        args.top_customers,
    );
    println!("(Full table exported to {})", paths[1].display());

    println!("\nReport 3: Best Customer Based on RFM Parameters\n");
    let rfm = dashboard.rfm_summary;
    println!("Average Recency (days): {}", format_optional(rfm.mean_recency, 1));
    println!("Average Frequency: {}", format_optional(rfm.mean_frequency, 2));
    println!("Average Monetary: {}\n", format_optional(rfm.mean_monetary, 2));
    println!("By Recency (days)");
    output::preview_table_rows(&dashboard.top_by_recency(), args.top_rfm);
    println!("By Frequency");
    output::preview_table_rows(&dashboard.top_by_frequency(), args.top_rfm);
    println!("By Monetary");
    output::preview_table_rows(&dashboard.top_by_monetary(), args.top_rfm);
    println!("(Full table exported to {})", paths[2].display());
    println!("(Summary exported to {})\n", paths[3].display());
    Ok(())
}

fn run_batch(args: &Args) -> Result<()> {
    let session = handle_load(args)?;
    handle_generate_reports(args, &session)?;
    Ok(())
}

fn run_menu(args: &Args) {
    let mut session: Option<Session> = None;
    loop {
        println!("Select an option:");
        println!("[1] Load the file");
        println!("[2] Set date range");
        println!("[3] Generate Reports\n");
        match read_choice().as_str() {
            "1" => match handle_load(args) {
                Ok(s) => session = Some(s),
                Err(e) => error!(error = %e, "failed to load file"),
            },
            "2" => {
                let result = match session.as_mut() {
                    Some(s) => handle_set_range(s),
                    None => Err(ReportError::NoData),
                };
                if let Err(e) = result {
                    println!("Error: {}. Load the CSV file first (option 1) or fix the range.\n", e);
                }
            }
            "3" => {
                println!();
                let Some(s) = session.as_ref() else {
                    println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
                    continue;
                };
                if let Err(e) = handle_generate_reports(args, s) {
                    error!(error = %e, "report generation failed");
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1, 2 or 3.\n"),
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    if args.batch {
        run_batch(&args)
    } else {
        run_menu(&args);
        Ok(())
    }
}
