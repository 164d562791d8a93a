use crate::infra::{parse_date, parse_filter};
use chrono::{Local, NaiveDate};
use clap::Args;
use hiring_reviews::config::AppConfig;
use hiring_reviews::error::AppError;
use hiring_reviews::telemetry;
use hiring_reviews::workflows::reviews::domain::value_text;
use hiring_reviews::workflows::reviews::{
    export_file_name, write_csv_file, CandidateTable, CollectionReport, CollectionRequest,
    CollectionState, DateRange, OpeningOutcome, OpeningSelection, ProgressUpdate, ReviewFilter,
    ReviewService,
};
use std::path::PathBuf;

/// Look-back window used when no start date is given.
const DEFAULT_LOOKBACK_DAYS: i64 = 30;

#[derive(Args, Debug, Default)]
pub(crate) struct CollectArgs {
    /// First application date to include (YYYY-MM-DD). Defaults to 30 days ago.
    #[arg(long, value_parser = parse_date)]
    pub(crate) start_date: Option<NaiveDate>,
    /// Last application date to include (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) end_date: Option<NaiveDate>,
    /// Only collect the opening with this identifier
    #[arg(long, conflicts_with = "opening_name")]
    pub(crate) opening_id: Option<String>,
    /// Only collect the opening with this exact name
    #[arg(long)]
    pub(crate) opening_name: Option<String>,
    /// Which candidates to keep: all, with-review or without-review
    #[arg(long, value_parser = parse_filter)]
    pub(crate) filter: Option<ReviewFilter>,
    /// Where to write the CSV export. Defaults to the generated file name.
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Print the retained rows (display columns only)
    #[arg(long)]
    pub(crate) show_rows: bool,
}

impl CollectArgs {
    fn request(&self, today: NaiveDate) -> CollectionRequest {
        let selection = match (&self.opening_id, &self.opening_name) {
            (Some(id), _) => OpeningSelection::Id(id.clone()),
            (None, Some(name)) => OpeningSelection::Name(name.clone()),
            (None, None) => OpeningSelection::All,
        };

        let window = DateRange::trailing(today, DEFAULT_LOOKBACK_DAYS);
        CollectionRequest {
            start_date: self.start_date.unwrap_or(window.start()),
            end_date: self.end_date.or(window.end()),
            selection,
            filter: self.filter.unwrap_or_default(),
        }
    }
}

pub(crate) fn run_openings() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let service = ReviewService::new(config.hiring);
    let openings = service.openings()?;
    if openings.is_empty() {
        println!("No active openings.");
        return Ok(());
    }

    println!("Active openings ({})", openings.len());
    for opening in &openings {
        println!("- {} | {}", opening.id, opening.name);
    }
    Ok(())
}

pub(crate) fn run_collect(args: CollectArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let request = args.request(Local::now().date_naive());
    let range = request.date_range()?;
    println!(
        "Collecting {} for {} ({})",
        request.filter.label(),
        request.selection,
        range
    );

    let service = ReviewService::new(config.hiring);
    let state = service.collect(&request, &mut print_progress)?;

    match &state {
        CollectionState::Collected {
            report,
            statistics,
            table,
        } => {
            render_failures(report);
            println!(
                "\n{} of {} candidate(s) retained",
                report.rows_retained, report.rows_collected
            );
            println!("Candidates per job:");
            for statistic in statistics {
                println!("  - {}: {}", statistic.job, statistic.candidate_count);
            }

            if args.show_rows {
                render_rows(&table.display_view());
            }

            let path = args
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(export_file_name(&report.date_range)));
            write_csv_file(table, &path)?;
            println!("\nCSV written to {}", path.display());
        }
        CollectionState::Empty { report } => {
            if let Some(failure) = &report.listing_failure {
                println!("\nCould not list openings: {failure}");
            }
            render_failures(report);
            println!("\nNo {} found; nothing exported.", report.filter.label());
        }
        CollectionState::NotRun => {}
    }

    Ok(())
}

fn print_progress(update: ProgressUpdate<'_>) {
    match update {
        ProgressUpdate::Started { total } => println!("{total} opening(s) to check"),
        ProgressUpdate::Fetching {
            index,
            total,
            opening,
        } => println!("[{}/{}] {} ({})", index + 1, total, opening.name, opening.id),
        ProgressUpdate::Finished { outcome, .. } => match outcome {
            OpeningOutcome::Collected { rows } => println!("      {rows} candidate(s)"),
            OpeningOutcome::NoCandidates => println!("      no candidates in range"),
            OpeningOutcome::Failed { message, .. } => println!("      failed: {message}"),
        },
    }
}

fn render_failures(report: &CollectionReport) {
    if report.skipped_entries > 0 {
        println!(
            "\n{} malformed candidate entr(ies) skipped",
            report.skipped_entries
        );
    }
    if report.failure_count() == 0 {
        return;
    }

    println!("\nOpenings that could not be fetched:");
    for entry in report.failures() {
        if let OpeningOutcome::Failed { message, .. } = &entry.outcome {
            println!("  - {} ({}): {}", entry.opening.name, entry.opening.id, message);
        }
    }
}

fn render_rows(table: &CandidateTable) {
    println!("\n{}", table.columns().join(" | "));
    for row in table.rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| cell.as_ref().and_then(value_text).unwrap_or_default())
            .collect();
        println!("{}", cells.join(" | "));
    }
}
