use tracing::{info, warn};

use super::assembler::assemble_batch;
use super::domain::{active_openings, CandidateRecord, CollectionError, CollectionRequest, JobOpening};
use super::gateway::{HiringApiError, HiringGateway};
use super::report::{CollectionReport, CollectionState, OpeningOutcome, OpeningReport};
use super::table::CandidateTable;

/// Progress of a run, emitted as each opening is processed.
#[derive(Debug, Clone, Copy)]
pub enum ProgressUpdate<'a> {
    Started {
        total: usize,
    },
    Fetching {
        index: usize,
        total: usize,
        opening: &'a JobOpening,
    },
    Finished {
        index: usize,
        total: usize,
        opening: &'a JobOpening,
        outcome: &'a OpeningOutcome,
    },
}

/// Receives [`ProgressUpdate`]s. Closures implement it.
pub trait ProgressReporter {
    fn report(&mut self, update: ProgressUpdate<'_>);
}

impl<F> ProgressReporter for F
where
    F: FnMut(ProgressUpdate<'_>),
{
    fn report(&mut self, update: ProgressUpdate<'_>) {
        self(update)
    }
}

/// Runs select → fetch → filter over one gateway, strictly sequentially.
#[derive(Debug)]
pub struct ReviewCollector<G> {
    gateway: G,
}

impl<G: HiringGateway> ReviewCollector<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// Active openings in listing order.
    pub fn active_openings(&self) -> Result<Vec<JobOpening>, HiringApiError> {
        let listing = self.gateway.list_openings()?;
        Ok(active_openings(&listing))
    }

    pub fn collect<P>(
        &self,
        request: &CollectionRequest,
        progress: &mut P,
    ) -> Result<CollectionState, CollectionError>
    where
        P: ProgressReporter + ?Sized,
    {
        let date_range = request.date_range()?;
        let mut report = CollectionReport::new(date_range, request.filter);

        let openings = match self.active_openings() {
            Ok(openings) => openings,
            Err(err) => {
                warn!(error = %err, "failed to list openings");
                report.listing_failure = Some(err.to_string());
                return Ok(CollectionState::Empty { report });
            }
        };
        let openings = request.selection.select(openings)?;

        let total = openings.len();
        info!(openings = total, range = %date_range, "collecting candidates");
        progress.report(ProgressUpdate::Started { total });

        let mut records: Vec<CandidateRecord> = Vec::new();
        for (index, opening) in openings.into_iter().enumerate() {
            progress.report(ProgressUpdate::Fetching {
                index,
                total,
                opening: &opening,
            });

            let outcome = match self.gateway.list_candidates(&opening.id, &date_range) {
                Ok(candidates) => {
                    let batch = assemble_batch(&opening, candidates);
                    report.skipped_entries += batch.skipped;
                    // Placeholder rows only mark the opening as checked.
                    let rows: Vec<CandidateRecord> = batch
                        .records
                        .into_iter()
                        .filter(|record| !record.is_placeholder())
                        .collect();
                    if rows.is_empty() {
                        info!(opening_id = %opening.id, job = %opening.name, "no candidates in range");
                        OpeningOutcome::NoCandidates
                    } else {
                        info!(opening_id = %opening.id, job = %opening.name, rows = rows.len(), "collected candidates");
                        let collected = rows.len();
                        records.extend(rows);
                        OpeningOutcome::Collected { rows: collected }
                    }
                }
                Err(err) => {
                    warn!(opening_id = %opening.id, job = %opening.name, error = %err, "candidate fetch failed");
                    OpeningOutcome::failed(&err)
                }
            };

            progress.report(ProgressUpdate::Finished {
                index,
                total,
                opening: &opening,
                outcome: &outcome,
            });
            report.openings.push(OpeningReport { opening, outcome });
        }

        let table = CandidateTable::build(&records, request.filter);
        report.rows_collected = records.len();
        report.rows_retained = table.len();

        if table.is_empty() {
            info!(
                rows_collected = report.rows_collected,
                filter = request.filter.label(),
                "no rows left after filtering"
            );
            return Ok(CollectionState::Empty { report });
        }

        let statistics = table.job_statistics();
        Ok(CollectionState::Collected {
            report,
            statistics,
            table,
        })
    }
}
