use serde::Serialize;

use super::domain::{DateRange, JobOpening, ReviewFilter};
use super::gateway::HiringApiError;
use super::table::{CandidateTable, JobStatistic};

/// What happened to one opening during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OpeningOutcome {
    Collected {
        rows: usize,
    },
    /// Fetched successfully, nobody in range.
    NoCandidates,
    /// The fetch failed; the opening contributed nothing.
    Failed {
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
        message: String,
    },
}

impl OpeningOutcome {
    pub fn failed(error: &HiringApiError) -> Self {
        Self::Failed {
            status: error.status(),
            message: error.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpeningReport {
    pub opening: JobOpening,
    #[serde(flatten)]
    pub outcome: OpeningOutcome,
}

/// Account of a run: every opening visited and every non-fatal failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionReport {
    pub date_range: DateRange,
    pub filter: ReviewFilter,
    pub openings: Vec<OpeningReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_failure: Option<String>,
    pub rows_collected: usize,
    pub rows_retained: usize,
    /// Candidate entries that were not objects and could not become rows.
    pub skipped_entries: usize,
}

impl CollectionReport {
    pub(crate) fn new(date_range: DateRange, filter: ReviewFilter) -> Self {
        Self {
            date_range,
            filter,
            openings: Vec::new(),
            listing_failure: None,
            rows_collected: 0,
            rows_retained: 0,
            skipped_entries: 0,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &OpeningReport> {
        self.openings
            .iter()
            .filter(|report| report.outcome.is_failure())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn without_candidates(&self) -> impl Iterator<Item = &OpeningReport> {
        self.openings
            .iter()
            .filter(|report| report.outcome == OpeningOutcome::NoCandidates)
    }
}

/// Result of the latest run as seen by a presentation surface.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CollectionState {
    #[default]
    NotRun,
    /// The run finished but no row survived (or no opening existed).
    Empty { report: CollectionReport },
    Collected {
        report: CollectionReport,
        statistics: Vec<JobStatistic>,
        table: CandidateTable,
    },
}

impl CollectionState {
    pub fn report(&self) -> Option<&CollectionReport> {
        match self {
            Self::NotRun => None,
            Self::Empty { report } | Self::Collected { report, .. } => Some(report),
        }
    }

    pub fn table(&self) -> Option<&CandidateTable> {
        match self {
            Self::Collected { table, .. } => Some(table),
            _ => None,
        }
    }

    pub fn has_run(&self) -> bool {
        !matches!(self, Self::NotRun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn report() -> CollectionReport {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date");
        let range = DateRange::new(start, None).expect("valid range");
        let mut report = CollectionReport::new(range, ReviewFilter::WithReview);
        report.openings.push(OpeningReport {
            opening: JobOpening {
                id: "1".into(),
                name: "Designer".into(),
                status: "10".into(),
            },
            outcome: OpeningOutcome::failed(&HiringApiError::Status {
                status: 500,
                body: "boom".into(),
            }),
        });
        report.openings.push(OpeningReport {
            opening: JobOpening {
                id: "2".into(),
                name: "Backend Engineer".into(),
                status: "10".into(),
            },
            outcome: OpeningOutcome::NoCandidates,
        });
        report
    }

    #[test]
    fn failures_and_empty_openings_are_told_apart() {
        let report = report();
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failures().next().map(|r| r.opening.id.as_str()), Some("1"));
        assert_eq!(
            report
                .without_candidates()
                .map(|r| r.opening.id.as_str())
                .collect::<Vec<_>>(),
            vec!["2"]
        );
    }

    #[test]
    fn opening_reports_serialize_flat() {
        let value = serde_json::to_value(&report().openings[0]).expect("serializes");
        assert_eq!(
            value,
            json!({
                "opening": {"id": "1", "name": "Designer", "status": "10"},
                "outcome": "failed",
                "status": 500,
                "message": "hiring API returned 500: boom"
            })
        );
    }

    #[test]
    fn states_are_distinguishable() {
        assert!(!CollectionState::NotRun.has_run());
        let empty = CollectionState::Empty { report: report() };
        assert!(empty.has_run());
        assert!(empty.table().is_none());
        let value = serde_json::to_value(&CollectionState::NotRun).expect("serializes");
        assert_eq!(value, json!({"status": "not_run"}));
    }
}
