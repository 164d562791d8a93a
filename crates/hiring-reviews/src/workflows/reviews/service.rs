use std::sync::{Mutex, PoisonError};

use super::collector::{ProgressReporter, ReviewCollector};
use super::domain::{CollectionError, CollectionRequest, JobOpening};
use super::export::{export_file_name, to_csv_bytes, ExportError};
use super::gateway::{GatewayProvider, HiringApiError};
use super::report::CollectionState;

/// CSV payload ready to hand to a download or a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Owns the gateway provider and remembers the outcome of the latest run.
#[derive(Debug)]
pub struct ReviewService<P> {
    provider: P,
    latest: Mutex<CollectionState>,
}

impl<P: GatewayProvider> ReviewService<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            latest: Mutex::new(CollectionState::NotRun),
        }
    }

    pub fn openings(&self) -> Result<Vec<JobOpening>, ReviewServiceError> {
        let collector = ReviewCollector::new(self.provider.connect()?);
        Ok(collector.active_openings()?)
    }

    /// Runs a collection and stores it as the latest state. Fatal errors leave
    /// the previous state untouched.
    pub fn collect<R>(
        &self,
        request: &CollectionRequest,
        progress: &mut R,
    ) -> Result<CollectionState, ReviewServiceError>
    where
        R: ProgressReporter + ?Sized,
    {
        request.date_range()?;
        let collector = ReviewCollector::new(self.provider.connect()?);
        let state = collector.collect(request, progress)?;

        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = state.clone();
        Ok(state)
    }

    pub fn latest(&self) -> CollectionState {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// CSV of the latest collected table, `None` until rows exist.
    pub fn latest_export(&self) -> Result<Option<CsvExport>, ReviewServiceError> {
        let guard = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        match &*guard {
            CollectionState::Collected { report, table, .. } => Ok(Some(CsvExport {
                file_name: export_file_name(&report.date_range),
                bytes: to_csv_bytes(table)?,
            })),
            _ => Ok(None),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReviewServiceError {
    #[error(transparent)]
    Gateway(#[from] HiringApiError),
    #[error(transparent)]
    Collection(#[from] CollectionError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
