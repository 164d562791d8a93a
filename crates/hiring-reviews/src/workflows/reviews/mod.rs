//! Candidate review collection from the Base Hiring API.
//!
//! Raw candidate objects are flattened into [`CandidateRecord`]s (review text,
//! primary attachment, custom form answers), unioned into a
//! [`CandidateTable`], filtered on review presence and exported as CSV.

pub mod assembler;
pub mod attachment;
pub mod collector;
pub mod domain;
pub mod export;
pub mod form;
pub mod gateway;
pub mod report;
pub mod review;
pub mod router;
pub mod service;
pub mod table;

#[cfg(test)]
mod tests;

pub use collector::{ProgressReporter, ProgressUpdate, ReviewCollector};
pub use domain::{
    active_openings, CandidateRecord, CollectionError, CollectionRequest, DateRange, JobOpening,
    OpeningSelection, ReviewFilter,
};
pub use export::{export_file_name, to_csv_bytes, write_csv, write_csv_file, ExportError};
pub use gateway::{BaseHiringClient, GatewayProvider, HiringApiError, HiringGateway};
pub use report::{CollectionReport, CollectionState, OpeningOutcome, OpeningReport};
pub use router::{review_router, CollectBody};
pub use service::{CsvExport, ReviewService, ReviewServiceError};
pub use table::{CandidateTable, JobStatistic, DISPLAY_COLUMNS};
