use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ID_FIELD: &str = "id";
pub const OPENING_ID_FIELD: &str = "opening_id";
pub const JOB_FIELD: &str = "job";
pub const REVIEW_FIELD: &str = "review";
pub const CV_FIELD: &str = "cvs";
pub const FORM_FIELD: &str = "form";
pub const EVALUATIONS_FIELD: &str = "evaluations";

/// Status code the hiring API uses for openings that are still recruiting.
pub const ACTIVE_OPENING_STATUS: &str = "10";

/// A job requisition as listed by the hiring API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOpening {
    pub id: String,
    pub name: String,
    pub status: String,
}

impl JobOpening {
    /// Reads an opening from one element of the listing response. Entries
    /// without an id are unusable and skipped.
    pub fn from_listing(raw: &Value) -> Option<Self> {
        let id = raw.get("id").and_then(value_text)?;
        let name = raw.get("name").and_then(value_text).unwrap_or_default();
        let status = raw.get("status").and_then(value_text).unwrap_or_default();
        Some(Self { id, name, status })
    }

    pub fn is_active(&self) -> bool {
        self.status.trim() == ACTIVE_OPENING_STATUS
    }
}

/// Keeps the active openings of a listing response, in listing order.
pub fn active_openings(listing: &[Value]) -> Vec<JobOpening> {
    listing
        .iter()
        .filter_map(JobOpening::from_listing)
        .filter(JobOpening::is_active)
        .collect()
}

/// Inclusive collection window. A missing end date leaves the range open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Result<Self, CollectionError> {
        match end {
            Some(end) if start > end => Err(CollectionError::InvalidDateRange { start, end }),
            _ => Ok(Self { start, end }),
        }
    }

    /// The last `days` days up to and including `today`.
    pub fn trailing(today: NaiveDate, days: i64) -> Self {
        Self {
            start: today - Duration::days(days),
            end: Some(today),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn start_param(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_param(&self) -> String {
        self.end
            .map(|end| end.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{} -> {}", self.start, end),
            None => write!(f, "{} -> (open)", self.start),
        }
    }
}

/// Review-presence predicate applied after aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewFilter {
    All,
    #[default]
    WithReview,
    WithoutReview,
}

impl ReviewFilter {
    pub fn matches(self, record: &CandidateRecord) -> bool {
        match self {
            Self::All => true,
            Self::WithReview => record.has_review(),
            Self::WithoutReview => !record.has_review(),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "all candidates",
            Self::WithReview => "candidates with a review",
            Self::WithoutReview => "candidates without a review",
        }
    }
}

impl FromStr for ReviewFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "all" | "both" => Ok(Self::All),
            "with-review" | "reviewed" => Ok(Self::WithReview),
            "without-review" | "unreviewed" => Ok(Self::WithoutReview),
            other => Err(format!(
                "unknown review filter '{other}' (expected all, with-review or without-review)"
            )),
        }
    }
}

/// Which openings a collection run visits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OpeningSelection {
    #[default]
    All,
    Id(String),
    Name(String),
}

impl OpeningSelection {
    pub fn select(&self, openings: Vec<JobOpening>) -> Result<Vec<JobOpening>, CollectionError> {
        let wanted = match self {
            Self::All => return Ok(openings),
            Self::Id(id) => openings.into_iter().find(|opening| &opening.id == id),
            Self::Name(name) => openings.into_iter().find(|opening| &opening.name == name),
        };

        wanted
            .map(|opening| vec![opening])
            .ok_or_else(|| CollectionError::UnknownOpening(self.to_string()))
    }
}

impl fmt::Display for OpeningSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all active openings"),
            Self::Id(id) => write!(f, "opening id {id}"),
            Self::Name(name) => write!(f, "opening '{name}'"),
        }
    }
}

/// Parameters of one collection run. The date range is validated by the
/// collector before any remote call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRequest {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub selection: OpeningSelection,
    pub filter: ReviewFilter,
}

impl CollectionRequest {
    pub fn date_range(&self) -> Result<DateRange, CollectionError> {
        DateRange::new(self.start_date, self.end_date)
    }
}

/// One flattened candidate row before it is unioned into a table.
///
/// `fields` keeps the API's own fields in the order they were received plus
/// the denormalized opening columns; `form` holds the answers of the custom
/// form, keyed by field identifier. JSON `null` counts as "no value" in both.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CandidateRecord {
    fields: Map<String, Value>,
    form: Map<String, Value>,
    #[serde(skip)]
    placeholder: bool,
}

impl CandidateRecord {
    pub(crate) fn from_parts(fields: Map<String, Value>, form: Map<String, Value>) -> Self {
        Self {
            fields,
            form,
            placeholder: false,
        }
    }

    /// Row standing in for an opening that was fetched but had no candidates.
    pub fn placeholder(opening_id: &str) -> Self {
        let mut fields = Map::new();
        fields.insert(
            OPENING_ID_FIELD.to_string(),
            Value::String(opening_id.to_string()),
        );
        Self {
            fields,
            form: Map::new(),
            placeholder: true,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|value| !value.is_null())
    }

    pub fn form_answer(&self, id: &str) -> Option<&Value> {
        self.form.get(id).filter(|value| !value.is_null())
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn form_answers(&self) -> &Map<String, Value> {
        &self.form
    }

    pub fn opening_id(&self) -> Option<&str> {
        self.field(OPENING_ID_FIELD).and_then(Value::as_str)
    }

    pub fn review(&self) -> Option<&str> {
        self.field(REVIEW_FIELD).and_then(Value::as_str)
    }

    pub fn has_review(&self) -> bool {
        self.field(REVIEW_FIELD).is_some()
    }

    /// Only rows built by [`CandidateRecord::placeholder`]; a candidate
    /// without an id is still a candidate.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

/// Renders a JSON value the way it should appear in a table cell. `null` has
/// no textual form.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    #[error("start date {start} is after end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("{0} is not an active opening")]
    UnknownOpening(String),
}
