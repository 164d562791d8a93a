use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::workflows::reviews::domain::{CollectionRequest, DateRange, OpeningSelection, ReviewFilter};
use crate::workflows::reviews::gateway::{GatewayProvider, HiringApiError, HiringGateway};

/// Scripted hiring API that records every call it receives.
#[derive(Debug, Clone, Default)]
pub(super) struct FakeGateway {
    openings: Vec<Value>,
    listing_failure: Option<u16>,
    candidates: HashMap<String, Vec<Value>>,
    failures: HashMap<String, u16>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeGateway {
    pub(super) fn with_opening(mut self, id: &str, name: &str, status: &str) -> Self {
        self.openings
            .push(json!({"id": id, "name": name, "status": status}));
        self
    }

    pub(super) fn with_candidates(mut self, opening_id: &str, candidates: Vec<Value>) -> Self {
        self.candidates.insert(opening_id.to_string(), candidates);
        self
    }

    pub(super) fn failing_for(mut self, opening_id: &str, status: u16) -> Self {
        self.failures.insert(opening_id.to_string(), status);
        self
    }

    pub(super) fn failing_listing(mut self, status: u16) -> Self {
        self.listing_failure = Some(status);
        self
    }

    pub(super) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls mutex poisoned").push(call);
    }
}

impl HiringGateway for FakeGateway {
    fn list_openings(&self) -> Result<Vec<Value>, HiringApiError> {
        self.record("openings".to_string());
        match self.listing_failure {
            Some(status) => Err(HiringApiError::Status {
                status,
                body: "listing unavailable".to_string(),
            }),
            None => Ok(self.openings.clone()),
        }
    }

    fn list_candidates(
        &self,
        opening_id: &str,
        range: &DateRange,
    ) -> Result<Vec<Value>, HiringApiError> {
        self.record(format!(
            "candidates:{opening_id}:{}:{}",
            range.start_param(),
            range.end_param()
        ));
        if let Some(status) = self.failures.get(opening_id) {
            return Err(HiringApiError::Status {
                status: *status,
                body: format!("opening {opening_id} exploded"),
            });
        }
        Ok(self.candidates.get(opening_id).cloned().unwrap_or_default())
    }
}

/// Provider handing out clones of one fake; clones share the call log.
#[derive(Debug, Clone)]
pub(super) struct FakeProvider(pub(super) FakeGateway);

impl GatewayProvider for FakeProvider {
    type Gateway = FakeGateway;

    fn connect(&self) -> Result<Self::Gateway, HiringApiError> {
        Ok(self.0.clone())
    }
}

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn request(filter: ReviewFilter) -> CollectionRequest {
    CollectionRequest {
        start_date: date(2025, 3, 1),
        end_date: Some(date(2025, 3, 31)),
        selection: OpeningSelection::All,
        filter,
    }
}

pub(super) fn alice() -> Value {
    json!({
        "id": "1",
        "name": "Alice",
        "gender": "female",
        "email": "alice@example.com",
        "evaluations": [{"content": "<p>Great <b>fit</b></p>"}],
        "form": [{"id": "f1", "value": "Yes"}],
        "cvs": ["alice.pdf", "alice-2019.pdf"]
    })
}

pub(super) fn bob() -> Value {
    json!({
        "id": "2",
        "name": "Bob",
        "evaluations": [],
        "form": null
    })
}

/// The two-candidate backend opening used across scenarios.
pub(super) fn backend_gateway() -> FakeGateway {
    FakeGateway::default()
        .with_opening("42", "Backend Engineer", "10")
        .with_candidates("42", vec![alice(), bob()])
}
