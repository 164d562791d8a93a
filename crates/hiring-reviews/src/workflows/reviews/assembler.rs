use serde_json::{Map, Value};
use tracing::warn;

use super::attachment::primary_attachment;
use super::domain::{
    CandidateRecord, JobOpening, CV_FIELD, EVALUATIONS_FIELD, FORM_FIELD, JOB_FIELD,
    OPENING_ID_FIELD, REVIEW_FIELD,
};
use super::form::flatten_form;
use super::review::extract_review;

/// Records assembled from one opening's batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssembledBatch {
    pub records: Vec<CandidateRecord>,
    /// Entries that were not JSON objects and produced no record.
    pub skipped: usize,
}

/// Turns one opening's raw candidate batch into records.
///
/// An empty batch yields a single placeholder row carrying only the opening
/// id, so "fetched, nobody applied" stays distinguishable from a failed fetch
/// (which never reaches the assembler).
pub fn assemble_batch(opening: &JobOpening, candidates: Vec<Value>) -> AssembledBatch {
    if candidates.is_empty() {
        return AssembledBatch {
            records: vec![CandidateRecord::placeholder(&opening.id)],
            skipped: 0,
        };
    }

    let mut batch = AssembledBatch::default();
    for raw in candidates {
        match assemble_candidate(opening, raw) {
            Some(record) => batch.records.push(record),
            None => batch.skipped += 1,
        }
    }

    if batch.skipped > 0 {
        warn!(
            opening_id = %opening.id,
            skipped = batch.skipped,
            "skipping candidate entries that are not objects"
        );
    }
    batch
}

/// Flattens one raw candidate object. Non-object entries are dropped.
pub fn assemble_candidate(opening: &JobOpening, raw: Value) -> Option<CandidateRecord> {
    let Value::Object(raw) = raw else {
        return None;
    };

    let form = flatten_form(raw.get(FORM_FIELD));
    let review = extract_review(raw.get(EVALUATIONS_FIELD));

    let mut fields = Map::with_capacity(raw.len() + 3);
    for (key, value) in raw {
        match key.as_str() {
            FORM_FIELD | EVALUATIONS_FIELD => {}
            CV_FIELD => {
                let primary = primary_attachment(Some(&value)).unwrap_or(Value::Null);
                fields.insert(key, primary);
            }
            _ => {
                fields.insert(key, value);
            }
        }
    }

    fields.insert(
        OPENING_ID_FIELD.to_string(),
        Value::String(opening.id.clone()),
    );
    fields.insert(
        REVIEW_FIELD.to_string(),
        review.map(Value::String).unwrap_or(Value::Null),
    );
    fields.insert(JOB_FIELD.to_string(), Value::String(opening.name.clone()));

    Some(CandidateRecord::from_parts(fields, form))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn opening() -> JobOpening {
        JobOpening {
            id: "42".to_string(),
            name: "Backend Engineer".to_string(),
            status: "10".to_string(),
        }
    }

    #[test]
    fn empty_batch_becomes_a_placeholder() {
        let batch = assemble_batch(&opening(), Vec::new());
        assert_eq!(batch.skipped, 0);
        let records = batch.records;
        assert_eq!(records.len(), 1);
        assert!(records[0].is_placeholder());
        assert_eq!(records[0].opening_id(), Some("42"));
    }

    #[test]
    fn merges_review_attachment_form_and_opening() {
        let raw = json!({
            "id": "1",
            "name": "Alice",
            "email": "alice@example.com",
            "cvs": ["alice.pdf", "alice-old.pdf"],
            "evaluations": [{"content": "<p>Great <b>fit</b></p>"}],
            "form": [{"id": "f1", "value": "Yes"}]
        });

        let record = assemble_candidate(&opening(), raw).expect("object candidate");
        assert_eq!(record.field("name"), Some(&json!("Alice")));
        assert_eq!(record.field("cvs"), Some(&json!("alice.pdf")));
        assert_eq!(record.review(), Some("Great fit"));
        assert_eq!(record.opening_id(), Some("42"));
        assert_eq!(record.field("job"), Some(&json!("Backend Engineer")));
        assert_eq!(record.form_answer("f1"), Some(&json!("Yes")));
        assert!(record.field("form").is_none());
        assert!(record.field("evaluations").is_none());
    }

    #[test]
    fn keeps_api_field_order_before_opening_columns() {
        let raw = json!({"name": "Bob", "id": "2", "phone": "0900", "cvs": []});
        let record = assemble_candidate(&opening(), raw).expect("object candidate");
        let keys: Vec<_> = record.fields().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["name", "id", "phone", "cvs", "opening_id", "review", "job"]
        );
        assert!(record.field("cvs").is_none());
        assert!(!record.has_review());
    }

    #[test]
    fn drops_entries_that_are_not_objects() {
        let batch = assemble_batch(
            &opening(),
            vec![json!("bad"), json!({"id": "3"}), json!(null)],
        );
        assert_eq!(batch.skipped, 2);
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].field("id"), Some(&json!("3")));
        assert!(!batch.records[0].is_placeholder());
    }

    #[test]
    fn candidates_without_id_are_kept() {
        let batch = assemble_batch(
            &opening(),
            vec![
                json!({"name": "NoId", "evaluations": [{"content": "<p>reviewed</p>"}]}),
                json!({"id": null, "name": "NullId"}),
            ],
        );
        assert_eq!(batch.records.len(), 2);
        assert!(batch.records.iter().all(|record| !record.is_placeholder()));
        assert_eq!(batch.records[0].review(), Some("reviewed"));
    }
}
