use std::collections::HashSet;

use serde_json::{Map, Value};

use super::domain::{value_text, CandidateRecord};

/// Prefix given to a form column whose identifier clashes with another column.
pub const FORM_COLUMN_PREFIX: &str = "form:";

/// Answers of one candidate's custom form, keyed by field identifier.
///
/// Anything other than a list contributes no answers. Pairs without an
/// identifier are skipped; a repeated identifier keeps the later value.
pub fn flatten_form(form: Option<&Value>) -> Map<String, Value> {
    let mut answers = Map::new();
    let Some(pairs) = form.and_then(Value::as_array) else {
        return answers;
    };

    for pair in pairs {
        let Some(id) = pair.get("id").and_then(value_text) else {
            continue;
        };
        let value = pair.get("value").cloned().unwrap_or(Value::Null);
        answers.insert(id, value);
    }

    answers
}

/// A dynamic column discovered from form answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormColumn {
    pub field_id: String,
    pub column: String,
}

/// Union of form identifiers observed across a batch, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSchema {
    columns: Vec<FormColumn>,
}

impl FormSchema {
    /// First pass over the batch. `reserved` are the core column names a form
    /// column must not shadow. Every emitted column name is unique.
    pub fn discover<'a, I>(records: I, reserved: &[String]) -> Self
    where
        I: IntoIterator<Item = &'a CandidateRecord>,
    {
        let mut taken: HashSet<String> = reserved.iter().cloned().collect();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut columns = Vec::new();

        for record in records {
            for field_id in record.form_answers().keys() {
                if !seen.insert(field_id.as_str()) {
                    continue;
                }
                let column = unique_column(field_id, &taken);
                taken.insert(column.clone());
                columns.push(FormColumn {
                    field_id: field_id.clone(),
                    column,
                });
            }
        }

        Self { columns }
    }

    pub fn columns(&self) -> &[FormColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Second pass for one record: a cell per discovered column, `None` where
    /// the record did not answer.
    pub fn cells(&self, record: &CandidateRecord) -> Vec<Option<Value>> {
        self.columns
            .iter()
            .map(|column| record.form_answer(&column.field_id).cloned())
            .collect()
    }
}

/// `field_id` itself when free, otherwise the prefixed name, then numbered
/// variants of it.
fn unique_column(field_id: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(field_id) {
        return field_id.to_string();
    }

    let prefixed = format!("{FORM_COLUMN_PREFIX}{field_id}");
    if !taken.contains(&prefixed) {
        return prefixed;
    }

    let mut n = 2;
    loop {
        let candidate = format!("{prefixed}#{n}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
