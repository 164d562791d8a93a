use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::Value;

use super::domain::{value_text, CandidateRecord, ReviewFilter, JOB_FIELD, REVIEW_FIELD};
use super::form::FormSchema;

/// Columns shown when a table is rendered for people rather than exported.
pub const DISPLAY_COLUMNS: &[&str] = &["id", "name", "gender", "job", "email", "phone", "review"];

/// Flat table of candidate rows. `None` is the "no value" marker.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CandidateTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<Value>>>,
}

impl CandidateTable {
    /// Unions `records` into one table and keeps the rows `filter` accepts.
    ///
    /// Columns are discovered over every record, filtered or not: core fields
    /// in first-seen order, then one column per form identifier.
    pub fn build(records: &[CandidateRecord], filter: ReviewFilter) -> Self {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut core_columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.fields().keys() {
                if seen.insert(key.as_str()) {
                    core_columns.push(key.clone());
                }
            }
        }

        let schema = FormSchema::discover(records, &core_columns);

        let rows = records
            .iter()
            .filter(|record| filter.matches(record))
            .map(|record| {
                let mut row: Vec<Option<Value>> = core_columns
                    .iter()
                    .map(|column| record.field(column).cloned())
                    .collect();
                row.extend(schema.cells(record));
                row
            })
            .collect();

        let mut columns = core_columns;
        columns.extend(schema.columns().iter().map(|column| column.column.clone()));

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<Value>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)?.as_ref()
    }

    pub fn has_review(&self, row: usize) -> bool {
        self.cell(row, REVIEW_FIELD).is_some()
    }

    /// Row count per job, ordered by job name. Rows without a job are left out.
    pub fn job_statistics(&self) -> Vec<JobStatistic> {
        let Some(index) = self.column_index(JOB_FIELD) else {
            return Vec::new();
        };

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for row in &self.rows {
            if let Some(job) = row.get(index).and_then(Option::as_ref).and_then(value_text) {
                *counts.entry(job).or_default() += 1;
            }
        }

        counts
            .into_iter()
            .map(|(job, candidate_count)| JobStatistic {
                job,
                candidate_count,
            })
            .collect()
    }

    /// Projection onto [`DISPLAY_COLUMNS`], skipping the ones this batch lacks.
    pub fn display_view(&self) -> CandidateTable {
        let indices: Vec<usize> = DISPLAY_COLUMNS
            .iter()
            .filter_map(|column| self.column_index(column))
            .collect();

        CandidateTable {
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStatistic {
    pub job: String,
    pub candidate_count: usize,
}
