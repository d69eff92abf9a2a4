//! Offline mode: build the whole entity graph in memory, dump it to JSON
//! files, and bulk-load those files into DynamoDB.

mod dynamo;
mod generator;
mod loader;
mod writer;

pub use dynamo::{DynamoTableWriter, json_to_attribute, to_item};
pub use generator::{FixtureGraph, generate};
pub use loader::{CHUNK_SIZE, LoadReport, TableWriter, load_fixtures, read_items};
pub use writer::write_fixtures;

use crate::config::TableNames;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("{file}: expected a JSON array of objects (entry {index})")]
    NotAnObject { file: String, index: usize },
    #[error("store rejected batch: {0}")]
    Store(String),
    #[error("fixture generation did not complete, nothing written")]
    Aborted,
}

/// One fixture file and the table it is loaded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Teachers,
    Students,
    Batches,
    Assignments,
    Notes,
    Messages,
}

impl Collection {
    /// Write and load order.
    pub const ALL: [Collection; 6] = [
        Collection::Teachers,
        Collection::Students,
        Collection::Batches,
        Collection::Assignments,
        Collection::Notes,
        Collection::Messages,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Collection::Teachers => "teachers.json",
            Collection::Students => "students.json",
            Collection::Batches => "batches.json",
            Collection::Assignments => "assignments.json",
            Collection::Notes => "notes.json",
            Collection::Messages => "messages.json",
        }
    }

    pub fn table(self, tables: &TableNames) -> &str {
        match self {
            Collection::Teachers => &tables.teachers,
            Collection::Students => &tables.students,
            Collection::Batches => &tables.batches,
            Collection::Assignments => &tables.assignments,
            Collection::Notes => &tables.notes,
            Collection::Messages => &tables.messages,
        }
    }
}
