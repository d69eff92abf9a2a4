use super::{Collection, FixtureError};
use crate::config::TableNames;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

/// Most items a single `BatchWriteItem` call accepts.
pub const CHUNK_SIZE: usize = 25;

type Item = Map<String, Value>;

/// A key-value store that takes up to [`CHUNK_SIZE`] puts per call.
#[async_trait]
pub trait TableWriter: Send + Sync {
    /// Writes `items` into `table` and returns how many the store left
    /// unprocessed.
    async fn batch_write(&self, table: &str, items: &[Item]) -> Result<usize, FixtureError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub written: usize,
    pub failed_chunks: usize,
    pub unprocessed: usize,
    pub skipped_files: usize,
}

/// Parses a fixture file: a JSON array whose entries are all objects.
pub fn read_items(path: &Path) -> Result<Vec<Item>, FixtureError> {
    let raw = fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file = path.display().to_string();

    match serde_json::from_str::<Value>(&raw)? {
        Value::Array(entries) => entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| match entry {
                Value::Object(map) => Ok(map),
                _ => Err(FixtureError::NotAnObject {
                    file: file.clone(),
                    index,
                }),
            })
            .collect(),
        _ => Err(FixtureError::NotAnObject { file, index: 0 }),
    }
}

async fn load_table<W: TableWriter + ?Sized>(
    table: &str,
    items: &[Item],
    writer: &W,
    report: &mut LoadReport,
) {
    let total = items.len();
    info!("Seeding {total} records into table {table}");

    for (k, chunk) in items.chunks(CHUNK_SIZE).enumerate() {
        match writer.batch_write(table, chunk).await {
            Ok(unprocessed) => {
                let done = ((k + 1) * CHUNK_SIZE).min(total);
                info!("Inserted {done}/{total} into {table}");
                if unprocessed > 0 {
                    warn!("{unprocessed} item(s) left unprocessed by {table}");
                }
                report.written += chunk.len().saturating_sub(unprocessed);
                report.unprocessed += unprocessed;
            }
            Err(err) => {
                error!("Error inserting batch into {table}: {err}");
                report.failed_chunks += 1;
            }
        }
    }
}

/// Loads every fixture file found in `dir` into its table.
///
/// Missing or malformed files are skipped with a warning; a failed chunk is
/// logged and the next chunk still goes out.
pub async fn load_fixtures<W: TableWriter + ?Sized>(
    dir: &Path,
    tables: &TableNames,
    writer: &W,
) -> LoadReport {
    let mut report = LoadReport::default();

    for collection in Collection::ALL {
        let path = dir.join(collection.file_name());
        if !path.exists() {
            warn!("File not found: {}", path.display());
            report.skipped_files += 1;
            continue;
        }

        let items = match read_items(&path) {
            Ok(items) => items,
            Err(err) => {
                warn!("Skipping {}: {err}", path.display());
                report.skipped_files += 1;
                continue;
            }
        };

        load_table(collection.table(tables), &items, writer, &mut report).await;
    }

    info!(
        "Loaded {} item(s); {} failed chunk(s), {} unprocessed, {} file(s) skipped",
        report.written, report.failed_chunks, report.unprocessed, report.skipped_files
    );
    report
}
