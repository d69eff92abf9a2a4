use super::{Collection, FixtureError, FixtureGraph};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

fn write_json<T: Serialize>(dir: &Path, collection: Collection, rows: &[T]) -> Result<(), FixtureError> {
    let path = dir.join(collection.file_name());
    let body = serde_json::to_string_pretty(rows)?;
    fs::write(&path, body).map_err(|source| FixtureError::Io {
        path: path.clone(),
        source,
    })?;
    info!("Wrote {} ({} items)", collection.file_name(), rows.len());
    Ok(())
}

/// Writes the six fixture files into `dir`, creating it if needed.
pub fn write_fixtures(dir: &Path, graph: &FixtureGraph) -> Result<(), FixtureError> {
    fs::create_dir_all(dir).map_err(|source| FixtureError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    write_json(dir, Collection::Teachers, &graph.teachers)?;
    write_json(dir, Collection::Students, &graph.students)?;
    write_json(dir, Collection::Batches, &graph.batches)?;
    write_json(dir, Collection::Assignments, &graph.assignments)?;
    write_json(dir, Collection::Notes, &graph.notes)?;
    write_json(dir, Collection::Messages, &graph.messages)?;

    info!("--- SUMMARY ---");
    info!("Teachers: {}", graph.teachers.len());
    info!("Students: {}", graph.students.len());
    info!("Batches: {}", graph.batches.len());
    info!("Assignments: {}", graph.assignments.len());
    info!("Notes: {}", graph.notes.len());
    info!("Messages: {}", graph.messages.len());
    info!("Output directory: {}", dir.display());
    Ok(())
}
