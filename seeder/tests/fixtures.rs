mod support;

use seeder::config::SeedConfig;
use seeder::fixture::read_items;
use seeder::runner::{run_generate, run_load};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use support::{RecordingWriter, small_config};

fn sixty_students() -> SeedConfig {
    SeedConfig {
        total_students: 60,
        special_students: 20,
        ..small_config()
    }
}

#[tokio::test]
async fn generate_writes_six_consistent_files() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    let graph = run_generate(&small_config(), &out).await.unwrap();

    for file in [
        "teachers.json",
        "students.json",
        "batches.json",
        "assignments.json",
        "notes.json",
        "messages.json",
    ] {
        assert!(out.join(file).exists(), "{file} missing");
    }

    let students = read_items(&out.join("students.json")).unwrap();
    let batches = read_items(&out.join("batches.json")).unwrap();
    assert_eq!(students.len(), graph.students.len());

    let owner: HashMap<&str, &str> = students
        .iter()
        .map(|s| (s["id"].as_str().unwrap(), s["teacherId"].as_str().unwrap()))
        .collect();

    for batch in &batches {
        let Some(members) = batch["members"].as_array() else {
            assert!(batch["members"].is_null());
            continue;
        };
        for member in members {
            let id = member.as_str().unwrap();
            assert_eq!(Some(owner[id]), batch["teacherId"].as_str());
            let student = students.iter().find(|s| s["id"] == id).unwrap();
            assert_eq!(student["batchId"], batch["id"]);
        }
        assert!(batch["meta"]["createdAt"].is_string());
    }

    let teachers = read_items(&out.join("teachers.json")).unwrap();
    let heavy: Vec<_> = teachers
        .iter()
        .filter(|t| t["meta"]["isHeavy"] == Value::Bool(true))
        .collect();
    assert_eq!(heavy.len(), 1);

    for message in read_items(&out.join("messages.json")).unwrap() {
        assert!(!(message["senderType"] == "TEACHER" && message["receiverType"] == "TEACHER"));
        assert!(message["replies"].is_array());
    }

    let notes = fs::read_to_string(out.join("notes.json")).unwrap();
    assert!(notes.contains("\"Title\""));
}

#[tokio::test]
async fn load_chunks_by_25_and_survives_a_failed_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = sixty_students();
    run_generate(&cfg, dir.path()).await.unwrap();

    // chunk 0 is the teachers table; chunk 2 is the second students chunk
    let writer = RecordingWriter::new(vec![2]);
    let report = run_load(&cfg, dir.path(), &writer).await;

    assert_eq!(writer.sizes_for("Teachers"), vec![3]);
    assert_eq!(writer.sizes_for("Students"), vec![25, 25, 10]);
    assert!(!writer.sizes_for("Messages").is_empty());
    assert_eq!(report.failed_chunks, 1);
    assert_eq!(report.skipped_files, 0);

    let total: usize = writer.chunks.lock().unwrap().iter().map(|(_, c)| c.len()).sum();
    assert_eq!(report.written, total - 25);
}

#[tokio::test]
async fn missing_files_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = small_config();
    run_generate(&cfg, dir.path()).await.unwrap();
    fs::remove_file(dir.path().join("notes.json")).unwrap();
    fs::write(dir.path().join("messages.json"), "{\"not\": \"an array\"}").unwrap();

    let writer = RecordingWriter::new(vec![]);
    let report = run_load(&cfg, dir.path(), &writer).await;

    assert_eq!(report.skipped_files, 2);
    assert!(writer.sizes_for("Notes").is_empty());
    assert!(writer.sizes_for("Messages").is_empty());
    assert!(!writer.sizes_for("Assignments").is_empty());
}
