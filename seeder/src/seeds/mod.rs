//! One module per entity. Each exposes a pure payload builder (shared with
//! fixture mode) and an async stage that pushes records through the
//! [`ApiClient`](crate::transport::ApiClient).

pub mod assignment;
pub mod batch;
pub mod enrollment;
pub mod message;
pub mod note;
pub mod student;
pub mod teacher;

use crate::models::{Batch, Student, Teacher};
use chrono::{DateTime, SecondsFormat, Utc};

/// Timestamp format the API stores (`2025-01-31T12:00:00.000Z`).
pub fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Keeps only ASCII letters and digits.
pub(crate) fn alphanumeric(s: &str) -> String {
    s.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Someone who can appear on either end of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    pub name: String,
}

/// The heavy teacher together with the batches and students it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeavyContext {
    pub teacher: Participant,
    pub batch_ids: Vec<String>,
    pub students: Vec<Participant>,
}

impl HeavyContext {
    /// Narrows the run's students and batches down to `teacher`'s.
    pub fn for_teacher(teacher: &Teacher, students: &[Student], batches: &[Batch]) -> Self {
        Self {
            teacher: Participant {
                id: teacher.id.clone(),
                name: teacher.user_name().to_string(),
            },
            batch_ids: batches
                .iter()
                .filter(|b| b.is_owned_by(&teacher.id))
                .map(|b| b.id.clone())
                .collect(),
            students: students
                .iter()
                .filter(|s| s.teacher_id == teacher.id)
                .map(|s| Participant {
                    id: s.id.clone(),
                    name: s.user_name().to_string(),
                })
                .collect(),
        }
    }
}

/// Counts of dependent records the API accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeavyReport {
    pub assignments: usize,
    pub notes: usize,
    pub messages: usize,
}
