use super::Participant;
use crate::config::SeedConfig;
use crate::models::{Batch, Teacher};
use crate::transport::{ApiClient, Transport};
use serde_json::json;
use tracing::{info, warn};

/// Enrols every student into `teacher`'s batches in turn
/// (`POST /batchStudents`). Returns how many enrolments the API accepted.
pub async fn enroll_round_robin<T: Transport>(
    client: &ApiClient<T>,
    cfg: &SeedConfig,
    teacher: &mut Teacher,
    students: &[Participant],
    batches: &[Batch],
) -> usize {
    let own: Vec<&Batch> = batches.iter().filter(|b| b.is_owned_by(&teacher.id)).collect();
    if own.is_empty() {
        warn!("No batches found for {}", teacher.user_name());
        return 0;
    }

    info!("Assigning {} existing student(s) to batches", students.len());
    let mut enrolled = 0;

    for (i, student) in students.iter().enumerate() {
        let batch = own[i % own.len()];
        let body = json!({ "batchId": batch.id, "studentId": student.id });
        let label = format!("Assign {} -> {}", student.name, batch.name);
        if client
            .post(&cfg.paths.batch_students, &body, &label, Some(&mut teacher.credentials))
            .await
            .is_some()
        {
            enrolled += 1;
        }
    }

    info!(
        "Assigned {enrolled}/{} student(s) to {} batch(es)",
        students.len(),
        own.len()
    );
    enrolled
}
