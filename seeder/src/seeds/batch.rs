use crate::config::SeedConfig;
use crate::distribution::plan_batches;
use crate::models::{Batch, NewBatch, Teacher};
use crate::token::record_id;
use crate::transport::{ApiClient, Transport};
use tracing::{info, warn};

pub fn new_batch(counter: usize, teacher: &Teacher) -> NewBatch {
    NewBatch {
        name: format!("Batch {counter} ({})", teacher.user_name()),
        course: "General Studies".into(),
        subject: "Mathematics".into(),
        description: "Auto-created batch".into(),
        payment_frequency: "Monthly".into(),
        payment_amount: 1000,
        teacher_id: teacher.id.clone(),
    }
}

fn created(id: String, draft: NewBatch) -> Batch {
    Batch {
        id,
        name: draft.name,
        teacher_id: Some(draft.teacher_id),
        course: Some(draft.course),
        subject: Some(draft.subject),
        description: Some(draft.description),
        payment_frequency: Some(draft.payment_frequency),
        payment_amount: Some(draft.payment_amount),
        payment_day_of_month: None,
        members: None,
        meta: None,
    }
}

/// `count` local placeholders named after the `existing` batches before them.
pub fn unassigned_batches(count: usize, existing: usize) -> Vec<Batch> {
    (1..=count)
        .map(|k| {
            Batch::unassigned(
                format!("null-batch-{k}"),
                format!("Unassigned Batch {}", existing + k),
            )
        })
        .collect()
}

/// Creates teacher-owned batches per [`plan_batches`], then appends the
/// unassigned placeholders.
pub async fn create_batches<T: Transport>(
    client: &ApiClient<T>,
    cfg: &SeedConfig,
    roster: &mut [Teacher],
) -> Vec<Batch> {
    let special = cfg.special_teacher.locate(roster.iter().map(Teacher::user_name));
    let plan = plan_batches(
        roster.len(),
        special,
        cfg.special_batches,
        cfg.batches_per_teacher,
        cfg.active_batch_cap,
    );

    let mut batches = Vec::new();
    let mut counter = 1;

    for (teacher, &count) in roster.iter_mut().zip(plan.iter()) {
        for _ in 0..count {
            let draft = new_batch(counter, teacher);
            let label = format!("Batch {counter}");
            let response = client
                .post_json(&cfg.paths.batches, &draft, &label, Some(&mut teacher.credentials))
                .await;

            match response {
                Some(body) => match record_id(&body, "batch") {
                    Some(id) => batches.push(created(id, draft)),
                    None => warn!("Batch {counter} response carried no id, skipping"),
                },
                None => warn!("Failed to create batch {counter} for {}", teacher.user_name()),
            }
            counter += 1;
        }
    }

    let owned = batches.len();
    batches.extend(unassigned_batches(cfg.null_batches, owned));
    info!(
        "Created {} batch(es): {owned} owned, {} unassigned",
        batches.len(),
        cfg.null_batches
    );
    batches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_continue_numbering() {
        let b = unassigned_batches(3, 5);
        let names: Vec<_> = b.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(
            names,
            ["Unassigned Batch 6", "Unassigned Batch 7", "Unassigned Batch 8"]
        );
        assert_eq!(b[0].id, "null-batch-1");
        assert!(b.iter().all(|b| b.teacher_id.is_none() && b.members.is_none()));
    }
}
