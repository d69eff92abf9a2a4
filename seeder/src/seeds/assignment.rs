use super::{HeavyContext, iso};
use crate::config::SeedConfig;
use crate::models::Assignment;
use crate::random::RandomSource;
use crate::transport::{ApiClient, Credentials, Transport};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

/// Assignment `i` for a random batch of the heavy teacher, tied to a random
/// student with probability `link_ratio`. `None` when there are no batches.
pub fn build_assignment<R: RandomSource>(
    i: usize,
    ctx: &HeavyContext,
    link_ratio: f64,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Option<Assignment> {
    let batch_id = rng.pick(&ctx.batch_ids)?.clone();
    let student_id = if rng.chance(link_ratio) {
        rng.pick(&ctx.students).map(|s| s.id.clone())
    } else {
        None
    };

    Some(Assignment {
        id: None,
        teacher_id: None,
        publish_date: iso(now),
        submission_date: iso(now + Duration::days(7)),
        batch_id,
        student_id,
        title: format!("Assignment {i}"),
        details: format!("Auto assignment {i}"),
        attachment_urls: vec![format!("https://example.com/assignment{i}.pdf")],
    })
}

pub async fn create_assignments<T: Transport, R: RandomSource>(
    client: &ApiClient<T>,
    cfg: &SeedConfig,
    ctx: &HeavyContext,
    credentials: &mut Credentials,
    rng: &mut R,
) -> usize {
    if ctx.batch_ids.is_empty() {
        warn!("{} owns no batches, skipping assignments", ctx.teacher.name);
        return 0;
    }

    let mut created = 0;
    for i in 1..=cfg.special_assignments {
        let Some(assignment) =
            build_assignment(i, ctx, cfg.student_link_ratio, rng, Utc::now())
        else {
            continue;
        };
        let label = format!("Assignment {i}");
        if client
            .post_json(&cfg.paths.assignments, &assignment, &label, Some(&mut *credentials))
            .await
            .is_some()
        {
            created += 1;
        }
    }

    info!("Created {created}/{} assignment(s)", cfg.special_assignments);
    created
}
