use super::{HeavyContext, iso};
use crate::config::SeedConfig;
use crate::models::Note;
use crate::random::RandomSource;
use crate::transport::{ApiClient, Credentials, Transport};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Same draw order as [`build_assignment`](super::assignment::build_assignment):
/// batch, link chance, student.
pub fn build_note<R: RandomSource>(
    i: usize,
    ctx: &HeavyContext,
    link_ratio: f64,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Option<Note> {
    let batch_id = rng.pick(&ctx.batch_ids)?.clone();
    let student_id = if rng.chance(link_ratio) {
        rng.pick(&ctx.students).map(|s| s.id.clone())
    } else {
        None
    };

    Some(Note {
        id: None,
        teacher_id: None,
        publish_date: iso(now),
        title: format!("Note {i}"),
        list_urls: vec![format!("https://example.com/note{i}.pdf")],
        content: format!("Auto note {i}"),
        student_id,
        batch_id,
    })
}

pub async fn create_notes<T: Transport, R: RandomSource>(
    client: &ApiClient<T>,
    cfg: &SeedConfig,
    ctx: &HeavyContext,
    credentials: &mut Credentials,
    rng: &mut R,
) -> usize {
    if ctx.batch_ids.is_empty() {
        warn!("{} owns no batches, skipping notes", ctx.teacher.name);
        return 0;
    }

    let mut created = 0;
    for i in 1..=cfg.special_notes {
        let Some(note) = build_note(i, ctx, cfg.student_link_ratio, rng, Utc::now()) else {
            continue;
        };
        if client
            .post_json(&cfg.paths.notes, &note, &format!("Note {i}"), Some(&mut *credentials))
            .await
            .is_some()
        {
            created += 1;
        }
    }

    info!("Created {created}/{} note(s)", cfg.special_notes);
    created
}
