use super::{HeavyContext, Participant, iso};
use crate::config::SeedConfig;
use crate::models::{Message, Party, Reply};
use crate::random::RandomSource;
use crate::transport::{ApiClient, Credentials, Transport};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

const ATTACHMENT: &str = "http://example.com/attachment1.pdf";

/// Message `i` between the heavy teacher and one of its students. A coin
/// flip decides who sends. `None` when the teacher has no students.
pub fn build_message<R: RandomSource>(
    i: usize,
    ctx: &HeavyContext,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Option<Message> {
    let student = rng.pick(&ctx.students)?;
    let batch_id = rng.pick(&ctx.batch_ids).cloned();
    let teacher_sends = rng.chance(0.5);

    let ((sender, sender_type), (receiver, receiver_type)) = if teacher_sends {
        ((&ctx.teacher, Party::Teacher), (student, Party::Student))
    } else {
        ((student, Party::Student), (&ctx.teacher, Party::Teacher))
    };

    Some(compose(
        i,
        (sender, sender_type),
        (receiver, receiver_type),
        batch_id,
        now,
    ))
}

fn compose(
    i: usize,
    (sender, sender_type): (&Participant, Party),
    (receiver, receiver_type): (&Participant, Party),
    batch_id: Option<String>,
    now: DateTime<Utc>,
) -> Message {
    Message {
        id: None,
        subject: format!("Follow Up For All Doubts {i}"),
        content: format!("Message {i} from {}", sender.name),
        sender: sender.id.clone(),
        sender_name: sender.name.clone(),
        sender_type,
        receiver: receiver.id.clone(),
        receiver_name: receiver.name.clone(),
        receiver_type,
        batch_id,
        timestamp: iso(now),
        attachment_urls: vec![ATTACHMENT.into()],
        replies: Vec::new(),
    }
}

/// A reply on `message` from its receiver (`by_receiver`) or its sender,
/// carrying that party's type.
pub fn build_reply(message: &Message, by_receiver: bool, content: String, at: DateTime<Utc>) -> Reply {
    let (sender, sender_name, sender_type) = if by_receiver {
        (&message.receiver, &message.receiver_name, message.receiver_type)
    } else {
        (&message.sender, &message.sender_name, message.sender_type)
    };

    Reply {
        content,
        sender: sender.clone(),
        sender_type,
        sender_name: sender_name.clone(),
        timestamp: iso(at),
        attachment_urls: Vec::new(),
    }
}

pub async fn create_messages<T: Transport, R: RandomSource>(
    client: &ApiClient<T>,
    cfg: &SeedConfig,
    ctx: &HeavyContext,
    credentials: &mut Credentials,
    rng: &mut R,
) -> usize {
    if ctx.students.is_empty() {
        warn!("{} has no students, skipping messages", ctx.teacher.name);
        return 0;
    }

    let mut created = 0;
    for i in 1..=cfg.special_messages {
        let Some(message) = build_message(i, ctx, rng, Utc::now()) else {
            continue;
        };
        if client
            .post_json(&cfg.paths.messages, &message, &format!("Message {i}"), Some(&mut *credentials))
            .await
            .is_some()
        {
            created += 1;
        }
    }

    info!("Created {created}/{} message(s)", cfg.special_messages);
    created
}
