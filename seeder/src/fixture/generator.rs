use crate::config::SeedConfig;
use crate::distribution::{plan_batches, plan_students};
use crate::models::{
    Assignment, Batch, BatchMeta, Message, Note, Student, StudentProfile, TeacherMeta,
    TeacherProfile, TeacherRecord,
};
use crate::random::{RandomSource, SeededRandom};
use crate::seeds::assignment::build_assignment;
use crate::seeds::message::{build_message, build_reply};
use crate::seeds::note::build_note;
use crate::seeds::student::student_profile;
use crate::seeds::teacher::teacher_profile;
use crate::seeds::{HeavyContext, Participant, iso};
use chrono::{DateTime, Duration, Utc};
use fake::Fake;
use fake::faker::address::en::{CityName, StateAbbr, StreetName};
use fake::faker::name::en::{FirstName, LastName};
use rand::Rng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use tracing::{info, warn};

const COURSES: [&str; 5] = ["Mathematics", "Science", "English", "History", "Computer"];
const SUBJECTS: [&str; 5] = ["Algebra", "Biology", "Grammar", "World History", "Coding"];
const FREQUENCIES: [&str; 3] = ["monthly", "quarterly", "yearly"];
const GENDERS: [&str; 3] = ["male", "female", "do not reveal"];

/// Everything `generate` produces, one vector per fixture file.
#[derive(Debug, Clone, Default)]
pub struct FixtureGraph {
    pub teachers: Vec<TeacherRecord>,
    pub students: Vec<Student>,
    pub batches: Vec<Batch>,
    pub assignments: Vec<Assignment>,
    pub notes: Vec<Note>,
    pub messages: Vec<Message>,
}

/// Shared counter behind `b<n>`, `a<n>`, `n<n>` and `m<n>` ids.
struct IdSequence(usize);

impl IdSequence {
    fn next(&mut self, prefix: char) -> String {
        let id = format!("{prefix}{}", self.0);
        self.0 += 1;
        id
    }
}

/// Builds the full entity graph without touching the network.
///
/// Structure (counts, memberships, links) follows the same distributor as
/// the API run; names, addresses and bank details are faker text.
pub fn generate(cfg: &SeedConfig, rng: &mut SeededRandom, now: DateTime<Utc>) -> FixtureGraph {
    let mut ids = IdSequence(1);

    let mut teachers: Vec<TeacherRecord> = (1..=cfg.total_teachers)
        .map(|t| {
            let mut profile = teacher_profile(cfg, t);
            disguise_teacher(&mut profile, rng.rng());
            TeacherRecord {
                id: format!("t{t}"),
                profile,
                meta: TeacherMeta { is_heavy: false },
            }
        })
        .collect();

    let special = cfg
        .special_teacher
        .locate(teachers.iter().map(|t| t.profile.user_name.as_str()));
    match special {
        Some(idx) => teachers[idx].meta.is_heavy = true,
        None => warn!("Special teacher not found, generating without heavy data"),
    }

    let order: Vec<usize> = special
        .into_iter()
        .chain((0..teachers.len()).filter(|&i| Some(i) != special))
        .collect();

    let student_plan = plan_students(
        teachers.len(),
        special,
        cfg.total_students,
        cfg.special_students,
        cfg.remainder_policy,
    );

    let mut students = Vec::new();
    let mut pools: Vec<Vec<String>> = vec![Vec::new(); teachers.len()];
    let mut n = 1;
    for &idx in &order {
        let teacher = &teachers[idx];
        for i in 0..student_plan[idx] {
            let mut profile = student_profile(cfg, n, &teacher.profile.user_name, i);
            disguise_student(&mut profile, rng.rng());
            let id = format!("s{n}");
            pools[idx].push(id.clone());
            students.push(Student {
                id,
                teacher_id: teacher.id.clone(),
                batch_id: None,
                profile,
            });
            n += 1;
        }
    }

    let batch_plan = plan_batches(
        teachers.len(),
        special,
        cfg.special_batches,
        cfg.batches_per_teacher,
        cfg.active_batch_cap,
    );

    let mut batches = Vec::new();
    let mut member_of: HashMap<String, String> = HashMap::new();
    for &idx in &order {
        let policy = if Some(idx) == special {
            cfg.special_membership
        } else {
            cfg.other_membership
        };
        for k in 1..=batch_plan[idx] {
            let members = policy.take_members(&mut pools[idx], rng);
            let batch = fixture_batch(ids.next('b'), k, &teachers[idx].id, members, rng, now);
            for student_id in batch.members.iter().flatten() {
                member_of.insert(student_id.clone(), batch.id.clone());
            }
            batches.push(batch);
        }
    }

    for student in &mut students {
        student.batch_id = member_of.get(&student.id).cloned();
    }

    let mut graph = FixtureGraph {
        teachers,
        students,
        batches,
        ..FixtureGraph::default()
    };

    if let Some(idx) = special {
        let teacher = &graph.teachers[idx];
        let ctx = HeavyContext {
            teacher: Participant {
                id: teacher.id.clone(),
                name: teacher.profile.user_name.clone(),
            },
            batch_ids: graph
                .batches
                .iter()
                .filter(|b| b.is_owned_by(&teacher.id))
                .map(|b| b.id.clone())
                .collect(),
            students: graph
                .students
                .iter()
                .filter(|s| s.teacher_id == teacher.id)
                .map(|s| Participant {
                    id: s.id.clone(),
                    name: s.user_name().to_string(),
                })
                .collect(),
        };
        heavy_records(cfg, &ctx, &mut graph, &mut ids, rng, now);
    }

    info!(
        "Generated {} teachers, {} students, {} batches",
        graph.teachers.len(),
        graph.students.len(),
        graph.batches.len()
    );
    graph
}

fn heavy_records(
    cfg: &SeedConfig,
    ctx: &HeavyContext,
    graph: &mut FixtureGraph,
    ids: &mut IdSequence,
    rng: &mut SeededRandom,
    now: DateTime<Utc>,
) {
    let teacher_id = Some(ctx.teacher.id.clone());

    if ctx.batch_ids.is_empty() {
        warn!("{} owns no batches, skipping assignments and notes", ctx.teacher.name);
    } else {
        for i in 1..=cfg.special_assignments {
            let at = now - Duration::seconds(i as i64 * 10);
            if let Some(mut assignment) = build_assignment(i, ctx, cfg.student_link_ratio, rng, at) {
                assignment.id = Some(ids.next('a'));
                assignment.teacher_id = teacher_id.clone();
                graph.assignments.push(assignment);
            }
        }
        for i in 1..=cfg.special_notes {
            let at = now - Duration::seconds(i as i64 * 6);
            if let Some(mut note) = build_note(i, ctx, cfg.student_link_ratio, rng, at) {
                note.id = Some(ids.next('n'));
                note.teacher_id = teacher_id.clone();
                graph.notes.push(note);
            }
        }
    }

    if ctx.students.is_empty() {
        warn!("{} has no students, skipping messages", ctx.teacher.name);
        return;
    }
    for i in 1..=cfg.special_messages {
        let at = now - Duration::seconds(i as i64 * 5);
        let Some(mut message) = build_message(i, ctx, rng, at) else {
            continue;
        };
        message.id = Some(ids.next('m'));
        let by_receiver = rng.chance(0.5);
        let reply = build_reply(
            &message,
            by_receiver,
            format!("Reply to message {i}"),
            at + Duration::minutes(1),
        );
        message.replies.push(reply);
        graph.messages.push(message);
    }
}

fn fixture_batch<R: RandomSource>(
    id: String,
    k: usize,
    teacher_id: &str,
    members: Option<Vec<String>>,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Batch {
    let age = rng.below(30 * 24 * 3600) as i64;
    Batch {
        id,
        name: format!("Batch {k} ({teacher_id})"),
        teacher_id: Some(teacher_id.to_string()),
        course: rng.pick(&COURSES).map(|s| s.to_string()),
        subject: rng.pick(&SUBJECTS).map(|s| s.to_string()),
        description: Some(format!("Auto-generated batch {k}")),
        payment_frequency: rng.pick(&FREQUENCIES).map(|s| s.to_string()),
        payment_amount: Some(rng.between(1000, 4999) as u32),
        payment_day_of_month: Some(rng.between(1, 28) as u8),
        members,
        meta: Some(BatchMeta {
            created_at: iso(now - Duration::seconds(age)),
        }),
    }
}

fn street(rng: &mut StdRng) -> String {
    let number = rng.random_range(1..1000);
    let name: String = StreetName().fake_with_rng(rng);
    format!("{number} {name}")
}

fn phone(rng: &mut StdRng) -> String {
    format!("9{}", rng.random_range(100_000_000u32..1_000_000_000))
}

fn gender(rng: &mut StdRng) -> String {
    GENDERS[rng.random_range(0..GENDERS.len())].to_string()
}

fn disguise_teacher(profile: &mut TeacherProfile, rng: &mut StdRng) {
    profile.first_name = FirstName().fake_with_rng(rng);
    profile.last_name = LastName().fake_with_rng(rng);
    profile.account_name = format!("{} {}", profile.first_name, profile.last_name);
    profile.gender = gender(rng);
    profile.address_line1 = street(rng);
    profile.address_city = CityName().fake_with_rng(rng);
    profile.address_state = StateAbbr().fake_with_rng(rng);
    profile.pin_code = rng.random_range(560_000u32..561_000).to_string();
    profile.phone_number = phone(rng);
    profile.upi_id = format!("user{}@upi", rng.random_range(0u32..10_000));
    profile.ifsc_code = format!("BANK0{}", rng.random_range(1000u32..10_000));
    profile.account_number = rng
        .random_range(100_000_000_000u64..1_000_000_000_000)
        .to_string();
}

fn disguise_student(profile: &mut StudentProfile, rng: &mut StdRng) {
    profile.first_name = FirstName().fake_with_rng(rng);
    profile.last_name = LastName().fake_with_rng(rng);
    profile.gender = gender(rng);
    profile.address_line1 = street(rng);
    profile.address_city = CityName().fake_with_rng(rng);
    profile.address_state = StateAbbr().fake_with_rng(rng);
    profile.pin_code = rng.random_range(560_000u32..561_000).to_string();
    profile.parent1_phone = phone(rng);
    profile.parent2_phone = phone(rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::SpecialTeacher;
    use crate::models::Party;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn small() -> SeedConfig {
        SeedConfig {
            total_teachers: 3,
            total_students: 10,
            special_teacher: SpecialTeacher::Index(1),
            special_students: 4,
            special_batches: 2,
            batches_per_teacher: 2,
            active_batch_cap: None,
            special_assignments: 5,
            special_notes: 4,
            special_messages: 6,
            ..SeedConfig::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn counts_follow_the_distributor() {
        let graph = generate(&small(), &mut SeededRandom::new(Some(7)), now());
        assert_eq!(graph.teachers.len(), 3);
        assert_eq!(graph.students.len(), 10);
        assert_eq!(graph.batches.len(), 6);
        assert_eq!(graph.assignments.len(), 5);
        assert_eq!(graph.notes.len(), 4);
        assert_eq!(graph.messages.len(), 6);

        let heavy: Vec<_> = graph.teachers.iter().filter(|t| t.meta.is_heavy).collect();
        assert_eq!(heavy.len(), 1);
        assert_eq!(heavy[0].id, "t1");
        assert_eq!(
            graph.students.iter().filter(|s| s.teacher_id == "t1").count(),
            4
        );
    }

    #[test]
    fn ids_share_one_sequence() {
        let graph = generate(&small(), &mut SeededRandom::new(Some(1)), now());
        assert_eq!(graph.batches[0].id, "b1");
        assert_eq!(graph.batches[5].id, "b6");
        assert_eq!(graph.assignments[0].id.as_deref(), Some("a7"));
        assert_eq!(graph.notes[0].id.as_deref(), Some("n12"));
        assert_eq!(graph.messages[0].id.as_deref(), Some("m16"));
        assert_eq!(graph.students[0].id, "s1");
    }

    #[test]
    fn memberships_stay_within_a_teacher() {
        for seed in 0..20 {
            let graph = generate(&small(), &mut SeededRandom::new(Some(seed)), now());
            let owner: HashMap<&str, &str> = graph
                .students
                .iter()
                .map(|s| (s.id.as_str(), s.teacher_id.as_str()))
                .collect();

            let mut seen = HashSet::new();
            for batch in &graph.batches {
                for member in batch.members.iter().flatten() {
                    assert_eq!(batch.teacher_id.as_deref(), Some(owner[member.as_str()]));
                    assert!(seen.insert(member.clone()), "{member} in two batches");
                    let student = graph.students.iter().find(|s| &s.id == member).unwrap();
                    assert_eq!(student.batch_id.as_ref(), Some(&batch.id));
                }
            }
            for student in &graph.students {
                if !seen.contains(&student.id) {
                    assert!(student.batch_id.is_none());
                }
            }
        }
    }

    #[test]
    fn heavy_teacher_batches_are_full_or_null() {
        let cfg = SeedConfig {
            total_students: 40,
            special_students: 30,
            special_batches: 20,
            ..small()
        };
        for seed in 0..10 {
            let graph = generate(&cfg, &mut SeededRandom::new(Some(seed)), now());
            for batch in graph.batches.iter().filter(|b| b.is_owned_by("t1")) {
                assert_ne!(batch.members, Some(Vec::new()), "seed {seed}: {}", batch.id);
            }
        }
    }

    #[test]
    fn heavy_records_reference_heavy_teacher() {
        let graph = generate(&small(), &mut SeededRandom::new(Some(3)), now());
        let own_batches: HashSet<_> = graph
            .batches
            .iter()
            .filter(|b| b.is_owned_by("t1"))
            .map(|b| b.id.clone())
            .collect();

        for a in &graph.assignments {
            assert_eq!(a.teacher_id.as_deref(), Some("t1"));
            assert!(own_batches.contains(&a.batch_id));
        }
        for m in &graph.messages {
            assert!(!(m.sender_type == Party::Teacher && m.receiver_type == Party::Teacher));
            assert!(m.sender == "t1" || m.receiver == "t1");
            assert_eq!(m.replies.len(), 1);
        }
    }

    #[test]
    fn same_seed_same_graph() {
        let a = generate(&small(), &mut SeededRandom::new(Some(11)), now());
        let b = generate(&small(), &mut SeededRandom::new(Some(11)), now());
        assert_eq!(a.students, b.students);
        assert_eq!(a.batches, b.batches);
        assert_eq!(a.messages, b.messages);
    }
}
