//! The four run modes, each a sequence of stages behind [`run_stage`].

use crate::config::{ProvisionMode, SeedConfig};
use crate::distribution::assign_students_to_batches;
use crate::fixture::{self, FixtureError, LoadReport, TableWriter};
use crate::models::Teacher;
use crate::random::{RandomSource, SeededRandom};
use crate::seed::run_stage;
use crate::seeds::assignment::create_assignments;
use crate::seeds::batch::create_batches;
use crate::seeds::enrollment::enroll_round_robin;
use crate::seeds::message::create_messages;
use crate::seeds::note::create_notes;
use crate::seeds::student::{create_students, fetch_students, update_student_batches};
use crate::seeds::teacher::{provision_teachers, refresh_tokens};
use crate::seeds::{HeavyContext, HeavyReport, Participant};
use crate::transport::{ApiClient, Credentials, Transport};
use chrono::Utc;
use std::path::Path;
use tracing::{info, warn};

/// What an API-backed run managed to create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub teachers: usize,
    pub students: usize,
    pub batches: usize,
    /// Student batch updates (api) or enrolments (resume).
    pub linked: usize,
    pub heavy: HeavyReport,
}

/// Assignments, notes and messages for the heavy teacher, in that order.
pub async fn create_heavy_data<T: Transport, R: RandomSource>(
    client: &ApiClient<T>,
    cfg: &SeedConfig,
    ctx: &HeavyContext,
    credentials: &mut Credentials,
    rng: &mut R,
) -> HeavyReport {
    info!(
        "Creating heavy data for {} ({} batch(es), {} student(s))",
        ctx.teacher.name,
        ctx.batch_ids.len(),
        ctx.students.len()
    );
    HeavyReport {
        assignments: create_assignments(client, cfg, ctx, credentials, rng).await,
        notes: create_notes(client, cfg, ctx, credentials, rng).await,
        messages: create_messages(client, cfg, ctx, credentials, rng).await,
    }
}

fn special_index(cfg: &SeedConfig, roster: &[Teacher]) -> Option<usize> {
    cfg.special_teacher.locate(roster.iter().map(Teacher::user_name))
}

/// Full run: teachers, students, batches, batch links, heavy data.
pub async fn run_api<T: Transport>(client: &ApiClient<T>, cfg: &SeedConfig) -> RunReport {
    let mut rng = SeededRandom::new(cfg.random_seed);
    let mut report = RunReport::default();

    let mut roster = run_stage("teachers", provision_teachers(client, cfg))
        .await
        .unwrap_or_default();
    report.teachers = roster.len();
    if roster.is_empty() {
        warn!("No teachers created, nothing else to seed");
        return report;
    }

    let mut students = run_stage("students", create_students(client, cfg, &mut roster))
        .await
        .unwrap_or_default();
    report.students = students.len();

    if cfg.refresh_tokens {
        run_stage("token refresh", refresh_tokens(client, &mut roster)).await;
    }

    let batches = run_stage("batches", create_batches(client, cfg, &mut roster))
        .await
        .unwrap_or_default();
    report.batches = batches.len();

    let summary = assign_students_to_batches(&mut students, &batches, &mut rng);
    summary.log();
    report.linked = run_stage(
        "student batches",
        update_student_batches(client, cfg, &students, &mut roster),
    )
    .await
    .unwrap_or_default();

    let Some(idx) = special_index(cfg, &roster) else {
        warn!("Special teacher not found, skipping heavy data");
        return report;
    };
    if cfg.refresh_tokens {
        run_stage("token refresh", refresh_tokens(client, &mut roster[idx..=idx])).await;
    }

    let teacher = &mut roster[idx];
    let ctx = HeavyContext::for_teacher(teacher, &students, &batches);
    report.heavy = run_stage(
        "heavy data",
        create_heavy_data(client, cfg, &ctx, &mut teacher.credentials, &mut rng),
    )
    .await
    .unwrap_or_default();

    info!("API seeding finished: {report:?}");
    report
}

/// Picks up where an earlier run stopped: existing teachers log in, get
/// batches, and the heavy teacher's existing students are enrolled.
pub async fn run_resume<T: Transport>(client: &ApiClient<T>, cfg: &SeedConfig) -> RunReport {
    let cfg = SeedConfig {
        provision_mode: ProvisionMode::Login,
        ..cfg.clone()
    };
    let mut rng = SeededRandom::new(cfg.random_seed);
    let mut report = RunReport::default();

    let mut roster = run_stage("teacher logins", provision_teachers(client, &cfg))
        .await
        .unwrap_or_default();
    report.teachers = roster.len();
    if roster.is_empty() {
        warn!("No teachers logged in, nothing else to seed");
        return report;
    }

    let batches = run_stage("batches", create_batches(client, &cfg, &mut roster))
        .await
        .unwrap_or_default();
    report.batches = batches.len();

    let Some(idx) = special_index(&cfg, &roster) else {
        warn!("Special teacher not found, skipping enrolment and heavy data");
        return report;
    };
    let teacher = &mut roster[idx];

    let students = fetch_students(client, &cfg, teacher).await;
    report.students = students.len();
    if students.is_empty() {
        warn!("No students to assign");
        return report;
    }

    report.linked = run_stage(
        "enrolments",
        enroll_round_robin(client, &cfg, teacher, &students, &batches),
    )
    .await
    .unwrap_or_default();

    let ctx = HeavyContext {
        teacher: Participant {
            id: teacher.id.clone(),
            name: teacher.user_name().to_string(),
        },
        batch_ids: batches
            .iter()
            .filter(|b| b.is_owned_by(&teacher.id))
            .map(|b| b.id.clone())
            .collect(),
        students,
    };
    report.heavy = run_stage(
        "heavy data",
        create_heavy_data(client, &cfg, &ctx, &mut teacher.credentials, &mut rng),
    )
    .await
    .unwrap_or_default();

    info!("Resume finished: {report:?}");
    report
}

/// Offline graph generation into `out_dir`.
pub async fn run_generate(cfg: &SeedConfig, out_dir: &Path) -> Result<fixture::FixtureGraph, FixtureError> {
    let mut rng = SeededRandom::new(cfg.random_seed);
    let graph = run_stage("fixture graph", async { fixture::generate(cfg, &mut rng, Utc::now()) }).await;
    persist_graph(out_dir, graph)
}

/// Writes a finished graph. An aborted stage leaves existing fixtures untouched.
fn persist_graph(
    out_dir: &Path,
    graph: Option<fixture::FixtureGraph>,
) -> Result<fixture::FixtureGraph, FixtureError> {
    let graph = graph.ok_or(FixtureError::Aborted)?;
    fixture::write_fixtures(out_dir, &graph)?;
    Ok(graph)
}

pub async fn run_load<W: TableWriter + ?Sized>(
    cfg: &SeedConfig,
    dir: &Path,
    writer: &W,
) -> LoadReport {
    run_stage("tables", fixture::load_fixtures(dir, &cfg.tables, writer))
        .await
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn aborted_generation_keeps_existing_fixtures() {
        let dir = tempfile::tempdir().unwrap();
        let teachers = dir.path().join("teachers.json");
        fs::write(&teachers, r#"[{"id":"t1"}]"#).unwrap();

        let explode = true;
        let graph = run_stage("fixture graph", async {
            if explode {
                panic!("generator blew up");
            }
            fixture::FixtureGraph::default()
        })
        .await;
        let err = persist_graph(dir.path(), graph).unwrap_err();

        assert!(matches!(err, FixtureError::Aborted));
        assert_eq!(fs::read_to_string(&teachers).unwrap(), r#"[{"id":"t1"}]"#);
        assert!(!dir.path().join("students.json").exists());
    }

    #[test]
    fn finished_graph_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let graph = persist_graph(dir.path(), Some(fixture::FixtureGraph::default())).unwrap();
        assert!(graph.teachers.is_empty());
        assert_eq!(fs::read_to_string(dir.path().join("teachers.json")).unwrap().trim(), "[]");
    }
}
