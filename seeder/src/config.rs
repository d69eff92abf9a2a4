//! Run tunables for every seeding stage.
//!
//! `SeedConfig::default()` reproduces the large-data run (200 teachers,
//! 10 000 students, one heavy teacher). `from_env()` applies overrides from
//! the environment; tests build the struct directly with small numbers.

use crate::distribution::{MembershipPolicy, RemainderPolicy, SpecialTeacher};
use crate::transport::{Backoff, RetryPolicy};
use common::config::{env_flag, env_or, env_string};
use std::env;
use std::time::Duration;

/// How the provisioner obtains teacher tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionMode {
    /// `POST /signup/teachers` for fresh accounts.
    Signup,
    /// `POST /login/teachers` for accounts from an earlier run.
    Login,
}

/// Routes of the target API, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPaths {
    pub teacher_signup: String,
    pub teacher_login: String,
    pub student_signup: String,
    pub students: String,
    pub batches: String,
    pub batch_students: String,
    pub assignments: String,
    pub notes: String,
    pub messages: String,
}

impl Default for ApiPaths {
    fn default() -> Self {
        Self {
            teacher_signup: "/signup/teachers".into(),
            teacher_login: "/login/teachers".into(),
            student_signup: "/signup/students".into(),
            students: "/students".into(),
            batches: "/batches".into(),
            batch_students: "/batchStudents".into(),
            assignments: "/assignments".into(),
            notes: "/notes".into(),
            messages: "/messages".into(),
        }
    }
}

/// DynamoDB table per fixture file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub teachers: String,
    pub students: String,
    pub batches: String,
    pub assignments: String,
    pub notes: String,
    pub messages: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            teachers: "Teachers".into(),
            students: "Students".into(),
            batches: "Batches".into(),
            assignments: "Assignments".into(),
            notes: "Notes".into(),
            messages: "Messages".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeedConfig {
    pub total_teachers: usize,
    pub total_students: usize,
    pub special_teacher: SpecialTeacher,
    pub special_students: usize,
    pub special_batches: usize,
    /// Batches for every non-special teacher.
    pub batches_per_teacher: usize,
    /// Stop handing out non-special batches once this many exist.
    pub active_batch_cap: Option<usize>,
    /// Local placeholder batches with no teacher.
    pub null_batches: usize,
    pub special_assignments: usize,
    pub special_notes: usize,
    pub special_messages: usize,
    pub remainder_policy: RemainderPolicy,
    pub special_membership: MembershipPolicy,
    pub other_membership: MembershipPolicy,
    /// Probability that an assignment/note is tied to a single student.
    pub student_link_ratio: f64,
    pub provision_mode: ProvisionMode,
    /// Re-login the roster before the batch and heavy-data stages.
    pub refresh_tokens: bool,
    pub teacher_prefix: String,
    pub student_prefix: String,
    pub email_domain: String,
    pub retry: RetryPolicy,
    pub paths: ApiPaths,
    pub tables: TableNames,
    /// Fixed seed for reproducible runs; OS entropy otherwise.
    pub random_seed: Option<u64>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            total_teachers: 200,
            total_students: 10_000,
            special_teacher: SpecialTeacher::Index(1),
            special_students: 100,
            special_batches: 20,
            batches_per_teacher: 1,
            active_batch_cap: Some(50),
            null_batches: 10,
            special_assignments: 1000,
            special_notes: 1000,
            special_messages: 10_000,
            remainder_policy: RemainderPolicy::RoundRobin,
            special_membership: MembershipPolicy {
                full_below: 0.7,
                empty_below: 0.7,
                min_members: 5,
                max_members: 14,
            },
            other_membership: MembershipPolicy::default(),
            student_link_ratio: 0.5,
            provision_mode: ProvisionMode::Signup,
            refresh_tokens: false,
            teacher_prefix: "teacherXL".into(),
            student_prefix: "studentXL".into(),
            email_domain: "tasmai.com".into(),
            retry: RetryPolicy::default(),
            paths: ApiPaths::default(),
            tables: TableNames::default(),
            random_seed: None,
        }
    }
}

impl SeedConfig {
    /// Defaults overridden by whatever the environment provides.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let d = SeedConfig::default();

        let special_teacher = env::var("SPECIAL_TEACHER")
            .ok()
            .and_then(|raw| SpecialTeacher::parse(&raw))
            .unwrap_or(d.special_teacher);

        let remainder_policy = env::var("REMAINDER_POLICY")
            .ok()
            .and_then(|raw| RemainderPolicy::parse(&raw))
            .unwrap_or(d.remainder_policy);

        let provision_mode = match env_string("PROVISION_MODE", "signup").to_ascii_lowercase().as_str() {
            "login" => ProvisionMode::Login,
            _ => ProvisionMode::Signup,
        };

        let backoff = match env_string("RETRY_BACKOFF", "linear").to_ascii_lowercase().as_str() {
            "exponential" => Backoff::Exponential,
            _ => Backoff::Linear,
        };

        let active_batch_cap = match env::var("ACTIVE_BATCH_CAP") {
            Ok(raw) if raw.trim().eq_ignore_ascii_case("none") => None,
            Ok(raw) => raw.trim().parse().ok().or(d.active_batch_cap),
            Err(_) => d.active_batch_cap,
        };

        let retry = RetryPolicy {
            max_attempts: env_or("RETRY_ATTEMPTS", d.retry.max_attempts),
            base_delay: Duration::from_millis(env_or(
                "RETRY_BASE_DELAY_MS",
                d.retry.base_delay.as_millis() as u64,
            )),
            backoff,
            throttle: Duration::from_millis(env_or("REQUEST_DELAY_MS", 0)),
        };

        let tables = TableNames {
            teachers: env_string("TABLE_TEACHERS", &d.tables.teachers),
            students: env_string("TABLE_STUDENTS", &d.tables.students),
            batches: env_string("TABLE_BATCHES", &d.tables.batches),
            assignments: env_string("TABLE_ASSIGNMENTS", &d.tables.assignments),
            notes: env_string("TABLE_NOTES", &d.tables.notes),
            messages: env_string("TABLE_MESSAGES", &d.tables.messages),
        };

        Self {
            total_teachers: env_or("TOTAL_TEACHERS", d.total_teachers),
            total_students: env_or("TOTAL_STUDENTS", d.total_students),
            special_teacher,
            special_students: env_or("SPECIAL_TEACHER_STUDENTS", d.special_students),
            special_batches: env_or("SPECIAL_TEACHER_BATCHES", d.special_batches),
            batches_per_teacher: env_or("BATCHES_PER_TEACHER", d.batches_per_teacher),
            active_batch_cap,
            null_batches: env_or("NULL_BATCHES", d.null_batches),
            special_assignments: env_or("SPECIAL_ASSIGNMENTS", d.special_assignments),
            special_notes: env_or("SPECIAL_NOTES", d.special_notes),
            special_messages: env_or("SPECIAL_MESSAGES", d.special_messages),
            remainder_policy,
            special_membership: MembershipPolicy {
                full_below: env_or("SPECIAL_MEMBERSHIP_FULL", d.special_membership.full_below),
                empty_below: env_or("SPECIAL_MEMBERSHIP_EMPTY", d.special_membership.empty_below),
                ..d.special_membership
            },
            other_membership: MembershipPolicy {
                full_below: env_or("MEMBERSHIP_FULL", d.other_membership.full_below),
                empty_below: env_or("MEMBERSHIP_EMPTY", d.other_membership.empty_below),
                ..d.other_membership
            },
            student_link_ratio: env_or("STUDENT_LINK_RATIO", d.student_link_ratio).clamp(0.0, 1.0),
            provision_mode,
            refresh_tokens: env_flag("REFRESH_TOKENS", d.refresh_tokens),
            teacher_prefix: env_string("TEACHER_PREFIX", &d.teacher_prefix),
            student_prefix: env_string("STUDENT_PREFIX", &d.student_prefix),
            email_domain: env_string("EMAIL_DOMAIN", &d.email_domain),
            retry,
            paths: d.paths,
            tables,
            random_seed: env::var("RANDOM_SEED").ok().and_then(|s| s.trim().parse().ok()),
        }
    }

    /// Username of the teacher at 1-based `index`.
    pub fn teacher_user_name(&self, index: usize) -> String {
        format!("{}{}", self.teacher_prefix, index)
    }
}
