//! Decides how many students and batches each teacher gets, who ends up in
//! which batch, and which teacher is the heavy one.
//!
//! Everything here is pure: counts are computed from the roster size and the
//! config, and every random choice goes through a [`RandomSource`].

use crate::models::{Batch, Student};
use crate::random::RandomSource;
use std::collections::{BTreeMap, HashMap};
use tracing::info;

/// Which roster entry receives the elevated counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialTeacher {
    /// 1-based position in the roster.
    Index(usize),
    UserName(String),
}

impl SpecialTeacher {
    /// Digits select a position, anything else a username.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<usize>() {
            Ok(0) => None,
            Ok(n) => Some(SpecialTeacher::Index(n)),
            Err(_) => Some(SpecialTeacher::UserName(raw.to_string())),
        }
    }

    /// Position of the special teacher among `user_names`, if present.
    pub fn locate<'a, I>(&self, user_names: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut names = user_names.into_iter();
        match self {
            SpecialTeacher::Index(n) => names.nth(n.checked_sub(1)?).map(|_| n - 1),
            SpecialTeacher::UserName(wanted) => names.position(|name| name == wanted),
        }
    }
}

/// What happens to students left over after floor division among the
/// non-special teachers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainderPolicy {
    /// Leftovers are never created.
    Drop,
    /// Leftovers go one per teacher, in roster order.
    RoundRobin,
}

impl RemainderPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "drop" | "floor" => Some(RemainderPolicy::Drop),
            "round_robin" | "round-robin" | "roundrobin" => Some(RemainderPolicy::RoundRobin),
            _ => None,
        }
    }
}

/// Students per roster position.
///
/// The special teacher gets exactly `special_count` (capped at `total`); the
/// rest is split across the other teachers. Without a special teacher the
/// whole `total` is split.
pub fn plan_students(
    teacher_count: usize,
    special: Option<usize>,
    total: usize,
    special_count: usize,
    policy: RemainderPolicy,
) -> Vec<usize> {
    let mut counts = vec![0; teacher_count];
    let special = special.filter(|&s| s < teacher_count);

    let mut remaining = total;
    if let Some(s) = special {
        let n = special_count.min(total);
        counts[s] = n;
        remaining -= n;
    }

    let others: Vec<usize> = (0..teacher_count).filter(|&i| Some(i) != special).collect();
    if others.is_empty() {
        return counts;
    }

    let base = remaining / others.len();
    let mut extra = match policy {
        RemainderPolicy::Drop => 0,
        RemainderPolicy::RoundRobin => remaining % others.len(),
    };

    for i in others {
        counts[i] = base;
        if extra > 0 {
            counts[i] += 1;
            extra -= 1;
        }
    }
    counts
}

/// Teacher-owned batches per roster position.
///
/// Walks the roster in order: the special teacher always gets
/// `special_batches`; every other teacher gets `per_teacher`, clipped so the
/// running total never passes `cap`.
pub fn plan_batches(
    teacher_count: usize,
    special: Option<usize>,
    special_batches: usize,
    per_teacher: usize,
    cap: Option<usize>,
) -> Vec<usize> {
    let mut counts = vec![0; teacher_count];
    let mut running = 0usize;

    for (i, count) in counts.iter_mut().enumerate() {
        *count = if Some(i) == special {
            special_batches
        } else {
            match cap {
                Some(cap) => per_teacher.min(cap.saturating_sub(running)),
                None => per_teacher,
            }
        };
        running += *count;
    }
    counts
}

/// Membership drawn for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Full,
    Empty,
    Unassigned,
}

/// Thresholds for the per-batch membership draw.
///
/// `r < full_below` → full, `r < empty_below` → empty list, otherwise
/// unassigned (`null`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MembershipPolicy {
    pub full_below: f64,
    pub empty_below: f64,
    pub min_members: usize,
    pub max_members: usize,
}

impl Default for MembershipPolicy {
    fn default() -> Self {
        Self {
            full_below: 0.3,
            empty_below: 0.6,
            min_members: 10,
            max_members: 10,
        }
    }
}

impl MembershipPolicy {
    pub fn draw<R: RandomSource>(&self, rng: &mut R) -> Membership {
        let r = rng.next_f64();
        if r < self.full_below {
            Membership::Full
        } else if r < self.empty_below {
            Membership::Empty
        } else {
            Membership::Unassigned
        }
    }

    /// Draws a membership and, for a full batch, moves members out of `pool`
    /// so no student lands in two batches. A full draw against an exhausted
    /// pool yields `None`, not an empty list.
    pub fn take_members<R: RandomSource>(
        &self,
        pool: &mut Vec<String>,
        rng: &mut R,
    ) -> Option<Vec<String>> {
        match self.draw(rng) {
            Membership::Full => {
                let size = rng
                    .between(self.min_members, self.max_members)
                    .min(pool.len());
                if size == 0 {
                    return None;
                }
                Some(pool.drain(..size).collect())
            }
            Membership::Empty => Some(Vec::new()),
            Membership::Unassigned => None,
        }
    }
}

/// Per-batch tally produced by [`assign_students_to_batches`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentSummary {
    pub per_batch: BTreeMap<String, usize>,
    pub unassigned: usize,
}

impl AssignmentSummary {
    pub fn assigned(&self) -> usize {
        self.per_batch.values().sum()
    }

    pub fn log(&self) {
        info!("Student-to-batch assignment summary:");
        for (name, count) in &self.per_batch {
            info!("- {name}: {count} student(s)");
        }
        if self.unassigned > 0 {
            info!("- Unassigned: {} student(s)", self.unassigned);
        }
    }
}

/// Gives every student one uniformly chosen batch of its own teacher.
///
/// Unassigned batches are never eligible; a student whose teacher has no
/// batch ends with `batch_id = None`.
pub fn assign_students_to_batches<R: RandomSource>(
    students: &mut [Student],
    batches: &[Batch],
    rng: &mut R,
) -> AssignmentSummary {
    let mut by_teacher: HashMap<&str, Vec<&Batch>> = HashMap::new();
    for batch in batches {
        if let Some(teacher_id) = batch.teacher_id.as_deref() {
            by_teacher.entry(teacher_id).or_default().push(batch);
        }
    }

    let mut summary = AssignmentSummary::default();
    for student in students.iter_mut() {
        let chosen = by_teacher
            .get(student.teacher_id.as_str())
            .and_then(|own| rng.pick(own));

        match chosen {
            Some(batch) => {
                student.batch_id = Some(batch.id.clone());
                *summary.per_batch.entry(batch.name.clone()).or_default() += 1;
            }
            None => {
                student.batch_id = None;
                summary.unassigned += 1;
            }
        }
    }
    summary
}
