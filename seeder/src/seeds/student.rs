use super::{Participant, alphanumeric};
use crate::config::SeedConfig;
use crate::distribution::plan_students;
use crate::models::{Student, StudentProfile, Teacher};
use crate::token::{record_id, subject_id, token_of};
use crate::transport::{ApiClient, Transport};
use serde_json::{Value, json};
use tracing::{info, warn};

/// Signup payload for the run-wide student number `n`, the `i`-th student of
/// `teacher_user_name`.
pub fn student_profile(cfg: &SeedConfig, n: usize, teacher_user_name: &str, i: usize) -> StudentProfile {
    let user_name = format!("{}{n}{}", cfg.student_prefix, alphanumeric(teacher_user_name));
    let domain = &cfg.email_domain;

    StudentProfile {
        first_name: format!("Student{n}"),
        last_name: teacher_user_name.to_string(),
        email: format!("{user_name}@{domain}"),
        user_name,
        password: format!("Password@{n}"),
        age: 10 + (n % 10) as u32,
        gender: if n % 2 == 0 { "male" } else { "female" }.into(),
        address_line1: format!("Address {n}"),
        address_city: "CityZ".into(),
        address_state: "StateW".into(),
        pin_code: format!("4000{}", n % 100),
        profile_pic_url: "https://example.com/student.jpg".into(),
        parent1_name: format!("Parent{n}"),
        parent1_phone: format!("9990000{i:03}"),
        parent1_email: format!("parent{n}@{domain}"),
        parent2_name: format!("ParentTwo{n}"),
        parent2_phone: format!("9990000{i:03}"),
        parent2_email: format!("parent2_{n}@{domain}"),
    }
}

/// Signs up students for every teacher, special teacher first.
///
/// Counts come from [`plan_students`]. When the special teacher is missing
/// its share is skipped and the others still get theirs.
pub async fn create_students<T: Transport>(
    client: &ApiClient<T>,
    cfg: &SeedConfig,
    roster: &mut [Teacher],
) -> Vec<Student> {
    let special = cfg.special_teacher.locate(roster.iter().map(Teacher::user_name));
    if special.is_none() {
        warn!("Special teacher not found, its students will not be created");
    }

    let plan = plan_students(
        roster.len(),
        special,
        cfg.total_students,
        cfg.special_students,
        cfg.remainder_policy,
    );

    let order: Vec<usize> = special
        .into_iter()
        .chain((0..roster.len()).filter(|&i| Some(i) != special))
        .collect();

    let mut students = Vec::new();
    let mut n = 1;

    for idx in order {
        let teacher = &mut roster[idx];
        for i in 0..plan[idx] {
            let profile = student_profile(cfg, n, teacher.user_name(), i);
            let label = format!("Student {n}");
            let response = client
                .post_json(
                    &cfg.paths.student_signup,
                    &profile,
                    &label,
                    Some(&mut teacher.credentials),
                )
                .await;

            match response.as_ref().and_then(token_of) {
                Some(token) => students.push(Student {
                    id: subject_id(&token).unwrap_or_else(|| format!("S{n}")),
                    teacher_id: teacher.id.clone(),
                    batch_id: None,
                    profile,
                }),
                None => warn!("Student {n} signup returned no token, skipping"),
            }
            n += 1;
        }
    }

    info!("Created {} student(s)", students.len());
    students
}

/// Pushes each student's assigned batch with `PUT /students/{id}`.
///
/// Students without a batch, or whose teacher is not in the roster, are left
/// alone. Returns the number of successful updates.
pub async fn update_student_batches<T: Transport>(
    client: &ApiClient<T>,
    cfg: &SeedConfig,
    students: &[Student],
    roster: &mut [Teacher],
) -> usize {
    info!("Updating student batch assignments");
    let mut updated = 0;

    for student in students {
        let Some(batch_id) = student.batch_id.as_deref() else {
            continue;
        };
        let Some(teacher) = roster.iter_mut().find(|t| t.id == student.teacher_id) else {
            continue;
        };

        let path = format!("{}/{}", cfg.paths.students, student.id);
        let body = json!({ "batches": [batch_id] });
        let label = format!("{} -> batch {batch_id}", student.user_name());
        if client
            .put(&path, &body, &label, Some(&mut teacher.credentials))
            .await
            .is_some()
        {
            updated += 1;
        }
    }

    info!("Updated {updated} student batch assignment(s)");
    updated
}

/// `GET /students` as `teacher`. Accepts a bare array or an object wrapping
/// one under `students`, `items` or `data`; entries without an id are dropped.
pub async fn fetch_students<T: Transport>(
    client: &ApiClient<T>,
    cfg: &SeedConfig,
    teacher: &mut Teacher,
) -> Vec<Participant> {
    let Some(response) = client
        .get(&cfg.paths.students, "existing students", Some(&mut teacher.credentials))
        .await
    else {
        warn!("Failed to fetch students");
        return Vec::new();
    };

    let students = parse_student_list(&response);
    info!("Loaded {} existing student(s)", students.len());
    students
}

pub(crate) fn parse_student_list(response: &Value) -> Vec<Participant> {
    let items: &[Value] = match response {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => ["students", "items", "data"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    };

    items
        .iter()
        .filter_map(|item| {
            let id = record_id(item, "student")?;
            let name = item
                .get("userName")
                .and_then(Value::as_str)
                .unwrap_or(id.as_str())
                .to_string();
            Some(Participant { id, name })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_embeds_teacher_in_username() {
        let cfg = SeedConfig {
            student_prefix: "studentmr".into(),
            ..SeedConfig::default()
        };
        let p = student_profile(&cfg, 12, "teacher_mr-1", 3);
        assert_eq!(p.user_name, "studentmr12teachermr1");
        assert_eq!(p.email, "studentmr12teachermr1@tasmai.com");
        assert_eq!(p.last_name, "teacher_mr-1");
        assert_eq!(p.parent1_phone, "9990000003");
        assert_eq!(p.parent2_email, "parent2_12@tasmai.com");
        assert_eq!(p.pin_code, "400012");
        assert_eq!(p.age, 12);
        assert_eq!(p.gender, "male");
    }

    #[test]
    fn student_list_shapes() {
        let bare = json!([{ "id": "s1", "userName": "a" }, { "_id": 2 }, { "name": "no id" }]);
        let parsed = parse_student_list(&bare);
        assert_eq!(
            parsed,
            vec![
                Participant { id: "s1".into(), name: "a".into() },
                Participant { id: "2".into(), name: "2".into() },
            ]
        );

        let wrapped = json!({ "items": [{ "studentId": "s9", "userName": "z" }] });
        assert_eq!(parse_student_list(&wrapped).len(), 1);

        assert!(parse_student_list(&json!({ "count": 0 })).is_empty());
        assert!(parse_student_list(&Value::Null).is_empty());
    }
}
