use crate::config::{ProvisionMode, SeedConfig};
use crate::models::{Teacher, TeacherProfile};
use crate::token::{subject_id, token_of};
use crate::transport::{ApiClient, Credentials, Transport, login_body};
use tracing::{info, warn};

/// Deterministic signup payload for the teacher at 1-based `i`.
pub fn teacher_profile(cfg: &SeedConfig, i: usize) -> TeacherProfile {
    TeacherProfile {
        first_name: format!("Teacher{i}"),
        last_name: "LargeTest".into(),
        user_name: cfg.teacher_user_name(i),
        password: format!("Password@{i}"),
        age: 28 + (i % 20) as u32,
        gender: if i % 2 == 0 { "male" } else { "female" }.into(),
        address_line1: format!("Address {i}"),
        address_city: "CityMega".into(),
        address_state: "StatePro".into(),
        pin_code: format!("5600{i}"),
        profile_pic_url: "https://example.com/profile.jpg".into(),
        email: format!("teacher{i}@{}", cfg.email_domain),
        phone_number: format!("9000000{i:03}"),
        upi_id: format!("teacher{i}@upi"),
        account_number: format!("1234567890{i}"),
        account_name: format!("Teacher{i} LargeTest"),
        ifsc_code: format!("IFSC000{i:03}"),
    }
}

/// Signs up (or logs in) `cfg.total_teachers` accounts.
///
/// Indices whose call yields no token are skipped, so the roster can be
/// shorter than requested and positions need not match username suffixes.
pub async fn provision_teachers<T: Transport>(client: &ApiClient<T>, cfg: &SeedConfig) -> Vec<Teacher> {
    let mut roster = Vec::with_capacity(cfg.total_teachers);

    for i in 1..=cfg.total_teachers {
        let profile = teacher_profile(cfg, i);

        let response = match cfg.provision_mode {
            ProvisionMode::Signup => {
                client
                    .post_json(&cfg.paths.teacher_signup, &profile, &format!("Teacher {i}"), None)
                    .await
            }
            ProvisionMode::Login => {
                let body = login_body(&profile.user_name, &profile.password);
                client
                    .post(&cfg.paths.teacher_login, &body, &format!("Login Teacher {i}"), None)
                    .await
            }
        };

        let Some(token) = response.as_ref().and_then(token_of) else {
            warn!("No token returned for Teacher {i}, skipping");
            continue;
        };

        let id = subject_id(&token).unwrap_or_else(|| i.to_string());
        let credentials = Credentials::new(&profile.user_name, &profile.password, token);
        roster.push(Teacher {
            id,
            profile,
            credentials,
        });
    }

    info!(
        "Provisioned {} of {} teacher(s)",
        roster.len(),
        cfg.total_teachers
    );
    roster
}

/// Logs every teacher in again; a failed login keeps the previous token.
pub async fn refresh_tokens<T: Transport>(client: &ApiClient<T>, roster: &mut [Teacher]) -> usize {
    info!("Refreshing tokens for {} teacher(s)", roster.len());
    let mut refreshed = 0;

    for teacher in roster.iter_mut() {
        let user_name = teacher.credentials.user_name().to_owned();
        let password = teacher.credentials.password().to_owned();
        match client.login(&user_name, &password).await {
            Some(token) => {
                teacher.credentials.replace_token(token);
                refreshed += 1;
            }
            None => warn!("Could not refresh token for {user_name}"),
        }
    }
    refreshed
}
