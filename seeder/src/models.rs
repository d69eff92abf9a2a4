//! Records exchanged with the platform API and written to fixture files.
//!
//! The API owns the canonical schema; these types only mirror the fields the
//! seeder fills in. Field names are camelCase on the wire.

use crate::transport::Credentials;
use serde::{Deserialize, Serialize};

/// Signup payload for a teacher account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherProfile {
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub password: String,
    pub age: u32,
    pub gender: String,
    pub address_line1: String,
    pub address_city: String,
    pub address_state: String,
    pub pin_code: String,
    pub profile_pic_url: String,
    pub email: String,
    pub phone_number: String,
    pub upi_id: String,
    pub account_number: String,
    pub account_name: String,
    pub ifsc_code: String,
}

/// A teacher that exists on the remote side and holds a live token.
#[derive(Debug, Clone)]
pub struct Teacher {
    pub id: String,
    pub profile: TeacherProfile,
    pub credentials: Credentials,
}

impl Teacher {
    pub fn user_name(&self) -> &str {
        &self.profile.user_name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherMeta {
    pub is_heavy: bool,
}

/// Teacher row as written to `teachers.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRecord {
    pub id: String,
    #[serde(flatten)]
    pub profile: TeacherProfile,
    pub meta: TeacherMeta,
}

/// Signup payload for a student account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub password: String,
    pub email: String,
    pub age: u32,
    pub gender: String,
    pub address_line1: String,
    pub address_city: String,
    pub address_state: String,
    pub pin_code: String,
    pub profile_pic_url: String,
    pub parent1_name: String,
    pub parent1_phone: String,
    pub parent1_email: String,
    pub parent2_name: String,
    pub parent2_phone: String,
    pub parent2_email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub teacher_id: String,
    /// Attached after creation; at most one batch per student.
    pub batch_id: Option<String>,
    #[serde(flatten)]
    pub profile: StudentProfile,
}

impl Student {
    pub fn user_name(&self) -> &str {
        &self.profile.user_name
    }
}

/// Body of `POST /batches`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBatch {
    pub name: String,
    pub course: String,
    pub subject: String,
    pub description: String,
    pub payment_frequency: String,
    pub payment_amount: u32,
    pub teacher_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMeta {
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: String,
    pub name: String,
    /// `None` marks an unassigned batch.
    pub teacher_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_amount: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_day_of_month: Option<u8>,
    /// `None` (unassigned membership) is distinct from an empty list.
    #[serde(default)]
    pub members: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<BatchMeta>,
}

impl Batch {
    /// Local placeholder batch that belongs to no teacher.
    pub fn unassigned(id: String, name: String) -> Self {
        Self {
            id,
            name,
            teacher_id: None,
            course: None,
            subject: None,
            description: None,
            payment_frequency: None,
            payment_amount: None,
            payment_day_of_month: None,
            members: None,
            meta: None,
        }
    }

    pub fn is_owned_by(&self, teacher_id: &str) -> bool {
        self.teacher_id.as_deref() == Some(teacher_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    pub publish_date: String,
    pub submission_date: String,
    pub batch_id: String,
    pub student_id: Option<String>,
    pub title: String,
    pub details: String,
    pub attachment_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    pub publish_date: String,
    #[serde(rename = "Title")]
    pub title: String,
    pub list_urls: Vec<String>,
    pub content: String,
    pub student_id: Option<String>,
    pub batch_id: String,
}

/// Which side of a conversation a principal is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Party {
    Teacher,
    Student,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub content: String,
    pub sender: String,
    pub sender_type: Party,
    pub sender_name: String,
    pub timestamp: String,
    pub attachment_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub subject: String,
    pub content: String,
    pub sender: String,
    pub sender_name: String,
    pub sender_type: Party,
    pub receiver: String,
    pub receiver_name: String,
    pub receiver_type: Party,
    pub batch_id: Option<String>,
    pub timestamp: String,
    pub attachment_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<Reply>,
}
