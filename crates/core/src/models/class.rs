use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::models::user::User;

/// Free-text schedule as entered by the teacher, e.g. date "2024-01-15" and
/// time "10:00 AM". Not parsed or validated beyond being non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSchedule {
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    pub name: String,
    pub description: String,
    pub teacher_id: String,
    /// Teacher name denormalized at creation time. Not refreshed if the
    /// teacher later renames their profile.
    pub teacher_name: String,
    pub schedule: ClassSchedule,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a class. The backend assigns the id and the client
/// stamps the creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDraft {
    pub name: String,
    pub description: String,
    pub teacher_id: String,
    pub teacher_name: String,
    pub schedule: ClassSchedule,
    pub is_active: bool,
}

/// Partial update for a class document. Only fields that are set are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ClassSchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Raw class creation form, as typed. [`ClassForm::to_draft`] validates and
/// trims it into a [`ClassDraft`] owned by the given teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassForm {
    pub name: String,
    pub description: String,
    pub date: String,
    pub time: String,
}

impl ClassForm {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Please enter a class name".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(AppError::Validation("Please enter a description".to_string()));
        }
        if self.date.trim().is_empty() {
            return Err(AppError::Validation(
                "Please enter a date (e.g., 2024-01-15)".to_string(),
            ));
        }
        if self.time.trim().is_empty() {
            return Err(AppError::Validation(
                "Please enter a time (e.g., 10:00 AM)".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_draft(&self, teacher: &User) -> AppResult<ClassDraft> {
        self.validate()?;
        Ok(ClassDraft {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            teacher_id: teacher.id.clone(),
            teacher_name: teacher.name.clone(),
            schedule: ClassSchedule {
                date: self.date.trim().to_string(),
                time: self.time.trim().to_string(),
            },
            // New classes start inactive; the teacher starts them explicitly.
            is_active: false,
        })
    }
}
