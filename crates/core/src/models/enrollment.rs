use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: String,
    pub class_id: String,
    pub student_id: String,
    /// Student name denormalized at enrollment time.
    pub student_name: String,
    pub enrolled_at: DateTime<Utc>,
}
