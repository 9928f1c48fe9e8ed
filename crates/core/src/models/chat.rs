use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::UserRole;

/// Longest message body accepted by the client, in characters.
pub const MAX_MESSAGE_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub class_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_role: UserRole,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
