//! Collection names shared by every backend implementation.

pub const USERS: &str = "users";
pub const CLASSES: &str = "classes";
pub const ENROLLMENTS: &str = "enrollments";
pub const ATTENDANCE: &str = "attendance";
pub const CHAT_MESSAGES: &str = "chatMessages";
