pub mod attendance;
pub mod chat;
pub mod class;
pub mod enrollment;
pub mod user;
