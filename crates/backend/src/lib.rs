pub mod auth;
pub mod collections;
pub mod document;
pub mod memory;
pub mod store;

pub mod mock;
