//! # Rollcall Client
//!
//! The client crate implements the application layer of the Rollcall
//! attendance service. It keeps a live, locally readable copy of the
//! classroom data and funnels every mutation through the backend, reading
//! writes back through subscription snapshots rather than applying them
//! locally.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Store**: The application state store; owns snapshots and mutations
//! - **Auth**: Registration, login, logout and password reset flows
//! - **Actions**: Role-gated classroom operations built on the store
//! - **Reports**: Attendance report generation and CSV export
//! - **Config**: Handle environment and application configuration
//!
//! The backend is reached exclusively through the `DocumentStore` and
//! `IdentityProvider` traits, so the same client runs against the in-memory
//! sandbox and a real remote adapter.

/// Role-gated classroom operations
pub mod actions;
/// Authentication flows and their user-facing error messages
pub mod auth;
/// Configuration module for client settings
pub mod config;
/// Attendance report generation and CSV export
pub mod reports;
/// The application state store
pub mod store;
