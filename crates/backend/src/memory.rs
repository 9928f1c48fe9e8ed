//! In-memory backend used by the demo binary and the test suites. Behaves
//! like the hosted services it stands in for: watch channels play the role
//! of server push, and failures surface with the same error codes.

pub mod auth;
pub mod store;
