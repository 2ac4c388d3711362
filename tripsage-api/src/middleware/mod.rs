pub mod auth;

pub use auth::{bearer_identity, require_session};
