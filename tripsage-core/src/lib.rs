pub mod booking;
pub mod password;
pub mod pii;
pub mod repository;
pub mod summary;
pub mod token;
pub mod user;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// Errors surfaced by the repository layer. `EmailTaken` is the one
/// conflict callers branch on; everything else is an opaque backend
/// failure carried through to the 500 handler.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("email already registered")]
    EmailTaken,
    #[error("storage error: {0}")]
    Backend(#[source] anyhow::Error),
}
