use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::booking::Booking;
use crate::summary::TripSummary;
use crate::user::User;
use crate::RepoError;

/// Repository trait for account records and password-reset tokens.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a new account. Email uniqueness is enforced by the
    /// storage layer; a duplicate maps to `RepoError::EmailTaken`.
    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<(), RepoError>;

    async fn store_reset_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepoError>;

    /// Atomically validates and marks a reset token used, returning the
    /// owning user id. A token that is unknown, already used, or expired
    /// yields `None`. Validation and consumption are a single conditional
    /// update so two racing resets cannot both succeed.
    async fn consume_reset_token(&self, token: &str) -> Result<Option<Uuid>, RepoError>;
}

/// Repository trait for booking records.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, booking: &Booking) -> Result<(), RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, RepoError>;

    /// Conditionally transitions a booking to `cancelled`, guarded on the
    /// current status still being cancellable. Returns the updated record,
    /// or `None` when the booking was already in a terminal state (the
    /// caller re-reads to produce a precise conflict message).
    async fn cancel(&self, id: Uuid) -> Result<Option<Booking>, RepoError>;

    /// Owner-scoped listing, newest first, id as tiebreak so pagination
    /// stays stable across pages.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Booking>, RepoError>;
}

/// Repository trait for shared trip summaries.
#[async_trait]
pub trait SummaryRepository: Send + Sync {
    async fn insert(&self, summary: &TripSummary) -> Result<(), RepoError>;

    /// Resolves by internal id (when `key` parses as a UUID) or by the
    /// public share id.
    async fn find(&self, key: &str) -> Result<Option<TripSummary>, RepoError>;
}
