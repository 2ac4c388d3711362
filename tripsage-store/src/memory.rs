//! In-memory store used by tests and local development. Mirrors the
//! Postgres repositories' conditional-update semantics: every mutation
//! happens under one lock, so the same at-most-once guarantees hold.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use tripsage_core::booking::{Booking, BookingStatus};
use tripsage_core::repository::{BookingRepository, SummaryRepository, UserRepository};
use tripsage_core::summary::TripSummary;
use tripsage_core::user::{PasswordResetToken, User};
use tripsage_core::RepoError;

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    reset_tokens: Vec<PasswordResetToken>,
    bookings: Vec<Booking>,
    summaries: Vec<TripSummary>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, RepoError> {
        self.inner
            .lock()
            .map_err(|_| RepoError::Backend(anyhow!("store lock poisoned")))
    }

    /// Seeds state the HTTP surface cannot produce, such as a
    /// `completed` booking.
    pub fn set_booking_status(&self, id: Uuid, status: BookingStatus) -> Result<(), RepoError> {
        let mut inner = self.lock()?;
        if let Some(booking) = inner.bookings.iter_mut().find(|b| b.id == id) {
            booking.status = status;
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, RepoError> {
        let mut inner = self.lock()?;
        if inner.users.iter().any(|u| u.email == email) {
            return Err(RepoError::EmailTaken);
        }
        let user = User::new(
            name.to_string(),
            email.to_string(),
            password_hash.to_string(),
        );
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let inner = self.lock()?;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let inner = self.lock()?;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<(), RepoError> {
        let mut inner = self.lock()?;
        if let Some(user) = inner.users.iter_mut().find(|u| u.id == user_id) {
            user.password_hash.0 = password_hash.to_string();
        }
        Ok(())
    }

    async fn store_reset_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let mut inner = self.lock()?;
        inner
            .reset_tokens
            .push(PasswordResetToken::new(user_id, token.to_string(), expires_at));
        Ok(())
    }

    async fn consume_reset_token(&self, token: &str) -> Result<Option<Uuid>, RepoError> {
        let mut inner = self.lock()?;
        let now = Utc::now();
        match inner
            .reset_tokens
            .iter_mut()
            .find(|t| t.token == token && t.is_usable(now))
        {
            Some(entry) => {
                entry.used = true;
                Ok(Some(entry.user_id))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn insert(&self, booking: &Booking) -> Result<(), RepoError> {
        let mut inner = self.lock()?;
        inner.bookings.push(booking.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, RepoError> {
        let inner = self.lock()?;
        Ok(inner.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn cancel(&self, id: Uuid) -> Result<Option<Booking>, RepoError> {
        let mut inner = self.lock()?;
        match inner
            .bookings
            .iter_mut()
            .find(|b| b.id == id && b.status.is_cancellable())
        {
            Some(booking) => {
                booking.status = BookingStatus::Cancelled;
                Ok(Some(booking.clone()))
            }
            None => Ok(None),
        }
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Booking>, RepoError> {
        let inner = self.lock()?;
        let mut owned: Vec<Booking> = inner
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(owned
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }
}

#[async_trait]
impl SummaryRepository for MemoryStore {
    async fn insert(&self, summary: &TripSummary) -> Result<(), RepoError> {
        let mut inner = self.lock()?;
        inner.summaries.push(summary.clone());
        Ok(())
    }

    async fn find(&self, key: &str) -> Result<Option<TripSummary>, RepoError> {
        let inner = self.lock()?;
        Ok(inner
            .summaries
            .iter()
            .find(|s| s.id.to_string() == key || s.share_id == key)
            .cloned())
    }
}
