use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use tripsage_core::repository::SummaryRepository;
use tripsage_core::summary::{SummaryContent, TripSummary};
use tripsage_core::RepoError;

pub struct PgSummaryRepository {
    pool: PgPool,
}

impl PgSummaryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: Uuid,
    share_id: String,
    user_id: Option<Uuid>,
    destination: String,
    content: Value,
    is_fallback_data: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<SummaryRow> for TripSummary {
    type Error = RepoError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        let content: SummaryContent = serde_json::from_value(row.content)
            .map_err(|e| RepoError::Backend(anyhow!("malformed summary content: {}", e)))?;
        Ok(TripSummary {
            id: row.id,
            share_id: row.share_id,
            user_id: row.user_id,
            destination: row.destination,
            content,
            is_fallback_data: row.is_fallback_data,
            created_at: row.created_at,
        })
    }
}

fn backend(err: sqlx::Error) -> RepoError {
    RepoError::Backend(err.into())
}

#[async_trait]
impl SummaryRepository for PgSummaryRepository {
    async fn insert(&self, summary: &TripSummary) -> Result<(), RepoError> {
        let content = serde_json::to_value(&summary.content)
            .map_err(|e| RepoError::Backend(anyhow!("failed to encode content: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO trip_summaries (id, share_id, user_id, destination, content, is_fallback_data, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(summary.id)
        .bind(&summary.share_id)
        .bind(summary.user_id)
        .bind(&summary.destination)
        .bind(content)
        .bind(summary.is_fallback_data)
        .bind(summary.created_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn find(&self, key: &str) -> Result<Option<TripSummary>, RepoError> {
        // A UUID key resolves by internal id, anything else by share id.
        let row = match Uuid::parse_str(key) {
            Ok(id) => {
                sqlx::query_as::<_, SummaryRow>(
                    "SELECT id, share_id, user_id, destination, content, is_fallback_data, created_at FROM trip_summaries WHERE id = $1",
                )
                .bind(id)
                .fetch_optional(&self.pool)
                .await
            }
            Err(_) => {
                sqlx::query_as::<_, SummaryRow>(
                    "SELECT id, share_id, user_id, destination, content, is_fallback_data, created_at FROM trip_summaries WHERE share_id = $1",
                )
                .bind(key)
                .fetch_optional(&self.pool)
                .await
            }
        }
        .map_err(backend)?;

        row.map(TripSummary::try_from).transpose()
    }
}
