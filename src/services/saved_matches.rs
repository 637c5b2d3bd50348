use crate::models::{MatchResult, MatchStatus, ReasonCode, SavedMatch};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors that can occur when reading or writing saved matches
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Saved match store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt saved match row: {0}")]
    CorruptRow(String),
}

impl RepositoryError {
    /// Whether retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            RepositoryError::Unavailable(_) => true,
            RepositoryError::SqlxError(e) => matches!(
                e,
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
            ),
            _ => false,
        }
    }
}

/// Durable store of saved matches
///
/// `insert_if_absent` must never create a second record for the same
/// `(user_id, exhibitor_id)`; a repeated call returns the existing one.
#[async_trait]
pub trait SavedMatchRepository: Send + Sync {
    async fn insert_if_absent(
        &self,
        user_id: &str,
        result: &MatchResult,
    ) -> Result<SavedMatch, RepositoryError>;

    async fn query_by_user(&self, user_id: &str) -> Result<Vec<SavedMatch>, RepositoryError>;

    async fn health_check(&self) -> Result<bool, RepositoryError> {
        Ok(true)
    }
}

/// PostgreSQL-backed saved match store
///
/// Uniqueness is enforced by the `(user_id, exhibitor_id)` constraint, so
/// concurrent saves from rapid repeated taps still produce one row.
pub struct PostgresSavedMatchRepository {
    pool: PgPool,
}

impl PostgresSavedMatchRepository {
    /// Connect and run pending migrations
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout_secs: u64,
        idle_timeout_secs: u64,
    ) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(idle_timeout_secs))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    fn row_to_saved(row: &sqlx::postgres::PgRow) -> Result<SavedMatch, RepositoryError> {
        let score: i16 = row.try_get("score")?;
        let reasons: Vec<String> = row.try_get("reasons")?;
        let status: String = row.try_get("status")?;

        if status != MatchStatus::Saved.as_str() {
            return Err(RepositoryError::CorruptRow(format!("unknown status {}", status)));
        }

        Ok(SavedMatch {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            exhibitor_id: row.try_get("exhibitor_id")?,
            score: u8::try_from(score)
                .map_err(|_| RepositoryError::CorruptRow(format!("score {} out of range", score)))?,
            reasons: reasons.iter().filter_map(|r| ReasonCode::parse(r)).collect(),
            status: MatchStatus::Saved,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl SavedMatchRepository for PostgresSavedMatchRepository {
    async fn insert_if_absent(
        &self,
        user_id: &str,
        result: &MatchResult,
    ) -> Result<SavedMatch, RepositoryError> {
        let candidate = SavedMatch::from_result(user_id, result);
        let reasons: Vec<String> = candidate.reasons.iter().map(|r| r.as_str().to_string()).collect();

        let insert = r#"
            INSERT INTO saved_matches (id, user_id, exhibitor_id, score, reasons, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id, exhibitor_id) DO NOTHING
        "#;

        let inserted = sqlx::query(insert)
            .bind(candidate.id)
            .bind(&candidate.user_id)
            .bind(&candidate.exhibitor_id)
            .bind(i16::from(candidate.score))
            .bind(reasons)
            .bind(candidate.status.as_str())
            .bind(candidate.created_at)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if inserted == 0 {
            tracing::debug!(
                "Saved match {} -> {} already exists",
                user_id,
                result.exhibitor_id
            );
        }

        let select = r#"
            SELECT id, user_id, exhibitor_id, score, reasons, status, created_at
            FROM saved_matches
            WHERE user_id = $1 AND exhibitor_id = $2
        "#;

        let row = sqlx::query(select)
            .bind(user_id)
            .bind(&result.exhibitor_id)
            .fetch_one(&self.pool)
            .await?;

        Self::row_to_saved(&row)
    }

    async fn query_by_user(&self, user_id: &str) -> Result<Vec<SavedMatch>, RepositoryError> {
        let query = r#"
            SELECT id, user_id, exhibitor_id, score, reasons, status, created_at
            FROM saved_matches
            WHERE user_id = $1
            ORDER BY created_at ASC
        "#;

        let rows = sqlx::query(query).bind(user_id).fetch_all(&self.pool).await?;
        let saved = rows
            .iter()
            .map(Self::row_to_saved)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("User {} has {} saved matches", user_id, saved.len());
        Ok(saved)
    }

    async fn health_check(&self) -> Result<bool, RepositoryError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Process-local saved match store for tests and database-less deployments
#[derive(Default)]
pub struct InMemorySavedMatchRepository {
    entries: Mutex<HashMap<(String, String), SavedMatch>>,
}

impl InMemorySavedMatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[async_trait]
impl SavedMatchRepository for InMemorySavedMatchRepository {
    async fn insert_if_absent(
        &self,
        user_id: &str,
        result: &MatchResult,
    ) -> Result<SavedMatch, RepositoryError> {
        let mut entries = self.entries.lock().await;
        let saved = entries
            .entry((user_id.to_string(), result.exhibitor_id.clone()))
            .or_insert_with(|| SavedMatch::from_result(user_id, result));
        Ok(saved.clone())
    }

    async fn query_by_user(&self, user_id: &str) -> Result<Vec<SavedMatch>, RepositoryError> {
        let entries = self.entries.lock().await;
        let mut saved: Vec<SavedMatch> = entries
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        saved.sort_by_key(|m| m.created_at);
        Ok(saved)
    }
}
