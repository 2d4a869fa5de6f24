//! Persistence of waitlist entries.
//!
//! Handlers only see the [`WaitlistStore`] trait; the application wires in a
//! [`PgWaitlistStore`] when it is built.

use crate::domain::WaitlistEmail;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait WaitlistStore: Send + Sync + std::fmt::Debug {
    /// Insert a new entry for `email`.
    /// Must fail with [`InsertError::Duplicate`] if the email is already stored.
    async fn insert(&self, email: &WaitlistEmail) -> Result<(), InsertError>;

    /// Whether the underlying storage can currently be reached.
    async fn is_reachable(&self) -> bool;
}

#[derive(thiserror::Error)]
pub enum InsertError {
    #[error("{0} is already on the waitlist")]
    Duplicate(WaitlistEmail),
    #[error("Failed to save the waitlist entry")]
    Unexpected(#[source] anyhow::Error),
}

/// Waitlist entries stored in the `waitlist` table. The `UNIQUE` constraint on
/// `email` is what rejects duplicates, also under concurrent inserts.
#[derive(Debug, Clone)]
pub struct PgWaitlistStore {
    pool: PgPool,
}

impl PgWaitlistStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl WaitlistStore for PgWaitlistStore {
    #[tracing::instrument(name = "Saving new waitlist entry in database", skip(self))]
    async fn insert(&self, email: &WaitlistEmail) -> Result<(), InsertError> {
        sqlx::query(
            r#"INSERT INTO waitlist (id, email, created_at)
               VALUES ($1, $2, $3)"#,
        )
        .bind(Uuid::new_v4())
        .bind(email.as_ref())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                InsertError::Duplicate(email.clone())
            }
            e => {
                tracing::error!("Failed to execute query: {e:?}");
                InsertError::Unexpected(e.into())
            }
        })?;
        tracing::info!("New waitlist entry has been saved");

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn is_reachable(&self) -> bool {
        self.pool
            .acquire()
            .await
            .map_err(|e| {
                tracing::error!("{:?}", e);
                e
            })
            .is_ok()
    }
}
