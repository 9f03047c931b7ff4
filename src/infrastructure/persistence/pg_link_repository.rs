//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use futures_util::StreamExt;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::row_stream::{EXPORT_CHANNEL_CAPACITY, pump_rows, receiver_stream};
use crate::domain::entities::{ExportRow, Link, LinkPage, LinkPatch, NewLink};
use crate::domain::errors::{StorageError, StorageResult};
use crate::domain::repositories::{ExportRowStream, LinkRepository};

const LINK_COLUMNS: &str = "id, original_url, shortened_url, access_count, created_at";

/// PostgreSQL repository for link storage and retrieval.
///
/// Uses SQLx prepared statements for SQL injection protection and type safety.
/// Key uniqueness is enforced by the `links_shortened_url_key` constraint.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn find_by_shortened_url(&self, shortened_url: &str) -> StorageResult<Option<Link>> {
        let link = sqlx::query_as::<_, Link>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE shortened_url = $1"
        ))
        .bind(shortened_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<Link>> {
        let link = sqlx::query_as::<_, Link>(&format!("SELECT {LINK_COLUMNS} FROM links WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(link)
    }

    async fn create(&self, new_link: NewLink) -> StorageResult<Link> {
        let link = sqlx::query_as::<_, Link>(&format!(
            r#"
            INSERT INTO links (id, original_url, shortened_url)
            VALUES ($1, $2, $3)
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(&new_link.original_url)
        .bind(&new_link.shortened_url)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn update(&self, id: Uuid, patch: LinkPatch) -> StorageResult<Link> {
        sqlx::query_as::<_, Link>(&format!(
            r#"
            UPDATE links
            SET original_url  = COALESCE($2, original_url),
                shortened_url = COALESCE($3, shortened_url)
            WHERE id = $1
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.original_url)
        .bind(patch.shortened_url)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(StorageError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    async fn increment_access_count(&self, shortened_url: &str) -> StorageResult<()> {
        sqlx::query("UPDATE links SET access_count = access_count + 1 WHERE shortened_url = $1")
            .bind(shortened_url)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn get_access_count(&self, shortened_url: &str) -> StorageResult<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT access_count FROM links WHERE shortened_url = $1")
                .bind(shortened_url)
                .fetch_optional(self.pool.as_ref())
                .await?;

        Ok(count.unwrap_or(0))
    }

    async fn get_all_links(&self, limit: u32, cursor: Option<Uuid>) -> StorageResult<LinkPage> {
        let links = sqlx::query_as::<_, Link>(&format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links
            WHERE ($1::uuid IS NULL OR id > $1)
            ORDER BY id ASC
            LIMIT $2
            "#
        ))
        .bind(cursor)
        .bind(i64::from(limit) + 1)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(LinkPage::from_overfetch(links, limit as usize))
    }

    fn stream_all_links(&self) -> ExportRowStream {
        let (tx, rx) = mpsc::channel(EXPORT_CHANNEL_CAPACITY);
        let pool = self.pool.clone();

        tokio::spawn(async move {
            let rows = sqlx::query_as::<_, ExportRow>(
                r#"
                SELECT original_url, shortened_url, access_count, created_at
                FROM links
                ORDER BY id ASC
                "#,
            )
            .fetch(pool.as_ref())
            .map(|row| row.map_err(StorageError::from));

            let forwarded = pump_rows(rows, tx).await;
            tracing::debug!(forwarded, "Link export scan finished");
        });

        receiver_stream(rx)
    }

    async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.pool.as_ref())
            .await
            .is_ok()
    }
}
