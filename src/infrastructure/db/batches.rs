use crate::domain::error::{AppError, Result};
use crate::domain::feedback::{BatchStatistics, CategoryCount, UploadBatch};

use super::{pg_sql, DbPool, Store};

const BATCH_COLUMNS: &str = "id, filename, total_count, headers, uploaded_at";

impl Store {
    /// Record one uploaded file; `headers_json` is the JSON-encoded header
    /// row, kept so original rows can be displayed field-by-field later.
    pub async fn create_batch(
        &self,
        filename: &str,
        total_count: i64,
        headers_json: Option<&str>,
    ) -> Result<i64> {
        const SQL: &str =
            "INSERT INTO upload_batches (filename, total_count, headers) VALUES (?, ?, ?) RETURNING id";
        match &self.pool {
            DbPool::Sqlite(pool) => {
                sqlx::query_scalar::<_, i64>(SQL)
                    .bind(filename)
                    .bind(total_count)
                    .bind(headers_json)
                    .fetch_one(pool)
                    .await
            }
            DbPool::Postgres(pool) => {
                sqlx::query_scalar::<_, i64>(&pg_sql(SQL))
                    .bind(filename)
                    .bind(total_count)
                    .bind(headers_json)
                    .fetch_one(pool)
                    .await
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to create batch: {}", e)))
    }

    pub async fn list_batches(&self) -> Result<Vec<UploadBatch>> {
        let sql = format!(
            "SELECT {} FROM upload_batches ORDER BY uploaded_at DESC, id DESC",
            BATCH_COLUMNS
        );
        match &self.pool {
            DbPool::Sqlite(pool) => sqlx::query_as(&sql).fetch_all(pool).await,
            DbPool::Postgres(pool) => sqlx::query_as(&sql).fetch_all(pool).await,
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to list batches: {}", e)))
    }

    pub async fn get_batch(&self, batch_id: i64) -> Result<Option<UploadBatch>> {
        let sql = format!("SELECT {} FROM upload_batches WHERE id = ?", BATCH_COLUMNS);
        match &self.pool {
            DbPool::Sqlite(pool) => sqlx::query_as(&sql).bind(batch_id).fetch_optional(pool).await,
            DbPool::Postgres(pool) => {
                sqlx::query_as(&pg_sql(&sql)).bind(batch_id).fetch_optional(pool).await
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch batch: {}", e)))
    }

    pub async fn latest_batch(&self) -> Result<Option<UploadBatch>> {
        let sql = format!(
            "SELECT {} FROM upload_batches ORDER BY uploaded_at DESC, id DESC LIMIT 1",
            BATCH_COLUMNS
        );
        match &self.pool {
            DbPool::Sqlite(pool) => sqlx::query_as(&sql).fetch_optional(pool).await,
            DbPool::Postgres(pool) => sqlx::query_as(&sql).fetch_optional(pool).await,
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch latest batch: {}", e)))
    }

    /// Delete a batch together with its feedbacks.
    pub async fn delete_batch(&self, batch_id: i64) -> Result<()> {
        const DELETE_FEEDBACKS: &str = "DELETE FROM feedbacks WHERE upload_batch_id = ?";
        const DELETE_BATCH: &str = "DELETE FROM upload_batches WHERE id = ?";
        match &self.pool {
            DbPool::Sqlite(pool) => {
                sqlx::query(DELETE_FEEDBACKS).bind(batch_id).execute(pool).await?;
                sqlx::query(DELETE_BATCH).bind(batch_id).execute(pool).await?;
                Ok::<_, sqlx::Error>(())
            }
            DbPool::Postgres(pool) => {
                sqlx::query(&pg_sql(DELETE_FEEDBACKS)).bind(batch_id).execute(pool).await?;
                sqlx::query(&pg_sql(DELETE_BATCH)).bind(batch_id).execute(pool).await?;
                Ok(())
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to delete batch: {}", e)))
    }

    /// Totals, user-type distribution and per-category counts for one batch.
    pub async fn batch_statistics(&self, batch_id: i64) -> Result<BatchStatistics> {
        const TOTAL: &str = "SELECT COUNT(*) FROM feedbacks WHERE upload_batch_id = ?";
        const BY_USER: &str = "SELECT user_type, COUNT(*) FROM feedbacks \
             WHERE upload_batch_id = ? GROUP BY user_type";
        const BY_CATEGORY: &str = "SELECT category, COUNT(*) as count FROM feedbacks \
             WHERE upload_batch_id = ? GROUP BY category ORDER BY count DESC, category";

        let (total, users, category_stats) = match &self.pool {
            DbPool::Sqlite(pool) => {
                let total = sqlx::query_scalar::<_, i64>(TOTAL).bind(batch_id).fetch_one(pool).await?;
                let users = sqlx::query_as::<_, (String, i64)>(BY_USER)
                    .bind(batch_id)
                    .fetch_all(pool)
                    .await?;
                let categories = sqlx::query_as::<_, CategoryCount>(BY_CATEGORY)
                    .bind(batch_id)
                    .fetch_all(pool)
                    .await?;
                Ok::<_, sqlx::Error>((total, users, categories))
            }
            DbPool::Postgres(pool) => {
                let total = sqlx::query_scalar::<_, i64>(&pg_sql(TOTAL))
                    .bind(batch_id)
                    .fetch_one(pool)
                    .await?;
                let users = sqlx::query_as::<_, (String, i64)>(&pg_sql(BY_USER))
                    .bind(batch_id)
                    .fetch_all(pool)
                    .await?;
                let categories = sqlx::query_as::<_, CategoryCount>(&pg_sql(BY_CATEGORY))
                    .bind(batch_id)
                    .fetch_all(pool)
                    .await?;
                Ok((total, users, categories))
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to compute batch statistics: {}", e)))?;

        Ok(BatchStatistics {
            total,
            user_distribution: users.into_iter().collect(),
            category_stats,
        })
    }
}
