use crate::domain::error::{AppError, Result};
use crate::domain::feedback::{CategoryGroup, Feedback, NewFeedback};

use super::{pg_sql, DbPool, Store};

const FEEDBACK_COLUMNS: &str =
    "id, upload_batch_id, user_type, content, category, attachment, original_row, created_at";

impl Store {
    /// Store one batch's ingested records. Returns how many rows landed.
    pub async fn insert_feedbacks(&self, batch_id: i64, records: &[NewFeedback]) -> Result<i64> {
        const SQL: &str = "INSERT INTO feedbacks \
             (upload_batch_id, user_type, content, category, attachment, original_row) \
             VALUES (?, ?, ?, ?, ?, ?)";
        for record in records {
            // Arms map to rows_affected so both backends join on u64.
            match &self.pool {
                DbPool::Sqlite(pool) => {
                    sqlx::query(SQL)
                        .bind(batch_id)
                        .bind(&record.user_type)
                        .bind(&record.content)
                        .bind(&record.category)
                        .bind(&record.attachment)
                        .bind(&record.original_row)
                        .execute(pool)
                        .await
                        .map(|r| r.rows_affected())
                }
                DbPool::Postgres(pool) => {
                    sqlx::query(&pg_sql(SQL))
                        .bind(batch_id)
                        .bind(&record.user_type)
                        .bind(&record.content)
                        .bind(&record.category)
                        .bind(&record.attachment)
                        .bind(&record.original_row)
                        .execute(pool)
                        .await
                        .map(|r| r.rows_affected())
                }
            }
            .map_err(|e| AppError::DatabaseError(format!("Failed to insert feedback: {}", e)))?;
        }
        Ok(records.len() as i64)
    }

    pub async fn feedbacks_by_category(
        &self,
        batch_id: i64,
        category: &str,
    ) -> Result<Vec<Feedback>> {
        let sql = format!(
            "SELECT {} FROM feedbacks WHERE upload_batch_id = ? AND category = ? \
             ORDER BY created_at DESC, id DESC",
            FEEDBACK_COLUMNS
        );
        match &self.pool {
            DbPool::Sqlite(pool) => {
                sqlx::query_as(&sql).bind(batch_id).bind(category).fetch_all(pool).await
            }
            DbPool::Postgres(pool) => {
                sqlx::query_as(&pg_sql(&sql)).bind(batch_id).bind(category).fetch_all(pool).await
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch feedbacks: {}", e)))
    }

    /// All of a batch's feedbacks bucketed by category, categories in the
    /// stored order they first appear.
    pub async fn feedbacks_grouped(&self, batch_id: i64) -> Result<Vec<CategoryGroup>> {
        let sql = format!(
            "SELECT {} FROM feedbacks WHERE upload_batch_id = ? \
             ORDER BY category, created_at DESC, id DESC",
            FEEDBACK_COLUMNS
        );
        let rows: Vec<Feedback> = match &self.pool {
            DbPool::Sqlite(pool) => sqlx::query_as(&sql).bind(batch_id).fetch_all(pool).await,
            DbPool::Postgres(pool) => {
                sqlx::query_as(&pg_sql(&sql)).bind(batch_id).fetch_all(pool).await
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch feedbacks: {}", e)))?;

        let mut groups: Vec<CategoryGroup> = Vec::new();
        for feedback in rows {
            match groups.last_mut() {
                Some(group) if group.category == feedback.category => {
                    group.feedbacks.push(feedback)
                }
                _ => groups.push(CategoryGroup {
                    category: feedback.category.clone(),
                    feedbacks: vec![feedback],
                }),
            }
        }
        Ok(groups)
    }

    pub async fn feedback_by_id(&self, feedback_id: i64) -> Result<Option<Feedback>> {
        let sql = format!("SELECT {} FROM feedbacks WHERE id = ?", FEEDBACK_COLUMNS);
        match &self.pool {
            DbPool::Sqlite(pool) => {
                sqlx::query_as(&sql).bind(feedback_id).fetch_optional(pool).await
            }
            DbPool::Postgres(pool) => {
                sqlx::query_as(&pg_sql(&sql)).bind(feedback_id).fetch_optional(pool).await
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch feedback: {}", e)))
    }

    /// Manual re-triage of a single feedback. Returns false when the id
    /// does not exist.
    pub async fn update_category(&self, feedback_id: i64, category: &str) -> Result<bool> {
        const SQL: &str = "UPDATE feedbacks SET category = ? WHERE id = ?";
        let affected = match &self.pool {
            DbPool::Sqlite(pool) => {
                sqlx::query(SQL)
                    .bind(category)
                    .bind(feedback_id)
                    .execute(pool)
                    .await
                    .map(|r| r.rows_affected())
            }
            DbPool::Postgres(pool) => {
                sqlx::query(&pg_sql(SQL))
                    .bind(category)
                    .bind(feedback_id)
                    .execute(pool)
                    .await
                    .map(|r| r.rows_affected())
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to update category: {}", e)))?;
        Ok(affected > 0)
    }

    /// Distinct category names currently present in one batch.
    pub async fn categories_for_batch(&self, batch_id: i64) -> Result<Vec<String>> {
        const SQL: &str = "SELECT DISTINCT category FROM feedbacks \
             WHERE upload_batch_id = ? ORDER BY category";
        match &self.pool {
            DbPool::Sqlite(pool) => {
                sqlx::query_scalar(SQL).bind(batch_id).fetch_all(pool).await
            }
            DbPool::Postgres(pool) => {
                sqlx::query_scalar(&pg_sql(SQL)).bind(batch_id).fetch_all(pool).await
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to list categories: {}", e)))
    }

    /// Rename every feedback in `batch_id` carrying `old_name`. Returns the
    /// number of rows touched.
    pub async fn rename_category(
        &self,
        batch_id: i64,
        old_name: &str,
        new_name: &str,
    ) -> Result<u64> {
        const SQL: &str =
            "UPDATE feedbacks SET category = ? WHERE upload_batch_id = ? AND category = ?";
        match &self.pool {
            DbPool::Sqlite(pool) => {
                sqlx::query(SQL)
                    .bind(new_name)
                    .bind(batch_id)
                    .bind(old_name)
                    .execute(pool)
                    .await
                    .map(|r| r.rows_affected())
            }
            DbPool::Postgres(pool) => {
                sqlx::query(&pg_sql(SQL))
                    .bind(new_name)
                    .bind(batch_id)
                    .bind(old_name)
                    .execute(pool)
                    .await
                    .map(|r| r.rows_affected())
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to rename category: {}", e)))
    }
}
