use crate::domain::error::{AppError, Result};
use crate::domain::feedback::{
    BoardCard, BoardCategoryCount, BoardColumn, BoardStatistics, KanbanCategory,
};

use super::{pg_sql, DbPool, Store};

const CATEGORY_COLUMNS: &str = "id, batch_id, name, color, sort_order, created_at";

/// Display bucket for items not yet assigned to a column.
const UNCATEGORIZED_NAME: &str = "未分类";
const UNCATEGORIZED_COLOR: &str = "#6B7280";

const CARD_SELECT: &str = "SELECT ki.id, ki.feedback_id, ki.category_id, ki.note, ki.sort_order, \
     ki.added_at, f.content, f.user_type, f.category AS original_category, f.attachment, \
     f.upload_batch_id, ub.filename AS batch_name \
     FROM kanban_items ki \
     JOIN feedbacks f ON f.id = ki.feedback_id \
     LEFT JOIN upload_batches ub ON ub.id = f.upload_batch_id";

impl Store {
    /// Create a board column for a batch, appended after its existing ones.
    pub async fn create_kanban_category(
        &self,
        batch_id: i64,
        name: &str,
        color: &str,
    ) -> Result<i64> {
        const NEXT_SORT: &str = "SELECT COALESCE(MAX(sort_order), 0) + 1 \
             FROM kanban_categories WHERE batch_id = ?";
        const INSERT: &str = "INSERT INTO kanban_categories (batch_id, name, color, sort_order) \
             VALUES (?, ?, ?, ?) RETURNING id";
        match &self.pool {
            DbPool::Sqlite(pool) => {
                let sort: i64 =
                    sqlx::query_scalar(NEXT_SORT).bind(batch_id).fetch_one(pool).await?;
                sqlx::query_scalar::<_, i64>(INSERT)
                    .bind(batch_id)
                    .bind(name)
                    .bind(color)
                    .bind(sort)
                    .fetch_one(pool)
                    .await
            }
            DbPool::Postgres(pool) => {
                let sort: i64 =
                    sqlx::query_scalar(&pg_sql(NEXT_SORT)).bind(batch_id).fetch_one(pool).await?;
                sqlx::query_scalar::<_, i64>(&pg_sql(INSERT))
                    .bind(batch_id)
                    .bind(name)
                    .bind(color)
                    .bind(sort)
                    .fetch_one(pool)
                    .await
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to create kanban category: {}", e)))
    }

    pub async fn list_kanban_categories(
        &self,
        batch_id: Option<i64>,
    ) -> Result<Vec<KanbanCategory>> {
        let mut sql = format!("SELECT {} FROM kanban_categories", CATEGORY_COLUMNS);
        if batch_id.is_some() {
            sql.push_str(" WHERE batch_id = ?");
        }
        sql.push_str(" ORDER BY sort_order, id");

        match &self.pool {
            DbPool::Sqlite(pool) => {
                let mut query = sqlx::query_as(&sql);
                if let Some(batch_id) = batch_id {
                    query = query.bind(batch_id);
                }
                query.fetch_all(pool).await
            }
            DbPool::Postgres(pool) => {
                let sql = pg_sql(&sql);
                let mut query = sqlx::query_as(&sql);
                if let Some(batch_id) = batch_id {
                    query = query.bind(batch_id);
                }
                query.fetch_all(pool).await
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to list kanban categories: {}", e)))
    }

    pub async fn kanban_category_by_id(&self, category_id: i64) -> Result<Option<KanbanCategory>> {
        let sql = format!("SELECT {} FROM kanban_categories WHERE id = ?", CATEGORY_COLUMNS);
        match &self.pool {
            DbPool::Sqlite(pool) => {
                sqlx::query_as(&sql).bind(category_id).fetch_optional(pool).await
            }
            DbPool::Postgres(pool) => {
                sqlx::query_as(&pg_sql(&sql)).bind(category_id).fetch_optional(pool).await
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch kanban category: {}", e)))
    }

    /// Rename and/or recolor a column. Returns false when the id is unknown
    /// or nothing was asked to change.
    pub async fn update_kanban_category(
        &self,
        category_id: i64,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<bool> {
        let mut sets: Vec<&str> = Vec::new();
        if name.is_some() {
            sets.push("name = ?");
        }
        if color.is_some() {
            sets.push("color = ?");
        }
        if sets.is_empty() {
            return Ok(false);
        }
        let sql = format!(
            "UPDATE kanban_categories SET {} WHERE id = ?",
            sets.join(", ")
        );

        let affected = match &self.pool {
            DbPool::Sqlite(pool) => {
                let mut query = sqlx::query(&sql);
                if let Some(name) = name {
                    query = query.bind(name);
                }
                if let Some(color) = color {
                    query = query.bind(color);
                }
                query.bind(category_id).execute(pool).await.map(|r| r.rows_affected())
            }
            DbPool::Postgres(pool) => {
                let sql = pg_sql(&sql);
                let mut query = sqlx::query(&sql);
                if let Some(name) = name {
                    query = query.bind(name);
                }
                if let Some(color) = color {
                    query = query.bind(color);
                }
                query.bind(category_id).execute(pool).await.map(|r| r.rows_affected())
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to update kanban category: {}", e)))?;
        Ok(affected > 0)
    }

    /// Drop a column; its cards fall back to the uncategorized bucket.
    pub async fn delete_kanban_category(&self, category_id: i64) -> Result<bool> {
        const ORPHAN_ITEMS: &str =
            "UPDATE kanban_items SET category_id = NULL WHERE category_id = ?";
        const DELETE: &str = "DELETE FROM kanban_categories WHERE id = ?";
        let affected = match &self.pool {
            DbPool::Sqlite(pool) => {
                sqlx::query(ORPHAN_ITEMS).bind(category_id).execute(pool).await?;
                sqlx::query(DELETE)
                    .bind(category_id)
                    .execute(pool)
                    .await
                    .map(|r| r.rows_affected())
            }
            DbPool::Postgres(pool) => {
                sqlx::query(&pg_sql(ORPHAN_ITEMS)).bind(category_id).execute(pool).await?;
                sqlx::query(&pg_sql(DELETE))
                    .bind(category_id)
                    .execute(pool)
                    .await
                    .map(|r| r.rows_affected())
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to delete kanban category: {}", e)))?;
        Ok(affected > 0)
    }

    /// Pin a feedback to the board. A feedback appears at most once, so a
    /// second add moves the existing card instead of duplicating it.
    pub async fn add_board_item(
        &self,
        feedback_id: i64,
        category_id: Option<i64>,
        note: Option<&str>,
    ) -> Result<i64> {
        const EXISTING: &str = "SELECT id FROM kanban_items WHERE feedback_id = ?";
        const UPDATE: &str = "UPDATE kanban_items SET category_id = ?, note = ? WHERE id = ?";
        const NEXT_SORT_IN: &str = "SELECT COALESCE(MAX(sort_order), 0) + 1 \
             FROM kanban_items WHERE category_id = ?";
        const NEXT_SORT_NULL: &str = "SELECT COALESCE(MAX(sort_order), 0) + 1 \
             FROM kanban_items WHERE category_id IS NULL";
        const INSERT: &str = "INSERT INTO kanban_items (feedback_id, category_id, note, sort_order) \
             VALUES (?, ?, ?, ?) RETURNING id";

        match &self.pool {
            DbPool::Sqlite(pool) => {
                let existing: Option<i64> =
                    sqlx::query_scalar(EXISTING).bind(feedback_id).fetch_optional(pool).await?;
                if let Some(item_id) = existing {
                    sqlx::query(UPDATE)
                        .bind(category_id)
                        .bind(note)
                        .bind(item_id)
                        .execute(pool)
                        .await?;
                    return Ok(item_id);
                }
                let sort: i64 = match category_id {
                    Some(category_id) => {
                        sqlx::query_scalar(NEXT_SORT_IN).bind(category_id).fetch_one(pool).await?
                    }
                    None => sqlx::query_scalar(NEXT_SORT_NULL).fetch_one(pool).await?,
                };
                Ok(sqlx::query_scalar::<_, i64>(INSERT)
                    .bind(feedback_id)
                    .bind(category_id)
                    .bind(note)
                    .bind(sort)
                    .fetch_one(pool)
                    .await?)
            }
            DbPool::Postgres(pool) => {
                let existing: Option<i64> = sqlx::query_scalar(&pg_sql(EXISTING))
                    .bind(feedback_id)
                    .fetch_optional(pool)
                    .await?;
                if let Some(item_id) = existing {
                    sqlx::query(&pg_sql(UPDATE))
                        .bind(category_id)
                        .bind(note)
                        .bind(item_id)
                        .execute(pool)
                        .await?;
                    return Ok(item_id);
                }
                let sort: i64 = match category_id {
                    Some(category_id) => {
                        sqlx::query_scalar(&pg_sql(NEXT_SORT_IN))
                            .bind(category_id)
                            .fetch_one(pool)
                            .await?
                    }
                    None => sqlx::query_scalar(NEXT_SORT_NULL).fetch_one(pool).await?,
                };
                Ok(sqlx::query_scalar::<_, i64>(&pg_sql(INSERT))
                    .bind(feedback_id)
                    .bind(category_id)
                    .bind(note)
                    .bind(sort)
                    .fetch_one(pool)
                    .await?)
            }
        }
        .map_err(|e: sqlx::Error| {
            AppError::DatabaseError(format!("Failed to add board item: {}", e))
        })
    }

    pub async fn remove_board_item(&self, feedback_id: i64) -> Result<bool> {
        const SQL: &str = "DELETE FROM kanban_items WHERE feedback_id = ?";
        let affected = match &self.pool {
            DbPool::Sqlite(pool) => {
                sqlx::query(SQL)
                    .bind(feedback_id)
                    .execute(pool)
                    .await
                    .map(|r| r.rows_affected())
            }
            DbPool::Postgres(pool) => {
                sqlx::query(&pg_sql(SQL))
                    .bind(feedback_id)
                    .execute(pool)
                    .await
                    .map(|r| r.rows_affected())
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to remove board item: {}", e)))?;
        Ok(affected > 0)
    }

    /// Move a card to another column (or to the uncategorized bucket),
    /// appended at that column's tail.
    pub async fn move_board_item(
        &self,
        feedback_id: i64,
        category_id: Option<i64>,
    ) -> Result<bool> {
        const NEXT_SORT_IN: &str = "SELECT COALESCE(MAX(sort_order), 0) + 1 \
             FROM kanban_items WHERE category_id = ?";
        const NEXT_SORT_NULL: &str = "SELECT COALESCE(MAX(sort_order), 0) + 1 \
             FROM kanban_items WHERE category_id IS NULL";
        const UPDATE: &str =
            "UPDATE kanban_items SET category_id = ?, sort_order = ? WHERE feedback_id = ?";

        let affected = match &self.pool {
            DbPool::Sqlite(pool) => {
                let sort: i64 = match category_id {
                    Some(category_id) => {
                        sqlx::query_scalar(NEXT_SORT_IN).bind(category_id).fetch_one(pool).await?
                    }
                    None => sqlx::query_scalar(NEXT_SORT_NULL).fetch_one(pool).await?,
                };
                sqlx::query(UPDATE)
                    .bind(category_id)
                    .bind(sort)
                    .bind(feedback_id)
                    .execute(pool)
                    .await
                    .map(|r| r.rows_affected())
            }
            DbPool::Postgres(pool) => {
                let sort: i64 = match category_id {
                    Some(category_id) => {
                        sqlx::query_scalar(&pg_sql(NEXT_SORT_IN))
                            .bind(category_id)
                            .fetch_one(pool)
                            .await?
                    }
                    None => sqlx::query_scalar(NEXT_SORT_NULL).fetch_one(pool).await?,
                };
                sqlx::query(&pg_sql(UPDATE))
                    .bind(category_id)
                    .bind(sort)
                    .bind(feedback_id)
                    .execute(pool)
                    .await
                    .map(|r| r.rows_affected())
            }
        }
        .map_err(|e: sqlx::Error| {
            AppError::DatabaseError(format!("Failed to move board item: {}", e))
        })?;
        Ok(affected > 0)
    }

    pub async fn is_in_board(&self, feedback_id: i64) -> Result<bool> {
        const SQL: &str = "SELECT COUNT(*) FROM kanban_items WHERE feedback_id = ?";
        let count: i64 = match &self.pool {
            DbPool::Sqlite(pool) => {
                sqlx::query_scalar(SQL).bind(feedback_id).fetch_one(pool).await
            }
            DbPool::Postgres(pool) => {
                sqlx::query_scalar(&pg_sql(SQL)).bind(feedback_id).fetch_one(pool).await
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to check board membership: {}", e)))?;
        Ok(count > 0)
    }

    /// The board card carrying one feedback, if it is pinned.
    pub async fn board_item_for_feedback(&self, feedback_id: i64) -> Result<Option<BoardCard>> {
        let sql = format!("{} WHERE ki.feedback_id = ?", CARD_SELECT);
        match &self.pool {
            DbPool::Sqlite(pool) => {
                sqlx::query_as(&sql).bind(feedback_id).fetch_optional(pool).await
            }
            DbPool::Postgres(pool) => {
                sqlx::query_as(&pg_sql(&sql)).bind(feedback_id).fetch_optional(pool).await
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch board item: {}", e)))
    }

    /// Cards in one column (or the uncategorized bucket), optionally
    /// restricted to a batch, in board order.
    pub async fn board_cards(
        &self,
        category_id: Option<i64>,
        batch_id: Option<i64>,
    ) -> Result<Vec<BoardCard>> {
        let mut sql = String::from(CARD_SELECT);
        match category_id {
            Some(_) => sql.push_str(" WHERE ki.category_id = ?"),
            None => sql.push_str(" WHERE ki.category_id IS NULL"),
        }
        if batch_id.is_some() {
            sql.push_str(" AND f.upload_batch_id = ?");
        }
        sql.push_str(" ORDER BY ki.sort_order, ki.id");

        match &self.pool {
            DbPool::Sqlite(pool) => {
                let mut query = sqlx::query_as(&sql);
                if let Some(category_id) = category_id {
                    query = query.bind(category_id);
                }
                if let Some(batch_id) = batch_id {
                    query = query.bind(batch_id);
                }
                query.fetch_all(pool).await
            }
            DbPool::Postgres(pool) => {
                let sql = pg_sql(&sql);
                let mut query = sqlx::query_as(&sql);
                if let Some(category_id) = category_id {
                    query = query.bind(category_id);
                }
                if let Some(batch_id) = batch_id {
                    query = query.bind(batch_id);
                }
                query.fetch_all(pool).await
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch board cards: {}", e)))
    }

    /// The full board: an uncategorized bucket first (only when it holds
    /// cards), then every column in sort order.
    pub async fn board(&self, batch_id: Option<i64>) -> Result<Vec<BoardColumn>> {
        let mut columns = Vec::new();

        let uncategorized = self.board_cards(None, batch_id).await?;
        if !uncategorized.is_empty() {
            columns.push(BoardColumn {
                name: UNCATEGORIZED_NAME.to_string(),
                category_id: None,
                color: UNCATEGORIZED_COLOR.to_string(),
                feedback_list: uncategorized,
            });
        }

        for category in self.list_kanban_categories(batch_id).await? {
            let cards = self.board_cards(Some(category.id), batch_id).await?;
            columns.push(BoardColumn {
                name: category.name,
                category_id: Some(category.id),
                color: category.color,
                feedback_list: cards,
            });
        }
        Ok(columns)
    }

    pub async fn board_statistics(&self, batch_id: Option<i64>) -> Result<BoardStatistics> {
        let mut total_sql = String::from(
            "SELECT COUNT(*) FROM kanban_items ki JOIN feedbacks f ON f.id = ki.feedback_id",
        );
        let mut uncategorized_sql = String::from(
            "SELECT COUNT(*) FROM kanban_items ki JOIN feedbacks f ON f.id = ki.feedback_id \
             WHERE ki.category_id IS NULL",
        );
        let mut per_category_sql = String::from(
            "SELECT kc.id, kc.name, kc.color, COUNT(ki.id) AS count \
             FROM kanban_categories kc \
             LEFT JOIN kanban_items ki ON ki.category_id = kc.id",
        );
        if batch_id.is_some() {
            total_sql.push_str(" WHERE f.upload_batch_id = ?");
            uncategorized_sql.push_str(" AND f.upload_batch_id = ?");
            per_category_sql.push_str(" WHERE kc.batch_id = ?");
        }
        per_category_sql.push_str(" GROUP BY kc.id, kc.name, kc.color, kc.sort_order \
             ORDER BY kc.sort_order, kc.id");

        let (total, uncategorized_count, category_stats) = match &self.pool {
            DbPool::Sqlite(pool) => {
                let mut total_query = sqlx::query_scalar::<_, i64>(&total_sql);
                let mut uncategorized_query = sqlx::query_scalar::<_, i64>(&uncategorized_sql);
                let mut per_category_query =
                    sqlx::query_as::<_, BoardCategoryCount>(&per_category_sql);
                if let Some(batch_id) = batch_id {
                    total_query = total_query.bind(batch_id);
                    uncategorized_query = uncategorized_query.bind(batch_id);
                    per_category_query = per_category_query.bind(batch_id);
                }
                let total = total_query.fetch_one(pool).await?;
                let uncategorized = uncategorized_query.fetch_one(pool).await?;
                let categories = per_category_query.fetch_all(pool).await?;
                Ok::<_, sqlx::Error>((total, uncategorized, categories))
            }
            DbPool::Postgres(pool) => {
                let total_sql = pg_sql(&total_sql);
                let uncategorized_sql = pg_sql(&uncategorized_sql);
                let per_category_sql = pg_sql(&per_category_sql);
                let mut total_query = sqlx::query_scalar::<_, i64>(&total_sql);
                let mut uncategorized_query = sqlx::query_scalar::<_, i64>(&uncategorized_sql);
                let mut per_category_query =
                    sqlx::query_as::<_, BoardCategoryCount>(&per_category_sql);
                if let Some(batch_id) = batch_id {
                    total_query = total_query.bind(batch_id);
                    uncategorized_query = uncategorized_query.bind(batch_id);
                    per_category_query = per_category_query.bind(batch_id);
                }
                let total = total_query.fetch_one(pool).await?;
                let uncategorized = uncategorized_query.fetch_one(pool).await?;
                let categories = per_category_query.fetch_all(pool).await?;
                Ok((total, uncategorized, categories))
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to compute board statistics: {}", e)))?;

        Ok(BoardStatistics {
            total,
            category_stats,
            uncategorized_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::feedback::NewFeedback;
    use crate::infrastructure::db::Store;

    async fn store_with_batch() -> (Store, i64) {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        let batch_id = store.create_batch("week32.csv", 3, None).await.unwrap();
        let records = vec![
            record("Member", "连接超时", "网络连接异常"),
            record("Normal User", "希望增加夜间模式", "功能建议与反馈"),
            record("Unknown", "随便聊聊", "Other"),
        ];
        let inserted = store.insert_feedbacks(batch_id, &records).await.unwrap();
        assert_eq!(inserted, 3);
        (store, batch_id)
    }

    fn record(user_type: &str, content: &str, category: &str) -> NewFeedback {
        NewFeedback {
            user_type: user_type.to_string(),
            content: content.to_string(),
            category: category.to_string(),
            attachment: String::new(),
            original_row: format!("[\"{}\"]", content),
        }
    }

    #[tokio::test]
    async fn test_batch_roundtrip_and_statistics() {
        let (store, batch_id) = store_with_batch().await;

        let batches = store.list_batches().await.unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].filename, "week32.csv");
        assert_eq!(store.latest_batch().await.unwrap().unwrap().id, batch_id);

        let stats = store.batch_statistics(batch_id).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.user_distribution.get("Member"), Some(&1));
        assert_eq!(stats.category_stats.len(), 3);

        store.delete_batch(batch_id).await.unwrap();
        assert!(store.get_batch(batch_id).await.unwrap().is_none());
        assert_eq!(store.batch_statistics(batch_id).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_feedback_queries_and_retriage() {
        let (store, batch_id) = store_with_batch().await;

        let groups = store.feedbacks_grouped(batch_id).await.unwrap();
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|group| group.feedbacks.len() == 1));

        let other = store.feedbacks_by_category(batch_id, "Other").await.unwrap();
        assert_eq!(other.len(), 1);
        let feedback_id = other[0].id;

        assert!(store.update_category(feedback_id, "功能使用问题").await.unwrap());
        let updated = store.feedback_by_id(feedback_id).await.unwrap().unwrap();
        assert_eq!(updated.category, "功能使用问题");
        assert!(!store.update_category(9999, "Other").await.unwrap());

        let mut categories = store.categories_for_batch(batch_id).await.unwrap();
        categories.sort();
        assert!(categories.contains(&"功能使用问题".to_string()));
        assert!(!categories.contains(&"Other".to_string()));

        let touched = store
            .rename_category(batch_id, "功能使用问题", "易用性问题")
            .await
            .unwrap();
        assert_eq!(touched, 1);
        assert_eq!(
            store.rename_category(batch_id, "不存在的分类", "x").await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_board_lifecycle() {
        let (store, batch_id) = store_with_batch().await;
        let feedbacks = store.feedbacks_grouped(batch_id).await.unwrap();
        let first = feedbacks[0].feedbacks[0].id;
        let second = feedbacks[1].feedbacks[0].id;

        // Pin without a column first, then create one and move the card in.
        store.add_board_item(first, None, Some("待确认")).await.unwrap();
        assert!(store.is_in_board(first).await.unwrap());
        assert!(!store.is_in_board(second).await.unwrap());

        let column = store
            .create_kanban_category(batch_id, "本周跟进", "#3B82F6")
            .await
            .unwrap();
        assert!(store.move_board_item(first, Some(column)).await.unwrap());
        store.add_board_item(second, Some(column), None).await.unwrap();

        let board = store.board(Some(batch_id)).await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].name, "本周跟进");
        assert_eq!(board[0].feedback_list.len(), 2);
        assert_eq!(board[0].feedback_list[0].feedback_id, first);
        assert!(board[0].feedback_list[0].batch_name.as_deref() == Some("week32.csv"));

        // Re-adding the same feedback moves it instead of duplicating.
        store.add_board_item(first, None, None).await.unwrap();
        let board = store.board(Some(batch_id)).await.unwrap();
        assert_eq!(board[0].name, "未分类");
        assert_eq!(board[0].feedback_list.len(), 1);

        let stats = store.board_statistics(Some(batch_id)).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.uncategorized_count, 1);
        assert_eq!(stats.category_stats.len(), 1);
        assert_eq!(stats.category_stats[0].count, 1);

        assert!(store
            .update_kanban_category(column, Some("下周跟进"), None)
            .await
            .unwrap());
        assert!(store.delete_kanban_category(column).await.unwrap());
        let stats = store.board_statistics(Some(batch_id)).await.unwrap();
        assert_eq!(stats.uncategorized_count, 2);

        assert!(store.remove_board_item(first).await.unwrap());
        assert!(!store.remove_board_item(first).await.unwrap());
    }
}
