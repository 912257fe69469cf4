// ============================================================
// FEEDBACK ENTITIES
// ============================================================
// Rows of the upload_batches / feedbacks / kanban_* tables plus
// the aggregate shapes the API serves.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One uploaded CSV file's worth of ingested rows.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UploadBatch {
    pub id: i64,
    pub filename: String,
    pub total_count: i64,
    /// JSON array of the original header row, kept for later display.
    pub headers: Option<String>,
    pub uploaded_at: NaiveDateTime,
}

/// A stored feedback row. Only `category` is ever mutated after insert,
/// by manual re-triage.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Feedback {
    pub id: i64,
    pub upload_batch_id: i64,
    pub user_type: String,
    pub content: String,
    pub category: String,
    /// Newline-joined attachment URLs, or the raw cell text.
    pub attachment: String,
    /// JSON array of the source CSV row.
    pub original_row: String,
    pub created_at: NaiveDateTime,
}

/// A feedback record produced by the ingestion pipeline, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFeedback {
    pub user_type: String,
    pub content: String,
    pub category: String,
    pub attachment: String,
    pub original_row: String,
}

/// A kanban column definition, scoped to one batch.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct KanbanCategory {
    pub id: i64,
    pub batch_id: i64,
    pub name: String,
    pub color: String,
    pub sort_order: i64,
    pub created_at: NaiveDateTime,
}

/// A feedback pinned to the kanban board, joined with its feedback row
/// and the owning batch's filename.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BoardCard {
    pub id: i64,
    pub feedback_id: i64,
    pub category_id: Option<i64>,
    pub note: Option<String>,
    pub sort_order: i64,
    pub added_at: NaiveDateTime,
    pub content: String,
    pub user_type: String,
    /// The classifier-assigned category the feedback came in with.
    pub original_category: String,
    pub attachment: String,
    pub upload_batch_id: i64,
    pub batch_name: Option<String>,
}

/// One kanban column with its cards, in board display order.
#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub name: String,
    pub category_id: Option<i64>,
    pub color: String,
    pub feedback_list: Vec<BoardCard>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Per-batch aggregate counts.
#[derive(Debug, Clone, Serialize)]
pub struct BatchStatistics {
    pub total: i64,
    pub user_distribution: HashMap<String, i64>,
    pub category_stats: Vec<CategoryCount>,
}

/// All feedbacks of one classifier category, in stored order.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub feedbacks: Vec<Feedback>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BoardCategoryCount {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub count: i64,
}

/// Board-wide aggregate counts.
#[derive(Debug, Clone, Serialize)]
pub struct BoardStatistics {
    pub total: i64,
    pub category_stats: Vec<BoardCategoryCount>,
    pub uncategorized_count: i64,
}
