use crate::domain::error::{AppError, Result};
use crate::interfaces::http::AppState;
use actix_web::{get, put, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

/// A single feedback with its source row re-aligned to the batch's header
/// names. Headers missing or shorter than the row fall back to `字段{n}`.
#[get("/feedback/{id}/detail")]
pub async fn feedback_detail(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let feedback_id = path.into_inner();
    let feedback = state
        .store
        .feedback_by_id(feedback_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Feedback {} does not exist", feedback_id)))?;

    let headers: Vec<String> = match state.store.get_batch(feedback.upload_batch_id).await? {
        Some(batch) => batch
            .headers
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default(),
        None => Vec::new(),
    };
    let row: Vec<String> = serde_json::from_str(&feedback.original_row).unwrap_or_default();

    let fields: Vec<serde_json::Value> = row
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let label = headers
                .get(i)
                .filter(|h| !h.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| format!("字段{}", i + 1));
            json!({ "label": label, "value": value })
        })
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "feedback": feedback,
        "fields": fields,
    })))
}

#[derive(Deserialize)]
pub struct UpdateCategoryRequest {
    category: String,
}

/// Manual re-triage of one feedback; responds with the batch's refreshed
/// statistics so the caller can redraw counts without a second request.
#[put("/feedback/{id}/category")]
pub async fn update_feedback_category(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: web::Json<UpdateCategoryRequest>,
) -> Result<HttpResponse> {
    let feedback_id = path.into_inner();
    let category = req.category.trim();
    if category.is_empty() {
        return Err(AppError::ValidationError("Category must not be empty".to_string()));
    }

    let feedback = state
        .store
        .feedback_by_id(feedback_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Feedback {} does not exist", feedback_id)))?;
    state.store.update_category(feedback_id, category).await?;
    tracing::info!(feedback_id, category, "feedback re-triaged");

    let stats = state.store.batch_statistics(feedback.upload_batch_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "category": category,
        "stats": stats,
    })))
}

#[get("/batch/{id}/categories")]
pub async fn batch_categories(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let batch_id = path.into_inner();
    let categories = state.store.categories_for_batch(batch_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "categories": categories })))
}

#[derive(Deserialize)]
pub struct RenameCategoryRequest {
    old_name: String,
    new_name: String,
}

#[put("/batch/{id}/category/rename")]
pub async fn rename_batch_category(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: web::Json<RenameCategoryRequest>,
) -> Result<HttpResponse> {
    let batch_id = path.into_inner();
    let old_name = req.old_name.trim();
    let new_name = req.new_name.trim();
    if old_name.is_empty() || new_name.is_empty() {
        return Err(AppError::ValidationError(
            "Category names must not be empty".to_string(),
        ));
    }
    if old_name == new_name {
        return Err(AppError::ValidationError(
            "New category name must differ from the old one".to_string(),
        ));
    }
    let existing = state.store.categories_for_batch(batch_id).await?;
    if existing.iter().any(|c| c == new_name) {
        return Err(AppError::ValidationError(format!(
            "Category '{}' already exists in this batch",
            new_name
        )));
    }

    let affected = state.store.rename_category(batch_id, old_name, new_name).await?;
    if affected == 0 {
        return Err(AppError::NotFound(format!(
            "Category '{}' has no feedbacks in batch {}",
            old_name, batch_id
        )));
    }
    tracing::info!(batch_id, old_name, new_name, affected, "category renamed");

    Ok(HttpResponse::Ok().json(json!({ "success": true, "affected": affected })))
}
