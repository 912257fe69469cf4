use crate::domain::error::{AppError, Result};
use crate::infrastructure::csv::{decode_csv_bytes, parse_csv};
use crate::interfaces::http::AppState;
use actix_web::{delete, get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub struct UploadQuery {
    filename: String,
}

/// Raw CSV upload. The filename travels as a query parameter so the body
/// stays the unmodified file bytes.
#[post("/upload")]
pub async fn upload(
    state: web::Data<AppState>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let filename = query.filename.trim();
    if filename.is_empty() || !filename.to_lowercase().ends_with(".csv") {
        return Err(AppError::ValidationError(
            "Only .csv files are accepted".to_string(),
        ));
    }

    let text = decode_csv_bytes(&body)?;
    let parsed = parse_csv(&text)?;
    let outcome = state.pipeline.ingest(&parsed.headers, &parsed.rows);

    let headers_json = serde_json::to_string(&parsed.headers)
        .map_err(|e| AppError::Internal(format!("Failed to encode headers: {}", e)))?;
    // total_count is the raw data-row count; skipped rows still count
    // toward the batch size.
    let batch_id = state
        .store
        .create_batch(filename, parsed.rows.len() as i64, Some(&headers_json))
        .await?;
    state.store.insert_feedbacks(batch_id, &outcome.records).await?;

    tracing::info!(
        batch_id,
        filename,
        rows = parsed.rows.len(),
        processed = outcome.records.len(),
        "csv batch ingested"
    );

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "batch_id": batch_id,
        "processed": outcome.records.len(),
        "debug_info": {
            "headers": parsed.headers,
            "roles": outcome.roles,
            "content_column": outcome.content_column,
            "skipped": parsed.rows.len() - outcome.records.len(),
        },
    })))
}

#[get("/batches")]
pub async fn list_batches(state: web::Data<AppState>) -> Result<HttpResponse> {
    let batches = state.store.list_batches().await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "batches": batches })))
}

#[get("/batches/{id}")]
pub async fn get_batch(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse> {
    let batch_id = path.into_inner();
    let batch = state
        .store
        .get_batch(batch_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Batch {} does not exist", batch_id)))?;
    let groups = state.store.feedbacks_grouped(batch_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "batch": batch,
        "categories": groups,
    })))
}

#[delete("/batches/{id}")]
pub async fn delete_batch(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let batch_id = path.into_inner();
    if state.store.get_batch(batch_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Batch {} does not exist", batch_id)));
    }
    state.store.delete_batch(batch_id).await?;
    tracing::info!(batch_id, "batch deleted");
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[get("/stats/{batch_id}")]
pub async fn batch_stats(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let batch_id = path.into_inner();
    if state.store.get_batch(batch_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Batch {} does not exist", batch_id)));
    }
    let stats = state.store.batch_statistics(batch_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "stats": stats })))
}

#[get("/category/{batch_id}/{category}")]
pub async fn feedbacks_by_category(
    state: web::Data<AppState>,
    path: web::Path<(i64, String)>,
) -> Result<HttpResponse> {
    let (batch_id, category) = path.into_inner();
    let feedbacks = state.store.feedbacks_by_category(batch_id, &category).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "category": category,
        "feedbacks": feedbacks,
    })))
}

/// The classifier taxonomy, fallback included, in definition order.
#[get("/categories")]
pub async fn taxonomy(state: web::Data<AppState>) -> Result<HttpResponse> {
    let categories = state.pipeline.classifier().get_categories();
    Ok(HttpResponse::Ok().json(json!({ "success": true, "categories": categories })))
}

/// Download one batch as a re-classified CSV (分类 / 内容 / 用户类型).
#[get("/export/{batch_id}")]
pub async fn export_batch(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let batch_id = path.into_inner();
    if state.store.get_batch(batch_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Batch {} does not exist", batch_id)));
    }
    let groups = state.store.feedbacks_grouped(batch_id).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["分类", "内容", "用户类型"])
        .map_err(|e| AppError::Internal(format!("Failed to write CSV header: {}", e)))?;
    for group in &groups {
        for feedback in &group.feedbacks {
            writer
                .write_record([&feedback.category, &feedback.content, &feedback.user_type])
                .map_err(|e| AppError::Internal(format!("Failed to write CSV row: {}", e)))?;
        }
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to finish CSV export: {}", e)))?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"batch_{}_classified.csv\"", batch_id),
        ))
        .body(bytes))
}
