use crate::domain::error::{AppError, Result};
use crate::interfaces::http::AppState;
use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

const DEFAULT_COLUMN_COLOR: &str = "#3B82F6";

#[derive(Deserialize)]
pub struct BoardQuery {
    batch_id: Option<i64>,
}

/// Everything a board view needs in one response: columns with cards,
/// the column definitions and the counts.
#[get("/kanban/all")]
pub async fn board_overview(
    state: web::Data<AppState>,
    query: web::Query<BoardQuery>,
) -> Result<HttpResponse> {
    let batch_id = query.batch_id;
    let categories = state.store.list_kanban_categories(batch_id).await?;
    let board = state.store.board(batch_id).await?;
    let stats = state.store.board_statistics(batch_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "categories": categories,
        "board": board,
        "stats": stats,
    })))
}

#[derive(Deserialize)]
pub struct AddItemRequest {
    feedback_id: i64,
    category_id: Option<i64>,
    note: Option<String>,
}

#[post("/kanban/add")]
pub async fn add_item(
    state: web::Data<AppState>,
    req: web::Json<AddItemRequest>,
) -> Result<HttpResponse> {
    if state.store.feedback_by_id(req.feedback_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Feedback {} does not exist",
            req.feedback_id
        )));
    }
    if let Some(category_id) = req.category_id {
        if state.store.kanban_category_by_id(category_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Kanban category {} does not exist",
                category_id
            )));
        }
    }
    let item_id = state
        .store
        .add_board_item(req.feedback_id, req.category_id, req.note.as_deref())
        .await?;
    tracing::info!(feedback_id = req.feedback_id, item_id, "feedback pinned to board");
    Ok(HttpResponse::Ok().json(json!({ "success": true, "item_id": item_id })))
}

#[derive(Deserialize)]
pub struct RemoveItemRequest {
    feedback_id: i64,
}

#[post("/kanban/remove")]
pub async fn remove_item(
    state: web::Data<AppState>,
    req: web::Json<RemoveItemRequest>,
) -> Result<HttpResponse> {
    if !state.store.remove_board_item(req.feedback_id).await? {
        return Err(AppError::NotFound(format!(
            "Feedback {} is not on the board",
            req.feedback_id
        )));
    }
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[derive(Deserialize)]
pub struct MoveItemRequest {
    feedback_id: i64,
    /// Absent or null moves the card back to the uncategorized bucket.
    category_id: Option<i64>,
}

#[post("/kanban/move")]
pub async fn move_item(
    state: web::Data<AppState>,
    req: web::Json<MoveItemRequest>,
) -> Result<HttpResponse> {
    if let Some(category_id) = req.category_id {
        if state.store.kanban_category_by_id(category_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Kanban category {} does not exist",
                category_id
            )));
        }
    }
    if !state.store.move_board_item(req.feedback_id, req.category_id).await? {
        return Err(AppError::NotFound(format!(
            "Feedback {} is not on the board",
            req.feedback_id
        )));
    }
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    batch_id: i64,
    name: String,
    color: Option<String>,
}

#[post("/kanban/categories")]
pub async fn create_category(
    state: web::Data<AppState>,
    req: web::Json<CreateCategoryRequest>,
) -> Result<HttpResponse> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::ValidationError("Category name must not be empty".to_string()));
    }
    let color = req.color.as_deref().unwrap_or(DEFAULT_COLUMN_COLOR);
    let category_id = state.store.create_kanban_category(req.batch_id, name, color).await?;
    tracing::info!(batch_id = req.batch_id, category_id, name, "board column created");
    Ok(HttpResponse::Ok().json(json!({ "success": true, "category_id": category_id })))
}

#[derive(Deserialize)]
pub struct UpdateCategoryRequest {
    name: Option<String>,
    color: Option<String>,
}

#[put("/kanban/categories/{id}")]
pub async fn update_category(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: web::Json<UpdateCategoryRequest>,
) -> Result<HttpResponse> {
    let category_id = path.into_inner();
    let name = req.name.as_deref().map(str::trim);
    if matches!(name, Some("")) {
        return Err(AppError::ValidationError("Category name must not be empty".to_string()));
    }
    if name.is_none() && req.color.is_none() {
        return Err(AppError::ValidationError("Nothing to update".to_string()));
    }
    let updated = state
        .store
        .update_kanban_category(category_id, name, req.color.as_deref())
        .await?;
    if !updated {
        return Err(AppError::NotFound(format!(
            "Kanban category {} does not exist",
            category_id
        )));
    }
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[delete("/kanban/categories/{id}")]
pub async fn delete_category(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let category_id = path.into_inner();
    if !state.store.delete_kanban_category(category_id).await? {
        return Err(AppError::NotFound(format!(
            "Kanban category {} does not exist",
            category_id
        )));
    }
    tracing::info!(category_id, "board column deleted");
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[get("/kanban/check/{feedback_id}")]
pub async fn check_membership(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let feedback_id = path.into_inner();
    let item = state.store.board_item_for_feedback(feedback_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "in_kanban": item.is_some(),
        "item": item,
    })))
}

#[derive(Deserialize)]
pub struct GenerateNameRequest {
    feedback_ids: Vec<i64>,
}

/// Name a prospective column after the feedbacks it would contain.
/// Unknown ids are skipped; if none resolve there is nothing to name.
#[post("/kanban/generate-category-name")]
pub async fn generate_category_name(
    state: web::Data<AppState>,
    req: web::Json<GenerateNameRequest>,
) -> Result<HttpResponse> {
    if req.feedback_ids.is_empty() {
        return Err(AppError::ValidationError(
            "feedback_ids must not be empty".to_string(),
        ));
    }

    let mut contents = Vec::with_capacity(req.feedback_ids.len());
    for feedback_id in &req.feedback_ids {
        if let Some(feedback) = state.store.feedback_by_id(*feedback_id).await? {
            contents.push(feedback.content);
        }
    }
    if contents.is_empty() {
        return Err(AppError::NotFound(
            "None of the requested feedbacks exist".to_string(),
        ));
    }

    let suggested_name = state.suggester.suggest(&contents);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "suggested_name": suggested_name,
        "based_on": contents.len(),
    })))
}

#[cfg(test)]
mod tests {
    use crate::application::{CategoryNameSuggester, IngestionPipeline};
    use crate::domain::feedback::NewFeedback;
    use crate::infrastructure::db::Store;
    use crate::interfaces::http::{configure_routes, AppState};
    use actix_web::{test, web, App};

    async fn seeded_state() -> (web::Data<AppState>, i64, Vec<i64>) {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        let batch_id = store.create_batch("seed.csv", 2, None).await.unwrap();
        let records = vec![
            NewFeedback {
                user_type: "Member".to_string(),
                content: "登录不上去，密码重置也失败".to_string(),
                category: "功能使用问题".to_string(),
                attachment: String::new(),
                original_row: "[]".to_string(),
            },
            NewFeedback {
                user_type: "Normal User".to_string(),
                content: "注册流程太长".to_string(),
                category: "功能建议与反馈".to_string(),
                attachment: String::new(),
                original_row: "[]".to_string(),
            },
        ];
        store.insert_feedbacks(batch_id, &records).await.unwrap();
        let ids = store
            .feedbacks_grouped(batch_id)
            .await
            .unwrap()
            .into_iter()
            .flat_map(|group| group.feedbacks.into_iter().map(|f| f.id))
            .collect();
        let state = web::Data::new(AppState {
            store,
            pipeline: IngestionPipeline::new(),
            suggester: CategoryNameSuggester::new(),
        });
        (state, batch_id, ids)
    }

    #[actix_web::test]
    async fn test_board_flow_over_http() {
        let (state, batch_id, feedback_ids) = seeded_state().await;
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/kanban/categories")
            .set_json(serde_json::json!({ "batch_id": batch_id, "name": "本周跟进" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        let category_id = body["category_id"].as_i64().unwrap();

        let req = test::TestRequest::post()
            .uri("/api/kanban/add")
            .set_json(serde_json::json!({
                "feedback_id": feedback_ids[0],
                "category_id": category_id,
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);

        let req = test::TestRequest::get()
            .uri(&format!("/api/kanban/all?batch_id={}", batch_id))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["stats"]["total"], 1);
        assert_eq!(body["board"][0]["name"], "本周跟进");

        let req = test::TestRequest::get()
            .uri(&format!("/api/kanban/check/{}", feedback_ids[0]))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["in_kanban"], true);
        assert_eq!(body["item"]["feedback_id"], feedback_ids[0]);
        assert_eq!(body["item"]["category_id"], category_id);

        let req = test::TestRequest::get()
            .uri(&format!("/api/kanban/check/{}", feedback_ids[1]))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["in_kanban"], false);
        assert!(body["item"].is_null());
    }

    #[actix_web::test]
    async fn test_generate_category_name() {
        let (state, _batch_id, feedback_ids) = seeded_state().await;
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/kanban/generate-category-name")
            .set_json(serde_json::json!({ "feedback_ids": feedback_ids }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["suggested_name"], "账号与登录");

        // Unknown ids resolve to nothing to name.
        let req = test::TestRequest::post()
            .uri("/api/kanban/generate-category-name")
            .set_json(serde_json::json!({ "feedback_ids": [987654] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }
}
