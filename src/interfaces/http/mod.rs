// ============================================================
// HTTP API
// ============================================================
// JSON API over the ingestion pipeline and the store. Responses
// use a {"success": bool, ...} envelope; errors carry "detail".

mod batches;
mod feedbacks;
mod kanban;

use crate::application::{CategoryNameSuggester, IngestionPipeline};
use crate::domain::error::AppError;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::Store;
use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::http::StatusCode;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use serde_json::json;

/// Shared handler state. The pipeline and suggester are stateless, the
/// store clones its pool handle.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub pipeline: IngestionPipeline,
    pub suggester: CategoryNameSuggester,
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) | AppError::ParseError(_) | AppError::EncodingError(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Internal(_) | AppError::DatabaseError(_) | AppError::IoError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "detail": self.to_string(),
        }))
    }
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "success": true, "status": "ok" }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(batches::upload).service(
        web::scope("/api")
            .service(health)
            .service(batches::list_batches)
            .service(batches::get_batch)
            .service(batches::delete_batch)
            .service(batches::batch_stats)
            .service(batches::export_batch)
            .service(batches::feedbacks_by_category)
            .service(batches::taxonomy)
            .service(feedbacks::feedback_detail)
            .service(feedbacks::update_feedback_category)
            .service(feedbacks::batch_categories)
            .service(feedbacks::rename_batch_category)
            .service(kanban::board_overview)
            .service(kanban::add_item)
            .service(kanban::remove_item)
            .service(kanban::move_item)
            .service(kanban::create_category)
            .service(kanban::update_category)
            .service(kanban::delete_category)
            .service(kanban::check_membership)
            .service(kanban::generate_category_name),
    );
}

pub fn start_server(config: &AppConfig, store: Store) -> std::io::Result<Server> {
    let state = web::Data::new(AppState {
        store,
        pipeline: IngestionPipeline::new(),
        suggester: CategoryNameSuggester::new(),
    });
    let max_upload_bytes = config.max_upload_bytes;

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // local tool, same stance as the desktop app
        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .configure(configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;

    async fn test_state() -> web::Data<AppState> {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        web::Data::new(AppState {
            store,
            pipeline: IngestionPipeline::new(),
            suggester: CategoryNameSuggester::new(),
        })
    }

    #[actix_web::test]
    async fn test_upload_then_read_back() {
        let state = test_state().await;
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_routes),
        )
        .await;

        let csv = "序号,反馈内容,用户类型\n1,网络连接总是超时，希望能优化一下,VIP用户\n2,希望增加夜间模式,免费用户\n";
        let req = test::TestRequest::post()
            .uri("/upload?filename=week32.csv")
            .set_payload(csv)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["processed"], 2);
        let batch_id = body["batch_id"].as_i64().unwrap();
        assert_eq!(body["debug_info"]["content_column"], 1);

        let req = test::TestRequest::get()
            .uri(&format!("/api/stats/{}", batch_id))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["stats"]["total"], 2);
        assert_eq!(body["stats"]["user_distribution"]["Member"], 1);

        // percent-encoded 网络连接异常; the path extractor decodes it
        let req = test::TestRequest::get()
            .uri(&format!(
                "/api/category/{}/%E7%BD%91%E7%BB%9C%E8%BF%9E%E6%8E%A5%E5%BC%82%E5%B8%B8",
                batch_id
            ))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["feedbacks"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_total_count_keeps_skipped_rows() {
        let state = test_state().await;
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_routes),
        )
        .await;

        // Three data rows, one with blank content: it is skipped by the
        // pipeline but still counts toward the batch's size.
        let csv = "序号,反馈内容\n1,连不上服务器\n2,   \n3,希望增加夜间模式\n";
        let req = test::TestRequest::post()
            .uri("/upload?filename=partial.csv")
            .set_payload(csv)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["processed"], 2);
        let batch_id = body["batch_id"].as_i64().unwrap();

        let req = test::TestRequest::get()
            .uri(&format!("/api/batches/{}", batch_id))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["batch"]["total_count"], 3);
    }

    #[actix_web::test]
    async fn test_upload_rejects_non_csv() {
        let state = test_state().await;
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/upload?filename=notes.txt")
            .set_payload("a,b\n1,2\n")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_missing_batch_is_404() {
        let state = test_state().await;
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/batches/999").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_health() {
        let state = test_state().await;
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_routes),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
    }
}
