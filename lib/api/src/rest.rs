use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use learngraph_core::{Error, NodeStatus, ProgressTracker};
use learngraph_storage::StorageManager;
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

const DEFAULT_LOCALE: &str = "en";

#[derive(Deserialize)]
struct GraphQuery {
    locale: Option<String>,
    user_id: Option<String>,
}

#[derive(Deserialize)]
struct StatusRequest {
    status: NodeStatus,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(
        tracker: Arc<ProgressTracker>,
        storage: Arc<StorageManager>,
        port: u16,
    ) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(tracker.clone()))
                .app_data(web::Data::new(storage.clone()))
                .configure(routes)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

/// Route table. Handlers expect `Arc<ProgressTracker>` and
/// `Arc<StorageManager>` as app data.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/graph", web::get().to(get_graph))
        .route("/nodes/{id}/prerequisites", web::get().to(get_prerequisites))
        .route("/users/{id}", web::put().to(create_user))
        .route("/users/{id}/progress", web::get().to(get_progress))
        .route("/users/{id}/nodes/{node}/status", web::put().to(set_status))
        .route("/users/{id}/nodes/{node}/finish", web::post().to(finish_node));
}

fn error_response(e: &Error) -> HttpResponse {
    if e.is_not_found() {
        return HttpResponse::NotFound().json(serde_json::json!({
            "error": e.to_string()
        }));
    }

    match e {
        Error::UserExists(_) | Error::InvalidInput(_) => HttpResponse::BadRequest().json(serde_json::json!({
            "error": e.to_string()
        })),
        _ => {
            error!(error = %e, "request failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal server error"
            }))
        }
    }
}

async fn health(
    tracker: web::Data<Arc<ProgressTracker>>,
) -> ActixResult<HttpResponse> {
    let graph = tracker.graph();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "nodes": graph.len(),
        "edges": graph.edge_count(),
        "dangling_edges": graph.dangling_edge_count(),
    })))
}

async fn get_graph(
    tracker: web::Data<Arc<ProgressTracker>>,
    query: web::Query<GraphQuery>,
) -> ActixResult<HttpResponse> {
    let locale = query.locale.as_deref().unwrap_or(DEFAULT_LOCALE);

    match tracker.project(locale, query.user_id.as_deref()) {
        Ok(view) => Ok(HttpResponse::Ok().json(view)),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn get_prerequisites(
    tracker: web::Data<Arc<ProgressTracker>>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let node_id = path.into_inner();

    if !tracker.graph().contains(&node_id) {
        return Ok(error_response(&Error::NodeNotFound(node_id)));
    }

    let closure = tracker.graph().prerequisite_closure(&node_id);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "result": closure
    })))
}

async fn create_user(
    storage: web::Data<Arc<StorageManager>>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let user_id = path.into_inner();

    match storage.create_user(&user_id) {
        Ok(record) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "result": record
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn get_progress(
    tracker: web::Data<Arc<ProgressTracker>>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let user_id = path.into_inner();

    match tracker.classify_nodes(&user_id) {
        Ok(progress) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "result": progress
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn set_status(
    tracker: web::Data<Arc<ProgressTracker>>,
    path: web::Path<(String, String)>,
    req: web::Json<StatusRequest>,
) -> ActixResult<HttpResponse> {
    let (user_id, node_id) = path.into_inner();

    match tracker.set_status(&user_id, &node_id, req.status) {
        Ok(record) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "result": record
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn finish_node(
    tracker: web::Data<Arc<ProgressTracker>>,
    path: web::Path<(String, String)>,
) -> ActixResult<HttpResponse> {
    let (user_id, node_id) = path.into_inner();

    match tracker.finish_with_prerequisites(&user_id, &node_id) {
        Ok(finished) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "result": finished
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}
