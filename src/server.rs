use std::error::Error;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use axum_macros::debug_handler;
use serde::Deserialize;
use serde_json::json;

use crate::errors::{ErrorLayer, HierarchyError};
use crate::file_format::catalogue::CatalogueRow;
use crate::file_format::view_state::ViewState;
use crate::hierarchy::selection::{selection_options, SelectionOption};
use crate::hierarchy::{HierarchyEngine, HierarchyView};

/// Immutable snapshot shared by every request.  Nothing about a caller is
/// stored here; the view-state travels in the request and response bodies.
pub struct CatalogueService {
    pub engine: HierarchyEngine,
    pub rows: Vec<CatalogueRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub phrase: String,
    #[serde(default)]
    pub view_state: ViewState,
}

impl IntoResponse for HierarchyError {
    fn into_response(self) -> Response {
        let status = match &self {
            HierarchyError::MalformedIdentifier(_) => StatusCode::BAD_REQUEST,
            HierarchyError::LoadProblem(details) if details.layer == ErrorLayer::IoLayer => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            // Broken catalogue data is our problem, not the caller's.
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!(error = %self, "request failed");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[debug_handler]
pub async fn handle_full_tree(
    Extension(service): Extension<Arc<CatalogueService>>,
) -> Result<Json<HierarchyView>, HierarchyError> {
    Ok(Json(service.engine.full_tree(&service.rows)?))
}

#[debug_handler]
pub async fn handle_search(
    Extension(service): Extension<Arc<CatalogueService>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<HierarchyView>, HierarchyError> {
    Ok(Json(service.engine.filtered_tree(
        &service.rows,
        &request.phrase,
        &request.view_state,
    )?))
}

/// Same inputs as a search, but answers with the dropdown options for the
/// leaves the view-state marks as selected.
#[debug_handler]
pub async fn handle_options(
    Extension(service): Extension<Arc<CatalogueService>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<SelectionOption>>, HierarchyError> {
    let view = service
        .engine
        .filtered_tree(&service.rows, &request.phrase, &request.view_state)?;
    Ok(Json(selection_options(&view.tree)))
}

pub fn build_router(service: Arc<CatalogueService>) -> Router {
    Router::new()
        .route("/tree", get(handle_full_tree))
        .route("/tree/search", post(handle_search))
        .route("/tree/options", post(handle_options))
        .layer(Extension(service))
}

/// Serve `service` on `addr` until `shutdown` resolves, then let in-flight
/// requests finish.
pub async fn serve<F>(
    addr: SocketAddr,
    service: Arc<CatalogueService>,
    shutdown: F,
) -> std::result::Result<(), Box<dyn Error + Send + Sync>>
where
    F: Future<Output = ()>,
{
    let app = build_router(service);
    axum::Server::try_bind(&addr)?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("server stopped");
    Ok(())
}
