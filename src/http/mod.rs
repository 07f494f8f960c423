//! The HTTP surface the host publishes.
//!
//! Core endpoints: the module-info list, the aggregated action list, the
//! client bundle, and the realtime upgrade. Module-contributed routes are
//! mounted behind the core router as its fallback, so on any path conflict
//! the earlier registration (core first, then modules in discovery order)
//! wins.

use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::domain::{Action, ModuleDescriptor};
use crate::realtime::{ws_handler, ConnectionSet, RealtimeState};
use crate::registry::ModuleRegistry;

/// Response envelope every core API endpoint uses: `{status: 0, body}`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiEnvelope<T> {
    pub status: i32,
    pub body: T,
}

impl<T> ApiEnvelope<T> {
    fn ok(body: T) -> Self {
        Self { status: 0, body }
    }
}

#[derive(Clone)]
struct ApiState {
    registry: Arc<ModuleRegistry>,
}

/// Builds the full application router: core endpoints, the realtime
/// endpoint, and every module route from the registry's route table.
pub fn app_router(registry: Arc<ModuleRegistry>, connections: Arc<ConnectionSet>) -> Router {
    let module_routes = registry.routes().router();

    let api = Router::new()
        .route("/api/modules", get(list_modules))
        .route("/api/actions", get(list_actions))
        .route("/pc/pc.modules.js", get(module_bundle))
        .with_state(ApiState { registry });

    let live = Router::new()
        .route("/pc/live", get(ws_handler))
        .with_state(RealtimeState::new(connections));

    api.merge(live).fallback_service(module_routes)
}

/// `GET /api/modules` — descriptors in discovery order.
async fn list_modules(State(state): State<ApiState>) -> Json<ApiEnvelope<Vec<ModuleDescriptor>>> {
    Json(ApiEnvelope::ok(state.registry.descriptors().to_vec()))
}

/// `GET /api/actions` — the full aggregated action list.
async fn list_actions(State(state): State<ApiState>) -> Json<ApiEnvelope<Vec<Action>>> {
    Json(ApiEnvelope::ok(state.registry.actions().as_slice().to_vec()))
}

/// `GET /pc/pc.modules.js` — the concatenated client bundle, verbatim.
async fn module_bundle(State(state): State<ApiState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        state.registry.bundle().to_owned(),
    )
}
