use std::{future::Future, sync::Arc};

use axum::{
    extract::State,
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    map::{self, Frame, LegendEntry, MapView},
    state::LiveState,
};

const INDEX_HTML: &str = include_str!("../assets/index.html");

#[derive(Debug, Clone)]
pub struct AppState {
    pub live: Arc<LiveState>,
    pub view: Arc<MapView>,
}

pub fn router(live: Arc<LiveState>, view: MapView) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/frame", get(frame))
        .route("/api/legend", get(legend))
        .route("/healthz", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState {
            live,
            view: Arc::new(view),
        })
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn frame(State(app): State<AppState>) -> Json<Frame> {
    Json(Frame::capture(&app.live, &app.view))
}

async fn legend(State(app): State<AppState>) -> Json<Vec<LegendEntry>> {
    let snapshot = app.live.snapshot();
    Json(map::legend(&snapshot.vehicles, &app.live.routes()))
}

async fn health(State(app): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "vehicles": app.live.snapshot().vehicles.len(),
        "routes": app.live.routes().len(),
        "polls": app.live.stats(),
    }))
}

pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "serving live map");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
