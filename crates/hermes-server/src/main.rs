use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use hermes_api::{AppState, AppStateInner};
use hermes_gateway::{DeliveryCoordinator, Dispatcher, connection};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hermes=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("HERMES_DB_PATH").unwrap_or_else(|_| "hermes.db".into());
    let host = std::env::var("HERMES_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("HERMES_PORT")
        .unwrap_or_else(|_| "5003".into())
        .parse()?;

    // Init database
    let db = Arc::new(hermes_db::Database::open(&PathBuf::from(&db_path))?);

    // Shared state: one dispatcher, one coordinator, both ingress paths use them
    let dispatcher = Dispatcher::new();
    let coordinator = DeliveryCoordinator::new(db.clone(), dispatcher);
    let app_state: AppState = Arc::new(AppStateInner {
        db,
        coordinator: coordinator.clone(),
    });

    let ws_route = Router::new()
        .route("/gateway", get(ws_upgrade))
        .with_state(coordinator);

    let app = hermes_api::router(app_state)
        .merge(ws_route)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Hermes server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn ws_upgrade(
    State(coordinator): State<DeliveryCoordinator>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| connection::handle_connection(socket, coordinator))
}
