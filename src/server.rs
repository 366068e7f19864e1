use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use http::StatusCode;
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::api::handler::{
    create_translation, disable_polling, enable_polling, get_result, health_check,
    invalid_result_id, list_results, not_found, AppState,
};

pub async fn create_app(state: AppState) -> Router {
    info!("⚙️ Setting up HTTP routes...");

    // A known path with the wrong method is treated like an unknown path
    let app = Router::new()
        .route("/health", get(health_check).fallback(not_found))
        .route("/polling/enable", post(enable_polling).fallback(not_found))
        .route("/polling/disable", post(disable_polling).fallback(not_found))
        .route(
            "/create-translation",
            post(create_translation).fallback(not_found),
        )
        .route("/results", get(list_results).fallback(not_found))
        .route("/results/", get(invalid_result_id).fallback(not_found))
        .route("/results/:id", get(get_result).fallback(not_found))
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::very_permissive())
        // Add request tracing
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("✓ HTTP routes configured");
    app
}

fn handle_panic(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("❌ Handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "internal error" })),
    )
        .into_response()
}

/// Serve until Ctrl-C (or SIGTERM on unix), then drain in-flight requests.
pub async fn run_server(app: Router, bind_address: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!("🌐 Control plane listening on: {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("❌ Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("❌ Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("🛑 Shutdown signal received");
}
