/// HTTP server setup and routing
use crate::{
    api::middleware::{stamp_error_path, track_metrics},
    context::AppContext,
    error::{YggError, YggResult},
};
use axum::{
    http::{header, Method, StatusCode},
    middleware,
    response::Json,
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;

/// Build the main application router
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let router = Router::new()
        .merge(crate::api::routes(&ctx))
        .route_layer(middleware::from_fn(track_metrics))
        .nest_service(
            "/textures",
            ServeDir::new(&ctx.config.storage.textures_directory),
        );

    // Static site at the root, if configured
    let router = match &ctx.config.storage.static_directory {
        Some(directory) => router.fallback_service(ServeDir::new(directory)),
        None => router.fallback(not_found),
    };

    router
        .with_state(ctx)
        .layer(middleware::from_fn(stamp_error_path))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

/// 404 handler
async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not Found",
            "errorMessage": "The requested resource is not available."
        })),
    )
}

/// Start the HTTP server
pub async fn serve(ctx: AppContext) -> YggResult<()> {
    let addr = ctx.bind_address();

    info!("Lodestone listening on {}", addr);
    info!("   External URL: {}", ctx.config.service.external_url);
    info!("   Database: {}", ctx.config.storage.database.display());
    info!(
        "   hasJoined mode: {}",
        if ctx.config.session.require_join { "strict" } else { "lenient" }
    );

    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| YggError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    // Client addresses feed the join record and the auth rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| YggError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
