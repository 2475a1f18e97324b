use std::net::SocketAddr;

use tower_http::cors::CorsLayer;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

/// Bind and serve the API.
pub async fn serve(ctx: ApiContext, addr: SocketAddr) -> std::io::Result<()> {
    let app = api_router(ctx).layer(CorsLayer::permissive());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await
}
