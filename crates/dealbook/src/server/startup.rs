//! REST server startup and configuration

use anyhow::Result;
use axum::serve;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::server::routing::create_router;
use crate::server::state::AppState;

/// Bind `addr` and serve the API until the process is stopped
pub async fn start_server(addr: SocketAddr, state: AppState) -> Result<()> {
  tracing::info!(%addr, "starting dealbook REST server");

  let app = create_router(state)
    .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()));

  let listener = TcpListener::bind(addr).await?;
  tracing::info!(addr = %listener.local_addr()?, "server listening");

  match serve(listener, app).await {
    Ok(_) => {
      tracing::info!("server shut down");
      Ok(())
    }
    Err(e) => {
      tracing::error!(error = %e, "server error");
      Err(anyhow::anyhow!("Server error: {}", e))
    }
  }
}
