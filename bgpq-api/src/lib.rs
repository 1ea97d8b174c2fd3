//! # bgpq-proxy API Server
//!
//! REST API exposing cached bgpq expansions.
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /bgpq/asn/` - ASNs currently cached
//! - `GET /bgpq/asn/:asn` - IPv4/IPv6 prefixes of an AS
//! - `GET /bgpq/as-set/` - AS-SETs currently cached
//! - `GET /bgpq/as-set/:as_set` - IPv4/IPv6 prefixes of an AS-SET
//!
//! Lookups accept `depth`, `invalidate`, `no_cache` and `family` query parameters.
//!
//! ## Example
//!
//! ```rust,ignore
//! use bgpq_api::{ApiServer, AppState, ProxyConfig};
//!
//! let server = ApiServer::new(AppState::connect(ProxyConfig::from_env()).await?);
//! server.run(([0, 0, 0, 0], 5000)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, ProxyConfig};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// API server for bgpq-proxy.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a server around prepared state.
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("bgpq-proxy API server listening on {}", addr);

        axum::serve(listener, self.router()).await
    }
}
