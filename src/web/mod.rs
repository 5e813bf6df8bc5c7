//! # HTTP API
//!
//! Small JSON API next to the bot. Protected routes run behind the shared
//! block table and a per-route rate limiter.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! Serve with `into_make_service_with_connect_info::<SocketAddr>()` so the
//! middleware can see the peer address.

pub mod error;
pub mod middleware;
pub mod routes;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Instant;

use crate::commands::SharedRegistry;
use crate::features::rate_limiting::SecurityGuard;

pub use error::ErrorBody;
pub use middleware::{enforce, RouteGuard};

#[derive(Clone)]
pub struct ApiState {
    pub registry: SharedRegistry,
    pub security: Arc<SecurityGuard>,
    pub start_time: Instant,
}

impl ApiState {
    pub fn new(registry: SharedRegistry, security: Arc<SecurityGuard>) -> Self {
        Self {
            registry,
            security,
            start_time: Instant::now(),
        }
    }
}

/// Build the API router; each protected route gets its own guard
pub fn router(state: ApiState, commands_guard: RouteGuard, blocks_guard: RouteGuard) -> Router {
    let commands = Router::new()
        .route("/api/commands", get(routes::list_commands))
        .route_layer(axum::middleware::from_fn_with_state(commands_guard, enforce));

    let blocks = Router::new()
        .route("/api/security/blocks", get(routes::list_blocks))
        .route_layer(axum::middleware::from_fn_with_state(blocks_guard, enforce));

    Router::new()
        .route("/api/health", get(routes::health))
        .merge(commands)
        .merge(blocks)
        .with_state(state)
}
