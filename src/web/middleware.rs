//! Per-route security middleware
//!
//! Every protected route gets its own `RouteGuard` (and so its own window
//! counter) while the block table and violation counts are shared.

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use log::{debug, warn};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use crate::features::rate_limiting::{RateLimiter, SecurityDenial, SecurityGuard};

const FORWARDED_FOR: &str = "x-forwarded-for";

#[derive(Clone)]
pub struct RouteGuard {
    limiter: RateLimiter,
    security: Arc<SecurityGuard>,
    trust_proxy: bool,
}

impl RouteGuard {
    pub fn new(limiter: RateLimiter, security: Arc<SecurityGuard>, trust_proxy: bool) -> Self {
        Self {
            limiter,
            security,
            trust_proxy,
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Source address of a request
    ///
    /// Behind a trusted proxy the left-most `X-Forwarded-For` entry wins.
    /// Requests with no usable address all share the unspecified address.
    pub fn client_ip(&self, request: &Request) -> IpAddr {
        if self.trust_proxy {
            let forwarded = request
                .headers()
                .get(FORWARDED_FOR)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .and_then(|first| first.trim().parse::<IpAddr>().ok());
            if let Some(ip) = forwarded {
                return ip;
            }
        }

        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }
}

/// Block check then rate limit, used with `axum::middleware::from_fn_with_state`
pub async fn enforce(State(guard): State<RouteGuard>, request: Request, next: Next) -> Response {
    let ip = guard.client_ip(&request);

    match guard.security.check(&guard.limiter, ip) {
        Ok(()) => next.run(request).await,
        Err(denial) => {
            match &denial {
                SecurityDenial::RateLimited { .. } => {
                    warn!("Rate limited {ip} on {}", request.uri().path())
                }
                SecurityDenial::Blocked { reason, .. } => {
                    debug!("Rejected blocked {ip} on {}: {reason}", request.uri().path())
                }
            }
            denial.into_response()
        }
    }
}
