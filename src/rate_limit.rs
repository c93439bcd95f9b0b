/// Rate Limiting System
///
/// Per-client-IP quota on the `/auth` endpoints, where passwords are checked.
use crate::config::RateLimitConfig;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use governor::{
    clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota,
    RateLimiter as GovernorLimiter,
};
use std::{
    net::{IpAddr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
};

/// Number of tracked addresses above which idle entries are pruned
const PRUNE_THRESHOLD: usize = 10_000;

type KeyedLimiter = GovernorLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// Rate limiter manager
#[derive(Clone)]
pub struct RateLimiter {
    enabled: bool,
    auth: Arc<KeyedLimiter>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let per_minute = NonZeroU32::new(config.auth_requests_per_minute).unwrap_or(NonZeroU32::MIN);

        Self {
            enabled: config.enabled,
            auth: Arc::new(GovernorLimiter::keyed(Quota::per_minute(per_minute))),
        }
    }

    /// Check the auth quota for a client address
    pub fn check_auth(&self, ip: IpAddr) -> bool {
        if !self.enabled {
            return true;
        }

        if self.auth.len() > PRUNE_THRESHOLD {
            self.auth.retain_recent();
        }

        self.auth.check_key(&ip).is_ok()
    }
}

/// Rate limiting middleware for the auth routes
pub async fn auth_rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    // Without connection info there is no key to limit on
    let Some(ip) = ip else {
        return Ok(next.run(request).await);
    };

    if limiter.check_auth(ip) {
        Ok(next.run(request).await)
    } else {
        tracing::warn!(%ip, path = %request.uri().path(), "auth rate limit exceeded");
        Err(StatusCode::TOO_MANY_REQUESTS)
    }
}
