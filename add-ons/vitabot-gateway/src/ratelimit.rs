//! Fixed-window in-memory rate limiting.
//!
//! Two counters run on every request: a coarse per-IP counter and a finer
//! counter keyed by `token|origin|ip`, so clients that present a token get
//! their own budget instead of sharing the per-IP one with neighbours behind
//! the same NAT. Windows are not sliding; a bucket resets when its window
//! elapses.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::extract::connect_info::ConnectInfo;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dashmap::DashMap;
use serde_json::json;

use crate::AppState;

struct Bucket {
    window_start: Instant,
    count: u32,
}

pub struct RateLimiter {
    buckets: DashMap<String, Bucket>,
    window: Duration,
    per_ip_max: u32,
    per_client_max: u32,
}

impl RateLimiter {
    pub fn new(window: Duration, per_ip_max: u32, per_client_max: u32) -> Self {
        Self {
            buckets: DashMap::new(),
            window,
            per_ip_max,
            per_client_max,
        }
    }

    /// Charges both counters and reports whether the request may proceed.
    /// Both are always charged so a burst that trips one limit still counts
    /// against the other.
    pub fn allow(&self, ip: &str, token: &str, origin: &str) -> bool {
        let ip_ok = self.hit(format!("ip|{ip}"), self.per_ip_max);
        let client_ok = self.hit(format!("{token}|{origin}|{ip}"), self.per_client_max);
        ip_ok && client_ok
    }

    fn hit(&self, key: String, max: u32) -> bool {
        let now = Instant::now();
        let mut bucket = self.buckets.entry(key).or_insert_with(|| Bucket {
            window_start: now,
            count: 0,
        });
        if now.duration_since(bucket.window_start) >= self.window {
            bucket.window_start = now;
            bucket.count = 0;
        }
        bucket.count += 1;
        bucket.count <= max
    }
}

pub async fn limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let token = header_value(&request, "x-client-token");
    let origin = header_value(&request, "origin");

    if !state.limiter.allow(&ip, &token, &origin) {
        tracing::warn!(target: "vitabot::http", ip, "rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"error": "rate_limited"})),
        )
            .into_response();
    }
    next.run(request).await
}

fn header_value(request: &Request, name: &str) -> String {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_limit_then_blocks() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 3, 100);
        assert!(limiter.allow("10.0.0.1", "", ""));
        assert!(limiter.allow("10.0.0.1", "", ""));
        assert!(limiter.allow("10.0.0.1", "", ""));
        assert!(!limiter.allow("10.0.0.1", "", ""));
    }

    #[test]
    fn separate_ips_have_separate_budgets() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1, 100);
        assert!(limiter.allow("10.0.0.1", "", ""));
        assert!(limiter.allow("10.0.0.2", "", ""));
        assert!(!limiter.allow("10.0.0.1", "", ""));
    }

    #[test]
    fn client_budget_is_keyed_by_token_origin_and_ip() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 100, 2);
        assert!(limiter.allow("10.0.0.1", "tok-a", "https://a.example"));
        assert!(limiter.allow("10.0.0.1", "tok-a", "https://a.example"));
        assert!(!limiter.allow("10.0.0.1", "tok-a", "https://a.example"));
        // a different token still has room
        assert!(limiter.allow("10.0.0.1", "tok-b", "https://a.example"));
    }

    #[test]
    fn window_reset_refills_the_bucket() {
        let limiter = RateLimiter::new(Duration::from_millis(0), 1, 1);
        assert!(limiter.allow("10.0.0.1", "", ""));
        // zero-length window means every hit starts a fresh window
        assert!(limiter.allow("10.0.0.1", "", ""));
    }
}
