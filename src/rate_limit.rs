use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::state::AppState;

/// Fixed-window request counter keyed by client IP. The window resets as a
/// whole; there is no sliding behavior.
#[derive(Debug)]
pub struct FixedWindow {
    max_requests: u32,
    window: Duration,
    hits: Mutex<HashMap<IpAddr, WindowState>>,
}

#[derive(Debug, Clone, Copy)]
struct WindowState {
    started: Instant,
    count: u32,
}

impl FixedWindow {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Records a hit for `ip` at `now` and reports whether it is still within
    /// the window's budget.
    pub fn check_at(&self, ip: IpAddr, now: Instant) -> bool {
        let mut hits = self.hits.lock().expect("rate limiter lock poisoned");
        // Elapsed windows are dropped wholesale so the map only tracks IPs
        // seen within the current window.
        hits.retain(|_, state| now.duration_since(state.started) < self.window);
        let state = hits.entry(ip).or_insert(WindowState {
            started: now,
            count: 0,
        });
        state.count += 1;
        state.count <= self.max_requests
    }

    #[cfg(test)]
    fn tracked_ips(&self) -> usize {
        self.hits.lock().expect("rate limiter lock poisoned").len()
    }

    pub fn check(&self, ip: IpAddr) -> bool {
        self.check_at(ip, Instant::now())
    }
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Response {
    if !state.rate_limiter.check(addr.ip()) {
        warn!(ip = %addr.ip(), "rate limit exceeded");
        return (
            axum::http::StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "Too many requests, try again later" })),
        )
            .into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([127, 0, 0, last])
    }

    #[test]
    fn allows_up_to_max_then_rejects() {
        let limiter = FixedWindow::new(3, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.check_at(ip(1), now));
        assert!(limiter.check_at(ip(1), now));
        assert!(limiter.check_at(ip(1), now));
        assert!(!limiter.check_at(ip(1), now));
    }

    #[test]
    fn counts_are_per_ip() {
        let limiter = FixedWindow::new(1, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.check_at(ip(1), now));
        assert!(!limiter.check_at(ip(1), now));
        assert!(limiter.check_at(ip(2), now));
    }

    #[test]
    fn stale_ips_are_evicted() {
        let limiter = FixedWindow::new(5, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check_at(ip(1), start));
        assert!(limiter.check_at(ip(2), start + Duration::from_secs(61)));
        assert_eq!(limiter.tracked_ips(), 1);
    }

    #[test]
    fn window_resets_after_elapsed() {
        let limiter = FixedWindow::new(1, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check_at(ip(1), start));
        assert!(!limiter.check_at(ip(1), start));
        let later = start + Duration::from_secs(61);
        assert!(limiter.check_at(ip(1), later));
    }
}
