use axum::extract::{ConnectInfo, State};
use axum::http::{header, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// A fixed window rate limiter, keyed by client address. Each client
/// gets at most `max_requests` per window, then 429 until the window
/// rolls over.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    max_requests: u64,
    window: Duration,
    clients: Mutex<HashMap<String, (u64, Instant)>>,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u64, window: Duration) -> Self {
        FixedWindowLimiter {
            max_requests,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Account for one request from this client. Returns how long to
    /// wait when the client is over its budget.
    pub async fn check(&self, client: &str) -> Result<(), Duration> {
        let mut clients = self.clients.lock().await;
        let now = Instant::now();

        // Entries whose window has rolled over are dead weight, so
        // every pass sweeps them out to keep the map bounded by the
        // number of clients seen within one window.
        let window = self.window;
        clients.retain(|_, (_, window_start)| now.duration_since(*window_start) < window);

        let (count, window_start) = *clients.entry(client.to_string()).or_insert((0, now));

        if count >= self.max_requests {
            let retry_after = self.window - now.duration_since(window_start);
            return Err(retry_after);
        }

        clients.insert(client.to_string(), (count + 1, window_start));
        Ok(())
    }
}

#[tracing::instrument(name = "Rate Limiting", skip(limiter, req, next))]
pub async fn rate_limit<B>(
    State(limiter): State<Arc<FixedWindowLimiter>>,
    req: Request<B>,
    next: Next<B>,
) -> Response {
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    match limiter.check(&client).await {
        Ok(()) => next.run(req).await,
        Err(retry_after) => {
            tracing::info!("rate limit exceeded for {client}");
            let retry_after = retry_after.as_secs().max(1);
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after.to_string())],
                Json(serde_json::json!({
                    "status": "fail",
                    "message": format!("rate limit exceeded, retry after: {retry_after}s"),
                    "code": "rate/limit_exceeded"
                })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;

    #[tokio::test]
    async fn requests_within_the_budget_pass() {
        let limiter = FixedWindowLimiter::new(3, Duration::from_secs(5));
        for _ in 0..3 {
            assert_that(&limiter.check("1.2.3.4").await).is_ok();
        }
    }

    #[tokio::test]
    async fn the_request_over_budget_is_rejected() {
        let limiter = FixedWindowLimiter::new(2, Duration::from_secs(5));
        assert_that(&limiter.check("1.2.3.4").await).is_ok();
        assert_that(&limiter.check("1.2.3.4").await).is_ok();
        assert_that(&limiter.check("1.2.3.4").await).is_err();
    }

    #[tokio::test]
    async fn clients_have_separate_budgets() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_secs(5));
        assert_that(&limiter.check("1.2.3.4").await).is_ok();
        assert_that(&limiter.check("5.6.7.8").await).is_ok();
        assert_that(&limiter.check("1.2.3.4").await).is_err();
    }

    #[tokio::test]
    async fn stale_clients_are_swept_out_after_their_window() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_millis(10));
        for i in 0..100 {
            assert_that(&limiter.check(&format!("10.0.0.{i}")).await).is_ok();
        }
        assert_that(&limiter.clients.lock().await.len()).is_equal_to(100);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_that(&limiter.check("1.2.3.4").await).is_ok();

        // One pass after the window only the fresh client remains.
        assert_that(&limiter.clients.lock().await.len()).is_equal_to(1);
    }

    #[tokio::test]
    async fn the_budget_resets_when_the_window_rolls_over() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_millis(10));
        assert_that(&limiter.check("1.2.3.4").await).is_ok();
        assert_that(&limiter.check("1.2.3.4").await).is_err();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_that(&limiter.check("1.2.3.4").await).is_ok();
    }
}
