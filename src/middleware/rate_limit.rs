//! Rate limiting middleware
//!
//! Sliding window with a burst allowance, keyed by client address. Applied
//! to the token endpoints only.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use crate::config::RateLimitSettings;
use crate::state::AppState;
use crate::utils::errors::{EventManagementError, Result};
use crate::utils::helpers::client_address;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Maximum requests per window
    pub max_requests: u32,
    pub window_duration: Duration,
    /// Extra requests allowed once the window is full
    pub burst_allowance: u32,
    /// Key by proxy headers instead of the peer address
    pub trust_forwarded_headers: bool,
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self {
            enabled: settings.enabled,
            max_requests: settings.max_requests,
            window_duration: Duration::from_secs(settings.window_seconds),
            burst_allowance: settings.burst_allowance,
            trust_forwarded_headers: settings.trust_forwarded_headers,
        }
    }
}

#[derive(Debug, Clone)]
struct RateLimitEntry {
    requests: Vec<Instant>,
    burst_used: u32,
    last_reset: Instant,
}

impl RateLimitEntry {
    fn new() -> Self {
        Self {
            requests: Vec::new(),
            burst_used: 0,
            last_reset: Instant::now(),
        }
    }

    fn cleanup(&mut self, window: Duration) {
        let now = Instant::now();
        self.requests.retain(|&time| now.duration_since(time) < window);

        if self.last_reset.elapsed() > window {
            self.burst_used = 0;
            self.last_reset = now;
        }
    }

    fn try_acquire(&mut self, config: &RateLimitConfig) -> bool {
        self.cleanup(config.window_duration);

        let allowed = if (self.requests.len() as u32) < config.max_requests {
            true
        } else if self.burst_used < config.burst_allowance {
            self.burst_used += 1;
            true
        } else {
            false
        };

        if allowed {
            self.requests.push(Instant::now());
        }
        allowed
    }
}

#[derive(Clone)]
pub struct RateLimitMiddleware {
    config: RateLimitConfig,
    entries: Arc<Mutex<HashMap<String, RateLimitEntry>>>,
}

impl RateLimitMiddleware {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, RateLimitEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Count a request from `client`; `RateLimitExceeded` once over the limit
    pub fn check(&self, client: &str) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let mut entries = self.entries();
        let entry = entries.entry(client.to_string()).or_insert_with(RateLimitEntry::new);

        if entry.try_acquire(&self.config) {
            debug!(client = client, "Rate limit check passed");
            Ok(())
        } else {
            warn!(client = client, "Rate limit exceeded");
            Err(EventManagementError::RateLimitExceeded)
        }
    }

    pub fn trusts_forwarded_headers(&self) -> bool {
        self.config.trust_forwarded_headers
    }

    /// Drop clients with no request in the last two windows
    pub fn cleanup_old_entries(&self) {
        let mut entries = self.entries();
        let horizon = self.config.window_duration * 2;
        entries.retain(|_, entry| entry.requests.iter().any(|time| time.elapsed() < horizon));
        debug!(remaining_entries = entries.len(), "Cleaned up old rate limit entries");
    }
}

/// axum middleware throttling by client address
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let client = client_address(
        request.headers(),
        request.extensions(),
        state.rate_limiter.trusts_forwarded_headers(),
    );
    if let Err(e) = state.rate_limiter.check(&client) {
        return e.into_response();
    }
    state.rate_limiter.cleanup_old_entries();
    next.run(request).await
}
