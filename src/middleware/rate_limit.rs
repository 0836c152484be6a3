use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

/// Bounds the number of uploads being admitted at once.
#[derive(Debug)]
pub struct ConcurrencyGate {
    semaphore: Semaphore,
    capacity: usize,
    total_requests: AtomicU64,
    rejected_requests: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateLimitMetrics {
    pub total_requests: u64,
    pub rejected_requests: u64,
    pub available_permits: usize,
    pub capacity: usize,
}

impl RateLimitMetrics {
    pub fn rejection_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        (self.rejected_requests as f64 / self.total_requests as f64 * 100.0).round() / 100.0
    }
}

impl ConcurrencyGate {
    pub fn new(capacity: usize) -> Self {
        info!(max_concurrent_requests = capacity, "Initializing request semaphore");
        Self {
            semaphore: Semaphore::new(capacity),
            capacity,
            total_requests: AtomicU64::new(0),
            rejected_requests: AtomicU64::new(0),
        }
    }

    /// Takes a permit without waiting; fails with `RateLimitExceeded` when
    /// all permits are in use.
    pub fn try_acquire(&self) -> AppResult<SemaphorePermit<'_>> {
        let total_requests = self.total_requests.fetch_add(1, Ordering::Relaxed) + 1;

        let permit = self.semaphore.try_acquire().map_err(|_| {
            let rejected = self.rejected_requests.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(
                total_requests = total_requests,
                rejected_requests = rejected,
                "Rate limit exceeded - too many concurrent requests"
            );
            AppError::RateLimitExceeded
        })?;

        debug!(
            total_requests = total_requests,
            available_permits = self.semaphore.available_permits(),
            "Request permit acquired"
        );
        Ok(permit)
    }

    pub fn metrics(&self) -> RateLimitMetrics {
        RateLimitMetrics {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            rejected_requests: self.rejected_requests.load(Ordering::Relaxed),
            available_permits: self.semaphore.available_permits(),
            capacity: self.capacity,
        }
    }
}
