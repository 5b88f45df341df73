use std::num::NonZeroU32;

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};

/// Requests-per-second limiter shared by every handle built from one connector.
///
/// A connector configured without a limit hands out a pass-through limiter.
pub struct RpcRateLimiter {
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl RpcRateLimiter {
    pub fn new(requests_per_second: Option<u32>) -> Self {
        let limiter = requests_per_second
            .and_then(NonZeroU32::new)
            .map(|rps| RateLimiter::direct(Quota::per_second(rps)));

        Self { limiter }
    }

    pub async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn zero_limit_means_unlimited() {
        let limiter = RpcRateLimiter::new(Some(0));
        assert!(limiter.limiter.is_none());
        limiter.acquire().await;
    }

    #[tokio::test]
    async fn configured_limit_admits_first_request() {
        let limiter = RpcRateLimiter::new(Some(5));
        assert!(limiter.limiter.is_some());
        limiter.acquire().await;
    }
}
