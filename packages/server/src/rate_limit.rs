//! Per-client rate limiting.
//!
//! Uses `governor`'s keyed GCRA limiter, one cell per client IP address.
//! Every [`PRUNE_EVERY`] checks, clients whose quota has fully refilled are
//! dropped from the store, so memory tracks recent clients only.

use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{Error, HttpResponse, web};
use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use traffic_accidents_server_models::ApiError;

/// Number of checks between sweeps of idle clients.
pub const PRUNE_EVERY: u64 = 1024;

type KeyedLimiter<C> =
    RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// Limits how often each client IP may call the API.
pub struct ClientRateLimiter<C: Clock = DefaultClock> {
    limiter: KeyedLimiter<C>,
    checks: AtomicU64,
}

impl ClientRateLimiter {
    /// Allows `per_minute` requests per client per minute, all of which
    /// may arrive in a burst.
    #[must_use]
    pub fn per_minute(per_minute: NonZeroU32) -> Self {
        Self::per_minute_with_clock(per_minute, &DefaultClock::default())
    }
}

impl<C: Clock> ClientRateLimiter<C> {
    /// Like [`ClientRateLimiter::per_minute`], reading time from `clock`.
    #[must_use]
    pub fn per_minute_with_clock(per_minute: NonZeroU32, clock: &C) -> Self {
        Self {
            limiter: RateLimiter::new(
                Quota::per_minute(per_minute),
                DefaultKeyedStateStore::default(),
                clock,
            ),
            checks: AtomicU64::new(0),
        }
    }

    /// Records a request from `client` and returns whether it is within
    /// quota.
    #[must_use]
    pub fn check(&self, client: IpAddr) -> bool {
        let allowed = self.limiter.check_key(&client).is_ok();
        if (self.checks.fetch_add(1, Ordering::Relaxed) + 1).is_multiple_of(PRUNE_EVERY) {
            self.prune();
        }
        allowed
    }

    /// Drops clients whose quota has fully refilled.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        log::trace!("Rate limiter tracking {} client(s)", self.limiter.len());
    }

    /// Number of clients currently tracked.
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }
}

/// Middleware rejecting requests over quota with `429 Too Many Requests`.
///
/// Passes every request through when no [`ClientRateLimiter`] is
/// registered as app data. Requests without a peer address share a single
/// quota.
///
/// # Errors
///
/// Propagates errors from the wrapped service.
pub async fn limit_requests(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let client = req
        .peer_addr()
        .map_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED), |addr| addr.ip());

    let allowed = req
        .app_data::<web::Data<ClientRateLimiter>>()
        .is_none_or(|limiter| limiter.check(client));

    if !allowed {
        log::debug!("Rate limit exceeded for {client}");
        return Ok(req.into_response(
            HttpResponse::TooManyRequests().json(ApiError::new("Too many requests")),
        ));
    }

    Ok(next.call(req).await?.map_into_boxed_body())
}
