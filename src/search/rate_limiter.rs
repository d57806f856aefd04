// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Local quota on outbound search requests

use governor::clock::{Clock, DefaultClock};
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovRateLimiter};
use std::num::NonZeroU32;

use super::types::SearchError;

const DEFAULT_RPM: u32 = 60;

/// Per-minute quota checked before every provider call.
///
/// The quota is enforced locally so a burst of strategy fallbacks cannot
/// exhaust the provider's own limit.
pub struct SearchRateLimiter {
    limiter: GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    clock: DefaultClock,
}

impl SearchRateLimiter {
    /// A zero or absent configuration falls back to the default quota.
    pub fn new(requests_per_minute: u32) -> Self {
        let rpm = NonZeroU32::new(requests_per_minute)
            .or(NonZeroU32::new(DEFAULT_RPM))
            .unwrap_or(NonZeroU32::MIN);
        let clock = DefaultClock::default();
        let limiter = GovRateLimiter::direct_with_clock(Quota::per_minute(rpm), &clock);

        Self { limiter, clock }
    }

    /// Consume one slot, or report how long until the next one opens.
    pub fn check(&self) -> Result<(), SearchError> {
        self.limiter.check().map_err(|not_until| {
            let wait = not_until.wait_time_from(self.clock.now());
            SearchError::RateLimited {
                retry_after_secs: wait.as_secs().max(1),
            }
        })
    }
}
