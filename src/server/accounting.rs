//! Response accounting
//!
//! Counts every request that made it past the auth gate and fires the shutdown signal exactly
//! when the configured threshold is hit. Once the threshold is met, or shutdown starts for any
//! other reason, the accountant reports `closing` so responses stop offering keep-alive.

use super::shutdown::{ShutdownReason, ShutdownSignal};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::info;

/// Shared request counter with an optional shutdown threshold
#[derive(Debug)]
pub struct RequestAccountant {
    served: AtomicU64,
    threshold: u64,
    closing: AtomicBool,
    signal: ShutdownSignal,
}

impl RequestAccountant {
    /// `threshold == 0` never signals
    pub fn new(threshold: u64, signal: ShutdownSignal) -> Self {
        Self {
            served: AtomicU64::new(0),
            threshold,
            closing: AtomicBool::new(false),
            signal,
        }
    }

    /// Count one response and return the post-increment total.
    ///
    /// The increment and the threshold comparison use the value returned by a single
    /// `fetch_add`, so exactly one caller observes `served == threshold`.
    pub fn record(&self) -> u64 {
        let served = self.served.fetch_add(1, Ordering::AcqRel) + 1;
        if self.threshold != 0 && served >= self.threshold {
            self.closing.store(true, Ordering::Release);
            if served == self.threshold {
                info!("response count of {} reached, shutting down", served);
                self.signal.trigger(ShutdownReason::ThresholdReached(served));
            }
        }
        served
    }

    /// Mark the server as shutting down for reasons other than the threshold
    pub fn begin_shutdown(&self) {
        self.closing.store(true, Ordering::Release);
    }

    /// True once responses should close their connection
    pub fn closing(&self) -> bool {
        self.closing.load(Ordering::Acquire)
    }

    /// Responses counted so far
    pub fn served(&self) -> u64 {
        self.served.load(Ordering::Acquire)
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// True once the threshold has been met
    pub fn threshold_reached(&self) -> bool {
        self.threshold != 0 && self.served() >= self.threshold
    }
}
