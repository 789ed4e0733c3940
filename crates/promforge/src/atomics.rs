//! Lock-free value cells shared by all metric types.
//!
//! Integer metrics sit directly on `AtomicI64`/`AtomicU64`; doubles go
//! through `AtomicDouble`, a compare-and-retry loop over the bit pattern.
//! That loop is the only busy-wait in the update path and is bounded by
//! contention, not by I/O.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// An `f64` cell with atomic read, unconditional set, and CAS-loop add.
#[derive(Debug, Default)]
pub struct AtomicDouble(AtomicU64);

impl AtomicDouble {
    pub fn new(v: f64) -> Self {
        Self(AtomicU64::new(v.to_bits()))
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, v: f64) {
        self.0.store(v.to_bits(), Ordering::Release);
    }

    pub fn add(&self, delta: f64) {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self
                .0
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }

    /// Raise the cell to `v` if `v` is greater than the stored value.
    pub fn set_max(&self, v: f64) {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            if f64::from_bits(current) >= v {
                return;
            }
            match self.0.compare_exchange_weak(
                current,
                v.to_bits(),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }

    /// Lower the cell to `v` if `v` is less than the stored value.
    pub fn set_min(&self, v: f64) {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            if f64::from_bits(current) <= v {
                return;
            }
            match self.0.compare_exchange_weak(
                current,
                v.to_bits(),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}

/// Current wall-clock time as unix milliseconds.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Optional last-update stamp for one metric instance.
///
/// Stamping happens after the value mutation and uses `fetch_max`, so a
/// concurrent collection never observes the stamp moving backwards.
#[derive(Debug)]
pub(crate) struct ObservedAt {
    enabled: bool,
    millis: AtomicI64,
}

impl ObservedAt {
    // i64::MIN marks a never-touched stamp; epoch 0 stays representable.
    const UNSET: i64 = i64::MIN;

    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            millis: AtomicI64::new(Self::UNSET),
        }
    }

    /// Record an observation time, preferring an explicit caller timestamp.
    pub(crate) fn touch(&self, explicit: Option<i64>) {
        if !self.enabled {
            return;
        }
        let ts = explicit.unwrap_or_else(now_millis);
        self.millis.fetch_max(ts, Ordering::AcqRel);
    }

    pub(crate) fn get(&self) -> Option<i64> {
        let v = self.millis.load(Ordering::Acquire);
        (v != Self::UNSET).then_some(v)
    }
}
