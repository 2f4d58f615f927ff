//! Two-window request throttle shared by every upstream call.
//!
//! Keeps the instants of recent admissions in a 1-second and a 60-second
//! sliding window. `admit` blocks in fixed quanta until both windows have
//! room, then records the call. It never fails; a caller that cannot get
//! through just waits.
//!
//! Fractional ceilings are floored (1.2/s admits at most 1 call in any
//! trailing second) with a minimum of 1, so the admitted count never exceeds
//! the configured value.

use super::clock::{Clock, SystemClock};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::trace;

const SECOND: Duration = Duration::from_secs(1);
const MINUTE: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateGateConfig {
    pub max_calls_per_sec: f64,
    pub max_calls_per_min: f64,
    /// Sleep between capacity checks while the gate is full.
    pub quantum: Duration,
}

impl Default for RateGateConfig {
    fn default() -> Self {
        Self {
            max_calls_per_sec: 1.2,
            max_calls_per_min: 70.0,
            quantum: Duration::from_millis(250),
        }
    }
}

fn ceiling(limit: f64) -> usize {
    if limit.is_finite() && limit >= 1.0 {
        limit.floor() as usize
    } else {
        1
    }
}

#[derive(Debug, Default)]
struct Windows {
    second: VecDeque<Instant>,
    minute: VecDeque<Instant>,
}

impl Windows {
    fn prune(&mut self, now: Instant) {
        while self.second.front().is_some_and(|t| now.duration_since(*t) >= SECOND) {
            self.second.pop_front();
        }
        while self.minute.front().is_some_and(|t| now.duration_since(*t) >= MINUTE) {
            self.minute.pop_front();
        }
    }
}

pub struct RateGate {
    per_sec: usize,
    per_min: usize,
    quantum: Duration,
    clock: Arc<dyn Clock>,
    windows: Mutex<Windows>,
}

impl RateGate {
    pub fn new(config: RateGateConfig, clock: Arc<dyn Clock>) -> Self {
        let quantum = if config.quantum.is_zero() {
            Duration::from_millis(1)
        } else {
            config.quantum
        };
        Self {
            per_sec: ceiling(config.max_calls_per_sec),
            per_min: ceiling(config.max_calls_per_min),
            quantum,
            clock,
            windows: Mutex::new(Windows::default()),
        }
    }

    /// Gate on the real clock.
    pub fn system(config: RateGateConfig) -> Self {
        Self::new(config, Arc::new(SystemClock))
    }

    /// Effective (per-second, per-minute) ceilings after flooring.
    pub fn ceilings(&self) -> (usize, usize) {
        (self.per_sec, self.per_min)
    }

    /// Block until one more call fits in both windows, then record it.
    pub fn admit(&self) {
        let mut waited = Duration::ZERO;
        loop {
            {
                let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
                let now = self.clock.now();
                windows.prune(now);
                if windows.second.len() < self.per_sec && windows.minute.len() < self.per_min {
                    windows.second.push_back(now);
                    windows.minute.push_back(now);
                    if !waited.is_zero() {
                        trace!(waited_ms = waited.as_millis() as u64, "rate gate admitted");
                    }
                    return;
                }
            }
            self.clock.sleep(self.quantum);
            waited += self.quantum;
        }
    }

    /// Calls currently inside the (1 s, 60 s) windows.
    pub fn in_flight(&self) -> (usize, usize) {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        windows.prune(self.clock.now());
        (windows.second.len(), windows.minute.len())
    }
}

impl std::fmt::Debug for RateGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateGate")
            .field("per_sec", &self.per_sec)
            .field("per_min", &self.per_min)
            .field("quantum", &self.quantum)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::clock::ManualClock;

    fn manual_gate(per_sec: f64, per_min: f64) -> (RateGate, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let config = RateGateConfig {
            max_calls_per_sec: per_sec,
            max_calls_per_min: per_min,
            quantum: Duration::from_millis(250),
        };
        (RateGate::new(config, clock.clone()), clock)
    }

    #[test]
    fn fractional_ceiling_is_floored() {
        let (gate, _) = manual_gate(1.2, 70.0);
        assert_eq!(gate.ceilings(), (1, 70));
        let (gate, _) = manual_gate(0.5, 2.9);
        assert_eq!(gate.ceilings(), (1, 2));
    }

    #[test]
    fn first_call_passes_immediately() {
        let (gate, clock) = manual_gate(1.2, 70.0);
        gate.admit();
        assert!(clock.sleeps().is_empty());
        assert_eq!(gate.in_flight(), (1, 1));
    }

    #[test]
    fn second_call_waits_a_full_second() {
        let (gate, clock) = manual_gate(1.2, 70.0);
        gate.admit();
        gate.admit();
        assert_eq!(clock.elapsed(), Duration::from_secs(1));
        assert_eq!(clock.sleeps().len(), 4);
    }

    #[test]
    fn minute_window_caps_burst() {
        let (gate, clock) = manual_gate(100.0, 3.0);
        for _ in 0..3 {
            gate.admit();
        }
        assert_eq!(clock.elapsed(), Duration::ZERO);
        gate.admit();
        assert_eq!(clock.elapsed(), Duration::from_secs(60));
    }

    #[test]
    fn windows_expire() {
        let (gate, clock) = manual_gate(2.0, 70.0);
        gate.admit();
        gate.admit();
        clock.advance(Duration::from_secs(1));
        assert_eq!(gate.in_flight(), (0, 2));
    }
}
