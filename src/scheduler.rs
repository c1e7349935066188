//! Two-deadline cycle scheduler.
//!
//! ```text
//!   start ──▶ next_sample_at = now + sample_interval
//!             next_telemetry_at = 0            (first cycle transmits)
//!
//!   each cycle:  sleep_until_next_sample ─▶ … ─▶ advance_sample_timer(now)
//!   on a send:   advance_telemetry_timer(now)
//! ```
//!
//! Deadlines are always re-armed as `now + interval`, never
//! `deadline + interval`.  An overrun (slow card write, long radio frame)
//! stretches the interval instead of making the loop race to catch up.

use core::time::Duration;

use log::{debug, info};

use crate::app::ports::TimerPort;
use crate::config::LoggerConfig;

pub struct Scheduler {
    sample_interval: Duration,
    telemetry_interval: Duration,
    next_sample_at: Duration,
    next_telemetry_at: Duration,
}

impl Scheduler {
    /// Arm the first sample one interval after `now`; telemetry is due
    /// immediately.
    pub fn new(sample_interval: Duration, telemetry_interval: Duration, now: Duration) -> Self {
        info!(
            "Scheduler: sample every {:?}, telemetry every {:?}",
            sample_interval, telemetry_interval
        );
        Self {
            sample_interval,
            telemetry_interval,
            next_sample_at: now + sample_interval,
            next_telemetry_at: Duration::ZERO,
        }
    }

    pub fn from_config(config: &LoggerConfig, now: Duration) -> Self {
        Self::new(config.sample_interval(), config.telemetry_interval(), now)
    }

    /// Block until the sample deadline and return the wake time.
    ///
    /// Early wakes (foreign wake sources) go back to sleep, so this returns
    /// once per deadline.  If the deadline already passed, returns at once.
    pub fn sleep_until_next_sample(&self, timer: &mut impl TimerPort) -> Duration {
        let mut now = timer.now();
        while now < self.next_sample_at {
            timer.sleep_until(self.next_sample_at);
            now = timer.now();
        }
        now
    }

    pub fn is_telemetry_due(&self, now: Duration) -> bool {
        now >= self.next_telemetry_at
    }

    pub fn advance_sample_timer(&mut self, now: Duration) {
        self.next_sample_at = now + self.sample_interval;
        debug!("Scheduler: next sample at {:?}", self.next_sample_at);
    }

    pub fn advance_telemetry_timer(&mut self, now: Duration) {
        self.next_telemetry_at = now + self.telemetry_interval;
        debug!("Scheduler: next telemetry at {:?}", self.next_telemetry_at);
    }

    pub fn next_sample_at(&self) -> Duration {
        self.next_sample_at
    }

    pub fn next_telemetry_at(&self) -> Duration {
        self.next_telemetry_at
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
