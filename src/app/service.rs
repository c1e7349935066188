//! Application service: the logging loop.
//!
//! [`LoggerService`] owns the sampler, the gain controller and the
//! scheduler.  Every piece of I/O flows through port traits injected at call
//! sites, so the whole loop runs on a workstation against mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────┐ ──▶ LogStorePort
//!   ClockPort ──▶ │       LoggerService       │ ──▶ TransportPort
//!   TimerPort ◀──▶│ Sampler · Gain · Schedule │ ──▶ EventSink
//!    GainPort ◀── └──────────────────────────┘
//! ```
//!
//! One cycle walks `Waiting → Sampling → Persisting → (Transmitting) →
//! Adjusting → Waiting`.  No failure ends the loop; each collaborator's
//! error is emitted as [`AppEvent::Fault`] and the cycle carries on without
//! it.

use core::time::Duration;

use chrono::NaiveDateTime;
use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::config::LoggerConfig;
use crate::control::gain::{GainController, GainLevel};
use crate::error::{ClockError, Error};
use crate::record::{Record, Sample, Timestamp};
use crate::scheduler::Scheduler;
use crate::sensors::sampler::AveragingSampler;

use super::events::AppEvent;
use super::ports::{ClockPort, EventSink, GainPort, LogStorePort, SensorPort, TimerPort, TransportPort};

// ───────────────────────────────────────────────────────────────
// Cycle bookkeeping
// ───────────────────────────────────────────────────────────────

/// Where the loop currently is within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Waiting,
    Sampling,
    Persisting,
    Transmitting,
    Adjusting,
}

/// What happened to telemetry in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryOutcome {
    /// Telemetry is turned off in the configuration.
    Disabled,
    /// The telemetry window has not elapsed yet.
    NotDue,
    /// The record was handed to the radio.
    Sent,
    /// The radio rejected the frame; the window still advanced.
    Failed,
    /// No record this cycle (sensor failure), so nothing was attempted.
    Skipped,
}

/// Result of a single [`LoggerService::run_cycle`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Monotonic time the cycle woke at.
    pub woke_at: Duration,
    /// The record produced, `None` when the sensor failed.
    pub record: Option<Record>,
    pub persisted: bool,
    pub telemetry: TelemetryOutcome,
    /// `(from, to)` when the gain was switched.
    pub gain_change: Option<(GainLevel, GainLevel)>,
}

/// Running counters since start.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    pub cycles: u64,
    pub records_persisted: u64,
    pub persist_failures: u64,
    pub sensor_faults: u64,
    pub clock_faults: u64,
    pub gain_faults: u64,
    pub telemetry_sent: u64,
    pub telemetry_failures: u64,
}

// ───────────────────────────────────────────────────────────────
// LoggerService
// ───────────────────────────────────────────────────────────────

pub struct LoggerService {
    sampler: AveragingSampler,
    gain: GainController,
    scheduler: Scheduler,
    telemetry_enabled: bool,
    reassert_on_wake: bool,
    /// Most recent plausible RTC reading.
    last_good_time: Option<NaiveDateTime>,
    phase: CyclePhase,
    stats: CycleStats,
}

impl LoggerService {
    /// Build the service from a validated configuration.  `now` is the
    /// monotonic boot-relative time; the first sample is one interval later.
    ///
    /// Does **not** touch hardware; call [`start`](Self::start) next.
    pub fn new(config: &LoggerConfig, now: Duration) -> Self {
        Self {
            sampler: AveragingSampler::from_config(config),
            gain: GainController::new(config.gain_up_threshold_v, config.gain_down_threshold_v),
            scheduler: Scheduler::from_config(config, now),
            telemetry_enabled: config.telemetry_enabled,
            reassert_on_wake: config.reassert_gain_on_wake,
            last_good_time: None,
            phase: CyclePhase::Waiting,
            stats: CycleStats::default(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive the initial 1x gain onto the lines.
    pub fn start(&mut self, lines: &mut impl GainPort, sink: &mut impl EventSink) {
        if let Err(e) = self.gain.apply(GainLevel::X1, lines) {
            self.stats.gain_faults += 1;
            sink.emit(&AppEvent::Fault(e.into()));
        }
        sink.emit(&AppEvent::Started {
            gain: self.gain.current(),
        });
        info!(
            "LoggerService started at {}x, telemetry {}",
            self.gain.current(),
            if self.telemetry_enabled { "on" } else { "off" }
        );
    }

    /// Flush the log store and report the run.
    pub fn shutdown(&mut self, store: &mut impl LogStorePort, sink: &mut impl EventSink) {
        if let Err(e) = store.flush() {
            sink.emit(&AppEvent::Fault(e.into()));
        }
        info!("LoggerService stopped: {:?}", self.stats);
        sink.emit(&AppEvent::Stopped {
            cycles: self.stats.cycles,
        });
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full cycle: wait → sample → persist → transmit → adjust.
    ///
    /// `hw` carries the ADC, the gain lines, the RTC and the settle delay;
    /// they share one bus on the board, so they come in as one value.
    pub fn run_cycle(
        &mut self,
        hw: &mut (impl SensorPort + GainPort + ClockPort + DelayNs),
        store: &mut impl LogStorePort,
        radio: &mut impl TransportPort,
        timer: &mut impl TimerPort,
        sink: &mut impl EventSink,
    ) -> CycleReport {
        // 1. Wait
        self.phase = CyclePhase::Waiting;
        let woke_at = self.scheduler.sleep_until_next_sample(timer);
        self.stats.cycles += 1;

        if self.reassert_on_wake {
            if let Err(e) = self.gain.reassert(hw) {
                self.stats.gain_faults += 1;
                sink.emit(&AppEvent::Fault(e.into()));
            }
        }

        // 2. Sample
        self.phase = CyclePhase::Sampling;
        let timestamp = self.read_timestamp(hw, sink);
        let gain = self.gain.current();
        let sampled = self.sampler.sample(hw).and_then(|voltage| {
            Sample {
                timestamp,
                gain,
                voltage,
            }
            .record()
            .map(|record| (voltage, record))
        });
        let (voltage, record) = match sampled {
            Ok(v) => v,
            Err(e) => {
                debug!("No record this cycle");
                self.stats.sensor_faults += 1;
                sink.emit(&AppEvent::Fault(e.into()));
                self.finish(timer);
                return CycleReport {
                    woke_at,
                    record: None,
                    persisted: false,
                    telemetry: TelemetryOutcome::Skipped,
                    gain_change: None,
                };
            }
        };
        sink.emit(&AppEvent::Recorded(record.clone()));

        // 3. Persist
        self.phase = CyclePhase::Persisting;
        let persisted = match store.append(record.as_str()) {
            Ok(()) => {
                self.stats.records_persisted += 1;
                true
            }
            Err(e) => {
                self.stats.persist_failures += 1;
                sink.emit(&AppEvent::Fault(e.into()));
                false
            }
        };

        // 4. Transmit
        let telemetry = self.transmit(&record, woke_at, radio, sink);

        // 5. Adjust
        self.phase = CyclePhase::Adjusting;
        let gain_change = self.adjust(voltage, hw, sink);

        self.finish(timer);
        CycleReport {
            woke_at,
            record: Some(record),
            persisted,
            telemetry,
            gain_change,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn current_gain(&self) -> GainLevel {
        self.gain.current()
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    pub fn next_sample_at(&self) -> Duration {
        self.scheduler.next_sample_at()
    }

    pub fn next_telemetry_at(&self) -> Duration {
        self.scheduler.next_telemetry_at()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Fresh RTC time, else the last good one, else the sentinel.
    fn read_timestamp(&mut self, clock: &mut impl ClockPort, sink: &mut impl EventSink) -> Timestamp {
        let err = match clock.now() {
            Ok(t) if Timestamp::is_plausible(&t) => {
                self.last_good_time = Some(t);
                return Timestamp::Rtc(t);
            }
            Ok(t) => {
                debug!("RTC returned implausible time {:?}", t);
                ClockError::Implausible
            }
            Err(e) => e,
        };

        self.stats.clock_faults += 1;
        sink.emit(&AppEvent::Fault(Error::Clock(err)));
        match self.last_good_time {
            Some(t) => Timestamp::Stale(t),
            None => Timestamp::Unavailable,
        }
    }

    fn transmit(
        &mut self,
        record: &Record,
        now: Duration,
        radio: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) -> TelemetryOutcome {
        if !self.telemetry_enabled {
            return TelemetryOutcome::Disabled;
        }
        if !self.scheduler.is_telemetry_due(now) {
            return TelemetryOutcome::NotDue;
        }

        self.phase = CyclePhase::Transmitting;
        // The window advances whether or not the frame made it out.
        self.scheduler.advance_telemetry_timer(now);
        match radio.send(record.as_bytes()) {
            Ok(()) => {
                self.stats.telemetry_sent += 1;
                sink.emit(&AppEvent::TelemetrySent);
                TelemetryOutcome::Sent
            }
            Err(e) => {
                self.stats.telemetry_failures += 1;
                sink.emit(&AppEvent::Fault(e.into()));
                TelemetryOutcome::Failed
            }
        }
    }

    fn adjust(
        &mut self,
        voltage: f64,
        lines: &mut impl GainPort,
        sink: &mut impl EventSink,
    ) -> Option<(GainLevel, GainLevel)> {
        let from = self.gain.current();
        let to = self.gain.evaluate(voltage)?;
        match self.gain.apply(to, lines) {
            Ok(()) => {
                sink.emit(&AppEvent::GainChanged { from, to });
                Some((from, to))
            }
            Err(e) => {
                self.stats.gain_faults += 1;
                sink.emit(&AppEvent::Fault(e.into()));
                None
            }
        }
    }

    fn finish(&mut self, timer: &mut impl TimerPort) {
        self.scheduler.advance_sample_timer(timer.now());
        self.phase = CyclePhase::Waiting;
    }
}
