//! End-to-end tests for the logging loop against mock adapters.

use std::sync::Mutex;
use std::thread::{self, ThreadId};
use std::time::Duration;

use fluorologger::app::events::AppEvent;
use fluorologger::app::service::{CyclePhase, CycleReport, LoggerService, TelemetryOutcome};
use fluorologger::config::LoggerConfig;
use fluorologger::control::gain::GainLevel;
use fluorologger::error::{ClockError, Error, SensorError, StorageError};

use super::mock_hw::{at, MockBoard, MockRadio, MockStore, RecordingSink, Scene, SimTimer};

// ── Rig ───────────────────────────────────────────────────────

struct Rig {
    service: LoggerService,
    board: MockBoard,
    store: MockStore,
    radio: MockRadio,
    timer: SimTimer,
    sink: RecordingSink,
}

impl Rig {
    fn new(config: &LoggerConfig, board: MockBoard) -> Self {
        let timer = SimTimer::default();
        let mut rig = Self {
            service: LoggerService::new(config, Duration::ZERO),
            board,
            store: MockStore::default(),
            radio: MockRadio::default(),
            timer,
            sink: RecordingSink::default(),
        };
        rig.service.start(&mut rig.board, &mut rig.sink);
        rig
    }

    fn cycle(&mut self) -> CycleReport {
        self.service.run_cycle(
            &mut self.board,
            &mut self.store,
            &mut self.radio,
            &mut self.timer,
            &mut self.sink,
        )
    }

    fn cycles(&mut self, n: usize) -> Vec<CycleReport> {
        (0..n).map(|_| self.cycle()).collect()
    }
}

/// Radio variant with the divider disabled so voltages read back 1:1.
fn unity() -> LoggerConfig {
    LoggerConfig {
        divider_factor: 1.0,
        ..LoggerConfig::default()
    }
}

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

// ── Basic cycle ───────────────────────────────────────────────

#[test]
fn start_drives_unity_gain() {
    let rig = Rig::new(&unity(), MockBoard::fixed(1.5));
    assert_eq!(rig.board.gain_writes, vec![GainLevel::X1]);
    assert_eq!(rig.service.current_gain(), GainLevel::X1);
    assert_eq!(
        rig.sink.events,
        vec![AppEvent::Started {
            gain: GainLevel::X1
        }]
    );
}

#[test]
fn first_cycle_records_persists_and_transmits() {
    let mut rig = Rig::new(&unity(), MockBoard::fixed(1.5));
    let report = rig.cycle();

    let line = "2024-06-01 12:00:00,1,1.500";
    assert_eq!(report.woke_at, secs(1));
    assert_eq!(report.record.as_ref().map(|r| r.as_str()), Some(line));
    assert!(report.persisted);
    assert_eq!(report.telemetry, TelemetryOutcome::Sent);
    assert_eq!(report.gain_change, None);

    assert_eq!(rig.store.lines, vec![line.to_owned()]);
    assert_eq!(rig.radio.frames, vec![line.as_bytes().to_vec()]);
    assert_eq!(rig.board.reads, 10);
    assert_eq!(rig.board.delay_ns, 9 * 10_000_000);
    assert_eq!(rig.service.phase(), CyclePhase::Waiting);
}

#[test]
fn every_record_is_echoed() {
    let mut rig = Rig::new(&unity(), MockBoard::fixed(1.0));
    rig.cycles(3);
    let echoed: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Recorded(r) => Some(r.as_str().to_owned()),
            _ => None,
        })
        .collect();
    assert_eq!(echoed, rig.store.lines);
}

#[test]
fn radio_variant_applies_divider() {
    let mut rig = Rig::new(&LoggerConfig::default(), MockBoard::fixed(1.0));
    let report = rig.cycle();
    assert_eq!(report.record.unwrap().as_str(), "2024-06-01 12:00:00,1,0.660");
}

#[test]
fn standalone_variant_never_transmits() {
    let mut rig = Rig::new(&LoggerConfig::standalone(), MockBoard::fixed(2.0));
    let reports = rig.cycles(5);

    assert!(reports.iter().all(|r| r.telemetry == TelemetryOutcome::Disabled));
    assert_eq!(rig.radio.attempts, 0);
    assert_eq!(rig.store.lines.len(), 5);
    assert!(rig.store.lines[0].ends_with(",1,2.000"));
}

// ── Gain control end-to-end ───────────────────────────────────

#[test]
fn dark_at_unity_steps_up_to_10x() {
    let mut rig = Rig::new(&unity(), MockBoard::fixed(0.3));
    let report = rig.cycle();
    assert_eq!(report.gain_change, Some((GainLevel::X1, GainLevel::X10)));
    // The record carries the gain in force while sampling.
    assert!(report.record.unwrap().as_str().ends_with(",1,0.300"));
    assert_eq!(rig.service.current_gain(), GainLevel::X10);
    assert_eq!(rig.board.hw_gain, Some(GainLevel::X10));
}

#[test]
fn bright_at_100x_steps_down_to_10x() {
    let mut rig = Rig::new(&unity(), MockBoard::fixed(0.3));
    rig.cycles(2);
    assert_eq!(rig.service.current_gain(), GainLevel::X100);

    rig.board.scene = Scene::Fixed(3.0);
    let report = rig.cycle();
    assert!(report.record.unwrap().as_str().ends_with(",100,3.000"));
    assert_eq!(report.gain_change, Some((GainLevel::X100, GainLevel::X10)));
    assert_eq!(rig.service.current_gain(), GainLevel::X10);
}

#[test]
fn in_band_at_10x_holds() {
    let mut rig = Rig::new(&unity(), MockBoard::fixed(0.3));
    rig.cycle();
    rig.board.scene = Scene::Fixed(1.5);
    let report = rig.cycle();
    assert_eq!(report.gain_change, None);
    assert_eq!(rig.service.current_gain(), GainLevel::X10);
}

#[test]
fn persistent_dark_climbs_one_step_per_cycle_then_holds() {
    let mut rig = Rig::new(&unity(), MockBoard::fixed(0.1));
    let gains: Vec<_> = (0..4)
        .map(|_| {
            rig.cycle();
            rig.service.current_gain()
        })
        .collect();
    assert_eq!(
        gains,
        vec![GainLevel::X10, GainLevel::X100, GainLevel::X100, GainLevel::X100]
    );
}

#[test]
fn persistent_bright_falls_to_unity_then_holds() {
    let mut rig = Rig::new(&unity(), MockBoard::fixed(0.1));
    rig.cycles(2);
    rig.board.scene = Scene::Fixed(3.5);
    let gains: Vec<_> = (0..3)
        .map(|_| {
            rig.cycle();
            rig.service.current_gain()
        })
        .collect();
    assert_eq!(gains, vec![GainLevel::X10, GainLevel::X1, GainLevel::X1]);
}

#[test]
fn amplified_signal_settles_in_band() {
    // 20 mV of fluorescence: 0.02 V at 1x, 0.2 V at 10x, 2.0 V at 100x.
    let mut rig = Rig::new(&unity(), MockBoard::new(Scene::Signal(0.02)));
    let reports = rig.cycles(4);

    let lines: Vec<_> = reports
        .iter()
        .map(|r| r.record.as_ref().unwrap().as_str().to_owned())
        .collect();
    assert!(lines[0].ends_with(",1,0.020"));
    assert!(lines[1].ends_with(",10,0.200"));
    assert!(lines[2].ends_with(",100,2.000"));
    assert!(lines[3].ends_with(",100,2.000"));
    assert_eq!(reports[3].gain_change, None);
}

#[test]
fn gain_write_failure_keeps_previous_level() {
    let mut rig = Rig::new(&unity(), MockBoard::fixed(0.1));
    rig.board.fail_gain_writes = true;
    let report = rig.cycle();

    assert_eq!(report.gain_change, None);
    assert!(report.persisted);
    assert_eq!(rig.service.current_gain(), GainLevel::X1);
    // Re-assert on wake and the switch attempt both failed.
    assert_eq!(rig.service.stats().gain_faults, 2);
}

// ── Re-assert on wake ─────────────────────────────────────────

#[test]
fn gain_reasserted_every_wake() {
    let mut rig = Rig::new(&unity(), MockBoard::fixed(1.0));
    rig.cycles(3);
    assert_eq!(rig.board.gain_writes, vec![GainLevel::X1; 4]);
}

#[test]
fn lost_line_state_restored_before_sampling() {
    let mut rig = Rig::new(&unity(), MockBoard::new(Scene::Signal(0.02)));
    rig.cycles(2);
    assert_eq!(rig.service.current_gain(), GainLevel::X100);

    // Lines float back to unity during sleep.
    rig.board.hw_gain = Some(GainLevel::X1);
    let report = rig.cycle();
    assert!(report.record.unwrap().as_str().ends_with(",100,2.000"));
}

#[test]
fn reassert_can_be_disabled() {
    let config = LoggerConfig {
        reassert_gain_on_wake: false,
        ..unity()
    };
    let mut rig = Rig::new(&config, MockBoard::fixed(1.0));
    rig.cycles(3);
    assert_eq!(rig.board.gain_writes, vec![GainLevel::X1]);
}

// ── Failures ──────────────────────────────────────────────────

#[test]
fn storage_failure_does_not_stop_next_cycle() {
    let mut rig = Rig::new(&unity(), MockBoard::fixed(1.0));
    rig.store.fail_attempts.insert(1);
    let reports = rig.cycles(3);

    assert_eq!(
        reports.iter().map(|r| r.persisted).collect::<Vec<_>>(),
        vec![true, false, true]
    );
    assert!(reports[2].record.is_some());
    assert_eq!(rig.store.attempts, 3);
    assert_eq!(rig.store.lines.len(), 2);
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::Fault(Error::Storage(StorageError::IoError))));
    assert_eq!(rig.service.stats().persist_failures, 1);
    assert_eq!(rig.service.stats().records_persisted, 2);
}

#[test]
fn sensor_failure_skips_cycle_without_spending_telemetry() {
    let mut rig = Rig::new(&unity(), MockBoard::fixed(0.1));
    rig.board.failing_reads = 1;
    let report = rig.cycle();

    assert_eq!(report.record, None);
    assert_eq!(report.telemetry, TelemetryOutcome::Skipped);
    assert_eq!(report.gain_change, None);
    assert_eq!(rig.store.attempts, 0);
    assert_eq!(rig.radio.attempts, 0);
    assert_eq!(rig.service.current_gain(), GainLevel::X1);
    assert_eq!(rig.service.stats().sensor_faults, 1);

    // Sample timer re-armed; telemetry still due on the next good cycle.
    assert_eq!(rig.service.next_sample_at(), secs(2));
    let next = rig.cycle();
    assert_eq!(next.woke_at, secs(2));
    assert_eq!(next.telemetry, TelemetryOutcome::Sent);
}

#[test]
fn reading_beyond_full_scale_is_not_logged() {
    let mut rig = Rig::new(&unity(), MockBoard::fixed(1.0e45));
    let report = rig.cycle();

    assert_eq!(report.record, None);
    assert_eq!(report.telemetry, TelemetryOutcome::Skipped);
    assert_eq!(rig.store.attempts, 0);
    assert_eq!(rig.radio.attempts, 0);
    assert_eq!(rig.service.current_gain(), GainLevel::X1);
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::Fault(Error::Sensor(SensorError::OutOfRange))));

    rig.board.scene = Scene::Fixed(1.0);
    let next = rig.cycle();
    assert_eq!(rig.store.lines, vec!["2024-06-01 12:00:00,1,1.000".to_owned()]);
    assert_eq!(next.telemetry, TelemetryOutcome::Sent);
}

#[test]
fn clock_failure_falls_back_to_last_good_time() {
    let mut board = MockBoard::fixed(1.0);
    board.clock_script.extend([
        Err(ClockError::Unavailable),
        Ok(at(2024, 6, 1, 8, 30, 0)),
        Err(ClockError::OscillatorStopped),
        Ok(at(2000, 1, 1, 0, 0, 5)),
    ]);
    let mut rig = Rig::new(&unity(), board);
    let lines: Vec<_> = rig
        .cycles(4)
        .into_iter()
        .map(|r| r.record.unwrap().as_str().to_owned())
        .collect();

    assert_eq!(lines[0], "0000-00-00 00:00:00,1,1.000");
    assert_eq!(lines[1], "2024-06-01 08:30:00,1,1.000");
    assert_eq!(lines[2], "2024-06-01 08:30:00,1,1.000");
    assert_eq!(lines[3], "2024-06-01 08:30:00,1,1.000");
    assert_eq!(rig.service.stats().clock_faults, 3);
    assert_eq!(rig.store.lines.len(), 4);
}

// ── Telemetry cadence ─────────────────────────────────────────

#[test]
fn telemetry_first_cycle_then_once_per_window() {
    let config = LoggerConfig {
        telemetry_interval_secs: 5,
        ..unity()
    };
    let mut rig = Rig::new(&config, MockBoard::fixed(1.0));
    let sent_at: Vec<_> = rig
        .cycles(12)
        .into_iter()
        .filter(|r| r.telemetry == TelemetryOutcome::Sent)
        .map(|r| r.woke_at)
        .collect();

    assert_eq!(sent_at, vec![secs(1), secs(6), secs(11)]);
    assert_eq!(rig.radio.frames.len(), 3);
    assert_eq!(rig.store.lines.len(), 12);
}

#[test]
fn telemetry_failure_still_advances_window() {
    let config = LoggerConfig {
        telemetry_interval_secs: 5,
        ..unity()
    };
    let mut rig = Rig::new(&config, MockBoard::fixed(1.0));
    rig.radio.fail = true;
    let reports = rig.cycles(5);

    assert_eq!(reports[0].telemetry, TelemetryOutcome::Failed);
    assert!(reports[1..]
        .iter()
        .all(|r| r.telemetry == TelemetryOutcome::NotDue));
    assert_eq!(rig.radio.attempts, 1);
    assert_eq!(rig.service.next_telemetry_at(), secs(6));
    assert_eq!(rig.service.stats().telemetry_failures, 1);
}

// ── Scheduling ────────────────────────────────────────────────

#[test]
fn overrun_rearms_from_wake_time() {
    let mut rig = Rig::new(&unity(), MockBoard::fixed(1.0));
    rig.cycle();
    assert_eq!(rig.service.next_sample_at(), secs(2));

    // Something kept the board busy past the deadline.
    rig.timer.now = Duration::from_millis(5500);
    let sleeps = rig.timer.sleeps;
    let report = rig.cycle();

    assert_eq!(report.woke_at, Duration::from_millis(5500));
    assert_eq!(rig.timer.sleeps, sleeps);
    assert_eq!(rig.service.next_sample_at(), Duration::from_millis(6500));
}

// ── Shutdown ──────────────────────────────────────────────────

#[test]
fn shutdown_flushes_and_reports_cycles() {
    let mut rig = Rig::new(&unity(), MockBoard::fixed(1.0));
    rig.cycles(2);
    rig.service.shutdown(&mut rig.store, &mut rig.sink);

    assert_eq!(rig.store.flushes, 1);
    assert_eq!(rig.sink.events.last(), Some(&AppEvent::Stopped { cycles: 2 }));
    assert_eq!(rig.service.stats().cycles, 2);
}

// ── Diagnostics ───────────────────────────────────────────────

/// Keeps every log line with the thread that wrote it; tests in this binary
/// run in parallel, so each one only looks at its own thread.
struct CaptureLogger;

static CAPTURED: Mutex<Vec<(ThreadId, log::Level, String)>> = Mutex::new(Vec::new());

impl log::Log for CaptureLogger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        if record.target().starts_with("fluorologger::app") {
            CAPTURED.lock().unwrap().push((
                thread::current().id(),
                record.level(),
                record.args().to_string(),
            ));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

#[test]
fn faults_reach_the_console_only_through_the_sink() {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(log::LevelFilter::Trace);

    let mut rig = Rig::new(&unity(), MockBoard::fixed(1.0));
    rig.board.failing_reads = 1;
    rig.board.clock_default = Err(ClockError::Unavailable);
    rig.store.fail_attempts.insert(0);
    rig.radio.fail = true;
    rig.cycles(2);

    assert_eq!(rig.sink.faults(), 5);
    let me = thread::current().id();
    let warnings: Vec<String> = CAPTURED
        .lock()
        .unwrap()
        .iter()
        .filter(|(id, level, _)| *id == me && *level <= log::Level::Warn)
        .map(|(_, _, msg)| msg.clone())
        .collect();
    assert!(warnings.is_empty(), "service logged faults itself: {:?}", warnings);
}
