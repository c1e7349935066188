//! System configuration parameters
//!
//! All tunable parameters for the logger.  Defaults reproduce the radio
//! deployment (divider-corrected input, telemetry on); [`LoggerConfig::standalone`]
//! reproduces the card-only deployment.  Values can be overridden by a JSON
//! file on the log volume (see [`crate::adapters::config_file`]).

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Default location of the append-only CSV log on the mounted card.
pub const DEFAULT_LOG_PATH: &str = "/sd/voltage_log.csv";

/// How the record is framed on the radio link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TelemetryFraming {
    /// The record text bytes, nothing else.
    #[default]
    Raw,
    /// `!M{"text":"<record>"}\n` for a Meshtastic serial text bridge.
    MeshtasticJson,
}

/// Core logger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    // --- Timing ---
    /// Sample interval (milliseconds)
    pub sample_interval_ms: u32,
    /// Telemetry interval (seconds)
    pub telemetry_interval_secs: u32,

    // --- Averaging sampler ---
    /// Raw ADC readings averaged into one sample
    pub averaging_samples: u8,
    /// Settle delay between raw readings (milliseconds)
    pub averaging_delay_ms: u32,
    /// Correction for the resistive divider in front of the ADC (1.0 = none)
    pub divider_factor: f64,

    // --- Gain control ---
    /// Step gain up when the averaged voltage falls below this (V)
    pub gain_up_threshold_v: f64,
    /// Step gain down when the averaged voltage rises above this (V)
    pub gain_down_threshold_v: f64,
    /// Re-drive the gain lines for the current level after every wake
    pub reassert_gain_on_wake: bool,
    /// Gain-select lines are active HIGH (false = active LOW)
    pub gain_lines_active_high: bool,

    // --- Telemetry ---
    /// Relay records over the radio link
    pub telemetry_enabled: bool,
    /// Wire framing for telemetry frames
    pub telemetry_framing: TelemetryFraming,

    // --- Storage ---
    /// Path of the append-only CSV log
    pub log_path: heapless::String<64>,
    /// Write a header row when the log file is new or empty
    pub write_header: bool,

    // --- Hardware ---
    /// 7-bit I2C address of the ADS1115
    pub adc_i2c_address: u8,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        let mut log_path = heapless::String::new();
        let _ = log_path.push_str(DEFAULT_LOG_PATH);

        Self {
            // Timing
            sample_interval_ms: 1000,    // 1 Hz
            telemetry_interval_secs: 60, // 1/min

            // Averaging
            averaging_samples: 10,
            averaging_delay_ms: 10,
            divider_factor: 0.66,

            // Gain
            gain_up_threshold_v: 0.5,
            gain_down_threshold_v: 2.5,
            reassert_gain_on_wake: true,
            gain_lines_active_high: true,

            // Telemetry
            telemetry_enabled: true,
            telemetry_framing: TelemetryFraming::Raw,

            // Storage
            log_path,
            write_header: false,

            // Hardware
            adc_i2c_address: 0x48,
        }
    }
}

impl LoggerConfig {
    /// Card-only deployment: the sensor feeds the ADC directly and nothing
    /// is relayed over radio.
    pub fn standalone() -> Self {
        Self {
            divider_factor: 1.0,
            telemetry_enabled: false,
            ..Self::default()
        }
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.sample_interval_ms))
    }

    pub fn telemetry_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.telemetry_interval_secs))
    }

    pub fn averaging_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.averaging_delay_ms))
    }

    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(100..=3_600_000).contains(&self.sample_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "sample_interval_ms must be 100..=3600000",
            ));
        }
        if self.telemetry_interval_secs == 0
            || u64::from(self.telemetry_interval_secs) * 1000 < u64::from(self.sample_interval_ms)
        {
            return Err(ConfigError::ValidationFailed(
                "telemetry_interval_secs must cover at least one sample interval",
            ));
        }
        if self.averaging_samples == 0 {
            return Err(ConfigError::ValidationFailed(
                "averaging_samples must be at least 1",
            ));
        }
        let window_ms = u64::from(self.averaging_samples) * u64::from(self.averaging_delay_ms);
        if window_ms >= u64::from(self.sample_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "averaging window must fit inside the sample interval",
            ));
        }
        if !self.divider_factor.is_finite() || self.divider_factor <= 0.0 || self.divider_factor > 10.0
        {
            return Err(ConfigError::ValidationFailed(
                "divider_factor must be in (0, 10]",
            ));
        }
        if !self.gain_up_threshold_v.is_finite()
            || !self.gain_down_threshold_v.is_finite()
            || self.gain_up_threshold_v < 0.0
        {
            return Err(ConfigError::ValidationFailed(
                "gain thresholds must be finite and non-negative",
            ));
        }
        if self.gain_up_threshold_v >= self.gain_down_threshold_v {
            return Err(ConfigError::ValidationFailed(
                "gain_up_threshold_v must be below gain_down_threshold_v",
            ));
        }
        if self.log_path.is_empty() {
            return Err(ConfigError::ValidationFailed("log_path must not be empty"));
        }
        if !(0x48..=0x4B).contains(&self.adc_i2c_address) {
            return Err(ConfigError::ValidationFailed(
                "adc_i2c_address must be 0x48..=0x4B",
            ));
        }
        Ok(())
    }
}
