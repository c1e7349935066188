//! Fluorologger firmware entry point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  HardwareAdapter        CsvLogStore     RadioLink            │
//! │  (Sensor+Gain+Clock)    (LogStore)      (Transport)          │
//! │  SystemTimer            LogEventSink    JsonConfigFile       │
//! │  (Timer)                (EventSink)     (Config)             │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │          LoggerService (pure logic)                │      │
//! │  │  Sampler · GainController · Scheduler              │      │
//! │  └────────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use core::cell::RefCell;

use anyhow::Result;
use embedded_hal_bus::i2c::RefCellDevice;
use esp_idf_svc::fs::fatfs::Fatfs;
use esp_idf_svc::hal::delay::Delay;
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver};
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::sd::spi::SdSpiHostDriver;
use esp_idf_svc::hal::sd::{SdCardConfiguration, SdCardDriver};
use esp_idf_svc::hal::spi::{Dma, SpiDriver, SpiDriverConfig, SPI2};
use esp_idf_svc::hal::uart::{self, UartDriver};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::io::vfs::MountedFatfs;
use log::{info, warn};

use fluorologger::adapters::config_file::{JsonConfigFile, DEFAULT_CONFIG_PATH};
use fluorologger::adapters::csv_store::CsvLogStore;
use fluorologger::adapters::hardware::HardwareAdapter;
use fluorologger::adapters::log_sink::LogEventSink;
use fluorologger::adapters::radio::{RadioLink, UartWriter};
use fluorologger::adapters::time::SystemTimer;
use fluorologger::app::ports::{ConfigError, ConfigPort, TimerPort};
use fluorologger::app::service::LoggerService;
use fluorologger::config::LoggerConfig;
use fluorologger::drivers::ads1115::Ads1115;
use fluorologger::drivers::gain_lines::GainLines;
use fluorologger::drivers::pcf8523::Pcf8523;
use fluorologger::drivers::watchdog::{self, Watchdog};
use fluorologger::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Fluorologger v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;

    // ── 2. Log volume ─────────────────────────────────────────
    // Without a card every append fails with NotMounted; the loop still
    // runs so telemetry and the console keep working.
    let _sd = match mount_sd(peripherals.spi2) {
        Ok(mounted) => {
            info!("SD card mounted at {}", pins::SD_MOUNT_POINT);
            Some(mounted)
        }
        Err(e) => {
            warn!("SD card mount failed ({}), logging to console only", e);
            None
        }
    };

    // ── 3. Config from the card (or defaults) ─────────────────
    let config = load_config(&JsonConfigFile::new(DEFAULT_CONFIG_PATH));

    // ── 4. Construct adapters ─────────────────────────────────
    // SAFETY: each GPIO number is used by exactly one driver (see `pins`).
    let (sda, scl) = unsafe {
        (
            AnyIOPin::new(pins::I2C_SDA_GPIO),
            AnyIOPin::new(pins::I2C_SCL_GPIO),
        )
    };
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        sda,
        scl,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    )?;
    let i2c_bus = RefCell::new(i2c);

    let gain_pins = unsafe {
        [
            PinDriver::output(AnyOutputPin::new(pins::GAIN_1X_GPIO))?,
            PinDriver::output(AnyOutputPin::new(pins::GAIN_10X_GPIO))?,
            PinDriver::output(AnyOutputPin::new(pins::GAIN_100X_GPIO))?,
        ]
    };

    let mut hw = HardwareAdapter::new(
        Ads1115::new(RefCellDevice::new(&i2c_bus), config.adc_i2c_address),
        Pcf8523::new(RefCellDevice::new(&i2c_bus)),
        GainLines::new(gain_pins, config.gain_lines_active_high),
        Delay::new_default(),
    );

    let (tx, rx) = unsafe {
        (
            AnyIOPin::new(pins::RADIO_TX_GPIO),
            AnyIOPin::new(pins::RADIO_RX_GPIO),
        )
    };
    let uart = UartDriver::new(
        peripherals.uart1,
        tx,
        rx,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart::config::Config::default().baudrate(Hertz(pins::RADIO_BAUD)),
    )?;
    let mut radio = RadioLink::new(UartWriter::new(uart), config.telemetry_framing);

    let mut store = CsvLogStore::from_config(&config);
    let mut sink = LogEventSink::new();
    let mut timer = SystemTimer::new();
    let watchdog = Watchdog::new(watchdog::timeout_for(config.sample_interval()));

    // ── 5. Start the loop ─────────────────────────────────────
    let mut service = LoggerService::new(&config, timer.now());
    service.start(&mut hw, &mut sink);

    info!("Entering logging loop");
    loop {
        service.run_cycle(&mut hw, &mut store, &mut radio, &mut timer, &mut sink);
        watchdog.feed();
    }
}

/// Mount the card's FAT volume at [`pins::SD_MOUNT_POINT`].
///
/// The returned handle keeps the volume mounted while it lives.
fn mount_sd(spi2: SPI2) -> Result<impl Sized> {
    // SAFETY: these pins are dedicated to the card (see `pins`).
    let (sck, mosi, miso, cs) = unsafe {
        (
            AnyIOPin::new(pins::SD_SCK_GPIO),
            AnyIOPin::new(pins::SD_MOSI_GPIO),
            AnyIOPin::new(pins::SD_MISO_GPIO),
            AnyIOPin::new(pins::SD_CS_GPIO),
        )
    };
    let spi = SpiDriver::new(
        spi2,
        sck,
        mosi,
        Some(miso),
        &SpiDriverConfig::default().dma(Dma::Auto(4096)),
    )?;
    let host = SdSpiHostDriver::new(
        spi,
        Some(cs),
        AnyIOPin::none(),
        AnyIOPin::none(),
        AnyIOPin::none(),
        None,
    )?;
    let card = SdCardDriver::new_spi(host, &SdCardConfiguration::new())?;
    let mounted = MountedFatfs::mount(Fatfs::new_sdcard(0, card)?, pins::SD_MOUNT_POINT, 4)?;
    Ok(mounted)
}

/// Card config, or defaults.  A missing file is created from the defaults
/// so the card documents the parameters in force.
fn load_config(file: &impl ConfigPort) -> LoggerConfig {
    match file.load() {
        Ok(cfg) => cfg,
        Err(ConfigError::NotFound) => {
            info!("No config on card, writing defaults");
            let cfg = LoggerConfig::default();
            if let Err(e) = file.save(&cfg) {
                warn!("Could not write default config: {}", e);
            }
            cfg
        }
        Err(e) => {
            warn!("Config load failed ({}), using defaults", e);
            LoggerConfig::default()
        }
    }
}
