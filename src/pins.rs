//! GPIO / peripheral pin assignments for the fluorologger board.
//!
//! Single source of truth: `main` builds every driver from these numbers.

// ---------------------------------------------------------------------------
// Fluorometer gain select (one line per range, into the sensor's gain inputs)
// ---------------------------------------------------------------------------

pub const GAIN_1X_GPIO: i32 = 2;
pub const GAIN_10X_GPIO: i32 = 3;
pub const GAIN_100X_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// I²C bus (ADS1115 ADC @ 0x48, PCF8523 RTC @ 0x68)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 8;
pub const I2C_SCL_GPIO: i32 = 9;
pub const I2C_FREQ_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// SD card (SPI)
// ---------------------------------------------------------------------------

pub const SD_SCK_GPIO: i32 = 36;
pub const SD_MOSI_GPIO: i32 = 35;
pub const SD_MISO_GPIO: i32 = 37;
pub const SD_CS_GPIO: i32 = 10;
/// VFS mount point for the card's FAT volume.
pub const SD_MOUNT_POINT: &str = "/sd";

// ---------------------------------------------------------------------------
// Radio link (UART to the mesh node)
// ---------------------------------------------------------------------------

pub const RADIO_TX_GPIO: i32 = 17;
pub const RADIO_RX_GPIO: i32 = 18;
pub const RADIO_BAUD: u32 = 115_200;
