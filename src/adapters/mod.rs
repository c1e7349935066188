//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements          | Connects to                 |
//! |----------------|---------------------|-----------------------------|
//! | `hardware`     | SensorPort          | ADS1115 over I2C            |
//! |                | ClockPort           | PCF8523 over I2C            |
//! |                | GainPort            | Gain-select GPIOs           |
//! | `csv_store`    | LogStorePort        | CSV file on the SD card     |
//! | `radio`        | TransportPort       | UART to the mesh radio      |
//! | `time`         | TimerPort           | ESP32 timer + light sleep   |
//! | `log_sink`     | EventSink           | Serial log output           |
//! | `config_file`  | ConfigPort          | JSON file on the SD card    |

pub mod config_file;
pub mod csv_store;
pub mod hardware;
pub mod log_sink;
pub mod radio;
pub mod time;
