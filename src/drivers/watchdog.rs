//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the logger if the main loop stops cycling.  The timeout follows
//! the sample interval (a cycle must finish well inside it) with a 10 s
//! floor; the loop feeds once per cycle.

use core::time::Duration;

#[cfg(feature = "espidf")]
use esp_idf_sys::*;

use log::info;

/// Shortest timeout ever configured.
pub const MIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for a loop that wakes every `sample_interval`: three missed
/// cycles, never below [`MIN_TIMEOUT`].
pub fn timeout_for(sample_interval: Duration) -> Duration {
    (sample_interval * 3).max(MIN_TIMEOUT)
}

pub struct Watchdog {
    timeout: Duration,
    #[cfg(feature = "espidf")]
    subscribed: bool,
}

impl Watchdog {
    /// Configure the TWDT and subscribe the current task.
    pub fn new(timeout: Duration) -> Self {
        #[cfg(feature = "espidf")]
        {
            let timeout_ms = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!(
                        "TWDT reconfigure returned {} (may already be configured)",
                        ret
                    );
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK;
                if subscribed {
                    info!("Watchdog: subscribed ({:?} timeout, panic on trigger)", timeout);
                } else {
                    log::warn!("Watchdog: failed to subscribe ({})", ret);
                }

                Self {
                    timeout,
                    subscribed,
                }
            }
        }

        #[cfg(not(feature = "espidf"))]
        {
            info!("Watchdog(sim): no-op, {:?} timeout", timeout);
            Self { timeout }
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Feed the watchdog.  Must be called at least once per timeout.
    pub fn feed(&self) {
        #[cfg(feature = "espidf")]
        {
            if self.subscribed {
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }
}
