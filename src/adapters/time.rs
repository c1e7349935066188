//! Monotonic timer adapter.
//!
//! - **`feature = "espidf"`**: `esp_timer_get_time()` for the clock;
//!   waits arm a timer wake-up and enter light sleep.  The high-resolution
//!   timer keeps counting through light sleep.
//! - **`not(feature = "espidf")`**: `std::time::Instant` and a thread
//!   sleep, for host-side simulation.

use core::time::Duration;

use crate::app::ports::TimerPort;

/// Timer adapter for the logger board.
pub struct SystemTimer {
    #[cfg(not(feature = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemTimer {
    pub fn new() -> Self {
        Self {
            #[cfg(not(feature = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "espidf")]
impl TimerPort for SystemTimer {
    fn now(&self) -> Duration {
        let us = unsafe { esp_idf_sys::esp_timer_get_time() };
        Duration::from_micros(us.max(0) as u64)
    }

    fn sleep_until(&mut self, deadline: Duration) {
        let remaining = deadline.saturating_sub(self.now());
        if remaining.is_zero() {
            return;
        }
        // SAFETY: plain ESP-IDF calls with no pointer arguments.
        light_sleep_or_delay(
            remaining,
            |us| unsafe { esp_idf_sys::esp_sleep_enable_timer_wakeup(us) },
            || unsafe { esp_idf_sys::esp_light_sleep_start() },
            |d| esp_idf_hal::delay::FreeRtos::delay_ms(u32::try_from(d.as_millis()).unwrap_or(u32::MAX)),
        );
    }
}

/// `esp_err_t` success code.
#[cfg_attr(not(feature = "espidf"), allow(dead_code))]
const ESP_OK: i32 = 0;

/// Light-sleep through `remaining`, or task-delay through it when the
/// wake-up timer cannot be armed or the chip refuses to sleep.  Returns
/// whether light sleep was used.
#[cfg_attr(not(feature = "espidf"), allow(dead_code))]
fn light_sleep_or_delay(
    remaining: Duration,
    arm_wakeup: impl FnOnce(u64) -> i32,
    light_sleep: impl FnOnce() -> i32,
    delay: impl FnOnce(Duration),
) -> bool {
    let us = u64::try_from(remaining.as_micros()).unwrap_or(u64::MAX);
    let err = arm_wakeup(us);
    if err != ESP_OK {
        log::warn!("Timer wake-up arm failed ({}), falling back to a task delay", err);
        delay(remaining);
        return false;
    }
    let err = light_sleep();
    if err != ESP_OK {
        log::warn!("Light sleep rejected ({}), falling back to a task delay", err);
        delay(remaining);
        return false;
    }
    true
}

#[cfg(not(feature = "espidf"))]
impl TimerPort for SystemTimer {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep_until(&mut self, deadline: Duration) {
        let remaining = deadline.saturating_sub(self.now());
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }
}
