//! ESP32-S3 firmware-specific modules for till-rs
//!
//! This crate contains hardware-specific code that cannot compile on desktop
//! targets: GPIO button sampling, ESP32 peripheral initialization, the
//! esp-radio Wi-Fi port, and the HTTP remote-store port over embassy-net.

#![no_std]

pub mod buttons;
pub mod remote;
pub mod wifi;

use till_core::Uptime;

/// Monotonic uptime from the embassy time driver.
pub struct EmbassyClock;

impl Uptime for EmbassyClock {
    fn uptime_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }
}
