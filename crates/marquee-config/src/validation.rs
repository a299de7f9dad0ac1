// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as cadence bounds, timing relationships, and a usable bind host.

use crate::diagnostic::ConfigError;
use crate::model::MarqueeConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns all collected validation errors; does not fail fast.
pub fn validate_config(config: &MarqueeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let scheduler = &config.scheduler;
    if scheduler.advertise_every < 1 {
        fail("scheduler.advertise_every must be at least 1".to_string());
    }
    if scheduler.trigger_word.trim().is_empty() {
        fail("scheduler.trigger_word must not be empty".to_string());
    }
    if scheduler.chooser_width < 1 {
        fail("scheduler.chooser_width must be at least 1".to_string());
    }
    if scheduler.recent_tracks < 1 {
        fail("scheduler.recent_tracks must be at least 1".to_string());
    }
    if scheduler.thinking_timeout_ms < 1 {
        fail("scheduler.thinking_timeout_ms must be positive".to_string());
    }

    let keyboard = &config.keyboard;
    if keyboard.warning_ms >= keyboard.timeout_ms {
        fail(format!(
            "keyboard.warning_ms ({}) must be less than keyboard.timeout_ms ({})",
            keyboard.warning_ms, keyboard.timeout_ms
        ));
    }

    let storage = &config.storage;
    if storage.rotation_file.trim().is_empty() {
        fail("storage.rotation_file must not be empty".to_string());
    }
    if storage.ads_file.trim().is_empty() {
        fail("storage.ads_file must not be empty".to_string());
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    let serial = &config.serial;
    if serial.max_frame_bytes < 64 {
        fail(format!(
            "serial.max_frame_bytes must be at least 64, got {}",
            serial.max_frame_bytes
        ));
    }
    if serial.baud_rate == 0 {
        fail("serial.baud_rate must be positive".to_string());
    }
    if serial.read_buffer_bytes < 1 {
        fail("serial.read_buffer_bytes must be at least 1".to_string());
    }
    if serial.simulate_interval_ms < 10 {
        fail(format!(
            "serial.simulate_interval_ms must be at least 10, got {}",
            serial.simulate_interval_ms
        ));
    }
    if let Some(device) = &serial.device
        && device.trim().is_empty()
    {
        fail("serial.device must not be empty when set".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
