// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./marquee.toml` > `~/.config/marquee/marquee.toml` > `/etc/marquee/marquee.toml`
//! with environment variable overrides via `MARQUEE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MarqueeConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG: &str = "/etc/marquee/marquee.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG: &str = "marquee.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/marquee/marquee.toml` (system-wide)
/// 3. `~/.config/marquee/marquee.toml` (user XDG config)
/// 4. `./marquee.toml` (local directory)
/// 5. `MARQUEE_*` environment variables
pub fn load_config() -> Result<MarqueeConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<MarqueeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MarqueeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MarqueeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MarqueeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MarqueeConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("marquee").join(LOCAL_CONFIG))
                .unwrap_or_default(),
        ))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")`: key names contain
/// underscores, so `MARQUEE_SCHEDULER_ADVERTISE_EVERY` must map to
/// `scheduler.advertise_every`, not `scheduler.advertise.every`.
fn env_provider() -> Env {
    Env::prefixed("MARQUEE_").map(|key| map_env_key(key.as_str()).into())
}

/// Figment hands over the key as written in the environment, so it is
/// lowercased before matching sections.
fn map_env_key(key: &str) -> String {
    const SECTIONS: &[&str] = &[
        "sign", "scheduler", "keyboard", "storage", "gateway", "serial",
    ];
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections_once() {
        assert_eq!(
            map_env_key("scheduler_advertise_every"),
            "scheduler.advertise_every"
        );
        assert_eq!(map_env_key("serial_max_frame_bytes"), "serial.max_frame_bytes");
        assert_eq!(map_env_key("sign_log_level"), "sign.log_level");
        assert_eq!(map_env_key("unrelated"), "unrelated");
    }

    #[test]
    fn upper_case_env_keys_are_lowered() {
        assert_eq!(
            map_env_key("SCHEDULER_ADVERTISE_EVERY"),
            "scheduler.advertise_every"
        );
        assert_eq!(map_env_key("Gateway_Port"), "gateway.port");
    }
}
