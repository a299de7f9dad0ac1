// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Marquee sign engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Marquee configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MarqueeConfig {
    /// Sign identity and logging.
    #[serde(default)]
    pub sign: SignConfig,

    /// Rotation, ads, and chooser behavior.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Local keyboard entry timing.
    #[serde(default)]
    pub keyboard: KeyboardConfig,

    /// Where the rotation and ad templates are persisted.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP ingestion endpoint.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Serial link to the sign hardware.
    #[serde(default)]
    pub serial: SerialConfig,
}

/// Sign identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SignConfig {
    /// Name shown in logs and the health endpoint.
    #[serde(default = "default_sign_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for SignConfig {
    fn default() -> Self {
        Self {
            name: default_sign_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_sign_name() -> String {
    "marquee".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Inject ads after this many rotation steps.
    #[serde(default = "default_advertise_every")]
    pub advertise_every: u32,

    /// Messages containing this word (any case) ask the language model.
    #[serde(default = "default_trigger_word")]
    pub trigger_word: String,

    /// Characters of an entry shown while browsing in chooser mode.
    #[serde(default = "default_chooser_width")]
    pub chooser_width: usize,

    /// How many recently announced tracks are remembered to avoid repeats.
    #[serde(default = "default_recent_tracks")]
    pub recent_tracks: usize,

    /// Keep the current ad templates when a script yields no usable line.
    #[serde(default)]
    pub keep_ads_on_empty_script: bool,

    /// Give up showing the "thinking" animation after this long (ms). The
    /// reply request itself stays outstanding.
    #[serde(default = "default_thinking_timeout")]
    pub thinking_timeout_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            advertise_every: default_advertise_every(),
            trigger_word: default_trigger_word(),
            chooser_width: default_chooser_width(),
            recent_tracks: default_recent_tracks(),
            keep_ads_on_empty_script: false,
            thinking_timeout_ms: default_thinking_timeout(),
        }
    }
}

fn default_advertise_every() -> u32 {
    8
}

fn default_trigger_word() -> String {
    "ravegpt".to_string()
}

fn default_chooser_width() -> usize {
    7
}

fn default_recent_tracks() -> usize {
    4
}

fn default_thinking_timeout() -> u64 {
    20_000
}

/// Keyboard entry configuration. All durations are milliseconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeyboardConfig {
    /// Inactivity after which in-progress input is abandoned.
    #[serde(default = "default_keyboard_timeout")]
    pub timeout_ms: u64,

    /// The echo switches to warning mode this long before the timeout.
    #[serde(default = "default_keyboard_warning")]
    pub warning_ms: u64,

    /// Submitting sooner than this after the first key is ignored.
    #[serde(default = "default_min_entry")]
    pub min_entry_ms: u64,

    /// Read keystrokes from standard input while serving. Put the terminal
    /// in raw mode (`stty raw -echo`) for per-key echo on the sign.
    #[serde(default)]
    pub stdin: bool,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_keyboard_timeout(),
            warning_ms: default_keyboard_warning(),
            min_entry_ms: default_min_entry(),
            stdin: false,
        }
    }
}

fn default_keyboard_timeout() -> u64 {
    30_000
}

fn default_keyboard_warning() -> u64 {
    7_000
}

fn default_min_entry() -> u64 {
    5_000
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding the rotation and ads files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Rotation file name, one JSON record per line.
    #[serde(default = "default_rotation_file")]
    pub rotation_file: String,

    /// Ad template file name, one JSON array.
    #[serde(default = "default_ads_file")]
    pub ads_file: String,
}

impl StorageConfig {
    pub fn rotation_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.rotation_file)
    }

    pub fn ads_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.ads_file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            rotation_file: default_rotation_file(),
            ads_file: default_ads_file(),
        }
    }
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|d| d.join("marquee").display().to_string())
        .unwrap_or_else(|| ".".to_string())
}

fn default_rotation_file() -> String {
    "signstrings.jsonl".to_string()
}

fn default_ads_file() -> String {
    "ads.json".to_string()
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Whether the HTTP endpoint is started.
    #[serde(default = "default_gateway_enabled")]
    pub enabled: bool,

    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: default_gateway_enabled(),
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_enabled() -> bool {
    true
}

fn default_gateway_host() -> String {
    "0.0.0.0".to_string()
}

fn default_gateway_port() -> u16 {
    8080
}

/// Serial link configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SerialConfig {
    /// Path of the sign's serial device. Without one, pulls are simulated.
    #[serde(default)]
    pub device: Option<String>,

    /// Line speed of the device (8N1).
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Frames above this size are logged as likely to be truncated by the sign.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    /// Size of the buffer used to read pull signals.
    #[serde(default = "default_read_buffer_bytes")]
    pub read_buffer_bytes: usize,

    /// Pull cadence when no device is configured.
    #[serde(default = "default_simulate_interval")]
    pub simulate_interval_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: None,
            baud_rate: default_baud_rate(),
            max_frame_bytes: default_max_frame_bytes(),
            read_buffer_bytes: default_read_buffer_bytes(),
            simulate_interval_ms: default_simulate_interval(),
        }
    }
}

fn default_baud_rate() -> u32 {
    9_600
}

fn default_max_frame_bytes() -> usize {
    700
}

fn default_read_buffer_bytes() -> usize {
    512
}

fn default_simulate_interval() -> u64 {
    2_000
}
