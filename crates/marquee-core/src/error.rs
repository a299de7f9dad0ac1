// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Marquee sign engine.

use thiserror::Error;

/// The primary error type used across Marquee crates.
#[derive(Debug, Error)]
pub enum MarqueeError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Persistence errors (rotation or ads file I/O, writer shut down).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A wire or persisted record could not be encoded or decoded.
    #[error("codec error: {message}")]
    Codec { message: String },

    /// Transport errors (serial device, HTTP listener).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Reply generation failed upstream.
    #[error("provider error: {message}")]
    Provider { message: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MarqueeError {
    /// Shorthand for a codec error with a formatted message.
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for MarqueeError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage {
            source: Box::new(e),
        }
    }
}
