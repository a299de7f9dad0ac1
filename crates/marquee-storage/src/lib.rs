// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File persistence for the Marquee sign engine.
//!
//! Holds the rotation repository and the ad template store. All file writes
//! after startup go through a single background writer task (see [`writer`]).

pub mod ads;
pub mod files;
pub mod repository;
pub mod writer;

pub use ads::AdStore;
pub use repository::Repository;
pub use writer::Persister;
