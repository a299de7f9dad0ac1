// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted ad templates.

use std::path::PathBuf;

use marquee_core::Message;
use tracing::warn;

use crate::files;
use crate::writer::Persister;

/// Location and writer for the ad template file.
#[derive(Debug, Clone)]
pub struct AdStore {
    path: Option<PathBuf>,
    persister: Persister,
}

impl AdStore {
    pub fn new(path: PathBuf, persister: Persister) -> Self {
        Self {
            path: Some(path),
            persister,
        }
    }

    /// A store that keeps nothing on disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            persister: Persister::inline(),
        }
    }

    /// The stored templates, or the defaults when there is no usable file.
    pub fn load(&self) -> Vec<Message> {
        match &self.path {
            Some(path) => files::read_ads(path),
            None => files::default_ads(),
        }
    }

    /// Replace the stored templates wholesale.
    pub fn save(&self, ads: &[Message]) {
        let Some(path) = &self.path else {
            return;
        };
        match files::encode_ads(ads) {
            Ok(text) => self.persister.write(path.clone(), text),
            Err(e) => warn!(error = %e, "could not encode ad templates"),
        }
    }
}
