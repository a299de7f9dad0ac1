// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single background writer for persisted files.
//!
//! Every mutation of the rotation or the ad templates produces a full snapshot
//! of the file it affects. Snapshots are handed to one writer task over an
//! unbounded channel, so callers (including the pull path) never wait on disk.
//! The task is the only thing that writes while it runs; when several
//! snapshots for the same file are queued, only the newest is written.

use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::files::write_atomic;

/// One full-file snapshot to write.
#[derive(Debug)]
pub struct WriteJob {
    pub path: PathBuf,
    pub contents: String,
}

/// Where file snapshots go.
#[derive(Debug, Clone)]
pub enum Persister {
    /// Write on the caller's thread. Used without a runtime and in tests.
    Inline,
    /// Hand off to the background writer task.
    Background(mpsc::UnboundedSender<WriteJob>),
}

impl Persister {
    pub fn inline() -> Self {
        Persister::Inline
    }

    /// Start the writer task on the current runtime.
    ///
    /// The task ends once every clone of the returned persister is dropped
    /// and the queue is drained.
    pub fn spawn() -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_writer(rx));
        (Persister::Background(tx), handle)
    }

    /// Persist a snapshot. Failures are logged, never returned.
    pub fn write(&self, path: PathBuf, contents: String) {
        let job = WriteJob { path, contents };
        let job = match self {
            Persister::Inline => job,
            Persister::Background(tx) => match tx.send(job) {
                Ok(()) => return,
                Err(mpsc::error::SendError(job)) => {
                    warn!("background writer has stopped; writing inline");
                    job
                }
            },
        };
        write_logged(&job);
    }
}

fn write_logged(job: &WriteJob) {
    match write_atomic(&job.path, &job.contents) {
        Ok(()) => debug!(path = %job.path.display(), bytes = job.contents.len(), "persisted"),
        Err(e) => warn!(path = %job.path.display(), error = %e, "persist failed"),
    }
}

async fn run_writer(mut rx: mpsc::UnboundedReceiver<WriteJob>) {
    while let Some(first) = rx.recv().await {
        let mut batch = vec![first];
        while let Ok(job) = rx.try_recv() {
            match batch.iter_mut().find(|queued| queued.path == job.path) {
                Some(queued) => *queued = job,
                None => batch.push(job),
            }
        }

        let result = tokio::task::spawn_blocking(move || batch.iter().for_each(write_logged)).await;
        if let Err(e) = result {
            warn!(error = %e, "writer batch panicked");
        }
    }
    debug!("background writer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_writes_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        Persister::inline().write(path.clone(), "hello".into());
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello");
    }

    #[tokio::test]
    async fn background_writer_keeps_newest_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rotation.jsonl");
        let (persister, handle) = Persister::spawn();
        for i in 0..20 {
            persister.write(path.clone(), format!("snapshot {i}"));
        }
        drop(persister);
        handle.await.unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "snapshot 19");
    }

    #[tokio::test]
    async fn write_failures_do_not_stop_the_writer() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let (persister, handle) = Persister::spawn();
        // Parent is a regular file, so this write fails.
        persister.write(blocker.join("child"), "x".into());
        let good = dir.path().join("ok.txt");
        persister.write(good.clone(), "ok".into());
        drop(persister);
        handle.await.unwrap();
        assert_eq!(std::fs::read_to_string(good).unwrap(), "ok");
    }
}
