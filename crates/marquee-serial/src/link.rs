// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The pull loop: every read from the sign is a request for the next frame.
//!
//! The sign sends a few bytes whenever it has finished showing a message.
//! The content is irrelevant; any successful read counts as one pull.

use std::io::{ErrorKind, Read, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use marquee_config::model::SerialConfig;
use marquee_core::{FrameSink, MarqueeError};
use marquee_engine::MarqueeEngine;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::frame::encode_frame;

/// Pause after a failed read before trying again.
const READ_ERROR_BACKOFF: Duration = Duration::from_millis(250);

/// Writes frames to any byte stream.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> FrameSink for WriterSink<W> {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), MarqueeError> {
        self.writer
            .write_all(frame)
            .and_then(|()| self.writer.flush())
            .map_err(|e| MarqueeError::Transport {
                message: "failed to write frame".into(),
                source: Some(Box::new(e)),
            })
    }
}

/// Logs frames instead of sending them, for running without a sign.
#[derive(Debug, Default)]
pub struct LogSink;

impl FrameSink for LogSink {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), MarqueeError> {
        info!(frame = %String::from_utf8_lossy(frame), "simulated frame");
        Ok(())
    }
}

/// Answer one pull: take the next message and write it. Write failures are
/// logged and not retried.
pub fn serve_pull(engine: &MarqueeEngine, sink: &mut dyn FrameSink, max_frame_bytes: usize) {
    let message = engine.next_message();
    let frame = encode_frame(&message, max_frame_bytes);
    match sink.write_frame(&frame) {
        Ok(()) => debug!(bytes = frame.len(), kind = %message.type_code(), "frame written"),
        Err(e) => warn!(error = %e, "unable to write frame to sign"),
    }
}

/// Serve pulls read from `signals` until EOF or cancellation.
///
/// Returns the number of pulls served.
pub fn run_link<R: Read>(
    engine: &MarqueeEngine,
    mut signals: R,
    sink: &mut dyn FrameSink,
    config: &SerialConfig,
    cancel: &CancellationToken,
) -> u64 {
    let mut buffer = vec![0u8; config.read_buffer_bytes.max(1)];
    let mut pulls = 0;
    while !cancel.is_cancelled() {
        match signals.read(&mut buffer) {
            Ok(0) => {
                info!(pulls, "sign link closed");
                break;
            }
            Ok(n) => {
                debug!(bytes = n, "pull signal");
                serve_pull(engine, sink, config.max_frame_bytes);
                pulls += 1;
            }
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::Interrupted) => {}
            Err(e) => {
                warn!(error = %e, "unable to read from sign");
                thread::sleep(READ_ERROR_BACKOFF);
            }
        }
    }
    pulls
}

/// Open the configured device as a (signals, sink) pair.
#[cfg(feature = "hardware")]
pub fn open_device(
    config: &SerialConfig,
) -> Result<(Box<dyn Read + Send>, WriterSink<Box<dyn Write + Send>>), MarqueeError> {
    let path = config
        .device
        .as_deref()
        .ok_or_else(|| MarqueeError::Config("serial.device is not set".into()))?;
    let port = serialport::new(path, config.baud_rate)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .timeout(Duration::from_millis(500))
        .open()
        .map_err(|e| MarqueeError::Transport {
            message: format!("failed to open serial device {path}"),
            source: Some(Box::new(e)),
        })?;
    let writer = port.try_clone().map_err(|e| MarqueeError::Transport {
        message: format!("failed to clone serial handle for {path}"),
        source: Some(Box::new(e)),
    })?;
    info!(device = path, baud = config.baud_rate, "serial device opened");
    Ok((Box::new(port), WriterSink::new(Box::new(writer))))
}

/// Open the configured device as a (signals, sink) pair. Without the
/// `hardware` feature the device is opened as a plain file, so line settings
/// must be applied beforehand (e.g. with `stty`).
#[cfg(not(feature = "hardware"))]
pub fn open_device(
    config: &SerialConfig,
) -> Result<(Box<dyn Read + Send>, WriterSink<Box<dyn Write + Send>>), MarqueeError> {
    let path = config
        .device
        .as_deref()
        .ok_or_else(|| MarqueeError::Config("serial.device is not set".into()))?;
    let file = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)?;
    let writer = file.try_clone()?;
    info!(device = path, "serial device opened as file");
    Ok((Box::new(file), WriterSink::new(Box::new(writer))))
}

/// Run the pull loop for the configured device on its own thread.
///
/// The thread is detached from the async runtime so a blocking read never
/// holds up shutdown.
pub fn spawn_link(
    engine: Arc<MarqueeEngine>,
    config: SerialConfig,
    cancel: CancellationToken,
) -> Result<thread::JoinHandle<u64>, MarqueeError> {
    let (signals, mut sink) = open_device(&config)?;
    thread::Builder::new()
        .name("sign-link".into())
        .spawn(move || run_link(&engine, signals, &mut sink, &config, &cancel))
        .map_err(MarqueeError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_config::MarqueeConfig;
    use marquee_engine::ExternalReplyRequester;
    use std::io::Cursor;

    fn engine() -> MarqueeEngine {
        MarqueeEngine::in_memory(&MarqueeConfig::default(), Arc::new(ExternalReplyRequester))
    }

    /// Yields one chunk per read, then EOF.
    struct Chunks(Vec<Vec<u8>>);

    impl Read for Chunks {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.0.is_empty() {
                return Ok(0);
            }
            let chunk = self.0.remove(0);
            if chunk.is_empty() {
                return Err(std::io::Error::new(ErrorKind::TimedOut, "no data"));
            }
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            Ok(n)
        }
    }

    #[test]
    fn each_read_is_one_pull() {
        let engine = engine();
        engine.submit("HELLO");
        let mut sink = WriterSink::new(Vec::new());
        let signals = Chunks(vec![b"r".to_vec(), vec![], b"ready".to_vec()]);
        let pulls = run_link(
            &engine,
            signals,
            &mut sink,
            &SerialConfig::default(),
            &CancellationToken::new(),
        );
        assert_eq!(pulls, 2);
        let written = String::from_utf8(sink.into_inner()).unwrap();
        assert!(written.starts_with(r#"{"str":"NEW"#));
        assert!(written.ends_with(r#"{"str":"HELLO","type":"D"}"#));
    }

    #[test]
    fn eof_ends_immediately() {
        let mut sink = WriterSink::new(Vec::new());
        let pulls = run_link(
            &engine(),
            Cursor::new(Vec::new()),
            &mut sink,
            &SerialConfig::default(),
            &CancellationToken::new(),
        );
        assert_eq!(pulls, 0);
    }

    #[test]
    fn cancelled_link_serves_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut sink = LogSink;
        let pulls = run_link(
            &engine(),
            Cursor::new(b"xyz".to_vec()),
            &mut sink,
            &SerialConfig::default(),
            &cancel,
        );
        assert_eq!(pulls, 0);
    }

    #[test]
    fn missing_device_is_config_error() {
        let err = open_device(&SerialConfig::default()).err().unwrap();
        assert!(matches!(err, MarqueeError::Config(_)));
    }
}
