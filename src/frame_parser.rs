//! Component E — FrameParserAdapter.
//!
//! The real wire decoder (IEEE C37.118, IEEE 1344, BPA PDCstream, ...) is
//! out of scope here; this module defines the opaque event boundary the
//! mapper consumes, plus `ChannelFrameParser`, a parser that is driven by
//! feeding it `ParserEvent`s directly — the seam a production decoder
//! would sit behind, and what the test suite drives.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::model::{ConfigurationFrame, DataFrame, DeviceCommand};

#[derive(Debug, Clone)]
pub enum ParserEvent {
    ConnectionAttempt,
    ConnectionEstablished,
    ConnectionException(String),
    ConnectionTerminated,
    ReceivedConfigurationFrame(ConfigurationFrame),
    ReceivedDataFrame(DataFrame),
    ReceivedHeaderFrame,
    ReceivedFrameBufferImage(usize),
    ParsingException(String),
    ExceededParsingExceptionThreshold,
    ConfigurationChanged,
}

/// Whether the underlying protocol/transport supports sending commands
/// back to the device (some file-playback and read-only sources do not).
#[async_trait]
pub trait FrameParser: Send {
    async fn next_event(&mut self) -> Option<ParserEvent>;
    async fn start(&mut self);
    async fn stop(&mut self);
    async fn send_command(&mut self, command: DeviceCommand);
    /// Feeds a configuration frame into the parser bypassing the wire,
    /// used for cached-configuration and `loadConfiguration(path)`.
    async fn inject_configuration(&mut self, frame: ConfigurationFrame);
    fn supports_commands(&self) -> bool;
}

/// Call counters a test can inspect without needing a `&mut` reference into
/// the `FrameParser` trait object the mapper owns.
#[derive(Default)]
pub struct ParserCallCounts {
    pub starts: AtomicU32,
    pub stops: AtomicU32,
}

/// A `FrameParser` fed externally over a channel. Plays the role of the
/// "opaque wire decoder" in tests and in the standalone binary, where a
/// real C37.118 codec would otherwise sit.
pub struct ChannelFrameParser {
    events: mpsc::Receiver<ParserEvent>,
    supports_commands: bool,
    stats: Arc<ParserCallCounts>,
}

impl ChannelFrameParser {
    pub fn new(supports_commands: bool) -> (Self, mpsc::Sender<ParserEvent>) {
        let (parser, tx, _stats) = Self::with_call_counts(supports_commands);
        (parser, tx)
    }

    /// Same as `new`, but also returns a handle for observing how many
    /// times `start`/`stop` were invoked — useful for asserting on
    /// liveness-driven connect-cycle restarts in tests.
    pub fn with_call_counts(supports_commands: bool) -> (Self, mpsc::Sender<ParserEvent>, Arc<ParserCallCounts>) {
        let (tx, rx) = mpsc::channel(256);
        let stats = Arc::new(ParserCallCounts::default());
        (
            Self {
                events: rx,
                supports_commands,
                stats: stats.clone(),
            },
            tx,
            stats,
        )
    }
}

#[async_trait]
impl FrameParser for ChannelFrameParser {
    async fn next_event(&mut self) -> Option<ParserEvent> {
        self.events.recv().await
    }

    async fn start(&mut self) {
        self.stats.starts.fetch_add(1, Ordering::Relaxed);
    }

    async fn stop(&mut self) {
        self.stats.stops.fetch_add(1, Ordering::Relaxed);
        self.events.close();
    }

    async fn send_command(&mut self, _command: DeviceCommand) {}

    async fn inject_configuration(&mut self, _frame: ConfigurationFrame) {}

    fn supports_commands(&self) -> bool {
        self.supports_commands
    }
}
