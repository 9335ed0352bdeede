//! Core data model: spec §3, unchanged in meaning.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ticks::Ticks;

/// Semantic role of a sample. The first five are scalar per device;
/// `Analog`/`Digital` are positional arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    Status,
    Angle,
    Magnitude,
    Frequency,
    DfDt,
    Analog,
    Digital,
    Quality,
    Calculation,
    Statistic,
}

impl SignalKind {
    /// One-or-two-letter tag used inside a `SignalReference` string.
    pub fn code(self) -> &'static str {
        match self {
            SignalKind::Status => "SF",
            SignalKind::Angle => "PA",
            SignalKind::Magnitude => "PM",
            SignalKind::Frequency => "FQ",
            SignalKind::DfDt => "DF",
            SignalKind::Analog => "AV",
            SignalKind::Digital => "DV",
            SignalKind::Quality => "QF",
            SignalKind::Calculation => "CV",
            SignalKind::Statistic => "ST",
        }
    }

    /// Scalar kinds carry one value per device; indexed kinds carry one
    /// value per array position (one per phasor, analog channel, or
    /// digital word).
    pub fn is_indexed(self) -> bool {
        matches!(
            self,
            SignalKind::Angle | SignalKind::Magnitude | SignalKind::Analog | SignalKind::Digital
        )
    }
}

/// Platform-wide string identifier for one scalar signal: deterministic,
/// cacheable, of the form `<adapterName>!IS-<kindCode>` (scalar) or
/// `<adapterName>!IS-<kindCode><ordinal>` (indexed, 1-based).
pub fn encode_signal_reference(adapter_name: &str, kind: SignalKind) -> String {
    format!("{adapter_name}!IS-{}", kind.code())
}

pub fn encode_indexed_signal_reference(adapter_name: &str, kind: SignalKind, ordinal: usize) -> String {
    format!("{adapter_name}!IS-{}{ordinal}", kind.code())
}

/// The configured expectation for one device.
///
/// Counters use interior mutability (`AtomicU64`/`AtomicI64`) rather than
/// `&mut` access: the table's *structure* (which devices exist) is
/// immutable during streaming, but its per-device counters are mutated by
/// the parser event thread on every frame and occasionally read by an
/// unrelated status-reporting caller (spec §5 "per-device counters ...
/// readers may observe torn values — this is acceptable"). Atomics with
/// `Relaxed` ordering are the safe Rust equivalent of that tolerance.
#[derive(Debug)]
pub struct DeviceRecord {
    pub id_code: u16,
    pub label: String,
    pub station_name: String,
    pub external_tag: u32,
    total_frames: std::sync::atomic::AtomicU64,
    data_quality_errors: std::sync::atomic::AtomicU64,
    time_quality_errors: std::sync::atomic::AtomicU64,
    device_errors: std::sync::atomic::AtomicU64,
    last_report_time: std::sync::atomic::AtomicI64,
}

impl DeviceRecord {
    pub fn new(id_code: u16, label: String, station_name: String, external_tag: u32) -> Self {
        Self {
            id_code,
            label,
            station_name,
            external_tag,
            total_frames: Default::default(),
            data_quality_errors: Default::default(),
            time_quality_errors: Default::default(),
            device_errors: Default::default(),
            last_report_time: Default::default(),
        }
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames.load(std::sync::atomic::Ordering::Relaxed)
    }

    pub fn data_quality_errors(&self) -> u64 {
        self.data_quality_errors.load(std::sync::atomic::Ordering::Relaxed)
    }

    pub fn time_quality_errors(&self) -> u64 {
        self.time_quality_errors.load(std::sync::atomic::Ordering::Relaxed)
    }

    pub fn device_errors(&self) -> u64 {
        self.device_errors.load(std::sync::atomic::Ordering::Relaxed)
    }

    pub fn last_report_time(&self) -> Ticks {
        self.last_report_time.load(std::sync::atomic::Ordering::Relaxed)
    }

    /// Records one frame's worth of observation for this device:
    /// increments `totalFrames`, advances `lastReportTime` if newer, and
    /// conditionally bumps the quality-error counters (spec §4.G step 4.b).
    pub fn record_frame(&self, timestamp: Ticks, quality: CellQuality) {
        use std::sync::atomic::Ordering::Relaxed;
        self.total_frames.fetch_add(1, Relaxed);
        if timestamp > self.last_report_time.load(Relaxed) {
            self.last_report_time.store(timestamp, Relaxed);
        }
        if quality.data_quality_error {
            self.data_quality_errors.fetch_add(1, Relaxed);
        }
        if quality.time_quality_error {
            self.time_quality_errors.fetch_add(1, Relaxed);
        }
        if quality.device_error {
            self.device_errors.fetch_add(1, Relaxed);
        }
    }

    pub fn reset_statistics(&self) {
        use std::sync::atomic::Ordering::Relaxed;
        self.total_frames.store(0, Relaxed);
        self.data_quality_errors.store(0, Relaxed);
        self.time_quality_errors.store(0, Relaxed);
        self.device_errors.store(0, Relaxed);
    }
}

/// A historian point key, distinct from the UUID `signalID`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeasurementKey {
    pub source: String,
    pub id: u64,
}

/// Immutable once loaded. Indexed by `signal_reference`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementDescriptor {
    pub signal_id: Uuid,
    pub key: MeasurementKey,
    pub signal_reference: String,
    pub adder: f64,
    pub multiplier: f64,
}

/// Produced by the frame parser; `id`/`key`/`adder`/`multiplier` are
/// filled in once `mapAttributes` resolves the descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedMeasurement {
    pub value: f64,
    pub timestamp: Ticks,
    pub quality_bits: u32,
}

/// `ParsedMeasurement` enriched with `MeasurementDescriptor` identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappedMeasurement {
    pub signal_id: Uuid,
    pub key: MeasurementKey,
    pub value: f64,
    pub timestamp: Ticks,
    pub quality_bits: u32,
    pub adder: f64,
    pub multiplier: f64,
}

/// Quality flags carried on a parsed device cell, used to bump per-device
/// error counters (spec §4.G step 4.b).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CellQuality {
    pub data_quality_error: bool,
    pub time_quality_error: bool,
    pub device_error: bool,
}

impl CellQuality {
    /// Packs the three flags into the low bits of a `quality_bits` word so
    /// every measurement drawn from this cell carries its provenance.
    pub fn to_bits(self) -> u32 {
        (self.data_quality_error as u32)
            | (self.time_quality_error as u32) << 1
            | (self.device_error as u32) << 2
    }
}

/// A single indexed analog or digital value: the positional index plus
/// its (already extracted) measurement components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedValue {
    pub measurements: Vec<f64>,
}

/// One device's worth of sample within a data frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataCell {
    pub id_code: u16,
    pub station_name: String,
    pub status: f64,
    /// `(angle, magnitude)` pairs, one per phasor.
    pub phasors: Vec<(f64, f64)>,
    pub frequency: f64,
    pub df_dt: f64,
    pub analog_values: Vec<IndexedValue>,
    pub digital_values: Vec<IndexedValue>,
    pub quality: CellQuality,
}

/// One measurement sample for one or more devices at a common timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataFrame {
    pub timestamp: Ticks,
    pub received_timestamp: Ticks,
    pub cells: Vec<DataCell>,
}

/// Metadata frame describing phasor/analog/digital layout of subsequent
/// data frames. Opaque payload: the wire decoder owns its shape, the
/// mapper only needs to know it exists and can be cached/replayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationFrame {
    pub raw: Vec<u8>,
}

/// Commands invokable from the admin channel and forwarded to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    SendConfigurationFrame1,
    SendConfigurationFrame2,
    SendHeaderFrame,
    EnableRealTimeData,
    DisableRealTimeData,
}
