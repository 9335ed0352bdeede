//! # pmu-ingest-adapter
//!
//! A stateful stream-mapping engine that turns a phasor measurement unit's
//! or phasor data concentrator's frame feed into platform measurements.
//!
//! ## Architecture
//!
//! * **ticks**: the shared time representation (100ns ticks since
//!   `0001-01-01T00:00:00Z`) every component timestamps against.
//! * **model**: the core data model — device records, signal kinds,
//!   parsed/mapped measurements, frames.
//! * **error**: the error taxonomy, fatal-at-init vs. logged-at-runtime.
//! * **device_table** / **measurement_catalog** / **signal_reference**:
//!   the three lookup structures the mapper resolves every cell against.
//! * **source** / **sink** / **frame_parser** / **cache_store**: the
//!   external-collaborator boundaries, each an `async_trait` with an
//!   in-memory or channel-backed test double.
//! * **liveness**: the data-loss watchdog and cached-configuration
//!   fallback timer.
//! * **config**: connection-string parsing into `ConnectionSettings`.
//! * **mapper**: the engine tying all of the above into one event loop.

pub mod cache_store;
pub mod config;
pub mod device_table;
pub mod error;
pub mod frame_parser;
pub mod liveness;
pub mod mapper;
pub mod measurement_catalog;
pub mod model;
pub mod signal_reference;
pub mod sink;
pub mod source;
pub mod ticks;

pub use config::ConnectionSettings;
pub use error::AdapterError;
pub use mapper::{AdapterCommand, ConnectionState, MapperHandle, MeasurementMapper, StatsSnapshot};
pub use model::{
    ConfigurationFrame, DataCell, DataFrame, DeviceCommand, DeviceRecord, MappedMeasurement,
    MeasurementDescriptor, MeasurementKey, ParsedMeasurement, SignalKind,
};
pub use uuid::Uuid;
