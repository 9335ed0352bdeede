//! Component G — MeasurementMapper, the core engine.
//!
//! Orchestrates components A–F: consumes frame-parser events, resolves
//! devices, synthesizes signal references, attaches measurement
//! descriptors, and emits batches to the sink. Commands from an
//! administrative caller (`sendCommand`, `resetStatistics`, ...) and
//! liveness-driven recovery actions are delivered through the same
//! channel the parser events arrive on, so the run loop is the single
//! writer for every piece of per-connection state (spec §5, §9).

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::{Arc, RwLock};

use tokio::sync::{mpsc, oneshot};

use crate::cache_store::ConfigurationCacheStore;
use crate::config::ConnectionSettings;
use crate::device_table::{DeviceTable, UndefinedDeviceCounter};
use crate::error::AdapterError;
use crate::frame_parser::{FrameParser, ParserEvent};
use crate::liveness::{LivenessAction, LivenessMonitor, LivenessState};
use crate::measurement_catalog::MeasurementCatalog;
use crate::model::{
    DataCell, DataFrame, DeviceCommand, MappedMeasurement, SignalKind,
};
use crate::signal_reference::SignalReferenceCache;
use crate::sink::MeasurementSink;
use crate::source::ConfigurationSource;
use crate::ticks::{self, Ticks};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Init,
    Idle,
    Connecting,
    ConnectedNoConfig,
    Streaming,
}

/// Commands an administrative caller may issue at any time; delivered
/// through the same queue the run loop drains parser events and liveness
/// actions from.
#[derive(Debug)]
pub enum AdapterCommand {
    AttemptConnection,
    AttemptDisconnection,
    SendCommand(DeviceCommand),
    ResetStatistics,
    ResetDeviceStatistics(u16),
    LoadCachedConfiguration,
    LoadConfiguration(PathBuf),
    QueryStats(oneshot::Sender<StatsSnapshot>),
    Dispose,
}

/// A point-in-time copy of the counters an administrative caller or test
/// may want to observe while `run()` still owns the mapper.
#[derive(Debug, Clone, Default)]
pub struct StatsSnapshot {
    pub out_of_order_frames: u64,
    pub last_report_time: Ticks,
    pub cached_config_load_attempted: bool,
    pub undefined_devices_total: u64,
}

/// Per-connection statistics, reset on every `attemptConnection`.
#[derive(Default)]
struct ConnectionStats {
    last_report_time: Ticks,
    out_of_order_frames: u64,
    bytes_received: u64,
    received_config_frame: bool,
    cached_config_load_attempted: bool,
    latency_min: i64,
    latency_max: i64,
    total_latency: i64,
    latency_measurements: u64,
}

/// Lifetime statistics, reset only by an explicit `resetStatistics`.
#[derive(Default)]
struct LifetimeStats {
    connection_attempts: u64,
    configuration_changes: u64,
    frames_processed: u64,
}

/// A cheaply cloneable handle for sending commands into a running
/// mapper's event loop from an administrative context.
#[derive(Clone)]
pub struct MapperHandle {
    commands: mpsc::Sender<AdapterCommand>,
}

impl MapperHandle {
    pub async fn attempt_connection(&self) {
        let _ = self.commands.send(AdapterCommand::AttemptConnection).await;
    }

    pub async fn attempt_disconnection(&self) {
        let _ = self.commands.send(AdapterCommand::AttemptDisconnection).await;
    }

    pub async fn send_command(&self, command: DeviceCommand) {
        let _ = self.commands.send(AdapterCommand::SendCommand(command)).await;
    }

    pub async fn reset_statistics(&self) {
        let _ = self.commands.send(AdapterCommand::ResetStatistics).await;
    }

    pub async fn reset_device_statistics(&self, id_code: u16) {
        let _ = self
            .commands
            .send(AdapterCommand::ResetDeviceStatistics(id_code))
            .await;
    }

    pub async fn load_cached_configuration(&self) {
        let _ = self.commands.send(AdapterCommand::LoadCachedConfiguration).await;
    }

    pub async fn load_configuration(&self, path: PathBuf) {
        let _ = self.commands.send(AdapterCommand::LoadConfiguration(path)).await;
    }

    pub async fn dispose(&self) {
        let _ = self.commands.send(AdapterCommand::Dispose).await;
    }

    /// Reads the running mapper's per-connection counters without
    /// interrupting its event loop.
    pub async fn query_stats(&self) -> Option<StatsSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(AdapterCommand::QueryStats(tx)).await.ok()?;
        rx.await.ok()
    }
}

pub struct MeasurementMapper {
    adapter_name: String,
    settings: ConnectionSettings,
    state: ConnectionState,
    effective_query_id: u32,

    device_table: Arc<RwLock<Arc<DeviceTable>>>,
    catalog: Arc<RwLock<Arc<MeasurementCatalog>>>,
    signal_cache: SignalReferenceCache,
    undefined_devices: UndefinedDeviceCounter,

    source: Arc<dyn ConfigurationSource>,
    sink: Arc<dyn MeasurementSink>,
    cache_store: Arc<ConfigurationCacheStore>,
    parser: Box<dyn FrameParser>,

    liveness_state: Arc<LivenessState>,
    liveness: Option<LivenessMonitor>,
    liveness_actions_rx: mpsc::Receiver<LivenessAction>,
    liveness_actions_tx: mpsc::Sender<LivenessAction>,

    commands_rx: mpsc::Receiver<AdapterCommand>,
    commands_tx: mpsc::Sender<AdapterCommand>,

    conn_stats: ConnectionStats,
    lifetime_stats: LifetimeStats,
}

impl MeasurementMapper {
    /// Constructs and loads topology/catalog. Branches on `isConcentrator`
    /// per spec §4.G. Fatal only if the configuration source itself is
    /// unreachable or settings are invalid (spec §7 "Fatal").
    pub async fn initialize(
        adapter_name: impl Into<String>,
        settings: ConnectionSettings,
        source: Arc<dyn ConfigurationSource>,
        sink: Arc<dyn MeasurementSink>,
        cache_store: Arc<ConfigurationCacheStore>,
        parser: Box<dyn FrameParser>,
    ) -> Result<Self, AdapterError> {
        let adapter_name = adapter_name.into();

        let shared_mapping_id = match &settings.shared_mapping {
            Some(name) => Some(
                source
                    .resolve_adapter_id(name)
                    .await?
                    .ok_or_else(|| crate::error::ConfigError::UnknownSharedMapping(name.clone()))?,
            ),
            None => None,
        };
        let effective_query_id = Self::effective_query_id(shared_mapping_id, settings.access_id);

        let device_rows = if settings.is_concentrator {
            source.devices_for_parent(effective_query_id).await?
        } else {
            vec![crate::source::InputStreamDeviceRow {
                parent_id: effective_query_id,
                access_id: settings.access_id,
                acronym: adapter_name.clone(),
                name: adapter_name.clone(),
                id: effective_query_id,
            }]
        };
        let devices = device_rows
            .into_iter()
            .map(|row| crate::model::DeviceRecord::new(row.access_id, row.acronym, row.name, row.id))
            .collect();
        let device_table = DeviceTable::load(devices).unwrap_or_else(|errors| {
            for e in &errors {
                log::error!("dropping device during load: {e}");
            }
            DeviceTable::new()
        });

        let descriptors = source.measurements_for_device(effective_query_id).await?;
        let catalog = MeasurementCatalog::load(descriptors);

        let (liveness_actions_tx, liveness_actions_rx) = mpsc::channel(16);
        let (commands_tx, commands_rx) = mpsc::channel(64);

        let mut mapper = Self {
            signal_cache: SignalReferenceCache::new(adapter_name.clone()),
            adapter_name,
            settings,
            state: ConnectionState::Init,
            effective_query_id,
            device_table: Arc::new(RwLock::new(Arc::new(device_table))),
            catalog: Arc::new(RwLock::new(Arc::new(catalog))),
            undefined_devices: UndefinedDeviceCounter::new(),
            source,
            sink,
            cache_store,
            parser,
            liveness_state: Arc::new(LivenessState::default()),
            liveness: None,
            liveness_actions_rx,
            liveness_actions_tx,
            commands_rx,
            commands_tx,
            conn_stats: ConnectionStats::default(),
            lifetime_stats: LifetimeStats::default(),
        };

        if let Some(path) = mapper.settings.configuration_file.clone() {
            if let Err(e) = mapper.load_configuration(&path).await {
                log::error!("failed to preload configuration file '{path}': {e}");
            }
        }

        mapper.state = ConnectionState::Idle;
        Ok(mapper)
    }

    pub fn handle(&self) -> MapperHandle {
        MapperHandle {
            commands: self.commands_tx.clone(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The `deviceID`/`parentID` this adapter queries the configuration
    /// source with: an adopted `sharedMapping` adapter's id if configured,
    /// otherwise this adapter's own `accessID`.
    fn effective_query_id(shared_mapping_id: Option<u32>, access_id: u16) -> u32 {
        shared_mapping_id.unwrap_or(access_id as u32)
    }

    /// Resets per-connection state and starts the frame parser (spec
    /// §4.G `attemptConnection`).
    async fn attempt_connection(&mut self) {
        self.conn_stats = ConnectionStats::default();
        self.liveness_state.bytes_since_tick.store(0, Ordering::Release);
        self.liveness_state.config_received.store(false, Ordering::Release);
        self.lifetime_stats.connection_attempts += 1;
        self.state = ConnectionState::Connecting;
        log::info!("{}: attempting connection", self.adapter_name);
        self.parser.start().await;
    }

    /// Disables the liveness monitor first, then stops the parser;
    /// in-flight frame processing is allowed to complete (spec §5).
    async fn attempt_disconnection(&mut self) {
        if let Some(monitor) = self.liveness.take() {
            monitor.stop();
        }
        self.parser.stop().await;
        self.state = ConnectionState::Idle;
        log::info!("{}: disconnected", self.adapter_name);
    }

    fn enable_liveness_if_supported(&mut self) {
        if self.parser.supports_commands() || self.settings.allow_use_of_cached_configuration {
            let monitor = LivenessMonitor::start(
                self.liveness_state.clone(),
                self.settings.data_loss_interval,
                self.settings.allow_use_of_cached_configuration,
                self.parser.supports_commands(),
                self.liveness_actions_tx.clone(),
            );
            self.liveness = Some(monitor);
        }
    }

    pub fn reset_statistics(&mut self) {
        self.lifetime_stats = LifetimeStats::default();
        if let Ok(guard) = self.device_table.read() {
            guard.reset_statistics();
        }
    }

    pub fn reset_device_statistics(&mut self, id_code: u16) {
        if let Ok(guard) = self.device_table.read() {
            guard.reset_device_statistics(id_code);
        }
    }

    async fn load_cached_configuration(&mut self) {
        match self.cache_store.load(&self.adapter_name).await {
            Ok(Some(frame)) => {
                log::info!("{}: loaded cached configuration", self.adapter_name);
                self.parser.inject_configuration(frame.clone()).await;
                self.handle_configuration_frame(frame, false).await;
            }
            Ok(None) => log::warn!("{}: no cached configuration available", self.adapter_name),
            Err(e) => log::error!("{}: failed to load cached configuration: {e}", self.adapter_name),
        }
    }

    async fn load_configuration(&mut self, path: &str) -> std::io::Result<()> {
        let bytes = tokio::fs::read(path).await?;
        let frame = crate::model::ConfigurationFrame { raw: bytes };
        self.parser.inject_configuration(frame.clone()).await;
        self.handle_configuration_frame(frame, false).await;
        Ok(())
    }

    /// Re-queries the configuration source for this adapter's device
    /// topology and measurement catalog and publishes the result as a new
    /// snapshot behind a single write-lock swap, so in-flight readers keep
    /// their already-cloned `Arc` to the prior snapshot (spec §5).
    async fn reload_topology(&mut self) {
        let device_rows = if self.settings.is_concentrator {
            self.source.devices_for_parent(self.effective_query_id).await
        } else {
            Ok(vec![crate::source::InputStreamDeviceRow {
                parent_id: self.effective_query_id,
                access_id: self.settings.access_id,
                acronym: self.adapter_name.clone(),
                name: self.adapter_name.clone(),
                id: self.effective_query_id,
            }])
        };
        let device_rows = match device_rows {
            Ok(rows) => rows,
            Err(e) => {
                log::error!("{}: failed to re-query device topology, keeping prior snapshot: {e}", self.adapter_name);
                return;
            }
        };
        let devices = device_rows
            .into_iter()
            .map(|row| crate::model::DeviceRecord::new(row.access_id, row.acronym, row.name, row.id))
            .collect();
        let device_table = DeviceTable::load(devices).unwrap_or_else(|errors| {
            for e in &errors {
                log::error!("{}: dropping device during reload: {e}", self.adapter_name);
            }
            DeviceTable::new()
        });

        let descriptors = match self.source.measurements_for_device(self.effective_query_id).await {
            Ok(d) => d,
            Err(e) => {
                log::error!("{}: failed to re-query measurement catalog, keeping prior snapshot: {e}", self.adapter_name);
                return;
            }
        };
        let catalog = MeasurementCatalog::load(descriptors);

        if let Ok(mut guard) = self.device_table.write() {
            *guard = Arc::new(device_table);
        }
        if let Ok(mut guard) = self.catalog.write() {
            *guard = Arc::new(catalog);
        }
        log::info!("{}: reloaded device topology and measurement catalog", self.adapter_name);
    }

    /// Handles a configuration frame whether it arrived over the wire,
    /// from the cache, or from a preloaded file. Only the first
    /// receipt-after-(re)connect persists to the cache (spec invariant 5).
    async fn handle_configuration_frame(&mut self, frame: crate::model::ConfigurationFrame, from_wire: bool) {
        if self.conn_stats.received_config_frame {
            self.lifetime_stats.configuration_changes += 1;
            self.reload_topology().await;
        } else {
            self.conn_stats.received_config_frame = true;
            self.liveness_state.config_received.store(true, Ordering::Release);
            if from_wire {
                self.cache_store.cache(&self.adapter_name, frame);
            }
        }
        self.state = ConnectionState::Streaming;
    }

    /// Main event loop: drains parser events, liveness actions, and
    /// administrative commands until disposed.
    pub async fn run(&mut self) {
        loop {
            tokio::select! {
                event = self.parser.next_event() => {
                    match event {
                        Some(event) => self.handle_parser_event(event).await,
                        None => {
                            log::info!("{}: parser event stream closed", self.adapter_name);
                            break;
                        }
                    }
                }
                Some(action) = self.liveness_actions_rx.recv() => {
                    self.handle_liveness_action(action).await;
                }
                Some(command) = self.commands_rx.recv() => {
                    if self.handle_command(command).await {
                        break;
                    }
                }
            }
        }
    }

    async fn handle_command(&mut self, command: AdapterCommand) -> bool {
        match command {
            AdapterCommand::AttemptConnection => self.attempt_connection().await,
            AdapterCommand::AttemptDisconnection => self.attempt_disconnection().await,
            AdapterCommand::SendCommand(cmd) => self.parser.send_command(cmd).await,
            AdapterCommand::ResetStatistics => self.reset_statistics(),
            AdapterCommand::ResetDeviceStatistics(id) => self.reset_device_statistics(id),
            AdapterCommand::LoadCachedConfiguration => self.load_cached_configuration().await,
            AdapterCommand::LoadConfiguration(path) => {
                if let Err(e) = self.load_configuration(&path.to_string_lossy()).await {
                    log::error!("{}: failed to load configuration from {path:?}: {e}", self.adapter_name);
                }
            }
            AdapterCommand::QueryStats(reply) => {
                let snapshot = StatsSnapshot {
                    out_of_order_frames: self.conn_stats.out_of_order_frames,
                    last_report_time: self.conn_stats.last_report_time,
                    cached_config_load_attempted: self.conn_stats.cached_config_load_attempted,
                    undefined_devices_total: self.undefined_devices_total(),
                };
                let _ = reply.send(snapshot);
            }
            AdapterCommand::Dispose => {
                self.attempt_disconnection().await;
                return true;
            }
        }
        false
    }

    async fn handle_liveness_action(&mut self, action: LivenessAction) {
        match action {
            LivenessAction::RestartConnectCycle => {
                self.attempt_disconnection().await;
                tokio::time::sleep(self.settings.delayed_connection_interval).await;
                self.attempt_connection().await;
            }
            LivenessAction::LoadCachedConfiguration => {
                self.conn_stats.cached_config_load_attempted = true;
                self.load_cached_configuration().await;
            }
        }
    }

    async fn handle_parser_event(&mut self, event: ParserEvent) {
        match event {
            ParserEvent::ConnectionAttempt => {
                self.lifetime_stats.connection_attempts += 1;
                log::info!("{}: connection attempt", self.adapter_name);
            }
            ParserEvent::ConnectionEstablished => {
                self.conn_stats = ConnectionStats::default();
                self.state = ConnectionState::ConnectedNoConfig;
                self.enable_liveness_if_supported();
                log::info!("{}: connection established", self.adapter_name);
            }
            ParserEvent::ConnectionException(e) => {
                log::error!("{}: connection exception: {e}", self.adapter_name);
                if self.state != ConnectionState::Idle {
                    tokio::time::sleep(self.settings.delayed_connection_interval).await;
                    self.attempt_connection().await;
                }
            }
            ParserEvent::ConnectionTerminated => {
                log::warn!("{}: connection terminated", self.adapter_name);
                if self.state != ConnectionState::Idle {
                    self.attempt_connection().await;
                }
            }
            ParserEvent::ReceivedConfigurationFrame(frame) => {
                self.handle_configuration_frame(frame, true).await;
            }
            ParserEvent::ReceivedDataFrame(frame) => {
                self.lifetime_stats.frames_processed += 1;
                let batch = self.extract_frame_measurements(frame);
                self.sink.publish(batch).await;
            }
            ParserEvent::ReceivedHeaderFrame => {
                log::debug!("{}: received header frame", self.adapter_name);
            }
            ParserEvent::ReceivedFrameBufferImage(bytes) => {
                self.conn_stats.bytes_received += bytes as u64;
                self.liveness_state.bytes_since_tick.fetch_add(bytes as u64, Ordering::AcqRel);
            }
            ParserEvent::ParsingException(e) => {
                log::error!("{}: parsing exception: {e}", self.adapter_name);
            }
            ParserEvent::ExceededParsingExceptionThreshold => {
                log::error!("{}: exceeded parsing exception threshold, restarting", self.adapter_name);
                self.attempt_disconnection().await;
                self.attempt_connection().await;
            }
            ParserEvent::ConfigurationChanged => {
                log::info!("{}: configuration changed upstream", self.adapter_name);
                self.conn_stats.received_config_frame = false;
                self.liveness_state.config_received.store(false, Ordering::Release);
                if let Some(monitor) = self.liveness.take() {
                    monitor.stop();
                }
                self.enable_liveness_if_supported();
                self.state = ConnectionState::ConnectedNoConfig;
                self.parser.send_command(DeviceCommand::SendConfigurationFrame2).await;
                // In-flight data frames keep mapping against the snapshot
                // `reload_topology` is about to replace until the swap below
                // completes, then pick up the refreshed one on their next
                // read-lock clone (spec §5 copy-on-write).
                self.reload_topology().await;
            }
        }
    }

    /// The hot path: spec §4.G `extractFrameMeasurements`.
    fn extract_frame_measurements(&mut self, frame: DataFrame) -> Vec<MappedMeasurement> {
        let utc_ticks = ticks::to_utc(frame.timestamp, &self.settings.time_zone);
        let timestamp = utc_ticks + self.settings.time_adjustment_ticks;

        if timestamp > self.conn_stats.last_report_time {
            self.conn_stats.last_report_time = timestamp;
        } else {
            self.conn_stats.out_of_order_frames += 1;
        }

        let latency = frame.received_timestamp - timestamp;
        if self.conn_stats.latency_min == 0 || latency < self.conn_stats.latency_min {
            self.conn_stats.latency_min = latency;
        }
        if self.conn_stats.latency_max == 0 || latency > self.conn_stats.latency_max {
            self.conn_stats.latency_max = latency;
        }
        self.conn_stats.total_latency += latency;
        self.conn_stats.latency_measurements += 1;

        // Short read-lock to clone the `Arc`, then operate lock-free: a
        // concurrent `configurationChanged` re-initialization can publish
        // a new snapshot without blocking in-flight frame processing, and
        // this frame keeps seeing a consistent (old or new) snapshot.
        let device_table_snapshot = self.device_table.read().unwrap().clone();
        let catalog_snapshot = self.catalog.read().unwrap().clone();

        let mut batch = Vec::new();
        for cell in frame.cells {
            let Some(device) = device_table_snapshot.resolve(cell.id_code, &cell.station_name) else {
                if self.undefined_devices.record(&cell.station_name) {
                    log::warn!("{}: undefined device '{}'", self.adapter_name, cell.station_name);
                }
                continue;
            };
            device.record_frame(timestamp, cell.quality);

            if let Err(e) = self.map_device_cell(&cell, timestamp, &catalog_snapshot, &mut batch) {
                log::error!(
                    "{}: mapping failed for device '{}': {e}",
                    self.adapter_name,
                    cell.station_name
                );
            }
        }
        batch
    }

    /// One device's contribution to the batch. Any failure here is
    /// isolated to this device (spec §4.G step 4.d, §5 "Failure isolation").
    fn map_device_cell(
        &mut self,
        cell: &DataCell,
        timestamp: Ticks,
        catalog: &MeasurementCatalog,
        batch: &mut Vec<MappedMeasurement>,
    ) -> Result<(), crate::error::MappingError> {
        let n_phasors = cell.phasors.len();
        let quality_bits = cell.quality.to_bits();

        self.map_attribute(
            SignalKind::Status,
            None,
            0,
            cell.status,
            timestamp,
            quality_bits,
            catalog,
            batch,
        );

        for (x, (angle, magnitude)) in cell.phasors.iter().enumerate() {
            self.map_attribute(SignalKind::Angle, Some(x), n_phasors, *angle, timestamp, quality_bits, catalog, batch);
            self.map_attribute(SignalKind::Magnitude, Some(x), n_phasors, *magnitude, timestamp, quality_bits, catalog, batch);
        }

        self.map_attribute(SignalKind::Frequency, None, 0, cell.frequency, timestamp, quality_bits, catalog, batch);
        self.map_attribute(SignalKind::DfDt, None, 0, cell.df_dt, timestamp, quality_bits, catalog, batch);

        let n_analog = cell.analog_values.len();
        for (x, value) in cell.analog_values.iter().enumerate() {
            let v = value.measurements.first().copied().unwrap_or(0.0);
            self.map_attribute(SignalKind::Analog, Some(x), n_analog, v, timestamp, quality_bits, catalog, batch);
        }

        let n_digital = cell.digital_values.len();
        for (x, value) in cell.digital_values.iter().enumerate() {
            let v = value.measurements.first().copied().unwrap_or(0.0);
            self.map_attribute(SignalKind::Digital, Some(x), n_digital, v, timestamp, quality_bits, catalog, batch);
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn map_attribute(
        &mut self,
        kind: SignalKind,
        index: Option<usize>,
        count: usize,
        value: f64,
        timestamp: Ticks,
        quality_bits: u32,
        catalog: &MeasurementCatalog,
        batch: &mut Vec<MappedMeasurement>,
    ) {
        let signal_ref = match index {
            Some(i) => self.signal_cache.get_indexed(kind, i, count).to_string(),
            None => self.signal_cache.get(kind).to_string(),
        };
        let Some(descriptor) = catalog.get(&signal_ref) else {
            return;
        };
        batch.push(MappedMeasurement {
            signal_id: descriptor.signal_id,
            key: descriptor.key.clone(),
            value,
            timestamp,
            quality_bits,
            adder: descriptor.adder,
            multiplier: descriptor.multiplier,
        });
    }

    /// Bounded one-liner: uptime-free for now (no wall-clock dependency in
    /// this crate, see ticks module) — reports frame rate and error counts.
    pub fn short_status(&self, max_len: usize) -> String {
        let status = format!(
            "{}: {} frames, {} out-of-order, {} undefined-device sightings, state={:?}",
            self.adapter_name,
            self.lifetime_stats.frames_processed,
            self.conn_stats.out_of_order_frames,
            self.undefined_devices_total(),
            self.state,
        );
        if status.len() > max_len {
            status[..max_len].to_string()
        } else {
            status
        }
    }

    fn undefined_devices_total(&self) -> u64 {
        self.undefined_devices.total()
    }

    pub fn out_of_order_frames(&self) -> u64 {
        self.conn_stats.out_of_order_frames
    }

    pub fn last_report_time(&self) -> Ticks {
        self.conn_stats.last_report_time
    }

    pub fn cached_config_load_attempted(&self) -> bool {
        self.conn_stats.cached_config_load_attempted
    }

    pub fn undefined_device_count(&self, station_name: &str) -> u64 {
        self.undefined_devices.count(station_name)
    }
}
