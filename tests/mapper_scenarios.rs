//! End-to-end scenarios driving `MeasurementMapper` through its public
//! surface: a fixture `ConfigurationSource`, a channel-fed `FrameParser`,
//! and a channel-backed `MeasurementSink`.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use pmu_ingest_adapter::cache_store::ConfigurationCacheStore;
use pmu_ingest_adapter::config::ConnectionSettings;
use pmu_ingest_adapter::frame_parser::{ChannelFrameParser, ParserEvent};
use pmu_ingest_adapter::model::{CellQuality, DataCell, DataFrame, IndexedValue, MeasurementDescriptor, MeasurementKey};
use pmu_ingest_adapter::sink::ChannelMeasurementSink;
use pmu_ingest_adapter::source::{InMemoryConfigurationSource, InputStreamDeviceRow};
use pmu_ingest_adapter::ticks;
use pmu_ingest_adapter::MeasurementMapper;

fn descriptor(signal_reference: &str) -> MeasurementDescriptor {
    MeasurementDescriptor {
        signal_id: Uuid::new_v4(),
        key: MeasurementKey {
            source: "HIST".to_string(),
            id: signal_reference.len() as u64,
        },
        signal_reference: signal_reference.to_string(),
        adder: 0.0,
        multiplier: 1.0,
    }
}

fn empty_cell(id_code: u16, station_name: &str) -> DataCell {
    DataCell {
        id_code,
        station_name: station_name.to_string(),
        status: 0.0,
        phasors: Vec::new(),
        frequency: 0.0,
        df_dt: 0.0,
        analog_values: Vec::new(),
        digital_values: Vec::new(),
        quality: CellQuality::default(),
    }
}

fn cache_store() -> Arc<ConfigurationCacheStore> {
    let dir = std::env::temp_dir().join(format!("pmu-ingest-scenario-{}", Uuid::new_v4()));
    Arc::new(ConfigurationCacheStore::spawn(dir))
}

/// S1: single device, 2 phasors + 1 analog, all signal references cataloged.
#[tokio::test]
async fn s1_single_device_happy_path() {
    let settings = ConnectionSettings::parse("accessId=7").unwrap();

    let mut source = InMemoryConfigurationSource::new();
    for signal_reference in [
        "D7!IS-SF", "D7!IS-PA1", "D7!IS-PA2", "D7!IS-PM1", "D7!IS-PM2", "D7!IS-FQ", "D7!IS-DF", "D7!IS-AV1",
    ] {
        source.measurements.push((7, descriptor(signal_reference)));
    }

    let (sink, mut batches) = ChannelMeasurementSink::new();
    let (parser, frame_tx) = ChannelFrameParser::new(false);
    let mut mapper = MeasurementMapper::initialize(
        "D7",
        settings,
        Arc::new(source),
        Arc::new(sink),
        cache_store(),
        Box::new(parser),
    )
    .await
    .unwrap();

    tokio::spawn(async move { mapper.run().await });

    let mut cell = empty_cell(7, "D7");
    cell.phasors = vec![(0.1, 120.1), (0.2, 120.2)];
    cell.frequency = 60.00;
    cell.df_dt = 0.0;
    cell.analog_values = vec![IndexedValue { measurements: vec![1.5] }];

    let timestamp = ticks::from_datetime(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    let frame = DataFrame {
        timestamp,
        received_timestamp: timestamp,
        cells: vec![cell],
    };
    frame_tx.send(ParserEvent::ReceivedDataFrame(frame)).await.unwrap();

    let batch = batches.recv().await.unwrap();
    assert_eq!(batch.len(), 8, "1 status + 2*2 phasor + 2 (freq/dfdt) + 1 analog");
    assert!(batch.iter().all(|m| m.timestamp == timestamp));
    assert!(batch.iter().all(|m| m.adder == 0.0 && m.multiplier == 1.0));
}

/// S2: local-time frame timestamp converted through a non-UTC zone plus a
/// fixed adjustment.
#[tokio::test]
async fn s2_time_zone_and_adjustment() {
    let settings = ConnectionSettings::parse("accessId=7;timeZone=US/Eastern;timeAdjustmentTicks=10000000").unwrap();

    let mut source = InMemoryConfigurationSource::new();
    source.measurements.push((7, descriptor("D7!IS-FQ")));

    let (sink, mut batches) = ChannelMeasurementSink::new();
    let (parser, frame_tx) = ChannelFrameParser::new(false);
    let mut mapper = MeasurementMapper::initialize(
        "D7",
        settings,
        Arc::new(source),
        Arc::new(sink),
        cache_store(),
        Box::new(parser),
    )
    .await
    .unwrap();
    tokio::spawn(async move { mapper.run().await });

    let mut cell = empty_cell(7, "D7");
    cell.frequency = 60.0;
    let local_timestamp = ticks::from_datetime(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    let frame = DataFrame {
        timestamp: local_timestamp,
        received_timestamp: local_timestamp,
        cells: vec![cell],
    };
    frame_tx.send(ParserEvent::ReceivedDataFrame(frame)).await.unwrap();

    let batch = batches.recv().await.unwrap();
    let expected = ticks::from_datetime(Utc.with_ymd_and_hms(2024, 1, 1, 5, 0, 1).unwrap());
    assert_eq!(batch[0].timestamp, expected);
}

/// S3: a frame older than the current lastReportTime still maps, but bumps
/// outOfOrderFrames instead of advancing lastReportTime.
#[tokio::test]
async fn s3_out_of_order_frame_still_mapped() {
    let settings = ConnectionSettings::parse("accessId=7").unwrap();

    let mut source = InMemoryConfigurationSource::new();
    source.measurements.push((7, descriptor("D7!IS-FQ")));

    let (sink, mut batches) = ChannelMeasurementSink::new();
    let (parser, frame_tx) = ChannelFrameParser::new(false);
    let mut mapper = MeasurementMapper::initialize(
        "D7",
        settings,
        Arc::new(source),
        Arc::new(sink),
        cache_store(),
        Box::new(parser),
    )
    .await
    .unwrap();
    let handle = mapper.handle();
    tokio::spawn(async move { mapper.run().await });

    let first_ts = ticks::from_datetime(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    let mut first_cell = empty_cell(7, "D7");
    first_cell.frequency = 60.0;
    frame_tx
        .send(ParserEvent::ReceivedDataFrame(DataFrame {
            timestamp: first_ts,
            received_timestamp: first_ts,
            cells: vec![first_cell],
        }))
        .await
        .unwrap();
    let first_batch = batches.recv().await.unwrap();
    assert_eq!(first_batch.len(), 1);

    let second_ts = ticks::from_datetime(Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap());
    let mut second_cell = empty_cell(7, "D7");
    second_cell.frequency = 59.9;
    frame_tx
        .send(ParserEvent::ReceivedDataFrame(DataFrame {
            timestamp: second_ts,
            received_timestamp: second_ts,
            cells: vec![second_cell],
        }))
        .await
        .unwrap();
    let second_batch = batches.recv().await.unwrap();
    assert_eq!(second_batch.len(), 1, "still mapped despite being out of order");

    let stats = handle.query_stats().await.unwrap();
    assert_eq!(stats.out_of_order_frames, 1);
    assert_eq!(stats.last_report_time, first_ts, "lastReportTime stays at the newer frame's timestamp");

    drop(frame_tx);
    handle.dispose().await;
}

/// S4: a concentrator with two devices colliding on accessID=1, disambiguated
/// by label.
#[tokio::test]
async fn s4_id_collision_resolved_by_label() {
    let settings = ConnectionSettings::parse("accessId=1;isConcentrator=true").unwrap();

    let mut source = InMemoryConfigurationSource::new();
    source.devices.push(InputStreamDeviceRow {
        parent_id: 1,
        access_id: 1,
        acronym: "A".to_string(),
        name: "Station A".to_string(),
        id: 101,
    });
    source.devices.push(InputStreamDeviceRow {
        parent_id: 1,
        access_id: 1,
        acronym: "B".to_string(),
        name: "Station B".to_string(),
        id: 102,
    });

    let (sink, mut batches) = ChannelMeasurementSink::new();
    let (parser, frame_tx) = ChannelFrameParser::new(false);
    let mut mapper = MeasurementMapper::initialize(
        "CONCENTRATOR",
        settings,
        Arc::new(source),
        Arc::new(sink),
        cache_store(),
        Box::new(parser),
    )
    .await
    .unwrap();
    tokio::spawn(async move { mapper.run().await });

    let mut cell_a = empty_cell(1, "A");
    cell_a.frequency = 60.0;
    let mut cell_b = empty_cell(1, "B");
    cell_b.frequency = 60.0;
    let timestamp = ticks::now();
    frame_tx
        .send(ParserEvent::ReceivedDataFrame(DataFrame {
            timestamp,
            received_timestamp: timestamp,
            cells: vec![cell_a, cell_b],
        }))
        .await
        .unwrap();

    // No catalog entries, so the batch is empty, but both devices must have
    // resolved without error (exercised via the absence of a panic/log
    // assertion is out of reach here; we assert the publish still happens).
    let batch = batches.recv().await.unwrap();
    assert!(batch.is_empty());
}

/// S5: an unresolvable station name is counted but never mapped.
#[tokio::test]
async fn s5_undefined_device_counted_not_mapped() {
    let settings = ConnectionSettings::parse("accessId=7").unwrap();
    let mut source = InMemoryConfigurationSource::new();
    source.measurements.push((7, descriptor("D7!IS-FQ")));

    let (sink, mut batches) = ChannelMeasurementSink::new();
    let (parser, frame_tx) = ChannelFrameParser::new(false);
    let mut mapper = MeasurementMapper::initialize(
        "D7",
        settings,
        Arc::new(source),
        Arc::new(sink),
        cache_store(),
        Box::new(parser),
    )
    .await
    .unwrap();
    let handle = mapper.handle();
    tokio::spawn(async move { mapper.run().await });

    let mut ghost = empty_cell(99, "GHOST");
    ghost.frequency = 60.0;
    let timestamp = ticks::now();
    for _ in 0..2 {
        frame_tx
            .send(ParserEvent::ReceivedDataFrame(DataFrame {
                timestamp,
                received_timestamp: timestamp,
                cells: vec![ghost.clone()],
            }))
            .await
            .unwrap();
        let batch = batches.recv().await.unwrap();
        assert!(batch.is_empty());
    }

    drop(frame_tx);
    handle.dispose().await;
}

/// S6: with no configuration frame received, the liveness monitor attempts
/// the cached configuration once, then restarts the connect cycle if the
/// cache was empty and the underlying transport supports commands.
#[tokio::test(start_paused = true)]
async fn s6_cached_configuration_fallback_then_restart() {
    let settings = ConnectionSettings::parse(
        "accessId=7;allowUseOfCachedConfiguration=true;dataLossInterval=0.01;delayedConnectionInterval=0.01",
    )
    .unwrap();
    let source = InMemoryConfigurationSource::new();

    let (sink, _batches) = ChannelMeasurementSink::new();
    let (parser, frame_tx, parser_calls) = ChannelFrameParser::with_call_counts(true);
    let mut mapper = MeasurementMapper::initialize(
        "D7",
        settings,
        Arc::new(source),
        Arc::new(sink),
        cache_store(),
        Box::new(parser),
    )
    .await
    .unwrap();
    let handle = mapper.handle();
    tokio::spawn(async move { mapper.run().await });

    handle.attempt_connection().await;
    tokio::task::yield_now().await;
    assert_eq!(parser_calls.starts.load(Ordering::Relaxed), 1);

    // Bytes flow, but no configuration frame ever arrives.
    frame_tx.send(ParserEvent::ConnectionEstablished).await.unwrap();
    tokio::task::yield_now().await;
    frame_tx.send(ParserEvent::ReceivedFrameBufferImage(10)).await.unwrap();

    // First liveness tick: cached-configuration fallback is attempted.
    tokio::time::advance(Duration::from_millis(11)).await;
    tokio::task::yield_now().await;

    let stats = handle.query_stats().await.unwrap();
    assert!(stats.cached_config_load_attempted, "cached configuration fallback attempted exactly once");

    // Refresh bytes so the second tick doesn't take the "no bytes" branch.
    frame_tx.send(ParserEvent::ReceivedFrameBufferImage(10)).await.unwrap();

    // Second liveness tick: still no configuration, so the connect cycle restarts.
    tokio::time::advance(Duration::from_millis(11)).await;
    tokio::task::yield_now().await;
    tokio::time::advance(Duration::from_millis(11)).await;
    tokio::task::yield_now().await;

    assert_eq!(parser_calls.stops.load(Ordering::Relaxed), 1, "restart disconnects once");
    assert_eq!(parser_calls.starts.load(Ordering::Relaxed), 2, "restart reconnects once");

    // attemptConnection resets per-connection stats, so the new connection
    // attempt gets its own fresh cached-configuration-fallback cycle.
    let stats_after_restart = handle.query_stats().await.unwrap();
    assert!(
        !stats_after_restart.cached_config_load_attempted,
        "restart starts a new connection, so the per-connection flag resets"
    );

    drop(frame_tx);
    handle.dispose().await;
}
