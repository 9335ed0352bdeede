//! Standalone binary wiring the mapper against a JSON topology fixture and
//! a newline-delimited-JSON frame recording, in place of a real wire
//! decoder. Useful for replaying a captured session or smoke-testing a
//! connection string against known topology without a live device.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use pmu_ingest_adapter::cache_store::ConfigurationCacheStore;
use pmu_ingest_adapter::config::ConnectionSettings;
use pmu_ingest_adapter::frame_parser::{ChannelFrameParser, ParserEvent};
use pmu_ingest_adapter::model::DataFrame;
use pmu_ingest_adapter::sink::JsonlMeasurementSink;
use pmu_ingest_adapter::source::InMemoryConfigurationSource;
use pmu_ingest_adapter::MeasurementMapper;

#[derive(Parser)]
#[command(name = "pmu-adapterd", about = "Offline PMU/PDC frame-to-measurement mapper")]
struct Args {
    /// Name this adapter is known by; seeds signal references and the cache file name.
    #[arg(long)]
    adapter_name: String,

    /// `key=value;key=value` settings, per the connection-string grammar.
    #[arg(long, default_value = "")]
    connection_string: String,

    /// JSON fixture describing InputAdapters/InputStreamDevices/ActiveMeasurements.
    #[arg(long)]
    topology: PathBuf,

    /// Newline-delimited JSON `DataFrame` recording to replay.
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Directory the configuration cache is written to and read from.
    #[arg(long, default_value = "./pmu-cache")]
    cache_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let settings = ConnectionSettings::parse(&args.connection_string)?;
    let source = InMemoryConfigurationSource::load_json(&args.topology).await?;
    let cache_store = Arc::new(ConfigurationCacheStore::spawn(args.cache_dir));
    let sink = Arc::new(JsonlMeasurementSink::new(tokio::io::stdout()));
    let (parser, frame_tx) = ChannelFrameParser::new(false);

    let mut mapper = MeasurementMapper::initialize(
        args.adapter_name,
        settings.clone(),
        Arc::new(source),
        sink,
        cache_store,
        Box::new(parser),
    )
    .await?;

    let handle = mapper.handle();
    handle.attempt_connection().await;

    if let Some(frames_path) = args.frames {
        tokio::spawn(replay_frames(
            frames_path,
            frame_tx,
            settings.defined_frame_rate,
            settings.auto_repeat_file,
        ));
    }

    let mut run_task = tokio::spawn(async move { mapper.run().await });
    tokio::select! {
        res = &mut run_task => {
            if let Err(e) = res {
                log::error!("mapper task panicked: {e}");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("received interrupt, disposing");
            handle.dispose().await;
            let _ = run_task.await;
        }
    }

    Ok(())
}

/// Feeds a recorded frame file back through the parser channel, pacing
/// delivery at `frame_rate` frames/second and looping if `repeat` is set —
/// the file-playback path `autoRepeatFile`/`definedFrameRate` describe.
async fn replay_frames(
    path: PathBuf,
    tx: tokio::sync::mpsc::Sender<ParserEvent>,
    frame_rate: u32,
    repeat: bool,
) {
    if tx.send(ParserEvent::ConnectionEstablished).await.is_err() {
        return;
    }
    let interval = std::time::Duration::from_secs_f64(1.0 / frame_rate.max(1) as f64);
    loop {
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) => {
                log::error!("failed to read frame recording '{}': {e}", path.display());
                return;
            }
        };
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<DataFrame>(line) {
                Ok(frame) => {
                    if tx.send(ParserEvent::ReceivedDataFrame(frame)).await.is_err() {
                        return;
                    }
                }
                Err(e) => log::error!("malformed frame record, skipping: {e}"),
            }
            tokio::time::sleep(interval).await;
        }
        if !repeat {
            break;
        }
    }
}
