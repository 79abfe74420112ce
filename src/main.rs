// Runs the tracking pipeline over a directory of frames and logs the drive
// commands it would send. A real camera or simulator plugs in through the
// `FrameSource` / `VehicleActuator` traits of the library.

use anyhow::Context;
use beacon_drive::config::DriveConfig;
use beacon_drive::core_modules::color_mask::ColorRange;
use beacon_drive::{
    CycleOutcome, DriveError, Driver, ImageSequenceSource, LoggingActuator, ThrottledActuator, TrackingPipeline,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    Lemon,
    Lettuce,
}

#[derive(Debug, Parser)]
#[command(name = "beacon_drive", version, about = "Drive a vehicle by waving a colored object at a camera")]
struct Args {
    /// Directory of still frames to play back as the camera feed.
    #[arg(long)]
    frames: PathBuf,

    /// TOML configuration file. Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the target color from the configuration.
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Log filter when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Process a single frame and exit.
    #[arg(long)]
    once: bool,

    /// Replay the frames forever instead of stopping at the last one.
    #[arg(long = "loop")]
    looping: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &args.config {
        Some(path) => DriveConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => DriveConfig::default(),
    };
    if let Some(preset) = args.preset {
        config.target.color_range = match preset {
            Preset::Lemon => ColorRange::lemon(),
            Preset::Lettuce => ColorRange::lettuce(),
        };
    }

    let source = ImageSequenceSource::from_dir(&args.frames)
        .with_context(|| format!("opening frames in {}", args.frames.display()))?
        .looping(args.looping);
    info!(frames = source.len(), target = ?config.target.color_range, "beacon_drive starting");

    let pipeline = TrackingPipeline::from_config(&config)?;
    let actuator = ThrottledActuator::new(
        LoggingActuator::new(),
        config.driver.throttle_threshold,
        config.driver.steering_threshold,
    );
    let mut driver = Driver::new(source, actuator, pipeline, config.driver);

    if args.once {
        match driver.run_cycle()? {
            CycleOutcome::Sent(report) => info!(?report, "single cycle"),
            CycleOutcome::Skipped(reason) => warn!(%reason, "single cycle skipped"),
        }
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping after the current cycle");
            let _ = shutdown_tx.send(true);
        }
    });

    match driver.run(shutdown_rx).await {
        Ok(stats) => info!(?stats, "finished"),
        // Running out of recorded frames is the normal end of a playback.
        Err(DriveError::DeviceUnavailable(reason)) if !args.looping => {
            info!(%reason, stats = ?driver.stats(), "frame source exhausted")
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
