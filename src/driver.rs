// THEORY:
// The `driver` is the host loop around the pipeline. It owns the two external
// collaborators and decides what happens when they fail; the pipeline itself
// never retries and never talks to a device.
//
// Policy per cycle:
// - frame acquired, cycle processed, command sent: the normal path.
// - invalid frame geometry or a frame buffer of the wrong size: that cycle is
//   logged and skipped, the loop goes on.
// - frame source unavailable: the vehicle is stopped on the first failure of a
//   streak, since there is nothing left to steer by. The failure is tolerated for
//   `device_retry_limit` consecutive cycles, then the loop stops and returns it.
// - vehicle link unavailable: the loop stops at once and returns the error.
//
// Cancellation is cooperative. The loop checks a `watch` flag between cycles and
// never abandons a cycle halfway. On every exit where the link is still believed
// to be up it sends a final stop command.

use crate::actuator::VehicleActuator;
use crate::config::DriverConfig;
use crate::error::DriveError;
use crate::frame_source::FrameSource;
use crate::pipeline::{ControlCommand, CycleReport, TrackingPipeline};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// What a single cycle ended up doing.
#[derive(Debug)]
pub enum CycleOutcome {
    /// The command in the report went to the actuator.
    Sent(CycleReport),
    /// The frame was dropped; nothing was sent.
    Skipped(DriveError),
}

/// Counters for one run of the host loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub cycles: u64,
    pub sent: u64,
    pub skipped: u64,
    pub device_failures: u64,
}

pub struct Driver<S, A> {
    source: S,
    actuator: A,
    pipeline: TrackingPipeline,
    config: DriverConfig,
    stats: DriverStats,
}

impl<S: FrameSource, A: VehicleActuator> Driver<S, A> {
    pub fn new(source: S, actuator: A, pipeline: TrackingPipeline, config: DriverConfig) -> Self {
        Self {
            source,
            actuator,
            pipeline,
            config,
            stats: DriverStats::default(),
        }
    }

    /// One blocking acquire -> process -> send sequence.
    ///
    /// Collaborator failures are returned untouched; only cycle-local errors, from
    /// the source or the pipeline, are turned into `CycleOutcome::Skipped`.
    pub fn run_cycle(&mut self) -> Result<CycleOutcome, DriveError> {
        self.stats.cycles += 1;

        let frame = match self.source.acquire() {
            Ok(frame) => frame,
            Err(e) if e.is_cycle_local() => return Ok(self.skip(e)),
            Err(e) => return Err(e),
        };

        let report = match self.pipeline.process(&frame) {
            Ok(report) => report,
            Err(e) if e.is_cycle_local() => return Ok(self.skip(e)),
            Err(e) => return Err(e),
        };

        self.actuator.send(report.command)?;
        self.stats.sent += 1;
        Ok(CycleOutcome::Sent(report))
    }

    fn skip(&mut self, reason: DriveError) -> CycleOutcome {
        warn!(error = %reason, cycle = self.stats.cycles, "skipping cycle");
        self.stats.skipped += 1;
        CycleOutcome::Skipped(reason)
    }

    /// Runs cycles at the configured refresh rate until `shutdown` turns true, its
    /// sender goes away, or a collaborator fails for good.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<DriverStats, DriveError> {
        let mut ticker = tokio::time::interval(self.config.refresh_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut consecutive_device_failures: u32 = 0;

        info!(
            refresh_ms = self.config.refresh_interval_ms,
            retry_limit = self.config.device_retry_limit,
            "driver started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }
            if *shutdown.borrow() {
                break;
            }

            match self.run_cycle() {
                Ok(_) => consecutive_device_failures = 0,
                Err(DriveError::DeviceUnavailable(reason)) => {
                    self.stats.device_failures += 1;
                    consecutive_device_failures += 1;
                    if consecutive_device_failures > self.config.device_retry_limit {
                        error!(%reason, attempts = consecutive_device_failures, "frame source gave up");
                        if let Err(e) = self.stop_vehicle() {
                            warn!(error = %e, "final stop command failed");
                        }
                        return Err(DriveError::DeviceUnavailable(reason));
                    }
                    warn!(%reason, attempt = consecutive_device_failures, "frame source unavailable, retrying");
                    if consecutive_device_failures == 1 {
                        // No frame, no steering: hold still until the camera is back.
                        self.stop_vehicle()?;
                    }
                }
                Err(e) => {
                    error!(error = %e, "halting driver");
                    return Err(e);
                }
            }
        }

        self.stop_vehicle()?;
        info!(stats = ?self.stats, "driver stopped");
        Ok(self.stats)
    }

    /// Sends the stop command straight to the actuator.
    pub fn stop_vehicle(&mut self) -> Result<(), DriveError> {
        self.actuator.send(ControlCommand::STOP)
    }

    pub fn stats(&self) -> DriverStats {
        self.stats
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }
}
