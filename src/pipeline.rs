// THEORY:
// The `pipeline` module is the top-level API of the perception-to-control core.
// It strings the four stages together for one frame at a time:
//
//     Frame -> Mask -> Blob -> NormalizedPosition -> ControlCommand
//
// Each call to `process` is one cycle. Aside from the optional smoothing filter and
// the track monitor (which only observes), nothing from one cycle reaches the next.
// The target color and mapper settings are fixed at construction and can only be
// swapped through an explicit `reconfigure_*` call.

use crate::config::{DriveConfig, TargetConfig};
use crate::core_modules::blob_locator::blob_locator;
use crate::core_modules::color_mask;
use crate::core_modules::control_mapper;
use crate::core_modules::position;
use crate::core_modules::smoothing::SmoothedMapper;
use crate::core_modules::track_state::TrackMonitor;
use crate::error::DriveError;
use tracing::{debug, info};

// Re-export key data structures for the public API.
pub use crate::core_modules::blob::{Blob, Centroid, Point};
pub use crate::core_modules::color_mask::{ColorRange, ColorSpace, Mask};
pub use crate::core_modules::control_mapper::{ControlCommand, ControlConfig, Gear};
pub use crate::core_modules::frame::{Frame, PixelFormat};
pub use crate::core_modules::position::NormalizedPosition;
pub use crate::core_modules::track_state::{TrackState, Transition};

/// Everything the pipeline worked out for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// 1-based index of the frame within this pipeline's lifetime.
    pub frame_index: u64,
    pub blob: Option<Blob>,
    pub position: Option<NormalizedPosition>,
    pub command: ControlCommand,
    pub state: TrackState,
    /// Set when this frame changed the track state.
    pub transition: Option<Transition>,
}

/// Either the plain mapper or its smoothing decorator.
#[derive(Debug, Clone)]
enum Mapper {
    Direct(ControlConfig),
    Smoothed(SmoothedMapper),
}

impl Mapper {
    fn map(&mut self, position: Option<&NormalizedPosition>) -> ControlCommand {
        match self {
            Mapper::Direct(config) => control_mapper::map(position, config),
            Mapper::Smoothed(smoothed) => smoothed.map(position),
        }
    }

    fn config(&self) -> &ControlConfig {
        match self {
            Mapper::Direct(config) => config,
            Mapper::Smoothed(smoothed) => smoothed.config(),
        }
    }
}

/// The main, top-level struct for the tracking core.
pub struct TrackingPipeline {
    target: TargetConfig,
    mapper: Mapper,
    monitor: TrackMonitor,
    frame_count: u64,
}

impl TrackingPipeline {
    /// Builds a pipeline with the plain, stateless mapper.
    pub fn new(target: TargetConfig, control: ControlConfig) -> Self {
        Self {
            target,
            mapper: Mapper::Direct(control),
            monitor: TrackMonitor::new(),
            frame_count: 0,
        }
    }

    /// Builds a pipeline from a validated configuration, smoothing included.
    pub fn from_config(config: &DriveConfig) -> Result<Self, DriveError> {
        config.validate()?;
        let mut pipeline = Self::new(config.target, config.control);
        if let Some(smoothing) = config.smoothing {
            pipeline.mapper = Mapper::Smoothed(SmoothedMapper::new(config.control, smoothing.alpha));
        }
        Ok(pipeline)
    }

    /// Runs one frame through every stage.
    ///
    /// The only error is `InvalidFrameGeometry`, raised when a blob is found on a
    /// frame that has no usable dimensions. The caller should drop the cycle.
    pub fn process(&mut self, frame: &Frame) -> Result<CycleReport, DriveError> {
        self.frame_count += 1;

        // Stage 1: Color thresholding
        let mut mask = color_mask::extract(frame, &self.target.color_range);
        if self.target.denoise_iterations > 0 {
            mask = color_mask::denoise(&mask, self.target.denoise_iterations);
        }

        // Stage 2: Spatial grouping
        let blob = blob_locator::locate(&mask, self.target.min_area);

        // Stage 3: Normalization
        let position = match &blob {
            Some(blob) => Some(position::normalize(blob, frame.width(), frame.height())?),
            None => None,
        };

        // Stage 4: Control mapping
        let command = self.mapper.map(position.as_ref());

        let transition = self.monitor.update(blob.as_ref());
        if let Some(edge) = transition {
            info!(
                frame = self.frame_count,
                from = ?edge.from,
                to = ?edge.to,
                after_frames = edge.after_frames,
                "track state changed"
            );
        }

        debug!(
            frame = self.frame_count,
            mask_pixels = mask.count(),
            area = blob.as_ref().map(|b| b.area),
            throttle = command.throttle,
            steering = command.steering,
            "cycle processed"
        );

        Ok(CycleReport {
            frame_index: self.frame_count,
            blob,
            position,
            command,
            state: self.monitor.state(),
            transition,
        })
    }

    /// Replaces the target color. Takes effect on the next frame.
    pub fn reconfigure_color(&mut self, range: ColorRange) -> Result<(), DriveError> {
        range.validate().map_err(DriveError::Config)?;
        info!(?range, "target color reconfigured");
        self.target.color_range = range;
        Ok(())
    }

    /// Replaces the mapper settings, keeping the smoothing factor if one is set.
    pub fn reconfigure_control(&mut self, control: ControlConfig) -> Result<(), DriveError> {
        control.validate().map_err(DriveError::Config)?;
        self.mapper = match &self.mapper {
            Mapper::Direct(_) => Mapper::Direct(control),
            Mapper::Smoothed(smoothed) => Mapper::Smoothed(SmoothedMapper::new(control, smoothed.alpha())),
        };
        Ok(())
    }

    pub fn target(&self) -> &TargetConfig {
        &self.target
    }

    pub fn control(&self) -> &ControlConfig {
        self.mapper.config()
    }

    pub fn track_state(&self) -> TrackState {
        self.monitor.state()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> TargetConfig {
        TargetConfig {
            color_range: ColorRange::lemon(),
            min_area: 4,
            denoise_iterations: 0,
        }
    }

    #[test]
    fn test_blank_frame_stops() {
        let mut pipeline = TrackingPipeline::new(target(), ControlConfig::default());
        let report = pipeline.process(&Frame::filled(64, 48, [0, 0, 255])).unwrap();
        assert_eq!(report.blob, None);
        assert_eq!(report.command, ControlCommand::STOP);
        assert_eq!(report.state, TrackState::Lost);
        assert_eq!(report.transition, None);
    }

    #[test]
    fn test_frame_counter_advances() {
        let mut pipeline = TrackingPipeline::new(target(), ControlConfig::default());
        let frame = Frame::filled(8, 8, [0, 0, 0]);
        pipeline.process(&frame).unwrap();
        let report = pipeline.process(&frame).unwrap();
        assert_eq!(report.frame_index, 2);
        assert_eq!(pipeline.frames_processed(), 2);
    }

    #[test]
    fn test_reconfigure_color_switches_target() {
        let mut pipeline = TrackingPipeline::new(target(), ControlConfig::default());
        let mut frame = Frame::filled(20, 20, [0, 0, 0]);
        frame.paint_rect(0, 0, 4, 4, [0, 200, 0]);

        assert_eq!(pipeline.process(&frame).unwrap().blob, None);

        pipeline.reconfigure_color(ColorRange::lettuce()).unwrap();
        let report = pipeline.process(&frame).unwrap();
        assert_eq!(report.blob.map(|b| b.area), Some(16));
        assert_eq!(report.state, TrackState::Tracking);
    }

    #[test]
    fn test_reconfigure_rejects_invalid_range() {
        let mut pipeline = TrackingPipeline::new(target(), ControlConfig::default());
        let bad = ColorRange::new(ColorSpace::Rgb, [10, 10, 10], [0, 0, 0]);
        assert!(pipeline.reconfigure_color(bad).is_err());
        assert_eq!(pipeline.target().color_range, ColorRange::lemon());
    }

    #[test]
    fn test_reconfigure_control_keeps_smoothing() {
        let config = DriveConfig {
            smoothing: Some(crate::config::SmoothingConfig { alpha: 0.5 }),
            ..DriveConfig::default()
        };
        let mut pipeline = TrackingPipeline::from_config(&config).unwrap();
        let control = ControlConfig {
            max_steering: 0.5,
            ..ControlConfig::default()
        };
        pipeline.reconfigure_control(control).unwrap();
        assert_eq!(pipeline.control().max_steering, 0.5);
        assert!(matches!(pipeline.mapper, Mapper::Smoothed(_)));
    }
}
