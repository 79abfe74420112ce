// THEORY:
// `SmoothedMapper` adds the one piece of memory the control path is allowed to
// have, and keeps it outside `control_mapper::map`. It wraps the pure mapper and
// runs an exponential moving average over the commands it produces:
//
//     out = last + alpha * (raw - last)
//
// With alpha = 1 it is a pass-through. Losing the object bypasses the filter:
// the stop command goes out immediately and the filter restarts from rest, so a
// lost target never coasts. While the raw command is a stop, the decaying output
// snaps to an exact stop once both axes fall below `SETTLE_EPSILON`.

use crate::core_modules::control_mapper::{self, ControlCommand, ControlConfig};
use crate::core_modules::position::NormalizedPosition;

/// Smoothed magnitude under which a decay towards stop is treated as stopped.
pub const SETTLE_EPSILON: f64 = 1e-3;

/// Stateful EMA decorator around the stateless mapper.
#[derive(Debug, Clone)]
pub struct SmoothedMapper {
    config: ControlConfig,
    alpha: f64,
    last: Option<ControlCommand>,
}

impl SmoothedMapper {
    /// `alpha` is clamped into (0, 1]; values at or below zero behave as 1.
    pub fn new(config: ControlConfig, alpha: f64) -> Self {
        let alpha = if alpha.is_finite() && alpha > 0.0 { alpha.min(1.0) } else { 1.0 };
        Self {
            config,
            alpha,
            last: None,
        }
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Maps one position, blending it with the previous output.
    pub fn map(&mut self, position: Option<&NormalizedPosition>) -> ControlCommand {
        if position.is_none() {
            self.reset();
            return ControlCommand::STOP;
        }

        let raw = control_mapper::map(position, &self.config);
        let mut smoothed = match self.last {
            Some(last) => ControlCommand {
                throttle: last.throttle + self.alpha * (raw.throttle - last.throttle),
                steering: last.steering + self.alpha * (raw.steering - last.steering),
            },
            None => raw,
        };
        if raw.is_stop() && smoothed.throttle.abs() < SETTLE_EPSILON && smoothed.steering.abs() < SETTLE_EPSILON {
            smoothed = ControlCommand::STOP;
        }
        self.last = Some(smoothed);
        smoothed
    }

    /// Forgets the previous output.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ControlConfig {
        ControlConfig {
            dead_zone: 0.0,
            ..ControlConfig::default()
        }
    }

    #[test]
    fn test_first_command_passes_through() {
        let mut mapper = SmoothedMapper::new(cfg(), 0.5);
        let cmd = mapper.map(Some(&NormalizedPosition::new(1.0, 0.0)));
        assert_eq!(cmd.steering, 1.0);
    }

    #[test]
    fn test_blends_towards_new_target() {
        let mut mapper = SmoothedMapper::new(cfg(), 0.5);
        mapper.map(Some(&NormalizedPosition::new(1.0, 0.0)));
        let cmd = mapper.map(Some(&NormalizedPosition::new(0.0, 0.0)));
        assert!((cmd.steering - 0.5).abs() < 1e-12);
        let cmd = mapper.map(Some(&NormalizedPosition::new(0.0, 0.0)));
        assert!((cmd.steering - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_loss_stops_immediately_and_resets() {
        let mut mapper = SmoothedMapper::new(cfg(), 0.2);
        mapper.map(Some(&NormalizedPosition::new(1.0, -1.0)));
        assert_eq!(mapper.map(None), ControlCommand::STOP);

        // After a reset the next command is not blended with the pre-loss output.
        let cmd = mapper.map(Some(&NormalizedPosition::new(-1.0, 0.0)));
        assert_eq!(cmd.steering, -1.0);
    }

    #[test]
    fn test_decay_towards_center_settles_on_exact_stop() {
        let mut mapper = SmoothedMapper::new(cfg(), 0.5);
        mapper.map(Some(&NormalizedPosition::new(1.0, 0.0)));

        let center = NormalizedPosition::CENTER;
        let mut steps = 0;
        let mut cmd = mapper.map(Some(&center));
        while !cmd.is_stop() {
            assert!(cmd.steering >= SETTLE_EPSILON);
            steps += 1;
            assert!(steps < 20, "smoothed output never settled");
            cmd = mapper.map(Some(&center));
        }
        assert_eq!(cmd, ControlCommand::STOP);
        // 0.5^10 is the first power of a half below the settle threshold.
        assert_eq!(steps, 9);
        assert_eq!(mapper.map(Some(&center)), ControlCommand::STOP);
    }

    #[test]
    fn test_small_moving_command_is_not_snapped() {
        let mut mapper = SmoothedMapper::new(cfg(), 1.0);
        let cmd = mapper.map(Some(&NormalizedPosition::new(1e-4, 0.0)));
        assert!(!cmd.is_stop());
    }

    #[test]
    fn test_alpha_one_is_pass_through() {
        let mut mapper = SmoothedMapper::new(cfg(), 1.0);
        mapper.map(Some(&NormalizedPosition::new(1.0, 0.0)));
        let cmd = mapper.map(Some(&NormalizedPosition::new(-0.5, 0.0)));
        assert_eq!(cmd.steering, -0.5);
    }

    #[test]
    fn test_bad_alpha_falls_back_to_pass_through() {
        assert_eq!(SmoothedMapper::new(cfg(), 0.0).alpha(), 1.0);
        assert_eq!(SmoothedMapper::new(cfg(), f64::NAN).alpha(), 1.0);
        assert_eq!(SmoothedMapper::new(cfg(), 3.0).alpha(), 1.0);
    }
}
