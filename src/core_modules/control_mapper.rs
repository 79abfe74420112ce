// THEORY:
// The `ControlMapper` is the last stage of the core. It turns "where is the object
// relative to frame center" into "how hard to drive and steer".
//
// Key architectural principles:
// 1.  **Fail-Safe Stop**: No position means the object is lost, and a lost object
//     always produces the stop command. This is a normal state, not an error.
// 2.  **Dead-Zone With Rescale**: Small offsets around center are forced to zero so a
//     hand-held object does not make the vehicle twitch. Outside the dead-zone the
//     remaining travel [dead_zone, 1] is stretched back onto [0, 1], which keeps the
//     response continuous: just past the edge of the dead-zone the output is just
//     above zero, never a step.
// 3.  **Named Sign Conventions**: Image rows grow downward, so whether "object above
//     center" means forward depends on the camera mount. That choice is the
//     `invert_vertical` option, never an implicit sign flip. `invert_horizontal`
//     does the same for mirrored cameras.
// 4.  **Hard Limits Last**: Scaling by the configured maxima and any forward gain
//     happen before the final clamp, so the output never leaves
//     [-max_throttle, max_throttle] x [-max_steering, max_steering].
// 5.  **Stateless**: `map` is a pure function. Anything temporal (smoothing, send
//     hysteresis) is layered around it.

use crate::core_modules::position::NormalizedPosition;
use serde::{Deserialize, Serialize};

/// Tunables for the position-to-command mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Radius around center, per axis, inside which output is zero. In [0, 1).
    pub dead_zone: f64,
    /// Largest throttle magnitude the mapper will emit. In [0, 1].
    pub max_throttle: f64,
    /// Largest steering magnitude the mapper will emit. In [0, 1].
    pub max_steering: f64,
    /// Flip the vertical axis before it becomes throttle, so "object above center"
    /// drives forward.
    pub invert_vertical: bool,
    /// Flip the horizontal axis before it becomes steering.
    pub invert_horizontal: bool,
    /// Gain applied to forward (positive) throttle only, before clamping.
    pub forward_ratio: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            dead_zone: 0.1,
            max_throttle: 1.0,
            max_steering: 1.0,
            invert_vertical: true,
            invert_horizontal: false,
            forward_ratio: 1.0,
        }
    }
}

impl ControlConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..1.0).contains(&self.dead_zone) {
            return Err(format!("dead_zone must be in [0, 1), got {}", self.dead_zone));
        }
        if !(0.0..=1.0).contains(&self.max_throttle) {
            return Err(format!("max_throttle must be in [0, 1], got {}", self.max_throttle));
        }
        if !(0.0..=1.0).contains(&self.max_steering) {
            return Err(format!("max_steering must be in [0, 1], got {}", self.max_steering));
        }
        if !self.forward_ratio.is_finite() || self.forward_ratio <= 0.0 {
            return Err(format!("forward_ratio must be positive, got {}", self.forward_ratio));
        }
        Ok(())
    }
}

/// Gear an actuator should select for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gear {
    Forward,
    Reverse,
}

/// One drive instruction. Both fields are in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlCommand {
    /// Positive drives forward, negative reverses.
    pub throttle: f64,
    /// Positive steers right, negative left.
    pub steering: f64,
}

impl ControlCommand {
    pub const STOP: Self = Self {
        throttle: 0.0,
        steering: 0.0,
    };

    pub fn new(throttle: f64, steering: f64) -> Self {
        Self { throttle, steering }
    }

    pub fn is_stop(&self) -> bool {
        self.throttle == 0.0 && self.steering == 0.0
    }

    pub fn gear(&self) -> Gear {
        if self.throttle < 0.0 { Gear::Reverse } else { Gear::Forward }
    }
}

/// Converts a normalized position (or its absence) into a command.
pub fn map(position: Option<&NormalizedPosition>, config: &ControlConfig) -> ControlCommand {
    let Some(position) = position else {
        return ControlCommand::STOP;
    };

    let horizontal = apply_dead_zone(position.horizontal, config.dead_zone);
    let vertical = apply_dead_zone(position.vertical, config.dead_zone);

    let steering_sign = if config.invert_horizontal { -1.0 } else { 1.0 };
    let throttle_sign = if config.invert_vertical { -1.0 } else { 1.0 };

    let steering = horizontal * steering_sign * config.max_steering;
    let mut throttle = vertical * throttle_sign * config.max_throttle;
    if throttle > 0.0 {
        throttle *= config.forward_ratio;
    }

    ControlCommand {
        throttle: clamp_symmetric(throttle, config.max_throttle),
        steering: clamp_symmetric(steering, config.max_steering),
    }
}

/// Zeroes `|value| < dead_zone`, then rescales [dead_zone, 1] onto [0, 1] keeping sign.
///
/// A `dead_zone` outside [0, 1) is clamped into it; NaN counts as no dead zone.
pub fn apply_dead_zone(value: f64, dead_zone: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let dead_zone = if dead_zone.is_nan() {
        0.0
    } else {
        dead_zone.clamp(0.0, 1.0 - f64::EPSILON)
    };
    let magnitude = value.abs().min(1.0);
    if magnitude < dead_zone {
        return 0.0;
    }
    value.signum() * (magnitude - dead_zone) / (1.0 - dead_zone)
}

fn clamp_symmetric(value: f64, limit: f64) -> f64 {
    if !value.is_finite() || !limit.is_finite() {
        return 0.0;
    }
    let limit = limit.abs();
    // Adding 0.0 folds -0.0 into 0.0.
    value.clamp(-limit, limit) + 0.0
}
