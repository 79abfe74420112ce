//! Vehicle actuation boundary.
//!
//! The simulator client lives outside this crate. Whatever carries a
//! [`ControlCommand`] to the vehicle implements [`VehicleActuator`]. Sends are
//! never retried here; a failed send is returned to the caller as-is.

use crate::core_modules::control_mapper::ControlCommand;
use crate::error::DriveError;
use tracing::{debug, info};

/// Issues one command to the vehicle. May block on link I/O.
pub trait VehicleActuator {
    /// Fails with `DriveError::LinkUnavailable` when the vehicle cannot be reached.
    fn send(&mut self, command: ControlCommand) -> Result<(), DriveError>;
}

impl<A: VehicleActuator + ?Sized> VehicleActuator for Box<A> {
    fn send(&mut self, command: ControlCommand) -> Result<(), DriveError> {
        (**self).send(command)
    }
}

/// Dry-run actuator: every command becomes a log line.
#[derive(Debug, Default)]
pub struct LoggingActuator {
    sent: u64,
}

impl LoggingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl VehicleActuator for LoggingActuator {
    fn send(&mut self, command: ControlCommand) -> Result<(), DriveError> {
        self.sent += 1;
        info!(
            throttle = command.throttle,
            steering = command.steering,
            gear = ?command.gear(),
            "drive command"
        );
        Ok(())
    }
}

/// Keeps every command it is given. Meant for tests and replays.
#[derive(Debug, Default, Clone)]
pub struct RecordingActuator {
    commands: Vec<ControlCommand>,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[ControlCommand] {
        &self.commands
    }

    pub fn last(&self) -> Option<ControlCommand> {
        self.commands.last().copied()
    }
}

impl VehicleActuator for RecordingActuator {
    fn send(&mut self, command: ControlCommand) -> Result<(), DriveError> {
        self.commands.push(command);
        Ok(())
    }
}

/// Forwards a command only when it differs enough from the last one forwarded.
///
/// A change to the stop command is always forwarded, however small.
#[derive(Debug)]
pub struct ThrottledActuator<A> {
    inner: A,
    throttle_threshold: f64,
    steering_threshold: f64,
    last_sent: Option<ControlCommand>,
    skipped: u64,
}

impl<A: VehicleActuator> ThrottledActuator<A> {
    pub fn new(inner: A, throttle_threshold: f64, steering_threshold: f64) -> Self {
        Self {
            inner,
            throttle_threshold,
            steering_threshold,
            last_sent: None,
            skipped: 0,
        }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    pub fn into_inner(self) -> A {
        self.inner
    }

    /// Commands swallowed because they were too close to the last one sent.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn should_forward(&self, command: &ControlCommand) -> bool {
        let Some(last) = self.last_sent else {
            return true;
        };
        if command.is_stop() {
            return !last.is_stop();
        }
        (command.throttle - last.throttle).abs() > self.throttle_threshold
            || (command.steering - last.steering).abs() > self.steering_threshold
    }
}

impl<A: VehicleActuator> VehicleActuator for ThrottledActuator<A> {
    fn send(&mut self, command: ControlCommand) -> Result<(), DriveError> {
        if !self.should_forward(&command) {
            self.skipped += 1;
            debug!(throttle = command.throttle, steering = command.steering, "command below send threshold");
            return Ok(());
        }
        self.inner.send(command)?;
        self.last_sent = Some(command);
        Ok(())
    }
}
