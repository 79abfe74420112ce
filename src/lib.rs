// THEORY:
// This file is the main entry point for the `beacon_drive` library crate.
//
// The core is the perception-to-control path in `pipeline` and `core_modules`:
// find the target color in a frame, reduce it to one blob, express the blob's
// position relative to frame center, and turn that into throttle and steering.
// It is synchronous and free of I/O.
//
// Around the core sit the collaborator boundaries (`frame_source`, `actuator`),
// configuration (`config`), errors (`error`) and the host loop (`driver`) that
// paces cycles and applies the retry policy.

pub mod actuator;
pub mod config;
pub mod core_modules;
pub mod driver;
pub mod error;
pub mod frame_source;
pub mod pipeline;

pub use actuator::{LoggingActuator, RecordingActuator, ThrottledActuator, VehicleActuator};
pub use config::DriveConfig;
pub use driver::{CycleOutcome, Driver, DriverStats};
pub use error::DriveError;
pub use frame_source::{FrameSource, ImageSequenceSource};
pub use pipeline::{ControlCommand, CycleReport, Frame, TrackingPipeline};
