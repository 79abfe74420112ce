// THEORY:
// The `track_state` module gives the pipeline a name for what it is currently
// doing. There are exactly two states:
//
//     Lost --(qualifying blob)--> Tracking
//     Tracking --(no blob)------> Lost
//
// The monitor only observes. It counts how long the current state has lasted and
// reports edges so the caller can log them; it never changes the command. A lost
// object already produces the stop command through the mapper, and there is no
// hysteresis or multi-frame confirmation here.

use crate::core_modules::blob::Blob;

/// Whether the target is currently in view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    Tracking,
    #[default]
    Lost,
}

/// A change of `TrackState` between two consecutive frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: TrackState,
    pub to: TrackState,
    /// How many frames the previous state lasted.
    pub after_frames: u64,
}

/// Follows the two-state lifecycle across frames.
#[derive(Debug, Clone, Default)]
pub struct TrackMonitor {
    state: TrackState,
    /// Frames spent in the current state, including the latest one.
    frames_in_state: u64,
    /// Number of Lost -> Tracking edges seen so far.
    acquisitions: u64,
}

impl TrackMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn frames_in_state(&self) -> u64 {
        self.frames_in_state
    }

    pub fn acquisitions(&self) -> u64 {
        self.acquisitions
    }

    /// Feeds one frame's locator result. Returns the transition, if any.
    pub fn update(&mut self, blob: Option<&Blob>) -> Option<Transition> {
        let next = if blob.is_some() {
            TrackState::Tracking
        } else {
            TrackState::Lost
        };

        if next == self.state {
            self.frames_in_state += 1;
            return None;
        }

        let transition = Transition {
            from: self.state,
            to: next,
            after_frames: self.frames_in_state,
        };
        if next == TrackState::Tracking {
            self.acquisitions += 1;
        }
        self.state = next;
        self.frames_in_state = 1;
        Some(transition)
    }
}
