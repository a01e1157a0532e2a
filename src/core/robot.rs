use super::types::{Kind, PlatformId, RobotId, Tick};

/// FSM state of a robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum RobotState {
    /// Not started; only ever seen before the first tick
    Pending,
    /// Waiting for admission into `path[cursor]`
    Requesting,
    /// Inside `path[cursor]`, dwelling
    Occupying,
    Done,
}

/// What a robot needs from the platforms this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Intent {
    Idle,
    /// Ask for admission into the platform; release the held one on success
    Request(PlatformId),
    /// Release the held platform and finish
    Finish(PlatformId),
}

/// Snapshot of the fields whose change counts as progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Progress {
    state: RobotState,
    cursor: usize,
    dwell_remaining: Tick,
}

/// An agent walking a fixed path of platforms.
#[derive(Debug, Clone)]
pub struct Robot {
    id: RobotId,
    kind: Option<Kind>,
    path: Vec<PlatformId>,
    cursor: usize,
    state: RobotState,
    ticks_elapsed: Tick,
    dwell_remaining: Tick,
    held: Option<PlatformId>,
}

impl Robot {
    pub fn new(id: RobotId, path: Vec<PlatformId>, kind: Option<Kind>) -> Self {
        Self {
            id,
            kind,
            path,
            cursor: 0,
            state: RobotState::Pending,
            ticks_elapsed: 0,
            dwell_remaining: 0,
            held: None,
        }
    }

    pub fn id(&self) -> RobotId {
        self.id
    }

    pub fn kind(&self) -> Option<&Kind> {
        self.kind.as_ref()
    }

    pub fn path(&self) -> &[PlatformId] {
        &self.path
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> RobotState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == RobotState::Done
    }

    pub fn ticks_elapsed(&self) -> Tick {
        self.ticks_elapsed
    }

    /// Platform currently occupied, if any.
    pub fn held(&self) -> Option<PlatformId> {
        self.held
    }

    /// Platform the robot is asking for, when requesting.
    pub fn target(&self) -> Option<PlatformId> {
        match self.state {
            RobotState::Requesting => self.path.get(self.cursor).copied(),
            _ => None,
        }
    }

    pub(crate) fn progress(&self) -> Progress {
        Progress {
            state: self.state,
            cursor: self.cursor,
            dwell_remaining: self.dwell_remaining,
        }
    }

    /// Robot-local half of a tick: bookkeeping that touches no platform.
    ///
    /// Charges the tick, runs the dwell countdown and moves through
    /// Pending/Occupying transitions, then reports what the platforms must do.
    pub(crate) fn prepare(&mut self) -> Intent {
        match self.state {
            RobotState::Done => Intent::Idle,
            RobotState::Pending => {
                if self.path.is_empty() {
                    // Finishes at tick 0; the tick is not charged
                    self.state = RobotState::Done;
                    return Intent::Idle;
                }
                self.ticks_elapsed += 1;
                self.state = RobotState::Requesting;
                Intent::Request(self.path[0])
            }
            RobotState::Occupying => {
                self.ticks_elapsed += 1;
                self.dwell_remaining = self.dwell_remaining.saturating_sub(1);
                if self.dwell_remaining > 0 {
                    return Intent::Idle;
                }
                self.cursor += 1;
                match self.path.get(self.cursor) {
                    Some(&next) => {
                        // Keeps holding the current platform until `next` admits it
                        self.state = RobotState::Requesting;
                        Intent::Request(next)
                    }
                    None => match self.held {
                        Some(held) => Intent::Finish(held),
                        None => {
                            self.state = RobotState::Done;
                            Intent::Idle
                        }
                    },
                }
            }
            RobotState::Requesting => {
                self.ticks_elapsed += 1;
                Intent::Request(self.path[self.cursor])
            }
        }
    }

    /// Record a successful admission. Returns the platform to release, if any.
    pub(crate) fn admitted(&mut self, platform: PlatformId, dwell: Tick) -> Option<PlatformId> {
        debug_assert_eq!(self.path.get(self.cursor), Some(&platform));
        self.state = RobotState::Occupying;
        self.dwell_remaining = dwell;
        self.held.replace(platform)
    }

    pub(crate) fn finished(&mut self) {
        self.held = None;
        self.dwell_remaining = 0;
        self.state = RobotState::Done;
    }
}
