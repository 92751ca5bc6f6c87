use std::fmt;

/// Whether the watcher keeps polling. `Stopping` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Running,
    Stopping,
}

/// Where the poll loop currently is in its check-notify-wait cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Checking,
    Notifying,
    Waiting,
    Stopped,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Checking => "checking",
            Phase::Notifying => "notifying",
            Phase::Waiting => "waiting",
            Phase::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Summary handed back when the poll loop stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopReport {
    pub cycles: u64,
    pub available: u64,
    pub errors: u64,
    pub run_state: RunState,
    /// Set when the loop stopped because of an unrecoverable failure.
    pub fatal: Option<String>,
}

impl LoopReport {
    pub fn is_graceful(&self) -> bool {
        self.fatal.is_none()
    }
}
