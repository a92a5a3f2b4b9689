use std::fmt;

use tokio::{task::AbortHandle, time::Instant};

use crate::{delay::completion::Waiter, utils::Countdown};

pub(crate) type Action = Box<dyn FnOnce() + Send + 'static>;

/// Identifies one scheduling of the underlying timer.
///
/// Every `start` and `resume` arms a fresh timer with a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub(crate) u64);

impl TimerId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Never started, or cancelled.
    Idle,
    /// Counting down.
    Armed,
    /// Countdown frozen with time still owed.
    Paused,
    /// The action has run.
    Fired,
}

/// Everything that survives a pause.
pub(crate) struct Run {
    pub started_at: Instant,
    pub countdown: Countdown,
    pub action: Action,
    pub waiters: Vec<Waiter>,
}

impl Run {
    pub fn new(countdown: Countdown, action: Action, waiter: Waiter) -> Self {
        Self {
            started_at: Instant::now(),
            countdown,
            action,
            waiters: vec![waiter],
        }
    }
}

pub(crate) enum State {
    Idle,
    Armed {
        id: TimerId,
        timer: AbortHandle,
        run: Run,
    },
    Paused(Run),
    Fired {
        started_at: Instant,
    },
}

impl State {
    pub fn phase(&self) -> Phase {
        match self {
            State::Idle => Phase::Idle,
            State::Armed { .. } => Phase::Armed,
            State::Paused(_) => Phase::Paused,
            State::Fired { .. } => Phase::Fired,
        }
    }

    pub fn run(&self) -> Option<&Run> {
        match self {
            State::Armed { run, .. } | State::Paused(run) => Some(run),
            State::Idle | State::Fired { .. } => None,
        }
    }

    /// Stops the underlying timer, if any, and hands back the pending waiters.
    pub fn abandon(self) -> Vec<Waiter> {
        match self {
            State::Armed { timer, run, .. } => {
                timer.abort();
                run.waiters
            }
            State::Paused(run) => run.waiters,
            State::Idle | State::Fired { .. } => Vec::new(),
        }
    }
}
