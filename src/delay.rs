use std::{
    fmt, mem,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    time::Duration,
};

use parking_lot::Mutex;
use tokio::{runtime::Handle, time::Instant};

use crate::{
    delay::{
        completion::settle,
        state::{Run, State},
    },
    duration::IntoDelayDuration,
    error::DelayError,
    utils::Countdown,
};

mod completion;
mod state;

pub use completion::Completion;
pub use state::{Phase, TimerId};

struct Shared {
    state: State,
    next_id: u64,
}

impl Default for Shared {
    fn default() -> Self {
        Self {
            state: State::Idle,
            next_id: 0,
        }
    }
}

/// A one-shot delay that can be paused, resumed and cancelled.
///
/// `Delay` is a cheap handle; clones drive the same countdown. The action is
/// run on the tokio runtime that was current when the delay was last armed.
#[derive(Clone, Default)]
pub struct Delay {
    shared: Arc<Mutex<Shared>>,
}

impl Delay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the delay to run `action` once `duration` has elapsed.
    ///
    /// Any run already in progress is superseded: its timer is stopped and its
    /// completions settle with [`DelayError::Superseded`]. Nothing is armed if
    /// the duration does not parse or no tokio runtime is available.
    pub fn start<D, F>(&self, duration: D, action: F) -> Result<Completion, DelayError>
    where
        D: IntoDelayDuration,
        F: FnOnce() + Send + 'static,
    {
        let duration = duration.into_delay_duration()?;
        let runtime = Handle::try_current().map_err(|_| DelayError::NoRuntime)?;

        let (waiter, completion) = Completion::channel();
        let run = Run::new(Countdown::new(duration), Box::new(action), waiter);

        let mut shared = self.shared.lock();
        let previous = mem::replace(&mut shared.state, State::Idle);
        let id = self.arm(&mut shared, &runtime, run);
        drop(shared);

        tracing::debug!("Timer {} armed for {:?}", id, duration);
        let superseded = previous.abandon();
        if !superseded.is_empty() {
            tracing::debug!("Timer {} superseded a pending run", id);
            settle(superseded, Err(DelayError::Superseded));
        }
        Ok(completion)
    }

    /// Freezes the countdown. Does nothing unless the delay is armed.
    pub fn pause(&self) {
        let mut shared = self.shared.lock();
        match mem::replace(&mut shared.state, State::Idle) {
            State::Armed { id, timer, mut run } => {
                timer.abort();
                run.countdown.pause();
                tracing::debug!(
                    "Timer {} paused with {:?} owed",
                    id,
                    run.countdown.remaining()
                );
                shared.state = State::Paused(run);
            }
            other => shared.state = other,
        }
    }

    /// Re-arms a paused delay for the time it still owes.
    ///
    /// The returned completion settles together with the one handed out by
    /// `start`. If the delay is not paused it is already resolved.
    pub fn resume(&self) -> Completion {
        let mut shared = self.shared.lock();
        if !matches!(shared.state, State::Paused(_)) {
            return Completion::ready(Ok(()));
        }
        let Ok(runtime) = Handle::try_current() else {
            return Completion::ready(Err(DelayError::NoRuntime));
        };

        match mem::replace(&mut shared.state, State::Idle) {
            State::Paused(mut run) => {
                let (waiter, completion) = Completion::channel();
                run.waiters.retain(|waiter| !waiter.is_closed());
                run.waiters.push(waiter);
                run.countdown.resume();
                let owed = run.countdown.remaining();
                let id = self.arm(&mut shared, &runtime, run);
                tracing::debug!("Timer {} resumed with {:?} owed", id, owed);
                completion
            }
            other => {
                shared.state = other;
                Completion::ready(Ok(()))
            }
        }
    }

    /// Stops the delay and forgets it. The action will not run and pending
    /// completions settle with [`DelayError::Cancelled`].
    pub fn cancel(&self) {
        let mut shared = self.shared.lock();
        let previous = mem::replace(&mut shared.state, State::Idle);
        drop(shared);

        if previous.phase() != Phase::Idle {
            tracing::debug!("Delay cancelled while {:?}", previous.phase());
        }
        settle(previous.abandon(), Err(DelayError::Cancelled));
    }

    /// The id of the scheduled timer, present only while armed.
    pub fn timer_id(&self) -> Option<TimerId> {
        match &self.shared.lock().state {
            State::Armed { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// When the current run was started. Kept across pauses and after firing.
    pub fn start_time(&self) -> Option<Instant> {
        match &self.shared.lock().state {
            State::Armed { run, .. } | State::Paused(run) => Some(run.started_at),
            State::Fired { started_at } => Some(*started_at),
            State::Idle => None,
        }
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.shared.lock().state, State::Paused(_))
    }

    /// Time still owed before the action runs.
    ///
    /// `None` when idle, fired, or once the owed time has fully elapsed.
    pub fn remaining(&self) -> Option<Duration> {
        self.shared
            .lock()
            .state
            .run()
            .map(|run| run.countdown.remaining())
            .filter(|remaining| !remaining.is_zero())
    }

    pub fn phase(&self) -> Phase {
        self.shared.lock().state.phase()
    }

    /// Spawns the underlying timer for whatever `run` still owes.
    fn arm(&self, shared: &mut Shared, runtime: &Handle, run: Run) -> TimerId {
        shared.next_id += 1;
        let id = TimerId(shared.next_id);
        let owed = run.countdown.remaining();

        let delay = self.clone();
        let timer = runtime
            .spawn(async move {
                tokio::time::sleep(owed).await;
                delay.fire(id);
            })
            .abort_handle();

        shared.state = State::Armed { id, timer, run };
        id
    }

    fn fire(&self, id: TimerId) {
        let mut shared = self.shared.lock();
        let run = match mem::replace(&mut shared.state, State::Idle) {
            State::Armed { id: armed, run, .. } if armed == id => run,
            other => {
                shared.state = other;
                tracing::debug!("Ignoring stale wakeup of timer {}", id);
                return;
            }
        };
        shared.state = State::Fired {
            started_at: run.started_at,
        };
        drop(shared);

        tracing::debug!("Timer {} fired", id);
        let action = run.action;
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(action)) {
            tracing::debug!("Action of timer {} panicked", id);
            settle(run.waiters, Err(DelayError::ActionPanicked));
            panic::resume_unwind(payload);
        }
        settle(run.waiters, Ok(()));
    }
}

impl fmt::Debug for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delay")
            .field("phase", &self.phase())
            .field("timer_id", &self.timer_id())
            .field("remaining", &self.remaining())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waiter_count(delay: &Delay) -> usize {
        delay
            .shared
            .lock()
            .state
            .run()
            .map_or(0, |run| run.waiters.len())
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_resumes_do_not_pile_up() {
        let delay = Delay::new();
        let _done = delay.start(10_000u64, || {}).unwrap();

        for _ in 0..1000 {
            delay.pause();
            drop(delay.resume());
        }
        delay.pause();

        // The start completion plus the last dropped resume.
        assert_eq!(waiter_count(&delay), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn live_resumes_are_kept() {
        let delay = Delay::new();
        let _done = delay.start(10_000u64, || {}).unwrap();

        delay.pause();
        let _first = delay.resume();
        delay.pause();
        let _second = delay.resume();

        assert_eq!(waiter_count(&delay), 3);
    }
}
