use std::time::Duration;

use tokio::time::Instant;

/// Owed remainder of a countdown that can be frozen and thawed.
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    owed: Duration,
    resumed_at: Option<Instant>,
}

impl Countdown {
    /// A running countdown owing `duration`.
    pub fn new(duration: Duration) -> Self {
        Self {
            owed: duration,
            resumed_at: Some(Instant::now()),
        }
    }

    pub fn resume(&mut self) {
        if self.resumed_at.is_none() {
            self.resumed_at = Some(Instant::now());
        }
    }

    pub fn pause(&mut self) {
        if let Some(resumed_at) = self.resumed_at.take() {
            self.owed = self.owed.saturating_sub(resumed_at.elapsed());
        }
    }

    pub fn remaining(&self) -> Duration {
        match self.resumed_at {
            Some(resumed_at) => self.owed.saturating_sub(resumed_at.elapsed()),
            None => self.owed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_remainder() {
        let mut countdown = Countdown::new(Duration::from_millis(2000));
        tokio::time::advance(Duration::from_millis(500)).await;
        countdown.pause();

        tokio::time::advance(Duration::from_millis(700)).await;
        assert_eq!(countdown.remaining(), Duration::from_millis(1500));

        countdown.resume();
        tokio::time::advance(Duration::from_millis(300)).await;
        assert_eq!(countdown.remaining(), Duration::from_millis(1200));
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_saturates_at_zero() {
        let countdown = Countdown::new(Duration::from_millis(100));
        tokio::time::advance(Duration::from_millis(250)).await;
        assert_eq!(countdown.remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn resume_while_running_keeps_origin() {
        let mut countdown = Countdown::new(Duration::from_secs(1));
        tokio::time::advance(Duration::from_millis(10)).await;
        countdown.resume();
        assert_eq!(countdown.remaining(), Duration::from_millis(990));
    }
}
