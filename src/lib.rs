//! A one-shot delay that can be paused, resumed and cancelled.
//!
//! ```no_run
//! use pausable_delay::Delay;
//!
//! # async fn run() -> Result<(), pausable_delay::DelayError> {
//! let delay = Delay::new();
//! let done = delay.start("2s", || println!("fired"))?;
//! delay.pause();
//! let resumed = delay.resume();
//! resumed.await?;
//! done.await?;
//! # Ok(())
//! # }
//! ```

mod delay;
mod duration;
mod error;
mod utils;

pub use delay::{Completion, Delay, Phase, TimerId};
pub use duration::{IntoDelayDuration, parse_duration};
pub use error::DelayError;
