use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DelayError {
    /// The trailing unit of a duration string is not one of `s`, `m`, `h`, `d`.
    #[error("Unknown time unit: {0}")]
    UnknownUnit(String),

    /// The delay was cancelled before its action ran.
    #[error("Delay cancelled")]
    Cancelled,

    /// The delay was re-armed by another `start` before its action ran.
    #[error("Delay superseded by a new start")]
    Superseded,

    /// The action panicked while running. The panic still unwinds the timer task.
    #[error("Delay action panicked")]
    ActionPanicked,

    /// No tokio runtime is available to drive the underlying timer.
    #[error("No tokio runtime available")]
    NoRuntime,
}
