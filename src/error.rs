//! Custom error types for the kinematic monitor.
//!
//! `MonitorError` is the single error type of the library. It is built with `thiserror`, and the
//! `#[from]` conversions let loaders, sinks and the replay path propagate with `?`.
//!
//! ## What is *not* an error
//!
//! Two failure modes of the metrics never surface here:
//!
//! - **Insufficient data**: a metric asked for more samples than the window holds returns
//!   `None`. It must stay distinguishable from a genuine zero reading.
//! - **Degenerate geometry**: fewer than two valid limbs makes DCR `0.0`, and a zero-length
//!   limb makes the joint angle `None`.
//!
//! ## Error Hierarchy
//!
//! - **`Config`**: figment could not read or extract the configuration.
//! - **`Configuration`**: the configuration parsed but is semantically invalid.
//! - **`DimensionMismatch`**: trajectory and center-of-mass windows drifted apart. This is an
//!   integration bug and is never truncated away.
//! - **`JointCountMismatch`**: a record does not have the configured number of joints.
//! - **`FrameOrder`**: frame indices must strictly increase within a stream.
//! - **`Io`**, **`Csv`**, **`Serialization`**: sink and replay I/O.
//! - **`Input`**: malformed keypoint input.
//! - **`UnknownSink`**: no sink registered under the requested name.

use thiserror::Error;

/// Convenience alias for results using the library error type.
pub type MonitorResult<T> = std::result::Result<T, MonitorError>;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Configuration validation error: {0}")]
    Configuration(String),

    #[error(
        "Window length mismatch: {trajectories} trajectory frames vs {center_of_mass} center-of-mass frames"
    )]
    DimensionMismatch {
        trajectories: usize,
        center_of_mass: usize,
    },

    #[error("Joint count mismatch: expected {expected} joints, found {found}")]
    JointCountMismatch { expected: usize, found: usize },

    #[error("Frame index {current} does not follow previous frame {previous}")]
    FrameOrder { previous: u64, current: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid keypoint input: {0}")]
    Input(String),

    #[error("Trigger sink '{0}' is not registered")]
    UnknownSink(String),
}

impl From<figment::Error> for MonitorError {
    fn from(value: figment::Error) -> Self {
        MonitorError::Config(Box::new(value))
    }
}

impl MonitorError {
    /// Whether a stream can keep going after this error.
    ///
    /// Sink and input problems are local to one frame or file; configuration and window
    /// desynchronisation mean the analyzer itself is in a bad state.
    pub fn is_recoverable(&self) -> bool {
        match self {
            MonitorError::Config(_)
            | MonitorError::Configuration(_)
            | MonitorError::DimensionMismatch { .. }
            | MonitorError::UnknownSink(_) => false,
            MonitorError::JointCountMismatch { .. }
            | MonitorError::FrameOrder { .. }
            | MonitorError::Io(_)
            | MonitorError::Csv(_)
            | MonitorError::Serialization(_)
            | MonitorError::Input(_) => true,
        }
    }
}
