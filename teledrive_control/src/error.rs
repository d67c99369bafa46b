//! Error types for the control loop.
//!
//! [`TickError`] never escapes the loop: a failing tick is logged and
//! dropped with the engagement state untouched. [`CycleError`] covers
//! startup only and is fatal to the process.

use teledrive_common::config::ConfigError;
use thiserror::Error;

/// Failure inside one control tick.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TickError {
    /// The synthesizer produced NaN or infinity.
    #[error("non-finite {field} command: {value}")]
    NonFiniteCommand { field: &'static str, value: f32 },

    /// The engagement step produced a state that breaks an invariant.
    #[error("engagement invariant violated: {0}")]
    Invariant(&'static str),
}

/// Startup / runtime setup failure.
#[derive(Debug, Error)]
pub enum CycleError {
    /// RT system call failed.
    #[error("RT setup error: {0}")]
    RtSetup(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
