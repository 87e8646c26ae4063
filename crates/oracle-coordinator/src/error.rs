//! Errors that must be distinguishable at the process boundary: each variant
//! here maps onto one of the coordinator's documented exit codes, everything
//! else collapses into a plain `anyhow::Error` at the call site.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("fewer than threshold valid peer signatures were collected ({collected}/{threshold})")]
    ThresholdNotMet { collected: usize, threshold: usize },

    #[error("settlement submission failed: {0}")]
    SubmissionFailed(String),

    #[error("arena settlement_nonce advanced during signature collection (expected {expected}, observed {observed})")]
    StaleNonce { expected: u64, observed: u64 },
}

impl CoordinatorError {
    /// Process exit code per the coordinator's CLI surface: 64 config, 65
    /// threshold-not-met, 66 submission-failed. Nonce races are not terminal
    /// by themselves — they surface through `ThresholdNotMet` or
    /// `SubmissionFailed` once collection concludes.
    pub fn exit_code(&self) -> i32 {
        match self {
            CoordinatorError::Config(_) => 64,
            CoordinatorError::ThresholdNotMet { .. } => 65,
            CoordinatorError::SubmissionFailed(_) => 66,
            CoordinatorError::StaleNonce { .. } => 66,
        }
    }
}
