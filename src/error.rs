//! Error types

use crate::consts::STEP_COUNT;

/// A step index outside `1..=STEP_COUNT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    #[error("invalid step {step}: expected 1..={max}")]
    OutOfRange { step: i64, max: u8 },
}

impl StepError {
    pub fn out_of_range(step: impl Into<i64>) -> Self {
        StepError::OutOfRange {
            step: step.into(),
            max: STEP_COUNT,
        }
    }
}

/// Injected step content that cannot back the tutorial
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("expected {expected} steps, got {found}")]
    WrongLength { expected: usize, found: usize },
    #[error("step at position {position} has id {id}")]
    IdMismatch { position: usize, id: u8 },
    #[error("step content is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings that could not be read
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}
