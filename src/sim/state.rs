//! Simulation state
//!
//! The current step is the only externally mutable state. The crack-onset
//! latch is internal to the frame loop and derived from step transitions.

use serde::{Deserialize, Serialize};

use crate::error::StepError;
use crate::steps::Step;

/// Navigation state (`currentStep` in `1..=STEP_COUNT`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationState {
    current_step: Step,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            current_step: Step::FIRST,
        }
    }
}

impl SimulationState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn current_step(&self) -> Step {
        self.current_step
    }

    pub fn can_go_next(&self) -> bool {
        self.current_step.next().is_some()
    }

    pub fn can_go_previous(&self) -> bool {
        self.current_step.previous().is_some()
    }

    /// Advance one step; returns false (no-op) at the last step
    pub fn next(&mut self) -> bool {
        match self.current_step.next() {
            Some(step) => {
                self.current_step = step;
                true
            }
            None => false,
        }
    }

    /// Go back one step; returns false (no-op) at the first step
    pub fn previous(&mut self) -> bool {
        match self.current_step.previous() {
            Some(step) => {
                self.current_step = step;
                true
            }
            None => false,
        }
    }

    /// Jump to step `n`; out-of-range values are rejected and leave the state untouched.
    /// Returns whether the step changed.
    pub fn go_to(&mut self, n: i64) -> Result<bool, StepError> {
        let step = Step::new(n)?;
        let changed = step != self.current_step;
        self.current_step = step;
        Ok(changed)
    }

    pub fn reset(&mut self) {
        self.current_step = Step::FIRST;
    }
}

/// Write-once register holding the time the crack animation started
///
/// Latched on the first observed frame in the crack/split range, released
/// when the step leaves that range or on reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CrackLatch {
    onset: Option<f32>,
}

impl CrackLatch {
    /// Observe one frame and return the active onset time, if any
    pub fn observe(&mut self, step: Step, time: f32) -> Option<f32> {
        if step.is_cracked() {
            if self.onset.is_none() {
                log::debug!("Crack onset latched at t={:.3} (step {})", time, step);
                self.onset = Some(time);
            }
        } else if self.onset.take().is_some() {
            log::debug!("Crack onset released (step {})", step);
        }
        self.onset
    }

    #[inline]
    pub fn onset(&self) -> Option<f32> {
        self.onset
    }

    pub fn clear(&mut self) {
        self.onset = None;
    }
}
