//! Aggregated wizard state and the step-gating state machine.
//!
//! [`WizardSnapshot`] is the single source of truth for the submission in
//! progress: the fixed step sequence, each step's recorded payload and
//! validity, and the current position. Advancement is gated on the current
//! step's recorded validity; retreating is always allowed and never clears
//! data. Cross-step identifier propagation (the selected location id
//! feeding the session step) is re-derived from the snapshot on every
//! [`seed`](WizardSnapshot::seed) call, never cached separately.

use std::collections::HashMap;

use crate::entity::ObservingSession;
use crate::forms::StepData;
use crate::steps::{WizardStep, STEP_COUNT};
use crate::types::DbId;

/// Outcome of a [`WizardSnapshot::try_advance`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the given step.
    Moved(WizardStep),
    /// Moved past the last step; the wizard is ready to submit.
    Completed,
    /// The current step's data is incomplete; nothing changed.
    Blocked {
        step: WizardStep,
        message: &'static str,
    },
}

/// The orchestrator's aggregated view of all steps at a point in time.
#[derive(Debug, Clone)]
pub struct WizardSnapshot {
    steps: [WizardStep; STEP_COUNT],
    step_data: HashMap<WizardStep, StepData>,
    step_validity: HashMap<WizardStep, bool>,
    /// Index into `steps`; `steps.len()` is the terminal pseudo-step.
    current: usize,
}

impl Default for WizardSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardSnapshot {
    /// A fresh snapshot positioned at the first step with no data recorded.
    pub fn new() -> Self {
        Self {
            steps: WizardStep::ALL,
            step_data: HashMap::new(),
            step_validity: HashMap::new(),
            current: 0,
        }
    }

    /// The fixed step sequence.
    pub fn steps(&self) -> &[WizardStep] {
        &self.steps
    }

    /// Current position, `0..=steps.len()`.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The step at the current position, or `None` once every step has
    /// been passed.
    pub fn current_step(&self) -> Option<WizardStep> {
        self.steps.get(self.current).copied()
    }

    /// Whether the terminal pseudo-step has been reached.
    pub fn is_complete(&self) -> bool {
        self.current == self.steps.len()
    }

    /// The recorded payload for a step, if any change has been reported.
    pub fn data(&self, step: WizardStep) -> Option<&StepData> {
        self.step_data.get(&step)
    }

    /// The recorded validity for a step. Steps with no recorded change
    /// are invalid.
    pub fn validity(&self, step: WizardStep) -> bool {
        self.step_validity.get(&step).copied().unwrap_or(false)
    }

    /// Merge a step's reported data and validity into the snapshot.
    ///
    /// The reported flag is stored as-is: validity is owned by the step
    /// controllers and their validators, not re-derived here.
    pub fn record(&mut self, step: WizardStep, data: StepData, is_valid: bool) {
        self.step_data.insert(step, data);
        self.step_validity.insert(step, is_valid);
    }

    /// Advance one step if the current step's recorded validity allows it.
    pub fn try_advance(&mut self) -> Advance {
        let Some(step) = self.current_step() else {
            return Advance::Completed;
        };
        if !self.validity(step) {
            return Advance::Blocked {
                step,
                message: step.blocking_message(),
            };
        }
        self.current += 1;
        match self.current_step() {
            Some(next) => Advance::Moved(next),
            None => Advance::Completed,
        }
    }

    /// Step back one step, unconditionally. Returns `false` when already
    /// at the first step. Recorded data is never cleared.
    pub fn retreat(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Seed value for (re-)entering a step: the recorded payload if one
    /// exists, else the step's default, with cross-step identifiers
    /// injected. The session step inherits the selected location's id
    /// (and owner) whenever its own data carries none.
    pub fn seed(&self, step: WizardStep) -> StepData {
        let mut data = self
            .step_data
            .get(&step)
            .cloned()
            .unwrap_or_else(|| StepData::default_for(step));

        if let StepData::Session(ref mut selection) = data {
            let needs_location = selection
                .session
                .as_ref()
                .map_or(true, |session| session.location_id.is_none());
            if needs_location {
                if let Some(location_id) = self.selected_location_id() {
                    selection
                        .session
                        .get_or_insert_with(ObservingSession::default)
                        .location_id = Some(location_id);
                }
            }
            if selection.user_id.is_none() {
                selection.user_id = self
                    .data(WizardStep::LocationDetails)
                    .and_then(StepData::as_location)
                    .and_then(|location| location.user_id);
            }
        }

        data
    }

    /// The persisted id of the location selected on the location step.
    pub fn selected_location_id(&self) -> Option<DbId> {
        self.data(WizardStep::LocationDetails)
            .and_then(StepData::as_location)
            .and_then(|selection| selection.location.as_ref())
            .and_then(|location| location.location_id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
