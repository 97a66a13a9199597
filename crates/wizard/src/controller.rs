//! Per-step form state and validity reporting.

use astrovault_core::forms::StepData;
use astrovault_core::steps::WizardStep;
use astrovault_core::validators;
use astrovault_events::{WizardBus, WizardEvent};

/// A step's message to the orchestrator: the current payload and its
/// self-assessed validity.
///
/// The orchestrator records the flag as reported and never re-validates;
/// correctness of `is_valid` is this layer's contract, enforced by
/// unit-testing each validator in isolation.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub step: WizardStep,
    pub data: StepData,
    pub is_valid: bool,
}

/// Owns one step's local form state, runs that step's validator on every
/// change and reports `{data, is_valid}` upward.
pub struct StepController {
    step: WizardStep,
    data: StepData,
    bus: WizardBus,
}

impl StepController {
    /// Wrap a step around its seed data (typically
    /// `SubmissionWizard::initial_data`, so re-entering a step loses
    /// nothing).
    pub fn new(step: WizardStep, initial: StepData, bus: WizardBus) -> Self {
        debug_assert_eq!(initial.step(), step);
        Self {
            step,
            data: initial,
            bus,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn data(&self) -> &StepData {
        &self.data
    }

    /// The step's current validity, freshly evaluated.
    pub fn is_valid(&self) -> bool {
        validators::validate(&self.data)
    }

    /// Apply an edit to the form state, revalidate, publish the change on
    /// the bus and return the report for the orchestrator.
    pub fn edit(&mut self, apply: impl FnOnce(&mut StepData)) -> StepReport {
        apply(&mut self.data);
        debug_assert_eq!(self.data.step(), self.step);
        let report = self.report();
        self.bus
            .publish(WizardEvent::step_changed(report.step, report.is_valid));
        report
    }

    /// The current `{data, is_valid}` report.
    pub fn report(&self) -> StepReport {
        StepReport {
            step: self.step,
            data: self.data.clone(),
            is_valid: self.is_valid(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
