//! The submission wizard orchestrator.
//!
//! [`SubmissionWizard`] owns the aggregated snapshot, sequences the steps,
//! gates advancement on each step's reported validity, and composes the
//! three entity-backed steps (location, gear, session) with the plain
//! data-entry steps (images, image details). Identifier propagation
//! between steps flows through the snapshot, never directly between
//! components.

use std::sync::Arc;

use uuid::Uuid;

use astrovault_core::entity::{GearKind, LocationKind, SessionKind};
use astrovault_core::forms::{GearSelection, LocationSelection, SessionSelection, StepData};
use astrovault_core::snapshot::{Advance, WizardSnapshot};
use astrovault_core::steps::WizardStep;
use astrovault_events::{Notice, WizardBus, WizardEvent};
use astrovault_platform::{AuthContext, PlatformTransport};

use crate::assembler::SubmissionAssembler;
use crate::controller::{StepController, StepReport};
use crate::error::WizardError;
use crate::link_store::EntityLinkStore;

/// Notice published when the upload succeeds.
pub const SUBMIT_SUCCESS_MESSAGE: &str = "Your work has been uploaded successfully!";

/// Notice published when the upload fails; the wizard keeps all data.
pub const SUBMIT_FAILURE_MESSAGE: &str = "Error uploading your work. Please try again.";

/// Lifecycle of one wizard instance. `Submitted` is a read-only display
/// state with no transition back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    InProgress,
    Submitted,
}

/// Orchestrates one image submission from first step to upload.
pub struct SubmissionWizard {
    /// Correlates this instance's log lines and events.
    id: Uuid,
    snapshot: WizardSnapshot,
    state: WizardState,
    bus: WizardBus,
    auth: Arc<AuthContext>,
    assembler: SubmissionAssembler,
    locations: EntityLinkStore<LocationKind>,
    sessions: EntityLinkStore<SessionKind>,
    gear: EntityLinkStore<GearKind>,
}

impl SubmissionWizard {
    pub fn new(transport: Arc<dyn PlatformTransport>, auth: Arc<AuthContext>) -> Self {
        Self::with_bus(transport, auth, WizardBus::default())
    }

    /// Create a wizard publishing onto an existing bus (so observers can
    /// subscribe before anything happens).
    pub fn with_bus(
        transport: Arc<dyn PlatformTransport>,
        auth: Arc<AuthContext>,
        bus: WizardBus,
    ) -> Self {
        let locations =
            EntityLinkStore::new(Arc::clone(&transport), Arc::clone(&auth), bus.clone());
        let sessions =
            EntityLinkStore::new(Arc::clone(&transport), Arc::clone(&auth), bus.clone());
        let gear = EntityLinkStore::new(Arc::clone(&transport), Arc::clone(&auth), bus.clone());
        let assembler = SubmissionAssembler::new(transport);

        let wizard = Self {
            id: Uuid::new_v4(),
            snapshot: WizardSnapshot::new(),
            state: WizardState::InProgress,
            bus,
            auth,
            assembler,
            locations,
            sessions,
            gear,
        };
        tracing::info!(wizard_id = %wizard.id, "Submission wizard started");
        wizard
    }

    // ---- accessors ----

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bus(&self) -> &WizardBus {
        &self.bus
    }

    pub fn snapshot(&self) -> &WizardSnapshot {
        &self.snapshot
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    /// Whether every step has been passed (the terminal pseudo-step).
    pub fn is_complete(&self) -> bool {
        self.snapshot.is_complete()
    }

    pub fn locations(&self) -> &EntityLinkStore<LocationKind> {
        &self.locations
    }

    pub fn locations_mut(&mut self) -> &mut EntityLinkStore<LocationKind> {
        &mut self.locations
    }

    pub fn sessions(&self) -> &EntityLinkStore<SessionKind> {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut EntityLinkStore<SessionKind> {
        &mut self.sessions
    }

    pub fn gear(&self) -> &EntityLinkStore<GearKind> {
        &self.gear
    }

    pub fn gear_mut(&mut self) -> &mut EntityLinkStore<GearKind> {
        &mut self.gear
    }

    // ---- step data ----

    /// Seed value for (re-)entering a step: recorded data if present,
    /// else the step default, with cross-step identifiers injected. The
    /// propagation is re-derived from the snapshot on every call.
    pub fn initial_data(&self, step: WizardStep) -> StepData {
        self.snapshot.seed(step)
    }

    /// A controller for a plain data-entry step, seeded from the
    /// snapshot and publishing on this wizard's bus.
    pub fn controller(&self, step: WizardStep) -> StepController {
        StepController::new(step, self.initial_data(step), self.bus.clone())
    }

    /// Merge a step's reported `{data, is_valid}` into the snapshot. The
    /// reported flag is trusted as-is.
    pub fn record_step_change(&mut self, report: StepReport) {
        tracing::debug!(
            wizard_id = %self.id,
            step = ?report.step,
            is_valid = report.is_valid,
            "Step change recorded",
        );
        self.snapshot.record(report.step, report.data, report.is_valid);
    }

    /// Recompute the three entity-backed steps' data and validity from
    /// their stores. Call after any store mutation.
    pub fn sync_link_steps(&mut self) {
        let user_id = self.auth.cached();

        let location_valid = self.locations.validity();
        self.snapshot.record(
            WizardStep::LocationDetails,
            StepData::Location(LocationSelection {
                location: self.locations.selected().cloned(),
                user_id,
            }),
            location_valid,
        );
        self.bus
            .publish(WizardEvent::step_changed(WizardStep::LocationDetails, location_valid));

        let gear_valid = self.gear.validity();
        self.snapshot.record(
            WizardStep::GearDetails,
            StepData::Gear(GearSelection {
                selected: self.gear.selected_items().to_vec(),
                user_id,
            }),
            gear_valid,
        );
        self.bus
            .publish(WizardEvent::step_changed(WizardStep::GearDetails, gear_valid));

        let session_valid = self.sessions.validity();
        self.snapshot.record(
            WizardStep::SessionDetails,
            StepData::Session(SessionSelection {
                session: self.sessions.selected().cloned(),
                user_id,
            }),
            session_valid,
        );
        self.bus
            .publish(WizardEvent::step_changed(WizardStep::SessionDetails, session_valid));
    }

    // ---- navigation ----

    /// Advance one step if the current step's reported validity allows
    /// it. When blocked, a step-specific info notice is published and the
    /// position is unchanged.
    pub fn advance(&mut self) -> Advance {
        let outcome = self.snapshot.try_advance();
        match &outcome {
            Advance::Blocked { step, message } => {
                tracing::debug!(wizard_id = %self.id, step = ?step, "Advance blocked");
                self.bus.notify(Notice::info(*message));
            }
            Advance::Moved(next) => {
                let passed = self.snapshot.steps()[self.snapshot.current_index() - 1];
                tracing::debug!(wizard_id = %self.id, step = ?next, "Advanced");
                if let Some(message) = passed.success_message() {
                    self.bus.notify(Notice::success(message));
                }
                if *next == WizardStep::SessionDetails {
                    self.prepare_session_step();
                }
            }
            Advance::Completed => {
                tracing::debug!(wizard_id = %self.id, "All steps passed");
            }
        }
        outcome
    }

    /// Step back one step, unconditionally. Entered data is never
    /// cleared.
    pub fn retreat(&mut self) -> bool {
        let moved = self.snapshot.retreat();
        if moved {
            tracing::debug!(
                wizard_id = %self.id,
                index = self.snapshot.current_index(),
                "Retreated",
            );
        }
        moved
    }

    /// Point the session store at the selected location: filter the
    /// session list by it and prefill a location-less draft.
    fn prepare_session_step(&mut self) {
        if let Some(location_id) = self.snapshot.selected_location_id() {
            self.sessions
                .set_filter("location_id", location_id.to_string());
            let draft = self.sessions.draft_mut();
            if draft.location_id.is_none() {
                draft.location_id = Some(location_id);
            }
        }
    }

    // ---- submission ----

    /// Upload the finished submission. Only callable at the terminal
    /// pseudo-step. On failure every step's data is retained, so the user
    /// may retry without re-entering anything.
    pub async fn submit(&mut self) -> Result<(), WizardError> {
        if self.state == WizardState::Submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        if !self.snapshot.is_complete() {
            return Err(WizardError::NotReady);
        }

        match self.assembler.submit(&self.snapshot).await {
            Ok(()) => {
                self.state = WizardState::Submitted;
                self.bus.publish(WizardEvent::submission_completed());
                self.bus.notify(Notice::success(SUBMIT_SUCCESS_MESSAGE));
                tracing::info!(wizard_id = %self.id, "Submission uploaded");
                Ok(())
            }
            Err(err) => {
                self.bus
                    .publish(WizardEvent::submission_failed(err.to_string()));
                self.bus.notify(Notice::error(SUBMIT_FAILURE_MESSAGE));
                tracing::warn!(wizard_id = %self.id, %err, "Submission failed");
                Err(WizardError::Platform(err))
            }
        }
    }
}
