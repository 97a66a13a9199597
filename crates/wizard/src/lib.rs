//! `astrovault-wizard` -- orchestration layer of the submission engine.
//!
//! Composes the pure domain layer with the platform client: the generic
//! [`link_store::EntityLinkStore`] runs the select-or-create protocol for
//! locations, sessions and gear; [`controller::StepController`] owns each
//! plain step's form state; [`orchestrator::SubmissionWizard`] sequences
//! the steps and gates advancement; [`assembler::SubmissionAssembler`]
//! flattens the finished wizard into one multipart upload.

pub mod assembler;
pub mod controller;
pub mod error;
pub mod link_store;
pub mod orchestrator;

pub use assembler::{SubmissionAssembler, UPLOAD_PATH};
pub use controller::{StepController, StepReport};
pub use error::{StoreError, WizardError};
pub use link_store::{EntityLinkStore, SelectOutcome, ALREADY_SELECTED_MESSAGE};
pub use orchestrator::{
    SubmissionWizard, WizardState, SUBMIT_FAILURE_MESSAGE, SUBMIT_SUCCESS_MESSAGE,
};
