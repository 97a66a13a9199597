//! Error types for the orchestration layer.

use astrovault_platform::PlatformError;

/// A failed entity store operation.
///
/// `Display` renders the user-facing message; callers surface it inline
/// next to the offending step and never let it escape as a panic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The draft is incomplete; every missing field is named. No network
    /// call was made.
    #[error("Please complete the required fields: {}", .missing.join(", "))]
    Validation { missing: Vec<&'static str> },

    /// The platform call failed (auth, transport or backend).
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// A failed wizard-level operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    /// `submit` was called before every step was passed.
    #[error("The wizard is not ready to submit. Finish all steps first.")]
    NotReady,

    /// `submit` was called on an already-submitted wizard.
    #[error("This submission has already been uploaded.")]
    AlreadySubmitted,

    /// The upload failed; all step data is retained for retry.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}
