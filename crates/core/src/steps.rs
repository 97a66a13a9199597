//! Wizard step definitions and step-level user messages.
//!
//! The submission wizard walks through a fixed sequence of five steps.
//! Each step carries a display label, the message shown when advancement
//! is blocked on incomplete data, and (for some steps) a success message
//! shown once the step is passed.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Total number of steps in the submission wizard.
pub const STEP_COUNT: usize = 5;

/// The five submission wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Images,
    ImageDetails,
    LocationDetails,
    GearDetails,
    SessionDetails,
}

impl WizardStep {
    /// All steps in wizard order.
    pub const ALL: [WizardStep; STEP_COUNT] = [
        WizardStep::Images,
        WizardStep::ImageDetails,
        WizardStep::LocationDetails,
        WizardStep::GearDetails,
        WizardStep::SessionDetails,
    ];

    /// Convert a 0-based index into a step.
    pub fn from_index(index: usize) -> Result<Self, CoreError> {
        Self::ALL.get(index).copied().ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid step index {index}. Must be below {STEP_COUNT}"
            ))
        })
    }

    /// 0-based position of the step in the wizard.
    pub fn index(self) -> usize {
        match self {
            Self::Images => 0,
            Self::ImageDetails => 1,
            Self::LocationDetails => 2,
            Self::GearDetails => 3,
            Self::SessionDetails => 4,
        }
    }

    /// Human-readable label for the step.
    pub fn label(self) -> &'static str {
        match self {
            Self::Images => "Image Upload",
            Self::ImageDetails => "Image Details",
            Self::LocationDetails => "Location details",
            Self::GearDetails => "Gear details",
            Self::SessionDetails => "Session details",
        }
    }

    /// Message shown when `advance` is blocked because this step's data
    /// is incomplete.
    pub fn blocking_message(self) -> &'static str {
        match self {
            Self::Images => "Please upload a main observation image to continue.",
            Self::ImageDetails => {
                "Please fill in all required fields in Image Details to continue."
            }
            Self::LocationDetails => "Please select or create a location to continue.",
            Self::GearDetails => "Please add at least one equipment item to continue.",
            Self::SessionDetails => "Please select or create a session to continue.",
        }
    }

    /// Success message shown when the wizard advances past this step,
    /// where one is defined.
    pub fn success_message(self) -> Option<&'static str> {
        match self {
            Self::ImageDetails => Some("Image details saved successfully!"),
            Self::LocationDetails => Some("Location details saved successfully!"),
            Self::GearDetails => Some("Gear details saved successfully!"),
            Self::Images | Self::SessionDetails => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
