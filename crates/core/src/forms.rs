//! Step-local form payloads.
//!
//! Each wizard step owns a bounded subset of the submission's data. The
//! [`StepData`] enum carries one typed payload per step; the orchestrator
//! stores these in the snapshot and step controllers mutate them.

use chrono::NaiveDateTime;

use crate::entity::{GearItem, Location, ObservingSession};
use crate::error::CoreError;
use crate::steps::WizardStep;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// FileRef
// ---------------------------------------------------------------------------

/// An attached binary file. The bytes stay in memory until submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileRef {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-step payloads
// ---------------------------------------------------------------------------

/// Files captured on the image upload step: the processed main image plus
/// optional calibration frame sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSet {
    pub main_image: Option<FileRef>,
    pub light_frames: Vec<FileRef>,
    pub dark_frames: Vec<FileRef>,
    pub flat_frames: Vec<FileRef>,
    pub bias_frames: Vec<FileRef>,
    pub dark_flats: Vec<FileRef>,
}

impl ImageSet {
    /// Calibration frame groups and their wire keys, in submission order.
    pub fn frame_groups(&self) -> [(&'static str, &[FileRef]); 5] {
        [
            ("lightFrames", self.light_frames.as_slice()),
            ("darkFrames", self.dark_frames.as_slice()),
            ("flatFrames", self.flat_frames.as_slice()),
            ("biasFrames", self.bias_frames.as_slice()),
            ("darkFlats", self.dark_flats.as_slice()),
        ]
    }
}

/// Typed metadata captured on the image details step. Numeric capture
/// settings stay strings here; they are transmitted verbatim as form
/// fields and the backend owns their interpretation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageDetails {
    pub object_type: String,
    pub object_name: String,
    pub title: String,
    pub description: String,
    pub iso: String,
    pub exposure_time: String,
    pub focal_length: String,
    pub focus_score: String,
    pub aperture: String,
    pub capture_date_time: Option<NaiveDateTime>,
    pub confirm_ownership: bool,
}

/// The location step's state: the selected (or freshly created) location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationSelection {
    pub location: Option<Location>,
    pub user_id: Option<DbId>,
}

/// The gear step's state: the set of equipment attached to the image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GearSelection {
    pub selected: Vec<GearItem>,
    pub user_id: Option<DbId>,
}

impl GearSelection {
    /// Whether a persisted gear item with this id is already attached.
    pub fn contains(&self, id: DbId) -> bool {
        self.selected.iter().any(|item| item.gear_id == Some(id))
    }

    /// Attach a gear item, enforcing uniqueness by id. Attaching an item
    /// whose id is already present is a recoverable conflict and performs
    /// no mutation.
    pub fn add(&mut self, item: GearItem) -> Result<(), CoreError> {
        if let Some(id) = item.gear_id {
            if self.contains(id) {
                return Err(CoreError::Conflict(
                    "This equipment is already added to the image.".to_string(),
                ));
            }
        }
        self.selected.push(item);
        Ok(())
    }

    /// Detach by id. Returns whether anything was removed.
    pub fn remove(&mut self, id: DbId) -> bool {
        let before = self.selected.len();
        self.selected.retain(|item| item.gear_id != Some(id));
        self.selected.len() != before
    }

    /// Replace an attached item carrying the same id, if present.
    pub fn replace(&mut self, item: &GearItem) {
        for existing in &mut self.selected {
            if existing.gear_id.is_some() && existing.gear_id == item.gear_id {
                *existing = item.clone();
            }
        }
    }
}

/// The session step's state: the selected (or freshly created) session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSelection {
    pub session: Option<ObservingSession>,
    pub user_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// StepData
// ---------------------------------------------------------------------------

/// One typed payload per wizard step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepData {
    Images(ImageSet),
    ImageDetails(ImageDetails),
    Location(LocationSelection),
    Gear(GearSelection),
    Session(SessionSelection),
}

impl StepData {
    /// The step this payload belongs to.
    pub fn step(&self) -> WizardStep {
        match self {
            Self::Images(_) => WizardStep::Images,
            Self::ImageDetails(_) => WizardStep::ImageDetails,
            Self::Location(_) => WizardStep::LocationDetails,
            Self::Gear(_) => WizardStep::GearDetails,
            Self::Session(_) => WizardStep::SessionDetails,
        }
    }

    /// The empty payload for a step.
    pub fn default_for(step: WizardStep) -> StepData {
        match step {
            WizardStep::Images => Self::Images(ImageSet::default()),
            WizardStep::ImageDetails => Self::ImageDetails(ImageDetails::default()),
            WizardStep::LocationDetails => Self::Location(LocationSelection::default()),
            WizardStep::GearDetails => Self::Gear(GearSelection::default()),
            WizardStep::SessionDetails => Self::Session(SessionSelection::default()),
        }
    }

    pub fn as_images(&self) -> Option<&ImageSet> {
        match self {
            Self::Images(images) => Some(images),
            _ => None,
        }
    }

    pub fn as_image_details(&self) -> Option<&ImageDetails> {
        match self {
            Self::ImageDetails(details) => Some(details),
            _ => None,
        }
    }

    pub fn as_location(&self) -> Option<&LocationSelection> {
        match self {
            Self::Location(selection) => Some(selection),
            _ => None,
        }
    }

    pub fn as_gear(&self) -> Option<&GearSelection> {
        match self {
            Self::Gear(selection) => Some(selection),
            _ => None,
        }
    }

    pub fn as_session(&self) -> Option<&SessionSelection> {
        match self {
            Self::Session(selection) => Some(selection),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
