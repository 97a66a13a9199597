//! Step validity predicates.
//!
//! Pure functions, one per step kind, evaluated by the step controllers on
//! every change and reported upward. The orchestrator never re-validates:
//! it trusts the flag reported with each change, which makes these
//! predicates the single place where step completeness is defined (and the
//! reason each is unit-tested in isolation here).

use crate::forms::{
    GearSelection, ImageDetails, ImageSet, LocationSelection, SessionSelection, StepData,
};

/// The image upload step is complete once a main observation image exists.
pub fn images_valid(images: &ImageSet) -> bool {
    images.main_image.is_some()
}

/// The image details step requires the classification fields, the key
/// capture settings and an explicit ownership confirmation.
pub fn image_details_valid(details: &ImageDetails) -> bool {
    !details.object_type.trim().is_empty()
        && !details.object_name.trim().is_empty()
        && !details.title.trim().is_empty()
        && !details.iso.trim().is_empty()
        && !details.focal_length.trim().is_empty()
        && !details.aperture.trim().is_empty()
        && details.confirm_ownership
}

/// The location step requires a persisted location to be selected.
pub fn location_valid(selection: &LocationSelection) -> bool {
    selection
        .location
        .as_ref()
        .map_or(false, |location| location.location_id.is_some())
}

/// The gear step requires at least one attached equipment item.
pub fn gear_valid(selection: &GearSelection) -> bool {
    !selection.selected.is_empty()
}

/// The session step requires a persisted session to be selected.
pub fn session_valid(selection: &SessionSelection) -> bool {
    selection
        .session
        .as_ref()
        .map_or(false, |session| session.session_id.is_some())
}

/// Evaluate the predicate matching the payload's step.
pub fn validate(data: &StepData) -> bool {
    match data {
        StepData::Images(images) => images_valid(images),
        StepData::ImageDetails(details) => image_details_valid(details),
        StepData::Location(selection) => location_valid(selection),
        StepData::Gear(selection) => gear_valid(selection),
        StepData::Session(selection) => session_valid(selection),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
