//! Submission payload flattening.
//!
//! Converts the aggregated [`WizardSnapshot`] into the multipart wire
//! shape the upload endpoint expects: binary parts under dotted
//! `group.field` keys (repeated per file) and string parts for every
//! scalar. The gear selection is the one multi-valued relation and is
//! serialized as a single JSON-encoded array part. Built once, at submit
//! time; never mutated in place.

use std::collections::BTreeMap;

use crate::forms::{FileRef, StepData};
use crate::snapshot::WizardSnapshot;
use crate::steps::WizardStep;

/// One binary part of the multipart submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Dotted wire key, e.g. `images.mainImage`. Repeated keys are
    /// allowed (one part per calibration frame).
    pub key: String,
    pub file: FileRef,
}

/// The flattened wire payload of one submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionPayload {
    pub files: Vec<FilePart>,
    pub fields: BTreeMap<String, String>,
}

impl SubmissionPayload {
    /// Flatten the snapshot into the wire payload.
    ///
    /// Steps with no recorded data contribute nothing; validity gating
    /// happened before submission, so no re-validation occurs here. The
    /// per-step validity markers are internal state and never appear as
    /// parts.
    pub fn from_snapshot(snapshot: &WizardSnapshot) -> SubmissionPayload {
        let mut payload = SubmissionPayload::default();

        if let Some(images) = snapshot.data(WizardStep::Images).and_then(StepData::as_images) {
            if let Some(main) = &images.main_image {
                payload.push_file("images.mainImage", main.clone());
            }
            for (key, frames) in images.frame_groups() {
                for frame in frames {
                    payload.push_file(format!("images.{key}"), frame.clone());
                }
            }
        }

        if let Some(details) = snapshot
            .data(WizardStep::ImageDetails)
            .and_then(StepData::as_image_details)
        {
            payload.set_field("imageDetails.selectedObjectType", &details.object_type);
            payload.set_field("imageDetails.selectedObjectName", &details.object_name);
            payload.set_field("imageDetails.title", &details.title);
            payload.set_field("imageDetails.description", &details.description);
            payload.set_field("imageDetails.iso", &details.iso);
            payload.set_field("imageDetails.exposure_time", &details.exposure_time);
            payload.set_field("imageDetails.focal_length", &details.focal_length);
            payload.set_field("imageDetails.focus_score", &details.focus_score);
            payload.set_field("imageDetails.aperture", &details.aperture);
            if let Some(captured) = details.capture_date_time {
                payload.set_field(
                    "imageDetails.capture_date_time",
                    captured.format("%Y-%m-%dT%H:%M:%S").to_string(),
                );
            }
            payload.set_field(
                "imageDetails.confirm_ownership",
                if details.confirm_ownership { "true" } else { "false" },
            );
        }

        if let Some(selection) = snapshot
            .data(WizardStep::LocationDetails)
            .and_then(StepData::as_location)
        {
            if let Some(location) = &selection.location {
                if let Some(id) = location.location_id {
                    payload.set_field("locationDetails.location_id", id.to_string());
                }
                payload.set_field("locationDetails.name", &location.name);
                if let Some(latitude) = location.latitude {
                    payload.set_field("locationDetails.latitude", latitude.to_string());
                }
                if let Some(longitude) = location.longitude {
                    payload.set_field("locationDetails.longitude", longitude.to_string());
                }
                payload.set_field(
                    "locationDetails.bortle_class",
                    location.bortle_class.to_string(),
                );
                payload.set_field("locationDetails.notes", &location.notes);
            }
            if let Some(user_id) = selection.user_id {
                payload.set_field("locationDetails.user_id", user_id.to_string());
            }
        }

        if let Some(selection) = snapshot
            .data(WizardStep::GearDetails)
            .and_then(StepData::as_gear)
        {
            // The gear relation is many-to-one from image to gear; the
            // backend expects exactly one JSON-encoded array value.
            let encoded = serde_json::to_string(&selection.selected)
                .unwrap_or_else(|_| "[]".to_string());
            payload.set_field("gearDetails.selectedGear", encoded);
            if let Some(user_id) = selection.user_id {
                payload.set_field("gearDetails.user_id", user_id.to_string());
            }
        }

        if let Some(selection) = snapshot
            .data(WizardStep::SessionDetails)
            .and_then(StepData::as_session)
        {
            if let Some(session) = &selection.session {
                if let Some(id) = session.session_id {
                    payload.set_field("sessionDetails.session_id", id.to_string());
                }
                if let Some(date) = session.session_date {
                    payload.set_field(
                        "sessionDetails.session_date",
                        date.format("%Y-%m-%d").to_string(),
                    );
                }
                payload.set_field(
                    "sessionDetails.weather_conditions",
                    &session.weather_conditions,
                );
                payload.set_field(
                    "sessionDetails.seeing_conditions",
                    &session.seeing_conditions,
                );
                payload.set_field("sessionDetails.moon_phase", &session.moon_phase);
                payload.set_field(
                    "sessionDetails.light_pollution_index",
                    session.light_pollution_index.to_string(),
                );
                if let Some(location_id) = session.location_id {
                    payload.set_field("sessionDetails.location_id", location_id.to_string());
                }
            }
            if let Some(user_id) = selection.user_id {
                payload.set_field("sessionDetails.user_id", user_id.to_string());
            }
        }

        payload
    }

    /// Total number of parts (binary + string) in the payload.
    pub fn part_count(&self) -> usize {
        self.files.len() + self.fields.len()
    }

    fn push_file(&mut self, key: impl Into<String>, file: FileRef) {
        self.files.push(FilePart {
            key: key.into(),
            file,
        });
    }

    fn set_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{GearItem, Location, ObservingSession};
    use crate::forms::{
        FileRef, GearSelection, ImageDetails, ImageSet, LocationSelection, SessionSelection,
    };
    use chrono::NaiveDate;

    fn full_snapshot() -> WizardSnapshot {
        let mut snapshot = WizardSnapshot::new();
        snapshot.record(
            WizardStep::Images,
            StepData::Images(ImageSet {
                main_image: Some(FileRef::new("m31.png", "image/png", vec![0xde, 0xad])),
                light_frames: vec![
                    FileRef::new("l1.fit", "application/fits", vec![1]),
                    FileRef::new("l2.fit", "application/fits", vec![2]),
                ],
                ..ImageSet::default()
            }),
            true,
        );
        snapshot.record(
            WizardStep::ImageDetails,
            StepData::ImageDetails(ImageDetails {
                object_type: "Galaxy".to_string(),
                object_name: "M31".to_string(),
                title: "Andromeda Galaxy".to_string(),
                description: "Two hours of integration".to_string(),
                iso: "3200".to_string(),
                exposure_time: "120".to_string(),
                focal_length: "480".to_string(),
                focus_score: "8".to_string(),
                aperture: "5.6".to_string(),
                capture_date_time: None,
                confirm_ownership: true,
            }),
            true,
        );
        snapshot.record(
            WizardStep::LocationDetails,
            StepData::Location(LocationSelection {
                location: Some(Location {
                    location_id: Some(42),
                    name: "Backyard".to_string(),
                    latitude: Some(40.7128),
                    longitude: Some(-74.006),
                    bortle_class: 6,
                    notes: String::new(),
                }),
                user_id: Some(9),
            }),
            true,
        );
        snapshot.record(
            WizardStep::GearDetails,
            StepData::Gear(GearSelection {
                selected: vec![GearItem {
                    gear_id: Some(3),
                    gear_type: "Camera".to_string(),
                    brand: "Canon".to_string(),
                    model: "90D".to_string(),
                }],
                user_id: Some(9),
            }),
            true,
        );
        snapshot.record(
            WizardStep::SessionDetails,
            StepData::Session(SessionSelection {
                session: Some(ObservingSession {
                    session_id: Some(11),
                    session_date: NaiveDate::from_ymd_opt(2024, 3, 1),
                    moon_phase: "New Moon".to_string(),
                    light_pollution_index: 6,
                    location_id: Some(42),
                    ..ObservingSession::default()
                }),
                user_id: Some(9),
            }),
            true,
        );
        snapshot
    }

    #[test]
    fn full_snapshot_flattens_to_the_expected_parts() {
        let payload = SubmissionPayload::from_snapshot(&full_snapshot());

        // Binary parts: main image plus one part per calibration frame.
        assert_eq!(payload.files.len(), 3);
        assert_eq!(payload.files[0].key, "images.mainImage");
        assert_eq!(payload.files[0].file.bytes, vec![0xde, 0xad]);
        assert_eq!(payload.files[1].key, "images.lightFrames");
        assert_eq!(payload.files[2].key, "images.lightFrames");

        // Scalar parts.
        assert_eq!(
            payload.fields["imageDetails.title"],
            "Andromeda Galaxy"
        );
        assert_eq!(payload.fields["imageDetails.confirm_ownership"], "true");
        assert_eq!(payload.fields["locationDetails.location_id"], "42");
        assert_eq!(payload.fields["sessionDetails.session_date"], "2024-03-01");
        assert_eq!(payload.fields["sessionDetails.location_id"], "42");

        // Gear is one JSON-encoded array part, not repeated parts.
        let gear_json = &payload.fields["gearDetails.selectedGear"];
        let parsed: Vec<GearItem> =
            serde_json::from_str(gear_json).expect("selectedGear should be a JSON array");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].gear_id, Some(3));
    }

    #[test]
    fn no_validity_marker_reaches_the_wire() {
        let payload = SubmissionPayload::from_snapshot(&full_snapshot());
        assert!(payload
            .fields
            .keys()
            .all(|key| !key.to_ascii_lowercase().contains("isvalid")));
    }

    #[test]
    fn untouched_steps_contribute_nothing() {
        let payload = SubmissionPayload::from_snapshot(&WizardSnapshot::new());
        assert!(payload.files.is_empty());
        assert!(payload.fields.is_empty());
        assert_eq!(payload.part_count(), 0);
    }

    #[test]
    fn absent_optional_values_are_omitted() {
        let mut snapshot = WizardSnapshot::new();
        snapshot.record(
            WizardStep::LocationDetails,
            StepData::Location(LocationSelection {
                location: Some(Location {
                    location_id: None,
                    name: "Draft site".to_string(),
                    ..Location::default()
                }),
                user_id: None,
            }),
            false,
        );

        let payload = SubmissionPayload::from_snapshot(&snapshot);
        assert!(!payload.fields.contains_key("locationDetails.location_id"));
        assert!(!payload.fields.contains_key("locationDetails.latitude"));
        assert!(!payload.fields.contains_key("locationDetails.user_id"));
        assert_eq!(payload.fields["locationDetails.name"], "Draft site");
    }
}
