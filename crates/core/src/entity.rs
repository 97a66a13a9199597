//! Linkable entity records and their schemas.
//!
//! A [`Location`], [`ObservingSession`] or [`GearItem`] is referenced by id
//! from an image submission rather than embedded in it. A record with a
//! `None` id is a draft that has not been persisted yet; the backend
//! assigns the id on create.
//!
//! Each kind implements [`EntityKind`], which packages the REST collection
//! path, the id wire key, the empty draft and the completeness rule. The
//! generic entity store is parameterized over this trait instead of being
//! written once per entity.

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

use crate::types::DbId;

/// Equipment type labels offered by the platform.
pub const GEAR_TYPES: [&str; 7] = [
    "Camera",
    "Lens",
    "Telescope",
    "Mount",
    "Filter",
    "Software",
    "Other",
];

/// Moon phase labels offered for imaging sessions.
pub const MOON_PHASES: [&str; 8] = [
    "New Moon",
    "Waxing Crescent",
    "First Quarter",
    "Waxing Gibbous",
    "Full Moon",
    "Waning Gibbous",
    "Last Quarter",
    "Waning Crescent",
];

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// An observing location (dark-sky site, backyard, observatory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub location_id: Option<DbId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Bortle dark-sky class, 1 (excellent) through 9 (inner city).
    #[serde(default = "default_scale_index")]
    pub bortle_class: u8,
    #[serde(default)]
    pub notes: String,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            location_id: None,
            name: String::new(),
            latitude: None,
            longitude: None,
            bortle_class: 1,
            notes: String::new(),
        }
    }
}

/// An imaging session: one night (or stretch) of capturing at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservingSession {
    #[serde(default)]
    pub session_id: Option<DbId>,
    #[serde(default)]
    pub session_date: Option<NaiveDate>,
    #[serde(default)]
    pub weather_conditions: String,
    #[serde(default)]
    pub seeing_conditions: String,
    #[serde(default)]
    pub moon_phase: String,
    /// Light pollution on the Bortle scale, 1 through 9.
    #[serde(default = "default_scale_index")]
    pub light_pollution_index: u8,
    #[serde(default)]
    pub location_id: Option<DbId>,
}

impl Default for ObservingSession {
    fn default() -> Self {
        Self {
            session_id: None,
            session_date: None,
            weather_conditions: String::new(),
            seeing_conditions: String::new(),
            moon_phase: String::new(),
            light_pollution_index: 1,
            location_id: None,
        }
    }
}

/// A piece of imaging equipment (camera, telescope, mount, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GearItem {
    #[serde(default)]
    pub gear_id: Option<DbId>,
    #[serde(default)]
    pub gear_type: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
}

fn default_scale_index() -> u8 {
    1
}

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// Schema-as-configuration for one linkable entity kind.
///
/// Implemented by zero-sized marker types ([`LocationKind`], [`SessionKind`],
/// [`GearKind`]). The entity store reads everything kind-specific from here:
/// endpoints, id handling, the empty draft and the completeness rule.
pub trait EntityKind: Send + Sync + 'static {
    /// Singular entity label used in log lines and events.
    const ENTITY: &'static str;

    /// REST collection path, e.g. `/locations`.
    const COLLECTION: &'static str;

    /// Wire key of the primary id, e.g. `location_id`.
    const ID_KEY: &'static str;

    /// Whether the selection is a set (gear) or a single record.
    const MULTI_SELECT: bool;

    /// The record type managed by this kind.
    type Record: Clone
        + PartialEq
        + std::fmt::Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// The record's id, or `None` for a draft.
    fn id(record: &Self::Record) -> Option<DbId>;

    /// Mark the record persisted under the given id.
    fn set_id(record: &mut Self::Record, id: DbId);

    /// A fresh draft with all fields at their defaults.
    fn empty_draft() -> Self::Record;

    /// Names of required fields absent from the record. Empty means the
    /// record is complete enough to persist.
    fn missing_fields(record: &Self::Record) -> Vec<&'static str>;

    /// JSON body for create/update calls: the entity's wire fields plus
    /// the owning `user_id`. The id key is never part of the body.
    fn request_body(record: &Self::Record, user_id: DbId) -> serde_json::Value;
}

/// Marker for the Location entity kind.
pub struct LocationKind;

/// Marker for the ObservingSession entity kind.
pub struct SessionKind;

/// Marker for the GearItem entity kind.
pub struct GearKind;

impl EntityKind for LocationKind {
    const ENTITY: &'static str = "location";
    const COLLECTION: &'static str = "/locations";
    const ID_KEY: &'static str = "location_id";
    const MULTI_SELECT: bool = false;

    type Record = Location;

    fn id(record: &Location) -> Option<DbId> {
        record.location_id
    }

    fn set_id(record: &mut Location, id: DbId) {
        record.location_id = Some(id);
    }

    fn empty_draft() -> Location {
        Location::default()
    }

    fn missing_fields(record: &Location) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if record.name.trim().is_empty() {
            missing.push("name");
        }
        missing
    }

    fn request_body(record: &Location, user_id: DbId) -> serde_json::Value {
        json!({
            "name": record.name,
            "latitude": record.latitude,
            "longitude": record.longitude,
            "bortle_class": record.bortle_class,
            "notes": record.notes,
            "user_id": user_id,
        })
    }
}

impl EntityKind for SessionKind {
    const ENTITY: &'static str = "session";
    const COLLECTION: &'static str = "/sessions";
    const ID_KEY: &'static str = "session_id";
    const MULTI_SELECT: bool = false;

    type Record = ObservingSession;

    fn id(record: &ObservingSession) -> Option<DbId> {
        record.session_id
    }

    fn set_id(record: &mut ObservingSession, id: DbId) {
        record.session_id = Some(id);
    }

    fn empty_draft() -> ObservingSession {
        ObservingSession::default()
    }

    fn missing_fields(record: &ObservingSession) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if record.session_date.is_none() {
            missing.push("session_date");
        }
        if record.location_id.is_none() {
            missing.push("location_id");
        }
        missing
    }

    fn request_body(record: &ObservingSession, user_id: DbId) -> serde_json::Value {
        json!({
            "session_date": record
                .session_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
            "weather_conditions": record.weather_conditions,
            "seeing_conditions": record.seeing_conditions,
            "moon_phase": record.moon_phase,
            "light_pollution_index": record.light_pollution_index,
            "location_id": record.location_id,
            "user_id": user_id,
        })
    }
}

impl EntityKind for GearKind {
    const ENTITY: &'static str = "gear";
    const COLLECTION: &'static str = "/gear";
    const ID_KEY: &'static str = "gear_id";
    const MULTI_SELECT: bool = true;

    type Record = GearItem;

    fn id(record: &GearItem) -> Option<DbId> {
        record.gear_id
    }

    fn set_id(record: &mut GearItem, id: DbId) {
        record.gear_id = Some(id);
    }

    fn empty_draft() -> GearItem {
        GearItem::default()
    }

    fn missing_fields(record: &GearItem) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if record.gear_type.trim().is_empty() {
            missing.push("gear_type");
        }
        if record.brand.trim().is_empty() {
            missing.push("brand");
        }
        if record.model.trim().is_empty() {
            missing.push("model");
        }
        missing
    }

    fn request_body(record: &GearItem, user_id: DbId) -> serde_json::Value {
        json!({
            "gear_type": record.gear_type,
            "brand": record.brand,
            "model": record.model,
            "user_id": user_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -- completeness rules --

    #[test]
    fn location_requires_name() {
        let mut draft = LocationKind::empty_draft();
        assert_eq!(LocationKind::missing_fields(&draft), vec!["name"]);

        draft.name = "   ".to_string();
        assert_eq!(LocationKind::missing_fields(&draft), vec!["name"]);

        draft.name = "Backyard".to_string();
        assert!(LocationKind::missing_fields(&draft).is_empty());
    }

    #[test]
    fn session_requires_date_and_location() {
        let mut draft = SessionKind::empty_draft();
        assert_eq!(
            SessionKind::missing_fields(&draft),
            vec!["session_date", "location_id"]
        );

        draft.session_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert_eq!(SessionKind::missing_fields(&draft), vec!["location_id"]);

        draft.location_id = Some(7);
        assert!(SessionKind::missing_fields(&draft).is_empty());
    }

    #[test]
    fn gear_requires_type_brand_model() {
        let draft = GearKind::empty_draft();
        assert_eq!(
            GearKind::missing_fields(&draft),
            vec!["gear_type", "brand", "model"]
        );

        let item = GearItem {
            gear_id: None,
            gear_type: "Camera".to_string(),
            brand: "ZWO".to_string(),
            model: "ASI2600MC".to_string(),
        };
        assert!(GearKind::missing_fields(&item).is_empty());
    }

    // -- wire shapes --

    #[test]
    fn location_deserializes_from_sparse_server_json() {
        let location: Location =
            serde_json::from_value(json!({ "location_id": 7, "name": "Backyard" }))
                .expect("sparse location JSON should parse");
        assert_eq!(location.location_id, Some(7));
        assert_eq!(location.name, "Backyard");
        assert_eq!(location.bortle_class, 1);
        assert!(location.latitude.is_none());
    }

    #[test]
    fn request_bodies_exclude_the_id_key() {
        let mut location = Location::default();
        location.location_id = Some(42);
        location.name = "Ridge".to_string();
        let body = LocationKind::request_body(&location, 9);
        assert!(body.get("location_id").is_none());
        assert_eq!(body["name"], "Ridge");
        assert_eq!(body["user_id"], 9);

        let mut session = ObservingSession::default();
        session.session_id = Some(3);
        session.session_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        session.location_id = Some(42);
        let body = SessionKind::request_body(&session, 9);
        assert!(body.get("session_id").is_none());
        assert_eq!(body["session_date"], "2024-03-01");
        assert_eq!(body["location_id"], 42);

        let gear = GearItem {
            gear_id: Some(3),
            gear_type: "Mount".to_string(),
            brand: "Sky-Watcher".to_string(),
            model: "EQ6-R Pro".to_string(),
        };
        let body = GearKind::request_body(&gear, 9);
        assert!(body.get("gear_id").is_none());
        assert_eq!(body["model"], "EQ6-R Pro");
    }

    #[test]
    fn gear_item_serializes_all_fields() {
        let gear = GearItem {
            gear_id: Some(3),
            gear_type: "Camera".to_string(),
            brand: "Canon".to_string(),
            model: "90D".to_string(),
        };
        let value = serde_json::to_value(&gear).expect("gear should serialize");
        assert_eq!(value["gear_id"], 3);
        assert_eq!(value["gear_type"], "Camera");
    }

    #[test]
    fn catalog_constants_are_nonempty() {
        assert!(GEAR_TYPES.contains(&"Telescope"));
        assert!(MOON_PHASES.contains(&"Full Moon"));
    }
}
