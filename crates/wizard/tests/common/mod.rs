//! Shared in-memory platform fake for the wizard integration tests.
//!
//! Implements [`PlatformTransport`] over plain JSON tables so the full
//! select-or-create protocol and the multipart submission can be
//! exercised without a network. Every request is recorded, and the next
//! request can be primed to fail.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use astrovault_core::payload::SubmissionPayload;
use astrovault_core::types::DbId;
use astrovault_platform::{PlatformError, PlatformTransport};

/// Mutable backend state behind the fake transport.
#[derive(Default)]
pub struct FakeState {
    pub locations: Vec<Value>,
    pub sessions: Vec<Value>,
    pub gear: Vec<Value>,
    pub image_gear: HashMap<DbId, Vec<DbId>>,
    pub next_id: DbId,
    pub user_id: DbId,
    pub uploads: Vec<SubmissionPayload>,
    pub fail_next: Option<PlatformError>,
    pub calls: Vec<String>,
}

pub struct FakePlatform {
    state: Mutex<FakeState>,
}

impl FakePlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState {
                next_id: 1,
                user_id: 9,
                ..FakeState::default()
            }),
        })
    }

    /// Mutate the backend state directly (seeding, id control).
    pub fn seed(&self, mutate: impl FnOnce(&mut FakeState)) {
        mutate(&mut self.state.lock().unwrap());
    }

    /// Prime the next request to fail with the given error.
    pub fn fail_next(&self, error: PlatformError) {
        self.state.lock().unwrap().fail_next = Some(error);
    }

    /// Every request made so far, as `"METHOD /path"` strings.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn uploads(&self) -> Vec<SubmissionPayload> {
        self.state.lock().unwrap().uploads.clone()
    }

    fn begin(&self, call: String) -> Result<MutexGuard<'_, FakeState>, PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if let Some(err) = state.fail_next.take() {
            return Err(err);
        }
        Ok(state)
    }
}

fn id_key_for(collection: &str) -> Option<&'static str> {
    match collection {
        "/locations" => Some("location_id"),
        "/sessions" => Some("session_id"),
        "/gear" => Some("gear_id"),
        _ => None,
    }
}

fn list_for<'a>(state: &'a mut FakeState, collection: &str) -> Option<&'a mut Vec<Value>> {
    match collection {
        "/locations" => Some(&mut state.locations),
        "/sessions" => Some(&mut state.sessions),
        "/gear" => Some(&mut state.gear),
        _ => None,
    }
}

fn split_item_path(path: &str) -> Option<(&str, DbId)> {
    let (collection, id) = path.rsplit_once('/')?;
    Some((collection, id.parse().ok()?))
}

fn image_gear_path(path: &str) -> Option<DbId> {
    let rest = path.strip_prefix("/images/")?;
    let (image_id, tail) = rest.split_once('/')?;
    if tail != "gear" {
        return None;
    }
    image_id.parse().ok()
}

fn not_found(path: &str) -> PlatformError {
    PlatformError::Server {
        status: 404,
        message: format!("Unknown path {path}"),
    }
}

fn id_response(id_key: &str, id: DbId) -> Value {
    let mut map = Map::new();
    map.insert(id_key.to_string(), json!(id));
    Value::Object(map)
}

fn matches_query(item: &Value, key: &str, expected: &str) -> bool {
    match item.get(key) {
        Some(Value::Number(n)) => n.to_string() == expected,
        Some(Value::String(s)) => s == expected,
        _ => false,
    }
}

#[async_trait]
impl PlatformTransport for FakePlatform {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, PlatformError> {
        let mut state = self.begin(format!("GET {path}"))?;

        if path == "/user_id" {
            return Ok(json!({ "user_id": state.user_id }));
        }

        if let Some(image_id) = image_gear_path(path) {
            let ids = state.image_gear.get(&image_id).cloned().unwrap_or_default();
            let items: Vec<Value> = state
                .gear
                .iter()
                .filter(|item| {
                    item.get("gear_id")
                        .and_then(Value::as_i64)
                        .map_or(false, |id| ids.contains(&id))
                })
                .cloned()
                .collect();
            return Ok(Value::Array(items));
        }

        match list_for(&mut state, path) {
            Some(list) => {
                let mut items = list.clone();
                for (key, expected) in query {
                    items.retain(|item| matches_query(item, key, expected));
                }
                Ok(Value::Array(items))
            }
            None => Err(not_found(path)),
        }
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, PlatformError> {
        let mut state = self.begin(format!("POST {path}"))?;

        if let Some(image_id) = image_gear_path(path) {
            let ids: Vec<DbId> = body
                .get("gear_ids")
                .and_then(Value::as_array)
                .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
                .unwrap_or_default();
            state.image_gear.insert(image_id, ids);
            return Ok(json!({}));
        }

        let Some(id_key) = id_key_for(path) else {
            return Err(not_found(path));
        };
        let id = state.next_id;
        state.next_id += 1;

        let mut record = body.clone();
        record[id_key] = json!(id);
        match list_for(&mut state, path) {
            Some(list) => list.push(record),
            None => return Err(not_found(path)),
        }
        Ok(id_response(id_key, id))
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value, PlatformError> {
        let mut state = self.begin(format!("PUT {path}"))?;

        let Some((collection, id)) = split_item_path(path) else {
            return Err(not_found(path));
        };
        let Some(id_key) = id_key_for(collection) else {
            return Err(not_found(path));
        };
        let Some(list) = list_for(&mut state, collection) else {
            return Err(not_found(path));
        };

        for item in list.iter_mut() {
            if item.get(id_key).and_then(Value::as_i64) == Some(id) {
                let mut record = body.clone();
                record[id_key] = json!(id);
                *item = record;
                return Ok(id_response(id_key, id));
            }
        }
        Err(PlatformError::Server {
            status: 404,
            message: format!("No {id_key} {id}"),
        })
    }

    async fn delete(&self, path: &str) -> Result<(), PlatformError> {
        let mut state = self.begin(format!("DELETE {path}"))?;

        let Some((collection, id)) = split_item_path(path) else {
            return Err(not_found(path));
        };
        let Some(id_key) = id_key_for(collection) else {
            return Err(not_found(path));
        };
        let Some(list) = list_for(&mut state, collection) else {
            return Err(not_found(path));
        };

        let before = list.len();
        list.retain(|item| item.get(id_key).and_then(Value::as_i64) != Some(id));
        if list.len() == before {
            return Err(PlatformError::Server {
                status: 404,
                message: format!("No {id_key} {id}"),
            });
        }
        Ok(())
    }

    async fn upload(&self, path: &str, payload: &SubmissionPayload) -> Result<(), PlatformError> {
        let mut state = self.begin(format!("POST {path}"))?;
        state.uploads.push(payload.clone());
        Ok(())
    }
}
