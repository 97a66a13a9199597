//! Generic "select an existing entity or create a new one" store.
//!
//! [`EntityLinkStore`] implements the recurring browse / select / create /
//! edit / delete protocol against the platform REST API once, decoupled
//! from the entity kind through [`EntityKind`]. Locations and sessions use
//! single selection; gear keeps a selection set with uniqueness by id.
//!
//! Every mutating operation takes `&mut self`, so two mutations on one
//! store can never be in flight at the same time. After a successful
//! mutation the store re-fetches the full entity list; the cached list is
//! only trusted when it reflects server truth.

use std::sync::Arc;

use serde_json::json;

use astrovault_core::entity::{EntityKind, GearItem, GearKind};
use astrovault_core::types::DbId;
use astrovault_events::{Notice, WizardBus, WizardEvent};
use astrovault_platform::{AuthContext, PlatformError, PlatformTransport};

use crate::error::StoreError;

/// Message reported when a gear item is attached a second time.
pub const ALREADY_SELECTED_MESSAGE: &str = "This equipment is already added to the image.";

/// Outcome of [`EntityLinkStore::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The entity is now (part of) the selection.
    Selected,
    /// Multi-selection only: the id was already attached. A recoverable
    /// conflict; nothing changed.
    AlreadySelected,
}

enum SelectionState<K: EntityKind> {
    Single(Option<K::Record>),
    Multi(Vec<K::Record>),
}

/// One entity kind's list, selection and active draft.
pub struct EntityLinkStore<K: EntityKind> {
    transport: Arc<dyn PlatformTransport>,
    auth: Arc<AuthContext>,
    bus: WizardBus,
    entities: Vec<K::Record>,
    selection: SelectionState<K>,
    draft: K::Record,
    filter: Vec<(String, String)>,
    last_error: Option<String>,
}

impl<K: EntityKind> EntityLinkStore<K> {
    pub fn new(
        transport: Arc<dyn PlatformTransport>,
        auth: Arc<AuthContext>,
        bus: WizardBus,
    ) -> Self {
        Self {
            transport,
            auth,
            bus,
            entities: Vec::new(),
            selection: if K::MULTI_SELECT {
                SelectionState::Multi(Vec::new())
            } else {
                SelectionState::Single(None)
            },
            draft: K::empty_draft(),
            filter: Vec::new(),
            last_error: None,
        }
    }

    // ---- accessors ----

    /// The cached entity list, as of the last successful refresh.
    pub fn entities(&self) -> &[K::Record] {
        &self.entities
    }

    /// The single selection, if any. Always `None` for multi-selection
    /// kinds; use [`selected_items`](Self::selected_items) there.
    pub fn selected(&self) -> Option<&K::Record> {
        match &self.selection {
            SelectionState::Single(current) => current.as_ref(),
            SelectionState::Multi(_) => None,
        }
    }

    /// The selection as a slice: zero or one record for single-selection
    /// kinds, the whole selection set for gear.
    pub fn selected_items(&self) -> &[K::Record] {
        match &self.selection {
            SelectionState::Single(Some(record)) => std::slice::from_ref(record),
            SelectionState::Single(None) => &[],
            SelectionState::Multi(set) => set,
        }
    }

    /// The active draft being edited.
    pub fn draft(&self) -> &K::Record {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut K::Record {
        &mut self.draft
    }

    pub fn set_draft(&mut self, record: K::Record) {
        self.draft = record;
    }

    /// The last user-facing error, surfaced inline by the embedding.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Restrict the entity list (e.g. sessions by `location_id`). Applies
    /// from the next refresh on.
    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.filter.retain(|(existing, _)| *existing != key);
        self.filter.push((key, value.into()));
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
    }

    /// Whether this store satisfies its wizard step: a persisted record is
    /// selected (single), or the selection set is non-empty (multi).
    pub fn validity(&self) -> bool {
        match &self.selection {
            SelectionState::Single(current) => {
                current.as_ref().map_or(false, |record| K::id(record).is_some())
            }
            SelectionState::Multi(set) => !set.is_empty(),
        }
    }

    // ---- protocol ----

    /// Fetch all entities owned by the current user (honoring the filter)
    /// and replace the cached list.
    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        let filter = self.filter.clone();
        let result = self.transport.get(K::COLLECTION, &filter).await;
        let value = match result {
            Ok(value) => value,
            Err(err) => return Err(self.surface(err)),
        };
        let entities: Vec<K::Record> = match serde_json::from_value(value) {
            Ok(entities) => entities,
            Err(err) => {
                let err = PlatformError::Network(format!(
                    "Malformed {} list response: {err}",
                    K::ENTITY
                ));
                return Err(self.surface(err));
            }
        };
        tracing::debug!(entity = K::ENTITY, count = entities.len(), "Entity list refreshed");
        self.entities = entities;
        self.last_error = None;
        Ok(())
    }

    /// Make an existing entity the current selection.
    ///
    /// Single selection replaces both the selection and the draft, so the
    /// record is immediately editable. Repeating the same selection is
    /// idempotent. Multi selection appends to the selection set unless the
    /// id is already attached, which is reported as a conflict and
    /// performs no mutation.
    pub fn select(&mut self, entity: K::Record) -> SelectOutcome {
        match &mut self.selection {
            SelectionState::Single(current) => {
                self.draft = entity.clone();
                *current = Some(entity);
                self.last_error = None;
                SelectOutcome::Selected
            }
            SelectionState::Multi(set) => {
                if let Some(id) = K::id(&entity) {
                    if set.iter().any(|existing| K::id(existing) == Some(id)) {
                        self.last_error = Some(ALREADY_SELECTED_MESSAGE.to_string());
                        self.bus.notify(Notice::error(ALREADY_SELECTED_MESSAGE));
                        return SelectOutcome::AlreadySelected;
                    }
                }
                set.push(entity);
                self.last_error = None;
                SelectOutcome::Selected
            }
        }
    }

    /// Detach an entity from the selection set by id. Multi-selection
    /// only; a no-op (returning `false`) when the id is absent or the
    /// kind uses single selection.
    pub fn deselect(&mut self, id: DbId) -> bool {
        match &mut self.selection {
            SelectionState::Single(_) => false,
            SelectionState::Multi(set) => {
                let before = set.len();
                set.retain(|existing| K::id(existing) != Some(id));
                set.len() != before
            }
        }
    }

    /// Begin a fresh draft, discarding whatever was being edited. For
    /// single-selection kinds this also clears the selection, since the
    /// draft is the record the step links.
    pub fn start_create(&mut self) {
        self.draft = K::empty_draft();
        if let SelectionState::Single(current) = &mut self.selection {
            *current = None;
        }
        self.last_error = None;
    }

    /// Persist the active draft.
    ///
    /// An incomplete draft fails with every missing field named and makes
    /// no network call. A complete draft resolves the owning user id
    /// (memoized), then `POST`s a new record or `PUT`s an existing one.
    /// On success the server-assigned id is merged into the draft, the
    /// selection is updated and the entity list re-fetched. On failure the
    /// backend's message is surfaced unchanged and the draft is retained
    /// so the user can correct and retry.
    pub async fn save(&mut self) -> Result<DbId, StoreError> {
        let missing = K::missing_fields(&self.draft);
        if !missing.is_empty() {
            let err = StoreError::Validation { missing };
            self.last_error = Some(err.to_string());
            return Err(err);
        }

        let user_id = match self.auth.user_id(self.transport.as_ref()).await {
            Ok(user_id) => user_id,
            Err(err) => return Err(self.surface(err)),
        };

        let body = K::request_body(&self.draft, user_id);
        let existing_id = K::id(&self.draft);
        let result = match existing_id {
            Some(id) => {
                let path = format!("{}/{id}", K::COLLECTION);
                self.transport.put(&path, &body).await
            }
            None => self.transport.post(K::COLLECTION, &body).await,
        };
        let value = match result {
            Ok(value) => value,
            Err(err) => return Err(self.surface(err)),
        };

        let id = match existing_id.or_else(|| value.get(K::ID_KEY).and_then(serde_json::Value::as_i64)) {
            Some(id) => id,
            None => {
                let err = PlatformError::Network(format!(
                    "Create response carried no {}",
                    K::ID_KEY
                ));
                return Err(self.surface(err));
            }
        };

        K::set_id(&mut self.draft, id);
        let saved = self.draft.clone();
        match &mut self.selection {
            SelectionState::Single(current) => *current = Some(saved),
            SelectionState::Multi(set) => {
                if set.iter().any(|existing| K::id(existing) == Some(id)) {
                    for existing in set.iter_mut() {
                        if K::id(existing) == Some(id) {
                            *existing = saved.clone();
                        }
                    }
                } else {
                    set.push(saved);
                }
            }
        }
        self.last_error = None;

        if existing_id.is_none() {
            self.bus.publish(WizardEvent::entity_created(K::ENTITY, id));
        }
        tracing::info!(entity = K::ENTITY, id, created = existing_id.is_none(), "Entity saved");

        // The cached list must reflect server truth before this resolves.
        if let Err(err) = self.refresh().await {
            tracing::warn!(entity = K::ENTITY, %err, "List refresh after save failed");
        }

        Ok(id)
    }

    /// Delete a persisted entity.
    ///
    /// On success the entity leaves the cached list and the selection, a
    /// matching draft is reset, and the list is re-fetched. On failure all
    /// local state is untouched and the error is surfaced.
    pub async fn remove(&mut self, id: DbId) -> Result<(), StoreError> {
        let path = format!("{}/{id}", K::COLLECTION);
        if let Err(err) = self.transport.delete(&path).await {
            return Err(self.surface(err));
        }

        self.entities.retain(|existing| K::id(existing) != Some(id));
        match &mut self.selection {
            SelectionState::Single(current) => {
                if current.as_ref().map_or(false, |record| K::id(record) == Some(id)) {
                    *current = None;
                }
            }
            SelectionState::Multi(set) => {
                set.retain(|existing| K::id(existing) != Some(id));
            }
        }
        if K::id(&self.draft) == Some(id) {
            self.draft = K::empty_draft();
        }
        self.last_error = None;

        self.bus.publish(WizardEvent::entity_deleted(K::ENTITY, id));
        tracing::info!(entity = K::ENTITY, id, "Entity deleted");

        if let Err(err) = self.refresh().await {
            tracing::warn!(entity = K::ENTITY, %err, "List refresh after delete failed");
        }

        Ok(())
    }

    /// Record a platform failure: remember the user-facing message and
    /// publish it as an error notice.
    fn surface(&mut self, error: PlatformError) -> StoreError {
        let err = StoreError::from(error);
        let message = err.to_string();
        tracing::warn!(entity = K::ENTITY, %message, "Entity store operation failed");
        self.last_error = Some(message.clone());
        self.bus.notify(Notice::error(message));
        err
    }
}

// ---------------------------------------------------------------------------
// Gear linkage
// ---------------------------------------------------------------------------

impl EntityLinkStore<GearKind> {
    /// Replace the selection set with the gear already linked to an image.
    pub async fn load_for_image(&mut self, image_id: DbId) -> Result<(), StoreError> {
        let path = format!("/images/{image_id}/gear");
        let result = self.transport.get(&path, &[]).await;
        let value = match result {
            Ok(value) => value,
            Err(err) => return Err(self.surface(err)),
        };
        let items: Vec<GearItem> = match serde_json::from_value(value) {
            Ok(items) => items,
            Err(err) => {
                let err =
                    PlatformError::Network(format!("Malformed image gear response: {err}"));
                return Err(self.surface(err));
            }
        };
        self.selection = SelectionState::Multi(items);
        self.last_error = None;
        Ok(())
    }

    /// Link the current selection set to an image. A no-op when nothing
    /// is selected.
    pub async fn link_to_image(&mut self, image_id: DbId) -> Result<(), StoreError> {
        let gear_ids: Vec<DbId> = self
            .selected_items()
            .iter()
            .filter_map(GearKind::id)
            .collect();
        if gear_ids.is_empty() {
            return Ok(());
        }

        let user_id = match self.auth.user_id(self.transport.as_ref()).await {
            Ok(user_id) => user_id,
            Err(err) => return Err(self.surface(err)),
        };

        let path = format!("/images/{image_id}/gear");
        let body = json!({ "gear_ids": gear_ids, "user_id": user_id });
        if let Err(err) = self.transport.post(&path, &body).await {
            return Err(self.surface(err));
        }
        tracing::info!(image_id, count = gear_ids.len(), "Gear linked to image");
        Ok(())
    }
}
