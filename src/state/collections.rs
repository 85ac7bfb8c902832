use crate::error::Result;
use crate::models::{
    Attachment, ContentBlock, ContentBlockPatch, Incident, IncidentPatch, IncidentStatus,
    NewContentBlock, NewIncident, Settings,
};
use crate::state::{InMemoryKv, KeyValueStore, StorageKeys};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Owner of the incident, content block and settings collections.
///
/// Every mutation is written through to the key-value medium before it
/// returns. Writes are best-effort: a failed write is logged and counted, the
/// in-memory change stands, and callers that need a failure channel use
/// [`Store::persist_all`].
///
/// All state sits behind a single lock, so a store shared through `Arc`
/// serialises concurrent mutations.
// TODO: route the five CRUD operations through the remote incidents API once it exists
pub struct Store {
    backend: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
    state: RwLock<StoreState>,
    persist_failures: AtomicU64,
}

struct StoreState {
    incidents: Vec<Incident>,
    content_blocks: Vec<ContentBlock>,
    settings: Settings,
    revision: u64,
}

/// Consistent read-only view of the incident collection
pub struct IncidentSnapshot<'a> {
    pub incidents: &'a [Incident],
    pub settings: &'a Settings,
    pub revision: u64,
}

#[derive(Debug, Clone, Copy)]
enum Collection {
    Incidents,
    ContentBlocks,
    Settings,
}

impl Store {
    /// Load all three collections from `backend`.
    ///
    /// Missing or malformed entries fall back to an empty collection, or to
    /// `default_settings` for the vocabulary.
    pub fn open(
        backend: Arc<dyn KeyValueStore>,
        keys: StorageKeys,
        default_settings: Settings,
    ) -> Self {
        let incidents: Vec<Incident> = load_or(backend.as_ref(), &keys.incidents, Vec::new);
        let content_blocks: Vec<ContentBlock> =
            load_or(backend.as_ref(), &keys.content_blocks, Vec::new);
        let settings = load_or(backend.as_ref(), &keys.settings, || default_settings);

        tracing::info!(
            backend = backend.name(),
            incidents = incidents.len(),
            content_blocks = content_blocks.len(),
            "Store loaded"
        );

        Self {
            backend,
            keys,
            state: RwLock::new(StoreState {
                incidents,
                content_blocks,
                settings,
                revision: 0,
            }),
            persist_failures: AtomicU64::new(0),
        }
    }

    /// Store over a fresh in-memory medium with the built-in vocabulary
    pub fn in_memory() -> Self {
        Self::open(
            Arc::new(InMemoryKv::new()),
            StorageKeys::default(),
            Settings::default(),
        )
    }

    // Incidents

    /// File a new incident; it is placed first in the collection
    pub fn create_incident(&self, fields: NewIncident) -> Incident {
        let incident = Incident::new(fields);

        let mut state = self.state.write();
        state.incidents.insert(0, incident.clone());
        state.revision += 1;
        self.persist(&state, Collection::Incidents);

        tracing::debug!(incident_id = %incident.id, "Incident created");
        incident
    }

    /// Merge `patch` into the incident; `None` when no incident has `id`
    pub fn update_incident(&self, id: &Uuid, patch: IncidentPatch) -> Option<Incident> {
        self.modify_incident(id, |incident| incident.apply(patch))
    }

    /// Shorthand for a status-only patch
    pub fn set_status(&self, id: &Uuid, status: IncidentStatus) -> Option<Incident> {
        self.update_incident(id, IncidentPatch::status(status))
    }

    /// Remove the incident; returns whether it existed
    pub fn delete_incident(&self, id: &Uuid) -> bool {
        let mut state = self.state.write();
        let before = state.incidents.len();
        state.incidents.retain(|incident| incident.id != *id);

        if state.incidents.len() == before {
            tracing::debug!(incident_id = %id, "Delete ignored, incident not found");
            return false;
        }

        state.revision += 1;
        self.persist(&state, Collection::Incidents);
        tracing::debug!(incident_id = %id, "Incident deleted");
        true
    }

    /// Prepend an attachment to the incident
    pub fn add_attachment(&self, incident_id: &Uuid, attachment: Attachment) -> Option<Incident> {
        self.modify_incident(incident_id, |incident| {
            incident.attachments.insert(0, attachment);
            incident.touch();
        })
    }

    /// Drop one attachment; returns whether the incident held it
    pub fn remove_attachment(&self, incident_id: &Uuid, attachment_id: &Uuid) -> bool {
        let mut state = self.state.write();
        let Some(incident) = state.incidents.iter_mut().find(|i| i.id == *incident_id) else {
            return false;
        };

        let before = incident.attachments.len();
        incident.attachments.retain(|a| a.id != *attachment_id);
        if incident.attachments.len() == before {
            return false;
        }
        incident.touch();

        state.revision += 1;
        self.persist(&state, Collection::Incidents);
        tracing::debug!(
            incident_id = %incident_id,
            attachment_id = %attachment_id,
            "Attachment removed"
        );
        true
    }

    pub fn incident(&self, id: &Uuid) -> Option<Incident> {
        self.state
            .read()
            .incidents
            .iter()
            .find(|incident| incident.id == *id)
            .cloned()
    }

    /// Clone of the collection in stored order
    pub fn incidents(&self) -> Vec<Incident> {
        self.state.read().incidents.clone()
    }

    /// Run `f` over the collection without cloning it
    pub fn with_incidents<R>(&self, f: impl FnOnce(IncidentSnapshot<'_>) -> R) -> R {
        let state = self.state.read();
        f(IncidentSnapshot {
            incidents: &state.incidents,
            settings: &state.settings,
            revision: state.revision,
        })
    }

    fn modify_incident(
        &self,
        id: &Uuid,
        change: impl FnOnce(&mut Incident),
    ) -> Option<Incident> {
        let mut state = self.state.write();
        let Some(incident) = state.incidents.iter_mut().find(|i| i.id == *id) else {
            tracing::debug!(incident_id = %id, "Update ignored, incident not found");
            return None;
        };

        change(incident);
        let updated = incident.clone();

        state.revision += 1;
        self.persist(&state, Collection::Incidents);
        tracing::debug!(incident_id = %id, status = %updated.status, "Incident updated");
        Some(updated)
    }

    // Content blocks

    pub fn create_content_block(&self, fields: NewContentBlock) -> ContentBlock {
        let block = ContentBlock::new(fields);

        let mut state = self.state.write();
        state.content_blocks.insert(0, block.clone());
        state.revision += 1;
        self.persist(&state, Collection::ContentBlocks);

        tracing::debug!(block_id = %block.id, "Content block created");
        block
    }

    pub fn update_content_block(
        &self,
        id: &Uuid,
        patch: ContentBlockPatch,
    ) -> Option<ContentBlock> {
        let mut state = self.state.write();
        let block = state.content_blocks.iter_mut().find(|b| b.id == *id)?;

        block.apply(patch);
        let updated = block.clone();

        state.revision += 1;
        self.persist(&state, Collection::ContentBlocks);
        tracing::debug!(block_id = %id, "Content block updated");
        Some(updated)
    }

    pub fn delete_content_block(&self, id: &Uuid) -> bool {
        let mut state = self.state.write();
        let before = state.content_blocks.len();
        state.content_blocks.retain(|block| block.id != *id);

        if state.content_blocks.len() == before {
            return false;
        }

        state.revision += 1;
        self.persist(&state, Collection::ContentBlocks);
        tracing::debug!(block_id = %id, "Content block deleted");
        true
    }

    pub fn content_block(&self, id: &Uuid) -> Option<ContentBlock> {
        self.state
            .read()
            .content_blocks
            .iter()
            .find(|block| block.id == *id)
            .cloned()
    }

    pub fn content_blocks(&self) -> Vec<ContentBlock> {
        self.state.read().content_blocks.clone()
    }

    // Settings

    /// Replace the whole vocabulary.
    ///
    /// Incidents keep whatever labels they hold, even ones no longer listed.
    pub fn update_settings(&self, settings: Settings) {
        let mut state = self.state.write();
        state.settings = settings;
        state.revision += 1;
        self.persist(&state, Collection::Settings);
        tracing::debug!("Settings replaced");
    }

    pub fn settings(&self) -> Settings {
        self.state.read().settings.clone()
    }

    // Persistence

    /// Counter bumped by every effective mutation
    pub fn revision(&self) -> u64 {
        self.state.read().revision
    }

    /// Number of write-through failures swallowed since the store was opened
    pub fn persist_failures(&self) -> u64 {
        self.persist_failures.load(Ordering::Relaxed)
    }

    /// Write all three collections, reporting the first failure
    pub fn persist_all(&self) -> Result<()> {
        let state = self.state.read();
        for collection in [
            Collection::Incidents,
            Collection::ContentBlocks,
            Collection::Settings,
        ] {
            self.try_persist(&state, collection)?;
        }
        Ok(())
    }

    fn persist(&self, state: &StoreState, collection: Collection) {
        if let Err(e) = self.try_persist(state, collection) {
            self.persist_failures.fetch_add(1, Ordering::Relaxed);
            tracing::error!(
                collection = ?collection,
                backend = self.backend.name(),
                error_code = e.error_code(),
                error = %e,
                "Write-through failed, change kept in memory only"
            );
        }
    }

    fn try_persist(&self, state: &StoreState, collection: Collection) -> Result<()> {
        match collection {
            Collection::Incidents => self.write(&self.keys.incidents, &state.incidents),
            Collection::ContentBlocks => {
                self.write(&self.keys.content_blocks, &state.content_blocks)
            }
            Collection::Settings => self.write(&self.keys.settings, &state.settings),
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.backend.put(key, &bytes)
    }
}

/// Read and decode `key`, falling back when it is missing or unreadable
fn load_or<T: DeserializeOwned>(
    backend: &dyn KeyValueStore,
    key: &str,
    fallback: impl FnOnce() -> T,
) -> T {
    match backend.get(key) {
        Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    key,
                    bytes = bytes.len(),
                    error = %e,
                    "Discarding malformed persisted data"
                );
                fallback()
            }
        },
        Ok(None) => fallback(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read persisted data, using defaults");
            fallback()
        }
    }
}
