mod common;

use common::{new_incident, FullDisk, UnreadableDisk};
use kalium_incident_tracker::{
    config::{StorageBackend, StorageConfig},
    models::{
        Attachment, ContentBlockPatch, IncidentPatch, IncidentStatus, NewContentBlock, Settings,
    },
    state::{create_backend, InMemoryKv, KeyValueStore, SledKv, StorageKeys, Store},
};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

fn open(backend: Arc<dyn KeyValueStore>) -> Store {
    Store::open(backend, StorageKeys::default(), Settings::default())
}

/// Test suite that runs against any KeyValueStore implementation
fn test_round_trip(backend: Arc<dyn KeyValueStore>) {
    let store = open(backend.clone());

    let first = store.create_incident(new_incident("Spawn sin protección", "Alta"));
    let second = store.create_incident(new_incident("Lag en Lobby", "Baja"));
    store.set_status(&first.id, IncidentStatus::InProgress);
    store.add_attachment(
        &second.id,
        Attachment::new("timings.txt", "text/plain", 512, "blob:local/7"),
    );

    let block = store.create_content_block(NewContentBlock {
        title: Some("Normas".to_string()),
        body: Some("1. *Respeto*\n2. Sin hacks".to_string()),
    });
    store.create_content_block(NewContentBlock::default());

    let settings = Settings {
        categories: vec!["Bug".to_string(), "Griefing".to_string()],
        servers: vec!["Survival".to_string()],
        priorities: vec!["Low".to_string(), "High".to_string()],
    };
    store.update_settings(settings.clone());

    let reloaded = open(backend);
    assert_eq!(reloaded.incidents(), store.incidents());
    assert_eq!(reloaded.content_blocks(), store.content_blocks());
    assert_eq!(reloaded.settings(), settings);
    assert_eq!(
        reloaded.content_blocks()[1].id,
        block.id,
        "stored order is preserved"
    );
}

fn test_empty_collections_round_trip(backend: Arc<dyn KeyValueStore>) {
    let store = open(backend.clone());
    let only = store.create_incident(new_incident("temporal", "Media"));
    let block = store.create_content_block(NewContentBlock::default());
    store.delete_incident(&only.id);
    store.delete_content_block(&block.id);

    let reloaded = open(backend.clone());
    assert!(reloaded.incidents().is_empty());
    assert!(reloaded.content_blocks().is_empty());

    let raw = backend.get("kalium_incidents").unwrap().unwrap();
    assert_eq!(raw, b"[]".to_vec());
}

#[test]
fn test_in_memory_round_trip() {
    test_round_trip(Arc::new(InMemoryKv::new()));
    test_empty_collections_round_trip(Arc::new(InMemoryKv::new()));
}

#[test]
fn test_sled_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    test_round_trip(Arc::new(SledKv::new(temp_dir.path().join("a")).unwrap()));
    test_empty_collections_round_trip(Arc::new(SledKv::new(temp_dir.path().join("b")).unwrap()));
}

#[test]
fn test_sled_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let config = StorageConfig {
        backend: StorageBackend::Sled,
        path: Some(temp_dir.path().to_path_buf()),
        key_prefix: "kalium".to_string(),
    };

    let created = {
        let store = open(create_backend(&config).unwrap());
        store.create_incident(new_incident("Duplicación de diamantes", "Crítica"))
    };

    let store = open(create_backend(&config).unwrap());
    assert_eq!(store.incident(&created.id), Some(created));
}

#[test]
fn test_missing_data_uses_defaults() {
    let store = Store::in_memory();
    assert!(store.incidents().is_empty());
    assert!(store.content_blocks().is_empty());
    assert_eq!(store.settings(), Settings::default());
}

#[test]
fn test_malformed_data_falls_back_silently() {
    let backend = Arc::new(InMemoryKv::new());
    backend.put("kalium_incidents", b"{not json").unwrap();
    backend.put("kalium_content_blocks", br#"[{"id": 3}]"#).unwrap();
    backend.put("kalium_settings", br#"{"categories": "Bug"}"#).unwrap();

    let store = open(backend.clone());
    assert!(store.incidents().is_empty());
    assert!(store.content_blocks().is_empty());
    assert_eq!(store.settings(), Settings::default());

    // The next write replaces the corrupt entry
    store.create_incident(new_incident("nuevo", "Baja"));
    assert_eq!(open(backend).incidents().len(), 1);
}

#[test]
fn test_read_errors_fall_back_to_defaults() {
    let store = open(Arc::new(UnreadableDisk));
    assert!(store.incidents().is_empty());
    assert!(store.content_blocks().is_empty());
    assert_eq!(store.settings(), Settings::default());

    // The store stays usable and writes still go through
    store.create_incident(new_incident("tras el fallo", "Media"));
    assert_eq!(store.incidents().len(), 1);
    assert_eq!(store.persist_failures(), 0);
}

#[test]
fn test_custom_default_vocabulary() {
    let defaults = Settings {
        categories: vec!["Otro".to_string()],
        servers: vec!["Factions".to_string()],
        priorities: vec!["P3".to_string(), "P1".to_string()],
    };
    let store = Store::open(
        Arc::new(InMemoryKv::new()),
        StorageKeys::with_prefix("staging"),
        defaults.clone(),
    );
    assert_eq!(store.settings(), defaults);
}

#[test]
fn test_key_prefix_isolates_stores() {
    let backend = Arc::new(InMemoryKv::new());
    let live = Store::open(backend.clone(), StorageKeys::default(), Settings::default());
    live.create_incident(new_incident("live", "Alta"));

    let staging = Store::open(
        backend.clone(),
        StorageKeys::with_prefix("staging"),
        Settings::default(),
    );
    assert!(staging.incidents().is_empty());
    assert!(backend.get("staging_incidents").unwrap().is_none());
}

#[test]
fn test_failed_writes_are_best_effort() {
    let store = open(Arc::new(FullDisk));

    let incident = store.create_incident(new_incident("sin espacio", "Media"));
    assert_eq!(store.incidents().len(), 1);
    assert_eq!(store.persist_failures(), 1);

    store.set_status(&incident.id, IncidentStatus::Resolved);
    assert_eq!(
        store.incident(&incident.id).unwrap().status,
        IncidentStatus::Resolved
    );
    assert_eq!(store.persist_failures(), 2);

    let err = store.persist_all().unwrap_err();
    assert_eq!(err.error_code(), "STORAGE_ERROR");
}

#[test]
fn test_patch_semantics() {
    let store = Store::in_memory();
    let created = store.create_incident(new_incident("Chat muteado", "Baja"));

    let updated = store
        .update_incident(
            &created.id,
            IncidentPatch {
                title: Some("Chat global muteado".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.title, "Chat global muteado");
    assert_eq!(updated.description, created.description);
    assert_eq!(updated.category, created.category);
    assert_eq!(updated.server, created.server);
    assert_eq!(updated.priority, created.priority);
    assert_eq!(updated.status, created.status);
    assert_eq!(updated.reporter, created.reporter);
    assert_eq!(updated.attachments, created.attachments);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    let again = store
        .update_incident(&created.id, IncidentPatch::default())
        .unwrap();
    assert!(again.updated_at > updated.updated_at);
}

#[test]
fn test_unknown_ids_leave_collections_unchanged() {
    let store = Store::in_memory();
    store.create_incident(new_incident("uno", "Baja"));
    store.create_content_block(NewContentBlock::default());
    let incidents = store.incidents();
    let blocks = store.content_blocks();

    let missing = Uuid::new_v4();
    assert!(store
        .update_incident(&missing, IncidentPatch::status(IncidentStatus::Closed))
        .is_none());
    assert!(!store.delete_incident(&missing));
    assert!(store
        .update_content_block(&missing, ContentBlockPatch::default())
        .is_none());
    assert!(!store.delete_content_block(&missing));

    assert_eq!(store.incidents(), incidents);
    assert_eq!(store.content_blocks(), blocks);
}

#[test]
fn test_ids_are_unique() {
    let store = Store::in_memory();
    let mut ids: Vec<Uuid> = (0..200)
        .map(|i| store.create_incident(new_incident(&i.to_string(), "Baja")).id)
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 200);
}
