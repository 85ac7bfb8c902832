//! Shared helpers for the integration tests

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use kalium_incident_tracker::error::{AppError, Result};
use kalium_incident_tracker::models::{Incident, NewIncident, Reporter};
use kalium_incident_tracker::state::KeyValueStore;

/// Creation fields with the given title and priority label
pub fn new_incident(title: &str, priority: &str) -> NewIncident {
    NewIncident {
        title: title.to_string(),
        description: format!("{} (descripción)", title),
        category: "Bug".to_string(),
        server: "Survival".to_string(),
        priority: priority.to_string(),
        reporter: Some(Reporter {
            email: Some("reporter@example.com".to_string()),
            discord: None,
        }),
        attachments: Vec::new(),
    }
}

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// Incident with a fixed creation time
pub fn incident_at(title: &str, priority: &str, created_secs: i64) -> Incident {
    let mut incident = Incident::new(new_incident(title, priority));
    incident.created_at = at(created_secs);
    incident.updated_at = incident.created_at;
    incident
}

pub fn titles(incidents: &[Incident]) -> Vec<&str> {
    incidents.iter().map(|i| i.title.as_str()).collect()
}

/// Medium whose writes always fail, as when the storage quota is exhausted
pub struct FullDisk;

impl KeyValueStore for FullDisk {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    fn put(&self, key: &str, _value: &[u8]) -> Result<()> {
        Err(AppError::Storage(format!("quota exceeded writing {}", key)))
    }

    fn name(&self) -> &'static str {
        "full-disk"
    }
}

/// Medium that cannot be read at all, as when the database is locked or corrupt
pub struct UnreadableDisk;

impl KeyValueStore for UnreadableDisk {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Err(AppError::Storage(format!("permission denied reading {}", key)))
    }

    fn put(&self, _key: &str, _value: &[u8]) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "unreadable"
    }
}
