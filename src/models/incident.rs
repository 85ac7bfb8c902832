use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

/// A reported problem or request on one of the network's servers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// Unique identifier
    pub id: Uuid,

    /// Short human-readable title
    pub title: String,

    /// Detailed description
    pub description: String,

    /// Category label from the settings vocabulary
    pub category: String,

    /// Server label from the settings vocabulary
    pub server: String,

    /// Priority label; its rank comes from the settings vocabulary order
    pub priority: String,

    /// Triage status
    pub status: IncidentStatus,

    /// Optional contact details of whoever filed the report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<Reporter>,

    /// Attachments, most recently added first
    #[serde(default)]
    pub attachments: Vec<Attachment>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Incident {
    /// Create a new open incident
    pub fn new(fields: NewIncident) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            title: fields.title,
            description: fields.description,
            category: fields.category,
            server: fields.server,
            priority: fields.priority,
            status: IncidentStatus::Open,
            reporter: fields.reporter.filter(|r| !r.is_empty()),
            attachments: fields.attachments,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a partial patch; only supplied fields change
    pub fn apply(&mut self, patch: IncidentPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(server) = patch.server {
            self.server = server;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(reporter) = patch.reporter {
            // An empty reporter clears the contact details
            self.reporter = Some(reporter).filter(|r| !r.is_empty());
        }
        if let Some(attachments) = patch.attachments {
            self.attachments = attachments;
        }
        self.touch();
    }

    /// Refresh `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = next_timestamp(self.updated_at);
    }

    /// Check if the incident still needs staff attention
    pub fn is_active(&self) -> bool {
        matches!(self.status, IncidentStatus::Open | IncidentStatus::InProgress)
    }
}

/// Returns the current time, or one microsecond past `previous` when the clock
/// has not advanced, so consecutive updates are strictly ordered.
pub(crate) fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IncidentStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

/// Contact details of a reporter; both halves are optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reporter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,
}

impl Reporter {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.discord.is_none()
    }
}

/// Reference to binary content attached to an incident.
///
/// `url` is whatever locator the host hands out for the blob; the tracker never
/// reads the content itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: Uuid,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub url: String,
}

impl Attachment {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            mime_type: mime_type.into(),
            size,
            url: url.into(),
        }
    }
}

/// Fields supplied when filing an incident
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewIncident {
    pub title: String,
    pub description: String,
    pub category: String,
    pub server: String,
    pub priority: String,
    #[serde(default)]
    pub reporter: Option<Reporter>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Partial update of an incident; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub server: Option<String>,
    pub priority: Option<String>,
    pub status: Option<IncidentStatus>,
    pub reporter: Option<Reporter>,
    pub attachments: Option<Vec<Attachment>>,
}

impl IncidentPatch {
    /// Patch that only moves the incident to `status`
    pub fn status(status: IncidentStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}
