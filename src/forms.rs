//! Submission-boundary validation.
//!
//! The store accepts whatever it is given; raw input from a reporter or a
//! staff member is checked here first.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;
use crate::models::{Attachment, ContentBlockPatch, NewIncident, Reporter};

/// Raw incident report as typed by a reporter
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct IncidentForm {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1))]
    pub description: String,

    #[validate(length(min = 1))]
    pub category: String,

    #[validate(length(min = 1))]
    pub server: String,

    #[validate(length(min = 1))]
    pub priority: String,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 64))]
    pub discord: Option<String>,

    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl IncidentForm {
    /// Trim every field and turn blank optionals into `None`
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            server: self.server.trim().to_string(),
            priority: self.priority.trim().to_string(),
            email: non_blank(self.email),
            discord: non_blank(self.discord),
            attachments: self.attachments,
        }
    }

    /// Validate the form and produce the store's creation fields
    pub fn into_new_incident(self) -> Result<NewIncident> {
        let form = self.normalized();
        form.validate()?;

        let reporter = Reporter {
            email: form.email,
            discord: form.discord,
        };

        Ok(NewIncident {
            title: form.title,
            description: form.description,
            category: form.category,
            server: form.server,
            priority: form.priority,
            reporter: Some(reporter).filter(|r| !r.is_empty()),
            attachments: form.attachments,
        })
    }
}

/// Staff edit of a content block
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ContentBlockForm {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    pub body: String,
}

impl ContentBlockForm {
    pub fn into_patch(self) -> Result<ContentBlockPatch> {
        let form = Self {
            title: self.title.trim().to_string(),
            body: self.body,
        };
        form.validate()?;

        Ok(ContentBlockPatch {
            title: Some(form.title),
            body: Some(form.body),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
