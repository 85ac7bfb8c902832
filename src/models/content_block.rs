use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::incident::next_timestamp;

pub const DEFAULT_BLOCK_TITLE: &str = "Untitled block";
pub const DEFAULT_BLOCK_BODY: &str = "Write this block's content here using **Markdown**.";

/// A titled Markdown snippet curated by staff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    pub id: Uuid,
    pub title: String,
    /// Markdown source
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

impl ContentBlock {
    pub fn new(fields: NewContentBlock) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: fields
                .title
                .unwrap_or_else(|| DEFAULT_BLOCK_TITLE.to_string()),
            body: fields.body.unwrap_or_else(|| DEFAULT_BLOCK_BODY.to_string()),
            updated_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, patch: ContentBlockPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(body) = patch.body {
            self.body = body;
        }
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = next_timestamp(self.updated_at);
    }
}

/// Creation fields; missing values fall back to the placeholder block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewContentBlock {
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentBlockPatch {
    pub title: Option<String>,
    pub body: Option<String>,
}
