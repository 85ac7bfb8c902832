//! Query state for the incident list

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumString};

use crate::error::AppError;
use crate::models::IncidentStatus;

const ALL: &str = "all";

/// Status filter; `all` disables it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    All,
    Only(IncidentStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: IncidentStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL {
            return Ok(StatusFilter::All);
        }
        IncidentStatus::from_str(s)
            .map(StatusFilter::Only)
            .map_err(|_| AppError::InvalidInput(format!("unknown status filter '{}'", s)))
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str(ALL),
            StatusFilter::Only(status) => write!(f, "{}", status),
        }
    }
}

/// Priority filter on the exact label; `all` disables it
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PriorityFilter {
    #[default]
    All,
    Label(String),
}

impl PriorityFilter {
    pub fn matches(&self, priority: &str) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Label(label) => label == priority,
        }
    }
}

impl FromStr for PriorityFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL {
            Ok(PriorityFilter::All)
        } else if s.is_empty() {
            Err(AppError::InvalidInput("empty priority filter".to_string()))
        } else {
            Ok(PriorityFilter::Label(s.to_string()))
        }
    }
}

impl fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityFilter::All => f.write_str(ALL),
            PriorityFilter::Label(label) => f.write_str(label),
        }
    }
}

/// Ordering of the derived view
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SortMode {
    /// Newest first
    #[default]
    ByDate,
    /// Most severe first, by position in the priority vocabulary
    ByPriority,
}

/// Everything that shapes the derived incident view
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IncidentQuery {
    /// Free text, matched case-insensitively as given; empty disables the text filter
    pub text: String,
    pub status: StatusFilter,
    pub priority: PriorityFilter,
    pub sort: SortMode,
}

impl IncidentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: PriorityFilter) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter_parsing() {
        assert_eq!(StatusFilter::from_str("all").unwrap(), StatusFilter::All);
        assert!(StatusFilter::from_str("ALL").is_err());
        assert_eq!(
            StatusFilter::from_str("in_progress").unwrap(),
            StatusFilter::Only(IncidentStatus::InProgress)
        );
        assert!(StatusFilter::from_str("pending").is_err());
        assert_eq!(StatusFilter::Only(IncidentStatus::Closed).to_string(), "closed");
    }

    #[test]
    fn test_priority_filter_parsing() {
        assert_eq!(PriorityFilter::from_str("all").unwrap(), PriorityFilter::All);
        assert_eq!(
            PriorityFilter::from_str("Crítica").unwrap(),
            PriorityFilter::Label("Crítica".to_string())
        );
        assert!(PriorityFilter::from_str("").is_err());
        // only the lowercase wildcard disables the filter
        assert_eq!(
            PriorityFilter::from_str("All").unwrap(),
            PriorityFilter::Label("All".to_string())
        );
        assert!(PriorityFilter::Label("Alta".to_string()).matches("Alta"));
        assert!(!PriorityFilter::Label("Alta".to_string()).matches("alta"));
    }

    #[test]
    fn test_sort_mode_labels() {
        assert_eq!(SortMode::from_str("by-date").unwrap(), SortMode::ByDate);
        assert_eq!(SortMode::from_str("by-priority").unwrap(), SortMode::ByPriority);
        assert_eq!(SortMode::ByPriority.to_string(), "by-priority");
        assert_eq!(SortMode::default(), SortMode::ByDate);
    }

    #[test]
    fn test_builder() {
        let query = IncidentQuery::new()
            .with_text("lag")
            .with_status(StatusFilter::Only(IncidentStatus::Open))
            .with_sort(SortMode::ByPriority);

        assert_eq!(query.text, "lag");
        assert_eq!(query.priority, PriorityFilter::All);
        assert_eq!(query.sort, SortMode::ByPriority);
    }
}
