use serde::{Deserialize, Serialize};

/// Vocabulary offered to reporters and staff.
///
/// `priorities` is ordered by ascending severity; an incident's rank is the
/// position of its label in that list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub categories: Vec<String>,
    pub servers: Vec<String>,
    pub priorities: Vec<String>,
}

impl Settings {
    /// Severity rank of a priority label, `None` when the label is not in the vocabulary
    pub fn priority_rank(&self, label: &str) -> Option<usize> {
        priority_rank(&self.priorities, label)
    }
}

pub(crate) fn priority_rank(priorities: &[String], label: &str) -> Option<usize> {
    priorities.iter().position(|p| p == label)
}

fn labels(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            categories: labels(&["Bug", "Jugador", "Pagos", "Sugerencia", "Otro"]),
            servers: labels(&["Lobby", "Survival", "SkyBlock", "Creativo"]),
            priorities: labels(&["Baja", "Media", "Alta", "Crítica"]),
        }
    }
}
