//! Server-side entities consumed by the editor.

use serde::{Deserialize, Serialize};

/// A measured water-quality parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Short identifier, also the column key in row data (e.g. `TEMP`).
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Variable {
    /// Grid header label: `"{id} - {name} ({unit})"`.
    pub fn label(&self) -> String {
        format!("{} - {} ({})", self.id, self.name, self.unit)
    }
}

/// A named collection of time-stamped measurements tied to one project.
///
/// Variables and project association are fixed once the dataset exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub project_id: String,
    #[serde(default)]
    pub variables: Vec<Variable>,

    /// Total persisted rows, when the server reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u64>,

    /// Creation timestamp as sent by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Dataset {
    pub fn variable(&self, id: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.id == id)
    }

    pub fn variable_ids(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.id.as_str())
    }
}

/// Owning project; its name is the dataset's water body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
