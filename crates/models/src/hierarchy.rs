use serde::{Deserialize, Serialize};

/// One node of the exported hierarchy, consumed by the radial bundle view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyRecord {
    /// Course code
    pub name: String,
    /// Number of imports plus one
    pub size: usize,
    pub title: String,
    /// Hex colour of the course's subject, e.g. `#1b9e77`
    pub color: String,
    /// Codes of the required predecessors
    pub imports: Vec<String>,
}

impl HierarchyRecord {
    pub fn new(name: String, title: String, color: String, imports: Vec<String>) -> Self {
        Self {
            size: imports.len() + 1,
            name,
            title,
            color,
            imports,
        }
    }
}
