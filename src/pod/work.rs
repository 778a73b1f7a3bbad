use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkKind {
    Ticket,
    Pr,
    Custom,
}

/// The work request currently driving the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkUnit {
    pub id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: WorkKind,
}

impl WorkUnit {
    pub fn new(content: String, kind: WorkKind) -> Self {
        let short = Uuid::new_v4().simple().to_string();
        Self {
            id: format!("WORK-{}", &short[..6]),
            content,
            kind,
        }
    }
}
