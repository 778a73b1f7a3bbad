use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How many deliverables the feed keeps.
pub const FEED_CAPACITY: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverableKind {
    Git,
    Email,
    Code,
    Report,
    Log,
    Risk,
}

/// A fabricated work artifact. Never mutated once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deliverable {
    pub id: String,
    pub agent_id: String,
    #[serde(rename = "type")]
    pub kind: DeliverableKind,
    pub title: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Deliverable {
    pub fn new(agent_id: &str, kind: DeliverableKind, title: String, text: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            agent_id: agent_id.to_string(),
            kind,
            title,
            text,
            timestamp: Utc::now(),
        }
    }
}

/// Most-recent-first feed, bounded at [`FEED_CAPACITY`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliverableFeed {
    items: VecDeque<Deliverable>,
}

impl DeliverableFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the head, evicting the oldest entry past capacity.
    pub fn push(&mut self, deliverable: Deliverable) {
        self.items.push_front(deliverable);
        self.items.truncate(FEED_CAPACITY);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Deliverable> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&Deliverable> {
        self.items.front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Deliverable {
        Deliverable::new("agent-1", DeliverableKind::Log, format!("#{n}"), String::new())
    }

    #[test]
    fn sixteenth_insert_evicts_oldest() {
        let mut feed = DeliverableFeed::new();
        for n in 1..=FEED_CAPACITY {
            feed.push(numbered(n));
        }
        assert_eq!(feed.len(), FEED_CAPACITY);

        feed.push(numbered(16));
        assert_eq!(feed.len(), FEED_CAPACITY);
        assert_eq!(feed.latest().unwrap().title, "#16");
        assert_eq!(feed.iter().last().unwrap().title, "#2");
        assert!(feed.iter().all(|d| d.title != "#1"));
    }

    #[test]
    fn kind_serializes_as_type() {
        let d = Deliverable::new("agent-9", DeliverableKind::Git, "t".into(), "x".into());
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["type"], "git");
        assert_eq!(json["agentId"], "agent-9");
    }
}
