//! Append-only chronological log of successful executions. Errors
//! never reach `push`: the executor only calls it on `ExecutionResult::Success`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::insight::Insight;

/// Serializes as `{id, <new prop values>..., _old_<prop>: <old value>...}`
/// — the flat shape a delta's updated nodes take on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdatedNode {
    pub id: String,
    #[serde(flatten)]
    pub properties: ripple_types::PropertyMap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeltaGraph {
    pub updated_nodes: Vec<UpdatedNode>,
    pub highlight_edges: Vec<HighlightEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationEvent {
    pub timestamp: DateTime<Utc>,
    pub action_id: String,
    pub target_node_id: String,
    pub ripple_path: Vec<String>,
    pub insights: Vec<Insight>,
    pub delta_graph: DeltaGraph,
}

#[derive(Debug, Default)]
pub struct History {
    events: Vec<SimulationEvent>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SimulationEvent) {
        self.events.push(event);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Chronological order, cloned out so a caller can't mutate history
    /// through the returned value.
    pub fn get(&self) -> Vec<SimulationEvent> {
        self.events.clone()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(action_id: &str) -> SimulationEvent {
        SimulationEvent {
            timestamp: Utc::now(),
            action_id: action_id.to_string(),
            target_node_id: "n1".to_string(),
            ripple_path: vec!["n1".to_string()],
            insights: Vec::new(),
            delta_graph: DeltaGraph::default(),
        }
    }

    #[test]
    fn push_then_get_preserves_chronological_order() {
        let mut history = History::new();
        history.push(event("a"));
        history.push(event("b"));
        let events = history.get();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action_id, "a");
        assert_eq!(events[1].action_id, "b");
    }

    #[test]
    fn clear_empties_the_log() {
        let mut history = History::new();
        history.push(event("a"));
        history.clear();
        assert!(history.is_empty());
    }
}
