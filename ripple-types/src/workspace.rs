use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::property::{PropertyMap, PropertyValue};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub domain: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeTypeDef {
    pub label: String,
    pub color: String,
    pub shape: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub properties: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeTypeDef {
    pub label: String,
    pub color: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub properties: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OntologyDef {
    pub node_types: BTreeMap<String, NodeTypeDef>,
    pub edge_types: BTreeMap<String, EdgeTypeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub properties: PropertyMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    #[serde(default)]
    pub properties: PropertyMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectEffect {
    pub property_to_update: String,
    pub new_value: PropertyValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectOnTarget {
    pub action_to_trigger: String,
    #[serde(default)]
    pub parameters: PropertyMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RippleRule {
    pub rule_id: String,
    pub propagation_path: String,
    #[serde(default)]
    pub condition: Option<String>,
    pub effect_on_target: EffectOnTarget,
    #[serde(default)]
    pub insight_template: Option<String>,
    #[serde(default)]
    pub insight_type: Option<String>,
    #[serde(default)]
    pub insight_severity: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub action_id: String,
    pub target_node_type: String,
    pub display_name: String,
    #[serde(default)]
    pub direct_effect: Option<DirectEffect>,
    #[serde(default)]
    pub ripple_rules: Vec<RippleRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ActionEngine {
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// The top-level document accepted by `load_workspace`. Field names and
/// nesting are part of the wire contract — keep them stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub metadata: Metadata,
    pub ontology_def: OntologyDef,
    pub graph_data: GraphData,
    pub action_engine: ActionEngine,
}
