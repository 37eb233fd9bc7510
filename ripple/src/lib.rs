//! Ripple facade: the single-owner `Engine` that ties together the typed
//! graph store, the effect registry, and the ripple executor into the
//! `load -> execute* -> reset | history` lifecycle.
//!
//! `Engine` is plain, synchronous, and not internally locked — the
//! concurrency contract is the caller's job: `ripple-server` wraps one
//! `Engine` in a `tokio::sync::Mutex`, `ripple-cli` just owns one per
//! invocation.

pub mod error;
pub mod loader;

use ripple_engine::{EffectModule, ExecutionResult, History, Registry, RippleExecutor, SimulationEvent, Source};
use ripple_graph::{Graph, SnapshotManager};
use ripple_types::{Action, GraphData, GraphEdge, GraphNode, Metadata, OntologyDef, WorkspaceConfig};

pub use error::{Error, Result};

/// A name + provenance pair, the shape `registered_functions` takes in the
/// load summary.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RegisteredFunction {
    pub name: String,
    pub source: &'static str,
}

impl From<(String, Source)> for RegisteredFunction {
    fn from((name, source): (String, Source)) -> Self {
        RegisteredFunction {
            name,
            source: match source {
                Source::Builtin => "builtin",
                Source::Custom => "custom",
            },
        }
    }
}

/// Everything `POST /load` (and the CLI's `load` subcommand) hands back.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LoadSummary {
    pub metadata: Metadata,
    pub ontology_def: OntologyDef,
    pub graph_data: GraphData,
    pub actions: Vec<Action>,
    pub registered_functions: Vec<RegisteredFunction>,
    pub warnings: Vec<String>,
}

struct Workspace {
    metadata: Metadata,
    ontology_def: OntologyDef,
    actions: Vec<Action>,
    graph: Graph,
    snapshot: SnapshotManager,
    registry: Registry,
}

/// The stateful simulation engine: one loaded workspace, its execution
/// history, and nothing else. `None` until `load_workspace` succeeds.
#[derive(Default)]
pub struct Engine {
    workspace: Option<Workspace>,
    history: History,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replaces the graph, snapshot, registry, and action list.
    /// Built-in effects are always registered first; `custom_modules` run
    /// afterward so a custom effect of the same name wins.
    pub fn load_workspace(&mut self, config: WorkspaceConfig, custom_modules: &[&dyn EffectModule]) -> Result<LoadSummary> {
        let mut graph = Graph::new();
        for node in &config.graph_data.nodes {
            graph.add_node(node.id.clone(), node.node_type.clone(), node.properties.clone());
        }
        for edge in &config.graph_data.edges {
            graph
                .add_edge(edge.source.clone(), edge.target.clone(), edge.edge_type.clone(), edge.properties.clone())
                .map_err(|e| Error::WorkspaceInvalid(e.to_string()))?;
        }

        let mut registry = Registry::new();
        ripple_engine::effects::register_builtins(&mut registry);
        for module in custom_modules {
            module.register(&mut registry);
        }

        let warnings = collect_load_warnings(&config.action_engine.actions, &registry);

        let snapshot = SnapshotManager::capture(&graph);

        let summary = LoadSummary {
            metadata: config.metadata.clone(),
            ontology_def: config.ontology_def.clone(),
            graph_data: render_graph(&graph),
            actions: config.action_engine.actions.clone(),
            registered_functions: registry.list().into_iter().map(RegisteredFunction::from).collect(),
            warnings: warnings.clone(),
        };

        self.workspace = Some(Workspace {
            metadata: config.metadata,
            ontology_def: config.ontology_def,
            actions: config.action_engine.actions,
            graph,
            snapshot,
            registry,
        });
        self.history.clear();

        Ok(summary)
    }

    /// Runs `action_id` against `node_id`. The executor itself trusts that
    /// the node exists; the engine is the caller responsible for that
    /// check.
    pub fn execute_action(&mut self, action_id: &str, node_id: &str) -> Result<ExecutionResult> {
        let workspace = self.workspace.as_mut().ok_or(Error::NoWorkspaceLoaded)?;
        if !workspace.graph.has_node(node_id) {
            return Err(Error::NodeNotFound(node_id.to_string()));
        }

        let result = RippleExecutor::execute_action(&mut workspace.graph, &workspace.registry, &workspace.actions, action_id, node_id);

        if let ExecutionResult::Success {
            delta_graph,
            ripple_path,
            insights,
        } = &result
        {
            self.history.push(SimulationEvent {
                timestamp: now(),
                action_id: action_id.to_string(),
                target_node_id: node_id.to_string(),
                ripple_path: ripple_path.clone(),
                insights: insights.clone(),
                delta_graph: delta_graph.clone(),
            });
        }

        Ok(result)
    }

    /// Restores every node's properties to the post-load snapshot and
    /// clears the event history. Edges are untouched.
    pub fn reset(&mut self) -> Result<GraphData> {
        let workspace = self.workspace.as_mut().ok_or(Error::NoWorkspaceLoaded)?;
        workspace.snapshot.restore(&mut workspace.graph);
        self.history.clear();
        Ok(render_graph(&workspace.graph))
    }

    pub fn history(&self) -> Vec<SimulationEvent> {
        self.history.get()
    }

    pub fn get_graph_for_render(&self) -> Result<GraphData> {
        let workspace = self.workspace.as_ref().ok_or(Error::NoWorkspaceLoaded)?;
        Ok(render_graph(&workspace.graph))
    }

    /// Actions applicable to `node_id`, or every declared action if
    /// `node_id` is `None`.
    pub fn available_actions(&self, node_id: Option<&str>) -> Result<Vec<Action>> {
        let workspace = self.workspace.as_ref().ok_or(Error::NoWorkspaceLoaded)?;
        let Some(node_id) = node_id else {
            return Ok(workspace.actions.clone());
        };
        let Some(node) = workspace.graph.node(node_id) else {
            return Ok(Vec::new());
        };
        Ok(workspace
            .actions
            .iter()
            .filter(|a| a.target_node_type == node.node_type)
            .cloned()
            .collect())
    }

    pub fn metadata(&self) -> Result<&Metadata> {
        self.workspace.as_ref().map(|w| &w.metadata).ok_or(Error::NoWorkspaceLoaded)
    }

    pub fn ontology_def(&self) -> Result<&OntologyDef> {
        self.workspace.as_ref().map(|w| &w.ontology_def).ok_or(Error::NoWorkspaceLoaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.workspace.is_some()
    }
}

fn now() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc::now()
}

fn collect_load_warnings(actions: &[Action], registry: &Registry) -> Vec<String> {
    let mut warnings = Vec::new();
    for action in actions {
        for rule in &action.ripple_rules {
            let name = &rule.effect_on_target.action_to_trigger;
            if registry.get(name).is_none() {
                warnings.push(format!(
                    "Function '{name}' referenced in rule '{}' is not registered in ActionRegistry",
                    rule.rule_id
                ));
            }
        }
    }
    warnings
}

/// Exports the live graph in the same nested shape a workspace document's
/// `graph_data` uses, so a render round-trips as a valid load input.
fn render_graph(graph: &Graph) -> GraphData {
    let nodes = graph
        .nodes()
        .map(|(id, node)| GraphNode {
            id: id.to_string(),
            node_type: node.node_type.clone(),
            properties: node.properties.clone(),
        })
        .collect();
    let edges = graph
        .edges()
        .map(|edge| GraphEdge {
            source: edge.source.clone(),
            target: edge.target.clone(),
            edge_type: edge.edge_type.clone(),
            properties: edge.properties.clone(),
        })
        .collect();
    GraphData { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_types::{
        ActionEngine, DirectEffect, EdgeTypeDef, EffectOnTarget, NodeTypeDef, PropertyMap, PropertyValue, RippleRule,
    };
    use std::collections::BTreeMap;

    fn minimal_config() -> WorkspaceConfig {
        let mut node_types = BTreeMap::new();
        node_types.insert(
            "Company".to_string(),
            NodeTypeDef {
                label: "Company".to_string(),
                color: "#000".to_string(),
                shape: "circle".to_string(),
                icon: None,
                properties: None,
            },
        );
        node_types.insert(
            "Event_Acquisition".to_string(),
            NodeTypeDef {
                label: "Acquisition".to_string(),
                color: "#f00".to_string(),
                shape: "square".to_string(),
                icon: None,
                properties: None,
            },
        );
        let mut edge_types = BTreeMap::new();
        edge_types.insert(
            "ACQUIRES".to_string(),
            EdgeTypeDef {
                label: "acquires".to_string(),
                color: "#00f".to_string(),
                style: None,
                properties: None,
            },
        );
        edge_types.insert(
            "TARGET_OF".to_string(),
            EdgeTypeDef {
                label: "target of".to_string(),
                color: "#0f0".to_string(),
                style: None,
                properties: None,
            },
        );

        let mut alpha = PropertyMap::new();
        alpha.insert("valuation".to_string(), PropertyValue::Number(10_000_000.0));
        alpha.insert("risk_status".to_string(), PropertyValue::String("NORMAL".into()));
        let mut beta = PropertyMap::new();
        beta.insert("valuation".to_string(), PropertyValue::Number(5_000_000.0));
        beta.insert("risk_status".to_string(), PropertyValue::String("NORMAL".into()));
        let mut event = PropertyMap::new();
        event.insert("status".to_string(), PropertyValue::String("PENDING".into()));

        WorkspaceConfig {
            metadata: Metadata {
                domain: "finance".to_string(),
                version: None,
                description: None,
            },
            ontology_def: OntologyDef { node_types, edge_types },
            graph_data: GraphData {
                nodes: vec![
                    GraphNode {
                        id: "C_ALPHA".to_string(),
                        node_type: "Company".to_string(),
                        properties: alpha,
                    },
                    GraphNode {
                        id: "C_BETA".to_string(),
                        node_type: "Company".to_string(),
                        properties: beta,
                    },
                    GraphNode {
                        id: "E_ACQ_101".to_string(),
                        node_type: "Event_Acquisition".to_string(),
                        properties: event,
                    },
                ],
                edges: vec![
                    GraphEdge {
                        source: "C_ALPHA".to_string(),
                        target: "E_ACQ_101".to_string(),
                        edge_type: "ACQUIRES".to_string(),
                        properties: PropertyMap::new(),
                    },
                    GraphEdge {
                        source: "C_BETA".to_string(),
                        target: "E_ACQ_101".to_string(),
                        edge_type: "TARGET_OF".to_string(),
                        properties: PropertyMap::new(),
                    },
                ],
            },
            action_engine: ActionEngine {
                actions: vec![Action {
                    action_id: "trigger_acquisition_failure".to_string(),
                    target_node_type: "Event_Acquisition".to_string(),
                    display_name: "Trigger acquisition failure".to_string(),
                    direct_effect: Some(DirectEffect {
                        property_to_update: "status".to_string(),
                        new_value: PropertyValue::String("FAILED".into()),
                    }),
                    ripple_rules: vec![
                        RippleRule {
                            rule_id: "R001".to_string(),
                            propagation_path: "<-[ACQUIRES]- Company".to_string(),
                            condition: None,
                            effect_on_target: EffectOnTarget {
                                action_to_trigger: "recalculate_valuation".to_string(),
                                parameters: {
                                    let mut p = PropertyMap::new();
                                    p.insert("shock_factor".to_string(), PropertyValue::Number(-0.3));
                                    p
                                },
                            },
                            insight_template: None,
                            insight_type: None,
                            insight_severity: Some("critical".to_string()),
                        },
                        RippleRule {
                            rule_id: "R002".to_string(),
                            propagation_path: "<-[TARGET_OF]- Company".to_string(),
                            condition: None,
                            effect_on_target: EffectOnTarget {
                                action_to_trigger: "update_risk_status".to_string(),
                                parameters: PropertyMap::new(),
                            },
                            insight_template: None,
                            insight_type: None,
                            insight_severity: None,
                        },
                    ],
                }],
            },
        }
    }

    #[test]
    fn load_execute_reset_round_trips_properties() {
        let mut engine = Engine::new();
        let summary = engine.load_workspace(minimal_config(), &[]).unwrap();
        assert!(summary.warnings.is_empty());
        assert_eq!(summary.registered_functions.len(), 6);

        engine.execute_action("trigger_acquisition_failure", "E_ACQ_101").unwrap();
        assert_eq!(engine.history().len(), 1);

        let rendered = engine.reset().unwrap();
        assert!(engine.history().is_empty());

        let alpha = rendered.nodes.iter().find(|n| n.id == "C_ALPHA").unwrap();
        assert_eq!(alpha.properties.get("valuation"), Some(&PropertyValue::Number(10_000_000.0)));
    }

    #[test]
    fn load_is_idempotent() {
        let mut engine = Engine::new();
        let first = engine.load_workspace(minimal_config(), &[]).unwrap();
        let second = engine.load_workspace(minimal_config(), &[]).unwrap();
        assert_eq!(first.graph_data.nodes.len(), second.graph_data.nodes.len());
        assert_eq!(first.graph_data.edges.len(), second.graph_data.edges.len());
    }

    #[test]
    fn render_round_trips_back_into_load() {
        let mut engine = Engine::new();
        engine.load_workspace(minimal_config(), &[]).unwrap();
        let rendered = engine.get_graph_for_render().unwrap();
        assert_eq!(rendered.nodes.len(), 3);
        assert_eq!(rendered.edges.len(), 2);

        let mut config = minimal_config();
        config.graph_data = rendered;
        let mut engine2 = Engine::new();
        let summary = engine2.load_workspace(config, &[]).unwrap();
        assert_eq!(summary.graph_data.nodes.len(), 3);
        assert_eq!(summary.graph_data.edges.len(), 2);
    }

    #[test]
    fn unknown_node_is_a_state_precondition_error() {
        let mut engine = Engine::new();
        engine.load_workspace(minimal_config(), &[]).unwrap();
        let err = engine.execute_action("trigger_acquisition_failure", "nope").unwrap_err();
        assert!(matches!(err, Error::NodeNotFound(_)));
    }

    #[test]
    fn available_actions_filters_by_node_type() {
        let mut engine = Engine::new();
        engine.load_workspace(minimal_config(), &[]).unwrap();
        assert_eq!(engine.available_actions(Some("E_ACQ_101")).unwrap().len(), 1);
        assert_eq!(engine.available_actions(Some("C_ALPHA")).unwrap().len(), 0);
        assert_eq!(engine.available_actions(None).unwrap().len(), 1);
    }

    #[test]
    fn load_warns_on_unregistered_rule_effect() {
        let mut config = minimal_config();
        config.action_engine.actions[0].ripple_rules[0].effect_on_target.action_to_trigger = "nonexistent_func".to_string();
        let mut engine = Engine::new();
        let summary = engine.load_workspace(config, &[]).unwrap();
        assert_eq!(summary.warnings.len(), 1);
        assert!(summary.warnings[0].contains("nonexistent_func"));
        assert!(summary.warnings[0].contains("R001"));
    }
}
