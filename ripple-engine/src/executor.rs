//! The ripple executor: applies an action's direct effect, then
//! walks each ripple rule's matching neighbors exactly once, invoking
//! registered effect functions and recording deltas, ripple path, and
//! insights. One pass over the rules — no re-entrant propagation on
//! newly-updated nodes: one action triggers one bounded propagation pass.

use ripple_graph::{Direction, Graph};
use ripple_types::{Action, PropertyMap, PropertyValue, RippleRule};

use crate::evaluator::evaluate_condition;
use crate::history::{DeltaGraph, HighlightEdge, SimulationEvent, UpdatedNode};
use crate::insight::{format_insight, unregistered_function_insight, Insight};
use crate::path::parse_path;
use crate::registry::{EffectContext, GraphView, Registry};

/// A single property change recorded against one node, in the shape the
/// wire format expects: new values plus the `_old_<prop>` keys the delta
/// carries alongside them.
fn push_updated_node(updated_nodes: &mut Vec<UpdatedNode>, id: &str, new_values: &PropertyMap, old_values: &PropertyMap) {
    let mut properties = PropertyMap::new();
    for (k, v) in new_values {
        properties.insert(k.clone(), v.clone());
    }
    for (k, v) in old_values {
        properties.insert(format!("_old_{k}"), v.clone());
    }
    updated_nodes.push(UpdatedNode {
        id: id.to_string(),
        properties,
    });
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExecutionResult {
    Success {
        delta_graph: DeltaGraph,
        ripple_path: Vec<String>,
        insights: Vec<Insight>,
    },
    Error {
        message: String,
    },
}

/// Read-only adapter so the graph store can be handed to effect functions
/// as a `GraphView` without those functions getting mutation access.
struct GraphViewAdapter<'a> {
    graph: &'a Graph,
}

/// Node properties plus the `type` and `id` tags, addressable alongside
/// ordinary properties in conditions and insight templates (mirrors
/// `Node::get_attr`'s treatment of `type`).
fn node_full_attrs(graph: &Graph, id: &str) -> PropertyMap {
    let mut attrs = PropertyMap::new();
    if let Some(node) = graph.node(id) {
        attrs = node.properties.clone();
        attrs.insert("type".to_string(), PropertyValue::String(node.node_type.clone()));
        attrs.insert("id".to_string(), PropertyValue::String(id.to_string()));
    }
    attrs
}

impl GraphView for GraphViewAdapter<'_> {
    fn node_attrs(&self, id: &str) -> Option<PropertyMap> {
        self.graph.node(id).map(|_| node_full_attrs(self.graph, id))
    }

    fn out_neighbors(&self, id: &str) -> Vec<(String, String, PropertyMap)> {
        self.graph
            .out_edges(id)
            .map(|e| (e.target.clone(), e.edge_type.clone(), e.properties.clone()))
            .collect()
    }

    fn in_neighbors(&self, id: &str) -> Vec<(String, String, PropertyMap)> {
        self.graph
            .in_edges(id)
            .map(|e| (e.source.clone(), e.edge_type.clone(), e.properties.clone()))
            .collect()
    }
}

pub struct RippleExecutor;

impl RippleExecutor {
    /// Runs `action_id` against `target_node_id`. The target node's
    /// existence is a caller precondition — this function does not check
    /// it; that's the HTTP layer's job, not the executor's.
    pub fn execute_action(
        graph: &mut Graph,
        registry: &Registry,
        actions: &[Action],
        action_id: &str,
        target_node_id: &str,
    ) -> ExecutionResult {
        let Some(action) = actions.iter().find(|a| a.action_id == action_id) else {
            return ExecutionResult::Error {
                message: format!("action '{action_id}' not found"),
            };
        };

        let mut insights = Vec::new();
        let mut ripple_path = vec![target_node_id.to_string()];
        let mut updated_nodes = Vec::new();
        let mut highlight_edges = Vec::new();

        if let Some(direct_effect) = &action.direct_effect {
            let old_value = graph
                .node(target_node_id)
                .and_then(|n| n.properties.get(&direct_effect.property_to_update).cloned())
                .unwrap_or_default();
            let _ = graph.set_node_prop(
                target_node_id,
                &direct_effect.property_to_update,
                direct_effect.new_value.clone(),
            );
            let mut new_values = PropertyMap::new();
            new_values.insert(direct_effect.property_to_update.clone(), direct_effect.new_value.clone());
            let mut old_values = PropertyMap::new();
            old_values.insert(direct_effect.property_to_update.clone(), old_value);
            push_updated_node(&mut updated_nodes, target_node_id, &new_values, &old_values);
        }

        for rule in &action.ripple_rules {
            apply_rule(
                graph,
                registry,
                rule,
                target_node_id,
                &mut insights,
                &mut ripple_path,
                &mut updated_nodes,
                &mut highlight_edges,
            );
        }

        ExecutionResult::Success {
            delta_graph: DeltaGraph {
                updated_nodes,
                highlight_edges,
            },
            ripple_path,
            insights,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_rule(
    graph: &mut Graph,
    registry: &Registry,
    rule: &RippleRule,
    source_node_id: &str,
    insights: &mut Vec<Insight>,
    ripple_path: &mut Vec<String>,
    updated_nodes: &mut Vec<UpdatedNode>,
    highlight_edges: &mut Vec<HighlightEdge>,
) {
    let Some(parsed) = parse_path(&rule.propagation_path) else {
        return;
    };

    let edges: Vec<_> = match parsed.direction {
        Direction::Outgoing => graph.out_edges(source_node_id).cloned().collect(),
        Direction::Incoming => graph.in_edges(source_node_id).cloned().collect(),
    };

    for edge in edges {
        if edge.edge_type != parsed.edge_type {
            continue;
        }
        let neighbor_id = match parsed.direction {
            Direction::Outgoing => edge.target.clone(),
            Direction::Incoming => edge.source.clone(),
        };
        let Some(neighbor) = graph.node(&neighbor_id) else {
            continue;
        };
        if neighbor.node_type != parsed.node_type {
            continue;
        }

        if let Some(condition) = &rule.condition {
            let source_attrs = node_full_attrs(graph, source_node_id);
            let target_attrs = node_full_attrs(graph, &neighbor_id);
            let matches = evaluate_condition(
                condition,
                &|key| source_attrs.get(key).cloned().unwrap_or_default(),
                &|key| target_attrs.get(key).cloned().unwrap_or_default(),
            );
            if !matches {
                continue;
            }
        }

        highlight_edges.push(HighlightEdge {
            source: edge.source.clone(),
            target: edge.target.clone(),
            edge_type: edge.edge_type.clone(),
        });
        if !ripple_path.contains(&neighbor_id) {
            ripple_path.push(neighbor_id.clone());
        }

        apply_secondary_effect(
            graph,
            registry,
            rule,
            source_node_id,
            &neighbor_id,
            insights,
            updated_nodes,
        );
    }
}

fn apply_secondary_effect(
    graph: &mut Graph,
    registry: &Registry,
    rule: &RippleRule,
    source_node_id: &str,
    neighbor_id: &str,
    insights: &mut Vec<Insight>,
    updated_nodes: &mut Vec<UpdatedNode>,
) {
    let function_name = &rule.effect_on_target.action_to_trigger;
    let Some(effect) = registry.get(function_name) else {
        insights.push(unregistered_function_insight(
            function_name,
            source_node_id,
            neighbor_id,
            &rule.rule_id,
        ));
        return;
    };

    let source_attrs = node_full_attrs(graph, source_node_id);
    let target_attrs = node_full_attrs(graph, neighbor_id);
    let view = GraphViewAdapter { graph };
    let ctx = EffectContext {
        source_id: source_node_id,
        target_id: neighbor_id,
        source_attrs: &source_attrs,
        target_attrs: &target_attrs,
        parameters: &rule.effect_on_target.parameters,
        graph: &view,
    };

    let result = match effect.call(&ctx) {
        Ok(result) => result,
        Err(_) => return,
    };

    for (key, value) in &result.updated_properties {
        let _ = graph.set_node_prop(neighbor_id, key, value.clone());
    }
    push_updated_node(updated_nodes, neighbor_id, &result.updated_properties, &result.old_values);

    // Re-read the neighbor after the write: templates like
    // `{target[margin_gap]}` reference properties the effect just created.
    let target_attrs_after = node_full_attrs(graph, neighbor_id);
    let insight = format_insight(
        rule.insight_template.as_deref(),
        rule.insight_type.as_deref(),
        rule.insight_severity.as_deref(),
        source_node_id,
        neighbor_id,
        &rule.rule_id,
        &source_attrs,
        &target_attrs_after,
    );
    insights.push(insight);
}
