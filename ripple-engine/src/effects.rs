//! The six built-in effect functions, usable without any custom
//! code. All share the uniform `(ctx) -> EffectResult` signature and are
//! registered under `Source::Builtin` before any custom module runs, so a
//! custom effect of the same name overwrites them.

use std::sync::Arc;

use ripple_types::PropertyValue;

use crate::error::Result;
use crate::registry::{EffectContext, EffectResult, Registry, Source};

pub fn register_builtins(registry: &mut Registry) {
    registry.register("set_property", Arc::new(set_property), Source::Builtin);
    registry.register("adjust_numeric", Arc::new(adjust_numeric), Source::Builtin);
    registry.register("update_risk_status", Arc::new(update_risk_status), Source::Builtin);
    registry.register("recalculate_valuation", Arc::new(recalculate_valuation), Source::Builtin);
    registry.register("compute_margin_gap", Arc::new(compute_margin_gap), Source::Builtin);
    registry.register("graph_weighted_exposure", Arc::new(graph_weighted_exposure), Source::Builtin);
}

fn param_str(ctx: &EffectContext<'_>, key: &str, default: &str) -> String {
    ctx.parameters
        .get(key)
        .and_then(PropertyValue::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| default.to_string())
}

fn param_f64(ctx: &EffectContext<'_>, key: &str, default: f64) -> f64 {
    ctx.parameters.get(key).and_then(PropertyValue::as_f64).unwrap_or(default)
}

fn target_f64(ctx: &EffectContext<'_>, key: &str, default: f64) -> f64 {
    ctx.target_attrs.get(key).and_then(PropertyValue::as_f64).unwrap_or(default)
}

fn set_property(ctx: &EffectContext<'_>) -> Result<EffectResult> {
    let property = param_str(ctx, "property", "value");
    let new_value = ctx.parameters.get("value").cloned().unwrap_or_default();
    let old_value = ctx.target_attrs.get(&property).cloned().unwrap_or_default();

    let mut result = EffectResult::default();
    result.updated_properties.insert(property.clone(), new_value);
    result.old_values.insert(property, old_value);
    Ok(result)
}

fn adjust_numeric(ctx: &EffectContext<'_>) -> Result<EffectResult> {
    let property = param_str(ctx, "property", "value");
    let factor = param_f64(ctx, "factor", 1.0);
    let old = target_f64(ctx, &property, 0.0);

    let mut result = EffectResult::default();
    result
        .updated_properties
        .insert(property.clone(), PropertyValue::Number(old * factor));
    result.old_values.insert(property, PropertyValue::Number(old));
    Ok(result)
}

fn update_risk_status(ctx: &EffectContext<'_>) -> Result<EffectResult> {
    let new_value = ctx
        .parameters
        .get("status")
        .cloned()
        .unwrap_or_else(|| PropertyValue::String("HIGH_RISK".to_string()));
    let old_value = ctx.target_attrs.get("risk_status").cloned().unwrap_or_default();

    let mut result = EffectResult::default();
    result.updated_properties.insert("risk_status".to_string(), new_value);
    result.old_values.insert("risk_status".to_string(), old_value);
    Ok(result)
}

fn recalculate_valuation(ctx: &EffectContext<'_>) -> Result<EffectResult> {
    let shock_factor = param_f64(ctx, "shock_factor", 0.0);
    let old = target_f64(ctx, "valuation", 0.0);
    let new_value = old * (1.0 + shock_factor);

    let mut result = EffectResult::default();
    result
        .updated_properties
        .insert("valuation".to_string(), PropertyValue::Number(new_value));
    result.old_values.insert("valuation".to_string(), PropertyValue::Number(old));
    Ok(result)
}

fn compute_margin_gap(ctx: &EffectContext<'_>) -> Result<EffectResult> {
    let loan_amount = target_f64(ctx, "loan_amount", 0.0);
    let collateral_ratio = target_f64(ctx, "collateral_ratio", 1.0);
    let stock_change = param_f64(ctx, "stock_change", 0.0);

    let margin_gap = loan_amount * (1.0 - collateral_ratio * (1.0 + stock_change));

    let mut result = EffectResult::default();
    result
        .updated_properties
        .insert("margin_gap".to_string(), PropertyValue::Number(margin_gap));
    result
        .old_values
        .insert("loan_amount".to_string(), PropertyValue::Number(loan_amount));
    result
        .old_values
        .insert("collateral_ratio".to_string(), PropertyValue::Number(collateral_ratio));
    Ok(result)
}

enum Aggregation {
    Sum,
    Max,
    Count,
}

fn graph_weighted_exposure(ctx: &EffectContext<'_>) -> Result<EffectResult> {
    let direction = param_str(ctx, "direction", "out");
    let edge_type_filter = ctx.parameters.get("edge_type").and_then(PropertyValue::as_str);
    let value_property = param_str(ctx, "value_property", "valuation");
    let weight_property = param_str(ctx, "weight_property", "weight");
    let aggregation = match param_str(ctx, "aggregation", "sum").as_str() {
        "max" => Aggregation::Max,
        "count" => Aggregation::Count,
        _ => Aggregation::Sum,
    };

    let mut edges = Vec::new();
    if direction == "out" || direction == "both" {
        edges.extend(ctx.graph.out_neighbors(ctx.target_id));
    }
    if direction == "in" || direction == "both" {
        edges.extend(ctx.graph.in_neighbors(ctx.target_id));
    }

    let mut sum = 0.0;
    let mut max = 0.0;
    let mut count = 0u64;

    for (neighbor_id, edge_type, edge_attrs) in edges {
        if let Some(filter) = edge_type_filter {
            if edge_type != filter {
                continue;
            }
        }
        let Some(neighbor_attrs) = ctx.graph.node_attrs(&neighbor_id) else {
            continue;
        };
        let value = neighbor_attrs.get(&value_property).and_then(PropertyValue::as_f64).unwrap_or(0.0);
        let weight = edge_attrs.get(&weight_property).and_then(PropertyValue::as_f64).unwrap_or(1.0);
        let product = value * weight;

        sum += product;
        if product > max {
            max = product;
        }
        count += 1;
    }

    let aggregated = match aggregation {
        Aggregation::Sum => sum,
        Aggregation::Max => max,
        Aggregation::Count => count as f64,
    };

    let old_value = ctx.target_attrs.get("exposure").cloned().unwrap_or_default();
    let mut result = EffectResult::default();
    result
        .updated_properties
        .insert("exposure".to_string(), PropertyValue::Number(aggregated));
    result.old_values.insert("exposure".to_string(), old_value);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_types::PropertyMap;

    struct FakeGraph {
        neighbors: Vec<(String, String, PropertyMap)>,
    }

    impl crate::registry::GraphView for FakeGraph {
        fn node_attrs(&self, id: &str) -> Option<PropertyMap> {
            let value = match id {
                "N1" => 500.0,
                "N2" => 200.0,
                _ => return None,
            };
            let mut m = PropertyMap::new();
            m.insert("valuation".to_string(), PropertyValue::Number(value));
            Some(m)
        }
        fn out_neighbors(&self, _id: &str) -> Vec<(String, String, PropertyMap)> {
            self.neighbors.clone()
        }
        fn in_neighbors(&self, _id: &str) -> Vec<(String, String, PropertyMap)> {
            Vec::new()
        }
    }

    fn edge_props(weight: f64) -> PropertyMap {
        let mut m = PropertyMap::new();
        m.insert("weight".to_string(), PropertyValue::Number(weight));
        m
    }

    fn make_ctx<'a>(params: &'a PropertyMap, target_attrs: &'a PropertyMap, graph: &'a FakeGraph) -> EffectContext<'a> {
        EffectContext {
            source_id: "T",
            target_id: "T",
            source_attrs: target_attrs,
            target_attrs,
            parameters: params,
            graph,
        }
    }

    #[test]
    fn weighted_exposure_sum() {
        let graph = FakeGraph {
            neighbors: vec![
                ("N1".to_string(), "SUPPLIES_TO".to_string(), edge_props(0.5)),
                ("N2".to_string(), "SUPPLIES_TO".to_string(), edge_props(0.3)),
            ],
        };
        let mut params = PropertyMap::new();
        params.insert("direction".to_string(), PropertyValue::String("out".into()));
        params.insert("edge_type".to_string(), PropertyValue::String("SUPPLIES_TO".into()));
        params.insert("aggregation".to_string(), PropertyValue::String("sum".into()));
        let target = PropertyMap::new();

        let ctx = make_ctx(&params, &target, &graph);
        let result = graph_weighted_exposure(&ctx).unwrap();
        assert_eq!(
            result.updated_properties.get("exposure"),
            Some(&PropertyValue::Number(310.0))
        );
    }

    #[test]
    fn weighted_exposure_max_and_count() {
        let graph = FakeGraph {
            neighbors: vec![
                ("N1".to_string(), "SUPPLIES_TO".to_string(), edge_props(0.5)),
                ("N2".to_string(), "SUPPLIES_TO".to_string(), edge_props(0.3)),
            ],
        };
        let target = PropertyMap::new();

        let mut params = PropertyMap::new();
        params.insert("aggregation".to_string(), PropertyValue::String("max".into()));
        let ctx = make_ctx(&params, &target, &graph);
        assert_eq!(
            graph_weighted_exposure(&ctx).unwrap().updated_properties.get("exposure"),
            Some(&PropertyValue::Number(250.0))
        );

        let mut params = PropertyMap::new();
        params.insert("aggregation".to_string(), PropertyValue::String("count".into()));
        let ctx = make_ctx(&params, &target, &graph);
        assert_eq!(
            graph_weighted_exposure(&ctx).unwrap().updated_properties.get("exposure"),
            Some(&PropertyValue::Number(2.0))
        );
    }

    #[test]
    fn margin_gap_reflects_loan_amount_collateral_and_stock_change() {
        let mut target = PropertyMap::new();
        target.insert("loan_amount".to_string(), PropertyValue::Number(1_000_000.0));
        target.insert("collateral_ratio".to_string(), PropertyValue::Number(1.5));
        let mut params = PropertyMap::new();
        params.insert("stock_change".to_string(), PropertyValue::Number(-0.4));
        let graph = FakeGraph { neighbors: vec![] };

        let ctx = make_ctx(&params, &target, &graph);
        let result = compute_margin_gap(&ctx).unwrap();
        assert_eq!(
            result.updated_properties.get("margin_gap"),
            Some(&PropertyValue::Number(100_000.0))
        );
    }

    #[test]
    fn adjust_numeric_defaults_missing_property_to_zero() {
        let target = PropertyMap::new();
        let mut params = PropertyMap::new();
        params.insert("property".to_string(), PropertyValue::String("valuation".into()));
        params.insert("factor".to_string(), PropertyValue::Number(0.8));
        let graph = FakeGraph { neighbors: vec![] };

        let ctx = make_ctx(&params, &target, &graph);
        let result = adjust_numeric(&ctx).unwrap();
        assert_eq!(
            result.updated_properties.get("valuation"),
            Some(&PropertyValue::Number(0.0))
        );
    }
}
