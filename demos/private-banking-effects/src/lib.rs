//! Worked example of a statically linked custom-effect module: a crate
//! that implements `EffectModule` and is wired into the registry after
//! built-ins, so any effect it declares under a built-in's name wins.
//!
//! Two effects are registered here:
//!
//! - `set_property` overrides the built-in of the same name, appending
//!   `_CUSTOM` to whatever value it writes.
//! - `flag_margin_breach` is a private-banking-specific effect with no
//!   built-in counterpart: it writes a `margin_breach` boolean by
//!   comparing the target's `margin_gap` against a `threshold` parameter.

use std::sync::Arc;

use ripple_engine::{Effect, EffectContext, EffectModule, EffectResult, Registry, Source};
use ripple_engine::error::Result;
use ripple_types::PropertyValue;

pub struct PrivateBankingEffects;

impl EffectModule for PrivateBankingEffects {
    fn register(&self, registry: &mut Registry) {
        registry.register("set_property", Arc::new(custom_set_property), Source::Custom);
        registry.register("flag_margin_breach", Arc::new(flag_margin_breach), Source::Custom);
    }
}

fn custom_set_property(ctx: &EffectContext<'_>) -> Result<EffectResult> {
    let property = ctx
        .parameters
        .get("property")
        .and_then(PropertyValue::as_str)
        .unwrap_or("value")
        .to_string();
    let raw_value = ctx.parameters.get("value").cloned().unwrap_or_default();
    let new_value = match raw_value {
        PropertyValue::String(s) => PropertyValue::String(format!("{s}_CUSTOM")),
        other => other,
    };
    let old_value = ctx.target_attrs.get(&property).cloned().unwrap_or_default();

    let mut result = EffectResult::default();
    result.updated_properties.insert(property.clone(), new_value);
    result.old_values.insert(property, old_value);
    Ok(result)
}

fn flag_margin_breach(ctx: &EffectContext<'_>) -> Result<EffectResult> {
    let threshold = ctx.parameters.get("threshold").and_then(PropertyValue::as_f64).unwrap_or(0.0);
    let margin_gap = ctx.target_attrs.get("margin_gap").and_then(PropertyValue::as_f64).unwrap_or(0.0);
    let old_value = ctx.target_attrs.get("margin_breach").cloned().unwrap_or_default();

    let mut result = EffectResult::default();
    result
        .updated_properties
        .insert("margin_breach".to_string(), PropertyValue::Bool(margin_gap > threshold));
    result.old_values.insert("margin_breach".to_string(), old_value);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_engine::registry::GraphView;
    use ripple_types::PropertyMap;

    struct NoGraph;
    impl GraphView for NoGraph {
        fn node_attrs(&self, _id: &str) -> Option<PropertyMap> {
            None
        }
        fn out_neighbors(&self, _id: &str) -> Vec<(String, String, PropertyMap)> {
            Vec::new()
        }
        fn in_neighbors(&self, _id: &str) -> Vec<(String, String, PropertyMap)> {
            Vec::new()
        }
    }

    #[test]
    fn custom_set_property_overrides_and_appends_suffix() {
        let mut registry = Registry::new();
        ripple_engine::effects::register_builtins(&mut registry);
        PrivateBankingEffects.register(&mut registry);
        assert_eq!(registry.source_of("set_property"), Some(Source::Custom));

        let mut params = PropertyMap::new();
        params.insert("property".to_string(), PropertyValue::String("status".into()));
        params.insert("value".to_string(), PropertyValue::String("FAILED".into()));
        let target = PropertyMap::new();
        let graph = NoGraph;

        let ctx = EffectContext {
            source_id: "s",
            target_id: "t",
            source_attrs: &target,
            target_attrs: &target,
            parameters: &params,
            graph: &graph,
        };
        let effect = registry.get("set_property").unwrap();
        let result = effect.call(&ctx).unwrap();
        assert_eq!(result.updated_properties.get("status"), Some(&PropertyValue::String("FAILED_CUSTOM".into())));
    }

    #[test]
    fn flag_margin_breach_compares_against_threshold() {
        let mut target = PropertyMap::new();
        target.insert("margin_gap".to_string(), PropertyValue::Number(150_000.0));
        let mut params = PropertyMap::new();
        params.insert("threshold".to_string(), PropertyValue::Number(100_000.0));
        let graph = NoGraph;

        let ctx = EffectContext {
            source_id: "s",
            target_id: "t",
            source_attrs: &target,
            target_attrs: &target,
            parameters: &params,
            graph: &graph,
        };
        let result = flag_margin_breach(&ctx).unwrap();
        assert_eq!(result.updated_properties.get("margin_breach"), Some(&PropertyValue::Bool(true)));
    }
}
