//! Effect registry: maps an effect-function name to a callable
//! implementation, tagged by provenance. Entries carry a `Source` tag so
//! custom registrations can be told apart from built-ins and are
//! guaranteed to win when both declare the same name.

use std::collections::BTreeMap;
use std::sync::Arc;

use ripple_types::PropertyMap;

use crate::error::Result;

/// Where an effect function came from. `Custom` always overwrites
/// `Builtin` on a name collision — see `Registry::register`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Builtin,
    Custom,
}

/// Read-only traversal handle handed to effect functions that need to look
/// beyond the target node (`graph_weighted_exposure`). Effects may not
/// mutate the graph through this handle; all writes go through
/// `EffectResult::updated_properties`.
pub trait GraphView {
    fn node_attrs(&self, id: &str) -> Option<PropertyMap>;
    fn out_neighbors(&self, id: &str) -> Vec<(String, String, PropertyMap)>;
    fn in_neighbors(&self, id: &str) -> Vec<(String, String, PropertyMap)>;
}

/// Everything an effect function needs to compute its result.
pub struct EffectContext<'a> {
    pub source_id: &'a str,
    pub target_id: &'a str,
    pub source_attrs: &'a PropertyMap,
    pub target_attrs: &'a PropertyMap,
    pub parameters: &'a PropertyMap,
    pub graph: &'a dyn GraphView,
}

/// What an effect function produces: the properties to write back onto the
/// target node, and the values they're replacing (for the delta's
/// `_old_<prop>` entries).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectResult {
    pub updated_properties: PropertyMap,
    pub old_values: PropertyMap,
}

pub trait Effect: Send + Sync {
    fn call(&self, ctx: &EffectContext<'_>) -> Result<EffectResult>;
}

impl<F> Effect for F
where
    F: Fn(&EffectContext<'_>) -> Result<EffectResult> + Send + Sync,
{
    fn call(&self, ctx: &EffectContext<'_>) -> Result<EffectResult> {
        self(ctx)
    }
}

struct Entry {
    effect: Arc<dyn Effect>,
    source: Source,
}

/// Name → effect lookup table. A `BTreeMap` keeps `list()` sorted by name
/// for free.
#[derive(Default)]
pub struct Registry {
    entries: BTreeMap<String, Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `effect` under `name`. A later call with the same `name`
    /// replaces the earlier one outright — callers are responsible for
    /// registering built-ins before custom effects so custom wins.
    pub fn register(&mut self, name: impl Into<String>, effect: Arc<dyn Effect>, source: Source) {
        self.entries.insert(name.into(), Entry { effect, source });
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Effect>> {
        self.entries.get(name).map(|e| e.effect.clone())
    }

    pub fn source_of(&self, name: &str) -> Option<Source> {
        self.entries.get(name).map(|e| e.source)
    }

    /// Sorted `(name, source)` pairs, for the load summary's
    /// `registered_functions` field.
    pub fn list(&self) -> Vec<(String, Source)> {
        self.entries.iter().map(|(n, e)| (n.clone(), e.source)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A statically linked effect module registers itself through this trait —
/// a compile-time registration entry point, rather than a dynamically
/// loaded plug-in.
pub trait EffectModule {
    fn register(&self, registry: &mut Registry);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_ctx: &EffectContext<'_>) -> Result<EffectResult> {
        Ok(EffectResult::default())
    }

    #[test]
    fn custom_registration_overwrites_builtin_of_the_same_name() {
        let mut reg = Registry::new();
        reg.register("set_property", Arc::new(noop), Source::Builtin);
        reg.register("set_property", Arc::new(noop), Source::Custom);
        assert_eq!(reg.source_of("set_property"), Some(Source::Custom));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn list_is_sorted_by_name() {
        let mut reg = Registry::new();
        reg.register("zeta", Arc::new(noop), Source::Builtin);
        reg.register("alpha", Arc::new(noop), Source::Builtin);
        let names: Vec<_> = reg.list().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[test]
    fn unknown_name_returns_none() {
        let reg = Registry::new();
        assert!(reg.get("nonexistent_func").is_none());
    }
}
