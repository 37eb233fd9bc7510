//! Shared data model for the ripple simulation engine: property values and
//! the workspace JSON schema. No behavior lives here — just types other
//! crates build on.

mod property;
mod workspace;

pub use property::{PropertyMap, PropertyValue};
pub use workspace::{
    Action, ActionEngine, DirectEffect, EdgeTypeDef, EffectOnTarget, GraphData, GraphEdge,
    GraphNode, Metadata, NodeTypeDef, OntologyDef, RippleRule, WorkspaceConfig,
};
