//! Ripple propagation engine: the condition-expression lexer/parser/
//! evaluator, the propagation-path DSL, the effect registry and built-in
//! effect library, the ripple executor, the insight formatter, and the
//! execution history.
//!
//! # Layout
//!
//! - `path` - parses `RippleRule::propagation_path` strings
//! - `lexer` / `ast` / `parser` / `evaluator` - the restricted boolean
//!   condition language
//! - `registry` / `effects` - the effect-function registry and built-ins
//! - `executor` - the ripple executor driving one action's propagation
//! - `insight` - insight template interpolation
//! - `history` - the append-only event log

pub mod ast;
pub mod effects;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod history;
pub mod insight;
pub mod lexer;
pub mod parser;
pub mod path;
pub mod registry;

pub use error::{Error, Result};
pub use executor::{ExecutionResult, RippleExecutor};
pub use history::{DeltaGraph, HighlightEdge, History, SimulationEvent, UpdatedNode};
pub use insight::Insight;
pub use path::{parse_path, ParsedPath};
pub use registry::{Effect, EffectContext, EffectModule, EffectResult, GraphView, Registry, Source};

/// Parses a condition expression string into its AST, without evaluating
/// it. Exposed mainly for tooling (e.g. a workspace linter that wants to
/// validate every `rule.condition` at load time).
pub fn parse_condition(condition: &str) -> Result<ast::Expression> {
    parser::Parser::parse(condition)
}
