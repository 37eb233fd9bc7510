//! Evaluates the restricted boolean expression language a `RippleRule`
//! condition is written in, against a two-variable `source`/`target`
//! environment. A parse failure or a type mismatch evaluates to `false`
//! rather than propagating — conditions are a filter, not a fallible step
//! that should abort an action.

use ripple_types::PropertyValue;

use crate::ast::{BinaryExpression, BinaryOperator, Expression, Literal, Scope, UnaryOperator};
use crate::parser::Parser;

/// Parses `condition` and evaluates it against `source`/`target` attribute
/// lookups. Any lex/parse/type error collapses to `false`.
pub fn evaluate_condition(
    condition: &str,
    source: &dyn Fn(&str) -> PropertyValue,
    target: &dyn Fn(&str) -> PropertyValue,
) -> bool {
    match Parser::parse(condition) {
        Ok(expr) => eval(&expr, source, target)
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        Err(_) => false,
    }
}

/// A value produced mid-evaluation: attribute lookups and literals are
/// typed a bit more richly than `bool` so comparisons can distinguish
/// numbers from strings before collapsing to a boolean leaf.
#[derive(Debug, Clone, PartialEq)]
enum EvalValue {
    Bool(bool),
    Number(f64),
    String(String),
    Null,
}

impl EvalValue {
    fn as_bool(&self) -> Option<bool> {
        match self {
            EvalValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

fn from_property(value: PropertyValue) -> EvalValue {
    match value {
        PropertyValue::Null => EvalValue::Null,
        PropertyValue::Bool(b) => EvalValue::Bool(b),
        PropertyValue::Number(n) => EvalValue::Number(n),
        PropertyValue::String(s) => EvalValue::String(s),
        PropertyValue::Map(_) => EvalValue::Null,
    }
}

fn eval(
    expr: &Expression,
    source: &dyn Fn(&str) -> PropertyValue,
    target: &dyn Fn(&str) -> PropertyValue,
) -> Option<EvalValue> {
    match expr {
        Expression::Literal(lit) => Some(match lit {
            Literal::String(s) => EvalValue::String(s.clone()),
            Literal::Number(n) => EvalValue::Number(*n),
            Literal::Boolean(b) => EvalValue::Bool(*b),
            Literal::Null => EvalValue::Null,
        }),
        Expression::Attribute { scope, property } => {
            let value = match scope {
                Scope::Source => source(property),
                Scope::Target => target(property),
            };
            Some(from_property(value))
        }
        Expression::Unary(unary) => {
            let operand = eval(&unary.operand, source, target)?;
            match unary.operator {
                UnaryOperator::Not => Some(EvalValue::Bool(!truthy(&operand))),
            }
        }
        Expression::Binary(binary) => eval_binary(binary, source, target),
    }
}

fn eval_binary(
    binary: &BinaryExpression,
    source: &dyn Fn(&str) -> PropertyValue,
    target: &dyn Fn(&str) -> PropertyValue,
) -> Option<EvalValue> {
    if matches!(binary.operator, BinaryOperator::And | BinaryOperator::Or) {
        let left = eval(&binary.left, source, target)?;
        return Some(EvalValue::Bool(match binary.operator {
            BinaryOperator::And => truthy(&left) && truthy(&eval(&binary.right, source, target)?),
            BinaryOperator::Or => truthy(&left) || truthy(&eval(&binary.right, source, target)?),
            _ => unreachable!(),
        }));
    }

    let left = eval(&binary.left, source, target)?;
    let right = eval(&binary.right, source, target)?;

    let result = match binary.operator {
        BinaryOperator::Equals => values_equal(&left, &right),
        BinaryOperator::NotEquals => !values_equal(&left, &right),
        BinaryOperator::LessThan
        | BinaryOperator::LessEqual
        | BinaryOperator::GreaterThan
        | BinaryOperator::GreaterEqual => {
            let (EvalValue::Number(l), EvalValue::Number(r)) = (&left, &right) else {
                return Some(EvalValue::Bool(false));
            };
            match binary.operator {
                BinaryOperator::LessThan => l < r,
                BinaryOperator::LessEqual => l <= r,
                BinaryOperator::GreaterThan => l > r,
                BinaryOperator::GreaterEqual => l >= r,
                _ => unreachable!(),
            }
        }
        BinaryOperator::And | BinaryOperator::Or => unreachable!(),
    };
    Some(EvalValue::Bool(result))
}

fn truthy(value: &EvalValue) -> bool {
    match value {
        EvalValue::Bool(b) => *b,
        EvalValue::Null => false,
        EvalValue::Number(n) => *n != 0.0,
        EvalValue::String(s) => !s.is_empty(),
    }
}

fn values_equal(left: &EvalValue, right: &EvalValue) -> bool {
    match (left, right) {
        (EvalValue::Number(l), EvalValue::Number(r)) => l == r,
        (EvalValue::String(l), EvalValue::String(r)) => l == r,
        (EvalValue::Bool(l), EvalValue::Bool(r)) => l == r,
        (EvalValue::Null, EvalValue::Null) => true,
        _ => false,
    }
}
