//! Formats a `RippleRule`'s insight metadata into a structured `Insight`
//! record, interpolating `{source[attr]}` / `{target[attr]}` placeholders
//! against the rule's source and neighbor node attributes.

use ripple_types::PropertyMap;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub text: String,
    #[serde(rename = "type")]
    pub insight_type: String,
    pub severity: String,
    pub source_node: String,
    pub target_node: String,
    pub rule_id: String,
}

/// Builds the warning insight emitted when a rule's `action_to_trigger`
/// isn't registered.
pub fn unregistered_function_insight(
    function_name: &str,
    source_node: &str,
    target_node: &str,
    rule_id: &str,
) -> Insight {
    Insight {
        text: format!("Warning: action function '{function_name}' not registered"),
        insight_type: "warning".to_string(),
        severity: "warning".to_string(),
        source_node: source_node.to_string(),
        target_node: target_node.to_string(),
        rule_id: rule_id.to_string(),
    }
}

/// Builds the insight for a ripple rule that fired successfully.
pub fn format_insight(
    template: Option<&str>,
    insight_type: Option<&str>,
    severity: Option<&str>,
    source_node: &str,
    target_node: &str,
    rule_id: &str,
    source_attrs: &PropertyMap,
    target_attrs: &PropertyMap,
) -> Insight {
    let text = match template {
        Some(t) => interpolate(t, source_attrs, target_attrs),
        None => format!("Rule {rule_id}: effect applied to {target_node}"),
    };
    Insight {
        text,
        insight_type: insight_type.unwrap_or("info").to_string(),
        severity: severity.unwrap_or("info").to_string(),
        source_node: source_node.to_string(),
        target_node: target_node.to_string(),
        rule_id: rule_id.to_string(),
    }
}

/// Expands every `{source[attr]}` / `{target[attr]}` placeholder it can
/// resolve; a placeholder whose key is missing from the attribute map is
/// left verbatim in the output — missing keys fail silently.
fn interpolate(template: &str, source_attrs: &PropertyMap, target_attrs: &PropertyMap) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(brace) = rest.find('{') {
        out.push_str(&rest[..brace]);
        let after_brace = &rest[brace..];

        let Some(close) = after_brace.find('}') else {
            out.push_str(after_brace);
            rest = "";
            break;
        };
        let placeholder = &after_brace[1..close];

        let resolved = resolve_placeholder(placeholder, source_attrs, target_attrs);
        match resolved {
            Some(value) => out.push_str(&value),
            None => out.push_str(&after_brace[..=close]),
        }
        rest = &after_brace[close + 1..];
    }
    out.push_str(rest);
    out
}

fn resolve_placeholder(placeholder: &str, source_attrs: &PropertyMap, target_attrs: &PropertyMap) -> Option<String> {
    let (scope, key) = placeholder.split_once('[')?;
    let key = key.strip_suffix(']')?;
    let attrs = match scope {
        "source" => source_attrs,
        "target" => target_attrs,
        _ => return None,
    };
    attrs.get(key).map(|v| v.to_string())
}
