//! Parses a `RippleRule::propagation_path` string into the
//! `(direction, edge_type, node_type)` triple the executor matches edges
//! against.
//!
//! Exactly two shapes are accepted:
//!
//! - `<-[EDGE_TYPE]- NodeType` (incoming)
//! - `-[EDGE_TYPE]-> NodeType` (outgoing)
//!
//! A malformed path is not an error: it returns `None`, so one broken rule
//! skips its neighbor match instead of aborting the whole action.

use ripple_graph::Direction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    pub direction: Direction,
    pub edge_type: String,
    pub node_type: String,
}

/// Returns `None` on anything that isn't one of the two recognized shapes.
pub fn parse_path(path: &str) -> Option<ParsedPath> {
    let trimmed = path.trim();

    if let Some(rest) = trimmed.strip_prefix("<-[") {
        let (edge_type, rest) = rest.split_once(']')?;
        let node_type = rest.strip_prefix('-')?.trim();
        if edge_type.is_empty() || node_type.is_empty() {
            return None;
        }
        return Some(ParsedPath {
            direction: Direction::Incoming,
            edge_type: edge_type.to_string(),
            node_type: node_type.to_string(),
        });
    }

    if let Some(rest) = trimmed.strip_prefix("-[") {
        let (edge_type, rest) = rest.split_once(']')?;
        let node_type = rest.strip_prefix("->")?.trim();
        if edge_type.is_empty() || node_type.is_empty() {
            return None;
        }
        return Some(ParsedPath {
            direction: Direction::Outgoing,
            edge_type: edge_type.to_string(),
            node_type: node_type.to_string(),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_incoming_path() {
        let parsed = parse_path("<-[ACQUIRES]- Company").unwrap();
        assert_eq!(parsed.direction, Direction::Incoming);
        assert_eq!(parsed.edge_type, "ACQUIRES");
        assert_eq!(parsed.node_type, "Company");
    }

    #[test]
    fn parses_outgoing_path() {
        let parsed = parse_path("-[SUPPLIES_TO]-> Company").unwrap();
        assert_eq!(parsed.direction, Direction::Outgoing);
        assert_eq!(parsed.edge_type, "SUPPLIES_TO");
        assert_eq!(parsed.node_type, "Company");
    }

    #[test]
    fn trims_whitespace_around_node_type() {
        let parsed = parse_path("-[LINKS]->   Bank  ").unwrap();
        assert_eq!(parsed.node_type, "Bank");
    }

    #[test]
    fn malformed_path_yields_no_match_rather_than_erroring() {
        assert_eq!(parse_path("not a path"), None);
        assert_eq!(parse_path("-[MISSING_ARROW]Company"), None);
        assert_eq!(parse_path("<-[]- Company"), None);
        assert_eq!(parse_path("-[EDGE]->"), None);
    }
}
