//! Structural checks for roadmap graphs.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use panday_types::roadmap::{NodeType, Roadmap};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationErrorKind {
    MissingParent,
    MissingTarget,
    MissingPosition,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValidationErrorKind::MissingParent => "missing-parent",
            ValidationErrorKind::MissingTarget => "missing-target",
            ValidationErrorKind::MissingPosition => "missing-position",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    #[serde(rename = "type")]
    pub kind: ValidationErrorKind,
    pub node_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// A checklist content file and the parent it claims.
#[derive(Debug, Clone)]
pub struct ChecklistRef {
    pub file_name: String,
    pub parent_id: String,
}

/// Outgoing connections of one node.
#[derive(Debug, Clone)]
pub struct NodeConnections {
    pub node_id: String,
    pub target_ids: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NodeLayout {
    pub node_id: String,
    pub has_position: bool,
}

pub fn validate_parent_references(
    checklist_files: &[ChecklistRef],
    existing_node_ids: &HashSet<String>,
) -> Vec<ValidationError> {
    checklist_files
        .iter()
        .filter(|c| !existing_node_ids.contains(&c.parent_id))
        .map(|c| ValidationError {
            kind: ValidationErrorKind::MissingParent,
            node_id: c.parent_id.clone(),
            message: format!(
                "Checklist file \"{}\" references non-existent parent \"{}\"",
                c.file_name, c.parent_id
            ),
            target: None,
        })
        .collect()
}

pub fn validate_connection_targets(
    connections: &[NodeConnections],
    existing_node_ids: &HashSet<String>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for conn in connections {
        for target in &conn.target_ids {
            if !existing_node_ids.contains(target) {
                errors.push(ValidationError {
                    kind: ValidationErrorKind::MissingTarget,
                    node_id: conn.node_id.clone(),
                    message: format!(
                        "Node \"{}\" connects to non-existent node \"{}\"",
                        conn.node_id, target
                    ),
                    target: Some(target.clone()),
                });
            }
        }
    }
    errors
}

pub fn validate_node_positions(nodes: &[NodeLayout]) -> Vec<ValidationError> {
    nodes
        .iter()
        .filter(|n| !n.has_position)
        .map(|n| ValidationError {
            kind: ValidationErrorKind::MissingPosition,
            node_id: n.node_id.clone(),
            message: format!("Node \"{}\" missing layout.position", n.node_id),
            target: None,
        })
        .collect()
}

pub fn format_validation_errors(errors: &[ValidationError]) -> Vec<String> {
    errors.iter().map(|e| format!("❌ {}", e.message)).collect()
}

/// Emit errors at error level. Does nothing for an empty slice.
pub fn log_validation_errors(errors: &[ValidationError]) {
    if errors.is_empty() {
        return;
    }
    tracing::error!(count = errors.len(), "validation errors found");
    for line in format_validation_errors(errors) {
        tracing::error!("  {line}");
    }
}

/// Run every check against a loaded roadmap.
///
/// Graph nodes define the existing IDs. Checklist parents come from the
/// graph's `parentId`; content files without a graph node lack a position.
pub fn validate_roadmap(roadmap: &Roadmap) -> Vec<ValidationError> {
    let existing: HashSet<String> = roadmap.graph.nodes.iter().map(|n| n.id.clone()).collect();

    let checklists: Vec<ChecklistRef> = roadmap
        .graph
        .nodes
        .iter()
        .filter(|n| roadmap.node_type(&n.id) == Some(NodeType::Checklist))
        .filter_map(|n| {
            n.parent_id.as_ref().map(|parent| ChecklistRef {
                file_name: format!("{}.md", n.id),
                parent_id: parent.clone(),
            })
        })
        .collect();

    let mut by_source: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for edge in &roadmap.graph.edges {
        by_source
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.clone());
    }
    let connections: Vec<NodeConnections> = by_source
        .into_iter()
        .map(|(source, targets)| NodeConnections {
            node_id: source.to_string(),
            target_ids: targets,
        })
        .collect();

    let layouts: Vec<NodeLayout> = roadmap
        .content
        .keys()
        .map(|id| NodeLayout {
            node_id: id.clone(),
            has_position: existing.contains(id),
        })
        .collect();

    let mut errors = validate_parent_references(&checklists, &existing);
    errors.extend(validate_connection_targets(&connections, &existing));
    errors.extend(validate_node_positions(&layouts));
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roadmap::testing::sample_roadmap;

    fn ids(list: &[&str]) -> HashSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_parent_is_reported() {
        let refs = vec![
            ChecklistRef {
                file_name: "a.md".to_string(),
                parent_id: "hub".to_string(),
            },
            ChecklistRef {
                file_name: "b.md".to_string(),
                parent_id: "ghost".to_string(),
            },
        ];
        let errors = validate_parent_references(&refs, &ids(&["hub"]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::MissingParent);
        assert_eq!(errors[0].node_id, "ghost");
        assert_eq!(
            errors[0].message,
            "Checklist file \"b.md\" references non-existent parent \"ghost\""
        );
    }

    #[test]
    fn missing_targets_are_reported_per_target() {
        let conns = vec![NodeConnections {
            node_id: "a".to_string(),
            target_ids: vec!["b".to_string(), "x".to_string(), "y".to_string()],
        }];
        let errors = validate_connection_targets(&conns, &ids(&["a", "b"]));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].target.as_deref(), Some("x"));
        assert_eq!(
            errors[1].message,
            "Node \"a\" connects to non-existent node \"y\""
        );
    }

    #[test]
    fn missing_positions_are_reported() {
        let nodes = vec![
            NodeLayout {
                node_id: "a".to_string(),
                has_position: true,
            },
            NodeLayout {
                node_id: "b".to_string(),
                has_position: false,
            },
        ];
        let errors = validate_node_positions(&nodes);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Node \"b\" missing layout.position");
    }

    #[test]
    fn formats_with_marker() {
        let errors = validate_node_positions(&[NodeLayout {
            node_id: "n".to_string(),
            has_position: false,
        }]);
        assert_eq!(
            format_validation_errors(&errors),
            vec!["❌ Node \"n\" missing layout.position".to_string()]
        );
        log_validation_errors(&[]);
        log_validation_errors(&errors);
    }

    #[test]
    fn sample_roadmap_is_valid() {
        assert!(validate_roadmap(&sample_roadmap("electrician-bc")).is_empty());
    }

    #[test]
    fn broken_roadmap_reports_every_kind() {
        let mut roadmap = sample_roadmap("electrician-bc");
        roadmap.graph.nodes.retain(|n| n.id != "level-1-resources");
        roadmap.graph.edges[0].target = "nowhere".to_string();

        let errors = validate_roadmap(&roadmap);
        let kinds: HashSet<_> = errors.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&ValidationErrorKind::MissingParent));
        assert!(kinds.contains(&ValidationErrorKind::MissingTarget));
        assert!(kinds.contains(&ValidationErrorKind::MissingPosition));
    }

    #[test]
    fn serializes_kind_as_type() {
        let err = &validate_node_positions(&[NodeLayout {
            node_id: "n".to_string(),
            has_position: false,
        }])[0];
        let json = serde_json::to_value(err).unwrap();
        assert_eq!(json["type"], "missing-position");
        assert_eq!(json["nodeId"], "n");
        assert!(json.get("target").is_none());
    }
}
