//! Completion summaries for hub and connector nodes.
//!
//! Hubs count every checklist below them, descending through connector
//! nodes. Connectors count their direct checklist children. Other node types
//! carry no summary.

use std::collections::{BTreeMap, HashMap, HashSet};

use panday_types::progress::{NodeStatus, ProgressData};
use panday_types::roadmap::{GraphNode, NodeContent, NodeType};

fn node_type(node_id: &str, content: &BTreeMap<String, NodeContent>) -> Option<NodeType> {
    content.get(node_id).map(|c| c.frontmatter.node_type)
}

pub fn direct_children<'a>(node_id: &str, nodes: &'a [GraphNode]) -> Vec<&'a GraphNode> {
    nodes
        .iter()
        .filter(|n| n.parent_id.as_deref() == Some(node_id))
        .collect()
}

/// All checklist nodes below `node_id`, recursing through non-checklist
/// children. Each node is visited at most once, so a `parentId` cycle
/// terminates.
pub fn descendant_checklists<'a>(
    node_id: &str,
    nodes: &'a [GraphNode],
    content: &BTreeMap<String, NodeContent>,
) -> Vec<&'a GraphNode> {
    let mut visited = HashSet::from([node_id.to_string()]);
    let mut stack = vec![node_id.to_string()];
    let mut checklists = Vec::new();

    while let Some(current) = stack.pop() {
        for child in direct_children(&current, nodes) {
            if !visited.insert(child.id.clone()) {
                continue;
            }
            if node_type(&child.id, content) == Some(NodeType::Checklist) {
                checklists.push(child);
            } else {
                stack.push(child.id.clone());
            }
        }
    }
    checklists
}

pub fn calculate_node_progress(
    node_id: &str,
    node_type: NodeType,
    statuses: &HashMap<String, NodeStatus>,
    nodes: &[GraphNode],
    content: &BTreeMap<String, NodeContent>,
) -> Option<ProgressData> {
    if !node_type.tracks_progress() {
        return None;
    }

    let targets: Vec<&GraphNode> = if node_type == NodeType::Hub {
        descendant_checklists(node_id, nodes, content)
    } else {
        direct_children(node_id, nodes)
            .into_iter()
            .filter(|n| node_type_is_checklist(&n.id, content))
            .collect()
    };

    let completed = targets
        .iter()
        .filter(|n| statuses.get(&n.id) == Some(&NodeStatus::Completed))
        .count();
    Some(ProgressData::new(completed, targets.len()))
}

fn node_type_is_checklist(node_id: &str, content: &BTreeMap<String, NodeContent>) -> bool {
    node_type(node_id, content) == Some(NodeType::Checklist)
}

/// Progress for several nodes. Nodes without content are left out; nodes
/// whose type carries no summary map to `None`.
pub fn calculate_multiple_node_progress(
    node_ids: &[String],
    statuses: &HashMap<String, NodeStatus>,
    nodes: &[GraphNode],
    content: &BTreeMap<String, NodeContent>,
) -> BTreeMap<String, Option<ProgressData>> {
    node_ids
        .iter()
        .filter_map(|id| {
            let ty = node_type(id, content)?;
            Some((
                id.clone(),
                calculate_node_progress(id, ty, statuses, nodes, content),
            ))
        })
        .collect()
}
