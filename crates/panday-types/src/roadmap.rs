//! Roadmap domain types: metadata, graph layout, and per-node markdown content.
//!
//! These mirror the on-disk JSON/YAML shapes under `<roadmaps_dir>/<roadmap_id>/`,
//! so field names serialize in camelCase.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of a roadmap node, taken from the `type` field of its frontmatter.
///
/// `Resources`, `Actions` and `Roadblocks` are connector nodes that group
/// checklist children under a hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Hub,
    Requirement,
    Portal,
    Checkpoint,
    Terminal,
    Category,
    Checklist,
    Resources,
    Actions,
    Roadblocks,
}

impl NodeType {
    /// Connector node types whose progress counts direct checklist children.
    pub fn is_connector(&self) -> bool {
        matches!(
            self,
            NodeType::Resources | NodeType::Actions | NodeType::Roadblocks
        )
    }

    /// Whether this node type carries a progress summary at all.
    pub fn tracks_progress(&self) -> bool {
        *self == NodeType::Hub || self.is_connector()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeType::Hub => "hub",
            NodeType::Requirement => "requirement",
            NodeType::Portal => "portal",
            NodeType::Checkpoint => "checkpoint",
            NodeType::Terminal => "terminal",
            NodeType::Category => "category",
            NodeType::Checklist => "checklist",
            NodeType::Resources => "resources",
            NodeType::Actions => "actions",
            NodeType::Roadblocks => "roadblocks",
        };
        f.write_str(s)
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hub" => Ok(NodeType::Hub),
            "requirement" => Ok(NodeType::Requirement),
            "portal" => Ok(NodeType::Portal),
            "checkpoint" => Ok(NodeType::Checkpoint),
            "terminal" => Ok(NodeType::Terminal),
            "category" => Ok(NodeType::Category),
            "checklist" => Ok(NodeType::Checklist),
            "resources" => Ok(NodeType::Resources),
            "actions" => Ok(NodeType::Actions),
            "roadblocks" => Ok(NodeType::Roadblocks),
            other => Err(format!("invalid node type: '{other}'")),
        }
    }
}

/// Metadata for an entire roadmap (`metadata.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapMetadata {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: String,
    pub last_updated: String,
}

/// Where a node label is drawn relative to the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPosition {
    Top,
    Bottom,
    Left,
    Right,
}

/// YAML frontmatter at the top of each `content/<node_id>.md` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeFrontmatter {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Visual node kind used by the renderer; may differ from `type`.
    #[serde(rename = "nodeType")]
    pub display_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glow: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_position: Option<LabelPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_label_dot: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisites: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// A `[label](href)` link listed under a node's `## Resources` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLink {
    pub label: String,
    pub href: String,
}

/// Parsed markdown content for a single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeContent {
    pub frontmatter: NodeFrontmatter,
    /// Markdown body with the frontmatter block removed.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefits: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcomes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<ResourceLink>>,
}

/// Structured sections extracted from a node's markdown body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownSections {
    pub eligibility: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    pub outcomes: Option<Vec<String>>,
    pub resources: Option<Vec<ResourceLink>>,
}

/// 2D layout coordinates of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Side of a node that an edge attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleSide {
    Top,
    Bottom,
    Left,
    Right,
}

/// Node position and hierarchy data from `graph.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_position: Option<HandleSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_position: Option<HandleSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

/// Edge rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Bezier,
    Straight,
    Step,
    Smoothstep,
}

/// Connection between two nodes from `graph.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EdgeKind>,
}

/// Complete graph structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadmapGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Combined roadmap data: metadata, graph, and node content keyed by node ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    pub metadata: RoadmapMetadata,
    pub graph: RoadmapGraph,
    pub content: BTreeMap<String, NodeContent>,
}

impl Roadmap {
    /// Node type for `node_id`, if the node has a content file.
    pub fn node_type(&self, node_id: &str) -> Option<NodeType> {
        self.content.get(node_id).map(|c| c.frontmatter.node_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_type_round_trips_through_str() {
        for s in ["hub", "checklist", "roadblocks", "terminal"] {
            let t: NodeType = s.parse().unwrap();
            assert_eq!(t.to_string(), s);
        }
        assert!("unknown".parse::<NodeType>().is_err());
    }

    #[test]
    fn connector_types_track_progress() {
        assert!(NodeType::Hub.tracks_progress());
        assert!(NodeType::Actions.tracks_progress());
        assert!(!NodeType::Hub.is_connector());
        assert!(!NodeType::Checklist.tracks_progress());
        assert!(!NodeType::Portal.tracks_progress());
    }

    #[test]
    fn graph_json_deserializes_optional_fields() {
        let json = r#"{
            "nodes": [
                {"id": "hub-1", "position": {"x": 10, "y": 20.5}, "sourcePosition": "right"},
                {"id": "chk-1", "position": {"x": 0, "y": 0}, "parentId": "hub-1", "categoryId": null}
            ],
            "edges": [
                {"id": "e1", "source": "hub-1", "target": "chk-1", "type": "smoothstep"}
            ]
        }"#;
        let graph: RoadmapGraph = serde_json::from_str(json).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[0].source_position, Some(HandleSide::Right));
        assert_eq!(graph.nodes[1].parent_id.as_deref(), Some("hub-1"));
        assert_eq!(graph.nodes[1].category_id, None);
        assert_eq!(graph.edges[0].kind, Some(EdgeKind::Smoothstep));
    }

    #[test]
    fn metadata_uses_camel_case() {
        let json = r#"{"id":"electrician-bc","title":"Electrician","version":"1.0","lastUpdated":"2025-01-01"}"#;
        let meta: RoadmapMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.last_updated, "2025-01-01");
        assert!(meta.province.is_none());

        let out = serde_json::to_value(&meta).unwrap();
        assert!(out.get("lastUpdated").is_some());
        assert!(out.get("province").is_none());
    }
}
