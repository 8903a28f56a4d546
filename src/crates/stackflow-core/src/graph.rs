//! Graph data structures and the persisted definition format.
//!
//! A stack is stored by the builder UI as a flat JSON object of nodes and
//! edges ([`WorkflowDef`]). At load time that definition is converted into a
//! [`Graph`] whose nodes carry a typed [`NodeKind`], so each node's
//! configuration is validated once up front instead of being re-read from an
//! untyped map on every dispatch.
//!
//! Ordering is part of the model: nodes and edges keep the order they appear
//! in the definition, and both "the entry node" and "the outgoing edge of a
//! node" are resolved as *first match in that order*. A definition with
//! several query-intake nodes or a node with several outgoing edges is
//! therefore executable, with a stable, documented outcome;
//! [`Graph::validate_strict`] is available for callers that prefer to reject
//! such definitions outright.
//!
//! # Example
//!
//! ```rust
//! use stackflow_core::graph::{Graph, NodeKind};
//!
//! let mut graph = Graph::new();
//! graph.add_node("in", NodeKind::QueryIntake);
//! graph.add_node("llm", NodeKind::LlmInference { prompt: None, model: None });
//! graph.add_edge("in", "llm");
//!
//! assert!(graph.validate().is_ok());
//! assert_eq!(graph.entry().unwrap().id, "in");
//! ```

use crate::error::{Result, StackflowError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Node identifier, unique within a graph.
pub type NodeId = String;

/// The typed behavior of a node, together with the configuration that
/// behavior reads.
///
/// Each variant corresponds to one declared node type in the persisted
/// definition; [`NodeKind::from_data`] maps the definition's `label`
/// discriminator onto a variant and picks up only the configuration keys that
/// variant actually uses. Empty-string configuration values are normalized to
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Entry marker. Carries no configuration and has no behavior.
    QueryIntake,

    /// Retrieves document snippets for the query from a named collection.
    KnowledgeBase {
        /// Collection to search; the node is skipped when absent.
        collection: Option<String>,
    },

    /// Fetches top web results for the query.
    WebSearch,

    /// Ingests a remote repository into textual context.
    GitRepo {
        /// Repository URL or `owner/repo` shorthand; skipped when absent.
        repo_url: Option<String>,
    },

    /// Renders the accumulated result into a paginated report file.
    PdfGenerator {
        /// Output filename, defaulting to `report.pdf`.
        filename: Option<String>,
    },

    /// Produces the final result text from the query and gathered contexts.
    LlmInference {
        /// Persona / instruction prefix for the model.
        prompt: Option<String>,
        /// Model identifier override.
        model: Option<String>,
    },

    /// Any declared type outside the fixed set. Dispatching it is a warned
    /// no-op; the walk still follows its outgoing edge.
    Unrecognized(String),
}

impl NodeKind {
    /// Declared type string for the query-intake entry marker.
    pub const QUERY_INTAKE_LABEL: &'static str = "Query Intake";

    /// Build a kind from a definition node's `data` payload.
    pub fn from_data(data: &NodeData) -> Self {
        match data.label.as_str() {
            Self::QUERY_INTAKE_LABEL => NodeKind::QueryIntake,
            "Knowledge Base" => NodeKind::KnowledgeBase {
                collection: non_empty(data.file_name.clone()),
            },
            "Web Search" => NodeKind::WebSearch,
            "Git Repo" => NodeKind::GitRepo {
                repo_url: non_empty(data.repo_url.clone()),
            },
            "PDF Generator" => NodeKind::PdfGenerator {
                filename: non_empty(data.filename.clone()),
            },
            "LLM Inference" => NodeKind::LlmInference {
                prompt: non_empty(data.prompt.clone()),
                model: non_empty(data.model.clone()),
            },
            other => NodeKind::Unrecognized(other.to_string()),
        }
    }

    /// The declared type string this kind corresponds to.
    pub fn label(&self) -> &str {
        match self {
            NodeKind::QueryIntake => Self::QUERY_INTAKE_LABEL,
            NodeKind::KnowledgeBase { .. } => "Knowledge Base",
            NodeKind::WebSearch => "Web Search",
            NodeKind::GitRepo { .. } => "Git Repo",
            NodeKind::PdfGenerator { .. } => "PDF Generator",
            NodeKind::LlmInference { .. } => "LLM Inference",
            NodeKind::Unrecognized(label) => label,
        }
    }

    /// Whether this node marks the start of a walk.
    pub fn is_entry(&self) -> bool {
        matches!(self, NodeKind::QueryIntake)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A node in an executable graph.
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier within the graph.
    pub id: NodeId,
    /// Typed behavior and configuration.
    pub kind: NodeKind,
}

/// A directed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Source node id.
    pub source: NodeId,
    /// Target node id.
    pub target: NodeId,
}

/// An executable stack graph: ordered nodes plus ordered edges.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a persisted definition into an executable graph.
    ///
    /// Unknown declared types become [`NodeKind::Unrecognized`] rather than
    /// failing the conversion; use [`validate_strict`](Self::validate_strict)
    /// to reject them.
    pub fn from_def(def: &WorkflowDef) -> Self {
        let nodes = def
            .nodes
            .iter()
            .map(|n| Node {
                id: n.id.clone(),
                kind: NodeKind::from_data(&n.data),
            })
            .collect();
        let edges = def
            .edges
            .iter()
            .map(|e| Edge {
                source: e.source.clone(),
                target: e.target.clone(),
            })
            .collect();
        Self { nodes, edges }
    }

    /// Append a node. Insertion order is preserved and significant.
    pub fn add_node(&mut self, id: impl Into<NodeId>, kind: NodeKind) {
        self.nodes.push(Node {
            id: id.into(),
            kind,
        });
    }

    /// Append a directed edge. Insertion order is preserved and significant.
    pub fn add_edge(&mut self, source: impl Into<NodeId>, target: impl Into<NodeId>) {
        self.edges.push(Edge {
            source: source.into(),
            target: target.into(),
        });
    }

    /// All nodes, in definition order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges, in definition order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Look up a node by id (linear scan in definition order).
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// The entry node: the *first* node (in definition order) whose kind is
    /// [`NodeKind::QueryIntake`].
    pub fn entry(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.kind.is_entry())
    }

    /// The *first* edge (in definition order) leaving the given node.
    pub fn first_edge_from(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.source == id)
    }

    /// Validate that the graph is executable.
    ///
    /// Only the entry-node precondition is enforced here; dangling edges are
    /// legal and simply end the walk early.
    pub fn validate(&self) -> Result<()> {
        if self.entry().is_none() {
            return Err(StackflowError::MissingEntryNode);
        }
        Ok(())
    }

    /// Validate under the stricter rules an authoring tool may want:
    /// exactly one entry node, at most one outgoing edge per node, no edge
    /// endpoint outside the node set, and no unrecognized node types.
    pub fn validate_strict(&self) -> Result<()> {
        self.validate()?;

        let entries = self.nodes.iter().filter(|n| n.kind.is_entry()).count();
        if entries > 1 {
            return Err(StackflowError::validation(format!(
                "expected exactly one query intake node, found {entries}"
            )));
        }

        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        if ids.len() != self.nodes.len() {
            return Err(StackflowError::validation("duplicate node ids"));
        }

        let mut seen_sources = HashSet::new();
        for edge in &self.edges {
            if !ids.contains(edge.source.as_str()) {
                return Err(StackflowError::validation(format!(
                    "edge source '{}' does not exist",
                    edge.source
                )));
            }
            if !ids.contains(edge.target.as_str()) {
                return Err(StackflowError::validation(format!(
                    "edge target '{}' does not exist",
                    edge.target
                )));
            }
            if !seen_sources.insert(edge.source.as_str()) {
                return Err(StackflowError::validation(format!(
                    "node '{}' has more than one outgoing edge",
                    edge.source
                )));
            }
        }

        for node in &self.nodes {
            if let NodeKind::Unrecognized(label) = &node.kind {
                return Err(StackflowError::validation(format!(
                    "node '{}' has unrecognized type '{label}'",
                    node.id
                )));
            }
        }

        Ok(())
    }
}

/// Persisted stack definition, as written by the builder UI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowDef {
    /// Node definitions, in authoring order.
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    /// Edge definitions, in authoring order.
    #[serde(default)]
    pub edges: Vec<EdgeDef>,
}

impl WorkflowDef {
    /// Parse a definition from its stored JSON form.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(json.clone())?)
    }
}

/// One node of a persisted definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDef {
    /// Node identifier.
    pub id: NodeId,
    /// Declared type plus flat configuration keys.
    pub data: NodeData,
}

/// The `data` payload of a definition node.
///
/// The builder stores presentation-only keys (positions, API-key fields typed
/// into the UI, embedding model pickers) alongside the ones the engine reads;
/// those are collected into `extra` and ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeData {
    /// Declared node type discriminator.
    #[serde(default)]
    pub label: String,

    /// Collection identifier for knowledge-base nodes.
    #[serde(rename = "fileName", default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    /// Repository reference for git nodes.
    #[serde(rename = "repoUrl", default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,

    /// Prompt template for inference nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// Model identifier for inference nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Output filename for report nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Keys the engine does not read.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One edge of a persisted definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDef {
    /// Source node id.
    pub source: NodeId,
    /// Target node id.
    pub target: NodeId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn def_from(value: serde_json::Value) -> WorkflowDef {
        WorkflowDef::from_json(&value).unwrap()
    }

    #[test]
    fn parses_builder_json() {
        let def = def_from(json!({
            "nodes": [
                {"id": "n1", "data": {"label": "Query Intake", "x": 10}},
                {"id": "n2", "data": {"label": "Knowledge Base", "fileName": "doc1.pdf", "apiKey": "ui-only"}},
                {"id": "n3", "data": {"label": "LLM Inference", "prompt": "Be brief.", "model": "gemini-1.5-pro"}}
            ],
            "edges": [
                {"source": "n1", "target": "n2"},
                {"source": "n2", "target": "n3"}
            ]
        }));

        let graph = Graph::from_def(&def);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.entry().unwrap().id, "n1");
        assert_eq!(
            graph.node("n2").unwrap().kind,
            NodeKind::KnowledgeBase {
                collection: Some("doc1.pdf".to_string())
            }
        );
        assert_eq!(
            graph.node("n3").unwrap().kind,
            NodeKind::LlmInference {
                prompt: Some("Be brief.".to_string()),
                model: Some("gemini-1.5-pro".to_string()),
            }
        );
    }

    #[test]
    fn empty_config_values_become_none() {
        let def = def_from(json!({
            "nodes": [
                {"id": "kb", "data": {"label": "Knowledge Base", "fileName": "  "}},
                {"id": "git", "data": {"label": "Git Repo", "repoUrl": ""}}
            ],
            "edges": []
        }));

        let graph = Graph::from_def(&def);
        assert_eq!(
            graph.node("kb").unwrap().kind,
            NodeKind::KnowledgeBase { collection: None }
        );
        assert_eq!(
            graph.node("git").unwrap().kind,
            NodeKind::GitRepo { repo_url: None }
        );
    }

    #[test]
    fn unknown_label_is_unrecognized() {
        let def = def_from(json!({
            "nodes": [{"id": "x", "data": {"label": "Quantum Widget"}}],
            "edges": []
        }));

        let graph = Graph::from_def(&def);
        assert_eq!(
            graph.node("x").unwrap().kind,
            NodeKind::Unrecognized("Quantum Widget".to_string())
        );
    }

    #[test]
    fn entry_picks_first_in_definition_order() {
        let mut graph = Graph::new();
        graph.add_node("a", NodeKind::WebSearch);
        graph.add_node("b", NodeKind::QueryIntake);
        graph.add_node("c", NodeKind::QueryIntake);

        assert_eq!(graph.entry().unwrap().id, "b");
    }

    #[test]
    fn first_edge_picks_first_in_definition_order() {
        let mut graph = Graph::new();
        graph.add_node("a", NodeKind::QueryIntake);
        graph.add_node("b", NodeKind::WebSearch);
        graph.add_node("c", NodeKind::WebSearch);
        graph.add_edge("a", "b");
        graph.add_edge("a", "c");

        assert_eq!(graph.first_edge_from("a").unwrap().target, "b");
    }

    #[test]
    fn validate_requires_entry_node() {
        let mut graph = Graph::new();
        graph.add_node("a", NodeKind::WebSearch);

        assert!(matches!(
            graph.validate(),
            Err(StackflowError::MissingEntryNode)
        ));
    }

    #[test]
    fn validate_allows_dangling_edges() {
        let mut graph = Graph::new();
        graph.add_node("a", NodeKind::QueryIntake);
        graph.add_edge("a", "ghost");

        assert!(graph.validate().is_ok());
    }

    #[test]
    fn validate_strict_rejects_ambiguity() {
        let mut graph = Graph::new();
        graph.add_node("a", NodeKind::QueryIntake);
        graph.add_node("b", NodeKind::QueryIntake);
        assert!(graph.validate_strict().is_err());

        let mut graph = Graph::new();
        graph.add_node("a", NodeKind::QueryIntake);
        graph.add_node("b", NodeKind::WebSearch);
        graph.add_node("c", NodeKind::WebSearch);
        graph.add_edge("a", "b");
        graph.add_edge("a", "c");
        assert!(graph.validate_strict().is_err());

        let mut graph = Graph::new();
        graph.add_node("a", NodeKind::QueryIntake);
        graph.add_edge("a", "ghost");
        assert!(graph.validate_strict().is_err());

        let mut graph = Graph::new();
        graph.add_node("a", NodeKind::QueryIntake);
        graph.add_node("x", NodeKind::Unrecognized("Widget".to_string()));
        assert!(graph.validate_strict().is_err());
    }
}
