//! In-memory node/edge collections backing the rendered graph.
//!
//! The store is the single source of truth for what is drawn: one successful
//! load clears and repopulates both collections, so the store always reflects
//! exactly one document. Lookups are keyed by element id, which is how click
//! handling resolves a selection back to its record.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

/// Free-form key/value metadata attached to a node or edge, passed through
/// from the source document unmodified.
pub type AttributeBag = serde_json::Map<String, Value>;

/// Identifier of a node or edge, unique within one loaded document.
///
/// Gephi documents may carry ids as JSON strings or numbers; numeric ids are
/// normalized to their decimal rendering so both live in one key space.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(String);

impl ElementId {
	/// Create an id from anything string-like.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Convert a JSON value into an id. Only strings and numbers qualify.
	pub fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::String(s) => Some(Self(s.clone())),
			Value::Number(n) => Some(Self(n.to_string())),
			_ => None,
		}
	}

	/// The id as a plain string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ElementId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ElementId {
	fn from(id: &str) -> Self {
		Self(id.to_owned())
	}
}

impl From<String> for ElementId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

/// A renderable node: display fields consumed by the canvas plus the opaque
/// attribute bag shown in the details panel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeRecord {
	/// Unique identifier within the loaded document.
	pub id: ElementId,
	/// Optional display label.
	pub label: Option<String>,
	/// Optional layout position.
	pub x: Option<f64>,
	/// Optional layout position.
	pub y: Option<f64>,
	/// Optional render-size hint from the source document.
	pub size: Option<f64>,
	/// CSS color, present only when color parsing was requested.
	pub color: Option<String>,
	/// Whether the node is locked against layout re-computation.
	pub fixed: bool,
	/// Domain metadata, opaque to the visualization core.
	pub attributes: AttributeBag,
}

/// A renderable edge between two node ids.
///
/// Referential integrity is advisory: an edge may reference a node absent
/// from the same load and is kept anyway.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeRecord {
	/// Unique identifier within the loaded document.
	pub id: ElementId,
	/// Id of the source node.
	pub source: ElementId,
	/// Id of the target node.
	pub target: ElementId,
	/// Optional relationship name.
	pub title: Option<String>,
	/// Domain metadata, opaque to the visualization core.
	pub attributes: AttributeBag,
}

/// Mutable node/edge collections keyed by id.
///
/// Inserting a record with an id already present overwrites it, so duplicate
/// ids in a malformed document resolve last-write-wins. No cross-reference
/// validation happens here.
#[derive(Clone, Debug, Default)]
pub struct GraphStore {
	nodes: HashMap<ElementId, NodeRecord>,
	edges: HashMap<ElementId, EdgeRecord>,
}

impl GraphStore {
	/// Create an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Empty both collections.
	pub fn clear(&mut self) {
		self.nodes.clear();
		self.edges.clear();
	}

	/// Insert nodes, overwriting any existing record with the same id.
	pub fn add_nodes(&mut self, nodes: impl IntoIterator<Item = NodeRecord>) {
		for node in nodes {
			self.nodes.insert(node.id.clone(), node);
		}
	}

	/// Insert edges, overwriting any existing record with the same id.
	pub fn add_edges(&mut self, edges: impl IntoIterator<Item = EdgeRecord>) {
		for edge in edges {
			self.edges.insert(edge.id.clone(), edge);
		}
	}

	/// Look up a node by id.
	pub fn node(&self, id: &ElementId) -> Option<&NodeRecord> {
		self.nodes.get(id)
	}

	/// Look up an edge by id.
	pub fn edge(&self, id: &ElementId) -> Option<&EdgeRecord> {
		self.edges.get(id)
	}

	/// Number of nodes currently held.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Number of edges currently held.
	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	/// True when both collections are empty.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}

	/// Iterate over all nodes in unspecified order.
	pub fn nodes(&self) -> impl Iterator<Item = &NodeRecord> {
		self.nodes.values()
	}

	/// Iterate over all edges in unspecified order.
	pub fn edges(&self) -> impl Iterator<Item = &EdgeRecord> {
		self.edges.values()
	}
}
