//! Translation of Gephi-shaped JSON documents into renderable records.
//!
//! The Gephi JSON convention lists nodes and edges as arrays of objects with
//! an id, optional position/size/color, and free-form attributes carried
//! either inline or under an explicit `attributes` object. Parsing is strict:
//! a single malformed entry fails the whole document so a half-consistent
//! graph is never rendered.

use std::error::Error;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use super::store::{AttributeBag, EdgeRecord, ElementId, NodeRecord};

/// Adapter options, mirroring the conventions of Gephi importers.
#[derive(Clone, Copy, Debug, Default)]
pub struct GephiOptions {
	/// Lock node positions against layout re-computation. Only nodes that
	/// actually carry a position can be locked.
	pub fixed: bool,
	/// Interpret colors from the source document instead of leaving them to
	/// default styling.
	pub parse_color: bool,
}

/// Fully adapted result of one parse, not yet committed anywhere.
#[derive(Clone, Debug, Default)]
pub struct ParsedGraph {
	/// Adapted node records.
	pub nodes: Vec<NodeRecord>,
	/// Adapted edge records.
	pub edges: Vec<EdgeRecord>,
}

/// Why a document could not be adapted.
#[derive(Clone, Debug, PartialEq)]
pub enum ParseError {
	/// The body was not valid JSON.
	Json(String),
	/// The document has no top-level `nodes` key.
	MissingNodes,
	/// A top-level collection was present but not an array.
	NotAnArray(&'static str),
	/// A node entry could not be read.
	Node {
		/// Index of the entry in the `nodes` array.
		index: usize,
		/// What was wrong with it.
		reason: String,
	},
	/// An edge entry could not be read.
	Edge {
		/// Index of the entry in the `edges` array.
		index: usize,
		/// What was wrong with it.
		reason: String,
	},
}

impl fmt::Display for ParseError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ParseError::Json(e) => write!(f, "invalid JSON: {e}"),
			ParseError::MissingNodes => write!(f, "document has no top-level \"nodes\" array"),
			ParseError::NotAnArray(key) => write!(f, "\"{key}\" is not an array"),
			ParseError::Node { index, reason } => write!(f, "node {index}: {reason}"),
			ParseError::Edge { index, reason } => write!(f, "edge {index}: {reason}"),
		}
	}
}

impl Error for ParseError {}

#[derive(Debug, Default, Deserialize)]
struct RawNode {
	id: Option<Value>,
	label: Option<String>,
	x: Option<f64>,
	y: Option<f64>,
	size: Option<f64>,
	color: Option<String>,
	fixed: Option<bool>,
	attributes: Option<AttributeBag>,
	#[serde(flatten)]
	extra: AttributeBag,
}

#[derive(Debug, Default, Deserialize)]
struct RawEdge {
	id: Option<Value>,
	source: Option<Value>,
	target: Option<Value>,
	title: Option<String>,
	attributes: Option<AttributeBag>,
	#[serde(flatten)]
	extra: AttributeBag,
}

/// Parse a Gephi document into node and edge records.
///
/// Every entry of `document.nodes` and `document.edges` must adapt cleanly or
/// the whole parse fails. An absent `edges` key is treated as an empty edge
/// list; an absent `nodes` key is an error (a document without it is a delta,
/// not a full graph).
pub fn parse(document: &Value, options: &GephiOptions) -> Result<ParsedGraph, ParseError> {
	let nodes: &[Value] = match document.get("nodes") {
		None => return Err(ParseError::MissingNodes),
		Some(Value::Array(nodes)) => nodes,
		Some(_) => return Err(ParseError::NotAnArray("nodes")),
	};
	let edges: &[Value] = match document.get("edges") {
		None => &[],
		Some(Value::Array(edges)) => edges,
		Some(_) => return Err(ParseError::NotAnArray("edges")),
	};

	let mut parsed = ParsedGraph {
		nodes: Vec::with_capacity(nodes.len()),
		edges: Vec::with_capacity(edges.len()),
	};
	for (index, value) in nodes.iter().enumerate() {
		parsed.nodes.push(parse_node(index, value, options)?);
	}
	for (index, value) in edges.iter().enumerate() {
		parsed.edges.push(parse_edge(index, value)?);
	}
	Ok(parsed)
}

fn parse_node(index: usize, value: &Value, options: &GephiOptions) -> Result<NodeRecord, ParseError> {
	let raw: RawNode = serde_json::from_value(value.clone()).map_err(|e| ParseError::Node {
		index,
		reason: e.to_string(),
	})?;
	let id = raw
		.id
		.as_ref()
		.and_then(ElementId::from_value)
		.ok_or(ParseError::Node {
			index,
			reason: "missing id".into(),
		})?;

	// The bag is the explicit attributes object plus every inline key that is
	// not a positional/styling field; inline keys win on collision.
	let mut attributes = raw.attributes.unwrap_or_default();
	attributes.extend(raw.extra);

	let has_position = raw.x.is_some() && raw.y.is_some();
	Ok(NodeRecord {
		id,
		label: raw.label,
		x: raw.x,
		y: raw.y,
		size: raw.size,
		color: if options.parse_color { raw.color } else { None },
		fixed: raw.fixed.unwrap_or(options.fixed) && has_position,
		attributes,
	})
}

fn parse_edge(index: usize, value: &Value) -> Result<EdgeRecord, ParseError> {
	let raw: RawEdge = serde_json::from_value(value.clone()).map_err(|e| ParseError::Edge {
		index,
		reason: e.to_string(),
	})?;
	let require = |field: &'static str, value: &Option<Value>| {
		value
			.as_ref()
			.and_then(ElementId::from_value)
			.ok_or(ParseError::Edge {
				index,
				reason: format!("missing {field}"),
			})
	};
	let id = require("id", &raw.id)?;
	let source = require("source", &raw.source)?;
	let target = require("target", &raw.target)?;

	let mut attributes = raw.attributes.unwrap_or_default();
	attributes.extend(raw.extra);
	if let Some(title) = &raw.title {
		attributes
			.entry("title".to_owned())
			.or_insert_with(|| Value::String(title.clone()));
	}

	Ok(EdgeRecord {
		id,
		source,
		target,
		title: raw.title,
		attributes,
	})
}
