//! Decoding of stored diagram documents into canvas nodes and back.
//!
//! Stored schemas come from several generations of the editor and from the
//! design generator, so the decoder accepts `{nodes, relationships}` objects,
//! bare node arrays and position aliases (`left`/`top`, `width`/`height`).
//! It never coerces values: an entry that cannot be decoded is rejected and
//! reported as a [`DecodeIssue`], and the rest of the diagram still loads.

use std::collections::HashSet;
use std::fmt;

use log::warn;
use serde_json::{Map, Value};
use thiserror::Error;

use super::types::{
	DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH, DiagramNode, DiagramRelationship, DiagramSchema,
	NodeId, NodeKind, WireNode,
};

/// Nodes per row of the fallback layout.
pub const GRID_COLUMNS: usize = 4;
/// Horizontal distance between fallback grid cells.
pub const GRID_SPACING_X: f64 = 220.0;
/// Vertical distance between fallback grid rows.
pub const GRID_SPACING_Y: f64 = 160.0;
/// Offset of the first grid cell, also the default for a single missing axis.
pub const GRID_ORIGIN: f64 = 40.0;

/// Which list of the document an entry came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaSection {
	/// The `nodes` list (or the bare array).
	Nodes,
	/// The `relationships` list.
	Relationships,
}

impl fmt::Display for SchemaSection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			SchemaSection::Nodes => "node",
			SchemaSection::Relationships => "relationship",
		})
	}
}

/// Why an entry was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IssueReason {
	/// Neither an object nor anything decodable.
	#[error("entry is not an object")]
	NotAnObject,
	/// Node without a `type`.
	#[error("missing type")]
	MissingType,
	/// Node `type` outside [`NodeKind`].
	#[error("unknown node type `{0}`")]
	UnknownType(String),
	/// Coordinate or size key holding a non-number.
	#[error("`{0}` is not a number")]
	NotANumber(&'static str),
	/// Id that is neither a string nor an integer.
	#[error("`{0}` is not a string or integer id")]
	MalformedId(&'static str),
	/// Relationship lacking `source` or `to`.
	#[error("missing `{0}`")]
	MissingEndpoint(&'static str),
	/// Relationship `type` that is not a string.
	#[error("`type` is not a string")]
	MalformedRelationshipType,
	/// Id already used by an earlier node.
	#[error("duplicate node id `{0}`")]
	DuplicateId(NodeId),
}

/// A rejected schema entry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{section} #{index}: {reason}")]
pub struct DecodeIssue {
	/// List the entry belongs to.
	pub section: SchemaSection,
	/// Position of the entry in its source list.
	pub index: usize,
	/// What was wrong with it.
	pub reason: IssueReason,
}

/// Result of decoding a stored schema.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedDiagram {
	/// Decoded nodes, in source order.
	pub nodes: Vec<DiagramNode>,
	/// Decoded relationships. Endpoints are not checked against `nodes`.
	pub relationships: Vec<DiagramRelationship>,
	/// Entries that were skipped.
	pub issues: Vec<DecodeIssue>,
}

/// Position of the `index`-th entry in the fallback grid.
pub fn grid_position(index: usize) -> (f64, f64) {
	(
		GRID_ORIGIN + (index % GRID_COLUMNS) as f64 * GRID_SPACING_X,
		GRID_ORIGIN + (index / GRID_COLUMNS) as f64 * GRID_SPACING_Y,
	)
}

/// Decodes any JSON value into canvas nodes and relationships.
pub fn normalize(schema: &Value) -> NormalizedDiagram {
	let mut issues = Vec::new();
	let nodes = normalize_nodes(schema, &mut issues);
	let relationships = normalize_relationships(schema, &mut issues);
	for issue in &issues {
		warn!("Skipping diagram entry: {issue}");
	}
	NormalizedDiagram {
		nodes,
		relationships,
		issues,
	}
}

/// Maps the view-state back to the stored document shape.
///
/// `name` is re-derived from the label (or the id) and `description` is
/// written empty; descriptions are not tracked on the canvas.
pub fn serialize(nodes: &[DiagramNode], relationships: &[DiagramRelationship]) -> DiagramSchema {
	DiagramSchema {
		nodes: nodes
			.iter()
			.map(|n| WireNode {
				id: n.id.clone(),
				name: n.label.clone().unwrap_or_else(|| n.id.to_string()),
				kind: n.kind,
				description: String::new(),
				x: n.x,
				y: n.y,
				w: n.w,
				h: n.h,
			})
			.collect(),
		relationships: relationships.to_vec(),
	}
}

/// Hands out `node-N` ids that are not already taken.
#[derive(Debug, Default)]
pub struct FallbackIds {
	taken: HashSet<NodeId>,
	next: usize,
}

impl FallbackIds {
	/// Starts with the given ids marked as taken.
	pub fn new(taken: impl IntoIterator<Item = NodeId>) -> Self {
		Self {
			taken: taken.into_iter().collect(),
			next: 0,
		}
	}

	/// Returns the next free id and marks it taken.
	pub fn allocate(&mut self) -> NodeId {
		loop {
			self.next += 1;
			let id = NodeId::Text(format!("node-{}", self.next));
			if self.taken.insert(id.clone()) {
				return id;
			}
		}
	}
}

struct PendingNode {
	id: Option<NodeId>,
	kind: NodeKind,
	x: f64,
	y: f64,
	w: f64,
	h: f64,
	label: Option<String>,
}

fn node_entries(schema: &Value) -> &[Value] {
	match schema {
		Value::Object(map) => map
			.get("nodes")
			.and_then(Value::as_array)
			.map(Vec::as_slice)
			.unwrap_or_default(),
		Value::Array(entries) => entries,
		_ => &[],
	}
}

fn normalize_nodes(schema: &Value, issues: &mut Vec<DecodeIssue>) -> Vec<DiagramNode> {
	let mut seen = HashSet::new();
	let mut pending = Vec::new();

	for (index, entry) in node_entries(schema).iter().enumerate() {
		let reject = |reason| DecodeIssue {
			section: SchemaSection::Nodes,
			index,
			reason,
		};
		match decode_node(index, entry) {
			Ok(node) => {
				if let Some(id) = &node.id {
					if !seen.insert(id.clone()) {
						issues.push(reject(IssueReason::DuplicateId(id.clone())));
						continue;
					}
				}
				pending.push(node);
			}
			Err(reason) => issues.push(reject(reason)),
		}
	}

	let mut ids = FallbackIds::new(seen);
	pending
		.into_iter()
		.map(|n| DiagramNode {
			id: n.id.unwrap_or_else(|| ids.allocate()),
			kind: n.kind,
			x: n.x,
			y: n.y,
			w: n.w,
			h: n.h,
			label: n.label,
		})
		.collect()
}

fn decode_node(index: usize, entry: &Value) -> Result<PendingNode, IssueReason> {
	let entry = entry.as_object().ok_or(IssueReason::NotAnObject)?;

	let kind = match entry.get("type") {
		None | Some(Value::Null) => return Err(IssueReason::MissingType),
		Some(Value::String(tag)) => {
			NodeKind::from_tag(tag).ok_or_else(|| IssueReason::UnknownType(tag.clone()))?
		}
		Some(other) => return Err(IssueReason::UnknownType(other.to_string())),
	};

	let id = optional_id(entry, "id")?;

	let has_coords = ["x", "y", "left", "top"]
		.iter()
		.any(|key| !matches!(entry.get(*key), None | Some(Value::Null)));
	let (x, y) = if has_coords {
		(
			number_field(entry, &["x", "left"])?.unwrap_or(GRID_ORIGIN),
			number_field(entry, &["y", "top"])?.unwrap_or(GRID_ORIGIN),
		)
	} else {
		grid_position(index)
	};

	let w = number_field(entry, &["w", "width"])?
		.filter(|v| *v > 0.0)
		.unwrap_or(DEFAULT_NODE_WIDTH);
	let h = number_field(entry, &["h", "height"])?
		.filter(|v| *v > 0.0)
		.unwrap_or(DEFAULT_NODE_HEIGHT);

	let label = ["label", "name"]
		.iter()
		.filter_map(|key| entry.get(*key).and_then(Value::as_str))
		.find(|s| !s.trim().is_empty())
		.map(str::to_owned);

	Ok(PendingNode {
		id,
		kind,
		x,
		y,
		w,
		h,
		label,
	})
}

/// First non-null value among `keys`, which must be a JSON number.
fn number_field(
	entry: &Map<String, Value>,
	keys: &[&'static str],
) -> Result<Option<f64>, IssueReason> {
	for &key in keys {
		match entry.get(key) {
			None | Some(Value::Null) => continue,
			Some(Value::Number(n)) => return Ok(n.as_f64()),
			Some(_) => return Err(IssueReason::NotANumber(key)),
		}
	}
	Ok(None)
}

fn optional_id(entry: &Map<String, Value>, key: &'static str) -> Result<Option<NodeId>, IssueReason> {
	match entry.get(key) {
		None | Some(Value::Null) => Ok(None),
		Some(Value::String(s)) => Ok(Some(NodeId::Text(s.clone()))),
		Some(Value::Number(n)) => n
			.as_i64()
			.map(|n| Some(NodeId::Number(n)))
			.ok_or(IssueReason::MalformedId(key)),
		Some(_) => Err(IssueReason::MalformedId(key)),
	}
}

fn normalize_relationships(
	schema: &Value,
	issues: &mut Vec<DecodeIssue>,
) -> Vec<DiagramRelationship> {
	let Some(entries) = schema.get("relationships").and_then(Value::as_array) else {
		return Vec::new();
	};

	entries
		.iter()
		.enumerate()
		.filter_map(|(index, entry)| match decode_relationship(entry) {
			Ok(rel) => Some(rel),
			Err(reason) => {
				issues.push(DecodeIssue {
					section: SchemaSection::Relationships,
					index,
					reason,
				});
				None
			}
		})
		.collect()
}

fn decode_relationship(entry: &Value) -> Result<DiagramRelationship, IssueReason> {
	let entry = entry.as_object().ok_or(IssueReason::NotAnObject)?;
	let source = optional_id(entry, "source")?.ok_or(IssueReason::MissingEndpoint("source"))?;
	let to = optional_id(entry, "to")?.ok_or(IssueReason::MissingEndpoint("to"))?;
	let kind = match entry.get("type") {
		None | Some(Value::Null) => None,
		Some(Value::String(s)) => Some(s.clone()),
		Some(_) => return Err(IssueReason::MalformedRelationshipType),
	};
	Ok(DiagramRelationship { source, to, kind })
}
