//! Diagram data model shared by the decoder, the view-state and the painter.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::shapes::drawn_size;

/// Default node width when the schema does not carry one.
pub const DEFAULT_NODE_WIDTH: f64 = 140.0;
/// Default node height when the schema does not carry one.
pub const DEFAULT_NODE_HEIGHT: f64 = 96.0;

/// Identity of a node within one diagram.
///
/// Numeric and textual ids are kept apart, so `1` and `"1"` are different
/// nodes and each round-trips to the wire unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
	/// An integer id, as produced by generated schemas.
	Number(i64),
	/// A free-form id, as typed into the "Add Node" dialog.
	Text(String),
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NodeId::Number(n) => write!(f, "{n}"),
			NodeId::Text(s) => f.write_str(s),
		}
	}
}

impl From<&str> for NodeId {
	fn from(value: &str) -> Self {
		NodeId::Text(value.to_owned())
	}
}

impl From<String> for NodeId {
	fn from(value: String) -> Self {
		NodeId::Text(value)
	}
}

impl From<i64> for NodeId {
	fn from(value: i64) -> Self {
		NodeId::Number(value)
	}
}

/// The system component a node stands for. Decides shape, colors and glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
	/// Drawn as a cylinder.
	Database,
	/// Drawn as a diamond.
	LoadBalancer,
	/// Drawn as a rounded rectangle.
	Service,
	/// Drawn as two stacked rounded rectangles.
	Queue,
	/// Drawn as a hexagon.
	Cache,
}

impl NodeKind {
	/// Every kind, in the order the "Add Node" dialog offers them.
	pub const ALL: [NodeKind; 5] = [
		NodeKind::Service,
		NodeKind::Database,
		NodeKind::LoadBalancer,
		NodeKind::Queue,
		NodeKind::Cache,
	];

	/// Wire tag, e.g. `load_balancer`.
	pub fn as_str(self) -> &'static str {
		match self {
			NodeKind::Database => "database",
			NodeKind::LoadBalancer => "load_balancer",
			NodeKind::Service => "service",
			NodeKind::Queue => "queue",
			NodeKind::Cache => "cache",
		}
	}

	/// Parses a wire tag. Unknown tags yield `None`.
	pub fn from_tag(tag: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
	}

	/// Human readable name for menus.
	pub fn display_name(self) -> &'static str {
		match self {
			NodeKind::Database => "Database",
			NodeKind::LoadBalancer => "Load Balancer",
			NodeKind::Service => "Service",
			NodeKind::Queue => "Queue",
			NodeKind::Cache => "Cache",
		}
	}
}

/// A node as held by the canvas view-state.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagramNode {
	/// Unique within the diagram.
	pub id: NodeId,
	/// Fixed after creation.
	pub kind: NodeKind,
	/// Left edge in canvas units.
	pub x: f64,
	/// Top edge in canvas units.
	pub y: f64,
	/// Width in canvas units.
	pub w: f64,
	/// Height in canvas units.
	pub h: f64,
	/// Text drawn under the shape.
	pub label: Option<String>,
}

impl DiagramNode {
	/// Center of the drawn shape, the anchor for relationship lines.
	pub fn center(&self) -> (f64, f64) {
		let (w, h) = drawn_size(self.w, self.h);
		(self.x + w / 2.0, self.y + h / 2.0)
	}

	/// Whether the canvas point lies inside the drawn shape's box.
	pub fn contains(&self, px: f64, py: f64) -> bool {
		let (w, h) = drawn_size(self.w, self.h);
		px >= self.x && px <= self.x + w && py >= self.y && py <= self.y + h
	}
}

/// A directed edge between two nodes. Endpoints may dangle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiagramRelationship {
	/// Node the edge starts at.
	pub source: NodeId,
	/// Node the arrow points to.
	pub to: NodeId,
	/// Semantic tag such as `dependency` or `reads_writes`.
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
}

/// Persisted shape of a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireNode {
	/// Node id, number or text.
	pub id: NodeId,
	/// Label, or the id when the node has none.
	pub name: String,
	/// Wire tag of the kind.
	#[serde(rename = "type")]
	pub kind: NodeKind,
	/// Always written empty.
	pub description: String,
	/// Left edge.
	pub x: f64,
	/// Top edge.
	pub y: f64,
	/// Stored width, unclamped.
	pub w: f64,
	/// Stored height, unclamped.
	pub h: f64,
}

/// The JSON document stored in a project's UML record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramSchema {
	/// Every node, in drawing order.
	pub nodes: Vec<WireNode>,
	/// Every relationship, dangling ones included.
	pub relationships: Vec<DiagramRelationship>,
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	#[test]
	fn node_ids_keep_their_json_type() {
		let ids: Vec<NodeId> = serde_json::from_value(json!([1, "1", "api"])).unwrap();
		assert_eq!(
			ids,
			vec![NodeId::Number(1), NodeId::from("1"), NodeId::from("api")]
		);
		assert_ne!(ids[0], ids[1]);
		assert_eq!(serde_json::to_value(&ids).unwrap(), json!([1, "1", "api"]));
	}

	#[test]
	fn kind_tags_are_snake_case() {
		assert_eq!(NodeKind::from_tag("load_balancer"), Some(NodeKind::LoadBalancer));
		assert_eq!(NodeKind::from_tag("LoadBalancer"), None);
		assert_eq!(
			serde_json::to_value(NodeKind::LoadBalancer).unwrap(),
			json!("load_balancer")
		);
	}

	#[test]
	fn relationship_type_is_omitted_when_absent() {
		let rel = DiagramRelationship {
			source: "a".into(),
			to: "b".into(),
			kind: None,
		};
		assert_eq!(
			serde_json::to_value(&rel).unwrap(),
			json!({ "source": "a", "to": "b" })
		);
	}
}
