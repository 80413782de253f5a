//! Canvas view-state: what is on the canvas, what is selected and dragged.

use std::collections::HashMap;

use thiserror::Error;

use super::schema::{self, NormalizedDiagram};
use super::shapes::{self, EdgeSegment};
use super::types::{DiagramNode, DiagramRelationship, DiagramSchema, NodeId, NodeKind};

/// Canvas width when the parent element reports none.
pub const DEFAULT_CANVAS_WIDTH: f64 = 800.0;
/// Canvas height used by the overview page.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 560.0;

/// Relationship tag used when the dialog leaves it blank.
pub const DEFAULT_RELATIONSHIP_KIND: &str = "dependency";

/// A node being dragged and where the pointer grabbed it.
#[derive(Clone, Debug, PartialEq)]
pub struct DragState {
	/// Node being dragged.
	pub node: NodeId,
	/// Pointer x minus the node's left edge at grab time.
	pub offset_x: f64,
	/// Pointer y minus the node's top edge at grab time.
	pub offset_y: f64,
}

/// Input of the "Add Node" dialog.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDraft {
	/// Requested id; blank falls back to `name`.
	pub id: String,
	/// Label; blank falls back to the id.
	pub name: String,
	/// Shape of the node.
	pub kind: NodeKind,
	/// Left edge.
	pub x: f64,
	/// Top edge.
	pub y: f64,
	/// Width, must be positive.
	pub w: f64,
	/// Height, must be positive.
	pub h: f64,
	/// Accepted for the form but not kept on the canvas.
	pub description: String,
}

/// Input of the "Add Relationship" dialog.
#[derive(Clone, Debug, PartialEq)]
pub struct RelationshipDraft {
	/// Picked source node.
	pub source: Option<NodeId>,
	/// Picked target node.
	pub to: Option<NodeId>,
	/// Tag as typed; blank means `dependency`.
	pub kind: String,
}

/// Dialog input rejected before anything is sent.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
	/// Both id and name are blank.
	#[error("Enter an id or a name for the node")]
	MissingIdentity,
	/// The id is already on the canvas.
	#[error("A node with id `{0}` already exists")]
	DuplicateId(NodeId),
	/// A numeric field did not parse.
	#[error("{0} must be a number")]
	NotANumber(&'static str),
	/// Zero or negative size.
	#[error("Width and height must be greater than zero")]
	InvalidSize,
	/// No source node picked.
	#[error("Pick a source node")]
	MissingSource,
	/// No target node picked.
	#[error("Pick a target node")]
	MissingTarget,
	/// Source and target are the same node.
	#[error("Source and target must be different nodes")]
	SelfRelationship,
}

/// Live, possibly unsaved state of the diagram canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorState {
	nodes: Vec<DiagramNode>,
	relationships: Vec<DiagramRelationship>,
	selected: Option<NodeId>,
	move_enabled: bool,
	drag: Option<DragState>,
	width: f64,
	height: f64,
}

impl EditorState {
	/// Fresh state over a decoded diagram: nothing selected, move disabled.
	pub fn new(diagram: NormalizedDiagram, width: f64, height: f64) -> Self {
		Self {
			nodes: diagram.nodes,
			relationships: diagram.relationships,
			selected: None,
			move_enabled: false,
			drag: None,
			width,
			height,
		}
	}

	/// State with no nodes.
	pub fn empty(width: f64, height: f64) -> Self {
		Self::new(NormalizedDiagram::default(), width, height)
	}

	/// Nodes in drawing order.
	pub fn nodes(&self) -> &[DiagramNode] {
		&self.nodes
	}

	/// Every relationship, dangling ones included.
	pub fn relationships(&self) -> &[DiagramRelationship] {
		&self.relationships
	}

	/// Looks a node up by id.
	pub fn node(&self, id: &NodeId) -> Option<&DiagramNode> {
		self.nodes.iter().find(|n| &n.id == id)
	}

	/// Ids in drawing order, for the relationship dialog.
	pub fn node_ids(&self) -> Vec<NodeId> {
		self.nodes.iter().map(|n| n.id.clone()).collect()
	}

	/// Currently selected node.
	pub fn selected(&self) -> Option<&NodeId> {
		self.selected.as_ref()
	}

	/// Whether `id` is the selected node.
	pub fn is_selected(&self, id: &NodeId) -> bool {
		self.selected.as_ref() == Some(id)
	}

	/// Whether dragging is allowed.
	pub fn move_enabled(&self) -> bool {
		self.move_enabled
	}

	/// The drag in progress, if any.
	pub fn drag(&self) -> Option<&DragState> {
		self.drag.as_ref()
	}

	/// Canvas width used for clamping.
	pub fn width(&self) -> f64 {
		self.width
	}

	/// Canvas height used for clamping.
	pub fn height(&self) -> f64 {
		self.height
	}

	/// Updates the clamping bounds. Nodes already placed are not moved.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Topmost node under the canvas point. Later nodes are drawn on top.
	pub fn node_at_position(&self, x: f64, y: f64) -> Option<usize> {
		self.nodes.iter().rposition(|n| n.contains(x, y))
	}

	/// Selects the node under the pointer and, in move mode, starts dragging
	/// it. Returns whether anything changed.
	pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
		let Some(idx) = self.node_at_position(x, y) else {
			return self.selected.take().is_some();
		};
		let node = &self.nodes[idx];
		if self.move_enabled {
			self.drag = Some(DragState {
				node: node.id.clone(),
				offset_x: x - node.x,
				offset_y: y - node.y,
			});
		}
		self.selected = Some(node.id.clone());
		true
	}

	/// Moves the dragged node so its grab point follows the pointer, kept
	/// fully inside the canvas.
	pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
		let Some(drag) = &self.drag else {
			return false;
		};
		let (width, height) = (self.width, self.height);
		let Some(node) = self.nodes.iter_mut().find(|n| n.id == drag.node) else {
			return false;
		};
		node.x = clamp_axis(x - drag.offset_x, width - node.w);
		node.y = clamp_axis(y - drag.offset_y, height - node.h);
		true
	}

	/// Ends a drag. Nothing is saved here.
	pub fn pointer_up(&mut self) -> bool {
		self.drag.take().is_some()
	}

	/// Flips move mode. Switching it off returns the schema to persist, even
	/// when no node moved.
	pub fn toggle_move(&mut self) -> Option<DiagramSchema> {
		self.drag = None;
		self.move_enabled = !self.move_enabled;
		(!self.move_enabled).then(|| self.to_schema())
	}

	/// Appends a node from the dialog and returns the schema to persist.
	pub fn add_node(&mut self, draft: NodeDraft) -> Result<DiagramSchema, ValidationError> {
		let (id, name) = (draft.id.trim(), draft.name.trim());
		let id = if id.is_empty() { name } else { id };
		let label = if name.is_empty() { id } else { name };
		if id.is_empty() {
			return Err(ValidationError::MissingIdentity);
		}
		let id = NodeId::from(id);
		if self.node(&id).is_some() {
			return Err(ValidationError::DuplicateId(id));
		}
		if !(draft.w > 0.0 && draft.h > 0.0) {
			return Err(ValidationError::InvalidSize);
		}

		self.nodes.push(DiagramNode {
			id,
			kind: draft.kind,
			x: draft.x,
			y: draft.y,
			w: draft.w,
			h: draft.h,
			label: Some(label.to_owned()),
		});
		Ok(self.to_schema())
	}

	/// Appends a relationship and returns the schema to persist. Endpoints
	/// are not required to exist.
	pub fn add_relationship(
		&mut self,
		draft: RelationshipDraft,
	) -> Result<DiagramSchema, ValidationError> {
		let source = draft.source.ok_or(ValidationError::MissingSource)?;
		let to = draft.to.ok_or(ValidationError::MissingTarget)?;
		if source == to {
			return Err(ValidationError::SelfRelationship);
		}
		let kind = match draft.kind.trim() {
			"" => DEFAULT_RELATIONSHIP_KIND.to_owned(),
			kind => kind.to_owned(),
		};

		self.relationships.push(DiagramRelationship {
			source,
			to,
			kind: Some(kind),
		});
		Ok(self.to_schema())
	}

	/// Drawable edges. Relationships naming a missing node are left out.
	pub fn edges(&self) -> Vec<EdgeSegment> {
		let by_id: HashMap<&NodeId, &DiagramNode> = self.nodes.iter().map(|n| (&n.id, n)).collect();
		self.relationships
			.iter()
			.filter_map(|r| {
				let (from, to) = (by_id.get(&r.source)?, by_id.get(&r.to)?);
				Some(shapes::edge_between(from, to, r.kind.as_deref()))
			})
			.collect()
	}

	/// The stored document for the current state.
	pub fn to_schema(&self) -> DiagramSchema {
		schema::serialize(&self.nodes, &self.relationships)
	}
}

fn clamp_axis(value: f64, max: f64) -> f64 {
	value.min(max).max(0.0)
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	fn editor(value: serde_json::Value) -> EditorState {
		EditorState::new(
			schema::normalize(&value),
			DEFAULT_CANVAS_WIDTH,
			DEFAULT_CANVAS_HEIGHT,
		)
	}

	fn two_services() -> EditorState {
		editor(json!({
			"nodes": [
				{ "id": "a", "type": "service" },
				{ "id": "b", "type": "database", "x": 400, "y": 300 }
			],
			"relationships": []
		}))
	}

	fn position(state: &EditorState, id: &str) -> (f64, f64) {
		let node = state.node(&id.into()).unwrap();
		(node.x, node.y)
	}

	#[test]
	fn pointer_down_only_selects_while_move_is_disabled() {
		let mut state = two_services();

		assert!(state.pointer_down(50.0, 50.0));
		assert_eq!(state.selected(), Some(&NodeId::from("a")));
		assert_eq!(state.drag(), None);

		assert!(!state.pointer_move(500.0, 500.0));
		assert_eq!(position(&state, "a"), (40.0, 40.0));
	}

	#[test]
	fn pointer_down_on_empty_canvas_clears_selection() {
		let mut state = two_services();
		state.pointer_down(50.0, 50.0);

		assert!(state.pointer_down(780.0, 10.0));
		assert_eq!(state.selected(), None);
		assert!(!state.pointer_down(780.0, 10.0));
	}

	#[test]
	fn drag_keeps_the_grab_offset() {
		let mut state = two_services();
		state.toggle_move();

		state.pointer_down(60.0, 50.0);
		assert_eq!(
			state.drag(),
			Some(&DragState {
				node: "a".into(),
				offset_x: 20.0,
				offset_y: 10.0,
			})
		);

		assert!(state.pointer_move(220.0, 110.0));
		assert_eq!(position(&state, "a"), (200.0, 100.0));
		assert_eq!(position(&state, "b"), (400.0, 300.0));

		assert!(state.pointer_up());
		assert!(!state.pointer_move(0.0, 0.0));
		assert_eq!(position(&state, "a"), (200.0, 100.0));
	}

	#[test]
	fn ending_a_drag_reports_it_once() {
		let mut state = two_services();
		state.toggle_move();
		state.pointer_down(50.0, 50.0);
		state.pointer_move(150.0, 150.0);

		// The canvas releases pointer capture only when this returns true.
		assert!(state.pointer_up());
		assert!(!state.pointer_up());
		assert_eq!(state.drag(), None);
		assert_eq!(position(&state, "a"), (140.0, 140.0));
	}

	#[test]
	fn dragging_far_away_clamps_to_canvas() {
		let mut state = two_services();
		state.toggle_move();
		state.pointer_down(40.0, 40.0);

		state.pointer_move(9999.0, 9999.0);
		assert_eq!(position(&state, "a"), (660.0, 464.0));
	}

	#[test]
	fn every_move_stays_inside_the_canvas() {
		let mut state = two_services();
		state.toggle_move();
		state.pointer_down(410.0, 310.0);

		let path = [
			(-500.0, -500.0),
			(10.0, 900.0),
			(1200.0, 20.0),
			(805.0, 565.0),
			(-1.0, 3000.0),
			(400.0, 280.0),
		];
		for (x, y) in path {
			state.pointer_move(x, y);
			let node = state.node(&"b".into()).unwrap();
			assert!(node.x >= 0.0 && node.x <= state.width() - node.w, "x = {}", node.x);
			assert!(node.y >= 0.0 && node.y <= state.height() - node.h, "y = {}", node.y);
		}
	}

	#[test]
	fn node_larger_than_canvas_is_pinned_to_origin() {
		let mut state = editor(json!([{ "id": "wide", "type": "queue", "x": 0, "y": 0, "w": 900 }]));
		state.toggle_move();
		state.pointer_down(5.0, 5.0);
		state.pointer_move(300.0, 50.0);
		assert_eq!(position(&state, "wide"), (0.0, 45.0));
	}

	#[test]
	fn topmost_node_wins_the_hit_test() {
		let state = editor(json!([
			{ "id": "under", "type": "service", "x": 0, "y": 0 },
			{ "id": "over", "type": "service", "x": 50, "y": 50 }
		]));
		let idx = state.node_at_position(100.0, 80.0).unwrap();
		assert_eq!(state.nodes()[idx].id, NodeId::from("over"));
	}

	#[test]
	fn hit_test_follows_the_drawn_size() {
		let mut state = editor(json!([
			{ "id": "small", "type": "service", "x": 0, "y": 0, "w": 30, "h": 20 },
			{ "id": "wide", "type": "queue", "x": 0, "y": 300, "w": 900 }
		]));

		assert!(state.pointer_down(50.0, 40.0));
		assert_eq!(state.selected(), Some(&NodeId::from("small")));

		state.pointer_down(700.0, 340.0);
		assert_eq!(state.selected(), None);
		assert!(state.pointer_down(300.0, 340.0));
		assert_eq!(state.selected(), Some(&NodeId::from("wide")));
	}

	#[test]
	fn selection_survives_mode_toggles() {
		let mut state = two_services();
		state.pointer_down(50.0, 50.0);
		state.toggle_move();
		state.toggle_move();
		assert!(state.is_selected(&"a".into()));
	}

	#[test]
	fn disabling_move_after_drag_yields_one_save_plan() {
		let mut state = two_services();
		assert_eq!(state.toggle_move(), None);

		state.pointer_down(50.0, 50.0);
		state.pointer_move(110.0, 210.0);
		state.pointer_up();

		let plan = state.toggle_move().expect("save plan");
		assert!(!state.move_enabled());

		let wire = serde_json::to_value(&plan).unwrap();
		assert_eq!(
			wire,
			json!({
				"nodes": [
					{ "id": "a", "name": "a", "type": "service", "description": "", "x": 100.0, "y": 200.0, "w": 140.0, "h": 96.0 },
					{ "id": "b", "name": "b", "type": "database", "description": "", "x": 400.0, "y": 300.0, "w": 140.0, "h": 96.0 }
				],
				"relationships": []
			})
		);
	}

	#[test]
	fn disabling_move_without_changes_still_saves() {
		let mut state = two_services();
		state.toggle_move();
		assert_eq!(state.toggle_move(), Some(state.to_schema()));
	}

	#[test]
	fn add_node_uses_name_as_fallback_id() {
		let mut state = EditorState::empty(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT);
		let draft = NodeDraft {
			id: "  ".into(),
			name: "orders".into(),
			kind: NodeKind::Queue,
			x: 100.0,
			y: 100.0,
			w: 150.0,
			h: 100.0,
			description: "order events".into(),
		};

		let plan = state.add_node(draft.clone()).unwrap();
		assert_eq!(plan.nodes.len(), 1);
		assert_eq!(plan.nodes[0].id, NodeId::from("orders"));
		assert_eq!(plan.nodes[0].name, "orders");
		assert_eq!(plan.nodes[0].description, "");

		assert_eq!(
			state.add_node(draft),
			Err(ValidationError::DuplicateId("orders".into()))
		);
	}

	#[test]
	fn add_node_rejects_blank_identity_and_bad_size() {
		let mut state = EditorState::empty(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT);
		let draft = NodeDraft {
			id: String::new(),
			name: String::new(),
			kind: NodeKind::Service,
			x: 0.0,
			y: 0.0,
			w: 150.0,
			h: 100.0,
			description: String::new(),
		};
		assert_eq!(state.add_node(draft.clone()), Err(ValidationError::MissingIdentity));

		let flat = NodeDraft {
			id: "svc".into(),
			h: 0.0,
			..draft
		};
		assert_eq!(state.add_node(flat), Err(ValidationError::InvalidSize));
		assert!(state.nodes().is_empty());
	}

	#[test]
	fn dangling_relationship_is_stored_but_not_drawn() {
		let mut state = editor(json!({ "nodes": [{ "id": "a", "type": "service" }], "relationships": [] }));

		let plan = state
			.add_relationship(RelationshipDraft {
				source: Some("a".into()),
				to: Some("b".into()),
				kind: "dependency".into(),
			})
			.unwrap();

		assert_eq!(plan.relationships.len(), 1);
		assert_eq!(state.relationships().len(), 1);
		assert!(state.edges().is_empty());
	}

	#[test]
	fn edges_are_drawn_between_known_nodes_only() {
		let state = editor(json!({
			"nodes": [
				{ "id": "a", "type": "service" },
				{ "id": "b", "type": "database" }
			],
			"relationships": [
				{ "source": "a", "to": "b", "type": "reads_writes" },
				{ "source": "a", "to": "ghost" },
				{ "source": "ghost", "to": "b" }
			]
		}));

		let edges = state.edges();
		assert_eq!(edges.len(), 1);
		assert_eq!(edges[0].source, (110.0, 88.0));
		assert_eq!(edges[0].target, (330.0, 88.0));
		assert_eq!(edges[0].style.color, "#0ea5e9");
	}

	#[test]
	fn relationship_validation() {
		let mut state = two_services();
		let draft = |source: Option<&str>, to: Option<&str>| RelationshipDraft {
			source: source.map(NodeId::from),
			to: to.map(NodeId::from),
			kind: "  ".into(),
		};

		assert_eq!(
			state.add_relationship(draft(None, Some("b"))),
			Err(ValidationError::MissingSource)
		);
		assert_eq!(
			state.add_relationship(draft(Some("a"), None)),
			Err(ValidationError::MissingTarget)
		);
		assert_eq!(
			state.add_relationship(draft(Some("a"), Some("a"))),
			Err(ValidationError::SelfRelationship)
		);

		state.add_relationship(draft(Some("a"), Some("b"))).unwrap();
		assert_eq!(state.relationships()[0].kind.as_deref(), Some("dependency"));
	}
}
