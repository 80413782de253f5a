//! Vector geometry for node shapes, their badges and relationship edges.
//!
//! Everything here is in local shape coordinates (origin at the node's
//! top-left corner) so the canvas painter only has to translate.

use super::types::{DiagramNode, NodeKind};

/// Narrowest a node is drawn.
pub const MIN_SHAPE_WIDTH: f64 = 64.0;
/// Widest a node is drawn.
pub const MAX_SHAPE_WIDTH: f64 = 320.0;
/// Shortest a node is drawn.
pub const MIN_SHAPE_HEIGHT: f64 = 48.0;
/// Tallest a node is drawn.
pub const MAX_SHAPE_HEIGHT: f64 = 240.0;

const PADDING: f64 = 8.0;
const BADGE_SIZE: f64 = 36.0;
const BADGE_INSET: f64 = 44.0;
const GLYPH_CENTER: f64 = 18.0;

const SELECTION_COLOR: &str = "#0EA5E9";
const BADGE_FILL: &str = "#ffffff";
/// Node label text color.
pub const LABEL_COLOR: &str = "#111827";
/// Node label font.
pub const LABEL_FONT: &str = "12px sans-serif";

/// Relationship tag drawn with the stronger arrow.
pub const READS_WRITES: &str = "reads_writes";

/// Fill, outline and glyph colors of a node kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
	/// Body fill.
	pub fill: &'static str,
	/// Body outline.
	pub stroke: &'static str,
	/// Badge glyph.
	pub icon: &'static str,
}

/// Colors of `kind`.
pub fn palette(kind: NodeKind) -> Palette {
	let (fill, stroke, icon) = match kind {
		NodeKind::Database => ("#E0F2FE", "#0284C7", "#0369A1"),
		NodeKind::LoadBalancer => ("#ECFDF5", "#059669", "#047857"),
		NodeKind::Service => ("#EEF2FF", "#6366F1", "#4F46E5"),
		NodeKind::Queue => ("#FEF3C7", "#D97706", "#B45309"),
		NodeKind::Cache => ("#FCE7F3", "#DB2777", "#BE185D"),
	};
	Palette { fill, stroke, icon }
}

/// A path to trace, in shape-local coordinates.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum Primitive {
	/// Rectangle with rounded corners; `radius` 0 gives square ones.
	Rect {
		x: f64,
		y: f64,
		w: f64,
		h: f64,
		radius: f64,
	},
	/// Axis-aligned ellipse.
	Ellipse {
		cx: f64,
		cy: f64,
		rx: f64,
		ry: f64,
	},
	/// Circle around a center.
	Circle {
		cx: f64,
		cy: f64,
		r: f64,
	},
	/// Closed polygon through the points.
	Polygon(Vec<(f64, f64)>),
	/// Open segment.
	Line {
		from: (f64, f64),
		to: (f64, f64),
	},
}

/// How a [`Primitive`] is filled and stroked.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paint {
	/// Fill color; `None` leaves the inside empty.
	pub fill: Option<&'static str>,
	/// Outline color; `None` skips the stroke.
	pub stroke: Option<&'static str>,
	/// Outline width.
	pub line_width: f64,
	/// Dash and gap lengths of the outline.
	pub dash: Option<(f64, f64)>,
	/// Global alpha while painting.
	pub opacity: f64,
}

impl Paint {
	fn filled(fill: &'static str) -> Self {
		Self {
			fill: Some(fill),
			stroke: None,
			line_width: 0.0,
			dash: None,
			opacity: 1.0,
		}
	}

	fn outlined(stroke: &'static str, line_width: f64) -> Self {
		Self {
			fill: None,
			stroke: Some(stroke),
			line_width,
			dash: None,
			opacity: 1.0,
		}
	}

	fn shape(palette: Palette, line_width: f64) -> Self {
		Self {
			fill: Some(palette.fill),
			..Self::outlined(palette.stroke, line_width)
		}
	}
}

/// A primitive and how to paint it.
#[derive(Clone, Debug, PartialEq)]
pub struct Mark {
	/// What to trace.
	pub primitive: Primitive,
	/// How to paint it.
	pub paint: Paint,
}

/// Everything needed to draw one node, relative to its top-left corner.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeShape {
	/// Clamped drawing width.
	pub width: f64,
	/// Clamped drawing height.
	pub height: f64,
	/// Outline of the kind, in paint order.
	pub body: Vec<Mark>,
	/// Top-left corner of the icon badge.
	pub badge_origin: (f64, f64),
	/// Badge background followed by the glyph, relative to `badge_origin`.
	pub badge: Vec<Mark>,
	/// Baseline center for the label text.
	pub label_anchor: (f64, f64),
	/// Dashed ring around a selected node.
	pub selection_ring: Option<Mark>,
}

/// Size a node of stored size `width` x `height` is drawn at, clamped to
/// `[64, 320] x [48, 240]`. Hit testing and arrow tips use the same box.
pub fn drawn_size(width: f64, height: f64) -> (f64, f64) {
	(
		width.clamp(MIN_SHAPE_WIDTH, MAX_SHAPE_WIDTH),
		height.clamp(MIN_SHAPE_HEIGHT, MAX_SHAPE_HEIGHT),
	)
}

/// Builds the shape of a node of `kind` at its [`drawn_size`].
pub fn node_shape(kind: NodeKind, width: f64, height: f64, selected: bool) -> NodeShape {
	let (width, height) = drawn_size(width, height);
	let colors = palette(kind);
	let paint = Paint::shape(colors, if selected { 3.0 } else { 2.0 });

	let selection_ring = selected.then(|| Mark {
		primitive: Primitive::Rect {
			x: 1.0,
			y: 1.0,
			w: width - 2.0,
			h: height - 2.0,
			radius: 10.0,
		},
		paint: Paint {
			dash: Some((4.0, 4.0)),
			..Paint::outlined(SELECTION_COLOR, 1.5)
		},
	});

	let mut badge = vec![Mark {
		primitive: Primitive::Rect {
			x: 0.0,
			y: 0.0,
			w: BADGE_SIZE,
			h: BADGE_SIZE,
			radius: 9.0,
		},
		paint: Paint {
			opacity: 0.9,
			..Paint::filled(BADGE_FILL)
		},
	}];
	badge.extend(glyph(kind, colors.icon));

	NodeShape {
		width,
		height,
		body: body(kind, width, height)
			.into_iter()
			.map(|primitive| Mark { primitive, paint })
			.collect(),
		badge_origin: (width - BADGE_INSET, PADDING),
		badge,
		label_anchor: (width / 2.0, height - 10.0),
		selection_ring,
	}
}

fn body(kind: NodeKind, width: f64, height: f64) -> Vec<Primitive> {
	let (w, h) = (width - PADDING * 2.0, height - PADDING * 2.0);
	let (cx, cy) = (PADDING + w / 2.0, PADDING + h / 2.0);

	match kind {
		NodeKind::Database => {
			let (top, bottom) = (PADDING + 12.0, PADDING + h - 12.0);
			let (rx, ry) = (w / 2.0, (h * 0.12).clamp(6.0, 18.0));
			vec![
				Primitive::Rect {
					x: PADDING,
					y: top,
					w,
					h: h - 24.0,
					radius: 0.0,
				},
				Primitive::Ellipse { cx, cy: top, rx, ry },
				Primitive::Ellipse {
					cx,
					cy: bottom,
					rx,
					ry,
				},
			]
		}
		NodeKind::LoadBalancer => vec![Primitive::Polygon(vec![
			(cx, PADDING),
			(PADDING + w, cy),
			(cx, PADDING + h),
			(PADDING, cy),
		])],
		NodeKind::Service => vec![Primitive::Rect {
			x: PADDING,
			y: PADDING,
			w,
			h,
			radius: (w.min(h) * 0.15).clamp(6.0, 16.0),
		}],
		NodeKind::Queue => {
			let gap = 6.0;
			let slice = (h - gap) / 2.0;
			vec![
				Primitive::Rect {
					x: PADDING,
					y: PADDING,
					w,
					h: slice,
					radius: 8.0,
				},
				Primitive::Rect {
					x: PADDING,
					y: PADDING + slice + gap,
					w,
					h: slice,
					radius: 8.0,
				},
			]
		}
		NodeKind::Cache => {
			let half = w / 4.0;
			vec![Primitive::Polygon(vec![
				(cx - half, PADDING),
				(cx + half, PADDING),
				(PADDING + w, cy),
				(cx + half, PADDING + h),
				(cx - half, PADDING + h),
				(PADDING, cy),
			])]
		}
	}
}

fn glyph(kind: NodeKind, color: &'static str) -> Vec<Mark> {
	let (cx, cy) = (GLYPH_CENTER, GLYPH_CENTER);
	let line = |x1: f64, y1: f64, x2: f64, y2: f64| Primitive::Line {
		from: (x1, y1),
		to: (x2, y2),
	};

	let primitives = match kind {
		NodeKind::Database => vec![
			Primitive::Ellipse {
				cx,
				cy: cy - 5.0,
				rx: 10.0,
				ry: 4.0,
			},
			line(cx - 10.0, cy - 5.0, cx - 10.0, cy + 5.0),
			line(cx + 10.0, cy - 5.0, cx + 10.0, cy + 5.0),
			Primitive::Ellipse {
				cx,
				cy: cy + 5.0,
				rx: 10.0,
				ry: 4.0,
			},
		],
		NodeKind::LoadBalancer => vec![
			line(cx, cy - 8.0, cx, cy + 8.0),
			line(cx - 8.0, cy, cx + 8.0, cy),
			line(cx - 8.0, cy - 8.0, cx - 2.0, cy - 14.0),
			line(cx + 8.0, cy - 8.0, cx + 2.0, cy - 14.0),
		],
		NodeKind::Service => vec![
			Primitive::Circle { cx, cy, r: 6.0 },
			line(cx, cy - 11.0, cx, cy - 7.0),
			line(cx, cy + 11.0, cx, cy + 7.0),
			line(cx - 11.0, cy, cx - 7.0, cy),
			line(cx + 11.0, cy, cx + 7.0, cy),
		],
		NodeKind::Queue => vec![
			Primitive::Rect {
				x: cx - 10.0,
				y: cy - 10.0,
				w: 20.0,
				h: 14.0,
				radius: 2.0,
			},
			Primitive::Rect {
				x: cx - 8.0,
				y: cy - 6.0,
				w: 20.0,
				h: 14.0,
				radius: 2.0,
			},
		],
		// The bolt is the only filled glyph.
		NodeKind::Cache => {
			return vec![Mark {
				primitive: Primitive::Polygon(vec![
					(cx - 5.0, cy - 8.0),
					(cx + 2.0, cy - 8.0),
					(cx - 1.0, cy - 1.0),
					(cx + 6.0, cy - 1.0),
					(cx - 2.0, cy + 8.0),
					(cx, cy + 1.0),
					(cx - 6.0, cy + 1.0),
				]),
				paint: Paint::filled(color),
			}];
		}
	};

	let paint = Paint::outlined(color, 2.0);
	primitives
		.into_iter()
		.map(|primitive| Mark { primitive, paint })
		.collect()
}

/// Line and arrowhead style of a relationship.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
	/// Line and arrowhead color.
	pub color: &'static str,
	/// Line width.
	pub line_width: f64,
	/// Arrowhead length along the line.
	pub arrow_length: f64,
	/// Arrowhead base width.
	pub arrow_width: f64,
}

/// `reads_writes` edges get the strong style, every other tag the muted one.
pub fn edge_style(kind: Option<&str>) -> EdgeStyle {
	if kind == Some(READS_WRITES) {
		EdgeStyle {
			color: "#0ea5e9",
			line_width: 2.0,
			arrow_length: 12.0,
			arrow_width: 8.0,
		}
	} else {
		EdgeStyle {
			color: "#64748b",
			line_width: 2.0,
			arrow_length: 10.0,
			arrow_width: 7.0,
		}
	}
}

/// A drawable relationship between two existing nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeSegment {
	/// Center of the source node's drawn shape.
	pub source: (f64, f64),
	/// Center of the target node's drawn shape.
	pub target: (f64, f64),
	/// Where the line enters the target's drawn box; the arrow tip.
	pub tip: (f64, f64),
	/// Line and arrowhead style.
	pub style: EdgeStyle,
}

/// Edge from `from` to `to`, tagged `kind`.
pub fn edge_between(from: &DiagramNode, to: &DiagramNode, kind: Option<&str>) -> EdgeSegment {
	let source = from.center();
	let target = to.center();
	let (dx, dy) = (source.0 - target.0, source.1 - target.1);
	let (w, h) = drawn_size(to.w, to.h);

	let mut t: f64 = 1.0;
	if dx.abs() > f64::EPSILON {
		t = t.min(w / 2.0 / dx.abs());
	}
	if dy.abs() > f64::EPSILON {
		t = t.min(h / 2.0 / dy.abs());
	}

	EdgeSegment {
		source,
		target,
		tip: (target.0 + dx * t, target.1 + dy * t),
		style: edge_style(kind),
	}
}
