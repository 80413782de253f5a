use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::shapes::{self, EdgeSegment, LABEL_COLOR, LABEL_FONT, Mark, Primitive};
use super::state::EditorState;

const BACKGROUND: &str = "#ffffff";

pub fn render(state: &EditorState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width(), state.height());
	// Edges go under the nodes.
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
}

fn draw_edges(state: &EditorState, ctx: &CanvasRenderingContext2d) {
	for edge in state.edges() {
		draw_edge(&edge, ctx);
	}
}

fn draw_edge(edge: &EdgeSegment, ctx: &CanvasRenderingContext2d) {
	let ((x1, y1), (tip_x, tip_y)) = (edge.source, edge.tip);
	let (dx, dy) = (tip_x - x1, tip_y - y1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}

	let style = edge.style;
	let (ux, uy) = (dx / dist, dy / dist);
	let (back_x, back_y) = (tip_x - ux * style.arrow_length, tip_y - uy * style.arrow_length);

	ctx.set_stroke_style_str(style.color);
	ctx.set_line_width(style.line_width);
	ctx.begin_path();
	ctx.move_to(x1, y1);
	ctx.line_to(back_x, back_y);
	ctx.stroke();

	let (px, py) = (-uy * style.arrow_width * 0.5, ux * style.arrow_width * 0.5);
	ctx.set_fill_style_str(style.color);
	ctx.begin_path();
	ctx.move_to(tip_x, tip_y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_nodes(state: &EditorState, ctx: &CanvasRenderingContext2d) {
	for node in state.nodes() {
		let shape = shapes::node_shape(node.kind, node.w, node.h, state.is_selected(&node.id));

		ctx.save();
		let _ = ctx.translate(node.x, node.y);
		for mark in &shape.body {
			paint(mark, ctx);
		}

		ctx.save();
		let _ = ctx.translate(shape.badge_origin.0, shape.badge_origin.1);
		for mark in &shape.badge {
			paint(mark, ctx);
		}
		ctx.restore();

		if let Some(label) = &node.label {
			ctx.set_fill_style_str(LABEL_COLOR);
			ctx.set_font(LABEL_FONT);
			ctx.set_text_align("center");
			let _ = ctx.fill_text(label, shape.label_anchor.0, shape.label_anchor.1);
		}

		if let Some(ring) = &shape.selection_ring {
			paint(ring, ctx);
		}
		ctx.restore();
	}
}

fn paint(mark: &Mark, ctx: &CanvasRenderingContext2d) {
	let paint = mark.paint;
	trace(&mark.primitive, ctx);
	ctx.set_global_alpha(paint.opacity);

	if let Some(fill) = paint.fill {
		ctx.set_fill_style_str(fill);
		ctx.fill();
	}
	if let Some(stroke) = paint.stroke {
		ctx.set_stroke_style_str(stroke);
		ctx.set_line_width(paint.line_width);
		if let Some((dash, gap)) = paint.dash {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
		}
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}
	ctx.set_global_alpha(1.0);
}

fn trace(primitive: &Primitive, ctx: &CanvasRenderingContext2d) {
	ctx.begin_path();
	match *primitive {
		Primitive::Rect { x, y, w, h, radius } => rounded_rect(ctx, x, y, w, h, radius),
		Primitive::Ellipse { cx, cy, rx, ry } => {
			let _ = ctx.ellipse(cx, cy, rx, ry, 0.0, 0.0, 2.0 * PI);
		}
		Primitive::Circle { cx, cy, r } => {
			let _ = ctx.arc(cx, cy, r, 0.0, 2.0 * PI);
		}
		Primitive::Polygon(ref points) => {
			let mut points = points.iter();
			if let Some(&(x, y)) = points.next() {
				ctx.move_to(x, y);
				for &(x, y) in points {
					ctx.line_to(x, y);
				}
				ctx.close_path();
			}
		}
		Primitive::Line { from, to } => {
			ctx.move_to(from.0, from.1);
			ctx.line_to(to.0, to.1);
		}
	}
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, radius: f64) {
	let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}
