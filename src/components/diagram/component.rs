use std::cell::RefCell;
use std::rc::Rc;

use leptos::ev;
use leptos::prelude::*;
use log::error;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, PointerEvent};

use super::render;
use super::state::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, EditorState};

fn parent_width(canvas: &HtmlCanvasElement) -> f64 {
	canvas
		.parent_element()
		.map(|p| p.client_width() as f64)
		.filter(|w| *w > 0.0)
		.unwrap_or(DEFAULT_CANVAS_WIDTH)
}

/// Drag-and-drop canvas over an [`EditorState`].
///
/// Pointer input only touches the view-state; saving is up to the owner of
/// the signal.
#[component]
pub fn DiagramCanvas(
	/// View-state drawn and edited by the canvas.
	state: RwSignal<EditorState>,
	/// Canvas height; the width follows the parent element.
	#[prop(default = DEFAULT_CANVAS_HEIGHT)]
	height: f64,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));
	let context_init = context.clone();

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		let width = parent_width(&canvas);
		canvas.set_width(width as u32);
		canvas.set_height(height as u32);

		let ctx = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok());
		let Some(ctx) = ctx else {
			error!("Canvas 2D context unavailable");
			return;
		};
		*context_init.borrow_mut() = Some(ctx);
		state.update(|s| s.resize(width, height));

		let handle = window_event_listener(ev::resize, move |_| {
			let width = parent_width(&canvas);
			canvas.set_width(width as u32);
			state.update(|s| s.resize(width, height));
		});
		on_cleanup(move || handle.remove());
	});

	let context_draw = context.clone();
	Effect::new(move |_| {
		state.with(|s| {
			if let Some(ctx) = context_draw.borrow().as_ref() {
				render::render(s, ctx);
			}
		});
	});

	let pointer_position = move |ev: &PointerEvent| -> Option<(HtmlCanvasElement, f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);
		Some((canvas, x, y))
	};

	let on_pointerdown = move |ev: PointerEvent| {
		let Some((canvas, x, y)) = pointer_position(&ev) else {
			return;
		};
		state.maybe_update(|s| s.pointer_down(x, y));
		if state.with_untracked(|s| s.drag().is_some()) {
			let _ = canvas.set_pointer_capture(ev.pointer_id());
		}
	};

	let on_pointermove = move |ev: PointerEvent| {
		if !state.with_untracked(|s| s.drag().is_some()) {
			return;
		}
		if let Some((_, x, y)) = pointer_position(&ev) {
			state.maybe_update(|s| s.pointer_move(x, y));
		}
	};

	// Pointer-up and pointer-leave both end the drag and drop the capture.
	let end_drag = move |ev: PointerEvent| {
		if state.try_update(|s| s.pointer_up()).unwrap_or(false) {
			if let Some((canvas, _, _)) = pointer_position(&ev) {
				let _ = canvas.release_pointer_capture(ev.pointer_id());
			}
		}
	};

	let cursor = move || {
		let cursor = if state.with(|s| s.move_enabled()) {
			"move"
		} else {
			"default"
		};
		format!("display: block; cursor: {cursor}; touch-action: none;")
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="diagram-canvas"
			on:pointerdown=on_pointerdown
			on:pointermove=on_pointermove
			on:pointerup=end_drag
			on:pointerleave=end_drag
			style=cursor
		/>
	}
}
