//! "Add Node" and "Add Relationship" dialogs shown over the diagram.

use leptos::ev;
use leptos::prelude::*;

use super::diagram::{NodeDraft, NodeId, NodeKind, RelationshipDraft, ValidationError};

/// Parses a numeric form field. A blank field takes `default`.
pub fn parse_number(field: &'static str, raw: &str, default: f64) -> Result<f64, ValidationError> {
	let raw = raw.trim();
	if raw.is_empty() {
		return Ok(default);
	}
	raw.parse::<f64>()
		.ok()
		.filter(|v| v.is_finite())
		.ok_or(ValidationError::NotANumber(field))
}

fn node_draft(
	id: String,
	name: String,
	kind: NodeKind,
	description: String,
	[x, y, w, h]: [&str; 4],
) -> Result<NodeDraft, ValidationError> {
	Ok(NodeDraft {
		id,
		name,
		kind,
		x: parse_number("X", x, 0.0)?,
		y: parse_number("Y", y, 0.0)?,
		w: parse_number("Width", w, 150.0)?,
		h: parse_number("Height", h, 100.0)?,
		description,
	})
}

/// Resolves a `<select>` value (an index into `ids`) back to a node id.
fn pick(ids: &[NodeId], raw: &str) -> Option<NodeId> {
	raw.parse::<usize>().ok().and_then(|i| ids.get(i).cloned())
}

#[component]
fn ErrorBanner(#[prop(into)] message: Signal<Option<String>>) -> impl IntoView {
	move || {
		message
			.get()
			.map(|message| view! { <div class="banner banner-error">{message}</div> })
	}
}

#[component]
fn Field(
	label: &'static str,
	value: RwSignal<String>,
	#[prop(into)] disabled: Signal<bool>,
	#[prop(default = "text")] input_type: &'static str,
) -> impl IntoView {
	view! {
		<label class="field">
			<span>{label}</span>
			<input
				type=input_type
				prop:value=move || value.get()
				on:input=move |ev| value.set(event_target_value(&ev))
				disabled=move || disabled.get()
			/>
		</label>
	}
}

#[component]
fn DialogFrame(
	title: &'static str,
	#[prop(into)] saving: Signal<bool>,
	on_cancel: Callback<()>,
	children: Children,
) -> impl IntoView {
	view! {
		<div class="dialog">
			<div
				class="dialog-backdrop"
				on:click=move |_| {
					if !saving.get_untracked() {
						on_cancel.run(());
					}
				}
			/>
			<div class="dialog-panel">
				<h4>{title}</h4>
				{children()}
			</div>
		</div>
	}
}

/// Form for a new node. Submits a [`NodeDraft`]; the page decides whether it
/// is accepted.
#[component]
pub fn AddNodeDialog(
	/// Disables the form while a save is in flight.
	#[prop(into)]
	saving: Signal<bool>,
	/// Error from the last submit, shown above the form.
	#[prop(into)]
	error: Signal<Option<String>>,
	/// Closes the dialog.
	on_cancel: Callback<()>,
	/// Receives the parsed draft.
	on_submit: Callback<NodeDraft>,
) -> impl IntoView {
	let id = RwSignal::new(String::new());
	let name = RwSignal::new(String::new());
	let kind = RwSignal::new(NodeKind::Service);
	let description = RwSignal::new(String::new());
	let x = RwSignal::new("100".to_owned());
	let y = RwSignal::new("100".to_owned());
	let w = RwSignal::new("150".to_owned());
	let h = RwSignal::new("100".to_owned());
	let local_error = RwSignal::new(None::<String>);

	let submit = move |_: ev::MouseEvent| {
		let draft = node_draft(
			id.get_untracked(),
			name.get_untracked(),
			kind.get_untracked(),
			description.get_untracked(),
			[
				&x.get_untracked(),
				&y.get_untracked(),
				&w.get_untracked(),
				&h.get_untracked(),
			],
		);
		match draft {
			Ok(draft) => {
				local_error.set(None);
				on_submit.run(draft);
			}
			Err(err) => local_error.set(Some(err.to_string())),
		}
	};

	let blank = move || id.with(|s| s.trim().is_empty()) && name.with(|s| s.trim().is_empty());
	let message = Signal::derive(move || local_error.get().or_else(|| error.get()));

	view! {
		<DialogFrame title="Add Node" saving=saving on_cancel=on_cancel>
			<ErrorBanner message=message />
			<div class="dialog-grid">
				<Field label="ID" value=id disabled=saving />
				<Field label="Name" value=name disabled=saving />
				<label class="field">
					<span>"Type"</span>
					<select
						prop:value=move || kind.get().as_str()
						on:change=move |ev| {
							if let Some(k) = NodeKind::from_tag(&event_target_value(&ev)) {
								kind.set(k);
							}
						}
						disabled=move || saving.get()
					>
						{NodeKind::ALL
							.into_iter()
							.map(|k| view! { <option value=k.as_str()>{k.display_name()}</option> })
							.collect_view()}
					</select>
				</label>
				<Field label="Description" value=description disabled=saving />
				<Field label="X" value=x disabled=saving input_type="number" />
				<Field label="Y" value=y disabled=saving input_type="number" />
				<Field label="Width (w)" value=w disabled=saving input_type="number" />
				<Field label="Height (h)" value=h disabled=saving input_type="number" />
			</div>
			<div class="dialog-actions">
				<button type="button" on:click=move |_| on_cancel.run(()) disabled=move || saving.get()>
					"Cancel"
				</button>
				<button
					type="button"
					class="primary"
					on:click=submit
					disabled=move || saving.get() || blank()
				>
					{move || if saving.get() { "Adding..." } else { "Add Node" }}
				</button>
			</div>
		</DialogFrame>
	}
}

/// Form for a new relationship between two of `node_ids`.
#[component]
pub fn AddRelationshipDialog(
	/// Nodes offered as source and target.
	#[prop(into)]
	node_ids: Signal<Vec<NodeId>>,
	/// Disables the form while a save is in flight.
	#[prop(into)]
	saving: Signal<bool>,
	/// Error from the last submit, shown above the form.
	#[prop(into)]
	error: Signal<Option<String>>,
	/// Closes the dialog.
	on_cancel: Callback<()>,
	/// Receives the picked endpoints and tag.
	on_submit: Callback<RelationshipDraft>,
) -> impl IntoView {
	let source = RwSignal::new(String::new());
	let to = RwSignal::new(String::new());
	let kind = RwSignal::new("dependency".to_owned());

	let submit = move |_: ev::MouseEvent| {
		let draft = node_ids.with_untracked(|ids| RelationshipDraft {
			source: pick(ids, &source.get_untracked()),
			to: pick(ids, &to.get_untracked()),
			kind: kind.get_untracked(),
		});
		on_submit.run(draft);
	};

	let can_submit = move || {
		let (source, to) = (source.get(), to.get());
		!source.is_empty() && !to.is_empty() && source != to
	};

	let options = move || {
		node_ids
			.get()
			.into_iter()
			.enumerate()
			.map(|(i, id)| view! { <option value=i.to_string()>{id.to_string()}</option> })
			.collect_view()
	};

	view! {
		<DialogFrame title="Add Relationship" saving=saving on_cancel=on_cancel>
			<ErrorBanner message=error />
			<div class="dialog-stack">
				<label class="field">
					<span>"Source"</span>
					<select
						prop:value=move || source.get()
						on:change=move |ev| source.set(event_target_value(&ev))
						disabled=move || saving.get()
					>
						<option value="">"Select source node"</option>
						{options}
					</select>
				</label>
				<label class="field">
					<span>"To"</span>
					<select
						prop:value=move || to.get()
						on:change=move |ev| to.set(event_target_value(&ev))
						disabled=move || saving.get()
					>
						<option value="">"Select target node"</option>
						{options}
					</select>
				</label>
				<Field label="Type" value=kind disabled=saving />
			</div>
			<div class="dialog-actions">
				<button type="button" on:click=move |_| on_cancel.run(()) disabled=move || saving.get()>
					"Cancel"
				</button>
				<button
					type="button"
					class="primary"
					on:click=submit
					disabled=move || saving.get() || !can_submit()
				>
					{move || if saving.get() { "Adding..." } else { "Add Relationship" }}
				</button>
			</div>
		</DialogFrame>
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn blank_numbers_take_defaults() {
		assert_eq!(parse_number("Width", "   ", 150.0), Ok(150.0));
		assert_eq!(parse_number("X", " 42.5 ", 0.0), Ok(42.5));
		assert_eq!(
			parse_number("Y", "ten", 0.0),
			Err(ValidationError::NotANumber("Y"))
		);
		assert_eq!(
			parse_number("Y", "inf", 0.0),
			Err(ValidationError::NotANumber("Y"))
		);
	}

	#[test]
	fn node_form_builds_a_draft() {
		let draft = node_draft(
			"api".into(),
			"API".into(),
			NodeKind::Service,
			"public gateway".into(),
			["10", "", "200", "  "],
		)
		.unwrap();

		assert_eq!((draft.x, draft.y, draft.w, draft.h), (10.0, 0.0, 200.0, 100.0));
		assert_eq!(draft.description, "public gateway");
	}

	#[test]
	fn selects_resolve_to_node_ids() {
		let ids = vec![NodeId::from("a"), NodeId::Number(7)];
		assert_eq!(pick(&ids, "1"), Some(NodeId::Number(7)));
		assert_eq!(pick(&ids, ""), None);
		assert_eq!(pick(&ids, "5"), None);
	}
}
