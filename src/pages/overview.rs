use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::A;
use leptos_router::hooks::use_params_map;
use log::{debug, warn};

use super::{client, use_session};
use crate::api::{ApiError, LoadedDiagram, ProjectUml, Session, User};
use crate::components::diagram::state::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use crate::components::diagram::{
	DiagramCanvas, DiagramSchema, EditorState, NodeDraft, RelationshipDraft,
};
use crate::components::dialogs::{AddNodeDialog, AddRelationshipDialog};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Dialog {
	Node,
	Relationship,
}

/// Numbers diagram loads. A request that started under an older number
/// belongs to a project the page has left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct LoadGeneration(u64);

impl LoadGeneration {
	fn advance(&mut self) {
		self.0 += 1;
	}

	fn ticket(self) -> u64 {
		self.0
	}

	fn is_current(self, ticket: u64) -> bool {
		self.0 == ticket
	}
}

/// Writes the editor's schema back over the loaded record.
#[derive(Clone)]
struct Saver {
	session: Session,
	project_id: Memo<Option<i64>>,
	record: RwSignal<Option<ProjectUml>>,
	saving: RwSignal<bool>,
	generation: StoredValue<LoadGeneration>,
}

impl Saver {
	/// Spawns one `PUT`. Failures are reported through `report`; the local
	/// edit stays either way.
	fn save(
		&self,
		schema: DiagramSchema,
		report: RwSignal<Option<String>>,
		on_saved: impl FnOnce() + 'static,
	) {
		let (Some(record), Some(project_id)) =
			(self.record.get_untracked(), self.project_id.get_untracked())
		else {
			report.set(Some("This project has no diagram to save to".to_owned()));
			return;
		};

		let client = client(&self.session);
		let (saving, stored, generation) = (self.saving, self.record, self.generation);
		let ticket = generation.get_value().ticket();
		saving.set(true);
		report.set(None);
		spawn_local(async move {
			let result = client.save_diagram(&record, project_id, &schema).await;
			saving.set(false);
			if !generation.get_value().is_current(ticket) {
				debug!("Dropping save result for project {project_id}, page has moved on");
				return;
			}
			match result {
				Ok(saved) => {
					stored.set(Some(saved));
					on_saved();
				}
				Err(err) => report.set(Some(err.to_string())),
			}
		});
	}
}

#[component]
fn Banner(message: RwSignal<Option<String>>) -> impl IntoView {
	move || {
		message.get().map(|text| {
			view! {
				<div class="banner banner-error">
					<span>{text}</span>
					<button type="button" class="link" on:click=move |_| message.set(None)>
						"Dismiss"
					</button>
				</div>
			}
		})
	}
}

/// Project overview hosting the diagram editor.
#[component]
pub fn ProjectOverview() -> impl IntoView {
	let params = use_params_map();
	let project_id = Memo::new(move |_| {
		params.with(|p| p.get("project_id").and_then(|id| id.parse::<i64>().ok()))
	});
	let session = use_session();

	let editor = RwSignal::new(EditorState::empty(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT));
	let record = RwSignal::new(None::<ProjectUml>);
	let user = RwSignal::new(None::<User>);
	let loading = RwSignal::new(false);
	let saving = RwSignal::new(false);
	let error = RwSignal::new(None::<String>);
	let dialog = RwSignal::new(None::<Dialog>);
	let dialog_error = RwSignal::new(None::<String>);
	let generation = StoredValue::new(LoadGeneration::default());

	let saver = Saver {
		session: session.clone(),
		project_id,
		record,
		saving,
		generation,
	};

	{
		let client = client(&session);
		spawn_local(async move {
			match client.current_user().await {
				Ok(current) => user.set(Some(current)),
				Err(err) => warn!("Could not load current user: {err}"),
			}
		});
	}

	Effect::new(move |_| {
		let Some(project_id) = project_id.get() else {
			error.set(Some("Invalid project id".to_owned()));
			return;
		};
		generation.update_value(LoadGeneration::advance);
		let ticket = generation.get_value().ticket();

		loading.set(true);
		error.set(None);
		record.set(None);
		editor.update(|e| *e = EditorState::empty(e.width(), e.height()));

		let client = client(&session);
		spawn_local(async move {
			let result = client.load_diagram(project_id).await;
			if !generation.get_value().is_current(ticket) {
				debug!("Discarding superseded load of project {project_id}");
				return;
			}
			loading.set(false);
			match result {
				Ok(LoadedDiagram { record: loaded, diagram }) => {
					editor.update(|e| *e = EditorState::new(diagram, e.width(), e.height()));
					record.set(Some(loaded));
				}
				Err(ApiError::NotFound) => {}
				Err(err) => error.set(Some(err.to_string())),
			}
		});
	});

	let is_owner = Memo::new(move |_| user.with(|u| u.as_ref().is_some_and(User::is_owner)));
	let has_record = Memo::new(move |_| record.with(Option::is_some));
	let move_enabled = Memo::new(move |_| editor.with(EditorState::move_enabled));
	let node_ids = Signal::derive(move || editor.with(EditorState::node_ids));
	let can_relate = move || has_record.get() && editor.with(|e| e.nodes().len() >= 2);

	let toggle_move = {
		let saver = saver.clone();
		move |_: ev::MouseEvent| {
			let plan = editor.try_update(EditorState::toggle_move).flatten();
			debug!("Move mode {}", if plan.is_some() { "off" } else { "on" });
			if let Some(schema) = plan {
				saver.save(schema, error, || {});
			}
		}
	};

	let open = move |which: Dialog| {
		dialog_error.set(None);
		dialog.set(Some(which));
	};
	let on_cancel = Callback::new(move |()| {
		dialog_error.set(None);
		dialog.set(None);
	});

	let on_add_node = Callback::new({
		let saver = saver.clone();
		move |draft: NodeDraft| match editor.try_update(|e| e.add_node(draft)) {
			Some(Ok(schema)) => saver.save(schema, dialog_error, move || dialog.set(None)),
			Some(Err(err)) => dialog_error.set(Some(err.to_string())),
			None => {}
		}
	});

	let on_add_relationship = Callback::new({
		let saver = saver.clone();
		move |draft: RelationshipDraft| match editor.try_update(|e| e.add_relationship(draft)) {
			Some(Ok(schema)) => saver.save(schema, dialog_error, move || dialog.set(None)),
			Some(Err(err)) => dialog_error.set(Some(err.to_string())),
			None => {}
		}
	});

	let dialogs = move || {
		dialog.get().map(|which| match which {
			Dialog::Node => view! {
				<AddNodeDialog
					saving=saving
					error=dialog_error
					on_cancel=on_cancel
					on_submit=on_add_node
				/>
			}
			.into_any(),
			Dialog::Relationship => view! {
				<AddRelationshipDialog
					node_ids=node_ids
					saving=saving
					error=dialog_error
					on_cancel=on_cancel
					on_submit=on_add_relationship
				/>
			}
			.into_any(),
		})
	};

	view! {
		<div class="page overview">
			<header class="overview-header">
				<A href="/">"Projects"</A>
				<h1>
					{move || project_id.get().map(|id| format!("Project {id}")).unwrap_or_default()}
				</h1>
			</header>
			<Banner message=error />
			<section class="card diagram">
				<div class="diagram-toolbar">
					<h2>"System diagram"</h2>
					<div class="toolbar-actions" class:hidden=move || !is_owner.get()>
						<button
							type="button"
							on:click=move |_| open(Dialog::Node)
							disabled=move || !has_record.get() || saving.get()
						>
							"Add Node"
						</button>
						<button
							type="button"
							on:click=move |_| open(Dialog::Relationship)
							disabled=move || !can_relate() || saving.get()
						>
							"Add Relationship"
						</button>
						<button
							type="button"
							class:active=move || move_enabled.get()
							on:click=toggle_move
							disabled=move || !has_record.get() || saving.get()
						>
							{move || if move_enabled.get() { "Disable Move" } else { "Enable Move" }}
						</button>
					</div>
				</div>
				{move || loading.get().then(|| view! { <p class="muted">"Loading diagram..."</p> })}
				{move || {
					(!loading.get() && !has_record.get() && error.with(Option::is_none))
						.then(|| view! { <p class="muted">"No diagram has been created for this project yet."</p> })
				}}
				<DiagramCanvas state=editor height=DEFAULT_CANVAS_HEIGHT />
			</section>
			{dialogs}
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn requests_from_an_earlier_load_are_stale() {
		let mut generation = LoadGeneration::default();
		generation.advance();
		let save_for_a = generation.ticket();
		assert!(generation.is_current(save_for_a));

		// Route switches to another project before the save completes.
		generation.advance();
		assert!(!generation.is_current(save_for_a));
		assert!(generation.is_current(generation.ticket()));
	}
}
