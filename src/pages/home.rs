use leptos::ev;
use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use super::{client, use_session};

/// Route of the diagram editor for `project_id`.
pub fn overview_path(project_id: i64) -> String {
	format!("/projects/{project_id}/overview")
}

/// Default Home Page: open a project's diagram by id.
#[component]
pub fn Home() -> impl IntoView {
	let session = use_session();
	let navigate = use_navigate();
	let authenticated = RwSignal::new(session.is_authenticated());
	let project = RwSignal::new(String::new());
	let error = RwSignal::new(None::<String>);

	let on_open = move |ev: ev::SubmitEvent| {
		ev.prevent_default();
		match project.get_untracked().trim().parse::<i64>() {
			Ok(id) if id > 0 => navigate(&overview_path(id), Default::default()),
			_ => error.set(Some("Enter a numeric project id".to_owned())),
		}
	};

	let logout = move |_: ev::MouseEvent| {
		client(&session).logout();
		authenticated.set(false);
	};

	view! {
		<div class="page page-centered">
			<div class="card">
				<h1>"Project diagrams"</h1>
				<div class:hidden=move || authenticated.get()>
					<p>"You are not signed in."</p>
					<A href="/login">"Sign in"</A>
				</div>
				<div class:hidden=move || !authenticated.get()>
					<form class="inline-form" on:submit=on_open>
						<input
							type="text"
							inputmode="numeric"
							placeholder="Project id"
							prop:value=move || project.get()
							on:input=move |ev| {
								error.set(None);
								project.set(event_target_value(&ev));
							}
						/>
						<button type="submit" class="primary">"Open diagram"</button>
					</form>
					{move || error.get().map(|message| view! { <div class="banner banner-error">{message}</div> })}
					<button type="button" class="link" on:click=logout>"Log out"</button>
				</div>
			</div>
		</div>
	}
}
