use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

use super::{client, use_session};

/// Email/password login. Lands on the project picker once a token is issued.
#[component]
pub fn Login() -> impl IntoView {
	let session = use_session();
	let navigate = use_navigate();

	let email = RwSignal::new(String::new());
	let password = RwSignal::new(String::new());
	let pending = RwSignal::new(false);
	let error = RwSignal::new(None::<String>);

	let on_submit = move |ev: ev::SubmitEvent| {
		ev.prevent_default();
		if pending.get_untracked() {
			return;
		}
		pending.set(true);
		error.set(None);

		let client = client(&session);
		let navigate = navigate.clone();
		let (email, password) = (email.get_untracked(), password.get_untracked());
		spawn_local(async move {
			let result = client.login(email.trim(), &password).await;
			pending.set(false);
			match result {
				Ok(()) => navigate("/", Default::default()),
				Err(err) => error.set(Some(err.to_string())),
			}
		});
	};

	view! {
		<div class="page page-centered">
			<form class="card login" on:submit=on_submit>
				<h1>"Sign in"</h1>
				{move || error.get().map(|message| view! { <div class="banner banner-error">{message}</div> })}
				<label class="field">
					<span>"Email"</span>
					<input
						type="email"
						required
						prop:value=move || email.get()
						on:input=move |ev| email.set(event_target_value(&ev))
					/>
				</label>
				<label class="field">
					<span>"Password"</span>
					<input
						type="password"
						required
						prop:value=move || password.get()
						on:input=move |ev| password.set(event_target_value(&ev))
					/>
				</label>
				<button type="submit" class="primary" disabled=move || pending.get()>
					{move || if pending.get() { "Signing in..." } else { "Sign in" }}
				</button>
			</form>
		</div>
	}
}
