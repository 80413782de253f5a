use leptos::prelude::*;
use leptos_router::components::A;

/// 404 Not Found Page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="page page-centered">
			<h1>"Page not found"</h1>
			<A href="/">"Back to projects"</A>
		</div>
	}
}
