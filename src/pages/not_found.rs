use leptos::prelude::*;
use leptos_router::components::A;

/// 404 page.
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="not-found">
			<h1>"Page not found"</h1>
			<p>"Nothing grows here."</p>
			<A href="/">"Back to the explorer"</A>
		</div>
	}
}
