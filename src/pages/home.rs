use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_params_map;

use crate::components::flavor_tree::{Entity, FlavorTreeCanvas, slugify};
use crate::data::{self, DEFAULT_STRAIN};
use crate::palette::mixed_flavor_name;

fn percent(value: Option<f64>) -> String {
	value.map_or_else(|| "n/a".to_owned(), |v| format!("{v}%"))
}

/// Links to every strain in the bundled catalog.
#[component]
pub fn StrainLinks() -> impl IntoView {
	let names: Vec<&'static str> = data::catalog()
		.map(|c| c.names().collect())
		.unwrap_or_default();

	view! {
		<nav class="strain-links">
			{names
				.into_iter()
				.map(|name| view! { <A href=format!("/tree/{}", slugify(name))>{name}</A> })
				.collect_view()}
		</nav>
	}
}

#[component]
fn StrainHeader(strain: Memo<Entity>) -> impl IntoView {
	let stat = move |f: fn(&Entity) -> String| move || strain.with(f);

	view! {
		<header class="strain-header">
			<h1>{stat(|s| s.display_name().to_owned())}</h1>
			<p class="blend">{stat(|s| format!("{} blend", mixed_flavor_name(s.flavors.as_slice())))}</p>
			<dl class="strain-stats">
				<div><dt>"THC"</dt><dd>{stat(|s| percent(s.thc))}</dd></div>
				<div><dt>"CBD"</dt><dd>{stat(|s| percent(s.cbd))}</dd></div>
				<div><dt>"Type"</dt><dd>{stat(|s| s.category.clone())}</dd></div>
				<div><dt>"Top Flavors"</dt><dd>{stat(|s| s.flavors.join(", "))}</dd></div>
			</dl>
		</header>
	}
}

/// Header, lineage canvas and reading notes for one strain.
#[component]
pub fn StrainExplorer(strain: Memo<Entity>) -> impl IntoView {
	view! {
		<div class="strain-explorer">
			<StrainHeader strain=strain />
			<div class="tree-frame">
				<FlavorTreeCanvas strain=strain />
			</div>
			<StrainLinks />
			<section class="tree-info">
				<h2>"Reading the tree"</h2>
				<p>
					"Each box is a strain. Arrows run from a parent down to its offspring, so the newest cross sits at the bottom."
				</p>
				<p>
					"Box colors blend the strain's leading flavors and the badges show their icons. Tap or click a strain to fold its ancestry away; tap it again to bring it back. Ancestors shared with a visible branch stay on screen."
				</p>
			</section>
		</div>
	}
}

/// Explorer for the strain named in the route, or the default strain.
#[component]
pub fn Home() -> impl IntoView {
	let params = use_params_map();
	let key = Memo::new(move |_| {
		params
			.read()
			.get("strain")
			.unwrap_or_else(|| DEFAULT_STRAIN.to_owned())
	});
	let found = Memo::new(move |_| key.with(|k| data::strain(k)));
	let strain = Memo::new(move |_| found.with(|r| r.clone().unwrap_or_default()));
	// Changes only when a lookup starts or stops failing, so moving between
	// strains keeps the same canvas.
	let status = Memo::new(move |_| found.with(|r| r.as_ref().map(|_| ()).map_err(Clone::clone)));

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<div class="strain-not-found">
					<h1>"Strain not found"</h1>
					<ul>
						{move || {
							errors
								.get()
								.into_iter()
								.map(|(_, e)| view! { <li>{e.to_string()}</li> })
								.collect_view()
						}}
					</ul>
					<p>"Try one of these:"</p>
					<StrainLinks />
				</div>
			}
		}>
			{move || status.get().map(|()| view! { <StrainExplorer strain=strain /> })}
		</ErrorBoundary>
	}
}
