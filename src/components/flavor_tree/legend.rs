use leptos::prelude::*;
use log::warn;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, MouseEvent, TouchEvent};

use super::dom::ListenerGuard;
use crate::palette::legend_entries;

fn on_toggle_button(ev: &Event) -> bool {
	ev.target()
		.and_then(|t| t.dyn_into::<Element>().ok())
		.and_then(|el| el.closest(".legend-toggle").ok().flatten())
		.is_some()
}

/// Floating flavor key that can be collapsed and dragged around the viewer.
#[component]
pub fn ColorLegend() -> impl IntoView {
	let position = RwSignal::new((20.0, 20.0));
	let dragging = RwSignal::new(false);
	let collapsed = RwSignal::new(false);
	let grab_offset = StoredValue::new((0.0, 0.0));
	let listeners = StoredValue::new_local(Vec::<ListenerGuard>::new());

	let start_drag = move |cx: f64, cy: f64| {
		let (x, y) = position.get_untracked();
		grab_offset.set_value((cx - x, cy - y));
		dragging.set(true);
	};
	let drag_to = move |cx: f64, cy: f64| {
		let (ox, oy) = grab_offset.get_value();
		position.set((cx - ox, cy - oy));
	};

	// Window-level listeners exist only while a drag is in progress. They are
	// released here rather than in their own handlers.
	Effect::new(move |_| {
		if !dragging.get() {
			listeners.update_value(|l| l.clear());
			return;
		}
		let Some(window) = web_sys::window() else {
			return;
		};
		let stop = move |_: Event| dragging.set(false);
		let attached = [
			ListenerGuard::attach(&window, "mousemove", true, move |e: Event| {
				if let Some(e) = e.dyn_ref::<MouseEvent>() {
					drag_to(e.client_x() as f64, e.client_y() as f64);
				}
			}),
			ListenerGuard::attach(&window, "mouseup", true, stop),
			ListenerGuard::attach(&window, "touchmove", false, move |e: Event| {
				let touch = e
					.dyn_ref::<TouchEvent>()
					.and_then(|t| t.touches().get(0));
				if let Some(t) = touch {
					e.prevent_default();
					drag_to(t.client_x() as f64, t.client_y() as f64);
				}
			}),
			ListenerGuard::attach(&window, "touchend", true, stop),
		];
		let mut guards = Vec::with_capacity(attached.len());
		for guard in attached {
			match guard {
				Ok(g) => guards.push(g),
				Err(e) => warn!("legend drag listener not attached: {e:?}"),
			}
		}
		listeners.set_value(guards);
	});

	let on_mousedown = move |ev: MouseEvent| {
		if on_toggle_button(&ev) {
			return;
		}
		start_drag(ev.client_x() as f64, ev.client_y() as f64);
	};
	let on_touchstart = move |ev: TouchEvent| {
		if on_toggle_button(&ev) {
			return;
		}
		if let Some(t) = ev.touches().get(0) {
			start_drag(t.client_x() as f64, t.client_y() as f64);
		}
	};

	view! {
		<div
			class="color-legend"
			class:collapsed=move || collapsed.get()
			style:left=move || format!("{}px", position.get().0)
			style:top=move || format!("{}px", position.get().1)
			style:cursor=move || if dragging.get() { "grabbing" } else { "grab" }
			on:mousedown=on_mousedown
			on:touchstart=on_touchstart
		>
			<div class="legend-header">
				<h3>"Flavor Guide"</h3>
				<button
					class="legend-toggle"
					title=move || if collapsed.get() { "Expand" } else { "Collapse" }
					on:click=move |_| collapsed.update(|c| *c = !*c)
				>
					{move || if collapsed.get() { "▶" } else { "▼" }}
				</button>
			</div>
			<Show when=move || !collapsed.get()>
				<div class="legend-items">
					{legend_entries()
						.map(|(name, rgb, icon)| {
							view! {
								<div class="legend-item" style:background-color=rgb.css()>
									<span class="legend-icon">{icon}</span>
									<span class="legend-name">{name}</span>
								</div>
							}
						})
						.collect_view()}
				</div>
			</Show>
		</div>
	}
}
