use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Event, HtmlCanvasElement, MouseEvent, TouchEvent, TouchList, WheelEvent,
};

use super::dom::{FrameLoop, ListenerGuard};
use super::graph::build_graph;
use super::layout::{LayoutConfig, content_bounds, layout};
use super::legend::ColorLegend;
use super::render;
use super::scene::{Scene, compose_scene};
use super::state::{ViewTransform, ViewportConfig, ViewportController};
use super::types::{Bounds, Entity};
use super::visibility::{ClosurePolicy, HiddenSet, toggle_with};

/// Browser resources owned by one mounted canvas. Dropping them (on unmount or
/// replacement) detaches listeners and stops the frame loop.
#[derive(Default)]
struct CanvasResources {
	frame_loop: Option<FrameLoop>,
	resize: Option<ListenerGuard>,
	touch_scroll: Option<ListenerGuard>,
}

/// Shared handle to the viewport; every mutation marks the canvas dirty and
/// refreshes the zoom readout.
#[derive(Clone)]
struct ViewportHandle {
	controller: Rc<RefCell<ViewportController>>,
	dirty: Rc<Cell<bool>>,
	zoom_pct: RwSignal<u32>,
}

impl ViewportHandle {
	fn update<R>(&self, f: impl FnOnce(&mut ViewportController) -> R) -> R {
		let mut vp = self.controller.borrow_mut();
		let out = f(&mut vp);
		let pct = (vp.transform.k * 100.0).round() as u32;
		drop(vp);
		self.dirty.set(true);
		if self.zoom_pct.get_untracked() != pct {
			self.zoom_pct.set(pct);
		}
		out
	}

	fn transform(&self) -> ViewTransform {
		self.controller.borrow().transform
	}

	fn is_dragging(&self) -> bool {
		self.controller.borrow().is_dragging()
	}
}

fn canvas_size(
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> (f64, f64) {
	if fullscreen {
		if let Some(window) = web_sys::window() {
			let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64());
			if let (Some(w), Some(h)) = (dim(window.inner_width()), dim(window.inner_height())) {
				return (w, h);
			}
		}
	}
	let parent = canvas.parent_element();
	let measured = |f: fn(&web_sys::Element) -> i32| {
		parent.as_ref().map(|p| f(p) as f64).filter(|v| *v > 0.0)
	};
	(
		width.or_else(|| measured(web_sys::Element::client_width)).unwrap_or(800.0),
		height.or_else(|| measured(web_sys::Element::client_height)).unwrap_or(600.0),
	)
}

fn local_point(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(client_x as f64 - rect.left(), client_y as f64 - rect.top())
}

fn touch_points(list: &TouchList, canvas: &HtmlCanvasElement) -> Vec<(f64, f64)> {
	(0..list.length())
		.filter_map(|i| list.get(i))
		.map(|t| local_point(canvas, t.client_x(), t.client_y()))
		.collect()
}

fn hit_node(scene: Memo<Scene>, view: ViewTransform, x: f64, y: f64) -> Option<String> {
	let (gx, gy) = view.screen_to_graph(x, y);
	scene.with_untracked(|s| s.node_at(gx, gy).map(|n| n.id.clone()))
}

/// Interactive lineage graph of `strain` drawn on a canvas.
#[component]
pub fn FlavorTreeCanvas(
	#[prop(into)] strain: Signal<Entity>,
	#[prop(optional)] layout_config: LayoutConfig,
	#[prop(optional)] viewport_config: ViewportConfig,
	#[prop(optional)] closure_policy: ClosurePolicy,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

	// Derived state. Pan and zoom live outside the reactive graph, so moving
	// the view never re-runs any of these.
	let graph = Memo::new(move |_| {
		strain.with(build_graph).inspect_err(|e| warn!("cannot draw lineage: {e}"))
	});
	let positioned = Memo::new(move |_| {
		graph.with(|g| match g {
			Ok(g) => layout(&g.nodes, &g.edges, &layout_config),
			Err(_) => Vec::new(),
		})
	});
	let bounds = Memo::new(move |_| positioned.with(|p| content_bounds(p, &layout_config)));
	let hidden = RwSignal::new(HiddenSet::default());
	let scene = Memo::new(move |_| {
		graph.with(|g| {
			let edges = g.as_ref().map(|g| g.edges.as_slice()).unwrap_or_default();
			positioned.with(|p| hidden.with(|h| compose_scene(p, edges, h, &layout_config)))
		})
	});

	let viewport = ViewportHandle {
		controller: Rc::new(RefCell::new(ViewportController::new(
			viewport_config,
			800.0,
			600.0,
			Bounds::FALLBACK,
		))),
		dirty: Rc::new(Cell::new(true)),
		zoom_pct: RwSignal::new((viewport_config.default_zoom * 100.0).round() as u32),
	};
	let dragging = RwSignal::new(false);
	let pressed: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
	let resources = StoredValue::new_local(CanvasResources::default());

	let toggle_node = move |id: &str| {
		let edges = graph.with_untracked(|g| g.as_ref().map(|g| g.edges.clone()).unwrap_or_default());
		hidden.update(|h| *h = toggle_with(id, h, &edges, closure_policy));
		debug!(
			"toggled `{id}`: {} nodes hidden",
			hidden.with_untracked(HiddenSet::len)
		);
	};

	// A new strain starts fully expanded.
	Effect::new(move |_| {
		graph.track();
		hidden.set(HiddenSet::default());
	});

	let view_bounds = viewport.clone();
	Effect::new(move |_| {
		let b = bounds.get();
		view_bounds.update(|vp| vp.set_content_bounds(b));
	});

	let dirty = viewport.dirty.clone();
	Effect::new(move |_| {
		scene.track();
		dirty.set(true);
	});

	let view_mount = viewport.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (w, h) = canvas_size(&canvas, fullscreen, width, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		view_mount.update(|vp| vp.resize(w, h));

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("2d canvas context unavailable");
			return;
		};

		if let Some(window) = web_sys::window() {
			let (view_resize, canvas_resize) = (view_mount.clone(), canvas.clone());
			let resize = ListenerGuard::attach(&window, "resize", true, move |_| {
				let (nw, nh) = canvas_size(&canvas_resize, fullscreen, width, height);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				view_resize.update(|vp| vp.resize(nw, nh));
			});
			match resize {
				Ok(guard) => resources.update_value(|r| r.resize = Some(guard)),
				Err(e) => warn!("resize listener not attached: {e:?}"),
			}
		}

		let view_frame = view_mount.clone();
		let frame_loop = FrameLoop::start(move || {
			if !view_frame.dirty.replace(false) {
				return;
			}
			let (t, w, h) = {
				let vp = view_frame.controller.borrow();
				(vp.transform, vp.width, vp.height)
			};
			scene.try_with_untracked(|s| render::render(s, &t, w, h, &ctx));
		});
		resources.update_value(|r| r.frame_loop = frame_loop);
	});

	let (view_md, pressed_md) = (viewport.clone(), pressed.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = local_point(&canvas, ev.client_x(), ev.client_y());
		let hit = hit_node(scene, view_md.transform(), x, y);
		view_md.update(|vp| vp.pointer_down(x, y, hit.is_some()));
		dragging.set(view_md.is_dragging());
		*pressed_md.borrow_mut() = hit;
	};

	let view_mm = viewport.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if !view_mm.is_dragging() {
			return;
		}
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = local_point(&canvas, ev.client_x(), ev.client_y());
		view_mm.update(|vp| vp.pointer_move(x, y));
	};

	let (view_mu, pressed_mu) = (viewport.clone(), pressed.clone());
	let on_mouseup = move |ev: MouseEvent| {
		view_mu.update(|vp| vp.pointer_up());
		dragging.set(false);
		let Some(id) = pressed_mu.borrow_mut().take() else {
			return;
		};
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = local_point(&canvas, ev.client_x(), ev.client_y());
		if hit_node(scene, view_mu.transform(), x, y).as_deref() == Some(id.as_str()) {
			toggle_node(&id);
		}
	};

	let (view_ml, pressed_ml) = (viewport.clone(), pressed.clone());
	let on_mouseleave = move |_: MouseEvent| {
		view_ml.update(|vp| vp.pointer_up());
		dragging.set(false);
		pressed_ml.borrow_mut().take();
	};

	let view_wh = viewport.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		view_wh.update(|vp| vp.wheel(ev.delta_y()));
	};

	let (view_ts, pressed_ts) = (viewport.clone(), pressed.clone());
	let on_touchstart = move |ev: TouchEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let points = touch_points(&ev.touches(), &canvas);
		let hit = match points.as_slice() {
			[p] => hit_node(scene, view_ts.transform(), p.0, p.1),
			_ => None,
		};
		view_ts.update(|vp| vp.touch_start(&points, hit.is_some(), js_sys::Date::now()));
		*pressed_ts.borrow_mut() = hit;

		// Keep the page from scrolling or zooming for the rest of the sequence.
		if resources.with_value(|r| r.touch_scroll.is_none()) {
			let Some(document) = web_sys::window().and_then(|w| w.document()) else {
				return;
			};
			match ListenerGuard::attach(&document, "touchmove", false, |e: Event| {
				e.prevent_default()
			}) {
				Ok(guard) => resources.update_value(|r| r.touch_scroll = Some(guard)),
				Err(e) => warn!("touchmove guard not attached: {e:?}"),
			}
		}
	};

	let view_tm = viewport.clone();
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let points = touch_points(&ev.touches(), &canvas);
		view_tm.update(|vp| vp.touch_move(&points));
	};

	let (view_te, pressed_te) = (viewport.clone(), pressed.clone());
	let on_touchend = move |ev: TouchEvent| {
		// Cancelling touchend suppresses the emulated mouse events that would
		// otherwise toggle the node a second time.
		ev.prevent_default();
		let tap = view_te.update(|vp| vp.touch_end(js_sys::Date::now()));
		let pressed = pressed_te.borrow_mut().take();
		if ev.touches().length() == 0 {
			resources.update_value(|r| r.touch_scroll = None);
		}
		let (Some(id), Some(touch), Some(canvas)) = (
			pressed.filter(|_| tap),
			ev.changed_touches().get(0),
			canvas_ref.get_untracked(),
		) else {
			return;
		};
		let (x, y) = local_point(&canvas, touch.client_x(), touch.client_y());
		if hit_node(scene, view_te.transform(), x, y).as_deref() == Some(id.as_str()) {
			toggle_node(&id);
		}
	};

	let (view_tc, pressed_tc) = (viewport.clone(), pressed.clone());
	let on_touchcancel = move |_: TouchEvent| {
		view_tc.update(|vp| vp.cancel_gestures());
		pressed_tc.borrow_mut().take();
		resources.update_value(|r| r.touch_scroll = None);
	};

	let (view_in, view_out, view_reset) = (viewport.clone(), viewport.clone(), viewport.clone());
	let zoom_pct = viewport.zoom_pct;

	view! {
		<div class="flavor-tree-container">
			<canvas
				node_ref=canvas_ref
				class="flavor-tree-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				on:touchstart=on_touchstart
				on:touchmove=on_touchmove
				on:touchend=on_touchend
				on:touchcancel=on_touchcancel
				style=move || {
					let cursor = if dragging.get() { "grabbing" } else { "grab" };
					format!("display: block; touch-action: none; cursor: {cursor};")
				}
			/>
			<ColorLegend />
			<div class="tree-controls">
				<button title="Zoom Out" on:click=move |_| view_out.update(|vp| vp.zoom_out())>
					"−"
				</button>
				<span>{move || format!("{}%", zoom_pct.get())}</span>
				<button title="Zoom In" on:click=move |_| view_in.update(|vp| vp.zoom_in())>
					"+"
				</button>
				<button title="Reset View" on:click=move |_| view_reset.update(|vp| vp.reset())>
					"⟲"
				</button>
			</div>
			<div class="tree-instructions">
				<p>
					"🖱️ Drag to pan | 🔄 Scroll to zoom | 👆 Touch: drag to pan, pinch to zoom | Tap a strain to fold its ancestry"
				</p>
			</div>
			{move || {
				graph
					.with(|g| g.as_ref().err().map(ToString::to_string))
					.map(|message| view! { <div class="tree-error">{message}</div> })
			}}
		</div>
	}
}
