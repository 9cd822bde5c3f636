//! Pan/zoom state and the pointer, wheel and touch gesture machine.
//!
//! All coordinates handed to the controller are canvas-local screen pixels.

use super::types::Bounds;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportConfig {
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Zoom used for the initial fit and on reset.
	pub default_zoom: f64,
	pub wheel_zoom_in: f64,
	pub wheel_zoom_out: f64,
	/// Factor applied by the zoom buttons.
	pub button_step: f64,
	/// Longest press, in milliseconds, that still counts as a tap.
	pub tap_max_ms: f64,
	/// Pinch distances at or below this are not used as a ratio denominator.
	pub min_pinch_distance: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			min_zoom: 0.2,
			max_zoom: 3.0,
			default_zoom: 0.7,
			wheel_zoom_in: 1.1,
			wheel_zoom_out: 0.9,
			button_step: 1.2,
			tap_max_ms: 300.0,
			min_pinch_distance: 1.0,
		}
	}
}

impl ViewportConfig {
	pub fn clamp_zoom(&self, k: f64) -> f64 {
		k.max(self.min_zoom).min(self.max_zoom)
	}
}

/// Screen = layout * k + (x, y).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl ViewTransform {
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Rescale to `new_k` keeping the screen point (`ax`, `ay`) fixed.
	fn zoom_about(&mut self, ax: f64, ay: f64, new_k: f64) {
		let ratio = new_k / self.k;
		self.x = ax - (ax - self.x) * ratio;
		self.y = ay - (ay - self.y) * ratio;
		self.k = new_k;
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub last_x: f64,
	pub last_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PinchState {
	pub active: bool,
	pub distance: f64,
	pub center_x: f64,
	pub center_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct TouchState {
	pub started_at: f64,
	pub moved: bool,
}

pub struct ViewportController {
	pub config: ViewportConfig,
	pub transform: ViewTransform,
	pub pan: PanState,
	pub pinch: PinchState,
	pub touch: TouchState,
	pub width: f64,
	pub height: f64,
	bounds: Bounds,
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
	((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn midpoint(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
	((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}

impl ViewportController {
	pub fn new(config: ViewportConfig, width: f64, height: f64, bounds: Bounds) -> Self {
		let mut controller = Self {
			config,
			transform: ViewTransform::default(),
			pan: PanState::default(),
			pinch: PinchState::default(),
			touch: TouchState::default(),
			width,
			height,
			bounds,
		};
		controller.reset();
		controller
	}

	/// Transform that centres the content at the default zoom.
	pub fn fit_transform(&self) -> ViewTransform {
		let b = if self.bounds.is_degenerate() {
			Bounds::FALLBACK
		} else {
			self.bounds
		};
		let k = self.config.clamp_zoom(self.config.default_zoom);
		ViewTransform {
			x: (self.width - b.width() * k) / 2.0 - b.min_x * k,
			y: (self.height - b.height() * k) / 2.0 - b.min_y * k,
			k,
		}
	}

	pub fn reset(&mut self) {
		self.transform = self.fit_transform();
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.reset();
	}

	pub fn set_content_bounds(&mut self, bounds: Bounds) {
		self.bounds = bounds;
		self.reset();
	}

	pub fn is_dragging(&self) -> bool {
		self.pan.active
	}

	fn begin_pan(&mut self, x: f64, y: f64) {
		self.pan = PanState {
			active: true,
			last_x: x,
			last_y: y,
		};
	}

	/// Apply the delta since the previous sample. Returns whether the view moved.
	fn continue_pan(&mut self, x: f64, y: f64) -> bool {
		if !self.pan.active {
			return false;
		}
		self.transform.x += x - self.pan.last_x;
		self.transform.y += y - self.pan.last_y;
		self.pan.last_x = x;
		self.pan.last_y = y;
		true
	}

	/// Presses on a node are left to the caller; only empty canvas pans.
	pub fn pointer_down(&mut self, x: f64, y: f64, on_node: bool) {
		if !on_node {
			self.begin_pan(x, y);
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
		self.continue_pan(x, y)
	}

	pub fn pointer_up(&mut self) {
		self.pan.active = false;
	}

	/// Horizontal-only scrolls (`delta_y == 0`) leave the zoom alone.
	pub fn wheel(&mut self, delta_y: f64) {
		let factor = if delta_y > 0.0 {
			self.config.wheel_zoom_out
		} else if delta_y < 0.0 {
			self.config.wheel_zoom_in
		} else {
			return;
		};
		self.zoom_by(factor);
	}

	pub fn zoom_in(&mut self) {
		self.zoom_by(self.config.button_step);
	}

	pub fn zoom_out(&mut self) {
		self.zoom_by(1.0 / self.config.button_step);
	}

	/// Scalar zoom anchored at the viewport centre.
	fn zoom_by(&mut self, factor: f64) {
		let new_k = self.config.clamp_zoom(self.transform.k * factor);
		self.transform
			.zoom_about(self.width / 2.0, self.height / 2.0, new_k);
	}

	/// `touches` are all contacts currently down; `on_node` is whether the
	/// single contact landed on a node.
	pub fn touch_start(&mut self, touches: &[(f64, f64)], on_node: bool, now_ms: f64) {
		match touches {
			[p] => {
				self.touch = TouchState {
					started_at: now_ms,
					moved: false,
				};
				self.pinch.active = false;
				if on_node {
					self.pan.active = false;
				} else {
					self.begin_pan(p.0, p.1);
				}
			}
			[a, b] => {
				self.pan.active = false;
				self.touch.moved = true;
				let (cx, cy) = midpoint(*a, *b);
				self.pinch = PinchState {
					active: true,
					distance: distance(*a, *b),
					center_x: cx,
					center_y: cy,
				};
			}
			_ => self.cancel_gestures(),
		}
	}

	/// Returns whether the view changed.
	pub fn touch_move(&mut self, touches: &[(f64, f64)]) -> bool {
		self.touch.moved = true;
		match touches {
			[a, b] if self.pinch.active => self.pinch_to(distance(*a, *b)),
			[p] => self.continue_pan(p.0, p.1),
			_ => false,
		}
	}

	fn pinch_to(&mut self, new_distance: f64) -> bool {
		let previous = self.pinch.distance;
		self.pinch.distance = new_distance;
		if previous <= self.config.min_pinch_distance {
			return false;
		}
		let new_k = self
			.config
			.clamp_zoom(self.transform.k * (new_distance / previous));
		self.transform
			.zoom_about(self.pinch.center_x, self.pinch.center_y, new_k);
		true
	}

	/// Ends the current touch sequence and reports whether it was a tap.
	pub fn touch_end(&mut self, now_ms: f64) -> bool {
		let tap = !self.touch.moved && now_ms - self.touch.started_at < self.config.tap_max_ms;
		self.cancel_gestures();
		tap
	}

	pub fn cancel_gestures(&mut self) {
		self.pan.active = false;
		self.pinch = PinchState::default();
		self.touch.moved = true;
	}
}
