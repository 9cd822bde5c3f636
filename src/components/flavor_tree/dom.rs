//! Browser listeners and animation frames tied to Rust ownership: dropping
//! the handle detaches the listener or cancels the pending frame.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Event, EventTarget};

/// An event listener that is removed when dropped.
///
/// Never drop a guard from inside its own handler; defer the drop to an
/// effect or another listener instead.
pub struct ListenerGuard {
	target: EventTarget,
	event: &'static str,
	callback: Closure<dyn FnMut(Event)>,
}

impl ListenerGuard {
	pub fn attach(
		target: &EventTarget,
		event: &'static str,
		passive: bool,
		handler: impl FnMut(Event) + 'static,
	) -> Result<Self, JsValue> {
		let callback = Closure::<dyn FnMut(Event)>::new(handler);
		let options = AddEventListenerOptions::new();
		options.set_passive(passive);
		target.add_event_listener_with_callback_and_add_event_listener_options(
			event,
			callback.as_ref().unchecked_ref(),
			&options,
		)?;
		Ok(Self {
			target: target.clone(),
			event,
			callback,
		})
	}
}

impl Drop for ListenerGuard {
	fn drop(&mut self) {
		let _ = self
			.target
			.remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
	}
}

/// Runs `tick` on every animation frame until dropped.
pub struct FrameLoop {
	handle: Rc<Cell<Option<i32>>>,
	callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl FrameLoop {
	pub fn start(mut tick: impl FnMut() + 'static) -> Option<Self> {
		let window = web_sys::window()?;
		let handle = Rc::new(Cell::new(None));
		let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
		let (handle_inner, callback_inner) = (handle.clone(), Rc::downgrade(&callback));

		*callback.borrow_mut() = Some(Closure::new(move || {
			tick();
			let Some(callback) = callback_inner.upgrade() else {
				return;
			};
			if let (Some(window), Some(cb)) = (web_sys::window(), callback.borrow().as_ref()) {
				handle_inner.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));

		let first = window
			.request_animation_frame(callback.borrow().as_ref()?.as_ref().unchecked_ref())
			.ok();
		handle.set(first);
		Some(Self { handle, callback })
	}
}

impl Drop for FrameLoop {
	fn drop(&mut self) {
		if let (Some(id), Some(window)) = (self.handle.take(), web_sys::window()) {
			let _ = window.cancel_animation_frame(id);
		}
		self.callback.borrow_mut().take();
	}
}
