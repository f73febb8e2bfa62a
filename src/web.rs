//! Browser bindings: a [`Host`] over the real DOM, and an idle-callback driver for [`Renderer::work_loop`].

use crate::{
	element::{Listener, Value},
	host::{Host, NodeKind},
	rc_hash_map::{CountSaturatedError, RcHashMap},
	scheduler::{Deadline, Renderer},
};
use core::{
	cell::{Cell, RefCell},
	fmt::{self, Debug, Formatter},
};
use js_sys::{Function, Reflect};
use std::rc::Rc;
use tracing::{error, instrument, trace, trace_span, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

impl Deadline for web_sys::IdleDeadline {
	fn time_remaining(&self) -> f64 {
		web_sys::IdleDeadline::time_remaining(self)
	}
}

/// A [`Host`] writing to a browser [***Document***](https://developer.mozilla.org/en-US/docs/Web/API/Document).
///
/// Properties are assigned as DOM properties (not attributes), so `"className"` and `"nodeValue"` work as expected.
///
/// # Listeners
///
/// Each distinct [`Listener`] is wrapped into one [`Closure`], shared by reference count between all elements it is
/// bound to. The closure is freed once the last binding is removed. Dropping the [`WebHost`] frees all of them, after
/// which any listeners still attached to the document throw into ***JavaScript*** when called.
pub struct WebHost {
	document: web_sys::Document,
	listeners: RcHashMap<usize, u16, Closure<dyn Fn(web_sys::Event)>>,
}

impl Debug for WebHost {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("WebHost")
			.field("document", &self.document)
			.field("listeners", &self.listeners.len())
			.finish()
	}
}

impl WebHost {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		Self {
			document,
			listeners: RcHashMap::default(),
		}
	}

	/// A host for the current window's document, if there is one.
	#[must_use]
	pub fn for_window() -> Option<Self> {
		Some(Self::new(web_sys::window()?.document()?))
	}

	#[must_use]
	pub fn document(&self) -> &web_sys::Document {
		&self.document
	}

	fn set(node: &web_sys::Node, name: &str, value: &JsValue) {
		if let Err(error) = Reflect::set(node, &JsValue::from_str(name), value) {
			error!("Failed to set property {:?}: {:?}", name, error)
		}
	}
}

fn to_js(value: &Value) -> JsValue {
	match value {
		Value::Bool(bool) => JsValue::from_bool(*bool),
		#[allow(clippy::cast_precision_loss)]
		Value::Int(int) => JsValue::from_f64(*int as f64),
		Value::Float(float) => JsValue::from_f64(*float),
		Value::Str(str) => JsValue::from_str(str),
		Value::Listener(_) => {
			warn!("Tried to assign a listener as property value. Using `undefined` instead.");
			JsValue::UNDEFINED
		}
	}
}

impl Host for WebHost {
	type Node = web_sys::Node;

	#[instrument(skip(self))]
	fn create_node(&mut self, kind: NodeKind<'_>) -> web_sys::Node {
		match kind {
			NodeKind::Element(tag) => match self.document.create_element(tag) {
				Ok(element) => element.into(),
				Err(error) => {
					error!("Failed to create element <{}>: {:?}; Using a comment as placeholder.", tag, error);
					self.document.create_comment(tag).into()
				}
			},
			NodeKind::Text => self.document.create_text_node("").into(),
		}
	}

	fn set_property(&mut self, node: &web_sys::Node, name: &str, value: &Value) {
		Self::set(node, name, &to_js(value))
	}

	fn clear_property(&mut self, node: &web_sys::Node, name: &str) {
		Self::set(node, name, &JsValue::from_str(""))
	}

	#[instrument(skip(self, node))]
	fn add_listener(&mut self, node: &web_sys::Node, event: &str, listener: &Listener) {
		let closure = match self.listeners.increment_or_insert_with(listener.key(), || {
			let listener = listener.clone();
			trace!("Created Closure.");
			Closure::wrap(Box::new(move |dom_event: web_sys::Event| {
				let span = trace_span!("listener.call(…)", ?listener);
				let _enter = span.enter();
				listener.call(&dom_event)
			}) as Box<dyn Fn(web_sys::Event)>)
		}) {
			Ok(closure) => closure,
			Err(CountSaturatedError) => return error!("Too many (more than 65k) active bindings of the same `Listener`."),
		};

		let function: &Function = closure.as_ref().unchecked_ref();
		if let Err(error) = node.add_event_listener_with_callback(event, function) {
			error!("Failed to add event listener {:?}: {:?}", event, error)
		}
	}

	#[instrument(skip(self, node))]
	fn remove_listener(&mut self, node: &web_sys::Node, event: &str, listener: &Listener) {
		match self.listeners.weak_decrement(&listener.key()) {
			Ok(Some(closure)) => {
				let function: &Function = closure.as_ref().unchecked_ref();
				if let Err(error) = node.remove_event_listener_with_callback(event, function) {
					error!("Failed to remove event listener {:?}: {:?}", event, error)
				}
			}
			Ok(None) => error!("Tried to remove listener {:?} that was never bound.", listener),
			Err(CountSaturatedError) => error!("Tried to remove listener {:?} more often than it was bound.", listener),
		}

		let freed = self.listeners.drain_weak().count();
		if freed > 0 {
			trace!("Destroyed {} Closure(s).", freed);
		}
	}

	fn insert_child(&mut self, parent: &web_sys::Node, child: &web_sys::Node) {
		if let Err(error) = parent.append_child(child) {
			error!("Failed to insert node: {:?}", error)
		}
	}

	fn remove_child(&mut self, parent: &web_sys::Node, child: &web_sys::Node) {
		if let Err(error) = parent.remove_child(child) {
			error!("Failed to remove node: {:?}", error)
		}
	}
}

type IdleCallback = Closure<dyn FnMut(web_sys::IdleDeadline)>;

/// Drives a shared [`Renderer`] from `requestIdleCallback`, one [`work_loop`](`Renderer::work_loop`) slice per callback.
///
/// The loop re-registers itself after every slice, whether or not work is pending, so renders requested from event
/// listeners are picked up on their own. Dropping the [`IdleLoop`] cancels the pending callback.
pub struct IdleLoop {
	callback: Rc<RefCell<Option<IdleCallback>>>,
	handle: Rc<Cell<Option<u32>>>,
}

impl Debug for IdleLoop {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("IdleLoop").field("handle", &self.handle.get()).finish_non_exhaustive()
	}
}

fn request_idle_callback(callback: &IdleCallback) -> Option<u32> {
	let window = web_sys::window()?;
	match window.request_idle_callback(callback.as_ref().unchecked_ref()) {
		Ok(handle) => Some(handle),
		Err(error) => {
			error!("Failed to request idle callback: {:?}", error);
			None
		}
	}
}

impl IdleLoop {
	/// Starts driving `renderer`. Returns [`None`] if there is no `window` to schedule on.
	#[must_use]
	pub fn start(renderer: Rc<RefCell<Renderer<WebHost>>>) -> Option<Self> {
		let callback: Rc<RefCell<Option<IdleCallback>>> = Rc::default();
		let handle: Rc<Cell<Option<u32>>> = Rc::default();

		let weak_callback = Rc::downgrade(&callback);
		let weak_handle = Rc::downgrade(&handle);
		*callback.borrow_mut() = Some(Closure::wrap(Box::new(move |deadline: web_sys::IdleDeadline| {
			let span = trace_span!("Idle slice", time_remaining = deadline.time_remaining());
			let _enter = span.enter();

			match renderer.try_borrow_mut() {
				Ok(mut renderer) => {
					if let Err(error) = renderer.work_loop(&deadline) {
						error!("Render failed: {}", error)
					}
				}
				Err(_) => warn!("Renderer is borrowed elsewhere. Skipping this slice."),
			}

			if let (Some(callback), Some(handle)) = (weak_callback.upgrade(), weak_handle.upgrade()) {
				if let Some(callback) = callback.borrow().as_ref() {
					handle.set(request_idle_callback(callback));
				}
			}
		}) as Box<dyn FnMut(web_sys::IdleDeadline)>));

		let first = callback.borrow().as_ref().and_then(request_idle_callback)?;
		handle.set(Some(first));
		Some(Self { callback, handle })
	}
}

impl Drop for IdleLoop {
	fn drop(&mut self) {
		if let (Some(handle), Some(window)) = (self.handle.take(), web_sys::window()) {
			window.cancel_idle_callback(handle)
		}
		self.callback.borrow_mut().take();
	}
}
