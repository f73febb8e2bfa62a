//! Per-fiber state and lifecycle effects for function components.

use crate::{
	element::Value,
	fiber::{FiberArena, FiberId},
	Error, Result,
};
use core::{
	any::Any,
	cell::{Cell, RefCell},
	fmt::{self, Debug, Formatter},
};
use std::rc::Rc;
use tracing::trace;

/// Returned by an effect, run before the effect re-runs and when its fiber is deleted.
pub type Cleanup = Box<dyn FnOnce()>;

type CleanupSlot = Rc<RefCell<Option<Cleanup>>>;

/// Applied to a state cell once the render that produced it is committed.
pub(crate) type Settle = Box<dyn FnOnce()>;

/// Raised by [`SetState`] to ask the owning renderer for a new pass.
#[derive(Debug, Default)]
pub(crate) struct RenderRequest(Cell<bool>);

impl RenderRequest {
	pub fn raise(&self) {
		self.0.set(true)
	}

	pub fn take(&self) -> bool {
		self.0.replace(false)
	}

	pub fn is_raised(&self) -> bool {
		self.0.get()
	}
}

struct StateCell<T> {
	value: T,
	queue: Vec<Rc<dyn Fn(&T) -> T>>,
}

/// An effect queued during render. Runs when its fiber is committed, and is dropped with it otherwise.
pub(crate) struct PendingEffect {
	effect: Box<dyn FnOnce() -> Option<Cleanup>>,
	previous: Option<CleanupSlot>,
	cleanup: CleanupSlot,
}

impl PendingEffect {
	/// Calls the previous run's cleanup, if still pending, then the effect.
	pub fn run(self) {
		if let Some(previous) = self.previous {
			let cleanup = previous.borrow_mut().take();
			if let Some(cleanup) = cleanup {
				cleanup()
			}
		}
		let cleanup = (self.effect)();
		*self.cleanup.borrow_mut() = cleanup;
	}
}

#[derive(Clone)]
pub(crate) struct EffectHook {
	deps: Option<Vec<Value>>,
	cleanup: CleanupSlot,
	pending: Rc<RefCell<Option<PendingEffect>>>,
}

impl EffectHook {
	/// Runs the pending cleanup, if it hasn't run yet.
	pub fn clean_up(&self) {
		let cleanup = self.cleanup.borrow_mut().take();
		if let Some(cleanup) = cleanup {
			cleanup()
		}
	}
}

#[derive(Clone)]
pub(crate) enum Hook {
	State {
		/// A `RefCell<StateCell<T>>`, shared by every render of the fiber and by its setters.
		cell: Rc<dyn Any>,
		settle: Rc<RefCell<Option<Settle>>>,
	},
	Effect(EffectHook),
}

impl Hook {
	fn kind(&self) -> &'static str {
		match self {
			Hook::State { .. } => "state",
			Hook::Effect(_) => "effect",
		}
	}

	/// Runs an effect hook's pending cleanup. State hooks have none.
	pub fn clean_up(&self) {
		if let Hook::Effect(effect) = self {
			effect.clean_up()
		}
	}

	/// Takes the effect queued by the render that created this hook, if it hasn't been run.
	pub fn take_pending(&self) -> Option<PendingEffect> {
		match self {
			Hook::Effect(effect) => effect.pending.borrow_mut().take(),
			Hook::State { .. } => None,
		}
	}

	/// Takes the state update that makes this hook's value the committed one, if it hasn't been applied.
	pub fn take_settle(&self) -> Option<Settle> {
		match self {
			Hook::State { settle, .. } => settle.borrow_mut().take(),
			Hook::Effect(_) => None,
		}
	}
}

impl Debug for Hook {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Hook::State { settle, .. } => f.debug_struct("State").field("settled", &settle.borrow().is_none()).finish_non_exhaustive(),
			Hook::Effect(effect) => f
				.debug_struct("Effect")
				.field("deps", &effect.deps)
				.field("pending", &effect.pending.borrow().is_some())
				.finish_non_exhaustive(),
		}
	}
}

#[derive(Debug, Clone, Copy)]
struct HookCursor {
	fiber: FiberId,
	index: usize,
}

/// The render session a function component runs in.
///
/// Holds the fiber arena and the hook cursor: which fiber is rendering, and how many hooks it has called so far.
pub struct RenderContext {
	pub(crate) fibers: FiberArena,
	cursor: Option<HookCursor>,
	pub(crate) request: Rc<RenderRequest>,
}

impl Debug for RenderContext {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("RenderContext")
			.field("fibers", &self.fibers.len())
			.field("cursor", &self.cursor)
			.field("request", &self.request)
			.finish()
	}
}

impl RenderContext {
	pub(crate) fn new() -> Self {
		Self {
			fibers: FiberArena::with_key(),
			cursor: None,
			request: Rc::default(),
		}
	}

	/// Points the hook cursor at the start of `fiber`, which is about to render.
	pub(crate) fn begin(&mut self, fiber: FiberId) {
		self.fibers[fiber].hooks.clear();
		self.cursor = Some(HookCursor { fiber, index: 0 });
	}

	pub(crate) fn end(&mut self) {
		self.cursor = None;
	}

	fn cursor(&self) -> Result<HookCursor> {
		self.cursor.ok_or(Error::InvalidHookContext)
	}

	/// The hook the previous render of the current fiber recorded at the cursor position.
	fn previous_hook(&self, cursor: HookCursor) -> Option<Hook> {
		let alternate = self.fibers[cursor.fiber].alternate?;
		self.fibers.get(alternate)?.hooks.get(cursor.index).cloned()
	}

	fn push_hook(&mut self, hook: Hook) -> Result<()> {
		let cursor = self.cursor.as_mut().ok_or(Error::InvalidHookContext)?;
		self.fibers[cursor.fiber].hooks.push(hook);
		cursor.index += 1;
		Ok(())
	}

	/// A value that persists across renders of the calling component.
	///
	/// Returns the current value and a setter. On the first render the value is `initial`; afterwards it is the last
	/// committed value with all updates queued through the setter since then applied in call order.
	///
	/// Updates are consumed only when the render is committed, so discarded renders lose none of them.
	///
	/// # Errors
	///
	/// [`Error::InvalidHookContext`] outside of a component render,
	/// [`Error::HookMismatch`] if the previous render called a different hook (or state of a different type) here.
	pub fn use_state<T: Clone + 'static>(&mut self, initial: T) -> Result<(T, SetState<T>)> {
		let cursor = self.cursor()?;
		let mismatch = |found| Error::HookMismatch {
			index: cursor.index,
			expected: "state",
			found,
		};

		let (cell, value, settle) = match self.previous_hook(cursor) {
			None => {
				let cell = Rc::new(RefCell::new(StateCell {
					value: initial.clone(),
					queue: Vec::new(),
				}));
				(cell, initial, None)
			}
			Some(Hook::State { cell, .. }) => {
				let cell = cell.downcast::<RefCell<StateCell<T>>>().map_err(|_| mismatch("state of another type"))?;
				let (value, applied) = {
					let state = cell.borrow();
					if !state.queue.is_empty() {
						trace!(index = cursor.index, updates = state.queue.len(), "Replaying state updates.");
					}
					let value = state.queue.iter().fold(state.value.clone(), |value, update| update(&value));
					let applied = state.queue.len();
					(value, applied)
				};

				let settle: Settle = {
					let cell = Rc::clone(&cell);
					let value = value.clone();
					Box::new(move || {
						let mut state = cell.borrow_mut();
						let applied = applied.min(state.queue.len());
						state.queue.drain(..applied).for_each(drop);
						state.value = value;
					})
				};
				(cell, value, Some(settle))
			}
			Some(hook) => return Err(mismatch(hook.kind())),
		};

		self.push_hook(Hook::State {
			cell: Rc::clone(&cell) as Rc<dyn Any>,
			settle: Rc::new(RefCell::new(settle)),
		})?;
		Ok((value, SetState { cell, request: Rc::clone(&self.request) }))
	}

	/// Queues `effect` if `deps` is [`None`], if this is the first render, or if any dependency differs from the previous
	/// render's.
	///
	/// Queued effects run once the render is committed, right after the previous run's cleanup (if any). If the render
	/// is discarded instead, so is the effect, and the previous cleanup stays pending. The cleanup returned by `effect` is
	/// kept until the effect runs again or the component is removed.
	///
	/// # Errors
	///
	/// [`Error::InvalidHookContext`] outside of a component render,
	/// [`Error::HookMismatch`] if the previous render called a different hook here.
	pub fn use_effect<F>(&mut self, effect: F, deps: Option<Vec<Value>>) -> Result<()>
	where
		F: FnOnce() -> Option<Cleanup> + 'static,
	{
		let cursor = self.cursor()?;
		let previous = match self.previous_hook(cursor) {
			None => None,
			Some(Hook::Effect(previous)) => Some(previous),
			Some(hook) => {
				return Err(Error::HookMismatch {
					index: cursor.index,
					expected: "effect",
					found: hook.kind(),
				})
			}
		};

		let should_run = match (&deps, &previous) {
			(Some(deps), Some(previous)) => previous.deps.as_ref() != Some(deps),
			_ => true,
		};

		let (cleanup, pending) = if should_run {
			trace!(index = cursor.index, "Queueing effect.");
			let cleanup = CleanupSlot::default();
			let pending = PendingEffect {
				effect: Box::new(effect),
				previous: previous.map(|previous| previous.cleanup),
				cleanup: Rc::clone(&cleanup),
			};
			(cleanup, Some(pending))
		} else {
			(previous.map(|previous| previous.cleanup).unwrap_or_default(), None)
		};

		self.push_hook(Hook::Effect(EffectHook {
			deps,
			cleanup,
			pending: Rc::new(RefCell::new(pending)),
		}))
	}
}

/// Queues updates for one [`use_state`](`RenderContext::use_state`) value and requests a new render pass.
pub struct SetState<T> {
	cell: Rc<RefCell<StateCell<T>>>,
	request: Rc<RenderRequest>,
}

impl<T> Clone for SetState<T> {
	fn clone(&self) -> Self {
		Self {
			cell: Rc::clone(&self.cell),
			request: Rc::clone(&self.request),
		}
	}
}

impl<T> Debug for SetState<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("SetState").field("queued", &self.cell.borrow().queue.len()).finish()
	}
}

impl<T: 'static> SetState<T> {
	/// Queues `update`, which receives the state as of the previously queued updates.
	pub fn update(&self, update: impl Fn(&T) -> T + 'static) {
		self.cell.borrow_mut().queue.push(Rc::new(update));
		self.request.raise();
	}

	pub fn set(&self, value: T)
	where
		T: Clone,
	{
		self.update(move |_| value.clone())
	}
}
