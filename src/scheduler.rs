use crate::{
	commit::CommitReport,
	element::{Element, ElementType, Props, Value},
	fiber::{next_unit, Fiber, FiberId},
	hooks::{Cleanup, RenderContext, SetState},
	host::{create_host_node, release_listeners, Host},
	reconcile::reconcile_children,
	Result,
};
use core::fmt::{self, Debug, Formatter};
use slotmap::SecondaryMap;
use tracing::{error, instrument, trace, trace_span, warn};

/// How much time is left in the current idle slice.
pub trait Deadline {
	/// Remaining time in milliseconds.
	fn time_remaining(&self) -> f64;
}

impl<F: Fn() -> f64> Deadline for F {
	fn time_remaining(&self) -> f64 {
		self()
	}
}

/// A slice that never runs out.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
	fn time_remaining(&self) -> f64 {
		f64::INFINITY
	}
}

/// Tuning for [`Renderer::work_loop`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkLoopOptions {
	/// The loop yields once [`Deadline::time_remaining`] drops below this many milliseconds.
	pub yield_threshold: f64,
}

impl Default for WorkLoopOptions {
	fn default() -> Self {
		Self { yield_threshold: 1.0 }
	}
}

/// Where a [`Renderer`] is in its render → commit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	/// Nothing to do.
	Idle,
	/// Units of work are pending.
	Rendering,
	/// The work-in-progress tree is complete but not yet applied.
	Committing,
}

/// What one [`Renderer::work_loop`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliceOutcome {
	/// Fibers processed during the slice.
	pub units: usize,
	/// Set if the slice ended with a commit.
	pub committed: Option<CommitReport>,
}

/// One render session: the fiber trees, their scheduling state and the host document they are committed to.
///
/// Any number of renderers can coexist; none of them share state.
pub struct Renderer<H: Host> {
	pub(crate) host: H,
	pub(crate) cx: RenderContext,
	pub(crate) host_nodes: SecondaryMap<FiberId, H::Node>,
	pub(crate) current_root: Option<FiberId>,
	pub(crate) wip_root: Option<FiberId>,
	pub(crate) next_unit_of_work: Option<FiberId>,
	pub(crate) deletions: Vec<FiberId>,
	/// Fibers whose host node was created by the current pass.
	pub(crate) created: Vec<FiberId>,
	pub(crate) last_commit: Option<CommitReport>,
	options: WorkLoopOptions,
}

impl<H: Host> Debug for Renderer<H> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Renderer")
			.field("cx", &self.cx)
			.field("current_root", &self.current_root)
			.field("wip_root", &self.wip_root)
			.field("next_unit_of_work", &self.next_unit_of_work)
			.field("deletions", &self.deletions)
			.field("options", &self.options)
			.finish_non_exhaustive()
	}
}

impl<H: Host> Renderer<H> {
	pub fn new(host: H) -> Self {
		Self::with_options(host, WorkLoopOptions::default())
	}

	pub fn with_options(host: H, options: WorkLoopOptions) -> Self {
		Self {
			host,
			cx: RenderContext::new(),
			host_nodes: SecondaryMap::new(),
			current_root: None,
			wip_root: None,
			next_unit_of_work: None,
			deletions: Vec::new(),
			created: Vec::new(),
			last_commit: None,
			options,
		}
	}

	pub fn host(&self) -> &H {
		&self.host
	}

	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}

	#[must_use]
	pub fn last_commit(&self) -> Option<&CommitReport> {
		self.last_commit.as_ref()
	}

	#[must_use]
	pub fn phase(&self) -> Phase {
		match (self.next_unit_of_work, self.wip_root) {
			(Some(_), _) => Phase::Rendering,
			(None, Some(_)) => Phase::Committing,
			(None, None) => Phase::Idle,
		}
	}

	/// Starts a new render of `element` into `container`, discarding any uncommitted work.
	///
	/// Nothing happens until the work loop runs.
	#[instrument(skip(self, element, container))]
	pub fn render(&mut self, element: Element, container: H::Node) {
		let root = self.cx.fibers.insert(Fiber::new(None, Props::with_children(vec![element]), None, self.current_root, None));
		self.host_nodes.insert(root, container);
		self.restart_from(root);
	}

	/// Begins a pass from the committed root, if a setter asked for one.
	fn take_render_request(&mut self) {
		if !self.cx.request.take() {
			return;
		}

		let current = match self.current_root {
			Some(current) => current,
			None => {
				trace!("Render requested before the first commit. Deferring.");
				return self.cx.request.raise();
			}
		};

		let props = self.cx.fibers[current].props.clone();
		let root = self.cx.fibers.insert(Fiber::new(None, props, None, Some(current), None));
		if let Some(container) = self.host_nodes.get(current).cloned() {
			self.host_nodes.insert(root, container);
		}
		self.restart_from(root);
	}

	fn restart_from(&mut self, root: FiberId) {
		if self.wip_root.is_some() {
			trace!("Discarding uncommitted work.");
		}
		self.release_created();
		self.wip_root = Some(root);
		self.deletions.clear();
		self.next_unit_of_work = Some(root);
	}

	fn abandon(&mut self) {
		self.cx.end();
		self.release_created();
		self.wip_root = None;
		self.next_unit_of_work = None;
		self.deletions.clear();
	}

	/// Unbinds the listeners of host nodes created by uncommitted work. The nodes themselves were never inserted.
	fn release_created(&mut self) {
		for fiber in std::mem::take(&mut self.created) {
			if let (Some(node), Some(fiber)) = (self.host_nodes.get(fiber), self.cx.fibers.get(fiber)) {
				release_listeners(&mut self.host, node, &fiber.props);
			}
		}
	}

	/// Runs one idle slice: processes fibers until none are left or `deadline` runs low, then commits if the tree is
	/// complete.
	///
	/// The deadline is checked after each fiber, so at least one is processed if any is pending.
	///
	/// # Errors
	///
	/// Iff a component fails to render. The work-in-progress tree is dropped uncommitted in that case.
	#[instrument(skip(self, deadline))]
	pub fn work_loop(&mut self, deadline: &impl Deadline) -> Result<SliceOutcome> {
		let mut outcome = SliceOutcome::default();
		let mut should_yield = false;

		loop {
			self.take_render_request();
			let unit = match self.next_unit_of_work {
				Some(unit) if !should_yield => unit,
				_ => break,
			};

			self.next_unit_of_work = match self.perform_unit_of_work(unit) {
				Ok(next) => next,
				Err(error) => {
					error!("Render failed, abandoning work in progress: {}", error);
					self.abandon();
					return Err(error);
				}
			};
			outcome.units += 1;
			should_yield = deadline.time_remaining() < self.options.yield_threshold;
		}

		if self.next_unit_of_work.is_none() && self.wip_root.is_some() {
			outcome.committed = Some(self.commit_root());
		}

		Ok(outcome)
	}

	/// Runs unbounded slices until idle, including any passes requested by setters along the way.
	///
	/// Returns the report of the last commit made, if any.
	///
	/// # Errors
	///
	/// Iff a component fails to render.
	pub fn flush(&mut self) -> Result<Option<CommitReport>> {
		let mut committed = None;
		while self.phase() != Phase::Idle || (self.cx.request.is_raised() && self.current_root.is_some()) {
			if let Some(report) = self.work_loop(&Unbounded)?.committed {
				committed = Some(report);
			}
		}
		Ok(committed)
	}

	/// Processes one fiber and returns the next one.
	fn perform_unit_of_work(&mut self, fiber: FiberId) -> Result<Option<FiberId>> {
		match self.cx.fibers[fiber].element_type.clone() {
			Some(ElementType::Component(component)) => {
				let span = trace_span!("Rendering component", component = component.name());
				let _enter = span.enter();
				let props = self.cx.fibers[fiber].props.clone();
				self.cx.begin(fiber);
				let rendered = component.render(&mut self.cx, &props);
				self.cx.end();
				reconcile_children(&mut self.cx.fibers, &mut self.host_nodes, fiber, &[rendered?], &mut self.deletions);
			}
			element_type => {
				let span = trace_span!("Updating host fiber", ?element_type);
				let _enter = span.enter();
				let props = self.cx.fibers[fiber].props.clone();
				if !self.host_nodes.contains_key(fiber) {
					if let Some(node) = create_host_node(&mut self.host, element_type.as_ref(), &props) {
						self.host_nodes.insert(fiber, node);
						self.created.push(fiber);
					}
				}
				reconcile_children(&mut self.cx.fibers, &mut self.host_nodes, fiber, props.children(), &mut self.deletions);
			}
		}

		Ok(next_unit(&self.cx.fibers, fiber))
	}

	/// [`RenderContext::use_state`] on the renderer itself, which is never inside a component render.
	///
	/// Always reports [`Error::InvalidHookContext`](`crate::Error::InvalidHookContext`).
	///
	/// # Errors
	///
	/// See [`RenderContext::use_state`].
	#[doc(hidden)]
	pub fn use_state<T: Clone + 'static>(&mut self, initial: T) -> Result<(T, SetState<T>)> {
		let result = self.cx.use_state(initial);
		if result.is_err() {
			warn!("`use_state` called on the renderer outside of a component render.");
		}
		result
	}

	/// [`RenderContext::use_effect`] on the renderer itself. Always reports
	/// [`Error::InvalidHookContext`](`crate::Error::InvalidHookContext`).
	///
	/// # Errors
	///
	/// See [`RenderContext::use_effect`].
	#[doc(hidden)]
	pub fn use_effect<F>(&mut self, effect: F, deps: Option<Vec<Value>>) -> Result<()>
	where
		F: FnOnce() -> Option<Cleanup> + 'static,
	{
		let result = self.cx.use_effect(effect, deps);
		if result.is_err() {
			warn!("`use_effect` called on the renderer outside of a component render.");
		}
		result
	}
}
