use crate::{
	fiber::{subtree, EffectTag, FiberId},
	host::{apply_props, release_listeners, Host},
	scheduler::Renderer,
};
use hashbrown::HashSet;
use tracing::{error, info, instrument, trace, trace_span};

/// Counts of the host mutations made by one commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitReport {
	/// Host nodes inserted.
	pub placements: usize,
	/// Host nodes whose attributes changed.
	pub updates: usize,
	/// Host nodes tagged for update whose attributes were equal, so nothing was applied.
	pub unchanged: usize,
	/// Fibers removed from the tree.
	pub deletions: usize,
	/// Effects run after the tree was applied.
	pub effects: usize,
}

impl<H: Host> Renderer<H> {
	/// Applies the complete work-in-progress tree to the host in one go and makes it the current tree.
	#[instrument(skip(self))]
	pub(crate) fn commit_root(&mut self) -> CommitReport {
		let mut report = CommitReport::default();
		let root = match self.wip_root.take() {
			Some(root) => root,
			None => return report,
		};
		self.created.clear();

		for deleted in std::mem::take(&mut self.deletions) {
			let span = trace_span!("Committing deletion", ?deleted);
			let _enter = span.enter();
			match self.host_parent(deleted) {
				Some(parent) => self.commit_deletion(deleted, &parent),
				None => error!("Deleted fiber {:?} has no host ancestor. Skipping.", deleted),
			}
			report.deletions += 1;
		}

		if let Some(child) = self.cx.fibers[root].child {
			self.commit_work(child, &mut report);
		}

		self.current_root = Some(root);
		self.collect_garbage(root);
		report.effects = self.run_effects(root);

		info!(
			"Committed {} placement(s), {} update(s) ({} unchanged), {} deletion(s), {} effect(s).",
			report.placements, report.updates, report.unchanged, report.deletions, report.effects
		);
		self.last_commit = Some(report);
		report
	}

	/// Host node of the nearest ancestor that has one.
	fn host_parent(&self, fiber: FiberId) -> Option<H::Node> {
		let mut parent = self.cx.fibers.get(fiber)?.parent;
		while let Some(current) = parent {
			if let Some(node) = self.host_nodes.get(current) {
				return Some(node.clone());
			}
			parent = self.cx.fibers.get(current)?.parent;
		}

		if cfg!(feature = "log-paths") {
			error!("No host ancestor for {:?}. Path: {:?}", fiber, self.path(fiber));
		}
		None
	}

	fn path(&self, fiber: FiberId) -> Vec<String> {
		let mut path = Vec::new();
		let mut current = Some(fiber);
		while let Some(id) = current {
			match self.cx.fibers.get(id) {
				Some(fiber) => {
					path.push(format!("{:?}", fiber.element_type));
					current = fiber.parent;
				}
				None => break,
			}
		}
		path.reverse();
		path
	}

	/// Commits `fiber`, then its children, then its following siblings.
	fn commit_work(&mut self, fiber: FiberId, report: &mut CommitReport) {
		let mut next = Some(fiber);
		while let Some(fiber) = next {
			let effect_tag = self.cx.fibers[fiber].effect_tag;
			if let Some(node) = self.host_nodes.get(fiber).cloned() {
				match effect_tag {
					Some(EffectTag::Placement) => match self.host_parent(fiber) {
						Some(parent) => {
							trace!(?fiber, "Placing.");
							self.host.insert_child(&parent, &node);
							report.placements += 1;
						}
						None => error!("Placed fiber {:?} has no host ancestor. Skipping.", fiber),
					},
					Some(EffectTag::Update) => {
						let current = &self.cx.fibers[fiber];
						let previous = current.alternate.and_then(|alternate| self.cx.fibers.get(alternate)).map(|alternate| alternate.props.clone()).unwrap_or_default();
						let next_props = current.props.clone();
						if previous.same_attributes(&next_props) {
							report.unchanged += 1;
						} else {
							trace!(?fiber, "Updating.");
							apply_props(&mut self.host, &node, &previous, &next_props);
							report.updates += 1;
						}
					}
					Some(EffectTag::Deletion) => error!("Deletion-tagged fiber {:?} found in the work-in-progress tree.", fiber),
					None => (),
				}
			}

			if let Some(child) = self.cx.fibers[fiber].child {
				self.commit_work(child, report);
			}
			next = self.cx.fibers[fiber].sibling;
		}
	}

	/// Runs the effect cleanups and unbinds the listeners of `fiber`'s whole subtree, then detaches its topmost host
	/// nodes from `parent`.
	fn commit_deletion(&mut self, fiber: FiberId, parent: &H::Node) {
		for id in subtree(&self.cx.fibers, fiber) {
			let deleted = &self.cx.fibers[id];
			for hook in &deleted.hooks {
				hook.clean_up();
			}
			if let Some(node) = self.host_nodes.get(id) {
				release_listeners(&mut self.host, node, &deleted.props);
			}
		}
		self.remove_host_nodes(fiber, parent);
	}

	/// Settles the state consumed by the render of the tree under `root`, then runs the effects it queued, in tree
	/// order. Returns how many effects ran.
	fn run_effects(&mut self, root: FiberId) -> usize {
		let mut pending = Vec::new();
		for id in subtree(&self.cx.fibers, root) {
			for hook in &self.cx.fibers[id].hooks {
				if let Some(settle) = hook.take_settle() {
					settle()
				}
				pending.extend(hook.take_pending());
			}
		}

		let count = pending.len();
		for effect in pending {
			effect.run();
		}
		count
	}

	fn remove_host_nodes(&mut self, fiber: FiberId, parent: &H::Node) {
		if let Some(node) = self.host_nodes.get(fiber).cloned() {
			trace!(?fiber, "Removing.");
			return self.host.remove_child(parent, &node);
		}

		let mut child = self.cx.fibers[fiber].child;
		while let Some(current) = child {
			self.remove_host_nodes(current, parent);
			child = self.cx.fibers[current].sibling;
		}
	}

	/// Drops every fiber not in the tree under `root` and unlinks the kept ones from the previous tree.
	fn collect_garbage(&mut self, root: FiberId) {
		let live: HashSet<FiberId> = subtree(&self.cx.fibers, root).into_iter().collect();
		let before = self.cx.fibers.len();
		self.cx.fibers.retain(|id, fiber| {
			if live.contains(&id) {
				fiber.alternate = None;
				fiber.effect_tag = None;
				true
			} else {
				false
			}
		});
		let fibers = &self.cx.fibers;
		self.host_nodes.retain(|id, _| fibers.contains_key(id));
		trace!("Collected {} stale fiber(s).", before - self.cx.fibers.len());
	}
}
