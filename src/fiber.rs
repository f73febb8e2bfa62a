use crate::{
	element::{ElementType, Props},
	hooks::Hook,
};
use slotmap::SlotMap;

slotmap::new_key_type! {
	/// Handle of a [`Fiber`] in a renderer's arena.
	pub struct FiberId;
}

/// What the commit phase has to do for a fiber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectTag {
	Placement,
	Update,
	Deletion,
}

/// One unit of work, and at the same time one node of a (current or work-in-progress) tree.
///
/// Children are linked as `child` → `sibling` → `sibling`…, each pointing back via `parent`.
/// Host nodes are stored beside the arena, keyed by [`FiberId`].
#[derive(Debug)]
pub(crate) struct Fiber {
	pub element_type: Option<ElementType>,
	pub props: Props,
	pub parent: Option<FiberId>,
	pub child: Option<FiberId>,
	pub sibling: Option<FiberId>,
	/// The fiber at the same position in the last committed tree.
	pub alternate: Option<FiberId>,
	pub effect_tag: Option<EffectTag>,
	pub hooks: Vec<Hook>,
}

impl Fiber {
	pub fn new(element_type: Option<ElementType>, props: Props, parent: Option<FiberId>, alternate: Option<FiberId>, effect_tag: Option<EffectTag>) -> Self {
		Self {
			element_type,
			props,
			parent,
			child: None,
			sibling: None,
			alternate,
			effect_tag,
			hooks: Vec::new(),
		}
	}

	pub fn tag(&mut self, effect_tag: EffectTag) {
		debug_assert!(
			self.effect_tag.is_none() || self.effect_tag == Some(effect_tag),
			"Effect tag reassigned within one pass: {:?} -> {:?}",
			self.effect_tag,
			effect_tag
		);
		self.effect_tag = Some(effect_tag);
	}
}

pub(crate) type FiberArena = SlotMap<FiberId, Fiber>;

/// Depth-first successor of `fiber`: its child, else the sibling of the nearest ancestor (or itself) that has one.
pub(crate) fn next_unit(fibers: &FiberArena, fiber: FiberId) -> Option<FiberId> {
	if let Some(child) = fibers[fiber].child {
		return Some(child);
	}

	let mut next = Some(fiber);
	while let Some(current) = next {
		let current = &fibers[current];
		if current.sibling.is_some() {
			return current.sibling;
		}
		next = current.parent;
	}
	None
}

/// Every fiber reachable from `root` through `child`/`sibling` links, `root` included, in depth-first order.
pub(crate) fn subtree(fibers: &FiberArena, root: FiberId) -> Vec<FiberId> {
	let mut order = vec![root];
	let mut stack: Vec<FiberId> = fibers[root].child.into_iter().collect();
	while let Some(fiber) = stack.pop() {
		order.push(fiber);
		if let Some(sibling) = fibers[fiber].sibling {
			stack.push(sibling);
		}
		if let Some(child) = fibers[fiber].child {
			stack.push(child);
		}
	}
	order
}
