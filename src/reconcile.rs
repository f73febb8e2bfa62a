use crate::{
	element::Element,
	fiber::{EffectTag, Fiber, FiberArena, FiberId},
};
use slotmap::SecondaryMap;
use tracing::{instrument, trace};

/// Diffs `elements` against the children of `parent`'s alternate, by position.
///
/// The resulting fibers become `parent`'s children. Old fibers without a same-typed counterpart are tagged
/// [`EffectTag::Deletion`] and appended to `deletions`; they stay in the old tree.
#[instrument(skip(fibers, host_nodes, elements, deletions))]
pub(crate) fn reconcile_children<N: Clone>(
	fibers: &mut FiberArena,
	host_nodes: &mut SecondaryMap<FiberId, N>,
	parent: FiberId,
	elements: &[Element],
	deletions: &mut Vec<FiberId>,
) {
	let mut old_fiber = fibers[parent].alternate.and_then(|alternate| fibers[alternate].child);
	let mut previous_sibling: Option<FiberId> = None;
	let mut elements = elements.iter();

	loop {
		let element = elements.next();
		if element.is_none() && old_fiber.is_none() {
			break;
		}

		let same_type = match (element, old_fiber) {
			(Some(element), Some(old)) => element.element_type() == fibers[old].element_type.as_ref(),
			_ => false,
		};

		let new_fiber = match (element, old_fiber) {
			(Some(element), Some(old)) if same_type => {
				let new = fibers.insert(Fiber::new(element.element_type().cloned(), element.props().clone(), Some(parent), Some(old), Some(EffectTag::Update)));
				if let Some(node) = host_nodes.get(old).cloned() {
					host_nodes.insert(new, node);
				}
				Some(new)
			}
			(Some(element), _) => Some(fibers.insert(Fiber::new(element.element_type().cloned(), element.props().clone(), Some(parent), None, Some(EffectTag::Placement)))),
			(None, _) => None,
		};

		if let Some(old) = old_fiber {
			if !same_type {
				trace!(?old, "Scheduling deletion.");
				fibers[old].tag(EffectTag::Deletion);
				deletions.push(old);
			}
			old_fiber = fibers[old].sibling;
		}

		if let Some(new) = new_fiber {
			match previous_sibling {
				None => fibers[parent].child = Some(new),
				Some(previous) => fibers[previous].sibling = Some(new),
			}
			previous_sibling = Some(new);
		}
	}
}
