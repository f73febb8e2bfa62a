//! The capability interface to the live document, and the property diff applied through it.

use crate::element::{ElementType, Listener, Props, Value};
use hashbrown::HashMap;
use tracing::{instrument, trace, trace_span, warn};

/// Which kind of node [`Host::create_node`] should create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind<'a> {
	Element(&'a str),
	Text,
}

/// A live document the reconciler can write to.
///
/// Implementations handle their own failures (typically by logging them), so that a commit is never left half-applied
/// because of an error return.
pub trait Host {
	/// A handle to a node of this document. Clones refer to the same node.
	type Node: Clone;

	fn create_node(&mut self, kind: NodeKind<'_>) -> Self::Node;

	/// Sets the property `name`. Never called with a [`Value::Listener`].
	fn set_property(&mut self, node: &Self::Node, name: &str, value: &Value);

	/// Resets the property `name` to the empty string.
	fn clear_property(&mut self, node: &Self::Node, name: &str);

	fn add_listener(&mut self, node: &Self::Node, event: &str, listener: &Listener);
	fn remove_listener(&mut self, node: &Self::Node, event: &str, listener: &Listener);

	/// Appends `child` to `parent`'s children.
	fn insert_child(&mut self, parent: &Self::Node, child: &Self::Node);
	fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node);
}

const LISTENER_PREFIX: &str = "on";

/// Whether the attribute `name` is an event listener binding.
#[must_use]
pub fn is_listener(name: &str) -> bool {
	name.starts_with(LISTENER_PREFIX)
}

/// The host event name bound by the listener attribute `name`, for example `"click"` for `"onClick"`.
#[must_use]
pub fn event_name(name: &str) -> String {
	name.strip_prefix(LISTENER_PREFIX).unwrap_or(name).to_ascii_lowercase()
}

/// Creates the host node for a fiber of the given type, with all of `props` applied.
///
/// Returns [`None`] for components and untyped fibers, which have no host representation.
pub fn create_host_node<H: Host>(host: &mut H, element_type: Option<&ElementType>, props: &Props) -> Option<H::Node> {
	let node = match element_type? {
		ElementType::Component(_) => return None,
		ElementType::Text => host.create_node(NodeKind::Text),
		ElementType::Host(tag) => host.create_node(NodeKind::Element(tag)),
	};
	apply_props(host, &node, &Props::default(), props);
	Some(node)
}

/// Updates `node` from `prev` to `next`.
///
/// Listeners are unbound before any are bound, so that swapping the handler of one event never removes the new one.
#[instrument(skip(host, node, prev, next))]
pub fn apply_props<H: Host>(host: &mut H, node: &H::Node, prev: &Props, next: &Props) {
	let prev: HashMap<&str, &Value> = prev.attributes().iter().map(|(name, value)| (&**name, value)).collect();
	let next_ordered = next.attributes();
	let next: HashMap<&str, &Value> = next_ordered.iter().map(|(name, value)| (&**name, value)).collect();

	// Removed or changed listeners.
	for (&name, &value) in prev.iter().filter(|(name, _)| is_listener(name)) {
		if next.get(name) != Some(&value) {
			if let Some(listener) = listener_value(name, value) {
				let span = trace_span!("Removing listener", name);
				let _enter = span.enter();
				host.remove_listener(node, &event_name(name), listener)
			}
		}
	}

	// New or changed listeners.
	for (name, value) in next_ordered.iter().filter(|(name, _)| is_listener(name)) {
		if prev.get(&**name) != Some(&value) {
			if let Some(listener) = listener_value(name, value) {
				let span = trace_span!("Adding listener", name = &**name);
				let _enter = span.enter();
				host.add_listener(node, &event_name(name), listener)
			}
		}
	}

	// Gone properties.
	for &name in prev.keys().filter(|name| !is_listener(name)) {
		if !next.contains_key(name) {
			trace!(name, "Clearing property.");
			host.clear_property(node, name)
		}
	}

	// New or changed properties.
	for (name, value) in next_ordered.iter().filter(|(name, _)| !is_listener(name)) {
		if prev.get(&**name) != Some(&value) {
			if cfg!(feature = "dangerous-logging") {
				trace!(name = &**name, %value, "Setting property.");
			} else {
				trace!(name = &**name, "Setting property.");
			}
			host.set_property(node, name, value)
		}
	}
}

/// Unbinds every listener in `props` from `node`, as bound by [`create_host_node`] or [`apply_props`].
pub fn release_listeners<H: Host>(host: &mut H, node: &H::Node, props: &Props) {
	for (name, value) in props.attributes().iter().filter(|(name, _)| is_listener(name)) {
		if let Some(listener) = value.as_listener() {
			trace!(name = &**name, "Releasing listener.");
			host.remove_listener(node, &event_name(name), listener)
		}
	}
}

fn listener_value<'a>(name: &str, value: &'a Value) -> Option<&'a Listener> {
	let listener = value.as_listener();
	if listener.is_none() {
		warn!("Attribute {:?} looks like a listener binding but isn't bound to a `Listener`. Skipping.", name);
	}
	listener
}
