//! A host document that lives entirely in memory.
//!
//! Useful for tests and for running components outside of a browser.

use crate::{
	element::{Listener, Value, NODE_VALUE},
	host::{Host, NodeKind},
};
use core::{any::Any, fmt::Write as _};
use tracing::{error, warn};

/// Handle of a node in a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
enum Kind {
	Element(String),
	Text,
}

#[derive(Debug)]
struct NodeData {
	kind: Kind,
	properties: Vec<(String, Value)>,
	listeners: Vec<(String, Listener)>,
	children: Vec<NodeId>,
	parent: Option<NodeId>,
}

/// How often each kind of mutation was applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationLog {
	pub created: usize,
	pub inserted: usize,
	pub removed: usize,
	pub properties_set: usize,
	pub properties_cleared: usize,
	pub listeners_added: usize,
	pub listeners_removed: usize,
}

impl MutationLog {
	/// Total number of writes to nodes that may be attached to the document.
	#[must_use]
	pub fn writes(&self) -> usize {
		self.inserted + self.removed + self.properties_set + self.properties_cleared + self.listeners_added + self.listeners_removed
	}
}

/// An in-memory document. Nodes are never freed, so every [`NodeId`] stays valid.
#[derive(Debug, Default)]
pub struct MemoryHost {
	nodes: Vec<NodeData>,
	log: MutationLog,
}

impl MemoryHost {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a detached element to render into. Not counted in the [`MutationLog`].
	pub fn create_container(&mut self, tag: &str) -> NodeId {
		self.push(Kind::Element(tag.to_owned()))
	}

	fn push(&mut self, kind: Kind) -> NodeId {
		self.nodes.push(NodeData {
			kind,
			properties: Vec::new(),
			listeners: Vec::new(),
			children: Vec::new(),
			parent: None,
		});
		NodeId(self.nodes.len() - 1)
	}

	fn store(&mut self, node: NodeId, name: &str, value: Value) {
		let properties = &mut self.nodes[node.0].properties;
		match properties.iter_mut().find(|(key, _)| key == name) {
			Some((_, existing)) => *existing = value,
			None => properties.push((name.to_owned(), value)),
		}
	}

	#[must_use]
	pub fn mutations(&self) -> MutationLog {
		self.log
	}

	/// The tag name of an element node, [`None`] for text nodes.
	#[must_use]
	pub fn tag(&self, node: NodeId) -> Option<&str> {
		match &self.nodes[node.0].kind {
			Kind::Element(tag) => Some(tag),
			Kind::Text => None,
		}
	}

	#[must_use]
	pub fn children(&self, node: NodeId) -> &[NodeId] {
		&self.nodes[node.0].children
	}

	#[must_use]
	pub fn parent(&self, node: NodeId) -> Option<NodeId> {
		self.nodes[node.0].parent
	}

	#[must_use]
	pub fn property(&self, node: NodeId, name: &str) -> Option<&Value> {
		self.nodes[node.0].properties.iter().find(|(key, _)| key == name).map(|(_, value)| value)
	}

	#[must_use]
	pub fn listener_count(&self, node: NodeId, event: &str) -> usize {
		self.nodes[node.0].listeners.iter().filter(|(name, _)| name == event).count()
	}

	/// Concatenated content of all text nodes in the subtree.
	#[must_use]
	pub fn text_content(&self, node: NodeId) -> String {
		let mut text = String::new();
		self.collect_text(node, &mut text);
		text
	}

	fn collect_text(&self, node: NodeId, text: &mut String) {
		let data = &self.nodes[node.0];
		match data.kind {
			Kind::Text => {
				if let Some(value) = self.property(node, NODE_VALUE) {
					write!(text, "{}", value).ok();
				}
			}
			Kind::Element(_) => {
				for &child in &data.children {
					self.collect_text(child, text)
				}
			}
		}
	}

	/// First element in the subtree (including `root`) whose `name` property displays as `value`.
	#[must_use]
	pub fn find_by_property(&self, root: NodeId, name: &str, value: &str) -> Option<NodeId> {
		if self.tag(root).is_some() && self.property(root, name).map(ToString::to_string).as_deref() == Some(value) {
			return Some(root);
		}
		self.children(root).iter().find_map(|&child| self.find_by_property(child, name, value))
	}

	/// Serializes the children of `node` as markup. Listeners and empty properties are left out.
	#[must_use]
	pub fn inner_html(&self, node: NodeId) -> String {
		let mut html = String::new();
		for &child in self.children(node) {
			self.write_html(child, &mut html);
		}
		html
	}

	fn write_html(&self, node: NodeId, html: &mut String) {
		let data = &self.nodes[node.0];
		match &data.kind {
			Kind::Text => {
				if let Some(value) = self.property(node, NODE_VALUE) {
					html.push_str(&escape(&value.to_string()));
				}
			}
			Kind::Element(tag) => {
				html.push('<');
				html.push_str(tag);
				for (name, value) in &data.properties {
					let value = value.to_string();
					if !value.is_empty() {
						write!(html, " {}=\"{}\"", name, escape(&value)).ok();
					}
				}
				html.push('>');
				for &child in &data.children {
					self.write_html(child, html);
				}
				write!(html, "</{}>", tag).ok();
			}
		}
	}

	/// Calls every listener bound to `event` on `node` with `payload`. Returns how many were called.
	///
	/// Listeners are collected before any is called, so they may freely queue state updates.
	pub fn dispatch(&self, node: NodeId, event: &str, payload: &dyn Any) -> usize {
		let listeners: Vec<Listener> = self.nodes[node.0]
			.listeners
			.iter()
			.filter(|(name, _)| name == event)
			.map(|(_, listener)| listener.clone())
			.collect();
		for listener in &listeners {
			listener.call(payload);
		}
		listeners.len()
	}
}

fn escape(text: &str) -> String {
	text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

impl Host for MemoryHost {
	type Node = NodeId;

	fn create_node(&mut self, kind: NodeKind<'_>) -> NodeId {
		self.log.created += 1;
		self.push(match kind {
			NodeKind::Element(tag) => Kind::Element(tag.to_owned()),
			NodeKind::Text => Kind::Text,
		})
	}

	fn set_property(&mut self, node: &NodeId, name: &str, value: &Value) {
		self.log.properties_set += 1;
		self.store(*node, name, value.clone());
	}

	fn clear_property(&mut self, node: &NodeId, name: &str) {
		self.log.properties_cleared += 1;
		self.store(*node, name, Value::Str("".into()));
	}

	fn add_listener(&mut self, node: &NodeId, event: &str, listener: &Listener) {
		let listeners = &mut self.nodes[node.0].listeners;
		if listeners.iter().any(|(name, existing)| name == event && existing == listener) {
			return warn!("Listener {:?} is already bound to {:?}. Ignoring.", listener, event);
		}
		self.log.listeners_added += 1;
		listeners.push((event.to_owned(), listener.clone()));
	}

	fn remove_listener(&mut self, node: &NodeId, event: &str, listener: &Listener) {
		let listeners = &mut self.nodes[node.0].listeners;
		match listeners.iter().position(|(name, existing)| name == event && existing == listener) {
			Some(index) => {
				self.log.listeners_removed += 1;
				listeners.remove(index);
			}
			None => error!("Tried to remove listener {:?} from {:?} which isn't bound.", listener, event),
		}
	}

	fn insert_child(&mut self, parent: &NodeId, child: &NodeId) {
		if let Some(previous) = self.nodes[child.0].parent {
			self.remove_child(&previous, child);
		}
		self.log.inserted += 1;
		self.nodes[parent.0].children.push(*child);
		self.nodes[child.0].parent = Some(*parent);
	}

	fn remove_child(&mut self, parent: &NodeId, child: &NodeId) {
		let children = &mut self.nodes[parent.0].children;
		match children.iter().position(|existing| existing == child) {
			Some(index) => {
				self.log.removed += 1;
				children.remove(index);
				self.nodes[child.0].parent = None;
			}
			None => error!("Tried to remove {:?} from {:?}, which isn't its parent.", child, parent),
		}
	}
}
