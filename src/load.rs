//! Reads existing browser DOM content back into [`Element`]s.
//!
//! Tag names are lowercased and attribute values are loaded as [`Value::Str`]. Comments and other node kinds that have
//! no element counterpart are skipped.

use crate::element::{build_element, text, Child, Element, Value};
use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{Attr, NamedNodeMap, Node, NodeList, Text};

pub fn load_child_nodes(child_nodes: &NodeList) -> Vec<Element> {
	(0..child_nodes.length())
		.filter_map(|i| child_nodes.item(i))
		.filter_map(|child| load_node(&child))
		.collect()
}

fn load_node(node: &Node) -> Option<Element> {
	if let Some(element) = node.dyn_ref::<web_sys::Element>() {
		Some(load_element(element))
	} else if let Some(text_node) = node.dyn_ref::<Text>() {
		Some(text(text_node.data()))
	} else {
		warn!("Skipping unrecognised child node: {:?}", node.node_name());
		None
	}
}

pub fn load_element(element: &web_sys::Element) -> Element {
	let node: &Node = element.as_ref();
	let attributes = load_attributes(&element.attributes());
	build_element(
		element.tag_name().to_ascii_lowercase(),
		attributes.iter().map(|(name, value)| (name.as_str(), value.clone())),
		load_child_nodes(&node.child_nodes()).into_iter().map(Child::Element),
	)
}

pub fn load_attributes(attributes: &NamedNodeMap) -> Vec<(String, Value)> {
	(0..attributes.length()).filter_map(|i| attributes.item(i)).map(|attribute| load_attribute(&attribute)).collect()
}

pub fn load_attribute(attribute: &Attr) -> (String, Value) {
	(attribute.local_name(), attribute.value().into())
}
