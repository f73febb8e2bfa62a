//! Plain element descriptions, as handed to [`Renderer::render`](`crate::Renderer::render`) and returned by components.

use crate::{hooks::RenderContext, Result};
use core::{
	any::{type_name, Any, TypeId},
	fmt::{self, Debug, Display, Formatter},
};
use std::{borrow::Cow, rc::Rc};
use tracing::warn;

/// Attribute name under which text elements carry their content.
pub const NODE_VALUE: &str = "nodeValue";

/// Reserved attribute name. Children are always passed separately.
pub const CHILDREN: &str = "children";

/// What a fiber renders as.
///
/// Fibers without any type (the root and [empty](`Element::empty`) placeholders) use [`None`] instead.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementType {
	/// An element node in the host document, by tag name.
	Host(Cow<'static, str>),
	/// A text node. Its content is the [`NODE_VALUE`] attribute.
	Text,
	/// A function component, which renders to exactly one element and may use hooks.
	Component(Component),
}

impl From<&'static str> for ElementType {
	fn from(tag: &'static str) -> Self {
		Self::Host(Cow::Borrowed(tag))
	}
}

impl From<String> for ElementType {
	fn from(tag: String) -> Self {
		Self::Host(Cow::Owned(tag))
	}
}

impl From<Component> for ElementType {
	fn from(component: Component) -> Self {
		Self::Component(component)
	}
}

type RenderFn = dyn Fn(&mut RenderContext, &Props) -> Result<Element>;

/// A function component.
///
/// Two components are the same type iff their render functions have the same concrete Rust type,
/// so a function item or a closure expression keeps its identity (and with it its hook state)
/// across renders, even when a closure captures different values each time.
#[derive(Clone)]
pub struct Component {
	id: TypeId,
	name: &'static str,
	render: Rc<RenderFn>,
}

impl Component {
	pub fn new<F>(render: F) -> Self
	where
		F: Fn(&mut RenderContext, &Props) -> Result<Element> + 'static,
	{
		Self {
			id: TypeId::of::<F>(),
			name: type_name::<F>(),
			render: Rc::new(render),
		}
	}

	#[must_use]
	pub fn name(&self) -> &'static str {
		self.name
	}

	pub(crate) fn render(&self, cx: &mut RenderContext, props: &Props) -> Result<Element> {
		(self.render)(cx, props)
	}
}

impl PartialEq for Component {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Debug for Component {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Component").field(&self.name).finish()
	}
}

/// An event listener. Compared by identity.
///
/// The argument is the host's event object: a `web_sys::Event` for [`WebHost`](`crate::web::WebHost`),
/// or whatever payload is passed to [`MemoryHost::dispatch`](`crate::memory::MemoryHost::dispatch`).
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&dyn Any)>);

impl Listener {
	pub fn new(handler: impl Fn(&dyn Any) + 'static) -> Self {
		Self(Rc::new(handler))
	}

	pub fn call(&self, event: &dyn Any) {
		(self.0)(event)
	}

	/// Address of the shared handler, stable for as long as any clone is alive.
	#[must_use]
	pub fn key(&self) -> usize {
		Rc::as_ptr(&self.0).cast::<()>() as usize
	}
}

impl PartialEq for Listener {
	fn eq(&self, other: &Self) -> bool {
		self.key() == other.key()
	}
}

impl Debug for Listener {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "Listener({:#x})", self.key())
	}
}

/// An attribute or dependency value.
///
/// Scalars and strings compare by value, [`Listener`]s by identity.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(Rc<str>),
	Listener(Listener),
}

impl Value {
	#[must_use]
	pub fn as_listener(&self) -> Option<&Listener> {
		match self {
			Value::Listener(listener) => Some(listener),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Str(str) => Some(str),
			_ => None,
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Value::Bool(bool) => Display::fmt(bool, f),
			Value::Int(int) => Display::fmt(int, f),
			Value::Float(float) => Display::fmt(float, f),
			Value::Str(str) => Display::fmt(str, f),
			Value::Listener(listener) => Debug::fmt(listener, f),
		}
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Self::Int(value.into())
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::Str(value.into())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::Str(value.into())
	}
}

impl From<Listener> for Value {
	fn from(value: Listener) -> Self {
		Self::Listener(value)
	}
}

#[derive(Debug, Default, PartialEq)]
struct PropsInner {
	attributes: Vec<(Cow<'static, str>, Value)>,
	children: Vec<Element>,
}

/// An element's attributes, in insertion order, and its children.
///
/// Cloning is cheap; the contents are shared.
#[derive(Debug, Clone, Default)]
pub struct Props(Rc<PropsInner>);

impl Props {
	#[must_use]
	pub fn attributes(&self) -> &[(Cow<'static, str>, Value)] {
		&self.0.attributes
	}

	#[must_use]
	pub fn children(&self) -> &[Element] {
		&self.0.children
	}

	#[must_use]
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.0.attributes.iter().find(|(key, _)| key == name).map(|(_, value)| value)
	}

	/// Whether both attribute lists are equal by content (ignoring children).
	#[must_use]
	pub fn same_attributes(&self, other: &Props) -> bool {
		Rc::ptr_eq(&self.0, &other.0) || self.0.attributes == other.0.attributes
	}

	pub(crate) fn with_children(children: Vec<Element>) -> Self {
		Self(Rc::new(PropsInner { attributes: Vec::new(), children }))
	}
}

impl PartialEq for Props {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0) || self.0 == other.0
	}
}

/// A node of the element tree description.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
	element_type: Option<ElementType>,
	props: Props,
}

impl Element {
	/// A placeholder without any host representation, for example the `false` branch of a conditional child.
	#[must_use]
	pub fn empty() -> Self {
		Self { element_type: None, props: Props::default() }
	}

	#[must_use]
	pub fn element_type(&self) -> Option<&ElementType> {
		self.element_type.as_ref()
	}

	#[must_use]
	pub fn props(&self) -> &Props {
		&self.props
	}
}

/// Anything that can appear in a children list.
#[derive(Debug, Clone)]
pub enum Child {
	Element(Element),
	Text(String),
	Empty,
}

impl From<Element> for Child {
	fn from(element: Element) -> Self {
		Self::Element(element)
	}
}

impl From<Option<Element>> for Child {
	fn from(element: Option<Element>) -> Self {
		element.map_or(Self::Empty, Self::Element)
	}
}

impl From<&str> for Child {
	fn from(text: &str) -> Self {
		Self::Text(text.to_owned())
	}
}

impl From<String> for Child {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl From<i32> for Child {
	fn from(number: i32) -> Self {
		Self::Text(number.to_string())
	}
}

impl From<i64> for Child {
	fn from(number: i64) -> Self {
		Self::Text(number.to_string())
	}
}

impl From<usize> for Child {
	fn from(number: usize) -> Self {
		Self::Text(number.to_string())
	}
}

/// Builds an element. Text children are wrapped into [text elements](`text`).
///
/// ```
/// use fiber_dom::{build_element, ElementType};
///
/// let element = build_element("p", [("id", "greeting".into())], vec!["Hello ".into(), 42.into()]);
/// assert_eq!(element.element_type(), Some(&ElementType::from("p")));
/// assert_eq!(element.props().children().len(), 2);
/// ```
pub fn build_element<'a>(
	element_type: impl Into<ElementType>,
	attributes: impl IntoIterator<Item = (&'a str, Value)>,
	children: impl IntoIterator<Item = Child>,
) -> Element {
	let attributes = attributes
		.into_iter()
		.filter(|(name, _)| {
			if *name == CHILDREN {
				warn!("Ignoring `children` attribute. Pass children separately instead.");
				false
			} else {
				true
			}
		})
		.map(|(name, value)| (Cow::Owned(name.to_owned()), value))
		.collect();

	let children = children
		.into_iter()
		.map(|child| match child {
			Child::Element(element) => element,
			Child::Text(value) => text(value),
			Child::Empty => Element::empty(),
		})
		.collect();

	Element {
		element_type: Some(element_type.into()),
		props: Props(Rc::new(PropsInner { attributes, children })),
	}
}

/// Builds a text element.
pub fn text(value: impl Into<String>) -> Element {
	let value: String = value.into();
	Element {
		element_type: Some(ElementType::Text),
		props: Props(Rc::new(PropsInner {
			attributes: vec![(Cow::Borrowed(NODE_VALUE), Value::Str(value.into()))],
			children: Vec::new(),
		})),
	}
}
