use fiber_dom::{build_element, Child, CommitReport, Component, Element, Listener, Value};
use std::{cell::Cell, rc::Rc};

use native_::renderer;

fn spans(texts: &[&str]) -> Element {
	build_element("div", [], texts.iter().map(|&text| Child::from(build_element("span", [], vec![text.into()]))))
}

#[test]
fn identical() {
	let (mut renderer, container) = renderer();
	let element = spans(&["a", "b"]);

	renderer.render(element.clone(), container);
	renderer.flush().unwrap();
	let writes = renderer.host().mutations().writes();

	renderer.render(element, container);
	let report = renderer.flush().unwrap().unwrap();

	assert_eq!(
		report,
		CommitReport {
			placements: 0,
			updates: 0,
			unchanged: 5,
			deletions: 0,
			effects: 0,
		}
	);
	assert_eq!(renderer.host().mutations().writes(), writes);
}

#[test]
fn equal_but_rebuilt() {
	let (mut renderer, container) = renderer();

	renderer.render(spans(&["a", "b"]), container);
	renderer.flush().unwrap();
	let before = renderer.host().mutations();

	renderer.render(spans(&["a", "b"]), container);
	let report = renderer.flush().unwrap().unwrap();

	assert_eq!(report.updates, 0);
	assert_eq!(report.unchanged, 5);
	assert_eq!(renderer.host().mutations(), before);
}

#[test]
fn remove_last() {
	let (mut renderer, container) = renderer();

	renderer.render(spans(&["a", "b"]), container);
	renderer.flush().unwrap();
	let created = renderer.host().mutations().created;

	renderer.render(spans(&["b"]), container);
	let report = renderer.flush().unwrap().unwrap();

	assert_eq!(report.deletions, 1);
	assert_eq!(report.placements, 0);
	assert_eq!(report.updates, 1);
	assert_eq!(renderer.host().text_content(container), "b");
	assert_eq!(renderer.host().inner_html(container), "<div><span>b</span></div>");
	assert_eq!(renderer.host().mutations().created, created);
}

#[test]
fn remove_middle() {
	let (mut renderer, container) = renderer();

	renderer.render(spans(&["a", "b", "c"]), container);
	renderer.flush().unwrap();

	renderer.render(spans(&["a", "c"]), container);
	let report = renderer.flush().unwrap().unwrap();

	assert_eq!(report.deletions, 1);
	assert_eq!(report.placements, 0);
	assert_eq!(renderer.host().inner_html(container), "<div><span>a</span><span>c</span></div>");
}

#[test]
fn append() {
	let (mut renderer, container) = renderer();

	renderer.render(spans(&["a"]), container);
	renderer.flush().unwrap();

	renderer.render(spans(&["a", "b"]), container);
	let report = renderer.flush().unwrap().unwrap();

	assert_eq!(report.placements, 2);
	assert_eq!(report.deletions, 0);
	assert_eq!(renderer.host().inner_html(container), "<div><span>a</span><span>b</span></div>");
}

#[test]
fn type_change() {
	let (mut renderer, container) = renderer();

	renderer.render(build_element("div", [], vec![build_element("span", [], vec![]).into()]), container);
	renderer.flush().unwrap();

	renderer.render(build_element("div", [], vec![build_element("p", [], vec![]).into()]), container);
	let report = renderer.flush().unwrap().unwrap();

	assert_eq!(report.placements, 1);
	assert_eq!(report.deletions, 1);
	assert_eq!(renderer.host().inner_html(container), "<div><p></p></div>");
}

#[test]
fn text_to_element() {
	let (mut renderer, container) = renderer();

	renderer.render(build_element("div", [], vec!["plain".into()]), container);
	renderer.flush().unwrap();

	renderer.render(build_element("div", [], vec![build_element("b", [], vec!["bold".into()]).into()]), container);
	let report = renderer.flush().unwrap().unwrap();

	assert_eq!(report.deletions, 1);
	assert_eq!(renderer.host().inner_html(container), "<div><b>bold</b></div>");
}

#[test]
fn attributes() {
	let (mut renderer, container) = renderer();

	renderer.render(build_element("div", [("id", "x".into()), ("title", "gone soon".into())], vec![]), container);
	renderer.flush().unwrap();
	let div = renderer.host().children(container)[0];

	renderer.render(build_element("div", [("id", "y".into()), ("hidden", true.into())], vec![]), container);
	let report = renderer.flush().unwrap().unwrap();

	assert_eq!(report.updates, 1);
	assert_eq!(renderer.host().children(container), [div]);
	assert_eq!(renderer.host().property(div, "id"), Some(&Value::from("y")));
	assert_eq!(renderer.host().property(div, "title"), Some(&Value::from("")));
	assert_eq!(renderer.host().property(div, "hidden"), Some(&Value::Bool(true)));
	assert_eq!(renderer.host().inner_html(container), r#"<div id="y" hidden="true"></div>"#);
}

#[test]
fn listener_churn() {
	let (mut renderer, container) = renderer();

	let first = Rc::new(Cell::new(0));
	let second = Rc::new(Cell::new(0));
	let counting = |count: &Rc<Cell<i32>>| {
		let count = Rc::clone(count);
		Listener::new(move |_| count.set(count.get() + 1))
	};

	renderer.render(build_element("button", [("onClick", counting(&first).into())], vec![]), container);
	renderer.flush().unwrap();
	let button = renderer.host().children(container)[0];

	renderer.render(build_element("button", [("onClick", counting(&second).into())], vec![]), container);
	renderer.flush().unwrap();

	assert_eq!(renderer.host().listener_count(button, "click"), 1);
	renderer.host().dispatch(button, "click", &());
	assert_eq!((first.get(), second.get()), (0, 1));

	renderer.render(build_element("button", [], vec![]), container);
	renderer.flush().unwrap();

	assert_eq!(renderer.host().listener_count(button, "click"), 0);
	assert_eq!(renderer.host().mutations().listeners_removed, 2);
}

#[test]
fn deletion_releases_listeners() {
	let (mut renderer, container) = renderer();
	let on_click = Listener::new(|_| ());
	let on_focus = Listener::new(|_| ());

	renderer.render(
		build_element(
			"div",
			[],
			vec![build_element(
				"form",
				[("onSubmit", on_click.clone().into())],
				vec![build_element("button", [("onClick", on_click.into()), ("onFocus", on_focus.into())], vec![]).into()],
			)
			.into()],
		),
		container,
	);
	renderer.flush().unwrap();
	assert_eq!(renderer.host().mutations().listeners_added, 3);

	renderer.render(build_element("div", [], vec![]), container);
	let report = renderer.flush().unwrap().unwrap();

	assert_eq!(report.deletions, 1);
	assert_eq!(renderer.host().mutations().listeners_removed, 3);
	assert_eq!(renderer.host().mutations().removed, 1);
}

#[test]
fn discarded_work_releases_listeners() {
	let (mut renderer, container) = renderer();

	// root, div, button, "tail"
	renderer.render(
		build_element("div", [], vec![build_element("button", [("onClick", Listener::new(|_| ()).into())], vec![]).into(), "tail".into()]),
		container,
	);
	for _ in 0..3 {
		renderer.work_loop(&|| 0.0).unwrap();
	}
	assert_eq!(renderer.host().mutations().listeners_added, 1);
	assert!(renderer.host().children(container).is_empty());

	renderer.render(build_element("p", [], vec![]), container);
	renderer.flush().unwrap();

	assert_eq!(renderer.host().mutations().listeners_removed, 1);
	assert_eq!(renderer.host().inner_html(container), "<p></p>");
}

#[test]
fn component_replaced_by_other_component() {
	let (mut renderer, container) = renderer();

	let inner = Component::new(|_, _| Ok(build_element("p", [], vec!["inner".into()])));
	let outer = Component::new(move |_, _| Ok(build_element(inner.clone(), [], vec![])));
	let other = Component::new(|_, _| Ok(build_element("span", [], vec!["other".into()])));

	renderer.render(build_element("div", [], vec![build_element(outer, [], vec![]).into()]), container);
	renderer.flush().unwrap();
	assert_eq!(renderer.host().inner_html(container), "<div><p>inner</p></div>");

	renderer.render(build_element("div", [], vec![build_element(other, [], vec![]).into()]), container);
	let report = renderer.flush().unwrap().unwrap();

	assert_eq!(report.deletions, 1);
	assert_eq!(report.placements, 2);
	assert_eq!(renderer.host().mutations().removed, 1);
	assert_eq!(renderer.host().inner_html(container), "<div><span>other</span></div>");
}

#[test]
fn returning_conditional_child_is_appended() {
	let (mut renderer, container) = renderer();
	let item = |text: &str| Child::from(build_element("li", [], vec![text.into()]));
	let list = |middle: bool| build_element("ul", [], vec![item("a"), if middle { item("b") } else { Child::Empty }, item("c")]);

	renderer.render(list(true), container);
	renderer.flush().unwrap();
	assert_eq!(renderer.host().text_content(container), "abc");

	renderer.render(list(false), container);
	let report = renderer.flush().unwrap().unwrap();
	assert_eq!((report.placements, report.deletions), (0, 1));
	assert_eq!(renderer.host().text_content(container), "ac");

	renderer.render(list(true), container);
	let report = renderer.flush().unwrap().unwrap();
	assert_eq!((report.placements, report.deletions), (2, 1));
	assert_eq!(renderer.host().inner_html(container), "<ul><li>a</li><li>c</li><li>b</li></ul>");
}
