use fiber_dom::{build_element, text, Cleanup, Component, Element, Error, Phase, SetState, Value};
use std::{cell::RefCell, rc::Rc};

use native_::renderer;

type Log = Rc<RefCell<Vec<String>>>;

#[test]
fn state_updates_apply_in_order() {
	let (mut renderer, container) = renderer();

	let setter: Rc<RefCell<Option<SetState<i64>>>> = Rc::default();
	let seen = Rc::new(RefCell::new(Vec::new()));
	let component = {
		let setter = Rc::clone(&setter);
		let seen = Rc::clone(&seen);
		Component::new(move |cx, _| {
			let (value, set_value) = cx.use_state(1_i64)?;
			*setter.borrow_mut() = Some(set_value);
			seen.borrow_mut().push(value);
			Ok(text(value.to_string()))
		})
	};

	renderer.render(build_element(component, [], vec![]), container);
	renderer.flush().unwrap();
	assert_eq!(renderer.host().text_content(container), "1");

	{
		let setter = setter.borrow();
		let set_value = setter.as_ref().unwrap();
		set_value.update(|value| value * 2);
		set_value.update(|value| value + 3);
		set_value.update(|value| value * 10);
	}
	renderer.flush().unwrap();

	assert_eq!(renderer.host().text_content(container), "50");
	assert_eq!(*seen.borrow(), [1, 50]);

	setter.borrow().as_ref().unwrap().set(7);
	renderer.flush().unwrap();
	assert_eq!(renderer.host().text_content(container), "7");
}

#[test]
fn state_is_per_fiber() {
	let (mut renderer, container) = renderer();

	let setters: Rc<RefCell<Vec<SetState<String>>>> = Rc::default();
	let item = {
		let setters = Rc::clone(&setters);
		Component::new(move |cx, props| {
			let initial = props.get("label").map(ToString::to_string).unwrap_or_default();
			let (label, set_label) = cx.use_state(initial)?;
			setters.borrow_mut().push(set_label);
			Ok(build_element("li", [], vec![label.into()]))
		})
	};

	renderer.render(
		build_element("ul", [], vec![build_element(item.clone(), [("label", "a".into())], vec![]).into(), build_element(item, [("label", "b".into())], vec![]).into()]),
		container,
	);
	renderer.flush().unwrap();

	setters.borrow()[1].set("B".to_owned());
	renderer.flush().unwrap();

	assert_eq!(renderer.host().inner_html(container), "<ul><li>a</li><li>B</li></ul>");
}

fn logging_effects(log: &Log) -> Component {
	let log = Rc::clone(log);
	Component::new(move |cx, props| {
		let dep = props.get("dep").cloned().unwrap_or(Value::Int(0));
		let effect = |name: &'static str| {
			let log = Rc::clone(&log);
			move || {
				log.borrow_mut().push(format!("run {}", name));
				let log = Rc::clone(&log);
				Some(Box::new(move || log.borrow_mut().push(format!("clean up {}", name))) as Cleanup)
			}
		};

		cx.use_effect(effect("always"), None)?;
		cx.use_effect(effect("once"), Some(vec![]))?;
		cx.use_effect(effect("on dep"), Some(vec![dep]))?;
		Ok(build_element("p", [], vec![]))
	})
}

#[test]
fn effects() {
	let (mut renderer, container) = renderer();
	let log = Log::default();
	let component = logging_effects(&log);
	let mut render = |element: Element| {
		renderer.render(element, container);
		renderer.flush().unwrap();
		log.borrow_mut().drain(..).collect::<Vec<_>>()
	};

	assert_eq!(render(build_element(component.clone(), [("dep", 1.into())], vec![])), ["run always", "run once", "run on dep"]);
	assert_eq!(render(build_element(component.clone(), [("dep", 1.into())], vec![])), ["clean up always", "run always"]);
	assert_eq!(
		render(build_element(component, [("dep", 2.into())], vec![])),
		["clean up always", "run always", "clean up on dep", "run on dep"]
	);
	assert_eq!(render(build_element("p", [], vec![])), ["clean up always", "clean up once", "clean up on dep"]);
}

#[test]
fn deletion_cleans_up_descendants() {
	let (mut renderer, container) = renderer();
	let log = Log::default();
	let inner = logging_effects(&log);

	renderer.render(build_element("section", [], vec![build_element("div", [], vec![build_element(inner, [], vec![]).into()]).into()]), container);
	renderer.flush().unwrap();
	log.borrow_mut().clear();

	renderer.render(build_element("section", [], vec![]), container);
	let report = renderer.flush().unwrap().unwrap();

	assert_eq!(report.deletions, 1);
	assert_eq!(*log.borrow(), ["clean up always", "clean up once", "clean up on dep"]);
	assert_eq!(renderer.host().inner_html(container), "<section></section>");
}

#[test]
fn outside_of_render() {
	let (mut renderer, _) = renderer();

	assert_eq!(renderer.use_state(0).unwrap_err(), Error::InvalidHookContext);
	assert_eq!(renderer.use_effect(|| None, None).unwrap_err(), Error::InvalidHookContext);
}

#[test]
fn hook_mismatch() {
	let (mut renderer, container) = renderer();

	let conditional = Component::new(|cx, props| {
		if props.get("stateful") == Some(&Value::Bool(true)) {
			cx.use_state(0)?;
		} else {
			cx.use_effect(|| None, None)?;
		}
		Ok(text("conditional"))
	});

	renderer.render(build_element(conditional.clone(), [("stateful", true.into())], vec![]), container);
	renderer.flush().unwrap();
	let before = renderer.host().mutations();
	let html = renderer.host().inner_html(container);

	renderer.render(build_element(conditional, [("stateful", false.into())], vec![]), container);
	let error = renderer.flush().unwrap_err();

	assert_eq!(
		error,
		Error::HookMismatch {
			index: 0,
			expected: "effect",
			found: "state",
		}
	);
	assert_eq!(renderer.phase(), Phase::Idle);
	assert_eq!(renderer.host().mutations(), before);
	assert_eq!(renderer.host().inner_html(container), html);
}

#[test]
fn state_type_mismatch() {
	let (mut renderer, container) = renderer();

	let conditional = Component::new(|cx, props| {
		if props.get("number") == Some(&Value::Bool(true)) {
			cx.use_state(0_i32)?;
		} else {
			cx.use_state(String::new())?;
		}
		Ok(Element::empty())
	});

	renderer.render(build_element(conditional.clone(), [("number", true.into())], vec![]), container);
	renderer.flush().unwrap();

	renderer.render(build_element(conditional, [("number", false.into())], vec![]), container);
	assert!(matches!(renderer.flush(), Err(Error::HookMismatch { index: 0, expected: "state", .. })));
}

fn counting_effect(log: &Log, setter: &Rc<RefCell<Option<SetState<i64>>>>) -> Component {
	let log = Rc::clone(log);
	let setter = Rc::clone(setter);
	Component::new(move |cx, props| {
		let (count, set_count) = cx.use_state(0_i64)?;
		*setter.borrow_mut() = Some(set_count);
		if props.get("fail") == Some(&Value::Bool(true)) && count > 0 {
			cx.use_state(())?;
		}

		let log = Rc::clone(&log);
		cx.use_effect(
			move || {
				log.borrow_mut().push(format!("run {}", count));
				Some(Box::new(move || log.borrow_mut().push(format!("clean {}", count))) as Cleanup)
			},
			None,
		)?;
		Ok(text(count.to_string()))
	})
}

#[test]
fn discarded_pass_runs_no_effects() {
	let (mut renderer, container) = renderer();
	let log = Log::default();
	let setter = Rc::default();
	let component = counting_effect(&log, &setter);
	let increment = || setter.borrow().as_ref().unwrap().update(|count| count + 1);

	renderer.render(build_element("main", [], vec![build_element(component, [], vec![]).into()]), container);
	renderer.flush().unwrap();
	assert_eq!(*log.borrow(), ["run 0"]);

	increment();
	// root, main, component
	for _ in 0..3 {
		assert_eq!(renderer.work_loop(&|| 0.0).unwrap().committed, None);
	}
	assert_eq!(*log.borrow(), ["run 0"]);

	// Queued through the setter of the pass that is about to be discarded.
	increment();
	let report = renderer.flush().unwrap().unwrap();
	assert_eq!(report.effects, 1);
	assert_eq!(*log.borrow(), ["run 0", "clean 0", "run 2"]);
	assert_eq!(renderer.host().text_content(container), "2");

	renderer.render(build_element("main", [], vec![]), container);
	renderer.flush().unwrap();
	assert_eq!(*log.borrow(), ["run 0", "clean 0", "run 2", "clean 2"]);
}

#[test]
fn failed_pass_runs_no_effects() {
	let (mut renderer, container) = renderer();
	let log = Log::default();
	let setter = Rc::default();
	let component = counting_effect(&log, &setter);

	renderer.render(build_element(component.clone(), [("fail", true.into())], vec![]), container);
	renderer.flush().unwrap();

	setter.borrow().as_ref().unwrap().update(|count| count + 1);
	assert!(matches!(renderer.flush(), Err(Error::HookMismatch { index: 1, .. })));
	assert_eq!(*log.borrow(), ["run 0"]);
	assert_eq!(renderer.host().text_content(container), "0");

	renderer.render(build_element(component, [], vec![]), container);
	renderer.flush().unwrap();
	assert_eq!(*log.borrow(), ["run 0", "clean 0", "run 1"]);
	assert_eq!(renderer.host().text_content(container), "1");
}
