#![cfg(target_arch = "wasm32")]

use fiber_dom::{build_element, web::WebHost, Child, Renderer};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

mod web_;

#[wasm_bindgen_test]
fn nested() {
	let container = web_::container("web-create-nested");
	let mut renderer = Renderer::new(WebHost::new(web_::document()));

	renderer.render(
		build_element(
			"p",
			[("id", "greeting".into()), ("className", "loud".into())],
			vec!["Hello ".into(), build_element("b", [], vec!["fiber-dom".into()]).into(), "!".into()],
		),
		container.clone().into(),
	);
	let report = renderer.flush().unwrap().unwrap();

	assert_eq!(report.placements, 5);
	assert_eq!(container.inner_html(), r#"<p id="greeting" class="loud">Hello <b>fiber-dom</b>!</p>"#);
}

#[wasm_bindgen_test]
fn create_diff_remove() {
	let container = web_::container("web-create-diff-remove");
	let mut renderer = Renderer::new(WebHost::new(web_::document()));
	let list = |items: &[&str]| build_element("ul", [], items.iter().map(|&item| Child::from(build_element("li", [], vec![item.into()]))));

	renderer.render(list(&["a", "b", "c"]), container.clone().into());
	renderer.flush().unwrap();
	assert_eq!(container.inner_html(), "<ul><li>a</li><li>b</li><li>c</li></ul>");

	renderer.render(list(&["a", "b", "c"]), container.clone().into());
	let report = renderer.flush().unwrap().unwrap();
	assert_eq!((report.placements, report.updates, report.deletions), (0, 0, 0));

	renderer.render(list(&["a", "c"]), container.clone().into());
	renderer.flush().unwrap();
	assert_eq!(container.inner_html(), "<ul><li>a</li><li>c</li></ul>");

	renderer.render(build_element("ul", [], vec![]), container.clone().into());
	renderer.flush().unwrap();
	assert_eq!(container.inner_html(), "<ul></ul>");
}
