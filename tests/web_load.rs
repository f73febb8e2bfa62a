#![cfg(target_arch = "wasm32")]

use fiber_dom::{build_element, load::load_element};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

mod web_;

#[wasm_bindgen_test]
fn load() {
	let container = web_::container("web-load");
	container.set_inner_html(r#"<P title="loaded">Some <b>bold</b><!-- skipped --> text</P>"#);

	assert_eq!(
		load_element(&container),
		build_element(
			"div",
			[("id", "web-load".into())],
			vec![build_element(
				"p",
				[("title", "loaded".into())],
				vec!["Some ".into(), build_element("b", [], vec!["bold".into()]).into(), " text".into()]
			)
			.into()]
		)
	);
}
