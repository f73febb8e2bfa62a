#![allow(dead_code)]
#![cfg(target_arch = "wasm32")]

use web_sys::{window, Document};

static mut LOG_INITIALIZED: bool = false;

pub fn init_log() {
	unsafe {
		if !LOG_INITIALIZED {
			tracing_wasm::set_as_global_default();
			LOG_INITIALIZED = true;
		}
	}
}

pub fn document() -> Document {
	window().unwrap().document().unwrap()
}

/// A fresh `<div>` appended to the body, to render into.
pub fn container(id: &str) -> web_sys::Element {
	init_log();
	let document = document();
	let container = document.create_element("div").unwrap();
	container.set_id(id);
	document.body().unwrap().append_child(&container).unwrap();
	container
}
