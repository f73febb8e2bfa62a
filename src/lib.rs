#![doc(html_root_url = "https://docs.rs/fiber-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

mod commit;
pub mod element;
mod error;
mod fiber;
mod hooks;
pub mod host;
pub mod load;
pub mod memory;
mod rc_hash_map;
mod reconcile;
mod scheduler;
pub mod web;

pub use commit::CommitReport;
pub use element::{build_element, text, Child, Component, Element, ElementType, Listener, Props, Value};
pub use error::{Error, Result};
pub use fiber::{EffectTag, FiberId};
pub use hooks::{Cleanup, RenderContext, SetState};
pub use scheduler::{Deadline, Phase, Renderer, SliceOutcome, Unbounded, WorkLoopOptions};
