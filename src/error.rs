/// Failures surfaced by a render pass.
///
/// Host-level failures (for example a rejected DOM call) are not part of this taxonomy:
/// [`Host`](`crate::host::Host`) implementations log those and carry on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	/// A hook was called while no function component was rendering.
	#[error("hook called outside of a function component render")]
	InvalidHookContext,

	/// The hook record stored at `index` by the previous render has a different kind or value type.
	///
	/// Hooks are identified by call order only, so this means the component called its hooks conditionally.
	#[error("hook #{index} changed between renders: expected {expected}, found {found}")]
	HookMismatch {
		/// Zero-based position of the hook call within the component.
		index: usize,
		/// What this render asked for.
		expected: &'static str,
		/// What the previous render recorded.
		found: &'static str,
	},
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
