//! Error types for hash routing.
//!
//! All variants are surfaced synchronously to the caller, at table build time or
//! at call time. A route condition rejecting a navigation is not an error; that
//! outcome is reported through the `conditionsFailed` lifecycle notification.

use thiserror::Error;

/// Error type for router operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
	/// Malformed route pattern at table build time.
	///
	/// String patterns must be non-empty and begin with `/` or `*`.
	#[error("invalid route pattern '{pattern}': {reason}")]
	InvalidPath {
		/// The offending pattern string.
		pattern: String,
		/// Why compilation was rejected.
		reason: String,
	},

	/// Route target is not a usable view descriptor.
	#[error("invalid route target for pattern '{pattern}': {reason}")]
	InvalidTarget {
		/// Pattern the target was registered under.
		pattern: String,
		/// Why the target was rejected.
		reason: String,
	},

	/// `push`/`replace` argument malformed.
	///
	/// Locations must be non-empty and start with `/` or `#/`.
	#[error("invalid location '{0}': must start with '/' or '#/'")]
	InvalidLocation(String),

	/// Link attachment given a malformed destination.
	#[error("invalid href '{0}': must start with '/' or '#/'")]
	InvalidHref(String),

	/// Link behavior attached to a non-anchor element.
	#[error("link action attached to non-anchor element '{0}'")]
	ActionMisuse(String),
}

impl RouterError {
	pub(crate) fn invalid_path(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::InvalidPath {
			pattern: pattern.into(),
			reason: reason.into(),
		}
	}

	pub(crate) fn invalid_target(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::InvalidTarget {
			pattern: pattern.into(),
			reason: reason.into(),
		}
	}
}

/// Error type for host history operations.
///
/// History failures are not fatal to navigation: the router downgrades them to a
/// warning and proceeds via the hash mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
	/// The host rejected a history state update (e.g. a sandboxed document).
	#[error("history state update rejected: {0}")]
	StateRejected(String),
}
