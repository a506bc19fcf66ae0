//! Scroll-position continuity.
//!
//! When enabled, the router owns scroll restoration: the host's automatic
//! behavior is switched off and every history-navigation signal is answered
//! from the arrived-at entry's metadata. An entry carrying scroll offsets is a
//! backward navigation and is restored to them; an entry without metadata is a
//! forward navigation and lands at the top.

use std::sync::Arc;

use crate::host::{ListenerId, NavigationHost};

/// Restores scroll offsets from history-entry metadata.
pub struct ScrollCoordinator {
	host: Arc<dyn NavigationHost>,
	listener: Option<ListenerId>,
}

impl ScrollCoordinator {
	/// Switches the host to manual restoration and starts listening.
	pub fn enable(host: Arc<dyn NavigationHost>) -> Self {
		host.set_manual_scroll_restoration(true);

		let listener_host = Arc::clone(&host);
		let listener = host.add_pop_listener(Arc::new(move |state| {
			match state.as_ref().and_then(|s| s.scroll()) {
				Some((x, y)) => {
					tracing::debug!(x, y, "restoring scroll position");
					listener_host.scroll_to(x, y);
				}
				None => listener_host.scroll_to(0.0, 0.0),
			}
		}));

		Self {
			host,
			listener: Some(listener),
		}
	}
}

impl Drop for ScrollCoordinator {
	fn drop(&mut self) {
		if let Some(listener) = self.listener.take() {
			self.host.remove_pop_listener(listener);
		}
		self.host.set_manual_scroll_restoration(false);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::host::{HistoryState, MemoryHost};

	#[test]
	fn test_restores_stored_offsets_on_back() {
		let host = Arc::new(MemoryHost::new());
		let _coordinator = ScrollCoordinator::enable(Arc::clone(&host) as Arc<dyn NavigationHost>);
		assert!(host.manual_scroll_restoration());

		host.replace_state(HistoryState::default().with_scroll(0.0, 400.0), None)
			.unwrap();
		host.set_hash("#/next");
		host.scroll_to(0.0, 900.0);

		host.go_back();
		assert_eq!(host.scroll_position(), (0.0, 400.0));
	}

	#[test]
	fn test_scrolls_to_top_without_metadata() {
		let host = Arc::new(MemoryHost::new());
		let _coordinator = ScrollCoordinator::enable(Arc::clone(&host) as Arc<dyn NavigationHost>);

		host.scroll_to(0.0, 250.0);
		// A fresh hash navigation carries no scroll metadata.
		host.set_hash("#/fresh");
		assert_eq!(host.scroll_position(), (0.0, 0.0));
	}

	#[test]
	fn test_teardown_restores_automatic_behavior() {
		let host = Arc::new(MemoryHost::new());
		{
			let _coordinator =
				ScrollCoordinator::enable(Arc::clone(&host) as Arc<dyn NavigationHost>);
			assert!(host.manual_scroll_restoration());
		}
		assert!(!host.manual_scroll_restoration());

		host.scroll_to(0.0, 250.0);
		host.set_hash("#/after");
		// Listener removed: no forced scroll to top.
		assert_eq!(host.scroll_position(), (0.0, 250.0));
	}
}
