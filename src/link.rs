//! Link action.
//!
//! A reusable behavior for anchor-like elements: it rewrites the element's
//! href to the hash form and intercepts primary clicks, performing the same
//! scroll-capture + hash-set sequence as `push` instead of a page navigation.
//! Attachment is a scoped resource: one click handler per attachment, detached
//! exactly once, on [`Link::detach`] or on drop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::RouterError;
use crate::host::NavigationHost;
use crate::router::capture_scroll_then_set_hash;

/// Click callback installed on a [`LinkElement`].
pub type ClickHandler = Arc<dyn Fn() + Send + Sync>;

/// Capability of an anchor-like element the link action can bind to.
///
/// Implementations decide what a "primary click" is (e.g. left button without
/// modifier keys) and invoke the installed handler for those only.
pub trait LinkElement: Send + Sync {
	/// The element's tag name; only anchors (`a`) accept the action.
	fn tag_name(&self) -> String;
	/// The element's current href, if any.
	fn href(&self) -> Option<String>;
	/// Rewrites the element's href.
	fn set_href(&self, href: &str);
	/// Installs or clears the primary-click handler.
	fn set_click_handler(&self, handler: Option<ClickHandler>);
}

/// Options for a link attachment.
#[derive(Debug, Clone, Default)]
pub struct LinkOptions {
	/// Destination; falls back to the element's existing href when absent.
	pub href: Option<String>,
	/// A disabled binding leaves clicks alone.
	pub disabled: bool,
}

impl LinkOptions {
	/// Options pointing at `href`.
	pub fn href(href: impl Into<String>) -> Self {
		Self {
			href: Some(href.into()),
			disabled: false,
		}
	}
}

struct LinkShared {
	element: Arc<dyn LinkElement>,
	host: Arc<dyn NavigationHost>,
	/// Normalized destination hash and the disabled flag, updatable live.
	state: Mutex<(String, bool)>,
	detached: AtomicBool,
}

/// A live link attachment.
pub struct Link {
	shared: Arc<LinkShared>,
}

impl Link {
	/// Attaches the link behavior to an anchor element.
	///
	/// # Errors
	///
	/// Returns [`RouterError::ActionMisuse`] for a non-anchor element and
	/// [`RouterError::InvalidHref`] when the destination neither starts with
	/// `#/` nor with `/`.
	pub fn attach(
		host: Arc<dyn NavigationHost>,
		element: Arc<dyn LinkElement>,
		options: LinkOptions,
	) -> Result<Self, RouterError> {
		let tag = element.tag_name();
		if !tag.eq_ignore_ascii_case("a") {
			return Err(RouterError::ActionMisuse(tag));
		}

		let hash = normalize_href(options.href.or_else(|| element.href()))?;
		element.set_href(&hash);

		let shared = Arc::new(LinkShared {
			element: Arc::clone(&element),
			host,
			state: Mutex::new((hash, options.disabled)),
			detached: AtomicBool::new(false),
		});

		let handler_shared = Arc::clone(&shared);
		element.set_click_handler(Some(Arc::new(move || {
			let (hash, disabled) = handler_shared.state.lock().clone();
			if disabled {
				return;
			}
			capture_scroll_then_set_hash(&handler_shared.host, &hash);
		})));

		Ok(Self { shared })
	}

	/// Applies new options to a live attachment.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidHref`] for a malformed destination; the
	/// previous destination stays in effect in that case.
	pub fn update_options(&self, options: LinkOptions) -> Result<(), RouterError> {
		let mut state = self.shared.state.lock();
		if let Some(href) = options.href {
			let hash = normalize_href(Some(href))?;
			self.shared.element.set_href(&hash);
			state.0 = hash;
		}
		state.1 = options.disabled;
		Ok(())
	}

	/// Removes the click handler. Idempotent; also runs on drop.
	pub fn detach(&self) {
		if self.shared.detached.swap(true, Ordering::SeqCst) {
			return;
		}
		self.shared.element.set_click_handler(None);
	}
}

impl Drop for Link {
	fn drop(&mut self) {
		self.detach();
	}
}

/// Normalizes a link destination to the hash-path form.
fn normalize_href(href: Option<String>) -> Result<String, RouterError> {
	let href = href.unwrap_or_default();
	if href.starts_with("#/") {
		Ok(href)
	} else if href.starts_with('/') {
		Ok(format!("#{}", href))
	} else {
		Err(RouterError::InvalidHref(href))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::host::MemoryHost;

	struct MemoryAnchor {
		tag: &'static str,
		href: Mutex<Option<String>>,
		handler: Mutex<Option<ClickHandler>>,
	}

	impl MemoryAnchor {
		fn new(tag: &'static str, href: Option<&str>) -> Arc<Self> {
			Arc::new(Self {
				tag,
				href: Mutex::new(href.map(str::to_string)),
				handler: Mutex::new(None),
			})
		}

		fn click(&self) {
			let handler = self.handler.lock().clone();
			if let Some(handler) = handler {
				handler();
			}
		}

		fn has_handler(&self) -> bool {
			self.handler.lock().is_some()
		}
	}

	impl LinkElement for MemoryAnchor {
		fn tag_name(&self) -> String {
			self.tag.to_string()
		}

		fn href(&self) -> Option<String> {
			self.href.lock().clone()
		}

		fn set_href(&self, href: &str) {
			*self.href.lock() = Some(href.to_string());
		}

		fn set_click_handler(&self, handler: Option<ClickHandler>) {
			*self.handler.lock() = handler;
		}
	}

	fn host() -> Arc<MemoryHost> {
		Arc::new(MemoryHost::new())
	}

	#[test]
	fn test_attach_normalizes_bare_path() {
		let anchor = MemoryAnchor::new("a", Some("/books"));
		let _link = Link::attach(host(), anchor.clone(), LinkOptions::default()).unwrap();
		assert_eq!(anchor.href(), Some("#/books".to_string()));
	}

	#[test]
	fn test_attach_rejects_non_anchor() {
		let div = MemoryAnchor::new("div", Some("/books"));
		let result = Link::attach(host(), div, LinkOptions::default());
		assert!(matches!(result, Err(RouterError::ActionMisuse(tag)) if tag == "div"));
	}

	#[test]
	fn test_attach_rejects_malformed_href() {
		let anchor = MemoryAnchor::new("a", Some("https://example.com"));
		let result = Link::attach(host(), anchor, LinkOptions::default());
		assert!(matches!(result, Err(RouterError::InvalidHref(_))));
	}

	#[test]
	fn test_click_navigates_and_records_scroll() {
		let host = host();
		host.scroll_to(0.0, 120.0);
		let anchor = MemoryAnchor::new("a", Some("/books"));
		let _link = Link::attach(
			Arc::clone(&host) as Arc<dyn NavigationHost>,
			anchor.clone(),
			LinkOptions::default(),
		)
		.unwrap();

		anchor.click();
		assert_eq!(host.current_hash(), "#/books");
		// The entry left behind remembers where the user was.
		host.go_back();
		assert_eq!(
			host.state().and_then(|s| s.scroll()),
			Some((0.0, 120.0))
		);
	}

	#[test]
	fn test_disabled_binding_ignores_clicks() {
		let host = host();
		let anchor = MemoryAnchor::new("a", None);
		let link = Link::attach(
			Arc::clone(&host) as Arc<dyn NavigationHost>,
			anchor.clone(),
			LinkOptions {
				href: Some("/books".to_string()),
				disabled: true,
			},
		)
		.unwrap();

		anchor.click();
		assert_eq!(host.current_hash(), "");

		link.update_options(LinkOptions::href("/books")).unwrap();
		anchor.click();
		assert_eq!(host.current_hash(), "#/books");
	}

	#[test]
	fn test_update_options_renormalizes() {
		let anchor = MemoryAnchor::new("a", Some("/a"));
		let link = Link::attach(host(), anchor.clone(), LinkOptions::default()).unwrap();

		link.update_options(LinkOptions::href("/b")).unwrap();
		assert_eq!(anchor.href(), Some("#/b".to_string()));

		let err = link.update_options(LinkOptions::href("mailto:x"));
		assert!(matches!(err, Err(RouterError::InvalidHref(_))));
		// Previous destination stays in effect.
		assert_eq!(anchor.href(), Some("#/b".to_string()));
	}

	#[test]
	fn test_detach_is_idempotent() {
		let anchor = MemoryAnchor::new("a", Some("/a"));
		let link = Link::attach(host(), anchor.clone(), LinkOptions::default()).unwrap();
		assert!(anchor.has_handler());

		link.detach();
		assert!(!anchor.has_handler());
		link.detach();
		drop(link);
		assert!(!anchor.has_handler());
	}
}
