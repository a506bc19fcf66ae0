//! Lifecycle notifications.
//!
//! Three notifications describe the life of a navigation attempt:
//! `routeLoading` (a route matched, before its conditions run), `routeLoaded`
//! (a view — placeholder or final — was published), and `conditionsFailed`
//! (a condition rejected the navigation). Each is delivered to the configured
//! callback and, for interop, dispatched as a host-level event carrying the
//! serialized detail.

use std::sync::Arc;

use serde::Serialize;

use crate::host::NavigationHost;
use crate::pattern::RouteParams;

/// Event name for the pre-condition notification.
pub const EVENT_ROUTE_LOADING: &str = "routeLoading";
/// Event name for a published view (placeholder or final).
pub const EVENT_ROUTE_LOADED: &str = "routeLoaded";
/// Event name for a condition rejection.
pub const EVENT_CONDITIONS_FAILED: &str = "conditionsFailed";

/// Detail payload passed to conditions and lifecycle consumers.
#[derive(Debug, Clone, Serialize)]
pub struct RouteDetail {
	/// The registered pattern that matched.
	pub route: String,
	/// The matched path.
	pub location: String,
	/// The querystring, without the leading `?`.
	pub querystring: String,
	/// Caller-attached data from the route target.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user_data: Option<serde_json::Value>,
	/// Extracted parameters, when the pattern declares captures.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub params: Option<RouteParams>,
	/// Display name of the resolved view, when one was attached.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
}

/// Structured lifecycle callback.
pub type LifecycleCallback = Arc<dyn Fn(&RouteDetail) + Send + Sync>;

/// Callbacks configured at router construction.
#[derive(Clone, Default)]
pub(crate) struct LifecycleCallbacks {
	pub(crate) route_loading: Option<LifecycleCallback>,
	pub(crate) route_loaded: Option<LifecycleCallback>,
	pub(crate) conditions_failed: Option<LifecycleCallback>,
}

impl LifecycleCallbacks {
	/// Delivers a notification to its callback and as a host-level event.
	pub(crate) fn emit(&self, host: &Arc<dyn NavigationHost>, event: &str, detail: &RouteDetail) {
		let callback = match event {
			EVENT_ROUTE_LOADING => &self.route_loading,
			EVENT_ROUTE_LOADED => &self.route_loaded,
			EVENT_CONDITIONS_FAILED => &self.conditions_failed,
			_ => &None,
		};
		if let Some(callback) = callback {
			callback(detail);
		}
		match serde_json::to_value(detail) {
			Ok(payload) => host.dispatch_event(event, payload),
			Err(e) => tracing::warn!(event, error = %e, "failed to serialize route detail"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::host::MemoryHost;
	use parking_lot::Mutex;

	fn detail() -> RouteDetail {
		RouteDetail {
			route: "/hello/:name".to_string(),
			location: "/hello/svelte".to_string(),
			querystring: "quantity=100".to_string(),
			user_data: Some(serde_json::json!({"k": 1})),
			params: None,
			name: Some("Hello".to_string()),
		}
	}

	#[test]
	fn test_emit_reaches_callback_and_host() {
		let host = Arc::new(MemoryHost::new());
		let seen = Arc::new(Mutex::new(Vec::new()));

		let seen_cb = Arc::clone(&seen);
		let callbacks = LifecycleCallbacks {
			route_loaded: Some(Arc::new(move |d: &RouteDetail| {
				seen_cb.lock().push(d.route.clone());
			})),
			..Default::default()
		};

		let dyn_host: Arc<dyn NavigationHost> = Arc::clone(&host) as _;
		callbacks.emit(&dyn_host, EVENT_ROUTE_LOADED, &detail());

		assert_eq!(*seen.lock(), vec!["/hello/:name".to_string()]);
		let events = host.events();
		assert_eq!(events.len(), 1);
		assert_eq!(events[0].0, EVENT_ROUTE_LOADED);
		assert_eq!(events[0].1["location"], "/hello/svelte");
	}

	#[test]
	fn test_event_without_callback_still_dispatches() {
		let host = Arc::new(MemoryHost::new());
		let callbacks = LifecycleCallbacks::default();
		let dyn_host: Arc<dyn NavigationHost> = Arc::clone(&host) as _;
		callbacks.emit(&dyn_host, EVENT_CONDITIONS_FAILED, &detail());
		assert_eq!(host.events()[0].0, EVENT_CONDITIONS_FAILED);
	}
}
