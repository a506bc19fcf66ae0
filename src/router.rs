//! The navigation controller.
//!
//! [`Router`] wires the pipeline together: every location emission is matched
//! against the route table, gated through the route's conditions, resolved to a
//! view, and committed to the published [`NavigationState`] — unless a newer
//! navigation superseded the attempt in the meantime, in which case the late
//! result is discarded without publishing or notifying.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::RouterError;
use crate::events::{
	EVENT_CONDITIONS_FAILED, EVENT_ROUTE_LOADED, EVENT_ROUTE_LOADING, LifecycleCallbacks,
	RouteDetail,
};
use crate::conditions::check_conditions;
use crate::host::NavigationHost;
use crate::location::Location;
use crate::observer::LocationObserver;
use crate::pattern::{PathSpec, Prefix, RouteParams};
use crate::scroll::ScrollCoordinator;
use crate::store::{Store, Subscription};
use crate::table::{RouteTable, RouteTarget};
use crate::resolver::ViewSource;

/// The state the router publishes for the external renderer.
///
/// Mutated exclusively by the router; consumers treat it as derived output.
#[derive(Debug, Clone)]
pub struct NavigationState<V> {
	/// The active view, `None` when no route is active (no match, rejected
	/// conditions, or an interim state while a deferred view resolves).
	pub view: Option<V>,
	/// Params of the active route, when its pattern declares captures.
	pub params: Option<RouteParams>,
	/// Props of the active route, when configured.
	pub props: Option<serde_json::Map<String, serde_json::Value>>,
}

impl<V> Default for NavigationState<V> {
	fn default() -> Self {
		Self {
			view: None,
			params: None,
			props: None,
		}
	}
}

impl<V: PartialEq> PartialEq for NavigationState<V> {
	fn eq(&self, other: &Self) -> bool {
		self.view == other.view && self.params == other.params && self.props == other.props
	}
}

/// Router construction options.
pub struct RouterConfig<V> {
	definitions: Vec<(PathSpec, RouteTarget<V>)>,
	prefix: Option<Prefix>,
	restore_scroll_state: bool,
	callbacks: LifecycleCallbacks,
}

impl<V> Default for RouterConfig<V> {
	fn default() -> Self {
		Self {
			definitions: Vec::new(),
			prefix: None,
			restore_scroll_state: false,
			callbacks: LifecycleCallbacks::default(),
		}
	}
}

impl<V: Clone + Send + Sync + 'static> RouterConfig<V> {
	/// Starts an empty configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a route. Registration order is priority order.
	pub fn route(
		mut self,
		pattern: impl Into<PathSpec>,
		target: impl Into<RouteTarget<V>>,
	) -> Self {
		self.definitions.push((pattern.into(), target.into()));
		self
	}

	/// Restricts the table to paths under a prefix (for nested routers).
	pub fn prefix(mut self, prefix: impl Into<Prefix>) -> Self {
		self.prefix = Some(prefix.into());
		self
	}

	/// Enables scroll-position capture and restoration.
	pub fn restore_scroll_state(mut self, enabled: bool) -> Self {
		self.restore_scroll_state = enabled;
		self
	}

	/// Callback for the `routeLoading` notification.
	pub fn on_route_loading<F>(mut self, callback: F) -> Self
	where
		F: Fn(&RouteDetail) + Send + Sync + 'static,
	{
		self.callbacks.route_loading = Some(Arc::new(callback));
		self
	}

	/// Callback for the `routeLoaded` notification.
	pub fn on_route_loaded<F>(mut self, callback: F) -> Self
	where
		F: Fn(&RouteDetail) + Send + Sync + 'static,
	{
		self.callbacks.route_loaded = Some(Arc::new(callback));
		self
	}

	/// Callback for the `conditionsFailed` notification.
	pub fn on_conditions_failed<F>(mut self, callback: F) -> Self
	where
		F: Fn(&RouteDetail) + Send + Sync + 'static,
	{
		self.callbacks.conditions_failed = Some(Arc::new(callback));
		self
	}
}

struct RouterInner<V: Clone + Send + Sync + 'static> {
	host: Arc<dyn NavigationHost>,
	table: RouteTable<V>,
	observer: LocationObserver,
	state: Store<NavigationState<V>>,
	/// Identity of the currently active view source; re-matching it skips
	/// re-resolution.
	active: Mutex<Option<ViewSource<V>>>,
	/// Serializes the staleness check with the publish that depends on it.
	commit: Mutex<()>,
	callbacks: LifecycleCallbacks,
	runtime: tokio::runtime::Handle,
}

/// The hash router.
///
/// Owns the observer subscription driving the pipeline; dropping the router
/// releases the host listeners and, when enabled, the scroll coordinator.
pub struct Router<V: Clone + Send + Sync + 'static> {
	inner: Arc<RouterInner<V>>,
	_subscription: Subscription,
	_scroll: Option<ScrollCoordinator>,
}

impl<V: Clone + Send + Sync + 'static> Router<V> {
	/// Builds the route table and starts observing the host's hash.
	///
	/// The current location is resolved immediately; no initial event is
	/// missed.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidPath`] or [`RouterError::InvalidTarget`]
	/// when a registered route fails to compile.
	///
	/// # Panics
	///
	/// Panics when called outside a tokio runtime; resolution attempts are
	/// spawned on the runtime the router was created in.
	pub fn new(config: RouterConfig<V>, host: Arc<dyn NavigationHost>) -> Result<Self, RouterError> {
		let table = RouteTable::build(config.definitions, config.prefix)?;
		let observer = LocationObserver::new(Arc::clone(&host));

		let scroll = config
			.restore_scroll_state
			.then(|| ScrollCoordinator::enable(Arc::clone(&host)));

		let inner = Arc::new(RouterInner {
			host,
			table,
			observer,
			state: Store::new(NavigationState::default()),
			active: Mutex::new(None),
			commit: Mutex::new(()),
			callbacks: config.callbacks,
			runtime: tokio::runtime::Handle::current(),
		});

		let pipeline = Arc::clone(&inner);
		let subscription = inner.observer.subscribe(move |snapshot| {
			let inner = Arc::clone(&pipeline);
			let snapshot = Arc::clone(snapshot);
			let runtime = inner.runtime.clone();
			runtime.spawn(async move { inner.handle_location(snapshot).await });
		});

		Ok(Self {
			inner,
			_subscription: subscription,
			_scroll: scroll,
		})
	}

	/// The published navigation state store.
	pub fn state(&self) -> Store<NavigationState<V>> {
		self.inner.state.clone()
	}

	/// Subscribes to the published navigation state.
	pub fn subscribe_state<F>(&self, callback: F) -> Subscription
	where
		F: Fn(&NavigationState<V>) + Send + Sync + 'static,
	{
		self.inner.state.subscribe(callback)
	}

	/// Subscribes to location changes.
	pub fn subscribe_location<F>(&self, callback: F) -> Subscription
	where
		F: Fn(&Arc<Location>) + Send + Sync + 'static,
	{
		self.inner.observer.subscribe(callback)
	}

	/// The current location snapshot.
	pub fn location(&self) -> Arc<Location> {
		self.inner.observer.current()
	}

	/// The current path.
	pub fn path(&self) -> String {
		self.inner.observer.current().path.clone()
	}

	/// The current querystring.
	pub fn querystring(&self) -> String {
		self.inner.observer.current().querystring.clone()
	}

	/// Navigates to a new location, creating a history entry.
	///
	/// The entry being left behind records the current scroll offsets first,
	/// so navigating back can restore them. The side effect is deferred until
	/// the current task yields; completion of the future is the completion
	/// signal.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidLocation`] — before any side effect —
	/// unless `to` starts with `/` or `#/`.
	pub async fn push(&self, to: &str) -> Result<(), RouterError> {
		let hash = normalize_location(to)?;
		tokio::task::yield_now().await;
		capture_scroll_then_set_hash(&self.inner.host, &hash);
		Ok(())
	}

	/// Replaces the current history entry with a new location.
	///
	/// Scroll metadata is stripped from the rewritten entry. Rewriting history
	/// state fires no hash-change signal, so the observer is refreshed
	/// explicitly.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidLocation`] — before any side effect —
	/// unless `to` starts with `/` or `#/`.
	pub async fn replace(&self, to: &str) -> Result<(), RouterError> {
		let hash = normalize_location(to)?;
		tokio::task::yield_now().await;

		let state = self
			.inner
			.host
			.state()
			.unwrap_or_default()
			.without_scroll();
		match self.inner.host.replace_state(state, Some(&hash)) {
			Ok(()) => self.inner.observer.refresh(),
			Err(e) => {
				tracing::warn!(error = %e, "history replace rejected, navigating via hash");
				self.inner.host.set_hash(&hash);
			}
		}
		Ok(())
	}

	/// Navigates one entry back in history.
	///
	/// No router state changes here; the host's resulting signals drive
	/// re-resolution.
	pub async fn pop(&self) {
		tokio::task::yield_now().await;
		self.inner.host.go_back();
	}
}

impl<V: Clone + Send + Sync + 'static> RouterInner<V> {
	/// Runs one resolution attempt for a location emission.
	async fn handle_location(self: Arc<Self>, snapshot: Arc<Location>) {
		let Some((route, params)) = self.table.find(&snapshot.path) else {
			tracing::debug!(path = %snapshot.path, "no route matched");
			self.publish_if_fresh(&snapshot, |inner| {
				*inner.active.lock() = None;
				inner.state.set(NavigationState::default());
			});
			return;
		};

		let target = route.target();
		let detail = RouteDetail {
			route: route.pattern().to_string(),
			location: snapshot.path.clone(),
			querystring: snapshot.querystring.clone(),
			user_data: target.user_data().cloned(),
			params: params.clone(),
			name: target.view().name().map(str::to_string),
		};

		tracing::debug!(route = %detail.route, path = %detail.location, "route matched");
		self.callbacks.emit(&self.host, EVENT_ROUTE_LOADING, &detail);

		if !check_conditions(target.conditions(), &detail).await {
			tracing::debug!(route = %detail.route, "conditions rejected navigation");
			let published = self.publish_if_fresh(&snapshot, |inner| {
				*inner.active.lock() = None;
				inner.state.set(NavigationState::default());
			});
			if published {
				self.callbacks.emit(&self.host, EVENT_CONDITIONS_FAILED, &detail);
			}
			return;
		}

		let source = target.view().clone();
		let unchanged = self
			.active
			.lock()
			.as_ref()
			.is_some_and(|active| active.same(&source));

		if unchanged {
			// Same view re-matched (e.g. only params changed): no re-resolution,
			// no placeholder, just fresh params and props.
			let published = self.publish_if_fresh(&snapshot, |inner| {
				let view = inner.state.get().view;
				inner.state.set(NavigationState {
					view,
					params: params.clone(),
					props: target.props().cloned(),
				});
			});
			if published {
				self.callbacks.emit(&self.host, EVENT_ROUTE_LOADED, &detail);
			}
			return;
		}

		if let Some(loading) = target.loading() {
			let placeholder = loading.resolve_sync();
			let loading_params = target.loading_params().cloned();
			let loading_detail = RouteDetail {
				params: loading_params.clone(),
				name: loading.name().map(str::to_string),
				..detail.clone()
			};
			let published = self.publish_if_fresh(&snapshot, |inner| {
				inner.state.set(NavigationState {
					view: placeholder,
					params: loading_params,
					props: target.props().cloned(),
				});
			});
			if !published {
				return;
			}
			self.callbacks.emit(&self.host, EVENT_ROUTE_LOADED, &loading_detail);
		} else if !self.publish_if_fresh(&snapshot, |inner| {
			inner.state.set(NavigationState::default());
		}) {
			return;
		}

		let view = source.resolve().await;

		let published = self.publish_if_fresh(&snapshot, |inner| {
			*inner.active.lock() = Some(source.clone());
			inner.state.set(NavigationState {
				view: Some(view),
				params: params.clone(),
				props: target.props().cloned(),
			});
		});
		if published {
			self.callbacks.emit(&self.host, EVENT_ROUTE_LOADED, &detail);
		}
	}

	/// Runs `publish` unless the attempt's snapshot has been superseded.
	///
	/// The check and the publish happen under one lock, so a late attempt can
	/// never interleave its publish with a newer one.
	fn publish_if_fresh(&self, snapshot: &Arc<Location>, publish: impl FnOnce(&Self)) -> bool {
		let _commit = self.commit.lock();
		if !Arc::ptr_eq(&self.observer.current(), snapshot) {
			tracing::trace!(path = %snapshot.path, "discarding superseded resolution");
			return false;
		}
		publish(self);
		true
	}
}

/// Validates a navigation argument and normalizes it to a hash fragment.
fn normalize_location(to: &str) -> Result<String, RouterError> {
	if to.starts_with("#/") {
		Ok(to.to_string())
	} else if to.starts_with('/') {
		Ok(format!("#{}", to))
	} else {
		Err(RouterError::InvalidLocation(to.to_string()))
	}
}

/// The scroll-capture + hash-set sequence shared by `push` and link actions.
///
/// The scroll offsets are written into the entry being left behind; the new
/// entry starts with no scroll metadata. A rejected history update is only a
/// warning — the hash mutation still navigates.
pub(crate) fn capture_scroll_then_set_hash(host: &Arc<dyn NavigationHost>, hash: &str) {
	let (x, y) = host.scroll_position();
	let state = host.state().unwrap_or_default().with_scroll(x, y);
	if let Err(e) = host.replace_state(state, None) {
		tracing::warn!(error = %e, "could not record scroll offsets on history entry");
	}
	host.set_hash(hash);
}
