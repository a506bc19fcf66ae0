//! Route table.
//!
//! Route definitions are compiled once at construction into an ordered list of
//! [`CompiledRoute`]s; insertion order is priority order and the first match
//! wins regardless of pattern specificity. A literal `*` pattern is
//! conventionally registered last as the catch-all. Changing the set of routes
//! means building a new table.

use std::sync::Arc;

use crate::conditions::RouteCondition;
use crate::error::RouterError;
use crate::pattern::{CompiledPattern, PathSpec, Prefix, RouteParams};
use crate::resolver::ViewSource;

/// A route's view descriptor, discriminated at table build time.
pub enum RouteTarget<V> {
	/// A plain view with no conditions, props, or placeholder.
	Direct(ViewSource<V>),
	/// A view wrapped with conditions and presentation options.
	Wrapped(WrappedRoute<V>),
}

impl<V> RouteTarget<V> {
	/// The view source this target activates.
	pub fn view(&self) -> &ViewSource<V> {
		match self {
			Self::Direct(source) => source,
			Self::Wrapped(wrapped) => &wrapped.view,
		}
	}

	pub(crate) fn conditions(&self) -> &[Arc<dyn RouteCondition>] {
		match self {
			Self::Direct(_) => &[],
			Self::Wrapped(wrapped) => &wrapped.conditions,
		}
	}

	pub(crate) fn user_data(&self) -> Option<&serde_json::Value> {
		match self {
			Self::Direct(_) => None,
			Self::Wrapped(wrapped) => wrapped.user_data.as_ref(),
		}
	}

	pub(crate) fn props(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
		match self {
			Self::Direct(_) => None,
			Self::Wrapped(wrapped) => {
				if wrapped.props.is_empty() {
					None
				} else {
					Some(&wrapped.props)
				}
			}
		}
	}

	pub(crate) fn loading(&self) -> Option<&ViewSource<V>> {
		match self {
			Self::Direct(_) => None,
			Self::Wrapped(wrapped) => wrapped.loading.as_ref(),
		}
	}

	pub(crate) fn loading_params(&self) -> Option<&RouteParams> {
		match self {
			Self::Direct(_) => None,
			Self::Wrapped(wrapped) => wrapped.loading_params.as_ref(),
		}
	}
}

impl<V: Clone + Send + Sync + 'static> From<ViewSource<V>> for RouteTarget<V> {
	fn from(source: ViewSource<V>) -> Self {
		Self::Direct(source)
	}
}

impl<V> From<WrappedRoute<V>> for RouteTarget<V> {
	fn from(wrapped: WrappedRoute<V>) -> Self {
		Self::Wrapped(wrapped)
	}
}

/// A view plus activation conditions and presentation options.
pub struct WrappedRoute<V> {
	view: ViewSource<V>,
	conditions: Vec<Arc<dyn RouteCondition>>,
	user_data: Option<serde_json::Value>,
	props: serde_json::Map<String, serde_json::Value>,
	loading: Option<ViewSource<V>>,
	loading_params: Option<RouteParams>,
}

impl<V: Clone + Send + Sync + 'static> WrappedRoute<V> {
	/// Starts a wrapped route around a view source.
	pub fn new(view: ViewSource<V>) -> Self {
		Self {
			view,
			conditions: Vec::new(),
			user_data: None,
			props: serde_json::Map::new(),
			loading: None,
			loading_params: None,
		}
	}

	/// Appends an activation condition; conditions run in this order.
	pub fn condition(mut self, condition: Arc<dyn RouteCondition>) -> Self {
		self.conditions.push(condition);
		self
	}

	/// Attaches caller data, surfaced on every [`RouteDetail`](crate::events::RouteDetail).
	pub fn user_data(mut self, data: serde_json::Value) -> Self {
		self.user_data = Some(data);
		self
	}

	/// Adds a prop published alongside the view.
	pub fn prop(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
		self.props.insert(key.into(), value);
		self
	}

	/// Sets the placeholder view shown while a deferred view resolves.
	pub fn loading(mut self, source: ViewSource<V>) -> Self {
		self.loading = Some(source);
		self
	}

	/// Params published together with the placeholder.
	pub fn loading_params(mut self, params: RouteParams) -> Self {
		self.loading_params = Some(params);
		self
	}
}

/// A registered route with its compiled matcher. Immutable after build.
pub struct CompiledRoute<V> {
	spec: PathSpec,
	matcher: CompiledPattern,
	target: RouteTarget<V>,
}

impl<V> CompiledRoute<V> {
	/// The registered pattern as a display string.
	pub fn pattern(&self) -> &str {
		self.spec.as_str()
	}

	/// The route's target.
	pub fn target(&self) -> &RouteTarget<V> {
		&self.target
	}
}

/// Ordered, immutable collection of compiled routes.
pub struct RouteTable<V> {
	routes: Vec<CompiledRoute<V>>,
	prefix: Option<Prefix>,
}

impl<V: Clone + Send + Sync + 'static> RouteTable<V> {
	/// Compiles a table from ordered definitions.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidPath`] for a malformed pattern and
	/// [`RouterError::InvalidTarget`] for a target the router cannot activate
	/// (currently: a deferred loading placeholder, which could never publish
	/// synchronously).
	pub fn build(
		definitions: Vec<(PathSpec, RouteTarget<V>)>,
		prefix: Option<Prefix>,
	) -> Result<Self, RouterError> {
		let mut routes = Vec::with_capacity(definitions.len());
		for (spec, target) in definitions {
			let matcher = CompiledPattern::compile(&spec)?;
			if let Some(loading) = target.loading()
				&& loading.is_deferred()
			{
				return Err(RouterError::invalid_target(
					spec.as_str(),
					"loading placeholder must resolve synchronously",
				));
			}
			routes.push(CompiledRoute {
				spec,
				matcher,
				target,
			});
		}
		Ok(Self { routes, prefix })
	}

	/// Number of registered routes.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Whether the table is empty.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	/// Finds the first route matching `path`, in registration order.
	///
	/// Returns the route together with its extracted params (`None` when the
	/// pattern declares no captures). With a prefix configured, a path outside
	/// the prefix matches nothing.
	pub fn find(&self, path: &str) -> Option<(&CompiledRoute<V>, Option<RouteParams>)> {
		let effective = match &self.prefix {
			Some(prefix) => prefix.strip(path)?,
			None => path.to_string(),
		};
		for route in &self.routes {
			if let Some(hit) = route.matcher.matches(&effective) {
				return Some((route, hit.into_params()));
			}
		}
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn table(definitions: Vec<(PathSpec, RouteTarget<&'static str>)>) -> RouteTable<&'static str> {
		RouteTable::build(definitions, None).expect("valid table")
	}

	#[test]
	fn test_registration_order_wins() {
		let table = table(vec![
			("/a/:x".into(), ViewSource::value("a").into()),
			("*".into(), ViewSource::value("catchall").into()),
		]);

		let (route, params) = table.find("/a/1").expect("match");
		assert_eq!(route.pattern(), "/a/:x");
		assert_eq!(params.expect("params").get("x"), Some("1"));

		let (route, params) = table.find("/other").expect("match");
		assert_eq!(route.pattern(), "*");
		assert!(params.is_none());
	}

	#[test]
	fn test_prefix_scoping() {
		let table = RouteTable::build(
			vec![("/list".into(), ViewSource::value("list").into())],
			Some("/app".into()),
		)
		.expect("valid table");

		assert!(table.find("/other").is_none());
		assert!(table.find("/app/list").is_some());
		// The stripped-empty remainder becomes "/" and does not match "/list".
		assert!(table.find("/app").is_none());
	}

	#[test]
	fn test_invalid_pattern_fails_build() {
		let result = RouteTable::build(
			vec![("nope".into(), RouteTarget::from(ViewSource::value("x")))],
			None,
		);
		assert!(matches!(result, Err(RouterError::InvalidPath { .. })));
	}

	#[test]
	fn test_deferred_loading_placeholder_rejected() {
		let wrapped = WrappedRoute::new(ViewSource::value("real"))
			.loading(ViewSource::deferred(|| async { "placeholder" }));
		let result = RouteTable::build(vec![("/x".into(), wrapped.into())], None);
		assert!(matches!(result, Err(RouterError::InvalidTarget { .. })));
	}

	#[test]
	fn test_wrapped_accessors() {
		let wrapped = WrappedRoute::new(ViewSource::value("v"))
			.user_data(serde_json::json!({"id": 7}))
			.prop("title", serde_json::json!("Hi"));
		let target = RouteTarget::from(wrapped);

		assert_eq!(target.user_data().unwrap()["id"], 7);
		assert_eq!(target.props().unwrap()["title"], "Hi");
		assert!(target.conditions().is_empty());
	}

	#[test]
	fn test_direct_target_has_no_options() {
		let target = RouteTarget::from(ViewSource::value("v"));
		assert!(target.user_data().is_none());
		assert!(target.props().is_none());
		assert!(target.loading().is_none());
	}
}
