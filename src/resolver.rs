//! View sources and asynchronous resolution.
//!
//! A [`ViewSource`] describes how a route obtains its view: an eager value, a
//! zero-argument factory, or a deferred factory returning a future (the async
//! code-split case). Identity is pointer identity of the shared inner — two
//! routes registered with clones of the same source count as the same view, so
//! re-matching it skips re-resolution.

use std::sync::Arc;

use futures::future::BoxFuture;

type Factory<V> = Arc<dyn Fn() -> V + Send + Sync>;
type DeferredFactory<V> = Arc<dyn Fn() -> BoxFuture<'static, V> + Send + Sync>;

enum SourceKind<V> {
	Value(Arc<V>),
	Factory(Factory<V>),
	Deferred(DeferredFactory<V>),
}

impl<V> Clone for SourceKind<V> {
	fn clone(&self) -> Self {
		match self {
			Self::Value(v) => Self::Value(Arc::clone(v)),
			Self::Factory(f) => Self::Factory(Arc::clone(f)),
			Self::Deferred(f) => Self::Deferred(Arc::clone(f)),
		}
	}
}

/// How a route's view is produced.
pub struct ViewSource<V> {
	kind: SourceKind<V>,
	name: Option<Arc<str>>,
}

impl<V> Clone for ViewSource<V> {
	fn clone(&self) -> Self {
		Self {
			kind: self.kind.clone(),
			name: self.name.clone(),
		}
	}
}

impl<V> std::fmt::Debug for ViewSource<V> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let kind = match &self.kind {
			SourceKind::Value(_) => "value",
			SourceKind::Factory(_) => "factory",
			SourceKind::Deferred(_) => "deferred",
		};
		f.debug_struct("ViewSource")
			.field("kind", &kind)
			.field("name", &self.name)
			.finish()
	}
}

impl<V: Clone + Send + Sync + 'static> ViewSource<V> {
	/// A source wrapping an eager view value.
	pub fn value(view: V) -> Self {
		Self {
			kind: SourceKind::Value(Arc::new(view)),
			name: None,
		}
	}

	/// A source calling a factory on every resolution.
	pub fn factory<F>(factory: F) -> Self
	where
		F: Fn() -> V + Send + Sync + 'static,
	{
		Self {
			kind: SourceKind::Factory(Arc::new(factory)),
			name: None,
		}
	}

	/// A source resolving asynchronously through a future-returning factory.
	pub fn deferred<F, Fut>(factory: F) -> Self
	where
		F: Fn() -> Fut + Send + Sync + 'static,
		Fut: std::future::Future<Output = V> + Send + 'static,
	{
		Self {
			kind: SourceKind::Deferred(Arc::new(move || Box::pin(factory()))),
			name: None,
		}
	}

	/// Attaches a display name, reported in `routeLoaded` details.
	pub fn named(mut self, name: impl Into<String>) -> Self {
		self.name = Some(Arc::from(name.into().as_str()));
		self
	}

	/// The display name, if any.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// Whether resolution requires awaiting.
	pub fn is_deferred(&self) -> bool {
		matches!(self.kind, SourceKind::Deferred(_))
	}

	/// Pointer identity: clones of one source are the same view.
	pub fn same(&self, other: &Self) -> bool {
		match (&self.kind, &other.kind) {
			(SourceKind::Value(a), SourceKind::Value(b)) => Arc::ptr_eq(a, b),
			(SourceKind::Factory(a), SourceKind::Factory(b)) => Arc::ptr_eq(a, b),
			(SourceKind::Deferred(a), SourceKind::Deferred(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}

	/// Resolves the view, awaiting a deferred factory if needed.
	pub async fn resolve(&self) -> V {
		match &self.kind {
			SourceKind::Value(v) => (**v).clone(),
			SourceKind::Factory(f) => f(),
			SourceKind::Deferred(f) => f().await,
		}
	}

	/// Resolves synchronously; `None` for a deferred source.
	///
	/// Loading placeholders must publish synchronously, so they go through this.
	pub fn resolve_sync(&self) -> Option<V> {
		match &self.kind {
			SourceKind::Value(v) => Some((**v).clone()),
			SourceKind::Factory(f) => Some(f()),
			SourceKind::Deferred(_) => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_value_source_resolves() {
		let source = ViewSource::value("home");
		assert_eq!(tokio_test::block_on(source.resolve()), "home");
		assert_eq!(source.resolve_sync(), Some("home"));
	}

	#[test]
	fn test_factory_source_resolves() {
		let source = ViewSource::factory(|| 41 + 1);
		assert_eq!(tokio_test::block_on(source.resolve()), 42);
	}

	#[test]
	fn test_deferred_source_resolves() {
		let source = ViewSource::deferred(|| async { "lazy" });
		assert!(source.is_deferred());
		assert_eq!(source.resolve_sync(), None);
		assert_eq!(tokio_test::block_on(source.resolve()), "lazy");
	}

	#[test]
	fn test_clone_shares_identity() {
		let source = ViewSource::value("home");
		let clone = source.clone();
		assert!(source.same(&clone));
	}

	#[test]
	fn test_distinct_sources_differ() {
		let a = ViewSource::value("home");
		let b = ViewSource::value("home");
		assert!(!a.same(&b));

		let c = ViewSource::<&str>::factory(|| "home");
		assert!(!a.same(&c));
	}

	#[test]
	fn test_named_source() {
		let source = ViewSource::value(1).named("Home");
		assert_eq!(source.name(), Some("Home"));
	}
}
