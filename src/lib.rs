//! Hash-based client-side router.
//!
//! `hashroute` keeps a view-typed navigation state in sync with the hash
//! fragment of a host location. Routes are declared as ordered path patterns
//! (`/hello/:name`, `/books/*`, a literal `*` catch-all, or a raw regex) and
//! compiled once into a table; every hash change runs a navigation attempt
//! through activation conditions, optional loading placeholders, and async
//! view resolution, with stale attempts discarded before they can publish.
//!
//! The platform boundary is the [`NavigationHost`] trait: production code
//! binds it to a real location/history pair, tests use the deterministic
//! in-memory [`MemoryHost`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use hashroute::{MemoryHost, Router, RouterConfig, ViewSource};
//!
//! # #[tokio::main] async fn main() -> Result<(), hashroute::RouterError> {
//! let host = Arc::new(MemoryHost::new());
//! let router = Router::new(
//! 	RouterConfig::new()
//! 		.route("/", ViewSource::value("home").named("Home"))
//! 		.route("/hello/:name", ViewSource::value("hello"))
//! 		.route("*", ViewSource::value("not-found")),
//! 	host,
//! )?;
//!
//! router.push("/hello/svelte?quantity=100").await?;
//! # Ok(()) }
//! ```

pub mod conditions;
pub mod error;
pub mod events;
pub mod host;
pub mod link;
pub mod location;
pub mod observer;
pub mod pattern;
pub mod resolver;
pub mod router;
pub mod scroll;
pub mod store;
pub mod table;

pub use conditions::{RouteCondition, condition_fn};
pub use error::{HostError, RouterError};
pub use events::{
	EVENT_CONDITIONS_FAILED, EVENT_ROUTE_LOADED, EVENT_ROUTE_LOADING, LifecycleCallback,
	RouteDetail,
};
pub use host::{
	HashListener, HistoryState, ListenerId, MemoryHost, NavigationHost, PopListener, SCROLL_X_KEY,
	SCROLL_Y_KEY,
};
pub use link::{ClickHandler, Link, LinkElement, LinkOptions};
pub use location::Location;
pub use observer::LocationObserver;
pub use pattern::{PathSpec, Prefix, RouteParams};
pub use resolver::ViewSource;
pub use router::{NavigationState, Router, RouterConfig};
pub use scroll::ScrollCoordinator;
pub use store::{Store, Subscription};
pub use table::{CompiledRoute, RouteTable, RouteTarget, WrappedRoute};
