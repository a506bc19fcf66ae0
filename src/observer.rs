//! Location observation.
//!
//! [`LocationObserver`] owns the current [`Location`] snapshot and republishes a
//! fresh `Arc<Location>` on every hash change. The host-level hash listener is a
//! reference-counted resource: it is registered when the first subscriber
//! arrives and removed when the last one leaves.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::host::{ListenerId, NavigationHost};
use crate::location::Location;
use crate::store::{Store, Subscription};

struct ObserverShared {
	host: Arc<dyn NavigationHost>,
	store: Store<Arc<Location>>,
	subscribers: Mutex<usize>,
	listener: Mutex<Option<ListenerId>>,
}

impl ObserverShared {
	fn refresh(&self) {
		let location = Location::parse_arc(&self.host.current_hash());
		self.store.set(location);
	}

	fn acquire(self: &Arc<Self>) {
		let mut count = self.subscribers.lock();
		*count += 1;
		if *count == 1 {
			let shared = Arc::clone(self);
			let id = self
				.host
				.add_hash_listener(Arc::new(move || shared.refresh()));
			*self.listener.lock() = Some(id);
		}
	}

	fn release(&self) {
		let mut count = self.subscribers.lock();
		*count -= 1;
		if *count == 0
			&& let Some(id) = self.listener.lock().take()
		{
			self.host.remove_hash_listener(id);
		}
	}
}

/// Publishes the current parsed hash location.
pub struct LocationObserver {
	shared: Arc<ObserverShared>,
}

impl LocationObserver {
	/// Creates an observer seeded from the host's current hash.
	pub fn new(host: Arc<dyn NavigationHost>) -> Self {
		let initial = Location::parse_arc(&host.current_hash());
		Self {
			shared: Arc::new(ObserverShared {
				host,
				store: Store::new(initial),
				subscribers: Mutex::new(0),
				listener: Mutex::new(None),
			}),
		}
	}

	/// The current snapshot.
	pub fn current(&self) -> Arc<Location> {
		self.shared.store.get()
	}

	/// Re-reads the host hash and republishes.
	///
	/// `replace` navigations call this directly: rewriting history state does
	/// not fire a hash-change signal of its own.
	pub fn refresh(&self) {
		self.shared.refresh();
	}

	/// Subscribes to location changes.
	///
	/// The callback fires immediately with the current snapshot. The host-level
	/// hash listener exists only while at least one subscription is live.
	pub fn subscribe<F>(&self, callback: F) -> Subscription
	where
		F: Fn(&Arc<Location>) + Send + Sync + 'static,
	{
		self.shared.acquire();
		let inner = self.shared.store.subscribe(callback);
		let shared = Arc::clone(&self.shared);
		Subscription::new(move || {
			drop(inner);
			shared.release();
		})
	}
}
