//! Generic observable store.
//!
//! `Store<T>` is the publish/subscribe primitive the router publishes through.
//! A subscriber receives the current value synchronously at subscription time
//! (no missed initial event) and is notified on every subsequent `set`.
//!
//! Unlike a reactive-runtime signal there is no dependency tracking here; the
//! consumers are external renderers that just want a callback per change.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct StoreShared<T> {
	value: RwLock<T>,
	subscribers: Mutex<Vec<(u64, Callback<T>)>>,
	next_id: AtomicU64,
}

/// An observable value with synchronous-on-subscribe emission.
///
/// Cloning a `Store` yields another handle to the same underlying value and
/// subscriber list.
pub struct Store<T> {
	shared: Arc<StoreShared<T>>,
}

impl<T> Clone for Store<T> {
	fn clone(&self) -> Self {
		Self {
			shared: Arc::clone(&self.shared),
		}
	}
}

impl<T: Clone + Send + Sync + 'static> Store<T> {
	/// Creates a store holding `value`.
	pub fn new(value: T) -> Self {
		Self {
			shared: Arc::new(StoreShared {
				value: RwLock::new(value),
				subscribers: Mutex::new(Vec::new()),
				next_id: AtomicU64::new(0),
			}),
		}
	}

	/// Returns a clone of the current value.
	pub fn get(&self) -> T {
		self.shared.value.read().clone()
	}

	/// Replaces the value and notifies every subscriber.
	pub fn set(&self, value: T) {
		*self.shared.value.write() = value;
		self.notify();
	}

	fn notify(&self) {
		// Snapshot subscribers and value first; callbacks may subscribe or
		// unsubscribe re-entrantly and must not observe a held lock.
		let callbacks: Vec<Callback<T>> = self
			.shared
			.subscribers
			.lock()
			.iter()
			.map(|(_, cb)| Arc::clone(cb))
			.collect();
		let value = self.get();
		for cb in callbacks {
			cb(&value);
		}
	}

	/// Subscribes to the store.
	///
	/// The callback is invoked immediately with the current value, then once per
	/// `set`. Dropping the returned [`Subscription`] (or calling
	/// [`Subscription::unsubscribe`]) removes the callback.
	pub fn subscribe<F>(&self, callback: F) -> Subscription
	where
		F: Fn(&T) + Send + Sync + 'static,
	{
		let callback: Callback<T> = Arc::new(callback);
		let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
		self.shared
			.subscribers
			.lock()
			.push((id, Arc::clone(&callback)));

		callback(&self.get());

		let shared = Arc::clone(&self.shared);
		Subscription::new(move || {
			shared.subscribers.lock().retain(|(sub_id, _)| *sub_id != id);
		})
	}

	/// Returns the number of live subscribers.
	pub fn subscriber_count(&self) -> usize {
		self.shared.subscribers.lock().len()
	}
}

/// Handle releasing a store subscription.
///
/// The release runs at most once, either through [`Subscription::unsubscribe`]
/// or on drop.
pub struct Subscription {
	cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
	pub(crate) fn new<F: FnOnce() + Send + 'static>(cancel: F) -> Self {
		Self {
			cancel: Some(Box::new(cancel)),
		}
	}

	/// Removes the subscriber.
	pub fn unsubscribe(mut self) {
		if let Some(cancel) = self.cancel.take() {
			cancel();
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(cancel) = self.cancel.take() {
			cancel();
		}
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription")
			.field("active", &self.cancel.is_some())
			.finish()
	}
}
