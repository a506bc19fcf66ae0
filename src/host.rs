//! Host environment capability.
//!
//! The router never touches a browser directly; everything it needs from the
//! host (hash readback and mutation, history state, scroll, event listeners,
//! interop event dispatch) goes through the [`NavigationHost`] trait. A wasm
//! binding implements this against `window`; [`MemoryHost`] is a deterministic
//! in-memory implementation for tests and headless use.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// Callback invoked when the hash changes.
pub type HashListener = Arc<dyn Fn() + Send + Sync>;

/// Callback invoked when the host navigates across history entries, carrying
/// the arrived-at entry's state.
pub type PopListener = Arc<dyn Fn(Option<HistoryState>) + Send + Sync>;

/// Opaque handle identifying a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Reserved history-state key for the stored horizontal scroll offset.
pub const SCROLL_X_KEY: &str = "__hashroute_scroll_x";
/// Reserved history-state key for the stored vertical scroll offset.
pub const SCROLL_Y_KEY: &str = "__hashroute_scroll_y";

/// History-entry metadata.
///
/// Scroll offsets live under reserved keys; every other caller-provided state
/// field is preserved verbatim across pushes and replaces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryState {
	/// Captured horizontal scroll offset, if any.
	#[serde(rename = "__hashroute_scroll_x", skip_serializing_if = "Option::is_none")]
	pub scroll_x: Option<f64>,
	/// Captured vertical scroll offset, if any.
	#[serde(rename = "__hashroute_scroll_y", skip_serializing_if = "Option::is_none")]
	pub scroll_y: Option<f64>,
	/// Caller-provided state fields, passed through untouched.
	#[serde(flatten)]
	pub extra: serde_json::Map<String, serde_json::Value>,
}

impl HistoryState {
	/// Returns the stored scroll offsets when both are present.
	pub fn scroll(&self) -> Option<(f64, f64)> {
		match (self.scroll_x, self.scroll_y) {
			(Some(x), Some(y)) => Some((x, y)),
			_ => None,
		}
	}

	/// Returns a copy with the given scroll offsets recorded.
	pub fn with_scroll(mut self, x: f64, y: f64) -> Self {
		self.scroll_x = Some(x);
		self.scroll_y = Some(y);
		self
	}

	/// Returns a copy with any scroll metadata stripped, caller fields kept.
	pub fn without_scroll(mut self) -> Self {
		self.scroll_x = None;
		self.scroll_y = None;
		self
	}
}

/// Capability trait over the host's location, history, and scroll machinery.
pub trait NavigationHost: Send + Sync {
	/// Current hash fragment including the leading `#`, or an empty string.
	fn current_hash(&self) -> String;

	/// Sets the hash fragment, creating a new history entry and firing pop and
	/// hash listeners (matching browser behavior for hash navigations).
	fn set_hash(&self, hash: &str);

	/// The current history entry's state, if any.
	fn state(&self) -> Option<HistoryState>;

	/// Rewrites the current history entry's state and, optionally, its hash,
	/// without creating an entry and without firing listeners.
	///
	/// # Errors
	///
	/// Returns [`HostError::StateRejected`] when the environment disallows
	/// history state updates; callers treat that as non-fatal.
	fn replace_state(&self, state: HistoryState, hash: Option<&str>) -> Result<(), HostError>;

	/// Navigates one entry back in history. The resulting pop and hash signals
	/// drive re-resolution; this call itself changes no router state.
	fn go_back(&self);

	/// Registers a hash-change listener.
	fn add_hash_listener(&self, listener: HashListener) -> ListenerId;
	/// Removes a previously registered hash-change listener.
	fn remove_hash_listener(&self, id: ListenerId);

	/// Registers a history-navigation listener.
	fn add_pop_listener(&self, listener: PopListener) -> ListenerId;
	/// Removes a previously registered history-navigation listener.
	fn remove_pop_listener(&self, id: ListenerId);

	/// Current scroll offsets.
	fn scroll_position(&self) -> (f64, f64);
	/// Scrolls the viewport.
	fn scroll_to(&self, x: f64, y: f64);
	/// Toggles the host's automatic scroll restoration; `true` means the router
	/// restores scroll positions itself.
	fn set_manual_scroll_restoration(&self, manual: bool);

	/// Dispatches a host-level interop event with a structured payload.
	fn dispatch_event(&self, name: &str, payload: serde_json::Value);
}

#[derive(Debug, Clone)]
struct HistoryEntry {
	hash: String,
	state: HistoryState,
}

#[derive(Default)]
struct Listeners {
	hash: Vec<(u64, HashListener)>,
	pop: Vec<(u64, PopListener)>,
}

/// Deterministic in-memory [`NavigationHost`].
///
/// Mirrors the browser behaviors the router depends on: `set_hash` appends a
/// history entry and fires pop then hash listeners; `go_back` moves the cursor
/// and fires the same pair; `replace_state` mutates the current entry silently.
pub struct MemoryHost {
	entries: Mutex<Vec<HistoryEntry>>,
	cursor: Mutex<usize>,
	scroll: Mutex<(f64, f64)>,
	listeners: Mutex<Listeners>,
	next_listener: AtomicU64,
	manual_scroll: AtomicBool,
	reject_state_updates: AtomicBool,
	events: Mutex<Vec<(String, serde_json::Value)>>,
}

impl Default for MemoryHost {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryHost {
	/// Creates a host positioned at an entry with an empty hash.
	pub fn new() -> Self {
		Self::with_hash("")
	}

	/// Creates a host positioned at an entry with the given hash.
	pub fn with_hash(hash: &str) -> Self {
		Self {
			entries: Mutex::new(vec![HistoryEntry {
				hash: hash.to_string(),
				state: HistoryState::default(),
			}]),
			cursor: Mutex::new(0),
			scroll: Mutex::new((0.0, 0.0)),
			listeners: Mutex::new(Listeners::default()),
			next_listener: AtomicU64::new(0),
			manual_scroll: AtomicBool::new(false),
			reject_state_updates: AtomicBool::new(false),
			events: Mutex::new(Vec::new()),
		}
	}

	/// Makes subsequent `replace_state` calls fail, emulating a sandboxed
	/// document that disallows history mutation.
	pub fn reject_state_updates(&self, reject: bool) {
		self.reject_state_updates.store(reject, Ordering::SeqCst);
	}

	/// Number of history entries.
	pub fn history_len(&self) -> usize {
		self.entries.lock().len()
	}

	/// Whether automatic scroll restoration is currently disabled.
	pub fn manual_scroll_restoration(&self) -> bool {
		self.manual_scroll.load(Ordering::SeqCst)
	}

	/// Dispatched interop events, in order.
	pub fn events(&self) -> Vec<(String, serde_json::Value)> {
		self.events.lock().clone()
	}

	/// Number of registered hash listeners.
	pub fn hash_listener_count(&self) -> usize {
		self.listeners.lock().hash.len()
	}

	fn fire_pop(&self, state: Option<HistoryState>) {
		let listeners: Vec<PopListener> = self
			.listeners
			.lock()
			.pop
			.iter()
			.map(|(_, l)| Arc::clone(l))
			.collect();
		for listener in listeners {
			listener(state.clone());
		}
	}

	fn fire_hash(&self) {
		let listeners: Vec<HashListener> = self
			.listeners
			.lock()
			.hash
			.iter()
			.map(|(_, l)| Arc::clone(l))
			.collect();
		for listener in listeners {
			listener();
		}
	}

	fn current_entry(&self) -> HistoryEntry {
		let cursor = *self.cursor.lock();
		self.entries.lock()[cursor].clone()
	}
}

impl NavigationHost for MemoryHost {
	fn current_hash(&self) -> String {
		self.current_entry().hash
	}

	fn set_hash(&self, hash: &str) {
		{
			let mut cursor = self.cursor.lock();
			let mut entries = self.entries.lock();
			if entries[*cursor].hash == hash {
				return;
			}
			// A new entry drops any forward history, like a browser would.
			entries.truncate(*cursor + 1);
			entries.push(HistoryEntry {
				hash: hash.to_string(),
				state: HistoryState::default(),
			});
			*cursor = entries.len() - 1;
		}
		self.fire_pop(None);
		self.fire_hash();
	}

	fn state(&self) -> Option<HistoryState> {
		Some(self.current_entry().state)
	}

	fn replace_state(&self, state: HistoryState, hash: Option<&str>) -> Result<(), HostError> {
		if self.reject_state_updates.load(Ordering::SeqCst) {
			return Err(HostError::StateRejected(
				"state updates disabled".to_string(),
			));
		}
		let cursor = *self.cursor.lock();
		let mut entries = self.entries.lock();
		entries[cursor].state = state;
		if let Some(hash) = hash {
			entries[cursor].hash = hash.to_string();
		}
		Ok(())
	}

	fn go_back(&self) {
		let state = {
			let mut cursor = self.cursor.lock();
			if *cursor == 0 {
				return;
			}
			*cursor -= 1;
			self.entries.lock()[*cursor].state.clone()
		};
		self.fire_pop(Some(state));
		self.fire_hash();
	}

	fn add_hash_listener(&self, listener: HashListener) -> ListenerId {
		let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
		self.listeners.lock().hash.push((id, listener));
		ListenerId(id)
	}

	fn remove_hash_listener(&self, id: ListenerId) {
		self.listeners.lock().hash.retain(|(lid, _)| *lid != id.0);
	}

	fn add_pop_listener(&self, listener: PopListener) -> ListenerId {
		let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
		self.listeners.lock().pop.push((id, listener));
		ListenerId(id)
	}

	fn remove_pop_listener(&self, id: ListenerId) {
		self.listeners.lock().pop.retain(|(lid, _)| *lid != id.0);
	}

	fn scroll_position(&self) -> (f64, f64) {
		*self.scroll.lock()
	}

	fn scroll_to(&self, x: f64, y: f64) {
		*self.scroll.lock() = (x, y);
	}

	fn set_manual_scroll_restoration(&self, manual: bool) {
		self.manual_scroll.store(manual, Ordering::SeqCst);
	}

	fn dispatch_event(&self, name: &str, payload: serde_json::Value) {
		self.events.lock().push((name.to_string(), payload));
	}
}
