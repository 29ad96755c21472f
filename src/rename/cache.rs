//! A time-boxed cache for composed rename tables, keyed by build scope.
//!
//! Composing a table means loading and chaining two mapping files from
//! disk, so lookups must not do it repeatedly: a loaded table is kept for a
//! fixed window (five minutes), after which the next access triggers a
//! fresh load. Concurrent first accesses for the same scope are
//! single-flight: one caller loads, the others block on the same slot and
//! share the result.
//!
//! A failed load is *also* cached, as an empty table, so a known-broken
//! scope isn't retried on every lookup within the window. Scope teardown
//! on the caller's side should go through [`invalidate`][RenameCache::invalidate]
//! rather than waiting for expiry.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use anyhow::Result;
use log::{debug, warn};
use lru::LruCache;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use crate::rename::RenameTable;

const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
const DEFAULT_CAPACITY: usize = 64;

/// An opaque identifier for the build scope a rename table belongs to,
/// e.g. one module of an imported project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeId(String);

impl ScopeId {
	pub fn new(id: impl Into<String>) -> ScopeId {
		ScopeId(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

struct Slot {
	loaded_at: Instant,
	table: OnceCell<Arc<RenameTable>>,
}

/// See the [module documentation][self].
pub struct RenameCache {
	ttl: Duration,
	entries: Mutex<LruCache<ScopeId, Arc<Slot>>>,
}

impl Default for RenameCache {
	fn default() -> RenameCache {
		RenameCache::new()
	}
}

impl RenameCache {
	pub fn new() -> RenameCache {
		RenameCache::with_ttl(DEFAULT_TTL)
	}

	/// A cache with a custom expiry window. The window applies from the
	/// moment a slot is created, not from when its load finishes.
	pub fn with_ttl(ttl: Duration) -> RenameCache {
		let capacity = NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN);
		RenameCache {
			ttl,
			entries: Mutex::new(LruCache::new(capacity)),
		}
	}

	/// Returns the cached table for the scope, loading it via `load` if the
	/// scope is uncached or its entry has expired.
	///
	/// The loader runs at most once per slot, even when several threads ask
	/// for the same uncached scope at the same time. If it fails, the error
	/// is logged and an empty table is cached in its place for the rest of
	/// the window.
	pub fn get_or_load(
		&self,
		scope: &ScopeId,
		load: impl FnOnce() -> Result<RenameTable>,
	) -> Arc<RenameTable> {
		let slot = {
			let mut entries = self.entries.lock();
			match entries.get(scope) {
				Some(slot) if slot.loaded_at.elapsed() < self.ttl => Arc::clone(slot),
				_ => {
					let slot = Arc::new(Slot {
						loaded_at: Instant::now(),
						table: OnceCell::new(),
					});
					entries.put(scope.clone(), Arc::clone(&slot));
					slot
				},
			}
		};

		// the lock is released here: a slow load must not stall lookups of
		// other scopes
		let table = slot.table.get_or_init(|| match load() {
			Ok(table) => {
				debug!("loaded rename table for scope {:?}", scope.as_str());
				Arc::new(table)
			},
			Err(e) => {
				warn!("failed to load rename table for scope {:?}, treating it as empty: {e:#}", scope.as_str());
				Arc::new(RenameTable::empty())
			},
		});

		Arc::clone(table)
	}

	pub fn invalidate(&self, scope: &ScopeId) {
		self.entries.lock().pop(scope);
	}

	pub fn invalidate_all(&self) {
		self.entries.lock().clear();
	}
}
