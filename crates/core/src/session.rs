//! Session identifier allocation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

/// Identifiers at or below this value are reserved for legacy sessions.
pub const SESSION_ID_BASE: u64 = 103;

static SHARED: LazyLock<Arc<SessionIdSequence>> =
	LazyLock::new(|| Arc::new(SessionIdSequence::starting_at(SESSION_ID_BASE)));

/// Monotonic session identifier generator.
///
/// Identifiers are never reclaimed, including ones handed out to connection
/// attempts that later failed.
#[derive(Debug)]
pub struct SessionIdSequence {
	last: AtomicU64,
}

impl SessionIdSequence {
	/// Creates a sequence whose first identifier is `base + 1`.
	pub const fn starting_at(base: u64) -> Self {
		Self {
			last: AtomicU64::new(base),
		}
	}

	/// The process-wide sequence.
	pub fn shared() -> Arc<SessionIdSequence> {
		Arc::clone(&SHARED)
	}

	/// Allocates the next identifier.
	///
	/// Returns `None` once `u64::MAX` has been handed out; the sequence never
	/// wraps.
	pub fn next(&self) -> Option<u64> {
		self.last
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| last.checked_add(1))
			.ok()
			.map(|previous| previous + 1)
	}

	/// The most recently allocated identifier, or the base if none yet.
	pub fn last(&self) -> u64 {
		self.last.load(Ordering::SeqCst)
	}
}

impl Default for SessionIdSequence {
	fn default() -> Self {
		Self::starting_at(SESSION_ID_BASE)
	}
}
