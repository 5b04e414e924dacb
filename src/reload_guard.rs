//! Server-side reload guard
//!
//! Optional defense-in-depth against handshake reload loops. The shipped
//! loop-prevention mechanism is the client-side staleness check in the
//! bootstrap script; this store additionally remembers, per client, that a
//! handshake reload was already requested. A client that comes back still
//! cookieless while its marker is fresh gets a terminal error page instead
//! of another reload cycle.
//!
//! Markers expire after the configured TTL and the store evicts lazily, so
//! memory stays bounded without a background task.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

/// Per-client handshake markers with a TTL
#[derive(Debug)]
pub struct ReloadGuard {
	markers: RwLock<HashMap<String, SystemTime>>,
	ttl: Duration,
	/// Maximum number of markers before lazy eviction runs
	max_markers_before_cleanup: AtomicUsize,
}

impl ReloadGuard {
	/// Default marker lifetime, matching the one-minute window the
	/// session-based variant of this design used
	pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

	const DEFAULT_CLEANUP_THRESHOLD: usize = 10_000;

	/// Create a guard with the given marker TTL
	///
	/// # Examples
	///
	/// ```
	/// use std::time::Duration;
	/// use tzgate::ReloadGuard;
	///
	/// let guard = ReloadGuard::new(Duration::from_secs(60));
	/// assert!(!guard.is_blocked("client-1"));
	/// ```
	pub fn new(ttl: Duration) -> Self {
		Self {
			markers: RwLock::new(HashMap::new()),
			ttl,
			max_markers_before_cleanup: AtomicUsize::new(Self::DEFAULT_CLEANUP_THRESHOLD),
		}
	}

	/// Record that a handshake reload was just issued to this client
	pub fn note_handshake(&self, client_key: &str) {
		// Saturate on absurd TTLs instead of overflowing SystemTime
		let now = SystemTime::now();
		let expires_at = now
			.checked_add(self.ttl)
			.unwrap_or(now + Duration::from_secs(u32::MAX as u64));

		let mut markers = self.markers.write().unwrap_or_else(|e| e.into_inner());
		markers.insert(client_key.to_string(), expires_at);

		// Lazy eviction keeps the map bounded
		let threshold = self.max_markers_before_cleanup.load(Ordering::Relaxed);
		if markers.len() > threshold {
			let now = SystemTime::now();
			markers.retain(|_, expires_at| *expires_at > now);
		}
	}

	/// Whether this client was already asked to reload within the TTL
	pub fn is_blocked(&self, client_key: &str) -> bool {
		let markers = self.markers.read().unwrap_or_else(|e| e.into_inner());
		markers
			.get(client_key)
			.is_some_and(|expires_at| *expires_at > SystemTime::now())
	}

	/// Drop the marker for a client (called once its cookie turns valid)
	pub fn clear(&self, client_key: &str) {
		let mut markers = self.markers.write().unwrap_or_else(|e| e.into_inner());
		markers.remove(client_key);
	}

	/// Remove all expired markers
	pub fn cleanup(&self) {
		let mut markers = self.markers.write().unwrap_or_else(|e| e.into_inner());
		let now = SystemTime::now();
		markers.retain(|_, expires_at| *expires_at > now);
	}

	/// Number of live markers (expired ones may still be counted until
	/// the next cleanup)
	pub fn len(&self) -> usize {
		let markers = self.markers.read().unwrap_or_else(|e| e.into_inner());
		markers.len()
	}

	/// Whether the store holds no markers
	pub fn is_empty(&self) -> bool {
		let markers = self.markers.read().unwrap_or_else(|e| e.into_inner());
		markers.is_empty()
	}
}

impl Default for ReloadGuard {
	fn default() -> Self {
		Self::new(Self::DEFAULT_TTL)
	}
}
