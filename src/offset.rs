//! Offset minutes and the per-request timezone context
//!
//! The cookie stores `-(new Date()).getTimezoneOffset()`, i.e. the number of
//! minutes to ADD to UTC to obtain the client's local wall-clock time. The
//! context applies exactly that value; no further negation happens on the
//! server side.

use chrono::{DateTime, FixedOffset, Utc};

/// A validated UTC offset in minutes
///
/// Values outside `[-1440, 1440]` are rejected: no real browser can produce
/// them, so they are treated the same as a non-integer cookie.
///
/// # Examples
///
/// ```
/// use tzgate::OffsetMinutes;
///
/// let offset = OffsetMinutes::new(-120).unwrap();
/// assert_eq!(offset.minutes(), -120);
///
/// assert!(OffsetMinutes::new(99999).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetMinutes(i32);

impl OffsetMinutes {
	/// Smallest accepted offset (UTC-24:00)
	pub const MIN: i32 = -1440;
	/// Largest accepted offset (UTC+24:00)
	pub const MAX: i32 = 1440;

	/// Create a validated offset, rejecting out-of-range values
	pub fn new(minutes: i32) -> Option<Self> {
		if (Self::MIN..=Self::MAX).contains(&minutes) {
			Some(Self(minutes))
		} else {
			None
		}
	}

	/// The UTC offset, in minutes
	pub fn minutes(&self) -> i32 {
		self.0
	}

	/// Convert to a `chrono::FixedOffset` (east-positive)
	///
	/// chrono requires |offset| strictly less than 24 hours, so the two
	/// accepted extremes +/-1440 (never produced by a real browser) map to
	/// +/-1439 minutes.
	pub fn as_fixed_offset(&self) -> FixedOffset {
		let secs = (self.0 * 60).clamp(-86_340, 86_340);
		FixedOffset::east_opt(secs).unwrap_or_else(|| unreachable!("offset validated in range"))
	}
}

impl std::fmt::Display for OffsetMinutes {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Per-request timezone activation value
///
/// Created by the middleware before the downstream handler runs, delivered
/// through request extensions, and discarded with the request. Business logic
/// that compares wall-clock-dependent fields (publish dates, embargo windows)
/// reads local time through this context instead of an ambient global.
///
/// # Examples
///
/// ```
/// use tzgate::{OffsetMinutes, TimezoneContext};
/// use chrono::{TimeZone, Utc};
///
/// let ctx = TimezoneContext::new(OffsetMinutes::new(60).unwrap());
/// let utc = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
/// let local = ctx.localize(utc);
/// assert_eq!(local.to_rfc3339(), "2024-06-01T13:00:00+01:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneContext {
	offset: OffsetMinutes,
}

impl TimezoneContext {
	/// Create a context for the given offset
	pub fn new(offset: OffsetMinutes) -> Self {
		Self { offset }
	}

	/// The safe default context: UTC
	///
	/// # Examples
	///
	/// ```
	/// use tzgate::TimezoneContext;
	///
	/// assert_eq!(TimezoneContext::utc().offset_minutes(), 0);
	/// ```
	pub fn utc() -> Self {
		Self {
			offset: OffsetMinutes(0),
		}
	}

	/// The activated offset
	pub fn offset(&self) -> OffsetMinutes {
		self.offset
	}

	/// The activated offset, in minutes
	pub fn offset_minutes(&self) -> i32 {
		self.offset.minutes()
	}

	/// Convert a UTC instant into the client's local time
	pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
		instant.with_timezone(&self.offset.as_fixed_offset())
	}

	/// The current instant in the client's local time
	pub fn now_local(&self) -> DateTime<FixedOffset> {
		self.localize(Utc::now())
	}
}

impl Default for TimezoneContext {
	fn default() -> Self {
		Self::utc()
	}
}
