//! Typed access to the offset cookie
//!
//! Replaces duck-typed cookie dictionary access with an explicit
//! parse-and-validate step returning either a valid [`OffsetMinutes`] or a
//! typed failure reason. Parse failures are classification outcomes, not
//! errors: the middleware answers them with the handshake page.

use hyper::header::COOKIE;

use crate::offset::OffsetMinutes;
use crate::request::Request;

/// Why the offset cookie could not be used
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OffsetCookieError {
	/// Cookie absent: the client has not completed the handshake yet
	#[error("offset cookie not present")]
	Missing,

	/// Cookie present but not a base-10 integer
	#[error("offset cookie value {0:?} is not an integer")]
	NotAnInteger(String),

	/// Cookie parsed but the value cannot be a real browser offset
	#[error("offset cookie value {0} is outside [-1440, 1440]")]
	OutOfRange(i64),
}

/// Look up a cookie value by name in the request's Cookie header
///
/// # Examples
///
/// ```
/// use tzgate::{Request, cookie_value};
///
/// let request = Request::builder()
///     .uri("/")
///     .header("cookie", "sessionid=abc; tzo=-120")
///     .build()
///     .unwrap();
///
/// assert_eq!(cookie_value(&request, "tzo"), Some("-120".to_string()));
/// assert_eq!(cookie_value(&request, "other"), None);
/// ```
pub fn cookie_value(request: &Request, name: &str) -> Option<String> {
	let cookie_header = request.headers.get(COOKIE)?;
	let cookie_str = cookie_header.to_str().ok()?;

	for cookie in cookie_str.split(';') {
		let parts: Vec<&str> = cookie.trim().splitn(2, '=').collect();
		if parts.len() == 2 && parts[0] == name {
			return Some(parts[1].to_string());
		}
	}
	None
}

/// Parse and validate the named offset cookie on a request
///
/// The accepted grammar is exactly what the bootstrap script emits: an
/// optional `-` sign followed by ASCII digits. Anything else, including
/// whitespace, a leading `+`, or an out-of-range magnitude, is rejected.
///
/// # Examples
///
/// ```
/// use tzgate::{Request, offset_from_request, OffsetCookieError};
///
/// let request = Request::builder()
///     .uri("/")
///     .header("cookie", "tzo=540")
///     .build()
///     .unwrap();
/// assert_eq!(offset_from_request(&request, "tzo").unwrap().minutes(), 540);
///
/// let request = Request::builder()
///     .uri("/")
///     .header("cookie", "tzo=abc")
///     .build()
///     .unwrap();
/// assert_eq!(
///     offset_from_request(&request, "tzo"),
///     Err(OffsetCookieError::NotAnInteger("abc".to_string()))
/// );
/// ```
pub fn offset_from_request(
	request: &Request,
	name: &str,
) -> Result<OffsetMinutes, OffsetCookieError> {
	let raw = cookie_value(request, name).ok_or(OffsetCookieError::Missing)?;
	parse_offset(&raw)
}

/// Parse a raw cookie value into a validated offset
pub fn parse_offset(raw: &str) -> Result<OffsetMinutes, OffsetCookieError> {
	if raw.is_empty() || raw == "-" {
		return Err(OffsetCookieError::NotAnInteger(raw.to_string()));
	}

	let digits = raw.strip_prefix('-').unwrap_or(raw);
	if !digits.bytes().all(|b| b.is_ascii_digit()) {
		return Err(OffsetCookieError::NotAnInteger(raw.to_string()));
	}

	// i64 parse so absurdly long digit strings still report OutOfRange
	// rather than a spurious integer-parse failure
	let value: i64 = raw
		.parse()
		.map_err(|_| OffsetCookieError::OutOfRange(i64::MAX))?;

	i32::try_from(value)
		.ok()
		.and_then(OffsetMinutes::new)
		.ok_or(OffsetCookieError::OutOfRange(value))
}
