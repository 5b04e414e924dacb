//! Crate-level error type
//!
//! Malformed offset cookies are NOT represented here: they are a recoverable
//! classification branch handled inside the middleware, never an error that
//! crosses the interceptor boundary.

/// Errors that can escape the request pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Cookie name rejected at configuration time
	#[error("Invalid cookie name {0:?}: must be a non-empty RFC 6265 token without `, ' or $")]
	InvalidCookieName(String),

	/// Cookie attribute suffix rejected at configuration time (characters
	/// that could break out of the injected script)
	#[error("Invalid cookie attributes {0:?}")]
	InvalidCookieAttributes(String),

	/// Request construction failed (e.g. unparseable URI)
	#[error("Invalid request: {0}")]
	InvalidRequest(String),

	/// Internal error (e.g. header value construction failed)
	#[error("Internal error: {0}")]
	Internal(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
