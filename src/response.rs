//! HTTP response representation

use bytes::Bytes;
use hyper::{HeaderMap, StatusCode};

use crate::error::{Error, Result};

/// HTTP response produced by handlers and middleware
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
	/// Indicates whether the middleware chain should stop processing.
	/// When true, no further middleware will reprocess this response.
	stop_chain: bool,
}

impl Response {
	/// Create a new response with the given status code
	///
	/// # Examples
	///
	/// ```
	/// use tzgate::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::new(StatusCode::OK);
	/// assert_eq!(response.status, StatusCode::OK);
	/// assert!(response.body.is_empty());
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
			stop_chain: false,
		}
	}

	/// Create a response with HTTP 200 OK status
	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	/// Create a response with HTTP 401 Unauthorized status
	pub fn unauthorized() -> Self {
		Self::new(StatusCode::UNAUTHORIZED)
	}

	/// Create a response with HTTP 404 Not Found status
	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	/// Create a 200 response carrying an HTML body
	///
	/// # Examples
	///
	/// ```
	/// use tzgate::Response;
	///
	/// let response = Response::html("<h1>hi</h1>").unwrap();
	/// assert_eq!(
	///     response.headers.get("content-type").unwrap(),
	///     "text/html; charset=utf-8"
	/// );
	/// ```
	pub fn html(body: impl Into<Bytes>) -> Result<Self> {
		Self::ok()
			.with_body(body)
			.with_header("content-type", "text/html; charset=utf-8")
	}

	/// Replace the body
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Set a header, replacing any existing value
	pub fn with_header(mut self, name: &'static str, value: &str) -> Result<Self> {
		let value = hyper::header::HeaderValue::from_str(value)
			.map_err(|e| Error::Internal(format!("invalid header value: {}", e)))?;
		self.headers.insert(name, value);
		Ok(self)
	}

	/// Mark whether outer middleware should stop processing this response
	pub fn with_stop_chain(mut self, stop: bool) -> Self {
		self.stop_chain = stop;
		self
	}

	/// Whether the middleware chain should stop processing
	pub fn should_stop_chain(&self) -> bool {
		self.stop_chain
	}
}
