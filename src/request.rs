//! HTTP request representation
//!
//! A deliberately small request type: enough surface for a middleware chain
//! to classify, annotate, and forward requests. Construction goes through
//! [`RequestBuilder`] so partially-initialized requests cannot exist.

use bytes::Bytes;
use hyper::{HeaderMap, Method, Uri, Version};
use std::net::SocketAddr;

use crate::error::{Error, Result};
use crate::extensions::Extensions;

/// HTTP request flowing through the middleware chain
#[derive(Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	/// Peer address, when known (used as a fallback reload-guard key)
	pub remote_addr: Option<SocketAddr>,
	/// Whether the connection was made over TLS
	pub is_secure: bool,
	extensions: Extensions,
}

impl Request {
	/// Start building a request
	///
	/// # Examples
	///
	/// ```
	/// use tzgate::Request;
	/// use hyper::Method;
	///
	/// let request = Request::builder()
	///     .method(Method::GET)
	///     .uri("/polls")
	///     .build()
	///     .unwrap();
	/// assert_eq!(request.path(), "/polls");
	/// ```
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	/// The request path
	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Per-request type-keyed storage, shared between middleware and handler
	pub fn extensions(&self) -> &Extensions {
		&self.extensions
	}
}

/// Builder for [`Request`]
#[derive(Default)]
pub struct RequestBuilder {
	method: Option<Method>,
	uri: Option<String>,
	version: Option<Version>,
	headers: Option<HeaderMap>,
	body: Option<Bytes>,
	remote_addr: Option<SocketAddr>,
	is_secure: bool,
}

impl RequestBuilder {
	/// Set the HTTP method (defaults to GET)
	pub fn method(mut self, method: Method) -> Self {
		self.method = Some(method);
		self
	}

	/// Set the request URI
	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = Some(uri.into());
		self
	}

	/// Set the HTTP version (defaults to HTTP/1.1)
	pub fn version(mut self, version: Version) -> Self {
		self.version = Some(version);
		self
	}

	/// Set the header map
	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = Some(headers);
		self
	}

	/// Add a single header, keeping any previously set ones
	///
	/// # Examples
	///
	/// ```
	/// use tzgate::Request;
	///
	/// let request = Request::builder()
	///     .uri("/")
	///     .header("cookie", "tzo=-120")
	///     .build()
	///     .unwrap();
	/// assert!(request.headers.contains_key("cookie"));
	/// ```
	pub fn header(mut self, name: &'static str, value: impl AsRef<str>) -> Self {
		let mut headers = self.headers.take().unwrap_or_default();
		if let Ok(value) = hyper::header::HeaderValue::from_str(value.as_ref()) {
			headers.append(name, value);
		}
		self.headers = Some(headers);
		self
	}

	/// Set the request body
	pub fn body(mut self, body: Bytes) -> Self {
		self.body = Some(body);
		self
	}

	/// Set the peer address
	pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
		self.remote_addr = Some(addr);
		self
	}

	/// Mark the request as arriving over TLS
	pub fn secure(mut self, is_secure: bool) -> Self {
		self.is_secure = is_secure;
		self
	}

	/// Build the request, validating the URI
	pub fn build(self) -> Result<Request> {
		let uri: Uri = self
			.uri
			.unwrap_or_else(|| "/".to_string())
			.parse()
			.map_err(|e| Error::InvalidRequest(format!("unparseable URI: {}", e)))?;

		Ok(Request {
			method: self.method.unwrap_or(Method::GET),
			uri,
			version: self.version.unwrap_or(Version::HTTP_11),
			headers: self.headers.unwrap_or_default(),
			body: self.body.unwrap_or_default(),
			remote_addr: self.remote_addr,
			is_secure: self.is_secure,
			extensions: Extensions::new(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_builder_defaults() {
		let request = Request::builder().build().unwrap();

		assert_eq!(request.method, Method::GET);
		assert_eq!(request.path(), "/");
		assert_eq!(request.version, Version::HTTP_11);
		assert!(request.body.is_empty());
		assert!(!request.is_secure);
	}

	#[test]
	fn test_builder_full() {
		let addr: SocketAddr = "127.0.0.1:8000".parse().unwrap();
		let request = Request::builder()
			.method(Method::POST)
			.uri("/polls/3/vote")
			.header("cookie", "tzo=60")
			.body(Bytes::from_static(b"choice=2"))
			.remote_addr(addr)
			.secure(true)
			.build()
			.unwrap();

		assert_eq!(request.method, Method::POST);
		assert_eq!(request.path(), "/polls/3/vote");
		assert_eq!(request.remote_addr, Some(addr));
		assert!(request.is_secure);
	}

	#[test]
	fn test_builder_rejects_bad_uri() {
		let result = Request::builder().uri("http://[broken").build();

		assert!(result.is_err());
	}

	#[test]
	fn test_extensions_travel_with_clones() {
		let request = Request::builder().build().unwrap();
		request.extensions().insert(5i64);

		let cloned = request.clone();
		assert_eq!(cloned.extensions().get::<i64>(), Some(5));
	}
}
