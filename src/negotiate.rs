//! Timezone negotiation middleware
//!
//! Classifies every request by its offset cookie and either completes the
//! request under an activated timezone context or short-circuits with the
//! bootstrap handshake page:
//!
//! - cookie absent or malformed: activate UTC as the safe default, skip the
//!   downstream handler, answer `200 OK` with the bootstrap script so the
//!   browser sets the cookie and reloads;
//! - cookie valid: activate the cookie's offset, run the handler exactly
//!   once, then prepend the bootstrap script to its body so the client
//!   re-checks for drift on every page.
//!
//! There is no terminal state; the classification is re-run per request and
//! the "handshake" is really continuous drift detection.

use async_trait::async_trait;
use bytes::Bytes;
use hyper::header::{CONTENT_LENGTH, HeaderValue};
use std::sync::Arc;
use std::time::Duration;

use crate::cookie::{OffsetCookieError, cookie_value, offset_from_request};
use crate::error::{Error, Result};
use crate::handler::{Handler, Middleware};
use crate::offset::TimezoneContext;
use crate::reload_guard::ReloadGuard;
use crate::request::Request;
use crate::response::Response;
use crate::script::{is_cookie_token, is_safe_attribute_suffix, render_bootstrap_script};

/// Default offset cookie name: short and non-descriptive on purpose
pub const DEFAULT_COOKIE_NAME: &str = "tzo";

/// Body of the terminal error page served when the reload guard trips
const GUARD_TRIPPED_PAGE: &str = "<h1>Cookies or JavaScript disabled</h1>\
<p>This site needs cookies and JavaScript to show times in your timezone. \
Enable both and refresh the page.</p>";

/// Timezone negotiation configuration
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tzgate::TimezoneConfig;
///
/// let config = TimezoneConfig::new("tzo")
///     .unwrap()
///     .with_secure(false)
///     .with_reload_guard(Duration::from_secs(60));
/// assert_eq!(config.cookie_name, "tzo");
/// ```
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct TimezoneConfig {
	/// Offset cookie name (validated, see [`is_cookie_token`])
	pub cookie_name: String,
	/// Cookie path attribute
	pub path: String,
	/// Emit the `Secure` attribute (the cookie is never `HttpOnly`:
	/// the bootstrap script must be able to read it)
	pub secure: bool,
	/// Session cookie used to key the reload guard, when one is enabled
	pub session_cookie_name: String,
	/// TTL for the optional server-side reload guard; `None` (the default)
	/// relies purely on the client-side staleness check
	pub reload_guard_ttl: Option<Duration>,
}

impl TimezoneConfig {
	/// Create a configuration for the given cookie name
	///
	/// # Examples
	///
	/// ```
	/// use tzgate::TimezoneConfig;
	///
	/// assert!(TimezoneConfig::new("tzo").is_ok());
	/// assert!(TimezoneConfig::new("tz o").is_err());
	/// assert!(TimezoneConfig::new("").is_err());
	/// ```
	pub fn new(cookie_name: impl Into<String>) -> Result<Self> {
		let cookie_name = cookie_name.into();
		if !is_cookie_token(&cookie_name) {
			return Err(Error::InvalidCookieName(cookie_name));
		}

		Ok(Self {
			cookie_name,
			path: "/".to_string(),
			secure: true,
			session_cookie_name: "sessionid".to_string(),
			reload_guard_ttl: None,
		})
	}

	/// Set the cookie path attribute
	pub fn with_path(mut self, path: impl Into<String>) -> Self {
		self.path = path.into();
		self
	}

	/// Enable or disable the `Secure` cookie attribute
	pub fn with_secure(mut self, secure: bool) -> Self {
		self.secure = secure;
		self
	}

	/// Set the session cookie name used to key the reload guard
	pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
		self.session_cookie_name = name.into();
		self
	}

	/// Enable the server-side reload guard with the given marker TTL
	pub fn with_reload_guard(mut self, ttl: Duration) -> Self {
		self.reload_guard_ttl = Some(ttl);
		self
	}

	/// The attribute suffix appended to the client-side cookie assignment
	fn attribute_suffix(&self) -> String {
		let mut suffix = format!("; Path={}", self.path);
		if self.secure {
			suffix.push_str("; Secure");
		}
		suffix
	}
}

impl Default for TimezoneConfig {
	fn default() -> Self {
		Self::new(DEFAULT_COOKIE_NAME).unwrap_or_else(|_| unreachable!("default name is a token"))
	}
}

/// Timezone negotiation middleware
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tzgate::{Handler, Middleware, Request, Response, TimezoneConfig, TimezoneMiddleware};
/// use tzgate::TimezoneContext;
///
/// struct EchoOffset;
///
/// #[async_trait::async_trait]
/// impl Handler for EchoOffset {
///     async fn handle(&self, request: Request) -> tzgate::Result<Response> {
///         let ctx = request.extensions().get::<TimezoneContext>().unwrap();
///         Ok(Response::ok().with_body(ctx.offset_minutes().to_string()))
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let middleware = TimezoneMiddleware::new(TimezoneConfig::default()).unwrap();
/// let request = Request::builder()
///     .uri("/polls")
///     .header("cookie", "tzo=-120")
///     .build()
///     .unwrap();
///
/// let response = middleware.process(request, Arc::new(EchoOffset)).await.unwrap();
/// let body = String::from_utf8(response.body.to_vec()).unwrap();
/// assert!(body.ends_with("-120"));
/// # });
/// ```
pub struct TimezoneMiddleware {
	config: TimezoneConfig,
	/// Pre-rendered bootstrap fragment; rendering is deterministic so this
	/// is computed once at construction
	script: Bytes,
	guard: Option<Arc<ReloadGuard>>,
}

impl TimezoneMiddleware {
	/// Create the middleware, validating the script-embedded tokens
	pub fn new(config: TimezoneConfig) -> Result<Self> {
		if !is_cookie_token(&config.cookie_name) {
			return Err(Error::InvalidCookieName(config.cookie_name));
		}
		let suffix = config.attribute_suffix();
		if !is_safe_attribute_suffix(&suffix) {
			return Err(Error::InvalidCookieAttributes(suffix));
		}

		let script = Bytes::from(render_bootstrap_script(&config.cookie_name, &suffix));
		let guard = config
			.reload_guard_ttl
			.map(|ttl| Arc::new(ReloadGuard::new(ttl)));

		Ok(Self {
			config,
			script,
			guard,
		})
	}

	/// Create with the default configuration
	pub fn with_defaults() -> Self {
		Self::new(TimezoneConfig::default())
			.unwrap_or_else(|_| unreachable!("default config is valid"))
	}

	/// The bootstrap fragment this middleware injects
	pub fn bootstrap_script(&self) -> &[u8] {
		&self.script
	}

	/// The reload guard, when one is enabled
	pub fn reload_guard(&self) -> Option<&ReloadGuard> {
		self.guard.as_deref()
	}

	/// Key identifying one client for the reload guard: the session cookie
	/// when present, otherwise the peer IP
	fn client_key(&self, request: &Request) -> Option<String> {
		cookie_value(request, &self.config.session_cookie_name)
			.or_else(|| request.remote_addr.map(|addr| addr.ip().to_string()))
	}

	/// The handshake short-circuit response: bootstrap page, handler not run
	fn handshake_response(&self) -> Result<Response> {
		Ok(Response::html(self.script.clone())?.with_stop_chain(true))
	}

	/// Terminal response when a client keeps arriving cookieless while its
	/// reload marker is still fresh
	fn guard_tripped_response(&self) -> Result<Response> {
		Ok(Response::unauthorized()
			.with_body(GUARD_TRIPPED_PAGE)
			.with_header("content-type", "text/html; charset=utf-8")?
			.with_stop_chain(true))
	}
}

impl Default for TimezoneMiddleware {
	fn default() -> Self {
		Self::with_defaults()
	}
}

#[async_trait]
impl Middleware for TimezoneMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		match offset_from_request(&request, &self.config.cookie_name) {
			Ok(offset) => {
				// A cookie that turned valid ends any guard window
				if let Some(guard) = &self.guard
					&& let Some(key) = self.client_key(&request)
				{
					guard.clear(&key);
				}

				request.extensions().insert(TimezoneContext::new(offset));
				tracing::debug!(offset_minutes = offset.minutes(), "timezone activated");

				let response = next.handle(request).await?;

				// Drift detection runs on every successful response, not
				// just the handshake
				let mut body = Vec::with_capacity(self.script.len() + response.body.len());
				body.extend_from_slice(&self.script);
				body.extend_from_slice(&response.body);
				let mut response = response.with_body(Bytes::from(body));

				// The body just grew; a handler-set length is now stale
				if response.headers.contains_key(CONTENT_LENGTH) {
					response
						.headers
						.insert(CONTENT_LENGTH, HeaderValue::from(response.body.len()));
				}

				Ok(response)
			}
			Err(reason) => {
				if !matches!(reason, OffsetCookieError::Missing) {
					tracing::warn!(%reason, "malformed offset cookie, re-running handshake");
				}

				// Safe default so outer middleware observing the request
				// still see an activated context
				request.extensions().insert(TimezoneContext::utc());

				if let Some(guard) = &self.guard
					&& let Some(key) = self.client_key(&request)
				{
					if guard.is_blocked(&key) {
						tracing::warn!(
							client = %key,
							"handshake already issued within TTL, refusing reload loop"
						);
						return self.guard_tripped_response();
					}
					guard.note_handshake(&key);
				}

				self.handshake_response()
			}
		}
	}
}
