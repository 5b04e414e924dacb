//! Cookie-based timezone negotiation for async HTTP request pipelines
//!
//! The server cannot learn a browser's UTC offset from a request alone, so
//! this crate conducts a small handshake over cookies and injected script:
//! the first response carries a bootstrap script that stores the negated
//! `getTimezoneOffset()` value in a cookie and reloads; every later request
//! is processed under a per-request [`TimezoneContext`] derived from that
//! cookie, and every response re-injects the script so offset drift (DST,
//! travel) heals itself on the next page view.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tzgate::{
//!     Handler, MiddlewareChain, Request, Response, TimezoneContext, TimezoneMiddleware,
//! };
//!
//! struct PollsIndex;
//!
//! #[async_trait::async_trait]
//! impl Handler for PollsIndex {
//!     async fn handle(&self, request: Request) -> tzgate::Result<Response> {
//!         // Wall-clock comparisons run under the client's local time
//!         let ctx = request.extensions().get::<TimezoneContext>().unwrap();
//!         Ok(Response::ok().with_body(ctx.now_local().to_rfc3339()))
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let chain = MiddlewareChain::new(Arc::new(PollsIndex))
//!     .with_middleware(Arc::new(TimezoneMiddleware::with_defaults()));
//!
//! // Cookieless request: handshake page, handler not invoked
//! let request = Request::builder().uri("/polls").build().unwrap();
//! let response = chain.handle(request).await.unwrap();
//! assert!(response.body.starts_with(b"\n<script>"));
//! # });
//! ```

pub mod cookie;
pub mod error;
pub mod extensions;
pub mod handler;
pub mod negotiate;
pub mod offset;
pub mod reload_guard;
pub mod request;
pub mod response;
pub mod script;

pub use cookie::{OffsetCookieError, cookie_value, offset_from_request, parse_offset};
pub use error::{Error, Result};
pub use extensions::Extensions;
pub use handler::{Handler, Middleware, MiddlewareChain};
pub use negotiate::{DEFAULT_COOKIE_NAME, TimezoneConfig, TimezoneMiddleware};
pub use offset::{OffsetMinutes, TimezoneContext};
pub use reload_guard::ReloadGuard;
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use script::{is_cookie_token, is_safe_attribute_suffix, render_bootstrap_script};
