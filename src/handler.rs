//! Handler and middleware abstractions
//!
//! The interceptor composes with application code through these seams: a
//! [`Handler`] turns a request into a response, a [`Middleware`] wraps a
//! handler, and a [`MiddlewareChain`] folds a stack of middleware over the
//! innermost handler.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::request::Request;
use crate::response::Response;

/// Handler trait for processing requests
///
/// This is the core abstraction; all request handlers implement this.
#[async_trait]
pub trait Handler: Send + Sync {
	async fn handle(&self, request: Request) -> Result<Response>;
}

/// Blanket implementation for `Arc<T>` where T: Handler,
/// allowing `Arc<dyn Handler>` to be used as a Handler.
#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> Result<Response> {
		(**self).handle(request).await
	}
}

/// Middleware trait for request/response processing
///
/// Uses composition instead of inheritance: a middleware receives the
/// request plus the next handler in the chain, and decides whether and how
/// to invoke it.
///
/// # Examples
///
/// ```
/// use tzgate::{Handler, Middleware, Request, Response};
/// use std::sync::Arc;
/// use async_trait::async_trait;
///
/// struct NoopMiddleware;
///
/// #[async_trait]
/// impl Middleware for NoopMiddleware {
///     async fn process(&self, request: Request, next: Arc<dyn Handler>) -> tzgate::Result<Response> {
///         next.handle(request).await
///     }
/// }
/// ```
#[async_trait]
pub trait Middleware: Send + Sync {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response>;

	/// Determines whether this middleware should run for the given request.
	///
	/// Returning false skips the middleware entirely, letting chains avoid
	/// work for requests a middleware does not apply to (e.g. health-check
	/// endpoints that must not be gated behind the cookie handshake).
	fn should_continue(&self, _request: &Request) -> bool {
		true
	}
}

/// Middleware chain, composing multiple middleware around one handler
///
/// # Examples
///
/// ```
/// use tzgate::{Handler, MiddlewareChain, Request, Response};
/// use std::sync::Arc;
///
/// struct AppHandler;
///
/// #[async_trait::async_trait]
/// impl Handler for AppHandler {
///     async fn handle(&self, _request: Request) -> tzgate::Result<Response> {
///         Ok(Response::ok().with_body("app"))
///     }
/// }
///
/// let chain = MiddlewareChain::new(Arc::new(AppHandler));
/// ```
pub struct MiddlewareChain {
	middlewares: Vec<Arc<dyn Middleware>>,
	handler: Arc<dyn Handler>,
}

impl MiddlewareChain {
	/// Create a new chain around the innermost handler
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			middlewares: Vec::new(),
			handler,
		}
	}

	/// Add a middleware, builder style; middleware run in insertion order
	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}

	/// Add a middleware
	pub fn add_middleware(&mut self, middleware: Arc<dyn Middleware>) {
		self.middlewares.push(middleware);
	}
}

#[async_trait]
impl Handler for MiddlewareChain {
	async fn handle(&self, request: Request) -> Result<Response> {
		if self.middlewares.is_empty() {
			return self.handler.handle(request).await;
		}

		// Build the nested handler chain by folding from the innermost
		// handler outwards, skipping middleware whose should_continue
		// declines the request.
		let mut current_handler = self.handler.clone();

		let active_middlewares: Vec<_> = self
			.middlewares
			.iter()
			.rev()
			.filter(|mw| mw.should_continue(&request))
			.collect();

		for middleware in active_middlewares {
			current_handler = Arc::new(ComposedHandler {
				middleware: middleware.clone(),
				next: current_handler,
			});
		}

		current_handler.handle(request).await
	}
}

/// Internal handler composing one middleware with the next handler
struct ComposedHandler {
	middleware: Arc<dyn Middleware>,
	next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for ComposedHandler {
	async fn handle(&self, request: Request) -> Result<Response> {
		let response = self.middleware.process(request, self.next.clone()).await?;

		// Short-circuit: a handshake response must not be reprocessed
		if response.should_stop_chain() {
			return Ok(response);
		}

		Ok(response)
	}
}
