//! Happy Path Integration Tests
//!
//! Exercises the success path of the negotiation middleware: a request
//! carrying a valid offset cookie reaches the downstream handler under the
//! activated timezone context, and the response carries the bootstrap
//! fragment in front of the handler's body.


use fixtures::{
	OffsetEchoHandler, PublishFilterHandler, assert_header, assert_status, body_string,
	create_request_with_cookie, timezone_middleware,
};
use rstest::rstest;
use std::sync::Arc;
use tzgate::{Handler, Middleware, MiddlewareChain, TimezoneConfig, TimezoneMiddleware};

#[tokio::test]
async fn test_valid_cookie_reaches_handler_with_offset() {
	let middleware = timezone_middleware();
	let handler = OffsetEchoHandler::new();

	let request = create_request_with_cookie("/polls", "tzo=-120");
	let response = middleware.process(request, handler.clone()).await.unwrap();

	assert_status(&response, 200);
	assert_eq!(handler.call_count(), 1);
	assert!(body_string(&response).ends_with("offset=-120"));
}

#[rstest]
#[case(0)]
#[case(60)]
#[case(-60)]
#[case(330)]
#[case(-330)]
#[case(540)]
#[case(-720)]
#[case(840)]
#[case(1440)]
#[case(-1440)]
#[tokio::test]
async fn test_handler_runs_under_cookie_offset(#[case] minutes: i32) {
	let middleware = timezone_middleware();
	let handler = OffsetEchoHandler::new();

	let request = create_request_with_cookie("/polls", &format!("tzo={}", minutes));
	let response = middleware.process(request, handler.clone()).await.unwrap();

	assert_eq!(handler.call_count(), 1);
	let body = body_string(&response);
	assert!(
		body.ends_with(&format!("offset={}", minutes)),
		"offset {} not echoed by handler",
		minutes
	);
}

#[tokio::test]
async fn test_script_prepended_exactly_once() {
	let middleware = timezone_middleware();
	let handler = OffsetEchoHandler::with_payload(";end");

	let request = create_request_with_cookie("/polls", "tzo=90");
	let response = middleware.process(request, handler).await.unwrap();

	let body = body_string(&response);
	assert_eq!(body.matches("<script>").count(), 1);
	assert_eq!(body.matches("<noscript>").count(), 1);
	assert!(body.starts_with("\n<script>"));
	assert!(body.ends_with("offset=90;end"));
}

#[tokio::test]
async fn test_response_body_is_script_then_handler_bytes() {
	let middleware = TimezoneMiddleware::with_defaults();
	let handler = OffsetEchoHandler::new();

	let request = create_request_with_cookie("/polls", "tzo=-120");
	let response = Arc::new(middleware)
		.process(request, handler)
		.await
		.unwrap();

	let script = TimezoneMiddleware::with_defaults().bootstrap_script().to_vec();
	assert_eq!(&response.body[..script.len()], &script[..]);
	assert_eq!(&response.body[script.len()..], b"offset=-120");
}

#[tokio::test]
async fn test_handler_headers_and_status_preserved() {
	struct TeapotHandler;

	#[async_trait::async_trait]
	impl tzgate::Handler for TeapotHandler {
		async fn handle(&self, _request: tzgate::Request) -> tzgate::Result<tzgate::Response> {
			Ok(tzgate::Response::new(hyper::StatusCode::IM_A_TEAPOT)
				.with_body("short and stout")
				.with_header("x-brewed-by", "teapot")?)
		}
	}

	let middleware = timezone_middleware();
	let request = create_request_with_cookie("/brew", "tzo=0");
	let response = middleware
		.process(request, Arc::new(TeapotHandler))
		.await
		.unwrap();

	assert_status(&response, 418);
	assert_header(&response, "x-brewed-by", "teapot");
	assert!(body_string(&response).ends_with("short and stout"));
}

#[tokio::test]
async fn test_idempotent_across_consecutive_requests() {
	let middleware = timezone_middleware();
	let handler = OffsetEchoHandler::new();

	// Same cookie twice: same activated offset each time, no accumulation
	for _ in 0..2 {
		let request = create_request_with_cookie("/polls", "tzo=-345");
		let response = middleware.process(request, handler.clone()).await.unwrap();
		assert!(body_string(&response).ends_with("offset=-345"));
	}
	assert_eq!(handler.call_count(), 2);
}

#[tokio::test]
async fn test_chain_integration() {
	let handler = OffsetEchoHandler::new();
	let chain = MiddlewareChain::new(handler.clone()).with_middleware(timezone_middleware());

	let response = chain
		.handle(create_request_with_cookie("/polls", "tzo=120"))
		.await
		.unwrap();

	assert_eq!(handler.call_count(), 1);
	assert!(body_string(&response).ends_with("offset=120"));
}

#[tokio::test]
async fn test_custom_cookie_name() {
	let config = TimezoneConfig::new("zk").unwrap();
	let middleware = Arc::new(TimezoneMiddleware::new(config).unwrap());
	let handler = OffsetEchoHandler::new();

	let response = middleware
		.process(
			create_request_with_cookie("/polls", "zk=75"),
			handler.clone(),
		)
		.await
		.unwrap();

	assert_eq!(handler.call_count(), 1);
	assert!(body_string(&response).ends_with("offset=75"));

	// The default name no longer matches
	let response = middleware
		.process(
			create_request_with_cookie("/polls", "tzo=75"),
			handler.clone(),
		)
		.await
		.unwrap();
	assert_eq!(handler.call_count(), 1);
	assert!(response.should_stop_chain());
}

#[tokio::test]
async fn test_publish_filtering_runs_under_context() {
	let middleware = timezone_middleware();
	// Two published in the past, one embargoed into the future
	let handler = Arc::new(PublishFilterHandler {
		publish_offsets_minutes: vec![-60, -1, 60],
	});

	let response = middleware
		.process(create_request_with_cookie("/polls", "tzo=-480"), handler)
		.await
		.unwrap();

	assert!(body_string(&response).ends_with("visible=2"));
}
