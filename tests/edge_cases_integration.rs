//! Edge Case Integration Tests
//!
//! Malformed cookie values, range boundaries, and odd Cookie headers. Every
//! malformed shape must behave exactly like the no-cookie case: UTC fallback,
//! handshake body, downstream handler not invoked.


use fixtures::{
	OffsetEchoHandler, assert_header, assert_status, body_string, create_request,
	create_request_with_cookie, default_script, timezone_middleware,
};
use rstest::rstest;
use tzgate::Middleware;

#[rstest]
#[case::letters("abc")]
#[case::empty("")]
#[case::bare_minus("-")]
#[case::float("12.5")]
#[case::plus_sign("+60")]
#[case::internal_space(" 60")]
#[case::thousands_sep("1,440")]
#[case::hex("0x10")]
#[case::mixed("6O")]
#[case::exponent("1e3")]
#[case::unicode_digits("٦٠")]
#[tokio::test]
async fn test_malformed_value_equals_no_cookie(#[case] value: &str) {
	let middleware = timezone_middleware();
	let handler = OffsetEchoHandler::new();

	let request = create_request_with_cookie("/polls", &format!("tzo={}", value));
	let response = middleware.process(request, handler.clone()).await.unwrap();

	assert_eq!(
		handler.call_count(),
		0,
		"handler must not run for {:?}",
		value
	);
	assert_status(&response, 200);
	assert_eq!(response.body, default_script());
	assert!(response.should_stop_chain());
}

#[rstest]
#[case("1441")]
#[case("-1441")]
#[case("99999")]
#[case("-99999")]
#[case("2147483648")]
#[case("999999999999999999999999")]
#[tokio::test]
async fn test_out_of_range_treated_as_malformed(#[case] value: &str) {
	// Documented policy: a browser can never produce these, so they get
	// the handshake page rather than a clamped activation
	let middleware = timezone_middleware();
	let handler = OffsetEchoHandler::new();

	let request = create_request_with_cookie("/polls", &format!("tzo={}", value));
	let response = middleware.process(request, handler.clone()).await.unwrap();

	assert_eq!(handler.call_count(), 0);
	assert_eq!(response.body, default_script());
}

#[rstest]
#[case(1440)]
#[case(-1440)]
#[tokio::test]
async fn test_range_endpoints_are_valid(#[case] minutes: i32) {
	let middleware = timezone_middleware();
	let handler = OffsetEchoHandler::new();

	let request = create_request_with_cookie("/polls", &format!("tzo={}", minutes));
	let response = middleware.process(request, handler.clone()).await.unwrap();

	assert_eq!(handler.call_count(), 1);
	assert!(body_string(&response).ends_with(&format!("offset={}", minutes)));
}

#[tokio::test]
async fn test_no_cookie_header_at_all() {
	let middleware = timezone_middleware();
	let handler = OffsetEchoHandler::new();

	let response = middleware
		.process(create_request("/polls"), handler.clone())
		.await
		.unwrap();

	assert_eq!(handler.call_count(), 0);
	assert_status(&response, 200);
	assert_header(&response, "content-type", "text/html; charset=utf-8");
}

#[tokio::test]
async fn test_other_cookies_without_offset_cookie() {
	let middleware = timezone_middleware();
	let handler = OffsetEchoHandler::new();

	let request = create_request_with_cookie("/polls", "sessionid=abc; theme=dark");
	let response = middleware.process(request, handler.clone()).await.unwrap();

	assert_eq!(handler.call_count(), 0);
	assert_eq!(response.body, default_script());
}

#[tokio::test]
async fn test_offset_cookie_found_among_many() {
	let middleware = timezone_middleware();
	let handler = OffsetEchoHandler::new();

	// Whole pairs are trimmed, so padding around a pair is harmless
	let request =
		create_request_with_cookie("/polls", "a=1; sessionid=xyz;  tzo=-30 ; theme=dark");
	let response = middleware.process(request, handler.clone()).await.unwrap();
	assert_eq!(handler.call_count(), 1);
	assert!(body_string(&response).ends_with("offset=-30"));

	// Space after the '=' stays part of the value and makes it malformed
	let request = create_request_with_cookie("/polls", "a=1; tzo= -30; theme=dark");
	let response = middleware.process(request, handler.clone()).await.unwrap();
	assert_eq!(handler.call_count(), 1);
	assert!(response.should_stop_chain());
}

#[tokio::test]
async fn test_prefix_named_cookie_does_not_match() {
	let middleware = timezone_middleware();
	let handler = OffsetEchoHandler::new();

	let request = create_request_with_cookie("/polls", "tzoffset=120");
	let response = middleware.process(request, handler.clone()).await.unwrap();

	assert_eq!(handler.call_count(), 0);
	assert!(response.should_stop_chain());
}

#[tokio::test]
async fn test_empty_handler_body_still_gets_script() {
	struct EmptyHandler;

	#[async_trait::async_trait]
	impl tzgate::Handler for EmptyHandler {
		async fn handle(&self, _request: tzgate::Request) -> tzgate::Result<tzgate::Response> {
			Ok(tzgate::Response::ok())
		}
	}

	let middleware = timezone_middleware();
	let request = create_request_with_cookie("/polls", "tzo=15");
	let response = middleware
		.process(request, std::sync::Arc::new(EmptyHandler))
		.await
		.unwrap();

	assert_eq!(response.body, default_script());
	assert!(!response.should_stop_chain());
}

#[tokio::test]
async fn test_handler_error_propagates() {
	struct FailingHandler;

	#[async_trait::async_trait]
	impl tzgate::Handler for FailingHandler {
		async fn handle(&self, _request: tzgate::Request) -> tzgate::Result<tzgate::Response> {
			Err(tzgate::Error::Internal("database unavailable".to_string()))
		}
	}

	let middleware = timezone_middleware();
	let request = create_request_with_cookie("/polls", "tzo=15");
	let result = middleware
		.process(request, std::sync::Arc::new(FailingHandler))
		.await;

	assert!(result.is_err());
}
