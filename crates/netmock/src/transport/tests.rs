//! Tests for registration, dispatch, removal and verification.

use super::*;
use crate::config::TransportConfig;
use crate::error::{ErrorCode, MockError, TransportError};
use crate::message::header_map;
use crate::request::{ExactRequest, IncomingRequest, MockRequest, PatternRequest};
use crate::responder::{ClientSink, MockResponder, ResponderState};
use crate::verifier::{wait_for_condition, ExchangeVerifier};
use http::header::ACCEPT;
use http::{HeaderMap, Method, StatusCode};
use serde_json::json;
use std::sync::{Arc, Weak};
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

fn transport(config: TransportConfig) -> MockTransport {
    MockTransport::with_config(config).unwrap()
}

fn intercepting() -> MockTransport {
    transport(TransportConfig {
        intercepts_all_requests: true,
        ..TransportConfig::default()
    })
}

fn exact(url: &str, status: StatusCode) -> ExactRequest {
    ExactRequest::get(url)
        .unwrap()
        .with_responder(MockResponder::with_status(status))
}

fn slow_chunked(url: &str) -> ExactRequest {
    ExactRequest::get(url).unwrap().with_responder(
        MockResponder::chunked(
            StatusCode::OK,
            HeaderMap::new(),
            "abcde",
            5,
            Duration::from_millis(50),
        )
        .unwrap(),
    )
}

fn get(url: &str) -> IncomingRequest {
    IncomingRequest::get(url).unwrap()
}

fn dispatch(transport: &MockTransport, request: IncomingRequest) -> Arc<ExchangeVerifier> {
    let verifier = Arc::new(ExchangeVerifier::new());
    transport.handle(request, verifier.clone()).unwrap();
    assert!(verifier.wait_for_completion_timeout(WAIT));
    verifier
}

#[test]
fn test_first_registered_match_wins() {
    let transport = intercepting();
    let first = transport.expect(exact("http://h/a", StatusCode::OK)).unwrap();
    let second = transport.expect(exact("http://h/a", StatusCode::INTERNAL_SERVER_ERROR)).unwrap();

    let request = get("http://h/a");
    let id = request.id();
    let verifier = dispatch(&transport, request);
    assert_eq!(verifier.status(), Some(StatusCode::OK));
    assert!(transport.has_serviced(&first));
    assert!(!transport.has_serviced(&second));

    let exchanges = transport.serviced_exchanges();
    assert_eq!(exchanges.len(), 1);
    assert_eq!(exchanges[0].request.id(), id);
}

#[test]
fn test_auto_remove_makes_repeat_unexpected() {
    let transport = transport(TransportConfig {
        intercepts_all_requests: true,
        automatically_removes_serviced_requests: true,
        ..TransportConfig::default()
    });
    let mock = transport.expect(exact("http://h/once", StatusCode::OK)).unwrap();

    dispatch(&transport, get("http://h/once"));
    assert!(transport.expected_requests().is_empty());
    assert!(transport.has_serviced(&mock));

    let verifier = dispatch(&transport, get("http://h/once"));
    let error = verifier.error().unwrap();
    assert!(error.is_code(ErrorCode::UnexpectedRequest));
    assert_eq!(transport.unexpected_requests().len(), 1);
}

#[test]
fn test_without_auto_remove_exact_requests_stay() {
    let transport = intercepting();
    transport.expect(exact("http://h/again", StatusCode::OK)).unwrap();
    dispatch(&transport, get("http://h/again"));
    dispatch(&transport, get("http://h/again"));
    assert_eq!(transport.expected_requests().len(), 1);
    assert_eq!(transport.serviced_exchanges().len(), 2);
    assert_eq!(transport.serviced_requests().len(), 1);
}

#[test]
fn test_unmatched_without_intercept_all_is_declined() {
    let transport = transport(TransportConfig::default());
    transport.expect(exact("http://h/known", StatusCode::OK)).unwrap();

    let unknown = get("http://h/unknown");
    assert!(!transport.should_intercept(&unknown));
    let verifier = Arc::new(ExchangeVerifier::new());
    let result = transport.handle(unknown, verifier.clone());
    assert!(matches!(result, Err(MockError::NotIntercepted(_))));
    assert!(!verifier.is_complete());
    assert!(transport.unexpected_requests().is_empty());

    assert!(transport.should_intercept(&get("http://h/known")));
}

#[test]
fn test_intercept_all_fails_unmatched_synchronously() {
    let transport = intercepting();
    assert!(transport.should_intercept(&get("http://anything/")));

    let verifier = Arc::new(ExchangeVerifier::new());
    let exchange = transport.handle(get("http://anything/"), verifier.clone()).unwrap();
    assert!(!exchange.was_expected());
    assert!(verifier.is_complete());
    assert!(verifier.error().unwrap().is_code(ErrorCode::UnexpectedRequest));
}

#[test]
fn test_disabled_transport_intercepts_nothing() {
    let transport = intercepting();
    transport.expect(exact("http://h/a", StatusCode::OK)).unwrap();
    transport.disable();
    assert!(!transport.is_enabled());
    assert!(!transport.should_intercept(&get("http://h/a")));
    assert!(matches!(
        transport.handle(get("http://h/a"), Arc::new(ExchangeVerifier::new())),
        Err(MockError::NotIntercepted(_))
    ));
    transport.enable();
    assert!(transport.should_intercept(&get("http://h/a")));
}

#[test]
fn test_verification_scenario() {
    let transport = transport(TransportConfig {
        intercepts_all_requests: true,
        verification_enabled: true,
        ..TransportConfig::default()
    });
    let r1 = transport.expect(exact("http://h/never", StatusCode::OK)).unwrap();
    let r2 = transport
        .expect(
            PatternRequest::new("/items/:id", |_, _| {
                Some(MockResponder::with_status(StatusCode::OK))
            })
            .unwrap(),
        )
        .unwrap();

    dispatch(&transport, get("http://h/items/1"));
    dispatch(&transport, get("http://h/items/2"));

    let report = transport.verify().unwrap();
    assert!(!report.is_ok());
    assert!(report.unexpected_requests.is_empty());
    assert_eq!(report.unserviced_requests.len(), 1);
    assert!(Arc::ptr_eq(
        &report.unserviced_requests[0],
        &(r1.clone() as Arc<dyn MockRequest>)
    ));
    assert!(transport.has_serviced(&r2));
    assert_eq!(report.codes(), vec![ErrorCode::UnservicedRequest]);

    let error = report.into_result().unwrap_err();
    assert!(error.has_code(ErrorCode::UnservicedRequest));
    assert!(!error.has_code(ErrorCode::UnexpectedRequest));
    assert!(error.to_string().contains("GET http://h/never"));
}

#[test]
fn test_verification_removes_serviced_exact_requests() {
    let transport = transport(TransportConfig {
        verification_enabled: true,
        ..TransportConfig::default()
    });
    transport.expect(exact("http://h/a", StatusCode::OK)).unwrap();
    dispatch(&transport, get("http://h/a"));
    assert!(transport.expected_requests().is_empty());
    assert!(transport.verify().unwrap().is_ok());
}

#[test]
fn test_verification_reports_both_codes() {
    let transport = transport(TransportConfig {
        intercepts_all_requests: true,
        verification_enabled: true,
        ..TransportConfig::default()
    });
    transport.expect(exact("http://h/expected", StatusCode::OK)).unwrap();
    dispatch(&transport, get("http://h/surprise"));

    let error = transport.verify().unwrap().into_result().unwrap_err();
    assert_eq!(
        error.codes(),
        vec![ErrorCode::UnexpectedRequest, ErrorCode::UnservicedRequest]
    );
    assert_eq!(error.unexpected_requests[0].url().path(), "/surprise");
}

#[test]
fn test_verify_requires_verification_mode() {
    let transport = intercepting();
    assert!(matches!(transport.verify(), Err(MockError::VerificationDisabled)));
    transport.set_verification_enabled(true);
    assert!(transport.verify().unwrap().is_ok());
}

#[test]
fn test_pattern_opt_in_removal() {
    let transport = intercepting();
    transport
        .expect(
            PatternRequest::new("/once/:id", |_, _| {
                Some(MockResponder::with_status(StatusCode::OK))
            })
            .unwrap()
            .removes_after_servicing(true),
        )
        .unwrap();
    dispatch(&transport, get("http://h/once/1"));
    assert!(transport.expected_requests().is_empty());
}

#[test]
fn test_reset_keeps_expectations_and_full_reset_clears_them() {
    let transport = intercepting();
    transport.expect(exact("http://h/a", StatusCode::OK)).unwrap();
    dispatch(&transport, get("http://h/a"));
    dispatch(&transport, get("http://h/b"));

    transport.reset();
    assert!(transport.serviced_exchanges().is_empty());
    assert!(transport.unexpected_requests().is_empty());
    assert_eq!(transport.expected_requests().len(), 1);

    transport.reset_and_disable();
    assert!(transport.expected_requests().is_empty());
    assert!(!transport.is_enabled());

    transport.reset_and_enable();
    assert!(transport.is_enabled());
}

#[test]
fn test_remove_expected_and_clear() {
    let transport = intercepting();
    let a = transport.expect(exact("http://h/a", StatusCode::OK)).unwrap();
    transport.expect(exact("http://h/b", StatusCode::OK)).unwrap();

    assert!(transport.remove_expected(&a));
    assert!(!transport.remove_expected(&a));
    assert_eq!(transport.expected_requests().len(), 1);

    transport.clear_expectations();
    assert!(transport.expected_requests().is_empty());
}

#[test]
fn test_expect_rejects_exact_request_without_responder() {
    let transport = intercepting();
    let bare = ExactRequest::get("http://h/").unwrap();
    assert!(matches!(transport.expect(bare), Err(MockError::InvalidArgument(_))));
    assert!(transport.expected_requests().is_empty());
}

#[test]
fn test_missing_pattern_responder_fails_dispatch() {
    let transport = intercepting();
    transport
        .expect(PatternRequest::new("/broken", |_, _| None::<MockResponder>).unwrap())
        .unwrap();
    let verifier = Arc::new(ExchangeVerifier::new());
    let result = transport.handle(get("http://h/broken"), verifier.clone());
    assert!(matches!(result, Err(MockError::MissingResponder(_))));
    assert!(verifier.error().unwrap().is_code(ErrorCode::MissingResponder));
}

#[test]
fn test_default_headers_apply_to_built_requests() {
    let transport = transport(TransportConfig {
        default_headers: header_map([("Accept", "application/json")]).unwrap(),
        ..TransportConfig::default()
    });
    let request = transport.mock_request(Method::GET, "http://h/a").unwrap();
    assert_eq!(
        crate::message::HttpMessage::header(&request, ACCEPT),
        Some("application/json")
    );
}

#[test]
fn test_json_convenience_round_trip() {
    let transport = intercepting();
    transport
        .expect_post(
            "http://h/users",
            &json!({"name": "Ann"}),
            StatusCode::CREATED,
            &json!({"id": 1, "name": "Ann"}),
        )
        .unwrap();

    let request = IncomingRequest::post("http://h/users")
        .unwrap()
        .with_json_body(&json!({"name": "Ann"}))
        .unwrap();
    let verifier = dispatch(&transport, request);
    assert_eq!(verifier.status(), Some(StatusCode::CREATED));
    assert_eq!(verifier.body_as_json(), Some(json!({"id": 1, "name": "Ann"})));
}

#[test]
fn test_json_error_convenience() {
    let transport = intercepting();
    transport
        .expect_json_error(
            Method::DELETE,
            "http://h/users/1",
            None,
            TransportError::new("net", -1009, "offline"),
        )
        .unwrap();
    let verifier = dispatch(&transport, IncomingRequest::delete("http://h/users/1").unwrap());
    assert_eq!(verifier.error().map(|e| e.code), Some(-1009));
}

#[test]
fn test_exchange_cancel_stops_chunked_delivery() {
    let transport = intercepting();
    transport.expect(slow_chunked("http://h/slow")).unwrap();

    let verifier = Arc::new(ExchangeVerifier::new());
    let sink: Arc<dyn ClientSink> = verifier.clone();
    let exchange = transport.handle(get("http://h/slow"), sink).unwrap();
    assert!(exchange.was_expected());
    assert!(wait_for_condition(WAIT, || !verifier.body().is_empty()));
    assert!(exchange.cancel());
    assert_eq!(exchange.state(), ResponderState::Cancelled);

    assert!(!verifier.wait_for_completion_timeout(Duration::from_millis(300)));
    assert!(!exchange.cancel());
}

#[test]
fn test_cancelling_one_exchange_leaves_a_concurrent_one_running() {
    let transport = intercepting();
    transport.expect(slow_chunked("http://h/shared")).unwrap();

    let first = Arc::new(ExchangeVerifier::new());
    let second = Arc::new(ExchangeVerifier::new());
    let first_exchange = transport.handle(get("http://h/shared"), first.clone()).unwrap();
    let second_exchange = transport.handle(get("http://h/shared"), second.clone()).unwrap();

    assert!(wait_for_condition(WAIT, || !first.body().is_empty()));
    assert!(first_exchange.cancel());
    std::thread::sleep(Duration::from_millis(400));

    assert!(!first.is_complete());
    assert_eq!(first_exchange.state(), ResponderState::Cancelled);
    assert!(second.wait_for_completion_timeout(WAIT));
    assert_eq!(second.body(), "abcde");
    assert_eq!(second_exchange.state(), ResponderState::Completed);
}

#[test]
fn test_predicate_may_call_back_into_transport() {
    let transport = Arc::new(intercepting());
    let weak: Weak<MockTransport> = Arc::downgrade(&transport);
    transport
        .expect(
            PatternRequest::new("/reentrant/:id", |_, _| {
                Some(MockResponder::with_status(StatusCode::OK))
            })
            .unwrap()
            .with_predicate(move |_, _| {
                weak.upgrade()
                    .is_some_and(|transport| transport.expected_requests().len() == 1)
            }),
        )
        .unwrap();

    let request = get("http://h/reentrant/1");
    assert!(transport.should_intercept(&request));
    let verifier = dispatch(&transport, request);
    assert_eq!(verifier.status(), Some(StatusCode::OK));
    assert_eq!(transport.serviced_exchanges().len(), 1);
}

#[test]
fn test_dispose_clears_and_refuses_enable() {
    let transport = intercepting();
    transport.expect(exact("http://h/a", StatusCode::OK)).unwrap();
    transport.dispose();
    assert!(!transport.is_enabled());
    assert!(transport.expected_requests().is_empty());
    transport.enable();
    assert!(!transport.is_enabled());
}

#[test]
#[tracing_test::traced_test]
fn test_unexpected_request_is_logged() {
    let transport = intercepting();
    dispatch(&transport, get("http://h/nope"));
    assert!(logs_contain("Unexpected request: GET http://h/nope"));
}
