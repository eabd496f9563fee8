//! End-to-end response scenarios.
//!
//! Every test builds responses through an explicit [`ResponseBuilder`] so the
//! process settings stay at their defaults in this binary.

use loanhub_errors::config::GENERIC_USER_MSG;
use loanhub_errors::{
    Error, RequestTrace, ResponseBuilder, ResponseError, Severity, Status, Target, View, ViewKind,
    catalog, codes, errs, registry,
};
use serde_json::json;
use std::io;

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn foreign_error_becomes_internal_with_generic_message() {
    let err = io::Error::other("connection reset by peer");

    let (status, quiet) = ResponseBuilder::new(false).build("req-a", "1.00ms", &err, None);
    assert_eq!(status, 500);
    assert_eq!(quiet.code, "INTERNAL_SERVER_ERROR");
    assert_eq!(quiet.reason, GENERIC_USER_MSG);
    assert!(quiet.error_details.is_none());

    let (status, loud) = ResponseBuilder::new(true).build("req-a", "1.00ms", &err, None);
    assert_eq!(status, 500);
    let details = loud.error_details.as_ref();
    assert_eq!(
        details.map(|d| d.error_msg.as_str()),
        Some("connection reset by peer")
    );
    assert!(details.is_some_and(|d| !d.stack_trace.is_empty()));
}

#[test]
fn not_found_prototype_maps_to_404() {
    let catalog = catalog::catalog();
    let err = catalog.not_found().new();

    let (status, body) = ResponseBuilder::new(false).build("req-b", "", &err, None);
    assert_eq!(status, 404);
    assert_eq!(body.code, "NOT_FOUND");
    assert_eq!(body.reason, catalog.not_found().user_msg());
    assert_eq!(body.error, "Not Found");
}

#[test]
fn wrapped_rate_limit_keeps_classification() {
    let err = Error::wrap(catalog::new_too_many_requests(), "throttle investor 5");

    let (status, body) = ResponseBuilder::new(true).build("req-c", "", &err, None);
    assert_eq!(status, 429);
    assert_eq!(body.code, "TOO_MANY_REQUESTS");
    assert_eq!(
        body.error_details.as_ref().map(|d| d.error_msg.as_str()),
        Some("throttle investor 5: too many requests")
    );
    assert_eq!(err.severity(), Severity::Warning);
    assert!(err.is(catalog::catalog().expected()));
}

// ============================================================================
// WIRE SHAPE
// ============================================================================

#[test]
fn quiet_error_body_has_no_diagnostics() {
    let (_, body) = ResponseBuilder::new(false).build("req-d", "0.50ms", &catalog::new_forbidden(), None);
    let wire = serde_json::to_value(&body).ok();
    assert_eq!(
        wire,
        Some(json!({
            "request_id": "req-d",
            "code": "FORBIDDEN",
            "processing_time": "0.50ms",
            "reason": "You do not have the necessary permissions to view this item.",
            "error": "Forbidden"
        }))
    );
}

#[test]
fn diagnostic_body_carries_details() {
    let err = Error::wrap(catalog::new_unprocessable(), "validate tenor");
    let (_, body) = ResponseBuilder::new(true).build("req-e", "", &err, None);
    let wire = serde_json::to_value(&body).unwrap_or_default();

    assert_eq!(
        wire["error_details"]["error_msg"],
        json!("validate tenor: unprocessable entity")
    );
    assert!(wire["error_details"]["stack_trace"].is_array());
    assert!(wire.get("processing_time").is_none());
}

#[test]
fn caller_data_is_returned_even_without_diagnostics() {
    let (_, body) = ResponseBuilder::new(false).build(
        "req-f",
        "",
        &catalog::new_bad_request(),
        Some(json!({"field": "amount"})),
    );
    assert_eq!(body.data, Some(json!({"field": "amount"})));
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

#[test]
fn custom_status_round_trip() {
    let teapot = Status::new("E2E_TEAPOT", Error::new("teapot"))
        .with_http(418)
        .freeze();
    let instance = teapot.new();

    match instance.narrow(ViewKind::Http) {
        Some(View::Http(http)) => assert_eq!(http.http_status_code(), 418),
        other => panic!("expected an HTTP view, got {:?}", other),
    }
    assert!(instance.narrow(ViewKind::Grpc).is_none());
    assert_eq!(
        registry::global().lookup("E2E_TEAPOT").and_then(|s| s.http_code()),
        Some(418)
    );

    let (status, body) = ResponseBuilder::new(false).build("req-g", "", &instance, None);
    assert_eq!(status, 418);
    assert_eq!(body.code, "E2E_TEAPOT");
}

#[test]
fn dual_protocol_status_narrows_both_ways() {
    let unavailable = Status::new("E2E_UNAVAILABLE", Error::new("ledger unavailable"))
        .with_http(503)
        .with_grpc(14)
        .freeze();
    let err = Error::wrap(unavailable.new(), "post repayment");

    assert_eq!(errs::find_http(&err).map(|h| h.http_status_code()), Some(503));
    assert_eq!(errs::find_grpc(&err).map(|g| g.grpc_status_code()), Some(14));
    assert!(err.is(&unavailable));
    assert!(err.is(Target::code("E2E_UNAVAILABLE")));
    assert!(!err.is(Target::code("E2E_TEAPOT")));
}

#[test]
fn wrapped_status_resolves_through_its_cause() {
    let wrapped = catalog::new_not_found().wrap("load borrower 11");
    assert!(wrapped.as_http().is_none());
    assert!(wrapped.is(catalog::catalog().not_found()));

    let (status, body) = ResponseBuilder::new(false).build("req-h", "", &wrapped, None);
    assert_eq!(status, 404);
    assert_eq!(body.code, "NOT_FOUND");

    let rederived = wrapped.rederive();
    assert_eq!(rederived.as_http().map(|h| h.http_status_code()), Some(404));
}

#[test]
fn unclassified_core_error_defaults_to_internal() {
    let err = Error::wrap(Error::new("missing credit score"), "score borrower");
    let (status, body) = ResponseBuilder::new(false).build("req-i", "", &err, None);
    assert_eq!(status, 500);
    assert_eq!(body.code, "INTERNAL_SERVER_ERROR");
}

// ============================================================================
// LEGACY ERRORS
// ============================================================================

#[test]
fn legacy_error_keeps_its_code_through_wrapping() {
    let err = ResponseError::new("no such loan", codes::NOT_FOUND);
    let err = ResponseError::wrap_err(err, Some("approve loan 3"));

    let (status, body) = ResponseBuilder::new(true).build("req-j", "", &err, None);
    assert_eq!(status, 404);
    assert_eq!(body.code, "NOT_FOUND");
    assert_eq!(body.error, "Not Found");
    assert_eq!(
        body.error_details.as_ref().map(|d| d.error_msg.as_str()),
        Some("approve loan 3: no such loan")
    );
}

#[test]
fn legacy_payload_needs_diagnostics() {
    let err = ResponseError::invalid_request_payload(&["amount missing"]);

    let (status, quiet) = ResponseBuilder::new(false).build("req-k", "", &err, None);
    assert_eq!(status, 400);
    assert!(quiet.data.is_none());

    let (_, loud) = ResponseBuilder::new(true).build("req-k", "", &err, None);
    assert_eq!(loud.data, Some(json!(["amount missing"])));
}

#[test]
fn request_trace_feeds_the_builder() {
    let trace = RequestTrace::with_id("req-l");
    let (status, body) = ResponseBuilder::new(false).build_for(&trace, &catalog::new_unauthorized(), None);
    assert_eq!(status, 401);
    assert_eq!(body.request_id, "req-l");
    assert!(body.processing_time.ends_with("ms"));
    assert!(body.log_view().to_string().starts_with("reqID: req-l, code: UNAUTHORIZED"));
}
