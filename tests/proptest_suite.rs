//! Property-based tests for loanhub_errors
//!
//! These tests use proptest to generate random inputs and verify invariants hold.

use loanhub_errors::{
    Error, ResponseBuilder, ResponseError, Status, StatusRegistry, catalog, codes, errs,
};
use proptest::prelude::*;
use std::io;

// ============================================================================
// MESSAGE COMPOSITION PROPERTIES
// ============================================================================

proptest! {
    /// Tag-only errors render their base messages sorted and comma-joined
    #[test]
    fn bases_render_sorted(messages in prop::collection::vec("[a-z]{1,12}", 2..6)) {
        let bases: Vec<_> = messages.iter().map(|m| Error::new(m.clone()).freeze()).collect();
        let err = Error::new("").with_bases(bases);

        let mut expected = messages.clone();
        expected.sort();
        prop_assert_eq!(err.to_string(), expected.join(","));
    }

    /// Every wrap prefixes exactly `msg: ` to the previous rendering
    #[test]
    fn wrap_prefixes_message(
        root in "[a-z ]{1,20}",
        layers in prop::collection::vec("[a-z]{1,10}", 0..5),
    ) {
        let mut err = Error::new(root.clone());
        let mut expected = root;
        for layer in &layers {
            err = Error::wrap(err, layer.clone());
            expected = format!("{}: {}", layer, expected);
        }
        prop_assert_eq!(err.to_string(), expected);
    }

    /// Wrapping never loses the classification of the innermost status
    #[test]
    fn wrap_keeps_prototype_membership(layers in prop::collection::vec("\\PC{0,20}", 1..6)) {
        let catalog = catalog::catalog();
        let mut err = catalog.forbidden().new().into_error();
        for layer in layers {
            err = Error::wrap(err, layer);
        }
        prop_assert!(err.is(catalog.forbidden()));
        prop_assert!(err.is(catalog.http()));
        prop_assert_eq!(
            errs::find_http(&err).map(|h| h.http_status_code()),
            Some(403)
        );
    }
}

// ============================================================================
// REGISTRY PROPERTIES
// ============================================================================

proptest! {
    /// The last registration of a code wins
    #[test]
    fn registry_last_write_wins(
        code in "PROP_[A-Z]{1,8}",
        https in prop::collection::vec(100u16..600, 1..6),
    ) {
        let registry = StatusRegistry::new();
        for http in &https {
            let status = Status::new(code.clone(), Error::new("prop")).with_http(*http);
            registry.register(status.freeze());
        }
        prop_assert_eq!(registry.len(), 1);
        prop_assert_eq!(
            registry.lookup(&code).and_then(|s| s.http_code()),
            https.last().copied()
        );
        prop_assert!(registry.lookup("PROP_NEVER_REGISTERED_1").is_none());
    }
}

// ============================================================================
// RESPONSE BUILDER PROPERTIES
// ============================================================================

proptest! {
    /// Foreign errors always become a 500 with a code, whatever their text
    #[test]
    fn foreign_errors_always_build(msg in "\\PC{0,500}", diagnostics in any::<bool>()) {
        let err = io::Error::other(msg.clone());
        let (status, body) = ResponseBuilder::new(diagnostics).build("req", "", &err, None);

        prop_assert_eq!(status, 500);
        prop_assert!(!body.code.is_empty());
        prop_assert_eq!(body.error_details.is_some(), diagnostics);
        prop_assert_eq!(
            body.error_details_for_log().map(|d| d.error_msg.clone()),
            Some(msg)
        );
    }

    /// Custom statuses project their own HTTP code, or fall back to 500
    #[test]
    fn custom_status_projects_or_falls_back(
        http in prop::option::of(400u16..600),
        msg in "\\PC{0,40}",
    ) {
        let mut status = Status::new("PROP_CUSTOM", Error::new(msg));
        if let Some(http) = http {
            status = status.with_http(http);
        }
        let (code, body) = ResponseBuilder::new(false).build("req", "", &status, None);

        match http {
            Some(http) => {
                prop_assert_eq!(code, http);
                prop_assert_eq!(body.code.as_str(), "PROP_CUSTOM");
            }
            None => {
                prop_assert_eq!(code, 500);
                prop_assert_eq!(body.code.as_str(), "INTERNAL_SERVER_ERROR");
            }
        }
        prop_assert!((400..=599).contains(&code));
    }

    /// Legacy errors keep their code through any number of wraps
    #[test]
    fn legacy_code_survives_wrapping(layers in prop::collection::vec("\\PC{0,20}", 0..5)) {
        let mut err = ResponseError::new("root", codes::UNPROCESSABLE);
        for layer in &layers {
            err = ResponseError::wrap_err(err, Some(layer.as_str()));
        }
        let (status, body) = ResponseBuilder::new(false).build("req", "", &err, None);
        prop_assert_eq!(status, 422);
        prop_assert_eq!(body.code.as_str(), "UNPROCESSABLE");
    }
}

// ============================================================================
// LOG LINE PROPERTIES
// ============================================================================

proptest! {
    /// Log lines stay valid UTF-8 and bounded for arbitrary messages
    #[test]
    fn log_lines_are_bounded(msg in "\\PC{0,5000}", request_id in "\\PC{0,2000}") {
        let err = Error::new(msg);
        let (_, body) = ResponseBuilder::new(false).build(request_id, "", &err, None);

        let mut line = String::new();
        prop_assert!(body.log_view().write_to(&mut line).is_ok());

        // Max: 1024 per field + frames + formatting
        let first = line.lines().next().unwrap_or_default();
        prop_assert!(first.len() < 2 * 1024 + 64);
        prop_assert!(std::str::from_utf8(line.as_bytes()).is_ok());
    }
}
