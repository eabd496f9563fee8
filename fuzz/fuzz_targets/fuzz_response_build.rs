#![no_main]

use libfuzzer_sys::fuzz_target;
use loanhub_errors::{Error, ResponseBuilder, ResponseError, Status, codes};

// Arbitrary messages, codes and HTTP numbers must never make response
// building panic, and the status must stay an error status.
fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let text = String::from_utf8_lossy(rest).into_owned();
    let diagnostics = selector & 1 == 1;
    let builder = ResponseBuilder::new(diagnostics);

    let (status, body) = match selector % 4 {
        0 => builder.build(text.clone(), "", &Error::new(text), None),
        1 => {
            let http = 400 + u16::from(selector) % 200;
            let err = Status::new("FUZZ_STATUS", Error::new(text)).with_http(http);
            builder.build("fuzz", "", &err, None)
        }
        2 => builder.build("fuzz", "", &ResponseError::new(text, codes::BAD_REQUEST), None),
        _ => builder.build("fuzz", "", &std::io::Error::other(text), None),
    };

    assert!((400..=599).contains(&status));
    assert!(!body.code.is_empty());
    assert_eq!(body.error_details.is_some(), diagnostics);

    let mut line = String::new();
    let _ = body.log_view().write_to(&mut line);
});
