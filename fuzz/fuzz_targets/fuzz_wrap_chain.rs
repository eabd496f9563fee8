#![no_main]

use libfuzzer_sys::fuzz_target;
use loanhub_errors::{Error, catalog, errs};

// Every wrap keeps the catalog classification and prefixes its message.
fuzz_target!(|layers: Vec<String>| {
    let catalog = catalog::catalog();
    let mut err = catalog.unprocessable().new().into_error();

    for layer in layers.into_iter().take(64) {
        let before = err.to_string();
        err = Error::wrap(err, layer.clone());
        if !layer.is_empty() {
            assert_eq!(err.to_string(), format!("{}: {}", layer, before));
        }
    }

    assert!(err.is(catalog.unprocessable()));
    assert_eq!(errs::find_http(&err).map(|h| h.http_status_code()), Some(422));
});
