// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

#![no_main]

use jsonrpc_courier::{LenientBool, Request, Response};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    // Parsing must fail cleanly, never panic, whatever the server sends.
    if let Ok(response) = Response::<Value>::parse(raw) {
        assert!(response.result().is_none() || response.error().is_none());
    }
    let _ = Response::<LenientBool>::parse(raw);
    let _ = Response::<Vec<Option<i32>>>::parse(raw);

    if let Ok(request) = Request::parse(raw) {
        let reparsed = Request::parse(&request.to_json().unwrap()).unwrap();
        assert_eq!(reparsed.method(), request.method());
        assert_eq!(reparsed.params(), request.params());
    }
});
