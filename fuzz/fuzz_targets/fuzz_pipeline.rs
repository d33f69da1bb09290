// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

#![no_main]

use jsonrpc_courier::Pipeline;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let body = String::from_utf8_lossy(data);
    let flags = data.first().copied().unwrap_or(0);

    let pipeline = Pipeline::builder()
        .skip_next_if(flags & 1 == 1)
        .trim()
        .continue_if(flags & 2 == 0)
        .url_encode()
        .append("\n")
        .build();

    let ctx = pipeline.run(body.as_ref()).unwrap();
    if flags & 2 == 0 {
        assert!(ctx.body().is_some_and(|b| b.ends_with('\n')));
    }
});
