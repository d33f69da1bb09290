// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Resets the process-wide id sequence. Kept to a single test in its own
//! binary so nothing else draws ids across the reset.

use jsonrpc_courier::{IdGenerator, Request};

#[test]
fn test_reset_restarts_request_ids() {
    let before = Request::new("ping", None);
    let _ = Request::new("ping", None);
    assert!(IdGenerator::peek() > before.id());

    IdGenerator::reset();
    assert_eq!(IdGenerator::peek(), 1);

    let first = Request::new("ping", None);
    let second = Request::new("ping", None);
    assert_eq!(first.id(), 1);
    assert_eq!(second.id(), 2);
    assert_eq!(
        first.to_json().unwrap(),
        r#"{"method":"ping","jsonrpc":"2.0","id":1}"#
    );
}
