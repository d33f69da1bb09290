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

mod common;

use std::sync::Arc;
use std::time::Duration;

use jsonrpc_courier::{
    Arg, CallListener, ErrorRegistry, InterfaceDescriptor, MethodDescriptor, Pipeline, Request,
    RpcError,
};
use mockito::{Matcher, Server};
use serde_json::{json, Value};
use tokio::sync::mpsc;

use common::{client_for, client_with};

#[derive(Debug, thiserror::Error)]
#[error("custom: {0}")]
struct CustomError(String);

impl From<String> for CustomError {
    fn from(message: String) -> Self {
        CustomError(message)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("interface: {0}")]
struct InterfaceError(String);

impl From<String> for InterfaceError {
    fn from(message: String) -> Self {
        InterfaceError(message)
    }
}

fn result_body(result: Value) -> String {
    json!({"jsonrpc": "2.0", "result": result, "id": 2}).to_string()
}

fn error_body(code: i32, message: &str) -> String {
    json!({"jsonrpc": "2.0", "error": {"code": code, "message": message}, "id": 2}).to_string()
}

#[tokio::test]
async fn test_sum_returns_typed_result() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_header("content-type", "application/json")
        .match_header("accept", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "method": "sum",
            "params": [5, 4],
            "jsonrpc": "2.0"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc":"2.0","result":9,"id":2}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let sum = client
        .call_i32("sum", vec![Arg::from(5), Arg::from(4)])
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(sum, Some(9));
}

#[tokio::test]
async fn test_named_arguments_sent_as_object() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "method": "transfer",
            "params": {"from": "alice", "amount": 10}
        })))
        .with_body(result_body(json!("ok")))
        .create_async()
        .await;

    let client = client_for(&server.url());
    let result = client
        .call_string(
            "transfer",
            vec![Arg::named("from", "alice"), Arg::named("amount", 10)],
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.as_deref(), Some("ok"));
}

#[tokio::test]
async fn test_no_arguments_omits_params() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::Regex(r#"^\{"method":"ping","jsonrpc":"2\.0","id":\d+\}$"#.to_string()))
        .with_body(result_body(json!(true)))
        .create_async()
        .await;

    let client = client_for(&server.url());
    assert_eq!(client.call_bool("ping", Vec::new()).await.unwrap(), Some(true));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_reserved_code_ignores_custom_mapping() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_body(error_body(-32601, "Method not found"))
        .create_async()
        .await;

    let client = client_for(&server.url())
        .with_errors(ErrorRegistry::new().with::<CustomError>(-32601));
    let err = client.call_i32("missing", Vec::new()).await.unwrap_err();

    match err {
        RpcError::JsonRpc(obj) => {
            assert_eq!(obj.code, -32601);
            assert_eq!(obj.message, "Method not found");
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn test_custom_code_without_mapping_is_domain_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_body(error_body(-6, "Domain error"))
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = client.call_i32("withdraw", Vec::new()).await.unwrap_err();

    assert!(matches!(err, RpcError::Domain(ref obj) if obj.code == -6));
    assert_eq!(err.code(), Some(-6));
}

#[tokio::test]
async fn test_custom_code_with_mapping() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_body(error_body(-6, "Domain error"))
        .create_async()
        .await;

    let mut client = client_for(&server.url());
    client.errors_mut().register::<CustomError>(-6);
    let err = client.call_i32("withdraw", Vec::new()).await.unwrap_err();

    let custom = err.mapped_ref::<CustomError>().expect("mapped error");
    assert_eq!(custom.0, "Domain error");
    assert_eq!(err.to_string(), "custom: Domain error");
}

#[tokio::test]
async fn test_null_result_is_none() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_body(result_body(Value::Null))
        .create_async()
        .await;

    let client = client_for(&server.url());
    assert_eq!(client.call_string("lookup", Vec::new()).await.unwrap(), None);
    assert_eq!(client.call_i32_array("lookup", Vec::new()).await.unwrap(), None);
}

#[tokio::test]
async fn test_response_without_result_or_error_is_protocol_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_body(r#"{"jsonrpc":"2.0","id":2}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = client.call_i32("sum", Vec::new()).await.unwrap_err();
    assert!(matches!(err, RpcError::Protocol(_)), "{:?}", err);
}

#[tokio::test]
async fn test_boolean_coercion() {
    let mut server = Server::new_async().await;
    let client = client_for(&server.url());

    for (literal, expected) in [
        (json!(1), true),
        (json!("TRUE"), true),
        (json!(0), false),
        (json!("false"), false),
    ] {
        let mock = server
            .mock("POST", "/")
            .with_body(result_body(literal.clone()))
            .create_async()
            .await;
        assert_eq!(
            client.call_bool("flag", Vec::new()).await.unwrap(),
            Some(expected),
            "{}",
            literal
        );
        mock.remove_async().await;
    }

    server
        .mock("POST", "/")
        .with_body(result_body(json!("test")))
        .create_async()
        .await;
    match client.call_bool("flag", Vec::new()).await.unwrap_err() {
        RpcError::Decode { literal, .. } => assert_eq!(literal, "\"test\""),
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn test_generic_boolean_targets_are_lenient() {
    let mut server = Server::new_async().await;
    let client = client_for(&server.url());

    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"method": "feature.enabled", "params": ["beta"]})))
        .with_body(result_body(json!("TRUE")))
        .create_async()
        .await;
    let features = client
        .proxy_for(
            InterfaceDescriptor::new("Features")
                .remote()
                .method(MethodDescriptor::new("enabled").remote_name("feature.enabled")),
        )
        .unwrap();
    assert_eq!(
        features.invoke::<bool>("enabled", vec![json!("beta")]).await.unwrap(),
        Some(true)
    );
    mock.assert_async().await;
    mock.remove_async().await;

    let mock = server
        .mock("POST", "/")
        .with_body(result_body(json!(0)))
        .create_async()
        .await;
    assert_eq!(client.call::<bool>("flag", Vec::new()).await.unwrap(), Some(false));
    mock.remove_async().await;

    server
        .mock("POST", "/")
        .with_body(result_body(json!(["false", 1])))
        .create_async()
        .await;
    assert_eq!(
        client.call::<Vec<bool>>("flags", Vec::new()).await.unwrap(),
        Some(vec![false, true])
    );
}

#[tokio::test]
async fn test_array_results_are_unboxed() {
    let mut server = Server::new_async().await;
    let client = client_for(&server.url());

    let mock = server
        .mock("POST", "/")
        .with_body(result_body(json!([1.5, 2.0, -3.25])))
        .create_async()
        .await;
    assert_eq!(
        client.call_f64_array("samples", Vec::new()).await.unwrap(),
        Some(vec![1.5, 2.0, -3.25])
    );
    mock.remove_async().await;

    let mock = server
        .mock("POST", "/")
        .with_body(result_body(json!([1, "0", true])))
        .create_async()
        .await;
    assert_eq!(
        client.call_bool_array("flags", Vec::new()).await.unwrap(),
        Some(vec![true, false, true])
    );
    mock.remove_async().await;

    server
        .mock("POST", "/")
        .with_body(result_body(json!([1, null, 3])))
        .create_async()
        .await;
    let err = client.call_i32_array("ids", Vec::new()).await.unwrap_err();
    assert!(matches!(err, RpcError::Decode { .. }), "{:?}", err);
}

#[tokio::test]
async fn test_void_call_discards_any_result() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .with_body(result_body(json!({})))
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url());
    client.call_void("reset", Vec::new()).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_status_body_is_still_parsed() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(500)
        .with_body(error_body(-32603, "Internal error"))
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = client.call_i32("sum", Vec::new()).await.unwrap_err();
    assert_eq!(err.code(), Some(-32603));
}

#[tokio::test]
async fn test_pipeline_headers_and_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_header("x-api-key", "secret")
        .match_header("accept", "application/json-rpc")
        .match_body(Matcher::Regex(r#"^payload=\{"method":"echo""#.to_string()))
        .with_body(result_body(json!("pong")))
        .create_async()
        .await;

    let pipeline = Pipeline::builder()
        .header("X-Api-Key", "secret")
        .header("Accept", "application/json-rpc")
        .prepend("payload=")
        .build();
    let client = client_with(&server.url(), 0, Duration::from_secs(5), pipeline);

    let result = client.call_string("echo", vec![Arg::from("ping")]).await.unwrap();
    mock.assert_async().await;
    assert_eq!(result.as_deref(), Some("pong"));
}

#[tokio::test]
async fn test_proxy_interface_errors_take_precedence() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "method": "accounts.withdraw",
            "params": {"account": "A-1", "amount": 50}
        })))
        .with_body(error_body(-6, "Insufficient funds"))
        .create_async()
        .await;

    let client = client_for(&server.url())
        .with_errors(ErrorRegistry::new().with::<CustomError>(-6));
    let accounts = client
        .proxy_for(
            InterfaceDescriptor::new("Accounts")
                .remote()
                .method(
                    MethodDescriptor::new("withdraw")
                        .remote_name("accounts.withdraw")
                        .named_params(["account", "amount"]),
                )
                .error::<InterfaceError>(-6),
        )
        .unwrap();

    let err = accounts
        .invoke::<f64>("withdraw", vec![json!("A-1"), json!(50)])
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(err.mapped_ref::<CustomError>().is_none());
    assert_eq!(
        err.mapped_ref::<InterfaceError>().map(|e| e.0.as_str()),
        Some("Insufficient funds")
    );
}

enum Outcome {
    Success(String, Value),
    Failure(String, Option<i32>),
}

struct ChannelListener(mpsc::UnboundedSender<Outcome>);

impl CallListener for ChannelListener {
    fn on_success(&self, request: &Request, result: &Value) {
        let _ = self
            .0
            .send(Outcome::Success(request.method().to_string(), result.clone()));
    }

    fn on_failure(&self, request: &Request, error: &RpcError) {
        let _ = self
            .0
            .send(Outcome::Failure(request.method().to_string(), error.code()));
    }
}

#[tokio::test]
async fn test_notify_call_reports_to_listeners() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"method": "sum"})))
        .with_body(result_body(json!(9)))
        .create_async()
        .await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"method": "fail"})))
        .with_body(error_body(-6, "Domain error"))
        .create_async()
        .await;

    let client = client_for(&server.url());
    let (tx, mut rx) = mpsc::unbounded_channel();
    client.add_listener(Arc::new(ChannelListener(tx)));

    let handle = client
        .notify_call("sum", vec![Arg::from(5), Arg::from(4)])
        .unwrap();
    match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap() {
        Some(Outcome::Success(method, result)) => {
            assert_eq!(method, "sum");
            assert_eq!(result, json!(9));
        }
        _ => panic!("expected success"),
    }
    assert_eq!(handle.state(), jsonrpc_courier::CallState::Complete);

    client.notify_call("fail", Vec::new()).unwrap();
    match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap() {
        Some(Outcome::Failure(method, code)) => {
            assert_eq!(method, "fail");
            assert_eq!(code, Some(-6));
        }
        _ => panic!("expected failure"),
    }
}
