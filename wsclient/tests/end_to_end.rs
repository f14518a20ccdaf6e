//! End-to-end calls against a mock workspace service.
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wsclient::{
    AuthContext, BlockingWorkspaceClient, ClientConfig, RpcErrorKind, ServiceRevision,
    WorkspaceClient, WorkspaceError,
};

#[tokio::test]
async fn legacy_get_object_returns_whole_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "workspaceService.get_object",
            "params": ["obj1", "Genome", "ws1"],
            "version": "1.1",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"result": [{"id": "obj1"}, {"meta": "m"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = WorkspaceClient::new(&ClientConfig::new(server.uri())).unwrap();
    let result = client
        .call_method(
            ServiceRevision::Legacy,
            "get_object",
            vec![json!("obj1"), json!("Genome"), json!("ws1")],
        )
        .await
        .unwrap();

    assert_eq!(result, json!([{"id": "obj1"}, {"meta": "m"}]));
}

#[tokio::test]
async fn single_result_is_unwrapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": [42]})))
        .mount(&server)
        .await;

    let client = WorkspaceClient::new(&ClientConfig::new(server.uri())).unwrap();
    let result = client.has_object(json!({"id": "obj1"})).await.unwrap();
    assert_eq!(result, json!(42));
}

#[tokio::test]
async fn service_error_detail_is_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "not found"})))
        .mount(&server)
        .await;

    let client = WorkspaceClient::new(&ClientConfig::new(server.uri())).unwrap();
    let err = client
        .call_method(
            ServiceRevision::Legacy,
            "delete_workspace",
            vec![json!("ws1")],
        )
        .await
        .unwrap_err();

    let rpc = match err {
        WorkspaceError::Rpc(rpc) => rpc,
        other => panic!("expected an RPC error, got {other:?}"),
    };
    assert_eq!(rpc.kind(), RpcErrorKind::ServiceError);
    assert_eq!(rpc.detail(), Some(&json!("not found")));
}

#[tokio::test]
async fn rotating_token_is_sent_with_each_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "token-0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": ["first"]})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("authorization", "token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": ["second"]})))
        .expect(1)
        .mount(&server)
        .await;

    let counter = Arc::new(AtomicUsize::new(0));
    let supplier_counter = counter.clone();
    let auth = AuthContext::with_supplier(move || {
        Some(format!("token-{}", supplier_counter.fetch_add(1, Ordering::SeqCst)))
    });
    let client = WorkspaceClient::with_auth(&ClientConfig::new(server.uri()), auth).unwrap();

    assert_eq!(client.get_jobs(json!({})).await.unwrap(), json!("first"));
    assert_eq!(client.get_jobs(json!({})).await.unwrap(), json!("second"));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn callbacks_receive_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "workspaceService.list_workspaces"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": [["ws1", "ws2"]]})))
        .mount(&server)
        .await;

    let client = WorkspaceClient::new(&ClientConfig::new(server.uri())).unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel();
    let handle = client
        .call_with_callbacks(
            ServiceRevision::Legacy,
            "list_workspaces",
            vec![],
            move |value| {
                let _ = tx.send(value);
            },
            |e| panic!("unexpected error: {e}"),
        )
        .unwrap();

    assert_eq!(rx.await.unwrap(), json!(["ws1", "ws2"]));
    handle.await.unwrap();
}

#[test]
fn blocking_client_calls_generated_methods() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "method": "workspaceService.get_types",
                "params": [{"auth": "t"}],
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"result": [["Genome", "Model"]]})),
            )
            .expect(1)
            .mount(&server)
            .await;
        server
    });

    let client = BlockingWorkspaceClient::new(&ClientConfig::new(server.uri())).unwrap();
    let types = client.get_types(json!({"auth": "t"})).unwrap();
    assert_eq!(types, json!(["Genome", "Model"]));

    let err = client
        .call_method(ServiceRevision::Current, "get_types", vec![])
        .unwrap_err();
    assert!(matches!(err, WorkspaceError::ArityMismatch { .. }));
}
