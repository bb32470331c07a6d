//! Wire tests for `HttpTransport` against a local axum server

use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use zbx_client::{ClientSession, HttpTransport};
use zbx_core::config::ClientConfig;
use zbx_core::{Instance, RpcTransport, TransportError};
use zbx_protocol::TransportVariant;

/// What the server saw of one request
#[derive(Debug, Clone)]
struct Seen {
    path: String,
    authorization: Option<String>,
    content_type: Option<String>,
    body: Value,
}

/// Canned reply: status plus raw body
type Reply = Arc<dyn Fn(&Value) -> (StatusCode, String) + Send + Sync>;

#[derive(Clone)]
struct MockServer {
    seen: Arc<Mutex<Vec<Seen>>>,
    reply: Reply,
}

async fn handle(
    State(server): State<MockServer>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    server.seen.lock().unwrap().push(Seen {
        path: uri.path().to_string(),
        authorization: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
        body: body.clone(),
    });

    let (status, reply) = (server.reply)(&body);
    (status, [(header::CONTENT_TYPE, "application/json")], reply)
}

/// Start a server answering with `reply`; returns its base URL
async fn serve(
    reply: impl Fn(&Value) -> (StatusCode, String) + Send + Sync + 'static,
) -> (String, Arc<Mutex<Vec<Seen>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let state = MockServer {
        seen: Arc::clone(&seen),
        reply: Arc::new(reply),
    };
    let app = Router::new().fallback(handle).with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), seen)
}

fn ok(result: Value) -> (StatusCode, String) {
    (
        StatusCode::OK,
        json!({ "jsonrpc": "2.0", "result": result, "id": 1 }).to_string(),
    )
}

fn transport() -> HttpTransport {
    HttpTransport::new(&ClientConfig::default()).unwrap()
}

#[tokio::test]
async fn test_legacy_body_carries_auth() {
    let (url, seen) = serve(|_| ok(json!([]))).await;

    transport()
        .invoke(&url, "host.get", json!({}), Some("tok"), TransportVariant::Legacy)
        .await
        .unwrap();

    let seen = seen.lock().unwrap()[0].clone();
    assert_eq!(seen.body["auth"], "tok");
    assert_eq!(seen.body["jsonrpc"], "2.0");
    assert_eq!(seen.body["id"], 1);
    assert_eq!(seen.body["method"], "host.get");
    assert_eq!(seen.authorization, None);
    assert_eq!(seen.content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_legacy_unauthenticated_sends_empty_auth() {
    let (url, seen) = serve(|_| ok(json!([]))).await;

    transport()
        .invoke(&url, "host.get", json!({}), None, TransportVariant::Legacy)
        .await
        .unwrap();

    assert_eq!(seen.lock().unwrap()[0].body["auth"], "");
}

#[tokio::test]
async fn test_header_variant_uses_bearer() {
    let (url, seen) = serve(|_| ok(json!([]))).await;

    transport()
        .invoke(&url, "host.get", json!({}), Some("tok"), TransportVariant::Header)
        .await
        .unwrap();

    let seen = seen.lock().unwrap()[0].clone();
    assert_eq!(seen.authorization.as_deref(), Some("Bearer tok"));
    assert!(seen.body.get("auth").is_none());
}

#[tokio::test]
async fn test_header_variant_without_token_sends_nothing() {
    let (url, seen) = serve(|_| ok(json!("7.0.0"))).await;

    let result = transport()
        .invoke(&url, "apiinfo.version", json!([]), None, TransportVariant::Header)
        .await
        .unwrap();

    assert_eq!(result, json!("7.0.0"));
    let seen = seen.lock().unwrap()[0].clone();
    assert_eq!(seen.authorization, None);
    assert!(seen.body.get("auth").is_none());
}

#[tokio::test]
async fn test_url_normalization() {
    let (url, seen) = serve(|_| ok(json!([]))).await;

    let t = transport();
    t.invoke(&format!("{}/zabbix/", url), "host.get", json!({}), None, TransportVariant::Header)
        .await
        .unwrap();
    t.invoke(
        &format!("{}/api_jsonrpc.php", url),
        "host.get",
        json!({}),
        None,
        TransportVariant::Header,
    )
    .await
    .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].path, "/zabbix/api_jsonrpc.php");
    assert_eq!(seen[1].path, "/api_jsonrpc.php");
}

#[tokio::test]
async fn test_rpc_error_is_typed() {
    let (url, _) = serve(|_| {
        (
            StatusCode::OK,
            json!({
                "jsonrpc": "2.0",
                "error": {
                    "code": -32602,
                    "message": "Invalid params.",
                    "data": "Session terminated, re-login, please."
                },
                "id": 1
            })
            .to_string(),
        )
    })
    .await;

    let err = transport()
        .invoke(&url, "host.get", json!({}), Some("old"), TransportVariant::Legacy)
        .await
        .unwrap_err();

    assert_eq!(err.rpc_code(), Some(-32602));
    match err {
        TransportError::Rpc(e) => {
            assert_eq!(e.data.as_deref(), Some("Session terminated, re-login, please."))
        }
        other => panic!("expected RPC error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_envelope_is_decode_error() {
    let (url, _) = serve(|_| (StatusCode::OK, "<html>oops</html>".to_string())).await;

    let err = transport()
        .invoke(&url, "host.get", json!({}), None, TransportVariant::Header)
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Protocol(_)));
}

#[tokio::test]
async fn test_http_status_without_envelope() {
    let (url, _) =
        serve(|_| (StatusCode::BAD_GATEWAY, "upstream unavailable".to_string())).await;

    let err = transport()
        .invoke(&url, "host.get", json!({}), None, TransportVariant::Header)
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::HttpStatus { status: 502 }));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = transport()
        .invoke(
            &format!("http://{}", addr),
            "host.get",
            json!({}),
            None,
            TransportVariant::Header,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Network(_)));
}

/// A 7.x server that only accepts the bearer header
fn modern_server(body: &Value) -> (StatusCode, String) {
    match body["method"].as_str() {
        Some("apiinfo.version") => ok(json!("7.0.3")),
        Some("user.login") => ok(json!("session-token")),
        Some("user.logout") => ok(json!(true)),
        _ if body.get("auth").is_some() => (
            StatusCode::OK,
            json!({
                "jsonrpc": "2.0",
                "error": { "code": -32602, "message": "Invalid params.", "data": "auth in body" },
                "id": 1
            })
            .to_string(),
        ),
        _ => ok(json!([{ "hostid": "10084", "host": "web01" }])),
    }
}

#[tokio::test]
async fn test_session_end_to_end_modern_server() {
    let (url, seen) = serve(modern_server).await;
    let session = ClientSession::new(
        Instance::with_password("prod", format!("{}/", url), "Admin", "zabbix"),
        Arc::new(transport()),
        Arc::new(ClientConfig::default()),
    );

    let hosts = session.get_hosts(None, Some("web01")).await.unwrap();
    assert_eq!(hosts[0]["host"], "web01");

    session.logout().await.unwrap();

    let seen = seen.lock().unwrap();
    let login = seen
        .iter()
        .find(|s| s.body["method"] == "user.login")
        .unwrap();
    assert_eq!(login.body["params"]["username"], "Admin");
    assert_eq!(login.authorization, None);

    let host_get = seen
        .iter()
        .find(|s| s.body["method"] == "host.get")
        .unwrap();
    assert_eq!(host_get.authorization.as_deref(), Some("Bearer session-token"));
    assert_eq!(host_get.body["params"]["filter"]["host"], "web01");
}
