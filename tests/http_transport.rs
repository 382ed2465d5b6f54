use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use ocr_overlay::{
    EngineError, HttpTransport, StaticCredentials, TaskKind, TextService, TextServiceSettings,
};
use serde_json::Value;

#[derive(Clone, Default)]
struct Seen {
    auth: Arc<Mutex<Option<String>>>,
    body: Arc<Mutex<Option<Value>>>,
}

async fn serve(status: StatusCode, reply: &'static str) -> (String, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route(
            "/v1/chat/completions",
            post(
                move |State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|value| value.to_str().ok())
                        .map(str::to_string);
                    *seen.auth.lock().expect("auth lock") = auth;
                    *seen.body.lock().expect("body lock") = Some(body);
                    (status, reply)
                },
            ),
        )
        .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{}/v1", addr), seen)
}

fn service(base_url: &str, key: Option<&str>) -> TextService {
    let settings = TextServiceSettings {
        connect_timeout: Duration::from_secs(2),
        read_timeout: Duration::from_secs(5),
        ..TextServiceSettings::default()
    };
    let transport = HttpTransport::with_base_url(&settings, base_url).expect("transport");
    TextService::new(
        Arc::new(transport),
        Arc::new(StaticCredentials::new(key.map(str::to_string))),
    )
}

#[tokio::test]
async fn posts_chat_completion_with_bearer_auth() {
    let (base_url, seen) = serve(
        StatusCode::OK,
        r#"{"choices":[{"message":{"role":"assistant","content":" 요약입니다. "}}]}"#,
    )
    .await;

    let text = service(&base_url, Some("sk-local"))
        .complete(TaskKind::Summarize, "긴 글", None, Some("ko"))
        .await
        .expect("completion");
    assert_eq!(text, "요약입니다.");

    assert_eq!(
        seen.auth.lock().expect("auth lock").as_deref(),
        Some("Bearer sk-local")
    );
    let body = seen.body.lock().expect("body lock").clone().expect("body");
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["temperature"], 0.2);
    assert_eq!(body["messages"].as_array().map(Vec::len), Some(3));
    assert_eq!(body["messages"][1]["content"], "langHint=ko");
    assert_eq!(body["messages"][2]["content"], "summarize\n긴 글");
}

#[tokio::test]
async fn rate_limit_status_surfaces_as_service_error() {
    let (base_url, _seen) = serve(StatusCode::TOO_MANY_REQUESTS, r#"{"error":"rate limited"}"#).await;

    let err = service(&base_url, Some("sk-local"))
        .complete(TaskKind::Translate, "hello", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Service { status: 429, .. }));
    let message = err.to_string();
    assert!(message.contains("429"));
    assert!(message.contains(r#"{"error":"rate limited"}"#));
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = service(&format!("http://{}/v1", addr), Some("sk-local"))
        .complete(TaskKind::Summarize, "text", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Transport(_)));
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_tolerated() {
    let transport =
        HttpTransport::with_base_url(&TextServiceSettings::default(), "http://localhost:9/v1/")
            .expect("transport");
    assert_eq!(transport.url(), "http://localhost:9/v1/chat/completions");
}

#[tokio::test]
async fn slow_endpoint_times_out_as_transport_error() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            (StatusCode::OK, r#"{"choices":[{"message":{"content":"late"}}]}"#)
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    let settings = TextServiceSettings {
        read_timeout: Duration::from_millis(300),
        ..TextServiceSettings::default()
    };
    let transport = HttpTransport::with_base_url(&settings, &format!("http://{}/v1", addr))
        .expect("transport");
    let service = TextService::new(
        Arc::new(transport),
        Arc::new(StaticCredentials::new(Some("sk-local".to_string()))),
    );

    let started = std::time::Instant::now();
    let err = service
        .complete(TaskKind::Summarize, "text", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Transport(_)));
    assert!(started.elapsed() < Duration::from_secs(4));
}
