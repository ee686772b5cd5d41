// Integration tests for the /api/voice client
//
// Each test serves a fake query endpoint with axum on an ephemeral port.

use anyhow::Result;
use axum::{http::StatusCode, routing::post, Json, Router};
use itshop_voice::recognition::{event_channel, RecognitionConfig};
use itshop_voice::{
    HttpQueryClient, Phase, QueryError, QueryService, StartOutcome, StatusMessages,
    TextRecognizer, ToggleOutcome, VoiceQueryRequest, VoiceQueryResponse, VoiceSession,
    VoiceSessionController,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

async fn serve(router: Router) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{}/api/voice", addr))
}

/// Endpoint that answers every question about the catalogue
fn catalogue() -> Router {
    Router::new().route(
        "/api/voice",
        post(|Json(req): Json<VoiceQueryRequest>| async move {
            Json(json!({
                "transcript": req.text,
                "answer": "มี SSD 3 รุ่น",
                "matches": [
                    {"sku": "SSD-001", "name": "Samsung 980 1TB"},
                    {"sku": "SSD-002", "name": "WD SN770 1TB"},
                    {"sku": "SSD-003", "name": "Kingston NV2 1TB"}
                ]
            }))
        }),
    )
}

#[tokio::test]
async fn test_answer_with_matches() -> Result<()> {
    let endpoint = serve(catalogue()).await?;
    let client = HttpQueryClient::new(endpoint.clone(), Duration::from_secs(5))?;
    assert_eq!(client.endpoint(), endpoint);

    let response = client.ask("มีสินค้าอะไรบ้าง").await?;

    assert_eq!(response.transcript.as_deref(), Some("มีสินค้าอะไรบ้าง"));
    assert_eq!(response.answer.as_deref(), Some("มี SSD 3 รุ่น"));
    assert_eq!(response.error, None);
    let matches = response.matches.expect("matches returned");
    assert_eq!(matches.len(), 3);
    assert_eq!(matches[0]["sku"], "SSD-001");
    assert_eq!(matches[2]["sku"], "SSD-003");

    Ok(())
}

#[tokio::test]
async fn test_error_field_on_server_error_is_a_response() -> Result<()> {
    let router = Router::new().route(
        "/api/voice",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "database unavailable" })),
            )
        }),
    );
    let endpoint = serve(router).await?;
    let client = HttpQueryClient::new(endpoint, Duration::from_secs(5))?;

    let response = client.ask("มี SSD ไหม").await?;

    assert_eq!(
        response,
        VoiceQueryResponse {
            error: Some("database unavailable".to_string()),
            ..VoiceQueryResponse::default()
        }
    );

    Ok(())
}

#[tokio::test]
async fn test_non_json_error_status() -> Result<()> {
    let router = Router::new().route(
        "/api/voice",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let endpoint = serve(router).await?;
    let client = HttpQueryClient::new(endpoint, Duration::from_secs(5))?;

    let outcome = client.ask("มี SSD ไหม").await;

    assert!(matches!(outcome, Err(QueryError::Status(502))), "got {:?}", outcome);
    Ok(())
}

#[tokio::test]
async fn test_malformed_success_body() -> Result<()> {
    let router = Router::new().route("/api/voice", post(|| async { "not json" }));
    let endpoint = serve(router).await?;
    let client = HttpQueryClient::new(endpoint, Duration::from_secs(5))?;

    let outcome = client.ask("มี SSD ไหม").await;

    assert!(
        matches!(outcome, Err(QueryError::MalformedResponse(_))),
        "got {:?}",
        outcome
    );
    Ok(())
}

#[tokio::test]
async fn test_slow_endpoint_times_out() -> Result<()> {
    let router = Router::new().route(
        "/api/voice",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "answer": "too late" }))
        }),
    );
    let endpoint = serve(router).await?;
    let client = HttpQueryClient::new(endpoint, Duration::from_millis(200))?;

    match client.ask("มี SSD ไหม").await {
        Err(QueryError::Transport(e)) => assert!(e.is_timeout(), "unexpected error: {}", e),
        other => panic!("expected a timeout, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_unreachable_endpoint() -> Result<()> {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let client = HttpQueryClient::new(format!("http://{}/api/voice", addr), Duration::from_secs(2))?;

    assert!(matches!(
        client.ask("มี SSD ไหม").await,
        Err(QueryError::Transport(_))
    ));
    Ok(())
}

#[test]
fn test_response_fields_are_optional() {
    let empty: VoiceQueryResponse = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, VoiceQueryResponse::default());

    let serialized = serde_json::to_string(&VoiceQueryResponse {
        answer: Some("มี".to_string()),
        ..VoiceQueryResponse::default()
    })
    .unwrap();
    assert_eq!(serialized, r#"{"answer":"มี"}"#);
}

#[tokio::test]
async fn test_full_turn_over_http() -> Result<()> {
    let endpoint = serve(catalogue()).await?;
    let client = HttpQueryClient::new(endpoint, Duration::from_secs(5))?;

    let (events_tx, events_rx) = event_channel();
    let (recognizer, feeder) = TextRecognizer::new(RecognitionConfig::default(), events_tx);
    let controller =
        VoiceSessionController::new(Some(Box::new(recognizer)), StatusMessages::default());
    let (session, handle) =
        VoiceSession::new(controller, Arc::new(client), Duration::from_secs(5), events_rx);
    session.spawn();

    assert_eq!(handle.toggle().await?, ToggleOutcome::Start(StartOutcome::Started));
    feeder.say("มีสินค้าอะไรบ้าง")?;

    let done = tokio::time::timeout(
        Duration::from_secs(5),
        handle.wait_for(|s| s.turn_settled(1)),
    )
    .await??;

    assert_eq!(done.phase, Phase::Ready);
    assert_eq!(done.status, "พร้อมรับคำสั่งใหม่");
    assert_eq!(done.result.answer.as_deref(), Some("มี SSD 3 รุ่น"));
    assert_eq!(done.result.matches.map(|m| m.len()), Some(3));

    handle.shutdown().await;
    Ok(())
}
