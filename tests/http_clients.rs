// HTTP client tests against mock upstream services

use mockito::Matcher;
use serde_json::json;
use squad_finder::models::{CandidateRecord, InsertOutcome};
use squad_finder::services::{
    ChatCompletionClient, CompletionBackend, CompletionClient, CompletionError, HttpRecordGateway,
    RecordStore, StoreError,
};
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_completion_client_round_trip() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/submit")
        .match_body(Matcher::Json(json!({ "prompt": "hello" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"response": "hi there"}"#)
        .create_async()
        .await;

    let client = CompletionClient::new(format!("{}/submit", server.url()), TIMEOUT).unwrap();
    let answer = client.submit("hello").await.unwrap();

    assert_eq!(answer, "hi there");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_completion_client_non_200_is_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/submit")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let client = CompletionClient::new(format!("{}/submit", server.url()), TIMEOUT).unwrap();
    let err = client.submit("hello").await.unwrap_err();

    assert!(matches!(err, CompletionError::ApiError(500)));
}

#[tokio::test]
async fn test_completion_client_unreachable_is_error() {
    // Nothing listens on port 9 (discard) in the test environment
    let client = CompletionClient::new("http://127.0.0.1:9/submit".to_string(), TIMEOUT).unwrap();
    let err = client.submit("hello").await.unwrap_err();

    assert!(matches!(err, CompletionError::RequestError(_)));
}

#[tokio::test]
async fn test_chat_client_reads_first_choice() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock(
            "POST",
            Matcher::Regex(r"^/deployments/gpt-4-o-mini/chat/completions/".to_string()),
        )
        .match_query(Matcher::UrlEncoded("api-version".into(), "2024-05-01".into()))
        .match_header("api-key", "secret")
        .match_body(Matcher::PartialJson(json!({
            "messages": [{ "role": "user", "content": "ping" }]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"pong"}}]}"#)
        .create_async()
        .await;

    let client = ChatCompletionClient::new(
        server.url(),
        "gpt-4-o-mini".to_string(),
        "2024-05-01".to_string(),
        "secret".to_string(),
        TIMEOUT,
    )
    .unwrap();

    assert_eq!(client.submit("ping").await.unwrap(), "pong");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_chat_client_rejects_empty_choices() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[]}"#)
        .create_async()
        .await;

    let client = ChatCompletionClient::new(
        server.url(),
        "m".to_string(),
        "v".to_string(),
        "k".to_string(),
        TIMEOUT,
    )
    .unwrap();

    assert!(matches!(
        client.submit("ping").await,
        Err(CompletionError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_gateway_insert_statuses() {
    let mut server = mockito::Server::new_async().await;
    let record = CandidateRecord::new("A1", "Gold", "tg:@a");

    let created = server
        .mock("POST", "/insert")
        .match_body(Matcher::Json(json!({ "game_id": "A1", "rank": "Gold", "contact": "tg:@a" })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Insert successful", "inserted_id": "abc123"}"#)
        .expect(1)
        .create_async()
        .await;

    let gateway = HttpRecordGateway::new(server.url(), TIMEOUT).unwrap();
    assert_eq!(
        gateway.insert(&record).await.unwrap(),
        InsertOutcome::Inserted("abc123".to_string())
    );
    created.assert_async().await;
    created.remove_async().await;

    server
        .mock("POST", "/insert")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "game_id already exists, not adding duplicate"}"#)
        .create_async()
        .await;
    assert_eq!(gateway.insert(&record).await.unwrap(), InsertOutcome::AlreadyExists);
}

#[tokio::test]
async fn test_gateway_insert_errors() {
    let mut server = mockito::Server::new_async().await;
    let gateway = HttpRecordGateway::new(server.url(), TIMEOUT).unwrap();
    let record = CandidateRecord::new("A1", "Gold", "tg:@a");

    let invalid = server
        .mock("POST", "/insert")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "Missing fields: contact"}"#)
        .create_async()
        .await;

    match gateway.insert(&record).await {
        Err(StoreError::Validation(message)) => assert_eq!(message, "Missing fields: contact"),
        other => panic!("expected validation error, got {:?}", other),
    }
    invalid.remove_async().await;

    server
        .mock("POST", "/insert")
        .with_status(500)
        .with_body(r#"{"error": "Insert failed"}"#)
        .create_async()
        .await;

    let err = gateway.insert(&record).await.unwrap_err();
    assert_eq!(err.to_string(), "DB insert error, status code 500");
}

#[tokio::test]
async fn test_gateway_query_by_rank() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Regex(r"^/query".to_string()))
        .match_query(Matcher::UrlEncoded("rank".into(), "Gold Nova".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"results": [
                {"game_id": "A1", "rank": "Gold Nova", "contact": "tg:@a"},
                {"game_id": "A2", "rank": "Gold Nova", "contact": "tg:@b"}
            ]}"#,
        )
        .create_async()
        .await;

    let gateway = HttpRecordGateway::new(format!("{}/", server.url()), TIMEOUT).unwrap();
    let found = gateway.query_by_rank("Gold Nova").await.unwrap();

    assert_eq!(
        found,
        vec![
            CandidateRecord::new("A1", "Gold Nova", "tg:@a"),
            CandidateRecord::new("A2", "Gold Nova", "tg:@b"),
        ]
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_gateway_query_failure_is_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", Matcher::Regex(r"^/query".to_string()))
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let gateway = HttpRecordGateway::new(server.url(), TIMEOUT).unwrap();
    assert!(gateway.query_by_rank("Gold").await.is_err());
}

#[tokio::test]
async fn test_gateway_query_rejects_malformed_rows() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", Matcher::Regex(r"^/query".to_string()))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"results": [
                {"game_id": "A1", "rank": "Gold", "contact": "tg:@a"},
                {"game_id": "A2", "rank": "Gold"}
            ]}"#,
        )
        .create_async()
        .await;

    let gateway = HttpRecordGateway::new(server.url(), TIMEOUT).unwrap();
    let err = gateway.query_by_rank("Gold").await.unwrap_err();

    assert!(matches!(err, StoreError::InvalidResponse(_)));
}
