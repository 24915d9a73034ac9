//! Query relay: webhook passthrough, identity enrichment, and the
//! always-displayable fallback answer.

mod common;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use fabric_gateway::session::{SessionData, SESSION_COOKIE};
use fabric_gateway::webhook::FALLBACK_ANSWER;

/// Webhook mock that records the last payload it received.
fn recording_webhook(seen: Arc<Mutex<Option<Value>>>, answer: Value) -> Router {
    Router::new().route(
        "/",
        post(move |Json(payload): Json<Value>| {
            let seen = seen.clone();
            let answer = answer.clone();
            async move {
                *seen.lock().unwrap() = Some(payload);
                Json(answer)
            }
        }),
    )
}

#[tokio::test]
async fn unconfigured_webhook_is_503_with_a_displayable_answer() {
    let (addr, _ctx) = common::spawn_gateway(common::test_config(None, None)).await;

    let resp = common::client()
        .post(format!("http://{addr}/api/query"))
        .json(&json!({ "query": "price a wavelength" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);

    let body: Value = resp.json().await.unwrap();
    let answer = body["answer"].as_str().unwrap();
    assert!(!answer.is_empty(), "fallback answer must be displayable");
}

#[tokio::test]
async fn webhook_response_passes_through_unmodified() {
    let seen = Arc::new(Mutex::new(None));
    let webhook = recording_webhook(
        seen.clone(),
        json!({
            "answer": "100G NYC-LAX runs $4,200/mo",
            "sources": ["pricing-db"],
            "includes_live_pricing": true,
        }),
    );
    let webhook_addr = common::serve_router(webhook).await;
    let (addr, _ctx) =
        common::spawn_gateway(common::test_config(None, Some(format!("http://{webhook_addr}/"))))
            .await;

    let resp = common::client()
        .post(format!("http://{addr}/api/query"))
        .json(&json!({ "query": "price a 100G wave" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["answer"], "100G NYC-LAX runs $4,200/mo");
    assert_eq!(body["includes_live_pricing"], true);

    // Anonymous caller: no identity enrichment in the forwarded payload.
    let forwarded = seen.lock().unwrap().clone().unwrap();
    assert_eq!(forwarded["query"], "price a 100G wave");
    assert!(forwarded.get("user_uuid").is_none());
    assert!(forwarded.get("session_id").is_none());
}

#[tokio::test]
async fn authenticated_queries_carry_identity_and_correlation_id() {
    let seen = Arc::new(Mutex::new(None));
    let webhook = recording_webhook(seen.clone(), json!({ "answer": "ok" }));
    let webhook_addr = common::serve_router(webhook).await;
    let (addr, ctx) =
        common::spawn_gateway(common::test_config(None, Some(format!("http://{webhook_addr}/"))))
            .await;

    let sealed = ctx
        .codec
        .encode(&SessionData::authenticated(
            "tok-1",
            "u-1",
            Some("c-9".to_string()),
        ))
        .unwrap();

    let resp = common::client()
        .post(format!("http://{addr}/api/query"))
        .header("cookie", format!("{SESSION_COOKIE}={sealed}"))
        .json(&json!({ "query": "show my services" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let forwarded = seen.lock().unwrap().clone().unwrap();
    assert_eq!(forwarded["user_uuid"], "u-1");
    assert_eq!(forwarded["customer_uuid"], "c-9");
    let correlation = forwarded["session_id"].as_str().unwrap();
    assert!(correlation.starts_with("u-1-"), "correlation id is uuid + timestamp");
}

#[tokio::test]
async fn webhook_failure_still_returns_a_fallback_answer() {
    let webhook = Router::new().route(
        "/",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response() }),
    );
    let webhook_addr = common::serve_router(webhook).await;
    let (addr, _ctx) =
        common::spawn_gateway(common::test_config(None, Some(format!("http://{webhook_addr}/"))))
            .await;

    let resp = common::client()
        .post(format!("http://{addr}/api/query"))
        .json(&json!({ "query": "anything" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["answer"], FALLBACK_ANSWER);
    assert_eq!(body["error"], "Internal server error");
    // Development mode keeps the technical detail out of the user-facing answer.
    assert!(body["debug"]["message"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn empty_query_is_rejected() {
    let (addr, _ctx) = common::spawn_gateway(common::test_config(None, None)).await;

    let resp = common::client()
        .post(format!("http://{addr}/api/query"))
        .json(&json!({ "query": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Query is required");
}
