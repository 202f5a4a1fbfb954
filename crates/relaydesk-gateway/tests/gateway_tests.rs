// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router-level tests driving the gateway with `tower::ServiceExt::oneshot`
//! over a harness-backed temp database.

use std::time::{Duration, Instant};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use relaydesk_core::traits::generator::GenerationResponse;
use relaydesk_core::StorageAdapter;
use relaydesk_core::types::PaymentMethod;
use relaydesk_gateway::{AppState, OperatorAuth, build_router};
use relaydesk_test_utils::TestHarness;

const TOKEN: &str = "op-token";
const HOOK_KEY: &str = "hook-key";

fn app(h: &TestHarness) -> Router {
    build_router(AppState {
        storage: h.storage.clone(),
        sessions: h.sessions.clone(),
        widget: h.widget.clone(),
        conversations: h.conversations.clone(),
        orchestrator: h.orchestrator.clone(),
        operators: h.operators.clone(),
        ledger: h.ledger.clone(),
        auth: OperatorAuth {
            bearer_token: Some(TOKEN.to_string()),
        },
        webhook_key: Some(HOOK_KEY.to_string()),
        request_timeout: Duration::from_secs(30),
        started_at: Instant::now(),
    })
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn call_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, text) = call(app, request).await;
    let value = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };
    (status, value)
}

fn json_body(value: Value) -> Body {
    Body::from(value.to_string())
}

fn widget_request(method: &str, uri: &str, session: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(session) = session {
        builder = builder.header("x-contact-session", session);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(json_body(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn operator_request(method: &str, uri: &str, tenant: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {TOKEN}"))
        .header("x-tenant-id", tenant)
        .header("x-operator-id", format!("op_{tenant}"))
        .header("x-operator-name", "Linh");
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(json_body(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn webhook_request(key: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/sepay-webhook")
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("authorization", format!("Apikey {key}"));
    }
    builder.body(json_body(body)).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let h = TestHarness::new().await.unwrap();
    let (status, body) = call_json(&app(&h), widget_request("GET", "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn widget_flow_queues_message_without_subscription() {
    let h = TestHarness::new().await.unwrap();
    let app = app(&h);

    let (status, session) = call_json(
        &app,
        widget_request(
            "POST",
            "/v1/widget/sessions",
            None,
            Some(json!({"tenant_id": "acme", "name": "Ann", "email": "ann@example.com"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = session["id"].as_str().unwrap().to_string();

    let (status, conversation) = call_json(
        &app,
        widget_request("POST", "/v1/widget/conversations", Some(&session_id), None),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(conversation["status"], "unresolved");
    let conversation_id = conversation["id"].as_str().unwrap().to_string();

    let (status, outcome) = call_json(
        &app,
        widget_request(
            "POST",
            &format!("/v1/widget/conversations/{conversation_id}/messages"),
            None,
            Some(json!({"session_id": session_id, "prompt": "hi"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["disposition"], "queued");
    assert_eq!(outcome["status"], "unresolved");
    assert!(outcome["reply"].is_null());

    let (status, page) = call_json(
        &app,
        widget_request(
            "GET",
            &format!("/v1/widget/conversations/{conversation_id}/messages?limit=10"),
            Some(&session_id),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["text"], "hi");
    assert_eq!(h.generator.call_count().await, 0);
}

#[tokio::test]
async fn widget_bootstrap_and_session_lookup() {
    let h = TestHarness::new().await.unwrap();
    let app = app(&h);
    let session = h.visitor("acme").await.unwrap();

    let (status, bootstrap) =
        call_json(&app, widget_request("GET", "/v1/widget/tenants/acme", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bootstrap["customized"], false);

    let (status, found) = call_json(
        &app,
        widget_request("GET", &format!("/v1/widget/sessions/{}", session.id), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["email"], "ann@example.com");

    let (status, _) =
        call_json(&app, widget_request("GET", "/v1/widget/sessions/missing", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn widget_requires_contact_session() {
    let h = TestHarness::new().await.unwrap();
    let (status, body) = call_json(
        &app(&h),
        widget_request("POST", "/v1/widget/conversations", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("contact session"));
}

#[tokio::test]
async fn answered_turn_and_closed_conversation() {
    let h = TestHarness::builder()
        .with_responses(vec![
            GenerationResponse::tool_call("call_1", "resolve_conversation", json!({})),
            GenerationResponse::text("Glad I could help."),
        ])
        .build()
        .await
        .unwrap();
    h.activate_subscription("acme").await.unwrap();
    let (session, conversation) = h.start_conversation("acme").await.unwrap();
    let app = app(&h);
    let uri = format!("/v1/widget/conversations/{}/messages", conversation.id);

    let (status, outcome) = call_json(
        &app,
        widget_request("POST", &uri, Some(&session.id), Some(json!({"prompt": "thanks, solved"}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["disposition"], "answered");
    assert_eq!(outcome["status"], "resolved");

    let (status, _) = call_json(
        &app,
        widget_request("POST", &uri, Some(&session.id), Some(json!({"prompt": "one more"}))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn operator_routes_require_token_and_identity() {
    let h = TestHarness::new().await.unwrap();
    let app = app(&h);

    let no_token = Request::builder()
        .uri("/v1/conversations")
        .header("x-tenant-id", "acme")
        .header("x-operator-id", "op_acme")
        .body(Body::empty())
        .unwrap();
    assert_eq!(call(&app, no_token).await.0, StatusCode::UNAUTHORIZED);

    let wrong_token = Request::builder()
        .uri("/v1/conversations")
        .header("authorization", "Bearer nope")
        .header("x-tenant-id", "acme")
        .header("x-operator-id", "op_acme")
        .body(Body::empty())
        .unwrap();
    assert_eq!(call(&app, wrong_token).await.0, StatusCode::UNAUTHORIZED);

    let no_identity = Request::builder()
        .uri("/v1/conversations")
        .header("authorization", format!("Bearer {TOKEN}"))
        .body(Body::empty())
        .unwrap();
    assert_eq!(call(&app, no_identity).await.0, StatusCode::UNAUTHORIZED);

    let (status, page) =
        call_json(&app, operator_request("GET", "/v1/conversations", "acme", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn operator_reply_and_status_cycle() {
    let h = TestHarness::new().await.unwrap();
    let (_session, conversation) = h.start_conversation("acme").await.unwrap();
    let app = app(&h);
    let id = &conversation.id;

    let (status, list) = call_json(
        &app,
        operator_request("GET", "/v1/conversations?status=unresolved", "acme", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["items"][0]["id"], id.as_str());
    assert_eq!(list["items"][0]["contact_session"]["name"], "Ann");

    let (status, replied) = call_json(
        &app,
        operator_request(
            "POST",
            &format!("/v1/conversations/{id}/messages"),
            "acme",
            Some(json!({"text": "Let me check that for you."})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replied["status"], "escalated");

    let (_, feed) = call_json(
        &app,
        operator_request("GET", &format!("/v1/conversations/{id}/messages"), "acme", None),
    )
    .await;
    let last = feed["items"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["author_name"], "Linh");

    let advance = format!("/v1/conversations/{id}/status/advance");
    let (_, advanced) = call_json(&app, operator_request("POST", &advance, "acme", None)).await;
    assert_eq!(advanced["status"], "resolved");

    let (status, _) = call_json(
        &app,
        operator_request(
            "POST",
            &format!("/v1/conversations/{id}/messages"),
            "acme",
            Some(json!({"text": "late reply"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, contact) = call_json(
        &app,
        operator_request("GET", &format!("/v1/conversations/{id}/contact-session"), "acme", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(contact["tenant_id"], "acme");
}

#[tokio::test]
async fn operators_cannot_cross_tenants() {
    let h = TestHarness::new().await.unwrap();
    let (_session, conversation) = h.start_conversation("acme").await.unwrap();
    let (status, _) = call_json(
        &app(&h),
        operator_request(
            "GET",
            &format!("/v1/conversations/{}", conversation.id),
            "globex",
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn widget_settings_round_trip() {
    let h = TestHarness::new().await.unwrap();
    let app = app(&h);

    let (status, _) =
        call_json(&app, operator_request("GET", "/v1/widget-settings", "acme", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, saved) = call_json(
        &app,
        operator_request(
            "PUT",
            "/v1/widget-settings",
            "acme",
            Some(json!({"greeting_message": "Xin chào!", "suggestions": ["Pricing"]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["greeting_message"], "Xin chào!");

    let (status, _) = call_json(
        &app,
        operator_request(
            "PUT",
            "/v1/widget-settings",
            "acme",
            Some(json!({"greeting_message": "Hi", "suggestions": ["a", "b", "c", "d"]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, bootstrap) =
        call_json(&app, widget_request("GET", "/v1/widget/tenants/acme", None, None)).await;
    assert_eq!(bootstrap["greeting_message"], "Xin chào!");
    assert_eq!(bootstrap["customized"], true);
}

#[tokio::test]
async fn enhance_without_generator_is_bad_gateway() {
    let h = TestHarness::builder().without_generator().build().await.unwrap();
    let (status, _) = call_json(
        &app(&h),
        operator_request(
            "POST",
            "/v1/operator/enhance",
            "acme",
            Some(json!({"draft": "pls wait"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn enhance_returns_rewrite() {
    let h = TestHarness::builder()
        .with_responses(vec![GenerationResponse::text("Please bear with us a moment.")])
        .build()
        .await
        .unwrap();
    let (status, body) = call_json(
        &app(&h),
        operator_request(
            "POST",
            "/v1/operator/enhance",
            "acme",
            Some(json!({"draft": "pls wait"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Please bear with us a moment.");
}

#[tokio::test]
async fn webhook_requires_apikey() {
    let h = TestHarness::new().await.unwrap();
    let payload = json!({"transferType": "in", "transferAmount": 10000, "code": "RD1"});

    let (status, text) = call(&app(&h), webhook_request(None, payload.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    insta::assert_snapshot!(text, @"Unauthorized");

    let (status, _) = call(&app(&h), webhook_request(Some("wrong"), payload)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn checkout_then_webhook_activates_subscription() {
    let h = TestHarness::new().await.unwrap();
    let app = app(&h);

    let (status, checkout) = call_json(
        &app,
        operator_request("POST", "/v1/billing/payments", "acme", Some(json!({"plan": "pro"}))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let code = checkout["intent"]["code"].as_str().unwrap().to_string();
    assert_eq!(checkout["intent"]["status"], "pending");

    let payload = json!({
        "id": 92704,
        "gateway": "MBBank",
        "transferType": "in",
        "transferAmount": 10000,
        "code": code,
        "content": format!("{code} thanh toan")
    });
    let (status, body) = call_json(&app, webhook_request(Some(HOOK_KEY), payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Webhook processed");

    // At-least-once delivery: the replay is acknowledged too.
    let (status, body) = call_json(&app, webhook_request(Some(HOOK_KEY), payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, subscription) = call_json(
        &app,
        operator_request("GET", "/v1/billing/subscription", "acme", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(subscription["status"], "active");
    assert_eq!(subscription["plan"], "pro");

    let (_, payments) =
        call_json(&app, operator_request("GET", "/v1/billing/payments", "acme", None)).await;
    assert_eq!(payments[0]["status"], "success");

    let (status, cancelled) = call_json(
        &app,
        operator_request("POST", "/v1/billing/subscription/cancel", "acme", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["cancel_at_period_end"], true);
}

#[tokio::test]
async fn webhook_failures_ask_for_retry() {
    let h = TestHarness::new().await.unwrap();
    let checkout = h
        .ledger
        .checkout("acme", "pro", PaymentMethod::Qr)
        .await
        .unwrap();
    let app = app(&h);

    let mismatch = json!({
        "transferType": "in",
        "transferAmount": 9999,
        "code": checkout.intent.code
    });
    let (status, body) = call_json(&app, webhook_request(Some(HOOK_KEY), mismatch)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("amount mismatch"));

    let unknown = json!({"transferType": "in", "transferAmount": 10000, "code": "RDNOPE"});
    let (status, body) = call_json(&app, webhook_request(Some(HOOK_KEY), unknown)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);

    let intent = h.storage.get_payment_intent(&checkout.intent.code).await.unwrap().unwrap();
    assert_eq!(intent.status.to_string(), "pending");
}

#[tokio::test]
async fn webhook_for_failed_intent_asks_for_retry() {
    let h = TestHarness::new().await.unwrap();
    let checkout = h
        .ledger
        .checkout("acme", "pro", PaymentMethod::Qr)
        .await
        .unwrap();
    h.ledger.fail_intent("acme", &checkout.intent.code).await.unwrap();

    let payload = json!({
        "transferType": "in",
        "transferAmount": 10000,
        "code": checkout.intent.code
    });
    let (status, body) = call_json(&app(&h), webhook_request(Some(HOOK_KEY), payload)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("cannot be settled"));
}

#[tokio::test]
async fn malformed_webhook_body_is_a_json_failure() {
    let h = TestHarness::new().await.unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/sepay-webhook")
        .header("content-type", "application/json")
        .header("authorization", format!("Apikey {HOOK_KEY}"))
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = call_json(&app(&h), request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("malformed payload"));
}

#[tokio::test]
async fn webhook_ignores_outgoing_and_rejects_missing_code() {
    let h = TestHarness::new().await.unwrap();
    let app = app(&h);

    let outgoing = json!({"transferType": "out", "transferAmount": 50000, "content": "rent"});
    let (status, body) = call_json(&app, webhook_request(Some(HOOK_KEY), outgoing)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let no_code = json!({"transferType": "in", "transferAmount": 10000, "content": "  "});
    let (status, text) = call(&app, webhook_request(Some(HOOK_KEY), no_code)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text, "Missing payment code");
}

#[tokio::test]
async fn watch_streams_server_sent_events() {
    let h = TestHarness::new().await.unwrap();
    let (_session, conversation) = h.start_conversation("acme").await.unwrap();
    let response = app(&h)
        .oneshot(operator_request(
            "GET",
            &format!("/v1/conversations/{}/watch", conversation.id),
            "acme",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/event-stream"));
}

#[tokio::test]
async fn watch_checks_tenant_before_streaming() {
    let h = TestHarness::new().await.unwrap();
    let (_session, conversation) = h.start_conversation("acme").await.unwrap();
    let (status, _) = call(
        &app(&h),
        operator_request(
            "GET",
            &format!("/v1/conversations/{}/watch", conversation.id),
            "globex",
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
