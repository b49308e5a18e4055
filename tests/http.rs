//! HTTP-level tests using `tower::ServiceExt::oneshot` against the full
//! router, without binding a socket.

#![allow(clippy::panic)]

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{GAME_ID, Harness};
use ferdle_server::api;

fn app(h: &Harness) -> Router {
    api::build_router().with_state(h.state.clone())
}

fn request(method: Method, uri: &str, email: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(email) = email {
        let id = email.split('@').next().unwrap_or_default();
        builder = builder.header("x-user-id", id).header("x-user-email", email);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let Ok(req) = builder.body(body) else {
        panic!("valid request");
    };
    req
}

async fn send(h: &Harness, req: Request<Body>) -> (StatusCode, Value) {
    let Ok(resp) = app(h).oneshot(req).await else {
        panic!("router is infallible");
    };
    let status = resp.status();
    let Ok(bytes) = axum::body::to_bytes(resp.into_body(), usize::MAX).await else {
        panic!("body readable");
    };
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_needs_no_identity() {
    let h = Harness::new();
    let (status, body) = send(&h, request(Method::GET, "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["games"], 1);
}

#[tokio::test]
async fn identity_and_whitelist_are_enforced() {
    let h = Harness::new();
    let uri = format!("/api/v1/games/{GAME_ID}/state");

    let (status, body) = send(&h, request(Method::GET, &uri, None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], 4001);

    let (status, body) = send(&h, request(Method::GET, &uri, Some("mallory@example.com"), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], 4002);
}

#[tokio::test]
async fn state_hides_the_answer() {
    let h = Harness::new();
    let uri = format!("/api/v1/games/{GAME_ID}/state");
    let (status, body) = send(&h, request(Method::GET, &uri, Some("alice@example.com"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["attempts"], 0);
    assert_eq!(body["state"]["max_attempts"], 10);
    assert!(body["state"]["state_data"].get("targetWord").is_none());
    assert!(body.get("illustration").is_none());
}

#[tokio::test]
async fn bad_dates_are_client_errors() {
    let h = Harness::new();
    for (date, code) in [("2025-11-28", 1101), ("2025-10-01", 1102), ("11/27/2025", 1003)] {
        let uri = format!("/api/v1/games/{GAME_ID}/state?date={date}");
        let (status, body) =
            send(&h, request(Method::GET, &uri, Some("alice@example.com"), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "date {date}");
        assert_eq!(body["error"]["code"], code, "date {date}");
    }
}

#[tokio::test]
async fn refused_move_is_a_200_with_reason() {
    let h = Harness::new();
    let uri = format!("/api/v1/games/{GAME_ID}/move");
    let (status, body) = send(
        &h,
        request(
            Method::POST,
            &uri,
            Some("alice@example.com"),
            Some(json!({ "move": { "guess": "qqqqq" } })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "error": "Not a word" }));
}

#[tokio::test]
async fn winning_move_then_conflict_then_leaderboard() {
    let h = Harness::new();
    let uri = format!("/api/v1/games/{GAME_ID}/move");
    let win = json!({ "move": { "guess": h.answer } });

    let (status, body) = send(
        &h,
        request(Method::POST, &uri, Some("bob@example.com"), Some(win.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["won"], true);
    assert_eq!(body["state"]["state_data"]["targetWord"], json!(h.answer));
    assert!(body["illustration"]["url"].is_string());

    let (status, body) =
        send(&h, request(Method::POST, &uri, Some("bob@example.com"), Some(win))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], 2002);

    let board = format!("/api/v1/leaderboard/{GAME_ID}/daily");
    let (status, body) = send(&h, request(Method::GET, &board, Some("alice@example.com"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period_type"], "daily");
    assert_eq!(body["period_key"], "2025-11-27");
    assert_eq!(body["entries"][0]["user_id"], "bob");
    assert_eq!(body["entries"][0]["rank"], 1);
    assert_eq!(body["entries"][0]["success_rate"], 1.0);
    assert_eq!(body["entries"][0]["average_attempts"], 1.0);

    let (_, body) = send(&h, request(Method::GET, &board, Some("carol@example.com"), None)).await;
    assert_eq!(body["entries"], json!([]));

    let me = format!("/api/v1/leaderboard/{GAME_ID}/daily/me");
    let (_, body) = send(&h, request(Method::GET, &me, Some("alice@example.com"), None)).await;
    assert_eq!(body["entry"], Value::Null);
}

#[tokio::test]
async fn unknown_period_is_rejected() {
    let h = Harness::new();
    let uri = format!("/api/v1/leaderboard/{GAME_ID}/yearly");
    let (status, body) = send(&h, request(Method::GET, &uri, Some("alice@example.com"), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1004);
}

#[tokio::test]
async fn admin_endpoints_require_admin() {
    let h = Harness::new();
    let (status, _) = send(
        &h,
        request(Method::POST, "/api/v1/admin/whitelist/reload", Some("bob@example.com"), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &h,
        request(Method::POST, "/api/v1/admin/whitelist/reload", Some("alice@example.com"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"], 3);

    let (status, body) = send(
        &h,
        request(Method::GET, "/api/v1/admin/content-queue", Some("alice@example.com"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["queue"], json!([]));
}

#[tokio::test]
async fn catalog_lists_registered_games() {
    let h = Harness::new();
    let (status, body) =
        send(&h, request(Method::GET, "/api/v1/games", Some("alice@example.com"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["games"][0]["id"], GAME_ID);

    let (_, body) =
        send(&h, request(Method::GET, "/api/v1/games/today", Some("alice@example.com"), None)).await;
    assert_eq!(body["date"], "2025-11-27");
    assert_eq!(body["time_zone"], "America/New_York");
}
