mod common;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use common::{CHEAPEST_BOOKS, setup};
use serde_json::{Value, json};
use sql_contest_server::api::{AppState, build_app};
use tower::ServiceExt;

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    let body = serde_json::from_slice(&bytes).expect("response body should be json");
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

#[tokio::test]
async fn test_health() {
    let contest = setup().await;
    let app = build_app(AppState::new(contest.service.clone(), 10));

    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_submit_then_duplicate_conflicts() {
    let contest = setup().await;
    let app = build_app(AppState::new(contest.service.clone(), 10));
    let payload = json!({
        "contestant_id": "alice",
        "question_id": 7,
        "query": CHEAPEST_BOOKS,
    });

    let (status, body) = send(&app, post_json("/api/submissions", payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accepted"], true);
    assert_eq!(body["correct"], true);

    let (status, body) = send(&app, post_json("/api/submissions", payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_SUBMISSION");
}

#[tokio::test]
async fn test_forbidden_query_is_bad_request() {
    let contest = setup().await;
    let app = build_app(AppState::new(contest.service.clone(), 10));

    let (status, body) = send(
        &app,
        post_json(
            "/api/submissions",
            json!({"contestant_id": "mallory", "question_id": 7, "query": "DROP TABLE books;"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "FORBIDDEN_OPERATION");
    assert_eq!(contest.submission_count().await, 0);
}

#[tokio::test]
async fn test_blank_contestant_is_bad_request() {
    let contest = setup().await;
    let app = build_app(AppState::new(contest.service.clone(), 10));

    let (status, body) = send(
        &app,
        post_json("/api/finalize", json!({"contestant_id": "   "})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_unknown_question_is_not_found() {
    let contest = setup().await;
    let app = build_app(AppState::new(contest.service.clone(), 10));

    let (status, body) = send(
        &app,
        post_json(
            "/api/submissions",
            json!({"contestant_id": "alice", "question_id": 99, "query": "SELECT 1"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "QUESTION_NOT_FOUND");
}

#[tokio::test]
async fn test_finalize_and_leaderboard() {
    let contest = setup().await;
    let app = build_app(AppState::new(contest.service.clone(), 1));

    for (name, query) in [("bob", "SELECT 1"), ("alice", CHEAPEST_BOOKS)] {
        let (status, _) = send(
            &app,
            post_json(
                "/api/submissions",
                json!({"contestant_id": name, "question_id": 7, "query": query}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            post_json("/api/finalize", json!({"contestant_id": name})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["contestant_id"], name);
    }

    let (status, body) = send(
        &app,
        post_json("/api/finalize", json!({"contestant_id": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_FINALIZED");

    // Configured size applies when `n` is omitted.
    let (status, body) = send(&app, get("/api/leaderboard")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["entries"],
        json!([{"rank": 1, "contestant_id": "alice", "total_score": 1}])
    );

    let (_, body) = send(&app, get("/api/leaderboard?n=5")).await;
    let entries = body["entries"].as_array().expect("entries array");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["contestant_id"], "bob");
    assert_eq!(entries[1]["rank"], 2);
    assert_eq!(entries[1]["total_score"], 0);

    let (status, body) = send(&app, get("/api/leaderboard?n=18446744073709551615")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_questions_progress_and_preview() {
    let contest = setup().await;
    let app = build_app(AppState::new(contest.service.clone(), 10));

    let (status, body) = send(&app, get("/api/questions")).await;
    assert_eq!(status, StatusCode::OK);
    let questions = body.as_array().expect("question list");
    assert_eq!(questions.len(), 3);
    assert!(questions.iter().all(|q| q.get("reference_query").is_none()));

    send(
        &app,
        post_json(
            "/api/submissions",
            json!({"contestant_id": "alice", "question_id": 2, "query": "SELECT 1"}),
        ),
    )
    .await;
    let (status, body) = send(&app, get("/api/contestants/alice/progress")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["answered"],
        json!([{"question_id": 2, "correct": false}])
    );

    let (status, body) = send(
        &app,
        post_json(
            "/api/preview",
            json!({"query": "SELECT title FROM books WHERE book_id = 1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"], json!([{"title": "Dune"}]));
}
