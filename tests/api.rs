//! End-to-end tests against the router with the in-memory store.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use hot_cars::{AppState, config::Config, create_app};
use serde_json::{Value, json};
use tower::ServiceExt;

const RED_PIXEL_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8/5+hHgAHggJ/PchI7wAAAABJRU5ErkJggg==";

struct TestResponse {
    status: StatusCode,
    body: Value,
}

fn app() -> Router {
    app_with(Config::default())
}

fn app_with(config: Config) -> Router {
    create_app(AppState::in_memory(config))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    TestResponse { status, body }
}

async fn upload(app: &Router) -> String {
    let res = send(
        app,
        Method::POST,
        "/api/cars/upload",
        Some(json!({ "photo": RED_PIXEL_PNG })),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED);
    res.body["id"].as_str().unwrap().to_string()
}

async fn vote(app: &Router, car_id: &str, is_hot: bool) -> TestResponse {
    send(
        app,
        Method::POST,
        "/api/cars/vote",
        Some(json!({ "car_id": car_id, "is_hot": is_hot })),
    )
    .await
}

async fn leaderboard(app: &Router, query: &str) -> Vec<Value> {
    let res = send(app, Method::GET, &format!("/api/cars/leaderboard{}", query), None).await;
    assert_eq!(res.status, StatusCode::OK);
    res.body.as_array().unwrap().clone()
}

#[tokio::test]
async fn health_reports_ok() {
    let res = send(&app(), Method::GET, "/api/health", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "ok");
}

mod upload {
    use super::*;

    #[tokio::test]
    async fn returns_created_car_with_zero_tallies() {
        let app = app();
        let res = send(
            &app,
            Method::POST,
            "/api/cars/upload",
            Some(json!({ "photo": RED_PIXEL_PNG })),
        )
        .await;

        assert_eq!(res.status, StatusCode::CREATED);
        assert!(res.body["id"].as_str().is_some());
        assert_eq!(res.body["photo"], RED_PIXEL_PNG);
        assert_eq!(res.body["hot_votes"], 0);
        assert_eq!(res.body["not_votes"], 0);
        assert_eq!(res.body["total_votes"], 0);
        assert_eq!(res.body["score"], 0.0);
        assert!(res.body.get("created_at").is_none());
    }

    #[tokio::test]
    async fn appears_on_leaderboard_immediately() {
        let app = app();
        let id = upload(&app).await;

        let board = leaderboard(&app, "").await;
        assert_eq!(board.len(), 1);
        assert_eq!(board[0]["id"], id.as_str());
        assert_eq!(board[0]["score"], 0.0);
        assert_eq!(board[0]["total_votes"], 0);
    }

    #[tokio::test]
    async fn rejects_garbage_payload() {
        let app = app();
        let res = send(
            &app,
            Method::POST,
            "/api/cars/upload",
            Some(json!({ "photo": "not-an-image!" })),
        )
        .await;

        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert!(leaderboard(&app, "").await.is_empty());
    }

    #[tokio::test]
    async fn rejects_empty_photo() {
        let res = send(
            &app(),
            Method::POST,
            "/api/cars/upload",
            Some(json!({ "photo": "" })),
        )
        .await;

        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["code"], "validation_error");
    }

    #[tokio::test]
    async fn rejects_non_image_media_type() {
        let res = send(
            &app(),
            Method::POST,
            "/api/cars/upload",
            Some(json!({ "photo": "data:text/plain;base64,aGVsbG8=" })),
        )
        .await;

        assert_eq!(res.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}

mod random {
    use super::*;

    #[tokio::test]
    async fn empty_store_is_distinct_from_not_found() {
        let res = send(&app(), Method::GET, "/api/cars/random", None).await;

        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.body["code"], "empty");
        assert_eq!(res.body["error"], "No cars available");
    }

    #[tokio::test]
    async fn single_car_is_always_returned() {
        let app = app();
        let id = upload(&app).await;

        for _ in 0..10 {
            let res = send(&app, Method::GET, "/api/cars/random", None).await;
            assert_eq!(res.status, StatusCode::OK);
            assert_eq!(res.body["id"], id.as_str());
        }
    }

    #[tokio::test]
    async fn includes_derived_fields() {
        let app = app();
        let id = upload(&app).await;
        vote(&app, &id, true).await;
        vote(&app, &id, false).await;

        let res = send(&app, Method::GET, "/api/cars/random", None).await;
        assert_eq!(res.body["hot_votes"], 1);
        assert_eq!(res.body["not_votes"], 1);
        assert_eq!(res.body["total_votes"], 2);
        assert_eq!(res.body["score"], 0.5);
    }
}

mod get_car {
    use super::*;

    #[tokio::test]
    async fn returns_existing_car() {
        let app = app();
        let id = upload(&app).await;

        let res = send(&app, Method::GET, &format!("/api/cars/{}", id), None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["id"], id.as_str());
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let res = send(
            &app(),
            Method::GET,
            "/api/cars/00000000-0000-0000-0000-000000000000",
            None,
        )
        .await;

        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.body["code"], "not_found");
    }
}

mod voting {
    use super::*;

    #[tokio::test]
    async fn hot_vote_updates_tallies() {
        let app = app();
        let id = upload(&app).await;

        let res = vote(&app, &id, true).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["message"], "Vote recorded");
        assert_eq!(res.body["hot_votes"], 1);
        assert_eq!(res.body["not_votes"], 0);
        assert_eq!(res.body["score"], 1.0);
    }

    #[tokio::test]
    async fn not_vote_updates_tallies() {
        let app = app();
        let id = upload(&app).await;

        let res = vote(&app, &id, false).await;
        assert_eq!(res.body["hot_votes"], 0);
        assert_eq!(res.body["not_votes"], 1);
        assert_eq!(res.body["score"], 0.0);
    }

    #[tokio::test]
    async fn same_vote_twice_counts_twice() {
        let app = app();
        let id = upload(&app).await;

        vote(&app, &id, true).await;
        let res = vote(&app, &id, true).await;
        assert_eq!(res.body["total_votes"], 2);
    }

    #[tokio::test]
    async fn unknown_car_is_not_found() {
        let app = app();
        let id = upload(&app).await;

        let res = vote(&app, "4b0c5d2e-7a4f-4c55-9a43-1f0a8f0d2b11", true).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.body["code"], "not_found");

        let res = vote(&app, "not-a-uuid", true).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);

        let board = leaderboard(&app, "").await;
        assert_eq!(board[0]["id"], id.as_str());
        assert_eq!(board[0]["total_votes"], 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_votes_are_not_lost() {
        let app = app();
        let id = upload(&app).await;
        let voters = 100;

        let responses =
            futures::future::join_all((0..voters).map(|_| vote(&app, &id, true))).await;
        assert!(responses.iter().all(|res| res.status == StatusCode::OK));

        let res = send(&app, Method::GET, &format!("/api/cars/{}", id), None).await;
        assert_eq!(res.body["hot_votes"], voters);
        assert_eq!(res.body["not_votes"], 0);
    }
}

mod leaderboard {
    use super::*;

    async fn voted_car(app: &Router, hot: usize, not: usize) -> String {
        let id = upload(app).await;
        for _ in 0..hot {
            vote(app, &id, true).await;
        }
        for _ in 0..not {
            vote(app, &id, false).await;
        }
        id
    }

    #[tokio::test]
    async fn empty_store_gives_empty_board() {
        assert!(leaderboard(&app(), "").await.is_empty());
    }

    #[tokio::test]
    async fn equal_scores_rank_by_vote_count() {
        let app = app();
        let many = voted_car(&app, 9, 1).await;
        let _half = voted_car(&app, 1, 1).await;
        let more = voted_car(&app, 18, 2).await;

        let board = leaderboard(&app, "?limit=2").await;
        assert_eq!(board.len(), 2);
        assert_eq!(board[0]["id"], more.as_str());
        assert_eq!(board[0]["total_votes"], 20);
        assert_eq!(board[1]["id"], many.as_str());
        assert_eq!(board[1]["total_votes"], 10);
    }

    #[tokio::test]
    async fn sorted_by_score_descending() {
        let app = app();
        voted_car(&app, 1, 3).await;
        voted_car(&app, 3, 1).await;
        voted_car(&app, 0, 0).await;
        voted_car(&app, 2, 2).await;

        let board = leaderboard(&app, "").await;
        let scores: Vec<f64> = board.iter().map(|c| c["score"].as_f64().unwrap()).collect();
        assert_eq!(scores, vec![0.75, 0.5, 0.25, 0.0]);
    }

    #[tokio::test]
    async fn unvoted_cars_keep_upload_order() {
        let app = app();
        let first = upload(&app).await;
        let second = upload(&app).await;
        let third = upload(&app).await;

        let board = leaderboard(&app, "").await;
        let ids: Vec<&str> = board.iter().map(|c| c["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec![first.as_str(), second.as_str(), third.as_str()]);
    }

    #[tokio::test]
    async fn zero_limit_is_empty() {
        let app = app();
        upload(&app).await;

        assert!(leaderboard(&app, "?limit=0").await.is_empty());
    }

    #[tokio::test]
    async fn default_limit_applies() {
        let app = app();
        for _ in 0..25 {
            upload(&app).await;
        }

        assert_eq!(leaderboard(&app, "").await.len(), 20);
        assert_eq!(leaderboard(&app, "?limit=25").await.len(), 25);
    }

    #[tokio::test]
    async fn negative_limit_is_rejected() {
        let res = send(&app(), Method::GET, "/api/cars/leaderboard?limit=-1", None).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["code"], "bad_request");
        assert_eq!(res.body["status"], 400);
    }

    #[tokio::test]
    async fn non_numeric_limit_is_rejected() {
        let res = send(&app(), Method::GET, "/api/cars/leaderboard?limit=ten", None).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["code"], "bad_request");
    }

    #[tokio::test]
    async fn limit_is_not_capped_by_cache_size() {
        let app = app_with(Config {
            leaderboard_cache_size: 3,
            ..Config::default()
        });
        for _ in 0..5 {
            upload(&app).await;
        }

        assert_eq!(leaderboard(&app, "?limit=5").await.len(), 5);
        assert_eq!(leaderboard(&app, "?limit=150").await.len(), 5);
    }

    #[tokio::test]
    async fn repeated_requests_return_identical_order() {
        let app = app();
        voted_car(&app, 1, 1).await;
        voted_car(&app, 2, 2).await;
        voted_car(&app, 0, 0).await;
        voted_car(&app, 0, 0).await;

        let first = leaderboard(&app, "").await;
        for _ in 0..5 {
            assert_eq!(leaderboard(&app, "").await, first);
        }
    }
}
