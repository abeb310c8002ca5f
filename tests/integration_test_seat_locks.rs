mod common;

use axum::http::StatusCode;
use common::{parse_body, seat, TestApp};
use serde_json::json;
use std::time::Duration;
use tokio::task::JoinSet;

#[tokio::test]
async fn test_acquire_returns_hold() {
    let app = TestApp::new().await;
    let st = app.seed_showtime("BOOKING_OPEN", 60, 10).await;

    let res = app
        .post_json(
            &format!("/api/v1/showtimes/{}/locks", st.id),
            json!({ "user_id": "alice", "seats": [{"row": "A", "number": 1}, {"row": "A", "number": 2}] }),
        )
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert!(body["lock_id"].as_str().is_some());
    assert_eq!(body["seats"].as_array().unwrap().len(), 2);
    assert!(body["expires_at"].as_str().is_some());
}

#[tokio::test]
async fn test_conflicting_acquire_names_exact_seats() {
    let app = TestApp::new().await;
    let st = app.seed_showtime("BOOKING_OPEN", 60, 10).await;

    let res = app
        .post_json(
            &format!("/api/v1/showtimes/{}/locks", st.id),
            json!({ "user_id": "alice", "seats": [{"row": "A", "number": 1}] }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    // Bob wants A1 (taken) and B5 (free); only A1 should be named.
    let res = app
        .post_json(
            &format!("/api/v1/showtimes/{}/locks", st.id),
            json!({ "user_id": "bob", "seats": [{"row": "A", "number": 1}, {"row": "B", "number": 5}] }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = parse_body(res).await;
    assert_eq!(body["conflicting_seats"], json!(["A1"]));
}

#[tokio::test]
async fn test_acquire_rejects_duplicate_seats() {
    let app = TestApp::new().await;
    let st = app.seed_showtime("BOOKING_OPEN", 60, 10).await;

    // A repeated seat is a malformed request, not a conflict.
    let res = app
        .post_json(
            &format!("/api/v1/showtimes/{}/locks", st.id),
            json!({ "user_id": "alice", "seats": [{"row": "A", "number": 1}, {"row": "A", "number": 1}] }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = parse_body(res).await;
    assert!(body["error"].as_str().unwrap().contains("Duplicate"));
    assert!(body["conflicting_seats"].is_null());

    assert_eq!(app.state.seat_locks.live_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_release_frees_seats_for_other_users() {
    let app = TestApp::new().await;
    let st = app.seed_showtime("BOOKING_OPEN", 60, 10).await;

    let res = app
        .post_json(
            &format!("/api/v1/showtimes/{}/locks", st.id),
            json!({ "user_id": "alice", "seats": [{"row": "A", "number": 1}] }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .delete(&format!("/api/v1/showtimes/{}/locks/alice", st.id))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["released_seats"], 1);

    let res = app
        .post_json(
            &format!("/api/v1/showtimes/{}/locks", st.id),
            json!({ "user_id": "bob", "seats": [{"row": "A", "number": 1}] }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    // Releasing again is a no-op, not an error.
    let res = app
        .delete(&format!("/api/v1/showtimes/{}/locks/alice", st.id))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["released_seats"], 0);
}

#[tokio::test]
async fn test_extend_pushes_expiry_forward() {
    let app = TestApp::new().await;
    let st = app.seed_showtime("BOOKING_OPEN", 60, 10).await;

    app.post_json(
        &format!("/api/v1/showtimes/{}/locks", st.id),
        json!({ "user_id": "alice", "seats": [{"row": "A", "number": 1}] }),
    )
    .await;

    let before = app.state.seat_locks.live_hold(&st.id, "alice").await.unwrap();
    let old_expiry = before[0].expires_at;

    let res = app
        .post_json(
            &format!("/api/v1/showtimes/{}/locks/alice/extend", st.id),
            json!({ "minutes": 10 }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let after = app.state.seat_locks.live_hold(&st.id, "alice").await.unwrap();
    assert!(after[0].expires_at > old_expiry);

    // Extending a hold that does not exist is a 404.
    let res = app
        .post_json(
            &format!("/api/v1/showtimes/{}/locks/nobody/extend", st.id),
            json!({ "minutes": 10 }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expired_lock_does_not_block_and_sweep_removes_it() {
    let app = TestApp::with_deadlines(
        Duration::from_secs(60),
        Duration::from_secs(60),
        Duration::from_millis(200),
    )
    .await;
    let st = app.seed_showtime("BOOKING_OPEN", 60, 10).await;

    app.post_json(
        &format!("/api/v1/showtimes/{}/locks", st.id),
        json!({ "user_id": "alice", "seats": [{"row": "A", "number": 1}] }),
    )
    .await;

    tokio::time::sleep(Duration::from_millis(500)).await;

    // Alice's hold has lapsed; Bob can take the seat even before any sweep.
    let res = app
        .post_json(
            &format!("/api/v1/showtimes/{}/locks", st.id),
            json!({ "user_id": "bob", "seats": [{"row": "A", "number": 1}] }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(500)).await;

    let res = app.post_empty("/api/v1/admin/sweep/all").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert!(body["expired_locks_removed"].as_u64().unwrap() >= 1);

    assert_eq!(app.state.seat_locks.live_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_concurrent_acquires_exactly_one_wins_per_seat() {
    let app = TestApp::new().await;
    let st = app.seed_showtime("BOOKING_OPEN", 60, 10).await;

    let mut set = JoinSet::new();
    for i in 0..10 {
        let manager = app.state.seat_locks.clone();
        let showtime_id = st.id.clone();
        set.spawn(async move {
            manager
                .acquire(&showtime_id, &format!("user-{}", i), vec![seat("A", 1)])
                .await
                .is_ok()
        });
    }

    let mut winners = 0;
    while let Some(res) = set.join_next().await {
        if res.unwrap() {
            winners += 1;
        }
    }

    assert_eq!(winners, 1, "Exactly one contender may hold a contested seat");
    assert_eq!(app.state.seat_locks.live_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_acquire_unknown_showtime_is_not_found() {
    let app = TestApp::new().await;
    let res = app
        .post_json(
            "/api/v1/showtimes/missing/locks",
            json!({ "user_id": "alice", "seats": [{"row": "A", "number": 1}] }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
