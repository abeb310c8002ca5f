mod common;

use axum::http::StatusCode;
use chrono::{Duration as ChronoDuration, Utc};
use cinema_backend::domain::models::payment::Payment;
use common::{parse_body, TestApp};
use serde_json::json;
use std::time::Duration;

async fn pending_booking(app: &TestApp, showtime_id: &str, user: &str) -> String {
    let res = app
        .post_json(
            &format!("/api/v1/showtimes/{}/locks", showtime_id),
            json!({ "user_id": user, "seats": [{"row": "A", "number": 1}] }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = app
        .post_json(
            &format!("/api/v1/showtimes/{}/checkout", showtime_id),
            json!({ "user_id": user, "seats": [{"row": "A", "number": 1}] }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_timeout_cancels_payment_but_not_the_booking() {
    let app = TestApp::with_deadlines(
        Duration::from_secs(60),
        Duration::from_millis(300),
        Duration::from_secs(60),
    )
    .await;
    let st = app.seed_showtime("BOOKING_OPEN", 60, 10).await;
    let booking_id = pending_booking(&app, &st.id, "alice").await;

    let res = app
        .post_json(
            &format!("/api/v1/bookings/{}/payments", booking_id),
            json!({ "method": "CREDIT_CARD" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let payment_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    // Keep the booking timer out of the picture; starting a payment aligns
    // it with the payment deadline, which is milliseconds here.
    app.state.booking_expiry.cancel(&booking_id).await;

    tokio::time::sleep(Duration::from_millis(800)).await;

    let payment = app
        .state
        .payment_repo
        .find_by_id(&payment_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, "CANCELLED");

    // Only payment_status moves; the booking waits for the reconciler.
    let booking = app
        .state
        .booking_repo
        .find_by_id(&booking_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(booking.status, "PENDING");
    assert_eq!(booking.payment_status, "CANCELLED");
}

#[tokio::test]
async fn test_cancel_disarms_payment_timer() {
    let app = TestApp::with_deadlines(
        Duration::from_secs(60),
        Duration::from_millis(300),
        Duration::from_secs(60),
    )
    .await;
    let st = app.seed_showtime("BOOKING_OPEN", 60, 10).await;
    let booking_id = pending_booking(&app, &st.id, "alice").await;

    let res = app
        .post_json(
            &format!("/api/v1/bookings/{}/payments", booking_id),
            json!({ "method": "CREDIT_CARD" }),
        )
        .await;
    let payment_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    app.state.payment_expiry.cancel(&payment_id).await;
    app.state.booking_expiry.cancel(&booking_id).await;
    tokio::time::sleep(Duration::from_millis(700)).await;

    let payment = app
        .state
        .payment_repo
        .find_by_id(&payment_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, "PENDING");
}

#[tokio::test]
async fn test_expire_leaves_settled_payment_alone() {
    let app = TestApp::new().await;
    let st = app.seed_showtime("BOOKING_OPEN", 60, 10).await;
    let booking_id = pending_booking(&app, &st.id, "alice").await;

    let res = app
        .post_json(
            &format!("/api/v1/bookings/{}/payments", booking_id),
            json!({ "method": "CREDIT_CARD" }),
        )
        .await;
    let payment_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    assert!(app
        .state
        .payment_repo
        .transition(&payment_id, "PENDING", "COMPLETED")
        .await
        .unwrap());

    let fired = app.state.payment_expiry.expire(&payment_id).await.unwrap();
    assert!(!fired);

    let payment = app
        .state
        .payment_repo
        .find_by_id(&payment_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, "COMPLETED");
}

#[tokio::test]
async fn test_recovery_cancels_overdue_payment() {
    let app = TestApp::new().await;
    let st = app.seed_showtime("BOOKING_OPEN", 60, 10).await;
    let booking_id = pending_booking(&app, &st.id, "alice").await;

    // A payment whose window closed while the process was down.
    let mut payment = Payment::new(
        booking_id.clone(),
        "alice".to_string(),
        12.5,
        "CREDIT_CARD".to_string(),
    );
    payment.created_at = Utc::now() - ChronoDuration::minutes(30);
    app.state.payment_repo.create(&payment).await.unwrap();

    app.state.payment_expiry.recover_on_startup().await.unwrap();

    let recovered = app
        .state
        .payment_repo
        .find_by_id(&payment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(recovered.status, "CANCELLED");

    let booking = app
        .state
        .booking_repo
        .find_by_id(&booking_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(booking.payment_status, "CANCELLED");
}

#[tokio::test]
async fn test_recovery_rearms_payment_still_inside_its_window() {
    let app = TestApp::with_deadlines(
        Duration::from_secs(60),
        Duration::from_millis(600),
        Duration::from_secs(60),
    )
    .await;
    let st = app.seed_showtime("BOOKING_OPEN", 60, 10).await;
    let booking_id = pending_booking(&app, &st.id, "alice").await;
    app.state.booking_expiry.cancel(&booking_id).await;

    let payment = Payment::new(
        booking_id.clone(),
        "alice".to_string(),
        12.5,
        "CREDIT_CARD".to_string(),
    );
    app.state.payment_repo.create(&payment).await.unwrap();

    app.state.payment_expiry.recover_on_startup().await.unwrap();
    assert_eq!(app.state.payment_expiry.armed_count().await, 1);

    let pending = app
        .state
        .payment_repo
        .find_by_id(&payment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pending.status, "PENDING");

    tokio::time::sleep(Duration::from_millis(1200)).await;
    let expired = app
        .state
        .payment_repo
        .find_by_id(&payment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(expired.status, "CANCELLED");
}
