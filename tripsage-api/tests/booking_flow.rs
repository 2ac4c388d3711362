mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use tripsage_core::booking::BookingStatus;

use common::{request, signup_and_login, test_app};

fn hotel_booking_body() -> Value {
    json!({
        "booking_type": "hotel",
        "check_in_date": "2025-06-01",
        "check_out_date": "2025-06-04",
        "guests": 2,
        "total_price": 300,
        "hotel_name": "Seaside Inn",
        "location": "Lisbon",
        "room_type": "double"
    })
}

#[tokio::test]
async fn test_create_cancel_cancel_again_flow() {
    let (app, _) = test_app();
    let (user_id, token) = signup_and_login(&app, "Alice", "alice@x.com", "secret1").await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/bookings/create",
        Some(&token),
        Some(hotel_booking_body()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["status"], "confirmed");
    assert_eq!(body["booking"]["user_id"], user_id.as_str());
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &app,
        Method::PUT,
        &format!("/bookings/cancel/{}", booking_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["status"], "cancelled");

    // Cancellation is terminal; a second attempt conflicts.
    let (status, body) = request(
        &app,
        Method::PUT,
        &format!("/bookings/cancel/{}", booking_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already cancelled"));
}

#[tokio::test]
async fn test_cancel_requires_ownership() {
    let (app, _) = test_app();
    let (_, alice_token) = signup_and_login(&app, "Alice", "alice@x.com", "secret1").await;
    let (_, bob_token) = signup_and_login(&app, "Bob", "bob@x.com", "secret2").await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/bookings/create",
        Some(&alice_token),
        Some(hotel_booking_body()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();

    // Bob holds a perfectly valid token but does not own the booking.
    let (status, _) = request(
        &app,
        Method::PUT,
        &format!("/bookings/cancel/{}", booking_id),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The booking is untouched.
    let (status, body) = request(
        &app,
        Method::GET,
        "/bookings/user-bookings",
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookings"][0]["status"], "confirmed");

    // And it never shows up in Bob's listing.
    let (_, body) = request(
        &app,
        Method::GET,
        "/bookings/user-bookings",
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(body["bookings"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_cancel_completed_booking_conflicts() {
    let (app, store) = test_app();
    let (_, token) = signup_and_login(&app, "Alice", "alice@x.com", "secret1").await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/bookings/create",
        Some(&token),
        Some(hotel_booking_body()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();

    // Completion happens outside the HTTP surface; seed it directly.
    store
        .set_booking_status(booking_id.parse().unwrap(), BookingStatus::Completed)
        .unwrap();

    let (status, body) = request(
        &app,
        Method::PUT,
        &format!("/bookings/cancel/{}", booking_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already completed"));
}

#[tokio::test]
async fn test_cancel_unknown_booking_is_not_found() {
    let (app, _) = test_app();
    let (_, token) = signup_and_login(&app, "Alice", "alice@x.com", "secret1").await;

    let (status, _) = request(
        &app,
        Method::PUT,
        "/bookings/cancel/00000000-0000-0000-0000-000000000000",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_booking_requires_auth() {
    let (app, _) = test_app();

    let (status, _) = request(
        &app,
        Method::POST,
        "/bookings/create",
        None,
        Some(hotel_booking_body()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_booking_validation() {
    let (app, _) = test_app();
    let (_, token) = signup_and_login(&app, "Alice", "alice@x.com", "secret1").await;

    // Missing fields are enumerated in the message.
    let (status, body) = request(
        &app,
        Method::POST,
        "/bookings/create",
        Some(&token),
        Some(json!({ "booking_type": "hotel", "check_in_date": "2025-06-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("check_out_date"));
    assert!(message.contains("guests"));

    // Unknown booking type.
    let (status, _) = request(
        &app,
        Method::POST,
        "/bookings/create",
        Some(&token),
        Some(json!({ "booking_type": "cruise", "total_price": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Check-out must follow check-in.
    let mut body_json = hotel_booking_body();
    body_json["check_out_date"] = json!("2025-05-30");
    let (status, body) = request(
        &app,
        Method::POST,
        "/bookings/create",
        Some(&token),
        Some(body_json),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("check_out_date"));

    // A mistyped field is a plain validation failure, not a 422.
    let mut body_json = hotel_booking_body();
    body_json["guests"] = json!("two");
    let (status, _) = request(
        &app,
        Method::POST,
        "/bookings/create",
        Some(&token),
        Some(body_json),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_listing_tolerates_out_of_range_page() {
    let (app, _) = test_app();
    let (_, token) = signup_and_login(&app, "Alice", "alice@x.com", "secret1").await;

    let (status, _) = request(
        &app,
        Method::POST,
        "/bookings/create",
        Some(&token),
        Some(hotel_booking_body()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The largest representable page must come back empty, not error.
    let uri = format!("/bookings/user-bookings?page={}&limit=100", i64::MAX);
    let (status, body) = request(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookings"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_travel_booking_flow() {
    let (app, _) = test_app();
    let (user_id, token) = signup_and_login(&app, "Alice", "alice@x.com", "secret1").await;

    // Empty participant list is rejected.
    let (status, _) = request(
        &app,
        Method::POST,
        "/bookings/create",
        Some(&token),
        Some(json!({
            "booking_type": "travel",
            "travel_date": "2025-07-10",
            "participants": [],
            "total_price": 500,
            "package_name": "Andes Trek"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        &app,
        Method::POST,
        "/bookings/create",
        Some(&token),
        Some(json!({
            "booking_type": "travel",
            "travel_date": "2025-07-10",
            "participants": [
                { "name": "Alice", "age": 31, "gender": "female" },
                { "name": "Dana", "age": 29, "gender": "nonbinary" }
            ],
            "total_price": 500,
            "package_name": "Andes Trek",
            "destination": "Peru",
            "duration_days": 7
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["status"], "confirmed");
    assert_eq!(body["booking"]["user_id"], user_id.as_str());
    assert_eq!(
        body["booking"]["details"]["participants"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn test_listing_is_paginated_and_newest_first() {
    let (app, _) = test_app();
    let (_, token) = signup_and_login(&app, "Alice", "alice@x.com", "secret1").await;

    for _ in 0..3 {
        let (status, _) = request(
            &app,
            Method::POST,
            "/bookings/create",
            Some(&token),
            Some(hotel_booking_body()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, page1) = request(
        &app,
        Method::GET,
        "/bookings/user-bookings?page=1&limit=2",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page1["bookings"].as_array().unwrap().len(), 2);

    let (_, page2) = request(
        &app,
        Method::GET,
        "/bookings/user-bookings?page=2&limit=2",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(page2["bookings"].as_array().unwrap().len(), 1);

    // Pages do not overlap.
    let ids1: Vec<&str> = page1["bookings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap())
        .collect();
    let id2 = page2["bookings"][0]["id"].as_str().unwrap();
    assert!(!ids1.contains(&id2));

    // Newest first within a page.
    let created: Vec<chrono::DateTime<chrono::Utc>> = page1["bookings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["created_at"].as_str().unwrap().parse().unwrap())
        .collect();
    assert!(created[0] >= created[1]);
}
