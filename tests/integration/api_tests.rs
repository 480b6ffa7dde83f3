//! API integration tests against a running server

use agenda_server::models::{Role, UserClaims};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-this-secret-in-production".to_string())
}

/// Sign a client token the way the authentication service would
fn client_token() -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = UserClaims {
        sub: "integration@example.com".to_string(),
        user_id: Uuid::new_v4(),
        role: Role::Client,
        company_id: None,
        staff_member_id: None,
        exp: now + 600,
        iat: now,
    };
    claims.create_token(&jwt_secret()).expect("Failed to sign token")
}

/// Seeded slot to book, taken from the environment
fn seeded_booking() -> Option<Value> {
    let var = |name: &str| std::env::var(name).ok();
    Some(json!({
        "companyId": var("AGENDA_TEST_COMPANY_ID")?,
        "serviceId": var("AGENDA_TEST_SERVICE_ID")?,
        "staffMemberId": var("AGENDA_TEST_STAFF_ID")?,
        "date": var("AGENDA_TEST_DATE")?,
        "time": var("AGENDA_TEST_TIME")?,
    }))
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let response = Client::new()
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn test_booking_without_token() {
    let response = Client::new()
        .post(format!("{}/appointments", BASE_URL))
        .json(&json!({ "date": "2030-01-01", "time": "09:00" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_booking_with_invalid_token() {
    let response = Client::new()
        .get(format!("{}/appointments", BASE_URL))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_booking_missing_fields() {
    let response = Client::new()
        .post(format!("{}/appointments", BASE_URL))
        .bearer_auth(client_token())
        .json(&json!({ "date": "2030-01-01" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
#[ignore]
async fn test_available_times_unknown_staff() {
    let response = Client::new()
        .get(format!("{}/appointments/available-times", BASE_URL))
        .query(&[
            ("staffMemberId", Uuid::new_v4().to_string()),
            ("serviceId", Uuid::new_v4().to_string()),
            ("date", "2030-01-01".to_string()),
        ])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_list_my_appointments() {
    let response = Client::new()
        .get(format!("{}/appointments", BASE_URL))
        .bearer_auth(client_token())
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    // a fresh client id has no bookings
    assert_eq!(body, json!([]));
}

/// Needs AGENDA_TEST_* variables pointing at a free seeded slot
#[tokio::test]
#[ignore]
async fn test_concurrent_bookings_single_winner() {
    let Some(booking) = seeded_booking() else {
        eprintln!("AGENDA_TEST_* not set, skipping");
        return;
    };
    let client = Client::new();

    let send = |body: Value| {
        let client = client.clone();
        async move {
            client
                .post(format!("{}/appointments", BASE_URL))
                .bearer_auth(client_token())
                .json(&body)
                .send()
                .await
                .expect("Failed to send request")
                .status()
        }
    };

    let (first, second) = tokio::join!(send(booking.clone()), send(booking));
    let mut statuses = [first, second];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::BAD_REQUEST]);
}
