use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http;
use axum::http::{Request, StatusCode};
use skysense_api::models::Reading;
use skysense_api::restful::{
    DeviceListResponse, ErrorResponse, HistoryResponse, LoginRequest, LoginResponse,
    RainRecapResponse, TelemetryResponse,
};
use skysense_mock::create_router;
use skysense_mock::state::MockState;
use time::macros::datetime;
use tower::ServiceExt;

async fn seeded() -> (Router, MockState, String) {
    let state = MockState::default();
    state
        .seed_user(42, "Field Tech", "tech@skysense.dev", "correct-horse")
        .await;
    state
        .seed_station(7, 42, "Harbor Station", Some((-6.2088, 106.8456)))
        .await;

    let (token, _) = state
        .login("tech@skysense.dev", "correct-horse")
        .await
        .unwrap();

    (create_router(state.clone()), state, token)
}

fn reading(temperature_c: f64, humidity_pct: f64, tick: i64) -> Reading {
    Reading {
        temperature_c,
        wind_speed_kmh: 7.0,
        humidity_pct,
        pressure_mbar: 1010.0,
        latitude: None,
        longitude: None,
        recorded_at: datetime!(2025-03-14 00:00:00 UTC) + time::Duration::minutes(tick * 10),
    }
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn login_request(email: &str, password: &str) -> Request<Body> {
    let body = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };

    Request::builder()
        .method(http::Method::POST)
        .uri("/api/login")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn decode<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_login_issues_token() {
    let (router, _state, _token) = seeded().await;

    let response = router
        .oneshot(login_request("tech@skysense.dev", "correct-horse"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let login: LoginResponse = decode(response).await;
    assert!(!login.token.is_empty());
    assert_eq!(login.user.id, 42);
    assert_eq!(login.user.email, "tech@skysense.dev");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let (router, _state, _token) = seeded().await;

    let response = router
        .oneshot(login_request("tech@skysense.dev", "wrong"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let error: ErrorResponse = decode(response).await;
    assert_eq!(error.error.code, 401);
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let (router, _state, _token) = seeded().await;

    let request = Request::builder()
        .uri("/api/user-devices/42")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_revoked_token_is_unauthorized() {
    let (router, state, token) = seeded().await;

    state.revoke_token(&token).await;

    let response = router
        .oneshot(get("/api/user-devices/42", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_device_list_is_scoped_to_caller() {
    let (router, state, token) = seeded().await;
    state.push_reading(7, reading(21.5, 55.0, 0)).await;

    let response = router
        .clone()
        .oneshot(get("/api/user-devices/42", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let list: DeviceListResponse = decode(response).await;
    assert_eq!(list.data.len(), 1);
    assert_eq!(list.data[0].id, 7);
    assert_eq!(
        list.data[0].latest_reading.as_ref().map(|r| r.temperature_c),
        Some(21.5)
    );

    // Someone else's device list is off limits.
    let response = router
        .oneshot(get("/api/user-devices/99", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_station_without_readings_lists_with_no_reading() {
    let (router, _state, token) = seeded().await;

    let response = router
        .oneshot(get("/api/user-devices/42", &token))
        .await
        .unwrap();

    let list: DeviceListResponse = decode(response).await;
    assert_eq!(list.data[0].latest_reading, None);
}

#[tokio::test]
async fn test_telemetry_carries_latest_and_forecast() {
    let (router, state, token) = seeded().await;
    state.push_reading(7, reading(20.0, 60.0, 0)).await;
    state.push_reading(7, reading(23.0, 65.0, 1)).await;

    let response = router
        .oneshot(get("/api/device/exsmoth/7", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let telemetry: TelemetryResponse = decode(response).await;
    assert_eq!(telemetry.latest.reading.temperature_c, 23.0);
    assert_eq!(telemetry.latest.device.id, 7);

    // One numeric row and one condition row per forecast day.
    let days = state.simulation().forecast_days as usize;
    assert_eq!(telemetry.predictions.len(), days * 2);
}

#[tokio::test]
async fn test_telemetry_for_unknown_device_is_not_found() {
    let (router, _state, token) = seeded().await;

    let response = router
        .oneshot(get("/api/device/exsmoth/999", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_history_pages_newest_first_and_clamps() {
    let (router, state, token) = seeded().await;
    for tick in 0..25i64 {
        state.push_reading(7, reading(tick as f64, 50.0, tick)).await;
    }

    let response = router
        .clone()
        .oneshot(get("/api/device/history/7?page=1", &token))
        .await
        .unwrap();
    let page: HistoryResponse = decode(response).await;

    assert_eq!(page.entries.len(), 10);
    assert_eq!(page.entries[0].temperature_c, 24.0);
    assert_eq!(page.cursor.current_page, 1);
    assert_eq!(page.cursor.last_page, 3);
    assert_eq!(page.cursor.total_items, 25);

    // Last partial page.
    let response = router
        .clone()
        .oneshot(get("/api/device/history/7?page=3", &token))
        .await
        .unwrap();
    let page: HistoryResponse = decode(response).await;
    assert_eq!(page.entries.len(), 5);

    // Past the end: empty entries, cursor echoes the request.
    let response = router
        .clone()
        .oneshot(get("/api/device/history/7?page=9", &token))
        .await
        .unwrap();
    let page: HistoryResponse = decode(response).await;
    assert!(page.entries.is_empty());
    assert_eq!(page.cursor.current_page, 9);

    // Missing page parameter means page one.
    let response = router
        .oneshot(get("/api/device/history/7", &token))
        .await
        .unwrap();
    let page: HistoryResponse = decode(response).await;
    assert_eq!(page.cursor.current_page, 1);
}

#[tokio::test]
async fn test_rainy_recap_contains_only_rain_grade_stations() {
    let (router, state, token) = seeded().await;
    state
        .seed_station(9, 42, "Hillside Station", None)
        .await;
    state.push_reading(7, reading(19.0, 95.0, 0)).await;
    state.push_reading(9, reading(27.0, 40.0, 0)).await;

    let response = router
        .oneshot(get("/api/device/weather/rainy", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let recap: RainRecapResponse = decode(response).await;
    assert_eq!(recap.rainy_conditions.len(), 1);

    let observation = recap.rainy_conditions.get("7").unwrap();
    assert_eq!(observation.device_id, 7);
    assert_eq!(observation.place_name, "Harbor Station");
    assert_eq!(observation.reading.humidity_pct, 95.0);
}
