use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use serde::Deserialize;
use skysense_api::models::Id;
use skysense_api::restful::{
    DeviceListResponse, DeviceTelemetry, HistoryResponse, LoginRequest, LoginResponse,
    RainRecapResponse, TelemetryResponse,
};
use time::OffsetDateTime;

use crate::error::ApiError;
use crate::simulate;
use crate::state::MockState;

pub fn create_router(state: MockState) -> Router {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/user-devices/:user_id", get(user_devices))
        .route("/api/device/exsmoth/:device_id", get(device_telemetry))
        .route("/api/device/history/:device_id", get(device_history))
        .route("/api/device/weather/rainy", get(weather_rainy))
        .with_state(state)
}

type BearerHeader = Option<TypedHeader<Authorization<Bearer>>>;

/// Resolves the caller or rejects with 401; a missing header counts as an
/// invalid token, not a malformed request.
async fn authorize(state: &MockState, auth: BearerHeader) -> Result<Id, ApiError> {
    let TypedHeader(auth) = auth.ok_or(ApiError::InvalidToken)?;

    state
        .authorize(auth.token())
        .await
        .ok_or(ApiError::InvalidToken)
}

async fn login(
    State(state): State<MockState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (token, user) = state
        .login(&body.email, &body.password)
        .await
        .ok_or(ApiError::InvalidCredentials)?;

    tracing::debug!(user_id = user.id, "login issued token");

    Ok(Json(LoginResponse { token, user }))
}

async fn user_devices(
    State(state): State<MockState>,
    auth: BearerHeader,
    Path(user_id): Path<Id>,
) -> Result<Json<DeviceListResponse>, ApiError> {
    let caller = authorize(&state, auth).await?;
    if caller != user_id {
        return Err(ApiError::Forbidden);
    }

    Ok(Json(DeviceListResponse {
        data: state.devices_for(user_id).await,
    }))
}

async fn device_telemetry(
    State(state): State<MockState>,
    auth: BearerHeader,
    Path(device_id): Path<Id>,
) -> Result<Json<TelemetryResponse>, ApiError> {
    authorize(&state, auth).await?;
    state.count_telemetry_request().await;

    let station = state
        .station(device_id)
        .await
        .ok_or(ApiError::DeviceNotFound)?;
    let latest = station
        .latest_reading()
        .cloned()
        .ok_or(ApiError::NoTelemetry)?;

    let simulation = state.simulation();
    let predictions = simulate::forecast(
        &station.readings,
        simulation.smoothing_alpha,
        simulation.forecast_days,
        OffsetDateTime::now_utc().date(),
    );

    Ok(Json(TelemetryResponse {
        latest: DeviceTelemetry {
            reading: latest,
            device: station.meta,
        },
        predictions,
    }))
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    page: Option<u32>,
}

async fn device_history(
    State(state): State<MockState>,
    auth: BearerHeader,
    Path(device_id): Path<Id>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    authorize(&state, auth).await?;

    let page = query.page.unwrap_or(1).max(1);
    let (entries, cursor) = state
        .history_page(device_id, page)
        .await
        .ok_or(ApiError::DeviceNotFound)?;

    Ok(Json(HistoryResponse { entries, cursor }))
}

async fn weather_rainy(
    State(state): State<MockState>,
    auth: BearerHeader,
) -> Result<Json<RainRecapResponse>, ApiError> {
    authorize(&state, auth).await?;

    Ok(Json(RainRecapResponse {
        rainy_conditions: state.rainy_conditions().await,
    }))
}
