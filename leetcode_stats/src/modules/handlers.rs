use crate::modules::{error::ApiError, extract::ValidatedUsername};
use axum::{extract::Extension, http::StatusCode, Json};
use leetcode_stats_libs::{StatsService, UserStatsResponse};
use std::sync::Arc;
use tokio::time::Instant;

pub async fn get_user_stats(
    ValidatedUsername(username): ValidatedUsername,
    Extension(service): Extension<Arc<StatsService>>,
) -> Result<Json<UserStatsResponse>, ApiError> {
    let start_process = Instant::now();

    let result = service
        .fetch_user_stats(&username)
        .await
        .map_err(ApiError::from);

    let time: u128 = Instant::now().duration_since(start_process).as_millis();
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => e.status(),
    };
    tracing::info!(
        target: "querylog",
        "elapsed_time={} username={} status={}",
        time, username, status.as_u16()
    );

    result.map(Json)
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness(Extension(service): Extension<Arc<StatsService>>) -> StatusCode {
    match service.ping_cache().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!("cache is not ready: {:?}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
