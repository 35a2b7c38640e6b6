use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use leetcode_stats_libs::StatsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error(transparent)]
    Stats(#[from] StatsError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidUsername(_) => StatusCode::BAD_REQUEST,
            ApiError::Stats(StatsError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Stats(StatsError::UpstreamUnavailable(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Stats(StatsError::MalformedResponse(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Stats(StatsError::CacheUnavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::InvalidUsername(_) => tracing::warn!("rejected request: {}", self),
            ApiError::Stats(e) => tracing::error!("request failed cause: {:?}", e),
        }

        (status, self.to_string()).into_response()
    }
}
