use crate::modules::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
};
use http::request::Parts;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError};

static USERNAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").unwrap());

fn validate_username(value: &str) -> Result<(), ValidationError> {
    if USERNAME_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid character in username"))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UserPath {
    #[validate(length(min = 1, max = 50), custom = "validate_username")]
    pub username: String,
}

/// The `:username` path segment, checked against LeetCode's username charset.
pub struct ValidatedUsername(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ValidatedUsername
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(path) = Path::<UserPath>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::error!("Parsing error: {}", rejection);
                ApiError::InvalidUsername(rejection.to_string())
            })?;

        path.validate().map_err(|rejection| {
            tracing::error!("Validation error: {}", rejection);
            ApiError::InvalidUsername(format!("{}", rejection).replace('\n', ", "))
        })?;

        Ok(ValidatedUsername(path.username))
    }
}
