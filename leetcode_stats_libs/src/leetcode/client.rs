use crate::leetcode::{model::GraphQLResponse, query::GraphQLRequest};
use async_trait::async_trait;
use itertools::Itertools;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, REFERER, USER_AGENT},
    Client, Url,
};
use serde_json::Value;
use thiserror::Error;

type Result<T> = std::result::Result<T, LeetCodeError>;

pub const DEFAULT_GRAPHQL_URL: &str = "https://leetcode.com/graphql";
const REFERER_URL: &str = "https://leetcode.com";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum LeetCodeError {
    #[error("failed to request to LeetCode")]
    RequestError(#[from] reqwest::Error),
    #[error("failed to deserialize JSON data")]
    DeserializeError(#[from] serde_json::Error),
    #[error("invalid LeetCode url given")]
    InvalidUrlError(#[from] url::ParseError),
    #[error("response has no data: {0}")]
    MissingData(String),
    #[error("{0}")]
    UnexpectedError(String),
}

impl LeetCodeError {
    /// Whether the failure happened before a usable response came back.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            LeetCodeError::RequestError(_)
                | LeetCodeError::InvalidUrlError(_)
                | LeetCodeError::UnexpectedError(_)
        )
    }
}

impl<D> GraphQLResponse<D> {
    /// Takes `data` out of the envelope, reporting upstream `errors` when it is absent.
    pub fn into_data(self) -> Result<D> {
        match self.data {
            Some(data) => Ok(data),
            None => Err(LeetCodeError::MissingData(
                self.errors
                    .unwrap_or_default()
                    .iter()
                    .map(|error| &error.message)
                    .join("; "),
            )),
        }
    }
}

#[async_trait]
pub trait GraphQLClient: Send + Sync {
    /// Sends `document` with `variables` and returns the parsed response body.
    async fn query(&self, document: &str, variables: Value) -> Result<Value>;
}

pub struct LeetCodeClient {
    url: Url,
    client: Client,
}

impl LeetCodeClient {
    pub fn new(graphql_url: &str) -> Result<Self> {
        let url = Url::parse(graphql_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(REFERER, HeaderValue::from_static(REFERER_URL));
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let client = Client::builder()
            .gzip(true)
            .default_headers(headers)
            .build()?;

        Ok(LeetCodeClient { url, client })
    }
}

#[async_trait]
impl GraphQLClient for LeetCodeClient {
    async fn query(&self, document: &str, variables: Value) -> Result<Value> {
        let res = self
            .client
            .post(self.url.clone())
            .json(&GraphQLRequest {
                query: document,
                variables,
            })
            .send()
            .await?;

        match res.error_for_status_ref() {
            Ok(_) => {
                let body = res.bytes().await?;
                let body: Value = serde_json::from_slice(&body)?;
                Ok(body)
            }
            Err(e) => {
                let body = res.text().await.unwrap_or_default();
                Err(LeetCodeError::UnexpectedError(format!(
                    "unexpected error [{}] cause [{}]",
                    e,
                    body.chars().take(200).collect::<String>()
                )))
            }
        }
    }
}
