use crate::{
    cache::{profile_key, rolling_key, CacheError, StatsCache, DEFAULT_TTL_SECONDS},
    calendar::{self, CalendarEntry, CalendarError},
    leetcode::{
        client::{GraphQLClient, LeetCodeError},
        model::*,
        query::{
            CalendarVariables, UserVariables, LANGUAGE_STATS_QUERY, USER_CALENDAR_QUERY,
            USER_PROFILE_QUERY,
        },
    },
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

type Result<T> = std::result::Result<T, StatsError>;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("user {0} not found")]
    NotFound(String),
    #[error("LeetCode is unavailable: {0}")]
    UpstreamUnavailable(#[source] LeetCodeError),
    #[error("cache is unavailable: {0}")]
    CacheUnavailable(#[from] CacheError),
    #[error("malformed response from LeetCode: {0}")]
    MalformedResponse(String),
}

impl From<LeetCodeError> for StatsError {
    fn from(e: LeetCodeError) -> StatsError {
        match e {
            LeetCodeError::DeserializeError(inner) => {
                StatsError::MalformedResponse(inner.to_string())
            }
            e if e.is_transport() => StatsError::UpstreamUnavailable(e),
            e => StatsError::MalformedResponse(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for StatsError {
    fn from(e: serde_json::Error) -> StatsError {
        StatsError::MalformedResponse(e.to_string())
    }
}

impl From<CalendarError> for StatsError {
    fn from(e: CalendarError) -> StatsError {
        StatsError::MalformedResponse(e.to_string())
    }
}

/// What to do when the cache store itself fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheFailurePolicy {
    /// Log the failure and serve from upstream as if the cache were empty.
    #[default]
    FailOpen,
    /// Fail the request with [`StatsError::CacheUnavailable`].
    FailClosed,
}

/// Language and calendar snapshot, cached under the rolling key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraStats {
    pub language_stats: Vec<LanguageStat>,
    pub calendar: Vec<CalendarEntry>,
}

/// Body of `GET /user/:username`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsResponse {
    pub username: String,
    pub profile: Profile,
    pub submit_stats_global: SubmitStats,
    pub user_contest_ranking: Option<ContestRanking>,
    pub user_contest_ranking_history: Option<Vec<ContestHistoryEntry>>,
    pub language_stats: Vec<LanguageStat>,
    pub calendar: Vec<CalendarEntry>,
}

impl UserStatsResponse {
    pub fn new(snapshot: ProfileSnapshot, extra: ExtraStats) -> Self {
        let MatchedUser {
            username,
            profile,
            submit_stats_global,
        } = snapshot.matched_user;

        UserStatsResponse {
            username,
            profile,
            submit_stats_global,
            user_contest_ranking: snapshot.user_contest_ranking,
            user_contest_ranking_history: snapshot.user_contest_ranking_history,
            language_stats: extra.language_stats,
            calendar: extra.calendar,
        }
    }
}

pub struct StatsService {
    client: Arc<dyn GraphQLClient>,
    cache: Arc<dyn StatsCache>,
    ttl_seconds: u64,
    failure_policy: CacheFailurePolicy,
}

impl StatsService {
    pub fn new(client: Arc<dyn GraphQLClient>, cache: Arc<dyn StatsCache>) -> Self {
        StatsService {
            client,
            cache,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            failure_policy: CacheFailurePolicy::default(),
        }
    }

    pub fn with_ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: CacheFailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    pub async fn ping_cache(&self) -> Result<()> {
        self.cache.ping().await?;
        Ok(())
    }

    /// Profile, submission stats and contest history of `username`.
    pub async fn fetch_user_data(&self, username: &str) -> Result<ProfileSnapshot> {
        let key = profile_key(username);
        if let Some(snapshot) = self.load::<ProfileSnapshot>(&key).await? {
            return Ok(snapshot);
        }

        tracing::info!("Fetch profile of {} from LeetCode", username);
        let data: UserProfileData = self
            .query(USER_PROFILE_QUERY, UserVariables { username })
            .await?;
        let snapshot = data
            .into_snapshot()
            .ok_or_else(|| StatsError::NotFound(username.to_string()))?;

        self.store(&key, &snapshot).await?;
        Ok(snapshot)
    }

    /// Language stats and the trailing 12 month submission calendar of `username`.
    pub async fn fetch_extra_stats(&self, username: &str) -> Result<ExtraStats> {
        self.fetch_extra_stats_on(username, Utc::now().date_naive()).await
    }

    pub async fn fetch_extra_stats_on(
        &self,
        username: &str,
        today: NaiveDate,
    ) -> Result<ExtraStats> {
        let this_year = today.year();
        let last_year = this_year - 1;
        let key = rolling_key(username, last_year, this_year);
        if let Some(stats) = self.load::<ExtraStats>(&key).await? {
            return Ok(stats);
        }

        tracing::info!(
            "Fetch language stats and calendar {}-{} of {} from LeetCode",
            last_year,
            this_year,
            username
        );
        let (languages, last_calendar, this_calendar) = tokio::try_join!(
            self.query::<LanguageStatsData>(LANGUAGE_STATS_QUERY, UserVariables { username }),
            self.query::<CalendarData>(
                USER_CALENDAR_QUERY,
                CalendarVariables {
                    username,
                    year: last_year,
                },
            ),
            self.query::<CalendarData>(
                USER_CALENDAR_QUERY,
                CalendarVariables {
                    username,
                    year: this_year,
                },
            ),
        )?;

        let language_stats: Vec<LanguageStat> = languages
            .matched_user
            .ok_or_else(|| StatsError::NotFound(username.to_string()))?
            .language_problem_count
            .into_iter()
            .map(LanguageStat::from)
            .collect();

        let cutoff = calendar::rolling_window_cutoff(today);
        let last = normalize_calendar(username, last_calendar, cutoff)?;
        let this = normalize_calendar(username, this_calendar, cutoff)?;

        let stats = ExtraStats {
            language_stats,
            calendar: calendar::merge(last, this),
        };

        self.store(&key, &stats).await?;
        Ok(stats)
    }

    /// Both fetch paths of `username` joined into the endpoint's response body.
    pub async fn fetch_user_stats(&self, username: &str) -> Result<UserStatsResponse> {
        let (snapshot, extra) = tokio::try_join!(
            self.fetch_user_data(username),
            self.fetch_extra_stats(username)
        )?;

        Ok(UserStatsResponse::new(snapshot, extra))
    }

    async fn query<D: DeserializeOwned>(
        &self,
        document: &str,
        variables: impl Serialize,
    ) -> Result<D> {
        let variables = serde_json::to_value(variables)?;
        let body = self.client.query(document, variables).await?;
        let response: GraphQLResponse<D> = serde_json::from_value(body)?;
        Ok(response.into_data()?)
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let raw = match self.cache.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(e) => {
                self.on_cache_error(key, e)?;
                return Ok(None);
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                tracing::debug!("Cache hit: {}", key);
                Ok(Some(value))
            }
            Err(e) => {
                tracing::warn!("Discard undecodable cache entry {}: {:?}", key, e);
                Ok(None)
            }
        }
    }

    async fn store<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        match self.cache.set_ex(key, &raw, self.ttl_seconds).await {
            Ok(_) => Ok(()),
            Err(e) => self.on_cache_error(key, e),
        }
    }

    fn on_cache_error(&self, key: &str, e: CacheError) -> Result<()> {
        match self.failure_policy {
            CacheFailurePolicy::FailOpen => {
                tracing::warn!(
                    "Cache operation on {} failed, continue without cache: {:?}",
                    key,
                    e
                );
                Ok(())
            }
            CacheFailurePolicy::FailClosed => {
                tracing::error!("Cache operation on {} failed: {:?}", key, e);
                Err(StatsError::CacheUnavailable(e))
            }
        }
    }
}

fn normalize_calendar(
    username: &str,
    data: CalendarData,
    cutoff: NaiveDate,
) -> Result<Vec<CalendarEntry>> {
    let user = data
        .matched_user
        .ok_or_else(|| StatsError::NotFound(username.to_string()))?;

    match user.user_calendar {
        Some(user_calendar) => {
            let entries = calendar::normalize(&user_calendar.submission_calendar, cutoff)?;
            Ok(entries)
        }
        None => Ok(Vec::new()),
    }
}
