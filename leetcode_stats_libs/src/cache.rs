use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use std::collections::HashMap;
use thiserror::Error;
use tokio::{
    sync::Mutex,
    time::{Duration, Instant},
};

type Result<T> = std::result::Result<T, CacheError>;

pub const DEFAULT_TTL_SECONDS: u64 = 60 * 60;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache request failed")]
    RedisError(#[from] redis::RedisError),
    #[error("cache is not available")]
    Unavailable,
}

/// Key of the profile snapshot of `username`.
pub fn profile_key(username: &str) -> String {
    format!("user:{}", username)
}

/// Key of the language and calendar snapshot of `username`.
///
/// The years are part of the key so entries rotate when the year changes.
pub fn rolling_key(username: &str, last_year: i32, this_year: i32) -> String {
    format!("user:rolling:{}:{}-{}", username, last_year, this_year)
}

#[async_trait]
pub trait StatsCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()>;
    async fn ping(&self) -> Result<()>;
}

pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(RedisCache { connection })
    }
}

#[async_trait]
impl StatsCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut connection = self.connection.clone();
        let value: Option<String> = connection.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let mut connection = self.connection.clone();
        connection
            .set_ex::<_, _, ()>(key, value, ttl_seconds as usize)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut connection = self.connection.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut connection)
            .await?;
        Ok(())
    }
}

/// Process-local cache with per-entry expiry.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entry_count(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        entries.values().filter(|(_, expires_at)| *expires_at > now).count()
    }

    pub async fn contains_key(&self, key: &str) -> bool {
        matches!(self.get(key).await, Ok(Some(_)))
    }
}

#[async_trait]
impl StatsCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => {
                return Ok(Some(value.clone()))
            }
            Some(_) => {}
            None => return Ok(None),
        }

        // expired
        entries.remove(key);
        Ok(None)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(
            key.to_string(),
            (value.to_string(), now + Duration::from_secs(ttl_seconds)),
        );
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Stand-in used when the store could not be reached at startup.
pub struct UnavailableCache;

#[async_trait]
impl StatsCache for UnavailableCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(CacheError::Unavailable)
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl_seconds: u64) -> Result<()> {
        Err(CacheError::Unavailable)
    }

    async fn ping(&self) -> Result<()> {
        Err(CacheError::Unavailable)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::leetcode::model::{MatchedUser, Profile, ProfileSnapshot, SubmitStats};

    #[test]
    fn test_cache_keys() {
        assert_eq!(profile_key("alice"), "user:alice");
        assert_eq!(rolling_key("alice", 2023, 2024), "user:rolling:alice:2023-2024");
    }

    fn snapshot() -> ProfileSnapshot {
        ProfileSnapshot {
            matched_user: MatchedUser {
                username: String::from("alice"),
                profile: Profile {
                    real_name: Some(String::from("Alice")),
                    user_avatar: None,
                    ranking: Some(100),
                    country_name: Some(String::from("Japan")),
                    reputation: Some(3),
                    about_me: None,
                    school: None,
                    websites: vec![],
                    skill_tags: vec![String::from("graphs")],
                    company: None,
                    job_title: None,
                },
                submit_stats_global: SubmitStats {
                    ac_submission_num: vec![],
                    total_submission_num: vec![],
                },
            },
            user_contest_ranking: None,
            user_contest_ranking_history: Some(vec![]),
        }
    }

    #[tokio::test]
    async fn test_memory_cache_round_trip() {
        let cache = MemoryCache::new();
        let original = snapshot();

        cache
            .set_ex(
                &profile_key("alice"),
                &serde_json::to_string(&original).unwrap(),
                DEFAULT_TTL_SECONDS,
            )
            .await
            .unwrap();

        let raw = cache.get(&profile_key("alice")).await.unwrap().unwrap();
        let restored: ProfileSnapshot = serde_json::from_str(&raw).unwrap();

        assert_eq!(restored, original);
        assert!(cache.get(&profile_key("bob")).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_cache_expires() {
        let cache = MemoryCache::new();
        cache.set_ex("key", "value", 10).await.unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(cache.get("key").await.unwrap(), Some(String::from("value")));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get("key").await.unwrap(), None);
        assert_eq!(cache.entry_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_cache_drops_expired_entries_on_write() {
        let cache = MemoryCache::new();
        cache.set_ex("user:alice", "a", 10).await.unwrap();
        cache.set_ex("user:bob", "b", 60).await.unwrap();

        tokio::time::advance(Duration::from_secs(11)).await;
        cache.set_ex("user:carol", "c", 10).await.unwrap();

        let entries = cache.entries.lock().await;
        assert_eq!(entries.len(), 2);
        assert!(!entries.contains_key("user:alice"));
    }

    #[tokio::test]
    async fn test_unavailable_cache_fails_every_operation() {
        let cache = UnavailableCache;
        assert!(matches!(cache.get("key").await, Err(CacheError::Unavailable)));
        assert!(cache.set_ex("key", "value", 1).await.is_err());
        assert!(cache.ping().await.is_err());
    }

    /// Normal system test of a Redis round trip.
    ///
    /// Run this test with the Docker container started with the following command.
    ///
    /// ```ignore
    /// docker run --rm -d -p 6379:6379 redis:7
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_redis_round_trip() {
        let cache = RedisCache::connect("redis://127.0.0.1:6379").await.unwrap();
        cache.ping().await.unwrap();

        let original = snapshot();
        let key = profile_key("redis-round-trip");
        cache
            .set_ex(&key, &serde_json::to_string(&original).unwrap(), 60)
            .await
            .unwrap();

        let raw = cache.get(&key).await.unwrap().unwrap();
        let restored: ProfileSnapshot = serde_json::from_str(&raw).unwrap();
        assert_eq!(restored, original);
    }
}
