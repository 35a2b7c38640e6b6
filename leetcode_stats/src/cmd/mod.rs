pub mod fetch;
pub mod server;

use anyhow::{Context, Result};
use leetcode_stats_libs::{
    leetcode::client::DEFAULT_GRAPHQL_URL, LeetCodeClient, MemoryCache, RedisCache, StatsCache,
    UnavailableCache,
};
use std::{env, sync::Arc};

pub fn create_client() -> Result<LeetCodeClient> {
    let graphql_url = env::var("LEETCODE_GRAPHQL_URL").unwrap_or(String::from(DEFAULT_GRAPHQL_URL));
    tracing::info!("Use LeetCode GraphQL endpoint {}", graphql_url);

    LeetCodeClient::new(&graphql_url).with_context(|| {
        let message = format!("couldn't create LeetCode client for {}", graphql_url);
        tracing::error!(message);
        message
    })
}

/// Connects to Redis, or hands back an always-failing cache when the store is unreachable.
pub async fn connect_cache(in_memory: bool) -> Arc<dyn StatsCache> {
    if in_memory {
        tracing::warn!("Cache entries are kept in process memory and lost on shutdown.");
        return Arc::new(MemoryCache::new());
    }

    let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| {
        tracing::warn!("REDIS_URL environment variable is not set. Default value `redis://127.0.0.1:6379` will be used.");
        String::from("redis://127.0.0.1:6379")
    });

    match RedisCache::connect(&redis_url).await {
        Ok(cache) => {
            tracing::info!("Connected to the cache store.");
            Arc::new(cache)
        }
        Err(e) => {
            tracing::error!("couldn't connect to the cache store: {:?}", e);
            Arc::new(UnavailableCache)
        }
    }
}
