pub mod cache;
pub mod calendar;
pub mod leetcode;
pub mod stats;

pub use cache::{MemoryCache, RedisCache, StatsCache, UnavailableCache};
pub use leetcode::client::{GraphQLClient, LeetCodeClient};
pub use stats::{CacheFailurePolicy, StatsError, StatsService, UserStatsResponse};
