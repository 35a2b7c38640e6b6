use crate::cmd::{connect_cache, create_client};
use anyhow::{Context, Result};
use clap::Args;
use leetcode_stats_libs::StatsService;
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct FetchArgs {
    username: String,
    #[arg(long)]
    pretty: bool,
    /// Skip Redis and cache in process memory.
    #[arg(long)]
    memory_cache: bool,
}

pub async fn run(args: FetchArgs) -> Result<()> {
    let client = create_client()?;
    let cache = connect_cache(args.memory_cache).await;
    let service = StatsService::new(Arc::new(client), cache);

    let response = service
        .fetch_user_stats(&args.username)
        .await
        .with_context(|| {
            let message = format!("failed to fetch statistics of {}", args.username);
            tracing::error!(message);
            message
        })?;

    let body = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", body);

    Ok(())
}
