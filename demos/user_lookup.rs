//! User Lookup Example
//!
//! Resolves users and their addresses through an in-memory cache in front
//! of a slow "database", showing cold and warm loads side by side.
//!
//! Usage:
//!   RUST_LOG=batch_readthrough=debug cargo run --example user_lookup

use batch_readthrough::cache::{HashedKeyMapper, MemoryCache, PrefixKeyMapper};
use batch_readthrough::handler::{HandlerConfig, MultiHandler, SingleHandler};
use batch_readthrough::store::store_fn;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct User {
    id: u32,
    name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Address {
    user_id: u32,
    line: String,
}

const CONFIG: &str = r#"
enabled: true
ttl_ms: 60000
key_prefix: demo
"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?),
        )
        .try_init();

    println!("=== Batch Read-Through Demo ===\n");

    let config = HandlerConfig::from_yaml(CONFIG)?;
    let cache = MemoryCache::new();

    // users 1..=5 exist; every lookup pays 50ms
    let users = SingleHandler::new(
        store_fn(|ids: Vec<u32>| async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(ids
                .into_iter()
                .filter(|id| *id <= 5)
                .map(|id| User { id, name: format!("user-{}", id) })
                .collect::<Vec<_>>())
        }),
        |u: &User| u.id,
    )
    .with_cache(cache.clone(), PrefixKeyMapper::new("user"))
    .with_json_codec()
    .with_config(config.clone());

    let addresses = MultiHandler::new(
        store_fn(|ids: Vec<u32>| async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(ids
                .into_iter()
                .filter(|id| id % 2 == 1)
                .flat_map(|user_id| {
                    [
                        Address { user_id, line: format!("{} Main St", user_id) },
                        Address { user_id, line: format!("PO Box {}", user_id) },
                    ]
                })
                .collect::<Vec<_>>())
        }),
        |a: &Address| a.user_id,
    )
    .with_cache(cache.clone(), HashedKeyMapper::new("address"))
    .with_json_codec()
    .with_config(config);

    for round in ["cold", "warm"] {
        println!("--- {} ---", round);
        let start = Instant::now();
        let resolution = users.load([3u32, 1, 3, 9, 2]).await?;
        let report = resolution.report.clone();
        let found = resolution.into_list();
        println!(
            "users: {:?} in {:?} (hits {}, misses {}, negative {})",
            found.iter().map(|u| u.name.as_str()).collect::<Vec<_>>(),
            start.elapsed(),
            report.hits,
            report.misses,
            report.negative,
        );

        let start = Instant::now();
        let by_user = addresses.load_map([1u32, 2, 3]).await?;
        let mut owners: Vec<_> = by_user.keys().copied().collect();
        owners.sort_unstable();
        println!("addresses for users {:?} in {:?}\n", owners, start.elapsed());
    }

    println!("cache entries: {}", cache.len());
    Ok(())
}
