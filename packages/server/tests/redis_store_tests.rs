//! Redis key-value store against a real Redis container.
//!
//! Needs Docker: `cargo test --test redis_store_tests -- --ignored`

use std::time::Duration;

use seo_audit_core::kernel::{BaseKvStore, RedisKvStore};
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::redis::Redis;

#[tokio::test]
#[ignore = "requires Docker"]
async fn put_get_and_expire() {
    let redis = Redis::default()
        .start()
        .await
        .expect("Failed to start Redis container");
    let host = redis.get_host().await.unwrap();
    let port = redis.get_host_port_ipv4(6379).await.unwrap();

    let store = RedisKvStore::connect(&format!("redis://{}:{}", host, port))
        .await
        .expect("Failed to connect to Redis");

    assert_eq!(store.get("rate:nobody@acme.test").await.unwrap(), None);

    store
        .put("rate:owner@acme.test", "1767225600000", Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(
        store.get("rate:owner@acme.test").await.unwrap().as_deref(),
        Some("1767225600000")
    );

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(store.get("rate:owner@acme.test").await.unwrap(), None);
}
