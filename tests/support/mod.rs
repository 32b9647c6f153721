//! Shared fixtures: a cache and a store that record every batched call.

#![allow(dead_code)]

use async_trait::async_trait;
use batch_readthrough::{BatchStore, CacheBackend, Error, MemoryCache, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub user_name: String,
    pub user_address: String,
}

pub fn user(id: &str) -> User {
    User {
        user_id: id.to_string(),
        user_name: format!("name{}", id),
        user_address: format!("address{}", id),
    }
}

pub fn user_id(u: &User) -> String {
    u.user_id.clone()
}

pub fn users(ids: &[&str]) -> Vec<User> {
    ids.iter().map(|id| user(id)).collect()
}

pub fn keys(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

/// Memory cache that records each batched call and can be told to fail writes.
#[derive(Clone, Default)]
pub struct RecordingCache {
    pub inner: MemoryCache,
    gets: Arc<Mutex<Vec<Vec<String>>>>,
    sets: Arc<Mutex<Vec<(HashMap<String, String>, Duration)>>>,
    fail_sets: Arc<AtomicBool>,
    fail_gets: Arc<AtomicBool>,
}

impl RecordingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_sets(&self, fail: bool) {
        self.fail_sets.store(fail, Ordering::SeqCst);
    }

    pub fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub fn get_calls(&self) -> Vec<Vec<String>> {
        self.gets.lock().unwrap().clone()
    }

    pub fn set_calls(&self) -> Vec<(HashMap<String, String>, Duration)> {
        self.sets.lock().unwrap().clone()
    }
}

#[async_trait]
impl CacheBackend for RecordingCache {
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        self.gets.lock().unwrap().push(keys.to_vec());
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(Error::cache("connection refused"));
        }
        self.inner.get_many(keys).await
    }

    async fn set_many(&self, entries: HashMap<String, String>, ttl: Duration) -> Result<()> {
        self.sets.lock().unwrap().push((entries.clone(), ttl));
        if self.fail_sets.load(Ordering::SeqCst) {
            return Err(Error::cache("OOM command not allowed when used memory > 'maxmemory'"));
        }
        self.inner.set_many(entries, ttl).await
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Table-backed store returning matching rows in table order.
pub struct TableStore<R> {
    rows: Vec<R>,
    key_of: fn(&R) -> String,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    fail: Arc<AtomicBool>,
}

impl<R: Clone> TableStore<R> {
    pub fn new(rows: Vec<R>, key_of: fn(&R) -> String) -> Self {
        Self {
            rows,
            key_of,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for inspecting calls after the store moved into a handler.
    pub fn probe(&self) -> StoreProbe {
        StoreProbe {
            calls: self.calls.clone(),
            fail: self.fail.clone(),
        }
    }
}

#[derive(Clone)]
pub struct StoreProbe {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    fail: Arc<AtomicBool>,
}

impl StoreProbe {
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl<R> BatchStore<String, R> for TableStore<R>
where
    R: Clone + Send + Sync + 'static,
{
    async fn fetch_many(&self, keys: &[String]) -> Result<Vec<R>> {
        self.calls.lock().unwrap().push(keys.to_vec());
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::store(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "statement timeout",
            )));
        }
        Ok(self
            .rows
            .iter()
            .filter(|row| keys.contains(&(self.key_of)(*row)))
            .cloned()
            .collect())
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
