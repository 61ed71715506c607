//! Integration Tests for the Cache, Replay and Document Listing
//!
//! Exercises the public API end to end against the in-memory store.

use instrumented_cache::cache::Instrumented;
use instrumented_cache::{
    list_all, Cache, CacheError, CallLog, KvStore, MemoryCollection, MemoryStore, Result,
    StoredValue, STORE_OPERATION,
};
use serde_json::json;

// == Helper Functions ==

async fn create_test_cache() -> (Cache<MemoryStore>, MemoryStore) {
    let store = MemoryStore::new();
    let cache = Cache::new(store.clone()).await.unwrap();
    (cache, store)
}

/// Store that fails every command as if the server were unreachable.
/// With `flushable` set, `flush_all` still succeeds, so a `Cache` can be
/// built on it before the connection is lost.
struct UnreachableStore {
    flushable: bool,
}

fn unreachable<T>() -> Result<T> {
    Err(CacheError::StoreUnavailable("connection refused".to_string()))
}

impl KvStore for UnreachableStore {
    async fn set(&self, _key: &str, _value: &[u8]) -> Result<()> {
        unreachable()
    }

    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        unreachable()
    }

    async fn incr(&self, _key: &str) -> Result<i64> {
        unreachable()
    }

    async fn rpush(&self, _key: &str, _value: &[u8]) -> Result<usize> {
        unreachable()
    }

    async fn lrange(&self, _key: &str, _start: isize, _stop: isize) -> Result<Vec<Vec<u8>>> {
        unreachable()
    }

    async fn flush_all(&self) -> Result<()> {
        if self.flushable {
            Ok(())
        } else {
            unreachable()
        }
    }
}

// == Store / Get ==

#[tokio::test]
async fn test_store_each_value_kind() {
    let (cache, _) = create_test_cache().await;

    let text = cache.store("foo").await.unwrap();
    let bytes = cache.store(b"bar".to_vec()).await.unwrap();
    let int = cache.store(123i64).await.unwrap();
    let float = cache.store(0.5f64).await.unwrap();

    assert_eq!(cache.get_str(&text).await.unwrap(), "foo");
    assert_eq!(cache.get(&bytes).await.unwrap(), Some(b"bar".to_vec()));
    assert_eq!(cache.get_int(&int).await.unwrap(), 123);
    assert_eq!(
        cache
            .get_with(&float, |raw| String::from_utf8(raw).unwrap().parse::<f64>())
            .await
            .unwrap(),
        Some(0.5)
    );
}

#[tokio::test]
async fn test_absent_key_asymmetry() {
    let (cache, _) = create_test_cache().await;

    assert_eq!(cache.get("absent").await.unwrap(), None);
    assert_eq!(cache.get_int("absent").await.unwrap(), 0);
    assert_eq!(
        cache.get_str("absent").await,
        Err(CacheError::AbsentKey("absent".to_string()))
    );
}

#[tokio::test]
async fn test_new_cache_resets_previous_history() {
    let store = MemoryStore::new();

    let first = Cache::new(store.clone()).await.unwrap();
    first.store("old").await.unwrap();

    let second = Cache::new(store.clone()).await.unwrap();
    second.store("new").await.unwrap();

    let log = CallLog::load(&store, STORE_OPERATION).await.unwrap();
    assert_eq!(log.calls, 1);
    assert_eq!(log.entries.len(), 1);
    assert_eq!(log.entries[0].input, "('new',)");
}

// == History / Replay ==

#[tokio::test]
async fn test_history_after_n_calls() {
    let (cache, store) = create_test_cache().await;
    let values: Vec<StoredValue> = vec!["a".into(), 1i64.into(), 2.0f64.into()];

    let mut keys = Vec::new();
    for value in values {
        keys.push(cache.store(value).await.unwrap());
    }

    let log = CallLog::load(&store, STORE_OPERATION).await.unwrap();
    assert_eq!(log.calls, 3);

    let inputs: Vec<&str> = log.entries.iter().map(|e| e.input.as_str()).collect();
    assert_eq!(inputs, vec!["('a',)", "(1,)", "(2.0,)"]);

    let outputs: Vec<&String> = log.entries.iter().map(|e| &e.output).collect();
    assert_eq!(outputs, keys.iter().collect::<Vec<_>>());
}

#[tokio::test]
async fn test_replay_report_lines() {
    let store = MemoryStore::new();
    let op = Instrumented::new(&store, "name");

    assert_eq!(op.call(("a",), |_| async { Ok(1) }).await.unwrap(), 1);
    assert_eq!(op.call(("b",), |_| async { Ok(2) }).await.unwrap(), 2);

    let report = CallLog::load(&store, "name").await.unwrap().to_string();
    let lines: Vec<&str> = report.lines().collect();

    assert_eq!(
        lines,
        vec![
            "name was called 2 times:",
            "name(*('a',)) -> 1",
            "name(*('b',)) -> 2",
        ]
    );
}

#[tokio::test]
async fn test_store_history_quotes_and_floats() {
    let (cache, store) = create_test_cache().await;

    cache.store("it's").await.unwrap();
    let big = cache.store(1e16f64).await.unwrap();
    cache.store(1.5e-5f64).await.unwrap();

    assert_eq!(cache.get(&big).await.unwrap(), Some(b"1e+16".to_vec()));

    let log = CallLog::load(&store, STORE_OPERATION).await.unwrap();
    let inputs: Vec<&str> = log.entries.iter().map(|e| e.input.as_str()).collect();
    assert_eq!(inputs, vec!["(\"it's\",)", "(1e+16,)", "(1.5e-05,)"]);
}

#[tokio::test]
async fn test_store_report_format() {
    let (cache, store) = create_test_cache().await;

    let key = cache.store("foo").await.unwrap();

    let report = CallLog::load(&store, STORE_OPERATION).await.unwrap().to_string();
    assert_eq!(
        report,
        format!("Cache.store was called 1 times:\nCache.store(*('foo',)) -> {key}\n")
    );
}

// == Store Failures ==

#[tokio::test]
async fn test_unavailable_store_propagates() {
    let down = UnreachableStore { flushable: false };

    assert!(matches!(
        Cache::new(down).await,
        Err(CacheError::StoreUnavailable(_))
    ));
    assert!(matches!(
        CallLog::load(&UnreachableStore { flushable: false }, STORE_OPERATION).await,
        Err(CacheError::StoreUnavailable(_))
    ));
}

#[tokio::test]
async fn test_connection_lost_after_construction() {
    let cache = Cache::new(UnreachableStore { flushable: true })
        .await
        .unwrap();

    assert!(matches!(
        cache.store("value").await,
        Err(CacheError::StoreUnavailable(_))
    ));
    assert!(matches!(
        cache.get("key").await,
        Err(CacheError::StoreUnavailable(_))
    ));
    assert!(matches!(
        cache.get_str("key").await,
        Err(CacheError::StoreUnavailable(_))
    ));
    // The 0 fallback covers absent or non-numeric values, not a dead store
    assert!(matches!(
        cache.get_int("key").await,
        Err(CacheError::StoreUnavailable(_))
    ));
}

// == Document Listing ==

#[test]
fn test_list_all_documents() {
    let mut collection = MemoryCollection::new();
    collection.insert(json!({"_id": 1, "name": "A"}));
    collection.insert(json!({"_id": 2, "name": "B"}));
    collection.insert(json!({"_id": 3, "name": "C"}));

    let docs = list_all(&collection).unwrap();

    assert_eq!(docs.len(), collection.len());
    let names: Vec<&str> = docs.iter().filter_map(|d| d["name"].as_str()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
}
