//! Call Instrumentation
//!
//! Counts calls to a named operation and records each call's rendered input
//! and output in two parallel store lists.

use std::fmt::Display;
use std::future::Future;

use tracing::debug;

use crate::cache::value::Repr;
use crate::error::Result;
use crate::store::KvStore;

// == History Keys ==
/// Store keys holding the call count and histories of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryKeys {
    /// Counter key, the operation name itself
    pub counter: String,
    /// List of rendered argument tuples
    pub inputs: String,
    /// List of rendered results
    pub outputs: String,
}

impl HistoryKeys {
    pub fn for_operation(name: &str) -> Self {
        Self {
            counter: name.to_string(),
            inputs: format!("{name}:inputs"),
            outputs: format!("{name}:outputs"),
        }
    }
}

// == Instrumented Operation ==
/// Interceptor that runs an operation with call counting and history.
///
/// ```ignore
/// let key = Instrumented::new(&store, "Cache.store")
///     .call((value,), |(value,)| async move { /* ... */ })
///     .await?;
/// ```
#[derive(Debug)]
pub struct Instrumented<'s, S> {
    store: &'s S,
    name: &'s str,
    keys: HistoryKeys,
}

impl<'s, S: KvStore> Instrumented<'s, S> {
    pub fn new(store: &'s S, name: &'s str) -> Self {
        Self {
            store,
            name,
            keys: HistoryKeys::for_operation(name),
        }
    }

    /// Runs `op` on `args`, recording the call.
    ///
    /// The counter is incremented before `op` runs, whatever its outcome.
    /// The input list is appended before `op` runs and the output list after,
    /// so both lists stay the same length. A failing `op` has its error
    /// message recorded as the output and the error returned unchanged.
    pub async fn call<A, T, F, Fut>(&self, args: A, op: F) -> Result<T>
    where
        A: Repr,
        T: Display,
        F: FnOnce(A) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let calls = self.store.incr(&self.keys.counter).await?;
        let input = args.repr();
        debug!(operation = self.name, calls, input = %input, "recording call");
        self.store.rpush(&self.keys.inputs, input.as_bytes()).await?;

        let result = op(args).await;

        let output = match &result {
            Ok(value) => value.to_string(),
            Err(err) => err.to_string(),
        };
        self.store.rpush(&self.keys.outputs, output.as_bytes()).await?;

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::store::MemoryStore;

    #[test]
    fn test_history_keys() {
        let keys = HistoryKeys::for_operation("Cache.store");
        assert_eq!(keys.counter, "Cache.store");
        assert_eq!(keys.inputs, "Cache.store:inputs");
        assert_eq!(keys.outputs, "Cache.store:outputs");
    }

    #[tokio::test]
    async fn test_call_records_input_and_output() {
        let store = MemoryStore::new();
        let double = Instrumented::new(&store, "double");

        let result = double
            .call((21i64,), |(n,)| async move { Ok(n * 2) })
            .await
            .unwrap();

        assert_eq!(result, 42);
        assert_eq!(store.get("double").await.unwrap(), Some(b"1".to_vec()));
        assert_eq!(
            store.lrange("double:inputs", 0, -1).await.unwrap(),
            vec![b"(21,)".to_vec()]
        );
        assert_eq!(
            store.lrange("double:outputs", 0, -1).await.unwrap(),
            vec![b"42".to_vec()]
        );
    }

    #[tokio::test]
    async fn test_call_failure_still_counted() {
        let store = MemoryStore::new();
        let failing = Instrumented::new(&store, "failing");

        let result: Result<i64> = failing
            .call(("x",), |_| async { Err(CacheError::Decode("boom".to_string())) })
            .await;

        assert_eq!(result, Err(CacheError::Decode("boom".to_string())));
        assert_eq!(store.get("failing").await.unwrap(), Some(b"1".to_vec()));
        assert_eq!(
            store.lrange("failing:inputs", 0, -1).await.unwrap(),
            vec![b"('x',)".to_vec()]
        );
        assert_eq!(
            store.lrange("failing:outputs", 0, -1).await.unwrap(),
            vec![b"Decode failed: boom".to_vec()]
        );
    }

    #[tokio::test]
    async fn test_calls_append_in_order() {
        let store = MemoryStore::new();
        let echo = Instrumented::new(&store, "echo");

        for word in ["one", "two", "three"] {
            echo.call((word,), |(w,)| async move { Ok(w.to_uppercase()) })
                .await
                .unwrap();
        }

        assert_eq!(store.incr("echo").await.unwrap(), 4);
        assert_eq!(
            store.lrange("echo:outputs", 0, -1).await.unwrap(),
            vec![b"ONE".to_vec(), b"TWO".to_vec(), b"THREE".to_vec()]
        );
    }
}
