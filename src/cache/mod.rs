//! Cache Module
//!
//! Random-key value storage over a `KvStore`, with call counting and
//! input/output history on the store operation.

mod history;
mod store;
mod value;


// Re-export public types
pub use history::{HistoryKeys, Instrumented};
pub use store::Cache;
pub use value::{format_float, Repr, StoredValue};

// == Public Constants ==
/// Operation name under which `Cache::store` calls are counted and recorded
pub const STORE_OPERATION: &str = "Cache.store";
