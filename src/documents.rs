//! Document Listing
//!
//! Materializes every document of a document-store collection.

use serde_json::Value;

use crate::error::Result;

// == Collection Trait ==
/// A queryable collection in an external document store.
pub trait DocumentCollection {
    type Document;
    type Cursor: Iterator<Item = Result<Self::Document>>;

    /// Opens a cursor over every document, in the store's cursor order.
    fn find(&self) -> Result<Self::Cursor>;
}

/// Drains the collection's `find()` cursor into a `Vec`.
pub fn list_all<C: DocumentCollection>(collection: &C) -> Result<Vec<C::Document>> {
    collection.find()?.collect()
}

// == Memory Collection ==
/// Schemaless JSON documents kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryCollection {
    documents: Vec<Value>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, document: Value) {
        self.documents.push(document);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl FromIterator<Value> for MemoryCollection {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            documents: iter.into_iter().collect(),
        }
    }
}

impl DocumentCollection for MemoryCollection {
    type Document = Value;
    type Cursor = std::iter::Map<std::vec::IntoIter<Value>, fn(Value) -> Result<Value>>;

    fn find(&self) -> Result<Self::Cursor> {
        // Snapshot: later inserts are not seen by an open cursor
        Ok(self.documents.clone().into_iter().map(Ok as fn(Value) -> Result<Value>))
    }
}
