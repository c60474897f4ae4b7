// Test doubles for the store layer.
//
// MemorySource implements DocumentSource over an in-memory map so the
// aggregation and slice paths run deterministically with no MongoDB and no
// Docker. Builder pattern: `.with_collection()`; `MemorySource::failing()`
// makes every call fail for error-path tests.

use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::Document;

use wikiscope_common::normalize::parse_rev_ts;
use wikiscope_common::WikiscopeError;

use crate::source::DocumentSource;

#[derive(Default)]
pub struct MemorySource {
    collections: HashMap<(String, String), Vec<Document>>,
    fail_with: Option<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, db: &str, collection: &str, docs: Vec<Document>) -> Self {
        self.collections
            .insert((db.to_string(), collection.to_string()), docs);
        self
    }

    /// A source whose every call fails with a query error.
    pub fn failing(message: &str) -> Self {
        Self {
            collections: HashMap::new(),
            fail_with: Some(message.to_string()),
        }
    }

    fn check(&self) -> Result<(), WikiscopeError> {
        match &self.fail_with {
            Some(message) => Err(WikiscopeError::Query(message.clone())),
            None => Ok(()),
        }
    }

    fn docs(&self, db: &str, collection: &str) -> Vec<Document> {
        self.collections
            .get(&(db.to_string(), collection.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn list_databases(&self) -> Result<Vec<String>, WikiscopeError> {
        self.check()?;
        let mut names: Vec<String> = self.collections.keys().map(|(db, _)| db.clone()).collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn list_collections(&self, db: &str) -> Result<Vec<String>, WikiscopeError> {
        self.check()?;
        let mut names: Vec<String> = self
            .collections
            .keys()
            .filter(|(d, _)| d == db)
            .map(|(_, c)| c.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    async fn fetch_all(&self, db: &str, collection: &str) -> Result<Vec<Document>, WikiscopeError> {
        self.check()?;
        Ok(self.docs(db, collection))
    }

    async fn fetch_recent(
        &self,
        db: &str,
        collection: &str,
        fields: &[&str],
        limit: i64,
    ) -> Result<Vec<Document>, WikiscopeError> {
        self.check()?;
        let mut docs = self.docs(db, collection);

        // Newest first; documents without a parseable rev_ts sort last.
        // The sort is stable, so ties keep insertion order.
        docs.sort_by_key(|d| std::cmp::Reverse(d.get("rev_ts").and_then(parse_rev_ts)));
        docs.truncate(limit.max(0) as usize);

        let projected = docs
            .into_iter()
            .map(|doc| {
                let mut out = Document::new();
                for (key, value) in doc {
                    if key == "_id" || fields.contains(&key.as_str()) {
                        out.insert(key, value);
                    }
                }
                out
            })
            .collect();
        Ok(projected)
    }
}
