//! The read seam over the document store.
//!
//! Everything the analysis paths need from MongoDB goes through
//! [`DocumentSource`], so the aggregation and slice code can be driven by an
//! in-memory implementation in tests (`testing::MemorySource`) and by
//! [`StoreClient`] in production.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};

use wikiscope_common::WikiscopeError;

use crate::StoreClient;

/// Databases the catalog never shows.
const SYSTEM_DATABASES: [&str; 3] = ["admin", "config", "local"];

/// Drop system databases and sort. The catalog shows user databases only.
pub fn user_databases(mut names: Vec<String>) -> Vec<String> {
    names.retain(|name| !SYSTEM_DATABASES.contains(&name.as_str()));
    names.sort();
    names
}

#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// User database names, sorted. System databases are excluded.
    async fn list_databases(&self) -> Result<Vec<String>, WikiscopeError>;

    /// Collection names of one database, sorted. An unknown database is an
    /// empty list, not an error.
    async fn list_collections(&self, db: &str) -> Result<Vec<String>, WikiscopeError>;

    /// Every document of a collection, no projection, store order.
    async fn fetch_all(&self, db: &str, collection: &str) -> Result<Vec<Document>, WikiscopeError>;

    /// The most recent `limit` documents by `rev_ts` descending, projected
    /// to `fields`.
    async fn fetch_recent(
        &self,
        db: &str,
        collection: &str,
        fields: &[&str],
        limit: i64,
    ) -> Result<Vec<Document>, WikiscopeError>;
}

#[async_trait]
impl DocumentSource for StoreClient {
    async fn list_databases(&self) -> Result<Vec<String>, WikiscopeError> {
        let names = self
            .client
            .list_database_names()
            .await
            .map_err(|e| WikiscopeError::Query(e.to_string()))?;
        Ok(user_databases(names))
    }

    async fn list_collections(&self, db: &str) -> Result<Vec<String>, WikiscopeError> {
        let mut names = self
            .client
            .database(db)
            .list_collection_names()
            .await
            .map_err(|e| WikiscopeError::Query(e.to_string()))?;
        names.sort();
        Ok(names)
    }

    async fn fetch_all(&self, db: &str, collection: &str) -> Result<Vec<Document>, WikiscopeError> {
        let coll = self.client.database(db).collection::<Document>(collection);
        let mut cursor = coll
            .find(doc! {})
            .await
            .map_err(|e| WikiscopeError::Query(e.to_string()))?;

        let mut docs = Vec::new();
        while let Some(document) = cursor
            .try_next()
            .await
            .map_err(|e| WikiscopeError::Query(e.to_string()))?
        {
            docs.push(document);
        }
        Ok(docs)
    }

    async fn fetch_recent(
        &self,
        db: &str,
        collection: &str,
        fields: &[&str],
        limit: i64,
    ) -> Result<Vec<Document>, WikiscopeError> {
        let mut projection = Document::new();
        for field in fields {
            projection.insert(*field, 1);
        }

        let coll = self.client.database(db).collection::<Document>(collection);
        let mut cursor = coll
            .find(doc! {})
            .projection(projection)
            .sort(doc! { "rev_ts": -1 })
            .limit(limit)
            .await
            .map_err(|e| WikiscopeError::Query(e.to_string()))?;

        let mut docs = Vec::new();
        while let Some(document) = cursor
            .try_next()
            .await
            .map_err(|e| WikiscopeError::Query(e.to_string()))?
        {
            docs.push(document);
        }
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- catalog filter tests ---

    #[test]
    fn system_databases_are_excluded() {
        let names = vec![
            "local".to_string(),
            "wiki".to_string(),
            "admin".to_string(),
            "config".to_string(),
            "archive".to_string(),
        ];
        assert_eq!(
            user_databases(names),
            vec!["archive".to_string(), "wiki".to_string()]
        );
    }

    #[test]
    fn user_databases_sort() {
        let names = vec!["zulu".to_string(), "alpha".to_string(), "mike".to_string()];
        assert_eq!(
            user_databases(names),
            vec!["alpha".to_string(), "mike".to_string(), "zulu".to_string()]
        );
    }
}
