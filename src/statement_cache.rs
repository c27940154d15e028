//! Connection-level cache of prepared statements
//!
//! Every statement prepared through a cursor is stored here keyed by the
//! statement id the server assigned to it. Entries are shared with cursors
//! through `Arc` and are never mutated. They are dropped only when the
//! connection is closed.

use indexmap::IndexMap;
use std::sync::Arc;

use crate::statement::PreparedStatement;
use crate::types::StatementId;

/// Prepared statements keyed by statement id, in preparation order
#[derive(Debug, Default)]
pub struct StatementCache {
    cache: IndexMap<StatementId, Arc<PreparedStatement>>,
}

impl StatementCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly prepared statement
    ///
    /// A statement id the server hands out twice replaces the older entry.
    pub fn insert(&mut self, statement: PreparedStatement) -> Arc<PreparedStatement> {
        let id = statement.id();
        let statement = Arc::new(statement);
        if self.cache.insert(id, Arc::clone(&statement)).is_some() {
            tracing::trace!(statement_id = %id, "Replaced cached statement");
        } else {
            tracing::trace!(
                statement_id = %id,
                sql = statement.sql(),
                "Adding statement to cache"
            );
        }
        statement
    }

    /// Get a cached statement by id
    pub fn get(&self, id: &StatementId) -> Option<Arc<PreparedStatement>> {
        let found = self.cache.get(id).cloned();
        if found.is_none() {
            tracing::trace!(statement_id = %id, "Statement cache miss");
        }
        found
    }

    /// Check if a statement id is cached
    pub fn contains(&self, id: &StatementId) -> bool {
        self.cache.contains_key(id)
    }

    /// Ids of all cached statements, in preparation order
    pub fn ids(&self) -> Vec<StatementId> {
        self.cache.keys().copied().collect()
    }

    /// Drop all cached statements
    pub fn clear(&mut self) {
        self.cache.clear();
        tracing::debug!("Statement cache cleared");
    }

    /// Number of cached statements
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
