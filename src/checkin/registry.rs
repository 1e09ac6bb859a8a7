//! In-memory record of identifiers checked in during this session.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Identifier;

/// One successful check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    /// Identifier that was checked in.
    pub identifier: Identifier,
    /// Local time of the check-in, formatted for display only.
    pub checked_in_at: String,
}

/// Identifiers accepted by the verification service in this session.
///
/// Keys are unique. Entries keep their first insertion position so the
/// display order stays stable when an identifier's timestamp is refreshed.
/// Nothing here is persisted.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    entries: Vec<SessionEntry>,
    index: HashMap<Identifier, usize>,
}

impl SessionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `identifier` has been checked in.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    /// Look up the entry for `identifier`.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&SessionEntry> {
        self.index.get(identifier).map(|&i| &self.entries[i])
    }

    /// Record a check-in of `identifier` at `checked_in_at`.
    ///
    /// Returns `true` if the identifier was new. An existing entry gets the
    /// new timestamp and keeps its position.
    pub fn record(&mut self, identifier: Identifier, checked_in_at: String) -> bool {
        if let Some(&i) = self.index.get(&identifier) {
            self.entries[i].checked_in_at = checked_in_at;
            return false;
        }

        self.index.insert(identifier.clone(), self.entries.len());
        self.entries.push(SessionEntry {
            identifier,
            checked_in_at,
        });
        true
    }

    /// Number of checked-in identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been checked in yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries with the most recently added first.
    pub fn recent_first(&self) -> impl Iterator<Item = &SessionEntry> {
        self.entries.iter().rev()
    }

    /// Owned snapshot of [`SessionRegistry::recent_first`] for renderers.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SessionEntry> {
        self.recent_first().cloned().collect()
    }
}
