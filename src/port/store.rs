//! Store port for ledger persistence.
//!
//! The ledger persists whole collections as JSON arrays (plus the seed
//! singleton as an object). Every operation reads full snapshots, computes
//! its changes, then hands all touched collections to [`Store::commit`] in
//! one [`WriteBatch`].

use std::fmt;

use serde_json::Value;

use crate::error::Result;

/// Named record collections held by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Bookmakers,
    Exchanges,
    Bets,
    FreeBets,
    Transactions,
    /// Singleton object rather than an array.
    Seed,
}

impl Collection {
    pub const ALL: [Self; 6] = [
        Self::Bookmakers,
        Self::Exchanges,
        Self::Bets,
        Self::FreeBets,
        Self::Transactions,
        Self::Seed,
    ];

    /// Storage key, also used as the JSON file stem.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Bookmakers => "bookmakers",
            Self::Exchanges => "exchanges",
            Self::Bets => "bets",
            Self::FreeBets => "freeBets",
            Self::Transactions => "transactions",
            Self::Seed => "seed",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Serialized collections to be written together.
///
/// A later `put` for the same collection replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    entries: Vec<(Collection, Value)>,
}

impl WriteBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, collection: Collection, value: Value) -> &mut Self {
        self.entries.retain(|(c, _)| *c != collection);
        self.entries.push((collection, value));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Collections in this batch, in insertion order.
    pub fn collections(&self) -> impl Iterator<Item = Collection> + '_ {
        self.entries.iter().map(|(c, _)| *c)
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<(Collection, Value)> {
        self.entries
    }
}

/// Collection storage used by the ledger.
///
/// # Implementation Notes
///
/// - `load_collection` returns `None` for a collection never written
/// - `commit` must apply every entry of the batch or none of them
pub trait Store {
    /// Read a collection's stored JSON.
    fn load_collection(&self, collection: Collection) -> Result<Option<Value>>;

    /// Write every collection in `batch` together.
    fn commit(&self, batch: WriteBatch) -> Result<()>;

    /// Write a single collection.
    fn save_collection(&self, collection: Collection, value: Value) -> Result<()> {
        let mut batch = WriteBatch::new();
        batch.put(collection, value);
        self.commit(batch)
    }
}

impl<S: Store + ?Sized> Store for &S {
    fn load_collection(&self, collection: Collection) -> Result<Option<Value>> {
        (**self).load_collection(collection)
    }

    fn commit(&self, batch: WriteBatch) -> Result<()> {
        (**self).commit(batch)
    }
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn load_collection(&self, collection: Collection) -> Result<Option<Value>> {
        (**self).load_collection(collection)
    }

    fn commit(&self, batch: WriteBatch) -> Result<()> {
        (**self).commit(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn later_put_replaces_earlier() {
        let mut batch = WriteBatch::new();
        batch
            .put(Collection::Bets, json!([]))
            .put(Collection::Seed, json!({}))
            .put(Collection::Bets, json!([1]));

        assert_eq!(batch.len(), 2);
        let entries = batch.into_entries();
        assert_eq!(entries[1], (Collection::Bets, json!([1])));
    }

    #[test]
    fn keys_match_persisted_names() {
        let keys: Vec<_> = Collection::ALL.iter().map(|c| c.key()).collect();
        assert_eq!(
            keys,
            ["bookmakers", "exchanges", "bets", "freeBets", "transactions", "seed"]
        );
    }
}
