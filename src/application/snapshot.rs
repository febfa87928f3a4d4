//! Full-collection snapshot of the ledger.
//!
//! An operation loads a snapshot, mutates it in memory, marks the
//! collections it changed, and commits them as one batch. Nothing reaches
//! the store when the operation fails part-way.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::error::NotFoundError;
use crate::domain::provider::{name_key, Provider};
use crate::domain::{
    Bet, BetId, Bookmaker, BookmakerId, Exchange, ExchangeId, FreeBet, FreeBetId, Seed,
    Transaction,
};
use crate::error::{Result, StoreError};
use crate::port::{Collection, Store, WriteBatch};

fn load_records<S, T>(store: &S, collection: Collection) -> Result<Vec<T>>
where
    S: Store + ?Sized,
    T: DeserializeOwned,
{
    match store.load_collection(collection)? {
        None => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value)
            .map_err(|source| StoreError::Corrupt { collection, source }.into()),
    }
}

fn load_seed<S: Store + ?Sized>(store: &S) -> Result<Seed> {
    match store.load_collection(Collection::Seed)? {
        None => Ok(Seed::default()),
        Some(value) => serde_json::from_value(value).map_err(|source| {
            StoreError::Corrupt {
                collection: Collection::Seed,
                source,
            }
            .into()
        }),
    }
}

fn position<T>(records: &[T], matches: impl Fn(&T) -> bool) -> Option<usize> {
    records.iter().position(matches)
}

/// Position of the provider whose name matches `name`, ignoring case and padding.
pub(crate) fn find_by_name<P: Provider>(providers: &[P], name: &str) -> Option<usize> {
    let key = name_key(name);
    position(providers, |p| name_key(p.name()) == key)
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Snapshot {
    pub bookmakers: Vec<Bookmaker>,
    pub exchanges: Vec<Exchange>,
    pub bets: Vec<Bet>,
    pub free_bets: Vec<FreeBet>,
    pub transactions: Vec<Transaction>,
    pub seed: Seed,
    dirty: BTreeSet<Collection>,
}

impl Snapshot {
    pub fn load<S: Store + ?Sized>(store: &S) -> Result<Self> {
        Ok(Self {
            bookmakers: load_records(store, Collection::Bookmakers)?,
            exchanges: load_records(store, Collection::Exchanges)?,
            bets: load_records(store, Collection::Bets)?,
            free_bets: load_records(store, Collection::FreeBets)?,
            transactions: load_records(store, Collection::Transactions)?,
            seed: load_seed(store)?,
            dirty: BTreeSet::new(),
        })
    }

    /// Mark collections as changed so [`Snapshot::commit`] writes them.
    pub fn touch(&mut self, collections: &[Collection]) {
        self.dirty.extend(collections.iter().copied());
    }

    pub fn bookmaker(&self, id: &BookmakerId) -> std::result::Result<usize, NotFoundError> {
        position(&self.bookmakers, |b| b.id() == id)
            .ok_or_else(|| NotFoundError::Bookmaker(id.clone()))
    }

    pub fn exchange(&self, id: &ExchangeId) -> std::result::Result<usize, NotFoundError> {
        position(&self.exchanges, |e| e.id() == id)
            .ok_or_else(|| NotFoundError::Exchange(id.clone()))
    }

    pub fn bet(&self, id: &BetId) -> std::result::Result<usize, NotFoundError> {
        position(&self.bets, |b| b.id() == id).ok_or_else(|| NotFoundError::Bet(id.clone()))
    }

    pub fn free_bet(&self, id: &FreeBetId) -> std::result::Result<usize, NotFoundError> {
        position(&self.free_bets, |f| f.id() == id)
            .ok_or_else(|| NotFoundError::FreeBet(id.clone()))
    }

    /// Bookmaker and exchange positions for a bet's references.
    pub fn providers_of(&self, bet: &Bet) -> std::result::Result<(usize, usize), NotFoundError> {
        Ok((self.bookmaker(bet.bookmaker_id())?, self.exchange(bet.exchange_id())?))
    }

    /// Recompute the seed's repaid amount from settled bets.
    pub fn refresh_seed(&mut self) {
        let settled = crate::domain::report::settled_profit(&self.bets);
        self.seed = self.seed.with_settled_profit(settled);
        self.touch(&[Collection::Seed]);
    }

    fn serialize(&self, collection: Collection) -> Result<serde_json::Value> {
        fn to_value<T: Serialize + ?Sized>(records: &T) -> Result<serde_json::Value> {
            Ok(serde_json::to_value(records)?)
        }

        match collection {
            Collection::Bookmakers => to_value(&self.bookmakers),
            Collection::Exchanges => to_value(&self.exchanges),
            Collection::Bets => to_value(&self.bets),
            Collection::FreeBets => to_value(&self.free_bets),
            Collection::Transactions => to_value(&self.transactions),
            Collection::Seed => to_value(&self.seed),
        }
    }

    /// Write every touched collection in one batch.
    pub fn commit<S: Store + ?Sized>(self, store: &S) -> Result<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }

        let mut batch = WriteBatch::new();
        for &collection in &self.dirty {
            batch.put(collection, self.serialize(collection)?);
        }
        store.commit(batch)
    }
}
