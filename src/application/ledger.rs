//! Ledger service.
//!
//! Wraps a [`Store`] and exposes every ledger operation. Each call loads a
//! [`Snapshot`], applies the pure domain functions, and commits every touched
//! collection together.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::snapshot::{find_by_name, Snapshot};
use crate::domain::error::{InvalidStateError, NotFoundError};
use crate::domain::provider::Provider;
use crate::domain::settlement::{self, Unfunded};
use crate::domain::{
    catalog, Aggregates, BalancePolicy, Bet, BetAmendment, BetDraft, BetId, BetOutcome, BetQuote,
    Bookmaker, BookmakerId, Exchange, ExchangeId, FreeBet, FreeBetId, FundsWarning, Money,
    ProviderKind, Seed, Transaction, TransactionDraft, TransactionKind, TransferDraft,
};
use crate::error::Result;
use crate::port::{Collection, Store};

const PROVIDERS: [Collection; 2] = [Collection::Bookmakers, Collection::Exchanges];

fn log_unfunded(operation: &'static str, bookmaker: &Bookmaker, exchange: &Exchange, unfunded: Unfunded) {
    if !unfunded.bookmaker.is_zero() {
        warn!(
            operation,
            bookmaker = %bookmaker.name(),
            unfunded = %unfunded.bookmaker,
            shortfall = %bookmaker.account().shortfall(),
            "Bookmaker balance floored at zero"
        );
    }
    if !unfunded.exchange.is_zero() {
        warn!(
            operation,
            exchange = %exchange.name(),
            unfunded = %unfunded.exchange,
            shortfall = %exchange.account().shortfall(),
            "Exchange balance floored at zero"
        );
    }
}

/// Matched-betting ledger over a record store.
#[derive(Debug)]
pub struct Ledger<S> {
    store: S,
    policy: BalancePolicy,
}

impl<S: Store> Ledger<S> {
    /// Create a ledger over `store` using `policy` for over-debits.
    pub const fn new(store: S, policy: BalancePolicy) -> Self {
        Self { store, policy }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn policy(&self) -> BalancePolicy {
        self.policy
    }

    fn snapshot(&self) -> Result<Snapshot> {
        Snapshot::load(&self.store)
    }

    // --- Providers --------------------------------------------------------

    pub fn bookmakers(&self) -> Result<Vec<Bookmaker>> {
        Ok(self.snapshot()?.bookmakers)
    }

    pub fn exchanges(&self) -> Result<Vec<Exchange>> {
        Ok(self.snapshot()?.exchanges)
    }

    /// Add a bookmaker. Names are unique ignoring case.
    pub fn add_bookmaker(&self, name: &str, commission: Decimal) -> Result<Bookmaker> {
        let mut snap = self.snapshot()?;
        let bookmaker = Bookmaker::try_new(name, commission)?;
        if find_by_name(&snap.bookmakers, bookmaker.name()).is_some() {
            return Err(InvalidStateError::DuplicateName {
                kind: ProviderKind::Bookmaker,
                name: bookmaker.name().to_string(),
            }
            .into());
        }

        snap.bookmakers.push(bookmaker.clone());
        snap.touch(&[Collection::Bookmakers]);
        snap.commit(&self.store)?;

        info!(id = %bookmaker.id(), name = %bookmaker.name(), commission = %commission, "Bookmaker added");
        Ok(bookmaker)
    }

    /// Add an exchange. Names are unique ignoring case.
    pub fn add_exchange(&self, name: &str, commission: Decimal) -> Result<Exchange> {
        let mut snap = self.snapshot()?;
        let exchange = Exchange::try_new(name, commission)?;
        if find_by_name(&snap.exchanges, exchange.name()).is_some() {
            return Err(InvalidStateError::DuplicateName {
                kind: ProviderKind::Exchange,
                name: exchange.name().to_string(),
            }
            .into());
        }

        snap.exchanges.push(exchange.clone());
        snap.touch(&[Collection::Exchanges]);
        snap.commit(&self.store)?;

        info!(id = %exchange.id(), name = %exchange.name(), commission = %commission, "Exchange added");
        Ok(exchange)
    }

    /// Delete a bookmaker that no bet references, along with its free bets.
    pub fn delete_bookmaker(&self, id: &BookmakerId) -> Result<Bookmaker> {
        let mut snap = self.snapshot()?;
        let index = snap.bookmaker(id)?;
        let in_use = snap.bets.iter().filter(|b| b.bookmaker_id() == id).count();
        if in_use > 0 {
            return Err(InvalidStateError::ProviderInUse {
                kind: ProviderKind::Bookmaker,
                name: snap.bookmakers[index].name().to_string(),
                bets: in_use,
            }
            .into());
        }

        let removed = snap.bookmakers.remove(index);
        let before = snap.free_bets.len();
        snap.free_bets.retain(|f| f.bookmaker_id() != id);
        let dropped_free_bets = before - snap.free_bets.len();
        snap.touch(&[Collection::Bookmakers, Collection::FreeBets]);
        snap.commit(&self.store)?;

        info!(id = %id, name = %removed.name(), dropped_free_bets, "Bookmaker deleted");
        Ok(removed)
    }

    /// Delete an exchange that no bet references.
    pub fn delete_exchange(&self, id: &ExchangeId) -> Result<Exchange> {
        let mut snap = self.snapshot()?;
        let index = snap.exchange(id)?;
        let in_use = snap.bets.iter().filter(|b| b.exchange_id() == id).count();
        if in_use > 0 {
            return Err(InvalidStateError::ProviderInUse {
                kind: ProviderKind::Exchange,
                name: snap.exchanges[index].name().to_string(),
                bets: in_use,
            }
            .into());
        }

        let removed = snap.exchanges.remove(index);
        snap.touch(&[Collection::Exchanges]);
        snap.commit(&self.store)?;

        info!(id = %id, name = %removed.name(), "Exchange deleted");
        Ok(removed)
    }

    /// Install the default provider catalogue into an empty ledger.
    ///
    /// Returns `false` and changes nothing when any provider already exists.
    pub fn install_default_providers(&self) -> Result<bool> {
        let mut snap = self.snapshot()?;
        if !snap.bookmakers.is_empty() || !snap.exchanges.is_empty() {
            debug!("Providers already present, skipping defaults");
            return Ok(false);
        }

        let (bookmakers, exchanges) = catalog::default_providers()?;
        info!(
            bookmakers = bookmakers.len(),
            exchanges = exchanges.len(),
            "Installing default providers"
        );
        snap.bookmakers = bookmakers;
        snap.exchanges = exchanges;
        snap.touch(&PROVIDERS);
        snap.commit(&self.store)?;
        Ok(true)
    }

    // --- Bets -------------------------------------------------------------

    pub fn bets(&self) -> Result<Vec<Bet>> {
        Ok(self.snapshot()?.bets)
    }

    pub fn bet(&self, id: &BetId) -> Result<Bet> {
        let snap = self.snapshot()?;
        let index = snap.bet(id)?;
        Ok(snap.bets[index].clone())
    }

    /// Lay stake, liability and projected profit for a draft.
    pub fn quote(&self, draft: &BetDraft) -> Result<BetQuote> {
        let snap = self.snapshot()?;
        let bookmaker = &snap.bookmakers[snap.bookmaker(&draft.bookmaker_id)?];
        let exchange = &snap.exchanges[snap.exchange(&draft.exchange_id)?];

        let quote = settlement::quote(draft, bookmaker, exchange)?;
        debug!(
            lay_stake = %quote.figures.lay_stake,
            liability = %quote.figures.liability,
            back_won = %quote.back_won_profit,
            lay_won = %quote.lay_won_profit,
            "Computed quote"
        );
        Ok(quote)
    }

    /// Balances that will not cover a draft's stake or liability.
    pub fn check_funds(&self, draft: &BetDraft) -> Result<Vec<FundsWarning>> {
        let snap = self.snapshot()?;
        let bookmaker = &snap.bookmakers[snap.bookmaker(&draft.bookmaker_id)?];
        let exchange = &snap.exchanges[snap.exchange(&draft.exchange_id)?];
        Ok(settlement::check_funds(draft, bookmaker, exchange)?)
    }

    /// Place a bet pair, debiting stake and reserving liability.
    pub fn place_bet(&self, draft: &BetDraft) -> Result<Bet> {
        let mut snap = self.snapshot()?;
        let bi = snap.bookmaker(&draft.bookmaker_id)?;
        let ei = snap.exchange(&draft.exchange_id)?;
        let fi = draft
            .free_bet_id
            .as_ref()
            .map(|id| snap.free_bet(id))
            .transpose()?;

        let placement = settlement::place_bet(
            draft,
            &snap.bookmakers[bi],
            &snap.exchanges[ei],
            fi.map(|i| &snap.free_bets[i]),
            self.policy,
        )?;
        log_unfunded("place_bet", &placement.bookmaker, &placement.exchange, placement.unfunded);

        let bet = placement.bet;
        snap.bookmakers[bi] = placement.bookmaker;
        snap.exchanges[ei] = placement.exchange;
        if let (Some(i), Some(free_bet)) = (fi, placement.free_bet) {
            snap.free_bets[i] = free_bet;
            snap.touch(&[Collection::FreeBets]);
        }
        snap.bets.push(bet.clone());
        snap.touch(&[Collection::Bookmakers, Collection::Exchanges, Collection::Bets]);
        snap.commit(&self.store)?;

        let figures = bet.figures();
        info!(
            bet_id = %bet.id(),
            event = %bet.event(),
            back_stake = %figures.back_stake,
            lay_stake = %figures.lay_stake,
            liability = %figures.liability,
            "Bet placed"
        );
        Ok(bet)
    }

    /// Settle a bet. Settling a settled bet fails without side effects.
    pub fn settle_bet(&self, id: &BetId, outcome: BetOutcome) -> Result<Bet> {
        let mut snap = self.snapshot()?;
        let index = snap.bet(id)?;
        let (bi, ei) = snap.providers_of(&snap.bets[index])?;

        let settled = settlement::settle_bet(
            &snap.bets[index],
            outcome,
            &snap.bookmakers[bi],
            &snap.exchanges[ei],
        )?;

        let bet = settled.bet;
        snap.bookmakers[bi] = settled.bookmaker;
        snap.exchanges[ei] = settled.exchange;
        snap.bets[index] = bet.clone();
        snap.refresh_seed();
        snap.touch(&[Collection::Bookmakers, Collection::Exchanges, Collection::Bets]);
        snap.commit(&self.store)?;

        info!(
            bet_id = %id,
            outcome = %outcome,
            net_profit = %bet.net_profit(),
            commission = %bet.commission(),
            "Bet settled"
        );
        Ok(bet)
    }

    /// Return a settled bet to unsettled, reversing its stored effects.
    pub fn unsettle_bet(&self, id: &BetId) -> Result<Bet> {
        let mut snap = self.snapshot()?;
        let index = snap.bet(id)?;
        let (bi, ei) = snap.providers_of(&snap.bets[index])?;

        let reverted = settlement::unsettle_bet(
            &snap.bets[index],
            &snap.bookmakers[bi],
            &snap.exchanges[ei],
            self.policy,
        )?;
        log_unfunded("unsettle_bet", &reverted.bookmaker, &reverted.exchange, reverted.unfunded);

        let bet = reverted.bet;
        snap.bookmakers[bi] = reverted.bookmaker;
        snap.exchanges[ei] = reverted.exchange;
        snap.bets[index] = bet.clone();
        snap.refresh_seed();
        snap.touch(&[Collection::Bookmakers, Collection::Exchanges, Collection::Bets]);
        snap.commit(&self.store)?;

        info!(bet_id = %id, "Bet unsettled");
        Ok(bet)
    }

    /// Change an unsettled bet's event, stakes or odds.
    pub fn amend_bet(&self, id: &BetId, amendment: &BetAmendment) -> Result<Bet> {
        let mut snap = self.snapshot()?;
        let index = snap.bet(id)?;
        let (bi, ei) = snap.providers_of(&snap.bets[index])?;

        let amended = settlement::amend_bet(
            &snap.bets[index],
            amendment,
            &snap.bookmakers[bi],
            &snap.exchanges[ei],
            self.policy,
        )?;
        log_unfunded("amend_bet", &amended.bookmaker, &amended.exchange, amended.unfunded);

        let bet = amended.bet;
        snap.bookmakers[bi] = amended.bookmaker;
        snap.exchanges[ei] = amended.exchange;
        snap.bets[index] = bet.clone();
        snap.touch(&[Collection::Bookmakers, Collection::Exchanges, Collection::Bets]);
        snap.commit(&self.store)?;

        info!(bet_id = %id, liability = %bet.figures().liability, "Bet amended");
        Ok(bet)
    }

    /// Delete an unsettled bet, refunding its stake and liability.
    ///
    /// A free bet it consumed goes back to pending.
    pub fn delete_bet(&self, id: &BetId) -> Result<Bet> {
        let mut snap = self.snapshot()?;
        let index = snap.bet(id)?;
        let (bi, ei) = snap.providers_of(&snap.bets[index])?;

        let (bookmaker, exchange) =
            settlement::cancel_bet(&snap.bets[index], &snap.bookmakers[bi], &snap.exchanges[ei])?;
        snap.bookmakers[bi] = bookmaker;
        snap.exchanges[ei] = exchange;
        let bet = snap.bets.remove(index);

        if let Some(free_bet_id) = bet.free_bet_id() {
            if let Ok(fi) = snap.free_bet(free_bet_id) {
                snap.free_bets[fi].restore();
                snap.touch(&[Collection::FreeBets]);
            }
        }
        snap.touch(&[Collection::Bookmakers, Collection::Exchanges, Collection::Bets]);
        snap.commit(&self.store)?;

        info!(bet_id = %id, "Bet deleted");
        Ok(bet)
    }

    // --- Free bets --------------------------------------------------------

    pub fn free_bets(&self) -> Result<Vec<FreeBet>> {
        Ok(self.snapshot()?.free_bets)
    }

    /// Track a pending free bet at a bookmaker.
    pub fn add_free_bet(
        &self,
        bookmaker_id: &BookmakerId,
        value: Money,
        expiry_date: Option<DateTime<Utc>>,
        notes: &str,
    ) -> Result<FreeBet> {
        let mut snap = self.snapshot()?;
        snap.bookmaker(bookmaker_id)?;

        let free_bet = FreeBet::try_new(bookmaker_id.clone(), value, expiry_date, notes)?;
        snap.free_bets.push(free_bet.clone());
        snap.touch(&[Collection::FreeBets]);
        snap.commit(&self.store)?;

        info!(id = %free_bet.id(), bookmaker_id = %bookmaker_id, value = %free_bet.value(), "Free bet added");
        Ok(free_bet)
    }

    /// Mark a pending free bet used without placing a tracked bet.
    pub fn mark_free_bet_used(&self, id: &FreeBetId) -> Result<FreeBet> {
        let mut snap = self.snapshot()?;
        let index = snap.free_bet(id)?;
        snap.free_bets[index].mark_used(Utc::now())?;

        let free_bet = snap.free_bets[index].clone();
        snap.touch(&[Collection::FreeBets]);
        snap.commit(&self.store)?;

        info!(id = %id, "Free bet marked used");
        Ok(free_bet)
    }

    pub fn delete_free_bet(&self, id: &FreeBetId) -> Result<FreeBet> {
        let mut snap = self.snapshot()?;
        let index = snap.free_bet(id)?;
        let removed = snap.free_bets.remove(index);
        snap.touch(&[Collection::FreeBets]);
        snap.commit(&self.store)?;

        info!(id = %id, status = %removed.status(), "Free bet deleted");
        Ok(removed)
    }

    /// Expire every pending free bet whose expiry date is before `now`.
    pub fn expire_free_bets(&self, now: DateTime<Utc>) -> Result<Vec<FreeBet>> {
        let mut snap = self.snapshot()?;
        let mut expired = Vec::new();
        for free_bet in snap.free_bets.iter_mut().filter(|f| f.is_lapsed(now)) {
            free_bet.mark_expired()?;
            expired.push(free_bet.clone());
        }

        if !expired.is_empty() {
            snap.touch(&[Collection::FreeBets]);
            snap.commit(&self.store)?;
            info!(count = expired.len(), "Free bets expired");
        }
        Ok(expired)
    }

    // --- Transactions -----------------------------------------------------

    pub fn transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.snapshot()?.transactions)
    }

    /// Record a cash movement and apply it to the provider's balance.
    ///
    /// A deposit to an unknown provider creates it with zero commission;
    /// any other movement requires the provider to exist.
    pub fn record_transaction(&self, draft: TransactionDraft) -> Result<Transaction> {
        let mut snap = self.snapshot()?;
        let transaction = self.apply_transaction(&mut snap, draft)?;
        snap.transactions.push(transaction.clone());
        snap.touch(&[Collection::Transactions]);
        snap.commit(&self.store)?;

        info!(
            id = %transaction.id(),
            provider = %transaction.provider_name(),
            kind = %transaction.kind(),
            amount = %transaction.amount(),
            "Transaction recorded"
        );
        Ok(transaction)
    }

    /// Move money between two providers as one paired record.
    pub fn transfer(&self, draft: &TransferDraft) -> Result<(Transaction, Transaction)> {
        let (out, incoming) = draft.legs()?;
        let mut snap = self.snapshot()?;
        let out = self.apply_transaction(&mut snap, out)?;
        let incoming = self.apply_transaction(&mut snap, incoming)?;
        snap.transactions.push(out.clone());
        snap.transactions.push(incoming.clone());
        snap.touch(&[Collection::Transactions]);
        snap.commit(&self.store)?;

        info!(
            from = %out.provider_name(),
            to = %incoming.provider_name(),
            amount = %out.amount(),
            "Transfer recorded"
        );
        Ok((out, incoming))
    }

    fn apply_transaction(&self, snap: &mut Snapshot, draft: TransactionDraft) -> Result<Transaction> {
        let name = draft.provider_name.trim().to_string();
        let (kind, amount) = (draft.kind, draft.amount);
        let auto_create = kind == TransactionKind::Deposit;

        let (resolved, unfunded) = match draft.provider_kind {
            ProviderKind::Bookmaker => {
                let index = match find_by_name(&snap.bookmakers, &name) {
                    Some(i) => i,
                    None if auto_create => {
                        snap.bookmakers.push(Bookmaker::try_new(&name, Decimal::ZERO)?);
                        info!(name = %name, "Bookmaker created by deposit");
                        snap.bookmakers.len() - 1
                    }
                    None => {
                        return Err(NotFoundError::Provider {
                            kind: ProviderKind::Bookmaker,
                            name,
                        }
                        .into())
                    }
                };
                let bookmaker = &mut snap.bookmakers[index];
                let transaction = Transaction::try_from_draft(draft, bookmaker.name())?;
                let unfunded = apply_kind(bookmaker, kind, transaction.amount(), self.policy)?;
                (transaction, unfunded)
            }
            ProviderKind::Exchange => {
                let index = match find_by_name(&snap.exchanges, &name) {
                    Some(i) => i,
                    None if auto_create => {
                        snap.exchanges.push(Exchange::try_new(&name, Decimal::ZERO)?);
                        info!(name = %name, "Exchange created by deposit");
                        snap.exchanges.len() - 1
                    }
                    None => {
                        return Err(NotFoundError::Provider {
                            kind: ProviderKind::Exchange,
                            name,
                        }
                        .into())
                    }
                };
                let exchange = &mut snap.exchanges[index];
                let transaction = Transaction::try_from_draft(draft, exchange.name())?;
                let unfunded = apply_kind(exchange, kind, transaction.amount(), self.policy)?;
                (transaction, unfunded)
            }
        };

        if !unfunded.is_zero() {
            warn!(
                provider = %resolved.provider_name(),
                kind = %kind,
                amount = %amount,
                unfunded = %unfunded,
                "Balance floored at zero"
            );
        }
        snap.touch(&PROVIDERS);
        Ok(resolved)
    }

    // --- Seed and reports -------------------------------------------------

    /// The seed with its repaid amount recomputed from settled bets.
    pub fn seed(&self) -> Result<Seed> {
        let snap = self.snapshot()?;
        let settled = crate::domain::report::settled_profit(&snap.bets);
        Ok(snap.seed.with_settled_profit(settled))
    }

    /// Set the initial seed capital.
    pub fn set_seed(&self, amount: Money) -> Result<Seed> {
        let mut snap = self.snapshot()?;
        snap.seed = Seed::try_new(amount)?;
        snap.refresh_seed();
        let seed = snap.seed.clone();
        snap.commit(&self.store)?;

        info!(initial_seed = %seed.initial_seed(), "Seed set");
        Ok(seed)
    }

    /// Set the seed to the lifetime deposits across every provider.
    pub fn set_seed_from_deposits(&self) -> Result<Seed> {
        let snap = self.snapshot()?;
        let deposits = crate::domain::report::total_deposits(&snap.bookmakers, &snap.exchanges);
        self.set_seed(deposits)
    }

    /// Dashboard figures recomputed from the current records.
    pub fn aggregates(&self) -> Result<Aggregates> {
        let snap = self.snapshot()?;
        Ok(Aggregates::compute(
            &snap.bookmakers,
            &snap.exchanges,
            &snap.bets,
            &snap.seed,
        ))
    }
}

fn apply_kind<P: Provider>(
    provider: &mut P,
    kind: TransactionKind,
    amount: Money,
    policy: BalancePolicy,
) -> std::result::Result<Money, InvalidStateError> {
    let name = provider.name().to_string();
    kind.apply(provider.account_mut(), amount, policy)
        .map_err(|available| InvalidStateError::InsufficientFunds {
            kind: P::KIND,
            name,
            required: amount,
            available,
        })
}
