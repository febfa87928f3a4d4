use betledger::adapter::store::MemoryStore;
use betledger::application::Ledger;
use betledger::domain::{
    BalancePolicy, BetDraft, BetKind, Bookmaker, Exchange, Money, Odds, ProviderKind,
    TransactionDraft, TransactionKind,
};
use betledger::port::Store;

pub fn memory_ledger() -> Ledger<MemoryStore> {
    Ledger::new(MemoryStore::new(), BalancePolicy::Floor)
}

pub fn deposit<S: Store>(ledger: &Ledger<S>, kind: ProviderKind, name: &str, amount: Money) {
    ledger
        .record_transaction(TransactionDraft::new(kind, name, TransactionKind::Deposit, amount))
        .expect("deposit");
}

pub fn bookmaker<S: Store>(ledger: &Ledger<S>, name: &str) -> Bookmaker {
    ledger
        .bookmakers()
        .expect("bookmakers")
        .into_iter()
        .find(|b| betledger::domain::Provider::name(b) == name)
        .expect("bookmaker present")
}

pub fn exchange<S: Store>(ledger: &Ledger<S>, name: &str) -> Exchange {
    ledger
        .exchanges()
        .expect("exchanges")
        .into_iter()
        .find(|e| betledger::domain::Provider::name(e) == name)
        .expect("exchange present")
}

pub fn draft(
    bookmaker: &Bookmaker,
    exchange: &Exchange,
    kind: BetKind,
    back_stake: Money,
    back_odds: Odds,
    lay_odds: Odds,
) -> BetDraft {
    BetDraft::new(
        bookmaker.id().clone(),
        exchange.id().clone(),
        "Arsenal v Spurs",
        kind,
        back_stake,
        back_odds,
        lay_odds,
    )
}
