mod support;

use betledger::domain::calculator::{lay_stake, liability};
use betledger::domain::{
    BalancePolicy, BetKind, BetOutcome, BetStatus, DomainError, FreeBetStatus, InvalidStateError,
    ProviderKind,
};
use betledger::error::Error;
use rust_decimal_macros::dec;
use support::ledger::{bookmaker, deposit, draft, exchange, memory_ledger};

#[test]
fn e2e_deposit_place_settle_back_won() {
    let ledger = memory_ledger();
    deposit(&ledger, ProviderKind::Bookmaker, "A", dec!(100));
    deposit(&ledger, ProviderKind::Exchange, "X", dec!(200));
    let bm = bookmaker(&ledger, "A");
    let ex = exchange(&ledger, "X");

    let bet = ledger
        .place_bet(&draft(&bm, &ex, BetKind::Qualifying, dec!(100), dec!(2.5), dec!(2.6)))
        .unwrap();
    assert_eq!(bookmaker(&ledger, "A").current_balance(), dec!(0));
    assert_eq!(exchange(&ledger, "X").exposure(), dec!(153.84));

    let settled = ledger.settle_bet(bet.id(), BetOutcome::BackWon).unwrap();
    assert_eq!(settled.status(), BetStatus::BackWon);
    assert_eq!(settled.net_profit(), dec!(-3.84));
    assert_eq!(bookmaker(&ledger, "A").current_balance(), dec!(250));
    assert_eq!(exchange(&ledger, "X").exposure(), dec!(0));
}

#[test]
fn qualifying_bet_at_even_odds_is_neutral() {
    assert_eq!(
        lay_stake(dec!(100), dec!(2.0), dec!(2.0), BetKind::Qualifying, dec!(0)).unwrap(),
        dec!(100.00)
    );
    assert_eq!(liability(dec!(100), dec!(2.0)).unwrap(), dec!(100.00));

    let ledger = memory_ledger();
    deposit(&ledger, ProviderKind::Bookmaker, "A", dec!(100));
    deposit(&ledger, ProviderKind::Exchange, "X", dec!(100));
    let (bm, ex) = (bookmaker(&ledger, "A"), exchange(&ledger, "X"));

    let quote = ledger
        .quote(&draft(&bm, &ex, BetKind::Qualifying, dec!(100), dec!(2.0), dec!(2.0)))
        .unwrap();
    assert_eq!(quote.back_won_profit, dec!(0));
    assert_eq!(quote.lay_won_profit, dec!(0));
}

#[test]
fn free_bet_snr_lay_stake() {
    assert_eq!(
        lay_stake(dec!(50), dec!(5.0), dec!(5.2), BetKind::FREE_SNR, dec!(0.02)).unwrap(),
        dec!(38.61)
    );
}

#[test]
fn settling_twice_raises_and_does_not_double_mutate() {
    let ledger = memory_ledger();
    deposit(&ledger, ProviderKind::Bookmaker, "A", dec!(100));
    deposit(&ledger, ProviderKind::Exchange, "X", dec!(200));
    let (bm, ex) = (bookmaker(&ledger, "A"), exchange(&ledger, "X"));
    let bet = ledger
        .place_bet(&draft(&bm, &ex, BetKind::Qualifying, dec!(100), dec!(2.5), dec!(2.6)))
        .unwrap();

    ledger.settle_bet(bet.id(), BetOutcome::BackWon).unwrap();
    let balance = bookmaker(&ledger, "A").current_balance();

    let err = ledger.settle_bet(bet.id(), BetOutcome::BackWon).unwrap_err();
    assert!(matches!(
        err,
        Error::Domain(DomainError::InvalidState(InvalidStateError::AlreadySettled { .. }))
    ));
    assert_eq!(bookmaker(&ledger, "A").current_balance(), balance);
}

#[test]
fn exposure_returns_to_start_once_every_bet_settles() {
    let ledger = memory_ledger();
    deposit(&ledger, ProviderKind::Bookmaker, "A", dec!(500));
    deposit(&ledger, ProviderKind::Bookmaker, "B", dec!(500));
    deposit(&ledger, ProviderKind::Exchange, "X", dec!(1000));
    let ex = exchange(&ledger, "X");
    let start = ex.exposure();

    let mut bets = Vec::new();
    for (name, kind, stake, back, lay) in [
        ("A", BetKind::Qualifying, dec!(20), dec!(3.0), dec!(3.1)),
        ("B", BetKind::Qualifying, dec!(15), dec!(1.9), dec!(1.95)),
        ("A", BetKind::FREE_SNR, dec!(10), dec!(6.0), dec!(6.4)),
        ("B", BetKind::Free { stake_returned: true }, dec!(10), dec!(4.0), dec!(4.1)),
    ] {
        let bm = bookmaker(&ledger, name);
        bets.push(ledger.place_bet(&draft(&bm, &ex, kind, stake, back, lay)).unwrap());
    }
    let open: rust_decimal::Decimal = bets.iter().map(|b| b.figures().liability).sum();
    assert_eq!(exchange(&ledger, "X").exposure(), start + open);

    for (i, bet) in bets.iter().enumerate() {
        let outcome = if i % 2 == 0 { BetOutcome::LayWon } else { BetOutcome::BackWon };
        ledger.settle_bet(bet.id(), outcome).unwrap();
    }
    assert_eq!(exchange(&ledger, "X").exposure(), start);
    assert_eq!(ledger.aggregates().unwrap().total_exposure, dec!(0));
}

#[test]
fn float_is_conserved_by_placement() {
    let ledger = memory_ledger();
    deposit(&ledger, ProviderKind::Bookmaker, "A", dec!(100));
    deposit(&ledger, ProviderKind::Exchange, "X", dec!(300));
    let (bm, ex) = (bookmaker(&ledger, "A"), exchange(&ledger, "X"));
    let before = ledger.aggregates().unwrap().current_float;

    ledger
        .place_bet(&draft(&bm, &ex, BetKind::Qualifying, dec!(100), dec!(2.5), dec!(2.6)))
        .unwrap();

    let aggregates = ledger.aggregates().unwrap();
    assert_eq!(before, dec!(400));
    assert_eq!(aggregates.current_float, dec!(400));
    assert_eq!(aggregates.open_stakes, dec!(100));
    assert_eq!(aggregates.unsettled_bets, 1);
}

#[test]
fn free_bet_flow_from_offer_to_profit() {
    let ledger = memory_ledger();
    deposit(&ledger, ProviderKind::Exchange, "Smarkets", dec!(500));
    let bm = ledger.add_bookmaker("Coral", dec!(0)).unwrap();
    let ex = exchange(&ledger, "Smarkets");
    let free_bet = ledger.add_free_bet(bm.id(), dec!(50), None, "bet 10 get 50").unwrap();

    let bet = ledger
        .place_bet(
            &draft(&bm, &ex, BetKind::FREE_SNR, dec!(50), dec!(5.0), dec!(5.2))
                .with_free_bet(free_bet.id().clone()),
        )
        .unwrap();
    assert_eq!(ledger.free_bets().unwrap()[0].status(), FreeBetStatus::Used);

    let settled = ledger.settle_bet(bet.id(), BetOutcome::LayWon).unwrap();
    assert_eq!(settled.net_profit(), bet.figures().lay_stake);
    assert_eq!(ledger.aggregates().unwrap().settled_profit, bet.figures().lay_stake);

    let again = ledger.place_bet(
        &draft(&bm, &ex, BetKind::FREE_SNR, dec!(50), dec!(5.0), dec!(5.2))
            .with_free_bet(free_bet.id().clone()),
    );
    assert!(matches!(
        again,
        Err(Error::Domain(DomainError::InvalidState(
            InvalidStateError::FreeBetNotPending { .. }
        )))
    ));
}

#[test]
fn seed_progress_caps_at_full_recovery() {
    let ledger = memory_ledger();
    deposit(&ledger, ProviderKind::Bookmaker, "A", dec!(1000));
    deposit(&ledger, ProviderKind::Exchange, "X", dec!(1000));
    let (bm, ex) = (bookmaker(&ledger, "A"), exchange(&ledger, "X"));
    ledger.set_seed(dec!(10)).unwrap();

    let bet = ledger
        .place_bet(&draft(&bm, &ex, BetKind::FREE_SNR, dec!(100), dec!(3.0), dec!(3.1)))
        .unwrap();
    ledger.settle_bet(bet.id(), BetOutcome::LayWon).unwrap();

    let progress = ledger.aggregates().unwrap().seed_progress;
    assert_eq!(progress.repaid, dec!(10.00));
    assert_eq!(progress.remaining, dec!(0.00));
    assert_eq!(progress.percentage, dec!(100.0));
    assert_eq!(ledger.seed().unwrap().repaid_so_far(), dec!(10));
}

#[test]
fn floor_policy_keeps_shortfall_visible() {
    let ledger = memory_ledger();
    assert_eq!(ledger.policy(), BalancePolicy::Floor);
    deposit(&ledger, ProviderKind::Bookmaker, "A", dec!(30));
    deposit(&ledger, ProviderKind::Exchange, "X", dec!(500));
    let (bm, ex) = (bookmaker(&ledger, "A"), exchange(&ledger, "X"));

    let warnings = ledger
        .check_funds(&draft(&bm, &ex, BetKind::Qualifying, dec!(50), dec!(2.0), dec!(2.1)))
        .unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].shortfall(), dec!(20));

    let bet = ledger
        .place_bet(&draft(&bm, &ex, BetKind::Qualifying, dec!(50), dec!(2.0), dec!(2.1)))
        .unwrap();
    let bm = bookmaker(&ledger, "A");
    assert_eq!(bm.current_balance(), dec!(0));
    assert_eq!(betledger::domain::Provider::account(&bm).shortfall(), dec!(20));

    ledger.delete_bet(bet.id()).unwrap();
    let bm = bookmaker(&ledger, "A");
    assert_eq!(bm.current_balance(), dec!(30));
    assert_eq!(betledger::domain::Provider::account(&bm).shortfall(), dec!(0));
}
