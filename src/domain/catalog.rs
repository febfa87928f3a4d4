//! Default UK provider catalogue installed into an empty ledger.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::ValidationError;
use super::provider::{Bookmaker, Exchange};

/// Bookmakers and their commission percent.
pub const DEFAULT_BOOKMAKERS: &[(&str, Decimal)] = &[
    ("Bet365", dec!(0)),
    ("William Hill", dec!(0)),
    ("Ladbrokes", dec!(0)),
    ("Coral", dec!(0)),
    ("Paddy Power", dec!(0)),
    ("Sky Bet", dec!(0)),
    ("Betfair Sportsbook", dec!(0)),
    ("Unibet", dec!(0)),
];

/// Exchanges and their standard commission percent on net winnings.
pub const DEFAULT_EXCHANGES: &[(&str, Decimal)] = &[
    ("Betfair Exchange", dec!(5)),
    ("Smarkets", dec!(2)),
    ("Betdaq", dec!(5)),
    ("Matchbook", dec!(1)),
];

/// Fresh, unfunded records for the default catalogue.
pub fn default_providers() -> Result<(Vec<Bookmaker>, Vec<Exchange>), ValidationError> {
    let bookmakers = DEFAULT_BOOKMAKERS
        .iter()
        .map(|(name, commission)| Bookmaker::try_new(name, *commission))
        .collect::<Result<Vec<_>, _>>()?;
    let exchanges = DEFAULT_EXCHANGES
        .iter()
        .map(|(name, commission)| Exchange::try_new(name, *commission))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((bookmakers, exchanges))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::{name_key, Provider};
    use std::collections::HashSet;

    #[test]
    fn catalogue_builds_with_unique_names() {
        let (bookmakers, exchanges) = default_providers().unwrap();
        assert_eq!(bookmakers.len(), DEFAULT_BOOKMAKERS.len());
        assert_eq!(exchanges.len(), DEFAULT_EXCHANGES.len());

        let names: HashSet<_> = bookmakers.iter().map(|b| name_key(b.name())).collect();
        assert_eq!(names.len(), bookmakers.len());
    }

    #[test]
    fn smarkets_charges_two_percent() {
        let (_, exchanges) = default_providers().unwrap();
        let smarkets = exchanges.iter().find(|e| e.name() == "Smarkets").unwrap();
        assert_eq!(smarkets.commission(), dec!(2));
        assert_eq!(smarkets.current_balance(), dec!(0));
    }
}
