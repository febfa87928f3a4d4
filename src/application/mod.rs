//! Application services (use cases).
//!
//! The [`Ledger`] service orchestrates domain logic over a
//! [`Store`](crate::port::Store).

mod ledger;
mod snapshot;

pub use ledger::Ledger;
