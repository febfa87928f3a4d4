//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │        (Ledger)         │
//!                    └────────────┬────────────┘
//!                                 │
//!                                 ▼
//!                          ┌─────────────┐
//!                          │    Store    │
//!                          │    Port     │
//!                          └──────┬──────┘
//!                     ┌───────────┴───────────┐
//!                     ▼                       ▼
//!               ┌───────────┐          ┌─────────────┐
//!               │  Memory   │          │  JSON file  │
//!               └───────────┘          └─────────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`Store`] - Collection persistence for ledger records

mod store;

pub use store::{Collection, Store, WriteBatch};
