//! Infrastructure layer.
//!
//! Technical concerns that support the ledger without containing business
//! logic.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root wiring config to a store and ledger
//! - [`config`] - Configuration loading and validation

pub mod bootstrap;
pub mod config;
