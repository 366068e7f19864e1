// Remote transaction ledger: wire types and typed HTTP access
pub mod client;
pub mod models;

pub use client::{Ledger, LedgerClient, LedgerResult};

#[cfg(test)]
pub mod testing;
