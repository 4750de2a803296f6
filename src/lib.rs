//! SNIPER — unattended auction-arbitrage scanner.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod alerts;
pub mod auth;
pub mod config;
pub mod engine;
pub mod marketplace;
pub mod types;
