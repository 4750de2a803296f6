//! Core engine — the scan → estimate → alert loop.

pub mod estimator;
pub mod ledger;
pub mod scanner;
pub mod supervisor;
