//! SplitShare - roommate expense splitting
//!
//! This library provides the core of the SplitShare expense splitter: a
//! multi-currency debt ledger, a settlement engine and the balance
//! calculator that turns both into "who owes whom".
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (expenses, settlements, groups, budgets, etc.)
//! - `currency`: Exchange rates with a live source and a fallback table
//! - `balance`: Pure balance computation and settle-up suggestions
//! - `storage`: JSON file storage layer with an append-only settlement log
//! - `services`: Business logic layer
//! - `export`: CSV and JSON export
//! - `display`, `cli`: Terminal formatting and command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use splitshare::balance::BalanceCalculator;
//! use splitshare::currency::FallbackRates;
//! use splitshare::models::Currency;
//!
//! let rates = FallbackRates::builtin();
//! let calculator = BalanceCalculator::new(&rates, Currency::Usd);
//! let balances = calculator.pairwise(&expenses, &settlements);
//! ```

pub mod balance;
pub mod cli;
pub mod config;
pub mod currency;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{SplitError, SplitResult};
