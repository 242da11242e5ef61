//! Marketplace listing fee calculator.
//!
//! Converts between a desired payout and a listing price under a fixed 10%
//! fee, and keeps saved calculations in two local lists (history and
//! inventory) backed by SQLite.

pub mod calculator;
pub mod config;
pub mod controller;
pub mod errors;
pub mod model;
pub mod shipping;
pub mod store;
pub mod ui;
