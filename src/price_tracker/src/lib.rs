//! Price tracking library: extract product prices on a schedule, keep an
//! append-only history per product, and alert when the latest price falls far
//! enough below the earliest one.
//!
//! The `price-tracker` binary wires these pieces together; see [`cycle`] for
//! the per-product pipeline and [`tracking`] for managing the tracked URLs.

#![deny(missing_docs)]

pub mod config;
pub mod cycle;
pub mod db;
pub mod detector;
pub mod history;
pub mod models;
pub mod notify;
pub mod providers;
/// Diesel table definitions for the history database.
#[allow(missing_docs)]
pub mod schema;
pub mod tracking;
pub mod tz;
