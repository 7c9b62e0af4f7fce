//! PayGrid core: non-custodial payment-intent lifecycle, settlement
//! reconciliation against a public ledger, and read-side analytics.

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use engine::{CreatedIntent, PayGrid};
pub use error::PayGridError;
