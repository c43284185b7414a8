//! Merchant-name normalization and bank transaction ingest.
//!
//! [`workflows::merchants`] turns raw bank merchant text into canonical
//! merchant names; [`workflows::transactions`] reads bank CSV exports into
//! records carrying both the raw and the normalized merchant.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
