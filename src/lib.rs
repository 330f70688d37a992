//! # MEXC Export
//!
//! Signed account exports from the MEXC spot and futures REST APIs to CSV.
//!
//! ## Architecture
//!
//! - `config`: Credentials and endpoint hosts from env, `.env` and config file
//! - `exchange`: Request signing (spot and futures schemes) and the signed HTTP caller
//! - `export`: Fixed-column CSV writer for flat JSON records
//! - `commands`: End-to-end export and probe operations

pub mod commands;
pub mod config;
pub mod exchange;
pub mod export;

pub use config::Config;
