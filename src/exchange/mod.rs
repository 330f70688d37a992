//! MEXC exchange integration.
//!
//! ## Spot
//! `/api/v3` endpoints signed with the query-string scheme: the digest travels as
//! a `signature` parameter next to `timestamp`.
//!
//! ## Futures
//! `/api/v1/private` contract endpoints signed over
//! `access_key + timestamp + sorted params`, with the digest in headers.

mod client;
mod credentials;
mod error;
mod params;
pub mod signing;
mod types;

pub use client::{
    classify, MexcClient, RawResponse, FUTURES_ASSETS_PATH, REQUEST_TIMEOUT, SPOT_ACCOUNT_PATH,
};
pub use credentials::Credentials;
pub use error::ExchangeError;
pub use params::RequestParams;
pub use signing::{SignedRequest, SigningContext, SigningScheme};
pub use types::*;
