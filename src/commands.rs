//! Account export operations: configuration → sign → call → export.

use crate::config::Config;
use crate::exchange::{
    ExchangeError, MexcClient, RawResponse, RequestParams, SignedRequest, SigningContext,
    SigningScheme, SPOT_ACCOUNT_PATH,
};
use crate::export::{export_records, ExportOutcome, ExportTarget};
use anyhow::{Context, Result};
use tracing::{debug, info};

pub const DEFAULT_SPOT_CSV: &str = "mexc_balances.csv";
pub const DEFAULT_FUTURES_CSV: &str = "mexc_futures_assets.csv";

pub const SPOT_BALANCE_COLUMNS: [&str; 4] = ["asset", "free", "locked", "available"];

pub const FUTURES_ASSET_COLUMNS: [&str; 13] = [
    "currency",
    "positionMargin",
    "availableBalance",
    "cashBalance",
    "frozenBalance",
    "equity",
    "unrealized",
    "bonus",
    "availableCash",
    "availableOpen",
    "debtAmount",
    "contributeMarginAmount",
    "vcoinId",
];

/// Fetch spot balances and export them.
pub async fn export_spot_balances(config: &Config, target: &ExportTarget) -> Result<ExportOutcome> {
    let credentials = config.spot_credentials()?;
    let client = MexcClient::new(&config.spot_base_url)?;

    info!("Fetching spot account information...");
    let account = client
        .spot_account(credentials)
        .await
        .context("Spot account request failed")?;

    if account.balances.is_empty() {
        info!("No balances returned by the API");
    } else {
        info!("{} assets found", account.balances.len());
    }

    export_records(&account.balances, &SPOT_BALANCE_COLUMNS, target)
}

/// Fetch futures wallet assets and export them.
pub async fn export_futures_assets(config: &Config, target: &ExportTarget) -> Result<ExportOutcome> {
    let credentials = config.futures_credentials()?;
    let client = MexcClient::new(&config.futures_base_url)?;

    info!("Fetching futures wallet assets...");
    let assets = client
        .futures_assets(credentials)
        .await
        .context("Futures assets request failed")?;

    if assets.is_empty() {
        info!("No assets returned for the futures wallet (data = [])");
    } else {
        info!("{} currencies found", assets.len());
    }

    export_records(&assets, &FUTURES_ASSET_COLUMNS, target)
}

/// A one-off GET against the spot host.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub endpoint: String,
    pub signed: bool,
    pub params: RequestParams,
}

impl Default for ProbeRequest {
    fn default() -> Self {
        Self {
            endpoint: SPOT_ACCOUNT_PATH.to_string(),
            signed: true,
            params: RequestParams::new(),
        }
    }
}

/// Send a probe request and return the raw response, whatever its status.
///
/// Signed probes need spot credentials and fail before any network call when
/// they are missing. Unsigned probes attach the API key header if configured.
pub async fn probe(config: &Config, request: ProbeRequest) -> Result<RawResponse, ExchangeError> {
    let client = MexcClient::new(&config.spot_base_url)?;

    let signed = if request.signed {
        let credentials = config.spot_credentials()?;
        SigningScheme::Spot.sign(request.params, &SigningContext::now(credentials))?
    } else {
        let access_key = config.spot.as_ref().map(|c| c.access_key());
        SignedRequest::unsigned(&request.params, access_key)
    };

    debug!("Probe headers: {:?}", header_names(&signed));
    client.send(&request.endpoint, &signed).await
}

fn header_names(request: &SignedRequest) -> Vec<&'static str> {
    request.headers.iter().map(|(name, _)| *name).collect()
}
