//! HMAC-SHA256 request signing for the two MEXC API families.
//!
//! The spot and futures APIs sign different payloads and carry the signature in
//! different places:
//!
//! | scheme  | signed payload                             | signature goes in      |
//! |---------|--------------------------------------------|------------------------|
//! | spot    | query string incl. `timestamp`             | `signature` query param|
//! | futures | `access_key + timestamp + sorted params`   | `Signature` header     |

use super::credentials::Credentials;
use super::error::ExchangeError;
use super::params::RequestParams;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Replay tolerance sent with every futures call, in seconds. The server caps it at 60.
pub const FUTURES_RECV_WINDOW_SECS: u32 = 30;

/// Which signing protocol a request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningScheme {
    /// `/api/v3` spot endpoints.
    Spot,
    /// `/api/v1/private` contract endpoints.
    Futures,
}

/// Per-request inputs to a signature.
#[derive(Debug)]
pub struct SigningContext<'a> {
    pub credentials: &'a Credentials,
    pub timestamp_ms: i64,
}

impl<'a> SigningContext<'a> {
    pub fn new(credentials: &'a Credentials, timestamp_ms: i64) -> Self {
        Self {
            credentials,
            timestamp_ms,
        }
    }

    /// Context stamped with the current wall clock time.
    pub fn now(credentials: &'a Credentials) -> Self {
        Self::new(credentials, Utc::now().timestamp_millis())
    }
}

/// A request ready to send: encoded query string plus headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub query: String,
    pub headers: Vec<(&'static str, String)>,
}

impl SignedRequest {
    /// An unsigned request. The spot API key header is attached when one is known.
    pub fn unsigned(params: &RequestParams, access_key: Option<&str>) -> Self {
        let mut headers = vec![("Content-Type", "application/json".to_string())];
        if let Some(key) = access_key {
            headers.push(("X-MEXC-APIKEY", key.to_string()));
        }
        Self {
            query: params.to_query_string(),
            headers,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl SigningScheme {
    /// Sign `params` and lay them out for the wire.
    pub fn sign(
        &self,
        params: RequestParams,
        ctx: &SigningContext<'_>,
    ) -> Result<SignedRequest, ExchangeError> {
        match self {
            Self::Spot => sign_spot(params, ctx),
            Self::Futures => sign_futures(params, ctx),
        }
    }
}

fn sign_spot(
    mut params: RequestParams,
    ctx: &SigningContext<'_>,
) -> Result<SignedRequest, ExchangeError> {
    params.insert("timestamp", ctx.timestamp_ms);
    sign_spot_params(&mut params, ctx.credentials.secret_key())?;

    Ok(SignedRequest {
        query: params.to_query_string(),
        headers: vec![
            ("X-MEXC-APIKEY", ctx.credentials.access_key().to_string()),
            ("Content-Type", "application/json".to_string()),
        ],
    })
}

fn sign_futures(
    params: RequestParams,
    ctx: &SigningContext<'_>,
) -> Result<SignedRequest, ExchangeError> {
    let timestamp = ctx.timestamp_ms.to_string();
    let param_string = futures_param_string(&params);
    let signature = sign_futures_payload(
        &param_string,
        ctx.credentials.access_key(),
        ctx.credentials.secret_key(),
        &timestamp,
    )?;

    Ok(SignedRequest {
        // Sent exactly as signed.
        query: param_string,
        headers: vec![
            ("ApiKey", ctx.credentials.access_key().to_string()),
            ("Request-Time", timestamp),
            ("Signature", signature),
            ("Recv-Window", FUTURES_RECV_WINDOW_SECS.to_string()),
            ("Content-Type", "application/json".to_string()),
        ],
    })
}

/// Sign spot parameters in place, appending the digest under `signature`.
///
/// `params` must already contain `timestamp`. Returns the digest.
pub fn sign_spot_params(params: &mut RequestParams, secret: &str) -> Result<String, ExchangeError> {
    let signature = hmac_sha256_hex(secret, &params.to_query_string())?;
    params.insert("signature", &signature);
    Ok(signature)
}

/// Canonical futures parameter string: keys sorted, form-encoded.
pub fn futures_param_string(params: &RequestParams) -> String {
    params.to_sorted_query_string()
}

/// `HMAC_SHA256(secret, access_key + timestamp + param_string)` as lowercase hex.
pub fn sign_futures_payload(
    param_string: &str,
    access_key: &str,
    secret: &str,
    timestamp: &str,
) -> Result<String, ExchangeError> {
    let target = format!("{}{}{}", access_key, timestamp, param_string);
    hmac_sha256_hex(secret, &target)
}

/// Lowercase hex HMAC-SHA256 of `message` keyed by `secret`.
pub fn hmac_sha256_hex(secret: &str, message: &str) -> Result<String, ExchangeError> {
    if secret.is_empty() {
        return Err(ExchangeError::Config("API secret is empty".to_string()));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| ExchangeError::Config("Invalid secret key".to_string()))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE_SECRET: &str =
        "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";

    fn is_lower_hex_64(s: &str) -> bool {
        s.len() == 64 && s.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
    }

    #[test]
    fn test_spot_reference_vector() {
        let creds = Credentials::new("api-key", REFERENCE_SECRET);
        let ctx = SigningContext::new(&creds, 1499827319559);
        let params = RequestParams::new()
            .with("symbol", "LTCBTC")
            .with("side", "BUY")
            .with("type", "LIMIT")
            .with("timeInForce", "GTC")
            .with("quantity", 1)
            .with("price", "0.1")
            .with("recvWindow", 5000);

        let signed = SigningScheme::Spot.sign(params, &ctx).unwrap();

        assert_eq!(
            signed.query,
            "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1\
             &recvWindow=5000&timestamp=1499827319559\
             &signature=c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
        assert_eq!(signed.header("X-MEXC-APIKEY"), Some("api-key"));
        assert_eq!(signed.header("Signature"), None);
    }

    #[test]
    fn test_sign_spot_params_appends_signature() {
        let mut params = RequestParams::new().with("timestamp", 1000);
        let digest = sign_spot_params(&mut params, "secret").unwrap();

        assert_eq!(params.get("signature"), Some(digest.as_str()));
        assert!(params.to_query_string().starts_with("timestamp=1000&signature="));
    }

    #[test]
    fn test_futures_reference_vector() {
        let creds = Credentials::new("fixture-key", "fixture-secret");
        let ctx = SigningContext::new(&creds, 1700000000000);
        let params = RequestParams::new()
            .with("symbol", "BTC_USDT")
            .with("page_size", 20)
            .with("page_num", 1);

        let signed = SigningScheme::Futures.sign(params, &ctx).unwrap();

        assert_eq!(signed.query, "page_num=1&page_size=20&symbol=BTC_USDT");
        assert_eq!(signed.header("ApiKey"), Some("fixture-key"));
        assert_eq!(signed.header("Request-Time"), Some("1700000000000"));
        assert_eq!(signed.header("Recv-Window"), Some("30"));
        assert_eq!(
            signed.header("Signature"),
            Some("44729fe53de150c3b5f502be308adcb4b3a8f20be6bb323a471709c122207a70")
        );
        assert!(!signed.query.contains("signature"));
    }

    #[test]
    fn test_futures_empty_params_signs_key_and_timestamp_only() {
        let digest = sign_futures_payload("", "fixture-key", "fixture-secret", "1700000000000")
            .unwrap();
        assert_eq!(
            digest,
            "0cd6547785a0fceddd9d436c8f0ec917969b04acae90c692fac17f2e63af8a26"
        );
    }

    #[test]
    fn test_futures_signature_independent_of_param_order() {
        let creds = Credentials::new("k", "s");
        let ctx = SigningContext::new(&creds, 42);
        let a = RequestParams::new().with("b", 2).with("a", 1).with("c", 3);
        let b = RequestParams::new().with("c", 3).with("a", 1).with("b", 2);

        let sa = SigningScheme::Futures.sign(a, &ctx).unwrap();
        let sb = SigningScheme::Futures.sign(b, &ctx).unwrap();
        assert_eq!(sa, sb);
    }

    #[test]
    fn test_hmac_is_deterministic_lowercase_hex() {
        for (secret, message) in [("s", ""), ("another", "a=1&b=2"), ("ключ", "ünïcode")] {
            let first = hmac_sha256_hex(secret, message).unwrap();
            let second = hmac_sha256_hex(secret, message).unwrap();
            assert_eq!(first, second);
            assert!(is_lower_hex_64(&first), "{}", first);
        }
    }

    #[test]
    fn test_empty_secret_is_config_error() {
        let creds = Credentials::new("key", "");
        let ctx = SigningContext::new(&creds, 1);

        for scheme in [SigningScheme::Spot, SigningScheme::Futures] {
            let result = scheme.sign(RequestParams::new(), &ctx);
            assert!(matches!(result, Err(ExchangeError::Config(_))));
        }
    }

    #[test]
    fn test_unsigned_request_headers() {
        let params = RequestParams::new().with("symbol", "BTCUSDT");

        let anon = SignedRequest::unsigned(&params, None);
        assert_eq!(anon.query, "symbol=BTCUSDT");
        assert_eq!(anon.header("X-MEXC-APIKEY"), None);

        let keyed = SignedRequest::unsigned(&params, Some("key"));
        assert_eq!(keyed.header("x-mexc-apikey"), Some("key"));
    }
}
