//! src/lookup.rs

use crate::tokens::{self, TOKENS};
use anyhow::{anyhow, bail, Context};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reserved summary meaning "no tracked token balance found".
pub const EMPTY_SENTINEL: &str = "ZER";

/// A zero balance, as the 32-byte quantity the token-balance API reports it.
const EMPTY_BALANCE: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000000";

/// External balance lookup capability.
///
/// Total by contract: implementations never fail and never panic. Transport
/// and protocol errors are rendered into the returned summary as
/// `error: <message>`.
pub trait TokenLookup: Send + Sync {
    fn lookup(&self, address: &str) -> String;
}

/// True when a summary reports an actual token holding rather than the empty
/// sentinel or a captured lookup error.
pub fn is_hit(summary: &str) -> bool {
    !summary.is_empty() && summary != EMPTY_SENTINEL && !summary.starts_with("error:")
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    id: u32,
    jsonrpc: &'a str,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenBalancesResult {
    token_balances: Vec<TokenBalance>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenBalance {
    contract_address: String,
    token_balance: String,
}

fn http_client(timeout: Duration) -> anyhow::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")
}

fn post_rpc<T: serde::de::DeserializeOwned>(
    client: &reqwest::blocking::Client,
    url: &str,
    method: &str,
    params: serde_json::Value,
) -> anyhow::Result<T> {
    let request = RpcRequest {
        id: 1,
        jsonrpc: "2.0",
        method,
        params,
    };

    let response: RpcResponse<T> = client
        .post(url)
        .json(&request)
        .send()
        .with_context(|| format!("{method} request failed"))?
        .error_for_status()
        .with_context(|| format!("{method} request rejected"))?
        .json()
        .with_context(|| format!("malformed {method} response"))?;

    if let Some(error) = response.error {
        bail!("rpc error {}: {}", error.code, error.message);
    }
    response
        .result
        .with_context(|| format!("{method} response carries no result"))
}

/// Batch token-balance backend speaking `alchemy_getTokenBalances`.
pub struct AlchemyLookup {
    client: reqwest::blocking::Client,
    url: String,
}

impl AlchemyLookup {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            url,
        })
    }

    fn token_balances(&self, address: &str) -> anyhow::Result<String> {
        let holder = format!("0x{}", address.trim_start_matches("0x"));
        let result: TokenBalancesResult = post_rpc(
            &self.client,
            &self.url,
            "alchemy_getTokenBalances",
            serde_json::json!([holder]),
        )?;
        Ok(summarize(&result.token_balances))
    }
}

impl TokenLookup for AlchemyLookup {
    fn lookup(&self, address: &str) -> String {
        match self.token_balances(address) {
            Ok(summary) => summary,
            Err(error) => format!("error: {error:#}"),
        }
    }
}

/// Collapses reported balances into the `SYM#0x...` summary, keeping only
/// registry tokens with a non-zero balance.
fn summarize(balances: &[TokenBalance]) -> String {
    let held: Vec<String> = balances
        .iter()
        .filter(|balance| balance.token_balance != EMPTY_BALANCE)
        .filter_map(|balance| {
            tokens::by_contract(&balance.contract_address)
                .map(|token| format!("{}#{}", token.symbol, balance.token_balance))
        })
        .collect();

    if held.is_empty() {
        EMPTY_SENTINEL.to_string()
    } else {
        held.join(",")
    }
}

/// Plain ERC-20 backend: one `eth_call` of `balanceOf` per registry token.
/// Works against any JSON-RPC endpoint, not just Alchemy.
pub struct Erc20Lookup {
    client: reqwest::blocking::Client,
    url: String,
}

impl Erc20Lookup {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            url,
        })
    }

    fn token_balances(&self, address: &str) -> anyhow::Result<String> {
        let calldata = tokens::balance_of_calldata(address)?;

        let mut held = Vec::new();
        for token in TOKENS {
            let quantity: String = post_rpc(
                &self.client,
                &self.url,
                "eth_call",
                serde_json::json!([{ "to": token.contract, "data": &calldata }, "latest"]),
            )
            .with_context(|| format!("balanceOf({}) failed", token.symbol))?;

            let balance = decode_quantity(&quantity)?;
            if !balance.is_zero() {
                held.push(format!(
                    "{}#{}",
                    token.symbol,
                    format_units(&balance, token.decimals)
                ));
            }
        }

        if held.is_empty() {
            Ok(EMPTY_SENTINEL.to_string())
        } else {
            Ok(held.join(","))
        }
    }
}

impl TokenLookup for Erc20Lookup {
    fn lookup(&self, address: &str) -> String {
        match self.token_balances(address) {
            Ok(summary) => summary,
            Err(error) => format!("error: {error:#}"),
        }
    }
}

/// Parses a JSON-RPC hex quantity like `0x1bc16d674ec80000`.
fn decode_quantity(quantity: &str) -> anyhow::Result<BigUint> {
    let digits = quantity.trim_start_matches("0x");
    if digits.is_empty() {
        return Ok(BigUint::zero());
    }
    BigUint::parse_bytes(digits.as_bytes(), 16)
        .ok_or_else(|| anyhow!("invalid hex quantity {quantity:?}"))
}

/// Renders a raw token quantity as a decimal amount, e.g. 1500000 with six
/// decimals becomes "1.5".
fn format_units(value: &BigUint, decimals: u32) -> String {
    let scale = BigUint::from(10u32).pow(decimals);
    let integer = value / &scale;
    let fraction = value % &scale;
    if fraction.is_zero() {
        return integer.to_string();
    }

    let digits = fraction.to_string();
    let mut padded = "0".repeat(decimals as usize - digits.len());
    padded.push_str(&digits);
    format!("{integer}.{}", padded.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(contract: &str, quantity: &str) -> TokenBalance {
        TokenBalance {
            contract_address: contract.to_string(),
            token_balance: quantity.to_string(),
        }
    }

    #[test]
    fn hit_detection() {
        assert!(is_hit("DAI#0x01"));
        assert!(!is_hit(EMPTY_SENTINEL));
        assert!(!is_hit("error: connection refused"));
        assert!(!is_hit(""));
    }

    #[test]
    fn summarize_filters_and_joins() {
        let balances = vec![
            // zero balance is skipped
            balance("0x6b175474e89094c44da98b954eedeac495271d0f", EMPTY_BALANCE),
            // unknown contract is skipped
            balance("0x0000000000000000000000000000000000000001", "0x0a"),
            // checksummed casing still matches the registry
            balance("0xdAC17F958D2ee523a2206206994597C13D831ec7", "0x0f4240"),
            balance("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "0x01"),
        ];
        assert_eq!(summarize(&balances), "USDT#0x0f4240,WETH#0x01");
    }

    #[test]
    fn summarize_empty_is_the_sentinel() {
        assert_eq!(summarize(&[]), EMPTY_SENTINEL);
        let only_zero = vec![balance(
            "0x6b175474e89094c44da98b954eedeac495271d0f",
            EMPTY_BALANCE,
        )];
        assert_eq!(summarize(&only_zero), EMPTY_SENTINEL);
    }

    #[test]
    fn decodes_quantities() {
        assert_eq!(decode_quantity("0x0").unwrap(), BigUint::zero());
        assert_eq!(decode_quantity("0x").unwrap(), BigUint::zero());
        assert_eq!(
            decode_quantity("0x1bc16d674ec80000").unwrap(),
            BigUint::from(2_000_000_000_000_000_000u64)
        );
        assert!(decode_quantity("0xzz").is_err());
    }

    #[test]
    fn formats_units() {
        let fmt = |value: u64, decimals| format_units(&BigUint::from(value), decimals);
        assert_eq!(fmt(0, 18), "0");
        assert_eq!(fmt(1_500_000_000_000_000_000, 18), "1.5");
        assert_eq!(fmt(1, 18), "0.000000000000000001");
        assert_eq!(fmt(1_000_000, 6), "1");
        assert_eq!(fmt(123, 6), "0.000123");
        assert_eq!(fmt(2_500_000, 6), "2.5");
    }

    #[test]
    fn serializes_rpc_requests() {
        let request = RpcRequest {
            id: 1,
            jsonrpc: "2.0",
            method: "alchemy_getTokenBalances",
            params: serde_json::json!(["0x1111"]),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "id": 1,
                "jsonrpc": "2.0",
                "method": "alchemy_getTokenBalances",
                "params": ["0x1111"],
            })
        );
    }

    #[test]
    fn deserializes_token_balance_responses() {
        let body = r#"{
            "id": 1,
            "jsonrpc": "2.0",
            "result": {
                "address": "0x1111111111111111111111111111111111111111",
                "tokenBalances": [
                    {
                        "contractAddress": "0x6b175474e89094c44da98b954eedeac495271d0f",
                        "tokenBalance": "0x01"
                    }
                ]
            }
        }"#;
        let response: RpcResponse<TokenBalancesResult> = serde_json::from_str(body).unwrap();
        let result = response.result.unwrap();
        assert_eq!(summarize(&result.token_balances), "DAI#0x01");
    }

    #[test]
    fn deserializes_rpc_errors() {
        let body = r#"{"id":1,"jsonrpc":"2.0","error":{"code":-32600,"message":"bad request"}}"#;
        let response: RpcResponse<TokenBalancesResult> = serde_json::from_str(body).unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, -32600);
        assert_eq!(error.message, "bad request");
    }
}
