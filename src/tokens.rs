//! src/tokens.rs

use crate::address::keccak256;
use anyhow::bail;

/// One tracked ERC-20 contract.
pub struct Token {
    pub symbol: &'static str,
    pub contract: &'static str,
    pub decimals: u32,
}

/// The contracts the scanner cares about.
pub const TOKENS: &[Token] = &[
    Token {
        symbol: "DAI",
        contract: "0x6b175474e89094c44da98b954eedeac495271d0f",
        decimals: 18,
    },
    Token {
        symbol: "WETH",
        contract: "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
        decimals: 18,
    },
    Token {
        symbol: "USDT",
        contract: "0xdac17f958d2ee523a2206206994597c13d831ec7",
        decimals: 6,
    },
];

/// Looks a contract address up in the registry. RPC backends are inconsistent
/// about address casing, so the comparison ignores case.
pub fn by_contract(contract: &str) -> Option<&'static Token> {
    TOKENS
        .iter()
        .find(|token| token.contract.eq_ignore_ascii_case(contract))
}

/// Encodes `balanceOf(holder)` calldata for an `eth_call`: the 4-byte
/// function selector followed by the holder address left-padded to 32 bytes.
pub fn balance_of_calldata(holder: &str) -> anyhow::Result<String> {
    let holder = holder.trim_start_matches("0x");
    if holder.len() != 40 || !holder.bytes().all(|b| b.is_ascii_hexdigit()) {
        bail!("malformed holder address {holder:?}");
    }

    let selector = &keccak256(b"balanceOf(address)")[..4];
    Ok(format!(
        "0x{}{}{}",
        hex::encode(selector),
        "0".repeat(24),
        holder.to_lowercase()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_lookup_ignores_case() {
        assert_eq!(
            by_contract("0xdAC17F958D2ee523a2206206994597C13D831ec7")
                .map(|token| token.symbol),
            Some("USDT")
        );
        assert!(by_contract("0x0000000000000000000000000000000000000000").is_none());
    }

    #[test]
    fn encodes_balance_of_calldata() {
        let calldata =
            balance_of_calldata("0x7e5f4552091a69125d5dfcb7b8c2659029395bdf").unwrap();
        // selector for balanceOf(address), then 12 zero bytes, then the holder
        assert_eq!(
            calldata,
            "0x70a082310000000000000000000000007e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
        // also accepted without the 0x prefix
        assert_eq!(
            balance_of_calldata("7e5f4552091a69125d5dfcb7b8c2659029395bdf").unwrap(),
            calldata
        );
    }

    #[test]
    fn rejects_malformed_holders() {
        assert!(balance_of_calldata("0x1234").is_err());
        assert!(balance_of_calldata("zz5f4552091a69125d5dfcb7b8c2659029395bdf").is_err());
    }
}
