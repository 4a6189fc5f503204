//! src/address.rs

use anyhow::{bail, Context};
use secp256k1::{PublicKey, SecretKey, SECP256K1};
use tiny_keccak::{Hasher, Keccak};

/// Keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut keccak = Keccak::v256();
    keccak.update(data);
    let mut digest = [0u8; 32];
    keccak.finalize(&mut digest);
    digest
}

/// Derives the Ethereum address for a raw private key.
///
/// Input is 64 hex characters; output is the lowercase hex address without a
/// `0x` prefix. Fails on malformed hex and on scalars outside the secp256k1
/// key range.
pub fn address_from_private(key_hex: &str) -> anyhow::Result<String> {
    let key_bytes = hex::decode(key_hex.trim()).context("invalid private key hex")?;
    if key_bytes.len() != 32 {
        bail!("private key must be 32 bytes, got {}", key_bytes.len());
    }

    let secret_key =
        SecretKey::from_slice(&key_bytes).context("private key outside the curve order")?;
    let public_key = PublicKey::from_secret_key(&SECP256K1, &secret_key);

    // Uncompressed key is 0x04 || X || Y; the address is the last 20 bytes of
    // the Keccak-256 hash over X || Y.
    let digest = keccak256(&public_key.serialize_uncompressed()[1..]);
    Ok(hex::encode(&digest[12..]))
}
