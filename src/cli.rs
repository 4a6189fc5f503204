//! src/cli.rs

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Scans candidate keys and addresses for ERC-20 token holdings.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Candidate list: one `label=candidate` entry per line.
    pub file: PathBuf,

    /// Whether candidates are ready addresses or private keys to derive.
    #[arg(long, value_enum, default_value_t = Mode::Address)]
    pub mode: Mode,

    /// Balance lookup backend.
    #[arg(long, value_enum, default_value_t = Backend::Alchemy)]
    pub backend: Backend,

    /// JSON-RPC endpoint for balance lookups. Falls back to $TOKEN_SCAN_RPC_URL.
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Number of worker threads. Defaults to all available cores.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Index of the first candidate to scan.
    #[arg(long, default_value_t = 0)]
    pub start: usize,

    /// Maximum number of candidates to scan.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Field separator used in the candidate file.
    #[arg(long, default_value_t = '=')]
    pub delimiter: char,

    /// Per-lookup HTTP timeout, in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Send a desktop notification when a candidate holds tokens.
    #[arg(long, default_value_t = false)]
    pub notify: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Mode {
    /// Candidates are Ethereum addresses.
    Address,
    /// Candidates are raw private keys; the address is derived first.
    Key,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Backend {
    /// One `alchemy_getTokenBalances` call per candidate.
    Alchemy,
    /// One `eth_call` of `balanceOf` per candidate and registry token.
    Erc20,
}
