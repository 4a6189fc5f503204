//! src/main.rs

mod address;
mod cli;
mod lookup;
mod source;
mod tokens;
mod worker;

use crate::cli::{Backend, Cli, Mode};
use crate::lookup::{AlchemyLookup, Erc20Lookup, TokenLookup};
use anyhow::{bail, Context};
use clap::Parser;
use log::{debug, info};
use notify_rust::Notification;
use std::env;
use std::io::Write;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const RPC_URL_ENV: &str = "TOKEN_SCAN_RPC_URL";

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let rpc_url = cli
        .rpc_url
        .clone()
        .or_else(|| env::var(RPC_URL_ENV).ok())
        .with_context(|| format!("no RPC endpoint: pass --rpc-url or set {RPC_URL_ENV}"))?;

    let candidates = source::read_candidates(&cli.file, cli.delimiter)?;
    let parsed = candidates.len();
    let candidates = window(candidates, cli.start, cli.limit);
    let total = candidates.len();
    debug!("parsed {parsed} candidates, {total} selected");

    let workers = cli.workers.unwrap_or_else(num_cpus::get).max(1);
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()
        .context("failed to build worker thread pool")?;

    let timeout = Duration::from_secs(cli.timeout);
    let lookup: Box<dyn TokenLookup> = match cli.backend {
        Backend::Alchemy => Box::new(AlchemyLookup::new(rpc_url, timeout)?),
        Backend::Erc20 => Box::new(Erc20Lookup::new(rpc_url, timeout)?),
    };

    info!(
        "scanning {total} candidates on {workers} workers ({:?} backend)",
        cli.backend
    );

    let mode = cli.mode;
    let notify = cli.notify;
    let transform = move |candidate: &str| evaluate(candidate, mode, lookup.as_ref(), notify);

    let (sender, receiver) = mpsc::channel();
    let pool = thread::spawn(move || worker::run(candidates, workers, transform, sender));

    // One line per candidate, in whatever order the workers finish.
    let mut out = std::io::stdout().lock();
    let mut emitted = 0usize;
    for line in receiver {
        writeln!(out, "{line}")?;
        emitted += 1;
    }
    debug!("emitted {emitted}/{total} results");

    if pool.join().is_err() {
        bail!("worker pool panicked");
    }
    Ok(())
}

/// Applies the `--start`/`--limit` window to the candidate list.
fn window(mut candidates: Vec<String>, start: usize, limit: Option<usize>) -> Vec<String> {
    let start = start.min(candidates.len());
    let mut selected = candidates.split_off(start);
    if let Some(limit) = limit {
        selected.truncate(limit);
    }
    selected
}

/// Turns one candidate into its result line. Total: derivation and lookup
/// failures are folded into the line instead of being raised.
fn evaluate(candidate: &str, mode: Mode, lookup: &dyn TokenLookup, notify: bool) -> String {
    match mode {
        Mode::Address => {
            let summary = check(candidate, lookup, notify);
            format!("{candidate}={summary}")
        }
        Mode::Key => match address::address_from_private(candidate) {
            Ok(derived) => {
                let summary = check(&derived, lookup, notify);
                format!("{candidate} -> {derived} -> {summary}")
            }
            Err(error) => format!("{candidate}=error: {error:#}"),
        },
    }
}

fn check(address: &str, lookup: &dyn TokenLookup, notify: bool) -> String {
    let summary = lookup.lookup(address);
    if lookup::is_hit(&summary) {
        info!("{address} holds tokens: {summary}");
        if notify {
            notify_hit(address, &summary);
        }
    }
    summary
}

fn notify_hit(address: &str, summary: &str) {
    if let Err(error) = Notification::new()
        .summary("Token holdings found!")
        .body(&format!("{address}\n{summary}"))
        .timeout(Duration::from_secs(10))
        .show()
    {
        eprintln!("Failed to send notification: {error}");
    }
}
