//! CUSTOS Audit Ledger — Demo CLI
//!
//! Plays the two external collaborators of the ledger core: the event
//! producer (feeding the appender) and the report consumer (rendering
//! verification reports).  Each scenario wires up real components — store,
//! secret provider, appender, verifier — and shows one property of the
//! tamper-evident chain.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- append-verify
//!   cargo run -p demo -- tamper
//!   cargo run -p demo -- gap
//!   cargo run -p demo -- concurrent
//!   cargo run -p demo -- rotation

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use custos_contracts::{error::LedgerResult, AuditEvent, ChainId};
use custos_ledger::{
    ChainAppender, LedgerConfig, MemoryLedgerStore, RotatingSecretProvider,
    StaticSecretProvider,
};
use custos_verify::{ChainVerifier, VerifyOptions};

// ── CLI definition ────────────────────────────────────────────────────────────

/// CUSTOS — tamper-evident audit ledger demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "CUSTOS audit ledger demo",
    long_about = "Runs CUSTOS demo scenarios showing hash-chained appends,\n\
                  tamper and gap detection, single-writer concurrency, and\n\
                  secret rotation."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every scenario in sequence.
    RunAll,
    /// Append three events and verify the chain is intact.
    AppendVerify,
    /// Modify a committed record in storage and watch verification pinpoint it.
    Tamper,
    /// Delete a committed record and watch verification report the gap.
    Gap,
    /// Fire 50 concurrent appends and confirm one linear chain results.
    Concurrent,
    /// Rotate the signing secret and verify records from both eras.
    Rotation,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Structured logging.  Set RUST_LOG=debug for per-append detail.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::RunAll => run_all(),
        Command::AppendVerify => append_verify(),
        Command::Tamper => tamper(),
        Command::Gap => gap(),
        Command::Concurrent => concurrent(),
        Command::Rotation => rotation(),
    };

    if let Err(e) = result {
        eprintln!("demo error: {}", e);
        std::process::exit(1);
    }
}

fn run_all() -> LedgerResult<()> {
    append_verify()?;
    tamper()?;
    gap()?;
    concurrent()?;
    rotation()
}

// ── Scenario plumbing ─────────────────────────────────────────────────────────

fn make_ledger() -> (Arc<MemoryLedgerStore>, Arc<StaticSecretProvider>, ChainAppender) {
    let store = Arc::new(MemoryLedgerStore::new());
    let secrets = Arc::new(StaticSecretProvider::new(b"demo-signing-key".to_vec()));
    let appender = ChainAppender::new(
        ChainId::new(),
        store.clone(),
        secrets.clone(),
        LedgerConfig::default(),
    );
    (store, secrets, appender)
}

fn append_three(appender: &ChainAppender) -> LedgerResult<()> {
    appender.append(AuditEvent::new("login", "alice", "session 81"))?;
    appender.append(AuditEvent::new("record_accessed", "alice", "patient p-100"))?;
    appender.append(AuditEvent::new("consent_revoked", "patient-p-100", "research use"))?;
    Ok(())
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

fn append_verify() -> LedgerResult<()> {
    println!("── append-verify ──────────────────────────────────────────");
    let config = LedgerConfig::default();
    let store = Arc::new(MemoryLedgerStore::new());
    let secrets = Arc::new(StaticSecretProvider::new(b"demo-signing-key".to_vec()));
    let appender = ChainAppender::new(
        ChainId::new(),
        store.clone(),
        secrets.clone(),
        config.clone(),
    );
    append_three(&appender)?;

    let verifier = ChainVerifier::new(store, secrets);
    let report = verifier.verify(&VerifyOptions {
        tail_exclusion: config.tail_exclusion,
        ..VerifyOptions::default()
    })?;
    println!("   {}", report.summary());
    Ok(())
}

fn tamper() -> LedgerResult<()> {
    println!("── tamper ─────────────────────────────────────────────────");
    let (store, secrets, appender) = make_ledger();
    append_three(&appender)?;

    // An attacker with direct storage access edits record 2 in place.
    let mut records = store.snapshot()?;
    records[1].details = "patient p-999".to_string();
    let damaged = Arc::new(MemoryLedgerStore::from_records(records));

    let verifier = ChainVerifier::new(damaged, secrets);
    let report = verifier.verify(&VerifyOptions::forensic())?;
    println!("   {}", report.summary());
    Ok(())
}

fn gap() -> LedgerResult<()> {
    println!("── gap ────────────────────────────────────────────────────");
    let (store, secrets, appender) = make_ledger();
    append_three(&appender)?;

    // An attacker deletes record 2 from storage entirely.
    let mut records = store.snapshot()?;
    records.remove(1);
    let damaged = Arc::new(MemoryLedgerStore::from_records(records));

    let verifier = ChainVerifier::new(damaged, secrets);
    let report = verifier.verify_all()?;
    println!("   {}", report.summary());
    Ok(())
}

fn concurrent() -> LedgerResult<()> {
    println!("── concurrent ─────────────────────────────────────────────");
    let (store, secrets, appender) = make_ledger();
    let appender = Arc::new(appender);

    let handles: Vec<_> = (0..50)
        .map(|i| {
            let appender = Arc::clone(&appender);
            std::thread::spawn(move || {
                appender.append(AuditEvent::new("burst", format!("writer-{}", i), "x"))
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("writer thread panicked")?;
    }

    let verifier = ChainVerifier::new(store, secrets);
    let report = verifier.verify_all()?;
    println!("   50 concurrent appends -> {}", report.summary());
    Ok(())
}

fn rotation() -> LedgerResult<()> {
    println!("── rotation ───────────────────────────────────────────────");
    let store = Arc::new(MemoryLedgerStore::new());
    let secrets = Arc::new(RotatingSecretProvider::new(b"first-era-key".to_vec()));
    let appender = ChainAppender::new(
        ChainId::new(),
        store.clone(),
        secrets.clone(),
        LedgerConfig::default(),
    );

    appender.append(AuditEvent::new("login", "alice", "before rotation"))?;
    let epoch = secrets.rotate(b"second-era-key".to_vec())?;
    appender.append(AuditEvent::new("login", "bob", "after rotation"))?;

    let verifier = ChainVerifier::new(store, secrets);
    let report = verifier.verify_all()?;
    println!("   rotated to epoch {} -> {}", epoch, report.summary());
    Ok(())
}
