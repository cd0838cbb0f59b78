//! Swap matcher binary
//!
//! Loads a JSON snapshot of request documents and prints one employee's
//! direct matches and swap chains.
//!
//! Usage: `swap-matcher <snapshot.json> <owner-id> [config.toml]`

use anyhow::{bail, Context};
use matching_core::{SwapChain, TransferRequest, UserId};
use request_store::{Config, RequestDocument, RequestFilter, RequestStore, SwapDesk};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MatchReport {
    request: TransferRequest,
    direct_matches: Vec<TransferRequest>,
    cycles: Vec<SwapChain>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        let program = args.first().map_or("swap-matcher", String::as_str);
        bail!("usage: {} <snapshot.json> <owner-id> [config.toml]", program);
    }

    let mut config = match args.get(3) {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path))?,
        None => Config::default(),
    };
    config.apply_env().context("applying environment overrides")?;

    init_tracing(config.logging.json);
    tracing::info!("Starting {} {}", config.service_name, config.service_version);

    let snapshot = tokio::fs::read_to_string(&args[1])
        .await
        .with_context(|| format!("reading snapshot {}", args[1]))?;
    let documents: Vec<RequestDocument> =
        serde_json::from_str(&snapshot).context("parsing snapshot")?;

    let store = Arc::new(RequestStore::new());
    let desk = SwapDesk::new(store.clone(), config)?;

    let mut skipped = 0usize;
    for (index, document) in documents.into_iter().enumerate() {
        if let Err(e) = desk.submit_request(document) {
            tracing::warn!("Skipping snapshot record {}: {}", index, e);
            skipped += 1;
        }
    }
    tracing::info!(
        "Loaded {} requests ({} skipped)",
        store.request_count(),
        skipped
    );

    let owner = UserId::new(args[2].as_str());
    let Some(request) = store
        .query_requests(&[RequestFilter::Owner(owner.clone())])
        .into_iter()
        .next()
    else {
        bail!("no request found for {}", owner);
    };

    let report = MatchReport {
        direct_matches: desk.direct_matches(&request.id)?,
        cycles: desk.cycles(&request.id)?,
        request,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    tracing::debug!("Metrics:\n{}", desk.metrics().encode()?);

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
