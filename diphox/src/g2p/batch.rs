use std::path::Path;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::corpus::TokenRecord;
use crate::error::Result;
use crate::g2p::backend::G2pBackend;
use crate::utils::progress::progress_bar;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Tokens phonemized concurrently
    pub jobs: usize,
    pub show_progress: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            jobs: 4,
            show_progress: false,
        }
    }
}

/// Outcome of a batch run. Records keep input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<TokenRecord>,
    /// Tokens the backend had no pronunciation for
    pub missed: usize,
    /// Tokens whose lookup returned an error, or that could not be decoded
    pub failed: usize,
}

/// Runs the backend over every token with at most `options.jobs` lookups in
/// flight. Misses and failures are counted and skipped.
pub async fn phonemize_batch(
    backend: Arc<dyn G2pBackend>,
    tokens: Vec<String>,
    options: &BatchOptions,
) -> BatchReport {
    let pb = progress_bar(tokens.len() as u64, "Phonemizing", options.show_progress);

    let mut lookups = stream::iter(tokens.into_iter().map(|token| {
        let backend = Arc::clone(&backend);
        tokio::spawn(async move {
            let outcome = backend.phonemize(token.clone()).await;
            (token, outcome)
        })
    }))
    .buffered(options.jobs.max(1));

    let mut report = BatchReport::default();
    while let Some(joined) = lookups.next().await {
        pb.inc(1);
        match joined {
            Ok((_, Ok(Some(phonemized)))) => report.records.push(phonemized.into_record()),
            Ok((token, Ok(None))) => {
                debug!(%token, "no pronunciation");
                report.missed += 1;
            }
            Ok((token, Err(e))) => {
                warn!(%token, error = %e, "g2p lookup failed");
                report.failed += 1;
            }
            Err(e) => {
                warn!(error = %e, "g2p task did not complete");
                report.failed += 1;
            }
        }
    }
    pb.finish_and_clear();

    info!(
        source = backend.source(),
        phonemized = report.records.len(),
        missed = report.missed,
        failed = report.failed,
        "g2p batch finished"
    );
    report
}

/// Phonemizes a token list (one token per line) into a corpus file.
pub async fn phonemize_file(
    backend: Arc<dyn G2pBackend>,
    src_path: impl AsRef<Path>,
    out_path: impl AsRef<Path>,
    options: &BatchOptions,
) -> Result<BatchReport> {
    let content = async_fs::read(src_path.as_ref()).await?;
    let mut tokens = Vec::new();
    let mut undecodable = 0usize;
    for (idx, line) in content.split(|&b| b == b'\n').enumerate() {
        match std::str::from_utf8(line) {
            Ok(line) if line.trim().is_empty() => {}
            Ok(line) => tokens.push(line.trim().to_string()),
            Err(_) => {
                warn!(line = idx + 1, "token is not valid UTF-8, skipping");
                undecodable += 1;
            }
        }
    }
    debug!(tokens = tokens.len(), undecodable, "token list loaded");

    let mut report = phonemize_batch(backend, tokens, options).await;
    report.failed += undecodable;

    if let Some(parent) = out_path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            async_fs::create_dir_all(parent).await?;
        }
    }
    let mut file = async_fs::File::create(out_path.as_ref()).await?;
    for record in &report.records {
        file.write_all(record.to_line().as_bytes()).await?;
        file.write_all(b"\n").await?;
    }
    file.flush().await?;

    Ok(report)
}
