//! Subcommand implementations.

pub mod config;
pub mod month;
pub mod upcoming;

use std::sync::Arc;

use mirrorcal_sources::{EventFetcher, HttpFetcher, ParsedBatch, RawEventAdapter, source_for};
use tracing::{info, warn};

use crate::config::MirrorConfig;
use crate::error::{CliError, CliResult};

/// Sources given on the command line win over configured ones.
pub fn effective_sources(config: &MirrorConfig, overrides: &[String]) -> Vec<String> {
    if overrides.is_empty() {
        config.calendar.sources.clone()
    } else {
        overrides.to_vec()
    }
}

/// Reads every source and parses its events.
///
/// A source that fails is logged and skipped; only when all of them fail is
/// the last error returned. Events that fail to parse end up in the batch
/// diagnostics.
pub async fn load_events(config: &MirrorConfig, sources: &[String]) -> CliResult<ParsedBatch> {
    if sources.is_empty() {
        return Err(CliError::Config(format!(
            "no calendar sources configured; add `sources` under [calendar] in {} or pass --source",
            MirrorConfig::default_path().display()
        )));
    }

    let fetch_config = config.fetch_config().map_err(CliError::Config)?;
    let fetcher: Arc<dyn EventFetcher> = Arc::new(HttpFetcher::new(fetch_config)?);

    let mut raws = Vec::new();
    let mut loaded = 0usize;
    let mut last_error = None;
    for locator in sources {
        let source = source_for(locator, fetcher.clone());
        match source.fetch_raw_events().await {
            Ok(events) => {
                loaded += 1;
                raws.extend(events);
            }
            Err(err) => {
                warn!(source = %source.name(), code = %err.code(), error = %err, "Failed to load calendar source");
                last_error = Some(err);
            }
        }
    }

    if loaded == 0
        && let Some(err) = last_error
    {
        return Err(err.into());
    }

    let batch = RawEventAdapter::new(fetcher).parse_all(&raws).await;
    info!(
        sources = loaded,
        events = batch.events.len(),
        skipped = batch.diagnostics.len(),
        "Loaded calendar events"
    );
    Ok(batch)
}
