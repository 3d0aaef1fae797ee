//! JSON-lines enrichment: one record in, at most one record out, in input
//! order.

use crate::{key_values_from_record, row_to_json};
use anyhow::{Context, Result};
use dimjoin_lookup::OpenLookup;
use futures::StreamExt;
use serde_json::Value;
use std::pin::pin;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichOptions {
    /// Lookups in flight at once.
    pub parallelism: usize,
    /// Drop records without a match instead of emitting them with nulls.
    pub inner: bool,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            parallelism: 16,
            inner: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    pub records: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub skipped: usize,
}

/// Enriches one record with its dimension row.
///
/// Dimension fields overwrite record fields of the same name, except the key
/// fields, which already agree. Without a match the dimension fields are
/// added as nulls where the record lacks them. Returns whether a row matched.
pub async fn enrich_record(
    lookup: &OpenLookup,
    record: &mut serde_json::Map<String, Value>,
) -> bool {
    let schema = lookup.schema();
    let key = key_values_from_record(schema, record);

    match lookup.lookup(&key).await {
        Some(row) => {
            for (name, value) in row_to_json(schema, &row) {
                if !schema.key_names().contains(&name) {
                    record.insert(name, value);
                }
            }
            true
        }
        None => {
            for name in schema.field_names() {
                record.entry(name).or_insert(Value::Null);
            }
            false
        }
    }
}

enum Outcome {
    Matched(String),
    Unmatched(Option<String>),
    Skipped,
}

/// Reads JSON-lines records from `reader`, enriches them, and writes the
/// results to `writer` in input order. Lines that are blank, not JSON, or
/// not objects are skipped.
pub async fn enrich_stream<R, W>(
    lookup: &OpenLookup,
    reader: R,
    mut writer: W,
    options: EnrichOptions,
) -> Result<EnrichSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let lines = futures::stream::unfold(reader.lines(), |mut lines| async move {
        match lines.next_line().await {
            Ok(Some(line)) => Some((Ok(line), lines)),
            Ok(None) => None,
            Err(e) => Some((Err(e), lines)),
        }
    });

    let mut outcomes = pin!(
        lines
            .enumerate()
            .map(|(index, line)| async move {
                let line = line.context("failed to read input")?;
                enrich_line(lookup, index, &line, options.inner).await
            })
            .buffered(options.parallelism.max(1))
    );

    let mut summary = EnrichSummary::default();
    while let Some(outcome) = outcomes.next().await {
        summary.records += 1;
        let output = match outcome? {
            Outcome::Matched(line) => {
                summary.matched += 1;
                Some(line)
            }
            Outcome::Unmatched(line) => {
                summary.unmatched += 1;
                line
            }
            Outcome::Skipped => {
                summary.skipped += 1;
                None
            }
        };

        if let Some(line) = output {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
        }
    }
    writer.flush().await?;

    info!(
        "Enriched {} record(s): {} matched, {} unmatched, {} skipped",
        summary.records, summary.matched, summary.unmatched, summary.skipped
    );
    Ok(summary)
}

async fn enrich_line(lookup: &OpenLookup, index: usize, line: &str, inner: bool) -> Result<Outcome> {
    if line.trim().is_empty() {
        return Ok(Outcome::Skipped);
    }

    let mut record = match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(record)) => record,
        Ok(other) => {
            warn!("Skipping line {}: expected a JSON object, got {}", index + 1, other);
            return Ok(Outcome::Skipped);
        }
        Err(e) => {
            warn!("Skipping line {}: {}", index + 1, e);
            return Ok(Outcome::Skipped);
        }
    };

    let matched = enrich_record(lookup, &mut record).await;
    if !matched && inner {
        debug!("Dropping unmatched line {}", index + 1);
        return Ok(Outcome::Unmatched(None));
    }

    let text = serde_json::to_string(&Value::Object(record))?;
    Ok(if matched {
        Outcome::Matched(text)
    } else {
        Outcome::Unmatched(Some(text))
    })
}
