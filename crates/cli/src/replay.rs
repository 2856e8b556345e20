//! Query log replay.
//!
//! Each non-blank line of a log is one JSON query. Every query is recorded as
//! used and then evaluated, the order a caching searcher follows, and one
//! record per query is written out.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use qgate_core::{
    Decision, Error, FrequencyThreshold, Query, QueryCachingPolicy, UsageTrackingPolicy, leaf_count_with_limit,
};
use serde::Serialize;

/// Output format for replay records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

/// Admission outcome for one log line.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    pub line: usize,
    /// First 16 hex characters of the query fingerprint.
    pub fingerprint: String,
    pub leaves: u32,
    #[serde(flatten)]
    pub decision: Decision,
    pub query: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub queries: usize,
    pub admitted: usize,
    pub never_cacheable: usize,
}

/// Feeds queries through a usage-tracking policy.
pub struct Replayer<'a, T> {
    policy: &'a UsageTrackingPolicy<T>,
    max_depth: u32,
}

impl<'a, T: FrequencyThreshold> Replayer<'a, T> {
    pub fn new(policy: &'a UsageTrackingPolicy<T>, max_depth: u32) -> Self {
        Self { policy, max_depth }
    }

    /// Record one use of `query` and evaluate it.
    pub fn record(&self, line: usize, query: &Query) -> Result<Record, Error> {
        self.policy.on_use(query);
        let decision = self.policy.evaluate(query)?;

        let mut fingerprint = self.policy.fingerprint(query).to_hex();
        fingerprint.truncate(16);

        Ok(Record {
            line,
            fingerprint,
            leaves: leaf_count_with_limit(query, self.max_depth),
            decision,
            query: query.to_string(),
        })
    }

    /// Replay every query in `reader`, writing one record per query to `out`.
    ///
    /// # Errors
    ///
    /// Fails on unreadable input, a line that is not a JSON query, or a threshold failure.
    pub fn run<R: BufRead, W: Write>(&self, reader: R, out: &mut W, format: Format) -> Result<Summary> {
        let mut summary = Summary::default();

        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let line = line.with_context(|| format!("failed to read line {line_no}"))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let query: Query =
                serde_json::from_str(line).map_err(|e| Error::InvalidInput(format!("line {line_no}: {e}")))?;
            let record = self.record(line_no, &query)?;

            summary.queries += 1;
            if record.decision.admitted {
                summary.admitted += 1;
            }
            if record.decision.min_frequency.is_none() {
                summary.never_cacheable += 1;
            }

            write_record(out, &record, format)?;
        }

        tracing::info!(
            queries = summary.queries,
            admitted = summary.admitted,
            never_cacheable = summary.never_cacheable,
            "replay finished"
        );
        Ok(summary)
    }
}

pub fn write_record<W: Write>(out: &mut W, record: &Record, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer(&mut *out, record)?;
            writeln!(out)?;
        }
        Format::Text => {
            let verdict = match record.decision.min_frequency {
                None => "never",
                Some(_) if record.decision.admitted => "cache",
                Some(_) => "skip",
            };
            let min = record.decision.min_frequency.map_or_else(|| "-".to_string(), |m| m.to_string());
            writeln!(
                out,
                "{:>5}  {}  leaves={:<4} freq={:<4} min={:<4} {:<5}  {}",
                record.line, record.fingerprint, record.leaves, record.decision.frequency, min, verdict, record.query
            )?;
        }
    }
    Ok(())
}

pub fn write_summary<W: Write>(out: &mut W, summary: &Summary, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer(&mut *out, &serde_json::json!({ "summary": summary }))?;
            writeln!(out)?;
        }
        Format::Text => writeln!(
            out,
            "replayed {} queries: {} admitted, {} never cacheable",
            summary.queries, summary.admitted, summary.never_cacheable
        )?,
    }
    Ok(())
}
