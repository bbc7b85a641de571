//! Diagnostics sinks for matching runs
//!
//! The engine hands every committed `MatchingRunRecord` to a sink and never
//! reads it back. A failing sink must not fail the run, so `record` has no
//! error path; sinks log their own failures.

use parking_lot::Mutex;
use std::io::Write;
use tracing::{info, warn};
use types::diagnostics::MatchingRunRecord;

pub trait DiagnosticsSink: Send + Sync {
    fn record(&self, record: &MatchingRunRecord);
}

/// Emits each record as a structured `info!` event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, record: &MatchingRunRecord) {
        info!(
            market_id = %record.market_id,
            red_stakes = record.red_stakes,
            green_stakes = record.green_stakes,
            fills = record.fills,
            matched_stakes = record.matched_stakes,
            fully_refunded = record.fully_refunded,
            partially_refunded = record.partially_refunded,
            dropped_stakes = record.dropped_stakes,
            total_matched = record.total_matched_red.as_u64(),
            total_refunded = record.total_refunded.as_u64(),
            attempts = record.attempts,
            duration_ms = record.duration_ms,
            "Matching run recorded"
        );
    }
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<MatchingRunRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<MatchingRunRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&self, record: &MatchingRunRecord) {
        self.records.lock().push(record.clone());
    }
}

/// Writes one JSON object per line
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_line(&self, record: &MatchingRunRecord) -> std::io::Result<()> {
        let line = serde_json::to_string(record)?;
        let mut writer = self.writer.lock();
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

impl<W: Write + Send> DiagnosticsSink for JsonLinesSink<W> {
    fn record(&self, record: &MatchingRunRecord) {
        if let Err(e) = self.write_line(record) {
            warn!(market_id = %record.market_id, error = %e, "Failed to write diagnostics record");
        }
    }
}

impl<T: DiagnosticsSink + ?Sized> DiagnosticsSink for std::sync::Arc<T> {
    fn record(&self, record: &MatchingRunRecord) {
        (**self).record(record)
    }
}
