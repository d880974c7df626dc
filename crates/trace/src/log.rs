// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Trace log implementation.

use crate::event::{TraceEvent, TraceRecord};
use parking_lot::Mutex;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

/// Ordered log of boot events.
pub struct TraceLog {
    start: Instant,
    records: Arc<Mutex<Vec<TraceRecord>>>,
    file_writer: Option<Arc<Mutex<BufWriter<File>>>>,
}

impl TraceLog {
    /// Create a new in-memory trace log.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            records: Arc::new(Mutex::new(Vec::new())),
            file_writer: None,
        }
    }

    /// Create a trace log that also writes to a file (JSONL format).
    pub fn with_file(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            start: Instant::now(),
            records: Arc::new(Mutex::new(Vec::new())),
            file_writer: Some(Arc::new(Mutex::new(BufWriter::new(file)))),
        })
    }

    /// Record an event.
    pub fn record(&self, event: TraceEvent) {
        let mut records = self.records.lock();
        let seq = records.len() as u64;
        let record = TraceRecord {
            seq,
            timestamp: SystemTime::now(),
            elapsed: self.start.elapsed(),
            event,
        };

        records.push(record.clone());

        // Write to file if configured
        if let Some(ref writer) = self.file_writer {
            use std::io::Write;
            let mut w = writer.lock();
            if let Ok(json) = serde_json::to_string(&record) {
                let _ = writeln!(w, "{}", json);
                let _ = w.flush();
            }
        }
    }

    /// Get all recorded events.
    pub fn records(&self) -> Vec<TraceRecord> {
        self.records.lock().clone()
    }

    /// Get the last N records.
    pub fn last(&self, n: usize) -> Vec<TraceRecord> {
        let all = self.records.lock();
        all.iter().rev().take(n).rev().cloned().collect()
    }

    /// Count records matching a predicate.
    pub fn count<F: Fn(&TraceRecord) -> bool>(&self, pred: F) -> usize {
        self.records.lock().iter().filter(|r| pred(r)).count()
    }

    /// Find calls buffered during the interception window.
    pub fn find_buffered(&self) -> Vec<TraceRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| matches!(r.event, TraceEvent::CallBuffered { .. }))
            .cloned()
            .collect()
    }

    /// Find buffered calls dropped at replay time.
    pub fn find_dropped(&self) -> Vec<TraceRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| matches!(r.event, TraceEvent::CallDropped { .. }))
            .cloned()
            .collect()
    }

    /// Find recorded failures (entry task or drain).
    pub fn find_failures(&self) -> Vec<TraceRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.event.is_failure())
            .cloned()
            .collect()
    }

    /// Get the total number of records.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Clear all recorded events.
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl Default for TraceLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for TraceLog {
    fn clone(&self) -> Self {
        Self {
            start: self.start,
            records: Arc::clone(&self.records),
            file_writer: self.file_writer.as_ref().map(Arc::clone),
        }
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
