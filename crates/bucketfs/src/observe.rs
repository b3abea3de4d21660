// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Per-operation observability records
//!
//! Every public file and filesystem call produces exactly one
//! [`OperationLog`]: it is written to the structured log and its duration
//! is fed to a [`Metrics`] histogram.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Histogram receiving operation durations, in milliseconds
pub const FILE_STATS_HISTOGRAM: &str = "app_file_stats";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    ReadAt,
    Write,
    WriteAt,
    Seek,
    Close,
    ReadAll,
    GetName,
    Size,
    LastModified,
    IsDir,
    FileMode,
    Create,
    Open,
    Remove,
    RemoveAll,
    Rename,
    Stat,
    Mkdir,
    MkdirAll,
    ReadDir,
    Chdir,
    Getwd,
}

impl Operation {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Read => "READ",
            Operation::ReadAt => "READAT",
            Operation::Write => "WRITE",
            Operation::WriteAt => "WRITEAT",
            Operation::Seek => "SEEK",
            Operation::Close => "CLOSE",
            Operation::ReadAll => "READALL",
            Operation::GetName => "GET NAME",
            Operation::Size => "FILE/DIR SIZE",
            Operation::LastModified => "LAST MODIFIED",
            Operation::IsDir => "IS DIR",
            Operation::FileMode => "FILE MODE",
            Operation::Create => "CREATE",
            Operation::Open => "OPEN",
            Operation::Remove => "REMOVE",
            Operation::RemoveAll => "REMOVEALL",
            Operation::Rename => "RENAME",
            Operation::Stat => "STAT",
            Operation::Mkdir => "MKDIR",
            Operation::MkdirAll => "MKDIRALL",
            Operation::ReadDir => "READDIR",
            Operation::Chdir => "CHDIR",
            Operation::Getwd => "GETWD",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
}

impl Status {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "SUCCESS",
            Status::Error => "ERROR",
        }
    }
}

/// One record per public call
#[derive(Debug, Clone, PartialEq)]
pub struct OperationLog {
    pub operation: Operation,
    pub location: String,
    pub duration: Duration,
    pub status: Status,
    pub message: Option<String>,
}

/// Histogram sink for operation durations
pub trait Metrics: Send + Sync {
    fn record_histogram(&self, name: &str, value: f64, labels: &[(&str, &str)]);
}

/// Discards every sample
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl Metrics for NoopMetrics {
    fn record_histogram(&self, _name: &str, _value: f64, _labels: &[(&str, &str)]) {}
}

/// A histogram sample captured by [`RecordingMetrics`]
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub value: f64,
    pub labels: Vec<(String, String)>,
}

impl Sample {
    #[must_use]
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Keeps every sample in memory, for tests and ad-hoc inspection
#[derive(Debug, Default, Clone)]
pub struct RecordingMetrics {
    samples: Arc<Mutex<Vec<Sample>>>,
}

impl RecordingMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn samples(&self) -> Vec<Sample> {
        self.samples
            .lock()
            .map(|samples| samples.clone())
            .unwrap_or_default()
    }

    /// Operation names of all samples, in recording order
    #[must_use]
    pub fn operations(&self) -> Vec<String> {
        self.samples()
            .iter()
            .filter_map(|s| s.label("type").map(str::to_string))
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut samples) = self.samples.lock() {
            samples.clear();
        }
    }
}

impl Metrics for RecordingMetrics {
    fn record_histogram(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        if let Ok(mut samples) = self.samples.lock() {
            samples.push(Sample {
                name: name.to_string(),
                value,
                labels: labels
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            });
        }
    }
}

/// Emits [`OperationLog`] records to the log and the metrics sink
#[derive(Clone)]
pub struct Observer {
    metrics: Arc<dyn Metrics>,
}

impl Default for Observer {
    fn default() -> Self {
        Self::new(Arc::new(NoopMetrics))
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer").finish_non_exhaustive()
    }
}

impl Observer {
    #[must_use]
    pub fn new(metrics: Arc<dyn Metrics>) -> Self {
        Self { metrics }
    }

    /// Start timing one call against `location`
    #[must_use]
    pub fn start(&self, operation: Operation, location: impl Into<String>) -> Span {
        Span {
            observer: self.clone(),
            operation,
            location: location.into(),
            started: Instant::now(),
        }
    }

    pub fn emit(&self, record: &OperationLog) {
        let operation = record.operation.as_str();
        let location = record.location.as_str();
        let status = record.status.as_str();
        let duration_us = record.duration.as_micros() as u64;
        let message = record.message.as_deref().unwrap_or("");

        match record.status {
            Status::Success => diagnostics::debug!(
                "{operation} {location} {status} in {duration_us}us {message}",
                operation: operation,
                location: location,
                status: status,
                duration_us: duration_us,
                message: message
            ),
            Status::Error => diagnostics::warn!(
                "{operation} {location} {status} in {duration_us}us {message}",
                operation: operation,
                location: location,
                status: status,
                duration_us: duration_us,
                message: message
            ),
        }

        let container = container_label(location);
        self.metrics.record_histogram(
            FILE_STATS_HISTOGRAM,
            record.duration.as_secs_f64() * 1000.0,
            &[("type", operation), ("container", container), ("status", status)],
        );
    }
}

/// First path segment, ignoring a leading separator
fn container_label(location: &str) -> &str {
    location
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default()
}

/// An in-flight call; finishing it emits the record exactly once
pub struct Span {
    observer: Observer,
    operation: Operation,
    location: String,
    started: Instant,
}

impl Span {
    /// Emit the record for `result` and hand the result back
    pub fn finish<T, E: fmt::Display>(
        self,
        result: std::result::Result<T, E>,
    ) -> std::result::Result<T, E> {
        let (status, message) = match &result {
            Ok(_) => (Status::Success, None),
            Err(err) => (Status::Error, Some(err.to_string())),
        };
        self.observer.emit(&OperationLog {
            operation: self.operation,
            location: self.location,
            duration: self.started.elapsed(),
            status,
            message,
        });
        result
    }

    /// Emit a successful record and return `value`
    pub fn success<T>(self, value: T) -> T {
        self.observer.emit(&OperationLog {
            operation: self.operation,
            location: self.location,
            duration: self.started.elapsed(),
            status: Status::Success,
            message: None,
        });
        value
    }
}
