//! Metrics output: CSV streams, in-memory recording and run summaries.

use crate::error::SimError;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tangle_core::{SelectionStats, TickMetrics, METRICS_HEADER};

/// A per-tick row that can be written as CSV.
pub trait CsvRecord {
    /// Column names, comma separated
    const HEADER: &'static str;

    fn to_csv_row(&self) -> String;
}

impl CsvRecord for TickMetrics {
    const HEADER: &'static str = METRICS_HEADER;

    fn to_csv_row(&self) -> String {
        TickMetrics::to_csv_row(self)
    }
}

/// Destination for per-tick metrics.
pub trait MetricsSink<M> {
    fn record(&mut self, row: &M) -> Result<(), SimError>;

    /// Called once after the last tick.
    fn finish(&mut self) -> Result<(), SimError> {
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// CSV
// ------------------------------------------------------------------------------------------------

/// Writes a header line, then one line per recorded row.
pub struct CsvExporter<W: Write> {
    writer: W,
    rows: u64,
}

impl<W: Write> CsvExporter<W> {
    /// Wraps `writer` and writes `header` immediately.
    pub fn new(mut writer: W, header: &str) -> Result<Self, SimError> {
        writeln!(writer, "{}", header)?;
        Ok(Self { writer, rows: 0 })
    }

    /// Rows written so far, header excluded.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl CsvExporter<BufWriter<File>> {
    /// Opens `path` for writing, creating missing parent directories.
    pub fn create(path: impl AsRef<Path>, header: &str) -> Result<Self, SimError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SimError::output(path, e))?;
        }
        let file = File::create(path).map_err(|e| SimError::output(path, e))?;
        Self::new(BufWriter::new(file), header)
    }
}

impl<W: Write, M: CsvRecord> MetricsSink<M> for CsvExporter<W> {
    fn record(&mut self, row: &M) -> Result<(), SimError> {
        writeln!(self.writer, "{}", row.to_csv_row())?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SimError> {
        self.writer.flush()?;
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// In-memory
// ------------------------------------------------------------------------------------------------

/// Keeps every row in memory.
#[derive(Debug, Clone)]
pub struct MetricsRecorder<M> {
    rows: Vec<M>,
}

impl<M> MetricsRecorder<M> {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn rows(&self) -> &[M] {
        &self.rows
    }

    pub fn last(&self) -> Option<&M> {
        self.rows.last()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<M> Default for MetricsRecorder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Clone> MetricsSink<M> for MetricsRecorder<M> {
    fn record(&mut self, row: &M) -> Result<(), SimError> {
        self.rows.push(row.clone());
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// Summaries
// ------------------------------------------------------------------------------------------------

/// Outcome of one run, printed with `--json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// `tangle` or `witness`
    pub simulation: String,

    pub seed: u64,

    /// Ticks executed
    pub ticks: u64,

    /// Time of the last executed tick
    pub final_time: f64,

    /// Nodes in the DAG, genesis included
    pub total_nodes: usize,

    /// Global tips (tangle) or leaves (witness) after the last tick
    pub final_tips: usize,

    pub messages_sent: u64,

    /// Tip-selection mode name (tangle only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// How tips were chosen (tangle only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionStats>,

    /// Where the CSV went, if anywhere
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl RunSummary {
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }
}

/// Writes summaries as a pretty-printed JSON document.
pub fn write_json<W: Write>(writer: W, summaries: &[RunSummary]) -> Result<(), SimError> {
    #[derive(Serialize)]
    struct Report<'a> {
        total: usize,
        runs: &'a [RunSummary],
    }

    serde_json::to_writer_pretty(
        writer,
        &Report {
            total: summaries.len(),
            runs: summaries,
        },
    )?;
    Ok(())
}

/// Inserts `_seed{seed}` before the extension: `out/run.csv` becomes `out/run_seed7.csv`.
pub fn seeded_path(path: &Path, seed: u64) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_seed{}.{}", stem, seed, ext.to_string_lossy()),
        None => format!("{}_seed{}", stem, seed),
    };
    path.with_file_name(name)
}
