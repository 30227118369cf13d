//! Tangle Metrics Module
//! =====================
//!
//! Per-tick health metrics of the growing DAG:
//! - **Global tips**: true DAG width
//! - **Local tips**: width as seen by each process (avg / min / max)
//! - **Tip ratio**: fraction of all transactions that are still tips
//! - **Messages sent**: cumulative gossip overhead

use crate::dag::DagStore;
use crate::view::ProcessView;
use serde::Serialize;

/// Column names of the metrics stream, in row order.
pub const METRICS_HEADER: &str =
    "time,global_tips,avg_local_tips,min_local_tips,max_local_tips,total_nodes,tip_ratio,messages_sent";

/// One row of the metrics stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickMetrics {
    /// Simulated time of the tick
    pub time: f64,
    /// Transactions without children in the global DAG
    pub global_tips: usize,
    /// Mean local tip-set size across processes
    pub avg_local_tips: f64,
    /// Smallest local tip set
    pub min_local_tips: usize,
    /// Largest local tip set
    pub max_local_tips: usize,
    /// Transactions created so far, genesis included
    pub total_nodes: usize,
    /// `global_tips / total_nodes`
    pub tip_ratio: f64,
    /// Delivery events scheduled so far
    pub messages_sent: u64,
}

impl TickMetrics {
    /// Computes the metrics for the current state of a run.
    pub fn collect(time: f64, dag: &DagStore, views: &[ProcessView], messages_sent: u64) -> Self {
        let mut total_local = 0usize;
        let mut min_local = usize::MAX;
        let mut max_local = 0usize;

        for view in views {
            let count = view.tip_count();
            total_local += count;
            min_local = min_local.min(count);
            max_local = max_local.max(count);
        }

        let avg_local_tips = if views.is_empty() {
            0.0
        } else {
            total_local as f64 / views.len() as f64
        };
        if views.is_empty() {
            min_local = 0;
        }

        let total_nodes = dag.len();
        let global_tips = dag.global_tip_count();

        Self {
            time,
            global_tips,
            avg_local_tips,
            min_local_tips: min_local,
            max_local_tips: max_local,
            total_nodes,
            tip_ratio: global_tips as f64 / total_nodes as f64,
            messages_sent,
        }
    }

    /// Formats the row as comma-separated decimal text (no newline).
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{}",
            self.time,
            self.global_tips,
            self.avg_local_tips,
            self.min_local_tips,
            self.max_local_tips,
            self.total_nodes,
            self.tip_ratio,
            self.messages_sent,
        )
    }
}
