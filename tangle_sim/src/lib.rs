//! Tangle Deterministic Simulation Harness
//!
//! This crate drives the DAG ledger from `tangle_core` through simulated
//! time. Every run is a pure function of its configuration and seed.
//!
//! # Core Principle: Explicit Context
//!
//! All sources of non-determinism are owned by the run:
//! - **Time**: a virtual clock advancing in fixed ticks
//! - **Network**: a delivery queue with uniformly drawn gossip delays
//! - **Randomness**: every draw comes from a single seeded ChaCha8 stream
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        TangleRunner                         │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │ SimContext (clock, RNG, DAG, views, delivery queue)  │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │       │                        │                            │
//! │  ┌────▼────┐              ┌────▼────┐                       │
//! │  │ Process │◄────────────►│ Process │     ...               │
//! │  │   p0    │   Delivery   │   p1    │                       │
//! │  └─────────┘    Queue     └─────────┘                       │
//! │       │                        │                            │
//! │  ┌────▼────────────────────────▼────┐                       │
//! │  │          MetricsSink             │                       │
//! │  │   (CSV exporter / recorder)      │                       │
//! │  └──────────────────────────────────┘                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use tangle_sim::{MetricsRecorder, TangleConfig, TangleRunner};
//!
//! let config = TangleConfig {
//!     seed: 42,
//!     num_processes: 6,
//!     ..Default::default()
//! };
//!
//! let mut runner = TangleRunner::new(config)?;
//! let mut recorder = MetricsRecorder::new();
//! let summary = runner.run(&mut recorder)?;
//! println!("{} transactions", summary.total_nodes);
//! # Ok::<(), tangle_sim::SimError>(())
//! ```

pub mod config;
mod context;
pub mod error;
pub mod exporter;
pub mod network;
mod runner;
mod witness;

pub use config::{SimulationFile, TangleConfig, WitnessConfig};
pub use context::SimContext;
pub use error::{ConfigError, SimError};
pub use exporter::{seeded_path, write_json, CsvExporter, CsvRecord, MetricsRecorder, MetricsSink, RunSummary};
pub use network::{DeliveryEvent, DeliveryQueue};
pub use runner::{TangleRunner, PARENTS_PER_TRANSACTION};
pub use witness::{WitnessRunner, WitnessTickMetrics};
