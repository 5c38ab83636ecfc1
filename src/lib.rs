//! Torus Life - Conway's Game of Life on a toroidal grid.
//!
//! This crate provides a parallel Game of Life engine for fixed-size
//! toroidal grids, plus a single-shot remote evolution protocol that
//! offloads a whole run to a server process.
//!
//! # Architecture
//!
//! The crate is split into three main modules:
//!
//! - `schema`: Run configuration and initial-grid seeding
//! - `engine`: Grid primitives, the row-band worker pool, and the turn engine
//! - `remote`: Wire protocol, client, and server for remote evolution
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::{Arc, mpsc};
//!
//! use torus_life::{
//!     engine::{FileExporter, run_local},
//!     schema::{Pattern, RunConfig, Seed},
//! };
//!
//! let config = RunConfig::default();
//! let seed = Seed {
//!     pattern: Pattern::Glider { origin: (1, 1) },
//! };
//!
//! let (events_tx, events_rx) = mpsc::channel();
//! let (_commands_tx, commands_rx) = mpsc::channel();
//! let exporter = Arc::new(FileExporter::new("out"));
//!
//! let reporter = std::thread::spawn(move || {
//!     for event in events_rx {
//!         println!("{event:?}");
//!     }
//! });
//!
//! let summary = run_local(&config, &seed, events_tx, commands_rx, exporter).unwrap();
//! reporter.join().unwrap();
//!
//! println!("{} cells alive after {} turns", summary.alive.len(), summary.turns);
//! ```

pub mod engine;
pub mod remote;
pub mod schema;

// Re-export commonly used types
pub use engine::{Cell, Command, Event, Grid, Phase, RunSummary, WorkerPool, run_local};
pub use remote::{EvolveRequest, EvolveResponse, RemoteClient, RemoteError};
pub use schema::{Pattern, RunConfig, Seed};
