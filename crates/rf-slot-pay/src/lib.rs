//! # rf-slot-pay — Payline and Cluster Payout Evaluation
//!
//! Decides whether, and how much, a symbol grid pays for one slot round.
//! Built for the simulation hot path: every structure that can be computed
//! ahead of time is built once per machine, and all per-spin state lives in a
//! caller-owned [`SpinGrid`] that is reused between spins.
//!
//! ## Features
//!
//! - **Paylines**: LTR, RTL or both-ways lines matched through a shared prefix tree
//! - **Wild Handling**: universal wilds, split symbols, highest-payout wild runs
//! - **Cluster Pays**: flood-fill clusters on rectangular or hexagonal grids
//! - **Cluster Removal**: PRNG-driven rewrite that leaves no paying cluster
//! - **Multipliers**: per-cell, per-symbol and round multipliers
//! - **Batch Simulation**: parallel evaluation with RTP and hit-rate stats
//!
//! ## Architecture
//!
//! ```text
//! MachineConfig (JSON / YAML)
//!     │
//!     v
//! Machine
//!     ├── SymbolSet (pay tables, best wild payouts)
//!     ├── PaylineSet (prefix tree)         ─┐
//!     └── ClusterPayouts (Connectivity)    ─┤
//!                                           v
//!                 SpinGrid ──evaluate──> Vec<Payout> + claimed markers
//! ```

pub mod batch;
pub mod cluster;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod grid;
pub mod payline_tree;
pub mod paylines;
pub mod payout;
pub mod symbols;

pub use batch::*;
pub use cluster::*;
pub use config::*;
pub use connectivity::*;
pub use error::*;
pub use grid::*;
pub use payline_tree::*;
pub use paylines::*;
pub use payout::*;
pub use symbols::*;
