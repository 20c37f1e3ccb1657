//! Payout records produced by the evaluators

use serde::{Deserialize, Serialize};

use crate::paylines::PayDirection;

/// Where a payout came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayoutSource {
    /// A winning payline
    Payline {
        payline_id: u8,
        direction: PayDirection,
        /// Row per reel of the payline shape
        rows: Vec<u8>,
    },
    /// A winning cluster
    Cluster {
        /// Member offsets in discovery order
        offsets: Vec<usize>,
    },
}

/// A single win
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    /// Paying symbol ID
    pub symbol_id: u32,
    /// Number of matching cells
    pub count: u16,
    /// Payout factor (bet multiple before multipliers)
    pub factor: f64,
    /// Combined multiplier (chain × round)
    pub multiplier: f64,
    pub source: PayoutSource,
}

impl Payout {
    pub fn payline(
        symbol_id: u32,
        count: u8,
        factor: f64,
        multiplier: f64,
        direction: PayDirection,
        payline_id: u8,
        rows: &[u8],
    ) -> Self {
        Self {
            symbol_id,
            count: count.into(),
            factor,
            multiplier,
            source: PayoutSource::Payline {
                payline_id,
                direction,
                rows: rows.to_vec(),
            },
        }
    }

    pub fn cluster(symbol_id: u32, factor: f64, multiplier: f64, offsets: &[usize]) -> Self {
        Self {
            symbol_id,
            count: u16::try_from(offsets.len()).unwrap_or(u16::MAX),
            factor,
            multiplier,
            source: PayoutSource::Cluster {
                offsets: offsets.to_vec(),
            },
        }
    }

    /// Total bet multiple: factor × multiplier
    pub fn total(&self) -> f64 {
        self.factor * self.multiplier
    }

    /// Payline id, for payline wins
    pub fn payline_id(&self) -> Option<u8> {
        match self.source {
            PayoutSource::Payline { payline_id, .. } => Some(payline_id),
            PayoutSource::Cluster { .. } => None,
        }
    }

    /// Direction the win was read in
    pub fn direction(&self) -> PayDirection {
        match self.source {
            PayoutSource::Payline { direction, .. } => direction,
            PayoutSource::Cluster { .. } => PayDirection::Cluster,
        }
    }

    /// Cluster member offsets, for cluster wins
    pub fn cluster_offsets(&self) -> Option<&[usize]> {
        match &self.source {
            PayoutSource::Cluster { offsets } => Some(offsets),
            PayoutSource::Payline { .. } => None,
        }
    }
}

/// Sum of all payout totals
pub fn total_factor(payouts: &[Payout]) -> f64 {
    payouts.iter().map(Payout::total).sum()
}
