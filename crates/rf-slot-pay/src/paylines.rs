//! Payline shapes and pay directions

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Direction(s) in which a win is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayDirection {
    /// Left to right (the default)
    #[default]
    Ltr,
    /// Right to left
    Rtl,
    /// Both ways; each payline pays its better direction
    Both,
    /// Cluster pays
    Cluster,
}

impl fmt::Display for PayDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
            Self::Both => "both",
            Self::Cluster => "cluster",
        };
        f.write_str(s)
    }
}

/// A payline definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payline {
    /// Payline id (> 0)
    pub id: u8,
    /// Row positions for each reel (e.g., [1, 0, 0, 0, 1] for a "V" shape)
    pub rows: Vec<u8>,
}

impl Payline {
    pub fn new(id: u8, rows: &[u8]) -> Self {
        Self {
            id,
            rows: rows.to_vec(),
        }
    }

    /// Create a straight line (same row across all reels)
    pub fn straight(id: u8, row: u8, reel_count: u8) -> Self {
        Self {
            id,
            rows: vec![row; reel_count as usize],
        }
    }

    /// Create a V-shaped line
    pub fn v_shape(id: u8, reel_count: u8, row_count: u8) -> Self {
        let mid = reel_count / 2;
        let rows = (0..reel_count)
            .map(|i| {
                let v = if i <= mid { i } else { reel_count - 1 - i };
                v.min(row_count.saturating_sub(1))
            })
            .collect();
        Self { id, rows }
    }

    /// Create an inverted V
    pub fn inverted_v(id: u8, reel_count: u8, row_count: u8) -> Self {
        let mid = reel_count / 2;
        let rows = (0..reel_count)
            .map(|i| {
                let v = if i <= mid { i } else { reel_count - 1 - i };
                row_count.saturating_sub(1).saturating_sub(v)
            })
            .collect();
        Self { id, rows }
    }

    pub fn reel_count(&self) -> usize {
        self.rows.len()
    }

    /// Grid offset of the payline cell on `reel`
    #[inline]
    pub fn offset(&self, reel: usize, row_count: usize) -> usize {
        reel * row_count + self.rows[reel] as usize
    }

    /// Grid offsets per reel
    pub fn offsets(&self, row_count: usize) -> Vec<usize> {
        (0..self.rows.len()).map(|reel| self.offset(reel, row_count)).collect()
    }

    /// Check the shape against the grid
    pub fn validate(&self, reels: u8, rows: u8) -> Result<(), ConfigError> {
        if self.id == 0 {
            return Err(ConfigError::ReservedPaylineId);
        }
        if self.rows.len() != reels as usize {
            return Err(ConfigError::PaylineLength {
                id: self.id,
                expected: reels as usize,
                actual: self.rows.len(),
            });
        }
        if let Some((reel, &row)) = self.rows.iter().enumerate().find(|&(_, &row)| row >= rows) {
            return Err(ConfigError::PaylineRow {
                id: self.id,
                reel,
                row,
                rows,
            });
        }
        Ok(())
    }
}

/// Validate a whole payline table: shapes and unique ids
pub fn validate_paylines(paylines: &[Payline], reels: u8, rows: u8) -> Result<(), ConfigError> {
    if paylines.is_empty() {
        return Err(ConfigError::NoPaylines);
    }
    let mut seen = HashSet::with_capacity(paylines.len());
    for payline in paylines {
        payline.validate(reels, rows)?;
        if !seen.insert(payline.id) {
            return Err(ConfigError::DuplicatePayline(payline.id));
        }
    }
    Ok(())
}

/// Standard payline patterns for a 5×3 grid
pub fn standard_20_paylines() -> Vec<Payline> {
    vec![
        // Straight lines
        Payline::straight(1, 1, 5), // Middle
        Payline::straight(2, 0, 5), // Top
        Payline::straight(3, 2, 5), // Bottom
        // V shapes
        Payline::new(4, &[0, 1, 2, 1, 0]),
        Payline::new(5, &[2, 1, 0, 1, 2]),
        // Zigzag
        Payline::new(6, &[0, 0, 1, 2, 2]),
        Payline::new(7, &[2, 2, 1, 0, 0]),
        Payline::new(8, &[1, 0, 0, 0, 1]),
        Payline::new(9, &[1, 2, 2, 2, 1]),
        // W shapes
        Payline::new(10, &[0, 1, 0, 1, 0]),
        Payline::new(11, &[2, 1, 2, 1, 2]),
        // Diagonal
        Payline::new(12, &[0, 1, 1, 1, 0]),
        Payline::new(13, &[2, 1, 1, 1, 2]),
        // Steps
        Payline::new(14, &[1, 1, 0, 1, 1]),
        Payline::new(15, &[1, 1, 2, 1, 1]),
        // Complex
        Payline::new(16, &[0, 2, 0, 2, 0]),
        Payline::new(17, &[2, 0, 2, 0, 2]),
        Payline::new(18, &[1, 0, 1, 0, 1]),
        Payline::new(19, &[1, 2, 1, 2, 1]),
        Payline::new(20, &[0, 0, 2, 0, 0]),
    ]
}
