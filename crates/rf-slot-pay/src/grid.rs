//! Spin grid — the caller-owned buffers for one spin evaluation
//!
//! A `SpinGrid` is created once per worker and refilled for every spin. The
//! evaluators read the symbols, update the claimed markers in place and use the
//! scratch buffers for flood fills, so no per-spin allocation happens on the
//! hot path.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::symbols::{SymbolSet, valid_multiplier};

/// Marker value for a cell claimed by a payout
pub const CLAIMED: u8 = 1;
/// Marker value for a wild cell claimed by a payout
pub const CLAIMED_WILD: u8 = 2;

/// Grid dimensions (reels × rows) with an optional per-reel row mask
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of reels (columns)
    pub reels: u8,
    /// Number of rows per reel
    pub rows: u8,
    /// Valid rows per reel, for non-rectangular layouts
    #[serde(default)]
    pub mask: Option<Vec<u8>>,
}

impl GridSpec {
    /// Rectangular grid
    pub fn new(reels: u8, rows: u8) -> Self {
        Self {
            reels,
            rows,
            mask: None,
        }
    }

    /// Standard 5×3
    pub fn standard_5x3() -> Self {
        Self::new(5, 3)
    }

    /// Grid shaped by a row mask; rows = tallest reel
    pub fn masked(mask: &[u8]) -> Self {
        Self {
            reels: mask.len().min(u8::MAX as usize) as u8,
            rows: mask.iter().copied().max().unwrap_or(0),
            mask: Some(mask.to_vec()),
        }
    }

    /// Total grid positions
    pub fn total_positions(&self) -> usize {
        self.reels as usize * self.rows as usize
    }

    /// Valid rows per reel with the mask clamped to the grid.
    /// Missing entries count as empty reels.
    pub fn row_mask(&self) -> Vec<u8> {
        match &self.mask {
            None => vec![self.rows; self.reels as usize],
            Some(mask) => {
                if mask.len() != self.reels as usize || mask.iter().any(|&m| m > self.rows) {
                    log::warn!(
                        "Row mask {:?} does not fit a {}x{} grid, clamping",
                        mask,
                        self.reels,
                        self.rows
                    );
                }
                (0..self.reels as usize)
                    .map(|reel| mask.get(reel).copied().unwrap_or(0).min(self.rows))
                    .collect()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reels == 0 {
            return Err(ConfigError::InvalidGrid("Reels must be > 0"));
        }
        if self.rows == 0 {
            return Err(ConfigError::InvalidGrid("Rows must be > 0"));
        }
        if self.total_positions() > u16::MAX as usize {
            return Err(ConfigError::InvalidGrid("Grid is too large"));
        }
        Ok(())
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::standard_5x3()
    }
}

/// Per-spin grid state
#[derive(Debug, Clone)]
pub struct SpinGrid {
    reels: usize,
    rows: usize,
    mask: Vec<u8>,
    symbols: Vec<u32>,
    multipliers: Vec<u16>,
    claimed: Vec<u8>,
    round_multiplier: f64,
    multiplier_needs_wild: bool,
    pub(crate) path: Vec<usize>,
    pub(crate) in_path: Vec<bool>,
    /// Flood-fill stack: (cell, next neighbor index)
    pub(crate) frames: Vec<(usize, usize)>,
    pub(crate) unwanted: Vec<u32>,
}

impl SpinGrid {
    /// Empty grid for the given spec; claimed markers are enabled.
    pub fn new(spec: &GridSpec) -> Self {
        let size = spec.total_positions();
        Self {
            reels: spec.reels as usize,
            rows: spec.rows as usize,
            mask: spec.row_mask(),
            symbols: vec![0; size],
            multipliers: Vec::new(),
            claimed: vec![0; size],
            round_multiplier: 1.0,
            multiplier_needs_wild: false,
            path: Vec::with_capacity(size),
            in_path: vec![false; size],
            frames: Vec::with_capacity(size),
            unwanted: Vec::with_capacity(8),
        }
    }

    /// Build a grid from reel-major symbol ids
    pub fn from_symbols(spec: &GridSpec, symbols: &[u32]) -> Self {
        let mut grid = Self::new(spec);
        grid.set_symbols(symbols);
        grid
    }

    /// Enable the per-cell multiplier array (all cells start at "no multiplier")
    pub fn with_multipliers(mut self) -> Self {
        self.multipliers = vec![0; self.symbols.len()];
        self
    }

    /// Disable claimed-marker tracking
    pub fn without_claims(mut self) -> Self {
        self.claimed = Vec::new();
        self
    }

    /// Set the round-level multiplier
    pub fn with_round_multiplier(mut self, multiplier: f64, needs_wild: bool) -> Self {
        self.round_multiplier = multiplier;
        self.multiplier_needs_wild = needs_wild;
        self
    }

    pub fn reels(&self) -> usize {
        self.reels
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Valid rows per reel
    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    #[inline]
    pub fn offset(&self, reel: usize, row: usize) -> usize {
        reel * self.rows + row
    }

    /// Replace all symbols (reel-major). Dead cells are forced to 0 and the
    /// claimed markers are cleared.
    pub fn set_symbols(&mut self, symbols: &[u32]) {
        let n = symbols.len().min(self.symbols.len());
        self.symbols[..n].copy_from_slice(&symbols[..n]);
        self.symbols[n..].fill(0);
        self.clear_dead_cells();
        self.reset_claims();
    }

    /// Replace all symbols from reel columns
    pub fn set_reels(&mut self, reels: &[Vec<u32>]) {
        self.symbols.fill(0);
        for (reel, column) in reels.iter().enumerate().take(self.reels) {
            for (row, &id) in column.iter().enumerate().take(self.rows) {
                let offset = self.offset(reel, row);
                self.symbols[offset] = id;
            }
        }
        self.clear_dead_cells();
        self.reset_claims();
    }

    fn clear_dead_cells(&mut self) {
        for reel in 0..self.reels {
            let start = reel * self.rows + self.mask[reel] as usize;
            let end = (reel + 1) * self.rows;
            self.symbols[start..end].fill(0);
        }
    }

    #[inline]
    pub fn symbol(&self, offset: usize) -> u32 {
        self.symbols[offset]
    }

    pub fn symbol_at(&self, reel: usize, row: usize) -> u32 {
        self.symbols[self.offset(reel, row)]
    }

    /// Overwrite one cell. Dead cells stay empty.
    pub fn set_symbol(&mut self, offset: usize, id: u32) {
        let (reel, row) = (offset / self.rows, offset % self.rows);
        if row < self.mask[reel] as usize {
            self.symbols[offset] = id;
        }
    }

    pub fn symbols(&self) -> &[u32] {
        &self.symbols
    }

    /// Symbols per reel, for display and debugging
    pub fn to_reels(&self) -> Vec<Vec<u32>> {
        self.symbols.chunks(self.rows.max(1)).map(<[u32]>::to_vec).collect()
    }

    pub fn has_multipliers(&self) -> bool {
        !self.multipliers.is_empty()
    }

    /// Per-cell multiplier, 1.0 when absent
    #[inline]
    pub fn cell_multiplier(&self, offset: usize) -> f64 {
        match self.multipliers.get(offset) {
            Some(&m) if m > 0 => m as f64,
            _ => 1.0,
        }
    }

    /// Set a per-cell multiplier; ignored unless multipliers are enabled
    pub fn set_cell_multiplier(&mut self, offset: usize, multiplier: u16) {
        if let Some(m) = self.multipliers.get_mut(offset) {
            *m = multiplier;
        }
    }

    pub fn clear_multipliers(&mut self) {
        self.multipliers.fill(0);
    }

    /// Round multiplier applicable to a win containing `wilds` wild symbols
    #[inline]
    pub fn round_multiplier(&self, wilds: u8) -> f64 {
        if self.multiplier_needs_wild && wilds == 0 {
            1.0
        } else {
            valid_multiplier(self.round_multiplier)
        }
    }

    pub fn set_round_multiplier(&mut self, multiplier: f64) {
        self.round_multiplier = multiplier;
    }

    pub fn set_multiplier_needs_wild(&mut self, needs_wild: bool) {
        self.multiplier_needs_wild = needs_wild;
    }

    pub fn claimed(&self) -> &[u8] {
        &self.claimed
    }

    pub fn claims_enabled(&self) -> bool {
        !self.claimed.is_empty()
    }

    #[inline]
    pub fn is_claimed(&self, offset: usize) -> bool {
        self.claimed.get(offset).is_some_and(|&c| c > 0)
    }

    pub fn reset_claims(&mut self) {
        self.claimed.fill(0);
    }

    /// Cluster fills need markers even when the caller disabled them; the
    /// buffer keeps its capacity once created. Returns true if tracking was
    /// switched on temporarily.
    pub(crate) fn ensure_claims(&mut self) -> bool {
        if self.claimed.len() == self.symbols.len() {
            return false;
        }
        self.claimed.clear();
        self.claimed.resize(self.symbols.len(), 0);
        true
    }

    pub(crate) fn disable_claims(&mut self) {
        self.claimed.clear();
    }

    /// Mark a cell as part of a payout; wild cells get the higher marker.
    #[inline]
    pub(crate) fn claim(&mut self, offset: usize, wild: bool) {
        if let Some(c) = self.claimed.get_mut(offset) {
            let value = if wild { CLAIMED_WILD } else { CLAIMED };
            *c = (*c).max(value);
        }
    }

    /// Cluster fills count overlapping claims on shared wilds.
    #[inline]
    pub(crate) fn claim_increment(&mut self, offset: usize) {
        if let Some(c) = self.claimed.get_mut(offset) {
            *c = c.saturating_add(1);
        }
    }

    #[inline]
    pub(crate) fn claim_decrement(&mut self, offset: usize) {
        if let Some(c) = self.claimed.get_mut(offset) {
            *c = c.saturating_sub(1);
        }
    }

    /// Number of wild cells in the set of offsets
    pub(crate) fn count_wilds(&self, offsets: &[usize], symbols: &SymbolSet) -> u8 {
        offsets
            .iter()
            .filter(|&&o| symbols.is_wild(self.symbols[o]))
            .count()
            .min(u8::MAX as usize) as u8
    }
}
