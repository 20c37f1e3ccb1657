//! Cluster pays — flood-fill detection and cluster removal
//!
//! `find` seeds a depth-first fill from every unclaimed, non-wild cell in
//! ascending offset order. Wilds join any cluster they touch, so one wild can
//! be shared by several clusters; its claimed marker counts how many.
//!
//! `remove_payouts` rewrites the grid so that no connected cell holds a wild
//! and no two connected cells hold the same symbol, which leaves nothing for
//! `find` to report.

use crate::connectivity::{Connectivity, Topology};
use crate::error::{ConfigError, RemovalError};
use crate::grid::{GridSpec, SpinGrid};
use crate::payout::Payout;
use crate::symbols::SymbolSet;

/// Source of uniform random indexes for cluster removal
pub trait Prng {
    /// Uniform value in `[0, n)`; `n` is never 0
    fn int_n(&mut self, n: usize) -> usize;
}

impl<R: rand::Rng + ?Sized> Prng for R {
    #[inline]
    fn int_n(&mut self, n: usize) -> usize {
        self.random_range(0..n)
    }
}

/// Cluster evaluator for one grid layout
#[derive(Debug, Clone)]
pub struct ClusterPayouts {
    connectivity: Connectivity,
    min_cluster: u8,
}

impl ClusterPayouts {
    pub fn new(connectivity: Connectivity, min_cluster: u8) -> Result<Self, ConfigError> {
        if min_cluster == 0 {
            return Err(ConfigError::InvalidClusterSize(min_cluster));
        }
        Ok(Self {
            connectivity,
            min_cluster,
        })
    }

    /// Build the connectivity graph for `spec` and wrap it
    pub fn from_spec(spec: &GridSpec, topology: Topology, min_cluster: u8) -> Result<Self, ConfigError> {
        Self::new(Connectivity::from_spec(spec, topology), min_cluster)
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    pub fn min_cluster(&self) -> u8 {
        self.min_cluster
    }

    /// Smallest cluster that can pay with this symbol set
    fn minimum(&self, symbols: &SymbolSet) -> usize {
        self.min_cluster.max(symbols.min_payout()) as usize
    }

    /// Last offset that can still seed a cluster of `minimum` cells
    fn cutoff(&self, minimum: usize) -> Option<usize> {
        let rows = self.connectivity.rows();
        let last = *self.connectivity.mask().last()? as usize;
        self.connectivity
            .len()
            .checked_sub(minimum + rows.saturating_sub(last))
    }

    /// Find all paying clusters, appending them to `out`. The claimed markers
    /// are reset first and hold the final claims afterwards.
    pub fn find(&self, spin: &mut SpinGrid, symbols: &SymbolSet, out: &mut Vec<Payout>) -> usize {
        self.find_into(spin, symbols, Some(out))
    }

    /// Count the paying clusters without recording them
    pub fn count(&self, spin: &mut SpinGrid, symbols: &SymbolSet) -> usize {
        self.find_into(spin, symbols, None)
    }

    fn find_into(&self, spin: &mut SpinGrid, symbols: &SymbolSet, mut out: Option<&mut Vec<Payout>>) -> usize {
        debug_assert_eq!(spin.len(), self.connectivity.len());

        let temporary = spin.ensure_claims();
        spin.reset_claims();

        let minimum = self.minimum(symbols);
        let Some(cutoff) = self.cutoff(minimum) else {
            if temporary {
                spin.disable_claims();
            }
            return 0;
        };

        let mut found = 0;
        for seed in 0..=cutoff.min(spin.len().saturating_sub(1)) {
            if spin.is_claimed(seed) || self.connectivity.neighbors(seed).is_empty() {
                continue;
            }
            let id = spin.symbol(seed);
            let Some(symbol) = symbols.get(id) else {
                continue;
            };
            if symbol.is_wild() {
                continue;
            }

            spin.path.clear();
            spin.path.push(seed);
            spin.in_path[seed] = true;
            spin.claim_increment(seed);

            let multiplier = spin.cell_multiplier(seed) * self.fill(spin, symbols, seed, id);

            let size = spin.path.len();
            let pays = size >= minimum && symbol.is_payable(size);

            if pays {
                found += 1;
                if let Some(out) = out.as_deref_mut() {
                    let wilds = spin.count_wilds(&spin.path, symbols);
                    let multiplier = multiplier * spin.round_multiplier(wilds);
                    out.push(Payout::cluster(id, symbol.get_pay(size), multiplier, &spin.path));
                }
            }

            for ix in 0..size {
                let offset = spin.path[ix];
                spin.in_path[offset] = false;
                if !pays {
                    spin.claim_decrement(offset);
                }
            }
        }

        if temporary {
            spin.disable_claims();
        }
        found
    }

    /// Depth-first fill from `seed`, admitting unclaimed cells holding `id`
    /// and any wild. Admitted cells are appended to `spin.path`; returns the
    /// product of their per-cell multipliers.
    ///
    /// Each stack frame keeps its own neighbor cursor, so cells are
    /// discovered in the same order as a recursive walk.
    fn fill(&self, spin: &mut SpinGrid, symbols: &SymbolSet, seed: usize, id: u32) -> f64 {
        let mut multiplier = 1.0;
        spin.frames.clear();
        spin.frames.push((seed, 0));

        while let Some(frame) = spin.frames.last_mut() {
            let (current, cursor) = *frame;
            let Some(&next) = self.connectivity.neighbors(current).get(cursor) else {
                spin.frames.pop();
                continue;
            };
            frame.1 += 1;

            if spin.in_path[next] {
                continue;
            }
            let symbol = spin.symbol(next);
            if !symbols.is_wild(symbol) && (spin.is_claimed(next) || symbol != id) {
                continue;
            }

            spin.path.push(next);
            spin.in_path[next] = true;
            spin.claim_increment(next);
            multiplier *= spin.cell_multiplier(next);
            spin.frames.push((next, 0));
        }
        multiplier
    }

    /// Redraw cells until no connected cell is wild and no two connected cells
    /// share a symbol. Returns the number of clusters that were present; the
    /// claimed markers are cleared.
    ///
    /// Replacements are drawn from `1..=max` where `max` is the highest
    /// paying non-scatter id, skipping wilds and the symbols already placed
    /// on lower connected offsets. Fails with `ClustersRemain` if the
    /// rewritten grid still pays, which only happens when a symbol pays for a
    /// single cell.
    pub fn remove_payouts<R: Prng + ?Sized>(
        &self,
        spin: &mut SpinGrid,
        symbols: &SymbolSet,
        prng: &mut R,
    ) -> Result<usize, RemovalError> {
        let found = self.count(spin, symbols);
        if found == 0 {
            return Ok(0);
        }

        let max_id = symbols.highest_paying_id().ok_or(RemovalError::NoPayingSymbol)?;

        // A wild matches every neighbor
        for offset in 0..self.connectivity.len() {
            if symbols.is_wild(spin.symbol(offset)) && !self.connectivity.neighbors(offset).is_empty() {
                self.redraw(spin, symbols, prng, max_id, offset)?;
            }
        }

        for offset in 0..self.connectivity.len() {
            for &conn in self.connectivity.neighbors(offset) {
                let id = spin.symbol(offset);
                if conn <= offset || id == 0 || spin.symbol(conn) != id {
                    continue;
                }
                self.redraw(spin, symbols, prng, max_id, conn)?;
            }
        }
        spin.unwanted.clear();

        let remaining = self.count(spin, symbols);
        spin.reset_claims();
        if remaining > 0 {
            return Err(RemovalError::ClustersRemain { remaining });
        }

        log::debug!("Removed {} clusters", found);
        Ok(found)
    }

    /// Replace the symbol at `offset` with a random non-wild id that differs
    /// from every lower connected cell.
    fn redraw<R: Prng + ?Sized>(
        &self,
        spin: &mut SpinGrid,
        symbols: &SymbolSet,
        prng: &mut R,
        max_id: u32,
        offset: usize,
    ) -> Result<(), RemovalError> {
        spin.unwanted.clear();
        for &other in self.connectivity.neighbors(offset) {
            if other < offset {
                let s = spin.symbol(other);
                spin.unwanted.push(s);
            }
        }

        if !(1..=max_id).any(|id| replacement_ok(symbols, &spin.unwanted, id)) {
            return Err(RemovalError::NoReplacement { offset });
        }

        loop {
            let id = 1 + prng.int_n(max_id as usize) as u32;
            if replacement_ok(symbols, &spin.unwanted, id) {
                spin.set_symbol(offset, id);
                return Ok(());
            }
        }
    }
}

#[inline]
fn replacement_ok(symbols: &SymbolSet, unwanted: &[u32], id: u32) -> bool {
    symbols.get(id).is_some_and(|s| !s.is_wild()) && !unwanted.contains(&id)
}
