//! Batch simulation — evaluate many grids in parallel
//!
//! The machine is shared read-only; every rayon worker owns one `SpinGrid`
//! and one payout buffer, reused for all grids it processes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::Machine;
use crate::grid::SpinGrid;
use crate::payout::{Payout, total_factor};

/// Aggregated results of a simulation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub spins: u64,
    pub winning_spins: u64,
    /// Sum of all payout totals (bet multiples)
    pub total_factor: f64,
    /// Best single spin
    pub max_factor: f64,
}

impl SimulationStats {
    /// Add one spin's total
    pub fn record(mut self, factor: f64) -> Self {
        self.spins += 1;
        if factor > 0.0 {
            self.winning_spins += 1;
        }
        self.total_factor += factor;
        self.max_factor = self.max_factor.max(factor);
        self
    }

    /// Combine two partial results
    pub fn merge(self, other: Self) -> Self {
        Self {
            spins: self.spins + other.spins,
            winning_spins: self.winning_spins + other.winning_spins,
            total_factor: self.total_factor + other.total_factor,
            max_factor: self.max_factor.max(other.max_factor),
        }
    }

    /// Calculate RTP (% of a unit bet returned)
    pub fn rtp(&self) -> f64 {
        if self.spins > 0 {
            (self.total_factor / self.spins as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Calculate hit rate (% of spins with a win)
    pub fn hit_rate(&self) -> f64 {
        if self.spins > 0 {
            (self.winning_spins as f64 / self.spins as f64) * 100.0
        } else {
            0.0
        }
    }
}

fn evaluate_one(machine: &Machine, spin: &mut SpinGrid, out: &mut Vec<Payout>, grid: &[u32]) -> f64 {
    spin.set_symbols(grid);
    out.clear();
    machine.evaluate(spin, out);
    total_factor(out)
}

/// Evaluate every grid (reel-major symbol ids) and aggregate the totals
pub fn simulate<G>(machine: &Machine, grids: &[G]) -> SimulationStats
where
    G: AsRef<[u32]> + Sync,
{
    let stats = grids
        .par_iter()
        .map_init(
            || (machine.new_spin(), Vec::new()),
            |(spin, out), grid| evaluate_one(machine, spin, out, grid.as_ref()),
        )
        .fold(SimulationStats::default, SimulationStats::record)
        .reduce(SimulationStats::default, SimulationStats::merge);

    log::debug!(
        "Simulated {} grids: RTP {:.2}%, hit rate {:.2}%",
        stats.spins,
        stats.rtp(),
        stats.hit_rate()
    );
    stats
}

/// Evaluate `spins` uniformly random grids. Spin `i` is drawn from a generator
/// seeded with `seed + i`, so results do not depend on thread scheduling.
pub fn simulate_random(machine: &Machine, spins: u64, seed: u64) -> SimulationStats {
    let ids: Vec<u32> = machine.symbols().iter().map(|s| s.id).collect();
    if ids.is_empty() {
        return SimulationStats::default();
    }
    let size = machine.grid().total_positions();

    let stats = (0..spins)
        .into_par_iter()
        .map_init(
            || (machine.new_spin(), Vec::new(), vec![0u32; size]),
            |(spin, out, cells), i| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i));
                for cell in cells.iter_mut() {
                    *cell = ids[rng.random_range(0..ids.len())];
                }
                evaluate_one(machine, spin, out, cells)
            },
        )
        .fold(SimulationStats::default, SimulationStats::record)
        .reduce(SimulationStats::default, SimulationStats::merge);

    log::debug!(
        "Simulated {} random spins (seed {}): RTP {:.2}%, hit rate {:.2}%, max {:.1}x",
        stats.spins,
        seed,
        stats.rtp(),
        stats.hit_rate(),
        stats.max_factor
    );
    stats
}
