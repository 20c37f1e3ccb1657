//! Grid connectivity — neighbor lists for cluster evaluation
//!
//! Built once per machine from the grid dimensions, row mask and topology,
//! then shared read-only by every spin.
//!
//! ```text
//! Hexagonal 3|4|5|4|3          offsets (rows = 5)
//!
//!         .   .   .            reel:  0   1   2   3   4
//!       .   .   .   .
//!     .   .   .   .   .        dead cells (row >= mask) have no neighbors
//!       .   .   .   .
//!         .   .   .
//! ```

use serde::{Deserialize, Serialize};

use crate::grid::GridSpec;

/// How cells connect to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Horizontal and vertical neighbors only
    #[default]
    Rectangular,
    /// Hexagonal tiling, shaped by the row mask
    Hexagonal,
}

/// Adjacency list for every grid offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connectivity {
    reels: usize,
    rows: usize,
    mask: Vec<u8>,
    topology: Topology,
    neighbors: Vec<Vec<usize>>,
}

impl Connectivity {
    /// Build the neighbor lists.
    ///
    /// Hexagonal layouts need a row mask; without one the grid is connected
    /// rectangularly.
    pub fn build(reels: u8, rows: u8, mask: Option<&[u8]>, topology: Topology) -> Self {
        let spec = GridSpec {
            reels,
            rows,
            mask: mask.map(<[u8]>::to_vec),
        };
        Self::from_spec(&spec, topology)
    }

    pub fn from_spec(spec: &GridSpec, topology: Topology) -> Self {
        let reels = spec.reels as usize;
        let rows = spec.rows as usize;
        let mut conn = Self {
            reels,
            rows,
            mask: spec.row_mask(),
            topology,
            neighbors: vec![Vec::new(); reels * rows],
        };

        if spec.mask.is_none() || topology == Topology::Rectangular {
            conn.topology = Topology::Rectangular;
            conn.connect_rectangular();
        } else {
            conn.connect_hexagonal();
        }

        log::debug!(
            "Connectivity {:?} {}x{}: {} live cells",
            conn.topology,
            reels,
            rows,
            conn.neighbors.iter().filter(|n| !n.is_empty()).count()
        );

        conn
    }

    fn connect_rectangular(&mut self) {
        let (reels, rows) = (self.reels, self.rows);
        for reel in 0..reels {
            for row in 0..rows {
                let offset = reel * rows + row;
                let conn = &mut self.neighbors[offset];
                if row > 0 {
                    conn.push(offset - 1);
                }
                if reel > 0 {
                    conn.push(offset - rows);
                }
                if row + 1 < rows {
                    conn.push(offset + 1);
                }
                if reel + 1 < reels {
                    conn.push(offset + rows);
                }
            }
        }
    }

    /// Rows on reel `reel - 1` that `(reel, row)` links to. Expanding edges
    /// (this reel taller) reach up and level; contracting or equal edges reach
    /// level and down. Never returns dead rows.
    fn previous_reel_rows(&self, reel: usize, row: usize) -> [Option<usize>; 2] {
        let curr = self.mask[reel] as usize;
        let prev = self.mask[reel - 1] as usize;
        if curr > prev {
            [
                (row > 0 && row - 1 < prev).then(|| row - 1),
                (row < prev).then_some(row),
            ]
        } else {
            [
                (row + 1 < prev).then_some(row),
                (row + 1 < prev).then_some(row + 1),
            ]
        }
    }

    fn connect_hexagonal(&mut self) {
        let (reels, rows) = (self.reels, self.rows);
        for reel in 0..reels {
            let curr = self.mask[reel] as usize;
            for row in 0..curr {
                let offset = reel * rows + row;
                let mut conn = Vec::with_capacity(6);

                if row > 0 {
                    conn.push(offset - 1);
                }
                if row + 1 < curr {
                    conn.push(offset + 1);
                }

                if reel > 0 {
                    for prev_row in self.previous_reel_rows(reel, row).into_iter().flatten() {
                        conn.push((reel - 1) * rows + prev_row);
                    }
                }

                // The next reel mirrors its own backward rule.
                if reel + 1 < reels {
                    let next = self.mask[reel + 1] as usize;
                    let candidates = [row.checked_sub(1), Some(row), Some(row + 1)];
                    for next_row in candidates.into_iter().flatten() {
                        if next_row < next
                            && self.previous_reel_rows(reel + 1, next_row).contains(&Some(row))
                        {
                            conn.push((reel + 1) * rows + next_row);
                        }
                    }
                }

                self.neighbors[offset] = conn;
            }
        }
    }

    /// Neighbors of one offset
    #[inline]
    pub fn neighbors(&self, offset: usize) -> &[usize] {
        &self.neighbors[offset]
    }

    /// All neighbor lists, indexed by offset
    pub fn all(&self) -> &[Vec<usize>] {
        &self.neighbors
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
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

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Does every link have a matching link back?
    pub fn is_symmetric(&self) -> bool {
        self.neighbors
            .iter()
            .enumerate()
            .all(|(a, list)| list.iter().all(|&b| self.neighbors[b].contains(&a)))
    }
}
