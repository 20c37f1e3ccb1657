//! Payline matching — prefix tree over payline shapes
//!
//! Paylines that start on the same cells share tree nodes, so a common prefix
//! is tested once per spin no matter how many paylines run through it.
//!
//! ```text
//! reel 0      reel 1      reel 2
//!  (0) ─┬──── (3) ─┬──── (6)   lines 1, 2
//!       │          └──── (7)   line 3
//!       └──── (4) ────── (6)   line 4
//! ```
//!
//! Each node knows its level (cells matched to reach it) and every payline
//! passing through it. When a chain breaks entering a child, the paylines of
//! that child pay at the parent's level.

use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::grid::SpinGrid;
use crate::paylines::{PayDirection, Payline, validate_paylines};
use crate::payout::Payout;
use crate::symbols::{Symbol, SymbolSet};

/// Running state of one match chain during tree descent
#[derive(Debug, Clone, Copy)]
struct Chain<'s> {
    /// Symbol the chain currently pays for
    active: &'s Symbol,
    /// Cells matched so far
    count: u8,
    /// Wilds in the leading wild run
    wilds: u8,
    /// Wilds anywhere in the chain
    all_wilds: u8,
    multiplier: f64,
    /// Multiplier measured through the leading wild run only
    wild_multiplier: f64,
}

impl<'s> Chain<'s> {
    fn start(symbol: &'s Symbol, cell_multiplier: f64) -> Self {
        if symbol.is_wild() {
            let m = cell_multiplier * symbol.effective_multiplier();
            Self {
                active: symbol,
                count: 1,
                wilds: 1,
                all_wilds: 1,
                multiplier: m,
                wild_multiplier: m,
            }
        } else {
            Self {
                active: symbol,
                count: 1,
                wilds: 0,
                all_wilds: 0,
                multiplier: cell_multiplier,
                wild_multiplier: cell_multiplier,
            }
        }
    }

    /// Extend the chain with the next cell's symbol, or `None` if it breaks.
    #[inline]
    fn extend(self, next: &'s Symbol, cell_multiplier: f64) -> Option<Self> {
        let active = self.active;
        let mut chain = self;
        chain.count = chain.count.saturating_add(1);

        if next.id == active.id {
            chain.multiplier *= cell_multiplier;
            if active.is_wild() {
                chain.multiplier *= next.effective_multiplier();
                chain.wilds += 1;
                chain.all_wilds += 1;
                chain.wild_multiplier = chain.multiplier;
            }
        } else if next.is_wild() {
            chain.multiplier *= cell_multiplier * next.effective_multiplier();
            chain.all_wilds += 1;
            if active.is_wild() {
                chain.wilds += 1;
                chain.wild_multiplier = chain.multiplier;
            }
        } else if next.is_wild_for(active.id) {
            chain.multiplier *= cell_multiplier * next.effective_multiplier();
        } else if active.is_wild() || active.is_wild_for(next.id) {
            // The real paying symbol takes over.
            chain.active = next;
            chain.multiplier *= cell_multiplier * next.effective_multiplier();
        } else {
            return None;
        }

        Some(chain)
    }

    /// Resolve the chain into a win, switching to the best wild payout when
    /// the highest-payout feature is on and it pays more.
    fn settle(&self, count: u8, symbols: &SymbolSet, highest: bool) -> LineWin {
        let mut win = LineWin {
            symbol_id: self.active.id,
            count,
            factor: self.active.get_pay(count.into()),
            multiplier: self.multiplier,
            all_wilds: self.all_wilds,
        };

        if highest && self.wilds > 1 {
            if let Some((id, pay)) = symbols.best_wild_payout(self.wilds) {
                if pay > win.factor {
                    win.symbol_id = id;
                    win.count = self.wilds;
                    win.factor = pay;
                    win.multiplier = self.wild_multiplier;
                }
            }
        }

        win
    }
}

/// A settled chain, before the round multiplier
#[derive(Debug, Clone, Copy, PartialEq)]
struct LineWin {
    symbol_id: u32,
    count: u8,
    factor: f64,
    multiplier: f64,
    all_wilds: u8,
}

impl LineWin {
    fn value(&self) -> f64 {
        self.factor * self.multiplier
    }
}

#[derive(Debug, Clone)]
struct Node {
    offset: usize,
    level: u8,
    /// Indexes of the paylines passing through this node
    paylines: Vec<usize>,
    children: BTreeMap<usize, usize>,
}

/// Immutable payline set with its prefix tree
#[derive(Debug, Clone)]
pub struct PaylineSet {
    direction: PayDirection,
    highest: bool,
    reels: usize,
    rows: usize,
    paylines: Vec<Payline>,
    offsets: Vec<Vec<usize>>,
    nodes: Vec<Node>,
    roots: BTreeMap<usize, usize>,
}

impl PaylineSet {
    /// Validate the paylines and build the tree.
    ///
    /// `Ltr` and `Both` branch from reel 0 rightwards; `Rtl` branches from the
    /// last reel leftwards.
    pub fn new(
        paylines: Vec<Payline>,
        direction: PayDirection,
        highest_payout: bool,
        reels: u8,
        rows: u8,
    ) -> Result<Self, ConfigError> {
        if direction == PayDirection::Cluster {
            return Err(ConfigError::InvalidDirection(direction));
        }
        if reels == 0 || rows == 0 {
            return Err(ConfigError::InvalidGrid("Paylines need a non-empty grid"));
        }
        validate_paylines(&paylines, reels, rows)?;

        let rows_usize = rows as usize;
        let offsets: Vec<Vec<usize>> = paylines.iter().map(|p| p.offsets(rows_usize)).collect();

        let mut set = Self {
            direction,
            highest: highest_payout,
            reels: reels as usize,
            rows: rows_usize,
            paylines,
            offsets,
            nodes: Vec::new(),
            roots: BTreeMap::new(),
        };

        for ix in 0..set.paylines.len() {
            set.insert(ix);
        }

        log::debug!(
            "Payline tree ({}): {} paylines, {} roots, {} nodes",
            set.direction,
            set.paylines.len(),
            set.roots.len(),
            set.nodes.len()
        );

        Ok(set)
    }

    fn insert(&mut self, ix: usize) {
        let path: Vec<usize> = if self.direction == PayDirection::Rtl {
            self.offsets[ix].iter().rev().copied().collect()
        } else {
            self.offsets[ix].clone()
        };

        let mut node = match self.roots.get(&path[0]) {
            Some(&id) => id,
            None => {
                let id = self.push_node(path[0], 1);
                self.roots.insert(path[0], id);
                id
            }
        };
        self.nodes[node].paylines.push(ix);

        for (depth, &offset) in path.iter().enumerate().skip(1) {
            node = match self.nodes[node].children.get(&offset) {
                Some(&id) => id,
                None => {
                    let id = self.push_node(offset, depth as u8 + 1);
                    self.nodes[node].children.insert(offset, id);
                    id
                }
            };
            self.nodes[node].paylines.push(ix);
        }
    }

    fn push_node(&mut self, offset: usize, level: u8) -> usize {
        self.nodes.push(Node {
            offset,
            level,
            paylines: Vec::new(),
            children: BTreeMap::new(),
        });
        self.nodes.len() - 1
    }

    pub fn direction(&self) -> PayDirection {
        self.direction
    }

    /// Is the highest-payout feature active?
    pub fn highest_payout(&self) -> bool {
        self.highest
    }

    pub fn paylines(&self) -> &[Payline] {
        &self.paylines
    }

    pub fn reels(&self) -> usize {
        self.reels
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Evaluate every payline against the grid, appending wins to `out`.
    /// Returns true if anything paid.
    pub fn evaluate(&self, spin: &mut SpinGrid, symbols: &SymbolSet, out: &mut Vec<Payout>) -> bool {
        let start = out.len();
        let mut found = false;

        for &root in self.roots.values() {
            let offset = self.nodes[root].offset;
            let Some(symbol) = symbols.get(spin.symbol(offset)) else {
                continue;
            };
            let chain = Chain::start(symbol, spin.cell_multiplier(offset));
            if self.descend(root, chain, spin, symbols, out, start) {
                found = true;
            }
        }

        found
    }

    /// Convenience wrapper returning the wins
    pub fn payouts(&self, spin: &mut SpinGrid, symbols: &SymbolSet) -> Vec<Payout> {
        let mut out = Vec::new();
        self.evaluate(spin, symbols, &mut out);
        out
    }

    fn descend<'s>(
        &self,
        id: usize,
        chain: Chain<'s>,
        spin: &mut SpinGrid,
        symbols: &'s SymbolSet,
        out: &mut Vec<Payout>,
        start: usize,
    ) -> bool {
        let node = &self.nodes[id];
        if node.children.is_empty() {
            return self.finalize(node.level, &node.paylines, &chain, spin, symbols, out, start);
        }

        let mut found = false;
        for &child_id in node.children.values() {
            let child = &self.nodes[child_id];
            let next = symbols
                .get(spin.symbol(child.offset))
                .and_then(|s| chain.extend(s, spin.cell_multiplier(child.offset)));

            let got = match next {
                Some(extended) => self.descend(child_id, extended, spin, symbols, out, start),
                None => self.finalize(node.level, &child.paylines, &chain, spin, symbols, out, start),
            };
            found |= got;
        }
        found
    }

    #[allow(clippy::too_many_arguments)]
    fn finalize(
        &self,
        level: u8,
        paylines: &[usize],
        chain: &Chain<'_>,
        spin: &mut SpinGrid,
        symbols: &SymbolSet,
        out: &mut Vec<Payout>,
        start: usize,
    ) -> bool {
        debug_assert_eq!(level, chain.count);
        let win = chain.settle(level, symbols, self.highest);

        if win.factor <= 0.0 && self.direction != PayDirection::Both {
            return false;
        }

        let mut found = false;
        for &ix in paylines {
            if self.direction == PayDirection::Both {
                let id = self.paylines[ix].id;
                if out[start..].iter().any(|p| p.payline_id() == Some(id)) {
                    continue;
                }
                match self.reverse(ix, spin, symbols) {
                    Some(rev) if rev.value() > win.value() => {
                        self.award(ix, &rev, PayDirection::Rtl, spin, symbols, out);
                        found = true;
                    }
                    _ if win.factor > 0.0 => {
                        self.award(ix, &win, PayDirection::Ltr, spin, symbols, out);
                        found = true;
                    }
                    _ => {}
                }
            } else {
                self.award(ix, &win, self.direction, spin, symbols, out);
                found = true;
            }
        }
        found
    }

    /// Read one payline from the last reel backwards.
    fn reverse(&self, ix: usize, spin: &SpinGrid, symbols: &SymbolSet) -> Option<LineWin> {
        let (&last, rest) = self.offsets[ix].split_last()?;
        let first = symbols.get(spin.symbol(last))?;

        let mut chain = Chain::start(first, spin.cell_multiplier(last));
        for &offset in rest.iter().rev() {
            match symbols
                .get(spin.symbol(offset))
                .and_then(|s| chain.extend(s, spin.cell_multiplier(offset)))
            {
                Some(extended) => chain = extended,
                None => break,
            }
        }

        Some(chain.settle(chain.count, symbols, self.highest))
    }

    fn award(
        &self,
        ix: usize,
        win: &LineWin,
        direction: PayDirection,
        spin: &mut SpinGrid,
        symbols: &SymbolSet,
        out: &mut Vec<Payout>,
    ) {
        let payline = &self.paylines[ix];
        let multiplier = win.multiplier * spin.round_multiplier(win.all_wilds);
        out.push(Payout::payline(
            win.symbol_id,
            win.count,
            win.factor,
            multiplier,
            direction,
            payline.id,
            &payline.rows,
        ));

        if spin.claims_enabled() {
            let offsets = &self.offsets[ix];
            let count = (win.count as usize).min(offsets.len());
            let matched = if direction == PayDirection::Rtl {
                &offsets[offsets.len() - count..]
            } else {
                &offsets[..count]
            };
            for &offset in matched {
                let wild = symbols.is_wild(spin.symbol(offset));
                spin.claim(offset, wild);
            }
        }
    }
}
