//! Symbol definitions and the immutable symbol set shared by all evaluators

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Highest symbol id a symbol set accepts
pub const MAX_SYMBOL_ID: u32 = 255;

/// Symbol type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SymbolType {
    /// Regular paying symbol
    #[default]
    Standard = 0,
    /// Split symbol - substitutes only for the symbols it lists
    Split = 1,
    /// Wild - substitutes for any other symbol
    Wild = 2,
    /// Hero symbol
    Hero = 3,
    /// Scatter - pays regardless of position
    Scatter = 4,
    /// Wild that also counts as a scatter
    WildScatter = 5,
    /// Hero that also counts as a scatter
    HeroScatter = 6,
}

impl SymbolType {
    pub fn is_wild(self) -> bool {
        matches!(self, Self::Wild | Self::WildScatter)
    }

    pub fn is_split(self) -> bool {
        self == Self::Split
    }

    pub fn is_hero(self) -> bool {
        matches!(self, Self::Hero | Self::HeroScatter)
    }

    pub fn is_scatter(self) -> bool {
        matches!(self, Self::Scatter | Self::WildScatter | Self::HeroScatter)
    }
}

fn default_multiplier() -> f64 {
    1.0
}

/// A symbol definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    /// Unique symbol ID (0 is reserved for empty cells)
    pub id: u32,
    /// Symbol name (e.g., "HP1", "LP3", "WILD", "SCATTER")
    #[serde(default)]
    pub name: String,
    /// Symbol type
    #[serde(default)]
    pub symbol_type: SymbolType,
    /// Pay values by match count (index 0 = 1 of a kind, index 4 = 5 of a kind)
    #[serde(default)]
    pub pay_values: Vec<f64>,
    /// Multiplier applied when the symbol substitutes in a win
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Symbols this (split) symbol can substitute for
    #[serde(default)]
    pub substitutes_for: Vec<u32>,
    #[serde(skip)]
    min_payable: usize,
}

impl Symbol {
    fn build(
        id: u32,
        name: impl Into<String>,
        symbol_type: SymbolType,
        pays: &[f64],
        substitutes_for: Vec<u32>,
    ) -> Self {
        let mut symbol = Self {
            id,
            name: name.into(),
            symbol_type,
            pay_values: pays.to_vec(),
            multiplier: 1.0,
            substitutes_for,
            min_payable: usize::MAX,
        };
        symbol.refresh();
        symbol
    }

    /// Create a regular symbol
    pub fn regular(id: u32, name: impl Into<String>, pays: &[f64]) -> Self {
        Self::build(id, name, SymbolType::Standard, pays, Vec::new())
    }

    /// Create a wild symbol
    pub fn wild(id: u32, name: impl Into<String>) -> Self {
        Self::build(id, name, SymbolType::Wild, &[], Vec::new())
    }

    /// Create a split symbol that substitutes for the given ids only
    pub fn split(id: u32, name: impl Into<String>, substitutes_for: &[u32], pays: &[f64]) -> Self {
        Self::build(id, name, SymbolType::Split, pays, substitutes_for.to_vec())
    }

    /// Create a scatter symbol
    pub fn scatter(id: u32, name: impl Into<String>, pays: &[f64]) -> Self {
        Self::build(id, name, SymbolType::Scatter, pays, Vec::new())
    }

    /// Create a hero symbol
    pub fn hero(id: u32, name: impl Into<String>, pays: &[f64]) -> Self {
        Self::build(id, name, SymbolType::Hero, pays, Vec::new())
    }

    /// Set the pay table
    pub fn with_pays(mut self, pays: &[f64]) -> Self {
        self.pay_values = pays.to_vec();
        self.refresh();
        self
    }

    /// Set the symbol multiplier
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Change the symbol type
    pub fn with_type(mut self, symbol_type: SymbolType) -> Self {
        self.symbol_type = symbol_type;
        self
    }

    /// Recompute derived fields after the pay table changed
    fn refresh(&mut self) {
        self.min_payable = self
            .pay_values
            .iter()
            .position(|&p| p > 0.0)
            .map_or(usize::MAX, |ix| ix + 1);
    }

    /// Get pay value for a match count. Counts beyond the table pay the last entry.
    pub fn get_pay(&self, match_count: usize) -> f64 {
        if match_count == 0 || self.pay_values.is_empty() {
            return 0.0;
        }
        let idx = match_count.min(self.pay_values.len()) - 1;
        self.pay_values[idx]
    }

    /// Lowest match count with a positive payout (`u8::MAX` if the symbol never pays)
    pub fn min_payable(&self) -> u8 {
        self.min_payable.min(u8::MAX as usize) as u8
    }

    /// Does `count` matches warrant a payout?
    pub fn is_payable(&self, count: usize) -> bool {
        count >= self.min_payable
    }

    pub fn is_wild(&self) -> bool {
        self.symbol_type.is_wild()
    }

    pub fn is_scatter(&self) -> bool {
        self.symbol_type.is_scatter()
    }

    /// Can this symbol stand in for `id`? Only split symbols declare substitutes.
    #[inline]
    pub fn is_wild_for(&self, id: u32) -> bool {
        self.substitutes_for.contains(&id)
    }

    /// Symbol multiplier, with non-positive values meaning "none"
    #[inline]
    pub fn effective_multiplier(&self) -> f64 {
        valid_multiplier(self.multiplier)
    }
}

/// Maps "no multiplier" markers (zero, negative, NaN) to the identity
#[inline]
pub fn valid_multiplier(m: f64) -> f64 {
    if m > 0.0 { m } else { 1.0 }
}

/// Immutable set of symbols for one machine
///
/// Lookups by id are O(1). The set precomputes the data the evaluators need on
/// the hot path: the paying count range and the best payout a run of wilds can
/// claim under the highest-payout feature.
#[derive(Debug, Clone)]
pub struct SymbolSet {
    symbols: Vec<Symbol>,
    by_id: Vec<Option<usize>>,
    max_id: u32,
    min_payout: u8,
    max_payout: u8,
    best_wild: Vec<Option<(u32, f64)>>,
}

impl SymbolSet {
    /// Build a symbol set, validating ids
    pub fn new(mut symbols: Vec<Symbol>) -> Result<Self, ConfigError> {
        let mut max_id = 0;
        for symbol in &mut symbols {
            if symbol.id == 0 {
                return Err(ConfigError::ReservedSymbolId);
            }
            if symbol.id > MAX_SYMBOL_ID {
                return Err(ConfigError::SymbolIdTooLarge(symbol.id));
            }
            symbol.refresh();
            max_id = max_id.max(symbol.id);
        }

        let mut by_id = vec![None; max_id as usize + 1];
        for (ix, symbol) in symbols.iter().enumerate() {
            let slot = &mut by_id[symbol.id as usize];
            if slot.is_some() {
                return Err(ConfigError::DuplicateSymbol(symbol.id));
            }
            *slot = Some(ix);
        }

        let mut min_payout = u8::MAX;
        let mut max_payout = 0;
        for symbol in symbols.iter().filter(|s| !s.is_scatter()) {
            for (ix, &pay) in symbol.pay_values.iter().enumerate() {
                if pay > 0.0 {
                    let count = (ix + 1).min(u8::MAX as usize) as u8;
                    min_payout = min_payout.min(count);
                    max_payout = max_payout.max(count);
                }
            }
        }

        let mut set = Self {
            symbols,
            by_id,
            max_id,
            min_payout,
            max_payout,
            best_wild: Vec::new(),
        };
        set.best_wild = set.build_best_wild();

        log::debug!(
            "Symbol set: {} symbols, max id {}, paying counts {}..={}",
            set.symbols.len(),
            set.max_id,
            set.min_payout,
            set.max_payout
        );

        Ok(set)
    }

    /// Best non-scatter payout per run length; ties go to the higher id.
    fn build_best_wild(&self) -> Vec<Option<(u32, f64)>> {
        let longest = self
            .symbols
            .iter()
            .map(|s| s.pay_values.len())
            .max()
            .unwrap_or(0)
            .min(u8::MAX as usize);

        let mut table = vec![None; longest.max(2) + 1];
        for (count, entry) in table.iter_mut().enumerate().skip(2) {
            let mut best: Option<(u32, f64)> = None;
            for id in (1..=self.max_id).rev() {
                let Some(symbol) = self.get(id) else { continue };
                if symbol.is_scatter() {
                    continue;
                }
                let pay = symbol.get_pay(count);
                if pay > best.map_or(0.0, |(_, p)| p) {
                    best = Some((id, pay));
                }
            }
            *entry = best;
        }
        table
    }

    /// Standard symbol set for a classic 5-reel slot
    /// Industry-standard naming: HP = High Paying, LP = Low Paying
    pub fn standard() -> Self {
        let symbols = vec![
            Symbol::regular(1, "HP1", &[0.0, 0.0, 20.0, 100.0, 500.0]),
            Symbol::regular(2, "HP2", &[0.0, 0.0, 15.0, 75.0, 300.0]),
            Symbol::regular(3, "HP3", &[0.0, 0.0, 10.0, 50.0, 200.0]),
            Symbol::regular(4, "HP4", &[0.0, 0.0, 8.0, 40.0, 150.0]),
            Symbol::regular(5, "LP1", &[0.0, 0.0, 5.0, 25.0, 100.0]),
            Symbol::regular(6, "LP2", &[0.0, 0.0, 4.0, 20.0, 80.0]),
            Symbol::regular(7, "LP3", &[0.0, 0.0, 3.0, 15.0, 60.0]),
            Symbol::regular(8, "LP4", &[0.0, 0.0, 2.0, 10.0, 40.0]),
            Symbol::regular(9, "LP5", &[0.0, 0.0, 1.0, 5.0, 20.0]),
            Symbol::regular(10, "LP6", &[0.0, 0.0, 1.0, 5.0, 20.0]),
            Symbol::wild(11, "WILD").with_pays(&[0.0, 0.0, 50.0, 200.0, 1000.0]),
            Symbol::scatter(12, "SCATTER", &[0.0, 0.0, 2.0, 5.0, 20.0]),
        ];

        // Fixed ids above, cannot collide.
        match Self::new(symbols) {
            Ok(set) => set,
            Err(e) => unreachable!("standard symbol set is valid: {e}"),
        }
    }

    /// Get symbol by ID; 0 and unknown ids yield `None`
    #[inline]
    pub fn get(&self, id: u32) -> Option<&Symbol> {
        self.by_id
            .get(id as usize)
            .copied()
            .flatten()
            .map(|ix| &self.symbols[ix])
    }

    /// Is `id` a universal wild?
    #[inline]
    pub fn is_wild(&self, id: u32) -> bool {
        self.get(id).is_some_and(Symbol::is_wild)
    }

    /// All symbols in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Highest declared id
    pub fn max_id(&self) -> u32 {
        self.max_id
    }

    /// Lowest match count any non-scatter symbol pays for
    pub fn min_payout(&self) -> u8 {
        self.min_payout
    }

    /// Highest match count any non-scatter symbol pays for
    pub fn max_payout(&self) -> u8 {
        self.max_payout
    }

    /// Best (symbol id, payout) a run of `wilds` wilds can claim
    pub fn best_wild_payout(&self, wilds: u8) -> Option<(u32, f64)> {
        if wilds < 2 || self.best_wild.is_empty() {
            return None;
        }
        let idx = (wilds as usize).min(self.best_wild.len() - 1);
        self.best_wild[idx]
    }

    /// Highest id with a positive, non-scatter payout
    pub fn highest_paying_id(&self) -> Option<u32> {
        (1..=self.max_id).rev().find(|&id| {
            self.get(id)
                .is_some_and(|s| !s.is_scatter() && s.pay_values.iter().any(|&p| p > 0.0))
        })
    }

    /// All standard symbol IDs
    pub fn regular_ids(&self) -> Vec<u32> {
        self.symbols
            .iter()
            .filter(|s| s.symbol_type == SymbolType::Standard)
            .map(|s| s.id)
            .collect()
    }

    /// First wild symbol ID
    pub fn wild_id(&self) -> Option<u32> {
        self.symbols.iter().find(|s| s.is_wild()).map(|s| s.id)
    }

    /// First scatter symbol ID
    pub fn scatter_id(&self) -> Option<u32> {
        self.symbols
            .iter()
            .find(|s| s.symbol_type == SymbolType::Scatter)
            .map(|s| s.id)
    }
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self::standard()
    }
}
