//! Machine configuration
//!
//! A [`MachineConfig`] is the serializable description of one slot machine:
//! grid, symbols and win mechanism. [`Machine::from_config`] validates it and
//! builds the immutable evaluation structures once.

use serde::{Deserialize, Serialize};

use crate::cluster::ClusterPayouts;
use crate::connectivity::Topology;
use crate::error::ConfigError;
use crate::grid::{GridSpec, SpinGrid};
use crate::payline_tree::PaylineSet;
use crate::paylines::{PayDirection, Payline, standard_20_paylines};
use crate::payout::Payout;
use crate::symbols::{Symbol, SymbolSet};

/// Grid layout plus the way its cells connect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(flatten)]
    pub spec: GridSpec,
    #[serde(default)]
    pub topology: Topology,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            spec: GridSpec::standard_5x3(),
            topology: Topology::Rectangular,
        }
    }
}

/// How wins are evaluated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WinMechanism {
    /// Fixed paylines
    Paylines {
        #[serde(default)]
        direction: PayDirection,
        /// Runs of wilds pay the best symbol for their length
        #[serde(default)]
        highest_payout: bool,
        /// Line shapes (empty = standard 20 lines, 5×3 only)
        #[serde(default)]
        lines: Vec<Payline>,
    },

    /// Cluster pays (matching connected symbols)
    ClusterPays {
        /// Minimum cluster size for a win
        min_cluster: u8,
    },
}

impl WinMechanism {
    /// Standard 20 paylines, left to right
    pub fn standard_20_paylines() -> Self {
        Self::Paylines {
            direction: PayDirection::Ltr,
            highest_payout: false,
            lines: standard_20_paylines(),
        }
    }

    /// Cluster pays with minimum 5 symbols
    pub fn cluster_5() -> Self {
        Self::ClusterPays { min_cluster: 5 }
    }

    pub fn is_paylines(&self) -> bool {
        matches!(self, Self::Paylines { .. })
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self, Self::ClusterPays { .. })
    }
}

impl Default for WinMechanism {
    fn default() -> Self {
        Self::standard_20_paylines()
    }
}

/// Serializable machine definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineConfig {
    #[serde(default)]
    pub grid: GridConfig,

    /// Symbol definitions (empty = standard set)
    #[serde(default)]
    pub symbols: Vec<Symbol>,

    #[serde(default)]
    pub win_mechanism: WinMechanism,

    /// Round multipliers only apply to wins with a wild
    #[serde(default)]
    pub multiplier_needs_wild: bool,
}

impl MachineConfig {
    /// Standard 5×3, 20 lines, standard symbols
    pub fn standard_5x3() -> Self {
        Self {
            grid: GridConfig::default(),
            symbols: Vec::new(),
            win_mechanism: WinMechanism::standard_20_paylines(),
            multiplier_needs_wild: false,
        }
    }

    /// Hexagonal cluster machine shaped by `mask`
    pub fn hexagonal_clusters(mask: &[u8], symbols: Vec<Symbol>, min_cluster: u8) -> Self {
        Self {
            grid: GridConfig {
                spec: GridSpec::masked(mask),
                topology: Topology::Hexagonal,
            },
            symbols,
            win_mechanism: WinMechanism::ClusterPays { min_cluster },
            multiplier_needs_wild: false,
        }
    }

    /// Builder: set the win mechanism
    pub fn with_win_mechanism(mut self, mechanism: WinMechanism) -> Self {
        self.win_mechanism = mechanism;
        self
    }

    /// Builder: set the symbols
    pub fn with_symbols(mut self, symbols: Vec<Symbol>) -> Self {
        self.symbols = symbols;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::standard_5x3()
    }
}

/// Built win evaluator
#[derive(Debug, Clone)]
pub enum Evaluator {
    Paylines(PaylineSet),
    Clusters(ClusterPayouts),
}

/// A validated machine, ready to evaluate spins
///
/// Immutable and `Sync`; share it by reference across worker threads and give
/// each worker its own [`SpinGrid`] from [`Machine::new_spin`].
#[derive(Debug, Clone)]
pub struct Machine {
    grid: GridSpec,
    symbols: SymbolSet,
    evaluator: Evaluator,
    multiplier_needs_wild: bool,
}

impl Machine {
    pub fn from_config(config: &MachineConfig) -> Result<Self, ConfigError> {
        let grid = config.grid.spec.clone();
        grid.validate()?;

        let symbols = if config.symbols.is_empty() {
            SymbolSet::standard()
        } else {
            SymbolSet::new(config.symbols.clone())?
        };

        let evaluator = match &config.win_mechanism {
            WinMechanism::Paylines {
                direction,
                highest_payout,
                lines,
            } => {
                let lines = if lines.is_empty() && grid == GridSpec::standard_5x3() {
                    standard_20_paylines()
                } else {
                    lines.clone()
                };
                Evaluator::Paylines(PaylineSet::new(
                    lines,
                    *direction,
                    *highest_payout,
                    grid.reels,
                    grid.rows,
                )?)
            }
            WinMechanism::ClusterPays { min_cluster } => Evaluator::Clusters(ClusterPayouts::from_spec(
                &grid,
                config.grid.topology,
                *min_cluster,
            )?),
        };

        log::debug!(
            "Machine {}x{}: {} symbols, {}",
            grid.reels,
            grid.rows,
            symbols.len(),
            match &evaluator {
                Evaluator::Paylines(set) => format!("{} paylines ({})", set.paylines().len(), set.direction()),
                Evaluator::Clusters(c) => format!("clusters of {}+", c.min_cluster()),
            }
        );

        Ok(Self {
            grid,
            symbols,
            evaluator,
            multiplier_needs_wild: config.multiplier_needs_wild,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::from_config(&MachineConfig::from_json(json)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Self::from_config(&MachineConfig::from_yaml(yaml)?)
    }

    /// Standard 5×3, 20 lines
    pub fn standard_5x3() -> Result<Self, ConfigError> {
        Self::from_config(&MachineConfig::standard_5x3())
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn symbols(&self) -> &SymbolSet {
        &self.symbols
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Payline set, for payline machines
    pub fn paylines(&self) -> Option<&PaylineSet> {
        match &self.evaluator {
            Evaluator::Paylines(set) => Some(set),
            Evaluator::Clusters(_) => None,
        }
    }

    /// Cluster evaluator, for cluster machines
    pub fn clusters(&self) -> Option<&ClusterPayouts> {
        match &self.evaluator {
            Evaluator::Clusters(c) => Some(c),
            Evaluator::Paylines(_) => None,
        }
    }

    /// Fresh spin buffers for this machine
    pub fn new_spin(&self) -> SpinGrid {
        SpinGrid::new(&self.grid).with_round_multiplier(1.0, self.multiplier_needs_wild)
    }

    /// Evaluate one spin, appending wins to `out`. Returns the number of wins.
    pub fn evaluate(&self, spin: &mut SpinGrid, out: &mut Vec<Payout>) -> usize {
        let start = out.len();
        match &self.evaluator {
            Evaluator::Paylines(set) => {
                spin.reset_claims();
                set.evaluate(spin, &self.symbols, out);
            }
            Evaluator::Clusters(clusters) => {
                clusters.find(spin, &self.symbols, out);
            }
        }
        out.len() - start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_machine() {
        let machine = Machine::standard_5x3().unwrap();
        assert_eq!(machine.symbols().len(), 12);
        assert_eq!(machine.paylines().map(|p| p.paylines().len()), Some(20));
        assert!(machine.clusters().is_none());

        let mut spin = machine.new_spin();
        // Middle row of HP1, everything else mixed low symbols
        spin.set_reels(&[vec![5, 1, 6], vec![7, 1, 8], vec![9, 1, 10], vec![5, 1, 6], vec![7, 1, 8]]);
        let mut out = Vec::new();
        let wins = machine.evaluate(&mut spin, &mut out);
        assert_eq!(wins, out.len());
        let middle = out.iter().find(|p| p.payline_id() == Some(1)).unwrap();
        assert_eq!((middle.symbol_id, middle.count, middle.factor), (1, 5, 500.0));
    }

    #[test]
    fn test_json_config() {
        let json = r#"{
            "grid": { "reels": 3, "rows": 3, "mask": [2, 3, 2], "topology": "hexagonal" },
            "symbols": [
                { "id": 1, "name": "A", "pay_values": [0, 0, 1, 2] },
                { "id": 2, "name": "B", "pay_values": [0, 0, 2, 4] },
                { "id": 9, "name": "W", "symbol_type": "wild" }
            ],
            "win_mechanism": { "type": "cluster_pays", "min_cluster": 3 }
        }"#;
        let machine = Machine::from_json(json).unwrap();
        let clusters = machine.clusters().unwrap();
        assert_eq!(clusters.min_cluster(), 3);
        assert_eq!(clusters.connectivity().topology(), Topology::Hexagonal);
        assert!(machine.symbols().is_wild(9));

        let mut spin = machine.new_spin();
        spin.set_symbols(&[1, 1, 0, 9, 2, 2, 1, 2, 0]);
        let mut out = Vec::new();
        assert_eq!(machine.evaluate(&mut spin, &mut out), 2);
    }

    #[test]
    fn test_yaml_config() {
        let yaml = r#"
grid:
  reels: 5
  rows: 3
symbols:
  - id: 1
    name: A
    pay_values: [0, 0, 1, 2.5, 5]
  - id: 2
    name: B
win_mechanism:
  type: paylines
  direction: both
  highest_payout: true
  lines:
    - id: 1
      rows: [1, 1, 1, 1, 1]
multiplier_needs_wild: true
"#;
        let config = MachineConfig::from_yaml(yaml).unwrap();
        assert!(config.multiplier_needs_wild);
        assert!(config.win_mechanism.is_paylines());

        let machine = Machine::from_config(&config).unwrap();
        let set = machine.paylines().unwrap();
        assert_eq!(set.direction(), PayDirection::Both);
        assert!(set.highest_payout());

        let mut spin = machine.new_spin().with_round_multiplier(3.0, true);
        spin.set_symbols(&[2, 1, 2, 2, 1, 2, 2, 1, 2, 2, 1, 2, 2, 1, 2]);
        let mut out = Vec::new();
        machine.evaluate(&mut spin, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].factor, 5.0);
        // No wild on the line
        assert_eq!(out[0].multiplier, 1.0);
    }

    #[test]
    fn test_config_errors() {
        assert!(matches!(MachineConfig::from_json("{ not json"), Err(ConfigError::Parse(_))));

        let config = MachineConfig::standard_5x3().with_win_mechanism(WinMechanism::Paylines {
            direction: PayDirection::Ltr,
            highest_payout: false,
            lines: vec![Payline::new(1, &[0, 1, 2])],
        });
        assert_eq!(
            Machine::from_config(&config).unwrap_err(),
            ConfigError::PaylineLength {
                id: 1,
                expected: 5,
                actual: 3
            }
        );

        let config = MachineConfig::standard_5x3().with_win_mechanism(WinMechanism::Paylines {
            direction: PayDirection::Cluster,
            highest_payout: false,
            lines: Vec::new(),
        });
        assert_eq!(
            Machine::from_config(&config).unwrap_err(),
            ConfigError::InvalidDirection(PayDirection::Cluster)
        );

        let config = MachineConfig::standard_5x3()
            .with_symbols(vec![Symbol::regular(0, "EMPTY", &[1.0])]);
        assert_eq!(Machine::from_config(&config).unwrap_err(), ConfigError::ReservedSymbolId);

        let mut config = MachineConfig::standard_5x3();
        config.grid.spec.reels = 0;
        assert!(matches!(Machine::from_config(&config), Err(ConfigError::InvalidGrid(_))));

        let mut config = MachineConfig::standard_5x3();
        config.grid.spec = GridSpec::new(6, 4);
        assert_eq!(Machine::from_config(&config).unwrap_err(), ConfigError::PaylineLength {
            id: 1,
            expected: 6,
            actual: 5
        });
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = MachineConfig::hexagonal_clusters(&[3, 4, 5, 4, 3], Vec::new(), 4);
        let json = config.to_json().unwrap();
        assert!(json.contains("\"type\": \"cluster_pays\""));
        let parsed = MachineConfig::from_json(&json).unwrap();
        assert_eq!(parsed.grid, config.grid);
        assert_eq!(parsed.win_mechanism, config.win_mechanism);
    }
}
