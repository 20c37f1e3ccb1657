//! Error types
//!
//! Evaluation never fails: zero payouts is a valid outcome. Everything that can
//! go wrong is a configuration problem, caught once while the immutable
//! structures are built.

/// Build-time configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid grid: {0}")]
    InvalidGrid(&'static str),

    #[error("Symbol id 0 is reserved for empty cells")]
    ReservedSymbolId,

    #[error("Symbol id {0} exceeds the supported maximum")]
    SymbolIdTooLarge(u32),

    #[error("Duplicate symbol id: {0}")]
    DuplicateSymbol(u32),

    #[error("Payline id 0 is reserved")]
    ReservedPaylineId,

    #[error("Duplicate payline id: {0}")]
    DuplicatePayline(u8),

    #[error("Payline {id}: expected {expected} reels, got {actual}")]
    PaylineLength { id: u8, expected: usize, actual: usize },

    #[error("Payline {id}: row {row} on reel {reel} is outside the {rows}-row grid")]
    PaylineRow { id: u8, reel: usize, row: u8, rows: u8 },

    #[error("Paylines cannot pay in direction {0}")]
    InvalidDirection(crate::paylines::PayDirection),

    #[error("No paylines configured")]
    NoPaylines,

    #[error("Invalid cluster size: {0}")]
    InvalidClusterSize(u8),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Errors raised while removing cluster payouts from a grid
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemovalError {
    #[error("Symbol set has no paying symbol to draw replacements from")]
    NoPayingSymbol,

    #[error("No replacement symbol available for offset {offset}")]
    NoReplacement { offset: usize },

    #[error("{remaining} paying clusters remain after removal")]
    ClustersRemain { remaining: usize },
}
