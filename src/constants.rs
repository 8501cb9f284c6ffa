//! Constants for the default board, analysis windows, and strategy tuning.
//!
//! # Board Size Configuration
//!
//! The default (rectangular) board used when no board description is loaded
//! is controlled by Cargo features:
//! - `board5x5` (default): 5x5 dots, 16 boxes
//! - `board8x8`: 8x8 dots, 49 boxes
//!
//! To compile for a specific default board:
//! ```sh
//! cargo build                                              # 5x5 (default)
//! cargo build --no-default-features --features board8x8    # 8x8
//! ```

// =============================================================================
// Board Geometry
// =============================================================================

/// Dots per side of the default board.
#[cfg(feature = "board5x5")]
pub const DOTS: usize = 5;

#[cfg(feature = "board8x8")]
pub const DOTS: usize = 8;

// Compile-time check: exactly one board size feature must be enabled
#[cfg(all(feature = "board5x5", feature = "board8x8"))]
compile_error!("Cannot enable both 'board5x5' and 'board8x8' features at the same time");

#[cfg(not(any(feature = "board5x5", feature = "board8x8")))]
compile_error!("Must enable exactly one board size feature: 'board5x5' or 'board8x8'");

/// Largest dot count per side accepted by the `boardsize` protocol command.
pub const MAX_DOTS: usize = 32;

/// Number of sides of a box.
pub const BOX_SIDES: u8 = 4;

// =============================================================================
// Analysis Windows
// =============================================================================

/// Drawing an edge of a box at most this full cannot hand over a box.
pub const SAFE_MAX_DRAWN: u8 = 1;

/// Boxes with this many drawn sides are the ones a move opens into a chain.
pub const OPENING_DRAWN: u8 = 2;

/// A box with this many drawn sides is captured by the next claim on it.
pub const HARVEST_DRAWN: u8 = 3;

// =============================================================================
// Strategy Parameters
// =============================================================================

/// Chains of at most this many boxes are always harvested in full.
pub const DOUBLE_CROSS_THRESHOLD: usize = 2;

/// Boxes left to the opponent by a double-cross.
pub const DOUBLE_CROSS_SACRIFICE: usize = 2;

/// Seed used by the CLI when none is given.
pub const DEFAULT_SEED: u64 = 0x5eed;
