//! Backend implementations for the segmentation variants
//!
//! - Heuristic backend (corner-colour cutout)
//! - Pass-through backend (RGBA normalisation, optional mask model)

pub mod heuristic;
pub mod passthrough;

// Test utilities for backend testing
#[cfg(test)]
pub mod test_utils;

pub use self::heuristic::HeuristicBackend;
pub use self::passthrough::{passthrough, PassthroughBackend};
