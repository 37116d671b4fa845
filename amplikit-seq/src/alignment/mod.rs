//! Calculate banded global sequence alignments.
//!
//! This module provides a unit-cost Needleman-Wunsch implementation restricted
//! to a fixed band around the main diagonal, together with the path recovery
//! needed by the chimera detector.

mod alignment_path;
mod banded;

pub use alignment_path::*;
pub use banded::*;
