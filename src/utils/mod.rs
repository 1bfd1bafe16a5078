//! # Utilities Module
//!
//! Dice rolling and room-graph search shared by generation and play.

pub mod dice;
pub mod graph;

pub use dice::*;
pub use graph::*;
