//! # Rendering Module
//!
//! Plain-text views of a game for terminals and tool transcripts.

pub mod map;

pub use map::*;
