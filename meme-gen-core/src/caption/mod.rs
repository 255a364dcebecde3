//! Caption generation: a word-level Markov model and the thin wrapper
//! turning a topic into a short caption.

/// The caption generator wrapper and the `TextGeneration` capability trait.
///
/// Builds the fixed prompt, invokes the capability once and strips the
/// echoed prompt from the result.
pub mod captioner;

/// Multi-order caption model built from a caption corpus.
///
/// Supports loading from disk with a binary cache, parallel construction,
/// merging, and probabilistic word prediction.
pub mod model;

/// Internal fixed-order word chain (`n >= 2`).
///
/// Handles caption ingestion, transition counting, probabilistic
/// next-word prediction, and chain merging.
mod chain;

/// Internal representation of a single chain state (word prefix).
///
/// Tracks outgoing transitions and supports weighted random sampling.
/// This module is not exposed publicly.
mod state;
