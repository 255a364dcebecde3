//! Meme and poster generation library.
//!
//! This crate provides the pieces of a caption-on-template generation
//! pipeline:
//! - A word-level caption model loaded once per process
//! - A caption generator wrapping the text-generation capability
//! - A static template registry and its keyword-driven selector
//! - A compositor overlaying the caption on the selected template
//!
//! Only the high-level API is exposed publicly. Low-level components
//! are kept internal to ensure consistency and prevent misuse.

/// Caption model and generation wrapper.
pub mod caption;

/// Template registry and selection policy.
pub mod template;

/// Text-on-image compositing.
pub mod compose;

/// The pipeline error taxonomy.
pub mod error;

/// I/O utilities (corpus loading, cache path handling).
///
/// Not exposed
pub(crate) mod io;
