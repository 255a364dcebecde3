use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The set of templates a draw was attempted from.
///
/// Used by [`Error::EmptyCollection`] to name which collection turned out
/// to be empty: one of the two classes, or the full union used by the
/// `Random` mode and the `Auto` fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
	Meme,
	Poster,
	All,
}

impl fmt::Display for CollectionKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CollectionKind::Meme => write!(f, "meme"),
			CollectionKind::Poster => write!(f, "poster"),
			CollectionKind::All => write!(f, "full"),
		}
	}
}

/// Errors surfaced by the generation pipeline.
///
/// Every failure is terminal for the request that hit it: nothing in the
/// pipeline retries, and no stage substitutes a default caption or image.
#[derive(Debug, Error)]
pub enum Error {
	/// The submitted topic was empty or whitespace-only.
	///
	/// Raised at the shell boundary before any other component runs.
	#[error("topic must not be empty")]
	EmptyTopic,

	/// The text-generation capability failed or had nothing to generate from.
	#[error("caption generation failed: {0}")]
	GenerationFailure(String),

	/// A selected template path could not be opened or decoded.
	#[error("failed to load template {}: {source}", path.display())]
	TemplateLoadFailure {
		path: PathBuf,
		source: image::ImageError,
	},

	/// A required template collection was empty at selection time.
	///
	/// Invariant violation: unreachable with a correctly configured catalog.
	#[error("the {0} template collection is empty")]
	EmptyCollection(CollectionKind),

	/// The template catalog violates its invariants (duplicate paths).
	#[error("invalid template catalog: {0}")]
	Catalog(String),
}
