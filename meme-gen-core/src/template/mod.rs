//! Template catalog and selection policy.

/// Static registry of the two disjoint template collections.
pub mod registry;

/// Keyword-driven template selection.
///
/// Exposes the generation `Mode` and the `select` operation with an
/// injectable random source.
pub mod selector;
