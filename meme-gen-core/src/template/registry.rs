use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;

/// The two disjoint template classes.
///
/// Every template in the catalog belongs to exactly one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateClass {
	Meme,
	Poster,
}

/// On-disk catalog layout:
///
/// ```toml
/// [templates]
/// meme = ["templates/meme1.png"]
/// poster = ["templates/poster1.png"]
/// ```
#[derive(Deserialize)]
struct CatalogFile {
	templates: Catalog,
}

#[derive(Deserialize)]
struct Catalog {
	meme: Vec<PathBuf>,
	poster: Vec<PathBuf>,
}

/// Static catalog of template paths, split into the meme and poster
/// collections.
///
/// Membership is fixed configuration, loaded once at process start and
/// read-only afterwards; nothing is discovered dynamically at runtime.
///
/// # Invariants
/// - The two collections are disjoint and contain no duplicate paths,
///   so their union is exactly the disjoint union (validated at
///   construction).
#[derive(Debug)]
pub struct TemplateRegistry {
	meme: Vec<PathBuf>,
	poster: Vec<PathBuf>,
}

impl TemplateRegistry {
	/// Loads the registry from a TOML catalog file.
	///
	/// # Errors
	/// Returns an error if the file cannot be read, does not parse, or
	/// violates the catalog invariants.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
		let contents = std::fs::read_to_string(path)?;
		Ok(Self::from_toml(&contents)?)
	}

	/// Parses the registry from TOML catalog contents.
	///
	/// # Errors
	/// Returns `Error::Catalog` if the TOML does not parse or a template
	/// path appears twice (within or across collections).
	pub fn from_toml(contents: &str) -> Result<Self, Error> {
		let file: CatalogFile =
			toml::from_str(contents).map_err(|e| Error::Catalog(e.to_string()))?;
		Self::from_collections(file.templates.meme, file.templates.poster)
	}

	/// Builds the registry from the two collections directly.
	///
	/// An empty collection is accepted here; drawing from it fails at
	/// selection time with `Error::EmptyCollection` (the counts are
	/// configuration, not invariant).
	///
	/// # Errors
	/// Returns `Error::Catalog` if any path appears twice.
	pub fn from_collections(meme: Vec<PathBuf>, poster: Vec<PathBuf>) -> Result<Self, Error> {
		let mut seen: HashSet<&Path> = HashSet::new();
		for path in meme.iter().chain(poster.iter()) {
			if !seen.insert(path.as_path()) {
				return Err(Error::Catalog(format!(
					"duplicate template path: {}",
					path.display()
				)));
			}
		}
		Ok(Self { meme, poster })
	}

	/// Returns the templates of one class.
	pub fn collection(&self, class: TemplateClass) -> &[PathBuf] {
		match class {
			TemplateClass::Meme => &self.meme,
			TemplateClass::Poster => &self.poster,
		}
	}

	/// Iterates over the full union, meme entries first, then poster.
	pub fn union(&self) -> impl Iterator<Item = &PathBuf> {
		self.meme.iter().chain(self.poster.iter())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_a_catalog() {
		let registry = TemplateRegistry::from_toml(
			r#"
			[templates]
			meme = ["templates/meme1.png", "templates/meme2.png"]
			poster = ["templates/poster1.png"]
			"#,
		)
		.unwrap();

		assert_eq!(registry.collection(TemplateClass::Meme).len(), 2);
		assert_eq!(registry.collection(TemplateClass::Poster).len(), 1);
		assert_eq!(registry.union().count(), 3);
	}

	#[test]
	fn rejects_duplicates_within_a_collection() {
		let result = TemplateRegistry::from_collections(
			vec!["a.png".into(), "a.png".into()],
			vec![],
		);
		assert!(matches!(result, Err(Error::Catalog(_))));
	}

	#[test]
	fn rejects_duplicates_across_collections() {
		let result = TemplateRegistry::from_collections(
			vec!["a.png".into()],
			vec!["a.png".into()],
		);
		assert!(matches!(result, Err(Error::Catalog(_))));
	}

	#[test]
	fn rejects_malformed_toml() {
		assert!(matches!(
			TemplateRegistry::from_toml("not a catalog"),
			Err(Error::Catalog(_))
		));
	}

	#[test]
	fn accepts_empty_collections() {
		let registry = TemplateRegistry::from_collections(vec![], vec![]).unwrap();
		assert_eq!(registry.union().count(), 0);
	}
}
