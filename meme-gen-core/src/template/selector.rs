use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::IteratorRandom;
use serde::Deserialize;

use super::registry::{TemplateClass, TemplateRegistry};
use crate::error::{CollectionKind, Error};

/// The user-selected strategy governing which collection(s) a request
/// may draw from.
///
/// Wire values (query parameter): `auto`, `random`, `meme`, `poster`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
	Auto,
	Random,
	#[serde(rename = "meme")]
	ManualMeme,
	#[serde(rename = "poster")]
	ManualPoster,
}

/// Ordered keyword rules for `Auto` mode.
///
/// Rules are scanned top to bottom and the first matching class wins, so
/// a topic matching both classes ("funny conference") resolves to the
/// event class. Matching is substring containment on the lower-cased
/// topic, not whole-word matching: "festival" matches "fest".
const AUTO_RULES: [(&[&str], TemplateClass); 2] = [
	(&["fest", "event", "celebration", "conference"], TemplateClass::Poster),
	(&["funny", "joke", "meme", "laugh"], TemplateClass::Meme),
];

/// Selects one template path for the given topic and mode.
///
/// Policy, in fixed priority order:
/// 1. `Random`: uniform pick from the full union (meme ∪ poster).
/// 2. `Auto`: first matching rule of [`AUTO_RULES`] decides the class;
///    with no match, uniform pick from the full union.
/// 3. `ManualMeme` / `ManualPoster`: uniform pick from that class only.
///
/// The random source is injected so callers can substitute a seeded rng.
///
/// # Errors
/// Returns `Error::EmptyCollection` if the collection to draw from holds
/// no templates. Unreachable with a correctly configured catalog.
pub fn select<'a, R: Rng + ?Sized>(
	registry: &'a TemplateRegistry,
	topic: &str,
	mode: Mode,
	rng: &mut R,
) -> Result<&'a Path, Error> {
	match mode {
		Mode::Random => draw_union(registry, rng),
		Mode::ManualMeme => draw_class(registry, TemplateClass::Meme, rng),
		Mode::ManualPoster => draw_class(registry, TemplateClass::Poster, rng),
		Mode::Auto => {
			let topic = topic.to_lowercase();
			for (keywords, class) in AUTO_RULES {
				if keywords.iter().any(|keyword| topic.contains(keyword)) {
					return draw_class(registry, class, rng);
				}
			}
			draw_union(registry, rng)
		}
	}
}

/// Uniform draw from one class collection.
fn draw_class<'a, R: Rng + ?Sized>(
	registry: &'a TemplateRegistry,
	class: TemplateClass,
	rng: &mut R,
) -> Result<&'a Path, Error> {
	let kind = match class {
		TemplateClass::Meme => CollectionKind::Meme,
		TemplateClass::Poster => CollectionKind::Poster,
	};
	registry
		.collection(class)
		.iter()
		.choose(rng)
		.map(PathBuf::as_path)
		.ok_or(Error::EmptyCollection(kind))
}

/// Uniform draw from the full union.
fn draw_union<'a, R: Rng + ?Sized>(
	registry: &'a TemplateRegistry,
	rng: &mut R,
) -> Result<&'a Path, Error> {
	registry
		.union()
		.choose(rng)
		.map(PathBuf::as_path)
		.ok_or(Error::EmptyCollection(CollectionKind::All))
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;
	use std::path::PathBuf;

	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;

	const TRIALS: usize = 300;

	fn fixture() -> TemplateRegistry {
		TemplateRegistry::from_collections(
			vec![
				PathBuf::from("templates/meme1.png"),
				PathBuf::from("templates/meme2.png"),
				PathBuf::from("templates/meme3.png"),
			],
			vec![
				PathBuf::from("templates/poster1.png"),
				PathBuf::from("templates/poster2.png"),
			],
		)
		.unwrap()
	}

	fn is_member(registry: &TemplateRegistry, class: TemplateClass, path: &Path) -> bool {
		registry.collection(class).iter().any(|p| p == path)
	}

	#[test]
	fn auto_with_humor_keyword_stays_in_meme_collection() {
		let registry = fixture();
		let mut rng = StdRng::seed_from_u64(1);
		for _ in 0..TRIALS {
			let path = select(&registry, "best meme about compilers", Mode::Auto, &mut rng).unwrap();
			assert!(is_member(&registry, TemplateClass::Meme, path));
		}
	}

	#[test]
	fn auto_prefers_event_class_when_both_match() {
		let registry = fixture();
		let mut rng = StdRng::seed_from_u64(2);
		for _ in 0..TRIALS {
			let path = select(&registry, "funny conference", Mode::Auto, &mut rng).unwrap();
			assert!(is_member(&registry, TemplateClass::Poster, path));
		}
	}

	#[test]
	fn auto_matches_substrings_not_whole_words() {
		let registry = fixture();
		let mut rng = StdRng::seed_from_u64(3);
		// "festival" contains "fest"
		let path = select(&registry, "summer festival", Mode::Auto, &mut rng).unwrap();
		assert!(is_member(&registry, TemplateClass::Poster, path));
	}

	#[test]
	fn auto_without_keywords_draws_from_the_union() {
		let registry = fixture();
		let mut rng = StdRng::seed_from_u64(4);
		let union: HashSet<&PathBuf> = registry.union().collect();
		for _ in 0..TRIALS {
			let path = select(&registry, "quantum physics", Mode::Auto, &mut rng).unwrap();
			assert!(union.contains(&path.to_path_buf()));
		}
	}

	#[test]
	fn random_mode_covers_the_full_union_and_nothing_else() {
		let registry = fixture();
		let mut rng = StdRng::seed_from_u64(5);
		let union: HashSet<PathBuf> = registry.union().cloned().collect();

		let mut seen: HashSet<PathBuf> = HashSet::new();
		for _ in 0..TRIALS {
			let path = select(&registry, "anything", Mode::Random, &mut rng).unwrap();
			assert!(union.contains(path));
			seen.insert(path.to_path_buf());
		}
		// No template is structurally unreachable.
		assert_eq!(seen, union);
	}

	#[test]
	fn manual_modes_never_cross_collections() {
		let registry = fixture();
		let mut rng = StdRng::seed_from_u64(6);
		for topic in ["", "conference", "funny", "whatever"] {
			for _ in 0..TRIALS {
				let path = select(&registry, topic, Mode::ManualMeme, &mut rng).unwrap();
				assert!(is_member(&registry, TemplateClass::Meme, path));

				let path = select(&registry, topic, Mode::ManualPoster, &mut rng).unwrap();
				assert!(is_member(&registry, TemplateClass::Poster, path));
			}
		}
	}

	#[test]
	fn empty_collection_is_a_named_error() {
		let registry = TemplateRegistry::from_collections(
			vec![],
			vec![PathBuf::from("templates/poster1.png")],
		)
		.unwrap();
		let mut rng = StdRng::seed_from_u64(7);

		let result = select(&registry, "whatever", Mode::ManualMeme, &mut rng);
		assert!(matches!(
			result,
			Err(Error::EmptyCollection(CollectionKind::Meme))
		));

		let empty = TemplateRegistry::from_collections(vec![], vec![]).unwrap();
		let result = select(&empty, "whatever", Mode::Random, &mut rng);
		assert!(matches!(
			result,
			Err(Error::EmptyCollection(CollectionKind::All))
		));
	}

	#[test]
	fn mode_wire_values_deserialize() {
		#[derive(Deserialize)]
		struct Params {
			mode: Mode,
		}
		let p: Params = toml::from_str(r#"mode = "poster""#).unwrap();
		assert_eq!(p.mode, Mode::ManualPoster);
		let p: Params = toml::from_str(r#"mode = "auto""#).unwrap();
		assert_eq!(p.mode, Mode::Auto);
	}
}
