use std::path::Path;
use std::sync::OnceLock;

use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};

use crate::error::Error;

/// Column width the caption is wrapped to before drawing.
pub const WRAP_WIDTH: usize = 30;

/// Distance in pixels between the caption block anchor and the bottom edge.
const BOTTOM_ANCHOR: i32 = 80;

/// Pixel height of the rendered glyphs.
const FONT_SCALE: f32 = 22.0;

/// Extra pixels between consecutive caption lines.
const LINE_SPACING: i32 = 2;

/// Single fixed fill color. No outline or contrast handling: readability
/// against light template regions is an accepted limitation.
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

static FONT_BYTES: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

/// The bundled monospace font (DejaVu Sans Mono), parsed once.
fn font() -> &'static FontRef<'static> {
	static FONT: OnceLock<FontRef<'static>> = OnceLock::new();
	// Cannot fail, the font is a compiled-in asset
	FONT.get_or_init(|| FontRef::try_from_slice(FONT_BYTES).expect("bundled font is valid"))
}

/// Greedy word-wraps `text` to at most `width` columns per line.
///
/// # Behavior
/// - Words are never split: a word longer than `width` gets its own
///   overlong line.
/// - Consecutive whitespace collapses to single spaces.
/// - An empty or whitespace-only text yields no lines.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
	let mut lines = Vec::new();
	let mut current = String::new();

	for word in text.split_whitespace() {
		if current.is_empty() {
			current = word.to_owned();
		} else if current.chars().count() + 1 + word.chars().count() <= width {
			current.push(' ');
			current.push_str(word);
		} else {
			lines.push(current);
			current = word.to_owned();
		}
	}
	if !current.is_empty() {
		lines.push(current);
	}

	lines
}

/// Opens and decodes a template image.
///
/// # Errors
/// Returns `Error::TemplateLoadFailure` carrying the offending path if
/// the file cannot be opened or decoded. There is no fallback template.
pub fn load_template(path: &Path) -> Result<RgbImage, Error> {
	let img = image::open(path).map_err(|source| Error::TemplateLoadFailure {
		path: path.to_path_buf(),
		source,
	})?;
	Ok(img.to_rgb8())
}

/// Draws `caption` onto a copy of `template` and returns the new image.
///
/// The caption is wrapped to [`WRAP_WIDTH`] columns; each line is
/// centered horizontally and the whole block is centered vertically on
/// an anchor 80 pixels above the bottom edge, in white.
///
/// Deterministic: identical (template, caption) inputs produce
/// pixel-identical output. The template itself is never mutated.
pub fn overlay_caption(template: &RgbImage, caption: &str) -> RgbImage {
	let mut img = template.clone();

	let lines = wrap_text(caption, WRAP_WIDTH);
	if lines.is_empty() {
		return img;
	}

	let font = font();
	let scale = PxScale::from(FONT_SCALE);
	let (width, height) = img.dimensions();

	let line_height = FONT_SCALE.ceil() as i32 + LINE_SPACING;
	let block_height = line_height * lines.len() as i32;
	let anchor_y = height as i32 - BOTTOM_ANCHOR;
	let mut y = anchor_y - block_height / 2;

	for line in &lines {
		let (line_width, _) = text_size(scale, font, line);
		let x = (width as i32 - line_width as i32) / 2;
		draw_text_mut(&mut img, TEXT_COLOR, x.max(0), y, scale, font, line);
		y += line_height;
	}

	img
}

/// Loads a template and composes the caption onto it.
///
/// # Errors
/// Propagates `Error::TemplateLoadFailure` from the load step.
pub fn compose(path: &Path, caption: &str) -> Result<RgbImage, Error> {
	Ok(overlay_caption(&load_template(path)?, caption))
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn wraps_greedily_at_the_column_width() {
		assert_eq!(
			wrap_text("the quick brown fox jumps over the lazy dog", 10),
			vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]
		);
	}

	#[test]
	fn keeps_overlong_words_unbroken() {
		assert_eq!(
			wrap_text("a pneumonoultramicroscopic word", 10),
			vec!["a", "pneumonoultramicroscopic", "word"]
		);
	}

	#[test]
	fn empty_caption_yields_no_lines() {
		assert!(wrap_text("", 30).is_empty());
		assert!(wrap_text("   ", 30).is_empty());
	}

	#[test]
	fn short_caption_stays_on_one_line() {
		assert_eq!(wrap_text("hello world", 30), vec!["hello world"]);
	}

	#[test]
	fn overlay_is_deterministic() {
		let template = RgbImage::from_pixel(240, 180, Rgb([10, 20, 30]));
		let first = overlay_caption(&template, "same caption every time");
		let second = overlay_caption(&template, "same caption every time");
		assert_eq!(first.as_raw(), second.as_raw());
	}

	#[test]
	fn overlay_draws_onto_a_copy() {
		let template = RgbImage::from_pixel(240, 180, Rgb([10, 20, 30]));
		let composed = overlay_caption(&template, "hello");
		// The caption changed some pixels, the template none.
		assert_ne!(composed.as_raw(), template.as_raw());
		assert!(template.pixels().all(|p| *p == Rgb([10, 20, 30])));
	}

	#[test]
	fn overlay_with_empty_caption_is_the_template() {
		let template = RgbImage::from_pixel(64, 64, Rgb([1, 2, 3]));
		let composed = overlay_caption(&template, "");
		assert_eq!(composed.as_raw(), template.as_raw());
	}

	#[test]
	fn missing_template_is_a_load_failure() {
		let result = load_template(Path::new("definitely/missing.png"));
		assert!(matches!(result, Err(Error::TemplateLoadFailure { .. })));
	}

	#[test]
	fn composes_from_a_file_on_disk() {
		let mut path = std::env::temp_dir();
		path.push(format!("meme_gen_template_{}.png", std::process::id()));
		RgbImage::from_pixel(120, 160, Rgb([40, 40, 60]))
			.save(&path)
			.unwrap();

		let composed = compose(&path, "a caption").unwrap();
		assert_eq!(composed.dimensions(), (120, 160));

		let _ = std::fs::remove_file(&path);
	}
}
