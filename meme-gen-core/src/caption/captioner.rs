use crate::error::Error;

/// Upper bound on the number of words a caption may receive from the
/// text-generation capability.
pub const MAX_CAPTION_WORDS: usize = 12;

/// A text-generation capability.
///
/// Implementors return the full generated text *including the echoed
/// prompt*, mirroring how text-generation pipelines prepend the prompt
/// to their output. The caller is responsible for stripping it.
///
/// Generation is `&self`: the capability is constructed once at startup
/// and shared read-only across requests.
pub trait TextGeneration {
	/// Generates up to `max_words` words of continuation for `prompt`.
	///
	/// # Errors
	/// Returns `Error::GenerationFailure` if the capability cannot produce
	/// any output. Failures are never retried here.
	fn generate(&self, prompt: &str, max_words: usize) -> Result<String, Error>;
}

/// Builds the fixed prompt embedding the topic.
///
/// The topic keeps its original casing; lower-casing only happens inside
/// the model and the template selector.
pub fn build_prompt(topic: &str) -> String {
	format!("Create a short funny caption about {topic}.")
}

/// Turns a topic into a short caption.
///
/// # Behavior
/// - Builds the fixed prompt, invokes the capability exactly once,
///   strips the echoed prompt prefix from the returned text, and trims
///   surrounding whitespace.
/// - No length or content validation beyond stripping and trimming.
///
/// # Errors
/// A capability failure propagates untouched; this function never
/// substitutes an empty caption for a failed generation.
pub fn generate_caption(generator: &impl TextGeneration, topic: &str) -> Result<String, Error> {
	let prompt = build_prompt(topic);
	let text = generator.generate(&prompt, MAX_CAPTION_WORDS)?;
	let caption = text.strip_prefix(&prompt).unwrap_or(&text);
	Ok(caption.trim().to_owned())
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	/// Capability stub echoing the prompt followed by a fixed continuation.
	struct Echoing(&'static str);

	impl TextGeneration for Echoing {
		fn generate(&self, prompt: &str, _max_words: usize) -> Result<String, Error> {
			Ok(format!("{}{}", prompt, self.0))
		}
	}

	/// Capability stub that always fails.
	struct Failing;

	impl TextGeneration for Failing {
		fn generate(&self, _prompt: &str, _max_words: usize) -> Result<String, Error> {
			Err(Error::GenerationFailure("capability down".to_owned()))
		}
	}

	#[test]
	fn strips_exactly_the_prompt_prefix_and_trims() {
		let generator = Echoing("Why did the cat cross the road? Because it could.  ");
		let caption = generate_caption(&generator, "cats").unwrap();
		assert_eq!(caption, "Why did the cat cross the road? Because it could.");
	}

	#[test]
	fn prompt_embeds_the_topic_verbatim() {
		assert_eq!(
			build_prompt("Rust Conf"),
			"Create a short funny caption about Rust Conf."
		);
	}

	#[test]
	fn keeps_text_without_echoed_prompt_intact() {
		struct Bare;
		impl TextGeneration for Bare {
			fn generate(&self, _prompt: &str, _max_words: usize) -> Result<String, Error> {
				Ok("  a caption with no echo  ".to_owned())
			}
		}
		let caption = generate_caption(&Bare, "cats").unwrap();
		assert_eq!(caption, "a caption with no echo");
	}

	#[test]
	fn failure_propagates_untouched() {
		let result = generate_caption(&Failing, "cats");
		assert!(matches!(result, Err(Error::GenerationFailure(_))));
	}
}
