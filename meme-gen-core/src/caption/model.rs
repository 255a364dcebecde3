use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use serde::{Deserialize, Serialize};

use super::captioner::TextGeneration;
use super::chain::WordChain;
use crate::error::Error;
use crate::io::{build_output_path, read_file};

/// Highest chain order kept by the model.
///
/// Word-level chains above this order memorize whole captions instead of
/// generalizing over them.
const MAX_ORDER: usize = 5;

/// The caption-generation model: an aggregate of word chains of orders
/// 2 through [`MAX_ORDER`], with boundary tokens marking caption start
/// and end.
///
/// This struct manages:
/// - `chains`: a map from chain order to its corresponding `WordChain`.
/// - `start_token` and `end_token`: special tokens used to mark caption boundaries.
///
/// The model is built once from a caption corpus (one caption per line)
/// and is read-only afterwards: generation takes `&self`, so a single
/// instance can be shared across request handlers for the whole process
/// lifetime without locking.
#[derive(Serialize, Deserialize, Debug)]
pub struct CaptionModel {
	start_token: String,
	end_token: String,
	chains: HashMap<usize, WordChain>,
}

impl CaptionModel {
	/// Returns a default, empty `CaptionModel`.
	///
	/// Initializes:
	/// - `chains` as an empty HashMap
	/// - `start_token` as `"<s>"` and `end_token` as `"</s>"`
	///
	/// Useful for creating a blank model that can then be filled or merged.
	pub fn default() -> Self {
		Self {
			start_token: "<s>".to_owned(),
			end_token: "</s>".to_owned(),
			chains: HashMap::new(),
		}
	}

	/// Loads a `CaptionModel` from a corpus file if no binary cache exists,
	/// otherwise deserializes the cached binary for fast startup.
	///
	/// - `filepath` is the corpus text file (one caption per line).
	/// - Checks if a binary file exists for fast loading.
	/// - Uses `postcard` for compact serialization/deserialization.
	/// - Calls `read_corpus_file` if the binary does not exist.
	pub fn new<P: AsRef<Path>>(filepath: P) -> Result<Self, Box<dyn std::error::Error>> {
		let binary_data_path = build_output_path(&filepath, "bin")?;
		let model = if binary_data_path.exists() {
			let bytes = std::fs::read(binary_data_path)?;
			postcard::from_bytes(&bytes)?
		} else {
			Self::read_corpus_file(&filepath, binary_data_path)?
		};
		Ok(model)
	}

	/// Reads a corpus file, splits its lines into chunks, builds partial
	/// models in parallel, merges them into a final `CaptionModel`, and
	/// serializes it.
	///
	/// # Parameters
	/// - `filename`: Input corpus text file.
	/// - `binary_data_path`: Output path for the serialized binary model.
	///
	/// # Behavior
	/// - Splits input lines into chunks (based on CPU cores * factor).
	/// - Spawns threads to build partial models for each chunk.
	/// - Merges all partial models sequentially.
	/// - Serializes the final model to `binary_data_path` for future fast loading.
	///
	/// # Notes
	/// - Uses MPSC channels to collect models from threads.
	/// - Threads use `add_caption` for each line.
	fn read_corpus_file<PF, PB>(filename: PF, binary_data_path: PB) -> Result<CaptionModel, Box<dyn std::error::Error>>
	where
		PF: AsRef<Path>,
		PB: AsRef<Path>,
	{
		let lines = read_file(&filename)?;
		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = ((lines.len() + chunks - 1) / chunks).max(1);

		let (tx, rx) = mpsc::channel();
		for chunk in lines.chunks(chunk_size) {
			let tx = tx.clone();
			let chunk: Vec<String> = chunk.to_vec();

			thread::spawn(move || {
				let mut partial_model = CaptionModel::default();
				for caption in chunk {
					partial_model.add_caption(&caption);
				}
				tx.send(partial_model).expect("Failed to send from thread");
			});
		}
		drop(tx);

		let mut final_model = CaptionModel::default();
		for partial_model in rx.iter() {
			final_model.merge(&partial_model)?;
		}

		let bytes = postcard::to_stdvec(&final_model)?;
		std::fs::write(binary_data_path, bytes)?;

		Ok(final_model)
	}

	/// Adds a single caption to the model.
	///
	/// # Behavior
	/// - Tokenizes on whitespace and lower-cases every token.
	/// - Wraps the token sequence with `start_token` / `end_token`.
	/// - Updates the chains of all orders from 2 to `MAX_ORDER`.
	///
	/// # Notes
	/// - Empty or whitespace-only captions are ignored.
	/// - Uses `unwrap()` on `WordChain::new`, safe because n >= 2.
	pub fn add_caption(&mut self, caption: &str) {
		let mut tokens = Self::tokenize(caption);
		if tokens.is_empty() {
			return;
		}

		tokens.insert(0, self.start_token.clone());
		tokens.push(self.end_token.clone());

		// For each chain order
		for n in 2..=tokens.len().min(MAX_ORDER) {
			// Impossible to panic, chains are initialized >= 2
			let chain = self.chains.entry(n).or_insert_with(|| WordChain::new(n).unwrap());
			chain.add_tokens(&tokens);
		}
	}

	/// Splits a text into lower-cased whitespace tokens.
	fn tokenize(text: &str) -> Vec<String> {
		text.split_whitespace().map(|w| w.to_lowercase()).collect()
	}

	/// Predicts the next word for the given context, backing off from the
	/// highest applicable chain order down to 2.
	///
	/// Returns `None` if no chain of any order knows the context suffix.
	fn next_word<'a>(&'a self, context: &[String]) -> Option<&'a str> {
		let max_n = MAX_ORDER.min(context.len() + 1);
		for n in (2..=max_n).rev() {
			if let Some(chain) = self.chains.get(&n) {
				let prefix = &context[context.len() - (n - 1)..];
				if let Some(word) = chain.predict(prefix) {
					return Some(word);
				}
			}
		}
		None
	}

	/// Merges another `CaptionModel` into this one.
	///
	/// # Behavior
	/// - Merges each chain: existing chains are merged in place; missing
	///   ones are cloned.
	///
	/// # Errors
	/// Returns an error if the boundary tokens of the two models do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.start_token != other.start_token || self.end_token != other.end_token {
			return Err(format!(
				"Boundary token mismatch: self=({}-{}), other=({}-{})",
				self.start_token, self.end_token, other.start_token, other.end_token
			));
		}

		for (k, t) in &other.chains {
			if let Some(existing) = self.chains.get_mut(k) {
				existing.merge(t)?;
			} else {
				self.chains.insert(*k, t.clone());
			}
		}

		Ok(())
	}
}

impl TextGeneration for CaptionModel {
	/// Generates a continuation of `prompt`, echoing the prompt at the
	/// front of the returned text.
	///
	/// # Behavior
	/// - Continues from the longest known suffix of the prompt tokens.
	/// - If the prompt context is entirely unknown to the model, restarts
	///   once from the start token and generates a fresh caption.
	/// - Stops at the end token or after `max_words` generated words.
	///
	/// # Errors
	/// Returns `Error::GenerationFailure` if the model holds no chains.
	fn generate(&self, prompt: &str, max_words: usize) -> Result<String, Error> {
		if self.chains.is_empty() {
			return Err(Error::GenerationFailure(
				"no caption data loaded".to_owned(),
			));
		}

		let mut context = Self::tokenize(prompt);
		let mut words: Vec<String> = Vec::new();
		let mut restarted = false;

		while words.len() < max_words {
			match self.next_word(&context) {
				Some(w) if w == self.end_token => break,
				Some(w) => {
					let w = w.to_owned();
					context.push(w.clone());
					words.push(w);
				}
				None => {
					if restarted || !words.is_empty() {
						break;
					}
					// The prompt tail is unknown to every chain: start a
					// fresh caption from the start token instead.
					context = vec![self.start_token.clone()];
					restarted = true;
				}
			}
		}

		if words.is_empty() {
			Ok(prompt.to_owned())
		} else {
			Ok(format!("{} {}", prompt, words.join(" ")))
		}
	}
}
