use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::state::State;

/// Represents a fixed-order Markov chain over word tokens.
///
/// The `WordChain` stores states for prefixes of length `n-1` words
/// and allows probabilistic prediction of the next word based on
/// learned captions.
///
/// # Responsibilities
/// - Build the chain from tokenized captions
/// - Accumulate transition counts for each state
/// - Predict the next word given a prefix
/// - Merge with another chain of the same order `n`
///
/// # Invariants
/// - `n` is always >= 2
/// - Each state in `states` corresponds to a unique prefix of `n-1` words
/// - All state transitions have occurrence counts >= 1
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct WordChain {
	/// The order of the chain (number of words in the n-gram)
	n: usize, // must be >= 2

	/// Mapping from a space-joined prefix (n-1 words) to its state
	states: HashMap<String, State>,
}

impl WordChain {
	/// Creates a new word chain of order `n`.
	///
	/// # Errors
	/// Returns an error if `n < 2`.
	pub(crate) fn new(n: usize) -> Result<Self, String> {
		if n < 2 {
			return Err("n must be >= 2".to_owned());
		}
		Ok(Self { n, states: HashMap::new() })
	}

	/// Adds a tokenized caption to the chain.
	///
	/// Breaks the token sequence into n-word windows and updates states
	/// with observed transitions.
	///
	/// # Notes
	/// - Tokens are expected to be lower-cased by the caller.
	/// - Captions shorter than `n` words are ignored.
	pub(crate) fn add_tokens(&mut self, tokens: &[String]) {
		if tokens.len() < self.n {
			// Caption too short, no n-grams to compute
			return;
		}

		// For each n-word window in the caption
		for window in tokens.windows(self.n) {
			// Get the prefix and the next word
			let prefix = window[..self.n - 1].join(" ");
			let next_word = &window[self.n - 1];

			// Get or create the state for this prefix
			let state = self.states.entry(prefix.clone()).or_insert_with(|| State::new(&prefix));
			state.add_transition(next_word);
		}
	}

	/// Predicts the next word given a prefix of `n-1` words.
	///
	/// Returns `None` if the prefix is unknown or has no transitions.
	pub(crate) fn predict(&self, prefix: &[String]) -> Option<&str> {
		let key = prefix.join(" ");
		self.states.get(&key)?.predict()
	}

	/// Merges another word chain into this one.
	///
	/// # Notes
	/// - Both chains must have the same order `n`.
	/// - Occurrence counts for matching states and transitions are summed.
	///
	/// # Errors
	/// Returns an error if the chain orders do not match.
	pub(crate) fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.n != other.n {
			return Err("N mismatch".to_owned());
		}

		for (key, state) in &other.states {
			if let Some(existing) = self.states.get_mut(key) {
				existing.merge(state)?;
			} else {
				self.states.insert(key.clone(), state.clone());
			}
		}

		Ok(())
	}
}
