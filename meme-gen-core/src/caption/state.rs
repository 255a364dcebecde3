use std::collections::HashMap;

use rand::Rng;

use serde::{Deserialize, Serialize};

/// Represents a state in a word-level Markov chain.
///
/// A `State` corresponds to a fixed (n-1)-word prefix (`key`) and stores
/// all observed transitions from this prefix to the next word.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Responsibilities:
/// - Accumulate transition occurrences during learning
/// - Predict the next word using weighted random sampling
/// - Merge with another state having the same key (parallel learning support)
///
/// ## Invariants
/// - All transitions belong to the same `key`
/// - Each transition occurrence count is strictly positive
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct State {
	/// Identifier of the state (space-joined (n-1)-word prefix).
	key: String,
	/// Outgoing transitions indexed by the next word.
	/// The value represents how many times this transition was observed.
	/// Example: { "cat" => 42, "keyboard" => 3 }
	transitions: HashMap<String, usize>,
}

impl State {
	/// Creates a new empty state for the given prefix.
	pub(crate) fn new(key: &str) -> Self {
		Self {
			key: key.to_owned(),
			transitions: HashMap::new(),
		}
	}

	/// Records an occurrence of a transition toward `next_word`.
	///
	/// - If the transition already exists, its occurrence count is increased.
	/// - Otherwise, a new transition is created with an initial count of 1.
	pub(crate) fn add_transition(&mut self, next_word: &str) {
		*self.transitions.entry(next_word.to_owned()).or_insert(0) += 1;
	}

	/// Predicts the next word using weighted random sampling.
	///
	/// The probability of selecting a word is proportional to its
	/// occurrence count.
	///
	/// This method performs:
	/// - an O(n) scan over the transitions
	/// - a cumulative subtraction to select a bucket
	///
	/// Returns `None` if the state has no transitions.
	pub(crate) fn predict(&self) -> Option<&str> {
		if self.transitions.is_empty() {
			return None;
		}

		// Compute the total number of occurrences
		let total: usize = self.transitions.values().sum();
		if total == 0 {
			// Should not happen due to invariants, but kept for safety
			return None;
		}

		// Randomly select a word
		let mut r = rand::rng().random_range(0..total);

		let mut fallback: Option<&str> = None;
		for (next_word, occurrence) in &self.transitions {
			if r < *occurrence {
				return Some(next_word);
			}
			r -= occurrence;
			fallback = Some(next_word);
		}

		// Fallback: should not happen, but kept for safety.
		fallback
	}

	/// Merges another state into this one.
	///
	/// Both states must represent the same prefix (`key`).
	/// Transition occurrence counts are summed.
	///
	/// This method is intended for parallel learning, where multiple
	/// partial models are combined into a single one.
	///
	/// # Errors
	/// Returns an error if the state keys do not match.
	pub(crate) fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.key != other.key {
			return Err("Key mismatch".to_owned());
		}

		for (next_word, occurrence) in &other.transitions {
			*self.transitions.entry(next_word.clone()).or_insert(0) += *occurrence;
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn predict_returns_only_observed_words() {
		let mut state = State::new("the");
		state.add_transition("cat");
		state.add_transition("cat");
		state.add_transition("dog");

		for _ in 0..100 {
			let word = state.predict().unwrap();
			assert!(word == "cat" || word == "dog");
		}
	}

	#[test]
	fn predict_on_empty_state_is_none() {
		let state = State::new("the");
		assert_eq!(state.predict(), None);
	}

	#[test]
	fn merge_sums_occurrences() {
		let mut a = State::new("the");
		a.add_transition("cat");
		let mut b = State::new("the");
		b.add_transition("dog");
		a.merge(&b).unwrap();

		let mut seen_dog = false;
		for _ in 0..200 {
			if a.predict().unwrap() == "dog" {
				seen_dog = true;
				break;
			}
		}
		assert!(seen_dog);
	}

	#[test]
	fn merge_rejects_key_mismatch() {
		let mut a = State::new("the");
		let b = State::new("a");
		assert!(a.merge(&b).is_err());
	}
}
