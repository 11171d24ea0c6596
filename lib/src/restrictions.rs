use crate::data::CandidateSet;
use crate::results::Feedback;
use crate::results::LetterResult;
use crate::results::WordleError;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::iter::zip;
use std::sync::Arc;

/// Per-letter tallies for a single guess.
#[derive(Debug, Default, Clone, Copy)]
struct GuessTally {
    num_match: u8,
    num_present: u8,
    num_absent: u8,
}

/// The knowledge accumulated from every guess made so far.
///
/// A `ConstraintState` only changes through [`ConstraintState::update()`]. Use
/// [`ConstraintState::updated()`] to explore a hypothetical guess without touching the original.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ConstraintState {
    word_length: usize,
    /// Letters confirmed at each location.
    greens: BTreeMap<usize, char>,
    /// Letters known to be in the word, but not at any of these locations.
    yellow_forbidden: BTreeMap<char, BTreeSet<usize>>,
    /// The minimum number of times each letter must appear.
    min_count: BTreeMap<char, u8>,
    /// The maximum number of times each letter may appear. Letters that are missing have no
    /// upper bound beyond the word length.
    max_count: BTreeMap<char, u8>,
}

impl ConstraintState {
    /// Creates a `ConstraintState` for the given word length with nothing known.
    pub fn new(word_length: usize) -> ConstraintState {
        ConstraintState {
            word_length,
            greens: BTreeMap::new(),
            yellow_forbidden: BTreeMap::new(),
            min_count: BTreeMap::new(),
            max_count: BTreeMap::new(),
        }
    }

    /// Returns the constraints imposed by a single guess.
    pub fn from_result(guess: &str, feedback: &Feedback) -> Result<ConstraintState, WordleError> {
        ConstraintState::new(guess.len()).updated(guess, feedback)
    }

    pub fn word_length(&self) -> usize {
        self.word_length
    }

    /// Returns true if no guess has narrowed this state yet.
    pub fn is_empty(&self) -> bool {
        self.greens.is_empty()
            && self.yellow_forbidden.is_empty()
            && self.min_count.is_empty()
            && self.max_count.is_empty()
    }

    /// The letter known to be at the given location, if any.
    pub fn green(&self, location: usize) -> Option<char> {
        self.greens.get(&location).copied()
    }

    /// The locations where `letter` is known to be present but not placed.
    pub fn yellow_forbidden(&self, letter: char) -> Option<&BTreeSet<usize>> {
        self.yellow_forbidden.get(&letter)
    }

    pub fn min_count(&self, letter: char) -> u8 {
        self.min_count.get(&letter).copied().unwrap_or(0)
    }

    pub fn max_count(&self, letter: char) -> u8 {
        self.max_count
            .get(&letter)
            .copied()
            .unwrap_or(self.word_length as u8)
    }

    /// Returns true iff the letter is known not to be in the word at all.
    pub fn is_absent(&self, letter: char) -> bool {
        self.max_count.get(&letter) == Some(&0)
    }

    /// Adds the constraints arising from the given guess and its feedback.
    ///
    /// Fails with [`WordleError::LengthMismatch`] if the guess, the feedback and this state do
    /// not all share one length, in which case the state is left unchanged.
    pub fn update(&mut self, guess: &str, feedback: &Feedback) -> Result<(), WordleError> {
        if guess.len() != self.word_length {
            return Err(WordleError::LengthMismatch {
                expected: self.word_length,
                actual: guess.len(),
            });
        }
        if feedback.len() != self.word_length {
            return Err(WordleError::LengthMismatch {
                expected: self.word_length,
                actual: feedback.len(),
            });
        }

        let mut tallies: BTreeMap<char, GuessTally> = BTreeMap::new();
        for (letter, result) in zip(guess.chars(), feedback.results()) {
            let tally = tallies.entry(letter).or_default();
            match result {
                LetterResult::Match => tally.num_match += 1,
                LetterResult::Present => tally.num_present += 1,
                LetterResult::Absent => tally.num_absent += 1,
            }
        }

        for (location, (letter, result)) in zip(guess.chars(), feedback.results()).enumerate() {
            match result {
                LetterResult::Match => {
                    self.greens.insert(location, letter);
                    if let Some(locations) = self.yellow_forbidden.get_mut(&letter) {
                        locations.remove(&location);
                        if locations.is_empty() {
                            self.yellow_forbidden.remove(&letter);
                        }
                    }
                }
                LetterResult::Present => {
                    self.yellow_forbidden
                        .entry(letter)
                        .or_default()
                        .insert(location);
                }
                LetterResult::Absent => {}
            }
        }

        for (letter, tally) in tallies {
            let num_known = tally.num_match + tally.num_present;
            if num_known > 0 {
                let min_count = self.min_count.entry(letter).or_insert(0);
                *min_count = (*min_count).max(num_known);
            }
            if tally.num_absent > 0 {
                // An absent verdict caps the letter at the number of times it was found in this
                // guess, which is 0 if it was not found at all.
                let max_count = self.max_count.entry(letter).or_insert(num_known);
                *max_count = (*max_count).min(num_known);
            }
        }
        Ok(())
    }

    /// Returns a copy of this state with the given guess applied.
    pub fn updated(&self, guess: &str, feedback: &Feedback) -> Result<ConstraintState, WordleError> {
        let mut state = self.clone();
        state.update(guess, feedback)?;
        Ok(state)
    }

    /// Returns `true` iff the given word satisfies every constraint.
    pub fn is_satisfied_by(&self, word: &str) -> bool {
        if word.len() != self.word_length {
            return false;
        }
        let letters = word.as_bytes();
        let mut counts = [0u8; 26];
        for letter in letters {
            if !letter.is_ascii_lowercase() {
                return false;
            }
            counts[(letter - b'a') as usize] += 1;
        }
        let count_of = |letter: char| -> u8 {
            if letter.is_ascii_lowercase() {
                counts[(letter as u8 - b'a') as usize]
            } else {
                0
            }
        };

        self.greens
            .iter()
            .all(|(location, letter)| letters[*location] as char == *letter)
            && self.yellow_forbidden.iter().all(|(letter, locations)| {
                count_of(*letter) >= self.min_count(*letter).max(1)
                    && locations
                        .iter()
                        .all(|location| letters[*location] as char != *letter)
            })
            && self
                .min_count
                .iter()
                .all(|(letter, min_count)| count_of(*letter) >= *min_count)
            && self
                .max_count
                .iter()
                .all(|(letter, max_count)| count_of(*letter) <= *max_count)
    }

    /// Keeps only the words that satisfy every constraint. The result is sorted.
    pub fn filter(&self, words: &[Arc<str>]) -> CandidateSet {
        CandidateSet::new(
            words
                .iter()
                .filter(|word| self.is_satisfied_by(word))
                .map(Arc::clone),
        )
    }

    /// Counts the words that satisfy every constraint, without collecting them.
    pub fn count_satisfying(&self, words: &[Arc<str>]) -> usize {
        words
            .iter()
            .filter(|word| self.is_satisfied_by(word))
            .count()
    }
}
