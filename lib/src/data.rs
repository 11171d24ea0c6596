use crate::results::*;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::collections::HashSet;
use std::io::BufRead;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::OnceLock;

/// Contains all the possible words for a solving session.
///
/// Words are lower-cased, de-duplicated and sorted on construction, and must all have the same
/// length and only use the letters `a-z`. A bank is immutable and cheap to clone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordBank {
    all_words: Arc<[Arc<str>]>,
    word_length: usize,
}

impl WordBank {
    /// Constructs a new `WordBank` struct by reading words from the given reader.
    ///
    /// The reader should provide one word per line. Each word is trimmed and converted to lower
    /// case, and blank lines are skipped.
    pub fn from_reader<R: BufRead>(word_reader: R) -> Result<Self, WordleError> {
        let words = word_reader
            .lines()
            .collect::<std::io::Result<Vec<String>>>()?;
        WordBank::from_iterator(words)
    }

    /// Constructs a new `WordBank` struct using the words from the given iterator.
    ///
    /// ```
    /// use wordle_ranker::WordBank;
    ///
    /// let bank = WordBank::from_iterator(["Crane", "", "slate "]).unwrap();
    ///
    /// assert_eq!(bank.len(), 2);
    /// assert_eq!(bank.word_length(), 5);
    /// ```
    pub fn from_iterator<S, I>(words: I) -> Result<Self, WordleError>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S>,
    {
        let mut word_length = 0;
        let mut unique_words: HashSet<Arc<str>> = HashSet::new();
        for word in words {
            let word = word.as_ref().trim().to_lowercase();
            if word.is_empty() {
                continue;
            }
            if let Some(letter) = word.chars().find(|letter| !letter.is_ascii_lowercase()) {
                return Err(WordleError::InvalidAlphabet(letter));
            }
            if word_length == 0 {
                if word.len() > MAX_WORD_LENGTH {
                    return Err(WordleError::WordLength(MAX_WORD_LENGTH));
                }
                word_length = word.len();
            } else if word.len() != word_length {
                return Err(WordleError::WordLength(word_length));
            }
            unique_words.insert(Arc::from(word.as_str()));
        }
        let mut all_words: Vec<Arc<str>> = unique_words.into_iter().collect();
        all_words.sort_unstable();
        Ok(WordBank {
            all_words: all_words.into(),
            word_length,
        })
    }

    /// Returns the number of possible words.
    pub fn len(&self) -> usize {
        self.all_words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_words.is_empty()
    }

    /// Returns the length of each word in the word bank, or 0 if the bank is empty.
    pub fn word_length(&self) -> usize {
        self.word_length
    }

    /// Returns every word in the bank as a candidate set, i.e. the candidates before any guess.
    pub fn to_candidate_set(&self) -> CandidateSet {
        CandidateSet::from_sorted(Arc::clone(&self.all_words))
    }
}

impl Deref for WordBank {
    type Target = [Arc<str>];

    fn deref(&self) -> &Self::Target {
        &self.all_words
    }
}

/// An ordered, immutable collection of words that are all consistent with some set of
/// constraints.
///
/// Two candidate sets with the same members share a [fingerprint](CandidateSet::fingerprint),
/// regardless of how they were produced.
#[derive(Clone, Debug)]
pub struct CandidateSet {
    words: Arc<[Arc<str>]>,
    fingerprint: Arc<OnceLock<Arc<str>>>,
}

impl CandidateSet {
    /// Builds a candidate set from the given words, sorting and de-duplicating them.
    pub fn new<I>(words: I) -> CandidateSet
    where
        I: IntoIterator<Item = Arc<str>>,
    {
        let mut words: Vec<Arc<str>> = words.into_iter().collect();
        words.sort_unstable();
        words.dedup();
        CandidateSet::from_sorted(words.into())
    }

    pub(crate) fn from_sorted(words: Arc<[Arc<str>]>) -> CandidateSet {
        debug_assert!(words.windows(2).all(|pair| pair[0] < pair[1]));
        CandidateSet {
            words,
            fingerprint: Arc::new(OnceLock::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words
            .binary_search_by(|member| member.as_ref().cmp(word))
            .is_ok()
    }

    /// The hex-encoded SHA-256 digest of the sorted, comma-joined members. Computed on first use.
    pub fn fingerprint(&self) -> Arc<str> {
        Arc::clone(self.fingerprint.get_or_init(|| {
            let mut hasher = Sha256::new();
            for (index, word) in self.words.iter().enumerate() {
                if index > 0 {
                    hasher.update(b",");
                }
                hasher.update(word.as_bytes());
            }
            Arc::from(format!("{:x}", hasher.finalize()).as_str())
        }))
    }
}

impl Deref for CandidateSet {
    type Target = [Arc<str>];

    fn deref(&self) -> &Self::Target {
        &self.words
    }
}

impl PartialEq for CandidateSet {
    fn eq(&self, other: &Self) -> bool {
        self.words == other.words
    }
}

impl Eq for CandidateSet {}

/// A letter along with its location in the word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LocatedLetter {
    pub letter: u8,
    /// The zero-based location (i.e. index) for this letter in a word.
    pub location: u8,
}

impl LocatedLetter {
    pub fn new(letter: u8, location: u8) -> LocatedLetter {
        LocatedLetter { letter, location }
    }
}

/// Letter statistics over a set of words.
///
/// Tracks how often each letter occurs in total, how many words contain each letter at least
/// once, and how often each letter occurs at each location.
#[derive(Clone, Debug)]
pub struct WordCounter {
    num_words: usize,
    num_letters: usize,
    num_occurrences_by_letter: [u32; 26],
    num_words_by_letter: [u32; 26],
    num_words_by_ll: HashMap<LocatedLetter, u32>,
    num_words_by_location: Vec<u32>,
}

impl WordCounter {
    /// Creates a new word counter based on the given word list.
    pub fn new<S>(words: &[S]) -> WordCounter
    where
        S: AsRef<str>,
    {
        let mut counter = WordCounter {
            num_words: words.len(),
            num_letters: 0,
            num_occurrences_by_letter: [0; 26],
            num_words_by_letter: [0; 26],
            num_words_by_ll: HashMap::new(),
            num_words_by_location: Vec::new(),
        };
        for word in words {
            let word = word.as_ref().as_bytes();
            if counter.num_words_by_location.len() < word.len() {
                counter.num_words_by_location.resize(word.len(), 0);
            }
            let mut seen = [false; 26];
            for (index, letter) in word.iter().enumerate() {
                let letter_index = (letter - b'a') as usize;
                counter.num_letters += 1;
                counter.num_occurrences_by_letter[letter_index] += 1;
                counter.num_words_by_location[index] += 1;
                *counter
                    .num_words_by_ll
                    .entry(LocatedLetter::new(*letter, index as u8))
                    .or_insert(0) += 1;
                if !seen[letter_index] {
                    seen[letter_index] = true;
                    counter.num_words_by_letter[letter_index] += 1;
                }
            }
        }
        counter
    }

    /// Retrieves the number of words this counter was built from.
    pub fn num_words(&self) -> usize {
        self.num_words
    }

    /// Retrieves the total number of letters across all words.
    pub fn num_letters(&self) -> usize {
        self.num_letters
    }

    /// Retrieves the number of times the letter occurs across all words.
    pub fn num_occurrences_of_letter(&self, letter: u8) -> u32 {
        self.num_occurrences_by_letter[(letter - b'a') as usize]
    }

    /// Retrieves the count of words that contain the given letter.
    pub fn num_words_with_letter(&self, letter: u8) -> u32 {
        self.num_words_by_letter[(letter - b'a') as usize]
    }

    /// Retrieves the count of words with the given letter at the given location.
    pub fn num_words_with_located_letter(&self, ll: &LocatedLetter) -> u32 {
        *self.num_words_by_ll.get(ll).unwrap_or(&0)
    }

    /// Retrieves the count of words that have any letter at the given location.
    pub fn num_words_with_location(&self, location: usize) -> u32 {
        *self.num_words_by_location.get(location).unwrap_or(&0)
    }
}

/// Precomputed feedback for every ordered `(guess, answer)` pair.
///
/// Feedback is not symmetric, so the guess and answer are never swapped: `get(a, b)` and
/// `get(b, a)` are looked up in different cells.
#[derive(Clone, Debug)]
pub struct FeedbackMatrix {
    guess_indices: HashMap<Arc<str>, usize>,
    answer_indices: HashMap<Arc<str>, usize>,
    codes: Vec<u32>,
}

impl FeedbackMatrix {
    /// Computes the matrix in parallel. **This is O(guesses x answers).**
    pub fn new(guesses: &[Arc<str>], answers: &[Arc<str>]) -> Result<FeedbackMatrix, WordleError> {
        if let Some(word_length) = guesses.first().or(answers.first()).map(|word| word.len()) {
            if let Some(word) = guesses
                .iter()
                .chain(answers.iter())
                .find(|word| word.len() != word_length)
            {
                return Err(WordleError::LengthMismatch {
                    expected: word_length,
                    actual: word.len(),
                });
            }
            if word_length > MAX_WORD_LENGTH {
                return Err(WordleError::WordLength(MAX_WORD_LENGTH));
            }
        }
        if let Some(letter) = guesses
            .iter()
            .chain(answers.iter())
            .flat_map(|word| word.chars())
            .find(|letter| !letter.is_ascii_lowercase())
        {
            return Err(WordleError::InvalidAlphabet(letter));
        }
        let codes: Vec<u32> = guesses
            .par_iter()
            .flat_map_iter(|guess| {
                answers
                    .iter()
                    .map(move |answer| compute_encoded(guess.as_bytes(), answer.as_bytes()))
            })
            .collect();
        log::debug!(
            "Precomputed {} feedback codes for {} guesses and {} answers",
            codes.len(),
            guesses.len(),
            answers.len()
        );
        Ok(FeedbackMatrix {
            guess_indices: index_words(guesses),
            answer_indices: index_words(answers),
            codes,
        })
    }

    /// Retrieves the encoded feedback for the ordered pair, if both words are in the matrix.
    pub fn get(&self, guess: &str, answer: &str) -> Option<u32> {
        let guess_index = self.guess_indices.get(guess)?;
        let answer_index = self.answer_indices.get(answer)?;
        Some(self.codes[guess_index * self.answer_indices.len() + answer_index])
    }

    /// Retrieves the encoded feedback, computing it directly if the pair is not in the matrix.
    #[inline]
    pub fn get_or_compute(&self, guess: &str, answer: &str) -> u32 {
        self.get(guess, answer)
            .unwrap_or_else(|| compute_encoded(guess.as_bytes(), answer.as_bytes()))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

fn index_words(words: &[Arc<str>]) -> HashMap<Arc<str>, usize> {
    words
        .iter()
        .enumerate()
        .map(|(index, word)| (Arc::clone(word), index))
        .collect()
}

#[cfg(test)]
mod tests {

    use super::*;

    fn arc_vec(words: &[&str]) -> Vec<Arc<str>> {
        words.iter().map(|word| Arc::from(*word)).collect()
    }

    #[test]
    fn word_counter_num_words_with_located_letter() {
        let counter = WordCounter::new(&["hello", "hallo", "worda"]);

        assert_eq!(
            counter.num_words_with_located_letter(&LocatedLetter::new(b'h', 0)),
            2
        );
        assert_eq!(
            counter.num_words_with_located_letter(&LocatedLetter::new(b'e', 1)),
            1
        );
        assert_eq!(
            counter.num_words_with_located_letter(&LocatedLetter::new(b'l', 3)),
            2
        );
        assert_eq!(
            counter.num_words_with_located_letter(&LocatedLetter::new(b'o', 4)),
            2
        );

        // Missing letters:
        assert_eq!(
            counter.num_words_with_located_letter(&LocatedLetter::new(b'h', 1)),
            0
        );
        assert_eq!(
            counter.num_words_with_located_letter(&LocatedLetter::new(b'z', 0)),
            0
        );
    }

    #[test]
    fn word_counter_num_words_with_letter() {
        let counter = WordCounter::new(&["hello", "hallo", "worda"]);

        assert_eq!(counter.num_words_with_letter(b'h'), 2);
        assert_eq!(counter.num_words_with_letter(b'l'), 2);
        assert_eq!(counter.num_words_with_letter(b'o'), 3);
        assert_eq!(counter.num_words_with_letter(b'a'), 2);
        assert_eq!(counter.num_words_with_letter(b'z'), 0);
    }

    #[test]
    fn word_counter_num_occurrences() {
        let counter = WordCounter::new(&["hello", "hallo", "worda"]);

        assert_eq!(counter.num_words(), 3);
        assert_eq!(counter.num_letters(), 15);
        assert_eq!(counter.num_occurrences_of_letter(b'l'), 4);
        assert_eq!(counter.num_occurrences_of_letter(b'o'), 3);
        assert_eq!(counter.num_words_with_location(4), 3);
        assert_eq!(counter.num_words_with_location(5), 0);
    }

    #[test]
    fn candidate_set_sorts_and_dedups() {
        let candidates = CandidateSet::new(arc_vec(&["worda", "other", "worda", "abbey"]));

        assert_eq!(&*candidates, &arc_vec(&["abbey", "other", "worda"])[..]);
        assert!(candidates.contains("other"));
        assert!(!candidates.contains("wordb"));
    }

    #[test]
    fn candidate_set_fingerprint_ignores_order() {
        let a = CandidateSet::new(arc_vec(&["abc", "def", "ghi"]));
        let b = CandidateSet::new(arc_vec(&["ghi", "abc", "def"]));
        let c = CandidateSet::new(arc_vec(&["abc", "def"]));

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn candidate_set_fingerprint_separates_members() {
        let joined = CandidateSet::new(arc_vec(&["ab", "cd"]));
        let single = CandidateSet::new(arc_vec(&["abcd"]));

        assert_ne!(joined.fingerprint(), single.fingerprint());
    }

    #[test]
    fn feedback_matrix_is_keyed_by_ordered_pair() -> Result<(), WordleError> {
        let words = arc_vec(&["aab", "abb"]);
        let matrix = FeedbackMatrix::new(&words, &words)?;

        assert_eq!(matrix.len(), 4);
        assert_eq!(
            matrix.get("aab", "abb"),
            Some(compute_encoded(b"aab", b"abb"))
        );
        assert_eq!(
            matrix.get("abb", "aab"),
            Some(compute_encoded(b"abb", b"aab"))
        );
        assert_eq!(matrix.get("zzz", "aab"), None);
        assert_eq!(
            matrix.get_or_compute("zzz", "aab"),
            compute_encoded(b"zzz", b"aab")
        );
        Ok(())
    }
}
