use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The maximum word length that can be packed into a single [`u32`] feedback code.
pub const MAX_WORD_LENGTH: usize = 16;

/// The verdict for one letter of a guess.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub enum LetterResult {
    /// The letter is in the word at this location (green).
    Match,
    /// The letter is in the word, but not at this location (yellow).
    Present,
    /// The letter is not in the word, or every occurrence of it is already accounted for
    /// (grey).
    Absent,
}

impl LetterResult {
    /// Parses a single `g`, `y`, or `x` character, ignoring case.
    pub fn from_char(letter: char) -> Result<LetterResult, WordleError> {
        match letter.to_ascii_lowercase() {
            'g' => Ok(LetterResult::Match),
            'y' => Ok(LetterResult::Present),
            'x' => Ok(LetterResult::Absent),
            _ => Err(WordleError::InvalidFeedback(letter)),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            LetterResult::Match => 'g',
            LetterResult::Present => 'y',
            LetterResult::Absent => 'x',
        }
    }

    fn code(self) -> u32 {
        match self {
            LetterResult::Absent => 0,
            LetterResult::Present => 1,
            LetterResult::Match => 2,
        }
    }

    fn from_code(code: u32) -> Result<LetterResult, WordleError> {
        match code {
            0 => Ok(LetterResult::Absent),
            1 => Ok(LetterResult::Present),
            2 => Ok(LetterResult::Match),
            _ => Err(WordleError::InvalidFeedback('?')),
        }
    }
}

/// Indicates that an error occurred while solving.
#[derive(Debug, Error)]
pub enum WordleError {
    /// Two values that must have the same length did not.
    #[error("length mismatch: expected {expected} letters but got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    /// A word contained a character outside `a-z`.
    #[error("unsupported character {0:?}, words must only contain the letters a-z")]
    InvalidAlphabet(char),
    /// A feedback string contained something other than `g`, `y`, or `x`.
    #[error("unsupported feedback character {0:?}, expected one of 'g', 'y', or 'x'")]
    InvalidFeedback(char),
    /// The word length is not supported, or the word bank mixes lengths. Provides the
    /// expected (or maximum) length.
    #[error("words must have exactly {0} letters")]
    WordLength(usize),
    #[error("unknown scorer {0:?}, expected one of frequency, reduction, entropy, or hybrid")]
    UnknownScorer(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<ron::Error> for WordleError {
    fn from(error: ron::Error) -> WordleError {
        WordleError::Serialization(error.to_string())
    }
}

impl From<ron::error::SpannedError> for WordleError {
    fn from(error: ron::error::SpannedError) -> WordleError {
        WordleError::Serialization(error.to_string())
    }
}

/// The per-letter verdicts for a single guess against some answer.
#[derive(Debug, Eq, PartialEq, Clone, Hash)]
pub struct Feedback {
    results: Vec<LetterResult>,
}

impl Feedback {
    /// Wraps the given per-letter results.
    pub fn new(results: Vec<LetterResult>) -> Result<Feedback, WordleError> {
        if results.len() > MAX_WORD_LENGTH {
            return Err(WordleError::WordLength(MAX_WORD_LENGTH));
        }
        Ok(Feedback { results })
    }

    /// Feedback where every letter is a match.
    pub fn all_match(word_length: usize) -> Feedback {
        Feedback {
            results: vec![LetterResult::Match; word_length],
        }
    }

    pub fn results(&self) -> &[LetterResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Returns true iff every letter is a match.
    pub fn is_win(&self) -> bool {
        self.results.iter().all(|result| *result == LetterResult::Match)
    }

    /// Packs the feedback into an integer, using 2 bits per letter. Letter 0 occupies the least
    /// significant bits.
    pub fn encode(&self) -> u32 {
        self.results
            .iter()
            .enumerate()
            .fold(0, |code, (index, result)| code | (result.code() << (2 * index)))
    }

    /// Unpacks feedback that was packed with [`Feedback::encode()`].
    pub fn decode(code: u32, word_length: usize) -> Result<Feedback, WordleError> {
        if word_length > MAX_WORD_LENGTH {
            return Err(WordleError::WordLength(MAX_WORD_LENGTH));
        }
        if word_length < MAX_WORD_LENGTH && code >> (2 * word_length) != 0 {
            return Err(WordleError::LengthMismatch {
                expected: word_length,
                actual: (32 - code.leading_zeros() as usize + 1) / 2,
            });
        }
        let results = (0..word_length)
            .map(|index| LetterResult::from_code((code >> (2 * index)) & 0b11))
            .collect::<Result<Vec<LetterResult>, WordleError>>()?;
        Ok(Feedback { results })
    }
}

impl FromStr for Feedback {
    type Err = WordleError;

    fn from_str(feedback: &str) -> Result<Feedback, WordleError> {
        Feedback::new(
            feedback
                .chars()
                .map(LetterResult::from_char)
                .collect::<Result<Vec<LetterResult>, WordleError>>()?,
        )
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            write!(f, "{}", result.to_char())?;
        }
        Ok(())
    }
}

/// Determines the feedback for the given `guess` when the true answer is `answer`.
///
/// Exact matches are assigned before any present letters, so that a repeated letter in the
/// guess cannot claim an occurrence that belongs to a later exact match:
///
/// ```
/// use wordle_ranker::get_feedback;
///
/// let feedback = get_feedback("sells", "spelt").unwrap();
///
/// assert_eq!(feedback.to_string(), "gyxgx");
/// ```
///
/// This is not symmetric: `get_feedback(a, b)` may differ from `get_feedback(b, a)`.
pub fn get_feedback(guess: &str, answer: &str) -> Result<Feedback, WordleError> {
    if guess.len() != answer.len() {
        return Err(WordleError::LengthMismatch {
            expected: answer.len(),
            actual: guess.len(),
        });
    }
    if guess.len() > MAX_WORD_LENGTH {
        return Err(WordleError::WordLength(MAX_WORD_LENGTH));
    }
    if let Some(letter) = guess
        .chars()
        .chain(answer.chars())
        .find(|letter| !letter.is_ascii_lowercase())
    {
        return Err(WordleError::InvalidAlphabet(letter));
    }
    Feedback::decode(
        compute_encoded(guess.as_bytes(), answer.as_bytes()),
        guess.len(),
    )
}

/// Computes the encoded feedback without allocating.
///
/// Both words must be the same length, at most [`MAX_WORD_LENGTH`] long, and only contain the
/// letters `a-z`. Callers that cannot guarantee this should use [`get_feedback()`].
#[inline]
pub fn compute_encoded(guess: &[u8], answer: &[u8]) -> u32 {
    debug_assert_eq!(guess.len(), answer.len());
    let mut remaining = [0u8; 26];
    let mut code = 0u32;
    let mut matched = 0u32;
    for (index, (guess_letter, answer_letter)) in guess.iter().zip(answer.iter()).enumerate() {
        if guess_letter == answer_letter {
            code |= 2 << (2 * index);
            matched |= 1 << index;
        } else {
            remaining[(answer_letter - b'a') as usize] += 1;
        }
    }
    for (index, guess_letter) in guess.iter().enumerate() {
        if matched & (1 << index) != 0 {
            continue;
        }
        let count = &mut remaining[(guess_letter - b'a') as usize];
        if *count > 0 {
            *count -= 1;
            code |= 1 << (2 * index);
        }
    }
    code
}

/// Whether the game was won or lost by the guesser.
#[derive(Debug, Eq, PartialEq)]
pub enum GameResult {
    /// Indicates that the guesser won the game, and provides the guesses that were given.
    Success(Vec<Box<str>>),
    /// Indicates that the guesser failed to guess the word, and provides the guesses that were given.
    Failure(Vec<Box<str>>),
    /// Indicates that the given word was not in the word bank.
    UnknownWord,
}
