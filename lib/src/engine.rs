use crate::data::*;
use crate::restrictions::ConstraintState;
use crate::results::*;
use crate::scorers::ScoredWord;
use crate::scorers::Scorer;
use crate::scorers::WordScorer;
use std::sync::Arc;

/// Ranks the words that are still possible under `state`, using the given scorer.
///
/// Returns the best `top_n` words, or all of them if `top_n` is `None`, ordered from best to
/// worst.
///
/// ```
/// use std::sync::Arc;
/// use wordle_ranker::*;
/// use wordle_ranker::scorers::EntropyScorer;
///
/// let words: Vec<Arc<str>> = ["abc", "abd", "xyz"].into_iter().map(Arc::from).collect();
/// let mut state = ConstraintState::new(3);
/// state.update("xyz", &"xxx".parse().unwrap()).unwrap();
///
/// let ranked = rank(&words, &state, &EntropyScorer::new(), None);
///
/// assert_eq!(ranked.len(), 2);
/// assert_eq!(ranked[0].word.as_ref(), "abc");
/// ```
pub fn rank<S>(
    words: &[Arc<str>],
    state: &ConstraintState,
    scorer: &S,
    top_n: Option<usize>,
) -> Vec<ScoredWord>
where
    S: WordScorer + ?Sized,
{
    let candidates = state.filter(words);
    scorer.best(&candidates, &candidates, top_n)
}

/// Indicates which set of words to guess from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GuessFrom {
    /// Choose the next guess from any unguessed word in the whole word bank.
    AllWords,
    /// Choose the next guess from any of the words that are still possible.
    PossibleWords,
}

/// Guesses words in order to solve a single Wordle.
pub trait Guesser {
    /// Updates this guesser with the feedback for the given guess.
    fn update(&mut self, guess: &str, feedback: &Feedback) -> Result<(), WordleError>;

    /// Selects a new guess, or returns `None` if no words are possible.
    fn select_next_guess(&mut self) -> Option<Arc<str>>;
}

/// One solving session: the word bank, the constraints accumulated so far, and the strategy used
/// to choose guesses.
///
/// Each session owns its own [`ConstraintState`], so separate sessions can run on separate
/// threads while sharing a [`WordBank`] and a [`ScoreCache`](crate::ScoreCache).
///
/// ```
/// use wordle_ranker::*;
/// use wordle_ranker::scorers::{Scorer, ScorerKind};
///
/// let bank = WordBank::from_iterator(["abc", "abd", "xyz"]).unwrap();
/// let scorer = Scorer::from_config(ScorerKind::Entropy, &SolverConfig::default(), None);
/// let mut solver = Solver::new(bank, scorer, GuessFrom::PossibleWords);
///
/// solver.update("xyz", &"xxx".parse().unwrap()).unwrap();
///
/// assert_eq!(solver.candidates().len(), 2);
/// assert!(solver.select_next_guess().is_some());
/// ```
#[derive(Clone, Debug)]
pub struct Solver<S: WordScorer = Scorer> {
    bank: WordBank,
    state: ConstraintState,
    candidates: CandidateSet,
    scorer: S,
    guess_from: GuessFrom,
    guessed: Vec<Arc<str>>,
}

impl<S: WordScorer> Solver<S> {
    pub fn new(bank: WordBank, scorer: S, guess_from: GuessFrom) -> Solver<S> {
        Solver {
            state: ConstraintState::new(bank.word_length()),
            candidates: bank.to_candidate_set(),
            bank,
            scorer,
            guess_from,
            guessed: Vec::new(),
        }
    }

    /// Applies the feedback for a guess, narrowing the candidates.
    ///
    /// If this fails, the session is left unchanged.
    pub fn update(&mut self, guess: &str, feedback: &Feedback) -> Result<(), WordleError> {
        self.state.update(guess, feedback)?;
        self.candidates = self.state.filter(&self.candidates);
        self.guessed.push(Arc::from(guess));
        log::debug!(
            "{} ({}) leaves {} candidates",
            guess,
            feedback,
            self.candidates.len()
        );
        Ok(())
    }

    /// The words that could still be the answer.
    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }

    pub fn state(&self) -> &ConstraintState {
        &self.state
    }

    pub fn guessed(&self) -> &[Arc<str>] {
        &self.guessed
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Returns up to `top_n` guesses (or every guess if `None`), from best to worst.
    pub fn select_top_n_guesses(&self, top_n: Option<usize>) -> Vec<ScoredWord> {
        match self.guess_from {
            GuessFrom::PossibleWords => self.scorer.best(&self.candidates, &self.candidates, top_n),
            GuessFrom::AllWords => {
                let unguessed: Vec<Arc<str>> = self
                    .bank
                    .iter()
                    .filter(|word| !self.guessed.contains(*word))
                    .map(Arc::clone)
                    .collect();
                self.scorer.best(&self.candidates, &unguessed, top_n)
            }
        }
    }

    /// Selects the best next guess, or returns `None` if no words are possible.
    ///
    /// Once a single candidate is left, it is guessed without scoring.
    pub fn select_next_guess(&self) -> Option<Arc<str>> {
        match self.candidates.len() {
            0 => None,
            1 => self.candidates.first().map(Arc::clone),
            _ => self
                .select_top_n_guesses(Some(1))
                .into_iter()
                .next()
                .map(|scored| scored.word),
        }
    }
}

impl<S: WordScorer> Guesser for Solver<S> {
    fn update(&mut self, guess: &str, feedback: &Feedback) -> Result<(), WordleError> {
        Solver::update(self, guess, feedback)
    }

    fn select_next_guess(&mut self) -> Option<Arc<str>> {
        Solver::select_next_guess(self)
    }
}

/// Attempts to guess the given word within the maximum number of guesses.
///
/// ```
/// use wordle_ranker::*;
/// use wordle_ranker::scorers::{Scorer, ScorerKind};
///
/// let bank = WordBank::from_iterator(["abc", "abd", "xyz"]).unwrap();
/// let scorer = Scorer::from_config(ScorerKind::Frequency, &SolverConfig::default(), None);
///
/// let result = play_game("abd", 5, Solver::new(bank, scorer, GuessFrom::PossibleWords));
///
/// assert!(matches!(result, GameResult::Success(_)));
/// ```
pub fn play_game<G: Guesser>(answer: &str, max_num_guesses: u32, mut guesser: G) -> GameResult {
    let mut guesses: Vec<Box<str>> = Vec::new();
    for _ in 1..=max_num_guesses {
        let Some(guess) = guesser.select_next_guess() else {
            return GameResult::UnknownWord;
        };
        guesses.push(Box::from(guess.as_ref()));
        let feedback = match get_feedback(&guess, answer) {
            Ok(feedback) => feedback,
            Err(error) => {
                log::warn!("Cannot play {} against {}: {}", guess, answer, error);
                return GameResult::UnknownWord;
            }
        };
        if feedback.is_win() {
            return GameResult::Success(guesses);
        }
        if let Err(error) = guesser.update(&guess, &feedback) {
            log::warn!("Failed to apply {} for {}: {}", feedback, guess, error);
            return GameResult::UnknownWord;
        }
    }
    GameResult::Failure(guesses)
}
