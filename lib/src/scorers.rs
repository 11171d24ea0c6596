use crate::cache::ScoreCache;
use crate::config::FrequencyWeights;
use crate::config::LargeSetScorer;
use crate::config::ReductionWeights;
use crate::config::SolverConfig;
use crate::data::*;
use crate::restrictions::ConstraintState;
use crate::results::compute_encoded;
use crate::results::Feedback;
use crate::results::WordleError;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A guess along with its score. Higher scores are better guesses.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredWord {
    pub word: Arc<str>,
    pub score: f64,
}

/// Gives words a score, where the maximum score indicates the best guess.
///
/// Generally you want to use the [`EntropyScorer`] if you can afford the computation cost, the
/// [`FrequencyScorer`] when the candidate set is large and speed matters, or the
/// [`HybridScorer`] to switch between them based on the number of candidates left.
///
/// All words given to a scorer must only use the letters `a-z`, as guaranteed by a
/// [`WordBank`].
pub trait WordScorer: Send + Sync {
    /// Determines a score for the given word against the remaining candidates. The higher the
    /// score, the better the guess.
    fn score_word(&self, word: &str, candidates: &CandidateSet) -> f64;

    /// Scores every word in `universe` and returns the best `top_n` of them (or all of them if
    /// `top_n` is `None`), ordered by descending score. Ties are ordered by the word.
    ///
    /// The `universe` is usually either the candidates themselves, or the whole word bank to
    /// allow probing guesses that cannot be the answer.
    fn best(
        &self,
        candidates: &CandidateSet,
        universe: &[Arc<str>],
        top_n: Option<usize>,
    ) -> Vec<ScoredWord> {
        let scores = universe
            .par_iter()
            .map(|word| ScoredWord {
                word: Arc::clone(word),
                score: self.score_word(word, candidates),
            })
            .collect();
        sort_scores(scores, top_n)
    }
}

/// Orders the scores from best to worst, breaking ties by the word, then keeps the first
/// `top_n`.
pub fn sort_scores(mut scores: Vec<ScoredWord>, top_n: Option<usize>) -> Vec<ScoredWord> {
    scores.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.word.cmp(&b.word))
    });
    if let Some(top_n) = top_n {
        scores.truncate(top_n);
    }
    scores
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Scores words with cheap letter statistics over the candidates.
///
/// For each unique letter in the word, this rewards how common the letter is across all
/// candidate letters, and how many candidates contain it. It then adds a bonus for letters that
/// are common at their location, and subtracts a penalty that grows faster than linearly with
/// the number of repeated letters, since a repeat probes nothing new.
///
/// This is `O(word_length)` per word once the candidate statistics have been counted.
#[derive(Clone, Debug, Default)]
pub struct FrequencyScorer {
    weights: FrequencyWeights,
}

impl FrequencyScorer {
    pub fn new(weights: FrequencyWeights) -> FrequencyScorer {
        FrequencyScorer { weights }
    }

    /// Scores the word using statistics that were already counted over the candidates.
    pub fn score_with_counter(&self, word: &str, counter: &WordCounter) -> f64 {
        let weights = &self.weights;
        let num_words = counter.num_words() as f64;
        let num_letters = counter.num_letters() as f64;
        let letters = word.as_bytes();

        let mut score = 0.0;
        let mut seen = [false; 26];
        let mut num_unique = 0;
        let mut shared_letters = 0.0;
        for letter in letters {
            let index = (letter - b'a') as usize;
            if seen[index] {
                continue;
            }
            seen[index] = true;
            num_unique += 1;

            let num_with_letter = counter.num_words_with_letter(*letter) as f64;
            score += ratio(counter.num_occurrences_of_letter(*letter) as f64, num_letters)
                * weights.frequency
                + ratio(num_with_letter, num_words) * weights.presence;
            shared_letters += num_with_letter;
        }

        let num_duplicates = (letters.len() - num_unique) as f64;
        score -= weights.duplicate_penalty * num_duplicates.powf(weights.duplicate_exponent);

        let positional: f64 = letters
            .iter()
            .enumerate()
            .map(|(location, letter)| {
                ratio(
                    counter.num_words_with_located_letter(&LocatedLetter::new(
                        *letter,
                        location as u8,
                    )) as f64,
                    counter.num_words_with_location(location) as f64,
                )
            })
            .sum();
        score += positional * weights.positional;

        score + ratio(shared_letters, num_words) * weights.shared_letter
    }
}

impl WordScorer for FrequencyScorer {
    fn score_word(&self, word: &str, candidates: &CandidateSet) -> f64 {
        self.score_with_counter(word, &WordCounter::new(candidates))
    }

    fn best(
        &self,
        candidates: &CandidateSet,
        universe: &[Arc<str>],
        top_n: Option<usize>,
    ) -> Vec<ScoredWord> {
        let counter = WordCounter::new(candidates);
        let scores = universe
            .par_iter()
            .map(|word| ScoredWord {
                word: Arc::clone(word),
                score: self.score_with_counter(word, &counter),
            })
            .collect();
        sort_scores(scores, top_n)
    }
}

/// Scores words by simulating the guess against every candidate as the answer, and measuring
/// how many candidates would be left on average.
///
/// The score is the negated average number of remaining candidates, scaled by
/// [`ReductionWeights::remaining`]. Ties are broken by rewarding letters that appear in exactly
/// one candidate, and penalising letters that appear often relative to the number of
/// candidates.
///
/// **This is `O(candidates^2 * word_length)` per word.**
#[derive(Clone, Debug, Default)]
pub struct ReductionScorer {
    weights: ReductionWeights,
    matrix: Option<Arc<FeedbackMatrix>>,
}

impl ReductionScorer {
    pub fn new(weights: ReductionWeights) -> ReductionScorer {
        ReductionScorer {
            weights,
            matrix: None,
        }
    }

    /// Looks up feedback in the given precomputed matrix instead of computing it.
    pub fn with_matrix(mut self, matrix: Arc<FeedbackMatrix>) -> ReductionScorer {
        self.matrix = Some(matrix);
        self
    }

    /// Computes the average number of candidates left after guessing `word`.
    pub fn average_remaining(&self, word: &str, candidates: &CandidateSet) -> f64 {
        if candidates.is_empty() {
            return 0.0;
        }
        // Every answer with the same feedback leaves the same candidates.
        let mut remaining_by_code: HashMap<u32, usize> = HashMap::new();
        let mut total_remaining = 0;
        for answer in candidates.iter() {
            if answer.len() != word.len() {
                total_remaining += candidates.len();
                continue;
            }
            let code = feedback_code(self.matrix.as_deref(), word, answer);
            total_remaining += *remaining_by_code
                .entry(code)
                .or_insert_with(|| remaining_after(word, code, candidates));
        }
        total_remaining as f64 / candidates.len() as f64
    }

    fn score_with_counter(
        &self,
        word: &str,
        candidates: &CandidateSet,
        counter: &WordCounter,
    ) -> f64 {
        if candidates.is_empty() {
            return 0.0;
        }
        let num_candidates = candidates.len() as f64;
        let mut tie_break = 0.0;
        for letter in word.bytes() {
            let frequency = counter.num_occurrences_of_letter(letter) as f64 / num_candidates;
            tie_break -= self.weights.frequency_penalty * frequency * frequency;
        }
        let mut seen = [false; 26];
        let mut num_discriminating = 0;
        for letter in word.bytes() {
            let index = (letter - b'a') as usize;
            if !seen[index] {
                seen[index] = true;
                if counter.num_words_with_letter(letter) == 1 {
                    num_discriminating += 1;
                }
            }
        }
        tie_break +=
            self.weights.unique_letter_reward * (num_discriminating * num_discriminating) as f64;

        -self.average_remaining(word, candidates) * self.weights.remaining + tie_break
    }
}

fn remaining_after(word: &str, code: u32, candidates: &CandidateSet) -> usize {
    match Feedback::decode(code, word.len())
        .and_then(|feedback| ConstraintState::from_result(word, &feedback))
    {
        Ok(state) => state.count_satisfying(candidates),
        Err(error) => {
            log::warn!("Could not simulate {}: {}", word, error);
            candidates.len()
        }
    }
}

impl WordScorer for ReductionScorer {
    fn score_word(&self, word: &str, candidates: &CandidateSet) -> f64 {
        self.score_with_counter(word, candidates, &WordCounter::new(candidates))
    }

    fn best(
        &self,
        candidates: &CandidateSet,
        universe: &[Arc<str>],
        top_n: Option<usize>,
    ) -> Vec<ScoredWord> {
        let counter = WordCounter::new(candidates);
        let scores = universe
            .par_iter()
            .map(|word| ScoredWord {
                word: Arc::clone(word),
                score: self.score_with_counter(word, candidates, &counter),
            })
            .collect();
        sort_scores(scores, top_n)
    }
}

fn feedback_code(matrix: Option<&FeedbackMatrix>, guess: &str, answer: &str) -> u32 {
    match matrix {
        Some(matrix) => matrix.get_or_compute(guess, answer),
        None => compute_encoded(guess.as_bytes(), answer.as_bytes()),
    }
}

/// Counts how many of the candidates would produce each feedback code if `word` were guessed.
///
/// Candidates with a different length than `word` are ignored. Codes are in ascending order, so
/// summing over the distribution is reproducible.
pub fn pattern_distribution(word: &str, candidates: &[Arc<str>]) -> BTreeMap<u32, usize> {
    distribution_from(None, word, candidates)
}

fn distribution_from(
    matrix: Option<&FeedbackMatrix>,
    word: &str,
    candidates: &[Arc<str>],
) -> BTreeMap<u32, usize> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for answer in candidates.iter().filter(|answer| answer.len() == word.len()) {
        *counts.entry(feedback_code(matrix, word, answer)).or_insert(0) += 1;
    }
    counts
}

fn entropy_of(distribution: &BTreeMap<u32, usize>) -> f64 {
    let total: usize = distribution.values().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    distribution
        .values()
        .map(|count| {
            let probability = *count as f64 / total;
            -probability * probability.log2()
        })
        .sum()
}

/// The Shannon entropy, in bits, of the partition of `candidates` induced by guessing `word`.
///
/// ```
/// use std::sync::Arc;
/// use wordle_ranker::scorers::entropy;
///
/// let candidates: Vec<Arc<str>> = vec![Arc::from("abcx"), Arc::from("abcy")];
///
/// assert_eq!(entropy("abcx", &candidates), 1.0);
/// ```
pub fn entropy(word: &str, candidates: &[Arc<str>]) -> f64 {
    entropy_of(&pattern_distribution(word, candidates))
}

/// Scores words by the expected information gained from guessing them.
///
/// Each word partitions the candidates by the feedback it would receive from each of them. The
/// score is the entropy of that partition, which is between `0` and `log2(candidates)` bits.
/// The maximum is only reached when every candidate would give different feedback.
///
/// **This is `O(candidates)` feedback computations per word**, so scores can be memoized in a
/// [`ScoreCache`] shared across calls, and feedback can be looked up in a precomputed
/// [`FeedbackMatrix`].
#[derive(Clone, Default)]
pub struct EntropyScorer {
    cache: Option<Arc<ScoreCache>>,
    matrix: Option<Arc<FeedbackMatrix>>,
}

impl EntropyScorer {
    pub fn new() -> EntropyScorer {
        EntropyScorer::default()
    }

    /// Memoizes scores in the given cache.
    pub fn with_cache(mut self, cache: Arc<ScoreCache>) -> EntropyScorer {
        self.cache = Some(cache);
        self
    }

    /// Looks up feedback in the given precomputed matrix instead of computing it.
    pub fn with_matrix(mut self, matrix: Arc<FeedbackMatrix>) -> EntropyScorer {
        self.matrix = Some(matrix);
        self
    }

    pub fn cache(&self) -> Option<&Arc<ScoreCache>> {
        self.cache.as_ref()
    }

    fn score_with_fingerprint(
        &self,
        word: &str,
        candidates: &CandidateSet,
        fingerprint: &str,
    ) -> f64 {
        if let Some(cache) = &self.cache {
            if let Some(score) = cache.get(word, fingerprint) {
                return score;
            }
        }
        let score = entropy_of(&distribution_from(
            self.matrix.as_deref(),
            word,
            candidates,
        ));
        if let Some(cache) = &self.cache {
            cache.put(word, fingerprint, score);
        }
        score
    }
}

impl fmt::Debug for EntropyScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntropyScorer")
            .field("cached", &self.cache.is_some())
            .field("precomputed", &self.matrix.is_some())
            .finish()
    }
}

impl WordScorer for EntropyScorer {
    fn score_word(&self, word: &str, candidates: &CandidateSet) -> f64 {
        self.score_with_fingerprint(word, candidates, &candidates.fingerprint())
    }

    fn best(
        &self,
        candidates: &CandidateSet,
        universe: &[Arc<str>],
        top_n: Option<usize>,
    ) -> Vec<ScoredWord> {
        let fingerprint = candidates.fingerprint();
        let scores = universe
            .par_iter()
            .map(|word| ScoredWord {
                word: Arc::clone(word),
                score: self.score_with_fingerprint(word, candidates, &fingerprint),
            })
            .collect();
        if let Some(cache) = &self.cache {
            cache.flush();
            let stats = cache.stats();
            log::debug!(
                "Score cache: {} hits, {} misses, {} writes",
                stats.hits,
                stats.misses,
                stats.writes
            );
        }
        sort_scores(scores, top_n)
    }
}

/// The scorer that [`HybridScorer`] uses once the candidate set is large.
#[derive(Clone, Debug)]
pub enum LargeSetFallback {
    Frequency(FrequencyScorer),
    Entropy(EntropyScorer),
}

/// Uses the [`ReductionScorer`] when fewer than `threshold` candidates remain, and a cheaper
/// scorer otherwise.
#[derive(Clone, Debug)]
pub struct HybridScorer {
    threshold: usize,
    reduction: ReductionScorer,
    fallback: LargeSetFallback,
}

impl HybridScorer {
    pub fn new(
        threshold: usize,
        reduction: ReductionScorer,
        fallback: LargeSetFallback,
    ) -> HybridScorer {
        HybridScorer {
            threshold,
            reduction,
            fallback,
        }
    }

    /// Returns true iff the reduction scorer would be used for these candidates.
    pub fn uses_reduction(&self, candidates: &CandidateSet) -> bool {
        candidates.len() < self.threshold
    }

    fn delegate(&self, candidates: &CandidateSet) -> &dyn WordScorer {
        if self.uses_reduction(candidates) {
            return &self.reduction;
        }
        match &self.fallback {
            LargeSetFallback::Frequency(scorer) => scorer,
            LargeSetFallback::Entropy(scorer) => scorer,
        }
    }
}

impl WordScorer for HybridScorer {
    fn score_word(&self, word: &str, candidates: &CandidateSet) -> f64 {
        self.delegate(candidates).score_word(word, candidates)
    }

    fn best(
        &self,
        candidates: &CandidateSet,
        universe: &[Arc<str>],
        top_n: Option<usize>,
    ) -> Vec<ScoredWord> {
        self.delegate(candidates).best(candidates, universe, top_n)
    }
}

/// Names one of the available scoring strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScorerKind {
    Frequency,
    Reduction,
    Entropy,
    Hybrid,
}

impl FromStr for ScorerKind {
    type Err = WordleError;

    fn from_str(name: &str) -> Result<ScorerKind, WordleError> {
        match name.to_ascii_lowercase().as_str() {
            "frequency" => Ok(ScorerKind::Frequency),
            "reduction" => Ok(ScorerKind::Reduction),
            "entropy" => Ok(ScorerKind::Entropy),
            "hybrid" => Ok(ScorerKind::Hybrid),
            _ => Err(WordleError::UnknownScorer(name.to_string())),
        }
    }
}

impl fmt::Display for ScorerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScorerKind::Frequency => "frequency",
            ScorerKind::Reduction => "reduction",
            ScorerKind::Entropy => "entropy",
            ScorerKind::Hybrid => "hybrid",
        };
        f.write_str(name)
    }
}

/// Any of the scorers in this module.
#[derive(Clone, Debug)]
pub enum Scorer {
    Frequency(FrequencyScorer),
    Reduction(ReductionScorer),
    Entropy(EntropyScorer),
    Hybrid(HybridScorer),
}

impl Scorer {
    /// Builds the named scorer from the config. Entropy scores are memoized in `cache` if
    /// provided.
    ///
    /// ```
    /// use wordle_ranker::SolverConfig;
    /// use wordle_ranker::scorers::{Scorer, ScorerKind};
    ///
    /// let scorer = Scorer::from_config("hybrid".parse().unwrap(), &SolverConfig::default(), None);
    ///
    /// assert_eq!(scorer.kind(), ScorerKind::Hybrid);
    /// ```
    pub fn from_config(
        kind: ScorerKind,
        config: &SolverConfig,
        cache: Option<Arc<ScoreCache>>,
    ) -> Scorer {
        let entropy = || {
            let scorer = EntropyScorer::new();
            match &cache {
                Some(cache) => scorer.with_cache(Arc::clone(cache)),
                None => scorer,
            }
        };
        match kind {
            ScorerKind::Frequency => {
                Scorer::Frequency(FrequencyScorer::new(config.frequency_weights.clone()))
            }
            ScorerKind::Reduction => {
                Scorer::Reduction(ReductionScorer::new(config.reduction_weights.clone()))
            }
            ScorerKind::Entropy => Scorer::Entropy(entropy()),
            ScorerKind::Hybrid => {
                let fallback = match config.hybrid_large_set_scorer {
                    LargeSetScorer::Frequency => LargeSetFallback::Frequency(FrequencyScorer::new(
                        config.frequency_weights.clone(),
                    )),
                    LargeSetScorer::Entropy => LargeSetFallback::Entropy(entropy()),
                };
                Scorer::Hybrid(HybridScorer::new(
                    config.hybrid_threshold,
                    ReductionScorer::new(config.reduction_weights.clone()),
                    fallback,
                ))
            }
        }
    }

    pub fn kind(&self) -> ScorerKind {
        match self {
            Scorer::Frequency(_) => ScorerKind::Frequency,
            Scorer::Reduction(_) => ScorerKind::Reduction,
            Scorer::Entropy(_) => ScorerKind::Entropy,
            Scorer::Hybrid(_) => ScorerKind::Hybrid,
        }
    }

    fn inner(&self) -> &dyn WordScorer {
        match self {
            Scorer::Frequency(scorer) => scorer,
            Scorer::Reduction(scorer) => scorer,
            Scorer::Entropy(scorer) => scorer,
            Scorer::Hybrid(scorer) => scorer,
        }
    }
}

impl WordScorer for Scorer {
    fn score_word(&self, word: &str, candidates: &CandidateSet) -> f64 {
        self.inner().score_word(word, candidates)
    }

    fn best(
        &self,
        candidates: &CandidateSet,
        universe: &[Arc<str>],
        top_n: Option<usize>,
    ) -> Vec<ScoredWord> {
        self.inner().best(candidates, universe, top_n)
    }
}
