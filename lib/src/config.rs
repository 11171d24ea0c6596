use crate::cache::DEFAULT_CHECKPOINT_EVERY;
use crate::results::WordleError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Weights for [`FrequencyScorer`](crate::scorers::FrequencyScorer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyWeights {
    /// Multiplies the share of all candidate letters taken by each unique letter.
    pub frequency: f64,
    /// Multiplies the fraction of candidates that contain each unique letter.
    pub presence: f64,
    /// Multiplies the summed per-location frequency of each letter.
    pub positional: f64,
    /// Multiplies the duplicate letter penalty.
    pub duplicate_penalty: f64,
    /// The duplicate penalty grows as `num_duplicates ^ duplicate_exponent`.
    pub duplicate_exponent: f64,
    /// Multiplies the summed presence counts of each unique letter, relative to the number of
    /// candidates.
    pub shared_letter: f64,
}

impl Default for FrequencyWeights {
    fn default() -> Self {
        FrequencyWeights {
            frequency: 70.0,
            presence: 40.0,
            positional: 75.0,
            duplicate_penalty: 20.0,
            duplicate_exponent: 1.5,
            shared_letter: 100.0,
        }
    }
}

/// Weights for [`ReductionScorer`](crate::scorers::ReductionScorer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReductionWeights {
    /// Multiplies the average number of remaining candidates.
    pub remaining: f64,
    /// Rewards letters that are only in one candidate.
    pub unique_letter_reward: f64,
    /// Penalises letters that are common across the candidates.
    pub frequency_penalty: f64,
}

impl Default for ReductionWeights {
    fn default() -> Self {
        ReductionWeights {
            remaining: 100.0,
            unique_letter_reward: 1.0,
            frequency_penalty: 1.0,
        }
    }
}

/// The scorer that [`HybridScorer`](crate::scorers::HybridScorer) uses for large candidate sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LargeSetScorer {
    Frequency,
    Entropy,
}

/// Every tunable used by the solver.
///
/// ```
/// use wordle_ranker::SolverConfig;
///
/// let config = SolverConfig::from_ron_str("(hybrid_threshold: 100)").unwrap();
///
/// assert_eq!(config.hybrid_threshold, 100);
/// assert_eq!(config.frequency_weights, Default::default());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// [`HybridScorer`](crate::scorers::HybridScorer) uses the reduction scorer when fewer than
    /// this many candidates remain.
    pub hybrid_threshold: usize,
    pub hybrid_large_set_scorer: LargeSetScorer,
    pub frequency_weights: FrequencyWeights,
    pub reduction_weights: ReductionWeights,
    /// Where to persist computed scores. Scores are only kept in memory if this is unset.
    pub cache_path: Option<PathBuf>,
    /// How many new scores to buffer before writing them to `cache_path`.
    pub cache_checkpoint_every: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            hybrid_threshold: 250,
            hybrid_large_set_scorer: LargeSetScorer::Frequency,
            frequency_weights: FrequencyWeights::default(),
            reduction_weights: ReductionWeights::default(),
            cache_path: None,
            cache_checkpoint_every: DEFAULT_CHECKPOINT_EVERY,
        }
    }
}

impl SolverConfig {
    /// Parses a config from a RON document. Missing fields take their default values.
    pub fn from_ron_str(contents: &str) -> Result<SolverConfig, WordleError> {
        Ok(ron::from_str(contents)?)
    }

    /// Reads a config from a RON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<SolverConfig, WordleError> {
        SolverConfig::from_ron_str(&fs::read_to_string(path)?)
    }

    /// Serializes this config as a RON document.
    pub fn to_ron_string(&self) -> Result<String, WordleError> {
        Ok(ron::ser::to_string_pretty(self, Default::default())?)
    }
}
