//! Ranks guesses for Wordle-style puzzles.
//!
//! The typical flow is to load a [`WordBank`], then repeatedly narrow it with a
//! [`ConstraintState`] built from each guess and its [`Feedback`], and [`rank`] the words that
//! remain with one of the [`scorers`]. A [`Solver`] bundles that loop into a single session.
//!
//! Entropy scores are expensive, so they can be memoized across runs in a [`ScoreCache`].

mod cache;
mod config;
mod data;
mod engine;
mod restrictions;
mod results;
pub mod scorers;

pub use cache::CacheRecord;
pub use cache::CacheStats;
pub use cache::CacheStore;
pub use cache::MemoryStore;
pub use cache::RonFileStore;
pub use cache::ScoreCache;
pub use cache::DEFAULT_CHECKPOINT_EVERY;
pub use config::*;
pub use data::CandidateSet;
pub use data::FeedbackMatrix;
pub use data::LocatedLetter;
pub use data::WordBank;
pub use data::WordCounter;
pub use engine::*;
pub use restrictions::ConstraintState;
pub use results::*;
