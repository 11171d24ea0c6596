#[macro_use]
extern crate assert_matches;

use wordle_ranker::scorers::*;
use wordle_ranker::*;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::result::Result;
use std::sync::Arc;

fn candidates(words: &[&str]) -> CandidateSet {
    CandidateSet::new(words.iter().map(|word| Arc::from(*word)))
}

fn arc_words(words: &[&str]) -> Vec<Arc<str>> {
    words.iter().map(|word| Arc::from(*word)).collect()
}

macro_rules! test_scorer {
    ($construct_scorer_fn:ident) => {
        #[test]
        fn solve_wordle() -> Result<(), WordleError> {
            let bank = WordBank::from_iterator(vec![
                "alpha", "allot", "begot", "below", "endow", "ingot",
            ])?;
            let solver = Solver::new(bank.clone(), $construct_scorer_fn(), GuessFrom::AllWords);

            let result = play_game("alpha", bank.len() as u32, solver);

            assert_matches!(result, GameResult::Success(_guesses));
            Ok(())
        }

        #[test]
        fn solve_wordle_from_possible_words() -> Result<(), WordleError> {
            let bank = WordBank::from_iterator(vec![
                "alpha", "allot", "begot", "below", "endow", "ingot",
            ])?;
            let solver =
                Solver::new(bank.clone(), $construct_scorer_fn(), GuessFrom::PossibleWords);

            let result = play_game("endow", bank.len() as u32, solver);

            assert_matches!(result, GameResult::Success(_guesses));
            Ok(())
        }

        #[test]
        fn try_solve_unknown_word() -> Result<(), WordleError> {
            let bank = WordBank::from_iterator(vec![
                "alpha", "allot", "begot", "below", "endow", "ingot",
            ])?;
            let solver = Solver::new(bank.clone(), $construct_scorer_fn(), GuessFrom::AllWords);

            let result = play_game("other", bank.len() as u32 + 1, solver);

            assert_matches!(result, GameResult::UnknownWord);
            Ok(())
        }

        #[test]
        fn best_is_deterministic() {
            let candidates = candidates(&["alpha", "allot", "begot", "below", "endow", "ingot"]);
            let scorer = $construct_scorer_fn();

            let first = scorer.best(&candidates, &candidates, None);
            let second = scorer.best(&candidates, &candidates, None);

            assert_eq!(first, second);
            assert_eq!(first.len(), candidates.len());
            assert!(first.windows(2).all(|pair| {
                pair[0].score > pair[1].score
                    || (pair[0].score == pair[1].score && pair[0].word < pair[1].word)
            }));
        }

        #[test]
        fn best_truncates_to_top_n() {
            let candidates = candidates(&["alpha", "allot", "begot", "below", "endow", "ingot"]);
            let scorer = $construct_scorer_fn();

            let all = scorer.best(&candidates, &candidates, None);
            let top = scorer.best(&candidates, &candidates, Some(2));

            assert_eq!(top, all[..2]);
            assert!(scorer.best(&candidates, &candidates, Some(0)).is_empty());
        }

        #[test]
        fn best_of_empty_universe() {
            let candidates = candidates(&["alpha", "allot"]);
            let scorer = $construct_scorer_fn();

            assert!(scorer.best(&candidates, &[], None).is_empty());
        }
    };
}

mod frequency_scorer {

    use super::*;

    fn create_scorer() -> FrequencyScorer {
        FrequencyScorer::default()
    }

    test_scorer!(create_scorer);

    #[test]
    fn score_word_penalizes_duplicates() {
        let candidates = candidates(&["abcd", "bcda", "cdab"]);
        let scorer = create_scorer();

        assert!(scorer.score_word("abcd", &candidates) > scorer.score_word("aacd", &candidates));
    }

    #[test]
    fn score_word_prefers_common_letters() {
        let candidates = candidates(&["abcd", "abce", "abcf"]);
        let scorer = create_scorer();

        assert!(scorer.score_word("abcd", &candidates) > scorer.score_word("xyzd", &candidates));
        assert!(scorer.score_word("abce", &candidates) > scorer.score_word("bace", &candidates));
    }

    #[test]
    fn score_word_matches_counter() {
        let candidates = candidates(&["abcd", "abce", "abcf"]);
        let scorer = create_scorer();

        assert_eq!(
            scorer.score_word("abcd", &candidates),
            scorer.score_with_counter("abcd", &WordCounter::new(&candidates))
        );
    }
}

mod reduction_scorer {

    use super::*;

    fn create_scorer() -> ReductionScorer {
        ReductionScorer::default()
    }

    test_scorer!(create_scorer);

    #[test]
    fn average_remaining() {
        let candidates = candidates(&["abc", "abd", "abe"]);
        let scorer = create_scorer();

        assert_eq!(scorer.average_remaining("cde", &candidates), 1.0);
        assert_eq!(scorer.average_remaining("abc", &candidates), 5.0 / 3.0);
        assert_eq!(scorer.average_remaining("abc", &CandidateSet::new(vec![])), 0.0);
    }

    #[test]
    fn best_prefers_splitting_probe() {
        let candidates = candidates(&["abc", "abd", "abe"]);
        let scorer = create_scorer();

        let best = scorer.best(&candidates, &arc_words(&["abc", "abd", "cde"]), Some(1));

        assert_eq!(best[0].word.as_ref(), "cde");
    }

    #[test]
    fn precomputed_feedback_gives_same_scores() -> Result<(), WordleError> {
        let bank = WordBank::from_iterator(["alpha", "allot", "begot", "below", "endow", "ingot"])?;
        let candidates = bank.to_candidate_set();
        let matrix = Arc::new(FeedbackMatrix::new(&bank, &bank)?);

        let plain = create_scorer().best(&candidates, &bank, None);
        let precomputed = create_scorer()
            .with_matrix(matrix)
            .best(&candidates, &bank, None);

        assert_eq!(plain, precomputed);
        Ok(())
    }
}

mod entropy_scorer {

    use super::*;

    fn create_scorer() -> EntropyScorer {
        EntropyScorer::new()
    }

    test_scorer!(create_scorer);

    #[test]
    fn entropy_of_even_split_is_one_bit() {
        let candidates = candidates(&["abcx", "abcy"]);

        assert_eq!(entropy("abcx", &candidates), 1.0);
        assert_eq!(create_scorer().score_word("abcx", &candidates), 1.0);
    }

    #[test]
    fn entropy_when_every_candidate_is_distinguished() {
        let candidates = candidates(&["abc", "abd", "abe", "abf"]);

        assert_eq!(entropy("cde", &candidates), 2.0);
        assert_eq!(entropy("cdx", &candidates), 1.5);
    }

    #[test]
    fn entropy_of_single_candidate_is_zero() {
        let candidates = candidates(&["abc"]);

        assert_eq!(entropy("xyz", &candidates), 0.0);
        assert_eq!(entropy("abc", &CandidateSet::new(vec![])), 0.0);
    }

    #[test]
    fn entropy_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let size = rng.gen_range(1..20);
            let candidates = CandidateSet::new((0..size).map(|_| random_word(&mut rng)));
            let guess = random_word(&mut rng);

            let distribution = pattern_distribution(&guess, &candidates);
            let score = entropy(&guess, &candidates);

            assert_eq!(distribution.values().sum::<usize>(), candidates.len());
            let total_probability: f64 = distribution
                .values()
                .map(|count| *count as f64 / candidates.len() as f64)
                .sum();
            assert!((total_probability - 1.0).abs() < 1e-9);
            assert!(score >= 0.0);
            assert!(score <= (candidates.len() as f64).log2() + 1e-9);
        }
    }

    fn random_word(rng: &mut StdRng) -> Arc<str> {
        let alphabet = b"abcd";
        let word: String = (0..3)
            .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
            .collect();
        Arc::from(word.as_str())
    }

    #[test]
    fn cached_scores_are_reused() {
        let cache = Arc::new(ScoreCache::in_memory());
        let scorer = create_scorer().with_cache(Arc::clone(&cache));
        let candidates = candidates(&["alpha", "allot", "begot", "below", "endow", "ingot"]);

        let first = scorer.best(&candidates, &candidates, None);
        assert_eq!(cache.len(), candidates.len());
        assert_eq!(cache.stats().hits, 0);

        let second = scorer.best(&candidates, &candidates, None);
        assert_eq!(first, second);
        assert_eq!(cache.stats().hits, candidates.len() as u64);
        assert_eq!(
            cache.get("alpha", &candidates.fingerprint()),
            Some(entropy("alpha", &candidates))
        );
    }

    #[test]
    fn cache_is_keyed_by_candidates() {
        let cache = Arc::new(ScoreCache::in_memory());
        let scorer = create_scorer().with_cache(Arc::clone(&cache));

        let two = scorer.score_word("abc", &candidates(&["abc", "abd"]));
        let three = scorer.score_word("abc", &candidates(&["abc", "abd", "xyz"]));

        assert_eq!(two, 1.0);
        assert_ne!(two, three);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn cache_is_attached_when_given() {
        let cache = Arc::new(ScoreCache::in_memory());

        let scorer = create_scorer().with_cache(Arc::clone(&cache));

        assert!(scorer
            .cache()
            .is_some_and(|attached| Arc::ptr_eq(attached, &cache)));
        assert!(create_scorer().cache().is_none());
    }
}

mod hybrid_scorer {

    use super::*;

    fn create_scorer() -> HybridScorer {
        HybridScorer::new(
            4,
            ReductionScorer::default(),
            LargeSetFallback::Frequency(FrequencyScorer::default()),
        )
    }

    test_scorer!(create_scorer);

    #[test]
    fn dispatches_by_candidate_count() {
        let small = candidates(&["abc", "abd", "abe"]);
        let large = candidates(&["abc", "abd", "abe", "abf"]);
        let scorer = create_scorer();

        assert!(scorer.uses_reduction(&small));
        assert!(!scorer.uses_reduction(&large));
        assert_eq!(
            scorer.score_word("cde", &small),
            ReductionScorer::default().score_word("cde", &small)
        );
        assert_eq!(
            scorer.score_word("cde", &large),
            FrequencyScorer::default().score_word("cde", &large)
        );
    }

    #[test]
    fn entropy_fallback() {
        let large = candidates(&["abc", "abd", "abe", "abf"]);
        let scorer = HybridScorer::new(
            2,
            ReductionScorer::default(),
            LargeSetFallback::Entropy(EntropyScorer::new()),
        );

        assert_eq!(scorer.score_word("cdx", &large), 1.5);
    }
}

mod scorer {

    use super::*;

    #[test]
    fn scorer_kind_from_str() {
        assert_matches!("entropy".parse::<ScorerKind>(), Ok(ScorerKind::Entropy));
        assert_matches!("Hybrid".parse::<ScorerKind>(), Ok(ScorerKind::Hybrid));
        assert_matches!(
            "bogus".parse::<ScorerKind>(),
            Err(WordleError::UnknownScorer(_))
        );
        assert_eq!(ScorerKind::Reduction.to_string(), "reduction");
    }

    #[test]
    fn from_config_builds_each_kind() {
        let config = SolverConfig::default();
        for kind in [
            ScorerKind::Frequency,
            ScorerKind::Reduction,
            ScorerKind::Entropy,
            ScorerKind::Hybrid,
        ] {
            assert_eq!(Scorer::from_config(kind, &config, None).kind(), kind);
        }
    }

    #[test]
    fn from_config_attaches_cache() {
        let cache = Arc::new(ScoreCache::in_memory());
        let scorer = Scorer::from_config(
            ScorerKind::Entropy,
            &SolverConfig::default(),
            Some(Arc::clone(&cache)),
        );
        let candidates = candidates(&["abcx", "abcy"]);

        assert_eq!(scorer.score_word("abcx", &candidates), 1.0);
        assert_eq!(cache.get("abcx", &candidates.fingerprint()), Some(1.0));
    }

    #[test]
    fn hybrid_from_config_uses_threshold() {
        let config = SolverConfig {
            hybrid_threshold: 3,
            ..Default::default()
        };
        let scorer = Scorer::from_config(ScorerKind::Hybrid, &config, None);
        let small = candidates(&["abc", "abd"]);

        assert_eq!(
            scorer.score_word("cde", &small),
            ReductionScorer::new(config.reduction_weights.clone()).score_word("cde", &small)
        );
    }

    #[test]
    fn sort_scores_breaks_ties_by_word() {
        let scores = vec![
            ScoredWord {
                word: Arc::from("b"),
                score: 1.0,
            },
            ScoredWord {
                word: Arc::from("c"),
                score: 2.0,
            },
            ScoredWord {
                word: Arc::from("a"),
                score: 1.0,
            },
        ];

        let sorted = sort_scores(scores, None);

        let words: Vec<&str> = sorted.iter().map(|scored| scored.word.as_ref()).collect();
        assert_eq!(words, vec!["c", "a", "b"]);
    }
}
