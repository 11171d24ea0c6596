use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use rand::seq::SliceRandom;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use wordle_ranker::scorers::*;
use wordle_ranker::*;

/// Ranks the best guesses for a Wordle-style puzzle.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to a file that contains a list of possible words, with one word on each line.
    #[arg(short = 'f', long)]
    words_file: PathBuf,

    /// Path to a RON file with solver settings.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to persist computed scores. Overrides `cache_path` from the config file.
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Logs more detail. Repeat for even more. `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ranks the next guesses, given the guesses made so far.
    Rank {
        /// A guess and its feedback as `WORD:FEEDBACK`, where the feedback uses `g` for a match,
        /// `y` for present elsewhere, and `x` for absent. May be repeated.
        #[arg(short, long = "guess", value_parser = parse_guess)]
        guesses: Vec<(String, Feedback)>,

        /// One of: frequency, reduction, entropy, hybrid.
        #[arg(short, long, default_value = "entropy")]
        scorer: ScorerKind,

        /// How many guesses to show, or 0 to show all of them.
        #[arg(short = 'n', long, default_value_t = 10)]
        top: usize,

        /// Which words to consider as guesses.
        #[arg(long, value_enum, default_value_t = GuessFromArg::Possible)]
        from: GuessFromArg,
    },
    /// Plays a single game against the given word, or a random word from the word list.
    Solve {
        word: Option<String>,

        /// One of: frequency, reduction, entropy, hybrid.
        #[arg(short, long, default_value = "hybrid")]
        scorer: ScorerKind,

        #[arg(short, long, default_value_t = 128)]
        max_guesses: u32,

        /// Which words to consider as guesses.
        #[arg(long, value_enum, default_value_t = GuessFromArg::All)]
        from: GuessFromArg,
    },
    /// Computes the entropy of every word against the full word list, filling the score cache.
    Precompute {
        /// Precomputes feedback for every pair of words first. This needs memory proportional
        /// to the square of the number of words.
        #[arg(long)]
        matrix: bool,

        /// How many of the best opening guesses to show.
        #[arg(short = 'n', long, default_value_t = 10)]
        top: usize,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum GuessFromArg {
    /// Only words that could still be the answer.
    Possible,
    /// Any word from the word list that has not been guessed yet.
    All,
}

impl From<GuessFromArg> for GuessFrom {
    fn from(arg: GuessFromArg) -> GuessFrom {
        match arg {
            GuessFromArg::Possible => GuessFrom::PossibleWords,
            GuessFromArg::All => GuessFrom::AllWords,
        }
    }
}

fn parse_guess(guess: &str) -> Result<(String, Feedback), String> {
    let (word, feedback) = guess
        .split_once(':')
        .ok_or_else(|| format!("expected WORD:FEEDBACK, got {:?}", guess))?;
    let feedback: Feedback = feedback.parse().map_err(|error: WordleError| error.to_string())?;
    Ok((word.trim().to_lowercase(), feedback))
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {}", error);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(args: Args) -> Result<ExitCode, WordleError> {
    let start_time = Instant::now();
    let mut config = match &args.config {
        Some(path) => SolverConfig::from_path(path)?,
        None => SolverConfig::default(),
    };
    if args.cache.is_some() {
        config.cache_path = args.cache;
    }
    log::debug!("Using {:?}", config);

    let words_reader = io::BufReader::new(File::open(&args.words_file)?);
    let word_bank = WordBank::from_reader(words_reader)?;
    log::info!(
        "Loaded {} words from {}",
        word_bank.len(),
        args.words_file.display()
    );
    let cache = open_cache(&config);

    let code = match args.command {
        Command::Rank {
            guesses,
            scorer,
            top,
            from,
        } => {
            let scorer = Scorer::from_config(scorer, &config, Some(Arc::clone(&cache)));
            rank_guesses(word_bank, scorer, &guesses, top, from.into())?
        }
        Command::Solve {
            word,
            scorer,
            max_guesses,
            from,
        } => {
            let scorer = Scorer::from_config(scorer, &config, Some(Arc::clone(&cache)));
            play_single_game(word, word_bank, scorer, max_guesses, from.into())
        }
        Command::Precompute { matrix, top } => {
            if config.cache_path.is_none() {
                log::warn!("No cache path is configured, so scores will not be persisted");
            }
            precompute(&word_bank, Arc::clone(&cache), matrix, top)?
        }
    };

    cache.flush();
    log::info!(
        "Command executed in {:.3}s.",
        start_time.elapsed().as_secs_f64()
    );
    Ok(code)
}

fn open_cache(config: &SolverConfig) -> Arc<ScoreCache> {
    let Some(path) = &config.cache_path else {
        return Arc::new(ScoreCache::in_memory());
    };
    match ScoreCache::open_file(path, config.cache_checkpoint_every) {
        Ok(cache) => Arc::new(cache),
        Err(error) => {
            log::warn!(
                "Could not open score cache {}, continuing without it: {}",
                path.display(),
                error
            );
            Arc::new(ScoreCache::in_memory())
        }
    }
}

fn rank_guesses(
    word_bank: WordBank,
    scorer: Scorer,
    guesses: &[(String, Feedback)],
    top: usize,
    guess_from: GuessFrom,
) -> Result<ExitCode, WordleError> {
    let mut solver = Solver::new(word_bank, scorer, guess_from);
    for (guess, feedback) in guesses {
        solver.update(guess, feedback)?;
    }

    let candidates = solver.candidates();
    println!("There are {} possible words.", candidates.len());
    if candidates.is_empty() {
        eprintln!("No words match this feedback. Please check that it was entered correctly.");
        return Ok(ExitCode::FAILURE);
    }

    let top_n = if top == 0 { None } else { Some(top) };
    for (index, scored) in solver.select_top_n_guesses(top_n).iter().enumerate() {
        let note = if candidates.contains(&scored.word) {
            ""
        } else {
            " (cannot be the answer)"
        };
        println!(
            "{:>4}. {}  {:.4}{}",
            index + 1,
            scored.word,
            scored.score,
            note
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn play_single_game(
    word: Option<String>,
    word_bank: WordBank,
    scorer: Scorer,
    max_guesses: u32,
    guess_from: GuessFrom,
) -> ExitCode {
    let word = match word {
        Some(word) => word.trim().to_lowercase(),
        None => match word_bank.choose(&mut rand::thread_rng()) {
            Some(word) => word.to_string(),
            None => {
                eprintln!("Error: the word list is empty.");
                return ExitCode::FAILURE;
            }
        },
    };
    println!("Guessing {}.", word);

    let solver = Solver::new(word_bank, scorer, guess_from);
    match play_game(&word, max_guesses, solver) {
        GameResult::Success(guesses) => {
            println!("Solved it! It took me {} guesses.", guesses.len());
            for guess in guesses.iter() {
                println!("\t{}", guess);
            }
            ExitCode::SUCCESS
        }
        GameResult::Failure(guesses) => {
            println!(
                "I still couldn't solve it after {} guesses :(",
                guesses.len()
            );
            for guess in guesses.iter() {
                println!("\t{}", guess);
            }
            ExitCode::FAILURE
        }
        GameResult::UnknownWord => {
            eprintln!("Error: given word not in the word list.");
            ExitCode::FAILURE
        }
    }
}

fn precompute(
    word_bank: &WordBank,
    cache: Arc<ScoreCache>,
    use_matrix: bool,
    top: usize,
) -> Result<ExitCode, WordleError> {
    let mut scorer = EntropyScorer::new().with_cache(Arc::clone(&cache));
    if use_matrix {
        let start_time = Instant::now();
        let matrix = FeedbackMatrix::new(word_bank, word_bank)?;
        log::info!(
            "Computed {} feedback codes in {:.3}s.",
            matrix.len(),
            start_time.elapsed().as_secs_f64()
        );
        scorer = scorer.with_matrix(Arc::new(matrix));
    }

    let candidates = word_bank.to_candidate_set();
    let best = scorer.best(&candidates, word_bank, None);
    let stats = cache.stats();
    println!(
        "Scored {} words ({} already cached).",
        best.len(),
        stats.hits
    );
    for (index, scored) in best.iter().take(top).enumerate() {
        println!("{:>4}. {}  {:.4}", index + 1, scored.word, scored.score);
    }
    Ok(ExitCode::SUCCESS)
}
