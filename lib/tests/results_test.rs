#[macro_use]
extern crate assert_matches;

use wordle_ranker::*;

#[test]
fn get_feedback_all_match() -> Result<(), WordleError> {
    let feedback = get_feedback("abcb", "abcb")?;

    assert_eq!(feedback.results(), &[LetterResult::Match; 4]);
    assert!(feedback.is_win());
    Ok(())
}

#[test]
fn get_feedback_repeated_guess_letter_consumed_by_match() -> Result<(), WordleError> {
    let feedback = get_feedback("sells", "spelt")?;

    assert_eq!(
        feedback.results(),
        &[
            LetterResult::Match,
            LetterResult::Present,
            LetterResult::Absent,
            LetterResult::Match,
            LetterResult::Absent
        ]
    );
    assert_eq!(feedback.to_string(), "gyxgx");
    assert!(!feedback.is_win());
    Ok(())
}

#[test]
fn get_feedback_displaced_letters() -> Result<(), WordleError> {
    assert_eq!(get_feedback("arise", "raise")?.to_string(), "yyggg");
    Ok(())
}

#[test]
fn get_feedback_partial() -> Result<(), WordleError> {
    assert_eq!(get_feedback("sassy", "mesas")?.to_string(), "yygxx");
    assert_eq!(get_feedback("babb", "abba")?.to_string(), "yygx");
    assert_eq!(get_feedback("bcce", "abcb")?.to_string(), "yxgx");
    Ok(())
}

#[test]
fn get_feedback_repeated_letters() -> Result<(), WordleError> {
    assert_eq!(get_feedback("aab", "abb")?.to_string(), "gxg");
    assert_eq!(get_feedback("eexx", "xeee")?.to_string(), "ygyx");
    assert_eq!(get_feedback("aab", "bba")?.to_string(), "yxy");
    assert_eq!(get_feedback("abac", "caab")?.to_string(), "yygy");
    Ok(())
}

#[test]
fn get_feedback_is_not_symmetric() -> Result<(), WordleError> {
    assert_eq!(get_feedback("ab", "bc")?.to_string(), "xy");
    assert_eq!(get_feedback("bc", "ab")?.to_string(), "yx");
    assert_eq!(get_feedback("spelt", "sells")?.to_string(), "gxygx");
    Ok(())
}

#[test]
fn get_feedback_length_mismatch() {
    assert_matches!(
        get_feedback("abc", "ab"),
        Err(WordleError::LengthMismatch {
            expected: 2,
            actual: 3
        })
    );
}

#[test]
fn get_feedback_rejects_unsupported_letters() {
    assert_matches!(
        get_feedback("abC", "abc"),
        Err(WordleError::InvalidAlphabet('C'))
    );
    assert_matches!(
        get_feedback("abc", "ab-"),
        Err(WordleError::InvalidAlphabet('-'))
    );
}

#[test]
fn get_feedback_rejects_long_words() {
    let word = "a".repeat(MAX_WORD_LENGTH + 1);

    assert_matches!(get_feedback(&word, &word), Err(WordleError::WordLength(_)));
}

#[test]
fn feedback_parse_ignores_case() -> Result<(), WordleError> {
    let feedback: Feedback = "GyX".parse()?;

    assert_eq!(
        feedback.results(),
        &[
            LetterResult::Match,
            LetterResult::Present,
            LetterResult::Absent
        ]
    );
    assert_eq!(feedback.to_string(), "gyx");
    Ok(())
}

#[test]
fn feedback_parse_rejects_unknown_characters() {
    assert_matches!(
        "gyb".parse::<Feedback>(),
        Err(WordleError::InvalidFeedback('b'))
    );
}

#[test]
fn feedback_encode_decode() -> Result<(), WordleError> {
    for text in ["", "g", "xxxxx", "gyxgx", "yyggg", "gyxgyxgyxgyxgyxg"] {
        let feedback: Feedback = text.parse()?;

        assert_eq!(Feedback::decode(feedback.encode(), feedback.len())?, feedback);
    }
    Ok(())
}

#[test]
fn feedback_encode_decode_every_pattern() -> Result<(), WordleError> {
    const RESULTS: [LetterResult; 3] = [
        LetterResult::Absent,
        LetterResult::Present,
        LetterResult::Match,
    ];
    for length in 0..=5u32 {
        let mut codes = std::collections::HashSet::new();
        for pattern in 0..3usize.pow(length) {
            let mut remaining = pattern;
            let mut results = Vec::new();
            for _ in 0..length {
                results.push(RESULTS[remaining % 3]);
                remaining /= 3;
            }
            let feedback = Feedback::new(results)?;

            let code = feedback.encode();

            assert_eq!(Feedback::decode(code, length as usize)?, feedback);
            assert_eq!(feedback.to_string().parse::<Feedback>()?, feedback);
            assert!(codes.insert(code));
        }
        assert_eq!(codes.len(), 3usize.pow(length));
    }
    Ok(())
}

#[test]
fn feedback_encode_places_first_letter_lowest() -> Result<(), WordleError> {
    let feedback: Feedback = "gxxxx".parse()?;

    assert_eq!(feedback.encode(), 0b10);
    assert_eq!(Feedback::all_match(5).encode(), 0b10_10_10_10_10);
    Ok(())
}

#[test]
fn feedback_new_rejects_long_feedback() {
    assert_matches!(
        Feedback::new(vec![LetterResult::Absent; MAX_WORD_LENGTH + 1]),
        Err(WordleError::WordLength(MAX_WORD_LENGTH))
    );
}

#[test]
fn compute_encoded_matches_get_feedback() -> Result<(), WordleError> {
    for (guess, answer) in [("sells", "spelt"), ("arise", "raise"), ("eexx", "xeee")] {
        assert_eq!(
            compute_encoded(guess.as_bytes(), answer.as_bytes()),
            get_feedback(guess, answer)?.encode()
        );
    }
    Ok(())
}
