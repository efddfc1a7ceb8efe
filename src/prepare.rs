//! Input validation and conversion of tagged utterances.
//!
//! A tagged utterance carries the gold segmentation through its markers.
//! From it we derive the prepared form (units separated by single spaces,
//! no word information left) that segmenters consume, and the gold form
//! (words separated by single spaces) that evaluation compares against.

use crate::error::{Result, UtteranceFault, WordsegError};
use crate::reporter::ErrorReporter;
use crate::separator::{Level, Separator};
use serde::{Deserialize, Serialize};

/// How a corpus pass reacts to an invalid utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Abort at the first invalid utterance.
    #[default]
    Strict,
    /// Skip, report and count invalid utterances.
    Tolerant,
}

/// Check a tagged utterance is well-formed.
///
/// The word separator of `separator` must be defined.
pub fn check_utterance(text: &str, separator: &Separator) -> std::result::Result<(), UtteranceFault> {
    if text.trim().is_empty() {
        return Err(UtteranceFault::Empty);
    }

    if separator
        .remove(text, None)
        .chars()
        .any(|c| c.is_ascii_punctuation())
    {
        return Err(UtteranceFault::Punctuation);
    }

    if !separator.ends_with_marker(text, Level::Word) {
        return Err(UtteranceFault::MissingWordSeparator);
    }

    if separator.starts_with_marker(text) {
        return Err(UtteranceFault::LeadingSeparator);
    }

    Ok(())
}

/// Convert a tagged utterance into segmenter input: the `unit`-level tokens
/// separated by single spaces.
pub fn prepare(text: &str, separator: &Separator, unit: Level) -> Result<String> {
    check_unit(separator, unit)?;
    Ok(separator.tokenize(text, unit, false).join(" "))
}

/// Convert a tagged utterance into its gold segmentation.
pub fn gold(text: &str, separator: &Separator) -> String {
    separator.tokenize(text, Level::Word, false).join(" ")
}

/// Prepared corpus with its aligned gold.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Prepared {
    pub utterances: Vec<String>,
    pub gold: Vec<String>,
    /// 1-based line numbers of skipped utterances (tolerant mode only).
    pub skipped: Vec<usize>,
}

/// Validate and prepare a whole tagged corpus.
pub fn prepare_corpus<S: AsRef<str>>(
    lines: &[S],
    separator: &Separator,
    unit: Level,
    mode: Mode,
    reporter: &dyn ErrorReporter,
) -> Result<Prepared> {
    check_unit(separator, unit)?;

    let mut prepared = Prepared::default();
    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if let Err(reason) = check_utterance(line, separator) {
            let error = WordsegError::InvalidUtterance {
                line: index + 1,
                reason,
                utterance: line.to_string(),
            };
            match mode {
                Mode::Strict => return Err(error),
                Mode::Tolerant => {
                    reporter.report("prepare", &error);
                    prepared.skipped.push(index + 1);
                    continue;
                }
            }
        }

        prepared
            .utterances
            .push(separator.tokenize(line, unit, false).join(" "));
        prepared.gold.push(gold(line, separator));
    }

    Ok(prepared)
}

fn check_unit(separator: &Separator, unit: Level) -> Result<()> {
    if unit == Level::Word {
        return Err(WordsegError::invalid_value(
            "unit",
            "unit must be phone or syllable",
        ));
    }
    if separator.get(unit).is_none() {
        return Err(WordsegError::invalid_value(
            "unit",
            format!("no {unit} separator defined"),
        ));
    }
    if separator.get(Level::Word).is_none() {
        return Err(WordsegError::invalid_value(
            "separator.word",
            "a word separator is required",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::NullReporter;
    use std::sync::Mutex;

    const TAGGED: &str = "hh ax l ;esyll ow ;esyll ;eword w er l d ;esyll ;eword ";

    #[derive(Default)]
    struct Collector {
        seen: Mutex<Vec<String>>,
    }

    impl ErrorReporter for Collector {
        fn report(&self, stage: &str, error: &WordsegError) {
            self.seen
                .lock()
                .unwrap()
                .push(format!("{stage}: {error}"));
        }
    }

    #[test]
    fn test_check_valid_utterance() {
        assert_eq!(check_utterance(TAGGED, &Separator::default()), Ok(()));
    }

    #[test]
    fn test_check_empty() {
        let sep = Separator::default();
        assert_eq!(check_utterance("", &sep), Err(UtteranceFault::Empty));
        assert_eq!(check_utterance("   ", &sep), Err(UtteranceFault::Empty));
    }

    #[test]
    fn test_check_punctuation() {
        let sep = Separator::default();
        assert_eq!(
            check_utterance("hh ax , l ;eword", &sep),
            Err(UtteranceFault::Punctuation)
        );
        // marker characters are not punctuation
        assert_eq!(check_utterance("a ;esyll b ;eword", &sep), Ok(()));
    }

    #[test]
    fn test_check_missing_word_separator() {
        let sep = Separator::default();
        assert_eq!(
            check_utterance("hh ax ;eword l ow", &sep),
            Err(UtteranceFault::MissingWordSeparator)
        );
        assert_eq!(
            check_utterance("hh ax ;esyll", &sep),
            Err(UtteranceFault::MissingWordSeparator)
        );
    }

    #[test]
    fn test_check_leading_separator() {
        let sep = Separator::default();
        assert_eq!(
            check_utterance(";esyll hh ax ;eword", &sep),
            Err(UtteranceFault::LeadingSeparator)
        );
        assert_eq!(
            check_utterance(" ;eword hh ax ;eword", &sep),
            Err(UtteranceFault::LeadingSeparator)
        );
    }

    #[test]
    fn test_prepare_phone_and_syllable() {
        let sep = Separator::default();
        assert_eq!(prepare(TAGGED, &sep, Level::Phone).unwrap(), "hh ax l ow w er l d");
        assert_eq!(prepare(TAGGED, &sep, Level::Syllable).unwrap(), "hhaxl ow werld");
    }

    #[test]
    fn test_prepare_rejects_word_unit() {
        let err = prepare(TAGGED, &Separator::default(), Level::Word).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_prepare_rejects_undefined_unit() {
        let sep = Separator::new(Some(" "), None, Some(";eword")).unwrap();
        assert!(prepare("a b ;eword", &sep, Level::Syllable).is_err());
    }

    #[test]
    fn test_gold() {
        assert_eq!(gold(TAGGED, &Separator::default()), "hhaxlow werld");
    }

    #[test]
    fn test_prepared_and_gold_share_content() {
        let sep = Separator::default();
        let prepared = prepare(TAGGED, &sep, Level::Phone).unwrap();
        assert_eq!(prepared.replace(' ', ""), gold(TAGGED, &sep).replace(' ', ""));
        assert_eq!(prepared.replace(' ', ""), sep.remove(TAGGED, None));
    }

    #[test]
    fn test_prepare_corpus_strict_aborts() {
        let lines = ["a b ;eword", "c , d ;eword", "e ;eword"];
        let err = prepare_corpus(&lines, &Separator::default(), Level::Phone, Mode::Strict, &NullReporter)
            .unwrap_err();
        match err {
            WordsegError::InvalidUtterance { line, reason, .. } => {
                assert_eq!(line, 2);
                assert_eq!(reason, UtteranceFault::Punctuation);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_prepare_corpus_tolerant_skips() {
        let lines = ["a b ;eword", "", "c d ;eword e ;eword", "f g"];
        let reporter = Collector::default();
        let prepared = prepare_corpus(
            &lines,
            &Separator::default(),
            Level::Phone,
            Mode::Tolerant,
            &reporter,
        )
        .unwrap();

        assert_eq!(prepared.utterances, vec!["a b", "c d e"]);
        assert_eq!(prepared.gold, vec!["ab", "cd e"]);
        assert_eq!(prepared.skipped, vec![2, 4]);
        assert_eq!(reporter.seen.lock().unwrap().len(), 2);
    }
}
