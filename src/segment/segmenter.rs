use crate::error::{Result, WordsegError};
use std::sync::Arc;

/// Trait for word segmentation algorithms.
///
/// Takes prepared utterances (units separated by single spaces) and returns
/// the same number of hypothesis utterances (words separated by single
/// spaces, units of a word concatenated). Implementations only move
/// boundaries: removing every space from input and output yields the same
/// string, line by line.
///
/// Each call owns its model state, so one segmenter can serve several folds
/// concurrently.
pub trait Segmenter: Send + Sync {
    /// Segment prepared utterances into hypothesis utterances.
    fn segment(&self, utterances: &[String]) -> Result<Vec<String>>;

    /// Name for logging/diagnostics.
    fn name(&self) -> &str;
}

/// Implement Segmenter for Arc<T> to allow sharing across workers.
impl<T: Segmenter> Segmenter for Arc<T> {
    fn segment(&self, utterances: &[String]) -> Result<Vec<String>> {
        (**self).segment(utterances)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Join groups of units into a hypothesis utterance.
pub(crate) fn join_words<S: AsRef<str>>(words: &[Vec<S>]) -> String {
    words
        .iter()
        .map(|word| word.iter().map(AsRef::as_ref).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// What a [`MockSegmenter`] does with its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Every unit becomes a word (input returned unchanged).
    EveryUnit,
    /// Every utterance becomes a single word.
    WholeUtterance,
    /// Fail with a runtime error.
    Fail,
    /// Drop the last utterance of the output.
    Truncate,
    /// Panic inside `segment`.
    Panic,
}

/// Mock segmenter for testing
#[derive(Debug, Clone)]
pub struct MockSegmenter {
    name: String,
    behavior: MockBehavior,
}

impl MockSegmenter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            behavior: MockBehavior::EveryUnit,
        }
    }

    pub fn with_behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }
}

impl Segmenter for MockSegmenter {
    fn segment(&self, utterances: &[String]) -> Result<Vec<String>> {
        match self.behavior {
            MockBehavior::EveryUnit => Ok(utterances.to_vec()),
            MockBehavior::WholeUtterance => {
                Ok(utterances.iter().map(|u| u.replace(' ', "")).collect())
            }
            MockBehavior::Fail => Err(WordsegError::SegmenterFailed {
                segmenter: self.name.clone(),
                message: "mock segmentation failure".to_string(),
            }),
            MockBehavior::Truncate => Ok(utterances
                .iter()
                .take(utterances.len().saturating_sub(1))
                .cloned()
                .collect()),
            MockBehavior::Panic => panic!("mock segmenter panicked"),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
