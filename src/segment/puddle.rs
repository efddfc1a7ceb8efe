//! PUDDLE: incremental lexicon-based segmentation.
//!
//! The model memorizes every chunk it commits as a word, together with the
//! first and last `window` units of chunks long enough to have them. A known
//! word is cut out of a new utterance only when the units around it look
//! like known word edges: the `window` units before it must end some known
//! chunk, the units after it must begin one.
//!
//! Candidates are tried by ascending start then ascending end, and the first
//! accepted one wins. Whatever precedes it is committed as a chunk of its
//! own, and the search resumes on the remainder.

use crate::counter::Counter;
use crate::defaults;
use crate::error::{Result, WordsegError};
use crate::segment::segmenter::Segmenter;

/// Lexicon and boundary-context tables learned by PUDDLE.
#[derive(Debug, Clone)]
pub struct Puddle {
    window: usize,
    by_frequency: bool,
    lexicon: Counter<String>,
    /// First `window` units of committed chunks.
    beginning: Counter<String>,
    /// Last `window` units of committed chunks.
    ending: Counter<String>,
}

impl Puddle {
    /// Create an empty model. `window` must be at least 1.
    pub fn new(window: usize, by_frequency: bool) -> Result<Self> {
        if window < 1 {
            return Err(WordsegError::invalid_value(
                "puddle.window",
                "must be at least 1",
            ));
        }
        Ok(Self {
            window,
            by_frequency,
            lexicon: Counter::new(),
            beginning: Counter::new(),
            ending: Counter::new(),
        })
    }

    pub fn lexicon(&self) -> &Counter<String> {
        &self.lexicon
    }

    pub fn beginning(&self) -> &Counter<String> {
        &self.beginning
    }

    pub fn ending(&self) -> &Counter<String> {
        &self.ending
    }

    /// Learn from prepared utterances, discarding the segmentation.
    pub fn train<S: AsRef<str>>(&mut self, utterances: &[S]) {
        for utterance in utterances {
            self.segment_utterance(utterance.as_ref(), true);
        }
    }

    /// Segment prepared utterances in order. With `update` false the model
    /// is left untouched.
    pub fn segment<S: AsRef<str>>(&mut self, utterances: &[S], update: bool) -> Vec<String> {
        utterances
            .iter()
            .map(|utterance| self.segment_utterance(utterance.as_ref(), update))
            .collect()
    }

    /// Segment one prepared utterance.
    pub fn segment_utterance(&mut self, utterance: &str, update: bool) -> String {
        let units: Vec<&str> = utterance.split_whitespace().collect();
        let mut words = Vec::new();

        let mut start = 0;
        while start < units.len() {
            let rest = &units[start..];
            match self.find_word(rest) {
                Some((i, j)) => {
                    if i > 0 {
                        self.commit(&rest[..i], update, &mut words);
                    }
                    self.commit(&rest[i..=j], update, &mut words);
                    start += j + 1;
                }
                None => {
                    self.commit(rest, update, &mut words);
                    break;
                }
            }
        }

        words.join(" ")
    }

    /// First acceptable known word in `units`, as inclusive unit indices.
    fn find_word(&self, units: &[&str]) -> Option<(usize, usize)> {
        for i in 0..units.len() {
            for j in i..units.len() {
                if !self.lexicon.contains(units[i..=j].concat().as_str()) {
                    continue;
                }
                let j = if self.by_frequency {
                    self.most_frequent_end(units, i, j)
                } else {
                    j
                };
                if self.has_valid_context(units, i, j) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// End of the most frequent known word starting at `i`, among the ends
    /// from `j` onward. Ties go to the longest.
    fn most_frequent_end(&self, units: &[&str], i: usize, j: usize) -> usize {
        let mut best = (j, self.lexicon.get(units[i..=j].concat().as_str()));
        for k in j + 1..units.len() {
            let count = self.lexicon.get(units[i..=k].concat().as_str());
            if count >= best.1 {
                best = (k, count);
            }
        }
        best.0
    }

    fn has_valid_context(&self, units: &[&str], i: usize, j: usize) -> bool {
        if i > 0 {
            if i < self.window {
                return false;
            }
            let left = units[i - self.window..i].concat();
            if !self.ending.contains(left.as_str()) {
                return false;
            }
        }

        if j + 1 < units.len() {
            let end = (j + 1 + self.window).min(units.len());
            let right = units[j + 1..end].concat();
            if !self.beginning.contains(right.as_str()) {
                return false;
            }
        }

        true
    }

    fn commit(&mut self, chunk: &[&str], update: bool, words: &mut Vec<String>) {
        let word = chunk.concat();
        if update {
            self.lexicon.increment(word.clone());
            if chunk.len() >= self.window {
                self.beginning.increment(chunk[..self.window].concat());
                self.ending
                    .increment(chunk[chunk.len() - self.window..].concat());
            }
        }
        words.push(word);
    }
}

/// Online PUDDLE: every call starts from an empty model and learns while
/// segmenting, so folds never share state.
#[derive(Debug, Clone, Copy)]
pub struct PuddleSegmenter {
    window: usize,
    by_frequency: bool,
}

impl Default for PuddleSegmenter {
    fn default() -> Self {
        Self {
            window: defaults::PUDDLE_WINDOW,
            by_frequency: false,
        }
    }
}

impl PuddleSegmenter {
    pub fn new(window: usize, by_frequency: bool) -> Result<Self> {
        // validate once, up front
        Puddle::new(window, by_frequency)?;
        Ok(Self {
            window,
            by_frequency,
        })
    }

    /// Train a model on `train`, then segment `text` with the model frozen.
    pub fn train_and_segment<S: AsRef<str>, T: AsRef<str>>(
        &self,
        train: &[S],
        text: &[T],
    ) -> Result<Vec<String>> {
        let mut model = Puddle::new(self.window, self.by_frequency)?;
        model.train(train);
        Ok(model.segment(text, false))
    }
}

impl Segmenter for PuddleSegmenter {
    fn segment(&self, utterances: &[String]) -> Result<Vec<String>> {
        let mut model = Puddle::new(self.window, self.by_frequency)?;
        Ok(model.segment(utterances, true))
    }

    fn name(&self) -> &str {
        "puddle"
    }
}
