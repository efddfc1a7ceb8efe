//! Scoring of hypothesis segmentations against gold.
//!
//! Both sides are one utterance per line, words separated by spaces. Three
//! views of a segmentation are compared:
//!
//! - types: the vocabulary of distinct words over the whole corpus,
//! - tokens: the `(start, end)` character span of every word of a line,
//! - boundaries: the start of every word but the first of a line.
//!
//! Each view yields precision, recall and F-score.

use crate::error::{Result, WordsegError};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Counts for one view of the segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Accumulator {
    /// Items proposed by the hypothesis.
    pub hypothesis: usize,
    /// Items in the gold.
    pub gold: usize,
    /// Items present in both.
    pub correct: usize,
    /// Lines where hypothesis and gold items are identical.
    pub exact: usize,
    pub lines: usize,
}

impl Accumulator {
    /// Add the items of one line.
    pub fn update<T: Eq + std::hash::Hash>(&mut self, hypothesis: &HashSet<T>, gold: &HashSet<T>) {
        let correct = hypothesis.intersection(gold).count();
        self.hypothesis += hypothesis.len();
        self.gold += gold.len();
        self.correct += correct;
        self.lines += 1;
        if correct == hypothesis.len() && correct == gold.len() {
            self.exact += 1;
        }
    }

    pub fn precision(&self) -> f64 {
        ratio(self.correct, self.hypothesis)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.correct, self.gold)
    }

    pub fn fscore(&self) -> f64 {
        ratio(2 * self.correct, self.hypothesis + self.gold)
    }

    /// Share of lines segmented exactly right.
    pub fn exact_match(&self) -> f64 {
        ratio(self.exact, self.lines)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    num as f64 / (den as f64).max(f64::EPSILON)
}

/// The three accumulators of a scored corpus.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Evaluation {
    pub types: Accumulator,
    pub tokens: Accumulator,
    pub boundaries: Accumulator,
}

/// The nine scores of an [`Evaluation`], in reporting order. A score is
/// `None` when its denominator is zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Metrics {
    pub type_precision: Option<f64>,
    pub type_recall: Option<f64>,
    pub type_fscore: Option<f64>,
    pub token_precision: Option<f64>,
    pub token_recall: Option<f64>,
    pub token_fscore: Option<f64>,
    pub boundary_precision: Option<f64>,
    pub boundary_recall: Option<f64>,
    pub boundary_fscore: Option<f64>,
}

impl Metrics {
    /// Name and value of every score, in reporting order.
    pub fn entries(&self) -> [(&'static str, Option<f64>); 9] {
        [
            ("type_precision", self.type_precision),
            ("type_recall", self.type_recall),
            ("type_fscore", self.type_fscore),
            ("token_precision", self.token_precision),
            ("token_recall", self.token_recall),
            ("token_fscore", self.token_fscore),
            ("boundary_precision", self.boundary_precision),
            ("boundary_recall", self.boundary_recall),
            ("boundary_fscore", self.boundary_fscore),
        ]
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.entries() {
            match value {
                Some(value) => writeln!(f, "{name:<20}{value:.4}")?,
                None => writeln!(f, "{name:<20}None")?,
            }
        }
        Ok(())
    }
}

impl Evaluation {
    pub fn metrics(&self) -> Metrics {
        let defined = |den: usize, value: f64| (den > 0).then_some(value);
        let (ty, tok, bound) = (&self.types, &self.tokens, &self.boundaries);
        Metrics {
            type_precision: defined(ty.hypothesis, ty.precision()),
            type_recall: defined(ty.gold, ty.recall()),
            type_fscore: defined(ty.hypothesis + ty.gold, ty.fscore()),
            token_precision: defined(tok.hypothesis, tok.precision()),
            token_recall: defined(tok.gold, tok.recall()),
            token_fscore: defined(tok.hypothesis + tok.gold, tok.fscore()),
            boundary_precision: defined(bound.hypothesis, bound.precision()),
            boundary_recall: defined(bound.gold, bound.recall()),
            boundary_fscore: defined(bound.hypothesis + bound.gold, bound.fscore()),
        }
    }
}

/// Score `hypothesis` against `gold`.
///
/// Both must have the same number of lines and, spaces aside, the same
/// characters on every line.
pub fn evaluate<H: AsRef<str>, G: AsRef<str>>(hypothesis: &[H], gold: &[G]) -> Result<Evaluation> {
    if hypothesis.len() != gold.len() {
        return Err(WordsegError::LengthMismatch {
            gold: gold.len(),
            hypothesis: hypothesis.len(),
        });
    }

    let mut evaluation = Evaluation::default();
    let mut hyp_vocabulary = HashSet::new();
    let mut gold_vocabulary = HashSet::new();

    for (n, (hyp, reference)) in hypothesis.iter().zip(gold).enumerate() {
        let (hyp, reference) = (hyp.as_ref(), reference.as_ref());
        let hyp_words: Vec<&str> = hyp.split_whitespace().collect();
        let gold_words: Vec<&str> = reference.split_whitespace().collect();
        if hyp_words.concat() != gold_words.concat() {
            return Err(WordsegError::ContentMismatch {
                line: n + 1,
                gold: reference.to_string(),
                hypothesis: hyp.to_string(),
            });
        }

        let hyp_spans = spans(&hyp_words);
        let gold_spans = spans(&gold_words);
        evaluation.tokens.update(&hyp_spans, &gold_spans);
        evaluation
            .boundaries
            .update(&boundaries(&hyp_spans), &boundaries(&gold_spans));

        hyp_vocabulary.extend(hyp_words);
        gold_vocabulary.extend(gold_words);
    }

    evaluation.types.update(&hyp_vocabulary, &gold_vocabulary);
    Ok(evaluation)
}

/// Character span of every word, walking the concatenated line.
fn spans(words: &[&str]) -> HashSet<(usize, usize)> {
    let mut start = 0;
    words
        .iter()
        .map(|word| {
            let end = start + word.chars().count();
            let span = (start, end);
            start = end;
            span
        })
        .collect()
}

/// Word starts inside the line; the line start is not a decision.
fn boundaries(spans: &HashSet<(usize, usize)>) -> HashSet<usize> {
    spans
        .iter()
        .map(|&(start, _)| start)
        .filter(|&start| start > 0)
        .collect()
}
