//! Transitional-probability segmentation.
//!
//! All utterances are read as one stream of units, each utterance preceded by
//! an utterance-boundary pseudo-token. A dependency measure is computed for
//! every observed pair of adjacent tokens, and boundaries are placed where
//! the measure dips, either below the global mean (absolute threshold) or
//! below both neighbouring pairs (relative threshold).

use crate::counter::Counter;
use crate::error::{Result, WordsegError};
use crate::segment::segmenter::{Segmenter, join_words};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// `None` stands for the utterance-boundary pseudo-token.
type Token<'a> = Option<&'a str>;

/// Where boundaries are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Threshold {
    /// Boundary at local minima of the dependency measure.
    #[default]
    Relative,
    /// Boundary where the measure is at most the mean over distinct pairs.
    Absolute,
}

impl FromStr for Threshold {
    type Err = WordsegError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "relative" => Ok(Threshold::Relative),
            "absolute" => Ok(Threshold::Absolute),
            other => Err(WordsegError::invalid_value(
                "tp.threshold",
                format!("unknown threshold '{other}', expected relative or absolute"),
            )),
        }
    }
}

/// Dependency measure between two adjacent units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dependency {
    /// Forward transitional probability, P(next | current).
    #[default]
    Ftp,
    /// Backward transitional probability, P(current | next).
    Btp,
    /// Pointwise mutual information, in bits.
    Mi,
}

impl FromStr for Dependency {
    type Err = WordsegError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ftp" | "forward" => Ok(Dependency::Ftp),
            "btp" | "backward" => Ok(Dependency::Btp),
            "mi" => Ok(Dependency::Mi),
            other => Err(WordsegError::invalid_value(
                "tp.dependency",
                format!("unknown dependency '{other}', expected ftp, btp or mi"),
            )),
        }
    }
}

/// Stateless transitional-probability segmenter.
#[derive(Debug, Clone, Copy, Default)]
pub struct TpSegmenter {
    threshold: Threshold,
    dependency: Dependency,
}

impl TpSegmenter {
    pub fn new(threshold: Threshold, dependency: Dependency) -> Self {
        Self {
            threshold,
            dependency,
        }
    }
}

impl Segmenter for TpSegmenter {
    fn segment(&self, utterances: &[String]) -> Result<Vec<String>> {
        let stream: Vec<Token<'_>> = utterances
            .iter()
            .flat_map(|utt| std::iter::once(None).chain(utt.split_whitespace().map(Some)))
            .collect();
        if stream.is_empty() {
            return Ok(Vec::new());
        }

        let scores = dependencies(&stream, self.dependency);
        let boundaries = match self.threshold {
            Threshold::Absolute => absolute_boundaries(&stream, &scores),
            Threshold::Relative => relative_boundaries(&stream, &scores),
        };

        Ok(rebuild(&stream, &boundaries))
    }

    fn name(&self) -> &str {
        "tp"
    }
}

/// Dependency measure of every distinct adjacent pair of the stream.
fn dependencies<'a>(
    stream: &[Token<'a>],
    dependency: Dependency,
) -> HashMap<(Token<'a>, Token<'a>), f64> {
    let unigrams: Counter<Token<'a>> = stream.iter().copied().collect();
    let bigrams: Counter<(Token<'a>, Token<'a>)> =
        stream.windows(2).map(|w| (w[0], w[1])).collect();

    let nunits = stream.len() as f64;
    let npairs = (stream.len() - 1) as f64;

    bigrams
        .iter()
        .map(|(&(a, b), &count)| {
            let count = count as f64;
            let score = match dependency {
                Dependency::Ftp => count / unigrams.get(&a) as f64,
                Dependency::Btp => count / unigrams.get(&b) as f64,
                Dependency::Mi => {
                    let pa = unigrams.get(&a) as f64 / nunits;
                    let pb = unigrams.get(&b) as f64 / nunits;
                    ((count / npairs) / (pa * pb)).log2()
                }
            };
            ((a, b), score)
        })
        .collect()
}

fn score<'a>(scores: &HashMap<(Token<'a>, Token<'a>), f64>, a: Token<'a>, b: Token<'a>) -> f64 {
    scores.get(&(a, b)).copied().unwrap_or(0.0)
}

/// `boundaries[i]` is true when a word ends between `stream[i]` and `stream[i + 1]`.
fn absolute_boundaries<'a>(
    stream: &[Token<'a>],
    scores: &HashMap<(Token<'a>, Token<'a>), f64>,
) -> Vec<bool> {
    // unweighted: each distinct pair counts once
    let mean = scores.values().sum::<f64>() / scores.len().max(1) as f64;

    stream
        .windows(2)
        .map(|w| w[0].is_none() || w[1].is_none() || score(scores, w[0], w[1]) <= mean)
        .collect()
}

fn relative_boundaries<'a>(
    stream: &[Token<'a>],
    scores: &HashMap<(Token<'a>, Token<'a>), f64>,
) -> Vec<bool> {
    (0..stream.len().saturating_sub(1))
        .map(|i| {
            let (cur, next) = (stream[i], stream[i + 1]);
            if cur.is_none() || next.is_none() {
                return true;
            }
            // only pairs with a neighbour on both sides are decided
            if i == 0 || i + 2 >= stream.len() {
                return false;
            }
            let before = score(scores, stream[i - 1], cur);
            let here = score(scores, cur, next);
            let after = score(scores, next, stream[i + 2]);
            before > here && here < after
        })
        .collect()
}

/// Turn the boundary decisions back into one hypothesis per utterance.
fn rebuild(stream: &[Token<'_>], boundaries: &[bool]) -> Vec<String> {
    let mut utterances: Vec<Vec<Vec<&str>>> = Vec::new();

    for (i, token) in stream.iter().enumerate() {
        match token {
            None => utterances.push(Vec::new()),
            Some(unit) => {
                let Some(words) = utterances.last_mut() else {
                    continue;
                };
                let new_word = i == 0 || boundaries[i - 1] || words.is_empty();
                if new_word {
                    words.push(vec![*unit]);
                } else if let Some(word) = words.last_mut() {
                    word.push(*unit);
                }
            }
        }
    }

    utterances.iter().map(|words| join_words(words)).collect()
}
