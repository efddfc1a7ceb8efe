//! DIBS: diphone-based segmentation.
//!
//! A word-marked training corpus is summarized once into diphone statistics
//! ([`CorpusSummary`]). A [`DibsModel`] turns the summary into a boundary
//! probability for every observed diphone, and [`DibsSegmenter`] places a
//! boundary between two adjacent units when that probability exceeds a
//! threshold. Diphones never seen in training always get a boundary.

use crate::counter::Counter;
use crate::defaults;
use crate::error::{Result, UtteranceFault, WordsegError};
use crate::segment::segmenter::{Segmenter, join_words};
use crate::separator::{Level, Separator};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

type Diphone = (String, String);

/// Statistics of a word-marked corpus, built in a single pass.
#[derive(Debug, Clone, Default)]
pub struct CorpusSummary {
    nlines: usize,
    nwords: usize,
    nunits: usize,
    phrase_initial: Counter<String>,
    phrase_final: Counter<String>,
    internal: Counter<Diphone>,
    spanning: Counter<Diphone>,
    lexicon: Counter<Vec<String>>,
}

impl CorpusSummary {
    /// Summarize tagged utterances, reading units at `unit` level.
    ///
    /// Every line must contain a word marker and at least one unit.
    pub fn from_tagged<S: AsRef<str>>(
        lines: &[S],
        separator: &Separator,
        unit: Level,
    ) -> Result<Self> {
        if unit == Level::Word || separator.get(unit).is_none() {
            return Err(WordsegError::invalid_value(
                "dibs.unit",
                format!("no usable {unit} separator to read units"),
            ));
        }
        if separator.get(Level::Word).is_none() {
            return Err(WordsegError::invalid_value(
                "separator.word",
                "DIBS training requires a word separator",
            ));
        }

        let mut summary = Self::default();
        for (index, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            if !separator.contains(line, Level::Word) {
                return Err(WordsegError::MissingWordMarker {
                    line: index + 1,
                    utterance: line.to_string(),
                });
            }

            let words: Vec<Vec<String>> = separator
                .tokenize(line, Level::Word, true)
                .iter()
                .map(|word| separator.tokenize(word, unit, false))
                .filter(|units| !units.is_empty())
                .collect();
            if words.is_empty() {
                return Err(WordsegError::InvalidUtterance {
                    line: index + 1,
                    reason: UtteranceFault::Empty,
                    utterance: line.to_string(),
                });
            }
            summary.add_words(words);
        }

        Ok(summary)
    }

    fn add_words(&mut self, words: Vec<Vec<String>>) {
        let (Some(first), Some(last)) = (
            words.first().and_then(|w| w.first()),
            words.last().and_then(|w| w.last()),
        ) else {
            return;
        };
        self.phrase_initial.increment(first.clone());
        self.phrase_final.increment(last.clone());
        self.nlines += 1;
        self.nwords += words.len();

        for (n, word) in words.iter().enumerate() {
            self.nunits += word.len();
            for pair in word.windows(2) {
                self.internal.increment((pair[0].clone(), pair[1].clone()));
            }
            if let (Some(end), Some(next)) = (
                word.last(),
                words.get(n + 1).and_then(|w| w.first()),
            ) {
                self.spanning.increment((end.clone(), next.clone()));
            }
        }

        for word in words {
            self.lexicon.increment(word);
        }
    }

    pub fn nlines(&self) -> usize {
        self.nlines
    }

    pub fn nwords(&self) -> usize {
        self.nwords
    }

    pub fn nunits(&self) -> usize {
        self.nunits
    }

    pub fn internal(&self) -> &Counter<Diphone> {
        &self.internal
    }

    pub fn spanning(&self) -> &Counter<Diphone> {
        &self.spanning
    }

    pub fn lexicon(&self) -> &Counter<Vec<String>> {
        &self.lexicon
    }

    /// Every diphone, within or across words.
    pub fn diphones(&self) -> Counter<Diphone> {
        let mut all = self.internal.clone();
        for (diphone, count) in &self.spanning {
            all.add(diphone.clone(), *count);
        }
        all
    }

    /// Prior probability of a word boundary between two units.
    ///
    /// Word boundaries inside utterances over unit transitions inside
    /// utterances: `(nwords - nlines) / (nunits - nlines)`.
    pub fn estimate_pwb(&self) -> f64 {
        let transitions = self.nunits.saturating_sub(self.nlines);
        if transitions == 0 {
            return 0.0;
        }
        self.nwords.saturating_sub(self.nlines) as f64 / transitions as f64
    }
}

/// How the boundary probability of a diphone is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DibsKind {
    /// Share of a diphone's occurrences that span a word boundary.
    Baseline,
    /// Bayesian estimate from phrase-edge unit distributions.
    #[default]
    Phrasal,
    /// Bayesian estimate from word-edge unit distributions of the lexicon.
    Lexical,
}

impl FromStr for DibsKind {
    type Err = WordsegError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "baseline" => Ok(DibsKind::Baseline),
            "phrasal" => Ok(DibsKind::Phrasal),
            "lexical" => Ok(DibsKind::Lexical),
            other => Err(WordsegError::invalid_value(
                "dibs.type",
                format!("unknown DIBS type '{other}', expected baseline, phrasal or lexical"),
            )),
        }
    }
}

/// Boundary probability of every diphone observed in training.
#[derive(Debug, Clone)]
pub struct DibsModel {
    kind: DibsKind,
    pwb: f64,
    table: HashMap<String, HashMap<String, f64>>,
}

impl DibsModel {
    /// Build the probability table. `pwb` is estimated from the summary when
    /// not given.
    pub fn new(summary: &CorpusSummary, kind: DibsKind, pwb: Option<f64>) -> Result<Self> {
        if let Some(p) = pwb
            && !(0.0..=1.0).contains(&p)
        {
            return Err(WordsegError::invalid_value(
                "dibs.pwb",
                format!("must be a probability, got {p}"),
            ));
        }
        let pwb = pwb.unwrap_or_else(|| summary.estimate_pwb());

        let probabilities = match kind {
            DibsKind::Baseline => baseline(summary),
            DibsKind::Phrasal => bayesian(
                summary,
                pwb,
                &summary.phrase_final,
                &summary.phrase_initial,
                phrasal_probability,
            ),
            DibsKind::Lexical => {
                let mut word_final = Counter::new();
                let mut word_initial = Counter::new();
                for (word, count) in summary.lexicon() {
                    if let (Some(first), Some(last)) = (word.first(), word.last()) {
                        word_initial.add(first.clone(), *count);
                        word_final.add(last.clone(), *count);
                    }
                }
                bayesian(summary, pwb, &word_final, &word_initial, lexical_probability)
            }
        };

        let mut table: HashMap<String, HashMap<String, f64>> = HashMap::new();
        for ((first, second), probability) in probabilities {
            table.entry(first).or_default().insert(second, probability);
        }

        Ok(Self { kind, pwb, table })
    }

    pub fn kind(&self) -> DibsKind {
        self.kind
    }

    pub fn pwb(&self) -> f64 {
        self.pwb
    }

    /// Boundary probability between `first` and `second`; 1 when unseen.
    pub fn probability(&self, first: &str, second: &str) -> f64 {
        self.table
            .get(first)
            .and_then(|row| row.get(second))
            .copied()
            .unwrap_or(1.0)
    }
}

fn baseline(summary: &CorpusSummary) -> Vec<(Diphone, f64)> {
    summary
        .diphones()
        .iter()
        .map(|(diphone, &total)| {
            let spanning = summary.spanning.get(diphone);
            (diphone.clone(), spanning as f64 / total as f64)
        })
        .collect()
}

/// `P(boundary | xy) = Pfinal(x) * pwb * Pinitial(y) / P(xy)`, with both edge
/// distributions renormalized over the units seen first (resp. second) in a
/// diphone. `resolve` turns numerator and denominator into the probability.
fn bayesian(
    summary: &CorpusSummary,
    pwb: f64,
    finals: &Counter<String>,
    initials: &Counter<String>,
    resolve: impl Fn(f64, f64) -> f64,
) -> Vec<(Diphone, f64)> {
    let diphones = summary.diphones();
    let total = diphones.total() as f64;

    let firsts: HashSet<&String> = diphones.keys().map(|(x, _)| x).collect();
    let seconds: HashSet<&String> = diphones.keys().map(|(_, y)| y).collect();
    let final_norm: usize = firsts.iter().map(|x| finals.get(*x)).sum();
    let initial_norm: usize = seconds.iter().map(|y| initials.get(*y)).sum();

    let share = |counts: &Counter<String>, unit: &String, norm: usize| {
        if norm == 0 {
            0.0
        } else {
            counts.get(unit) as f64 / norm as f64
        }
    };

    diphones
        .iter()
        .map(|(diphone, &count)| {
            let (x, y) = diphone;
            let num = share(finals, x, final_norm) * pwb * share(initials, y, initial_norm);
            let den = count as f64 / total;
            (diphone.clone(), resolve(num, den))
        })
        .collect()
}

/// Capped at 1.
fn phrasal_probability(num: f64, den: f64) -> f64 {
    if num >= den { 1.0 } else { num / den }
}

/// Uncapped. Table entries always have `den > 0`; diphones missing from the
/// table get 1 in [`DibsModel::probability`].
fn lexical_probability(num: f64, den: f64) -> f64 {
    if den == 0.0 { 1.0 } else { num / den }
}

/// Threshold segmenter over a trained [`DibsModel`].
#[derive(Debug, Clone)]
pub struct DibsSegmenter {
    model: DibsModel,
    threshold: f64,
}

impl DibsSegmenter {
    pub fn new(model: DibsModel, threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(WordsegError::invalid_value(
                "dibs.threshold",
                format!("must be between 0 and 1, got {threshold}"),
            ));
        }
        Ok(Self { model, threshold })
    }

    /// Train on tagged text and wrap the model, using the default threshold.
    pub fn train<S: AsRef<str>>(
        lines: &[S],
        separator: &Separator,
        unit: Level,
        kind: DibsKind,
    ) -> Result<Self> {
        let summary = CorpusSummary::from_tagged(lines, separator, unit)?;
        Self::new(
            DibsModel::new(&summary, kind, None)?,
            defaults::DIBS_THRESHOLD,
        )
    }

    pub fn model(&self) -> &DibsModel {
        &self.model
    }

    fn segment_utterance(&self, utterance: &str) -> String {
        let units: Vec<&str> = utterance.split_whitespace().collect();
        let mut words: Vec<Vec<&str>> = Vec::new();
        for (i, unit) in units.iter().enumerate() {
            let boundary =
                i == 0 || self.model.probability(units[i - 1], unit) > self.threshold;
            match words.last_mut() {
                Some(word) if !boundary => word.push(*unit),
                _ => words.push(vec![*unit]),
            }
        }
        join_words(&words)
    }
}

impl Segmenter for DibsSegmenter {
    fn segment(&self, utterances: &[String]) -> Result<Vec<String>> {
        Ok(utterances
            .iter()
            .map(|utterance| self.segment_utterance(utterance))
            .collect())
    }

    fn name(&self) -> &str {
        "dibs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn summary(lines: &[&str]) -> CorpusSummary {
        CorpusSummary::from_tagged(lines, &Separator::default(), Level::Phone).unwrap()
    }

    fn pair(a: &str, b: &str) -> Diphone {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn test_summary_counts() {
        let s = summary(&["a b ;eword c ;eword", "c ;eword a b ;eword"]);
        assert_eq!((s.nlines(), s.nwords(), s.nunits()), (2, 4, 6));
        assert_eq!(s.internal().get(&pair("a", "b")), 2);
        assert_eq!(s.spanning().get(&pair("b", "c")), 1);
        assert_eq!(s.spanning().get(&pair("c", "a")), 1);
        assert_eq!(s.diphones().total(), 4);
        assert_eq!(s.lexicon().get(&vec!["a".to_string(), "b".to_string()]), 2);
        assert_eq!(s.estimate_pwb(), 0.5);
    }

    #[test]
    fn test_summary_rejects_line_without_word_marker() {
        let err = CorpusSummary::from_tagged(&["a b ;eword", "a b c"], &Separator::default(), Level::Phone)
            .unwrap_err();
        match &err {
            WordsegError::MissingWordMarker { line, .. } => assert_eq!(*line, 2),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_summary_rejects_blank_lines() {
        let err = CorpusSummary::from_tagged(&["a b ;eword", "", "   "], &Separator::default(), Level::Phone)
            .unwrap_err();
        match &err {
            WordsegError::MissingWordMarker { line, .. } => assert_eq!(*line, 2),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = CorpusSummary::from_tagged(&["   "], &Separator::default(), Level::Phone)
            .unwrap_err();
        assert!(matches!(err, WordsegError::MissingWordMarker { line: 1, .. }));
    }

    #[test]
    fn test_summary_rejects_marker_only_line() {
        let err = CorpusSummary::from_tagged(&["a b ;eword", ";eword"], &Separator::default(), Level::Phone)
            .unwrap_err();
        match &err {
            WordsegError::InvalidUtterance { line, reason, .. } => {
                assert_eq!(*line, 2);
                assert_eq!(*reason, UtteranceFault::Empty);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_summary_with_syllable_units() {
        let s = CorpusSummary::from_tagged(
            &["hh ax l ;esyll ow ;esyll ;eword w er l d ;esyll ;eword"],
            &Separator::default(),
            Level::Syllable,
        )
        .unwrap();
        assert_eq!(s.internal().get(&pair("hhaxl", "ow")), 1);
        assert_eq!(s.spanning().get(&pair("ow", "werld")), 1);
    }

    #[test]
    fn test_baseline_extremes() {
        let s = summary(&["a b ;eword c ;eword"]);
        let model = DibsModel::new(&s, DibsKind::Baseline, None).unwrap();
        // only ever inside a word
        assert_eq!(model.probability("a", "b"), 0.0);
        // only ever across words
        assert_eq!(model.probability("b", "c"), 1.0);
        // never seen
        assert_eq!(model.probability("c", "a"), 1.0);
    }

    #[test]
    fn test_baseline_mixed() {
        let s = summary(&["a b ;eword", "a ;eword b ;eword", "a b ;eword", "a b ;eword"]);
        let model = DibsModel::new(&s, DibsKind::Baseline, None).unwrap();
        assert_eq!(model.probability("a", "b"), 0.25);
    }

    #[test]
    fn test_phrasal_probabilities() {
        let s = summary(&["a b ;eword c ;eword", "c ;eword a b ;eword"]);
        let model = DibsModel::new(&s, DibsKind::Phrasal, None).unwrap();
        assert_eq!(model.pwb(), 0.5);
        assert_eq!(model.probability("a", "b"), 0.0);
        assert_eq!(model.probability("b", "c"), 0.5);
        assert_eq!(model.probability("c", "a"), 0.5);
    }

    #[test]
    fn test_phrasal_is_capped_at_one() {
        let s = summary(&["a b ;eword c ;eword", "c ;eword a b ;eword"]);
        let model = DibsModel::new(&s, DibsKind::Phrasal, Some(1.0)).unwrap();
        assert_eq!(model.probability("b", "c"), 1.0);
    }

    #[test]
    fn test_lexical_probabilities() {
        let s = summary(&["a ;eword b ;eword", "a ;eword b ;eword"]);
        let model = DibsModel::new(&s, DibsKind::Lexical, None).unwrap();
        assert_eq!(model.pwb(), 1.0);
        assert_eq!(model.probability("a", "b"), 1.0);
    }

    #[test]
    fn test_probability_resolvers() {
        assert_eq!(phrasal_probability(0.5, 0.25), 1.0);
        assert_eq!(phrasal_probability(0.25, 0.25), 1.0);
        assert_eq!(phrasal_probability(0.25, 0.5), 0.5);

        assert_eq!(lexical_probability(0.3, 0.0), 1.0);
        assert_eq!(lexical_probability(0.5, 0.25), 2.0);
        assert_eq!(lexical_probability(0.25, 0.5), 0.5);
    }

    #[test]
    fn test_invalid_pwb_and_threshold() {
        let s = summary(&["a b ;eword"]);
        assert!(DibsModel::new(&s, DibsKind::Phrasal, Some(1.5)).is_err());
        let model = DibsModel::new(&s, DibsKind::Baseline, None).unwrap();
        assert!(DibsSegmenter::new(model, -0.1).is_err());
    }

    #[test]
    fn test_segment_with_baseline() {
        let seg = DibsSegmenter::train(
            &["a b ;eword c ;eword"],
            &Separator::default(),
            Level::Phone,
            DibsKind::Baseline,
        )
        .unwrap();
        let out = seg.segment(&["a b c x".to_string(), "".to_string()]).unwrap();
        assert_eq!(out, vec!["ab c x", ""]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let s = summary(&["a b ;eword c ;eword", "c ;eword a b ;eword"]);
        let model = DibsModel::new(&s, DibsKind::Phrasal, None).unwrap();
        let strict = DibsSegmenter::new(model.clone(), 0.5).unwrap();
        assert_eq!(strict.segment(&["a b c a b".to_string()]).unwrap(), vec!["abcab"]);
        let loose = DibsSegmenter::new(model, 0.4).unwrap();
        assert_eq!(loose.segment(&["a b c a b".to_string()]).unwrap(), vec!["ab c ab"]);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("lexical".parse::<DibsKind>().unwrap(), DibsKind::Lexical);
        let err = "gold".parse::<DibsKind>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
