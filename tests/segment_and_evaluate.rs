//! End-to-end runs through the public API: tagged text is prepared, segmented
//! by every algorithm and scored against its own gold.

use wordseg::segment::{Dependency, MockBehavior, MockSegmenter, Threshold};
use wordseg::{
    CorpusSummary, DibsKind, DibsModel, DibsSegmenter, ErrorKind, Level, LogReporter, Mode,
    PuddleSegmenter, Segmenter, Separator, TpSegmenter, evaluate, prepare_corpus, run_folded,
};

const TAGGED: &[&str] = &[
    "dh ax ;esyll ;eword k ae t ;esyll ;eword",
    "dh ax ;esyll ;eword d ao g ;esyll ;eword",
    "s iy ;esyll ;eword dh ax ;esyll ;eword k ae t ;esyll ;eword",
    "dh ax ;esyll ;eword b ih g ;esyll ;eword d ao g ;esyll ;eword",
    "y uw ;esyll ;eword s iy ;esyll ;eword dh ax ;esyll ;eword d ao g ;esyll ;eword",
    "k ae t ;esyll ;eword",
    "hh ax l ;esyll ow ;esyll ;eword k ae t ;esyll ;eword",
    "dh ax ;esyll ;eword k ae t ;esyll ;eword s iy ;esyll ;eword dh ax ;esyll ;eword d ao g ;esyll ;eword",
];

fn prepared() -> (Vec<String>, Vec<String>) {
    let prepared = prepare_corpus(
        TAGGED,
        &Separator::default(),
        Level::Phone,
        Mode::Strict,
        &LogReporter,
    )
    .unwrap();
    (prepared.utterances, prepared.gold)
}

fn assert_boundaries_only(input: &[String], output: &[String]) {
    assert_eq!(input.len(), output.len());
    for (before, after) in input.iter().zip(output) {
        assert_eq!(before.replace(' ', ""), after.replace(' ', ""));
        assert!(!after.contains("  "), "double space in '{after}'");
    }
}

#[test]
fn gold_scores_perfectly_against_itself() {
    let (_, gold) = prepared();
    let metrics = evaluate(&gold, &gold).unwrap().metrics();
    for (name, value) in metrics.entries() {
        assert_eq!(value, Some(1.0), "{name}");
    }
}

#[test]
fn every_segmenter_only_moves_boundaries() {
    let (text, gold) = prepared();

    let mut segmenters: Vec<Box<dyn Segmenter>> = Vec::new();
    for threshold in [Threshold::Relative, Threshold::Absolute] {
        for dependency in [Dependency::Ftp, Dependency::Btp, Dependency::Mi] {
            segmenters.push(Box::new(TpSegmenter::new(threshold, dependency)));
        }
    }
    segmenters.push(Box::new(PuddleSegmenter::new(1, false).unwrap()));
    segmenters.push(Box::new(PuddleSegmenter::new(2, true).unwrap()));
    let summary = CorpusSummary::from_tagged(TAGGED, &Separator::default(), Level::Phone).unwrap();
    for kind in [DibsKind::Baseline, DibsKind::Phrasal, DibsKind::Lexical] {
        let model = DibsModel::new(&summary, kind, None).unwrap();
        segmenters.push(Box::new(DibsSegmenter::new(model, 0.5).unwrap()));
    }

    for segmenter in &segmenters {
        let hypothesis = segmenter.segment(&text).unwrap();
        assert_boundaries_only(&text, &hypothesis);

        let metrics = evaluate(&hypothesis, &gold).unwrap().metrics();
        for (name, value) in metrics.entries() {
            if let Some(value) = value {
                assert!((0.0..=1.0).contains(&value), "{} {name} = {value}", segmenter.name());
            }
        }
    }
}

#[test]
fn baseline_dibs_trained_on_gold_recovers_it() {
    // every diphone of this corpus is either always inside or always across words
    let (text, gold) = prepared();
    let summary = CorpusSummary::from_tagged(TAGGED, &Separator::default(), Level::Phone).unwrap();
    let model = DibsModel::new(&summary, DibsKind::Baseline, None).unwrap();
    let hypothesis = DibsSegmenter::new(model, 0.5).unwrap().segment(&text).unwrap();

    assert_eq!(hypothesis, gold);
}

#[test]
fn folded_puddle_keeps_corpus_order() {
    let (text, _) = prepared();
    let segmenter = PuddleSegmenter::default();
    for nfolds in 1..=text.len() {
        for njobs in [1, 3] {
            let hypothesis = run_folded(&segmenter, &text, nfolds, njobs).unwrap();
            assert_boundaries_only(&text, &hypothesis);
        }
    }
}

#[test]
fn folded_output_is_independent_of_job_count() {
    let (text, _) = prepared();
    let segmenter = PuddleSegmenter::default();
    let sequential = run_folded(&segmenter, &text, 4, 1).unwrap();
    let parallel = run_folded(&segmenter, &text, 4, 4).unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn failing_fold_is_a_runtime_error() {
    let (text, _) = prepared();
    let failing = MockSegmenter::new("broken").with_behavior(MockBehavior::Fail);
    let err = run_folded(&failing, &text, 3, 2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Runtime);

    let joined = MockSegmenter::new("joined").with_behavior(MockBehavior::WholeUtterance);
    let hypothesis = run_folded(&joined, &text, 3, 2).unwrap();
    assert_boundaries_only(&text, &hypothesis);
}

#[test]
fn misaligned_hypothesis_is_rejected() {
    let (_, gold) = prepared();
    let err = evaluate(&gold[1..], &gold).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
