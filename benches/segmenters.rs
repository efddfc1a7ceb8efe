use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use wordseg::segment::{Dependency, DibsKind, Threshold};
use wordseg::{
    CorpusSummary, DibsModel, DibsSegmenter, Level, PuddleSegmenter, Segmenter, Separator,
    TpSegmenter, evaluate, gold, prepare, run_folded,
};

const WORDS: &[&str] = &[
    "dh ax", "k ae t", "d ao g", "s iy", "hh ax l ow", "w er l d", "b ih g", "r eh d",
    "b ao l", "y uw", "l uh k", "ae t", "m ao m iy", "w ah t", "ih z", "dh ae t",
];

/// Deterministic tagged corpus of `n` utterances.
fn tagged_corpus(n: usize) -> Vec<String> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    (0..n)
        .map(|_| {
            let len = 2 + (next() % 5) as usize;
            (0..len)
                .map(|_| format!("{} ;eword", WORDS[(next() % WORDS.len() as u64) as usize]))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn bench_segmenters(c: &mut Criterion) {
    let separator = Separator::default();
    let mut group = c.benchmark_group("segment");

    for size in [200, 1000] {
        let tagged = tagged_corpus(size);
        let prepared: Vec<String> = tagged
            .iter()
            .filter_map(|line| prepare(line, &separator, Level::Phone).ok())
            .collect();

        let tp = TpSegmenter::new(Threshold::Relative, Dependency::Ftp);
        group.bench_with_input(BenchmarkId::new("tp", size), &prepared, |b, text| {
            b.iter(|| tp.segment(black_box(text)))
        });

        let puddle = PuddleSegmenter::default();
        group.bench_with_input(BenchmarkId::new("puddle", size), &prepared, |b, text| {
            b.iter(|| puddle.segment(black_box(text)))
        });

        group.bench_with_input(
            BenchmarkId::new("puddle_folded", size),
            &prepared,
            |b, text| b.iter(|| run_folded(&puddle, black_box(text), 5, 4)),
        );

        if let Ok(summary) = CorpusSummary::from_tagged(&tagged, &separator, Level::Phone)
            && let Ok(model) = DibsModel::new(&summary, DibsKind::Phrasal, None)
            && let Ok(dibs) = DibsSegmenter::new(model, 0.5)
        {
            group.bench_with_input(BenchmarkId::new("dibs", size), &prepared, |b, text| {
                b.iter(|| dibs.segment(black_box(text)))
            });
        }
    }

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let separator = Separator::default();
    let tagged = tagged_corpus(1000);
    let reference: Vec<String> = tagged.iter().map(|line| gold(line, &separator)).collect();
    let prepared: Vec<String> = tagged
        .iter()
        .filter_map(|line| prepare(line, &separator, Level::Phone).ok())
        .collect();
    let Ok(hypothesis) = TpSegmenter::default().segment(&prepared) else {
        return;
    };

    c.bench_function("evaluate_1000", |b| {
        b.iter(|| evaluate(black_box(hypothesis.as_slice()), black_box(reference.as_slice())))
    });
}

criterion_group!(benches, bench_segmenters, bench_evaluate);
criterion_main!(benches);
