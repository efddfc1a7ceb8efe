//! Corpus folding for online segmenters.
//!
//! Online algorithms (PUDDLE, external samplers) learn while they segment, so
//! the first utterances they see are segmented with almost no knowledge. To
//! give every utterance the benefit of a model trained on (nearly) the whole
//! corpus, the corpus is cut into `nfolds` contiguous blocks and each fold is
//! a full-length rotation of those blocks. Every block comes last in exactly
//! one fold; that fold's output is kept for it when unfolding.
//!
//! ```text
//! blocks  a b c
//! fold 0  a b c   keeps c
//! fold 1  c a b   keeps b
//! fold 2  b c a   keeps a
//! ```
//!
//! Folds are independent and run on worker threads; results are keyed by fold
//! index so the output never depends on scheduling.

use crate::error::{Result, WordsegError};
use crate::segment::Segmenter;
use std::thread;

/// Offset, per fold, of the block kept from that fold when unfolding.
pub type FoldIndex = Vec<usize>;

/// Split `corpus` into `nfolds` rotated copies.
///
/// Fails with a configuration error unless `1 <= nfolds <= corpus.len()`.
pub fn fold<T: Clone>(corpus: &[T], nfolds: usize) -> Result<(Vec<Vec<T>>, FoldIndex)> {
    if nfolds < 1 || nfolds > corpus.len() {
        return Err(WordsegError::invalid_value(
            "nfolds",
            format!(
                "must be between 1 and the corpus length ({}), got {}",
                corpus.len(),
                nfolds
            ),
        ));
    }

    // remainder goes to the last block
    let size = corpus.len() / nfolds;
    let blocks: Vec<&[T]> = (0..nfolds)
        .map(|i| {
            let end = if i + 1 == nfolds {
                corpus.len()
            } else {
                (i + 1) * size
            };
            &corpus[i * size..end]
        })
        .collect();

    let mut folds = Vec::with_capacity(nfolds);
    let mut index = Vec::with_capacity(nfolds);
    for k in 0..nfolds {
        let fold: Vec<T> = (0..nfolds)
            .flat_map(|j| blocks[(j + nfolds - k) % nfolds].iter().cloned())
            .collect();
        folds.push(fold);
        index.push(corpus.len() - blocks[nfolds - 1 - k].len());
    }

    Ok((folds, index))
}

/// Rebuild the original order from per-fold results.
pub fn unfold<T: Clone>(folds: &[Vec<T>], index: &[usize]) -> Result<Vec<T>> {
    if folds.len() != index.len() {
        return Err(WordsegError::invalid_value(
            "fold index",
            format!("{} folds but {} offsets", folds.len(), index.len()),
        ));
    }

    let mut output = Vec::new();
    for (fold, &offset) in folds.iter().zip(index).rev() {
        let suffix = fold.get(offset..).ok_or_else(|| {
            WordsegError::invalid_value(
                "fold index",
                format!("offset {} beyond fold of length {}", offset, fold.len()),
            )
        })?;
        output.extend_from_slice(suffix);
    }
    Ok(output)
}

/// Segment `corpus` fold by fold on up to `njobs` worker threads.
///
/// The first failing fold (in fold order) fails the whole run. A fold whose
/// output length differs from its input is a runtime error.
pub fn run_folded(
    segmenter: &dyn Segmenter,
    corpus: &[String],
    nfolds: usize,
    njobs: usize,
) -> Result<Vec<String>> {
    if njobs < 1 {
        return Err(WordsegError::invalid_value("njobs", "must be at least 1"));
    }

    let (folds, index) = fold(corpus, nfolds)?;
    let outputs = dispatch(segmenter, &folds, njobs)?;
    unfold(&outputs, &index)
}

fn dispatch(
    segmenter: &dyn Segmenter,
    folds: &[Vec<String>],
    njobs: usize,
) -> Result<Vec<Vec<String>>> {
    let (job_tx, job_rx) = crossbeam_channel::unbounded::<usize>();
    let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, Result<Vec<String>>)>();

    for k in 0..folds.len() {
        // the receiver is alive, sending cannot fail
        if job_tx.send(k).is_err() {
            break;
        }
    }
    drop(job_tx);

    thread::scope(|scope| {
        let handles: Vec<_> = (0..njobs.min(folds.len()))
            .map(|_| {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for k in job_rx.iter() {
                        let result = segmenter.segment(&folds[k]);
                        if result_tx.send((k, result)).is_err() {
                            break;
                        }
                    }
                })
            })
            .collect();

        // A panicking worker leaves its fold without a result, reported below
        for handle in handles {
            if handle.join().is_err() {
                eprintln!("[folding] worker for {} panicked", segmenter.name());
            }
        }
    });
    drop(result_tx);

    let mut slots: Vec<Option<Result<Vec<String>>>> = (0..folds.len()).map(|_| None).collect();
    for (k, result) in result_rx.iter() {
        slots[k] = Some(result);
    }

    let mut outputs = Vec::with_capacity(folds.len());
    for (k, slot) in slots.into_iter().enumerate() {
        let output = match slot {
            Some(result) => result?,
            None => return Err(WordsegError::WorkerPanicked { fold: k }),
        };
        if output.len() != folds[k].len() {
            return Err(WordsegError::SegmenterOutput {
                segmenter: segmenter.name().to_string(),
                message: format!(
                    "fold {} has {} utterances but {} were returned",
                    k,
                    folds[k].len(),
                    output.len()
                ),
            });
        }
        outputs.push(output);
    }

    Ok(outputs)
}
