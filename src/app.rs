//! Command handlers behind the `wordseg` binary.
//!
//! Every text command reads one utterance per line from a file or stdin and
//! writes one line per utterance to a file or stdout.

use crate::config::Config;
use crate::error::Result;
use crate::evaluate::evaluate;
use crate::folding::run_folded;
use crate::prepare::{Mode, gold, prepare_corpus};
use crate::reporter::{ErrorReporter, LogReporter, NullReporter};
use crate::segment::{
    CorpusSummary, DibsModel, DibsSegmenter, PuddleSegmenter, Segmenter, TpSegmenter,
};
use crate::separator::Level;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Instant;

/// Where diagnostics go.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbosity {
    pub quiet: bool,
    /// 0 = default, 1 = summary, 2 = per-stage details
    pub level: u8,
}

impl Verbosity {
    fn reporter(&self) -> Box<dyn ErrorReporter> {
        if self.quiet {
            Box::new(NullReporter)
        } else {
            Box::new(LogReporter)
        }
    }

    fn summary(&self) -> bool {
        !self.quiet && self.level >= 1
    }

    fn details(&self) -> bool {
        !self.quiet && self.level >= 2
    }
}

/// Read all lines of `input`, or of stdin when `None`.
pub fn read_lines(input: Option<&Path>) -> Result<Vec<String>> {
    let lines = match input {
        Some(path) => fs::read_to_string(path)?
            .lines()
            .map(str::to_string)
            .collect(),
        None => io::stdin().lock().lines().collect::<io::Result<Vec<_>>>()?,
    };
    Ok(lines)
}

/// Write `lines` to `output`, or to stdout when `None`.
pub fn write_lines<S: AsRef<str>>(output: Option<&Path>, lines: &[S]) -> Result<()> {
    let mut text = String::new();
    for line in lines {
        text.push_str(line.as_ref());
        text.push('\n');
    }
    match output {
        Some(path) => fs::write(path, text)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Run the prep command: tagged text → prepared text (and optional gold).
pub fn run_prep_command(
    config: &Config,
    input: Option<&Path>,
    output: Option<&Path>,
    unit: Level,
    tolerant: bool,
    gold_output: Option<&Path>,
    verbosity: Verbosity,
) -> Result<()> {
    let separator = config.separator()?;
    let lines = read_lines(input)?;
    let mode = if tolerant { Mode::Tolerant } else { Mode::Strict };

    let prepared = prepare_corpus(&lines, &separator, unit, mode, verbosity.reporter().as_ref())?;
    if verbosity.summary() && !prepared.skipped.is_empty() {
        eprintln!(
            "[prep] skipped {} of {} utterances",
            prepared.skipped.len(),
            lines.len()
        );
    }

    write_lines(output, &prepared.utterances)?;
    if let Some(path) = gold_output {
        write_lines(Some(path), &prepared.gold)?;
    }
    Ok(())
}

/// Run the gold command: tagged text → gold segmentation.
pub fn run_gold_command(config: &Config, input: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let separator = config.separator()?;
    let lines: Vec<String> = read_lines(input)?
        .iter()
        .map(|line| gold(line, &separator))
        .collect();
    write_lines(output, &lines)
}

/// Run the tp command over prepared text.
pub fn run_tp_command(
    config: &Config,
    input: Option<&Path>,
    output: Option<&Path>,
    verbosity: Verbosity,
) -> Result<()> {
    let text = read_lines(input)?;
    let segmenter = TpSegmenter::new(config.tp.threshold, config.tp.dependency);
    let hypothesis = timed(&segmenter, verbosity, || segmenter.segment(&text))?;
    write_lines(output, &hypothesis)
}

/// Run the puddle command over prepared text.
///
/// Without a training file the text is folded so that every utterance is
/// segmented by a model that has seen most of the corpus.
pub fn run_puddle_command(
    config: &Config,
    input: Option<&Path>,
    output: Option<&Path>,
    train: Option<&Path>,
    verbosity: Verbosity,
) -> Result<()> {
    let text = read_lines(input)?;
    let segmenter = PuddleSegmenter::new(config.puddle.window, config.puddle.by_frequency)?;

    let hypothesis = match train {
        Some(path) => {
            let train = read_lines(Some(path))?;
            timed(&segmenter, verbosity, || {
                segmenter.train_and_segment(&train, &text)
            })?
        }
        None if text.is_empty() => Vec::new(),
        None => {
            let (nfolds, njobs) = (config.folding.nfolds, config.folding.njobs);
            if verbosity.details() {
                eprintln!("[puddle] {nfolds} folds on {njobs} threads");
            }
            timed(&segmenter, verbosity, || {
                run_folded(&segmenter, &text, nfolds, njobs)
            })?
        }
    };

    write_lines(output, &hypothesis)
}

/// Run the dibs command: train on tagged text, segment prepared text.
pub fn run_dibs_command(
    config: &Config,
    input: Option<&Path>,
    output: Option<&Path>,
    train: &Path,
    verbosity: Verbosity,
) -> Result<()> {
    let separator = config.separator()?;
    let summary = CorpusSummary::from_tagged(&read_lines(Some(train))?, &separator, config.dibs.unit)?;
    let model = DibsModel::new(&summary, config.dibs.kind, config.dibs.pwb)?;
    if verbosity.details() {
        eprintln!(
            "[dibs] trained on {} utterances, {} words, pwb = {:.4}",
            summary.nlines(),
            summary.nwords(),
            model.pwb()
        );
    }

    let segmenter = DibsSegmenter::new(model, config.dibs.threshold)?;
    let text = read_lines(input)?;
    let hypothesis = timed(&segmenter, verbosity, || segmenter.segment(&text))?;
    write_lines(output, &hypothesis)
}

/// Run the eval command and print the scores as a table or JSON.
pub fn run_eval_command(
    hypothesis: &Path,
    gold: &Path,
    json: bool,
    output: Option<&Path>,
) -> Result<()> {
    let evaluation = evaluate(&read_lines(Some(hypothesis))?, &read_lines(Some(gold))?)?;
    let metrics = evaluation.metrics();

    let text = if json {
        serde_json::to_string_pretty(&metrics)?
    } else {
        metrics.to_string().trim_end().to_string()
    };
    write_lines(output, &[text])
}

fn timed<T>(
    segmenter: &dyn Segmenter,
    verbosity: Verbosity,
    run: impl FnOnce() -> Result<Vec<T>>,
) -> Result<Vec<T>> {
    let start = Instant::now();
    let result = run()?;
    if verbosity.summary() {
        eprintln!(
            "[{}] segmented {} utterances in {:.2}s",
            segmenter.name(),
            result.len(),
            start.elapsed().as_secs_f64()
        );
    }
    Ok(result)
}
