//! wordseg - Word segmentation of phonemic transcripts
//!
//! Unsupervised segmenters (TP, PUDDLE, DIBS) over prepared utterances, with
//! corpus preparation, fold-parallel execution and evaluation against gold.

// Enforce error handling discipline in library code
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod counter;
pub mod defaults;
pub mod error;
pub mod evaluate;
pub mod folding;
pub mod prepare;
pub mod reporter;
pub mod segment;
pub mod separator;

// L4 composition root - needs everything
#[cfg(feature = "cli")]
pub mod app;

// Core trait (prepared utterances → hypothesis)
pub use segment::Segmenter;

// Segmenters
pub use segment::{
    CommandSegmenter, CorpusSummary, DibsKind, DibsModel, DibsSegmenter, Puddle,
    PuddleSegmenter, TpSegmenter,
};

// Tokens and corpora
pub use folding::{fold, run_folded, unfold};
pub use prepare::{Mode, Prepared, gold, prepare, prepare_corpus};
pub use separator::{Level, Separator};

// Evaluation
pub use evaluate::{Evaluation, Metrics, evaluate};

// Error handling
pub use error::{ErrorKind, Result, WordsegError};
pub use reporter::{ErrorReporter, LogReporter};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
