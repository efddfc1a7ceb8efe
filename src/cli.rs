//! Command-line interface for wordseg
//!
//! Provides argument parsing using clap derive macros.

use crate::segment::{DibsKind, Dependency, Threshold};
use crate::separator::Level;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Word segmentation of phonemic transcripts
#[derive(Parser, Debug)]
#[command(name = "wordseg", version, about = "Word segmentation of phonemic transcripts")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress diagnostics (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: summary, -vv: per-stage details)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Phone separator (overrides config)
    #[arg(long, global = true, value_name = "SEP")]
    pub phone_sep: Option<String>,

    /// Syllable separator (overrides config)
    #[arg(long, global = true, value_name = "SEP")]
    pub syllable_sep: Option<String>,

    /// Word separator (overrides config)
    #[arg(long, global = true, value_name = "SEP")]
    pub word_sep: Option<String>,
}

/// Input and output files shared by the text commands.
#[derive(Args, Debug, Clone, Default)]
pub struct IoArgs {
    /// Input file (default: stdin)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Turn tagged text into segmenter input
    Prep {
        #[command(flatten)]
        io: IoArgs,

        /// Level of the output units
        #[arg(short, long, default_value = "phone")]
        unit: Level,

        /// Skip invalid utterances instead of failing
        #[arg(long)]
        tolerant: bool,

        /// Also write the gold segmentation of the kept utterances here
        #[arg(short, long, value_name = "PATH")]
        gold: Option<PathBuf>,
    },

    /// Extract the gold segmentation of tagged text
    Gold {
        #[command(flatten)]
        io: IoArgs,
    },

    /// Transitional-probability segmentation
    Tp {
        #[command(flatten)]
        io: IoArgs,

        /// Boundary placement: relative or absolute
        #[arg(short, long)]
        threshold: Option<Threshold>,

        /// Dependency measure: ftp, btp or mi
        #[arg(short, long)]
        dependency: Option<Dependency>,
    },

    /// Lexicon-based incremental segmentation
    Puddle {
        #[command(flatten)]
        io: IoArgs,

        /// Number of units of the boundary contexts
        #[arg(short, long)]
        window: Option<usize>,

        /// Prefer the most frequent known word at each position
        #[arg(short = 'F', long)]
        by_frequency: bool,

        /// Prepared text to train on first; disables folding
        #[arg(long, value_name = "PATH")]
        train: Option<PathBuf>,

        #[command(flatten)]
        folding: FoldingArgs,
    },

    /// Diphone-based segmentation
    Dibs {
        #[command(flatten)]
        io: IoArgs,

        /// Tagged text to train on
        #[arg(long, value_name = "PATH")]
        train: PathBuf,

        /// Probability model: baseline, phrasal or lexical
        #[arg(short = 'T', long = "type")]
        kind: Option<DibsKind>,

        /// Boundary when the probability exceeds this value
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Prior word-boundary probability (default: estimated)
        #[arg(long)]
        pwb: Option<f64>,

        /// Level of the training units
        #[arg(short, long)]
        unit: Option<Level>,
    },

    /// Score a hypothesis against gold
    Eval {
        /// Hypothesis segmentation
        hypothesis: PathBuf,

        /// Gold segmentation
        gold: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Write the scores here instead of stdout
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Fold dispatch overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct FoldingArgs {
    /// Number of folds
    #[arg(long)]
    pub nfolds: Option<usize>,

    /// Number of worker threads
    #[arg(short = 'j', long)]
    pub njobs: Option<usize>,
}
