//! Default configuration constants for wordseg.
//!
//! Shared by the configuration file, the CLI and the library constructors so
//! that every entry point agrees on the same defaults.

/// Default phone separator.
///
/// Phones in tagged transcripts are space separated, which is also the unit
/// separator of prepared text.
pub const PHONE_SEPARATOR: &str = " ";

/// Default syllable separator.
pub const SYLLABLE_SEPARATOR: &str = ";esyll";

/// Default word separator.
pub const WORD_SEPARATOR: &str = ";eword";

/// Characters a separator may not contain.
///
/// They either clash with utterance validation (punctuation) or make literal
/// marker matching ambiguous.
pub const FORBIDDEN_SEPARATOR_CHARS: &[char] = &[
    '!', '#', '$', '%', '&', '\'', '*', '+', '-', '.', '^', '`', '|', '~', ':', '\\', '"',
];

/// Default PUDDLE boundary-context window, in units.
pub const PUDDLE_WINDOW: usize = 2;

/// Default DIBS decision threshold.
pub const DIBS_THRESHOLD: f64 = 0.5;

/// Default number of folds for online segmenters.
pub const NFOLDS: usize = 5;

/// Default number of concurrent fold workers.
pub const NJOBS: usize = 1;
