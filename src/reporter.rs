//! Reporting of errors that tolerant modes skip instead of propagating.

use crate::error::WordsegError;

/// Receives errors a stage chose to skip.
pub trait ErrorReporter: Send + Sync {
    /// Reports an error from a processing stage (e.g. "prepare").
    fn report(&self, stage: &str, error: &WordsegError);
}

/// Simple error reporter that logs to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, stage: &str, error: &WordsegError) {
        eprintln!("[{}] {}", stage, error);
    }
}

/// Reporter that discards everything (quiet mode).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl ErrorReporter for NullReporter {
    fn report(&self, _stage: &str, _error: &WordsegError) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_reporter() {
        let reporter = LogReporter;
        let error = WordsegError::invalid_value("nfolds", "test error");
        // Just ensure it doesn't panic
        reporter.report("test", &error);
    }

    #[test]
    fn test_reporters_are_object_safe() {
        let reporters: Vec<Box<dyn ErrorReporter>> = vec![Box::new(LogReporter), Box::new(NullReporter)];
        let error = WordsegError::invalid_value("window", "test error");
        for reporter in &reporters {
            reporter.report("test", &error);
        }
    }
}
