//! Segmenters backed by an external program.
//!
//! The program reads prepared utterances on stdin, one per line, and writes
//! one hypothesis per line on stdout. Its output is checked before it is
//! trusted: same number of lines, same units on every line.

use crate::error::{Result, WordsegError};
use crate::segment::segmenter::Segmenter;
use crate::separator::collapse_spaces;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::thread;

/// Runs `program args...` once per call.
#[derive(Debug, Clone)]
pub struct CommandSegmenter {
    name: String,
    program: String,
    args: Vec<String>,
}

impl CommandSegmenter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        let program = program.into();
        Self {
            name: program.clone(),
            program,
            args,
        }
    }

    /// Name used in errors, the program path by default.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn failed(&self, message: impl Into<String>) -> WordsegError {
        WordsegError::SegmenterFailed {
            segmenter: self.name.clone(),
            message: message.into(),
        }
    }

    fn malformed(&self, message: impl Into<String>) -> WordsegError {
        WordsegError::SegmenterOutput {
            segmenter: self.name.clone(),
            message: message.into(),
        }
    }

    fn check(&self, input: &[String], output: Vec<String>) -> Result<Vec<String>> {
        if input.len() != output.len() {
            return Err(self.malformed(format!(
                "{} utterances in, {} out",
                input.len(),
                output.len()
            )));
        }
        for (n, (before, after)) in input.iter().zip(&output).enumerate() {
            if before.replace(' ', "") != after.replace(' ', "") {
                return Err(self.malformed(format!(
                    "line {} changed from '{}' to '{}'",
                    n + 1,
                    before,
                    after
                )));
            }
        }
        Ok(output)
    }
}

impl Segmenter for CommandSegmenter {
    fn segment(&self, utterances: &[String]) -> Result<Vec<String>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.failed(format!("cannot start {}: {e}", self.program)))?;

        let mut input = String::new();
        for utterance in utterances {
            input.push_str(utterance);
            input.push('\n');
        }

        // Feed stdin from another thread so a child filling its stdout pipe
        // before reading everything cannot deadlock us.
        let stdin = child.stdin.take();
        let written = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(input.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            (writer.join(), output)
        });

        let output = match written {
            (_, Err(e)) => return Err(WordsegError::Io(e)),
            (Err(_), _) => return Err(self.failed("stdin writer panicked")),
            (Ok(Err(e)), _) if e.kind() != ErrorKind::BrokenPipe => {
                return Err(WordsegError::Io(e));
            }
            (Ok(_), Ok(output)) => output,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failed(format!(
                "{} ({})",
                output.status,
                stderr.trim()
            )));
        }

        let hypothesis = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(collapse_spaces)
            .collect();
        self.check(utterances, hypothesis)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::ErrorKind as Kind;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    fn sh(script: &str) -> CommandSegmenter {
        CommandSegmenter::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[test]
    fn test_identity_program() {
        let text = lines(&["a b c", "", "d e"]);
        let seg = CommandSegmenter::new("cat", Vec::new());
        assert_eq!(seg.segment(&text).unwrap(), text);
        assert_eq!(seg.name(), "cat");
    }

    #[test]
    fn test_program_moving_boundaries() {
        let seg = sh("tr -d ' '").with_name("joiner");
        let out = seg.segment(&lines(&["a b c", "d e"])).unwrap();
        assert_eq!(out, vec!["abc", "de"]);
    }

    #[test]
    fn test_non_zero_exit() {
        let seg = sh("cat > /dev/null; echo boom >&2; exit 3");
        match seg.segment(&lines(&["a b"])) {
            Err(WordsegError::SegmenterFailed { message, .. }) => assert!(message.contains("boom")),
            other => panic!("expected SegmenterFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_program() {
        let seg = CommandSegmenter::new("/nonexistent/segmenter", Vec::new());
        assert_eq!(seg.segment(&lines(&["a"])).unwrap_err().kind(), Kind::Runtime);
    }

    #[test]
    fn test_line_count_mismatch() {
        let seg = sh("head -n 1");
        let err = seg.segment(&lines(&["a b", "c d"])).unwrap_err();
        assert!(matches!(err, WordsegError::SegmenterOutput { .. }));
    }

    #[test]
    fn test_content_change() {
        let seg = sh("sed s/a/x/");
        let err = seg.segment(&lines(&["a b"])).unwrap_err();
        assert!(matches!(err, WordsegError::SegmenterOutput { .. }));
        assert_eq!(err.kind(), Kind::Runtime);
    }
}
