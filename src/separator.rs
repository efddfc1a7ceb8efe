//! Multi-level token boundaries (phone, syllable, word).
//!
//! A [`Separator`] holds up to three marker strings. Every other part of the
//! crate reads and writes utterances through it, so its behaviour is defined
//! for any subset of undefined levels:
//!
//! - markers are matched literally, longest first, at every position;
//! - a boundary at one level is a boundary at every finer level too (a word
//!   marker also ends a syllable and a phone);
//! - splitting at an undefined level only splits at the coarser markers.

use crate::defaults;
use crate::error::{Result, WordsegError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Token granularity, ordered from inner (phone) to outer (word).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Phone,
    Syllable,
    Word,
}

impl Level {
    /// All levels, inner to outer.
    pub const ALL: [Level; 3] = [Level::Phone, Level::Syllable, Level::Word];

    pub fn name(&self) -> &'static str {
        match self {
            Level::Phone => "phone",
            Level::Syllable => "syllable",
            Level::Word => "word",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = WordsegError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "phone" => Ok(Level::Phone),
            "syllable" => Ok(Level::Syllable),
            "word" => Ok(Level::Word),
            other => Err(WordsegError::invalid_value(
                "level",
                format!("unknown level '{other}', expected phone, syllable or word"),
            )),
        }
    }
}

/// One lexical item of an utterance: content between markers, or a marker.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Piece<'a> {
    Text(&'a str),
    Marker(&'a str, Level),
}

impl<'a> Piece<'a> {
    fn as_str(&self) -> &'a str {
        match self {
            Piece::Text(s) | Piece::Marker(s, _) => s,
        }
    }

    fn is_blank_or_marker(&self, removable: &impl Fn(Level) -> bool) -> bool {
        match self {
            Piece::Text(s) => s.trim().is_empty(),
            Piece::Marker(_, level) => removable(*level),
        }
    }
}

/// Immutable set of phone, syllable and word markers.
#[derive(Debug, Clone, PartialEq)]
pub struct Separator {
    phone: Option<String>,
    syllable: Option<String>,
    word: Option<String>,
    /// Defined markers sorted by decreasing length, for literal matching.
    ordered: Vec<(String, Level)>,
}

impl Default for Separator {
    fn default() -> Self {
        Self::build(
            Some(defaults::PHONE_SEPARATOR.to_string()),
            Some(defaults::SYLLABLE_SEPARATOR.to_string()),
            Some(defaults::WORD_SEPARATOR.to_string()),
        )
    }
}

impl Separator {
    /// Create a separator, rejecting empty, duplicated or ill-formed markers.
    pub fn new(phone: Option<&str>, syllable: Option<&str>, word: Option<&str>) -> Result<Self> {
        let markers = [
            (Level::Phone, phone),
            (Level::Syllable, syllable),
            (Level::Word, word),
        ];

        for (level, marker) in markers {
            let Some(marker) = marker else { continue };
            if marker.is_empty() {
                return Err(WordsegError::invalid_value(
                    format!("separator.{level}"),
                    "separator must not be empty",
                ));
            }
            if let Some(c) = marker
                .chars()
                .find(|c| defaults::FORBIDDEN_SEPARATOR_CHARS.contains(c))
            {
                return Err(WordsegError::invalid_value(
                    format!("separator.{level}"),
                    format!("separator '{marker}' contains forbidden character '{c}'"),
                ));
            }
        }

        for (i, (level_a, a)) in markers.iter().enumerate() {
            for (level_b, b) in &markers[i + 1..] {
                if let (Some(a), Some(b)) = (a, b)
                    && a == b
                {
                    return Err(WordsegError::invalid_value(
                        "separator",
                        format!("{level_a} and {level_b} separators are both '{a}'"),
                    ));
                }
            }
        }

        Ok(Self::build(
            phone.map(str::to_string),
            syllable.map(str::to_string),
            word.map(str::to_string),
        ))
    }

    fn build(phone: Option<String>, syllable: Option<String>, word: Option<String>) -> Self {
        let mut ordered: Vec<(String, Level)> = [
            (phone.clone(), Level::Phone),
            (syllable.clone(), Level::Syllable),
            (word.clone(), Level::Word),
        ]
        .into_iter()
        .filter_map(|(marker, level)| marker.map(|m| (m, level)))
        .collect();
        ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self {
            phone,
            syllable,
            word,
            ordered,
        }
    }

    /// Marker of `level`, if defined.
    pub fn get(&self, level: Level) -> Option<&str> {
        match level {
            Level::Phone => self.phone.as_deref(),
            Level::Syllable => self.syllable.as_deref(),
            Level::Word => self.word.as_deref(),
        }
    }

    /// Defined levels, inner to outer.
    pub fn levels(&self) -> Vec<Level> {
        Level::ALL
            .into_iter()
            .filter(|level| self.get(*level).is_some())
            .collect()
    }

    /// Remove leading and trailing markers at or under `level` (every marker
    /// when `None`), collapsing residual whitespace.
    pub fn strip(&self, text: &str, level: Option<Level>) -> String {
        self.strip_where(text, |l| level.is_none_or(|max| l <= max))
    }

    /// Delete the markers of `level` (every marker when `None`), collapsing
    /// residual whitespace.
    pub fn remove(&self, text: &str, level: Option<Level>) -> String {
        self.remove_where(text, |l| level.is_none_or(|only| l == only))
    }

    /// Every substring between boundaries at `level`, empty ones included.
    ///
    /// Markers of coarser levels are boundaries too. With `keep_boundaries`
    /// false, finer markers are removed from each piece; otherwise pieces are
    /// returned verbatim.
    pub fn split(&self, text: &str, level: Level, keep_boundaries: bool) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut current = String::new();
        for piece in self.lex(text) {
            match piece {
                Piece::Marker(_, l) if l >= level => {
                    pieces.push(std::mem::take(&mut current));
                }
                other => current.push_str(other.as_str()),
            }
        }
        pieces.push(current);

        if keep_boundaries {
            pieces
        } else {
            pieces
                .iter()
                .map(|piece| self.remove_where(piece, |l| l < level))
                .collect()
        }
    }

    /// Non-empty tokens at `level`.
    ///
    /// With `keep_boundaries` true, finer markers inside a token are kept
    /// (only the ones at its edges are stripped); with false they are removed.
    pub fn tokenize(&self, text: &str, level: Level, keep_boundaries: bool) -> Vec<String> {
        self.split(text, level, true)
            .iter()
            .map(|piece| {
                if keep_boundaries {
                    self.strip_where(piece, |l| l < level)
                } else {
                    self.remove_where(piece, |l| l < level)
                }
            })
            .filter(|token| !token.is_empty())
            .collect()
    }

    /// Nested word → syllable → phone tokens.
    pub fn tokenize_all(&self, text: &str) -> Vec<Vec<Vec<String>>> {
        self.tokenize(text, Level::Word, true)
            .iter()
            .map(|word| {
                self.tokenize(word, Level::Syllable, true)
                    .iter()
                    .map(|syllable| self.tokenize(syllable, Level::Phone, false))
                    .collect()
            })
            .collect()
    }

    /// True if `text` contains the marker of `level`.
    pub fn contains(&self, text: &str, level: Level) -> bool {
        self.lex(text)
            .iter()
            .any(|piece| matches!(piece, Piece::Marker(_, l) if *l == level))
    }

    /// True if the first non-blank item of `text` is a marker.
    pub(crate) fn starts_with_marker(&self, text: &str) -> bool {
        let trimmed = text.trim_start();
        self.ordered
            .iter()
            .any(|(marker, _)| !marker.trim().is_empty() && trimmed.starts_with(marker.trim()))
    }

    /// True if the last non-blank item of `text` is the marker of `level`.
    pub(crate) fn ends_with_marker(&self, text: &str, level: Level) -> bool {
        let last = self
            .lex(text)
            .into_iter()
            .rev()
            .find(|piece| !piece.is_blank_or_marker(&|l| l < level));
        matches!(last, Some(Piece::Marker(_, l)) if l == level)
    }

    fn lex<'a>(&self, text: &'a str) -> Vec<Piece<'a>> {
        let mut pieces = Vec::new();
        let mut start = 0;
        let mut pos = 0;

        while pos < text.len() {
            let rest = &text[pos..];
            match self.ordered.iter().find(|(m, _)| rest.starts_with(m.as_str())) {
                Some((marker, level)) => {
                    if start < pos {
                        pieces.push(Piece::Text(&text[start..pos]));
                    }
                    let end = pos + marker.len();
                    pieces.push(Piece::Marker(&text[pos..end], *level));
                    pos = end;
                    start = pos;
                }
                None => pos += rest.chars().next().map_or(1, char::len_utf8),
            }
        }
        if start < pos {
            pieces.push(Piece::Text(&text[start..pos]));
        }

        pieces
    }

    fn strip_where(&self, text: &str, removable: impl Fn(Level) -> bool) -> String {
        let pieces = self.lex(text);
        let first = pieces
            .iter()
            .position(|p| !p.is_blank_or_marker(&removable));
        let last = pieces
            .iter()
            .rposition(|p| !p.is_blank_or_marker(&removable));

        match (first, last) {
            (Some(first), Some(last)) => {
                let kept: String = pieces[first..=last].iter().map(Piece::as_str).collect();
                collapse_spaces(&kept)
            }
            _ => String::new(),
        }
    }

    fn remove_where(&self, text: &str, removable: impl Fn(Level) -> bool) -> String {
        let kept: String = self
            .lex(text)
            .iter()
            .filter(|piece| !matches!(piece, Piece::Marker(_, l) if removable(*l)))
            .map(Piece::as_str)
            .collect();
        collapse_spaces(&kept)
    }
}

/// Collapse runs of spaces into one and trim surrounding whitespace.
pub(crate) fn collapse_spaces(text: &str) -> String {
    text.split(' ')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}
