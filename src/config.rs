use crate::defaults;
use crate::error::{Result, WordsegError};
use crate::segment::{DibsKind, Dependency, Threshold};
use crate::separator::{Level, Separator};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub separator: SeparatorConfig,
    pub tp: TpConfig,
    pub puddle: PuddleConfig,
    pub dibs: DibsConfig,
    pub folding: FoldingConfig,
}

/// Token markers. An empty string leaves the level undefined.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SeparatorConfig {
    pub phone: String,
    pub syllable: String,
    pub word: String,
}

/// Transitional-probability segmenter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct TpConfig {
    pub threshold: Threshold,
    pub dependency: Dependency,
}

/// PUDDLE segmenter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PuddleConfig {
    pub window: usize,
    pub by_frequency: bool,
}

/// DIBS segmenter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DibsConfig {
    #[serde(rename = "type")]
    pub kind: DibsKind,
    pub threshold: f64,
    /// Prior word-boundary probability; estimated from training data when unset.
    pub pwb: Option<f64>,
    /// Level of the units diphones are made of.
    pub unit: Level,
}

/// Fold dispatch for online segmenters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FoldingConfig {
    pub nfolds: usize,
    pub njobs: usize,
}

impl Default for SeparatorConfig {
    fn default() -> Self {
        Self {
            phone: defaults::PHONE_SEPARATOR.to_string(),
            syllable: defaults::SYLLABLE_SEPARATOR.to_string(),
            word: defaults::WORD_SEPARATOR.to_string(),
        }
    }
}

impl Default for PuddleConfig {
    fn default() -> Self {
        Self {
            window: defaults::PUDDLE_WINDOW,
            by_frequency: false,
        }
    }
}

impl Default for DibsConfig {
    fn default() -> Self {
        Self {
            kind: DibsKind::default(),
            threshold: defaults::DIBS_THRESHOLD,
            pwb: None,
            unit: Level::Phone,
        }
    }
}

impl Default for FoldingConfig {
    fn default() -> Self {
        Self {
            nfolds: defaults::NFOLDS,
            njobs: defaults::NJOBS,
        }
    }
}

impl SeparatorConfig {
    /// Build the validated separator.
    pub fn build(&self) -> Result<Separator> {
        let level = |marker: &str| (!marker.is_empty()).then(|| marker.to_string());
        Separator::new(
            level(&self.phone).as_deref(),
            level(&self.syllable).as_deref(),
            level(&self.word).as_deref(),
        )
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents).map_err(WordsegError::from)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e)
                if e.downcast_ref::<std::io::Error>()
                    .is_some_and(|io_err| io_err.kind() == std::io::ErrorKind::NotFound) =>
            {
                Ok(Self::default())
            }
            Err(e) => Err(e.context(format!("Failed to load config from {}", path.display()))),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - WORDSEG_PHONE_SEP → separator.phone
    /// - WORDSEG_SYLLABLE_SEP → separator.syllable
    /// - WORDSEG_WORD_SEP → separator.word
    /// - WORDSEG_NFOLDS → folding.nfolds
    /// - WORDSEG_NJOBS → folding.njobs
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(phone) = std::env::var("WORDSEG_PHONE_SEP")
            && !phone.is_empty()
        {
            self.separator.phone = phone;
        }

        if let Ok(syllable) = std::env::var("WORDSEG_SYLLABLE_SEP")
            && !syllable.is_empty()
        {
            self.separator.syllable = syllable;
        }

        if let Ok(word) = std::env::var("WORDSEG_WORD_SEP")
            && !word.is_empty()
        {
            self.separator.word = word;
        }

        if let Some(nfolds) = env_usize("WORDSEG_NFOLDS") {
            self.folding.nfolds = nfolds;
        }

        if let Some(njobs) = env_usize("WORDSEG_NJOBS") {
            self.folding.njobs = njobs;
        }

        self
    }

    /// Check values the type system cannot.
    pub fn validate(&self) -> Result<()> {
        self.separator.build()?;
        if self.puddle.window < 1 {
            return Err(WordsegError::invalid_value("puddle.window", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.dibs.threshold) {
            return Err(WordsegError::invalid_value(
                "dibs.threshold",
                format!("must be between 0 and 1, got {}", self.dibs.threshold),
            ));
        }
        if let Some(pwb) = self.dibs.pwb
            && !(0.0..=1.0).contains(&pwb)
        {
            return Err(WordsegError::invalid_value(
                "dibs.pwb",
                format!("must be a probability, got {pwb}"),
            ));
        }
        if self.dibs.unit == Level::Word {
            return Err(WordsegError::invalid_value(
                "dibs.unit",
                "must be phone or syllable",
            ));
        }
        if self.folding.nfolds < 1 {
            return Err(WordsegError::invalid_value("folding.nfolds", "must be at least 1"));
        }
        if self.folding.njobs < 1 {
            return Err(WordsegError::invalid_value("folding.njobs", "must be at least 1"));
        }
        Ok(())
    }

    /// Separator described by the `[separator]` section.
    pub fn separator(&self) -> Result<Separator> {
        self.separator.build()
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/wordseg/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("wordseg")
            .join("config.toml")
    }
}

fn env_usize(key: &str) -> Option<usize> {
    let value = std::env::var(key).ok().filter(|v| !v.is_empty())?;
    match value.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            eprintln!("Warning: ignoring {key}={value}, not a number");
            None
        }
    }
}
