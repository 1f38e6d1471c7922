use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audio::NarrationClip;
use crate::config::SelectionConfig;
use crate::error::{CompositionError, Result};

/// One fact as listed in a job manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactEntry {
    pub text: String,
    /// Narration audio for `text`
    pub narration: PathBuf,
}

/// A video job: ordered facts with narration plus an optional image pool
///
/// Relative paths resolve against the directory the manifest was loaded from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobManifest {
    #[serde(default)]
    pub images_dir: Option<PathBuf>,

    #[serde(default)]
    pub facts: Vec<FactEntry>,

    #[serde(skip)]
    base_dir: PathBuf,
}

impl JobManifest {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let invalid = |reason: String| CompositionError::InvalidJob {
            path: path.display().to_string(),
            reason,
        };

        let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::parse(&content, base_dir).map_err(|e| invalid(e.to_string()).into())
    }

    /// Parse manifest TOML, resolving relative paths against `base_dir`
    pub fn parse(content: &str, base_dir: PathBuf) -> std::result::Result<Self, toml::de::Error> {
        let mut manifest: JobManifest = toml::from_str(content)?;
        manifest.base_dir = base_dir;
        Ok(manifest)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn images_dir(&self) -> Option<PathBuf> {
        self.images_dir.as_deref().map(|p| self.resolve(p))
    }

    pub fn narration_path(&self, fact: &FactEntry) -> PathBuf {
        self.resolve(&fact.narration)
    }
}

/// A fact accepted for the video, with its prepared narration
#[derive(Debug, Clone)]
pub struct SelectedFact {
    pub text: String,
    pub narration: NarrationClip,
}

impl SelectedFact {
    pub fn duration(&self) -> f64 {
        self.narration.duration()
    }
}

/// Result of offering a fact to the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Accepted,
    Empty,
    Duplicate,
    /// Would push the running total past the maximum
    TooLong,
}

/// Picks facts in order until the target duration is reached
///
/// A fact is skipped if its text is empty, repeats an earlier one (ignoring
/// case and spaces), or would push the total past `max_total`.
pub struct FactSelector {
    config: SelectionConfig,
    seen: HashSet<String>,
    total: f64,
    selected: Vec<SelectedFact>,
}

impl FactSelector {
    pub fn new(config: SelectionConfig) -> Self {
        Self {
            config,
            seen: HashSet::new(),
            total: 0.0,
            selected: Vec::new(),
        }
    }

    fn key(text: &str) -> String {
        text.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect()
    }

    /// Whether the running total reached the target
    pub fn is_complete(&self) -> bool {
        self.total >= self.config.target_total
    }

    /// Cheap pre-check so duplicates can be skipped before loading audio
    pub fn is_duplicate(&self, text: &str) -> bool {
        self.seen.contains(&Self::key(text.trim()))
    }

    pub fn offer(&mut self, text: &str, narration: NarrationClip) -> Offer {
        let text = text.trim();
        if text.is_empty() {
            return Offer::Empty;
        }
        if !self.seen.insert(Self::key(text)) {
            return Offer::Duplicate;
        }

        let duration = narration.duration();
        if self.total + duration > self.config.max_total {
            debug!("Skipping fact ({:.1}s would exceed {:.0}s)", duration, self.config.max_total);
            return Offer::TooLong;
        }

        self.total += duration;
        self.selected.push(SelectedFact {
            text: text.to_string(),
            narration,
        });
        Offer::Accepted
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn into_selected(self) -> Vec<SelectedFact> {
        self.selected
    }
}
