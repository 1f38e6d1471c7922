use serde::{Deserialize, Serialize};

use crate::config::TimingConfig;

const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u'];
const EDGE_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '\'', '"'];

/// Half-open `[start, end)` interval of one spoken word, relative to its segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WordInterval {
    pub start: f64,
    pub end: f64,
}

impl WordInterval {
    pub fn contains(&self, local_time: f64) -> bool {
        self.start <= local_time && local_time < self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Approximate the syllable count of a word by counting vowel groups
///
/// A vowel opens a new group when it starts the word or follows a
/// non-vowel. Edge punctuation is stripped first; the result is at least 1.
pub fn syllable_count(word: &str) -> usize {
    let cleaned = word.to_lowercase();
    let chars: Vec<char> = cleaned.trim_matches(EDGE_PUNCTUATION).chars().collect();

    let groups = chars
        .iter()
        .enumerate()
        .filter(|&(i, c)| VOWELS.contains(c) && (i == 0 || !VOWELS.contains(&chars[i - 1])))
        .count();

    groups.max(1)
}

/// Deterministic word timing heuristic
///
/// Spreads the available narration time over the words in proportion to
/// `syllables + 0.5`, starting after the engine lead-in and stopping before
/// the protected trailing silence.
#[derive(Debug, Clone)]
pub struct WordTimingEstimator {
    config: TimingConfig,
}

impl WordTimingEstimator {
    pub fn new(config: TimingConfig) -> Self {
        Self { config }
    }

    /// Time available to words for a clip of `duration` seconds
    pub fn available(&self, duration: f64) -> f64 {
        (duration - self.config.lead - self.config.trail).max(self.config.min_available)
    }

    /// Estimate one contiguous interval per word
    pub fn estimate<S: AsRef<str>>(&self, words: &[S], duration: f64) -> Vec<WordInterval> {
        if words.is_empty() {
            return Vec::new();
        }

        let weights: Vec<f64> = words
            .iter()
            .map(|w| syllable_count(w.as_ref()) as f64 + 0.5)
            .collect();
        let total_weight: f64 = weights.iter().sum();
        let avail = self.available(duration);

        let mut cursor = self.config.lead;
        weights
            .iter()
            .map(|weight| {
                let start = cursor;
                cursor += avail * weight / total_weight;
                WordInterval { start, end: cursor }
            })
            .collect()
    }

    /// Split text on whitespace and estimate its word intervals
    pub fn estimate_text(&self, text: &str, duration: f64) -> Vec<WordInterval> {
        let words: Vec<&str> = text.split_whitespace().collect();
        self.estimate(&words, duration)
    }
}

impl Default for WordTimingEstimator {
    fn default() -> Self {
        Self::new(TimingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_syllable_count() {
        assert_eq!(syllable_count("Hi"), 1);
        assert_eq!(syllable_count("wonderful"), 3);
        assert_eq!(syllable_count("beautiful,"), 3);
        assert_eq!(syllable_count("rhythm"), 1);
        assert_eq!(syllable_count("1969"), 1);
        assert_eq!(syllable_count("\"Octopus!\""), 3);
    }

    #[test]
    fn test_two_word_scenario() {
        let estimator = WordTimingEstimator::default();
        let intervals = estimator.estimate(&["Hi", "wonderful"], 2.0);

        assert_eq!(intervals.len(), 2);
        assert!((intervals[0].start - 0.15).abs() < EPS);
        assert!((intervals[0].end - 0.615).abs() < EPS);
        assert!((intervals[1].start - 0.615).abs() < EPS);
        assert!((intervals[1].end - 1.70).abs() < EPS);
    }

    #[test]
    fn test_intervals_are_contiguous_and_contained() {
        let estimator = WordTimingEstimator::default();
        let text = "Honey never spoils, archaeologists have found edible honey in ancient Egyptian tombs.";
        let duration = 6.4;
        let intervals = estimator.estimate_text(text, duration);

        assert_eq!(intervals.len(), text.split_whitespace().count());
        for pair in intervals.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert!(pair[0].start < pair[0].end);
        }
        assert!((intervals[0].start - 0.15).abs() < EPS);
        assert!(intervals.last().unwrap().end <= duration - 0.3 + EPS);

        let allocated: f64 = intervals.iter().map(WordInterval::duration).sum();
        assert!((allocated - estimator.available(duration)).abs() < 1e-9);
    }

    #[test]
    fn test_short_duration_uses_floor() {
        let estimator = WordTimingEstimator::default();
        let intervals = estimator.estimate(&["a", "b", "c"], 0.2);

        let allocated: f64 = intervals.iter().map(WordInterval::duration).sum();
        assert!((allocated - 0.5).abs() < EPS);
        assert!(intervals.iter().all(|i| i.duration() > 0.0));
    }

    #[test]
    fn test_empty_words() {
        let estimator = WordTimingEstimator::default();
        assert!(estimator.estimate::<&str>(&[], 3.0).is_empty());
        assert!(estimator.estimate_text("   ", 3.0).is_empty());
    }
}
