use crate::timing::estimator::{WordInterval, WordTimingEstimator};

/// One narrated unit placed on the audio timeline
///
/// Immutable once built; `word_intervals` holds exactly one entry per word.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub words: Vec<String>,
    pub duration: f64,
    pub start_offset: f64,
    pub word_intervals: Vec<WordInterval>,
}

impl Segment {
    pub fn end_offset(&self) -> f64 {
        self.start_offset + self.duration
    }

    /// Whether absolute time `t` falls inside `[start_offset, start_offset + duration)`
    pub fn contains(&self, t: f64) -> bool {
        self.start_offset <= t && t < self.end_offset()
    }

    /// Index of the word currently spoken at segment-local time `local_time`
    ///
    /// Walks the intervals in order: the first interval containing the time
    /// wins, otherwise the last word whose interval has fully elapsed. Before
    /// the first word starts this is word 0.
    pub fn current_word(&self, local_time: f64) -> usize {
        let mut current = 0;
        for (index, interval) in self.word_intervals.iter().enumerate() {
            if interval.contains(local_time) {
                return index;
            }
            if local_time >= interval.end {
                current = index;
            }
        }
        current
    }
}

/// Immutable snapshot of every segment and the total duration
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    segments: Vec<Segment>,
    total_duration: f64,
}

impl Timeline {
    /// Lay out `(text, spoken_duration)` pairs back to back
    ///
    /// `tail` is extra time appended after the last segment.
    pub fn build<S: AsRef<str>>(
        facts: &[(S, f64)],
        estimator: &WordTimingEstimator,
        tail: f64,
    ) -> Self {
        let mut start_offset = 0.0;
        let segments: Vec<Segment> = facts
            .iter()
            .map(|(text, duration)| {
                let text = text.as_ref().trim().to_string();
                let words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
                let word_intervals = estimator.estimate(&words, *duration);
                let segment = Segment {
                    text,
                    words,
                    duration: *duration,
                    start_offset,
                    word_intervals,
                };
                start_offset += duration;
                segment
            })
            .collect();

        let total_duration = start_offset + tail.max(0.0);

        Self {
            segments,
            total_duration,
        }
    }

    /// Timeline of placeholder segments, one per duration
    pub fn from_durations(durations: &[f64], tail: f64) -> Self {
        let facts: Vec<(String, f64)> = durations
            .iter()
            .enumerate()
            .map(|(i, &d)| (format!("Segment {}", i + 1), d))
            .collect();
        Self::build(&facts, &WordTimingEstimator::default(), tail)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn start_offsets(&self) -> Vec<f64> {
        self.segments.iter().map(|s| s.start_offset).collect()
    }

    /// Index of the segment active at absolute time `t`, if any
    pub fn active_index(&self, t: f64) -> Option<usize> {
        self.segments.iter().position(|s| s.contains(t))
    }

    pub fn active_segment(&self, t: f64) -> Option<(usize, &Segment)> {
        self.active_index(t).map(|i| (i, &self.segments[i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_sum_offsets() {
        let timeline = Timeline::from_durations(&[5.0, 7.0, 4.0], 0.0);

        assert_eq!(timeline.start_offsets(), vec![0.0, 5.0, 12.0]);
        assert_eq!(timeline.total_duration(), 16.0);
        assert_eq!(timeline.active_index(6.0), Some(1));
    }

    #[test]
    fn test_exactly_one_active_segment() {
        let timeline = Timeline::from_durations(&[5.0, 7.0, 4.0], 0.0);

        let mut t = 0.0;
        while t < timeline.total_duration() {
            let active = timeline
                .segments()
                .iter()
                .filter(|s| s.contains(t))
                .count();
            assert_eq!(active, 1, "t = {}", t);
            t += 0.05;
        }

        assert_eq!(timeline.active_index(5.0), Some(1));
        assert_eq!(timeline.active_index(16.0), None);
    }

    #[test]
    fn test_tail_leaves_designed_gap() {
        let timeline = Timeline::from_durations(&[2.0], 1.5);
        assert_eq!(timeline.total_duration(), 3.5);
        assert_eq!(timeline.active_index(2.5), None);
    }

    #[test]
    fn test_word_intervals_match_words() {
        let estimator = WordTimingEstimator::default();
        let facts = [("A group of owls is called a parliament.", 4.2)];
        let timeline = Timeline::build(&facts, &estimator, 0.0);
        let segment = &timeline.segments()[0];

        assert_eq!(segment.words.len(), 8);
        assert_eq!(segment.word_intervals.len(), segment.words.len());
    }

    #[test]
    fn test_current_word_tie_breaks() {
        let estimator = WordTimingEstimator::default();
        let timeline = Timeline::build(&[("Hi wonderful", 2.0)], &estimator, 0.0);
        let segment = &timeline.segments()[0];
        let boundary = segment.word_intervals[0].end;

        assert_eq!(segment.current_word(0.0), 0);
        assert_eq!(segment.current_word(0.3), 0);
        assert_eq!(segment.current_word(boundary), 1);
        assert_eq!(segment.current_word(1.9), 1);
    }
}
