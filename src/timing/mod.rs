//! # Timing Module
//!
//! Word-level timing inside each narrated segment and the back-to-back
//! layout of segments on the shared audio timeline.
//!
//! ## Usage
//!
//! ```rust
//! use shorts_compositor::config::TimingConfig;
//! use shorts_compositor::timing::{Timeline, WordTimingEstimator};
//!
//! let estimator = WordTimingEstimator::new(TimingConfig::default());
//! let intervals = estimator.estimate(&["Hi", "wonderful"], 2.0);
//! assert_eq!(intervals.len(), 2);
//!
//! let timeline = Timeline::from_durations(&[5.0, 7.0, 4.0], 0.0);
//! assert_eq!(timeline.active_index(6.0), Some(1));
//! ```

pub mod estimator;
pub mod timeline;

pub use estimator::{syllable_count, WordInterval, WordTimingEstimator};
pub use timeline::{Segment, Timeline};
