//! Spaced-repetition review engine for Chinese characters.
//!
//! Scheduling, due selection, fill-test grading and recall estimates live in
//! [`review`]; they are pure functions of their inputs. [`review::ReviewStorage`]
//! persists items as JSON and applies each grading event atomically.

pub mod config;
pub mod review;

pub use config::{ConfigError, ReviewConfig};
pub use review::{
    apply_grade, estimate_recall_probability, grade_fill_test, is_due, FillSentence, FillTest,
    Grade, GradedResult, Placement, ReviewItem, ReviewStorage, ReviewStorageError, Tier,
    Timestamp,
};
