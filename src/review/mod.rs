//! Review scheduling and assessment engine
//!
//! This module provides:
//! - Forgetting-curve stability model that schedules the next review
//! - Due-item selection
//! - Fill-in-the-blank test grading
//! - Memorization probability estimates for ranking and display
//! - JSON file storage with atomic per-item grading

pub mod algorithm;
pub mod due;
pub mod estimator;
pub mod models;
pub mod storage;

pub use algorithm::{apply_grade, apply_grade_now, format_interval, preview_intervals};
pub use due::{is_due, is_due_now, select_due, DueIndex};
pub use estimator::{estimate_recall_probability, estimate_recall_probability_now, rank_by_recall};
pub use fill_test::{grade_fill_test, validate_fill_test, FillTestError, FILL_TEST_SIZE};
pub use models::*;
pub use storage::{ReviewStorage, ReviewStorageError};
