//! Data models for the review engine

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Epoch milliseconds
pub type Timestamp = i64;

/// Milliseconds in one day
pub const DAY_MS: i64 = 86_400_000;

/// Lower bound for stability, in days
pub const MIN_STABILITY_DAYS: f64 = 0.5;

/// Stability assigned to a freshly created item
pub const INITIAL_STABILITY_DAYS: f64 = 21.0;

/// Current wall-clock time as epoch milliseconds
pub fn now_ms() -> Timestamp {
    Utc::now().timestamp_millis()
}

/// Recall feedback for a single review event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    /// Not recalled
    Again,
    /// Recalled with serious difficulty
    Hard,
    /// Recalled after some hesitation
    Good,
    /// Recalled instantly
    Easy,
}

/// Feedback tier of a fill test. Feeds the same stability update as a flashcard grade.
pub type Tier = Grade;

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Again, Grade::Hard, Grade::Good, Grade::Easy];

    /// Tier for a number of correctly answered fill-test sentences
    pub fn from_correct_count(correct: usize) -> Tier {
        match correct {
            0 => Grade::Again,
            1 => Grade::Hard,
            2 => Grade::Good,
            _ => Grade::Easy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Again => "again",
            Grade::Hard => "hard",
            Grade::Good => "good",
            Grade::Easy => "easy",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid grade '{0}', expected one of: again, hard, good, easy")]
pub struct ParseGradeError(pub String);

impl FromStr for Grade {
    type Err = ParseGradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "again" | "1" => Ok(Grade::Again),
            "hard" | "2" => Ok(Grade::Hard),
            "good" | "3" => Ok(Grade::Good),
            "easy" | "4" => Ok(Grade::Easy),
            _ => Err(ParseGradeError(s.to_string())),
        }
    }
}

/// A reviewable character and its scheduling state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredReviewItem")]
pub struct ReviewItem {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    /// Consecutive non-"again" reviews since the last reset
    #[serde(default)]
    pub repetitions: u32,
    /// Forgetting-curve stability in days. Older records call this `ease`.
    pub stability_days: f64,
    /// Most recently computed interval in days
    #[serde(default = "default_interval_days")]
    pub interval_days: i64,
    /// `None` or `Some(0)` means never scheduled, i.e. due immediately
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review_at: Option<Timestamp>,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub test_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_test: Option<FillTest>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_interval_days() -> i64 {
    1
}

/// On-disk shape of a `ReviewItem`, accepting the legacy `ease` key.
///
/// Records rewritten mid-migration can carry both keys; `stabilityDays` wins.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredReviewItem {
    id: Uuid,
    #[serde(default)]
    character: Option<String>,
    #[serde(default)]
    repetitions: u32,
    #[serde(default)]
    stability_days: Option<f64>,
    #[serde(default)]
    ease: Option<f64>,
    #[serde(default = "default_interval_days")]
    interval_days: i64,
    #[serde(default)]
    next_review_at: Option<Timestamp>,
    #[serde(default)]
    review_count: u32,
    #[serde(default)]
    test_count: u32,
    #[serde(default)]
    fill_test: Option<FillTest>,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
}

impl From<StoredReviewItem> for ReviewItem {
    fn from(stored: StoredReviewItem) -> Self {
        Self {
            id: stored.id,
            character: stored.character,
            repetitions: stored.repetitions,
            stability_days: stored
                .stability_days
                .or(stored.ease)
                .unwrap_or(INITIAL_STABILITY_DAYS),
            interval_days: stored.interval_days,
            next_review_at: stored.next_review_at,
            review_count: stored.review_count,
            test_count: stored.test_count,
            fill_test: stored.fill_test,
            created_at: stored.created_at,
        }
    }
}

impl ReviewItem {
    pub fn new(character: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            character,
            repetitions: 0,
            stability_days: INITIAL_STABILITY_DAYS,
            interval_days: 1,
            next_review_at: Some(0),
            review_count: 0,
            test_count: 0,
            fill_test: None,
            created_at: Utc::now(),
        }
    }

    /// Scheduled review time, with zero normalized to `None`
    pub fn scheduled_at(&self) -> Option<Timestamp> {
        self.next_review_at.filter(|&t| t != 0)
    }

    pub fn label(&self) -> &str {
        self.character.as_deref().unwrap_or("?")
    }
}

/// A sentence with one blank to be filled by a phrase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillSentence {
    pub text: String,
    /// Index into `FillTest::phrases` of the correct phrase
    pub answer_index: usize,
}

/// Multiple-choice fill-in-the-blank test: three phrases, three sentences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillTest {
    /// Display order only
    pub phrases: [String; 3],
    pub sentences: [FillSentence; 3],
}

/// One user action: put a phrase into a sentence's blank.
///
/// Indices are signed so that out-of-range input from the caller survives
/// deserialization and can be rejected by the grader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub sentence_index: i64,
    pub chosen_phrase_index: i64,
}

impl Placement {
    pub fn new(sentence_index: i64, chosen_phrase_index: i64) -> Self {
        Self {
            sentence_index,
            chosen_phrase_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceResult {
    pub sentence_index: usize,
    pub expected_phrase_index: usize,
    pub chosen_phrase_index: Option<usize>,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedResult {
    pub correct_count: usize,
    pub tier: Tier,
    pub sentence_results: Vec<SentenceResult>,
    /// The submitted placements, unmodified
    pub placements: Vec<Placement>,
}

/// Aggregate statistics over all items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_items: usize,
    /// Never successfully reviewed
    pub new_items: usize,
    /// One or two successful reviews in a row
    pub learning_items: usize,
    /// Three or more successful reviews in a row
    pub mature_items: usize,
    pub due_items: usize,
    pub with_fill_test: usize,
    pub mean_recall: Option<f64>,
}
