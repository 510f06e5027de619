//! Storage operations for review items
//!
//! Directory structure:
//! ```text
//! {data-dir}/
//! └── items/
//!     └── {item-id}.json   # ReviewItem, including its fill test
//! ```
//!
//! Every grading event is one read-modify-write on a single item file. A
//! per-item lock serializes concurrent grading of the same item, the state is
//! re-read while holding it, and the new state is written to a temp file and
//! renamed into place.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use uuid::Uuid;

use super::algorithm::apply_grade;
use super::due::{select_due, DueIndex};
use super::estimator::estimate_recall_probability;
use super::fill_test::{grade_fill_test, validate_fill_test, FillTestError};
use super::models::*;

#[derive(Error, Debug)]
pub enum ReviewStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Item not found: {0}")]
    ItemNotFound(Uuid),

    #[error("Item {0} has no fill test")]
    NoFillTest(Uuid),

    #[error("Invalid fill test: {0}")]
    InvalidFillTest(#[from] FillTestError),

    #[error("Lock poisoned for item {0}")]
    LockPoisoned(Uuid),
}

pub type Result<T> = std::result::Result<T, ReviewStorageError>;

/// Storage manager for review items
pub struct ReviewStorage {
    items_dir: PathBuf,
    /// One lock per item id, created on first use
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl ReviewStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            items_dir: data_dir.join("items"),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn items_dir(&self) -> &Path {
        &self.items_dir
    }

    fn item_path(&self, id: Uuid) -> PathBuf {
        self.items_dir.join(format!("{}.json", id))
    }

    /// Create the storage directories
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.items_dir)?;
        Ok(())
    }

    fn item_lock(&self, id: Uuid) -> Result<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| ReviewStorageError::LockPoisoned(id))?;
        Ok(Arc::clone(locks.entry(id).or_default()))
    }

    /// Write an item atomically (write to .tmp then rename)
    fn write_item(&self, item: &ReviewItem) -> Result<()> {
        let path = self.item_path(item.id);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_string_pretty(item)?)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Run `f` on the current state of an item and persist what it returns.
    ///
    /// Holds the item's lock from the read through the rename, so two callers
    /// grading the same item are applied one after the other.
    fn update_item<T, F>(&self, id: Uuid, f: F) -> Result<(ReviewItem, T)>
    where
        F: FnOnce(&ReviewItem) -> Result<(ReviewItem, T)>,
    {
        let lock = self.item_lock(id)?;
        let _guard = lock
            .lock()
            .map_err(|_| ReviewStorageError::LockPoisoned(id))?;

        let current = self.get_item(id)?;
        let (next, output) = f(&current)?;
        self.write_item(&next)?;
        Ok((next, output))
    }

    // ==================== Item Operations ====================

    /// Create a new, immediately due item
    pub fn create_item(&self, character: Option<String>) -> Result<ReviewItem> {
        self.init()?;
        let item = ReviewItem::new(character);
        self.write_item(&item)?;
        log::info!("Created review item {} ({})", item.id, item.label());
        Ok(item)
    }

    /// Get a specific item
    pub fn get_item(&self, id: Uuid) -> Result<ReviewItem> {
        let content = match fs::read_to_string(self.item_path(id)) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ReviewStorageError::ItemNotFound(id));
            }
            Err(e) => return Err(e.into()),
        };
        let item: ReviewItem = serde_json::from_str(&content)?;
        Ok(item)
    }

    /// List all items, oldest first
    pub fn list_items(&self) -> Result<Vec<ReviewItem>> {
        if !self.items_dir.exists() {
            return Ok(Vec::new());
        }

        let mut items = Vec::new();
        for entry in fs::read_dir(&self.items_dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                // Deleted between read_dir and the read
                let content = match fs::read_to_string(&path) {
                    Ok(content) => content,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                    Err(e) => return Err(e.into()),
                };
                match serde_json::from_str::<ReviewItem>(&content) {
                    Ok(item) => items.push(item),
                    Err(e) => log::warn!("Skipping unreadable item file {:?}: {}", path, e),
                }
            }
        }

        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    /// Delete an item
    pub fn delete_item(&self, id: Uuid) -> Result<()> {
        {
            let lock = self.item_lock(id)?;
            let _guard = lock
                .lock()
                .map_err(|_| ReviewStorageError::LockPoisoned(id))?;

            let path = self.item_path(id);
            if !path.exists() {
                return Err(ReviewStorageError::ItemNotFound(id));
            }
            fs::remove_file(&path)?;
        }

        if let Ok(mut locks) = self.locks.lock() {
            locks.remove(&id);
        }
        log::info!("Deleted review item {}", id);
        Ok(())
    }

    /// Attach (or replace) the fill test of an item
    pub fn set_fill_test(&self, id: Uuid, test: FillTest) -> Result<ReviewItem> {
        validate_fill_test(&test)?;
        let (item, ()) = self.update_item(id, |current| {
            let mut next = current.clone();
            next.fill_test = Some(test);
            Ok((next, ()))
        })?;
        Ok(item)
    }

    // ==================== Review Operations ====================

    /// Apply a flashcard grade to an item
    pub fn submit_review(&self, id: Uuid, grade: Grade, now: Timestamp) -> Result<ReviewItem> {
        let (item, ()) = self.update_item(id, |current| {
            let mut next = apply_grade(current, grade, now);
            next.review_count = next.review_count.saturating_add(1);
            Ok((next, ()))
        })?;

        log::debug!(
            "Reviewed {} as {}: stability {:.2}d, interval {}d",
            item.id,
            grade,
            item.stability_days,
            item.interval_days
        );
        Ok(item)
    }

    /// Grade a fill-test submission and apply its tier to the item
    pub fn submit_fill_test(
        &self,
        id: Uuid,
        placements: &[Placement],
        now: Timestamp,
    ) -> Result<(GradedResult, ReviewItem)> {
        let (item, result) = self.update_item(id, |current| {
            let test = current
                .fill_test
                .as_ref()
                .ok_or(ReviewStorageError::NoFillTest(id))?;
            let result = grade_fill_test(test, placements);

            let mut next = apply_grade(current, result.tier, now);
            next.test_count = next.test_count.saturating_add(1);
            Ok((next, result))
        })?;

        log::debug!(
            "Fill test for {}: {}/3 correct, tier {}",
            item.id,
            result.correct_count,
            result.tier
        );
        Ok((result, item))
    }

    /// Items due at `now`, never-scheduled ones first
    pub fn due_items(&self, now: Timestamp) -> Result<Vec<ReviewItem>> {
        let items = self.list_items()?;
        let index = DueIndex::build(&items);

        let mut by_id: HashMap<Uuid, ReviewItem> =
            items.into_iter().map(|item| (item.id, item)).collect();
        Ok(index
            .due_ids(now)
            .into_iter()
            .filter_map(|id| by_id.remove(&id))
            .collect())
    }

    /// Aggregate statistics over all items
    pub fn review_stats(&self, now: Timestamp) -> Result<ReviewStats> {
        let items = self.list_items()?;

        let mut stats = ReviewStats {
            total_items: items.len(),
            due_items: select_due(&items, now).len(),
            ..ReviewStats::default()
        };

        let mut recall_sum = 0.0;
        for item in &items {
            match item.repetitions {
                0 => stats.new_items += 1,
                1 | 2 => stats.learning_items += 1,
                _ => stats.mature_items += 1,
            }
            if item.fill_test.is_some() {
                stats.with_fill_test += 1;
            }
            recall_sum += estimate_recall_probability(item, now);
        }

        if !items.is_empty() {
            stats.mean_recall = Some(recall_sum / items.len() as f64);
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::models::FillSentence;
    use tempfile::TempDir;

    const NOW: Timestamp = 1_700_000_000_000;

    fn create_test_storage() -> (ReviewStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = ReviewStorage::new(temp_dir.path().to_path_buf());
        storage.init().unwrap();
        (storage, temp_dir)
    }

    fn sample_test() -> FillTest {
        let sentence = |text: &str, answer_index| FillSentence {
            text: text.to_string(),
            answer_index,
        };
        FillTest {
            phrases: ["吃饭".to_string(), "跑步".to_string(), "睡觉".to_string()],
            sentences: [
                sentence("我每天早上___。", 1),
                sentence("我们中午一起___。", 0),
                sentence("猫整天都在___。", 2),
            ],
        }
    }

    #[test]
    fn test_create_and_get_item() {
        let (storage, _temp) = create_test_storage();

        let created = storage.create_item(Some("学".to_string())).unwrap();
        let loaded = storage.get_item(created.id).unwrap();
        assert_eq!(loaded, created);
        assert_eq!(loaded.next_review_at, Some(0));
    }

    #[test]
    fn test_missing_item() {
        let (storage, _temp) = create_test_storage();
        let id = Uuid::new_v4();
        assert!(matches!(
            storage.get_item(id),
            Err(ReviewStorageError::ItemNotFound(missing)) if missing == id
        ));
        assert!(matches!(
            storage.submit_review(id, Grade::Good, NOW),
            Err(ReviewStorageError::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_list_and_delete() {
        let (storage, _temp) = create_test_storage();

        for c in ["一", "二", "三"] {
            storage.create_item(Some(c.to_string())).unwrap();
        }
        let items = storage.list_items().unwrap();
        assert_eq!(items.len(), 3);

        storage.delete_item(items[1].id).unwrap();
        assert_eq!(storage.list_items().unwrap().len(), 2);
        assert!(storage.delete_item(items[1].id).is_err());
    }

    #[test]
    fn test_submit_review_persists() {
        let (storage, _temp) = create_test_storage();
        let item = storage.create_item(Some("学".to_string())).unwrap();

        let reviewed = storage.submit_review(item.id, Grade::Good, NOW).unwrap();
        assert_eq!(reviewed.repetitions, 1);
        assert_eq!(reviewed.interval_days, 3);
        assert_eq!(reviewed.next_review_at, Some(NOW + 3 * DAY_MS));
        assert_eq!(reviewed.review_count, 1);
        assert_eq!(reviewed.test_count, 0);

        assert_eq!(storage.get_item(item.id).unwrap(), reviewed);
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let (storage, _temp) = create_test_storage();
        let item = storage.create_item(None).unwrap();
        storage.submit_review(item.id, Grade::Hard, NOW).unwrap();

        let names: Vec<String> = fs::read_dir(storage.items_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![format!("{}.json", item.id)]);
    }

    #[test]
    fn test_fill_test_submission() {
        let (storage, _temp) = create_test_storage();
        let item = storage.create_item(Some("吃".to_string())).unwrap();

        assert!(matches!(
            storage.submit_fill_test(item.id, &[], NOW),
            Err(ReviewStorageError::NoFillTest(_))
        ));

        storage.set_fill_test(item.id, sample_test()).unwrap();
        let placements = [Placement::new(0, 1), Placement::new(1, 0), Placement::new(2, 2)];
        let (result, updated) = storage.submit_fill_test(item.id, &placements, NOW).unwrap();

        assert_eq!(result.correct_count, 3);
        assert_eq!(result.tier, Grade::Easy);
        assert_eq!(updated.test_count, 1);
        assert_eq!(updated.review_count, 0);
        assert_eq!(updated.repetitions, 1);
        assert!((updated.stability_days - 33.6).abs() < 1e-9);
        assert_eq!(updated.fill_test, Some(sample_test()));
    }

    #[test]
    fn test_invalid_fill_test_rejected() {
        let (storage, _temp) = create_test_storage();
        let item = storage.create_item(None).unwrap();

        let mut test = sample_test();
        test.sentences[0].answer_index = 5;
        assert!(matches!(
            storage.set_fill_test(item.id, test),
            Err(ReviewStorageError::InvalidFillTest(_))
        ));
        assert!(storage.get_item(item.id).unwrap().fill_test.is_none());
    }

    #[test]
    fn test_due_items() {
        let (storage, _temp) = create_test_storage();
        let fresh = storage.create_item(Some("新".to_string())).unwrap();
        let reviewed = storage.create_item(Some("旧".to_string())).unwrap();
        storage.submit_review(reviewed.id, Grade::Good, NOW).unwrap();

        let due_now: Vec<Uuid> = storage.due_items(NOW).unwrap().iter().map(|i| i.id).collect();
        assert_eq!(due_now, vec![fresh.id]);

        let due_later: Vec<Uuid> = storage
            .due_items(NOW + 3 * DAY_MS)
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(due_later.len(), 2);
        assert_eq!(due_later[0], fresh.id);
        assert!(due_later.contains(&reviewed.id));
    }

    #[test]
    fn test_review_stats() {
        let (storage, _temp) = create_test_storage();
        let a = storage.create_item(None).unwrap();
        let b = storage.create_item(None).unwrap();
        storage.create_item(None).unwrap();

        storage.submit_review(a.id, Grade::Good, NOW).unwrap();
        for _ in 0..3 {
            storage.submit_review(b.id, Grade::Easy, NOW).unwrap();
        }
        storage.set_fill_test(b.id, sample_test()).unwrap();

        let stats = storage.review_stats(NOW).unwrap();
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.new_items, 1);
        assert_eq!(stats.learning_items, 1);
        assert_eq!(stats.mature_items, 1);
        assert_eq!(stats.due_items, 1);
        assert_eq!(stats.with_fill_test, 1);
        assert!(stats.mean_recall.is_some());
    }

    #[test]
    fn test_concurrent_reviews_are_not_lost() {
        let (storage, _temp) = create_test_storage();
        let item = storage.create_item(None).unwrap();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    storage.submit_review(item.id, Grade::Good, NOW).unwrap();
                });
            }
        });

        let final_item = storage.get_item(item.id).unwrap();
        assert_eq!(final_item.review_count, 8);
        assert_eq!(final_item.repetitions, 8);
        let expected = 21.0 * 1.35f64.powi(8);
        assert!((final_item.stability_days - expected).abs() < 1e-6);
    }

    #[test]
    fn test_due_query_survives_concurrent_delete() {
        let (storage, _temp) = create_test_storage();

        for _ in 0..10 {
            let ids: Vec<Uuid> = (0..100)
                .map(|_| storage.create_item(None).unwrap().id)
                .collect();

            std::thread::scope(|scope| {
                scope.spawn(|| {
                    for id in &ids {
                        storage.delete_item(*id).unwrap();
                    }
                });
                for _ in 0..10 {
                    let due = storage.due_items(NOW).unwrap();
                    assert!(due.len() <= ids.len());
                    storage.review_stats(NOW).unwrap();
                }
            });

            assert!(storage.list_items().unwrap().is_empty());
        }
    }

    #[test]
    fn test_get_deleted_item_is_not_found() {
        let (storage, _temp) = create_test_storage();
        let item = storage.create_item(None).unwrap();
        storage.delete_item(item.id).unwrap();
        assert!(matches!(
            storage.get_item(item.id),
            Err(ReviewStorageError::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_lists_record_with_both_stability_keys() {
        let (storage, _temp) = create_test_storage();
        let id = Uuid::new_v4();
        let json = format!(r#"{{"id": "{}", "ease": 2.5, "stabilityDays": 7.0}}"#, id);
        fs::write(storage.items_dir().join(format!("{}.json", id)), json).unwrap();

        let items = storage.list_items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].stability_days, 7.0);
        assert_eq!(storage.due_items(NOW).unwrap().len(), 1);
    }
}
