//! Due-item selection
//!
//! An item is due when its review time has passed or was never set. Zero and
//! missing timestamps both mean "never scheduled".

use std::collections::{BTreeSet, HashSet};

use uuid::Uuid;

use super::models::{ReviewItem, Timestamp};

/// Whether an item with this scheduled time is due at `now`
pub fn is_due(next_review_at: Option<Timestamp>, now: Timestamp) -> bool {
    match next_review_at {
        None | Some(0) => true,
        Some(at) => at <= now,
    }
}

/// `is_due` at the current wall-clock time
pub fn is_due_now(next_review_at: Option<Timestamp>) -> bool {
    is_due(next_review_at, super::models::now_ms())
}

/// Filter a collection down to the items due at `now`
pub fn select_due<'a, I>(items: I, now: Timestamp) -> Vec<&'a ReviewItem>
where
    I: IntoIterator<Item = &'a ReviewItem>,
{
    items
        .into_iter()
        .filter(|item| is_due(item.next_review_at, now))
        .collect()
}

/// Sorted index over scheduled review times.
///
/// A range scan over `scheduled` finds everything with `next_review_at <= now`,
/// but whether an explicit zero lands in that range depends on what the
/// timestamp sorts against. Never-scheduled items are therefore tracked in a
/// separate set and unioned in, then deduplicated by id.
#[derive(Debug, Default, Clone)]
pub struct DueIndex {
    scheduled: BTreeSet<(Timestamp, Uuid)>,
    unscheduled: BTreeSet<Uuid>,
}

impl DueIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a ReviewItem>,
    {
        let mut index = Self::new();
        for item in items {
            index.insert(item.id, item.next_review_at);
        }
        index
    }

    pub fn insert(&mut self, id: Uuid, next_review_at: Option<Timestamp>) {
        if let Some(at) = next_review_at {
            self.scheduled.insert((at, id));
        }
        if matches!(next_review_at, None | Some(0)) {
            self.unscheduled.insert(id);
        }
    }

    /// Ids due at `now`: never-scheduled items first, then by review time
    pub fn due_ids(&self, now: Timestamp) -> Vec<Uuid> {
        let upper = (now, Uuid::from_u128(u128::MAX));
        let overdue = self.scheduled.range(..=upper).map(|(_, id)| *id);

        let mut seen = HashSet::new();
        self.unscheduled
            .iter()
            .copied()
            .chain(overdue)
            .filter(|id| seen.insert(*id))
            .collect()
    }
}
