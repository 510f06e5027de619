use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use hanzi_review_lib::config::{resolve_data_dir, ReviewConfig};
use hanzi_review_lib::{ReviewItem, ReviewStorage};

/// Shared application state for CLI commands
pub struct App {
    pub data_dir: PathBuf,
    pub config: ReviewConfig,
    pub storage: ReviewStorage,
}

impl App {
    pub fn new(data_dir: Option<&Path>) -> Result<Self> {
        let data_dir = resolve_data_dir(data_dir).context("Failed to get data directory")?;
        let config = ReviewConfig::load(&data_dir)
            .with_context(|| format!("Failed to load config from {}", data_dir.display()))?;

        let storage = ReviewStorage::new(data_dir.clone());
        storage
            .init()
            .context("Failed to initialize review storage")?;

        Ok(Self {
            data_dir,
            config,
            storage,
        })
    }

    /// Find an item by id prefix (case-insensitive)
    pub fn find_item(&self, prefix: &str) -> Result<ReviewItem> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            bail!("Item id must not be empty");
        }

        let items = self.storage.list_items().context("Failed to list items")?;
        let matches: Vec<&ReviewItem> = items
            .iter()
            .filter(|item| item.id.to_string().starts_with(&prefix))
            .collect();

        match matches.len() {
            0 => bail!("No item with id starting '{}'", prefix),
            1 => Ok(matches[0].clone()),
            _ => bail!(
                "Ambiguous item id '{}'. Matches:\n{}",
                prefix,
                matches
                    .iter()
                    .map(|item| format!("  - {} ({})", item.id, item.label()))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
        }
    }
}
