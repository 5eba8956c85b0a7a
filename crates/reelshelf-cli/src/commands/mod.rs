pub mod clear;
pub mod config;
pub mod films;
pub mod progress;
pub mod watchlist;

use crate::output::Output;
use crate::ItemFields;
use color_eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use reelshelf_config::{Config, PathManager};
use reelshelf_core::{FileStore, KeyValueStore, WatchContext};
use reelshelf_models::{CatalogItem, Rating, WatchlistPatch};
use reelshelf_sources::HttpFilmApi;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

/// Resolved configuration and locations for one invocation
pub struct Env {
    pub config: Config,
    pub paths: PathManager,
    pub config_file: PathBuf,
}

impl Env {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let paths = PathManager::default();
        let config_file = config_override.unwrap_or_else(|| paths.config_file());

        let mut config = Config::load_or_default(&config_file)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config.apply_env_overrides();
        config
            .validate()
            .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;

        Ok(Self {
            config,
            paths,
            config_file,
        })
    }

    #[cfg(test)]
    pub fn rooted_at(base: &std::path::Path) -> Self {
        let paths = PathManager::with_base(base.to_path_buf());
        Self {
            config: Config::default(),
            config_file: paths.config_file(),
            paths,
        }
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.config.storage_dir(&self.paths)
    }

    pub fn file_store(&self) -> FileStore {
        FileStore::new(self.storage_dir())
    }

    pub fn watch_context(&self) -> WatchContext<FileStore> {
        WatchContext::open(self.file_store())
    }

    pub fn film_api(&self) -> Result<HttpFilmApi> {
        let timeout = Duration::from_secs(self.config.api.timeout_seconds);
        Ok(HttpFilmApi::new(&self.config.api.base_url, timeout)?)
    }
}

/// Surface a write-through failure after a mutation
pub fn report_persist_error<S: KeyValueStore>(context: &mut WatchContext<S>, output: &Output) -> Result<()> {
    match context.take_persist_error() {
        Some(e) => {
            output.error(format!("Changes were applied but could not be saved: {}", e));
            Err(color_eyre::eyre::eyre!("Failed to save: {}", e))
        }
        None => Ok(()),
    }
}

impl ItemFields {
    pub fn rating_value(&self) -> Option<Rating> {
        self.rating.as_deref().map(Rating::from)
    }

    pub fn to_catalog_item(&self, src: &str, kind: Option<String>) -> CatalogItem {
        CatalogItem {
            src: Some(src.to_string()),
            id: None,
            title: self.title.clone().unwrap_or_default(),
            description: self.description.clone(),
            rating: self.rating_value(),
            category: self.category.clone(),
            kind,
        }
    }

    pub fn to_patch(&self, src: &str, kind: Option<String>) -> WatchlistPatch {
        WatchlistPatch {
            title: self.title.clone(),
            description: self.description.clone(),
            rating: self.rating_value(),
            category: self.category.clone(),
            kind,
            ..WatchlistPatch::new(src)
        }
    }
}

/// Spinner for remote calls, only when a human is watching
pub fn spinner(output: &Output, message: &str) -> Option<ProgressBar> {
    if !output.is_human() || output.is_quiet() || !std::io::stderr().is_terminal() {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
    {
        spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelshelf_models::WatchStatus;

    #[test]
    fn test_item_fields_to_catalog_item() {
        let fields = ItemFields {
            title: Some("Arrival".to_string()),
            rating: Some("7.9".to_string()),
            ..ItemFields::default()
        };
        let item = fields.to_catalog_item("https://img/arrival.jpg", Some("film".to_string()));
        assert_eq!(item.key(), Some("https://img/arrival.jpg"));
        assert_eq!(item.rating, Some(Rating::Score(7.9)));
        assert!(item.description.is_none());
    }

    #[test]
    fn test_item_fields_to_patch_leaves_note_and_status() {
        let fields = ItemFields {
            category: Some("Sci-Fi".to_string()),
            ..ItemFields::default()
        };
        let patch = fields.to_patch("a", None);
        assert_eq!(patch.category.as_deref(), Some("Sci-Fi"));
        assert!(patch.note.is_none());
        assert_eq!(patch.status, None::<WatchStatus>);
        assert!(!patch.is_empty());
        assert!(ItemFields::default().to_patch("a", None).is_empty());
    }
}
