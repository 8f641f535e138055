use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::TriageStatus;
use crate::theme::Theme;

const TRIAGE_FILE: &str = "triage.json";
const THEME_FILE: &str = "theme.json";

/// Local persisted state: the url → triage mapping and the theme preference,
/// each in its own JSON file under the platform data directory. Every
/// mutation writes through synchronously; malformed files reset to empty
/// rather than failing startup.
pub struct StateStore {
    dir: PathBuf,
    triage: HashMap<String, TriageStatus>,
}

impl StateStore {
    pub fn open() -> Result<Self> {
        Self::open_at(Self::default_dir())
    }

    pub fn open_at(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create state directory {}", dir.display()))?;
        let triage = load_triage(&dir.join(TRIAGE_FILE));
        Ok(Self { dir, triage })
    }

    fn default_dir() -> PathBuf {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "geier") {
            proj_dirs.data_dir().to_path_buf()
        } else {
            PathBuf::from(".")
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn triage(&self) -> &HashMap<String, TriageStatus> {
        &self.triage
    }

    pub fn status_of(&self, url: &str) -> Option<TriageStatus> {
        self.triage.get(url).copied()
    }

    /// `todo` toggles: a second press clears the entry entirely, so no stale
    /// markers linger in the mapping. Returns the status now in effect.
    pub fn toggle_todo(&mut self, url: &str) -> Result<Option<TriageStatus>> {
        if self.triage.get(url) == Some(&TriageStatus::Todo) {
            self.triage.remove(url);
        } else {
            self.triage.insert(url.to_string(), TriageStatus::Todo);
        }
        self.save_triage()?;
        Ok(self.status_of(url))
    }

    /// `done` and `skip` set unconditionally; states are exclusive, last
    /// write wins.
    pub fn mark(&mut self, url: &str, status: TriageStatus) -> Result<()> {
        self.triage.insert(url.to_string(), status);
        self.save_triage()
    }

    fn save_triage(&self) -> Result<()> {
        let path = self.dir.join(TRIAGE_FILE);
        let json = serde_json::to_string_pretty(&self.triage)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn theme(&self) -> Option<Theme> {
        let raw = fs::read_to_string(self.dir.join(THEME_FILE)).ok()?;
        serde_json::from_str(&raw).ok()
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        let path = self.dir.join(THEME_FILE);
        fs::write(&path, serde_json::to_string(&theme)?)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

fn load_triage(path: &Path) -> HashMap<String, TriageStatus> {
    let Ok(raw) = fs::read_to_string(path) else {
        return HashMap::new();
    };
    match serde_json::from_str(&raw) {
        Ok(map) => map,
        Err(err) => {
            log::warn!("Resetting malformed triage state at {}: {}", path.display(), err);
            HashMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> StateStore {
        let dir = std::env::temp_dir().join(format!(
            "geier-store-test-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        StateStore::open_at(dir).expect("store should open")
    }

    #[test]
    fn fresh_store_is_untriaged() {
        let store = temp_store("fresh");
        assert!(store.triage().is_empty());
        assert_eq!(store.status_of("a"), None);
    }

    #[test]
    fn toggle_todo_twice_returns_to_absent() {
        let mut store = temp_store("toggle");
        assert_eq!(store.toggle_todo("a").unwrap(), Some(TriageStatus::Todo));
        assert_eq!(store.toggle_todo("a").unwrap(), None);
        assert!(store.triage().is_empty());
    }

    #[test]
    fn done_then_skip_leaves_only_skip() {
        let mut store = temp_store("exclusive");
        store.mark("a", TriageStatus::Done).unwrap();
        store.mark("a", TriageStatus::Skip).unwrap();
        assert_eq!(store.status_of("a"), Some(TriageStatus::Skip));
        assert_eq!(store.triage().len(), 1);
    }

    #[test]
    fn todo_toggle_replaces_other_states() {
        let mut store = temp_store("replace");
        store.mark("a", TriageStatus::Done).unwrap();
        assert_eq!(store.toggle_todo("a").unwrap(), Some(TriageStatus::Todo));
    }

    #[test]
    fn triage_round_trips_through_disk() {
        let mut store = temp_store("roundtrip");
        store.mark("a", TriageStatus::Done).unwrap();
        store.toggle_todo("b").unwrap();
        store.mark("c", TriageStatus::Skip).unwrap();

        let reopened = StateStore::open_at(store.dir().to_path_buf()).unwrap();
        assert_eq!(reopened.triage(), store.triage());
    }

    #[test]
    fn malformed_triage_file_resets_to_empty() {
        let store = temp_store("malformed");
        fs::write(store.dir().join(TRIAGE_FILE), "{not json").unwrap();

        let reopened = StateStore::open_at(store.dir().to_path_buf()).unwrap();
        assert!(reopened.triage().is_empty());
    }

    #[test]
    fn theme_round_trips_and_defaults_to_none() {
        let store = temp_store("theme");
        assert_eq!(store.theme(), None);
        store.set_theme(Theme::Dark).unwrap();
        assert_eq!(store.theme(), Some(Theme::Dark));
        store.set_theme(Theme::Light).unwrap();
        assert_eq!(store.theme(), Some(Theme::Light));
    }

    #[test]
    fn malformed_theme_file_reads_as_none() {
        let store = temp_store("badtheme");
        fs::write(store.dir().join(THEME_FILE), "purple").unwrap();
        assert_eq!(store.theme(), None);
    }
}
