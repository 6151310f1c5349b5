//! The persisted JSON document holding all profiles and their habit lists.
//!
//! The document is always rewritten whole (read-modify-write) so that
//! habit lists belonging to profiles not currently in memory survive every
//! save. A missing or corrupt file reads as "no prior data", never as a
//! fatal error.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::habit::Habit;
use crate::model::profile::Profile;

pub const DATA_FILE: &str = "habits.json";

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not encode data file: {0}")]
    Encode(#[from] serde_json::Error),
}

/// On-disk document: all profiles, the active profile id, and a map from
/// profile id (stringified, as JSON object keys are strings) to that
/// profile's habit records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFile {
    #[serde(default)]
    pub profiles: Vec<Profile>,
    #[serde(default)]
    pub current_profile_id: Option<i64>,
    #[serde(default)]
    pub profile_habits: IndexMap<String, Vec<Habit>>,
}

impl DataFile {
    pub fn habits_for(&self, profile_id: i64) -> Option<&Vec<Habit>> {
        self.profile_habits.get(&profile_id.to_string())
    }

    pub fn set_habits(&mut self, profile_id: i64, habits: Vec<Habit>) {
        self.profile_habits.insert(profile_id.to_string(), habits);
    }

    pub fn remove_habits(&mut self, profile_id: i64) {
        self.profile_habits.shift_remove(&profile_id.to_string());
    }

    /// Invariant after any save: every profile id has a (possibly empty)
    /// key in `profile_habits`.
    pub fn ensure_profile_keys(&mut self) {
        for id in self.profiles.iter().map(|p| p.id).collect::<Vec<_>>() {
            self.profile_habits
                .entry(id.to_string())
                .or_insert_with(Vec::new);
        }
    }
}

pub fn data_path(dir: &Path) -> PathBuf {
    dir.join(DATA_FILE)
}

/// Read the document. Missing file → `None`. Corrupt file → logged warning
/// and `None` (treated as no prior data).
pub fn read_data(dir: &Path) -> Option<DataFile> {
    let path = data_path(dir);
    let content = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(data) => Some(data),
        Err(e) => {
            eprintln!("warning: could not parse {}: {}", path.display(), e);
            None
        }
    }
}

/// Write the whole document, creating the data directory if needed.
pub fn write_data(dir: &Path, data: &DataFile) -> Result<(), DataError> {
    let path = data_path(dir);
    fs::create_dir_all(dir).map_err(|e| DataError::Write {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let content = serde_json::to_string_pretty(data)?;
    fs::write(&path, content).map_err(|e| DataError::Write { path, source: e })
}

/// Data directory resolution: `$HABITA_DIR`, else `$HOME/.habita`, else
/// `.habita` in the current directory.
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("HABITA_DIR") {
        return PathBuf::from(dir);
    }
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".habita"),
        Err(_) => PathBuf::from(".habita"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> DataFile {
        let mut data = DataFile {
            profiles: vec![Profile::new(1, "Alice".into()), Profile::new(2, "Bob".into())],
            current_profile_id: Some(1),
            ..Default::default()
        };
        data.set_habits(
            1,
            vec![Habit::new(100, "Drink Water".into(), 7, "Health".into())],
        );
        data.ensure_profile_keys();
        data
    }

    #[test]
    fn write_and_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let data = sample();
        write_data(dir.path(), &data).unwrap();

        let loaded = read_data(dir.path()).unwrap();
        assert_eq!(loaded.profiles.len(), 2);
        assert_eq!(loaded.current_profile_id, Some(1));
        let habits = loaded.habits_for(1).unwrap();
        assert_eq!(habits.len(), 1);
        assert_eq!(habits[0].id, 100);
        assert_eq!(habits[0].name, "Drink Water");
        assert_eq!(habits[0].target_frequency, 7);
        assert_eq!(habits[0].category, "Health");
        // Bob got an empty key
        assert_eq!(loaded.habits_for(2).unwrap().len(), 0);
    }

    #[test]
    fn read_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_data(dir.path()).is_none());
    }

    #[test]
    fn read_malformed_json_returns_none() {
        let dir = TempDir::new().unwrap();
        fs::write(data_path(dir.path()), "not json {{{").unwrap();
        assert!(read_data(dir.path()).is_none());
    }

    #[test]
    fn document_uses_schema_field_names() {
        let data = sample();
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("profiles").is_some());
        assert!(json.get("currentProfileId").is_some());
        let map = json.get("profileHabits").unwrap().as_object().unwrap();
        assert!(map.contains_key("1"));
        assert!(map.contains_key("2"));
    }
}
