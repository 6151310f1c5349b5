//! Plain-text export of the active profile's habits.

use std::fs;
use std::path::PathBuf;

use chrono::Local;

use crate::store::{Tracker, TrackerError};
use crate::util::dates;

pub const EXPORT_FILE: &str = "habits-export.txt";

const RULE: &str =
    "════════════════════════════════════════════════════════════";

/// Render the export document for the active profile.
pub fn export_text(tracker: &Tracker) -> Result<String, TrackerError> {
    let profile = tracker
        .active_profile()
        .ok_or(TrackerError::NoActiveProfile)?;
    let today = dates::today();

    let mut lines = vec![
        RULE.to_string(),
        "HABIT TRACKER EXPORT".to_string(),
        RULE.to_string(),
        String::new(),
        format!("Name: {}", profile.name),
        format!("Date: {}", Local::now().format("%Y-%m-%d %H:%M")),
        format!("Total habits: {}", tracker.habits().len()),
        String::new(),
        RULE.to_string(),
        "HABITS".to_string(),
        RULE.to_string(),
        String::new(),
    ];

    for (i, habit) in tracker.habits().iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, habit.name));
        lines.push(format!("   Category: {}", habit.category));
        lines.push(format!("   Target: {}x/week", habit.target_frequency));
        lines.push(format!(
            "   Progress: {}/{} ({:.0}%)",
            habit.completions_in_week_of(today),
            habit.target_frequency,
            habit.progress_percent_on(today)
        ));
        lines.push(format!("   Streak: {} days", habit.current_streak_on(today)));
        lines.push(format!("   Total completions: {}x", habit.completions.len()));
        lines.push(String::new());
    }

    Ok(lines.join("\n"))
}

/// Write the export file into the data directory and return its path.
pub fn write_export(tracker: &Tracker) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let text = export_text(tracker)?;
    let path = tracker.data_dir().join(EXPORT_FILE);
    fs::write(&path, text)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Tracker;
    use tempfile::TempDir;

    #[test]
    fn export_requires_an_active_profile() {
        let dir = TempDir::new().unwrap();
        let tracker = Tracker::load(dir.path());
        assert_eq!(
            export_text(&tracker).unwrap_err(),
            TrackerError::NoActiveProfile
        );
    }

    #[test]
    fn export_lists_every_habit_with_its_numbers() {
        let dir = TempDir::new().unwrap();
        let mut tracker = Tracker::load(dir.path());
        tracker.create_profile("Alice").unwrap();
        let id = tracker.add_habit("Drink Water", 7, "Health").unwrap().id;
        tracker.add_habit("Read", 3, "Productivity").unwrap();
        tracker.complete_habit(id).unwrap();

        let text = export_text(&tracker).unwrap();
        assert!(text.contains("Name: Alice"));
        assert!(text.contains("Total habits: 2"));
        assert!(text.contains("1. Drink Water"));
        assert!(text.contains("   Progress: 1/7 (14%)"));
        assert!(text.contains("   Total completions: 1x"));
        assert!(text.contains("2. Read"));
        assert!(text.contains("   Target: 3x/week"));
    }

    #[test]
    fn write_export_creates_the_file() {
        let dir = TempDir::new().unwrap();
        let mut tracker = Tracker::load(dir.path());
        tracker.create_profile("Alice").unwrap();
        tracker.add_habit("Read", 3, "Productivity").unwrap();

        let path = write_export(&tracker).unwrap();
        assert!(path.exists());
        assert!(path.ends_with(EXPORT_FILE));
    }
}
