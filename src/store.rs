//! The tracker session context: the single owner of the profile list, the
//! active profile id, and the active profile's materialized habit list.
//!
//! Every mutation rewrites the whole document (see `io::data_io`). Profile
//! switches flush the outgoing profile's habits before rehydrating the
//! incoming ones, so unsaved edits are never lost.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::io::data_io::{self, DataError};
use crate::model::habit::{self, Habit, MarkResult, MAX_TARGET, MIN_TARGET};
use crate::model::profile::Profile;
use crate::util::dates;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("name cannot be empty")]
    EmptyName,
    #[error("target frequency must be between {MIN_TARGET} and {MAX_TARGET}")]
    InvalidFrequency,
    #[error("habit not found")]
    HabitNotFound,
    #[error("profile not found")]
    ProfileNotFound,
    #[error("cannot delete the last remaining profile")]
    LastProfile,
    #[error("no active profile")]
    NoActiveProfile,
}

/// Habit list filter for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HabitFilter {
    #[default]
    All,
    /// Weekly target not yet met.
    Active,
    /// Weekly target met.
    Completed,
}

/// Field-wise habit edit; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct HabitEdit {
    pub name: Option<String>,
    pub target_frequency: Option<u32>,
    pub category: Option<String>,
}

impl HabitEdit {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.target_frequency.is_none() && self.category.is_none()
    }
}

pub struct Tracker {
    data_dir: PathBuf,
    profiles: Vec<Profile>,
    active_id: Option<i64>,
    /// The active profile's habits, materialized in memory.
    habits: Vec<Habit>,
}

impl Tracker {
    /// Load the session from the data directory. Missing or corrupt data
    /// reads as an empty tracker.
    pub fn load(data_dir: &Path) -> Tracker {
        let mut tracker = Tracker {
            data_dir: data_dir.to_path_buf(),
            profiles: Vec::new(),
            active_id: None,
            habits: Vec::new(),
        };

        let Some(data) = data_io::read_data(data_dir) else {
            return tracker;
        };

        tracker.profiles = data.profiles.clone();
        tracker.active_id = data
            .current_profile_id
            .filter(|id| tracker.profiles.iter().any(|p| p.id == *id));
        if let Some(id) = tracker.active_id {
            tracker.habits = data.habits_for(id).cloned().unwrap_or_default();
        }
        tracker
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn active_profile(&self) -> Option<&Profile> {
        let id = self.active_id?;
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn habit_by_id(&self, id: i64) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    /// Habits matching a display filter, in stored order.
    pub fn habits_filtered(&self, filter: HabitFilter) -> Vec<&Habit> {
        self.habits
            .iter()
            .filter(|h| match filter {
                HabitFilter::All => true,
                HabitFilter::Active => !h.is_completed_this_week(),
                HabitFilter::Completed => h.is_completed_this_week(),
            })
            .collect()
    }

    /// Habits not yet completed today, for reminders and notifications.
    pub fn pending_today(&self) -> Vec<&Habit> {
        self.habits.iter().filter(|h| !h.is_completed_today()).collect()
    }

    /// Recompute the active profile's streak counters from its habits.
    pub fn update_active_stats(&mut self) {
        let Some(id) = self.active_id else { return };
        let today = dates::today();
        if let Some(profile) = self.profiles.iter_mut().find(|p| p.id == id) {
            profile.update_stats_on(&self.habits, today);
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Whole-document read-modify-write. The on-disk document is re-read so
    /// habit lists of profiles not in memory are preserved, then the active
    /// profile's habits are merged in and the document written back.
    pub fn try_save(&self) -> Result<(), DataError> {
        let mut data = data_io::read_data(&self.data_dir).unwrap_or_default();
        data.profiles = self.profiles.clone();
        data.current_profile_id = self.active_id;
        if let Some(id) = self.active_id {
            data.set_habits(id, self.habits.clone());
        }
        data.ensure_profile_keys();
        data_io::write_data(&self.data_dir, &data)
    }

    /// Best-effort save: a write failure is logged and the in-memory
    /// session continues.
    pub fn save(&self) {
        if let Err(e) = self.try_save() {
            eprintln!("warning: could not save data: {}", e);
        }
    }

    /// Habit count for any profile, read from the on-disk document without
    /// touching the materialized list.
    pub fn habit_count_for(&self, profile_id: i64) -> usize {
        data_io::read_data(&self.data_dir)
            .and_then(|data| data.habits_for(profile_id).map(Vec::len))
            .unwrap_or(0)
    }

    // -----------------------------------------------------------------------
    // Profile management
    // -----------------------------------------------------------------------

    /// Create a profile and make it active with an empty habit list. The
    /// outgoing profile's habits are flushed first.
    pub fn create_profile(&mut self, name: &str) -> Result<&Profile, TrackerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::EmptyName);
        }

        // Flush the outgoing profile before we repoint the session
        if self.active_id.is_some() {
            self.save();
        }

        let id = self.next_profile_id();
        self.profiles.push(Profile::new(id, name.to_string()));
        self.active_id = Some(id);
        self.habits = Vec::new();
        self.save();

        Ok(self.profiles.last().expect("just pushed"))
    }

    pub fn profile_by_name(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Switch the active profile. Flush-before-rehydrate: the outgoing
    /// habit list is written under the outgoing id before the incoming
    /// records are materialized.
    pub fn switch_profile(&mut self, profile_id: i64) -> Result<(), TrackerError> {
        if !self.profiles.iter().any(|p| p.id == profile_id) {
            return Err(TrackerError::ProfileNotFound);
        }

        if self.active_id.is_some() {
            self.save();
        }
        self.active_id = Some(profile_id);
        self.habits = data_io::read_data(&self.data_dir)
            .and_then(|data| data.habits_for(profile_id).cloned())
            .unwrap_or_default();
        self.save();
        Ok(())
    }

    /// Delete a profile and its habit list. Rejected while it is the only
    /// remaining profile. If it was active, activity transfers to the first
    /// remaining profile and that profile's habits are loaded.
    pub fn delete_profile(&mut self, profile_id: i64) -> Result<Profile, TrackerError> {
        if self.profiles.len() <= 1 {
            return Err(TrackerError::LastProfile);
        }
        let index = self
            .profiles
            .iter()
            .position(|p| p.id == profile_id)
            .ok_or(TrackerError::ProfileNotFound)?;
        let removed = self.profiles.remove(index);

        if self.active_id == Some(profile_id) {
            self.active_id = self.profiles.first().map(|p| p.id);
            self.habits = match self.active_id {
                Some(id) => data_io::read_data(&self.data_dir)
                    .and_then(|data| data.habits_for(id).cloned())
                    .unwrap_or_default(),
                None => Vec::new(),
            };
        }

        // Rewrite the document without the deleted profile's habit key
        let mut data = data_io::read_data(&self.data_dir).unwrap_or_default();
        data.remove_habits(profile_id);
        data.profiles = self.profiles.clone();
        data.current_profile_id = self.active_id;
        data.ensure_profile_keys();
        if let Err(e) = data_io::write_data(&self.data_dir, &data) {
            eprintln!("warning: could not save data: {}", e);
        }

        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Habit management (id-keyed)
    // -----------------------------------------------------------------------

    pub fn add_habit(
        &mut self,
        name: &str,
        target_frequency: u32,
        category: &str,
    ) -> Result<&Habit, TrackerError> {
        if self.active_id.is_none() {
            return Err(TrackerError::NoActiveProfile);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::EmptyName);
        }
        if !(MIN_TARGET..=MAX_TARGET).contains(&target_frequency) {
            return Err(TrackerError::InvalidFrequency);
        }

        let category = if category.trim().is_empty() {
            habit::default_category()
        } else {
            category.trim().to_string()
        };
        let id = self.next_habit_id();
        self.habits
            .push(Habit::new(id, name.to_string(), target_frequency, category));
        self.save();
        Ok(self.habits.last().expect("just pushed"))
    }

    pub fn edit_habit(&mut self, id: i64, edit: HabitEdit) -> Result<&Habit, TrackerError> {
        if let Some(name) = &edit.name {
            if name.trim().is_empty() {
                return Err(TrackerError::EmptyName);
            }
        }
        if let Some(freq) = edit.target_frequency {
            if !(MIN_TARGET..=MAX_TARGET).contains(&freq) {
                return Err(TrackerError::InvalidFrequency);
            }
        }

        let index = self
            .habits
            .iter()
            .position(|h| h.id == id)
            .ok_or(TrackerError::HabitNotFound)?;
        {
            let habit = &mut self.habits[index];
            if let Some(name) = edit.name {
                habit.name = name.trim().to_string();
            }
            if let Some(freq) = edit.target_frequency {
                habit.target_frequency = freq;
            }
            if let Some(category) = edit.category {
                habit.category = category.trim().to_string();
            }
        }
        self.save();
        Ok(&self.habits[index])
    }

    /// Record today's completion for a habit. Saves only when a new ledger
    /// entry was actually recorded.
    pub fn complete_habit(&mut self, id: i64) -> Result<MarkResult, TrackerError> {
        let habit = self
            .habits
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or(TrackerError::HabitNotFound)?;
        let result = habit.mark_complete();
        if result == MarkResult::Recorded {
            self.save();
        }
        Ok(result)
    }

    pub fn delete_habit(&mut self, id: i64) -> Result<Habit, TrackerError> {
        let index = self
            .habits
            .iter()
            .position(|h| h.id == id)
            .ok_or(TrackerError::HabitNotFound)?;
        let removed = self.habits.remove(index);
        self.save();
        Ok(removed)
    }

    /// Bulk-clear the active profile's habit list. Returns how many were
    /// removed.
    pub fn clear_habits(&mut self) -> usize {
        let count = self.habits.len();
        self.habits.clear();
        self.save();
        count
    }

    /// Seed a handful of sample habits for demos and first runs.
    pub fn seed_demo_habits(&mut self) -> Result<usize, TrackerError> {
        const DEMO: &[(&str, u32, &str)] = &[
            ("Drink 8 Glasses of Water", 7, "Health"),
            ("Exercise 30 Minutes", 5, "Health"),
            ("Read 30 Minutes", 5, "Productivity"),
            ("Meditate 10 Minutes", 7, "Health"),
            ("Practice Coding", 6, "Productivity"),
        ];
        for (name, freq, category) in DEMO {
            self.add_habit(name, *freq, category)?;
        }
        Ok(DEMO.len())
    }

    // -----------------------------------------------------------------------
    // Id assignment
    // -----------------------------------------------------------------------

    // Millisecond timestamps bumped past any collision. Ids are never
    // reused: deletion leaves no smaller free id that a later creation
    // could reclaim.
    fn next_habit_id(&self) -> i64 {
        let mut id = Utc::now().timestamp_millis();
        while self.habits.iter().any(|h| h.id == id) {
            id += 1;
        }
        id
    }

    fn next_profile_id(&self) -> i64 {
        let mut id = Utc::now().timestamp_millis();
        while self.profiles.iter().any(|p| p.id == id) {
            id += 1;
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn tracker_with_profile(dir: &TempDir) -> Tracker {
        let mut tracker = Tracker::load(dir.path());
        tracker.create_profile("Alice").unwrap();
        tracker
    }

    #[test]
    fn add_habit_validates_input() {
        let dir = TempDir::new().unwrap();
        let mut tracker = Tracker::load(dir.path());

        // No active profile yet
        assert_eq!(
            tracker.add_habit("Read", 3, "General").unwrap_err(),
            TrackerError::NoActiveProfile
        );

        tracker.create_profile("Alice").unwrap();
        assert_eq!(
            tracker.add_habit("   ", 3, "General").unwrap_err(),
            TrackerError::EmptyName
        );
        assert_eq!(
            tracker.add_habit("Read", 0, "General").unwrap_err(),
            TrackerError::InvalidFrequency
        );
        assert_eq!(
            tracker.add_habit("Read", 8, "General").unwrap_err(),
            TrackerError::InvalidFrequency
        );

        let habit = tracker.add_habit("Read", 3, "").unwrap();
        assert_eq!(habit.name, "Read");
        assert_eq!(habit.category, "General");
    }

    #[test]
    fn save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut tracker = tracker_with_profile(&dir);
        tracker.add_habit("Drink Water", 7, "Health").unwrap();
        tracker.add_habit("Stretch", 2, "Health").unwrap();
        let ids: Vec<i64> = tracker.habits().iter().map(|h| h.id).collect();

        let reloaded = Tracker::load(dir.path());
        assert_eq!(reloaded.active_profile().unwrap().name, "Alice");
        let loaded_ids: Vec<i64> = reloaded.habits().iter().map(|h| h.id).collect();
        assert_eq!(loaded_ids, ids);
        assert_eq!(reloaded.habits()[0].name, "Drink Water");
        assert_eq!(reloaded.habits()[1].target_frequency, 2);
    }

    #[test]
    fn complete_habit_saves_only_new_entries() {
        let dir = TempDir::new().unwrap();
        let mut tracker = tracker_with_profile(&dir);
        let id = tracker.add_habit("Drink Water", 7, "Health").unwrap().id;

        assert_eq!(tracker.complete_habit(id).unwrap(), MarkResult::Recorded);
        assert_eq!(
            tracker.complete_habit(id).unwrap(),
            MarkResult::AlreadyCompleted
        );
        let habit = tracker.habit_by_id(id).unwrap();
        assert_eq!(habit.completions.len(), 1);
        assert!(habit.is_completed_today());
        assert!(!habit.is_completed_this_week());

        assert_eq!(
            tracker.complete_habit(9999).unwrap_err(),
            TrackerError::HabitNotFound
        );
    }

    #[test]
    fn switch_profile_preserves_unsaved_edits_of_outgoing_profile() {
        let dir = TempDir::new().unwrap();
        let mut tracker = tracker_with_profile(&dir);
        let alice = tracker.active_profile().unwrap().id;
        tracker.add_habit("Journal", 4, "General").unwrap();
        tracker.create_profile("Bob").unwrap();
        let bob = tracker.active_profile().unwrap().id;
        tracker.add_habit("Run", 3, "Health").unwrap();

        // Mutate Alice's list in memory through the session, then switch away
        tracker.switch_profile(alice).unwrap();
        let id = tracker.add_habit("Stretch", 2, "Health").unwrap().id;
        tracker
            .edit_habit(
                id,
                HabitEdit {
                    name: Some("Morning Stretch".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        tracker.switch_profile(bob).unwrap();
        assert_eq!(tracker.habits().len(), 1);
        assert_eq!(tracker.habits()[0].name, "Run");

        // Alice's edits survived the switch, Bob's list was not disturbed
        tracker.switch_profile(alice).unwrap();
        let names: Vec<&str> = tracker.habits().iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Journal", "Morning Stretch"]);

        let data = data_io::read_data(dir.path()).unwrap();
        assert_eq!(data.habits_for(bob).unwrap().len(), 1);
    }

    #[test]
    fn habit_count_for_reads_without_switching() {
        let dir = TempDir::new().unwrap();
        let mut tracker = tracker_with_profile(&dir);
        let alice = tracker.active_profile().unwrap().id;
        tracker.add_habit("Journal", 4, "General").unwrap();
        tracker.create_profile("Bob").unwrap();
        let bob = tracker.active_profile().unwrap().id;

        assert_eq!(tracker.habit_count_for(alice), 1);
        assert_eq!(tracker.habit_count_for(bob), 0);
        // Still on Bob
        assert_eq!(tracker.active_profile().unwrap().id, bob);
    }

    #[test]
    fn delete_last_profile_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut tracker = tracker_with_profile(&dir);
        let alice = tracker.active_profile().unwrap().id;
        tracker.add_habit("Journal", 4, "General").unwrap();

        assert_eq!(
            tracker.delete_profile(alice).unwrap_err(),
            TrackerError::LastProfile
        );
        // Profile and its habit map entry remain intact
        assert_eq!(tracker.profiles().len(), 1);
        let data = data_io::read_data(dir.path()).unwrap();
        assert_eq!(data.habits_for(alice).unwrap().len(), 1);
    }

    #[test]
    fn delete_active_profile_transfers_activity() {
        let dir = TempDir::new().unwrap();
        let mut tracker = tracker_with_profile(&dir);
        let alice = tracker.active_profile().unwrap().id;
        tracker.add_habit("Journal", 4, "General").unwrap();
        tracker.create_profile("Bob").unwrap();
        let bob = tracker.active_profile().unwrap().id;

        let removed = tracker.delete_profile(bob).unwrap();
        assert_eq!(removed.name, "Bob");
        assert_eq!(tracker.active_profile().unwrap().id, alice);
        assert_eq!(tracker.habits().len(), 1);

        let data = data_io::read_data(dir.path()).unwrap();
        assert!(data.habits_for(bob).is_none());
        assert_eq!(data.current_profile_id, Some(alice));
    }

    #[test]
    fn clear_habits_empties_the_active_list() {
        let dir = TempDir::new().unwrap();
        let mut tracker = tracker_with_profile(&dir);
        tracker.seed_demo_habits().unwrap();
        assert_eq!(tracker.clear_habits(), 5);
        assert!(tracker.habits().is_empty());

        let reloaded = Tracker::load(dir.path());
        assert!(reloaded.habits().is_empty());
    }

    #[test]
    fn habit_ids_are_unique() {
        let dir = TempDir::new().unwrap();
        let mut tracker = tracker_with_profile(&dir);
        tracker.seed_demo_habits().unwrap();
        let mut ids: Vec<i64> = tracker.habits().iter().map(|h| h.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn update_active_stats_rolls_up_streaks() {
        let dir = TempDir::new().unwrap();
        let mut tracker = tracker_with_profile(&dir);
        let id = tracker.add_habit("Drink Water", 7, "Health").unwrap().id;
        tracker.complete_habit(id).unwrap();

        tracker.update_active_stats();
        let profile = tracker.active_profile().unwrap();
        assert_eq!(profile.current_streak, 1);
        assert_eq!(profile.longest_streak, 1);
    }
}
