use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::habit::Habit;
use crate::util::dates;

/// One user. Exactly one profile is active at a time; its habits are the
/// ones materialized in memory by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    #[serde(default = "default_profile_name")]
    pub name: String,
    #[serde(default = "Utc::now")]
    pub join_date: DateTime<Utc>,
    /// Maximum current streak across this profile's habits, as of the last
    /// `update_stats` call.
    #[serde(default)]
    pub current_streak: u32,
    /// High-water mark of `current_streak`. Never decreases.
    #[serde(default)]
    pub longest_streak: u32,
}

fn default_profile_name() -> String {
    "User".to_string()
}

impl Profile {
    pub fn new(id: i64, name: String) -> Self {
        Profile {
            id,
            name,
            join_date: Utc::now(),
            current_streak: 0,
            longest_streak: 0,
        }
    }

    /// Recompute `current_streak` from the given habits and raise
    /// `longest_streak` if exceeded. Not kept in sync automatically; callers
    /// invoke this before displaying stats.
    pub fn update_stats(&mut self, habits: &[Habit]) {
        self.update_stats_on(habits, dates::today());
    }

    pub fn update_stats_on(&mut self, habits: &[Habit], today: NaiveDate) {
        let max = habits
            .iter()
            .map(|h| h.current_streak_on(today))
            .max()
            .unwrap_or(0);
        self.current_streak = max;
        if max > self.longest_streak {
            self.longest_streak = max;
        }
    }

    /// Days since this profile was created (ceiling).
    pub fn days_joined(&self) -> i64 {
        dates::days_between(self.join_date, Utc::now())
    }

    /// How many of the given habits have met their weekly target.
    pub fn completed_this_week(&self, habits: &[Habit]) -> usize {
        habits.iter().filter(|h| h.is_completed_this_week()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::habit::MarkResult;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn update_stats_takes_max_streak_across_habits() {
        let today = d(2025, 6, 4);
        let mut a = Habit::new(1, "Read".into(), 7, "General".into());
        let mut b = Habit::new(2, "Run".into(), 7, "Health".into());
        a.mark_complete_on(today);
        b.mark_complete_on(d(2025, 6, 3));
        b.mark_complete_on(today);

        let mut p = Profile::new(10, "Alice".into());
        p.update_stats_on(&[a, b], today);
        assert_eq!(p.current_streak, 2);
        assert_eq!(p.longest_streak, 2);
    }

    #[test]
    fn longest_streak_is_monotonic() {
        let today = d(2025, 6, 4);
        let mut h = Habit::new(1, "Read".into(), 7, "General".into());
        h.mark_complete_on(d(2025, 6, 3));
        h.mark_complete_on(today);

        let mut p = Profile::new(10, "Alice".into());
        p.update_stats_on(std::slice::from_ref(&h), today);
        assert_eq!(p.longest_streak, 2);

        // Two days later the run is broken: current drops, longest holds
        let later = d(2025, 6, 6);
        p.update_stats_on(std::slice::from_ref(&h), later);
        assert_eq!(p.current_streak, 0);
        assert_eq!(p.longest_streak, 2);

        // No habits at all clamps current to zero
        p.update_stats_on(&[], later);
        assert_eq!(p.current_streak, 0);
        assert_eq!(p.longest_streak, 2);
    }

    #[test]
    fn completed_this_week_counts_habits_meeting_target() {
        let today = crate::util::dates::today();
        let mut met = Habit::new(1, "Stretch".into(), 1, "Health".into());
        assert_eq!(met.mark_complete_on(today), MarkResult::Recorded);
        let unmet = Habit::new(2, "Write".into(), 5, "General".into());

        let p = Profile::new(10, "Alice".into());
        assert_eq!(p.completed_this_week(&[met, unmet]), 1);
    }

    #[test]
    fn revival_defaults_on_minimal_record() {
        let p: Profile = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert_eq!(p.id, 7);
        assert_eq!(p.name, "User");
        assert_eq!(p.current_streak, 0);
        assert_eq!(p.longest_streak, 0);
    }
}
