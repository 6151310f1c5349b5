use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::util::dates;

/// Weekly target bounds (times per week).
pub const MIN_TARGET: u32 = 1;
pub const MAX_TARGET: u32 = 7;

const PROGRESS_BAR_CELLS: usize = 30;

/// Outcome of marking a habit complete. `AlreadyCompleted` is a per-day
/// no-op, not an error: the ledger holds at most one entry per calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkResult {
    Recorded,
    AlreadyCompleted,
}

/// Display-only classification of a habit's week so far. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitStatus {
    /// Weekly target met.
    Completed,
    /// Completed today but the weekly target is not yet met.
    TouchedToday,
    /// Neither.
    Pending,
}

impl HabitStatus {
    pub fn icon(self) -> &'static str {
        match self {
            HabitStatus::Completed => "[x]",
            HabitStatus::TouchedToday => "[~]",
            HabitStatus::Pending => "[ ]",
        }
    }
}

/// One recurring behavior within one profile, with its completion ledger.
///
/// Serde defaults here are the single point of truth for reviving records
/// persisted by older versions with absent optional fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    /// Stable unique identifier, assigned at creation, never reused.
    pub id: i64,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_target")]
    pub target_frequency: u32,
    #[serde(default = "default_category")]
    pub category: String,
    /// Completion timestamps, at most one per local calendar day.
    #[serde(default)]
    pub completions: Vec<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_name() -> String {
    "Habit".to_string()
}

fn default_target() -> u32 {
    MAX_TARGET
}

pub(crate) fn default_category() -> String {
    "General".to_string()
}

impl Habit {
    pub fn new(id: i64, name: String, target_frequency: u32, category: String) -> Self {
        Habit {
            id,
            name,
            target_frequency,
            category,
            completions: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Record a completion for today. Idempotent per calendar day.
    pub fn mark_complete(&mut self) -> MarkResult {
        self.mark_complete_on(dates::today())
    }

    pub fn mark_complete_on(&mut self, today: NaiveDate) -> MarkResult {
        if self.is_completed_on(today) {
            return MarkResult::AlreadyCompleted;
        }
        self.completions.push(dates::day_start(today));
        MarkResult::Recorded
    }

    /// Count of ledger entries on or after this week's start.
    pub fn completions_this_week(&self) -> usize {
        self.completions_in_week_of(dates::today())
    }

    pub fn completions_in_week_of(&self, today: NaiveDate) -> usize {
        let week_start = dates::week_start(today);
        self.completions
            .iter()
            .filter(|ts| dates::local_day(**ts) >= week_start)
            .count()
    }

    /// Whether the weekly target has been met.
    pub fn is_completed_this_week(&self) -> bool {
        self.is_completed_in_week_of(dates::today())
    }

    pub fn is_completed_in_week_of(&self, today: NaiveDate) -> bool {
        self.completions_in_week_of(today) >= self.target_frequency as usize
    }

    pub fn is_completed_today(&self) -> bool {
        self.is_completed_on(dates::today())
    }

    pub fn is_completed_on(&self, day: NaiveDate) -> bool {
        self.completions.iter().any(|ts| dates::local_day(*ts) == day)
    }

    /// Weekly progress as a percentage, clamped to 100.
    pub fn progress_percent(&self) -> f64 {
        self.progress_percent_on(dates::today())
    }

    pub fn progress_percent_on(&self, today: NaiveDate) -> f64 {
        let pct =
            self.completions_in_week_of(today) as f64 / self.target_frequency as f64 * 100.0;
        pct.min(100.0)
    }

    /// Count of consecutive completed days ending today.
    ///
    /// Walks the ledger sorted by day descending and matches each entry
    /// against `today - k` for k = 0, 1, 2, …; stops at the first gap. If
    /// today is not completed, the streak is 0 even when an unbroken run
    /// ends yesterday. That semantics is deliberate and must not change
    /// without a product decision.
    pub fn current_streak(&self) -> u32 {
        self.current_streak_on(dates::today())
    }

    pub fn current_streak_on(&self, today: NaiveDate) -> u32 {
        if self.completions.is_empty() {
            return 0;
        }
        let mut days: Vec<NaiveDate> =
            self.completions.iter().map(|ts| dates::local_day(*ts)).collect();
        days.sort_unstable_by(|a, b| b.cmp(a));

        let mut streak: u32 = 0;
        for day in days {
            let expected = today - Duration::days(streak as i64);
            if day == expected {
                streak += 1;
            } else {
                break;
            }
        }
        streak
    }

    pub fn status(&self) -> HabitStatus {
        self.status_on(dates::today())
    }

    pub fn status_on(&self, today: NaiveDate) -> HabitStatus {
        if self.is_completed_in_week_of(today) {
            HabitStatus::Completed
        } else if self.is_completed_on(today) {
            HabitStatus::TouchedToday
        } else {
            HabitStatus::Pending
        }
    }

    /// 30-cell progress bar with a trailing percentage, e.g.
    /// `██████████▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒ 33%`.
    pub fn progress_bar(&self) -> String {
        self.progress_bar_on(dates::today())
    }

    pub fn progress_bar_on(&self, today: NaiveDate) -> String {
        let pct = self.progress_percent_on(today);
        let filled = ((pct / 3.33).floor() as usize).min(PROGRESS_BAR_CELLS);
        format!(
            "{}{} {:.0}%",
            "█".repeat(filled),
            "▒".repeat(PROGRESS_BAR_CELLS - filled),
            pct
        )
    }
}
