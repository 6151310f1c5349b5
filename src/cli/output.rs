use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::habit::{Habit, HabitStatus};
use crate::model::profile::Profile;

// ---------------------------------------------------------------------------
// ANSI colors
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BRIGHT: &str = "\x1b[1m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const RED: &str = "\x1b[31m";
pub const CYAN: &str = "\x1b[36m";
pub const MAGENTA: &str = "\x1b[35m";
pub const DARK_GRAY: &str = "\x1b[90m";

static COLOR: AtomicBool = AtomicBool::new(false);

/// Enable or disable ANSI colors process-wide (interactive mode only).
pub fn set_color(enabled: bool) {
    COLOR.store(enabled, Ordering::Relaxed);
}

pub fn paint(text: &str, code: &str) -> String {
    if COLOR.load(Ordering::Relaxed) {
        format!("{code}{text}{RESET}")
    } else {
        text.to_string()
    }
}

// ---------------------------------------------------------------------------
// Message helpers
// ---------------------------------------------------------------------------

const RULE_WIDTH: usize = 60;

pub fn header(title: &str) {
    println!("\n{}", "═".repeat(RULE_WIDTH));
    println!("{}", paint(title, CYAN));
    println!("{}", "═".repeat(RULE_WIDTH));
}

pub fn separator() {
    println!("{}", "─".repeat(RULE_WIDTH));
}

pub fn success(msg: &str) {
    println!("\n{}", paint(&format!("[OK] {msg}"), GREEN));
}

pub fn error(msg: &str) {
    println!("\n{}", paint(&format!("[X] {msg}"), RED));
}

pub fn info(msg: &str) {
    println!("\n{}", paint(&format!("[!] {msg}"), YELLOW));
}

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct HabitJson {
    pub number: usize,
    pub id: i64,
    pub name: String,
    pub category: String,
    pub target_frequency: u32,
    pub completions_this_week: usize,
    pub progress_percent: f64,
    pub current_streak: u32,
    pub status: HabitStatus,
    pub completed_today: bool,
}

impl HabitJson {
    pub fn new(number: usize, habit: &Habit, today: NaiveDate) -> HabitJson {
        HabitJson {
            number,
            id: habit.id,
            name: habit.name.clone(),
            category: habit.category.clone(),
            target_frequency: habit.target_frequency,
            completions_this_week: habit.completions_in_week_of(today),
            progress_percent: habit.progress_percent_on(today),
            current_streak: habit.current_streak_on(today),
            status: habit.status_on(today),
            completed_today: habit.is_completed_on(today),
        }
    }
}

#[derive(Serialize)]
pub struct HabitListJson {
    pub profile: String,
    pub habits: Vec<HabitJson>,
}

#[derive(Serialize)]
pub struct ProfileJson {
    pub id: i64,
    pub name: String,
    pub active: bool,
    pub habit_count: usize,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub days_joined: i64,
}

#[derive(Serialize)]
pub struct ProfileListJson {
    pub profiles: Vec<ProfileJson>,
}

#[derive(Serialize)]
pub struct StatsJson {
    pub profile: String,
    pub total_habits: usize,
    pub active: usize,
    pub completed: usize,
    pub average_progress: f64,
    pub completions_this_week: usize,
    pub current_streak: u32,
    pub longest_streak: u32,
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// Multi-line listing block for one habit, numbered by display position.
pub fn format_habit_block(number: usize, habit: &Habit, today: NaiveDate) -> Vec<String> {
    let today_mark = if habit.is_completed_on(today) {
        " (done today)"
    } else {
        ""
    };
    vec![
        format!(
            "{}. {} {}{}",
            number,
            habit.status_on(today).icon(),
            habit.name,
            today_mark
        ),
        format!("   Category: {}", habit.category),
        format!(
            "   Target: {}x/week | Progress: {}/{} ({:.0}%)",
            habit.target_frequency,
            habit.completions_in_week_of(today),
            habit.target_frequency,
            habit.progress_percent_on(today)
        ),
        format!("   {}", paint(&habit.progress_bar_on(today), YELLOW)),
        format!("   Streak: {} consecutive days", habit.current_streak_on(today)),
    ]
}

/// One-line summary used in grouped and compact listings.
pub fn format_habit_line(habit: &Habit, today: NaiveDate) -> String {
    format!(
        "{} {} ({}/{})",
        habit.status_on(today).icon(),
        habit.name,
        habit.completions_in_week_of(today),
        habit.target_frequency
    )
}

pub fn format_profile_line(
    number: usize,
    profile: &Profile,
    active: bool,
    habit_count: usize,
) -> String {
    let marker = if active {
        format!(" {}", paint("(ACTIVE)", YELLOW))
    } else {
        String::new()
    };
    format!(
        "{}. {}{} ({} habits)",
        number,
        paint(&profile.name, BRIGHT),
        marker,
        habit_count
    )
}
