//! Interactive session: menus, guided prompts, and the live reminder.
//!
//! Running `hb` with no subcommand lands here. The session owns one
//! `Tracker` and one `Reminder`; every prompt goes through `prompt::ask`
//! so the reminder deadline keeps being polled while the user thinks.

use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::cli::output::{self, *};
use crate::cli::prompt::{ask, AskOptions};
use crate::io::config_io;
use crate::model::habit::MarkResult;
use crate::reminder::{self, Reminder};
use crate::store::{HabitEdit, HabitFilter, Tracker};
use crate::util::dates;

const MENU: AskOptions = AskOptions { keep_reminder: true };
const TEXT: AskOptions = AskOptions { keep_reminder: false };

pub fn run(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = config_io::load_config(data_dir);
    output::set_color(config.ui.color);

    let mut tracker = Tracker::load(data_dir);
    let mut reminder = Reminder::new(Duration::from_secs(config.reminder.interval_secs));

    header("HABITA - PERSONAL HABIT TRACKER");

    let setup = if tracker.profiles().is_empty() {
        first_time_setup(&mut tracker, &mut reminder)
    } else {
        returning_user(&mut tracker, &mut reminder)
    };
    match setup {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::Interrupted => return goodbye(&tracker),
        Err(e) => return Err(e.into()),
    }

    if config.reminder.auto_start {
        reminder.start(Instant::now());
        info(&format!(
            "Reminders on: every {} seconds while you are idle.",
            config.reminder.interval_secs
        ));
    }

    match main_menu(&mut tracker, &mut reminder) {
        Ok(()) => goodbye(&tracker),
        Err(e) if e.kind() == io::ErrorKind::Interrupted => goodbye(&tracker),
        Err(e) => Err(e.into()),
    }
}

fn goodbye(tracker: &Tracker) -> Result<(), Box<dyn std::error::Error>> {
    tracker.save();
    println!();
    success("Progress saved. Keep it up!");
    Ok(())
}

// ---------------------------------------------------------------------------
// Session setup
// ---------------------------------------------------------------------------

fn first_time_setup(tracker: &mut Tracker, reminder: &mut Reminder) -> io::Result<()> {
    println!("\nLooks like this is your first time here.");
    loop {
        let name = ask("What's your name? ", reminder, tracker, TEXT)?;
        match tracker.create_profile(&name) {
            Ok(profile) => {
                success(&format!("Welcome, {}!", profile.name));
                break;
            }
            Err(e) => error(&e.to_string()),
        }
    }

    let answer = ask(
        "Add a few sample habits to get started? (y/n) ",
        reminder,
        tracker,
        TEXT,
    )?;
    if answer.trim().eq_ignore_ascii_case("y") {
        match tracker.seed_demo_habits() {
            Ok(count) => success(&format!("Added {} sample habits.", count)),
            Err(e) => error(&e.to_string()),
        }
    }
    Ok(())
}

fn returning_user(tracker: &mut Tracker, reminder: &mut Reminder) -> io::Result<()> {
    println!("\nWho's tracking today?\n");
    for (i, profile) in tracker.profiles().iter().enumerate() {
        println!(
            "{}",
            format_profile_line(i + 1, profile, false, tracker.habit_count_for(profile.id))
        );
    }
    let create_option = tracker.profiles().len() + 1;
    println!("{}. Create a new profile", create_option);

    loop {
        let answer = ask("\nSelect a profile: ", reminder, tracker, MENU)?;
        let Ok(choice) = answer.trim().parse::<usize>() else {
            error("Enter a number from the list.");
            continue;
        };
        if choice == create_option {
            let name = ask("Profile name: ", reminder, tracker, TEXT)?;
            match tracker.create_profile(&name) {
                Ok(profile) => {
                    success(&format!("Welcome, {}!", profile.name));
                    break;
                }
                Err(e) => {
                    error(&e.to_string());
                    continue;
                }
            }
        }
        let Some(profile) = tracker.profiles().get(choice.wrapping_sub(1)) else {
            error("Enter a number from the list.");
            continue;
        };
        let id = profile.id;
        let name = profile.name.clone();
        if let Err(e) = tracker.switch_profile(id) {
            error(&e.to_string());
            continue;
        }
        success(&format!("Welcome back, {}!", name));
        break;
    }

    if let Some(pending) = reminder::pending_habits(tracker) {
        info(&format!(
            "You have {} habit(s) waiting for today's check-in.",
            pending.len()
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Main menu
// ---------------------------------------------------------------------------

fn main_menu(tracker: &mut Tracker, reminder: &mut Reminder) -> io::Result<()> {
    loop {
        header("MAIN MENU");
        if let Some(profile) = tracker.active_profile() {
            println!("Profile: {}\n", paint(&profile.name, BRIGHT));
        }
        println!("1. Profiles");
        println!("2. Habits");
        println!("3. List today's habits");
        println!("4. Add a habit");
        println!("5. Complete a habit");
        println!("6. Export to text file");
        println!("7. Add sample habits");
        println!(
            "8. Reminders: {}",
            if reminder.enabled() { "ON" } else { "OFF" }
        );
        println!("0. Save and exit");

        let choice = ask("\nChoose: ", reminder, tracker, MENU)?;
        match choice.trim() {
            "1" => profile_menu(tracker, reminder)?,
            "2" => habit_menu(tracker, reminder)?,
            "3" => list_habits(tracker, HabitFilter::All),
            "4" => add_habit(tracker, reminder)?,
            "5" => complete_habit(tracker, reminder)?,
            "6" => export(tracker),
            "7" => match tracker.seed_demo_habits() {
                Ok(count) => success(&format!("Added {} sample habits.", count)),
                Err(e) => error(&e.to_string()),
            },
            "8" => {
                if reminder.toggle(Instant::now()) {
                    success("Reminders on.");
                } else {
                    info("Reminders off.");
                }
            }
            "0" => return Ok(()),
            _ => error("Enter a number from the menu."),
        }
    }
}

// ---------------------------------------------------------------------------
// Profile menu
// ---------------------------------------------------------------------------

fn profile_menu(tracker: &mut Tracker, reminder: &mut Reminder) -> io::Result<()> {
    loop {
        header("PROFILES");
        println!("1. View profiles");
        println!("2. Switch profile");
        println!("3. Create profile");
        println!("4. Delete profile");
        println!("0. Back");

        let choice = ask("\nChoose: ", reminder, tracker, MENU)?;
        match choice.trim() {
            "1" => view_profiles(tracker),
            "2" => switch_profile(tracker, reminder)?,
            "3" => {
                let name = ask("Profile name: ", reminder, tracker, TEXT)?;
                match tracker.create_profile(&name) {
                    Ok(profile) => {
                        success(&format!("Profile \"{}\" created and activated.", profile.name))
                    }
                    Err(e) => error(&e.to_string()),
                }
            }
            "4" => delete_profile(tracker, reminder)?,
            "0" => return Ok(()),
            _ => error("Enter a number from the menu."),
        }
    }
}

fn view_profiles(tracker: &Tracker) {
    header("ALL PROFILES");
    let active_id = tracker.active_profile().map(|p| p.id);
    for (i, profile) in tracker.profiles().iter().enumerate() {
        println!(
            "{}",
            format_profile_line(
                i + 1,
                profile,
                active_id == Some(profile.id),
                tracker.habit_count_for(profile.id)
            )
        );
        println!(
            "   Joined {} ({} days ago) | Streak: {} now, {} best",
            profile.join_date.format("%Y-%m-%d"),
            profile.days_joined(),
            profile.current_streak,
            profile.longest_streak
        );
    }
}

fn switch_profile(tracker: &mut Tracker, reminder: &mut Reminder) -> io::Result<()> {
    view_profiles(tracker);
    let answer = ask("\nSwitch to: ", reminder, tracker, MENU)?;
    let Some(id) = profile_at(tracker, &answer) else {
        error("No such profile.");
        return Ok(());
    };
    match tracker.switch_profile(id) {
        Ok(()) => {
            let name = tracker.active_profile().expect("just switched").name.clone();
            success(&format!(
                "Switched to {} ({} habits loaded).",
                name,
                tracker.habits().len()
            ));
        }
        Err(e) => error(&e.to_string()),
    }
    Ok(())
}

fn delete_profile(tracker: &mut Tracker, reminder: &mut Reminder) -> io::Result<()> {
    if tracker.profiles().len() <= 1 {
        error("Cannot delete the last remaining profile.");
        return Ok(());
    }
    view_profiles(tracker);
    let answer = ask("\nDelete which profile: ", reminder, tracker, MENU)?;
    let Some(id) = profile_at(tracker, &answer) else {
        error("No such profile.");
        return Ok(());
    };
    let name = tracker
        .profiles()
        .iter()
        .find(|p| p.id == id)
        .expect("resolved above")
        .name
        .clone();

    let confirm = ask(
        &format!("Delete \"{}\" and all of its habits? (y/n) ", name),
        reminder,
        tracker,
        TEXT,
    )?;
    if !confirm.trim().eq_ignore_ascii_case("y") {
        info("Nothing deleted.");
        return Ok(());
    }
    match tracker.delete_profile(id) {
        Ok(removed) => {
            success(&format!("Profile \"{}\" deleted.", removed.name));
            if let Some(active) = tracker.active_profile() {
                info(&format!("Now tracking as {}.", active.name));
            }
        }
        Err(e) => error(&e.to_string()),
    }
    Ok(())
}

/// Resolve a 1-based position from the profile listing to a profile id.
fn profile_at(tracker: &Tracker, answer: &str) -> Option<i64> {
    let index = answer.trim().parse::<usize>().ok()?.checked_sub(1)?;
    tracker.profiles().get(index).map(|p| p.id)
}

// ---------------------------------------------------------------------------
// Habit menu
// ---------------------------------------------------------------------------

fn habit_menu(tracker: &mut Tracker, reminder: &mut Reminder) -> io::Result<()> {
    loop {
        header("HABITS");
        println!("1. List all");
        println!("2. List by category");
        println!("3. List active (target not met)");
        println!("4. List completed (target met)");
        println!("5. Statistics");
        println!("6. Seven-day history");
        println!("7. Add");
        println!("8. Complete for today");
        println!("9. Edit");
        println!("10. Delete");
        println!("11. Delete all");
        println!("0. Back");

        let choice = ask("\nChoose: ", reminder, tracker, MENU)?;
        match choice.trim() {
            "1" => list_habits(tracker, HabitFilter::All),
            "2" => list_by_category(tracker),
            "3" => list_habits(tracker, HabitFilter::Active),
            "4" => list_habits(tracker, HabitFilter::Completed),
            "5" => show_stats(tracker),
            "6" => show_history(tracker),
            "7" => add_habit(tracker, reminder)?,
            "8" => complete_habit(tracker, reminder)?,
            "9" => edit_habit(tracker, reminder)?,
            "10" => delete_habit(tracker, reminder)?,
            "11" => delete_all_habits(tracker, reminder)?,
            "0" => return Ok(()),
            _ => error("Enter a number from the menu."),
        }
    }
}

fn list_habits(tracker: &Tracker, filter: HabitFilter) {
    let title = match filter {
        HabitFilter::All => "YOUR HABITS",
        HabitFilter::Active => "ACTIVE HABITS",
        HabitFilter::Completed => "COMPLETED THIS WEEK",
    };
    header(title);

    if tracker.habits().is_empty() {
        info("No habits yet. Add one from the menu.");
        return;
    }
    let filtered = tracker.habits_filtered(filter);
    if filtered.is_empty() {
        match filter {
            HabitFilter::Active => info("All habits have met their weekly target."),
            _ => info("Nothing completed this week yet."),
        }
        return;
    }

    let today = dates::today();
    for habit in filtered {
        let number = tracker
            .habits()
            .iter()
            .position(|h| h.id == habit.id)
            .expect("habit came from this list")
            + 1;
        for line in format_habit_block(number, habit, today) {
            println!("{}", line);
        }
        println!();
    }
}

fn list_by_category(tracker: &Tracker) {
    header("HABITS BY CATEGORY");
    if tracker.habits().is_empty() {
        info("No habits yet. Add one from the menu.");
        return;
    }

    let today = dates::today();
    let mut categories: Vec<&str> = Vec::new();
    for habit in tracker.habits() {
        if !categories.contains(&habit.category.as_str()) {
            categories.push(&habit.category);
        }
    }
    for category in categories {
        println!("\n{}", paint(&format!("[{}]", category), MAGENTA));
        for habit in tracker.habits().iter().filter(|h| h.category == category) {
            println!("   {}", format_habit_line(habit, today));
        }
    }
}

fn show_stats(tracker: &mut Tracker) {
    header("STATISTICS");
    let Some(_) = tracker.active_profile() else {
        error("No active profile.");
        return;
    };
    tracker.update_active_stats();

    let today = dates::today();
    let profile = tracker.active_profile().expect("checked above");
    let habits = tracker.habits();
    let completed = profile.completed_this_week(habits);

    println!("Profile: {}", paint(&profile.name, BRIGHT));
    println!("Member for {} days", profile.days_joined());
    separator();
    println!("Total habits: {}", habits.len());
    println!("Completed this week: {}", completed);
    println!("Still active: {}", habits.len() - completed);
    if !habits.is_empty() {
        let avg = habits.iter().map(|h| h.progress_percent_on(today)).sum::<f64>()
            / habits.len() as f64;
        println!("Average progress: {:.1}%", avg);
    }
    println!("Current streak: {} days", profile.current_streak);
    println!("Longest streak: {} days", profile.longest_streak);

    if let Some(best) = habits
        .iter()
        .max_by_key(|h| h.current_streak_on(today))
        .filter(|h| h.current_streak_on(today) > 0)
    {
        println!(
            "Best habit: \"{}\" with a {} day streak",
            best.name,
            best.current_streak_on(today)
        );
    }
}

fn show_history(tracker: &Tracker) {
    header("LAST SEVEN DAYS");
    if tracker.habits().is_empty() {
        info("No habits yet. Add one from the menu.");
        return;
    }
    let today = dates::today();
    for offset in (0..7).rev() {
        let day = today - chrono::Duration::days(offset);
        let label = if offset == 0 {
            format!("{} (today)", day.format("%a %d %b"))
        } else {
            day.format("%a %d %b").to_string()
        };
        println!("\n{}:", paint(&label, CYAN));
        let completed: Vec<&str> = tracker
            .habits()
            .iter()
            .filter(|h| h.is_completed_on(day))
            .map(|h| h.name.as_str())
            .collect();
        if completed.is_empty() {
            println!("   {}", paint("(no completions)", DARK_GRAY));
        } else {
            for name in completed {
                println!("   {}", paint(&format!("[x] {}", name), GREEN));
            }
        }
    }
}

fn add_habit(tracker: &mut Tracker, reminder: &mut Reminder) -> io::Result<()> {
    header("ADD A HABIT");
    let name = ask("Habit name: ", reminder, tracker, TEXT)?;
    let target_answer = ask("Times per week (1-7, default 7): ", reminder, tracker, TEXT)?;
    let target = match target_answer.trim() {
        "" => 7,
        s => s.parse::<u32>().unwrap_or(0),
    };
    let category = ask_category(tracker, reminder)?;

    match tracker.add_habit(&name, target, &category) {
        Ok(habit) => success(&format!(
            "Added \"{}\" ({}), {}x/week.",
            habit.name, habit.category, habit.target_frequency
        )),
        Err(e) => error(&e.to_string()),
    }
    Ok(())
}

fn ask_category(tracker: &Tracker, reminder: &mut Reminder) -> io::Result<String> {
    println!("Category: H) Health  P) Productivity  B) Hobby  G) General  C) Custom");
    let answer = ask("Pick one (default G): ", reminder, tracker, MENU)?;
    let category = match answer.trim().to_ascii_uppercase().as_str() {
        "H" => "Health".to_string(),
        "P" => "Productivity".to_string(),
        "B" => "Hobby".to_string(),
        "C" => ask("Custom category name: ", reminder, tracker, TEXT)?,
        _ => "General".to_string(),
    };
    Ok(category)
}

fn complete_habit(tracker: &mut Tracker, reminder: &mut Reminder) -> io::Result<()> {
    list_habits(tracker, HabitFilter::All);
    if tracker.habits().is_empty() {
        return Ok(());
    }
    let answer = ask("Which habit did you complete? ", reminder, tracker, MENU)?;
    let Some(id) = habit_at(tracker, &answer) else {
        error("No such habit.");
        return Ok(());
    };
    let name = tracker.habit_by_id(id).expect("resolved above").name.clone();
    match tracker.complete_habit(id) {
        Ok(MarkResult::Recorded) => {
            let streak = tracker
                .habit_by_id(id)
                .expect("resolved above")
                .current_streak();
            success(&format!(
                "\"{}\" completed for today. Streak: {} days.",
                name, streak
            ));
        }
        Ok(MarkResult::AlreadyCompleted) => {
            info(&format!("\"{}\" was already completed today.", name))
        }
        Err(e) => error(&e.to_string()),
    }
    Ok(())
}

fn edit_habit(tracker: &mut Tracker, reminder: &mut Reminder) -> io::Result<()> {
    list_habits(tracker, HabitFilter::All);
    if tracker.habits().is_empty() {
        return Ok(());
    }
    let answer = ask("Edit which habit? ", reminder, tracker, MENU)?;
    let Some(id) = habit_at(tracker, &answer) else {
        error("No such habit.");
        return Ok(());
    };
    let habit = tracker.habit_by_id(id).expect("resolved above");
    let (current_name, current_target, current_category) = (
        habit.name.clone(),
        habit.target_frequency,
        habit.category.clone(),
    );

    println!("\nLeave a field blank to keep its current value.");
    let name = ask(
        &format!("Name [{}]: ", current_name),
        reminder,
        tracker,
        TEXT,
    )?;
    let target = ask(
        &format!("Times per week [{}]: ", current_target),
        reminder,
        tracker,
        TEXT,
    )?;
    let category = ask(
        &format!("Category [{}]: ", current_category),
        reminder,
        tracker,
        TEXT,
    )?;

    let edit = HabitEdit {
        name: non_blank(&name),
        target_frequency: match target.trim() {
            "" => None,
            s => Some(s.parse::<u32>().unwrap_or(0)),
        },
        category: non_blank(&category),
    };
    if edit.is_empty() {
        info("Nothing changed.");
        return Ok(());
    }
    match tracker.edit_habit(id, edit) {
        Ok(habit) => success(&format!("Updated \"{}\".", habit.name)),
        Err(e) => error(&e.to_string()),
    }
    Ok(())
}

fn delete_habit(tracker: &mut Tracker, reminder: &mut Reminder) -> io::Result<()> {
    list_habits(tracker, HabitFilter::All);
    if tracker.habits().is_empty() {
        return Ok(());
    }
    let answer = ask("Delete which habit? ", reminder, tracker, MENU)?;
    let Some(id) = habit_at(tracker, &answer) else {
        error("No such habit.");
        return Ok(());
    };
    let name = tracker.habit_by_id(id).expect("resolved above").name.clone();
    let confirm = ask(
        &format!("Delete \"{}\"? (y/n) ", name),
        reminder,
        tracker,
        TEXT,
    )?;
    if !confirm.trim().eq_ignore_ascii_case("y") {
        info("Nothing deleted.");
        return Ok(());
    }
    match tracker.delete_habit(id) {
        Ok(removed) => success(&format!("Deleted \"{}\".", removed.name)),
        Err(e) => error(&e.to_string()),
    }
    Ok(())
}

fn delete_all_habits(tracker: &mut Tracker, reminder: &mut Reminder) -> io::Result<()> {
    if tracker.habits().is_empty() {
        info("No habits to delete.");
        return Ok(());
    }
    error(&format!(
        "This removes all {} habits and their history.",
        tracker.habits().len()
    ));
    let confirm = ask("Type DELETE ALL to confirm: ", reminder, tracker, TEXT)?;
    if confirm.trim() != "DELETE ALL" {
        info("Nothing deleted.");
        return Ok(());
    }
    let count = tracker.clear_habits();
    success(&format!("Deleted {} habits.", count));
    Ok(())
}

fn export(tracker: &Tracker) {
    match crate::ops::export::write_export(tracker) {
        Ok(path) => success(&format!("Exported to {}", path.display())),
        Err(e) => error(&e.to_string()),
    }
}

/// Resolve a 1-based position from the habit listing to a habit id.
fn habit_at(tracker: &Tracker, answer: &str) -> Option<i64> {
    let index = answer.trim().parse::<usize>().ok()?.checked_sub(1)?;
    tracker.habits().get(index).map(|h| h.id)
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn habit_at_resolves_positions_and_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let mut tracker = Tracker::load(dir.path());
        tracker.create_profile("Alice").unwrap();
        let first = tracker.add_habit("Read", 3, "General").unwrap().id;
        let second = tracker.add_habit("Run", 5, "Health").unwrap().id;

        assert_eq!(habit_at(&tracker, "1"), Some(first));
        assert_eq!(habit_at(&tracker, " 2 "), Some(second));
        assert_eq!(habit_at(&tracker, "0"), None);
        assert_eq!(habit_at(&tracker, "3"), None);
        assert_eq!(habit_at(&tracker, "two"), None);
    }

    #[test]
    fn profile_at_resolves_positions() {
        let dir = TempDir::new().unwrap();
        let mut tracker = Tracker::load(dir.path());
        let alice = tracker.create_profile("Alice").unwrap().id;
        let bob = tracker.create_profile("Bob").unwrap().id;

        assert_eq!(profile_at(&tracker, "1"), Some(alice));
        assert_eq!(profile_at(&tracker, "2"), Some(bob));
        assert_eq!(profile_at(&tracker, "5"), None);
    }

    #[test]
    fn non_blank_trims_and_drops_empties() {
        assert_eq!(non_blank("  hi  "), Some("hi".to_string()));
        assert_eq!(non_blank("   "), None);
        assert_eq!(non_blank(""), None);
    }
}
