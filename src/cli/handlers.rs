use std::path::PathBuf;

use crate::cli::commands::*;
use crate::cli::output::{self, *};
use crate::io::data_io;
use crate::model::habit::MarkResult;
use crate::ops::export;
use crate::store::{HabitEdit, HabitFilter, Tracker, TrackerError};
use crate::util::dates;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn resolve_data_dir(arg: Option<&str>) -> PathBuf {
    match arg {
        Some(dir) => PathBuf::from(dir),
        None => data_io::default_data_dir(),
    }
}

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let data_dir = resolve_data_dir(cli.data_dir.as_deref());
    let mut tracker = Tracker::load(&data_dir);

    match cli.command.expect("dispatch requires a subcommand") {
        Commands::List(args) => cmd_list(&tracker, args.filter.into(), json),
        Commands::Add(args) => cmd_add(&mut tracker, args),
        Commands::Done(args) => cmd_done(&mut tracker, args),
        Commands::Edit(args) => cmd_edit(&mut tracker, args),
        Commands::Delete(args) => cmd_delete(&mut tracker, args),
        Commands::Stats => cmd_stats(&mut tracker, json),
        Commands::History => cmd_history(&tracker),
        Commands::Categories => cmd_categories(&tracker),
        Commands::Export => cmd_export(&tracker),
        Commands::Demo => cmd_demo(&mut tracker),
        Commands::Profile(cmd) => match cmd.action {
            ProfileAction::List => cmd_profile_list(&tracker, json),
            ProfileAction::Create { name } => cmd_profile_create(&mut tracker, &name),
            ProfileAction::Switch { name } => cmd_profile_switch(&mut tracker, &name),
            ProfileAction::Delete { name } => cmd_profile_delete(&mut tracker, &name),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve a 1-based display position (as printed by `hb list`) to the
/// stable habit id all mutations are keyed by.
fn habit_id_at(tracker: &Tracker, number: usize) -> Result<i64, TrackerError> {
    number
        .checked_sub(1)
        .and_then(|i| tracker.habits().get(i))
        .map(|h| h.id)
        .ok_or(TrackerError::HabitNotFound)
}

fn profile_id_named(tracker: &Tracker, name: &str) -> Result<i64, TrackerError> {
    tracker
        .profile_by_name(name)
        .map(|p| p.id)
        .ok_or(TrackerError::ProfileNotFound)
}

fn require_active(tracker: &Tracker) -> Result<(), TrackerError> {
    tracker
        .active_profile()
        .map(|_| ())
        .ok_or(TrackerError::NoActiveProfile)
}

// ---------------------------------------------------------------------------
// Habit commands
// ---------------------------------------------------------------------------

fn cmd_list(
    tracker: &Tracker,
    filter: HabitFilter,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    require_active(tracker)?;
    let today = dates::today();
    let profile = tracker.active_profile().expect("active checked above");

    if json {
        let habits = tracker
            .habits()
            .iter()
            .enumerate()
            .filter(|(_, h)| match filter {
                HabitFilter::All => true,
                HabitFilter::Active => !h.is_completed_in_week_of(today),
                HabitFilter::Completed => h.is_completed_in_week_of(today),
            })
            .map(|(i, h)| HabitJson::new(i + 1, h, today))
            .collect();
        let out = HabitListJson {
            profile: profile.name.clone(),
            habits,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let filtered = tracker.habits_filtered(filter);
    if filtered.is_empty() {
        match filter {
            HabitFilter::All => println!("No habits yet. Try `hb add`."),
            HabitFilter::Active => println!("All habits have met their weekly target."),
            HabitFilter::Completed => println!("No habits completed this week yet."),
        }
        return Ok(());
    }

    for habit in filtered {
        // Display numbers index the unfiltered list so they stay valid
        // as arguments to done/edit/delete
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
    Ok(())
}

fn cmd_add(tracker: &mut Tracker, args: AddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let habit = tracker.add_habit(&args.name, args.target, &args.category)?;
    println!(
        "Added \"{}\" ({}), {}x/week.",
        habit.name, habit.category, habit.target_frequency
    );
    Ok(())
}

fn cmd_done(tracker: &mut Tracker, args: DoneArgs) -> Result<(), Box<dyn std::error::Error>> {
    let id = habit_id_at(tracker, args.number)?;
    let name = tracker.habit_by_id(id).expect("resolved above").name.clone();
    match tracker.complete_habit(id)? {
        MarkResult::Recorded => println!("\"{}\" completed for today.", name),
        MarkResult::AlreadyCompleted => {
            println!("\"{}\" was already completed today.", name)
        }
    }
    Ok(())
}

fn cmd_edit(tracker: &mut Tracker, args: EditArgs) -> Result<(), Box<dyn std::error::Error>> {
    let id = habit_id_at(tracker, args.number)?;
    let edit = HabitEdit {
        name: args.name,
        target_frequency: args.target,
        category: args.category,
    };
    if edit.is_empty() {
        println!("Nothing to change.");
        return Ok(());
    }
    let habit = tracker.edit_habit(id, edit)?;
    println!("Updated \"{}\".", habit.name);
    Ok(())
}

fn cmd_delete(tracker: &mut Tracker, args: DeleteArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.all {
        require_active(tracker)?;
        let count = tracker.clear_habits();
        println!("Deleted {} habits.", count);
        return Ok(());
    }
    let number = args.number.ok_or("expected a habit number or --all")?;
    let id = habit_id_at(tracker, number)?;
    let removed = tracker.delete_habit(id)?;
    println!("Deleted \"{}\".", removed.name);
    Ok(())
}

fn cmd_stats(tracker: &mut Tracker, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    require_active(tracker)?;
    tracker.update_active_stats();
    // Persist the refreshed longest-streak high-water mark
    tracker.save();
    let today = dates::today();
    let profile = tracker.active_profile().expect("active checked above");
    let habits = tracker.habits();

    let active = habits
        .iter()
        .filter(|h| !h.is_completed_in_week_of(today))
        .count();
    let completed = habits.len() - active;
    let average_progress = if habits.is_empty() {
        0.0
    } else {
        habits.iter().map(|h| h.progress_percent_on(today)).sum::<f64>() / habits.len() as f64
    };
    let completions_this_week: usize = habits
        .iter()
        .map(|h| h.completions_in_week_of(today))
        .sum();

    if json {
        let out = StatsJson {
            profile: profile.name.clone(),
            total_habits: habits.len(),
            active,
            completed,
            average_progress,
            completions_this_week,
            current_streak: profile.current_streak,
            longest_streak: profile.longest_streak,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Profile: {}", profile.name);
    println!("Total habits: {}", habits.len());
    println!("Active: {}", active);
    println!("Completed this week: {}", completed);
    if !habits.is_empty() {
        println!("Average progress: {:.1}%", average_progress);
        println!("Completions this week: {}", completions_this_week);
    }
    println!("Current streak: {} days", profile.current_streak);
    println!("Longest streak: {} days", profile.longest_streak);

    if let Some(best) = habits
        .iter()
        .max_by_key(|h| h.current_streak_on(today))
        .filter(|h| h.current_streak_on(today) > 0)
    {
        println!(
            "Best streak: \"{}\" - {} days",
            best.name,
            best.current_streak_on(today)
        );
    }
    Ok(())
}

fn cmd_history(tracker: &Tracker) -> Result<(), Box<dyn std::error::Error>> {
    require_active(tracker)?;
    if tracker.habits().is_empty() {
        println!("No habits yet.");
        return Ok(());
    }

    let today = dates::today();
    for offset in (0..7).rev() {
        let day = today - chrono::Duration::days(offset);
        println!("\n{}:", day.format("%a %d %b"));
        let completed: Vec<&str> = tracker
            .habits()
            .iter()
            .filter(|h| h.is_completed_on(day))
            .map(|h| h.name.as_str())
            .collect();
        if completed.is_empty() {
            println!("   (no completions)");
        } else {
            for name in completed {
                println!("   [x] {}", name);
            }
        }
    }
    Ok(())
}

fn cmd_categories(tracker: &Tracker) -> Result<(), Box<dyn std::error::Error>> {
    require_active(tracker)?;
    if tracker.habits().is_empty() {
        println!("No habits yet.");
        return Ok(());
    }

    let today = dates::today();
    let mut categories: Vec<&str> = Vec::new();
    for habit in tracker.habits() {
        if !categories.contains(&habit.category.as_str()) {
            categories.push(&habit.category);
        }
    }

    for category in categories {
        println!("\n[{}]", category);
        for habit in tracker.habits().iter().filter(|h| h.category == category) {
            println!("   {}", format_habit_line(habit, today));
        }
    }
    Ok(())
}

fn cmd_export(tracker: &Tracker) -> Result<(), Box<dyn std::error::Error>> {
    let path = export::write_export(tracker)?;
    println!("Exported to {}", path.display());
    Ok(())
}

fn cmd_demo(tracker: &mut Tracker) -> Result<(), Box<dyn std::error::Error>> {
    let count = tracker.seed_demo_habits()?;
    println!("Added {} sample habits.", count);
    Ok(())
}

// ---------------------------------------------------------------------------
// Profile commands
// ---------------------------------------------------------------------------

fn cmd_profile_list(tracker: &Tracker, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let profiles = tracker
            .profiles()
            .iter()
            .map(|p| ProfileJson {
                id: p.id,
                name: p.name.clone(),
                active: tracker.active_profile().map(|a| a.id) == Some(p.id),
                habit_count: tracker.habit_count_for(p.id),
                current_streak: p.current_streak,
                longest_streak: p.longest_streak,
                days_joined: p.days_joined(),
            })
            .collect();
        let out = ProfileListJson { profiles };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if tracker.profiles().is_empty() {
        println!("No profiles yet. Try `hb profile create <name>`.");
        return Ok(());
    }
    for (i, profile) in tracker.profiles().iter().enumerate() {
        let active = tracker.active_profile().map(|a| a.id) == Some(profile.id);
        println!(
            "{}",
            output::format_profile_line(
                i + 1,
                profile,
                active,
                tracker.habit_count_for(profile.id)
            )
        );
        println!(
            "   Joined: {} ({} days ago)",
            profile.join_date.format("%Y-%m-%d"),
            profile.days_joined()
        );
    }
    Ok(())
}

fn cmd_profile_create(
    tracker: &mut Tracker,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let profile = tracker.create_profile(name)?;
    println!("Profile \"{}\" created and activated.", profile.name);
    Ok(())
}

fn cmd_profile_switch(
    tracker: &mut Tracker,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = profile_id_named(tracker, name)?;
    tracker.switch_profile(id)?;
    println!(
        "Switched to \"{}\" ({} habits loaded).",
        name,
        tracker.habits().len()
    );
    Ok(())
}

fn cmd_profile_delete(
    tracker: &mut Tracker,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = profile_id_named(tracker, name)?;
    let removed = tracker.delete_profile(id)?;
    println!("Profile \"{}\" deleted.", removed.name);
    Ok(())
}
