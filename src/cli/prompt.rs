//! Blocking line input that keeps the reminder scheduler alive.
//!
//! Reads a line in raw mode with a short poll timeout, so the reminder
//! deadline is checked between keystrokes instead of a plain blocking
//! `read_line` starving it. Prompts that should not be interrupted (free
//! text entry) pause the scheduler for their duration; menu prompts keep
//! it live and repaint the prompt line after a reminder fires.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use unicode_width::UnicodeWidthChar;

use crate::cli::output::{self, CYAN, YELLOW};
use crate::reminder::{self, Reminder};
use crate::store::Tracker;

const POLL_TICK: Duration = Duration::from_millis(200);
const BOX_WIDTH: usize = 58;

#[derive(Debug, Clone, Copy, Default)]
pub struct AskOptions {
    /// Keep the reminder countdown running while this prompt is open.
    /// Off for free-text entry, on for menu selections.
    pub keep_reminder: bool,
}

/// Prompt for a line of input. Returns the entered text without the
/// trailing newline; Ctrl+C maps to `ErrorKind::Interrupted`.
pub fn ask(
    question: &str,
    reminder: &mut Reminder,
    tracker: &Tracker,
    opts: AskOptions,
) -> io::Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", question)?;
    stdout.flush()?;

    if !opts.keep_reminder {
        reminder.pause();
    }
    enable_raw_mode()?;
    let result = read_line_raw(question, reminder, tracker, opts);
    disable_raw_mode()?;

    let now = Instant::now();
    if !opts.keep_reminder {
        reminder.resume(now);
    }
    reminder.reset(now);

    println!();
    result
}

fn read_line_raw(
    question: &str,
    reminder: &mut Reminder,
    tracker: &Tracker,
    opts: AskOptions,
) -> io::Result<String> {
    let mut stdout = io::stdout();
    let mut buffer = String::new();

    loop {
        if !event::poll(POLL_TICK)? {
            // Idle tick: check the reminder deadline
            if opts.keep_reminder && reminder.due(Instant::now()) {
                if let Some(pending) = reminder::pending_habits(tracker) {
                    render_reminder(&mut stdout, &pending)?;
                    // Repaint the prompt the reminder scrolled away
                    write!(stdout, "{}{}", question, buffer)?;
                    stdout.flush()?;
                }
            }
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        reminder.reset(Instant::now());

        match key.code {
            KeyCode::Enter => return Ok(buffer),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"));
            }
            KeyCode::Backspace => {
                if buffer.pop().is_some() {
                    write!(stdout, "\x08 \x08")?;
                    stdout.flush()?;
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                buffer.push(c);
                write!(stdout, "{}", c)?;
                stdout.flush()?;
            }
            _ => {}
        }
    }
}

// Raw mode needs explicit carriage returns, hence \r\n throughout.
fn render_reminder(
    stdout: &mut io::Stdout,
    pending: &[&crate::model::habit::Habit],
) -> io::Result<()> {
    let today = crate::util::dates::today();
    let top = format!("╔{}╗", "═".repeat(BOX_WIDTH));
    let bottom = format!("╚{}╝", "═".repeat(BOX_WIDTH));
    let divider = format!("╠{}╣", "═".repeat(BOX_WIDTH));

    write!(stdout, "\r\n\r\n{}\r\n", output::paint(&top, YELLOW))?;
    write!(
        stdout,
        "{}\r\n",
        output::paint(&boxed_line("REMINDER: you still have pending habits!"), YELLOW)
    )?;
    write!(stdout, "{}\r\n", output::paint(&divider, YELLOW))?;
    for habit in pending {
        let line = format!(
            "  {} ({}/{} this week)",
            habit.name,
            habit.completions_in_week_of(today),
            habit.target_frequency
        );
        write!(stdout, "{}\r\n", output::paint(&boxed_line(&line), CYAN))?;
    }
    write!(stdout, "{}\r\n\r\n", output::paint(&bottom, YELLOW))?;
    stdout.flush()
}

/// Pad a line to the box interior width, truncating by display width when
/// it would overflow.
fn boxed_line(text: &str) -> String {
    let mut shown = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > BOX_WIDTH {
            break;
        }
        shown.push(c);
        width += w;
    }
    format!("║{}{}║", shown, " ".repeat(BOX_WIDTH - width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicode_width::UnicodeWidthStr;

    #[test]
    fn boxed_line_pads_to_the_interior_width() {
        let line = boxed_line("hello");
        assert_eq!(line.chars().count(), BOX_WIDTH + 2);
        assert!(line.starts_with("║hello"));
        assert!(line.ends_with("║"));
    }

    #[test]
    fn boxed_line_truncates_overflow_by_display_width() {
        let long = "x".repeat(BOX_WIDTH + 20);
        let line = boxed_line(&long);
        assert_eq!(line.chars().count(), BOX_WIDTH + 2);
    }

    #[test]
    fn boxed_line_accounts_for_wide_characters() {
        // CJK characters are two columns wide
        let line = boxed_line("日課");
        assert!(line.starts_with("║日課"));
        assert_eq!(UnicodeWidthStr::width(line.as_str()), BOX_WIDTH + 2);
    }
}
