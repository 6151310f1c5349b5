//! Periodic reminder scheduler for the interactive session.
//!
//! A deadline-based state machine rather than a live timer: the prompt loop
//! polls `due` between key events, so the scheduler composes with blocking
//! input on a single thread. `enabled` is persistent intent, separate from
//! the live/dead state of the countdown — `Paused` remembers the feature is
//! still on while temporarily silenced around a prompt.
//!
//! Reminders are advisory only: a suppressed or missed tick changes no
//! stored data, and the next tick simply re-evaluates.

use std::time::{Duration, Instant};

use crate::model::habit::Habit;
use crate::store::Tracker;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderState {
    Stopped,
    Running,
    Paused,
}

#[derive(Debug)]
pub struct Reminder {
    state: ReminderState,
    enabled: bool,
    interval: Duration,
    deadline: Option<Instant>,
}

impl Reminder {
    pub fn new(interval: Duration) -> Reminder {
        Reminder {
            state: ReminderState::Stopped,
            enabled: false,
            interval,
            deadline: None,
        }
    }

    pub fn state(&self) -> ReminderState {
        self.state
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arm a fresh countdown and turn the feature on.
    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
        self.enabled = true;
        self.state = ReminderState::Running;
    }

    /// Cancel the countdown and turn the feature off.
    pub fn stop(&mut self) {
        self.deadline = None;
        self.enabled = false;
        self.state = ReminderState::Stopped;
    }

    /// Silence the countdown around a blocking prompt without touching
    /// `enabled`. Meaningful only from `Running`; otherwise a no-op.
    pub fn pause(&mut self) {
        if self.state == ReminderState::Running {
            self.deadline = None;
            self.state = ReminderState::Paused;
        }
    }

    /// Re-arm a full countdown after a pause. Meaningful only from `Paused`
    /// while still enabled; otherwise a no-op.
    pub fn resume(&mut self, now: Instant) {
        if self.state == ReminderState::Paused && self.enabled {
            self.deadline = Some(now + self.interval);
            self.state = ReminderState::Running;
        }
    }

    /// Restart the countdown on user activity (called per keystroke) so a
    /// tick never fires mid-interaction. No-op unless `Running`.
    pub fn reset(&mut self, now: Instant) {
        if self.state == ReminderState::Running {
            self.deadline = Some(now + self.interval);
        }
    }

    /// Stop if enabled, start otherwise. Returns the new enabled flag.
    pub fn toggle(&mut self, now: Instant) -> bool {
        if self.enabled {
            self.stop();
        } else {
            self.start(now);
        }
        self.enabled
    }

    /// Whether the countdown has expired. Fires at most once per interval:
    /// a due tick re-arms the next one.
    pub fn due(&mut self, now: Instant) -> bool {
        match (self.state, self.deadline) {
            (ReminderState::Running, Some(deadline)) if now >= deadline => {
                self.deadline = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

/// Firing condition for a tick: `None` (suppressed) when there is no active
/// profile, the profile has no habits, or every habit is already completed
/// today; otherwise the habits still pending, for rendering.
pub fn pending_habits(tracker: &Tracker) -> Option<Vec<&Habit>> {
    tracker.active_profile()?;
    if tracker.habits().is_empty() {
        return None;
    }
    let pending = tracker.pending_today();
    if pending.is_empty() { None } else { Some(pending) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const INTERVAL: Duration = Duration::from_secs(10);

    fn reminder() -> Reminder {
        Reminder::new(INTERVAL)
    }

    #[test]
    fn starts_stopped_and_disabled() {
        let r = reminder();
        assert_eq!(r.state(), ReminderState::Stopped);
        assert!(!r.enabled());
    }

    #[test]
    fn due_fires_once_per_interval_and_rearms() {
        let mut r = reminder();
        let t0 = Instant::now();
        r.start(t0);

        assert!(!r.due(t0 + Duration::from_secs(5)));
        assert!(r.due(t0 + INTERVAL));
        // Re-armed from the firing instant
        assert!(!r.due(t0 + INTERVAL + Duration::from_secs(5)));
        assert!(r.due(t0 + INTERVAL * 2));
    }

    #[test]
    fn pause_silences_without_disabling() {
        let mut r = reminder();
        let t0 = Instant::now();
        r.start(t0);
        r.pause();

        assert_eq!(r.state(), ReminderState::Paused);
        assert!(r.enabled());
        assert!(!r.due(t0 + INTERVAL * 3));

        // Resume re-arms a full interval from the resume instant
        let t1 = t0 + INTERVAL * 3;
        r.resume(t1);
        assert_eq!(r.state(), ReminderState::Running);
        assert!(!r.due(t1 + Duration::from_secs(9)));
        assert!(r.due(t1 + INTERVAL));
    }

    #[test]
    fn resume_after_stop_is_a_no_op() {
        let mut r = reminder();
        let t0 = Instant::now();
        r.start(t0);
        r.pause();
        r.stop();

        r.resume(t0);
        assert_eq!(r.state(), ReminderState::Stopped);
        assert!(!r.enabled());
        assert!(!r.due(t0 + INTERVAL * 2));
    }

    #[test]
    fn pause_while_stopped_is_a_no_op() {
        let mut r = reminder();
        r.pause();
        assert_eq!(r.state(), ReminderState::Stopped);
    }

    #[test]
    fn reset_restarts_the_countdown() {
        let mut r = reminder();
        let t0 = Instant::now();
        r.start(t0);

        // Keystroke just before the deadline pushes it out a full interval
        let t1 = t0 + Duration::from_secs(9);
        r.reset(t1);
        assert!(!r.due(t0 + INTERVAL));
        assert!(r.due(t1 + INTERVAL));
    }

    #[test]
    fn toggle_flips_enabled() {
        let mut r = reminder();
        let t0 = Instant::now();
        assert!(r.toggle(t0));
        assert_eq!(r.state(), ReminderState::Running);
        assert!(!r.toggle(t0));
        assert_eq!(r.state(), ReminderState::Stopped);
    }

    #[test]
    fn pending_habits_suppression() {
        use crate::store::Tracker;

        let dir = TempDir::new().unwrap();
        let mut tracker = Tracker::load(dir.path());

        // No active profile
        assert!(pending_habits(&tracker).is_none());

        tracker.create_profile("Alice").unwrap();
        // No habits
        assert!(pending_habits(&tracker).is_none());

        let id = tracker.add_habit("Drink Water", 7, "Health").unwrap().id;
        let pending = pending_habits(&tracker).unwrap();
        assert_eq!(pending.len(), 1);

        // Every habit completed today
        tracker.complete_habit(id).unwrap();
        assert!(pending_habits(&tracker).is_none());
    }
}
