use chrono::{DateTime, Utc};

/// Remaining time below which UI layers render the countdown as urgent.
/// Presentation threshold only; nothing in the engine behaves differently.
pub const LOW_TIME_THRESHOLD_SECONDS: u32 = 300;

/// What a timer tick observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Countdown still running (or paused); carries the remaining seconds.
    Tick { remaining: u32 },
    /// The countdown just reached zero. Emitted exactly once.
    Expired,
    /// The countdown had already expired on an earlier tick.
    Idle,
}

/// Monotonic countdown for one exam session.
///
/// The timer never schedules anything itself; the host loop calls `tick`
/// at whatever cadence it can manage and the timer reconciles remaining
/// time against wall-clock elapsed. A backgrounded host that misses ticks
/// therefore cannot make the countdown drift: the first resumed tick lands
/// on the true remaining value, and a tick arriving past the deadline
/// yields a single `Expired` with remaining clamped to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamTimer {
    duration_seconds: u32,
    started_at: DateTime<Utc>,
    paused_at: Option<DateTime<Utc>>,
    paused_seconds: i64,
    expired: bool,
}

impl ExamTimer {
    /// Starts a countdown of `duration_seconds` from `now`.
    #[must_use]
    pub fn start(duration_seconds: u32, now: DateTime<Utc>) -> Self {
        Self {
            duration_seconds,
            started_at: now,
            paused_at: None,
            paused_seconds: 0,
            expired: false,
        }
    }

    #[must_use]
    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Seconds of running (unpaused) time since start, capped at the
    /// duration once the deadline has passed. Never negative, even under
    /// host clock skew.
    #[must_use]
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u32 {
        let end = self.paused_at.unwrap_or(now);
        let raw = (end - self.started_at).num_seconds() - self.paused_seconds;
        let capped = raw.clamp(0, i64::from(self.duration_seconds));
        u32::try_from(capped).unwrap_or(self.duration_seconds)
    }

    /// Seconds left on the countdown. Zero once expired, never negative.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> u32 {
        self.duration_seconds - self.elapsed_seconds(now)
    }

    /// Advances the countdown against wall-clock time.
    ///
    /// Returns `TimerEvent::Expired` exactly once when remaining reaches
    /// zero; every later call returns `TimerEvent::Idle`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TimerEvent {
        if self.expired {
            return TimerEvent::Idle;
        }

        let remaining = self.remaining(now);
        if remaining == 0 && !self.is_paused() {
            self.expired = true;
            TimerEvent::Expired
        } else {
            TimerEvent::Tick { remaining }
        }
    }

    /// Suspends the countdown (practice mode). No-op if already paused or
    /// expired.
    pub fn pause(&mut self, now: DateTime<Utc>) {
        if !self.expired && self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    /// Resumes a paused countdown; the paused span is excluded from
    /// elapsed time. No-op if not paused.
    pub fn resume(&mut self, now: DateTime<Utc>) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_seconds += (now - paused_at).num_seconds().max(0);
        }
    }
}

/// Renders remaining seconds as `MM:SS`, or `H:MM:SS` once at least one
/// hour remains. Zero-padded, no days component.
#[must_use]
pub fn format_remaining(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// True when the countdown should render as urgent (< 5 minutes).
#[must_use]
pub fn is_low_time(seconds: u32) -> bool {
    seconds < LOW_TIME_THRESHOLD_SECONDS
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn counts_down_against_wall_clock() {
        let start = fixed_now();
        let mut timer = ExamTimer::start(60, start);

        assert_eq!(
            timer.tick(start + Duration::seconds(1)),
            TimerEvent::Tick { remaining: 59 }
        );
        assert_eq!(
            timer.tick(start + Duration::seconds(45)),
            TimerEvent::Tick { remaining: 15 }
        );
    }

    #[test]
    fn missed_ticks_do_not_drift() {
        // start(5), jump the clock 5 seconds with no intervening ticks:
        // exactly one Expired, remaining 0, never negative.
        let start = fixed_now();
        let mut timer = ExamTimer::start(5, start);

        let late = start + Duration::seconds(5);
        assert_eq!(timer.tick(late), TimerEvent::Expired);
        assert_eq!(timer.remaining(late), 0);
        assert_eq!(timer.tick(late + Duration::seconds(10)), TimerEvent::Idle);
        assert_eq!(timer.remaining(late + Duration::seconds(10)), 0);
    }

    #[test]
    fn expiry_fires_once_even_far_past_deadline() {
        let start = fixed_now();
        let mut timer = ExamTimer::start(30, start);

        let way_late = start + Duration::seconds(500);
        assert_eq!(timer.tick(way_late), TimerEvent::Expired);
        assert_eq!(timer.tick(way_late), TimerEvent::Idle);
        assert_eq!(timer.elapsed_seconds(way_late), 30);
    }

    #[test]
    fn clock_skew_before_start_clamps_to_full_duration() {
        let start = fixed_now();
        let timer = ExamTimer::start(120, start);
        assert_eq!(timer.remaining(start - Duration::seconds(10)), 120);
    }

    #[test]
    fn pause_excludes_span_from_elapsed() {
        let start = fixed_now();
        let mut timer = ExamTimer::start(60, start);

        timer.pause(start + Duration::seconds(10));
        // time passes while paused
        assert_eq!(timer.remaining(start + Duration::seconds(40)), 50);
        assert_eq!(
            timer.tick(start + Duration::seconds(40)),
            TimerEvent::Tick { remaining: 50 }
        );

        timer.resume(start + Duration::seconds(40));
        assert_eq!(timer.remaining(start + Duration::seconds(50)), 40);
    }

    #[test]
    fn pause_and_resume_are_idempotent() {
        let start = fixed_now();
        let mut timer = ExamTimer::start(60, start);

        timer.resume(start); // not paused: no-op
        timer.pause(start + Duration::seconds(5));
        timer.pause(start + Duration::seconds(20)); // already paused: no-op
        timer.resume(start + Duration::seconds(25));
        assert_eq!(timer.remaining(start + Duration::seconds(25)), 55);
    }

    #[test]
    fn formats_mm_ss_and_h_mm_ss() {
        assert_eq!(format_remaining(0), "00:00");
        assert_eq!(format_remaining(59), "00:59");
        assert_eq!(format_remaining(65), "01:05");
        assert_eq!(format_remaining(600), "10:00");
        assert_eq!(format_remaining(3599), "59:59");
        assert_eq!(format_remaining(3600), "1:00:00");
        assert_eq!(format_remaining(3661), "1:01:01");
        assert_eq!(format_remaining(7322), "2:02:02");
    }

    #[test]
    fn low_time_is_a_strict_threshold() {
        assert!(is_low_time(0));
        assert!(is_low_time(299));
        assert!(!is_low_time(300));
        assert!(!is_low_time(301));
    }
}
