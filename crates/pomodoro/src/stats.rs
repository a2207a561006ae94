//! Statistics over the session log
//!
//! Everything here is recomputed from the full log on each call:
//! - Per-day focus/break minutes and focus session counts
//! - The trailing 7 day series
//! - Totals and the daily streak
//!
//! Functions that depend on "today" take it as an argument; callers pass
//! `today()` for the local calendar date.

use chrono::{Duration, Local, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::session::{SessionRecord, SessionType};
use crate::settings::Settings;

/// How far back `streak` looks
const STREAK_HORIZON_DAYS: i64 = 365;

/// Totals for one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayStats {
    pub date: NaiveDate,
    pub focus_minutes: u32,
    pub break_minutes: u32,
    /// Focus sessions completed that day
    pub sessions_completed: u32,
}

impl DayStats {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            focus_minutes: 0,
            break_minutes: 0,
            sessions_completed: 0,
        }
    }
}

/// Current local calendar day
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Group records by the local day they completed on
pub fn aggregate_by_day(records: &[SessionRecord]) -> BTreeMap<NaiveDate, DayStats> {
    let mut days = BTreeMap::new();
    for record in records {
        let date = record.date_key();
        let entry = days.entry(date).or_insert_with(|| DayStats::empty(date));
        let minutes = record.minutes();
        match record.session_type {
            SessionType::Focus => {
                entry.focus_minutes += minutes;
                entry.sessions_completed += 1;
            }
            SessionType::ShortBreak | SessionType::LongBreak => {
                entry.break_minutes += minutes;
            }
        }
    }
    days
}

/// The 7 days ending on `today`, oldest first
pub fn last_7_days(today: NaiveDate) -> Vec<NaiveDate> {
    (0..7).rev().map(|i| today - Duration::days(i)).collect()
}

/// Day stats for each of the last 7 days, zero-filled
pub fn weekly_stats(records: &[SessionRecord], today: NaiveDate) -> Vec<DayStats> {
    let by_day = aggregate_by_day(records);
    last_7_days(today)
        .into_iter()
        .map(|date| by_day.get(&date).copied().unwrap_or_else(|| DayStats::empty(date)))
        .collect()
}

/// Focus minutes across the whole log
pub fn total_focus_minutes(records: &[SessionRecord]) -> u32 {
    records
        .iter()
        .filter(|r| r.session_type == SessionType::Focus)
        .map(SessionRecord::minutes)
        .sum()
}

/// Focus sessions across the whole log
pub fn total_sessions(records: &[SessionRecord]) -> u32 {
    records
        .iter()
        .filter(|r| r.session_type == SessionType::Focus)
        .count() as u32
}

/// Consecutive days with at least one focus session, counting back from
/// `today`. A quiet today does not break the streak; it just isn't counted.
pub fn streak(records: &[SessionRecord], today: NaiveDate) -> u32 {
    let by_day = aggregate_by_day(records);
    let mut streak = 0;

    for i in 0..STREAK_HORIZON_DAYS {
        let date = today - Duration::days(i);
        let active = by_day
            .get(&date)
            .map(|d| d.sessions_completed > 0)
            .unwrap_or(false);

        if active {
            streak += 1;
        } else if i > 0 {
            break;
        }
    }

    streak
}

/// Stats for `today`, zero-valued if nothing completed yet
pub fn today_stats(records: &[SessionRecord], today: NaiveDate) -> DayStats {
    aggregate_by_day(records)
        .get(&today)
        .copied()
        .unwrap_or_else(|| DayStats::empty(today))
}

/// Everything the stats screen shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub today: DayStats,
    pub daily_goal: u32,
    pub total_sessions: u32,
    pub total_focus_minutes: u32,
    pub streak: u32,
    pub week: Vec<DayStats>,
}

impl Summary {
    pub fn from_sessions(records: &[SessionRecord], settings: &Settings, today: NaiveDate) -> Self {
        Self {
            today: today_stats(records, today),
            daily_goal: settings.daily_goal,
            total_sessions: total_sessions(records),
            total_focus_minutes: total_focus_minutes(records),
            streak: streak(records, today),
            week: weekly_stats(records, today),
        }
    }

    /// Share of the daily goal reached, capped at 1.0
    pub fn goal_progress(&self) -> f64 {
        if self.daily_goal == 0 {
            return 0.0;
        }
        (self.today.sessions_completed as f64 / self.daily_goal as f64).min(1.0)
    }

    /// Largest focus minute count in the week (for scaling charts)
    pub fn week_peak(&self) -> u32 {
        self.week.iter().map(|d| d.focus_minutes).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// A record completed at local noon on `day`
    fn record_on(day: NaiveDate, session_type: SessionType, duration_secs: u32) -> SessionRecord {
        let noon = Local
            .from_local_datetime(&day.and_hms_opt(12, 0, 0).unwrap())
            .unwrap()
            .with_timezone(&Utc);
        SessionRecord::completed_at(session_type, duration_secs, noon)
    }

    #[test]
    fn test_total_focus_minutes() {
        let day = date(2026, 3, 10);
        let records = vec![
            record_on(day, SessionType::Focus, 1500),
            record_on(day, SessionType::ShortBreak, 300),
            record_on(day, SessionType::Focus, 1500),
        ];
        assert_eq!(total_focus_minutes(&records), 50);
        assert_eq!(total_sessions(&records), 2);
    }

    #[test]
    fn test_empty_log() {
        let today = date(2026, 3, 10);
        assert_eq!(total_focus_minutes(&[]), 0);
        assert_eq!(total_sessions(&[]), 0);
        assert_eq!(streak(&[], today), 0);
        assert_eq!(today_stats(&[], today), DayStats::empty(today));
        assert!(aggregate_by_day(&[]).is_empty());
    }

    #[test]
    fn test_aggregate_by_day() {
        let monday = date(2026, 3, 9);
        let tuesday = date(2026, 3, 10);
        let records = vec![
            record_on(monday, SessionType::Focus, 1500),
            record_on(monday, SessionType::ShortBreak, 300),
            record_on(monday, SessionType::LongBreak, 900),
            record_on(tuesday, SessionType::Focus, 3000),
        ];

        let days = aggregate_by_day(&records);
        assert_eq!(days.len(), 2);

        let mon = days[&monday];
        assert_eq!(mon.focus_minutes, 25);
        assert_eq!(mon.break_minutes, 20);
        assert_eq!(mon.sessions_completed, 1);

        let tue = days[&tuesday];
        assert_eq!(tue.focus_minutes, 50);
        assert_eq!(tue.break_minutes, 0);
        assert_eq!(tue.sessions_completed, 1);
    }

    #[test]
    fn test_minutes_are_rounded_per_record() {
        let day = date(2026, 3, 10);
        let records = vec![
            record_on(day, SessionType::Focus, 90),
            record_on(day, SessionType::Focus, 89),
        ];
        assert_eq!(aggregate_by_day(&records)[&day].focus_minutes, 3);
        assert_eq!(total_focus_minutes(&records), 3);
    }

    #[test]
    fn test_last_7_days() {
        let days = last_7_days(date(2026, 3, 2));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], date(2026, 2, 24));
        assert_eq!(days[6], date(2026, 3, 2));
        assert!(days.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_weekly_stats_zero_fills() {
        let today = date(2026, 3, 10);
        let records = vec![
            record_on(today, SessionType::Focus, 1500),
            record_on(today - Duration::days(3), SessionType::Focus, 1500),
            // outside the window
            record_on(today - Duration::days(7), SessionType::Focus, 1500),
        ];

        let week = weekly_stats(&records, today);
        assert_eq!(week.len(), 7);
        assert_eq!(week[6].date, today);
        assert_eq!(week[6].focus_minutes, 25);
        assert_eq!(week[3].sessions_completed, 1);
        assert_eq!(week[0], DayStats::empty(today - Duration::days(6)));
        let total: u32 = week.iter().map(|d| d.sessions_completed).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_streak_today_and_yesterday() {
        let today = date(2026, 3, 10);
        let records = vec![
            record_on(today, SessionType::Focus, 1500),
            record_on(today - Duration::days(1), SessionType::Focus, 1500),
            record_on(today - Duration::days(3), SessionType::Focus, 1500),
        ];
        assert_eq!(streak(&records, today), 2);
    }

    #[test]
    fn test_streak_survives_quiet_today() {
        let today = date(2026, 3, 10);
        let records = vec![
            record_on(today - Duration::days(1), SessionType::Focus, 1500),
            record_on(today - Duration::days(2), SessionType::Focus, 1500),
        ];
        assert_eq!(streak(&records, today), 2);
    }

    #[test]
    fn test_streak_ignores_break_only_days() {
        let today = date(2026, 3, 10);
        let records = vec![
            record_on(today, SessionType::Focus, 1500),
            record_on(today - Duration::days(1), SessionType::ShortBreak, 300),
            record_on(today - Duration::days(2), SessionType::Focus, 1500),
        ];
        assert_eq!(streak(&records, today), 1);
    }

    #[test]
    fn test_streak_gap_before_yesterday_ends_it() {
        let today = date(2026, 3, 10);
        let records = vec![record_on(today - Duration::days(2), SessionType::Focus, 1500)];
        assert_eq!(streak(&records, today), 0);
    }

    #[test]
    fn test_today_stats() {
        let today = date(2026, 3, 10);
        let records = vec![
            record_on(today, SessionType::Focus, 1500),
            record_on(today, SessionType::ShortBreak, 300),
            record_on(today - Duration::days(1), SessionType::Focus, 1500),
        ];
        let stats = today_stats(&records, today);
        assert_eq!(stats.sessions_completed, 1);
        assert_eq!(stats.focus_minutes, 25);
        assert_eq!(stats.break_minutes, 5);
    }

    #[test]
    fn test_summary() {
        let today = date(2026, 3, 10);
        let records = vec![
            record_on(today, SessionType::Focus, 1500),
            record_on(today, SessionType::Focus, 1500),
            record_on(today - Duration::days(1), SessionType::Focus, 3000),
        ];
        let settings = Settings {
            daily_goal: 4,
            ..Default::default()
        };

        let summary = Summary::from_sessions(&records, &settings, today);
        assert_eq!(summary.today.sessions_completed, 2);
        assert_eq!(summary.daily_goal, 4);
        assert_eq!(summary.total_sessions, 3);
        assert_eq!(summary.total_focus_minutes, 100);
        assert_eq!(summary.streak, 2);
        assert_eq!(summary.week.len(), 7);
        assert_eq!(summary.week_peak(), 50);
        assert!((summary.goal_progress() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_goal_progress_is_capped() {
        let today = date(2026, 3, 10);
        let records: Vec<_> = (0..5).map(|_| record_on(today, SessionType::Focus, 60)).collect();
        let settings = Settings {
            daily_goal: 2,
            ..Default::default()
        };
        let summary = Summary::from_sessions(&records, &settings, today);
        assert_eq!(summary.goal_progress(), 1.0);
    }
}
