use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::WorkMode;
use crate::aggregate::DailySummary;
use crate::tz::{TzOffset, dates_between, is_weekend};

/// Daily floor-time target (8 hours).
pub const FLOOR_TARGET_MINUTES: i64 = 480;

/// How a date that has both a leave and a clock-in counts toward attendance.
///
/// `CountBoth` adds the date once as a work day and once as a leave day, which
/// can push attendance past the true value before the 100% cap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveOverlapPolicy {
    #[default]
    CountBoth,
    CountOnce,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Widgets {
    pub avg_floor_minutes: i64,
    pub punctuality_percent: i64,
    pub attendance_percent: i64,
    pub target_met_days: usize,
    pub work_days: usize,
    pub total_weekdays: usize,
    pub leave_count: usize,
    pub office_days: usize,
    pub remote_days: usize,
}

fn percent(numerator: usize, denominator: usize) -> i64 {
    if denominator == 0 {
        return 0;
    }
    (numerator as f64 / denominator as f64 * 100.0).round() as i64
}

fn punctual_cutoff() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default()
}

/// Dashboard widgets over `days` (the trailing window ending today).
///
/// `leave_dates` may extend beyond the current month; only dates between the
/// first of today's month and today are counted.
pub fn compute_widgets(
    days: &[DailySummary],
    leave_dates: &[NaiveDate],
    today: NaiveDate,
    offset: TzOffset,
    policy: LeaveOverlapPolicy,
) -> Widgets {
    let mut widgets = Widgets::default();
    let mut floor_total = 0i64;
    let mut punctual_days = 0usize;
    let cutoff = punctual_cutoff();

    for day in days.iter().filter(|day| day.clocked_in()) {
        widgets.work_days += 1;
        floor_total += day.floor_minutes;
        if day.floor_minutes >= FLOOR_TARGET_MINUTES {
            widgets.target_met_days += 1;
        }
        match day.work_mode {
            WorkMode::Remote => widgets.remote_days += 1,
            WorkMode::Office => widgets.office_days += 1,
        }
        if let Some(first) = day.first_clock_in
            && offset.local_datetime(first).time() <= cutoff
        {
            punctual_days += 1;
        }
    }

    if widgets.work_days > 0 {
        widgets.avg_floor_minutes = (floor_total as f64 / widgets.work_days as f64).round() as i64;
    }
    widgets.punctuality_percent = percent(punctual_days, widgets.work_days);

    let month_start = today.with_day(1).unwrap_or(today);
    let month_work: BTreeSet<NaiveDate> = days
        .iter()
        .filter(|day| day.clocked_in() && day.date >= month_start && day.date <= today)
        .map(|day| day.date)
        .collect();
    let month_leaves: BTreeSet<NaiveDate> = leave_dates
        .iter()
        .copied()
        .filter(|date| *date >= month_start && *date <= today)
        .collect();
    widgets.leave_count = month_leaves.len();
    widgets.total_weekdays = dates_between(month_start, today)
        .into_iter()
        .filter(|date| !is_weekend(*date))
        .count();

    let present_days = match policy {
        LeaveOverlapPolicy::CountBoth => month_work.len() + month_leaves.len(),
        LeaveOverlapPolicy::CountOnce => month_work.union(&month_leaves).count(),
    };
    widgets.attendance_percent = percent(present_days, widgets.total_weekdays).min(100);
    widgets
}

/// Monday..Sunday of the week containing `today`.
pub fn week_dates(today: NaiveDate) -> Vec<NaiveDate> {
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    (0..7).map(|index| monday + Duration::days(index)).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyDay {
    pub date: NaiveDate,
    pub day: String,
    pub hours: f64,
    pub is_today: bool,
}

/// Floor hours per day, rounded to one decimal.
pub fn weekly_chart(days: &[DailySummary], today: NaiveDate) -> Vec<WeeklyDay> {
    days.iter()
        .map(|summary| WeeklyDay {
            date: summary.date,
            day: summary.date.format("%a").to_string(),
            hours: (summary.floor_minutes as f64 / 6.0).round() / 10.0,
            is_today: summary.date == today,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::tz::parse_local_date;

    fn date(value: &str) -> NaiveDate {
        parse_local_date(value).expect("date")
    }

    fn ts(value: &str) -> DateTime<Utc> {
        value.parse().expect("timestamp")
    }

    fn worked(day: &str, floor_minutes: i64, clock_in: &str, mode: WorkMode) -> DailySummary {
        DailySummary {
            date: date(day),
            floor_minutes,
            break_minutes: 0,
            total_minutes: floor_minutes,
            work_mode: mode,
            state: None,
            first_clock_in: Some(ts(clock_in)),
        }
    }

    fn idle(day: &str) -> DailySummary {
        DailySummary {
            date: date(day),
            floor_minutes: 0,
            break_minutes: 0,
            total_minutes: 0,
            work_mode: WorkMode::Office,
            state: None,
            first_clock_in: None,
        }
    }

    #[test]
    fn widgets_count_work_days_targets_and_modes() {
        let days = vec![
            worked("2025-03-03", 480, "2025-03-03T09:00:00Z", WorkMode::Office),
            worked("2025-03-04", 300, "2025-03-04T10:00:00Z", WorkMode::Remote),
            worked("2025-03-05", 510, "2025-03-05T10:01:00Z", WorkMode::Office),
            idle("2025-03-06"),
        ];
        let widgets = compute_widgets(
            &days,
            &[],
            date("2025-03-06"),
            TzOffset::UTC,
            LeaveOverlapPolicy::CountBoth,
        );
        assert_eq!(widgets.work_days, 3);
        assert_eq!(widgets.avg_floor_minutes, 430);
        assert_eq!(widgets.target_met_days, 2);
        assert_eq!(widgets.office_days, 2);
        assert_eq!(widgets.remote_days, 1);
        // 09:00 and exactly 10:00 are punctual, 10:01 is not.
        assert_eq!(widgets.punctuality_percent, 67);
        assert_eq!(widgets.total_weekdays, 4);
        assert_eq!(widgets.attendance_percent, 75);
    }

    #[test]
    fn punctuality_uses_local_clock_in_time() {
        let ist = TzOffset::from_minutes(-330).expect("offset");
        // 04:00 UTC is 09:30 IST.
        let days = vec![worked(
            "2025-03-03",
            480,
            "2025-03-03T04:00:00Z",
            WorkMode::Office,
        )];
        let widgets = compute_widgets(
            &days,
            &[],
            date("2025-03-03"),
            ist,
            LeaveOverlapPolicy::CountBoth,
        );
        assert_eq!(widgets.punctuality_percent, 100);
    }

    #[test]
    fn leave_and_work_on_same_date_counts_twice_by_default() {
        let days = vec![
            worked("2025-03-03", 480, "2025-03-03T09:00:00Z", WorkMode::Office),
            idle("2025-03-04"),
        ];
        let leaves = vec![date("2025-03-03"), date("2025-02-28")];
        let both = compute_widgets(
            &days,
            &leaves,
            date("2025-03-04"),
            TzOffset::UTC,
            LeaveOverlapPolicy::CountBoth,
        );
        assert_eq!(both.leave_count, 1);
        assert_eq!(both.total_weekdays, 2);
        assert_eq!(both.attendance_percent, 100);

        let once = compute_widgets(
            &days,
            &leaves,
            date("2025-03-04"),
            TzOffset::UTC,
            LeaveOverlapPolicy::CountOnce,
        );
        assert_eq!(once.attendance_percent, 50);
    }

    #[test]
    fn attendance_is_capped_at_one_hundred() {
        let days = vec![worked(
            "2025-03-01",
            60,
            "2025-03-01T09:00:00Z",
            WorkMode::Office,
        )];
        // Saturday the 1st has no weekdays in range, Monday the 3rd has one.
        let widgets = compute_widgets(
            &days,
            &[date("2025-03-03")],
            date("2025-03-03"),
            TzOffset::UTC,
            LeaveOverlapPolicy::CountBoth,
        );
        assert_eq!(widgets.total_weekdays, 1);
        assert_eq!(widgets.attendance_percent, 100);
    }

    #[test]
    fn week_starts_on_monday() {
        let week = week_dates(date("2025-03-09"));
        assert_eq!(week.first(), Some(&date("2025-03-03")));
        assert_eq!(week.last(), Some(&date("2025-03-09")));
        assert_eq!(week_dates(date("2025-03-03"))[0], date("2025-03-03"));
    }

    #[test]
    fn weekly_chart_rounds_hours_to_tenths() {
        let days = vec![
            worked("2025-03-03", 487, "2025-03-03T09:00:00Z", WorkMode::Office),
            idle("2025-03-04"),
        ];
        let chart = weekly_chart(&days, date("2025-03-04"));
        assert_eq!(chart[0].day, "Mon");
        assert!((chart[0].hours - 8.1).abs() < 1e-9);
        assert!(!chart[0].is_today);
        assert_eq!(chart[1].hours, 0.0);
        assert!(chart[1].is_today);
    }
}
