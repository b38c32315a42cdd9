//! Temporal phrase resolution.
//!
//! Resolves Vietnamese and English date/time phrases against an injected
//! clock. Matching happens on normalized text (see `normalize`), so all
//! phrase tables here are tone-folded. Precedence is fixed: an explicit
//! numeric date beats named anchors, anchors beat weekday phrases, and
//! the current day is the final fallback.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use regex::Regex;
use std::sync::LazyLock;

use super::normalize::contains_word;

pub const DEFAULT_DATE_ASSUMPTION: &str = "Ngày mặc định là hôm nay nếu không tìm thấy.";

static EXPLICIT_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}))?\b").unwrap());

static CLOCK_HM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2}):(\d{2})\s?(am|pm)?\b").unwrap());

// Vietnamese "9h30" style with the hour marker as separator.
static CLOCK_VN_HM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})h(\d{2})\b").unwrap());

static CLOCK_H_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})\s?(am|pm|gio|h)\b").unwrap());

// Original dayMap order: Sunday first, then Monday..Saturday variants.
const WEEKDAY_PHRASES: &[(&str, Weekday)] = &[
    ("chu nhat", Weekday::Sun),
    ("cn", Weekday::Sun),
    ("thu 2", Weekday::Mon),
    ("thu hai", Weekday::Mon),
    ("t2", Weekday::Mon),
    ("thu 3", Weekday::Tue),
    ("thu ba", Weekday::Tue),
    ("t3", Weekday::Tue),
    ("thu 4", Weekday::Wed),
    ("thu tu", Weekday::Wed),
    ("t4", Weekday::Wed),
    ("thu 5", Weekday::Thu),
    ("thu nam", Weekday::Thu),
    ("t5", Weekday::Thu),
    ("thu 6", Weekday::Fri),
    ("thu sau", Weekday::Fri),
    ("t6", Weekday::Fri),
    ("thu 7", Weekday::Sat),
    ("thu bay", Weekday::Sat),
    ("t7", Weekday::Sat),
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

// Longer variants first so the consumed phrase is the one actually present.
const DAY_PERIODS: &[(&str, u32)] = &[
    ("buoi sang", 8),
    ("sang", 8),
    ("morning", 8),
    ("buoi trua", 12),
    ("trua", 12),
    ("noon", 12),
    ("buoi chieu", 14),
    ("chieu", 14),
    ("afternoon", 14),
    ("buoi toi", 19),
    ("toi", 19),
    ("evening", 19),
];

/// Outcome of scanning one normalized sentence for temporal phrases.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalResolution {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    /// True when the date came from a phrase rather than the fallback.
    pub explicit_date: bool,
    /// Phrases claimed by this stage, for title cleanup.
    pub consumed: Vec<String>,
    pub assumptions: Vec<String>,
}

impl TemporalResolution {
    pub fn timestamp_or(&self, fallback: NaiveTime) -> NaiveDateTime {
        self.date.and_time(self.time.unwrap_or(fallback))
    }
}

/// Resolve date and time cues in `normalized` against `now`.
///
/// All-day items (events) always come back with a midnight time and skip
/// clock/period detection entirely.
pub fn resolve(normalized: &str, is_all_day: bool, now: NaiveDateTime) -> TemporalResolution {
    let today = now.date();
    let mut consumed = Vec::new();
    let mut assumptions = Vec::new();
    let mut explicit_date = true;

    let date = match_explicit_date(normalized, today, &mut consumed)
        .or_else(|| match_named_anchor(normalized, today, &mut consumed))
        .or_else(|| match_weekday(normalized, today, &mut consumed))
        .unwrap_or_else(|| {
            explicit_date = false;
            assumptions.push(DEFAULT_DATE_ASSUMPTION.to_string());
            today
        });

    if is_all_day {
        return TemporalResolution {
            date,
            time: Some(NaiveTime::MIN),
            explicit_date,
            consumed,
            assumptions,
        };
    }

    let time = match_time_of_day(normalized, &mut consumed);
    TemporalResolution {
        date,
        time,
        explicit_date,
        consumed,
        assumptions,
    }
}

/// Numeric D/M or D/M/YYYY. An impossible combination (30/2) is ignored so
/// the later stages still get a chance.
fn match_explicit_date(
    normalized: &str,
    today: NaiveDate,
    consumed: &mut Vec<String>,
) -> Option<NaiveDate> {
    let caps = EXPLICIT_DATE_RE.captures(normalized)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps
        .get(3)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or_else(|| today.year());

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    consumed.push(caps[0].to_string());
    Some(date)
}

fn match_named_anchor(
    normalized: &str,
    today: NaiveDate,
    consumed: &mut Vec<String>,
) -> Option<NaiveDate> {
    // Checked in order; "sau" variants sit before "nay" variants so the
    // longer qualifier is never shadowed.
    let anchors: &[(&str, fn(NaiveDate) -> NaiveDate)] = &[
        ("hom nay", |d| d),
        ("ngay mai", |d| d + Duration::days(1)),
        ("mai", |d| d + Duration::days(1)),
        ("cuoi thang sau", |d| end_of_month(next_month(d))),
        ("cuoi thang nay", end_of_month),
        ("cuoi thang hien tai", end_of_month),
        ("dau thang sau", |d| start_of_month(next_month(d))),
        ("dau thang nay", start_of_month),
        ("dau thang hien tai", start_of_month),
        ("cuoi tuan sau", |d| {
            monday_of(d + Duration::days(7)) + Duration::days(5)
        }),
        ("cuoi tuan nay", |d| monday_of(d) + Duration::days(5)),
        ("dau tuan sau", |d| monday_of(d) + Duration::days(7)),
        ("dau tuan nay", monday_of),
    ];

    for (phrase, compute) in anchors {
        if contains_word(normalized, phrase) {
            consumed.push((*phrase).to_string());
            return Some(compute(today));
        }
    }
    None
}

fn match_weekday(
    normalized: &str,
    today: NaiveDate,
    consumed: &mut Vec<String>,
) -> Option<NaiveDate> {
    let (phrase, target) = WEEKDAY_PHRASES
        .iter()
        .find(|(phrase, _)| contains_word(normalized, phrase))?;
    consumed.push((*phrase).to_string());

    let next_week = contains_word(normalized, "tuan sau");
    let this_week =
        contains_word(normalized, "tuan nay") || contains_word(normalized, "tuan toi");

    let date = if next_week || this_week {
        let qualifier = if next_week {
            "tuan sau"
        } else if contains_word(normalized, "tuan nay") {
            "tuan nay"
        } else {
            "tuan toi"
        };
        consumed.push(qualifier.to_string());

        // qualified weekdays are calendar positions and may lie in the past
        let base = if next_week {
            today + Duration::days(7)
        } else {
            today
        };
        monday_of(base) + Duration::days(i64::from(target.num_days_from_monday()))
    } else {
        // unqualified weekdays always point forward
        let delta = (i64::from(target.num_days_from_monday())
            - i64::from(today.weekday().num_days_from_monday())
            + 7)
            % 7;
        today + Duration::days(if delta == 0 { 7 } else { delta })
    };

    Some(date)
}

fn match_time_of_day(normalized: &str, consumed: &mut Vec<String>) -> Option<NaiveTime> {
    // A numeric clock always outranks a named day period.
    if let Some(caps) = CLOCK_HM_RE.captures(normalized) {
        let hour = parse_component(&caps[1]);
        let minute = parse_component(&caps[2]);
        let hour = adjust_meridiem(hour, caps.get(3).map(|m| m.as_str()));
        if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
            consumed.push(caps[0].trim().to_string());
            return Some(time);
        }
    }

    if let Some(caps) = CLOCK_VN_HM_RE.captures(normalized) {
        let time = NaiveTime::from_hms_opt(parse_component(&caps[1]), parse_component(&caps[2]), 0);
        if let Some(time) = time {
            consumed.push(caps[0].to_string());
            return Some(time);
        }
    }

    if let Some(caps) = CLOCK_H_RE.captures(normalized) {
        let hour = adjust_meridiem(parse_component(&caps[1]), Some(&caps[2]));
        if let Some(time) = NaiveTime::from_hms_opt(hour, 0, 0) {
            consumed.push(caps[0].trim().to_string());
            return Some(time);
        }
    }

    for (phrase, hour) in DAY_PERIODS {
        if contains_word(normalized, phrase) {
            consumed.push((*phrase).to_string());
            return NaiveTime::from_hms_opt(*hour, 0, 0);
        }
    }

    None
}

fn parse_component(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}

fn adjust_meridiem(hour: u32, suffix: Option<&str>) -> u32 {
    match suffix {
        Some("pm") if hour < 12 => hour + 12,
        Some("am") if hour == 12 => 0,
        _ => hour,
    }
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn next_month(date: NaiveDate) -> NaiveDate {
    date.checked_add_months(Months::new(1)).unwrap_or(date)
}

fn end_of_month(date: NaiveDate) -> NaiveDate {
    start_of_month(next_month(start_of_month(date))) - Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    // Tuesday
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn explicit_date_wins_over_relative_words() {
        let r = resolve("nop bao cao 15/3 ngay mai", false, now());
        assert_eq!(r.date, date(2026, 3, 15));
        assert!(r.explicit_date);
        assert!(r.consumed.contains(&"15/3".to_string()));
    }

    #[test]
    fn explicit_date_with_year() {
        let r = resolve("gia han visa 15/3/2027", false, now());
        assert_eq!(r.date, date(2027, 3, 15));
    }

    #[test]
    fn impossible_explicit_date_falls_through() {
        let r = resolve("hop 30/2 ngay mai", false, now());
        // 30/2 does not exist, the anchor takes over
        assert_eq!(r.date, date(2026, 3, 11));
    }

    #[test]
    fn tomorrow_anchor() {
        let r = resolve("hop nhom mai", false, now());
        assert_eq!(r.date, date(2026, 3, 11));
        assert!(r.explicit_date);
    }

    #[test]
    fn month_anchors() {
        assert_eq!(
            resolve("dong tien nha cuoi thang nay", false, now()).date,
            date(2026, 3, 31)
        );
        assert_eq!(
            resolve("dau thang sau nop hoc phi", false, now()).date,
            date(2026, 4, 1)
        );
        assert_eq!(
            resolve("cuoi thang sau", false, now()).date,
            date(2026, 4, 30)
        );
    }

    #[test]
    fn weekend_anchor_is_saturday() {
        assert_eq!(
            resolve("don nha cuoi tuan nay", false, now()).date,
            date(2026, 3, 14)
        );
        assert_eq!(
            resolve("di choi cuoi tuan sau", false, now()).date,
            date(2026, 3, 21)
        );
    }

    #[test]
    fn qualified_weekday_may_lie_in_the_past() {
        // Monday of the current week is yesterday relative to `now`
        let r = resolve("thu 2 tuan nay", false, now());
        assert_eq!(r.date, date(2026, 3, 9));
    }

    #[test]
    fn qualified_sunday_closes_the_week() {
        assert_eq!(
            resolve("chu nhat tuan nay", false, now()).date,
            date(2026, 3, 15)
        );
    }

    #[test]
    fn next_week_qualifier() {
        assert_eq!(
            resolve("hop thu 3 tuan sau", false, now()).date,
            date(2026, 3, 17)
        );
    }

    #[test]
    fn unqualified_weekday_is_strictly_future() {
        // "thu 3" is today's weekday, so it points one week out
        assert_eq!(resolve("goi dien thu 3", false, now()).date, date(2026, 3, 17));
        assert_eq!(resolve("nop bai thu 6", false, now()).date, date(2026, 3, 13));
        assert_eq!(resolve("hop t5", false, now()).date, date(2026, 3, 12));
    }

    #[test]
    fn english_weekday_supported() {
        assert_eq!(
            resolve("submit report friday", false, now()).date,
            date(2026, 3, 13)
        );
    }

    #[test]
    fn weekday_digit_glued_to_amount_is_not_a_date() {
        // "thu 2tr" is income of two million, not Monday
        let r = resolve("thu 2tr luong", false, now());
        assert_eq!(r.date, now().date());
        assert!(!r.explicit_date);
    }

    #[test]
    fn missing_date_defaults_to_today_with_assumption() {
        let r = resolve("viet nhat ky", false, now());
        assert_eq!(r.date, now().date());
        assert!(!r.explicit_date);
        assert_eq!(r.assumptions, vec![DEFAULT_DATE_ASSUMPTION.to_string()]);
    }

    #[test]
    fn day_periods_map_to_fixed_hours() {
        assert_eq!(resolve("an sang mai", false, now()).time, Some(time(8, 0)));
        assert_eq!(resolve("hop buoi chieu", false, now()).time, Some(time(14, 0)));
        assert_eq!(resolve("da bong toi nay", false, now()).time, Some(time(19, 0)));
    }

    #[test]
    fn clock_beats_day_period() {
        let r = resolve("hop sang 9:30", false, now());
        assert_eq!(r.time, Some(time(9, 30)));
    }

    #[test]
    fn meridiem_adjustment() {
        assert_eq!(resolve("hop 7pm", false, now()).time, Some(time(19, 0)));
        assert_eq!(resolve("an trua 12pm", false, now()).time, Some(time(12, 0)));
        assert_eq!(resolve("don hang 12am", false, now()).time, Some(time(0, 0)));
        assert_eq!(resolve("hop 9:30 pm", false, now()).time, Some(time(21, 30)));
    }

    #[test]
    fn vietnamese_clock_forms() {
        assert_eq!(resolve("hop 9h30", false, now()).time, Some(time(9, 30)));
        assert_eq!(resolve("da bong 19h", false, now()).time, Some(time(19, 0)));
        assert_eq!(resolve("hop 8 gio", false, now()).time, Some(time(8, 0)));
    }

    #[test]
    fn no_time_cue_yields_none() {
        let r = resolve("viet bao cao", false, now());
        assert_eq!(r.time, None);
        assert_eq!(r.timestamp_or(now().time()), now());
    }

    #[test]
    fn all_day_forces_midnight() {
        let r = resolve("su kien khai truong toi 15/3", true, now());
        assert_eq!(r.date, date(2026, 3, 15));
        assert_eq!(r.time, Some(NaiveTime::MIN));
    }
}
