use chrono::{Datelike, NaiveDate, Weekday};

/// NYSE trading-day classification (§4.A). Dates are plain calendar dates;
/// callers that need US/Eastern semantics convert before calling in, since
/// the rest of the system stores and compares UTC dates.
fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Fixed-date and observed NYSE holidays for one year. Easter-relative
/// holidays (Good Friday) are computed separately.
fn fixed_holidays(year: i32) -> Vec<NaiveDate> {
    let mut holidays = vec![
        NaiveDate::from_ymd_opt(year, 1, 1),   // New Year's Day
        NaiveDate::from_ymd_opt(year, 6, 19),  // Juneteenth
        NaiveDate::from_ymd_opt(year, 7, 4),   // Independence Day
        NaiveDate::from_ymd_opt(year, 12, 25), // Christmas
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>();

    holidays.push(nth_weekday(year, 1, Weekday::Mon, 3)); // MLK Day, 3rd Monday of Jan
    holidays.push(nth_weekday(year, 2, Weekday::Mon, 3)); // Presidents' Day, 3rd Monday of Feb
    holidays.push(last_weekday(year, 5, Weekday::Mon)); // Memorial Day, last Monday of May
    holidays.push(nth_weekday(year, 9, Weekday::Mon, 1)); // Labor Day, 1st Monday of Sep
    holidays.push(nth_weekday(year, 11, Weekday::Thu, 4)); // Thanksgiving, 4th Thursday of Nov
    holidays.push(good_friday(year));

    holidays
        .into_iter()
        .map(|d| observed(d))
        .collect()
}

/// NYSE observes a holiday that falls on Saturday on the preceding Friday,
/// and one that falls on Sunday on the following Monday.
fn observed(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - chrono::Duration::days(1),
        Weekday::Sun => date + chrono::Duration::days(1),
        _ => date,
    }
}

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> NaiveDate {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("valid calendar month");
    let offset = (7 + weekday.num_days_from_monday() - first.weekday().num_days_from_monday()) % 7;
    first + chrono::Duration::days((offset + 7 * (n - 1)) as i64)
}

fn last_weekday(year: i32, month: u32, weekday: Weekday) -> NaiveDate {
    let next_month_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("valid calendar month");
    let last_day = next_month_first - chrono::Duration::days(1);
    let back = (7 + last_day.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    last_day - chrono::Duration::days(back as i64)
}

/// Computus (Anonymous Gregorian algorithm) plus a two-day offset back to Friday.
fn good_friday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = ((h + l - 7 * m + 114) % 31) + 1;
    let easter = NaiveDate::from_ymd_opt(year, month as u32, day as u32).expect("valid Easter date");
    easter - chrono::Duration::days(2)
}

pub fn is_trading_day(date: NaiveDate) -> bool {
    if is_weekend(date) {
        return false;
    }
    !fixed_holidays(date.year()).contains(&date)
}

/// Enumerate trading days in a closed [start, end] range, ascending.
pub fn enumerate_trading_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        if is_trading_day(cursor) {
            days.push(cursor);
        }
        cursor += chrono::Duration::days(1);
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekends_are_not_trading_days() {
        let saturday = NaiveDate::from_ymd_opt(2026, 7, 25).unwrap();
        assert!(!is_trading_day(saturday));
    }

    #[test]
    fn new_years_day_is_not_a_trading_day() {
        assert!(!is_trading_day(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
    }

    #[test]
    fn independence_day_observed_on_friday_when_on_saturday() {
        // July 4, 2026 is a Saturday; NYSE observes it Friday July 3.
        assert!(!is_trading_day(NaiveDate::from_ymd_opt(2026, 7, 3).unwrap()));
        assert!(!is_trading_day(NaiveDate::from_ymd_opt(2026, 7, 4).unwrap()));
    }

    #[test]
    fn ordinary_weekday_is_a_trading_day() {
        assert!(is_trading_day(NaiveDate::from_ymd_opt(2026, 7, 30).unwrap()));
    }

    #[test]
    fn enumerate_trading_days_excludes_weekends_and_holidays() {
        let start = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let days = enumerate_trading_days(start, end);
        assert_eq!(days, vec![NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()]);
    }
}
