//! Spreadsheet date serial decoding.
//!
//! Serials count days in the 1900 date system: serial 1 is 1 January 1900
//! and the fractional part is the time of day. That system believes in a
//! 29 February 1900, so serials above 60 are shifted down by one before
//! conversion.

use crate::config::Locale;
use crate::format::{
    display_float, display_float_nd, display_float_nd_th, display_percent, display_percent_nd,
    display_percent_nd_th, display_scientific,
};
use chrono::{Datelike, Days, NaiveDate};

const NAN_TEXT: &str = "NaN";

/// Calendar date of a serial as `(year, month, day)`.
///
/// Serials below 1 decode to the placeholder `(1900, 1, 0)`.
fn ymd(serial: f64) -> Option<(i32, u32, u32)> {
    if !serial.is_finite() {
        return None;
    }
    if serial < 1.0 {
        return Some((1900, 1, 0));
    }
    let serial = if serial > 60.0 { serial - 1.0 } else { serial };
    let days = u64::try_from(serial.floor() as i64).ok()?;
    let date = NaiveDate::from_ymd_opt(1899, 12, 31)?.checked_add_days(Days::new(days))?;
    Some((date.year(), date.month(), date.day()))
}

/// Seconds into the day, rounded to the nearest second (may reach 86400).
fn seconds_of_day(serial: f64) -> Option<i64> {
    if !serial.is_finite() {
        return None;
    }
    Some(((serial - serial.floor()) * 86400.0 + 0.5).floor() as i64)
}

/// Day of month; 0 for serials below 1.
pub fn day(serial: f64) -> Option<u32> {
    ymd(serial).map(|(_, _, d)| d)
}

/// Month, 1 to 12.
pub fn month(serial: f64) -> Option<u32> {
    ymd(serial).map(|(_, m, _)| m)
}

/// Four-digit year; 1900 for serials below 1.
pub fn year(serial: f64) -> Option<i32> {
    ymd(serial).map(|(y, _, _)| y)
}

/// Hour of the day.
pub fn hour(serial: f64) -> Option<i64> {
    seconds_of_day(serial).map(|s| s / 3600)
}

/// Minute of the hour.
pub fn minute(serial: f64) -> Option<i64> {
    seconds_of_day(serial).map(|s| (s / 60) % 60)
}

/// Second of the minute.
pub fn second(serial: f64) -> Option<i64> {
    seconds_of_day(serial).map(|s| s % 60)
}

/// Weekday numbering schemes (spreadsheet return types 1, 2 and 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekdayNumbering {
    /// Sunday = 1 to Saturday = 7.
    SundayOne,
    /// Monday = 1 to Sunday = 7.
    MondayOne,
    /// Monday = 0 to Sunday = 6.
    MondayZero,
}

impl WeekdayNumbering {
    /// Map a return-type code; fractional codes are floored.
    pub fn from_code(code: f64) -> Option<Self> {
        if !code.is_finite() || !(1.0..=3.0).contains(&code) {
            return None;
        }
        match code.floor() as i64 {
            1 => Some(Self::SundayOne),
            2 => Some(Self::MondayOne),
            _ => Some(Self::MondayZero),
        }
    }
}

/// Day of the week of a serial.
pub fn weekday(serial: f64, numbering: WeekdayNumbering) -> Option<i64> {
    if !serial.is_finite() {
        return None;
    }
    let res = ((serial + 6.0).floor() % 7.0) as i64;
    Some(match numbering {
        WeekdayNumbering::SundayOne => res + 1,
        WeekdayNumbering::MondayOne => ((res + 6) % 7) + 1,
        WeekdayNumbering::MondayZero => (res + 6) % 7,
    })
}

/// One directive of a serial display format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateToken {
    /// Text copied as is.
    Literal(String),
    /// Month number.
    Month,
    /// Month number, two digits.
    MonthPadded,
    /// Abbreviated month name.
    MonthShort,
    /// Full month name.
    MonthLong,
    /// Day of month.
    Day,
    /// Day of month, two digits.
    DayPadded,
    /// Abbreviated day name.
    WeekdayShort,
    /// Full day name.
    WeekdayLong,
    /// Year, two digits.
    YearShort,
    /// Year, all digits.
    Year,
    /// Hour, 0 to 23.
    Hour,
    /// Hour, two digits.
    HourPadded,
    /// Hour on a 12-hour clock.
    Hour12,
    /// Hour on a 12-hour clock, two digits.
    Hour12Padded,
    /// Minutes.
    Minute,
    /// Minutes, two digits.
    MinutePadded,
    /// Seconds.
    Second,
    /// Seconds, two digits.
    SecondPadded,
    /// `AM` or `PM`.
    AmPm,
    /// The serial through [`display_float`].
    Float,
    /// The serial through [`display_float_nd`].
    FloatNd(i32),
    /// The serial through [`display_float_nd_th`].
    FloatNdTh(i32),
    /// The serial through [`display_percent`].
    Percent,
    /// The serial through [`display_percent_nd`].
    PercentNd(i32),
    /// The serial through [`display_percent_nd_th`].
    PercentNdTh(i32),
    /// The serial through [`display_scientific`].
    Scientific(usize),
    /// Elapsed hours since serial 0, zero-padded to a width.
    ElapsedHours(usize),
}

impl DateToken {
    /// Decode a packed code stream.
    ///
    /// Codes 32 and up index `locale.literals`; codes 24, 25, 27, 28, 29 and
    /// 30 take the following code as their argument. Unknown codes and
    /// out-of-range literals are skipped; a missing argument ends the stream.
    pub fn decode(codes: &[i32], locale: &Locale) -> Vec<Self> {
        let mut tokens = Vec::new();
        let mut iter = codes.iter().copied();
        while let Some(code) = iter.next() {
            let token = match code {
                c if c > 31 => match locale.literals.get((c - 32) as usize) {
                    Some(text) => Self::Literal((*text).to_string()),
                    None => continue,
                },
                2 => Self::Month,
                3 => Self::MonthPadded,
                4 => Self::MonthShort,
                5 => Self::MonthLong,
                6 => Self::Day,
                7 => Self::DayPadded,
                8 => Self::WeekdayShort,
                9 => Self::WeekdayLong,
                10 => Self::YearShort,
                11 => Self::Year,
                12 => Self::Hour,
                13 => Self::HourPadded,
                14 => Self::Hour12,
                15 => Self::Hour12Padded,
                16 => Self::Minute,
                17 => Self::MinutePadded,
                18 => Self::Second,
                19 => Self::SecondPadded,
                21 | 22 => Self::AmPm,
                23 => Self::Float,
                26 => Self::Percent,
                24 | 25 | 27 | 28 | 29 | 30 => {
                    let Some(arg) = iter.next() else { break };
                    match code {
                        24 => Self::FloatNd(arg),
                        25 => Self::FloatNdTh(arg),
                        27 => Self::PercentNd(arg),
                        28 => Self::PercentNdTh(arg),
                        29 => Self::Scientific(arg.max(0) as usize),
                        _ => Self::ElapsedHours(arg.max(0) as usize),
                    }
                },
                _ => continue,
            };
            tokens.push(token);
        }
        tokens
    }
}

fn padded(value: i64) -> String {
    if value < 10 {
        format!("0{}", value)
    } else {
        value.to_string()
    }
}

fn or_nan<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| NAN_TEXT.to_string(), |v| v.to_string())
}

/// Render a serial with a token list; `"NaN"` for non-finite serials.
pub fn format_serial(tokens: &[DateToken], serial: f64, locale: &Locale) -> String {
    if !serial.is_finite() {
        return NAN_TEXT.to_string();
    }
    let date = ymd(serial);
    let hours = hour(serial).unwrap_or_default();
    let weekday_index = weekday(serial, WeekdayNumbering::SundayOne)
        .and_then(|w| usize::try_from(w - 1).ok());

    let mut out = String::new();
    for token in tokens {
        let piece = match token {
            DateToken::Literal(text) => text.clone(),
            DateToken::Month => or_nan(date.map(|(_, m, _)| m)),
            DateToken::MonthPadded => or_nan(date.map(|(_, m, _)| padded(i64::from(m)))),
            DateToken::MonthShort => or_nan(
                date.and_then(|(_, m, _)| locale.month_names_short.get(m as usize - 1)),
            ),
            DateToken::MonthLong => or_nan(
                date.and_then(|(_, m, _)| locale.month_names_long.get(m as usize - 1)),
            ),
            DateToken::Day => or_nan(date.map(|(_, _, d)| d)),
            DateToken::DayPadded => or_nan(date.map(|(_, _, d)| padded(i64::from(d)))),
            DateToken::WeekdayShort => {
                or_nan(weekday_index.and_then(|i| locale.day_names_short.get(i)))
            },
            DateToken::WeekdayLong => {
                or_nan(weekday_index.and_then(|i| locale.day_names_long.get(i)))
            },
            DateToken::YearShort => or_nan(date.map(|(y, _, _)| padded(i64::from(y % 100)))),
            DateToken::Year => or_nan(date.map(|(y, _, _)| y)),
            DateToken::Hour => hours.to_string(),
            DateToken::HourPadded => padded(hours),
            DateToken::Hour12 => match hours % 12 {
                0 => "12".to_string(),
                h => h.to_string(),
            },
            DateToken::Hour12Padded => match hours % 12 {
                0 => "12".to_string(),
                h => padded(h),
            },
            DateToken::Minute => or_nan(minute(serial)),
            DateToken::MinutePadded => or_nan(minute(serial).map(padded)),
            DateToken::Second => or_nan(second(serial)),
            DateToken::SecondPadded => or_nan(second(serial).map(padded)),
            DateToken::AmPm => String::from(if hours < 12 { "AM" } else { "PM" }),
            DateToken::Float => display_float(serial, locale),
            DateToken::FloatNd(nd) => display_float_nd(serial, *nd, locale),
            DateToken::FloatNdTh(nd) => display_float_nd_th(serial, *nd, locale),
            DateToken::Percent => display_percent(serial, locale),
            DateToken::PercentNd(nd) => display_percent_nd(serial, *nd, locale),
            DateToken::PercentNdTh(nd) => display_percent_nd_th(serial, *nd, locale),
            DateToken::Scientific(nd) => display_scientific(serial, *nd, locale),
            DateToken::ElapsedHours(width) => {
                let total = (hours as f64 + serial.floor() * 24.0).to_string();
                let missing = width.saturating_sub(total.len()).min(14);
                format!("{}{}", "0".repeat(missing), total)
            },
        };
        out.push_str(&piece);
    }
    out
}
