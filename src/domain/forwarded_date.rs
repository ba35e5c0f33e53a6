use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};

const MONTH: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\b\.?";

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})[/.-](\d{1,2})[/.-](\d{1,2})").unwrap());

static NUMERIC_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})[/.-](\d{1,2})[/.-](\d{4}|\d{2})\b").unwrap());

// "March 4, 2025", "Mar. 4th 25", "March 4". A two-digit "year" followed by
// `:` is an hour ("March 4 10:15").
static MONTH_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b{}\s*(\d{{1,2}})(?:st|nd|rd|th)?\b,?(?:\s*(\d{{4}}|\d{{2}})\b(:)?)?",
        MONTH
    ))
    .unwrap()
});

// "4 Mar 2025", "4th of March, 2025", "4 Mar 25"
static DAY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?{},?\s*(\d{{4}}|\d{{2}})\b(:)?",
        MONTH
    ))
    .unwrap()
});

/// Reformats a free-form date or date-time as `M/D/YYYY`.
///
/// The date may be buried in other text ("Sent: Tuesday, March 4, 2025 10:15 AM").
/// When several shapes match, the one that starts earliest wins.
/// Input that holds no recognisable date comes back unchanged.
pub fn normalize_date(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    match parse_lenient(raw.trim()) {
        Some(date) => format!("{}/{}/{}", date.month(), date.day(), date.year()),
        None => raw.to_string(),
    }
}

fn parse_lenient(text: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }

    [
        first_match(&ISO_DATE, text, from_iso),
        first_match(&NUMERIC_DATE, text, from_numeric),
        first_match(&DAY_FIRST, text, from_day_first),
        first_match(&MONTH_FIRST, text, from_month_first),
    ]
    .into_iter()
    .flatten()
    .min_by_key(|(start, _)| *start)
    .map(|(_, date)| date)
}

/// First match of `pattern` that is a real calendar date, with its offset.
fn first_match(
    pattern: &Regex,
    text: &str,
    to_date: fn(&Captures) -> Option<NaiveDate>,
) -> Option<(usize, NaiveDate)> {
    pattern.captures_iter(text).find_map(|caps| {
        let start = caps.get(0)?.start();
        to_date(&caps).map(|date| (start, date))
    })
}

fn from_iso(caps: &Captures) -> Option<NaiveDate> {
    ymd(number(caps, 1)?, number(caps, 2)?, number(caps, 3)?)
}

fn from_month_first(caps: &Captures) -> Option<NaiveDate> {
    let month = month_number(caps.get(1)?.as_str())?;
    let day = number(caps, 2)?;
    let year = year_of(caps, 3, Some(4)).unwrap_or_else(|| Local::now().year());
    ymd(year, month, day)
}

fn from_day_first(caps: &Captures) -> Option<NaiveDate> {
    let day = number(caps, 1)?;
    let month = month_number(caps.get(2)?.as_str())?;
    ymd(year_of(caps, 3, Some(4))?, month, day)
}

fn from_numeric(caps: &Captures) -> Option<NaiveDate> {
    let (mut month, mut day) = (number(caps, 1)?, number(caps, 2)?);
    // 25/12/2024 can only be day first
    if month > 12 && day <= 12 {
        std::mem::swap(&mut month, &mut day);
    }

    ymd(year_of(caps, 3, None)?, month, day)
}

/// Four-digit years as written; two-digit years pivot at 69. `None` when the
/// two digits are followed by the colon captured at `colon`.
fn year_of(caps: &Captures, index: usize, colon: Option<usize>) -> Option<i32> {
    let text = caps.get(index)?.as_str();
    let year: i32 = text.parse().ok()?;
    match text.len() {
        2 if colon.and_then(|i| caps.get(i)).is_some() => None,
        2 if year < 69 => Some(2000 + year),
        2 => Some(1900 + year),
        _ => Some(year),
    }
}

fn number(caps: &Captures, index: usize) -> Option<i32> {
    caps.get(index)?.as_str().parse().ok()
}

fn ymd(year: i32, month: i32, day: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
}

fn month_number(name: &str) -> Option<i32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
